//! Tests for standard library built-in functions.
//!
//! These tests verify the functionality of built-in objects
//! like Math, String, Array, Object, Number, JSON and RegExp.

extern crate sheet_harvest;

use sheet_harvest::parser::JsParser;
use sheet_harvest::runner::ds::error::JErrorType;
use sheet_harvest::runner::ds::operations::type_conversion::to_string;
use sheet_harvest::runner::ds::value::{JsNumberType, JsValue};
use sheet_harvest::runner::eval::execute_program;
use sheet_harvest::runner::plugin::registry::BuiltInRegistry;
use sheet_harvest::runner::plugin::types::EvalContext;

fn new_ctx() -> EvalContext {
    let mut ctx = EvalContext::new();
    ctx.install_core_builtins(BuiltInRegistry::with_core());
    ctx
}

fn run_js(code: &str) -> Result<JsValue, JErrorType> {
    let mut ctx = new_ctx();
    let program = JsParser::parse_to_ast_from_str(code)?;
    execute_program(&program, &mut ctx)
}

fn run_str(code: &str) -> String {
    match run_js(code) {
        Ok(value) => to_string(&value),
        Err(e) => panic!("script failed: {}\n{}", e, code),
    }
}

// ============================================================================
// Math tests
// ============================================================================

mod math_tests {
    use super::*;

    fn call_math_method(registry: &BuiltInRegistry, method: &str, args: Vec<JsValue>) -> JsValue {
        let mut ctx = EvalContext::new();
        let method_fn = registry
            .get_method("Math", method)
            .unwrap_or_else(|| panic!("Math.{} should exist", method));
        method_fn(&mut ctx, JsValue::Undefined, args)
            .unwrap_or_else(|e| panic!("Math.{} should succeed: {}", method, e))
    }

    #[test]
    fn test_math_abs_negative() {
        let registry = BuiltInRegistry::with_core();
        let result = call_math_method(&registry, "abs", vec![JsValue::from_i64(-5)]);
        assert_eq!(result, JsValue::Number(JsNumberType::Integer(5)));
    }

    #[test]
    fn test_math_floor_and_ceil() {
        let registry = BuiltInRegistry::with_core();
        assert_eq!(
            call_math_method(&registry, "floor", vec![JsValue::from_f64(4.7)]),
            JsValue::from_i64(4)
        );
        assert_eq!(
            call_math_method(&registry, "ceil", vec![JsValue::from_f64(4.2)]),
            JsValue::from_i64(5)
        );
    }

    #[test]
    fn test_math_round_half_up() {
        assert_eq!(run_str("[Math.round(2.5), Math.round(-2.5), Math.round(2.4)].join()"), "3,-2,2");
    }

    #[test]
    fn test_math_min_max() {
        assert_eq!(run_str("Math.max(3, 9, 4)"), "9");
        assert_eq!(run_str("Math.min(3, 9, 4)"), "3");
        assert_eq!(run_str("Math.max()"), "-Infinity");
        assert_eq!(run_str("Math.max(1, 'x')"), "NaN");
    }

    #[test]
    fn test_math_constants() {
        assert_eq!(run_str("Math.PI > 3.14 && Math.PI < 3.15"), "true");
    }

    #[test]
    fn test_math_random_is_in_range_and_repeatable() {
        let code = "var r = []; for (var i = 0; i < 5; i++) r.push(Math.random()); r.join()";
        let first = run_str(code);
        assert_eq!(first, run_str(code));
        assert_eq!(run_str("var ok = true; for (var i = 0; i < 50; i++) { var v = Math.random(); ok = ok && v >= 0 && v < 1; } ok"), "true");
    }
}

// ============================================================================
// String tests
// ============================================================================

mod string_tests {
    use super::*;

    #[test]
    fn test_case_and_trim() {
        assert_eq!(run_str("'  Mixed Case  '.trim().toLowerCase()"), "mixed case");
        assert_eq!(run_str("'abc'.toUpperCase()"), "ABC");
    }

    #[test]
    fn test_index_and_search() {
        assert_eq!(run_str("'spellbook'.indexOf('book')"), "5");
        assert_eq!(run_str("'spellbook'.includes('spell')"), "true");
        assert_eq!(run_str("'spellbook'.startsWith('book', 5)"), "true");
        assert_eq!(run_str("'a-b-c'.lastIndexOf('-')"), "3");
    }

    #[test]
    fn test_substrings() {
        assert_eq!(run_str("'abcdef'.slice(-3)"), "def");
        assert_eq!(run_str("'abcdef'.substring(4, 1)"), "bcd");
        assert_eq!(run_str("'abcdef'.substr(2, 3)"), "cde");
        assert_eq!(run_str("'abc'.charAt(1)"), "b");
        assert_eq!(run_str("'abc'.charCodeAt(0)"), "97");
    }

    #[test]
    fn test_split_and_join() {
        assert_eq!(run_str("'a,b,,c'.split(',').length"), "4");
        assert_eq!(run_str("'a1b22c'.split(/\\d+/).join('|')"), "a|b|c");
        assert_eq!(run_str("'abc'.split('').join(' ')"), "a b c");
    }

    #[test]
    fn test_replace_variants() {
        assert_eq!(run_str("'aaa'.replace('a', 'b')"), "baa");
        assert_eq!(run_str("'aaa'.replace(/a/g, 'b')"), "bbb");
        assert_eq!(run_str("'aaa'.replaceAll('a', 'c')"), "ccc");
        assert_eq!(run_str("'John Smith'.replace(/(\\w+)\\s(\\w+)/, '$2, $1')"), "Smith, John");
        assert_eq!(run_str("'x1y2'.replace(/\\d/g, function (d) { return d * 2; })"), "x2y4");
    }

    #[test]
    fn test_replace_all_with_non_global_regexp_throws() {
        assert!(matches!(run_js("'aa'.replaceAll(/a/, 'b')"), Err(JErrorType::TypeError(_))));
    }

    #[test]
    fn test_match_and_search() {
        assert_eq!(run_str("'d6 and d8'.match(/d(\\d)/g).join()"), "d6,d8");
        assert_eq!(run_str("'d6 and d8'.match(/d(\\d)/)[1]"), "6");
        assert_eq!(run_str("'hello'.search(/l+/)"), "2");
        assert_eq!(run_str("'hello'.match(/z/)"), "null");
    }

    #[test]
    fn test_padding_and_repeat() {
        assert_eq!(run_str("'7'.padStart(3, '0')"), "007");
        assert_eq!(run_str("'ab'.padEnd(5, '.')"), "ab...");
        assert_eq!(run_str("'-'.repeat(3)"), "---");
    }

    #[test]
    fn test_string_constructor_and_length() {
        assert_eq!(run_str("String(12) + String(null)"), "12null");
        assert_eq!(run_str("'héllo'.length"), "5");
        assert_eq!(run_str("String.fromCharCode(72, 105)"), "Hi");
    }
}

// ============================================================================
// Array tests
// ============================================================================

mod array_tests {
    use super::*;

    #[test]
    fn test_push_pop_shift_unshift() {
        assert_eq!(
            run_str("var a = [2]; a.push(3, 4); a.unshift(1); a.pop(); a.shift(); a.join()"),
            "2,3"
        );
    }

    #[test]
    fn test_higher_order_methods() {
        assert_eq!(run_str("[1, 2, 3, 4].filter(n => n % 2 === 0).map(n => n * 10).join()"), "20,40");
        assert_eq!(run_str("[1, 2, 3].reduce((acc, n) => acc + n, 10)"), "16");
        assert_eq!(run_str("['a', 'bb', 'ccc'].find(s => s.length > 1)"), "bb");
        assert_eq!(run_str("['a', 'bb'].findIndex(s => s === 'zz')"), "-1");
        assert_eq!(run_str("[1, 2].some(n => n > 1) && [1, 2].every(n => n > 0)"), "true");
    }

    #[test]
    fn test_sort_is_stable_and_default_is_lexicographic() {
        assert_eq!(run_str("[10, 9, 1].sort().join()"), "1,10,9");
        assert_eq!(run_str("[10, 9, 1].sort((a, b) => a - b).join()"), "1,9,10");
        let code = "
            var items = [{ k: 1, n: 'a' }, { k: 0, n: 'b' }, { k: 1, n: 'c' }, { k: 0, n: 'd' }];
            items.sort(function (x, y) { return x.k - y.k; }).map(i => i.n).join('')
        ";
        assert_eq!(run_str(code), "bdac");
    }

    #[test]
    fn test_slice_splice_concat() {
        assert_eq!(run_str("[1, 2, 3, 4].slice(1, 3).join()"), "2,3");
        assert_eq!(run_str("var a = [1, 2, 3]; a.splice(1, 1, 'x', 'y'); a.join()"), "1,x,y,3");
        assert_eq!(run_str("[1].concat([2, 3], 4).join()"), "1,2,3,4");
    }

    #[test]
    fn test_index_of_and_includes() {
        assert_eq!(run_str("['a', 'b', 'a'].indexOf('a', 1)"), "2");
        assert_eq!(run_str("[NaN].includes(NaN)"), "true");
        assert_eq!(run_str("[NaN].indexOf(NaN)"), "-1");
    }

    #[test]
    fn test_static_helpers() {
        assert_eq!(run_str("Array.isArray([]) && !Array.isArray({})"), "true");
        assert_eq!(run_str("Array.from('abc').join('-')"), "a-b-c");
        assert_eq!(run_str("Array.from({ length: 3 }, (v, i) => i * 2).join()"), "0,2,4");
        assert_eq!(run_str("new Array(3).length"), "3");
    }

    #[test]
    fn test_flat_fill_reverse() {
        assert_eq!(run_str("[1, [2, [3]]].flat().length"), "3");
        assert_eq!(run_str("new Array(3).fill(0).join()"), "0,0,0");
        assert_eq!(run_str("[1, 2, 3].reverse().join('')"), "321");
    }
}

// ============================================================================
// Object tests
// ============================================================================

mod object_tests {
    use super::*;

    #[test]
    fn test_keys_values_entries() {
        assert_eq!(run_str("Object.keys({ a: 1, b: 2 }).join()"), "a,b");
        assert_eq!(run_str("Object.values({ a: 1, b: 2 }).join()"), "1,2");
        assert_eq!(run_str("Object.entries({ a: 1 })[0].join('=')"), "a=1");
    }

    #[test]
    fn test_assign_and_create() {
        assert_eq!(run_str("var t = Object.assign({ a: 1 }, { b: 2 }, { a: 3 }); t.a + t.b"), "5");
        assert_eq!(
            run_str("var base = { greet: function () { return 'hi'; } }; Object.create(base).greet()"),
            "hi"
        );
    }

    #[test]
    fn test_has_own_property() {
        assert_eq!(
            run_str("var o = Object.create({ inherited: 1 }); o.own = 2; [o.hasOwnProperty('own'), o.hasOwnProperty('inherited')].join()"),
            "true,false"
        );
    }

    #[test]
    fn test_from_entries_and_to_string() {
        assert_eq!(run_str("Object.fromEntries([['a', 1]]).a"), "1");
        assert_eq!(run_str("Object.prototype.toString.call([])"), "[object Array]");
    }
}

// ============================================================================
// Number and global function tests
// ============================================================================

mod number_tests {
    use super::*;

    #[test]
    fn test_parse_int_and_float() {
        assert_eq!(run_str("parseInt('42px')"), "42");
        assert_eq!(run_str("parseInt('ff', 16)"), "255");
        assert_eq!(run_str("parseInt('abc')"), "NaN");
        assert_eq!(run_str("parseFloat('3.5 lb')"), "3.5");
    }

    #[test]
    fn test_to_fixed_and_radix() {
        assert_eq!(run_str("(1.005).toFixed(1)"), "1.0");
        assert_eq!(run_str("(2).toFixed(2)"), "2.00");
        assert_eq!(run_str("(255).toString(16)"), "ff");
    }

    #[test]
    fn test_number_predicates() {
        assert_eq!(run_str("Number.isInteger(5) && !Number.isInteger(5.5)"), "true");
        assert_eq!(run_str("isNaN('x') && !Number.isNaN('x')"), "true");
        assert_eq!(run_str("isFinite('12')"), "true");
        assert_eq!(run_str("Number('  12  ') + Number('')"), "12");
    }
}

// ============================================================================
// JSON tests
// ============================================================================

mod json_tests {
    use super::*;

    #[test]
    fn test_stringify() {
        assert_eq!(run_str("JSON.stringify({ a: [1, 'x', null], b: true })"), r#"{"a":[1,"x",null],"b":true}"#);
        assert_eq!(run_str("JSON.stringify({ f: function () {}, u: undefined, n: NaN })"), r#"{"n":null}"#);
        assert_eq!(run_str("JSON.stringify([undefined])"), "[null]");
    }

    #[test]
    fn test_stringify_indent() {
        assert_eq!(run_str("JSON.stringify({ a: 1 }, null, 2)"), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_stringify_cycle_throws() {
        assert!(matches!(
            run_js("var o = {}; o.self = o; JSON.stringify(o)"),
            Err(JErrorType::TypeError(_))
        ));
    }

    #[test]
    fn test_parse() {
        assert_eq!(run_str("JSON.parse('{\"a\": [1, 2]}').a[1]"), "2");
        assert!(matches!(run_js("JSON.parse('{')"), Err(JErrorType::SyntaxError(_))));
    }

    #[test]
    fn test_round_trip_keeps_key_order() {
        assert_eq!(
            run_str("JSON.stringify(JSON.parse('{\"z\": 1, \"a\": 2}'))"),
            r#"{"z":1,"a":2}"#
        );
    }
}

// ============================================================================
// RegExp tests
// ============================================================================

mod regexp_tests {
    use super::*;

    #[test]
    fn test_literal_test_and_flags() {
        assert_eq!(run_str("/^fight/i.test('Fighter')"), "true");
        assert_eq!(run_str("/ab+c/gi.flags"), "gi");
        assert_eq!(run_str("/ab+c/gi.source"), "ab+c");
    }

    #[test]
    fn test_lookahead_is_supported() {
        assert_eq!(run_str("/^(?=.*warlock)(?=.*pact).*$/i.test('Warlock: Pact of the Blade')"), "true");
        assert_eq!(run_str("/^(?!.*wizard).*$/i.test('Wizard school')"), "false");
    }

    #[test]
    fn test_global_exec_advances() {
        let code = "
            var re = /\\d/g;
            var found = [];
            var m;
            while ((m = re.exec('a1b2c3')) !== null) found.push(m[0] + '@' + m.index);
            found.join()
        ";
        assert_eq!(run_str(code), "1@1,2@3,3@5");
    }

    #[test]
    fn test_constructor() {
        assert_eq!(run_str("new RegExp('d(\\\\d+)', 'g').test('d20')"), "true");
        assert!(matches!(run_js("new RegExp('a', 'q')"), Err(JErrorType::SyntaxError(_))));
    }
}

// ============================================================================
// Console and timer tests
// ============================================================================

mod host_tests {
    use super::*;

    #[test]
    fn test_console_is_inert() {
        assert_eq!(run_str("console.log('x', 1); console.warn('y'); 'done'"), "done");
    }

    #[test]
    fn test_timers_never_fire() {
        assert_eq!(
            run_str("var fired = false; var h = setTimeout(function () { fired = true; }, 0); clearTimeout(h); fired"),
            "false"
        );
    }

    #[test]
    fn test_function_constructor_is_disallowed() {
        assert!(matches!(run_js("new Function('return 1')"), Err(JErrorType::TypeError(_))));
    }
}
