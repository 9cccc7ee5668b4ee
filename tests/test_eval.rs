//! Integration tests for the interpreter.
//!
//! These tests parse script source and execute it end to end against a
//! context with the core built-ins installed.

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

/// Runs `code` in a fresh context and returns the last expression value.
fn run_js(code: &str) -> Result<JsValue, JErrorType> {
    let mut ctx = new_ctx();
    let program = JsParser::parse_to_ast_from_str(code)?;
    execute_program(&program, &mut ctx)
}

/// Runs `code` and renders the result with ToString.
fn run_str(code: &str) -> String {
    match run_js(code) {
        Ok(value) => to_string(&value),
        Err(e) => panic!("script failed: {}\n{}", e, code),
    }
}

fn run_err(code: &str) -> JErrorType {
    match run_js(code) {
        Ok(value) => panic!("expected an error, got {:?}", value),
        Err(e) => e,
    }
}

// ============================================================================
// Arithmetic and operators
// ============================================================================

#[test]
fn test_simple_addition() {
    assert_eq!(run_js("1 + 2").unwrap(), JsValue::Number(JsNumberType::Integer(3)));
}

#[test]
fn test_operator_precedence() {
    assert_eq!(run_str("2 + 3 * 4 - 10 / 5"), "12");
    assert_eq!(run_str("2 ** 3 ** 2"), "512");
    assert_eq!(run_str("(2 + 3) * 4"), "20");
}

#[test]
fn test_string_concatenation_and_coercion() {
    assert_eq!(run_str("'a' + 1 + 2"), "a12");
    assert_eq!(run_str("1 + 2 + 'a'"), "3a");
    assert_eq!(run_str("'3' * '4'"), "12");
}

#[test]
fn test_float_formatting() {
    assert_eq!(run_str("0.1 + 0.2"), "0.30000000000000004");
    assert_eq!(run_str("1 / 0"), "Infinity");
    assert_eq!(run_str("0 / 0"), "NaN");
}

#[test]
fn test_equality() {
    assert_eq!(run_str("1 == '1'"), "true");
    assert_eq!(run_str("1 === '1'"), "false");
    assert_eq!(run_str("null == undefined"), "true");
    assert_eq!(run_str("null === undefined"), "false");
    assert_eq!(run_str("NaN == NaN"), "false");
}

#[test]
fn test_logical_and_nullish() {
    assert_eq!(run_str("0 || 'fallback'"), "fallback");
    assert_eq!(run_str("0 ?? 'fallback'"), "0");
    assert_eq!(run_str("null ?? 'fallback'"), "fallback");
    assert_eq!(run_str("'a' && 'b'"), "b");
}

#[test]
fn test_typeof() {
    assert_eq!(run_str("typeof undeclaredName"), "undefined");
    assert_eq!(run_str("typeof null"), "object");
    assert_eq!(run_str("typeof function () {}"), "function");
    assert_eq!(run_str("typeof []"), "object");
    assert_eq!(run_str("typeof 'x'"), "string");
}

#[test]
fn test_update_and_compound_assignment() {
    assert_eq!(run_str("var i = 1; i++; i += 5; i *= 2; i"), "14");
    assert_eq!(run_str("var s = 'a'; s += 'b'; s"), "ab");
    assert_eq!(run_str("var o = { n: 1 }; o.n++; ++o.n; o.n"), "3");
}

#[test]
fn test_conditional_operator() {
    assert_eq!(run_str("var x = 5; x > 3 ? 'big' : 'small'"), "big");
}

// ============================================================================
// Declarations and scoping
// ============================================================================

#[test]
fn test_function_hoisting() {
    assert_eq!(run_str("var r = twice(4); function twice(n) { return n * 2; } r"), "8");
}

#[test]
fn test_var_hoisting_is_undefined() {
    assert_eq!(run_str("var seen = typeof later; var later = 1; seen"), "undefined");
}

#[test]
fn test_let_is_block_scoped() {
    assert_eq!(run_str("var x = 1; { let x = 2; } x"), "1");
    assert_eq!(run_str("var out = []; for (let i = 0; i < 3; i++) { out.push(i); } out.join('')"), "012");
}

#[test]
fn test_closures_capture_scope() {
    let code = "
        function counter() {
            var count = 0;
            return function () { count += 1; return count; };
        }
        var next = counter();
        next(); next();
        next()
    ";
    assert_eq!(run_str(code), "3");
}

#[test]
fn test_arrow_functions_and_this() {
    let code = "
        var obj = {
            factor: 3,
            scale: function (list) { return list.map(x => x * this.factor); }
        };
        obj.scale([1, 2]).join(',')
    ";
    assert_eq!(run_str(code), "3,6");
}

#[test]
fn test_default_and_rest_parameters() {
    assert_eq!(run_str("function f(a, b = 10) { return a + b; } f(1)"), "11");
    assert_eq!(run_str("function g(first, ...rest) { return rest.length; } g(1, 2, 3)"), "2");
}

#[test]
fn test_arguments_object() {
    assert_eq!(run_str("function f() { return arguments.length; } f(1, 2, 3)"), "3");
}

// ============================================================================
// Objects and arrays
// ============================================================================

#[test]
fn test_object_literal_forms() {
    let code = "
        var key = 'dyn';
        var short = 1;
        var o = { plain: 1, 'quoted key': 2, 3: 'three', [key + 'amic']: 4, short, method() { return 5; } };
        [o.plain, o['quoted key'], o[3], o.dynamic, o.short, o.method()].join(',')
    ";
    assert_eq!(run_str(code), "1,2,three,4,1,5");
}

#[test]
fn test_object_spread_and_array_spread() {
    assert_eq!(run_str("var a = { x: 1 }; var b = { ...a, y: 2 }; b.x + b.y"), "3");
    assert_eq!(run_str("var a = [1, 2]; [0, ...a, 3].join('')"), "0123");
}

#[test]
fn test_property_order_is_insertion_order() {
    assert_eq!(run_str("var o = { b: 1, a: 2 }; o.c = 3; Object.keys(o).join(',')"), "b,a,c");
}

#[test]
fn test_array_holes_and_length() {
    assert_eq!(run_str("var a = [1, , 3]; a.length"), "3");
    assert_eq!(run_str("var a = []; a[4] = 'x'; a.length"), "5");
}

#[test]
fn test_far_array_index_is_a_named_property() {
    assert_eq!(run_str("var a = []; a[4000000000] = 1; [a.length, a[4000000000]].join(',')"), "0,1");
    assert_eq!(run_str("var a = [1, 2]; a.length = 4000000000; a.length"), "2");
    assert_eq!(run_str("var a = [1, 2, 3]; a.length = 1; a.join(',')"), "1");
}

#[test]
fn test_oversized_growth_is_catchable() {
    let code = "
        var caught = [];
        try { 'ab'.repeat(1e12); } catch (e) { caught.push(e instanceof RangeError); }
        try { new Array(4e9); } catch (e) { caught.push(e.message); }
        caught.join(' ')
    ";
    assert_eq!(run_str(code), "true Invalid array length");
}

#[test]
fn test_delete_and_in() {
    assert_eq!(run_str("var o = { a: 1 }; delete o.a; 'a' in o"), "false");
    assert_eq!(run_str("var o = { a: 1 }; 'a' in o"), "true");
}

#[test]
fn test_constructors_and_prototypes() {
    let code = "
        function Weapon(name) { this.name = name; }
        Weapon.prototype.describe = function () { return 'weapon: ' + this.name; };
        var w = new Weapon('dagger');
        [w.describe(), w instanceof Weapon].join(' ')
    ";
    assert_eq!(run_str(code), "weapon: dagger true");
}

#[test]
fn test_user_additions_to_builtin_prototypes() {
    let code = "
        String.prototype.capitalize = function () {
            return this.charAt(0).toUpperCase() + this.slice(1);
        };
        Array.prototype.last = function () { return this[this.length - 1]; };
        'fighter'.capitalize() + [1, 2, 3].last()
    ";
    assert_eq!(run_str(code), "Fighter3");
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_loops() {
    assert_eq!(run_str("var s = 0; for (var i = 1; i <= 10; i++) s += i; s"), "55");
    assert_eq!(run_str("var n = 0; while (n < 5) n++; n"), "5");
    assert_eq!(run_str("var n = 0; do { n++; } while (n < 0); n"), "1");
}

#[test]
fn test_break_and_continue() {
    let code = "
        var out = [];
        for (var i = 0; i < 10; i++) {
            if (i % 2) continue;
            if (i > 6) break;
            out.push(i);
        }
        out.join(',')
    ";
    assert_eq!(run_str(code), "0,2,4,6");
}

#[test]
fn test_for_in_and_for_of() {
    assert_eq!(run_str("var keys = []; for (var k in { a: 1, b: 2 }) keys.push(k); keys.join('')"), "ab");
    assert_eq!(run_str("var sum = 0; for (var v of [1, 2, 3]) sum += v; sum"), "6");
    assert_eq!(run_str("var chars = []; for (const c of 'abc') chars.push(c); chars.join('-')"), "a-b-c");
}

#[test]
fn test_switch_with_fallthrough() {
    let code = "
        function size(s) {
            var out = '';
            switch (s) {
                case 'tiny':
                case 'small':
                    out = 'S';
                    break;
                case 'medium':
                    out = 'M';
                    break;
                default:
                    out = '?';
            }
            return out;
        }
        size('tiny') + size('medium') + size('huge')
    ";
    assert_eq!(run_str(code), "SM?");
}

#[test]
fn test_template_literals() {
    assert_eq!(run_str("var n = 3; `level ${n + 1} of ${'twenty'}`"), "level 4 of twenty");
}

// ============================================================================
// Exceptions
// ============================================================================

#[test]
fn test_try_catch_finally() {
    let code = "
        var log = [];
        try {
            log.push('try');
            throw new Error('boom');
        } catch (e) {
            log.push(e.message);
        } finally {
            log.push('finally');
        }
        log.join(',')
    ";
    assert_eq!(run_str(code), "try,boom,finally");
}

#[test]
fn test_engine_errors_are_catchable() {
    let code = "
        var names = [];
        try { null.x; } catch (e) { names.push(e.name); }
        try { missing(); } catch (e) { names.push(e.name); }
        names.join(',')
    ";
    assert_eq!(run_str(code), "TypeError,ReferenceError");
}

#[test]
fn test_uncaught_errors() {
    assert!(matches!(run_err("undefinedFunction()"), JErrorType::ReferenceError(_)));
    assert!(matches!(run_err("var x = 1; x()"), JErrorType::TypeError(_)));
    assert!(matches!(run_err("throw 'plain'"), JErrorType::Thrown(_)));
    assert_eq!(run_err("throw new TypeError('bad')").to_string(), "TypeError: bad");
}

#[test]
fn test_syntax_error() {
    assert!(matches!(run_err("var = ;"), JErrorType::SyntaxError(_)));
}

#[test]
fn test_deep_recursion_is_range_error() {
    let mut ctx = new_ctx();
    ctx.set_max_call_depth(50);
    let program = JsParser::parse_to_ast_from_str("function f(n) { return f(n + 1); } f(0)").unwrap();
    let result = execute_program(&program, &mut ctx);
    assert!(matches!(result, Err(JErrorType::RangeError(_))));
}

#[test]
fn test_timeout_is_not_catchable() {
    let mut ctx = new_ctx();
    ctx.set_execution_limit(Some(std::time::Duration::from_millis(50)));
    let program = JsParser::parse_to_ast_from_str(
        "var caught = false; try { for (;;) {} } catch (e) { caught = true; }",
    )
    .unwrap();
    let result = execute_program(&program, &mut ctx);
    assert!(matches!(result, Err(JErrorType::Interrupted(_))));
    assert!(!result.unwrap_err().is_catchable());
}

// ============================================================================
// Function source text
// ============================================================================

#[test]
fn test_function_keeps_source_text() {
    let code = "var f = function (a, b) { return a + b; /* sum */ }; f.toString()";
    assert_eq!(run_str(code), "function (a, b) { return a + b; /* sum */ }");
    assert_eq!(run_str("var g = x => x * 2; '' + g"), "x => x * 2");
}
