//! Heap objects.
//!
//! Every object lives behind `Rc<RefCell<_>>` so that identity comparisons
//! and shared mutation behave as scripts expect. Own properties are kept in
//! insertion order.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::parser::ast::FunctionData;
use crate::runner::ds::env_record::Scope;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::NativeFn;

pub type JsObjectType = Rc<RefCell<JsObject>>;

pub const CLASS_OBJECT: &str = "Object";
pub const CLASS_ARRAY: &str = "Array";
pub const CLASS_FUNCTION: &str = "Function";
pub const CLASS_REGEXP: &str = "RegExp";
pub const CLASS_ERROR: &str = "Error";
pub const CLASS_STRING: &str = "String";
pub const CLASS_NUMBER: &str = "Number";
pub const CLASS_BOOLEAN: &str = "Boolean";

/// Largest length an array's dense storage may reach. Indices at or past it
/// are kept as named properties and larger `length` writes are ignored.
pub const MAX_DENSE_LENGTH: usize = 1 << 20;

pub struct JsObject {
    pub properties: IndexMap<String, JsValue>,
    pub prototype: Option<JsObjectType>,
    pub kind: ObjectKind,
    /// Built-in class whose native prototype methods this object sees.
    pub class_name: &'static str,
}

pub enum ObjectKind {
    Ordinary,
    Array(Vec<JsValue>),
    Function(FunctionObject),
    RegExp(RegExpData),
    Error,
    /// Stand-in for a host object; method reads dispatch to the owning resolver.
    HostProxy(String),
}

pub struct FunctionObject {
    pub kind: FunctionKind,
    /// The object exposed as `fn.prototype`, created on first access.
    pub prototype_property: Option<JsObjectType>,
}

pub enum FunctionKind {
    Script {
        data: Rc<FunctionData>,
        scope: Rc<Scope>,
        /// Captured `this` of an arrow function.
        this_value: Option<JsValue>,
    },
    Native {
        name: String,
        func: NativeFn,
    },
    /// A native prototype method looked up by class and name.
    Intrinsic {
        class_name: &'static str,
        method: String,
    },
    /// A function owned by a super-global resolver.
    SuperGlobal {
        object: Option<String>,
        name: String,
    },
    Bound {
        target: JsValue,
        this_value: JsValue,
        args: Vec<JsValue>,
    },
}

pub struct RegExpData {
    pub source: String,
    pub flags: String,
    /// `None` when the pattern could not be translated.
    pub matcher: Option<Rc<fancy_regex::Regex>>,
    pub last_index: usize,
}

impl RegExpData {
    pub fn new(source: &str, flags: &str) -> Self {
        RegExpData {
            source: source.to_string(),
            flags: flags.to_string(),
            matcher: compile_regexp(source, flags).map(Rc::new),
            last_index: 0,
        }
    }

    pub fn is_global(&self) -> bool {
        self.flags.contains('g')
    }
}

/// Translates a script regular expression into a `fancy_regex::Regex`.
pub fn compile_regexp(source: &str, flags: &str) -> Option<fancy_regex::Regex> {
    let mut inline = String::new();
    for (flag, rust_flag) in [('i', 'i'), ('m', 'm'), ('s', 's')] {
        if flags.contains(flag) {
            inline.push(rust_flag);
        }
    }
    let mut pattern = String::with_capacity(source.len() + 8);
    if !inline.is_empty() {
        pattern.push_str("(?");
        pattern.push_str(&inline);
        pattern.push(')');
    }
    pattern.push_str(&translate_pattern(source));
    match fancy_regex::Regex::new(&pattern) {
        Ok(r) => Some(r),
        Err(e) => {
            tracing::debug!(pattern = source, error = %e, "regular expression not supported");
            None
        }
    }
}

/// Rewrites the few script-only escapes the Rust engine spells differently.
fn translate_pattern(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('/') => out.push('/'),
                Some('u') if chars.peek().map_or(false, |c| c.is_ascii_hexdigit()) => {
                    let hex: String = chars.by_ref().take(4).collect();
                    out.push_str("\\x{");
                    out.push_str(&hex);
                    out.push('}');
                }
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push_str("\\\\"),
            },
            '[' if !in_class => {
                in_class = true;
                out.push(c);
                if chars.peek() == Some(&']') {
                    // `[]` never matches
                    chars.next();
                    out.push_str("^\\x{0}-\\x{10FFFF}]");
                    in_class = false;
                } else if chars.peek() == Some(&'^') {
                    chars.next();
                    if chars.peek() == Some(&']') {
                        // `[^]` matches anything
                        chars.next();
                        out.push_str("\\x{0}-\\x{10FFFF}]");
                        in_class = false;
                    } else {
                        out.push('^');
                    }
                }
            }
            '[' if in_class => out.push_str("\\["),
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

impl JsObject {
    pub fn new(kind: ObjectKind, prototype: Option<JsObjectType>, class_name: &'static str) -> Self {
        JsObject {
            properties: IndexMap::new(),
            prototype,
            kind,
            class_name,
        }
    }

    pub fn into_ref(self) -> JsObjectType {
        Rc::new(RefCell::new(self))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    /// Reads a property stored directly on this object.
    pub fn get_own_property(&self, key: &str) -> Option<JsValue> {
        match &self.kind {
            ObjectKind::Array(items) => {
                if key == "length" {
                    return Some(JsValue::from_i64(items.len() as i64));
                }
                if let Some(i) = dense_index(key) {
                    return items.get(i).cloned();
                }
            }
            ObjectKind::Function(f) => match key {
                "name" if !self.properties.contains_key("name") => {
                    return Some(JsValue::String(function_name(f)))
                }
                "length" if !self.properties.contains_key("length") => {
                    let length = match &f.kind {
                        FunctionKind::Script { data, .. } => data.length(),
                        _ => 0,
                    };
                    return Some(JsValue::from_i64(length as i64));
                }
                "prototype" => {
                    return f.prototype_property.as_ref().map(|p| JsValue::Object(p.clone()))
                }
                _ => {}
            },
            ObjectKind::RegExp(r) => match key {
                "source" => return Some(JsValue::String(r.source.clone())),
                "flags" => return Some(JsValue::String(r.flags.clone())),
                "global" => return Some(JsValue::Boolean(r.is_global())),
                "ignoreCase" => return Some(JsValue::Boolean(r.flags.contains('i'))),
                "multiline" => return Some(JsValue::Boolean(r.flags.contains('m'))),
                "lastIndex" => return Some(JsValue::from_i64(r.last_index as i64)),
                _ => {}
            },
            _ => {}
        }
        self.properties.get(key).cloned()
    }

    pub fn has_own_property(&self, key: &str) -> bool {
        match &self.kind {
            ObjectKind::Array(items) => {
                if key == "length" {
                    return true;
                }
                if let Some(i) = dense_index(key) {
                    return i < items.len();
                }
            }
            ObjectKind::RegExp(_) if matches!(key, "source" | "flags" | "global" | "lastIndex") => {
                return true
            }
            _ => {}
        }
        self.properties.contains_key(key)
    }

    /// Writes a property directly on this object.
    pub fn set_own_property(&mut self, key: &str, value: JsValue) {
        match &mut self.kind {
            ObjectKind::Array(items) => {
                if key == "length" {
                    if let JsValue::Number(n) = &value {
                        let len = n.as_f64();
                        if len >= 0.0 && len.fract() == 0.0 && len <= MAX_DENSE_LENGTH as f64 {
                            items.resize(len as usize, JsValue::Undefined);
                        } else {
                            tracing::debug!(length = len, "array length write ignored");
                        }
                    }
                    return;
                }
                if let Some(i) = dense_index(key) {
                    if i >= items.len() {
                        items.resize(i + 1, JsValue::Undefined);
                    }
                    items[i] = value;
                    return;
                }
            }
            ObjectKind::Function(f) if key == "prototype" => {
                if let JsValue::Object(o) = value {
                    f.prototype_property = Some(o);
                }
                return;
            }
            ObjectKind::RegExp(r) if key == "lastIndex" => {
                if let JsValue::Number(n) = &value {
                    r.last_index = n.as_f64().max(0.0) as usize;
                }
                return;
            }
            _ => {}
        }
        self.properties.insert(key.to_string(), value);
    }

    pub fn delete_own_property(&mut self, key: &str) -> bool {
        if let ObjectKind::Array(items) = &mut self.kind {
            if let Some(i) = dense_index(key) {
                if i < items.len() {
                    items[i] = JsValue::Undefined;
                }
                return true;
            }
        }
        self.properties.shift_remove(key);
        true
    }

    /// Own enumerable keys in enumeration order: array indices first, then
    /// named properties in insertion order.
    pub fn own_keys(&self) -> Vec<String> {
        let mut keys = vec![];
        if let ObjectKind::Array(items) = &self.kind {
            keys.extend((0..items.len()).map(|i| i.to_string()));
        }
        keys.extend(self.properties.keys().cloned());
        keys
    }

    /// The source text reported for a function object.
    pub fn function_source(&self) -> Option<String> {
        match &self.kind {
            ObjectKind::Function(f) => Some(match &f.kind {
                FunctionKind::Script { data, .. } => data.source.to_string(),
                _ => format!("function {}() {{ [native code] }}", function_name(f)),
            }),
            _ => None,
        }
    }

    /// Short description used in diagnostics.
    pub fn describe(&self) -> String {
        match &self.kind {
            ObjectKind::Ordinary => "[object Object]".to_string(),
            ObjectKind::Array(items) => format!("[array({})]", items.len()),
            ObjectKind::Function(f) => format!("[function {}]", function_name(f)),
            ObjectKind::RegExp(r) => format!("/{}/{}", r.source, r.flags),
            ObjectKind::Error => "[object Error]".to_string(),
            ObjectKind::HostProxy(name) => format!("[object {}]", name),
        }
    }
}

/// Releases nested objects with an explicit stack so a deep acyclic chain
/// cannot exhaust the native stack.
impl Drop for JsObject {
    fn drop(&mut self) {
        let mut pending = take_children(self);
        while let Some(value) = pending.pop() {
            if let JsValue::Object(o) = value {
                if let Ok(cell) = Rc::try_unwrap(o) {
                    let mut inner = cell.into_inner();
                    pending.append(&mut take_children(&mut inner));
                }
            }
        }
    }
}

fn take_children(object: &mut JsObject) -> Vec<JsValue> {
    let mut children: Vec<JsValue> = object.properties.drain(..).map(|(_, v)| v).collect();
    if let ObjectKind::Array(items) = &mut object.kind {
        children.append(items);
    }
    children
}

pub fn function_name(f: &FunctionObject) -> String {
    match &f.kind {
        FunctionKind::Script { data, .. } => data.name().to_string(),
        FunctionKind::Native { name, .. } => name.clone(),
        FunctionKind::Intrinsic { method, .. } => method.clone(),
        FunctionKind::SuperGlobal { name, .. } => name.clone(),
        FunctionKind::Bound { .. } => "bound".to_string(),
    }
}

/// An array index that lives in dense storage.
fn dense_index(key: &str) -> Option<usize> {
    array_index(key).filter(|&i| i < MAX_DENSE_LENGTH)
}

/// Parses a canonical array index (`"0"`, `"12"`, but not `"01"`).
pub fn array_index(key: &str) -> Option<usize> {
    let bytes = key.as_bytes();
    if bytes.is_empty() || bytes.len() > 10 || !bytes.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    key.parse::<usize>().ok()
}
