//! Projection of script values onto JSON.
//!
//! Any value graph a script leaves behind can be turned into a
//! `serde_json::Value`. Values JSON cannot express get a tagged encoding:
//!
//! | Script value        | JSON                                              |
//! |---------------------|---------------------------------------------------|
//! | `undefined`         | property omitted, `null` in an array slot         |
//! | `NaN`, `±Infinity`  | `null`                                            |
//! | function            | `{"_type": "function", "body": "<source text>"}`  |
//! | regular expression  | `{"_type": "RegExp", "source": "..", "flags": ".."}` |
//! | ancestor reference  | `"[Circular]"`                                    |
//!
//! Functions are never called.

use std::rc::Rc;

use serde_json::{json, Map, Number, Value};

use crate::runner::ds::object::{JsObject, JsObjectType, ObjectKind};
use crate::runner::ds::value::{JsNumberType, JsValue};

pub const DEFAULT_MAX_DEPTH: usize = 40;
pub const CIRCULAR_MARKER: &str = "[Circular]";
pub const TYPE_TAG: &str = "_type";
pub const KEY_FIELD: &str = "_key";
pub const VALUE_FIELD: &str = "_value";

/// Largest magnitude below which an integral float is emitted as an integer.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

#[derive(Debug, Clone, Copy)]
pub struct GraphSerializer {
    max_depth: usize,
}

impl Default for GraphSerializer {
    fn default() -> Self {
        GraphSerializer::new(DEFAULT_MAX_DEPTH)
    }
}

impl GraphSerializer {
    /// Subtrees nested deeper than `max_depth` serialize as `null`.
    pub fn new(max_depth: usize) -> Self {
        GraphSerializer { max_depth }
    }

    pub fn serialize(&self, value: &JsValue) -> Value {
        let mut walk = Walk {
            max_depth: self.max_depth,
            ancestors: vec![],
        };
        walk.value(value, 0).unwrap_or(Value::Null)
    }

    /// Turns a registry into its output document: one record per key, in
    /// key insertion order.
    ///
    /// A mapping record gets `_key` merged in. Anything else is wrapped as
    /// `{"_key": .., "_value": ..}`. A reference back to the registry itself
    /// counts as circular.
    pub fn registry_document(&self, registry: &JsObjectType) -> Vec<Value> {
        let entries: Vec<(String, JsValue)> = {
            let registry = registry.borrow();
            registry
                .own_keys()
                .into_iter()
                .filter_map(|key| registry.get_own_property(&key).map(|value| (key, value)))
                .collect()
        };
        entries
            .into_iter()
            .map(|(key, value)| {
                let mut walk = Walk {
                    max_depth: self.max_depth,
                    ancestors: vec![registry.clone()],
                };
                let serialized = walk.value(&value, 0).unwrap_or(Value::Null);
                keyed_record(key, serialized)
            })
            .collect()
    }
}

fn keyed_record(key: String, serialized: Value) -> Value {
    match serialized {
        Value::Object(mut fields) => {
            fields.insert(KEY_FIELD.to_string(), Value::String(key));
            Value::Object(fields)
        }
        other => {
            let mut fields = Map::new();
            fields.insert(KEY_FIELD.to_string(), Value::String(key));
            fields.insert(VALUE_FIELD.to_string(), other);
            Value::Object(fields)
        }
    }
}

pub fn number_value(n: &JsNumberType) -> Value {
    match n {
        JsNumberType::Integer(i) => Value::Number((*i).into()),
        JsNumberType::Float(f) if f.fract() == 0.0 && f.abs() < I64_LIMIT => {
            Value::Number((*f as i64).into())
        }
        JsNumberType::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        JsNumberType::NaN | JsNumberType::PositiveInfinity | JsNumberType::NegativeInfinity => {
            Value::Null
        }
    }
}

/// State of one serialization call.
struct Walk {
    max_depth: usize,
    /// Objects on the path from the root to the value being visited.
    ancestors: Vec<JsObjectType>,
}

impl Walk {
    /// `None` stands for `undefined`, which the caller omits or nulls.
    fn value(&mut self, value: &JsValue, depth: usize) -> Option<Value> {
        if depth > self.max_depth {
            return Some(Value::Null);
        }
        Some(match value {
            JsValue::Undefined => return None,
            JsValue::Null => Value::Null,
            JsValue::Boolean(b) => Value::Bool(*b),
            JsValue::String(s) => Value::String(s.clone()),
            JsValue::Number(n) => number_value(n),
            JsValue::Object(o) => self.object(o, depth),
        })
    }

    fn object(&mut self, object: &JsObjectType, depth: usize) -> Value {
        if self.ancestors.iter().any(|a| Rc::ptr_eq(a, object)) {
            return Value::String(CIRCULAR_MARKER.to_string());
        }
        if let Some(leaf) = leaf_encoding(&object.borrow()) {
            return leaf;
        }

        let (items, entries) = {
            let o = object.borrow();
            match &o.kind {
                ObjectKind::Array(items) => (Some(items.clone()), vec![]),
                _ => (
                    None,
                    o.properties
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect::<Vec<_>>(),
                ),
            }
        };

        self.ancestors.push(object.clone());
        let result = match items {
            Some(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.value(item, depth + 1).unwrap_or(Value::Null))
                    .collect(),
            ),
            None => {
                let mut fields = Map::new();
                for (key, item) in entries {
                    if let Some(v) = self.value(&item, depth + 1) {
                        fields.insert(key, v);
                    }
                }
                Value::Object(fields)
            }
        };
        self.ancestors.pop();
        result
    }
}

/// Tagged encodings for objects that are not walked into.
fn leaf_encoding(object: &JsObject) -> Option<Value> {
    match &object.kind {
        ObjectKind::Function(_) => Some(json!({
            "_type": "function",
            "body": object.function_source().unwrap_or_default(),
        })),
        ObjectKind::RegExp(r) => Some(json!({
            "_type": "RegExp",
            "source": r.source,
            "flags": r.flags,
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::plugin::types::EvalContext;

    #[test]
    fn test_non_finite_numbers_are_null() {
        let s = GraphSerializer::default();
        assert_eq!(s.serialize(&JsValue::from_f64(f64::NAN)), Value::Null);
        assert_eq!(s.serialize(&JsValue::from_f64(f64::INFINITY)), Value::Null);
        assert_eq!(s.serialize(&JsValue::from_f64(f64::NEG_INFINITY)), Value::Null);
        assert_eq!(s.serialize(&JsValue::from_f64(2.5)), json!(2.5));
        assert_eq!(number_value(&JsNumberType::Float(1e17)), json!(100_000_000_000_000_000i64));
    }

    #[test]
    fn test_self_reference_is_circular() {
        let ctx = EvalContext::new();
        let x = ctx.realm.new_object();
        x.borrow_mut().set_own_property("self", JsValue::Object(x.clone()));
        x.borrow_mut().set_own_property("n", JsValue::from_i64(1));
        let s = GraphSerializer::default();
        assert_eq!(
            s.serialize(&JsValue::Object(x)),
            json!({"self": CIRCULAR_MARKER, "n": 1})
        );
    }

    #[test]
    fn test_shared_non_ancestor_is_repeated() {
        let ctx = EvalContext::new();
        let shared = ctx.realm.new_object_value();
        let root = ctx.realm.new_object();
        root.borrow_mut().set_own_property("a", shared.clone());
        root.borrow_mut().set_own_property("b", shared);
        let s = GraphSerializer::default();
        assert_eq!(s.serialize(&JsValue::Object(root)), json!({"a": {}, "b": {}}));
    }

    #[test]
    fn test_regexp_and_undefined() {
        let ctx = EvalContext::new();
        let root = ctx.realm.new_object();
        root.borrow_mut().set_own_property("re", ctx.realm.new_regexp("ab+c", "gi"));
        root.borrow_mut().set_own_property("gone", JsValue::Undefined);
        root.borrow_mut().set_own_property(
            "list",
            ctx.realm.new_array(vec![JsValue::Undefined, JsValue::from_i64(2)]),
        );
        let s = GraphSerializer::default();
        assert_eq!(
            s.serialize(&JsValue::Object(root)),
            json!({
                "re": {"_type": "RegExp", "source": "ab+c", "flags": "gi"},
                "list": [null, 2]
            })
        );
    }

    #[test]
    fn test_depth_ceiling() {
        let ctx = EvalContext::new();
        let leaf = ctx.realm.new_array(vec![JsValue::from_i64(1)]);
        let middle = ctx.realm.new_array(vec![leaf]);
        let root = ctx.realm.new_array(vec![middle]);
        assert_eq!(GraphSerializer::new(1).serialize(&root), json!([[null]]));
        assert_eq!(GraphSerializer::new(3).serialize(&root), json!([[[1]]]));
    }

    #[test]
    fn test_registry_document_keys_and_wrapping() {
        let ctx = EvalContext::new();
        let registry = ctx.realm.new_object();
        let entry = ctx.realm.new_object();
        entry.borrow_mut().set_own_property("_key", JsValue::from_str("stale"));
        entry.borrow_mut().set_own_property("name", JsValue::from_str("Rope"));
        registry.borrow_mut().set_own_property("rope", JsValue::Object(entry));
        registry.borrow_mut().set_own_property("count", JsValue::from_i64(3));
        registry
            .borrow_mut()
            .set_own_property("list", ctx.realm.new_array(vec![JsValue::from_i64(1)]));
        registry
            .borrow_mut()
            .set_own_property("back", JsValue::Object(registry.clone()));

        let document = GraphSerializer::default().registry_document(&registry);
        assert_eq!(
            Value::Array(document),
            json!([
                {"_key": "rope", "name": "Rope"},
                {"_key": "count", "_value": 3},
                {"_key": "list", "_value": [1]},
                {"_key": "back", "_value": CIRCULAR_MARKER}
            ])
        );
    }
}
