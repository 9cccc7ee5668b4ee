//! The intrinsic prototype objects every new object links to.
//!
//! Native methods are not stored on these objects; they are found through
//! the built-in registry by class name. Scripts may still add their own
//! properties to a prototype, and those are seen by every instance.

use std::rc::Rc;

use crate::runner::ds::object::{
    FunctionKind, FunctionObject, JsObject, JsObjectType, ObjectKind, RegExpData, CLASS_ARRAY,
    CLASS_BOOLEAN, CLASS_ERROR, CLASS_FUNCTION, CLASS_NUMBER, CLASS_OBJECT, CLASS_REGEXP,
    CLASS_STRING,
};
use crate::runner::ds::value::JsValue;

pub struct CodeRealm {
    pub object_prototype: JsObjectType,
    pub function_prototype: JsObjectType,
    pub array_prototype: JsObjectType,
    pub string_prototype: JsObjectType,
    pub number_prototype: JsObjectType,
    pub boolean_prototype: JsObjectType,
    pub regexp_prototype: JsObjectType,
    pub error_prototype: JsObjectType,
}

impl CodeRealm {
    pub fn new() -> Self {
        let object_prototype = JsObject::new(ObjectKind::Ordinary, None, CLASS_OBJECT).into_ref();
        let derived = |class_name: &'static str| {
            JsObject::new(
                ObjectKind::Ordinary,
                Some(object_prototype.clone()),
                class_name,
            )
            .into_ref()
        };
        CodeRealm {
            function_prototype: derived(CLASS_FUNCTION),
            array_prototype: derived(CLASS_ARRAY),
            string_prototype: derived(CLASS_STRING),
            number_prototype: derived(CLASS_NUMBER),
            boolean_prototype: derived(CLASS_BOOLEAN),
            regexp_prototype: derived(CLASS_REGEXP),
            error_prototype: derived(CLASS_ERROR),
            object_prototype,
        }
    }

    /// The prototype object a built-in constructor exposes as `.prototype`.
    pub fn prototype_for(&self, class_name: &str) -> Option<JsObjectType> {
        Some(
            match class_name {
                CLASS_OBJECT => &self.object_prototype,
                CLASS_FUNCTION => &self.function_prototype,
                CLASS_ARRAY => &self.array_prototype,
                CLASS_STRING => &self.string_prototype,
                CLASS_NUMBER => &self.number_prototype,
                CLASS_BOOLEAN => &self.boolean_prototype,
                CLASS_REGEXP => &self.regexp_prototype,
                "Error" | "TypeError" | "RangeError" | "ReferenceError" | "SyntaxError" => {
                    &self.error_prototype
                }
                _ => return None,
            }
            .clone(),
        )
    }

    pub fn new_object(&self) -> JsObjectType {
        JsObject::new(
            ObjectKind::Ordinary,
            Some(self.object_prototype.clone()),
            CLASS_OBJECT,
        )
        .into_ref()
    }

    pub fn new_object_value(&self) -> JsValue {
        JsValue::Object(self.new_object())
    }

    pub fn new_array(&self, items: Vec<JsValue>) -> JsValue {
        JsValue::Object(
            JsObject::new(
                ObjectKind::Array(items),
                Some(self.array_prototype.clone()),
                CLASS_ARRAY,
            )
            .into_ref(),
        )
    }

    pub fn new_function(&self, kind: FunctionKind) -> JsValue {
        JsValue::Object(
            JsObject::new(
                ObjectKind::Function(FunctionObject {
                    kind,
                    prototype_property: None,
                }),
                Some(self.function_prototype.clone()),
                CLASS_FUNCTION,
            )
            .into_ref(),
        )
    }

    pub fn new_regexp(&self, source: &str, flags: &str) -> JsValue {
        JsValue::Object(
            JsObject::new(
                ObjectKind::RegExp(RegExpData::new(source, flags)),
                Some(self.regexp_prototype.clone()),
                CLASS_REGEXP,
            )
            .into_ref(),
        )
    }

    pub fn new_error(&self, name: &str, message: &str) -> JsValue {
        let mut error = JsObject::new(
            ObjectKind::Error,
            Some(self.error_prototype.clone()),
            CLASS_ERROR,
        );
        error
            .properties
            .insert("name".to_string(), JsValue::String(name.to_string()));
        error
            .properties
            .insert("message".to_string(), JsValue::String(message.to_string()));
        JsValue::Object(error.into_ref())
    }

    /// Whether `object` is one of the intrinsic prototypes.
    pub fn is_intrinsic_prototype(&self, object: &JsObjectType) -> bool {
        [
            &self.object_prototype,
            &self.function_prototype,
            &self.array_prototype,
            &self.string_prototype,
            &self.number_prototype,
            &self.boolean_prototype,
            &self.regexp_prototype,
            &self.error_prototype,
        ]
        .iter()
        .any(|p| Rc::ptr_eq(p, object))
    }
}

impl Default for CodeRealm {
    fn default() -> Self {
        Self::new()
    }
}
