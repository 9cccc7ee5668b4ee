//! Form and document hooks.
//!
//! Scripts call these to show, hide or fill sheet fields. None of that has
//! meaning outside the host, so each hook returns a fixed neutral value.
//! `tDoc`, `app` and `event` are host collections: any member call on them
//! is answered here.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{JsObject, ObjectKind, CLASS_OBJECT};
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

use super::{StubState, StubTable};

pub const DOCUMENT: &str = "tDoc";
pub const APPLICATION: &str = "app";
pub const EVENT: &str = "event";
/// Proxy name of the object `tDoc.getField` returns. Not a valid identifier,
/// so scripts only reach it through `getField`.
pub const FIELD: &str = "tDoc.field";

const COLLECTIONS: [&str; 4] = [DOCUMENT, APPLICATION, EVENT, FIELD];

pub const SHEET_VERSION: f64 = 13.2;
pub const MIN_SHEET_VERSION: i64 = 13;
pub const VIEWER_VERSION: i64 = 20;

/// Hooks returning `undefined`.
const UNDEFINED_HOOKS: &[&str] = &[
    "Hide",
    "Show",
    "DontPrint",
    "DoPrint",
    "Editable",
    "Uneditable",
    "ReadOnly",
    "Checkbox",
    "AddString",
    "RemoveString",
    "AddTooltip",
    "PickDropdown",
    "SetProf",
    "ClassMakeMenu",
    "AddAction",
    "RemoveAction",
    "AddResistance",
    "RemoveResistance",
    "AddLanguage",
    "RemoveLanguage",
    "AddToNotes",
    "AddWeapon",
    "RemoveWeapon",
    "AddMagicItem",
    "AddFeature",
    "RemoveFeature",
    "AddToInv",
    "ApplyArmor",
    "ApplyAttackColor",
    "UpdateSheetDisplay",
    "SetStringifieds",
    "thermoM",
];

/// Hooks returning the empty string.
const EMPTY_STRING_HOOKS: &[&str] = &["What", "How", "clean", "GetFeatureChoice"];

/// Hooks returning `0`.
const ZERO_HOOKS: &[&str] = &["Value", "CurrentLevel"];

/// Hooks returning `false`.
const FALSE_HOOKS: &[&str] = &["isTemplVis", "isDisplay", "CheckRequiredVersion", "ParseClass"];

pub fn register(table: &mut StubTable) {
    for name in UNDEFINED_HOOKS {
        table.add_function(*name, returns_undefined);
    }
    for name in EMPTY_STRING_HOOKS {
        table.add_function(*name, returns_empty_string);
    }
    for name in ZERO_HOOKS {
        table.add_function(*name, returns_zero);
    }
    for name in FALSE_HOOKS {
        table.add_function(*name, returns_false);
    }
    table
        .add_function("RequiredSheetVersion", required_sheet_version)
        .add_value("IsNotImport", |_| JsValue::Boolean(true))
        .add_value("sheetVersion", |_| JsValue::from_f64(SHEET_VERSION))
        .add_value("minVer", |_| JsValue::from_i64(MIN_SHEET_VERSION));
}

fn returns_undefined(
    _state: &StubState,
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Undefined)
}

fn returns_empty_string(
    _state: &StubState,
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(String::new()))
}

fn returns_zero(
    _state: &StubState,
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::from_i64(0))
}

fn returns_false(
    _state: &StubState,
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Boolean(false))
}

/// `RequiredSheetVersion(version)`
fn required_sheet_version(
    state: &StubState,
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    if let Some(version) = args.first().filter(|v| !v.is_nullish()) {
        let version = to_string(version);
        tracing::debug!(%version, "script requires sheet version");
        state.record_sheet_version(version);
    }
    Ok(JsValue::Undefined)
}

pub fn is_collection(name: &str) -> bool {
    COLLECTIONS.contains(&name)
}

fn proxy(ctx: &EvalContext, name: &str) -> JsObject {
    JsObject::new(
        ObjectKind::HostProxy(name.to_string()),
        Some(ctx.realm.object_prototype.clone()),
        CLASS_OBJECT,
    )
}

/// Builds the stand-in for a host collection, with the data members
/// scripts read directly.
pub fn collection_object(ctx: &EvalContext, name: &str) -> JsValue {
    let mut object = proxy(ctx, name);
    match name {
        DOCUMENT => {
            let info = ctx.realm.new_object();
            {
                let mut info = info.borrow_mut();
                info.set_own_property("SheetType", JsValue::String(String::new()));
                info.set_own_property("SheetVersion", JsValue::from_f64(SHEET_VERSION));
            }
            object.set_own_property("info", JsValue::Object(info));
        }
        APPLICATION => {
            object.set_own_property("viewerVersion", JsValue::from_i64(VIEWER_VERSION));
            object.set_own_property("viewerType", JsValue::from_str("Reader"));
        }
        EVENT => {
            object.set_own_property("value", JsValue::String(String::new()));
            object.set_own_property("target", field_object(ctx, ""));
        }
        _ => return field_object(ctx, ""),
    }
    JsValue::Object(object.into_ref())
}

fn field_object(ctx: &EvalContext, field_name: &str) -> JsValue {
    let mut field = proxy(ctx, FIELD);
    field.set_own_property("name", JsValue::from_str(field_name));
    field.set_own_property("value", JsValue::String(String::new()));
    field.set_own_property("submitName", JsValue::String(String::new()));
    field.set_own_property("userName", JsValue::String(String::new()));
    field.set_own_property("readonly", JsValue::Boolean(false));
    field.set_own_property("display", JsValue::from_i64(0));
    JsValue::Object(field.into_ref())
}

/// Answers `object.method(...)` for a host collection.
pub fn call_collection_method(
    object: &str,
    method: &str,
    ctx: &mut EvalContext,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(match (object, method) {
        (DOCUMENT, "getField") => {
            let field_name = args.first().map(to_string).unwrap_or_default();
            field_object(ctx, &field_name)
        }
        (FIELD, "isBoxChecked") => JsValue::from_i64(0),
        (FIELD, "getArray") | (DOCUMENT, "getFields") => ctx.realm.new_array(vec![]),
        (APPLICATION, "alert") => JsValue::from_i64(1),
        _ => JsValue::Undefined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collections() {
        assert!(is_collection("tDoc"));
        assert!(is_collection("event"));
        assert!(!is_collection("Math"));
    }

    #[test]
    fn test_get_field_returns_field_stub() {
        let mut ctx = EvalContext::new();
        let field = call_collection_method(DOCUMENT, "getField", &mut ctx, vec![JsValue::from_str("Name")])
            .unwrap();
        let field = field.as_object().unwrap().borrow();
        assert!(matches!(&field.kind, ObjectKind::HostProxy(name) if name == FIELD));
        assert_eq!(field.get_own_property("name"), Some(JsValue::from_str("Name")));
        assert_eq!(field.get_own_property("value"), Some(JsValue::from_str("")));
    }

    #[test]
    fn test_unknown_member_call_is_inert() {
        let mut ctx = EvalContext::new();
        let result = call_collection_method(DOCUMENT, "resetForm", &mut ctx, vec![]).unwrap();
        assert_eq!(result, JsValue::Undefined);
    }
}
