use std::rc::Rc;

use crate::harness::registry::RegistrySet;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::FunctionKind;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::resolver::PluginResolver;
use crate::runner::plugin::types::EvalContext;

use super::{form, stub_table, StubState, StubTable};

/// Serves the stubbed host surface through the super-global scope.
///
/// A stub never raises a catchable error: a failure inside a stub is logged
/// and the call yields `undefined`. Interruption still propagates.
pub struct HostStubResolver {
    state: StubState,
    table: StubTable,
}

impl HostStubResolver {
    pub fn new(registries: Rc<RegistrySet>) -> Self {
        HostStubResolver {
            state: StubState::new(registries),
            table: stub_table(),
        }
    }

    pub fn state(&self) -> &StubState {
        &self.state
    }

    pub(crate) fn table(&self) -> &StubTable {
        &self.table
    }
}

fn neutralize(name: &str, result: Result<JsValue, JErrorType>) -> Result<JsValue, JErrorType> {
    match result {
        Err(error) if error.is_catchable() => {
            tracing::debug!(stub = name, %error, "stub failed; returning undefined");
            Ok(JsValue::Undefined)
        }
        other => other,
    }
}

impl PluginResolver for HostStubResolver {
    fn has_binding(&self, name: &str) -> bool {
        self.table.contains(name) || form::is_collection(name)
    }

    fn resolve(&self, name: &str, ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
        if let Some(build) = self.table.value(name) {
            return Ok(build(ctx));
        }
        if self.table.function(name).is_some() {
            return Ok(ctx.realm.new_function(FunctionKind::SuperGlobal {
                object: None,
                name: name.to_string(),
            }));
        }
        if form::is_collection(name) {
            return Ok(form::collection_object(ctx, name));
        }
        Err(JErrorType::ReferenceError(format!("{} is not defined", name)))
    }

    fn has_method(&self, object: &str, _method: &str) -> bool {
        form::is_collection(object)
    }

    fn call_method(
        &self,
        object: &str,
        method: &str,
        ctx: &mut EvalContext,
        _this: JsValue,
        args: Vec<JsValue>,
    ) -> Option<Result<JsValue, JErrorType>> {
        if !form::is_collection(object) {
            return None;
        }
        Some(neutralize(
            method,
            form::call_collection_method(object, method, ctx, args),
        ))
    }

    fn call_function(
        &self,
        name: &str,
        ctx: &mut EvalContext,
        this: JsValue,
        args: Vec<JsValue>,
    ) -> Option<Result<JsValue, JErrorType>> {
        let stub = self.table.function(name)?;
        Some(neutralize(name, stub(&self.state, ctx, this, args)))
    }

    fn call_constructor(
        &self,
        name: &str,
        ctx: &mut EvalContext,
        args: Vec<JsValue>,
    ) -> Option<Result<JsValue, JErrorType>> {
        self.call_function(name, ctx, JsValue::Undefined, args)
    }

    fn name(&self) -> &str {
        "host-stubs"
    }
}
