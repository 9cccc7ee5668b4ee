//! Host API stub layer.
//!
//! Content scripts were written against a character-sheet host that offers
//! hundreds of global helpers. This layer answers every name they reach for
//! with an inert stand-in, so a script runs to completion and leaves its data
//! in the registries. Stubs live in the super-global scope: a script that
//! defines a helper of the same name shadows the stub.
//!
//! The layer has two parts. Native stubs are resolved through
//! [`HostStubResolver`]; a short script, [`HOST_PRELUDE`], runs once before
//! the first content file and defines the static reference data that is
//! easier to express in script form.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::harness::registry::{RegistryKind, RegistrySet};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

pub mod form;
pub mod linking;
mod resolver;
pub mod tables;
pub mod text;
pub mod utility;

pub use resolver::HostStubResolver;

/// Script run once before the first content file.
pub const HOST_PRELUDE: &str = include_str!("host_prelude.js");

/// Label the prelude is parsed and logged under.
pub const HOST_PRELUDE_LABEL: &str = "<host prelude>";

/// What a stub sees besides its arguments.
pub struct StubState {
    registries: Rc<RegistrySet>,
    requested_sheet_version: RefCell<Option<String>>,
}

impl StubState {
    pub fn new(registries: Rc<RegistrySet>) -> Self {
        StubState {
            registries,
            requested_sheet_version: RefCell::new(None),
        }
    }

    /// The registry object scripts currently see for `kind`.
    pub fn registry(&self, ctx: &EvalContext, kind: RegistryKind) -> JsObjectType {
        self.registries.live(ctx, kind)
    }

    /// The last version passed to `RequiredSheetVersion`, if any.
    pub fn requested_sheet_version(&self) -> Option<String> {
        self.requested_sheet_version.borrow().clone()
    }

    pub(crate) fn record_sheet_version(&self, version: String) {
        *self.requested_sheet_version.borrow_mut() = Some(version);
    }
}

/// A native stub. Receives the shared stub state, the script `this` and the
/// call arguments.
pub type StubFn =
    fn(&StubState, &mut EvalContext, JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType>;

/// Builds the value of a stubbed global constant or collection.
pub type StubValueFn = fn(&EvalContext) -> JsValue;

/// Name tables the stub modules fill in.
#[derive(Default)]
pub struct StubTable {
    functions: HashMap<&'static str, StubFn>,
    values: HashMap<&'static str, StubValueFn>,
}

impl StubTable {
    pub fn add_function(&mut self, name: &'static str, func: StubFn) -> &mut Self {
        self.functions.insert(name, func);
        self
    }

    pub fn add_value(&mut self, name: &'static str, build: StubValueFn) -> &mut Self {
        self.values.insert(name, build);
        self
    }

    pub fn function(&self, name: &str) -> Option<StubFn> {
        self.functions.get(name).copied()
    }

    pub fn value(&self, name: &str) -> Option<StubValueFn> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name) || self.values.contains_key(name)
    }

    /// Names of the stubbed constants and tables.
    pub fn value_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    /// Every stubbed global name, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .functions
            .keys()
            .chain(self.values.keys())
            .copied()
            .collect();
        names.sort_unstable();
        names
    }
}

/// The full stub surface.
pub fn stub_table() -> StubTable {
    let mut table = StubTable::default();
    text::register(&mut table);
    tables::register(&mut table);
    linking::register(&mut table);
    utility::register(&mut table);
    form::register(&mut table);
    table
}
