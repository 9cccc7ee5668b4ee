//! The sandbox content files execute in.

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use crate::harness::error::{HarnessError, Result};
use crate::harness::registry::{RegistryKind, RegistrySet};
use crate::harness::stubs::{HostStubResolver, HOST_PRELUDE, HOST_PRELUDE_LABEL};
use crate::parser::JsParser;
use crate::runner::ds::object::JsObjectType;
use crate::runner::eval::execute_program;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::EvalContext;

/// One content file: a label for reporting and its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSource {
    pub label: String,
    pub source: String,
}

impl ScriptSource {
    pub fn new(label: impl Into<String>, source: impl Into<String>) -> Self {
        ScriptSource {
            label: label.into(),
            source: source.into(),
        }
    }

    /// Reads a file, labelling it with its file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| HarnessError::ReadScript {
            path: path.to_path_buf(),
            source,
        })?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(ScriptSource { label, source })
    }
}

/// Settings that shape one sandbox.
#[derive(Debug, Clone, Copy)]
pub struct SandboxOptions {
    /// Wall-clock budget per file; `None` for no limit.
    pub timeout: Option<Duration>,
    pub max_call_depth: usize,
}

impl Default for SandboxOptions {
    fn default() -> Self {
        SandboxOptions {
            timeout: Some(Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS)),
            max_call_depth: crate::config::DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// A persistent global scope seeded with the standard library, the
/// registries and the host stubs.
///
/// Every file of a run executes against the same context, in order, so a
/// helper one file defines is visible to the files after it.
pub struct ExtractionContext {
    ctx: EvalContext,
    registries: Rc<RegistrySet>,
    stubs: Rc<HostStubResolver>,
    options: SandboxOptions,
}

impl ExtractionContext {
    pub fn new(options: SandboxOptions) -> Result<Self> {
        let mut ctx = EvalContext::new();
        ctx.install_core_builtins(BuiltInRegistry::with_core());
        ctx.set_max_call_depth(options.max_call_depth);
        let registries = Rc::new(RegistrySet::install(&mut ctx));
        let stubs = Rc::new(HostStubResolver::new(registries.clone()));
        ctx.add_resolver(stubs.clone());

        let mut context = ExtractionContext {
            ctx,
            registries,
            stubs,
            options,
        };
        context
            .execute(HOST_PRELUDE_LABEL, HOST_PRELUDE)
            .map_err(HarnessError::Prelude)?;
        tracing::trace!("host prelude installed");
        Ok(context)
    }

    /// Runs one file to completion or to its first uncaught error.
    ///
    /// On failure the message reads `"<ErrorKind>: <message>"`. Registry
    /// writes made before the failure are kept. Stubbed tables start each
    /// file as fresh copies.
    pub fn run_script(&mut self, script: &ScriptSource) -> std::result::Result<(), String> {
        for name in self.stubs.table().value_names() {
            self.ctx.forget_super_global(name);
        }
        self.execute(&script.label, &script.source)
    }

    fn execute(&mut self, label: &str, source: &str) -> std::result::Result<(), String> {
        let program = JsParser::parse_to_ast_from_str(source).map_err(|e| e.to_string())?;
        self.ctx.set_execution_limit(self.options.timeout);
        let result = execute_program(&program, &mut self.ctx);
        self.ctx.set_execution_limit(None);
        self.ctx.reset_execution_state();
        match result {
            Ok(_) => Ok(()),
            Err(error) => {
                tracing::trace!(file = label, %error, "script aborted");
                Err(error.to_string())
            }
        }
    }

    pub fn registries(&self) -> &RegistrySet {
        &self.registries
    }

    /// The registry object scripts currently see for `kind`.
    pub fn registry(&self, kind: RegistryKind) -> JsObjectType {
        self.registries.live(&self.ctx, kind)
    }

    /// Every registry, in output order.
    pub fn finalize(&self) -> Vec<(RegistryKind, JsObjectType)> {
        self.registries.finalize(&self.ctx)
    }

    pub fn stubs(&self) -> &HostStubResolver {
        &self.stubs
    }

    pub fn eval_context(&self) -> &EvalContext {
        &self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::value::JsValue;

    fn sandbox() -> ExtractionContext {
        ExtractionContext::new(SandboxOptions {
            timeout: Some(Duration::from_millis(200)),
            max_call_depth: 64,
        })
        .unwrap()
    }

    #[test]
    fn test_helpers_persist_between_files() {
        let mut context = sandbox();
        context
            .run_script(&ScriptSource::new("a.js", "function twice(x) { return x * 2; }"))
            .unwrap();
        context
            .run_script(&ScriptSource::new("b.js", "SpellsList['x'] = { level: twice(3) };"))
            .unwrap();
        let spells = context.registry(RegistryKind::Spells);
        let entry = spells.borrow().get_own_property("x").unwrap();
        assert_eq!(
            entry.as_object().unwrap().borrow().get_own_property("level"),
            Some(JsValue::from_i64(6))
        );
    }

    #[test]
    fn test_error_message_format() {
        let mut context = sandbox();
        let err = context
            .run_script(&ScriptSource::new("bad.js", "null.x;"))
            .unwrap_err();
        assert!(err.starts_with("TypeError: "), "{}", err);

        let err = context
            .run_script(&ScriptSource::new("throw.js", "throw new RangeError('too far');"))
            .unwrap_err();
        assert_eq!(err, "RangeError: too far");
    }

    #[test]
    fn test_partial_writes_survive_failure() {
        let mut context = sandbox();
        let result = context.run_script(&ScriptSource::new(
            "partial.js",
            "FeatsList.first = { name: 'First' }; undefinedHelper(); FeatsList.second = {};",
        ));
        assert!(result.unwrap_err().starts_with("ReferenceError"));
        let feats = context.registry(RegistryKind::Feats);
        assert!(feats.borrow().has_own_property("first"));
        assert!(!feats.borrow().has_own_property("second"));
    }

    #[test]
    fn test_runaway_loop_is_interrupted() {
        let mut context = sandbox();
        let err = context
            .run_script(&ScriptSource::new(
                "loop.js",
                "try { while (true) {} } catch (e) { GearList.caught = {}; }",
            ))
            .unwrap_err();
        assert!(err.starts_with("Interrupted"), "{}", err);
        assert!(!context.registry(RegistryKind::Gear).borrow().has_own_property("caught"));
        context
            .run_script(&ScriptSource::new("next.js", "GearList.rope = { name: 'Rope' };"))
            .unwrap();
    }

    #[test]
    fn test_prelude_defines_fighting_styles() {
        let mut context = sandbox();
        context
            .run_script(&ScriptSource::new(
                "styles.js",
                "SourceList.styles = { names: Object.keys(FightingStyles).join(',') };",
            ))
            .unwrap();
        let sources = context.registry(RegistryKind::Sources);
        let entry = sources.borrow().get_own_property("styles").unwrap();
        assert_eq!(
            entry.as_object().unwrap().borrow().get_own_property("names"),
            Some(JsValue::from_str(
                "archery,defense,dueling,great weapon,protection,two-weapon"
            ))
        );
    }
}
