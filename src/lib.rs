//! # sheet-harvest
//!
//! Runs character-sheet content definition scripts in a sandbox and turns
//! the data they register into JSON documents.
//!
//! The scripts were written for a PDF form host and call hundreds of its
//! helpers. Here they run in an embedded interpreter whose global scope holds
//! a small standard library plus inert stand-ins for the host API. Whatever
//! the scripts store in the well-known registries (`ClassList`,
//! `SpellsList`, ...) is read back and serialized.
//!
//! ## Quick Start
//!
//! ```
//! use sheet_harvest::harness::{run::run_scripts, ScriptSource, SilentObserver};
//!
//! let scripts = vec![ScriptSource::new(
//!     "spells.js",
//!     "SpellsList['light'] = { name: 'Light', level: 0 };",
//! )];
//! let output = run_scripts(scripts, &mut SilentObserver).unwrap();
//! let spells = output.document("spells").unwrap();
//! assert_eq!(spells[0]["_key"], "light");
//! assert_eq!(output.manifest.files["spells.js"].is_ok(), true);
//! ```
//!
//! ## Super-global scope
//!
//! Names a script does not declare itself are looked up in a super-global
//! scope below the global one. It is served by [`runner::plugin::resolver::PluginResolver`]
//! implementations queried in registration order: first the standard
//! library, then the host stubs. Values are materialized on first use and
//! cached. A script that declares a global of the same name shadows the
//! super-global one.
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG grammar and AST builder
//! - **[`runner`]** - the interpreter
//!   - **[`runner::ds`]** - values, objects, scopes, errors
//!   - **[`runner::eval`]** - tree-walking evaluation
//!   - **[`runner::plugin`]** - super-global scope and built-in registry
//!   - **[`runner::std_lib`]** - the standard library
//! - **[`harness`]** - registries, host stubs, sandbox, serializer, manifest
//! - **[`config`]** - run configuration

#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod harness;
pub mod parser;
pub mod runner;
