//! The script engine: runtime data structures, the tree-walking evaluator,
//! the super-global plugin layer and the standard library.

pub mod ds;
pub mod eval;
pub mod plugin;
pub mod std_lib;
