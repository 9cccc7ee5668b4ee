//! Evaluation module for executing the script AST.
//!
//! This module contains the tree-walking evaluator.

pub mod expression;
pub mod function;
pub mod statement;
pub mod types;

pub use function::{call_function, construct};
pub use statement::execute_program;
pub use types::{Completion, CompletionType, Reference};
