//! Runtime data structures: values, heap objects, scopes and the
//! operations defined on them.

pub mod env_record;
pub mod error;
pub mod execution_context;
pub mod object;
pub mod operations;
pub mod realm;
pub mod value;
