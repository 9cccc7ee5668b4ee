//! Core built-ins registration.
//!
//! This module provides the function to register all core built-in objects
//! with the BuiltInRegistry.

use crate::runner::plugin::registry::BuiltInRegistry;

use super::array;
use super::console;
use super::error;
use super::function;
use super::global;
use super::json;
use super::math;
use super::number;
use super::object;
use super::regexp;
use super::string;
use super::timer;

/// Register all core built-in objects with the registry.
pub fn register_core_builtins(registry: &mut BuiltInRegistry) {
    // Object first: every other prototype chain ends there
    object::register(registry);
    function::register(registry);
    array::register(registry);
    string::register(registry);
    number::register(registry);
    math::register(registry);
    json::register(registry);
    error::register(registry);
    regexp::register(registry);
    global::register(registry);
    console::register(registry);
    timer::register(registry);
}
