//! Top-level functions module.
//!
//! This module groups function-related implementations used by the expression
//! system. It provides:
//!
//! - `buildin`: the native function table, keyed by `name@arity`.
//! - `core`: the numeric backend abstraction (`NumericBackend`) implemented
//!   for `f64` and `BigRational`.
//! - `custom`: user-defined function clauses and their parameter patterns.
pub(crate) mod buildin;
pub(crate) mod core;
pub(crate) mod custom;

/// Return the storage keys of the built-in functions, e.g. `sin@1` or
/// `max@*`.
pub fn names() -> Vec<&'static str>
{
    let mut keys: Vec<_> = buildin::keys().collect();
    keys.sort_unstable();
    keys
}
