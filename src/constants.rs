//! # constants.rs
//!
//! Mathematical constants predefined in every session.
//!
//! Constants are stored as decimal literals under their storage key
//! (`$name`) and converted by the numeric backend on lookup, so an exact
//! backend reads `φ` as the exact decimal `1.618033988749894`.

use phf::Map;
use phf_macros::phf_map;

/// Map of mathematical constants by storage key.
static CONSTANTS: Map<&'static str, &'static str> = phf_map! {
    "$e" => "2.718281828459045",
    "$inf" => "inf",
    "$pi" => "3.141592653589793",
    "$π" => "3.141592653589793",
    "$phi" => "1.618033988749894",
    "$φ" => "1.618033988749894",
    "$psi" => "3.359885666243177",
    "$ψ" => "3.359885666243177",
};

/// Returns the literal of the constant stored under `key`.
pub(crate) fn lookup(key: &str) -> Option<&'static str> {
    CONSTANTS.get(key).copied()
}

/// Returns the names of the predefined constants.
pub fn names() -> Vec<&'static str> {
    CONSTANTS.keys().map(|key| key.trim_start_matches('$')).collect()
}
