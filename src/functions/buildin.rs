//! # buildin.rs
//!
//! Standard mathematical functions available to every expression.
//!
//! Each entry is registered under its storage key `name@arity`; variadic
//! functions use `name@*`. All functions compute through `f64` and round
//! the result to twelve decimal places before converting back to the
//! session's numeric backend.

use crate::functions::core::{round_places, NumericBackend};

use paste::paste;
use phf::Map;
use phf_macros::phf_map;

/// `n`-th root of `x`, keeping the sign of `x` for odd integral `n`.
fn nth_root(x: f64, n: f64) -> f64 {
    let odd = n.fract() == 0.0 && n % 2.0 != 0.0;
    if x < 0.0 && odd {
        -(-x).powf(n.recip())
    } else {
        x.powf(n.recip())
    }
}

/// Rounds `x` to `places` decimal places.
fn round_to(x: f64, places: f64) -> f64 {
    let factor = 10f64.powf(places.trunc());
    (x * factor).round() / factor
}

fn fold(args: &[f64], pick: fn(f64, f64) -> f64) -> f64 {
    args.iter().copied().reduce(pick).unwrap_or(f64::NAN)
}

/// Whether an arity tag accepts `len` arguments. `N` is variadic and
/// needs at least one argument.
macro_rules! arity_accepts {
    (N, $len:expr) => { $len > 0 };
    ($arity:literal, $len:expr) => { $len == $arity };
}

#[doc(hidden)]
/// Internal macro to define the native function table.
///
/// Every line names the function, its arity tag (`1`, `2` or `N` for
/// variadic), the storage key and the body over the argument slice `a`.
/// The macro generates the [`NativeFunction`] enum, its `apply` and
/// `Display` implementations, and the static lookup table.
macro_rules! native_functions {
    ($( $name:ident / $arity:tt => $key:tt: |$a:ident| $body:expr ),* $(,)?) => {
        paste! {
            /// A built-in function resolved from the native table.
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub enum NativeFunction {
                $( [<$name:camel $arity>], )*
            }

            impl NativeFunction {
                /// Whether the function takes `len` arguments.
                pub fn accepts(&self, len: usize) -> bool {
                    match self {
                        $( Self::[<$name:camel $arity>] => arity_accepts!($arity, len), )*
                    }
                }

                /// Applies the function to fully numeric arguments.
                ///
                /// Returns `None` when the argument count does not match the
                /// arity or the result cannot be represented by the backend `T`.
                pub fn apply<T: NumericBackend>(&self, args: &[T]) -> Option<T> {
                    if !self.accepts(args.len()) {
                        return None;
                    }
                    let values: Vec<f64> = args.iter().map(NumericBackend::to_f64).collect();
                    let result: f64 = match self {
                        $( Self::[<$name:camel $arity>] => {
                            let $a = values.as_slice();
                            $body
                        } )*
                    };
                    T::from_f64(round_places(result))
                }

                /// Function name as written in expressions.
                pub fn name(&self) -> &'static str {
                    match self {
                        $( Self::[<$name:camel $arity>] => stringify!($name), )*
                    }
                }
            }

            /// Native functions by storage key.
            static NATIVE_FUNCTIONS: Map<&'static str, NativeFunction> = phf_map! {
                $( $key => NativeFunction::[<$name:camel $arity>], )*
            };
        }
    };
}

native_functions! {
    abs     / 1 => "abs@1":     |a| a[0].abs(),
    acos    / 1 => "acos@1":    |a| a[0].acos(),
    acosh   / 1 => "acosh@1":   |a| a[0].acosh(),
    asin    / 1 => "asin@1":    |a| a[0].asin(),
    asinh   / 1 => "asinh@1":   |a| a[0].asinh(),
    atan    / 1 => "atan@1":    |a| a[0].atan(),
    atanh   / 1 => "atanh@1":   |a| a[0].atanh(),
    ceil    / 1 => "ceil@1":    |a| a[0].ceil(),
    cos     / 1 => "cos@1":     |a| a[0].cos(),
    cosh    / 1 => "cosh@1":    |a| a[0].cosh(),
    deg2rad / 1 => "deg2rad@1": |a| a[0].to_radians(),
    floor   / 1 => "floor@1":   |a| a[0].floor(),
    rad2deg / 1 => "rad2deg@1": |a| a[0].to_degrees(),
    sin     / 1 => "sin@1":     |a| a[0].sin(),
    sinh    / 1 => "sinh@1":    |a| a[0].sinh(),
    sqrt    / 1 => "sqrt@1":    |a| a[0].sqrt(),
    tan     / 1 => "tan@1":     |a| a[0].tan(),
    tanh    / 1 => "tanh@1":    |a| a[0].tanh(),
    log     / 1 => "log@1":     |a| a[0].ln(),
    round   / 1 => "round@1":   |a| a[0].round(),
    hypot   / 2 => "hypot@2":   |a| a[0].hypot(a[1]),
    mod     / 2 => "mod@2":     |a| a[0] % a[1],
    log     / 2 => "log@2":     |a| a[0].ln() / a[1].ln(),
    round   / 2 => "round@2":   |a| round_to(a[0], a[1]),
    rt      / 2 => "rt@2":      |a| nth_root(a[0], a[1]),
    max     / N => "max@*":     |a| fold(a, f64::max),
    min     / N => "min@*":     |a| fold(a, f64::min),
}

/// Looks up a native function by storage key.
pub(crate) fn lookup(key: &str) -> Option<NativeFunction> {
    NATIVE_FUNCTIONS.get(key).copied()
}

impl std::fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Returns the available built-in function keys.
pub(crate) fn keys() -> impl Iterator<Item = &'static str> {
    NATIVE_FUNCTIONS.keys().copied()
}
