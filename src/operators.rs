//! # operators.rs
//!
//! Unary and binary operator tables.
//!
//! Precedence, from loosest to tightest: `=` (0), `+ -` (1), `* /` (2),
//! `^` (3), unary `+ -` (4).

use crate::functions::core::NumericBackend;

/// Associativity of an operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assoc {
    /// Equal precedence chains left to right: `a - b - c` is `(a - b) - c`.
    Left,
    /// Equal precedence nests right to left: `a ^ b ^ c` is `a ^ (b ^ c)`.
    Right,
}

/// Precedence shared by all unary operators.
pub(crate) const UNARY_PRECEDENCE: u8 = 4;

#[doc(hidden)]
/// Internal macro to define all unary operators.
///
/// This macro is **not intended for public use**.
/// It centralizes the enum variants, string representation and apply logic.
macro_rules! unary_operator_kind {
    ($($name:ident => { symbol: $symbol:expr, apply: $apply:expr }),* $(,)?) => {
        /// Represents a prefix operator in an expression.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum UnaryOperatorKind {
            $($name),*
        }

        impl UnaryOperatorKind {
            /// Converts a symbol to a `UnaryOperatorKind`.
            pub fn from_symbol(s: &str) -> Option<Self> {
                match s {
                    $( $symbol => Some(Self::$name), )*
                    _ => None,
                }
            }

            /// Applies the operator to a number.
            pub fn apply<T: NumericBackend>(&self, x: &T) -> T {
                match self {
                    $( Self::$name => $apply(x), )*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $( Self::$name => $symbol, )*
                }
            }

            pub fn precedence(&self) -> u8 {
                UNARY_PRECEDENCE
            }
        }
    };
}

unary_operator_kind! {
    Positive => { symbol: "+", apply: |x: &T| x.clone() },
    Negative => { symbol: "-", apply: |x: &T| x.negate() },
}

impl std::fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Information about a binary operator.
///
/// Used by the parser to decide when pending operators are reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryOperatorInfo {
    /// Operator precedence (higher value binds tighter).
    pub precedence: u8,

    pub assoc: Assoc,
}

#[doc(hidden)]
/// Internal macro to define all binary operators.
///
/// This macro is **not intended for public use**.
/// It centralizes the enum variants, string representation, precedence,
/// associativity and apply logic.
macro_rules! binary_operators {
    ($($name:ident => {
        symbol: $symbol:expr,
        precedence: $prec:expr,
        assoc: $assoc:expr,
        apply: $apply:expr
    }),* $(,)?) => {
        /// Represents a binary operator in an expression.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum BinaryOperatorKind {
            $($name),*
        }

        impl BinaryOperatorKind {
            /// Returns operator precedence and associativity.
            pub fn info(&self) -> BinaryOperatorInfo {
                match self {
                    $(Self::$name => BinaryOperatorInfo { precedence: $prec, assoc: $assoc },)*
                }
            }

            /// Converts a symbol to the corresponding operator.
            pub fn from_symbol(s: &str) -> Option<Self> {
                match s {
                    $($symbol => Some(Self::$name),)*
                    _ => None,
                }
            }

            /// Applies the operator to two numbers.
            ///
            /// Returns `None` when the result is not representable by the
            /// backend. Assignment has no numeric functor and always returns
            /// `None`; it is resolved by the assigner before numbers are seen.
            pub fn apply<T: NumericBackend>(&self, l: &T, r: &T) -> Option<T> {
                match self {
                    $(Self::$name => $apply(l, r),)*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(Self::$name => $symbol,)*
                }
            }

            pub fn precedence(&self) -> u8 {
                self.info().precedence
            }
        }
    };
}

binary_operators! {
    Assign => { symbol: "=", precedence: 0, assoc: Assoc::Right, apply: |_: &T, _: &T| None },
    Add    => { symbol: "+", precedence: 1, assoc: Assoc::Left,  apply: |l: &T, r: &T| l.plus(r) },
    Sub    => { symbol: "-", precedence: 1, assoc: Assoc::Left,  apply: |l: &T, r: &T| l.minus(r) },
    Mul    => { symbol: "*", precedence: 2, assoc: Assoc::Left,  apply: |l: &T, r: &T| l.times(r) },
    Div    => { symbol: "/", precedence: 2, assoc: Assoc::Left,  apply: |l: &T, r: &T| l.divide(r) },
    Pow    => { symbol: "^", precedence: 3, assoc: Assoc::Right, apply: |l: &T, r: &T| l.power(r) },
}

impl std::fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
