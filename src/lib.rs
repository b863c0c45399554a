//! # symcalc
//!
//! `symcalc` is a Rust library implementing a small **symbolic expression
//! language**: variables, multi-clause user functions with literal
//! patterns, bounded recursion, vectors and partial (residual) evaluation.
//!
//! ## Overview
//! - Parse expressions with a shunting-yard parser supporting implicit
//!   multiplication (`3x`, `2(x + 1)`) and unary `+`/`-`.
//! - Evaluate against a layered memory: call frame, user scope, native
//!   builtins.
//! - Unbound names stay symbolic: `x + 2 * 3` evaluates to `x + 6`.
//! - Define functions by cases: `fib(0) = 0; fib(1) = 1; fib(n) = ...`.
//!
//! Internally, expressions are first tokenized, then parsed into a
//! [`Node`] tree, which is evaluated recursively against a [`ScopeMemory`].
//!
//! ## Feature Highlights
//! - **Numeric backends** selected by type parameter: `f64` or exact
//!   [`num_rational::BigRational`]
//! - **Overloads** ordered most specific first, dispatched by arity and
//!   literal patterns
//! - **Canonical rendering** with minimal parentheses
//!
//! ## Example
//! ```rust
//! use symcalc::Calculator;
//!
//! let mut calc = Calculator::<f64>::new();
//! assert_eq!(calc.evaluate("2 + 3 * 4").unwrap(), Some(14.0));
//!
//! calc.evaluate("f(x) = x ^ 2 + 1").unwrap();
//! assert_eq!(calc.evaluate("f(3)").unwrap(), Some(10.0));
//!
//! let residual = calc.evaluate_node("f(y) + 2 * 3").unwrap();
//! assert_eq!(residual.to_string(), "f(y) + 6");
//! ```
//!
//! ## Example: Retrieving All Names
//! ```rust
//! // Constants
//! let constant_names: Vec<&'static str> = symcalc::constants::names();
//! assert!(constant_names.contains(&"pi"));
//!
//! // Functions, by storage key
//! let function_names: Vec<&'static str> = symcalc::functions::names();
//! assert!(function_names.contains(&"sin@1"));
//! ```
//!
//! ## License
//! Licensed under either **MIT** or **Apache-2.0** at your option.

mod assigner;
mod builder;
mod calculator;
pub mod constants;
mod error;
mod expression;
pub mod functions;
mod lexer;
mod memory;
mod node;
mod operators;
mod parser;
mod token;

pub use assigner::Assigner;
pub use builder::Builder;
pub use calculator::{Calculator, ExactCalculator};
pub use error::{Error, Result};
pub use expression::{Expression, ExpressionBuilder};
pub use functions::buildin::NativeFunction;
pub use functions::core::NumericBackend;
pub use functions::custom::{Clause, Parameter};
pub use lexer::tokenize;
pub use memory::{Binding, Frame, Memory, NativeMemory, ScopeMemory, DEFAULT_MAX_DEPTH};
pub use node::Node;
pub use operators::{Assoc, BinaryOperatorInfo, BinaryOperatorKind, UnaryOperatorKind};
pub use parser::parse;
pub use token::{Category, Side, Token, TokenKind};

#[cfg(test)]
mod evaluate_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn eval(input: &str) -> f64 {
        Calculator::<f64>::new().evaluate(input).unwrap().unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("2 + 3 * 4"), 14.0);
        assert_eq!(eval("(2+3) * 4"), 20.0);
        assert_eq!(eval("1.1 ^ 2.0"), 1.21);
        assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
    }

    #[test]
    fn test_unary() {
        assert_eq!(eval("-(2+3) + 1"), -4.0);
        assert_eq!(eval("+(2+3) + 1"), 6.0);
        assert_eq!(eval("-2 ^ 2"), 4.0);
        assert_eq!(eval("3 - -2"), 5.0);
    }

    #[test]
    fn test_functions_and_constants() {
        assert_abs_diff_eq!(eval("sin(pi / 2)"), 1.0);
        assert_eq!(eval("max(3, 9, 4)"), 9.0);
        assert_eq!(eval("log(100, 10)"), 2.0);
        assert_eq!(eval("2pi"), 2.0 * std::f64::consts::PI);
    }

    #[test]
    fn test_rendering_idempotent() {
        let mut calc = Calculator::<f64>::new();
        let first = calc.evaluate_node("x + y +-z").unwrap().to_string();
        assert_eq!(first, "(x + y) + -z");
        let second = calc.evaluate_node(&first).unwrap().to_string();
        assert_eq!(second, first);
    }
}
