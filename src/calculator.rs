//! # calculator.rs
//!
//! Statement-level entry point.
//!
//! A [`Calculator`] owns one [`ScopeMemory`] shared by every statement it
//! evaluates, so definitions made by one call stay visible to the next.

use crate::error::Result;
use crate::expression::Expression;
use crate::functions::core::NumericBackend;
use crate::memory::ScopeMemory;
use crate::node::Node;

use num_rational::BigRational;

/// Evaluates `;`-separated statements against a persistent scope.
///
/// # Examples
/// ```rust
/// use symcalc::Calculator;
///
/// let mut calc = Calculator::<f64>::new();
/// calc.evaluate("fib(0) = 0; fib(1) = 1; fib(n) = fib(n - 1) + fib(n - 2)").unwrap();
/// assert_eq!(calc.evaluate("fib(10)").unwrap(), Some(55.0));
/// ```
pub struct Calculator<T: NumericBackend = f64> {
    scope: ScopeMemory<T>,
}

/// Calculator over exact decimal arithmetic.
pub type ExactCalculator = Calculator<BigRational>;

impl<T: NumericBackend> Calculator<T> {
    /// A calculator with an empty scope over the native builtins.
    pub fn new() -> Self {
        Self::with_scope(ScopeMemory::new())
    }

    pub fn with_scope(scope: ScopeMemory<T>) -> Self {
        Self { scope }
    }

    /// Evaluates every statement of `input` in order.
    ///
    /// Statements are separated by `;`; empty statements are skipped.
    ///
    /// # Returns
    /// The value of the last statement if it evaluated to a number, `None`
    /// if it left a symbolic residue or if `input` holds no statement.
    ///
    /// # Errors
    /// The first error raised by any statement. Statements before it keep
    /// their effect on the scope.
    pub fn evaluate(&mut self, input: &str) -> Result<Option<T>> {
        let mut last = None;
        for statement in input.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            last = Some(self.evaluate_node(statement)?);
        }
        Ok(match last {
            Some(Node::Number(value)) => Some(value),
            _ => None,
        })
    }

    /// Parses and evaluates a single statement, returning the result tree.
    pub fn evaluate_node(&mut self, statement: &str) -> Result<Node<T>> {
        let expression: Expression<T> = Expression::parse(statement)?;
        let result = expression.evaluate(&mut self.scope)?;
        log::debug!("{expression} => {result}");
        Ok(result)
    }

    pub fn scope(&self) -> &ScopeMemory<T> {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut ScopeMemory<T> {
        &mut self.scope
    }
}

impl<T: NumericBackend> Default for Calculator<T> {
    fn default() -> Self {
        Self::new()
    }
}
