//! # builder.rs
//!
//! This module provides the configuration builder for [`Calculator`].

use crate::calculator::Calculator;
use crate::error::Result;
use crate::functions::core::NumericBackend;
use crate::memory::{ScopeMemory, DEFAULT_MAX_DEPTH};
use crate::node::Node;

/// Configures and builds a [`Calculator`].
///
/// The numeric backend is chosen by the type parameter: `f64` by default,
/// `num_rational::BigRational` for exact decimal arithmetic.
pub struct Builder<T: NumericBackend = f64>
{
    max_depth: usize,
    variables: Vec<(String, T)>,
    definitions: Vec<String>,
}

impl<T: NumericBackend> Builder<T>
{
    /// Creates a new `Builder` with the default call depth limit and no
    /// predefined variables or definitions.
    ///
    /// # Examples
    /// ```rust
    /// use symcalc::Builder;
    ///
    /// let mut calc = Builder::<f64>::new()
    ///     .with_max_depth(50)
    ///     .with_variables([("g", 9.81)])
    ///     .with_definitions(["fall(t) = g * t ^ 2 / 2"])
    ///     .build()
    ///     .expect("Failed to build calculator");
    /// assert_eq!(calc.evaluate("fall(2)").unwrap(), Some(19.62));
    /// ```
    pub fn new() -> Self
    {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            variables: Vec::new(),
            definitions: Vec::new(),
        }
    }

    /// Sets the maximum number of nested function calls.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self
    {
        self.max_depth = max_depth;
        self
    }

    /// Adds variables bound to numbers.
    ///
    /// # Parameters
    /// - `variables`: pairs of variable name and value.
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
    {
        self.variables.extend(variables.into_iter().map(|(name, value)| (name.into(), value)));
        self
    }

    /// Adds statements evaluated at build time, in order, after the
    /// variables are bound. Typically function declarations.
    pub fn with_definitions<I, S>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definitions.extend(definitions.into_iter().map(Into::into));
        self
    }

    /// Builds the calculator.
    ///
    /// # Errors
    /// The first error raised while evaluating a definition.
    pub fn build(self) -> Result<Calculator<T>>
    {
        let mut scope = ScopeMemory::new().with_max_depth(self.max_depth);
        for (name, value) in self.variables {
            scope.define_variable(&name, Node::Number(value))?;
        }

        let mut calculator = Calculator::with_scope(scope);
        for definition in &self.definitions {
            calculator.evaluate(definition)?;
        }
        Ok(calculator)
    }
}

impl<T: NumericBackend> Default for Builder<T>
{
    fn default() -> Self
    {
        Self::new()
    }
}
