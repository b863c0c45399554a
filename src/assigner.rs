//! # assigner.rs
//!
//! Semantics of the `=` operator.
//!
//! - `name = contents` evaluates `contents` and stores the result under
//!   `$name`, replacing any earlier value. The stored value is returned.
//! - `f(p0, p1, ...) = body` declares one clause of `f`. Identifier
//!   parameters become positional slots, number parameters become literal
//!   patterns. The body is evaluated once at declaration time with every
//!   parameter name bound to its slot placeholder, then merged into the
//!   overload list stored under `f@arity`. The declaration itself is
//!   returned.

use crate::error::{Error, Result};
use crate::functions::core::NumericBackend;
use crate::functions::custom::{Clause, Parameter};
use crate::memory::{Binding, Frame, Memory, ScopeMemory};
use crate::node::Node;
use crate::operators::BinaryOperatorKind;

use std::rc::Rc;

/// Resolves assignments against a scope.
pub struct Assigner;

impl Assigner {
    /// Binds `contents` to `binding` in `scope`.
    ///
    /// # Errors
    ///
    /// - [`Error::AssignmentInvalid`] if `binding` is neither an identifier
    ///   nor a call whose parameters are all identifiers or numbers.
    /// - [`Error::InvalidBindingParameters`] if an identifier parameter
    ///   follows a number parameter.
    /// - Any error raised while evaluating `contents`.
    pub fn assign<T: NumericBackend>(
        scope: &mut ScopeMemory<T>,
        binding: &Node<T>,
        contents: &Node<T>,
    ) -> Result<Node<T>> {
        match binding {
            Node::Identifier(name) => Self::assign_variable(scope, name, contents),
            Node::Function { name, args } => Self::assign_function(scope, binding, name, args, contents),
            _ => Err(Error::AssignmentInvalid { node: binding.to_string() }),
        }
    }

    fn assign_variable<T: NumericBackend>(
        scope: &mut ScopeMemory<T>,
        name: &str,
        contents: &Node<T>,
    ) -> Result<Node<T>> {
        let value = contents.evaluate(scope)?;
        log::debug!("assign {name} = {value}");
        scope.put(&format!("${name}"), Binding::value(value.clone()))?;
        Ok(value)
    }

    fn assign_function<T: NumericBackend>(
        scope: &mut ScopeMemory<T>,
        binding: &Node<T>,
        name: &str,
        params: &[Node<T>],
        contents: &Node<T>,
    ) -> Result<Node<T>> {
        let declaration = || Node::binary(BinaryOperatorKind::Assign, binding.clone(), contents.clone());

        let mut pattern = Vec::with_capacity(params.len());
        let mut placeholders = Frame::new();
        let mut seen_literal = false;
        for (idx, param) in params.iter().enumerate() {
            match param {
                Node::Identifier(param_name) => {
                    if seen_literal {
                        return Err(Error::InvalidBindingParameters { node: declaration().to_string() });
                    }
                    pattern.push(Parameter::Positional(idx));
                    placeholders = placeholders.with_binding(&format!("${param_name}"), Node::positional(idx));
                }
                Node::Number(value) => {
                    seen_literal = true;
                    pattern.push(Parameter::Literal(value.clone()));
                }
                _ => return Err(Error::AssignmentInvalid { node: binding.to_string() }),
            }
        }

        let body = scope.with_placeholders(placeholders, |scope| contents.evaluate(scope))?;
        let clause = Clause::new(pattern, body);
        log::debug!("declare {name}{clause}");

        let key = format!("{name}@{}", params.len());
        scope.put(&key, Binding::Clauses(vec![Rc::new(clause)]))?;
        Ok(declaration())
    }
}
