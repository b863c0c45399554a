//! # node.rs
//!
//! Expression tree nodes.
//!
//! A [`Node`] is a closed sum type over numbers, identifiers, operators,
//! function calls, vectors and bracket indexing. Evaluating a node against a
//! [`ScopeMemory`] never mutates it: the result is a new tree, either a
//! `Number` or a residual symbolic node when some operand stays unbound.
//!
//! # Notes
//! - Folding happens only when every child evaluates to a number; the check
//!   is repeated on every evaluation.
//! - `=` is handed to the [`Assigner`] before its operands are evaluated.
//! - Rendering parenthesizes an operand only when it is an operator whose
//!   precedence is lower than or equal to its parent's.

use crate::assigner::Assigner;
use crate::error::{Error, Result};
use crate::functions::core::NumericBackend;
use crate::memory::{Binding, Frame, Memory, ScopeMemory};
use crate::operators::{BinaryOperatorKind, UnaryOperatorKind};

use std::fmt;

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<T = f64> {
    /// A concrete number of the session's numeric backend.
    Number(T),

    /// A variable or constant name. Digit-only names are positional
    /// parameter slots of a function body and render as `$0`, `$1`, ...
    Identifier(String),

    UnaryOperator {
        kind: UnaryOperatorKind,
        operand: Box<Node<T>>,
    },

    BinaryOperator {
        kind: BinaryOperatorKind,
        left: Box<Node<T>>,
        right: Box<Node<T>>,
    },

    /// A call `name(args...)`.
    Function {
        name: String,
        args: Vec<Node<T>>,
    },

    /// A vector literal `{a, b, ...}`.
    Vector(Vec<Node<T>>),

    /// Indexing `target[i, j, ...]`.
    Brackets {
        target: Box<Node<T>>,
        indices: Vec<Node<T>>,
    },
}

impl<T: NumericBackend> Node<T> {
    /// Builds a number from a literal.
    ///
    /// # Errors
    ///
    /// [`Error::NumericExpected`] if the backend cannot read `literal`.
    pub fn number(literal: &str) -> Result<Self> {
        T::parse_literal(literal)
            .map(Node::Number)
            .ok_or_else(|| Error::NumericExpected { value: literal.to_string() })
    }

    pub fn identifier(name: &str) -> Self {
        Node::Identifier(name.to_string())
    }

    /// The placeholder for positional parameter `index` of a function body.
    pub(crate) fn positional(index: usize) -> Self {
        Node::Identifier(index.to_string())
    }

    pub fn unary(kind: UnaryOperatorKind, operand: Node<T>) -> Self {
        Node::UnaryOperator { kind, operand: Box::new(operand) }
    }

    pub fn binary(kind: BinaryOperatorKind, left: Node<T>, right: Node<T>) -> Self {
        Node::BinaryOperator { kind, left: Box::new(left), right: Box::new(right) }
    }

    pub fn function(name: &str, args: Vec<Node<T>>) -> Self {
        Node::Function { name: name.to_string(), args }
    }

    pub fn as_number(&self) -> Option<&T> {
        match self {
            Node::Number(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Node::Number(_))
    }

    /// Storage key of a storable node: `$name` for identifiers and
    /// `name@arity` for functions.
    pub fn storage_key(&self) -> Option<String> {
        match self {
            Node::Identifier(name) => Some(format!("${name}")),
            Node::Function { name, args } => Some(format!("{name}@{}", args.len())),
            _ => None,
        }
    }

    /// Precedence of an operator node, `None` for any other node.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            Node::UnaryOperator { kind, .. } => Some(kind.precedence()),
            Node::BinaryOperator { kind, .. } => Some(kind.precedence()),
            _ => None,
        }
    }

    /// Text of this node alone, without its children.
    pub fn raw_text(&self) -> String {
        match self {
            Node::Number(value) => value.canonical(),
            Node::Identifier(name) => name.clone(),
            Node::UnaryOperator { kind, .. } => kind.symbol().to_string(),
            Node::BinaryOperator { kind, .. } => kind.symbol().to_string(),
            Node::Function { name, .. } => name.clone(),
            Node::Vector(_) => "{}".to_string(),
            Node::Brackets { .. } => "[]".to_string(),
        }
    }

    /// Evaluates this node against `scope`.
    ///
    /// Returns a `Number` when every leaf resolves to a number, otherwise a
    /// residual tree over the partially evaluated children.
    ///
    /// # Errors
    ///
    /// Any error raised by an assignment, a function dispatch, the numeric
    /// backend or the call stack, unchanged.
    pub fn evaluate(&self, scope: &mut ScopeMemory<T>) -> Result<Node<T>> {
        match self {
            Node::Number(_) => Ok(self.clone()),
            Node::Identifier(name) => self.evaluate_identifier(name, scope),
            Node::UnaryOperator { kind, operand } => {
                let operand = operand.evaluate(scope)?;
                Ok(match operand {
                    Node::Number(value) => Node::Number(kind.apply(&value)),
                    residual => Node::unary(*kind, residual),
                })
            }
            Node::BinaryOperator { kind: BinaryOperatorKind::Assign, left, right } => {
                Assigner::assign(scope, left, right)
            }
            Node::BinaryOperator { kind, left, right } => {
                let left = left.evaluate(scope)?;
                let right = right.evaluate(scope)?;
                match (&left, &right) {
                    (Node::Number(l), Node::Number(r)) => kind.apply(l, r)
                        .map(Node::Number)
                        .ok_or_else(|| Error::NumericDomain {
                            operation: Node::binary(*kind, left.clone(), right.clone()).to_string(),
                        }),
                    _ => Ok(Node::binary(*kind, left, right)),
                }
            }
            Node::Function { name, args } => {
                let args = args.iter()
                    .map(|arg| arg.evaluate(scope))
                    .collect::<Result<Vec<_>>>()?;
                Self::call(name, args, scope)
            }
            Node::Vector(items) => items.iter()
                .map(|item| item.evaluate(scope))
                .collect::<Result<Vec<_>>>()
                .map(Node::Vector),
            Node::Brackets { target, indices } => {
                let target = target.evaluate(scope)?;
                let indices = indices.iter()
                    .map(|index| index.evaluate(scope))
                    .collect::<Result<Vec<_>>>()?;
                Self::index(target, indices)
            }
        }
    }

    fn evaluate_identifier(&self, name: &str, scope: &mut ScopeMemory<T>) -> Result<Node<T>> {
        let key = format!("${name}");
        match scope.lookup(&key) {
            Some(Binding::Value(bound)) => scope
                .resolving(&key, |scope| bound.evaluate(scope))
                .unwrap_or_else(|| Ok(self.clone())),
            Some(Binding::Constant(literal)) => Node::number(literal),
            _ => Ok(self.clone()),
        }
    }

    /// Dispatches a call whose arguments are already evaluated.
    fn call(name: &str, args: Vec<Node<T>>, scope: &mut ScopeMemory<T>) -> Result<Node<T>> {
        let numbers: Option<Vec<T>> = args.iter().map(|arg| arg.as_number().cloned()).collect();
        let call = Node::function(name, args);
        let Some(numbers) = numbers else {
            return Ok(call);
        };

        let key = format!("{name}@{}", numbers.len());
        match scope.lookup(&key) {
            Some(Binding::Native(native)) => native.apply(&numbers)
                .map(Node::Number)
                .ok_or_else(|| Error::NumericDomain { operation: call.to_string() }),
            Some(Binding::Clauses(clauses)) => {
                let clause = clauses.iter()
                    .find(|clause| clause.matches(&numbers))
                    .ok_or_else(|| Error::FunctionNotFound { node: call.to_string() })?;
                log::debug!("dispatch {call} to clause {clause}");
                scope.with_frame(Frame::positional(numbers), |scope| clause.body().evaluate(scope))
            }
            _ => Err(Error::FunctionNotFound { node: call.to_string() }),
        }
    }

    /// Indexes `target` successively by `indices`.
    fn index(target: Node<T>, indices: Vec<Node<T>>) -> Result<Node<T>> {
        let mut current = target;
        let mut pending = indices.into_iter();
        while let Some(index) = pending.next() {
            let (Node::Vector(items), Node::Number(position)) = (&current, &index) else {
                let mut indices = vec![index];
                indices.extend(pending);
                return Ok(Node::Brackets { target: Box::new(current), indices });
            };
            if !position.is_integral() {
                return Err(Error::NumericDomain { operation: format!("{current}[{index}]") });
            }
            let item = position.to_index()
                .and_then(|idx| items.get(idx))
                .ok_or_else(|| Error::IndexOutOfBounds { index: position.canonical(), len: items.len() })?
                .clone();
            current = item;
        }
        Ok(current)
    }

    /// Writes `child`, parenthesized if it binds no tighter than `parent`.
    fn fmt_operand(f: &mut fmt::Formatter<'_>, child: &Node<T>, parent: u8) -> fmt::Result {
        match child.precedence() {
            Some(prec) if prec <= parent => write!(f, "({child})"),
            _ => write!(f, "{child}"),
        }
    }
}

fn fmt_list<T: NumericBackend>(f: &mut fmt::Formatter<'_>, items: &[Node<T>]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl<T: NumericBackend> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number(value) => write!(f, "{}", value.canonical()),
            Node::Identifier(name) if name.chars().all(|c| c.is_ascii_digit()) => write!(f, "${name}"),
            Node::Identifier(name) => write!(f, "{name}"),
            Node::UnaryOperator { kind, operand } => {
                write!(f, "{kind}")?;
                Self::fmt_operand(f, operand, kind.precedence())
            }
            Node::BinaryOperator { kind, left, right } => {
                Self::fmt_operand(f, left, kind.precedence())?;
                write!(f, " {kind} ")?;
                Self::fmt_operand(f, right, kind.precedence())
            }
            Node::Function { name, args } => {
                write!(f, "{name}(")?;
                fmt_list(f, args)?;
                write!(f, ")")
            }
            Node::Vector(items) => {
                write!(f, "{{")?;
                fmt_list(f, items)?;
                write!(f, "}}")
            }
            Node::Brackets { target, indices } => {
                match target.precedence() {
                    Some(_) => write!(f, "({target})[")?,
                    None => write!(f, "{target}[")?,
                }
                fmt_list(f, indices)?;
                write!(f, "]")
            }
        }
    }
}
