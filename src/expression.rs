//! # expression.rs
//!
//! Parsed expressions and the tree builder fed by the parser.
//!
//! The parser emits operands and reductions in postfix order; the
//! [`ExpressionBuilder`] keeps a stack of finished subtrees and replaces the
//! top `n` of them by a new node at every reduction.

use crate::error::Result;
use crate::functions::core::NumericBackend;
use crate::lexer;
use crate::memory::ScopeMemory;
use crate::node::Node;
use crate::operators::{BinaryOperatorKind, UnaryOperatorKind};
use crate::parser;
use crate::token::{Category, Token};

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression<T = f64> {
    root: Node<T>,
}

impl<T: NumericBackend> Expression<T> {
    /// Tokenizes and parses `text`.
    ///
    /// # Errors
    ///
    /// Any tokenizer or parser error, see [`crate::parse`].
    ///
    /// # Examples
    /// ```rust
    /// use symcalc::Expression;
    ///
    /// let expr: Expression = Expression::parse("3x + y").unwrap();
    /// assert_eq!(expr.to_string(), "3 * x + y");
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        parser::parse(lexer::tokenize(text)?)
    }

    pub fn new(root: Node<T>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node<T> {
        &self.root
    }

    pub fn into_root(self) -> Node<T> {
        self.root
    }

    /// Evaluates the expression against `scope`.
    pub fn evaluate(&self, scope: &mut ScopeMemory<T>) -> Result<Node<T>> {
        self.root.evaluate(scope)
    }
}

impl<T: NumericBackend> std::fmt::Display for Expression<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// Accumulates parser output into a tree.
#[derive(Debug, Clone)]
pub struct ExpressionBuilder<T = f64> {
    stack: Vec<Node<T>>,
}

impl<T: NumericBackend> ExpressionBuilder<T> {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Pops the top `n` subtrees in source order.
    fn pop(&mut self, n: usize, token: &Token) -> Result<Vec<Node<T>>> {
        if self.stack.len() < n {
            return Err(token.unexpected());
        }
        Ok(self.stack.split_off(self.stack.len() - n))
    }

    /// Pushes a number or identifier token.
    ///
    /// # Errors
    ///
    /// `NumericExpected` if a number token cannot be read by the backend,
    /// `UnexpectedToken` for any other token category.
    pub fn push_operand(&mut self, token: &Token) -> Result<()> {
        let node = match token.kind().category() {
            Category::Number => Node::number(token.text())?,
            Category::Identifier => Node::identifier(token.text()),
            _ => return Err(token.unexpected()),
        };
        self.stack.push(node);
        Ok(())
    }

    /// Reduces the operand(s) of an operator token.
    pub fn apply_operator(&mut self, token: &Token) -> Result<()> {
        let node = if token.kind().is_unary() {
            let kind = UnaryOperatorKind::from_symbol(token.text()).ok_or_else(|| token.unexpected())?;
            let mut operands = self.pop(1, token)?;
            Node::unary(kind, operands.remove(0))
        } else {
            let kind = BinaryOperatorKind::from_symbol(token.text()).ok_or_else(|| token.unexpected())?;
            let mut operands = self.pop(2, token)?;
            let right = operands.remove(1);
            Node::binary(kind, operands.remove(0), right)
        };
        self.stack.push(node);
        Ok(())
    }

    /// Reduces a closed call, vector or bracket pair of `arity` entries.
    ///
    /// For bracket pairs `arity` counts the indexed target too.
    pub fn apply_pair(&mut self, opener: &Token, arity: usize) -> Result<()> {
        let mut items = self.pop(arity, opener)?;
        let node = match opener.kind().category() {
            Category::Function => Node::function(opener.text(), items),
            Category::CurlyBrace => Node::Vector(items),
            Category::Brackets if !items.is_empty() => {
                let target = items.remove(0);
                Node::Brackets { target: Box::new(target), indices: items }
            }
            _ => return Err(opener.unexpected()),
        };
        self.stack.push(node);
        Ok(())
    }

    /// Returns the single finished tree.
    ///
    /// # Errors
    ///
    /// `UnexpectedToken` at end of input unless exactly one tree remains.
    pub fn finish(mut self) -> Result<Expression<T>> {
        match (self.stack.pop(), self.stack.is_empty()) {
            (Some(root), true) => Ok(Expression::new(root)),
            _ => Err(Token::end_of_stream().unexpected()),
        }
    }
}

impl<T: NumericBackend> Default for ExpressionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
