//! # token.rs
//!
//! Lexical tokens produced by the tokenizer and consumed by the parser.
//!
//! A token is an immutable `(kind, text, position)` record. Its kind is a
//! primary [`Category`] plus orthogonal modifiers (opening/closing side,
//! unary flag) that are queried through predicate methods. The
//! associativity of an operator token is read from the operator table.

use crate::error::Error;
use crate::operators::{Assoc, BinaryOperatorKind};

/// Primary category of a token. Categories are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Numeric literal such as `3`, `2.5` or `1e-3`.
    Number,
    /// Name of a variable or constant.
    Identifier,
    /// Function name fused with its opening parenthesis, e.g. `sin(`.
    ///
    /// Never emitted by the tokenizer; the parser composes it from an
    /// identifier directly followed by `(`.
    Function,
    /// One of `+ - * / = ^`.
    Operator,
    /// `(` or `)`.
    Parenthesis,
    /// `[` or `]`.
    Brackets,
    /// `{` or `}`.
    CurlyBrace,
    /// Argument separator `,`.
    Comma,
    /// Terminal marker appended after the last token.
    EndOfStream,
    /// Any character no other rule recognizes.
    Unknown,
}

/// Side of a paired delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Open,
    Close,
}

/// Category and modifiers of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenKind {
    category: Category,
    side: Option<Side>,
    unary: bool,
}

impl TokenKind {
    /// A kind without modifiers.
    pub const fn plain(category: Category) -> Self {
        Self { category, side: None, unary: false }
    }

    /// A paired delimiter kind.
    pub const fn pair(category: Category, side: Side) -> Self {
        Self { category, side: Some(side), unary: false }
    }

    /// A binary operator kind.
    pub const fn operator() -> Self {
        Self::plain(Category::Operator)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn is(&self, category: Category) -> bool {
        self.category == category
    }

    pub fn is_open(&self) -> bool {
        self.side == Some(Side::Open)
    }

    pub fn is_close(&self) -> bool {
        self.side == Some(Side::Close)
    }

    pub fn is_unary(&self) -> bool {
        self.unary
    }

    /// Whether this kind and `other` are the two halves of one delimiter pair.
    ///
    /// A function-open token is closed by a plain `)`.
    pub fn pairs_with(&self, other: &TokenKind) -> bool {
        let family = |c: Category| match c {
            Category::Function | Category::Parenthesis => Some(Category::Parenthesis),
            Category::Brackets | Category::CurlyBrace => Some(c),
            _ => None,
        };
        self.side.is_some()
            && other.side.is_some()
            && self.side != other.side
            && family(self.category).is_some()
            && family(self.category) == family(other.category)
    }
}

/// A lexical item with its text and byte offset in the source expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
    position: Option<usize>,
}

impl Token {
    /// Creates a token found at byte offset `position`.
    pub fn new(kind: TokenKind, text: &str, position: usize) -> Self {
        Self { kind, text: text.to_string(), position: Some(position) }
    }

    /// The terminal marker. It has no position and is always the last token.
    pub fn end_of_stream() -> Self {
        Self { kind: TokenKind::plain(Category::EndOfStream), text: String::new(), position: None }
    }

    /// Multiplication operator inserted between adjacent values (`3x`).
    pub fn implicit_multiplication(position: Option<usize>) -> Self {
        Self { kind: TokenKind::operator(), text: "*".to_string(), position }
    }

    /// Fuses an identifier with the opening parenthesis that follows it.
    pub fn function_open(identifier: &Token) -> Self {
        Self {
            kind: TokenKind::pair(Category::Function, Side::Open),
            text: identifier.text.clone(),
            position: identifier.position,
        }
    }

    /// The same operator reinterpreted as its prefix form.
    pub fn into_unary(self) -> Self {
        Self {
            kind: TokenKind { unary: true, ..self.kind },
            ..self
        }
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Associativity of an operator token: prefix operators nest to the
    /// right, binary operators follow [`BinaryOperatorKind::info`].
    pub fn assoc(&self) -> Option<Assoc> {
        if !self.is(Category::Operator) {
            return None;
        }
        if self.kind.is_unary() {
            return Some(Assoc::Right);
        }
        BinaryOperatorKind::from_symbol(&self.text).map(|kind| kind.info().assoc)
    }

    /// Byte offset in the source, `None` for the end marker.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn is(&self, category: Category) -> bool {
        self.kind.is(category)
    }

    /// `UnexpectedToken` error pointing at this token.
    pub fn unexpected(&self) -> Error {
        Error::UnexpectedToken { token: self.text.clone(), position: self.position }
    }

    /// `MismatchedToken` error pointing at this token.
    pub fn mismatched(&self) -> Error {
        Error::MismatchedToken { token: self.text.clone(), position: self.position }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{text} at {pos}", text = self.text),
            None => write!(f, "<end of stream>"),
        }
    }
}
