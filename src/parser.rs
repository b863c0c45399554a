//! # parser.rs
//!
//! Shunting-yard parser turning a token sequence into an [`Expression`].
//!
//! The parser is a state machine over three pieces of state:
//!
//! - a stack of pending operators and open delimiter pairs, each pair
//!   carrying the number of arguments seen so far,
//! - the [`ExpressionBuilder`] receiving operands and reductions in postfix
//!   order,
//! - the `expect_operator` flag, set after a complete value.
//!
//! # Notes
//! - An identifier followed directly by `(` is composed into one
//!   function-open token before parsing starts.
//! - A value directly after another value inserts an implicit `*`:
//!   `3x`, `2(x + 1)` and `3f(x)g(y)`.
//! - `+` or `-` where no operator is expected is a unary prefix operator.
//! - Binary operators reduce pending operators of higher precedence, and of
//!   equal precedence when left-associative.

use crate::error::Result;
use crate::expression::{Expression, ExpressionBuilder};
use crate::functions::core::NumericBackend;
use crate::operators::{Assoc, BinaryOperatorKind, UNARY_PRECEDENCE};
use crate::token::{Category, Side, Token};

/// Kind of an open delimiter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
    /// Grouping `(`.
    Paren,
    /// Call `name(`.
    Function,
    /// Vector literal `{`.
    Brace,
    /// Indexing `[`.
    Bracket,
}

impl Opener {
    fn of(token: &Token) -> Option<Self> {
        match token.kind().category() {
            Category::Parenthesis => Some(Opener::Paren),
            Category::Function => Some(Opener::Function),
            Category::CurlyBrace => Some(Opener::Brace),
            Category::Brackets => Some(Opener::Bracket),
            _ => None,
        }
    }

    /// Whether the pair collects a comma separated argument list.
    fn counts_arguments(&self) -> bool {
        !matches!(self, Opener::Paren)
    }

    /// Whether the pair may close with no argument at all.
    fn allows_empty(&self) -> bool {
        matches!(self, Opener::Function | Opener::Brace)
    }
}

/// An open pair waiting for its closer.
#[derive(Debug, Clone)]
struct Pending {
    opener: Opener,
    token: Token,
    args: usize,
    /// True until the current argument slot has received a value.
    slot_open: bool,
}

#[derive(Debug, Clone)]
enum Entry {
    Operator(Token),
    Pair(Pending),
}

/// Composes every identifier directly followed by `(` into a function-open
/// token.
fn compose(tokens: Vec<Token>) -> Vec<Token> {
    let mut composed = Vec::with_capacity(tokens.len());
    let mut tokens = tokens.into_iter().peekable();
    while let Some(token) = tokens.next() {
        let opens_call = token.is(Category::Identifier)
            && tokens.peek().is_some_and(|next| next.is(Category::Parenthesis) && next.kind().is_open());
        if opens_call {
            tokens.next();
            composed.push(Token::function_open(&token));
        } else {
            composed.push(token);
        }
    }
    composed
}

/// Parses a token sequence terminated by an `EndOfStream` token.
///
/// # Errors
///
/// - `UnexpectedToken` for a token the grammar forbids at its position,
///   including a premature end of input.
/// - `MismatchedToken` for a closer without opener, a closer of the wrong
///   type, or an opener never closed.
/// - `NumericExpected` for a number literal the backend cannot read.
pub fn parse<T: NumericBackend>(tokens: Vec<Token>) -> Result<Expression<T>> {
    let mut parser = Parser::new();
    for token in compose(tokens) {
        if token.is(Category::EndOfStream) {
            return parser.parse_in_end(&token);
        }
        parser.step(token)?;
    }
    parser.parse_in_end(&Token::end_of_stream())
}

struct Parser<T> {
    stack: Vec<Entry>,
    output: ExpressionBuilder<T>,
    expect_operator: bool,
}

impl<T: NumericBackend> Parser<T> {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            output: ExpressionBuilder::new(),
            expect_operator: false,
        }
    }

    fn step(&mut self, token: Token) -> Result<()> {
        log::trace!("parse {token} (expect operator: {})", self.expect_operator);
        match token.kind().category() {
            Category::Number | Category::Identifier => self.parse_in_operand(token),
            Category::Operator => self.parse_in_operator(token),
            Category::Parenthesis | Category::Function | Category::CurlyBrace | Category::Brackets => {
                match token.kind().side() {
                    Some(Side::Open) => self.parse_in_open(token),
                    _ => self.parse_in_close(&token),
                }
            }
            Category::Comma => self.parse_in_comma(&token),
            Category::EndOfStream | Category::Unknown => Err(token.unexpected()),
        }
    }

    /// Counts a value for the innermost argument list, once per slot.
    fn count_value(&mut self) {
        let innermost = self.stack.iter_mut().rev().find_map(|entry| match entry {
            Entry::Pair(pending) => Some(pending),
            Entry::Operator(_) => None,
        });
        if let Some(pending) = innermost {
            if pending.opener.counts_arguments() && pending.slot_open {
                pending.args += 1;
                pending.slot_open = false;
            }
        }
    }

    /// Emits the reduction of a popped stack entry.
    fn reduce(&mut self, token: &Token) -> Result<()> {
        self.output.apply_operator(token)
    }

    fn parse_in_operand(&mut self, token: Token) -> Result<()> {
        if self.expect_operator {
            if token.is(Category::Number) {
                return Err(token.unexpected());
            }
            self.parse_in_binary_operator(Token::implicit_multiplication(token.position()))?;
        }
        self.count_value();
        self.output.push_operand(&token)?;
        self.expect_operator = true;
        Ok(())
    }

    fn parse_in_operator(&mut self, token: Token) -> Result<()> {
        if self.expect_operator {
            self.parse_in_binary_operator(token)?;
        } else {
            self.parse_in_unary_operator(token)?;
        }
        self.expect_operator = false;
        Ok(())
    }

    /// Pushes a prefix operator without reducing anything.
    fn parse_in_unary_operator(&mut self, token: Token) -> Result<()> {
        match token.text() {
            "+" | "-" => {
                self.stack.push(Entry::Operator(token.into_unary()));
                Ok(())
            }
            _ => Err(token.unexpected()),
        }
    }

    /// Reduces pending operators that bind at least as tight, then pushes
    /// `token`.
    fn parse_in_binary_operator(&mut self, token: Token) -> Result<()> {
        let info = BinaryOperatorKind::from_symbol(token.text())
            .ok_or_else(|| token.unexpected())?
            .info();
        let left_assoc = info.assoc == Assoc::Left;

        while let Some(Entry::Operator(top)) = self.stack.last() {
            let top_precedence = if top.kind().is_unary() {
                UNARY_PRECEDENCE
            } else {
                BinaryOperatorKind::from_symbol(top.text())
                    .ok_or_else(|| top.unexpected())?
                    .precedence()
            };
            if top_precedence < info.precedence || (top_precedence == info.precedence && !left_assoc) {
                break;
            }
            if let Some(Entry::Operator(top)) = self.stack.pop() {
                self.reduce(&top)?;
            }
        }
        self.stack.push(Entry::Operator(token));
        Ok(())
    }

    fn parse_in_open(&mut self, token: Token) -> Result<()> {
        let opener = Opener::of(&token).ok_or_else(|| token.unexpected())?;
        let mut args = 0;
        match opener {
            Opener::Paren | Opener::Function => {
                if self.expect_operator {
                    self.parse_in_binary_operator(Token::implicit_multiplication(token.position()))?;
                }
                self.count_value();
            }
            Opener::Brace => {
                if self.expect_operator {
                    return Err(token.unexpected());
                }
                self.count_value();
            }
            Opener::Bracket => {
                if !self.expect_operator {
                    return Err(token.unexpected());
                }
                // the indexed value is the first entry
                args = 1;
            }
        }
        self.stack.push(Entry::Pair(Pending { opener, token, args, slot_open: true }));
        self.expect_operator = false;
        Ok(())
    }

    fn parse_in_close(&mut self, token: &Token) -> Result<()> {
        if !self.expect_operator {
            let empty_pair = matches!(
                self.stack.last(),
                Some(Entry::Pair(pending))
                    if pending.opener.allows_empty()
                        && pending.args == 0
                        && pending.token.kind().pairs_with(token.kind())
            );
            if !empty_pair {
                return Err(token.unexpected());
            }
        }

        loop {
            match self.stack.pop() {
                Some(Entry::Operator(op)) => self.reduce(&op)?,
                Some(Entry::Pair(pending)) => {
                    if !pending.token.kind().pairs_with(token.kind()) {
                        return Err(token.mismatched());
                    }
                    if pending.opener.counts_arguments() {
                        self.output.apply_pair(&pending.token, pending.args)?;
                    }
                    break;
                }
                None => return Err(token.mismatched()),
            }
        }
        self.expect_operator = true;
        Ok(())
    }

    fn parse_in_comma(&mut self, token: &Token) -> Result<()> {
        if !self.expect_operator {
            return Err(token.unexpected());
        }
        loop {
            match self.stack.last_mut() {
                Some(Entry::Pair(pending)) if pending.opener.counts_arguments() => {
                    pending.slot_open = true;
                    break;
                }
                Some(Entry::Pair(_)) | None => return Err(token.unexpected()),
                Some(Entry::Operator(_)) => {
                    if let Some(Entry::Operator(op)) = self.stack.pop() {
                        self.reduce(&op)?;
                    }
                }
            }
        }
        self.expect_operator = false;
        Ok(())
    }

    /// An opener still pending at the end of input is reported before a
    /// dangling operator.
    fn parse_in_end(mut self, token: &Token) -> Result<Expression<T>> {
        let unclosed = self.stack.iter().rev().find_map(|entry| match entry {
            Entry::Pair(pending) => Some(pending),
            Entry::Operator(_) => None,
        });
        if let Some(pending) = unclosed {
            return Err(pending.token.mismatched());
        }
        if !self.expect_operator {
            return Err(token.unexpected());
        }
        while let Some(Entry::Operator(op)) = self.stack.pop() {
            self.reduce(&op)?;
        }
        self.output.finish()
    }
}
