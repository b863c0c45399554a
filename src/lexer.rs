//! lexer.rs
//!
//! This module provides the tokenizer for expressions. It scans the input
//! once, from left to right, and at each position tries a fixed list of rules
//! in priority order:
//!
//! 1. numeric literal (`12`, `3.25`, `.5`, `6.02e23`)
//! 2. identifier (Unicode letter or `_`, then letters, digits or `_`)
//! 3. operators `+ - * /`
//! 4. operators `= ^`
//! 5. paired delimiters `( ) [ ] { }`
//! 6. comma
//! 7. any other single character, as an `Unknown` token
//!
//! Whitespace separates tokens and is otherwise ignored. The last rule makes
//! the scan total: every input produces a token sequence, terminated by one
//! `EndOfStream` token.

use crate::error::{Error, Result};
use crate::token::{Category, Side, Token, TokenKind};

type CharIter<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

/// Consumes consecutive ASCII digits and returns the end index.
fn scan_digits(mut end: usize, chars: &mut CharIter) -> usize
{
    while let Some(&(idx, ch)) = chars.peek() {
        if !ch.is_ascii_digit() {
            break;
        }
        chars.next();
        end = idx + ch.len_utf8();
    }
    end
}

/// Returns true if `input[idx..]` starts with an ASCII digit.
fn digit_at(input: &str, idx: usize) -> bool {
    input[idx..].chars().next().is_some_and(|ch| ch.is_ascii_digit())
}

/// Parses a numeric literal starting at `start_idx`.
///
/// The fractional part is consumed only when a digit follows the dot, and the
/// exponent only when digits follow `e`/`E` (with an optional sign), so `2e`
/// scans as the number `2` followed by the identifier `e`.
///
/// # Returns
///
/// The ending index of the literal.
fn parse_number(input: &str, start_idx: usize, first: char, chars: &mut CharIter) -> usize
{
    let mut end = start_idx + first.len_utf8();
    if first != '.' {
        end = scan_digits(end, chars);
        if input[end..].starts_with('.') && digit_at(input, end + 1) {
            chars.next();
            end += 1;
        }
    }
    end = scan_digits(end, chars);

    if input[end..].starts_with(['e', 'E']) {
        let mut mark = end + 1;
        if input[mark..].starts_with(['+', '-']) {
            mark += 1;
        }
        if digit_at(input, mark) {
            while chars.peek().is_some_and(|&(idx, _)| idx < mark) {
                chars.next();
            }
            end = scan_digits(mark, chars);
        }
    }
    end
}

/// Parses an identifier starting at `start_idx`.
///
/// # Returns
///
/// The ending index of the identifier.
fn parse_ident(start_idx: usize, first: char, chars: &mut CharIter) -> usize
{
    let mut end = start_idx + first.len_utf8();
    while let Some(&(idx, ch)) = chars.peek() {
        if !(ch.is_alphanumeric() || ch == '_') {
            break;
        }
        chars.next();
        end = idx + ch.len_utf8();
    }
    end
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

/// Kind of a single-character token.
fn symbol_kind(ch: char) -> TokenKind {
    match ch {
        '+' | '-' | '*' | '/' | '=' | '^' => TokenKind::operator(),
        '(' => TokenKind::pair(Category::Parenthesis, Side::Open),
        ')' => TokenKind::pair(Category::Parenthesis, Side::Close),
        '[' => TokenKind::pair(Category::Brackets, Side::Open),
        ']' => TokenKind::pair(Category::Brackets, Side::Close),
        '{' => TokenKind::pair(Category::CurlyBrace, Side::Open),
        '}' => TokenKind::pair(Category::CurlyBrace, Side::Close),
        ',' => TokenKind::plain(Category::Comma),
        _ => TokenKind::plain(Category::Unknown),
    }
}

/// Splits `input` into tokens.
///
/// The returned sequence always ends with exactly one `EndOfStream` token.
///
/// # Errors
///
/// [`Error::Tokenize`] if a rule fails to advance the cursor. The catch-all
/// rule makes this unreachable for any string; the check guards the tiling
/// invariant against regressions in the rules above.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start_idx, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }

        let (kind, end_idx) = if ch.is_ascii_digit() || (ch == '.' && digit_at(input, start_idx + 1)) {
            (TokenKind::plain(Category::Number), parse_number(input, start_idx, ch, &mut chars))
        } else if is_ident_start(ch) {
            (TokenKind::plain(Category::Identifier), parse_ident(start_idx, ch, &mut chars))
        } else {
            (symbol_kind(ch), start_idx + ch.len_utf8())
        };

        if end_idx <= start_idx {
            return Err(Error::Tokenize { position: start_idx });
        }
        tokens.push(Token::new(kind, &input[start_idx..end_idx], start_idx));
    }

    tokens.push(Token::end_of_stream());
    log::trace!("tokenized {input:?} into {} tokens", tokens.len());
    Ok(tokens)
}
