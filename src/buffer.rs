// SPDX: CC0-1.0

use core::fmt;

// the characters a single keypress may contribute; multi-character
// insertions go through ExpressionBuffer::insert_literal instead
pub fn is_admissible_char(chr: char) -> bool {
    matches!(
        chr,
        '0'..='9' | '.' | '+' | '-' | '*' | '/' | '^' | '(' | ')' | 'π' | 'e' | ' '
    )
}

pub fn is_operator(chr: char) -> bool {
    matches!(chr, '+' | '-' | '*' | '/' | '^')
}

// pure and total (worst case is false); trailing spaces are ignored, so
// "2 " behaves like "2"
pub fn can_append_operator(buffer: &str, op: char) -> bool {
    if !is_operator(op) {
        return true;
    }
    match buffer.trim_end().chars().last() {
        // only unary minus may start an expression
        None => op == '-',
        // no adjacent operators
        Some(last) if is_operator(last) => false,
        // no implicit multiplication or division after an opening parenthesis
        Some('(') => op != '*' && op != '/',
        Some(_) => true,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputErrTyp {
    InvalidChar,
    OperatorPlacement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputErr {
    pub typ: InputErrTyp,
    pub chr: char,
}

impl fmt::Display for InputErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.typ {
            InputErrTyp::InvalidChar => write!(f, "invalid character '{}'", self.chr),
            InputErrTyp::OperatorPlacement => {
                write!(f, "invalid operator placement '{}'", self.chr)
            }
        }
    }
}

// invariant: every prefix is reachable through legal appends; a rejected
// append leaves the buffer untouched
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpressionBuffer {
    text: String,
}

impl ExpressionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    // all-or-nothing: on rejection the buffer is unchanged
    pub fn append(&mut self, input: &str) -> Result<(), InputErr> {
        let mut staged = self.text.clone();
        for chr in input.chars() {
            if !is_admissible_char(chr) {
                return Err(InputErr {
                    typ: InputErrTyp::InvalidChar,
                    chr,
                });
            }
            if is_operator(chr) && !can_append_operator(&staged, chr) {
                return Err(InputErr {
                    typ: InputErrTyp::OperatorPlacement,
                    chr,
                });
            }
            staged.push(chr);
        }
        self.text = staged;
        Ok(())
    }

    // for tokens produced by the calculator itself (function names with their
    // opening parenthesis, constants, recalled values); skips keypress checks
    pub fn insert_literal(&mut self, literal: &str) {
        self.text.push_str(literal);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

impl fmt::Display for ExpressionBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
