//! Error types and position tracking for Tua tokenization
//!
//! Lexical errors never abort a tokenization call: the driver records them
//! and keeps scanning, so every error type here carries the position of the
//! offending character rather than unwinding state.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

/// Represents a position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (0-based, counted in code points)
    pub column: usize,
    /// Byte offset from start of input (0-based)
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of input
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 0,
            offset: 0,
        }
    }

    /// Advances the position past `c`, given the character that follows it.
    ///
    /// A carriage return directly followed by a line feed only moves the
    /// offset; the line feed performs the break.
    pub fn advance(&mut self, c: char, next: Option<char>) {
        match c {
            '\n' => {
                self.line += 1;
                self.column = 0;
            }
            '\r' if next == Some('\n') => {}
            '\r' => {
                self.line += 1;
                self.column = 0;
            }
            _ => {
                self.column += 1;
            }
        }
        self.offset += c.len_utf8();
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a span of text in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start position of the span
    pub start: Position,
    /// End position of the span (exclusive)
    pub end: Position,
}

impl Span {
    /// Creates a new span from start and end positions
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates a span covering a single position
    pub fn single(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Returns the length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// Returns true if the span is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the slice of `source` this span covers, if it lies on char boundaries
    pub fn slice<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.start.offset..self.end.offset)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Lexical analysis errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind")]
pub enum LexError {
    /// A character that starts no valid token
    #[error("Unrecognized character '{}' at {position}", .character.escape_debug())]
    UnrecognizedCharacter { character: char, position: Position },

    /// Quoted literal reached end of input without its closing quote
    #[error("Unterminated string at {position}")]
    UnterminatedString { position: Position },

    /// Backslash followed by a character outside the escape table
    #[error("Invalid escape sequence '\\{}' at {position}", .sequence.escape_debug())]
    InvalidEscapeSequence { sequence: char, position: Position },
}

/// Category of a [`LexError`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LexErrorKind {
    UnrecognizedCharacter,
    UnterminatedString,
    InvalidEscapeSequence,
}

impl LexError {
    /// Returns the error category
    pub fn kind(&self) -> LexErrorKind {
        match self {
            LexError::UnrecognizedCharacter { .. } => LexErrorKind::UnrecognizedCharacter,
            LexError::UnterminatedString { .. } => LexErrorKind::UnterminatedString,
            LexError::InvalidEscapeSequence { .. } => LexErrorKind::InvalidEscapeSequence,
        }
    }

    /// Returns the position of the offending character
    pub fn position(&self) -> Position {
        match self {
            LexError::UnrecognizedCharacter { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidEscapeSequence { position, .. } => *position,
        }
    }
}

/// Every lexical error collected by a strict tokenization call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeError {
    errors: SmallVec<[LexError; 4]>,
}

impl TokenizeError {
    /// Wraps a non-empty error list; returns `None` when there is nothing to report
    pub fn new(errors: SmallVec<[LexError; 4]>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// All errors, in detection order
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Consumes the error and returns the underlying list
    pub fn into_errors(self) -> SmallVec<[LexError; 4]> {
        self.errors
    }
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "no lexical errors"),
            [only] => write!(f, "{}", only),
            [first, rest @ ..] => write!(f, "{} (and {} more lexical errors)", first, rest.len()),
        }
    }
}

impl std::error::Error for TokenizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors
            .first()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
