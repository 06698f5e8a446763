//! Tua lexical analyzer
//!
//! This module converts source text into a [`TokenStream`]. Dispatch is a
//! direct match on the class of the current character; each sub-scanner
//! commits the cursor once it returns, so there is no backtracking across
//! tokens.

use crate::error::{LexError, Position, Span};
use crate::token::{
    Token, TokenKind, TokenStream, Trivia, TriviaKind, decode_escape, lookup_keyword,
    match_symbol,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Cow;
use tracing::{debug, trace};

/// Bitfield flags for character classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterFlags(u8);

impl CharacterFlags {
    /// Whitespace filtered out of the token stream (space, tab, CR, LF, VT, FF)
    pub const WHITESPACE: Self = Self(1 << 0);
    /// Characters that can start an identifier or keyword
    pub const IDENT_START: Self = Self(1 << 1);
    /// Characters that can continue an identifier
    pub const IDENT_CONTINUE: Self = Self(1 << 2);
    /// Decimal digits
    pub const DIGIT: Self = Self(1 << 3);
    /// String delimiters
    pub const QUOTE: Self = Self(1 << 4);
    /// First characters of fixed-text symbols
    pub const SYMBOL_START: Self = Self(1 << 5);

    /// Creates empty flags
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Checks if any of the given flags are set
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Returns the union of two flag sets
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns true if no flags are set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for CharacterFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// ASCII lookup table for O(1) character classification.
///
/// Non-ASCII characters carry no flags: they start no token.
#[derive(Debug, Clone)]
pub struct CharacterTable([CharacterFlags; 128]);

impl CharacterTable {
    /// Creates a new character table with compile-time initialization
    pub const fn new() -> Self {
        let mut table = [CharacterFlags::empty(); 128];
        let mut i = 0;

        while i < 128 {
            let ch = i as u8;
            let mut flags = CharacterFlags::empty();

            match ch {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C => {
                    flags = flags.union(CharacterFlags::WHITESPACE);
                }
                _ => {}
            }

            match ch {
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                    flags = flags.union(CharacterFlags::IDENT_START);
                    flags = flags.union(CharacterFlags::IDENT_CONTINUE);
                }
                b'0'..=b'9' => {
                    flags = flags.union(CharacterFlags::DIGIT);
                    flags = flags.union(CharacterFlags::IDENT_CONTINUE);
                }
                _ => {}
            }

            match ch {
                b'"' | b'\'' => flags = flags.union(CharacterFlags::QUOTE),
                _ => {}
            }

            // `~` only ever starts `~=`
            match ch {
                b';' | b'=' | b',' | b':' | b'[' | b']' | b'(' | b')' | b'{' | b'}' | b'+'
                | b'-' | b'*' | b'/' | b'%' | b'^' | b'#' | b'|' | b'&' | b'<' | b'>' | b'.'
                | b'~' => {
                    flags = flags.union(CharacterFlags::SYMBOL_START);
                }
                _ => {}
            }

            table[i] = flags;
            i += 1;
        }

        Self(table)
    }

    /// Returns the flags for a character; non-ASCII characters have none
    #[inline(always)]
    pub const fn get_flags(&self, ch: char) -> CharacterFlags {
        if ch.is_ascii() {
            self.0[ch as usize]
        } else {
            CharacterFlags::empty()
        }
    }

    /// Tests if a character has any of the given flags
    #[inline(always)]
    pub const fn test_character(&self, ch: char, flags: CharacterFlags) -> bool {
        self.get_flags(ch).intersects(flags)
    }

    #[inline(always)]
    pub const fn is_whitespace(&self, ch: char) -> bool {
        self.test_character(ch, CharacterFlags::WHITESPACE)
    }

    #[inline(always)]
    pub const fn is_ident_start(&self, ch: char) -> bool {
        self.test_character(ch, CharacterFlags::IDENT_START)
    }

    #[inline(always)]
    pub const fn is_ident_continue(&self, ch: char) -> bool {
        self.test_character(ch, CharacterFlags::IDENT_CONTINUE)
    }

    #[inline(always)]
    pub const fn is_digit(&self, ch: char) -> bool {
        self.test_character(ch, CharacterFlags::DIGIT)
    }

    #[inline(always)]
    pub const fn is_quote(&self, ch: char) -> bool {
        self.test_character(ch, CharacterFlags::QUOTE)
    }

    #[inline(always)]
    pub const fn is_symbol_start(&self, ch: char) -> bool {
        self.test_character(ch, CharacterFlags::SYMBOL_START)
    }
}

impl Default for CharacterTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Global character table instance
pub static CHARACTER_TABLE: CharacterTable = CharacterTable::new();

/// Configuration options for the lexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerConfig {
    /// Retain whitespace and error-recovery spans on the trivia side channel
    pub keep_trivia: bool,
    /// Maximum number of errors recorded; later errors are only counted.
    /// Uncapped by default.
    pub max_errors: usize,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            keep_trivia: false,
            max_errors: usize::MAX,
        }
    }
}

/// Result of a complete tokenization call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexOutput<'a> {
    /// Token stream, terminated by `EndOfInput`
    pub tokens: TokenStream<'a>,
    /// Recorded lexical errors in detection order
    pub errors: SmallVec<[LexError; 4]>,
    /// Errors detected after `max_errors` was reached
    pub suppressed_errors: usize,
}

impl LexOutput<'_> {
    /// Returns true when no lexical error was detected
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.suppressed_errors == 0
    }
}

/// Minimal snapshot of the cursor for speculative lookahead
#[derive(Debug, Clone, Copy)]
pub struct LexerSnapshot {
    position: Position,
    current_char: Option<char>,
}

/// Tua lexer: cursor state plus the error and trivia side channels
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    /// Input text being lexed
    input: &'a str,
    /// Current line, column and byte offset
    position: Position,
    /// Cached current character
    current_char: Option<char>,
    /// Lexer configuration
    config: LexerConfig,
    /// Errors recorded so far
    errors: SmallVec<[LexError; 4]>,
    /// Errors past the configured cap
    suppressed_errors: usize,
    /// Whitespace and skipped spans, when retained
    trivia: Vec<Trivia>,
    /// Set once `EndOfInput` has been produced
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer with default configuration
    pub fn new(input: &'a str) -> Self {
        Self::with_config(input, LexerConfig::default())
    }

    /// Creates a new lexer with custom configuration
    pub fn with_config(input: &'a str, config: LexerConfig) -> Self {
        Self {
            input,
            position: Position::new(),
            current_char: input.chars().next(),
            config,
            errors: SmallVec::new(),
            suppressed_errors: 0,
            trivia: Vec::new(),
            finished: false,
        }
    }

    /// Returns the current position in the input
    #[inline(always)]
    pub fn current_position(&self) -> Position {
        self.position
    }

    /// Returns the underlying source text
    #[inline(always)]
    pub fn source(&self) -> &'a str {
        self.input
    }

    /// Errors recorded so far
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Creates a snapshot of the cursor for backtracking
    pub fn snapshot(&self) -> LexerSnapshot {
        LexerSnapshot {
            position: self.position,
            current_char: self.current_char,
        }
    }

    /// Restores the cursor from a snapshot
    pub fn restore(&mut self, snapshot: LexerSnapshot) {
        self.position = snapshot.position;
        self.current_char = snapshot.current_char;
    }

    /// Peeks at the current character without advancing
    #[inline(always)]
    pub fn peek_char(&self) -> Option<char> {
        self.current_char
    }

    /// Peeks at the character at the given offset from current position
    #[inline(always)]
    pub fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.position.offset..].chars().nth(offset)
    }

    /// Advances to the next character and returns the consumed one
    #[inline(always)]
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.current_char?;
        let next = self.peek_char_at(1);
        self.position.advance(ch, next);
        self.current_char = next;
        Some(ch)
    }

    /// Returns true once the cursor has consumed the whole input
    #[inline(always)]
    pub fn is_at_end(&self) -> bool {
        self.current_char.is_none()
    }

    #[inline(always)]
    fn slice_from(&self, start: Position) -> &'a str {
        &self.input[start.offset..self.position.offset]
    }

    #[inline(always)]
    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.position)
    }

    fn finish_token(&self, kind: TokenKind, start: Position) -> Token<'a> {
        Token::new(kind, self.slice_from(start), self.span_from(start))
    }

    fn record_error(&mut self, error: LexError) {
        trace!(%error, "lexical error");
        if self.errors.len() < self.config.max_errors {
            self.errors.push(error);
        } else {
            self.suppressed_errors += 1;
        }
    }

    fn record_trivia(&mut self, kind: TriviaKind, start: Position) {
        if self.config.keep_trivia && self.position.offset > start.offset {
            let span = self.span_from(start);
            trace!(?kind, %span, "trivia");
            self.trivia.push(Trivia { kind, span });
        }
    }

    /// Returns true at a backslash that is directly followed by a line break
    fn at_line_continuation(&self) -> bool {
        self.current_char == Some('\\')
            && match self.peek_char_at(1) {
                Some('\n') => true,
                Some('\r') => self.peek_char_at(2) == Some('\n'),
                _ => false,
            }
    }

    /// Consumes a maximal run of whitespace and line-continuation markers
    fn skip_whitespace(&mut self) {
        let start = self.position;
        loop {
            match self.current_char {
                Some(ch) if CHARACTER_TABLE.is_whitespace(ch) => {
                    self.advance();
                }
                Some('\\') if self.at_line_continuation() => {
                    self.advance();
                    if self.current_char == Some('\r') {
                        self.advance();
                    }
                    self.advance();
                }
                _ => break,
            }
        }
        self.record_trivia(TriviaKind::Whitespace, start);
    }

    /// Reports `ch` as unrecognized and skips exactly that character
    fn skip_unrecognized(&mut self, ch: char) {
        let start = self.position;
        self.record_error(LexError::UnrecognizedCharacter {
            character: ch,
            position: start,
        });
        self.advance();
        self.record_trivia(TriviaKind::Skipped, start);
    }

    /// Returns the next token, recording any lexical errors on the way.
    ///
    /// Returns `EndOfInput` once the input is exhausted, and on every call after.
    pub fn next_token(&mut self) -> Token<'a> {
        loop {
            let start = self.position;
            let Some(ch) = self.current_char else {
                self.finished = true;
                return self.finish_token(TokenKind::EndOfInput, start);
            };

            if CHARACTER_TABLE.is_whitespace(ch) || self.at_line_continuation() {
                self.skip_whitespace();
            } else if CHARACTER_TABLE.is_ident_start(ch) {
                return self.lex_keyword_or_identifier();
            } else if CHARACTER_TABLE.is_digit(ch)
                || (ch == '.' && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit()))
            {
                return self.lex_number();
            } else if CHARACTER_TABLE.is_quote(ch) {
                if let Some(token) = self.lex_string() {
                    return token;
                }
            } else if CHARACTER_TABLE.is_symbol_start(ch) {
                if let Some(token) = self.lex_symbol() {
                    return token;
                }
            } else {
                self.skip_unrecognized(ch);
            }
        }
    }

    /// Runs the lexer to completion and returns the token stream with all errors
    pub fn tokenize(mut self) -> LexOutput<'a> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::EndOfInput;
            tokens.push(token);
            if done {
                break;
            }
        }

        debug!(
            bytes = self.input.len(),
            tokens = tokens.len(),
            errors = self.errors.len() + self.suppressed_errors,
            "tokenized source"
        );

        LexOutput {
            tokens: TokenStream::new(self.input, tokens, self.trivia),
            errors: self.errors,
            suppressed_errors: self.suppressed_errors,
        }
    }

    /// Lexes an identifier, then resolves it against the reserved words
    fn lex_keyword_or_identifier(&mut self) -> Token<'a> {
        let start = self.position;
        self.advance();
        while self
            .current_char
            .is_some_and(|c| CHARACTER_TABLE.is_ident_continue(c))
        {
            self.advance();
        }

        let kind = lookup_keyword(self.slice_from(start)).unwrap_or(TokenKind::Identifier);
        self.finish_token(kind, start)
    }

    fn skip_digits(&mut self) {
        while self.current_char.is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Lexes an integer or floating-point literal by maximal munch.
    ///
    /// A digit run followed by `.` is always a float (`12.`, `007.5`).
    /// Otherwise the integer shape allows `0` alone or a run without a
    /// leading zero, so `007` lexes as `0`, `0`, `7`.
    fn lex_number(&mut self) -> Token<'a> {
        let start = self.position;

        if self.current_char == Some('.') {
            self.advance();
            self.skip_digits();
            return self.finish_token(TokenKind::FloatLiteral, start);
        }

        let mark = self.snapshot();
        self.skip_digits();

        if self.current_char == Some('.') {
            self.advance();
            self.skip_digits();
            return self.finish_token(TokenKind::FloatLiteral, start);
        }

        let digits = self.slice_from(start);
        if digits.len() > 1 && digits.starts_with('0') {
            self.restore(mark);
            self.advance();
        }
        self.finish_token(TokenKind::IntLiteral, start)
    }

    /// Lexes a single- or double-quoted string, decoding escapes.
    ///
    /// The decoded value borrows the source until the first escape is seen.
    /// Returns `None` for an unterminated literal, whose remainder is skipped.
    fn lex_string(&mut self) -> Option<Token<'a>> {
        let start = self.position;
        let input = self.input;
        let quote = self.advance()?;
        let body_start = self.position.offset;
        let mut decoded: Option<String> = None;

        loop {
            match self.current_char {
                None => {
                    self.record_error(LexError::UnterminatedString { position: start });
                    self.record_trivia(TriviaKind::Skipped, start);
                    return None;
                }
                Some(ch) if ch == quote => {
                    let body_end = self.position.offset;
                    self.advance();
                    let value = match decoded {
                        Some(owned) => Cow::Owned(owned),
                        None => Cow::Borrowed(&input[body_start..body_end]),
                    };
                    return Some(Token::string(
                        self.slice_from(start),
                        value,
                        self.span_from(start),
                    ));
                }
                Some('\\') => {
                    let escape_offset = self.position.offset;
                    let value = decoded
                        .get_or_insert_with(|| input[body_start..escape_offset].to_string());
                    self.advance();

                    match self.current_char {
                        // Backslash at end of input: reported as unterminated
                        None => {}
                        Some('\n') => {
                            self.advance();
                        }
                        Some('\r') if self.peek_char_at(1) == Some('\n') => {
                            self.advance();
                            self.advance();
                        }
                        // `\z` skips the following run of whitespace, line breaks included
                        Some('z') => {
                            self.advance();
                            while self
                                .current_char
                                .is_some_and(|c| CHARACTER_TABLE.is_whitespace(c))
                            {
                                self.advance();
                            }
                        }
                        Some(escaped) => {
                            match decode_escape(escaped) {
                                Some(ch) => value.push(ch),
                                None => {
                                    value.push(escaped);
                                    self.record_error(LexError::InvalidEscapeSequence {
                                        sequence: escaped,
                                        position: self.position,
                                    });
                                }
                            }
                            self.advance();
                        }
                    }
                }
                Some(ch) => {
                    if let Some(value) = decoded.as_mut() {
                        value.push(ch);
                    }
                    self.advance();
                }
            }
        }
    }

    /// Lexes punctuation and operators, longest match first.
    ///
    /// Returns `None` when no symbol matches (a lone `~`), after reporting it.
    fn lex_symbol(&mut self) -> Option<Token<'a>> {
        let start = self.position;
        match match_symbol(&self.input[start.offset..]) {
            Some((kind, len)) => {
                // Every symbol is ASCII, so its byte length is its char count
                for _ in 0..len {
                    self.advance();
                }
                Some(self.finish_token(kind, start))
            }
            None => {
                if let Some(ch) = self.current_char {
                    self.skip_unrecognized(ch);
                }
                None
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    /// Yields tokens up to and including `EndOfInput`
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            None
        } else {
            Some(self.next_token())
        }
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}
