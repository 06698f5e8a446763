//! Token types and classifier tables
//!
//! The reserved-word, fixed-symbol and escape tables here are process-wide
//! read-only data. The reserved-word map is built on first access behind a
//! `LazyLock`, which is the only initialization barrier tokenization needs.

use crate::error::{Position, Span};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

/// Closed set of token kinds produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Punctuation and operators
    Semicolon,
    Assign,
    Comma,
    Colon,
    LBracket,
    RBracket,
    Dot,
    LParen,
    RParen,
    Arrow,
    LBrace,
    RBrace,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Hash,
    Eq,
    NotEq,
    LtEq,
    GtEq,
    Lt,
    Gt,
    Pipe,
    Amp,
    DotDot,

    // Keywords
    Do,
    End,
    While,
    If,
    Then,
    ElseIf,
    Else,
    For,
    In,
    Function,
    TypeTable,
    TypeUnion,
    TypeList,
    Nil,
    Return,
    Break,
    Continue,
    Or,
    And,
    Not,

    // Literals
    Identifier,
    False,
    True,
    IntLiteral,
    FloatLiteral,
    StringLiteral,

    // Special
    EndOfInput,
}

impl TokenKind {
    /// Returns the fixed source text for keywords and symbols, or a category
    /// name for tokens whose text varies
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Semicolon => ";",
            TokenKind::Assign => "=",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Arrow => "->",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Caret => "^",
            TokenKind::Hash => "#",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "~=",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Pipe => "|",
            TokenKind::Amp => "&",
            TokenKind::DotDot => "..",
            TokenKind::Do => "do",
            TokenKind::End => "end",
            TokenKind::While => "while",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::ElseIf => "elseif",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::Function => "function",
            TokenKind::TypeTable => "Table",
            TokenKind::TypeUnion => "Union",
            TokenKind::TypeList => "List",
            TokenKind::Nil => "nil",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Or => "or",
            TokenKind::And => "and",
            TokenKind::Not => "not",
            TokenKind::False => "false",
            TokenKind::True => "true",
            TokenKind::Identifier => "identifier",
            TokenKind::IntLiteral => "integer",
            TokenKind::FloatLiteral => "float",
            TokenKind::StringLiteral => "string",
            TokenKind::EndOfInput => "end of input",
        }
    }

    /// Returns true for reserved words, including `true`, `false` and `nil`
    pub fn is_keyword(self) -> bool {
        RESERVED_WORDS.values().any(|&kind| kind == self)
    }

    /// Returns true for fixed-text punctuation and operators
    pub fn is_symbol(self) -> bool {
        SYMBOLS.iter().any(|&(_, kind)| kind == self)
    }

    /// Returns true for tokens that denote a literal value
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Nil
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_keyword() || self.is_symbol() {
            write!(f, "'{}'", self.as_str())
        } else {
            f.write_str(self.as_str())
        }
    }
}

/// Reserved words, in grammar order
const RESERVED_WORD_LIST: [(&str, TokenKind); 22] = [
    ("do", TokenKind::Do),
    ("end", TokenKind::End),
    ("while", TokenKind::While),
    ("if", TokenKind::If),
    ("then", TokenKind::Then),
    ("elseif", TokenKind::ElseIf),
    ("else", TokenKind::Else),
    ("for", TokenKind::For),
    ("in", TokenKind::In),
    ("function", TokenKind::Function),
    ("Table", TokenKind::TypeTable),
    ("Union", TokenKind::TypeUnion),
    ("List", TokenKind::TypeList),
    ("nil", TokenKind::Nil),
    ("return", TokenKind::Return),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
    ("or", TokenKind::Or),
    ("and", TokenKind::And),
    ("not", TokenKind::Not),
    ("false", TokenKind::False),
    ("true", TokenKind::True),
];

/// Reserved-word table (case-sensitive, exact match)
pub static RESERVED_WORDS: LazyLock<IndexMap<&'static str, TokenKind>> =
    LazyLock::new(|| RESERVED_WORD_LIST.into_iter().collect());

/// Looks up a fully scanned identifier in the reserved-word table
#[inline]
pub fn lookup_keyword(text: &str) -> Option<TokenKind> {
    RESERVED_WORDS.get(text).copied()
}

/// Fixed-text symbols, two-character entries first so the first hit is the
/// longest match
pub static SYMBOLS: &[(&str, TokenKind)] = &[
    ("->", TokenKind::Arrow),
    ("==", TokenKind::Eq),
    ("~=", TokenKind::NotEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("..", TokenKind::DotDot),
    (";", TokenKind::Semicolon),
    ("=", TokenKind::Assign),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("^", TokenKind::Caret),
    ("#", TokenKind::Hash),
    ("|", TokenKind::Pipe),
    ("&", TokenKind::Amp),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    (".", TokenKind::Dot),
];

/// Returns the longest fixed symbol at the start of `rest` and its byte length
#[inline]
pub fn match_symbol(rest: &str) -> Option<(TokenKind, usize)> {
    SYMBOLS
        .iter()
        .find(|(text, _)| rest.starts_with(text))
        .map(|&(text, kind)| (kind, text.len()))
}

/// Escape table: character after the backslash and its decoded value.
///
/// `\z` and line continuations produce no character and are handled by the
/// string scanner.
pub static ESCAPES: &[(char, char)] = &[
    ('n', '\n'),
    ('t', '\t'),
    ('r', '\r'),
    ('a', '\u{0007}'),
    ('b', '\u{0008}'),
    ('f', '\u{000C}'),
    ('v', '\u{000B}'),
    ('\\', '\\'),
    ('"', '"'),
    ('\'', '\''),
    ('|', '|'),
];

/// Decodes the character following a backslash
#[inline]
pub fn decode_escape(ch: char) -> Option<char> {
    ESCAPES
        .iter()
        .find(|&&(escape, _)| escape == ch)
        .map(|&(_, decoded)| decoded)
}

/// A classified, positioned unit of source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Exact source slice consumed, quotes and escape syntax included
    pub text: &'a str,
    /// Decoded contents; only string literals carry one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Cow<'a, str>>,
    pub span: Span,
}

impl<'a> Token<'a> {
    /// Creates a token whose decoded value is its raw text
    pub fn new(kind: TokenKind, text: &'a str, span: Span) -> Self {
        Self {
            kind,
            text,
            value: None,
            span,
        }
    }

    /// Creates a string literal token
    pub fn string(text: &'a str, value: Cow<'a, str>, span: Span) -> Self {
        Self {
            kind: TokenKind::StringLiteral,
            text,
            value: Some(value),
            span,
        }
    }

    /// Start position of the token
    pub fn position(&self) -> Position {
        self.span.start
    }

    /// Returns true if the token has the given kind
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Decoded value of a string literal
    pub fn string_value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier
            | TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral => write!(f, "{}({})", self.kind.as_str(), self.text),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// Category of a source span that produced no token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriviaKind {
    /// Consumed by the whitespace filter
    Whitespace,
    /// Skipped while recovering from a lexical error
    Skipped,
}

/// A span retained on the side channel for source-preserving tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub span: Span,
}

/// Ordered token sequence terminated by `EndOfInput`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenStream<'a> {
    #[serde(skip)]
    source: &'a str,
    tokens: Vec<Token<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    trivia: Vec<Trivia>,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new(source: &'a str, tokens: Vec<Token<'a>>, trivia: Vec<Trivia>) -> Self {
        Self {
            source,
            tokens,
            trivia,
        }
    }

    /// All tokens, `EndOfInput` last
    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    /// Number of tokens, `EndOfInput` included
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true when the stream holds nothing but `EndOfInput`
    pub fn is_empty(&self) -> bool {
        self.tokens.iter().all(|t| t.kind == TokenKind::EndOfInput)
    }

    /// Iterates over the tokens in source order
    pub fn iter(&self) -> std::slice::Iter<'_, Token<'a>> {
        self.tokens.iter()
    }

    /// Token kinds in order
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }

    /// Side-channel spans; empty unless trivia retention was enabled
    pub fn trivia(&self) -> &[Trivia] {
        &self.trivia
    }

    /// The source text the stream was produced from
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Rebuilds source text from token and trivia spans in offset order.
    ///
    /// Reproduces the input exactly when trivia was retained.
    pub fn reconstruct(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut trivia = self.trivia.iter().peekable();

        for token in &self.tokens {
            while let Some(t) = trivia.next_if(|t| t.span.start.offset < token.span.start.offset)
            {
                out.push_str(t.span.slice(self.source).unwrap_or_default());
            }
            out.push_str(token.text);
        }
        for t in trivia {
            out.push_str(t.span.slice(self.source).unwrap_or_default());
        }

        out
    }
}

impl<'a> IntoIterator for TokenStream<'a> {
    type Item = Token<'a>;
    type IntoIter = std::vec::IntoIter<Token<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'s, 'a> IntoIterator for &'s TokenStream<'a> {
    type Item = &'s Token<'a>;
    type IntoIter = std::slice::Iter<'s, Token<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
