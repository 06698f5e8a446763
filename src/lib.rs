//! # Tua Lexer
//!
//! The lexical front end for Tua, a small Lua-inspired scripting language with
//! typed aggregate literals (`Table`, `Union`, `List`), C-like comparison and
//! logic operators, and single- or double-quoted strings with escape sequences.
//!
//! ## Overview
//!
//! Source text goes in; an ordered [`TokenStream`] terminated by
//! [`TokenKind::EndOfInput`] comes out, together with every lexical error found
//! on the way. Tokenization never stops at the first problem: an unrecognized
//! character is skipped, an unterminated string swallows the rest of the
//! buffer, and scanning carries on so a single call reports everything.
//!
//! ## Basic Usage
//!
//! ```rust
//! use tua_lexer::{TokenKind, tokenize};
//!
//! let (tokens, errors) = tokenize("if x <= 10 then return 'small' end");
//! assert!(errors.is_empty());
//! assert_eq!(tokens.tokens()[2].kind, TokenKind::LtEq);
//! assert_eq!(tokens.tokens()[6].string_value(), Some("small"));
//! ```
//!
//! ## Ambiguity Rules
//!
//! - Operators use maximal munch: `==` is one `Eq`, never two `Assign`s.
//! - Reserved words are matched only after the whole identifier is scanned:
//!   `for` is a keyword, `forward` an identifier.
//! - A digit run followed by `.` is a float (`12.`); `.5` is a float too.
//!   Integers other than `0` have no leading zero, so `007` is three tokens.
//! - A lone `~` is an error; only `~=` is meaningful.
//!
//! ## Error Handling
//!
//! ```rust
//! use tua_lexer::{LexError, tokenize};
//!
//! let (tokens, errors) = tokenize("x = 1 @\ny = 2 $");
//! assert_eq!(errors.len(), 2);
//! match &errors[0] {
//!     LexError::UnrecognizedCharacter { character, position } => {
//!         assert_eq!(*character, '@');
//!         assert_eq!(position.line, 1);
//!     }
//!     other => panic!("unexpected error {other}"),
//! }
//! // Tokens around the bad characters are still produced
//! assert_eq!(tokens.len(), 7);
//! ```
//!
//! Callers that treat any lexical error as fatal can use [`tokenize_strict`].
//!
//! ## Source-Preserving Tools
//!
//! ```rust
//! use tua_lexer::{LexerConfig, tokenize_with_config};
//!
//! let source = "local  t = { 1, 2 }\n";
//! let config = LexerConfig { keep_trivia: true, ..LexerConfig::default() };
//! let output = tokenize_with_config(source, config);
//! assert_eq!(output.tokens.reconstruct(), source);
//! ```

pub mod error;
pub mod lexer;
pub mod token;


// Re-export main types
pub use error::{LexError, LexErrorKind, Position, Span, TokenizeError};
pub use lexer::{CHARACTER_TABLE, CharacterFlags, CharacterTable, LexOutput, Lexer, LexerConfig};
pub use token::{
    ESCAPES, RESERVED_WORDS, SYMBOLS, Token, TokenKind, TokenStream, Trivia, TriviaKind,
    decode_escape, lookup_keyword, match_symbol,
};

use smallvec::SmallVec;

/// Tokenizes `source` with the default configuration.
///
/// Always returns a complete stream ending in `EndOfInput`, plus every
/// lexical error detected.
pub fn tokenize(source: &str) -> (TokenStream<'_>, SmallVec<[LexError; 4]>) {
    let output = Lexer::new(source).tokenize();
    (output.tokens, output.errors)
}

/// Tokenizes `source` with a custom configuration
pub fn tokenize_with_config(source: &str, config: LexerConfig) -> LexOutput<'_> {
    Lexer::with_config(source, config).tokenize()
}

/// Tokenizes `source`, failing if any lexical error was detected
pub fn tokenize_strict(source: &str) -> Result<TokenStream<'_>, TokenizeError> {
    let (tokens, errors) = tokenize(source);
    match TokenizeError::new(errors) {
        Some(error) => Err(error),
        None => Ok(tokens),
    }
}
