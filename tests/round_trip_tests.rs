//! Property-based tests for the tokenizer.
//!
//! Random inputs check the structural guarantees every call must keep:
//! 1. Termination: exactly one `EndOfInput`, always last
//! 2. Coverage: with trivia retained, token and trivia spans rebuild the input
//! 3. Recognition: well-formed token sequences lex back to the same kinds

use proptest::prelude::*;
use tua_lexer::{
    LexerConfig, RESERVED_WORDS, SYMBOLS, TokenKind, lookup_keyword, tokenize,
    tokenize_with_config,
};

fn keep_trivia() -> LexerConfig {
    LexerConfig {
        keep_trivia: true,
        ..LexerConfig::default()
    }
}

/// Generate source text biased towards characters the lexer cares about.
fn source_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => prop::sample::select(vec![
                "a", "Z", "_", "0", "7", ".", "'", "\"", "\\", "~", "=", "<", "-", ">",
                " ", "\t", "\n", "\r", "\r\n", "@", "é", "→",
            ]),
            1 => prop::sample::select(vec!["if", "then", "end", "..", "~=", "->", "12.5"]),
        ],
        0..64,
    )
    .prop_map(|pieces| pieces.concat())
}

/// Generate a well-formed token and the kind it must lex as.
fn token_strategy() -> impl Strategy<Value = (String, TokenKind)> {
    let keywords: Vec<(&str, TokenKind)> =
        RESERVED_WORDS.iter().map(|(&text, &kind)| (text, kind)).collect();

    prop_oneof![
        prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,10}")
            .expect("valid regex")
            .prop_filter("not a keyword", |s| lookup_keyword(s).is_none())
            .prop_map(|s| (s, TokenKind::Identifier)),
        prop::sample::select(keywords).prop_map(|(text, kind)| (text.to_string(), kind)),
        prop::sample::select(SYMBOLS).prop_map(|(text, kind)| (text.to_string(), kind)),
        prop::string::string_regex("0|[1-9][0-9]{0,8}")
            .expect("valid regex")
            .prop_map(|s| (s, TokenKind::IntLiteral)),
        prop::string::string_regex("[0-9]{1,5}\\.[0-9]{0,5}|\\.[0-9]{1,5}")
            .expect("valid regex")
            .prop_map(|s| (s, TokenKind::FloatLiteral)),
        prop::string::string_regex("'[a-z \"]{0,10}'|\"[a-z ']{0,10}\"")
            .expect("valid regex")
            .prop_map(|s| (s, TokenKind::StringLiteral)),
    ]
}

proptest! {
    #[test]
    fn prop_stream_always_ends_with_single_end_of_input(source in source_strategy()) {
        let (tokens, _) = tokenize(&source);
        let kinds = tokens.kinds();
        prop_assert_eq!(kinds.last(), Some(&TokenKind::EndOfInput));
        prop_assert_eq!(
            kinds.iter().filter(|&&k| k == TokenKind::EndOfInput).count(),
            1
        );
        prop_assert_eq!(tokens.tokens().last().map(|t| t.span.start.offset), Some(source.len()));
    }

    #[test]
    fn prop_trivia_reconstructs_source(source in source_strategy()) {
        let output = tokenize_with_config(&source, keep_trivia());
        prop_assert_eq!(output.tokens.reconstruct(), source);
    }

    #[test]
    fn prop_token_text_matches_span(source in source_strategy()) {
        let (tokens, _) = tokenize(&source);
        let mut previous_end = 0;
        for token in tokens.iter() {
            prop_assert!(token.span.start.offset >= previous_end);
            prop_assert_eq!(token.span.slice(&source), Some(token.text));
            previous_end = token.span.end.offset;
        }
    }

    #[test]
    fn prop_well_formed_tokens_lex_back(pieces in prop::collection::vec(token_strategy(), 0..32)) {
        let source = pieces
            .iter()
            .map(|(text, _)| text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let (tokens, errors) = tokenize(&source);
        prop_assert!(errors.is_empty(), "errors in {:?}: {:?}", source, errors);

        let mut expected: Vec<TokenKind> = pieces.iter().map(|&(_, kind)| kind).collect();
        expected.push(TokenKind::EndOfInput);
        prop_assert_eq!(tokens.kinds(), expected);

        for (token, (text, _)) in tokens.iter().zip(&pieces) {
            prop_assert_eq!(token.text, text.as_str());
        }
    }
}
