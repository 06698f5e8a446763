use tua_lexer::{ESCAPES, LexError, LexErrorKind, TokenKind, tokenize};

#[cfg(test)]
mod string_escape_tests {
    use super::*;

    fn single_string(source: &str) -> String {
        let (tokens, errors) = tokenize(source);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        assert_eq!(tokens.len(), 2, "expected exactly one string in {:?}", source);
        tokens.tokens()[0]
            .string_value()
            .expect("string literal carries a value")
            .to_string()
    }

    #[test]
    fn test_every_simple_escape() {
        for &(escape, decoded) in ESCAPES {
            let source = format!("\"<\\{}>\"", escape);
            assert_eq!(
                single_string(&source),
                format!("<{}>", decoded),
                "escape \\{}",
                escape
            );
        }
    }

    #[test]
    fn test_escaped_quotes_in_both_delimiters() {
        assert_eq!(single_string(r#""say \"hi\"""#), "say \"hi\"");
        assert_eq!(single_string(r"'it\'s'"), "it's");
        // The other quote needs no escape, but escaping it is still valid
        assert_eq!(single_string(r#"'\"'"#), "\"");
        assert_eq!(single_string(r#""\'""#), "'");
    }

    #[test]
    fn test_pipe_escape() {
        assert_eq!(single_string(r#""a\|b""#), "a|b");
        assert_eq!(single_string(r"'\|'"), "|");
    }

    #[test]
    fn test_z_escape_skips_following_whitespace() {
        assert_eq!(single_string(r#""a\zb""#), "ab");
        assert_eq!(single_string("'long \\z\n    text'"), "long text");
        assert_eq!(single_string("'crlf\\z\r\n\r\n end'"), "crlfend");
        assert_eq!(single_string("'tail\\z'"), "tail");
    }

    #[test]
    fn test_nul_escape_is_invalid() {
        let (tokens, errors) = tokenize(r#""a\0b""#);
        match errors.as_slice() {
            [LexError::InvalidEscapeSequence { sequence, .. }] => assert_eq!(*sequence, '0'),
            other => panic!("Expected InvalidEscapeSequence, got {:?}", other),
        }
        assert_eq!(tokens.tokens()[0].string_value(), Some("a0b"));
    }

    #[test]
    fn test_escaped_backslash_before_quote() {
        // `\\` consumes both backslashes, so the following quote closes
        let (tokens, errors) = tokenize(r#""dir\\" x"#);
        assert!(errors.is_empty());
        assert_eq!(tokens.tokens()[0].string_value(), Some("dir\\"));
        assert_eq!(tokens.tokens()[1].text, "x");
    }

    #[test]
    fn test_raw_text_is_preserved() {
        let (tokens, _) = tokenize(r#"'tab\there'"#);
        let token = &tokens.tokens()[0];
        assert_eq!(token.text, r#"'tab\there'"#);
        assert_eq!(token.string_value(), Some("tab\there"));
        assert_eq!(token.span.len(), token.text.len());
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(single_string("''"), "");
        assert_eq!(single_string("\"\""), "");
    }

    #[test]
    fn test_non_ascii_content_is_allowed_inside_strings() {
        assert_eq!(single_string("'héllo → wörld'"), "héllo → wörld");
        assert_eq!(single_string("\"日本\\n語\""), "日本\n語");
    }

    #[test]
    fn test_line_continuation_lf_and_crlf() {
        assert_eq!(single_string("'one\\\ntwo'"), "onetwo");
        assert_eq!(single_string("'one\\\r\ntwo'"), "onetwo");
    }

    #[test]
    fn test_line_continuation_advances_line_numbers() {
        let (tokens, errors) = tokenize("'a\\\nb' c");
        assert!(errors.is_empty());
        let c = &tokens.tokens()[1];
        assert_eq!(c.text, "c");
        assert_eq!(c.position().line, 2);
        assert_eq!(c.position().column, 3);
    }

    #[test]
    fn test_backslash_cr_without_lf_is_invalid() {
        let (tokens, errors) = tokenize("'a\\\rb'");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), LexErrorKind::InvalidEscapeSequence);
        assert_eq!(tokens.tokens()[0].string_value(), Some("a\rb"));
    }

    #[test]
    fn test_unknown_escapes_are_reported_individually() {
        let (tokens, errors) = tokenize(r#""\x41\u{7}\q""#);
        let sequences: Vec<char> = errors
            .iter()
            .map(|e| match e {
                LexError::InvalidEscapeSequence { sequence, .. } => *sequence,
                other => panic!("Expected InvalidEscapeSequence, got {:?}", other),
            })
            .collect();
        assert_eq!(sequences, vec!['x', 'u', 'q']);
        assert_eq!(tokens.tokens()[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens.tokens()[0].string_value(), Some("x41u{7}q"));
    }

    #[test]
    fn test_invalid_escape_error_points_after_backslash() {
        let (_, errors) = tokenize("x = 'ab\\k'");
        assert_eq!(errors.len(), 1);
        let position = errors[0].position();
        assert_eq!(position.line, 1);
        assert_eq!(position.column, 8);
        assert_eq!(position.offset, 8);
    }

    #[test]
    fn test_unterminated_after_escaped_quote() {
        let (tokens, errors) = tokenize(r#"'abc\'"#);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), LexErrorKind::UnterminatedString);
        assert_eq!(tokens.kinds(), vec![TokenKind::EndOfInput]);
    }

    #[test]
    fn test_string_spanning_lines_reports_start_position() {
        let (tokens, errors) = tokenize("\n  \"first\nsecond\" tail");
        assert!(errors.is_empty());
        let string = &tokens.tokens()[0];
        assert_eq!(string.position().line, 2);
        assert_eq!(string.position().column, 2);
        assert_eq!(string.span.end.line, 3);
        assert_eq!(string.string_value(), Some("first\nsecond"));
    }
}
