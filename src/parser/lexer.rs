//! Lexer for template source
//!
//! Template source alternates between literal text and actions delimited by
//! `{{` and `}}`. Text runs are split out by scanning for the left delimiter;
//! the body of each action is tokenized with logos.

use logos::Logos;

use crate::error::ParseError;
pub use crate::parser::ast::Span;

const LEFT_DELIM: &str = "{{";

/// Tokens produced for the parser
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal text between actions
    Text(String),
    /// `{{` or `{{- `
    ActionOpen,
    /// `}}` or ` -}}`
    ActionClose,
    /// `.` on its own
    Dot,
    /// `.Name` or a chain `.User.Name`, split into its segments
    Field(Vec<String>),
    /// `/* ... */`
    Comment,
}

/// Tokens inside an action body
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum ActionToken {
    #[token(".")]
    Dot,

    // A chain has no whitespace between segments; `.A .B` is two tokens
    #[regex(r"(\.[\p{L}_][\p{L}\p{N}_]*)+", |lex| split_chain(lex.slice()))]
    Field(Vec<String>),

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    #[token("}}")]
    Close,

    // Longer than the whitespace skip, so it wins when a dash follows
    #[regex(r"[ \t\n\r]+-\}\}")]
    TrimClose,
}

fn split_chain(chain: &str) -> Vec<String> {
    chain[1..].split('.').map(str::to_string).collect()
}

/// Lex template source into tokens with spans
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, ParseError> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut trim_leading = false;

    while let Some(offset) = input[pos..].find(LEFT_DELIM) {
        let open = pos + offset;
        let after_delim = open + LEFT_DELIM.len();
        let trim_trailing = has_trim_marker(&input[after_delim..]);
        push_text(&mut tokens, &input[pos..open], pos, trim_leading, trim_trailing);

        // Skip the dash; the whitespace after it is skipped by the action lexer
        let body_start = if trim_trailing {
            after_delim + 1
        } else {
            after_delim
        };
        tokens.push((Token::ActionOpen, open..body_start));

        let (end, trims_next) = lex_action(input, open, body_start, &mut tokens)?;
        pos = end;
        trim_leading = trims_next;
    }

    push_text(&mut tokens, &input[pos..], pos, trim_leading, false);
    Ok(tokens)
}

/// Lex one action body. Returns the offset just past the closing delimiter
/// and whether it carried a trim marker.
fn lex_action(
    input: &str,
    open: usize,
    body_start: usize,
    tokens: &mut Vec<(Token, Span)>,
) -> Result<(usize, bool), ParseError> {
    let mut lexer = ActionToken::lexer(&input[body_start..]);

    while let Some(result) = lexer.next() {
        let local = lexer.span();
        let span = body_start + local.start..body_start + local.end;

        let Ok(token) = result else {
            return Err(unexpected_input(input, span));
        };

        match token {
            ActionToken::Close => {
                tokens.push((Token::ActionClose, span.clone()));
                return Ok((span.end, false));
            }
            ActionToken::TrimClose => {
                tokens.push((Token::ActionClose, span.clone()));
                return Ok((span.end, true));
            }
            ActionToken::Dot => tokens.push((Token::Dot, span)),
            ActionToken::Field(segments) => tokens.push((Token::Field(segments), span)),
            ActionToken::Comment => tokens.push((Token::Comment, span)),
        }
    }

    Err(ParseError::Syntax {
        span: open..input.len(),
        message: "Unclosed action".to_string(),
        expected: vec!["'}}'".to_string()],
    })
}

fn unexpected_input(input: &str, span: Span) -> ParseError {
    if input[span.start..].starts_with("/*") {
        return ParseError::Syntax {
            span: span.start..input.len(),
            message: "Unclosed comment".to_string(),
            expected: vec!["'*/'".to_string()],
        };
    }

    let found = input[span.clone()].to_string();
    ParseError::Syntax {
        span,
        message: format!("Unexpected character '{}' in action", found),
        expected: Vec::new(),
    }
}

/// `{{-` only trims when the dash is followed by whitespace
fn has_trim_marker(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('-') && chars.next().is_some_and(is_space)
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn push_text(
    tokens: &mut Vec<(Token, Span)>,
    text: &str,
    start: usize,
    trim_leading: bool,
    trim_trailing: bool,
) {
    let begin = if trim_leading {
        text.len() - text.trim_start_matches(is_space).len()
    } else {
        0
    };
    let end = if trim_trailing {
        text.trim_end_matches(is_space).len()
    } else {
        text.len()
    };

    if begin >= end {
        return;
    }

    tokens.push((
        Token::Text(text[begin..end].to_string()),
        start + begin..start + end,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<Token> {
        lex(input)
            .expect("Should lex")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(kinds("just text"), vec![Token::Text("just text".to_string())]);
    }

    #[test]
    fn test_empty_input() {
        assert!(kinds("").is_empty());
    }

    #[test]
    fn test_field_action() {
        assert_eq!(
            kinds("Hello, {{.Name}}!"),
            vec![
                Token::Text("Hello, ".to_string()),
                Token::ActionOpen,
                Token::Field(vec!["Name".to_string()]),
                Token::ActionClose,
                Token::Text("!".to_string()),
            ]
        );
    }

    #[test]
    fn test_nested_fields_and_dot() {
        assert_eq!(
            kinds("{{ .User.Name }}{{.}}"),
            vec![
                Token::ActionOpen,
                Token::Field(vec!["User".to_string(), "Name".to_string()]),
                Token::ActionClose,
                Token::ActionOpen,
                Token::Dot,
                Token::ActionClose,
            ]
        );
    }

    #[test]
    fn test_comment() {
        assert_eq!(
            kinds("a{{/* note */}}b"),
            vec![
                Token::Text("a".to_string()),
                Token::ActionOpen,
                Token::Comment,
                Token::ActionClose,
                Token::Text("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_separated_fields_are_separate_tokens() {
        assert_eq!(
            kinds("{{ .User .Name }}"),
            vec![
                Token::ActionOpen,
                Token::Field(vec!["User".to_string()]),
                Token::Field(vec!["Name".to_string()]),
                Token::ActionClose,
            ]
        );
    }

    #[test]
    fn test_unicode_field_names() {
        assert_eq!(
            kinds("{{ .Año.Straße2 }}"),
            vec![
                Token::ActionOpen,
                Token::Field(vec!["Año".to_string(), "Straße2".to_string()]),
                Token::ActionClose,
            ]
        );
    }

    #[test]
    fn test_comment_ending_in_extra_stars() {
        for source in ["a{{/* note **/}}b", "a{{/***/}}b", "a{{/* x * y */}}b"] {
            assert_eq!(
                kinds(source),
                vec![
                    Token::Text("a".to_string()),
                    Token::ActionOpen,
                    Token::Comment,
                    Token::ActionClose,
                    Token::Text("b".to_string()),
                ],
                "source: {}",
                source
            );
        }
    }

    #[test]
    fn test_trim_markers() {
        assert_eq!(
            kinds("a  \n{{- .X -}}\n\t b"),
            vec![
                Token::Text("a".to_string()),
                Token::ActionOpen,
                Token::Field(vec!["X".to_string()]),
                Token::ActionClose,
                Token::Text("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_whitespace_only_text_trimmed_away() {
        assert_eq!(
            kinds("{{.A -}}   {{- .B}}"),
            vec![
                Token::ActionOpen,
                Token::Field(vec!["A".to_string()]),
                Token::ActionClose,
                Token::ActionOpen,
                Token::Field(vec!["B".to_string()]),
                Token::ActionClose,
            ]
        );
    }

    #[test]
    fn test_lone_braces_are_text() {
        assert_eq!(kinds("{a} }}"), vec![Token::Text("{a} }}".to_string())]);
    }

    #[test]
    fn test_text_spans() {
        let tokens = lex("ab{{.C}}de").expect("Should lex");
        assert_eq!(tokens[0].1, 0..2);
        assert_eq!(tokens[2].1, 4..6);
        assert_eq!(tokens[4].1, 8..10);
    }

    #[test]
    fn test_unclosed_action() {
        let err = lex("Hello {{.Name").unwrap_err();
        let ParseError::Syntax { span, message, .. } = err;
        assert_eq!(span, 6..13);
        assert_eq!(message, "Unclosed action");
    }

    #[test]
    fn test_unexpected_character() {
        let err = lex("{{ .Name + 1 }}").unwrap_err();
        let ParseError::Syntax { span, message, .. } = err;
        assert_eq!(span, 9..10);
        assert!(message.contains("'+'"), "got: {}", message);
    }
}
