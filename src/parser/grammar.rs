//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Parse template source into its list of nodes
pub fn parse(input: &str) -> Result<Vec<Node>, Vec<crate::ParseError>> {
    let len = input.len();

    let tokens = crate::parser::lexer::lex(input).map_err(|e| vec![e])?;
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    template_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn template_parser<'a, I>() -> impl Parser<'a, I, Vec<Node>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let text = select! {
        Token::Text(s) => Node::Text(s),
    };

    let field = select! {
        Token::Field(s) => s,
    };

    // `.A.B` or a bare `.`
    let path = choice((
        field.map(FieldPath::new),
        just(Token::Dot).to(FieldPath::root()),
    ));

    let substitution = path
        .map_with(|p, e| Node::Field(Spanned::new(p, span_range(&e.span()))))
        .delimited_by(just(Token::ActionOpen), just(Token::ActionClose));

    let comment = just(Token::Comment)
        .delimited_by(just(Token::ActionOpen), just(Token::ActionClose));

    choice((text.map(Some), substitution.map(Some), comment.to(None)))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(|nodes| nodes.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_text_only() {
        let nodes = parse("no actions here").expect("Should parse");
        assert_eq!(nodes, vec![Node::Text("no actions here".to_string())]);
    }

    #[test]
    fn test_parse_field() {
        let nodes = parse("Hello, {{.Name}}!").expect("Should parse");
        assert_eq!(nodes.len(), 3);
        match &nodes[1] {
            Node::Field(path) => {
                assert_eq!(path.node.segments(), ["Name".to_string()]);
                assert_eq!(path.span, 9..14);
            }
            other => panic!("Expected field, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_path() {
        let nodes = parse("{{ .User.Address.City }}").expect("Should parse");
        assert_eq!(
            nodes,
            vec![Node::Field(Spanned::new(
                FieldPath::new(vec![
                    "User".to_string(),
                    "Address".to_string(),
                    "City".to_string()
                ]),
                3..21,
            ))]
        );
    }

    #[test]
    fn test_parse_dot() {
        let nodes = parse("{{.}}").expect("Should parse");
        match &nodes[0] {
            Node::Field(path) => assert!(path.node.is_root()),
            other => panic!("Expected field, got {:?}", other),
        }
    }

    #[test]
    fn test_comments_dropped() {
        let nodes = parse("a{{/* ignore me */}}b").expect("Should parse");
        assert_eq!(
            nodes,
            vec![Node::Text("a".to_string()), Node::Text("b".to_string())]
        );
    }

    #[test]
    fn test_empty_action_is_error() {
        let errors = parse("Hi {{ }}").unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_space_separated_fields_are_error() {
        assert!(parse("{{ .A .B }}").is_err());
        assert!(parse("{{ .User .Name }}").is_err());
    }

    #[test]
    fn test_dot_followed_by_field_is_error() {
        assert!(parse("{{. .Name}}").is_err());
    }

    #[test]
    fn test_lex_error_propagates() {
        let errors = parse("{{.Name").unwrap_err();
        let crate::ParseError::Syntax { message, .. } = &errors[0];
        assert_eq!(message, "Unclosed action");
    }
}
