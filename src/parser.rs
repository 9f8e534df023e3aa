use std::iter::Peekable;

use winnow::{
    combinator::{alt, repeat},
    prelude::*,
    token::{take_till, take_until},
};

use crate::{ConfigNode, ValueStore};

/// Structural tokens of a ConfigNode file, one per meaningful line fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'s> {
    /// `key = value`, both sides trimmed.
    Value(&'s str, &'s str),
    /// `{`
    Open,
    /// `}`
    Close,
    /// Any other text. Names the following block if one opens next.
    Ident(&'s str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'s> {
    Open,
    Close,
    Text(&'s str),
}

/// Splits `text` into tokens in a single forward pass.
pub(crate) fn tokenize(text: &str) -> Vec<Token<'_>> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let mut tokens = Vec::new();
    for line in text.lines() {
        let code = strip_comment(line).trim();
        if code.is_empty() {
            continue;
        }
        let pieces: Vec<Piece<'_>> = repeat(0.., piece).parse(code).unwrap_or_default();
        for piece in pieces {
            match piece {
                Piece::Open => tokens.push(Token::Open),
                Piece::Close => tokens.push(Token::Close),
                Piece::Text(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    tokens.push(match text.split_once('=') {
                        Some((key, value)) => Token::Value(key.trim(), value.trim()),
                        None => Token::Ident(text),
                    });
                }
            }
        }
    }
    tokens
}

/// Replaces the contents of `node` with the tree parsed from `text`.
pub(crate) fn parse_into(text: &str, node: &mut ConfigNode) {
    let mut tokens = tokenize(text).into_iter().peekable();
    build(&mut tokens, node);
}

/// Consumes tokens into `node` until its closing brace or end of input.
///
/// A `}` with no block open ends the node it appears in (at the root this
/// ends the parse). Identifiers that do not open a block are skipped.
fn build<'s, I>(tokens: &mut Peekable<I>, node: &mut ConfigNode)
where
    I: Iterator<Item = Token<'s>>,
{
    while let Some(token) = tokens.next() {
        match token {
            Token::Value(name, value) => {
                node.add_value(name, value);
            }
            Token::Open => build(tokens, node.add_node("")),
            Token::Close => return,
            Token::Ident(name) => {
                if tokens.next_if_eq(&Token::Open).is_some() {
                    build(tokens, node.add_node(clean_node_name(name)));
                }
            }
        }
    }
}

/// `code := (!'//' any)*`
fn code<'s>(input: &mut &'s str) -> PResult<&'s str> {
    take_until(0.., "//").parse_next(input)
}

fn strip_comment(line: &str) -> &str {
    let mut input = line;
    code.parse_next(&mut input).unwrap_or(line)
}

/// `piece := '{' | '}' | [^{}]+`
fn piece<'s>(input: &mut &'s str) -> PResult<Piece<'s>> {
    alt((
        "{".value(Piece::Open),
        "}".value(Piece::Close),
        take_till(1.., ['{', '}']).map(Piece::Text),
    ))
    .parse_next(input)
}

/// Node names sometimes carry a byte order mark (or its mis-decoded bytes)
/// and stray control characters from the editor that produced the file.
fn clean_node_name(name: &str) -> &str {
    name.trim_matches(|c: char| {
        c.is_whitespace()
            || c.is_control()
            || matches!(c, '\u{FEFF}' | '\u{EF}' | '\u{BB}' | '\u{BF}')
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn comments_and_blank_lines() {
        assert_eq!(
            tokenize("a = 1 //comment\n// full line\n\n   \n  // indented\nb = 2"),
            vec![Token::Value("a", "1"), Token::Value("b", "2")]
        );
    }

    #[test]
    fn braces_split_out() {
        assert_eq!(
            tokenize("PART {\n name = x }\nMODULE{ a = b }"),
            vec![
                Token::Ident("PART"),
                Token::Open,
                Token::Value("name", "x"),
                Token::Close,
                Token::Ident("MODULE"),
                Token::Open,
                Token::Value("a", "b"),
                Token::Close,
            ]
        );
        assert_eq!(
            tokenize("}{}"),
            vec![Token::Close, Token::Open, Token::Close]
        );
    }

    #[test]
    fn value_splits_on_first_equals() {
        assert_eq!(
            tokenize("key = a = b\n  spaced   =   out  \nempty =\n= nameless"),
            vec![
                Token::Value("key", "a = b"),
                Token::Value("spaced", "out"),
                Token::Value("empty", ""),
                Token::Value("", "nameless"),
            ]
        );
    }

    #[test]
    fn leading_bom_dropped() {
        assert_eq!(
            tokenize("\u{FEFF}a = 1"),
            vec![Token::Value("a", "1")]
        );
    }

    #[test]
    fn node_names_cleaned() {
        assert_eq!(clean_node_name("\u{FEFF}PART\t"), "PART");
        assert_eq!(clean_node_name("\u{EF}\u{BB}\u{BF}PART"), "PART");
        assert_eq!(clean_node_name("PART\u{0}"), "PART");
    }

    #[test]
    fn stray_identifiers_skipped() {
        let mut node = ConfigNode::new("");
        parse_into("stray\nPART\n{\nname = a\n}\nanother\n", &mut node);
        assert_eq!(node.subnodes().len(), 1);
        assert!(node.values().is_empty());
    }

    #[test]
    fn unmatched_close_ends_the_parse() {
        let mut node = ConfigNode::new("");
        parse_into("a = 1\n}\nb = 2", &mut node);
        assert!(node.has_value("a"));
        assert!(!node.has_value("b"));
    }

    #[test]
    fn unclosed_block_runs_to_end() {
        let mut node = ConfigNode::new("");
        parse_into("x = 0\nPART\n{\nname = a\nMODULE\n{\nname = b", &mut node);
        let part = node.get_node("PART", 0).expect("expected a PART node");
        assert_eq!(part.get_value("name", 0), Some(&"a".into()));
        let module = part.get_node("MODULE", 0).expect("expected a MODULE node");
        assert_eq!(module.get_value("name", 0), Some(&"b".into()));
    }
}
