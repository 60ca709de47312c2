//! Lexer for stored rich-text markup using logos.
//!
//! Only the shape of the markup is recognized here (open tag, close tag,
//! text). Tag names and attributes are picked apart by [`TagToken::parse`].

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"<!--[^>]*-->")] // Skip comments
pub enum Token<'src> {
    #[regex(r"<[a-zA-Z][a-zA-Z0-9]*[^>]*>", |lex| lex.slice())]
    OpenTag(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9]*[ \t\r\n]*>", |lex| lex.slice())]
    CloseTag(&'src str),

    /// A `<` that does not start a tag is literal text
    #[token("<")]
    LessThan,

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Name and attributes of an open or close tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub self_closing: bool,
}

impl TagToken {
    /// Pick apart the raw slice of an open or close tag
    pub fn parse(raw: &str) -> Self {
        let inner = raw
            .trim_start_matches('<')
            .trim_start_matches('/')
            .trim_end_matches('>');
        let self_closing = inner.ends_with('/');
        let inner = inner.trim_end_matches('/');

        let name_end = inner
            .find(|c: char| c.is_whitespace())
            .unwrap_or(inner.len());
        let name = inner[..name_end].to_ascii_lowercase();
        let attributes = parse_attributes(&inner[name_end..]);

        Self {
            name,
            attributes,
            self_closing,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn parse_attributes(source: &str) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(_, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut name = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' {
                break;
            }
            name.push(c);
            chars.next();
        }

        while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        if matches!(chars.peek(), Some(&(_, '='))) {
            chars.next();
            while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
                chars.next();
            }
            match chars.peek().map(|&(_, c)| c) {
                Some(quote @ ('"' | '\'')) => {
                    chars.next();
                    for (_, c) in chars.by_ref() {
                        if c == quote {
                            break;
                        }
                        value.push(c);
                    }
                }
                _ => {
                    while let Some(&(_, c)) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
        }

        if !name.is_empty() {
            attributes.push((name.to_ascii_lowercase(), crate::parser::decode_entities(&value)));
        }
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shapes() {
        let tokens: Vec<_> = Token::lexer("<p>a < b<!-- note --></p>")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::OpenTag("<p>"),
                Token::Text("a "),
                Token::LessThan,
                Token::Text(" b"),
                Token::CloseTag("</p>"),
            ]
        );
    }

    #[test]
    fn test_tag_attributes() {
        let tag =
            TagToken::parse(r#"<A HREF="https://x.test/?a=1&amp;b=2" target=_blank rel='noopener'>"#);
        assert_eq!(tag.name, "a");
        assert_eq!(tag.attribute("href"), Some("https://x.test/?a=1&b=2"));
        assert_eq!(tag.attribute("target"), Some("_blank"));
        assert_eq!(tag.attribute("rel"), Some("noopener"));
        assert!(!tag.self_closing);

        assert!(TagToken::parse("<br/>").self_closing);
        assert_eq!(TagToken::parse("</strong >").name, "strong");
    }
}
