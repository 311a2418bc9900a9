//! Token merger for mixed text/markup declaration elements.
//!
//! A registry declaration element interleaves raw C text with markup:
//!
//! ```text
//! <member>const <type>char</type>* <name>pEngineName</name></member>
//! ```
//!
//! [`XmlLexer`] walks the element's child nodes in order and produces one
//! unified token stream: text runs are tokenized by [`Lexer`], recognized
//! child elements each become a single token tagged with their origin, and
//! comments vanish. The parser downstream never sees where a token came
//! from.

use roxmltree::{Children, Node};

use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};

/// Merged tokenizer over the child sequence of one declaration element.
///
/// At any moment the lexer is in one of three states: draining a [`Lexer`]
/// over the current text run, advancing to the next content node, or done.
/// One token of lookahead is buffered so [`XmlLexer::peek`] is idempotent.
pub struct XmlLexer<'doc, 'input> {
    children: Children<'doc, 'input>,
    sub: Option<Lexer<'doc>>,
    lookahead: Option<Token<'doc>>,
}

impl<'doc, 'input> XmlLexer<'doc, 'input> {
    /// Create a lexer over the content of `element`.
    pub fn from_element(element: Node<'doc, 'input>) -> Self {
        Self {
            children: element.children(),
            sub: None,
            lookahead: None,
        }
    }

    /// Consume and return the next token, or `None` at the end of the
    /// element.
    pub fn next(&mut self) -> Result<Option<Token<'doc>>, ParseError> {
        if let Some(tok) = self.lookahead.take() {
            return Ok(Some(tok));
        }
        self.pull()
    }

    /// Return the next token without consuming it. Repeated calls return the
    /// same token.
    pub fn peek(&mut self) -> Result<Option<Token<'doc>>, ParseError> {
        if self.lookahead.is_none() {
            self.lookahead = self.pull()?;
        }
        Ok(self.lookahead)
    }

    /// Like [`XmlLexer::next`], but end-of-element is an error.
    pub fn next_no_eof(&mut self) -> Result<Token<'doc>, ParseError> {
        self.next()?.ok_or(ParseError::UnexpectedEof)
    }

    /// Like [`XmlLexer::peek`], but end-of-element is an error.
    pub fn peek_no_eof(&mut self) -> Result<Token<'doc>, ParseError> {
        self.peek()?.ok_or(ParseError::UnexpectedEof)
    }

    /// Consume the next token, requiring it to be of `kind`.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token<'doc>, ParseError> {
        let tok = self.next_no_eof()?;
        if tok.kind != kind {
            return Err(ParseError::UnexpectedToken {
                expected: kind.describe(),
                found: tok.to_string(),
            });
        }
        Ok(tok)
    }

    /// Advance the state machine until a token or the end of the content
    /// sequence is reached.
    fn pull(&mut self) -> Result<Option<Token<'doc>>, ParseError> {
        loop {
            // Drain the active text run first; a run can span many tokens.
            if let Some(sub) = &mut self.sub {
                if let Some(tok) = sub.next()? {
                    return Ok(Some(tok));
                }
                self.sub = None;
            }

            let Some(node) = self.children.next() else {
                return Ok(None);
            };

            if node.is_text() {
                if let Some(text) = node.text() {
                    self.sub = Some(Lexer::new(text));
                }
            } else if node.is_element() {
                let tag = node.tag_name().name();
                let kind = match tag {
                    "type" => TokenKind::TypeName,
                    "enum" => TokenKind::EnumName,
                    "name" => TokenKind::Name,
                    // <comment> elements carry prose, not declaration text.
                    "comment" => continue,
                    _ => return Err(ParseError::UnexpectedTag(tag.to_string())),
                };
                return Ok(Some(Token {
                    kind,
                    text: element_text(node)?,
                }));
            }
            // XML comments and processing instructions yield no tokens.
        }
    }
}

/// Extract the sole text child of a recognized tagged element.
///
/// Anything other than exactly one text node (nested elements, mixed
/// content, an empty element) is malformed registry XML.
fn element_text<'doc>(element: Node<'doc, '_>) -> Result<&'doc str, ParseError> {
    let mut children = element.children();
    let text = match children.next() {
        Some(child) if child.is_text() => child.text(),
        _ => None,
    };
    match text {
        Some(text) if children.next().is_none() => Ok(text),
        _ => Err(ParseError::InvalidXml(
            element.tag_name().name().to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parse `xml` and hand its root element to `f`. The document must stay
    /// alive while tokens borrow from it, hence the callback shape.
    fn with_element<F>(xml: &str, f: F)
    where
        F: FnOnce(XmlLexer<'_, '_>),
    {
        let doc = roxmltree::Document::parse(xml).expect("test xml is well-formed");
        f(XmlLexer::from_element(doc.root_element()))
    }

    fn collect(mut lexer: XmlLexer<'_, '_>) -> Vec<(TokenKind, String)> {
        let mut tokens = Vec::new();
        while let Some(tok) = lexer.next().unwrap() {
            tokens.push((tok.kind, tok.text.to_string()));
        }
        tokens
    }

    #[test]
    fn test_text_and_markup_merge() {
        let xml = "<member>const <type>char</type>* <name>pEngineName</name></member>";
        with_element(xml, |lexer| {
            assert_eq!(
                collect(lexer),
                vec![
                    (TokenKind::Const, "const".to_string()),
                    (TokenKind::TypeName, "char".to_string()),
                    (TokenKind::Star, "*".to_string()),
                    (TokenKind::Name, "pEngineName".to_string()),
                ]
            );
        });
    }

    #[test]
    fn test_resumes_mid_text_run() {
        // One text run holding several tokens, interrupted by an element.
        let xml = "<member>typedef void* <name>p</name>[2][3]</member>";
        with_element(xml, |lexer| {
            let kinds: Vec<_> = collect(lexer).into_iter().map(|(kind, _)| kind).collect();
            assert_eq!(
                kinds,
                vec![
                    TokenKind::Typedef,
                    TokenKind::Id,
                    TokenKind::Star,
                    TokenKind::Name,
                    TokenKind::LBracket,
                    TokenKind::Int,
                    TokenKind::RBracket,
                    TokenKind::LBracket,
                    TokenKind::Int,
                    TokenKind::RBracket,
                ]
            );
        });
    }

    #[test]
    fn test_peek_is_idempotent() {
        with_element("<member>uint32_t x</member>", |mut lexer| {
            let first = lexer.peek().unwrap().unwrap();
            let second = lexer.peek().unwrap().unwrap();
            assert_eq!(first, second);

            // The peeked token comes out of next() exactly once.
            assert_eq!(lexer.next().unwrap().unwrap(), first);
            let next = lexer.next().unwrap().unwrap();
            assert_ne!(next, first);
        });
    }

    #[test]
    fn test_comments_are_skipped() {
        let xml = "<member><!-- xml comment -->uint32_t <comment>prose</comment><name>x</name></member>";
        with_element(xml, |lexer| {
            assert_eq!(
                collect(lexer),
                vec![
                    (TokenKind::Id, "uint32_t".to_string()),
                    (TokenKind::Name, "x".to_string()),
                ]
            );
        });
    }

    #[test]
    fn test_enum_element_token() {
        let xml = "<member><type>uint8_t</type> <name>uuid</name>[<enum>VK_UUID_SIZE</enum>]</member>";
        with_element(xml, |mut lexer| {
            let kinds: Vec<_> = std::iter::from_fn(|| lexer.next().unwrap())
                .map(|tok| tok.kind)
                .collect();
            assert_eq!(
                kinds,
                vec![
                    TokenKind::TypeName,
                    TokenKind::Name,
                    TokenKind::LBracket,
                    TokenKind::EnumName,
                    TokenKind::RBracket,
                ]
            );
        });
    }

    #[test]
    fn test_unexpected_tag() {
        with_element("<member><bogus>int</bogus></member>", |mut lexer| {
            assert_eq!(
                lexer.next(),
                Err(ParseError::UnexpectedTag("bogus".to_string()))
            );
        });
    }

    #[test]
    fn test_tagged_element_must_hold_one_text_node() {
        with_element("<member><type></type></member>", |mut lexer| {
            assert_eq!(
                lexer.next(),
                Err(ParseError::InvalidXml("type".to_string()))
            );
        });

        with_element("<member><type>a<name>b</name></type></member>", |mut lexer| {
            assert_eq!(
                lexer.next(),
                Err(ParseError::InvalidXml("type".to_string()))
            );
        });
    }

    #[test]
    fn test_expect() {
        with_element("<member>uint32_t</member>", |mut lexer| {
            let err = lexer.expect(TokenKind::Star).unwrap_err();
            assert_eq!(
                err,
                ParseError::UnexpectedToken {
                    expected: "'*'",
                    found: "identifier 'uint32_t'".to_string(),
                }
            );
            // The mismatched token was consumed; the stream is now empty.
            assert_eq!(lexer.next_no_eof(), Err(ParseError::UnexpectedEof));
        });
    }

    #[test]
    fn test_empty_element() {
        with_element("<member></member>", |mut lexer| {
            assert_eq!(lexer.next().unwrap(), None);
        });
    }
}
