//! Lexer (tokenizer) for raw C declaration text.
//!
//! Registry declarations are short fragments (`typedef uint32_t VkFlags;`,
//! `const char* const*`), so the token set is the small slice of C that
//! declarators need. Tokens borrow their text from the input; the lexer never
//! allocates.

use std::fmt;

use crate::error::ParseError;

/// Classification of a [`Token`].
///
/// `Name`, `TypeName`, and `EnumName` are never produced from raw text; they
/// are synthesized by [`crate::xml::XmlLexer`] from `<name>`, `<type>`, and
/// `<enum>` child elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier from raw text.
    Id,
    /// Content of a `<name>` element.
    Name,
    /// Content of a `<type>` element.
    TypeName,
    /// Content of an `<enum>` element.
    EnumName,
    /// Decimal integer literal.
    Int,
    Star,
    Comma,
    Semicolon,
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Hash,
    Typedef,
    Const,
    VkApiPtr,
    Struct,
}

impl TokenKind {
    /// Human-readable form used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Id => "an identifier",
            TokenKind::Name => "a name",
            TokenKind::TypeName => "a type name",
            TokenKind::EnumName => "an enum name",
            TokenKind::Int => "an integer",
            TokenKind::Star => "'*'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Hash => "'#'",
            TokenKind::Typedef => "'typedef'",
            TokenKind::Const => "'const'",
            TokenKind::VkApiPtr => "'VKAPI_PTR'",
            TokenKind::Struct => "'struct'",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// One lexical token: a kind plus the text it covers.
///
/// The text is borrowed from the XML document buffer, so tokens are cheap to
/// copy and carry no ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'doc> {
    pub kind: TokenKind,
    pub text: &'doc str,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Id => write!(f, "identifier '{}'", self.text),
            TokenKind::Name => write!(f, "name '{}'", self.text),
            TokenKind::TypeName => write!(f, "type name '{}'", self.text),
            TokenKind::EnumName => write!(f, "enum name '{}'", self.text),
            TokenKind::Int => write!(f, "integer {}", self.text),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// Lexer over one contiguous run of declaration text.
///
/// Produces tokens lazily through [`Lexer::next`]; returns `Ok(None)` at end
/// of input.
pub struct Lexer<'doc> {
    input: &'doc str,
    position: usize,
}

impl<'doc> Lexer<'doc> {
    /// Create a new lexer for the given text run.
    pub fn new(input: &'doc str) -> Self {
        Self { input, position: 0 }
    }

    /// Produce the next token, or `None` once the input is exhausted.
    pub fn next(&mut self) -> Result<Option<Token<'doc>>, ParseError> {
        self.skip_whitespace();

        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let kind = match ch {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => return Ok(Some(self.identifier_or_keyword())),
            b'0'..=b'9' => return Ok(Some(self.integer())),
            b'*' => TokenKind::Star,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b':' => TokenKind::Colon,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'#' => TokenKind::Hash,
            _ => {
                // Report the full character, not its first UTF-8 byte.
                let ch = self.input[self.position..]
                    .chars()
                    .next()
                    .ok_or(ParseError::UnexpectedEof)?;
                return Err(ParseError::UnexpectedCharacter(ch));
            }
        };

        let text = &self.input[self.position..self.position + 1];
        self.position += 1;
        Ok(Some(Token { kind, text }))
    }

    /// Parse an identifier and classify it against the keyword set.
    fn identifier_or_keyword(&mut self) -> Token<'doc> {
        let text = self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == b'_');
        let kind = match text {
            "typedef" => TokenKind::Typedef,
            "const" => TokenKind::Const,
            "struct" => TokenKind::Struct,
            "VKAPI_PTR" => TokenKind::VkApiPtr,
            _ => TokenKind::Id,
        };
        Token { kind, text }
    }

    /// Parse a maximal run of decimal digits. No sign, no suffixes.
    fn integer(&mut self) -> Token<'doc> {
        let text = self.take_while(|ch| ch.is_ascii_digit());
        Token {
            kind: TokenKind::Int,
            text,
        }
    }

    fn take_while(&mut self, accept: impl Fn(u8) -> bool) -> &'doc str {
        let start = self.position;
        while self.peek().is_some_and(&accept) {
            self.position += 1;
        }
        &self.input[start..self.position]
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|ch| ch.is_ascii_whitespace()) {
            self.position += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }
}
