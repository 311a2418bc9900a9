//! Declarator parsing implementation.
//!
//! This module handles the restricted C declaration grammar that registry
//! XML embeds:
//!
//! - Typedefs: `typedef uint32_t VkFlags;`
//! - Struct/union members: `uint32_t mask : 8`, `uint8_t uuid[VK_UUID_SIZE]`
//! - Command parameters and prototypes
//! - Function-pointer typedefs: `typedef void (VKAPI_PTR *PFN_x)(void);`
//! - Version defines: `#define VK_API_VERSION_1_0 VK_MAKE_API_VERSION(0, 1, 0, 0)`
//!
//! # Grammar
//!
//! ```text
//! typedef        ::= "typedef" declaration ";"
//! member         ::= declaration (":" int)?
//! param_or_proto ::= declaration
//! declaration    ::= "const"? "struct"? (type-name | id) pointers
//!                    (name | fn_ptr_suffix)? ("[" array_size "]")*
//! pointers       ::= ("const"? "*")*
//! fn_ptr_suffix  ::= "(" "VKAPI_PTR" "*" name ")" "(" params ")"
//! params         ::= "void" | declaration ("," declaration)*
//! array_size     ::= int | enum-name
//! version        ::= "#" "define" name macro "(" int ("," int)* ")"
//! ```
//!
//! One token of lookahead resolves every choice point; parsing never
//! backtracks. The first mismatch aborts the whole declaration with a
//! [`ParseError`]; there is no recovery or partial output.

use log::trace;
use roxmltree::Node;

use crate::ast::{ApiVersion, ArraySize, Declaration, Field, Param, PointerSize, TypeInfo};
use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::xml::XmlLexer;

/// Recursive descent parser over one declaration element's token stream.
///
/// Each entry point parses one complete production and requires the element
/// to hold nothing else; a fresh `Parser` is needed per element.
pub struct Parser<'doc, 'input> {
    tokens: XmlLexer<'doc, 'input>,
}

impl<'doc, 'input> Parser<'doc, 'input> {
    /// Create a parser over the content of `element`.
    pub fn from_element(element: Node<'doc, 'input>) -> Self {
        Self {
            tokens: XmlLexer::from_element(element),
        }
    }

    /// Parse a typedef: `typedef uint32_t VkFlags;`.
    ///
    /// The declared name is mandatory and the element must contain nothing
    /// after the `;`. Returns the typedef target; wrapping it into a
    /// registry declaration kind is the caller's job.
    pub fn parse_typedef(&mut self) -> Result<Declaration<'doc>, ParseError> {
        self.tokens.expect(TokenKind::Typedef)?;
        let decl = self.parse_declaration()?;
        self.tokens.expect(TokenKind::Semicolon)?;
        self.expect_end()?;

        if decl.name.is_none() {
            return Err(ParseError::MissingName);
        }
        trace!("parsed typedef {}", decl.name.unwrap_or_default());
        Ok(decl)
    }

    /// Parse a struct/union member, including an optional `: width`
    /// bit-field suffix.
    pub fn parse_member(&mut self) -> Result<Field<'doc>, ParseError> {
        let decl = self.parse_declaration()?;
        let name = decl.name.ok_or(ParseError::MissingName)?;

        let bits = if self.peek_kind()? == Some(TokenKind::Colon) {
            self.tokens.next()?;
            let width = self.tokens.expect(TokenKind::Int)?;
            Some(parse_int(width.text)?)
        } else {
            None
        };
        self.expect_end()?;

        trace!("parsed member {name}");
        Ok(Field {
            name,
            field_type: decl.decl_type,
            bits,
        })
    }

    /// Parse a top-level command parameter or prototype.
    ///
    /// Same shape as the declarations inside a function-pointer parameter
    /// list, but the name is mandatory and the element must be fully
    /// consumed.
    pub fn parse_param_or_proto(&mut self) -> Result<Declaration<'doc>, ParseError> {
        let decl = self.parse_declaration()?;
        if decl.name.is_none() {
            return Err(ParseError::MissingName);
        }
        self.expect_end()?;

        trace!("parsed param {}", decl.name.unwrap_or_default());
        Ok(decl)
    }

    /// Parse a version define:
    /// `#define VK_API_VERSION_1_0 VK_MAKE_API_VERSION(0, 1, 0, 0)`.
    ///
    /// Accepts the three-argument `VK_MAKE_VERSION` form (no variant) and
    /// the four-argument `VK_MAKE_API_VERSION` form. The macro name may
    /// arrive tagged (`<type>`) or as plain text.
    pub fn parse_version(&mut self) -> Result<ApiVersion<'doc>, ParseError> {
        self.tokens.expect(TokenKind::Hash)?;
        let define = self.tokens.expect(TokenKind::Id)?;
        if define.text != "define" {
            return Err(ParseError::UnexpectedToken {
                expected: "'define'",
                found: define.to_string(),
            });
        }
        let name = self.tokens.expect(TokenKind::Name)?.text;

        let mac = self.tokens.next_no_eof()?;
        let has_variant = match (mac.kind, mac.text) {
            (TokenKind::TypeName | TokenKind::Id, "VK_MAKE_VERSION") => false,
            (TokenKind::TypeName | TokenKind::Id, "VK_MAKE_API_VERSION") => true,
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "a version macro",
                    found: mac.to_string(),
                })
            }
        };

        self.tokens.expect(TokenKind::LParen)?;
        let variant = if has_variant {
            let variant = self.version_component()?;
            self.tokens.expect(TokenKind::Comma)?;
            Some(variant)
        } else {
            None
        };
        let major = self.version_component()?;
        self.tokens.expect(TokenKind::Comma)?;
        let minor = self.version_component()?;
        self.tokens.expect(TokenKind::Comma)?;
        let patch = self.version_component()?;
        self.tokens.expect(TokenKind::RParen)?;
        self.expect_end()?;

        trace!("parsed version define {name}");
        Ok(ApiVersion {
            name,
            variant,
            major,
            minor,
            patch,
        })
    }

    /// Parse one declaration: qualifiers, base type, pointers, then either a
    /// function-pointer suffix or an optional name with array suffixes.
    ///
    /// The name stays optional here; entry points and parameter lists
    /// enforce their own name requirements.
    fn parse_declaration(&mut self) -> Result<Declaration<'doc>, ParseError> {
        let mut tok = self.tokens.peek_no_eof()?;
        let inner_const = tok.kind == TokenKind::Const;
        if inner_const {
            self.tokens.next()?;
            tok = self.tokens.peek_no_eof()?;
        }
        // Struct-ness is discarded; only the following name is kept.
        if tok.kind == TokenKind::Struct {
            self.tokens.next()?;
        }

        let base = self.tokens.next_no_eof()?;
        if !matches!(base.kind, TokenKind::TypeName | TokenKind::Id) {
            return Err(ParseError::UnexpectedToken {
                expected: "a type name",
                found: base.to_string(),
            });
        }
        let mut decl_type = self.parse_pointers(inner_const, TypeInfo::Alias(base.text))?;

        // A `(` after the pointer chain can only start the function-pointer
        // idiom; such a declaration takes no array suffix.
        if self.peek_kind()? == Some(TokenKind::LParen) {
            return self.parse_fn_ptr_suffix(decl_type);
        }

        let name = match self.peek_kind()? {
            Some(TokenKind::Id | TokenKind::Name) => Some(self.tokens.next_no_eof()?.text),
            _ => None,
        };

        let mut sizes = Vec::new();
        while self.peek_kind()? == Some(TokenKind::LBracket) {
            sizes.push(self.parse_array_declarator()?);
        }
        // `int x[2][3]`: the rightmost bracket is the innermost array, so
        // wrap from the inside out.
        for size in sizes.into_iter().rev() {
            decl_type = TypeInfo::Array {
                size,
                child: Box::new(decl_type),
            };
        }

        Ok(Declaration { name, decl_type })
    }

    /// Wrap `decl_type` in one pointer node per `*`.
    ///
    /// Constness attaches to the `*` it follows: `Foo * const *` marks the
    /// first (inner) pointer const. A `const` seen before any `*` (either on
    /// the base type, as `inner_const`, or just after it) marks the first
    /// pointer const instead. A trailing `const` with no `*` after it
    /// qualifies the declared name itself and produces no node.
    fn parse_pointers(
        &mut self,
        inner_const: bool,
        mut decl_type: TypeInfo<'doc>,
    ) -> Result<TypeInfo<'doc>, ParseError> {
        let mut first_const = inner_const;
        let mut pending_const = false;
        loop {
            match self.peek_kind()? {
                Some(TokenKind::Const) => {
                    self.tokens.next()?;
                    pending_const = true;
                }
                Some(TokenKind::Star) => {
                    self.tokens.next()?;
                    if pending_const {
                        match &mut decl_type {
                            TypeInfo::Pointer { is_const, .. } => *is_const = true,
                            _ => first_const = true,
                        }
                        pending_const = false;
                    }
                    decl_type = TypeInfo::Pointer {
                        is_const: std::mem::take(&mut first_const),
                        is_optional: true,
                        size: PointerSize::One,
                        child: Box::new(decl_type),
                    };
                }
                _ => return Ok(decl_type),
            }
        }
    }

    /// Parse the fixed `(VKAPI_PTR *name)(params)` idiom.
    ///
    /// Only called when the next token is `(`; from there every token is
    /// mandatory — this is not a general parenthesized-expression parser.
    /// `return_type` is the base-plus-pointers chain parsed before the
    /// suffix.
    fn parse_fn_ptr_suffix(
        &mut self,
        return_type: TypeInfo<'doc>,
    ) -> Result<Declaration<'doc>, ParseError> {
        self.tokens.expect(TokenKind::LParen)?;
        self.tokens.expect(TokenKind::VkApiPtr)?;
        self.tokens.expect(TokenKind::Star)?;
        let name = self.tokens.expect(TokenKind::Name)?.text;
        self.tokens.expect(TokenKind::RParen)?;
        self.tokens.expect(TokenKind::LParen)?;
        let params = self.parse_fn_params()?;

        Ok(Declaration {
            name: Some(name),
            decl_type: TypeInfo::CommandPtr {
                params,
                return_type: Box::new(return_type),
                success_codes: Vec::new(),
                error_codes: Vec::new(),
            },
        })
    }

    /// Parse a function-pointer parameter list after its opening `(`,
    /// consuming the closing `)`.
    ///
    /// A sole bare `void` is the explicit zero-parameter marker; otherwise
    /// every parameter must be named.
    fn parse_fn_params(&mut self) -> Result<Vec<Param<'doc>>, ParseError> {
        let first = self.parse_declaration()?;
        if first.name.is_none() {
            if first.decl_type == TypeInfo::Alias("void") {
                self.tokens.expect(TokenKind::RParen)?;
                return Ok(Vec::new());
            }
            return Err(ParseError::MissingName);
        }

        let mut params = vec![Self::into_param(first)?];
        loop {
            let tok = self.tokens.next_no_eof()?;
            match tok.kind {
                TokenKind::Comma => {
                    let decl = self.parse_declaration()?;
                    params.push(Self::into_param(decl)?);
                }
                TokenKind::RParen => return Ok(params),
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "',' or ')'",
                        found: tok.to_string(),
                    })
                }
            }
        }
    }

    /// Parse one `[size]` suffix; the opening bracket is known to be next.
    fn parse_array_declarator(&mut self) -> Result<ArraySize<'doc>, ParseError> {
        self.tokens.expect(TokenKind::LBracket)?;
        let tok = self.tokens.next_no_eof()?;
        let size = match tok.kind {
            TokenKind::Int => ArraySize::Int(parse_int(tok.text)?),
            TokenKind::EnumName => ArraySize::Enum(tok.text),
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "an array size",
                    found: tok.to_string(),
                })
            }
        };
        self.tokens.expect(TokenKind::RBracket)?;
        Ok(size)
    }

    fn version_component(&mut self) -> Result<u32, ParseError> {
        let tok = self.tokens.expect(TokenKind::Int)?;
        tok.text
            .parse()
            .map_err(|_| ParseError::IntegerOverflow(tok.text.to_string()))
    }

    fn into_param(decl: Declaration<'doc>) -> Result<Param<'doc>, ParseError> {
        let name = decl.name.ok_or(ParseError::MissingName)?;
        Ok(Param {
            name,
            param_type: decl.decl_type,
        })
    }

    fn peek_kind(&mut self) -> Result<Option<TokenKind>, ParseError> {
        Ok(self.tokens.peek()?.map(|tok| tok.kind))
    }

    /// Require the element's token stream to be exhausted.
    fn expect_end(&mut self) -> Result<(), ParseError> {
        match self.tokens.next()? {
            None => Ok(()),
            Some(tok) => Err(ParseError::TrailingTokens(tok.to_string())),
        }
    }
}

/// Parse an array size or bit-field width. The token is all digits, so the
/// only possible failure is overflow.
fn parse_int(text: &str) -> Result<usize, ParseError> {
    text.parse()
        .map_err(|_| ParseError::IntegerOverflow(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_parser<F>(xml: &str, f: F)
    where
        F: FnOnce(Parser<'_, '_>),
    {
        let doc = roxmltree::Document::parse(xml).expect("test xml is well-formed");
        f(Parser::from_element(doc.root_element()))
    }

    fn alias(name: &str) -> TypeInfo<'_> {
        TypeInfo::Alias(name)
    }

    fn ptr<'doc>(is_const: bool, child: TypeInfo<'doc>) -> TypeInfo<'doc> {
        TypeInfo::Pointer {
            is_const,
            is_optional: true,
            size: PointerSize::One,
            child: Box::new(child),
        }
    }

    #[test]
    fn test_const_before_base_marks_first_pointer() {
        with_parser("<param>const Foo* <name>x</name></param>", |mut parser| {
            let decl = parser.parse_param_or_proto().unwrap();
            assert_eq!(decl.decl_type, ptr(true, alias("Foo")));
        });
    }

    #[test]
    fn test_trailing_const_is_dropped() {
        with_parser("<param>Foo* const <name>x</name></param>", |mut parser| {
            let decl = parser.parse_param_or_proto().unwrap();
            assert_eq!(decl.decl_type, ptr(false, alias("Foo")));
        });
    }

    #[test]
    fn test_const_between_stars_marks_inner_pointer() {
        with_parser(
            "<param>const Foo* const* <name>x</name></param>",
            |mut parser| {
                let decl = parser.parse_param_or_proto().unwrap();
                assert_eq!(decl.decl_type, ptr(false, ptr(true, alias("Foo"))));
            },
        );
    }

    #[test]
    fn test_const_after_base_before_first_star() {
        // `Foo const*` means the same as `const Foo*`.
        with_parser("<param>Foo const* <name>x</name></param>", |mut parser| {
            let decl = parser.parse_param_or_proto().unwrap();
            assert_eq!(decl.decl_type, ptr(true, alias("Foo")));
        });
    }

    #[test]
    fn test_pointer_depth_matches_star_count() {
        with_parser("<param>void*** <name>x</name></param>", |mut parser| {
            let decl = parser.parse_param_or_proto().unwrap();
            assert_eq!(decl.decl_type, ptr(false, ptr(false, ptr(false, alias("void")))));
        });
    }

    #[test]
    fn test_array_suffixes_nest_rightmost_innermost() {
        with_parser("<param>int <name>x</name>[2][3]</param>", |mut parser| {
            let decl = parser.parse_param_or_proto().unwrap();
            assert_eq!(
                decl.decl_type,
                TypeInfo::Array {
                    size: ArraySize::Int(2),
                    child: Box::new(TypeInfo::Array {
                        size: ArraySize::Int(3),
                        child: Box::new(alias("int")),
                    }),
                }
            );
        });
    }

    #[test]
    fn test_array_size_must_be_int_or_enum() {
        with_parser("<param>int <name>x</name>[abc]</param>", |mut parser| {
            assert_eq!(
                parser.parse_param_or_proto(),
                Err(ParseError::UnexpectedToken {
                    expected: "an array size",
                    found: "identifier 'abc'".to_string(),
                })
            );
        });
    }

    #[test]
    fn test_array_size_overflow() {
        let xml = "<param>int <name>x</name>[999999999999999999999999]</param>";
        with_parser(xml, |mut parser| {
            assert_eq!(
                parser.parse_param_or_proto(),
                Err(ParseError::IntegerOverflow(
                    "999999999999999999999999".to_string()
                ))
            );
        });
    }

    #[test]
    fn test_struct_keyword_is_discarded() {
        with_parser(
            "<param>struct <type>wl_display</type>* <name>display</name></param>",
            |mut parser| {
                let decl = parser.parse_param_or_proto().unwrap();
                assert_eq!(decl.name, Some("display"));
                assert_eq!(decl.decl_type, ptr(false, alias("wl_display")));
            },
        );
    }

    #[test]
    fn test_member_requires_name() {
        with_parser("<member><type>uint32_t</type></member>", |mut parser| {
            assert_eq!(parser.parse_member(), Err(ParseError::MissingName));
        });
    }

    #[test]
    fn test_typedef_rejects_trailing_tokens() {
        with_parser(
            "<type>typedef <type>uint32_t</type> <name>VkFlags</name>; bogus</type>",
            |mut parser| {
                assert_eq!(
                    parser.parse_typedef(),
                    Err(ParseError::TrailingTokens("identifier 'bogus'".to_string()))
                );
            },
        );
    }

    #[test]
    fn test_typedef_requires_semicolon() {
        with_parser(
            "<type>typedef <type>uint32_t</type> <name>VkFlags</name></type>",
            |mut parser| {
                assert_eq!(parser.parse_typedef(), Err(ParseError::UnexpectedEof));
            },
        );
    }

    #[test]
    fn test_bitfield_width_is_parsed() {
        with_parser(
            "<member><type>uint32_t</type> <name>mask</name> : 8</member>",
            |mut parser| {
                let field = parser.parse_member().unwrap();
                assert_eq!(field.name, "mask");
                assert_eq!(field.field_type, alias("uint32_t"));
                assert_eq!(field.bits, Some(8));
            },
        );
    }

    #[test]
    fn test_fn_ptr_requires_exact_idiom() {
        // `(*name)` without the calling-convention marker is rejected.
        with_parser(
            "<type>typedef void (*<name>PFN_x</name>)(void);</type>",
            |mut parser| {
                assert_eq!(
                    parser.parse_typedef(),
                    Err(ParseError::UnexpectedToken {
                        expected: "'VKAPI_PTR'",
                        found: "'*'".to_string(),
                    })
                );
            },
        );
    }
}
