//! Error type shared by the lexer, the XML token merger, and the parser.

use thiserror::Error;

/// Any way a declaration fragment can fail to parse.
///
/// Every variant is terminal for the parse that raised it: there is no
/// recovery, backtracking, or partial output. Variants own their payloads so
/// the error can outlive the XML document it was raised against.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character in raw declaration text that starts no token.
    #[error("unexpected character '{0}' in declaration")]
    UnexpectedCharacter(char),

    /// The token stream ended where the grammar required another token.
    #[error("unexpected end of declaration")]
    UnexpectedEof,

    /// A token of the wrong kind where a specific shape was required.
    /// `found` is the display form of the offending token.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },

    /// Tokens left over after a production that must consume its whole
    /// element.
    #[error("trailing {0} after complete declaration")]
    TrailingTokens(String),

    /// A child element whose tag is not one of `type`, `enum`, `name`, or
    /// `comment`.
    #[error("unexpected <{0}> element inside a declaration")]
    UnexpectedTag(String),

    /// A recognized child element that does not contain exactly one text
    /// node.
    #[error("<{0}> element must contain exactly one text node")]
    InvalidXml(String),

    /// The grammar required a declared name and none was present.
    #[error("declaration is missing a name")]
    MissingName,

    /// An integer literal too large for its target width.
    #[error("integer literal '{0}' is out of range")]
    IntegerOverflow(String),
}
