//! # Introduction
//!
//! vkdecl parses the C type declarations that Vulkan-style API registries
//! embed inside their XML, where free-form declarator text is interleaved
//! with `<type>`, `<enum>`, and `<name>` markup:
//!
//! ```text
//! typedef void (VKAPI_PTR *<name>PFN_vkVoidFunction</name>)(void);
//! ```
//!
//! Each such fragment becomes a language-agnostic type descriptor that a
//! downstream generator can translate into target-language declarations.
//!
//! ## Parsing pipeline
//!
//! ```text
//! XML element → XmlLexer → tokens → Parser → Declaration / Field
//!                  ↑
//!                Lexer (one instance per text run)
//! ```
//!
//! 1. [`lexer`] — tokenises a contiguous run of raw C text.
//! 2. [`xml`] — merges text runs and tagged child elements of one
//!    [`roxmltree::Node`] into a single token stream with one token of
//!    lookahead.
//! 3. [`parser`] — recursive descent over the merged stream, producing the
//!    [`ast::TypeInfo`] tree for typedefs, struct/union members, command
//!    parameters, and version defines.
//!
//! The crate checks syntactic well-formedness only; resolving type names and
//! enum-valued array sizes against the full registry is the caller's job.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod xml;
