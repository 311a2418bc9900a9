//! Parsed-declaration data model.
//!
//! Everything here borrows its names from the XML document buffer (`'doc`);
//! the document must outlive every tree parsed from it. Child nodes are
//! `Box`-owned, so a whole [`TypeInfo`] tree is a single-ownership structure
//! dropped in one piece.

/// Size of one array dimension.
///
/// Registry declarations size arrays either with a literal
/// (`float matrix[4]`) or with a reference to an API constant
/// (`uint8_t uuid[<enum>VK_UUID_SIZE</enum>]`). Enum references stay
/// unresolved text; the registry layer looks them up later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArraySize<'doc> {
    Int(usize),
    Enum(&'doc str),
}

/// How many elements a pointer addresses.
///
/// Parsing always yields [`PointerSize::One`]; the registry layer refines
/// pointers to `Many`/`ZeroTerminated` from `len` attributes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSize {
    One,
    Many,
    ZeroTerminated,
}

/// Recursive descriptor for a declared type.
///
/// A closed set of four shapes; consumers match exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeInfo<'doc> {
    /// A bare type name, e.g. `uint32_t` or `VkInstance`.
    Alias(&'doc str),

    /// One level of indirection over `child`.
    ///
    /// `is_optional` and `size` are placeholders at parse time (`true` and
    /// `One` respectively); a later enrichment stage fills them in from
    /// registry attributes.
    Pointer {
        is_const: bool,
        is_optional: bool,
        size: PointerSize,
        child: Box<TypeInfo<'doc>>,
    },

    /// Fixed-size array of `child`. For `int x[2][3]` the outer node holds
    /// size 2 and its child holds size 3.
    Array {
        size: ArraySize<'doc>,
        child: Box<TypeInfo<'doc>>,
    },

    /// Function-pointer type declared through the
    /// `(VKAPI_PTR *name)(params)` idiom.
    ///
    /// `success_codes`/`error_codes` are always empty at parse time; the
    /// registry layer populates them from command metadata.
    CommandPtr {
        params: Vec<Param<'doc>>,
        return_type: Box<TypeInfo<'doc>>,
        success_codes: Vec<&'doc str>,
        error_codes: Vec<&'doc str>,
    },
}

/// A declared name together with its type.
///
/// `name` is `None` only for anonymous function-pointer parameters; every
/// public parser entry point rejects nameless results, so callers of those
/// always get `Some`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<'doc> {
    pub name: Option<&'doc str>,
    pub decl_type: TypeInfo<'doc>,
}

/// A struct or union member. `bits` is present only for bit-field members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'doc> {
    pub name: &'doc str,
    pub field_type: TypeInfo<'doc>,
    pub bits: Option<usize>,
}

/// A function-pointer parameter. Unlike [`Declaration`], the name is
/// mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param<'doc> {
    pub name: &'doc str,
    pub param_type: TypeInfo<'doc>,
}

/// A registry version define, e.g.
/// `#define VK_API_VERSION_1_0 VK_MAKE_API_VERSION(0, 1, 0, 0)`.
///
/// `variant` is `None` for the older three-argument `VK_MAKE_VERSION` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersion<'doc> {
    pub name: &'doc str,
    pub variant: Option<u32>,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}
