use alloc::string::String;
use core::fmt;

use thiserror::Error;
use vc_markup::{MarkupError, Position};
use vc_shape::{ArgError, ConvertError, MarkupDecl};

// -----------------------------------------------------------------------------
// ConfigError

/// A type shape that cannot be mapped, detected while building its plan.
///
/// These are programming errors: the same shape fails the same way every time.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("`{ty}.{field}` is declared as {derived:?} but its base declares it as {base:?}")]
    HierarchyConflict {
        ty: &'static str,
        field: &'static str,
        base: MarkupDecl,
        derived: MarkupDecl,
    },

    #[error("`{ty}.{field}` has an empty markup name but overrides no base field")]
    TemplateNameWithoutBase { ty: &'static str, field: &'static str },

    #[error("`{ty}` declares more than one text field")]
    MultipleTextProperties { ty: &'static str },

    #[error("`{ty}` declares more than one encrypted element list")]
    MultipleEncryptedElementLists { ty: &'static str },

    #[error("`{ty}.{field}` is an encrypted element list, `{ty}` cannot have other element content")]
    EncryptedElementListNotAlone { ty: &'static str, field: &'static str },

    #[error("`{ty}` has no default value and no constructor")]
    NoInstantiableType { ty: &'static str },

    #[error("the base of `{ty}` is not a record")]
    BaseNotRecord { ty: &'static str },

    #[error("`{ty}.{field}` is declared as {decl:?} but does not hold a scalar")]
    NotScalar {
        ty: &'static str,
        field: &'static str,
        decl: MarkupDecl,
    },

    #[error("`{ty}` maps the name `{name}` more than once")]
    DuplicateName { ty: &'static str, name: &'static str },
}

// -----------------------------------------------------------------------------
// DocumentError

/// What went wrong in a malformed document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentErrorKind {
    #[error("unknown type hint `{0}`")]
    UnknownTypeHint(String),

    #[error("type hint `{hint}` does not name a `{expected}`")]
    IncompatibleTypeHint { hint: String, expected: &'static str },

    #[error("cannot construct a concrete instance of `{0}`: no type hint found")]
    NoTypeHint(&'static str),

    #[error("malformed document: no value produced")]
    NoValueProduced,

    #[error("expected root element `{expected}`, found `{found}`")]
    UnexpectedRoot { expected: String, found: String },

    #[error("cannot combine values for `{0}`")]
    CannotCombine(&'static str),

    #[error("cannot decrypt {0}: expected a string value")]
    DecryptNonString(String),

    #[error("encryption scope exited before its content was fully read")]
    ScopeExitedEarly,

    #[error("decrypted content is not well-formed markup")]
    MalformedFragment(#[source] MarkupError),

    #[error(transparent)]
    InvalidValue(#[from] ConvertError),

    #[error("no value for constructor parameter `{0}`")]
    MissingConstructorArgument(&'static str),

    #[error("constructor failed: {0}")]
    ConstructionFailed(#[from] ArgError),

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("value read for `{field}` is not a `{expected}`")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },
}

/// A malformed document, with the location of the offending value.
#[derive(Debug, Error)]
pub struct DocumentError {
    kind: DocumentErrorKind,
    path: String,
    position: Position,
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} ({})", self.kind, self.position)
        } else {
            write!(f, "{} at `{}` ({})", self.kind, self.path, self.position)
        }
    }
}

impl DocumentError {
    #[inline]
    pub fn new(kind: DocumentErrorKind, path: String, position: Position) -> Self {
        Self {
            kind,
            path,
            position,
        }
    }

    #[inline]
    pub fn kind(&self) -> &DocumentErrorKind {
        &self.kind
    }

    /// Slash-separated field path, empty at the root.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }
}

// -----------------------------------------------------------------------------
// EncryptionError

/// Raised by an [`EncryptionMechanism`](crate::EncryptionMechanism).
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum EncryptionError {
    #[error("encryption failed: {0}")]
    Encrypt(String),

    #[error("decryption failed: {0}")]
    Decrypt(String),
}

// -----------------------------------------------------------------------------
// MapError

/// Any error returned by a [`Mapper`](crate::Mapper).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl MapError {
    /// The malformed-document kind, if this is one.
    #[inline]
    pub fn document_kind(&self) -> Option<&DocumentErrorKind> {
        match self {
            Self::Document(error) => Some(error.kind()),
            _ => None,
        }
    }
}
