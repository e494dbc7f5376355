use alloc::string::String;
use core::fmt;

// -----------------------------------------------------------------------------
// Token

/// An elementary markup token.
///
/// Every element produces `Start`, its `Attribute`s, `AttributesEnd`, its
/// content and `End`, in that order, whatever the flavor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start(String),
    Attribute { name: String, value: String },
    AttributesEnd,
    Text(String),
    End(String),
}

impl Token {
    /// A short description, for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Start(name) => alloc::format!("<{name}>"),
            Self::Attribute { name, .. } => alloc::format!("attribute `{name}`"),
            Self::AttributesEnd => String::from("end of attributes"),
            Self::Text(_) => String::from("text"),
            Self::End(name) => alloc::format!("</{name}>"),
        }
    }
}

// -----------------------------------------------------------------------------
// Position

/// Where a token was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Unknown,
    /// 1-based line and column in the source text.
    LineColumn { line: u32, column: u32 },
    /// Index of the token in a buffered stream.
    Ordinal(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown position"),
            Self::LineColumn { line, column } => write!(f, "{line}:{column}"),
            Self::Ordinal(index) => write!(f, "token #{index}"),
        }
    }
}

impl Position {
    /// Computes the line and column of a byte offset.
    pub fn of_offset(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let before = text.get(..offset).unwrap_or(text);
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self::LineColumn {
            line: line as u32,
            column: column as u32,
        }
    }
}

// -----------------------------------------------------------------------------
// TextKind

/// Type hint of a text value, used by flavors with typed scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextKind {
    #[default]
    String,
    Number,
    Boolean,
}
