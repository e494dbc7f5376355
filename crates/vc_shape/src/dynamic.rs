use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::{Shape, ShapeCell, Typed};

/// An untyped markup tree.
///
/// Used for fields whose structure is not known ahead of time. Members keep
/// document order and may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DynamicValue {
    /// An explicit nil marker.
    #[default]
    Null,
    Text(String),
    Object(Vec<(String, DynamicValue)>),
}

impl DynamicValue {
    /// Creates an empty object.
    #[inline]
    pub const fn object() -> Self {
        Self::Object(Vec::new())
    }

    /// Appends a member, turning `self` into an object if needed.
    pub fn with_member(mut self, name: impl Into<String>, value: DynamicValue) -> Self {
        if let Self::Object(members) = &mut self {
            members.push((name.into(), value));
            return self;
        }
        Self::Object(vec![(name.into(), value)])
    }

    /// The first member called `name`.
    pub fn get(&self, name: &str) -> Option<&DynamicValue> {
        match self {
            Self::Object(members) => members.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for DynamicValue {
    #[inline]
    fn from(text: &str) -> Self {
        Self::Text(String::from(text))
    }
}

impl Typed for DynamicValue {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::dynamic::<Self>()
                .with_name("Dynamic")
                .with_default_value::<Self>()
        })
    }
}
