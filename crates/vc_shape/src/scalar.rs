use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::any::type_name;
use core::fmt::{self, Display};
use core::marker::PhantomData;
use core::str::FromStr;

use thiserror::Error;

use crate::{Mapped, Shape, ShapeCell, Typed};

// -----------------------------------------------------------------------------
// ConvertError

/// A scalar could not be converted to or from text.
#[derive(Debug, Clone, Error)]
#[error("cannot convert {value:?} as `{type_name}`: {message}")]
pub struct ConvertError {
    type_name: &'static str,
    value: String,
    message: String,
}

impl ConvertError {
    #[inline]
    pub fn new(type_name: &'static str, value: impl Into<String>, message: impl Display) -> Self {
        Self {
            type_name,
            value: value.into(),
            message: message.to_string(),
        }
    }

    /// The value handed to a converter is not of its type.
    #[inline]
    pub fn mismatch(type_name: &'static str, found: &dyn Mapped) -> Self {
        Self::new(type_name, "", format_args!("found a `{}`", found.shape().type_path()))
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The offending text.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// -----------------------------------------------------------------------------
// ValueConverter

/// Converts one scalar type to and from its textual form.
pub trait ValueConverter: Send + Sync + 'static {
    fn format(&self, value: &dyn Mapped) -> Result<String, ConvertError>;

    fn parse(&self, text: &str) -> Result<Box<dyn Mapped>, ConvertError>;
}

/// A [`ValueConverter`] based on [`FromStr`] and [`Display`].
pub struct FromStrConverter<T>(PhantomData<fn() -> T>);

impl<T> FromStrConverter<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FromStrConverter<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValueConverter for FromStrConverter<T>
where
    T: Typed + FromStr + Display,
    T::Err: Display,
{
    fn format(&self, value: &dyn Mapped) -> Result<String, ConvertError> {
        value
            .downcast_ref::<T>()
            .map(ToString::to_string)
            .ok_or_else(|| ConvertError::mismatch(type_name::<T>(), value))
    }

    fn parse(&self, text: &str) -> Result<Box<dyn Mapped>, ConvertError> {
        text.parse::<T>()
            .map(|v| Box::new(v) as Box<dyn Mapped>)
            .map_err(|e| ConvertError::new(type_name::<T>(), text, e))
    }
}

/// A [`ValueConverter`] built from a pair of functions.
///
/// Handy for enums and other types without [`FromStr`].
pub struct FnConverter<T> {
    format: fn(&T) -> String,
    parse: fn(&str) -> Result<T, String>,
}

impl<T> FnConverter<T> {
    #[inline]
    pub const fn new(format: fn(&T) -> String, parse: fn(&str) -> Result<T, String>) -> Self {
        Self { format, parse }
    }
}

impl<T: Typed> ValueConverter for FnConverter<T> {
    fn format(&self, value: &dyn Mapped) -> Result<String, ConvertError> {
        value
            .downcast_ref::<T>()
            .map(self.format)
            .ok_or_else(|| ConvertError::mismatch(type_name::<T>(), value))
    }

    fn parse(&self, text: &str) -> Result<Box<dyn Mapped>, ConvertError> {
        (self.parse)(text)
            .map(|v| Box::new(v) as Box<dyn Mapped>)
            .map_err(|e| ConvertError::new(type_name::<T>(), text, e))
    }
}

/// Accepts `true`/`false` in any case, and `1`/`0`.
struct BoolConverter;

impl ValueConverter for BoolConverter {
    fn format(&self, value: &dyn Mapped) -> Result<String, ConvertError> {
        match value.downcast_ref::<bool>() {
            Some(true) => Ok(String::from("true")),
            Some(false) => Ok(String::from("false")),
            None => Err(ConvertError::mismatch("bool", value)),
        }
    }

    fn parse(&self, text: &str) -> Result<Box<dyn Mapped>, ConvertError> {
        let text = text.trim();
        let value = if text.eq_ignore_ascii_case("true") || text == "1" {
            true
        } else if text.eq_ignore_ascii_case("false") || text == "0" {
            false
        } else {
            return Err(ConvertError::new("bool", text, "expected `true` or `false`"));
        };
        Ok(Box::new(value))
    }
}

// -----------------------------------------------------------------------------
// ScalarInfo

/// How a scalar prefers to be typed in markup that distinguishes value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Text,
    Number,
    Boolean,
}

/// A scalar's converter and kind.
#[derive(Clone)]
pub struct ScalarInfo {
    converter: Arc<dyn ValueConverter>,
    kind: ScalarKind,
}

impl ScalarInfo {
    #[inline]
    pub fn new(converter: impl ValueConverter, kind: ScalarKind) -> Self {
        Self {
            converter: Arc::new(converter),
            kind,
        }
    }

    /// A scalar converted through [`FromStr`] and [`Display`].
    #[inline]
    pub fn from_str<T>(kind: ScalarKind) -> Self
    where
        T: Typed + FromStr + Display,
        T::Err: Display,
    {
        Self::new(FromStrConverter::<T>::new(), kind)
    }

    #[inline]
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    #[inline]
    pub fn converter(&self) -> &dyn ValueConverter {
        &*self.converter
    }

    #[inline]
    pub fn format(&self, value: &dyn Mapped) -> Result<String, ConvertError> {
        self.converter.format(value)
    }

    #[inline]
    pub fn parse(&self, text: &str) -> Result<Box<dyn Mapped>, ConvertError> {
        self.converter.parse(text)
    }
}

impl fmt::Debug for ScalarInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarInfo").field("kind", &self.kind).finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Built-in scalars

macro_rules! impl_from_str_scalar {
    ($kind:ident => $($ty:ty),+ $(,)?) => {$(
        impl Typed for $ty {
            fn type_shape() -> &'static Shape {
                static CELL: ShapeCell = ShapeCell::new();
                CELL.get_or_init(|| {
                    Shape::scalar::<Self>(ScalarInfo::from_str::<Self>(ScalarKind::$kind))
                        .with_default_value::<Self>()
                })
            }
        }
    )+};
}

impl_from_str_scalar!(Number => u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);
impl_from_str_scalar!(Text => char, String);

impl Typed for bool {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::scalar::<Self>(ScalarInfo::new(BoolConverter, ScalarKind::Boolean))
                .with_default_value::<Self>()
        })
    }
}
