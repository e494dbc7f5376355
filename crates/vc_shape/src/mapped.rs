use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::Shape;

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to the [`Shape`] of a type.
///
/// The shape is built once, on first access, and lives for the rest of the
/// process. Implementations usually keep it in a [`ShapeCell`], or in a
/// [`GenericShapeCell`] for generic types.
///
/// # Examples
///
/// ```
/// use vc_shape::{FieldInfo, RecordInfo, Shape, ShapeCell, Typed};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Typed for Point {
///     fn type_shape() -> &'static Shape {
///         static CELL: ShapeCell = ShapeCell::new();
///         CELL.get_or_init(|| {
///             Shape::record::<Self>(
///                 RecordInfo::new([
///                     FieldInfo::new("X", |p: &Point| &p.x).with_setter(|p: &mut Point, v| p.x = v),
///                     FieldInfo::new("Y", |p: &Point| &p.y).with_setter(|p: &mut Point, v| p.y = v),
///                 ])
///                 .with_default::<Self>(),
///             )
///         })
///     }
/// }
///
/// let shape = Point::type_shape();
/// assert_eq!(shape.name(), "Point");
/// assert_eq!(shape.as_record().unwrap().fields().len(), 2);
/// ```
///
/// [`ShapeCell`]: crate::ShapeCell
/// [`GenericShapeCell`]: crate::GenericShapeCell
pub trait Typed: Any + Send + Sync {
    /// Returns the shape of `Self`.
    fn type_shape() -> &'static Shape;
}

// -----------------------------------------------------------------------------
// Mapped

/// The object-safe counterpart of [`Typed`].
///
/// Implemented for every [`Typed`] type, this is how the mapper handles
/// values whose concrete type is only known at runtime.
pub trait Mapped: Any + Send + Sync {
    /// Returns the shape of the concrete type behind `self`.
    fn shape(&self) -> &'static Shape;

    /// Casts to `&dyn Mapped`.
    fn as_mapped(&self) -> &dyn Mapped;

    /// Casts to `&mut dyn Mapped`.
    fn as_mapped_mut(&mut self) -> &mut dyn Mapped;
}

impl<T: Typed> Mapped for T {
    #[inline]
    fn shape(&self) -> &'static Shape {
        T::type_shape()
    }

    #[inline]
    fn as_mapped(&self) -> &dyn Mapped {
        self
    }

    #[inline]
    fn as_mapped_mut(&mut self) -> &mut dyn Mapped {
        self
    }
}

impl dyn Mapped {
    /// Returns the [`TypeId`] of the concrete type.
    #[inline]
    pub fn ty_id(&self) -> TypeId {
        let any: &dyn Any = self;
        Any::type_id(any)
    }

    /// Returns `true` if the concrete type is `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.ty_id() == TypeId::of::<T>()
    }

    /// Downcasts to `&T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref()
    }

    /// Downcasts to `&mut T`.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self;
        any.downcast_mut()
    }

    /// Moves the value out of the box.
    ///
    /// Returns the box unchanged if the concrete type is not `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_shape::Mapped;
    ///
    /// let value: Box<dyn Mapped> = Box::new(5_u32);
    /// let value = value.take::<i32>().unwrap_err();
    /// assert_eq!(value.take::<u32>().ok(), Some(5));
    /// ```
    pub fn take<T: Any>(self: Box<Self>) -> Result<T, Box<dyn Mapped>> {
        if !self.is::<T>() {
            return Err(self);
        }
        let any: Box<dyn Any> = self;
        match any.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => unreachable!("type id checked before downcast"),
        }
    }
}

impl fmt::Debug for dyn Mapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.shape().type_path())
    }
}
