use alloc::boxed::Box;

use crate::{GenericShapeCell, Mapped, Shape, Typed};

/// Accessors of a value that may be absent.
pub struct OptionalInfo {
    inner: fn() -> &'static Shape,
    get: fn(&dyn Mapped) -> Option<&dyn Mapped>,
    some: fn(Box<dyn Mapped>) -> Result<Box<dyn Mapped>, Box<dyn Mapped>>,
    none: fn() -> Box<dyn Mapped>,
}

fn option_get<T: Typed>(value: &dyn Mapped) -> Option<&dyn Mapped> {
    value
        .downcast_ref::<Option<T>>()?
        .as_ref()
        .map(|inner| inner as &dyn Mapped)
}

fn option_some<T: Typed>(value: Box<dyn Mapped>) -> Result<Box<dyn Mapped>, Box<dyn Mapped>> {
    let value = value.take::<T>()?;
    Ok(Box::new(Some(value)))
}

fn option_none<T: Typed>() -> Box<dyn Mapped> {
    Box::new(None::<T>)
}

impl OptionalInfo {
    /// The accessors of `Option<T>`.
    pub fn of_option<T: Typed>() -> Self {
        Self {
            inner: T::type_shape,
            get: option_get::<T>,
            some: option_some::<T>,
            none: option_none::<T>,
        }
    }

    /// The shape of the wrapped type.
    #[inline]
    pub fn inner(&self) -> &'static Shape {
        (self.inner)()
    }

    /// Borrows the wrapped value, `None` when absent.
    #[inline]
    pub fn get<'a>(&self, value: &'a dyn Mapped) -> Option<&'a dyn Mapped> {
        (self.get)(value)
    }

    /// Wraps a present value.
    #[inline]
    pub fn some(&self, value: Box<dyn Mapped>) -> Result<Box<dyn Mapped>, Box<dyn Mapped>> {
        (self.some)(value)
    }

    /// Creates the absent value.
    #[inline]
    pub fn none(&self) -> Box<dyn Mapped> {
        (self.none)()
    }
}

impl<T: Typed> Typed for Option<T> {
    fn type_shape() -> &'static Shape {
        static CELL: GenericShapeCell = GenericShapeCell::new();
        CELL.get_or_insert::<Self>(|| {
            Shape::optional::<Self>(OptionalInfo::of_option::<T>()).with_empty(option_none::<T>)
        })
    }
}
