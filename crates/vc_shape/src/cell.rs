//! Containers for static storage of shapes.
//!
//! Used to implement [`Typed`](crate::Typed).
//!
//! ## ShapeCell
//!
//! For non-generic types, a [`ShapeCell`] wraps a [`OnceLock`].
//!
//! ## GenericShapeCell
//!
//! A `static CELL` inside a generic function is shared by every
//! instantiation, so [`GenericShapeCell`] keeps one leaked shape per
//! [`TypeId`] behind a [`RwLock`].

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::Shape;
use crate::hash::{TypeIdMap, new_map};

/// Static storage of the shape of a non-generic type.
///
/// # Examples
///
/// ```
/// use vc_shape::{ScalarInfo, ScalarKind, Shape, ShapeCell, Typed, FnConverter};
///
/// struct Celsius(f32);
///
/// impl Typed for Celsius {
///     fn type_shape() -> &'static Shape {
///         static CELL: ShapeCell = ShapeCell::new();
///         CELL.get_or_init(|| {
///             Shape::scalar::<Self>(ScalarInfo::new(
///                 FnConverter::new(
///                     |c: &Celsius| c.0.to_string(),
///                     |s| s.parse().map(Celsius).map_err(|e| format!("{e}")),
///                 ),
///                 ScalarKind::Number,
///             ))
///         })
///     }
/// }
///
/// assert!(core::ptr::eq(Celsius::type_shape(), Celsius::type_shape()));
/// ```
pub struct ShapeCell(OnceLock<Shape>);

impl ShapeCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored shape, building it with `f` on first access.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> Shape) -> &Shape {
        self.0.get_or_init(f)
    }
}

/// Static storage of the shapes of a generic type.
///
/// # Examples
///
/// ```
/// use vc_shape::{GenericShapeCell, Shape, Typed};
///
/// struct Stack<T>(Vec<T>);
///
/// impl<T: Typed> Typed for Stack<T> {
///     fn type_shape() -> &'static Shape {
///         static CELL: GenericShapeCell = GenericShapeCell::new();
///         CELL.get_or_insert::<Self>(|| Shape::dynamic::<Self>())
///     }
/// }
///
/// assert_ne!(<Stack<u8>>::type_shape().id(), <Stack<u16>>::type_shape().id());
/// ```
pub struct GenericShapeCell(RwLock<TypeIdMap<&'static Shape>>);

impl GenericShapeCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(new_map()))
    }

    /// Returns the shape stored for `G`, building it with `f` on first access.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> Shape) -> &'static Shape {
        // Separate to reduce code compilation times
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> Shape) -> &'static Shape {
        match self.get_by_type_id(type_id) {
            Some(shape) => shape,
            // `f` may reach other generic shapes, so it runs without the lock.
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&'static Shape> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, shape: Shape) -> &'static Shape {
        *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_id)
            .or_insert_with(|| Box::leak(Box::new(shape)))
    }
}
