//! Process-wide inventory of mapped types.
//!
//! Types submitted with [`register_type!`](crate::register_type) can be
//! resolved from type tags without being listed one by one. Collection relies
//! on the `inventory` crate and the `auto_register` feature; without it the
//! inventory is always empty.

use alloc::vec::Vec;

use crate::{Shape, Typed};

/// An entry of the inventory.
pub struct KnownType {
    shape: fn() -> &'static Shape,
}

impl KnownType {
    #[inline]
    pub const fn of<T: Typed>() -> Self {
        Self {
            shape: T::type_shape,
        }
    }

    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(KnownType);

/// Every registered shape, in no particular order.
#[cfg(feature = "auto_register")]
pub fn known_types() -> Vec<&'static Shape> {
    inventory::iter::<KnownType>
        .into_iter()
        .map(KnownType::shape)
        .collect()
}

/// Every registered shape, in no particular order.
#[cfg(not(feature = "auto_register"))]
#[inline]
pub fn known_types() -> Vec<&'static Shape> {
    Vec::new()
}

/// Adds types to the inventory.
///
/// # Examples
///
/// ```
/// # #[derive(Default)] struct Ping;
/// # impl vc_shape::Typed for Ping {
/// #     fn type_shape() -> &'static vc_shape::Shape {
/// #         static CELL: vc_shape::ShapeCell = vc_shape::ShapeCell::new();
/// #         CELL.get_or_init(|| vc_shape::Shape::record::<Self>(
/// #             vc_shape::RecordInfo::new([]).with_default::<Self>()))
/// #     }
/// # }
/// vc_shape::register_type!(Ping);
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! register_type {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::__macro_exports::inventory::submit! {
                $crate::KnownType::of::<$ty>()
            }
        )+
    };
}

/// Adds types to the inventory.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! register_type {
    ($($ty:ty),+ $(,)?) => {};
}
