use alloc::vec::Vec;

use crate::{MarkupDecl, Mapped};

/// Accessors of an interface box such as `Box<dyn Animal>`.
///
/// The concrete type behind the box is only known at runtime. Concrete
/// types opt in with [`Shape::with_cast`](crate::Shape::with_cast).
pub struct InterfaceInfo {
    get: fn(&dyn Mapped) -> Option<&dyn Mapped>,
    properties: Vec<(&'static str, MarkupDecl)>,
}

impl InterfaceInfo {
    /// Creates the accessors from a function borrowing the boxed value.
    ///
    /// Usually generated by [`impl_interface!`](crate::impl_interface).
    #[inline]
    pub fn new(get: fn(&dyn Mapped) -> Option<&dyn Mapped>) -> Self {
        Self {
            get,
            properties: Vec::new(),
        }
    }

    /// Declares the markup of a property every implementation exposes.
    #[inline]
    pub fn with_property(mut self, name: &'static str, decl: MarkupDecl) -> Self {
        self.properties.push((name, decl));
        self
    }

    /// Borrows the concrete value inside the box.
    #[inline]
    pub fn inner<'a>(&self, value: &'a dyn Mapped) -> Option<&'a dyn Mapped> {
        (self.get)(value)
    }

    /// The markup declared for the property `name`.
    #[inline]
    pub fn property(&self, name: &str) -> Option<MarkupDecl> {
        self.properties
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, decl)| *decl)
    }

    #[inline]
    pub fn properties(&self) -> &[(&'static str, MarkupDecl)] {
        &self.properties
    }
}

/// Implements [`Typed`](crate::Typed) for `Box<dyn Trait>`.
///
/// The trait must have [`Mapped`](crate::Mapped) as a supertrait. Property
/// declarations shared by all implementations may follow in brackets.
///
/// # Examples
///
/// ```
/// use vc_shape::{impl_interface, MarkupDecl, Mapped, ShapeKind, Typed};
///
/// trait Vehicle: Mapped {}
/// impl_interface!(Vehicle, [("Wheels", MarkupDecl::Attribute("wheels"))]);
///
/// let shape = <Box<dyn Vehicle>>::type_shape();
/// let ShapeKind::Interface(info) = shape.kind() else { panic!() };
/// assert_eq!(info.property("Wheels"), Some(MarkupDecl::Attribute("wheels")));
/// ```
#[macro_export]
macro_rules! impl_interface {
    ($tr:path) => {
        $crate::impl_interface!($tr, []);
    };
    ($tr:path, [$(($prop:expr, $decl:expr)),* $(,)?]) => {
        impl $crate::Typed for $crate::__macro_exports::Box<dyn $tr> {
            fn type_shape() -> &'static $crate::Shape {
                static CELL: $crate::ShapeCell = $crate::ShapeCell::new();
                CELL.get_or_init(|| {
                    $crate::Shape::interface::<Self>(
                        $crate::InterfaceInfo::new(|value| {
                            let boxed = value.downcast_ref::<$crate::__macro_exports::Box<dyn $tr>>()?;
                            let inner: &dyn $tr = &**boxed;
                            Some(inner as &dyn $crate::Mapped)
                        })
                        $(.with_property($prop, $decl))*
                    )
                })
            }
        }
    };
}
