use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{TypeId, type_name};
use core::fmt;

use crate::{InterfaceInfo, ListInfo, Mapped, OptionalInfo, RecordInfo, ScalarInfo, Typed};

// -----------------------------------------------------------------------------
// ShapeKind

/// The structural category of a [`Shape`].
pub enum ShapeKind {
    /// A value written as a single piece of text.
    Scalar(ScalarInfo),
    /// A value with named fields.
    Record(RecordInfo),
    /// An ordered, growable collection.
    List(ListInfo),
    /// A value that may be absent.
    Optional(OptionalInfo),
    /// A boxed trait object, resolved to a concrete shape at runtime.
    Interface(InterfaceInfo),
    /// An untyped tree, see [`DynamicValue`](crate::DynamicValue).
    Dynamic,
}

impl ShapeKind {
    /// Returns a short name of the category, for diagnostics.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Record(_) => "record",
            Self::List(_) => "list",
            Self::Optional(_) => "optional",
            Self::Interface(_) => "interface",
            Self::Dynamic => "dynamic",
        }
    }
}

// -----------------------------------------------------------------------------
// Cast

type CastFn = dyn Fn(Box<dyn Mapped>) -> Result<Box<dyn Mapped>, Box<dyn Mapped>> + Send + Sync;

/// A conversion from a concrete type into an interface it implements.
///
/// Registered with [`Shape::with_cast`].
#[derive(Clone)]
pub struct Cast {
    interface: TypeId,
    interface_shape: fn() -> &'static Shape,
    wrap: Arc<CastFn>,
}

impl Cast {
    /// The [`TypeId`] of the interface box, e.g. `Box<dyn Animal>`.
    #[inline]
    pub fn interface(&self) -> TypeId {
        self.interface
    }

    /// The shape of the interface box.
    #[inline]
    pub fn interface_shape(&self) -> &'static Shape {
        (self.interface_shape)()
    }

    /// Wraps a concrete value into the interface box.
    #[inline]
    pub fn wrap(&self, value: Box<dyn Mapped>) -> Result<Box<dyn Mapped>, Box<dyn Mapped>> {
        (self.wrap)(value)
    }
}

// -----------------------------------------------------------------------------
// Shape

/// Compile-once description of how a type is taken apart and put together.
///
/// This is the only runtime type information the mapper consults. A shape is
/// created by one of the kind constructors ([`Shape::record`],
/// [`Shape::scalar`], ...) and refined with the `with_*` builders.
pub struct Shape {
    id: TypeId,
    path: &'static str,
    name: &'static str,
    element_name: Option<&'static str>,
    encrypted: bool,
    empty: Option<fn() -> Box<dyn Mapped>>,
    casts: Vec<Cast>,
    kind: ShapeKind,
}

fn short_name(path: &'static str) -> &'static str {
    let base = path.split('<').next().unwrap_or(path);
    base.rsplit("::").next().unwrap_or(base)
}

/// `alloc::boxed::Box<dyn my::Animal>` is called `Animal`.
fn interface_name(path: &'static str) -> &'static str {
    let Some((_, object)) = path.split_once("dyn ") else {
        return short_name(path);
    };
    let object = object.split([' ', '>', '<']).next().unwrap_or(object);
    object.rsplit("::").next().unwrap_or(object)
}

fn boxed_default<T: Typed + Default>() -> Box<dyn Mapped> {
    Box::new(T::default())
}

impl Shape {
    fn new<T: Typed>(kind: ShapeKind) -> Self {
        let path = type_name::<T>();
        Self {
            id: TypeId::of::<T>(),
            path,
            name: short_name(path),
            element_name: None,
            encrypted: false,
            empty: None,
            casts: Vec::new(),
            kind,
        }
    }

    /// Creates the shape of a scalar type.
    #[inline]
    pub fn scalar<T: Typed>(info: ScalarInfo) -> Self {
        Self::new::<T>(ShapeKind::Scalar(info))
    }

    /// Creates the shape of a record type.
    #[inline]
    pub fn record<T: Typed>(info: RecordInfo) -> Self {
        Self::new::<T>(ShapeKind::Record(info))
    }

    /// Creates the shape of a list type.
    #[inline]
    pub fn list<T: Typed>(info: ListInfo) -> Self {
        Self::new::<T>(ShapeKind::List(info))
    }

    /// Creates the shape of an optional type.
    #[inline]
    pub fn optional<T: Typed>(info: OptionalInfo) -> Self {
        Self::new::<T>(ShapeKind::Optional(info))
    }

    /// Creates the shape of an interface box, see [`impl_interface!`](crate::impl_interface).
    #[inline]
    pub fn interface<T: Typed>(info: InterfaceInfo) -> Self {
        let mut shape = Self::new::<T>(ShapeKind::Interface(info));
        shape.name = interface_name(shape.path);
        shape
    }

    /// Creates the shape of an untyped tree.
    #[inline]
    pub fn dynamic<T: Typed>() -> Self {
        Self::new::<T>(ShapeKind::Dynamic)
    }

    /// Overrides the short name used in type tags and as the default element name.
    #[inline]
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Overrides the element name used when the type is a document root.
    #[inline]
    pub fn with_element_name(mut self, name: &'static str) -> Self {
        self.element_name = Some(name);
        self
    }

    /// Marks every value of this type for encryption.
    #[inline]
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    /// Sets the value used when a constructor or document leaves this type unspecified.
    #[inline]
    pub fn with_empty(mut self, empty: fn() -> Box<dyn Mapped>) -> Self {
        self.empty = Some(empty);
        self
    }

    /// Uses `T::default()` as the empty value.
    #[inline]
    pub fn with_default_value<T: Typed + Default>(self) -> Self {
        self.with_empty(boxed_default::<T>)
    }

    /// Registers a conversion into the interface box `I`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_shape::{impl_interface, Mapped, RecordInfo, Shape, ShapeCell, Typed};
    ///
    /// trait Named: Mapped {}
    /// impl_interface!(Named);
    ///
    /// #[derive(Default)]
    /// struct Tag;
    /// impl Named for Tag {}
    ///
    /// impl Typed for Tag {
    ///     fn type_shape() -> &'static Shape {
    ///         static CELL: ShapeCell = ShapeCell::new();
    ///         CELL.get_or_init(|| {
    ///             Shape::record::<Self>(RecordInfo::new([]).with_default::<Self>())
    ///                 .with_cast(|t: Tag| Box::new(t) as Box<dyn Named>)
    ///         })
    ///     }
    /// }
    ///
    /// let target = <Box<dyn Named>>::type_shape();
    /// assert!(Tag::type_shape().can_cast_to(target));
    /// ```
    pub fn with_cast<T: Typed, I: Typed>(mut self, cast: fn(T) -> I) -> Self {
        let wrap = move |value: Box<dyn Mapped>| -> Result<Box<dyn Mapped>, Box<dyn Mapped>> {
            let value = value.take::<T>()?;
            Ok(Box::new(cast(value)))
        };
        self.casts.push(Cast {
            interface: TypeId::of::<I>(),
            interface_shape: I::type_shape,
            wrap: Arc::new(wrap),
        });
        self
    }

    /// The [`TypeId`] of the described type.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The full type path, e.g. `my_app::model::Dog`.
    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.path
    }

    /// The short type name, e.g. `Dog`.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The element name used when the type is a document root.
    #[inline]
    pub fn element_name(&self) -> &'static str {
        self.element_name.unwrap_or(self.name)
    }

    /// Returns `true` if the type itself is marked for encryption.
    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    #[inline]
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Returns `true` for scalars, which never carry a type tag.
    #[inline]
    pub fn is_primitive_like(&self) -> bool {
        matches!(self.kind, ShapeKind::Scalar(_))
    }

    /// Creates the empty value, if the shape has one.
    #[inline]
    pub fn empty_value(&self) -> Option<Box<dyn Mapped>> {
        self.empty.map(|empty| empty())
    }

    #[inline]
    pub fn casts(&self) -> &[Cast] {
        &self.casts
    }

    /// Returns `true` if values of this shape can be stored in `target`.
    ///
    /// Holds for the shape itself and, when `target` is an interface, for
    /// every shape registering a cast into it.
    pub fn can_cast_to(&self, target: &Shape) -> bool {
        self.id == target.id || self.casts.iter().any(|cast| cast.interface == target.id)
    }

    /// Converts a value of this shape into a value of `target`.
    ///
    /// Returns the value unchanged when no conversion applies.
    pub fn cast_into(
        &self,
        target: &Shape,
        value: Box<dyn Mapped>,
    ) -> Result<Box<dyn Mapped>, Box<dyn Mapped>> {
        if self.id == target.id {
            return Ok(value);
        }
        match self.casts.iter().find(|cast| cast.interface == target.id) {
            Some(cast) => cast.wrap(value),
            None => Err(value),
        }
    }

    #[inline]
    pub fn as_scalar(&self) -> Option<&ScalarInfo> {
        match &self.kind {
            ShapeKind::Scalar(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn as_record(&self) -> Option<&RecordInfo> {
        match &self.kind {
            ShapeKind::Record(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&ListInfo> {
        match &self.kind {
            ShapeKind::List(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn as_optional(&self) -> Option<&OptionalInfo> {
        match &self.kind {
            ShapeKind::Optional(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn as_interface(&self) -> Option<&InterfaceInfo> {
        match &self.kind {
            ShapeKind::Interface(info) => Some(info),
            _ => None,
        }
    }

    /// Strips every [`ShapeKind::Optional`] layer.
    pub fn peel_optional(&'static self) -> &'static Shape {
        let mut shape = self;
        while let ShapeKind::Optional(info) = &shape.kind {
            shape = info.inner();
        }
        shape
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("kind", &self.kind.label())
            .field("encrypted", &self.encrypted)
            .finish_non_exhaustive()
    }
}
