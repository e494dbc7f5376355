use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;

use crate::{Mapped, Shape, Typed};

// -----------------------------------------------------------------------------
// MarkupDecl

/// How a field asks to be written.
///
/// An empty name is a template: it only makes sense when overriding a
/// same-named field of a base record, and takes the base's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkupDecl {
    /// No explicit declaration, the field becomes an element.
    #[default]
    Unspecified,
    /// An attribute of the owning element.
    Attribute(&'static str),
    /// A child element. On a list field, the items are written inline,
    /// one element per item, without a wrapping container.
    Element(&'static str),
    /// The text content of the owning element.
    Text,
}

impl MarkupDecl {
    /// The declared name, if the declaration carries one.
    #[inline]
    pub const fn name(&self) -> Option<&'static str> {
        match self {
            Self::Attribute(name) | Self::Element(name) => Some(*name),
            Self::Unspecified | Self::Text => None,
        }
    }

    #[inline]
    pub const fn is_attribute(&self) -> bool {
        matches!(self, Self::Attribute(_))
    }

    #[inline]
    pub const fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }
}

// -----------------------------------------------------------------------------
// Accessors

pub(crate) type GetFn =
    Arc<dyn for<'a> Fn(&'a dyn Mapped) -> Option<&'a dyn Mapped> + Send + Sync>;
pub(crate) type GetMutFn =
    Arc<dyn for<'a> Fn(&'a mut dyn Mapped) -> Option<&'a mut dyn Mapped> + Send + Sync>;
pub(crate) type SetFn =
    Arc<dyn Fn(&mut dyn Mapped, Box<dyn Mapped>) -> Result<(), Box<dyn Mapped>> + Send + Sync>;

// Pin the higher-ranked signatures on closures.

pub(crate) fn getter<G>(f: G) -> GetFn
where
    G: for<'a> Fn(&'a dyn Mapped) -> Option<&'a dyn Mapped> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub(crate) fn getter_mut<G>(f: G) -> GetMutFn
where
    G: for<'a> Fn(&'a mut dyn Mapped) -> Option<&'a mut dyn Mapped> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn setter<S>(f: S) -> SetFn
where
    S: Fn(&mut dyn Mapped, Box<dyn Mapped>) -> Result<(), Box<dyn Mapped>> + Send + Sync + 'static,
{
    Arc::new(f)
}

// -----------------------------------------------------------------------------
// FieldInfo

/// One mapped field of a record: accessors plus markup declaration.
///
/// # Examples
///
/// ```
/// use vc_shape::{FieldInfo, MarkupDecl, Mapped};
///
/// #[derive(Default)]
/// struct User {
///     id: u32,
///     tags: Vec<String>,
/// }
/// # impl vc_shape::Typed for User {
/// #     fn type_shape() -> &'static vc_shape::Shape {
/// #         static CELL: vc_shape::ShapeCell = vc_shape::ShapeCell::new();
/// #         CELL.get_or_init(|| vc_shape::Shape::record::<Self>(vc_shape::RecordInfo::new([])))
/// #     }
/// # }
///
/// let id = FieldInfo::new("Id", |u: &User| &u.id)
///     .with_setter(|u: &mut User, v| u.id = v)
///     .attribute("id");
/// let tags = FieldInfo::new("Tags", |u: &User| &u.tags)
///     .with_collection(|u: &mut User| &mut u.tags);
///
/// let mut user = User::default();
/// id.set(&mut user, Box::new(7_u32)).ok().unwrap();
///
/// assert_eq!(user.id, 7);
/// assert_eq!(id.decl(), MarkupDecl::Attribute("id"));
/// assert!(!tags.has_setter());
/// assert!(tags.has_collection());
/// ```
#[derive(Clone)]
pub struct FieldInfo {
    name: &'static str,
    shape: fn() -> &'static Shape,
    decl: MarkupDecl,
    rename: Option<&'static str>,
    item_name: Option<&'static str>,
    encrypted: bool,
    redacted: bool,
    ignored: bool,
    get: GetFn,
    set: Option<SetFn>,
    collection: Option<GetMutFn>,
}

impl FieldInfo {
    /// Creates a read-only field of `T` holding an `F`.
    pub fn new<T: Typed, F: Typed>(name: &'static str, get: fn(&T) -> &F) -> Self {
        Self {
            name,
            shape: F::type_shape,
            decl: MarkupDecl::Unspecified,
            rename: None,
            item_name: None,
            encrypted: false,
            redacted: false,
            ignored: false,
            get: getter(move |owner| owner.downcast_ref::<T>().map(|o| get(o) as &dyn Mapped)),
            set: None,
            collection: None,
        }
    }

    /// Adds a mutator.
    pub fn with_setter<T: Typed, F: Typed>(
        mut self,
        set: impl Fn(&mut T, F) + Send + Sync + 'static,
    ) -> Self {
        self.set = Some(setter(move |owner, value| {
            let Some(owner) = owner.downcast_mut::<T>() else {
                return Err(value);
            };
            set(owner, value.take::<F>()?);
            Ok(())
        }));
        self
    }

    /// Exposes the collection in place, so repeated values append to it.
    pub fn with_collection<T: Typed, F: Typed>(mut self, get_mut: fn(&mut T) -> &mut F) -> Self {
        self.collection = Some(getter_mut(move |owner| {
            owner
                .downcast_mut::<T>()
                .map(|o| get_mut(o) as &mut dyn Mapped)
        }));
        self
    }

    /// Declares the field as an attribute.
    #[inline]
    pub fn attribute(mut self, name: &'static str) -> Self {
        self.decl = MarkupDecl::Attribute(name);
        self
    }

    /// Declares the field as an element.
    #[inline]
    pub fn element(mut self, name: &'static str) -> Self {
        self.decl = MarkupDecl::Element(name);
        self
    }

    /// Declares the field as the text content of its owner.
    #[inline]
    pub fn text(mut self) -> Self {
        self.decl = MarkupDecl::Text;
        self
    }

    /// Replaces the markup declaration.
    #[inline]
    pub fn with_decl(mut self, decl: MarkupDecl) -> Self {
        self.decl = decl;
        self
    }

    /// Sets the markup name without changing the classification.
    #[inline]
    pub fn renamed(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    /// Sets the element name of list items.
    #[inline]
    pub fn item_name(mut self, name: &'static str) -> Self {
        self.item_name = Some(name);
        self
    }

    #[inline]
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    #[inline]
    pub fn redacted(mut self) -> Self {
        self.redacted = true;
        self
    }

    /// Excludes the field from mapping.
    #[inline]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Reaches the field through a projection, e.g. into an embedded base.
    pub(crate) fn through(mut self, project: GetFn, project_mut: GetMutFn) -> Self {
        let get = self.get;
        self.get = getter(move |owner| project(owner).and_then(|base| get(base)));
        if let Some(set) = self.set.take() {
            let project_mut = project_mut.clone();
            self.set = Some(setter(move |owner, value| match project_mut(owner) {
                Some(base) => set(base, value),
                None => Err(value),
            }));
        }
        if let Some(collection) = self.collection.take() {
            self.collection = Some(getter_mut(move |owner| {
                project_mut(owner).and_then(|base| collection(base))
            }));
        }
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The shape of the field's declared type.
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }

    #[inline]
    pub fn decl(&self) -> MarkupDecl {
        self.decl
    }

    #[inline]
    pub fn rename(&self) -> Option<&'static str> {
        self.rename
    }

    #[inline]
    pub fn item(&self) -> Option<&'static str> {
        self.item_name
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    #[inline]
    pub fn is_redacted(&self) -> bool {
        self.redacted
    }

    #[inline]
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    #[inline]
    pub fn has_setter(&self) -> bool {
        self.set.is_some()
    }

    #[inline]
    pub fn has_collection(&self) -> bool {
        self.collection.is_some()
    }

    /// Reads the field from `owner`.
    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Mapped) -> Option<&'a dyn Mapped> {
        (self.get)(owner)
    }

    /// Writes the field of `owner`.
    ///
    /// Gives the value back when the field has no mutator or the types do not line up.
    pub fn set(&self, owner: &mut dyn Mapped, value: Box<dyn Mapped>) -> Result<(), Box<dyn Mapped>> {
        match &self.set {
            Some(set) => set(owner, value),
            None => Err(value),
        }
    }

    /// Borrows the collection stored in the field of `owner`.
    #[inline]
    pub fn collection_mut<'a>(&self, owner: &'a mut dyn Mapped) -> Option<&'a mut dyn Mapped> {
        self.collection.as_ref().and_then(|get_mut| get_mut(owner))
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("decl", &self.decl)
            .field("encrypted", &self.encrypted)
            .finish_non_exhaustive()
    }
}
