use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::field::{GetFn, GetMutFn, getter, getter_mut};
use crate::{Constructor, FieldInfo, Mapped, Shape, Typed};

// -----------------------------------------------------------------------------
// BaseInfo

/// An embedded base record whose fields are inherited.
///
/// Rust has no struct inheritance, so a derived record embeds its base and
/// exposes it through a pair of projections.
#[derive(Clone)]
pub struct BaseInfo {
    shape: fn() -> &'static Shape,
    project: GetFn,
    project_mut: GetMutFn,
}

impl BaseInfo {
    /// The shape of the base record.
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }

    /// Rewrites a field of the base so it can be reached from the derived record.
    #[inline]
    pub fn project_field(&self, field: &FieldInfo) -> FieldInfo {
        field.clone().through(self.project.clone(), self.project_mut.clone())
    }
}

// -----------------------------------------------------------------------------
// RecordInfo

/// The fields and construction paths of a record.
#[derive(Default)]
pub struct RecordInfo {
    fields: Vec<FieldInfo>,
    base: Option<BaseInfo>,
    default: Option<fn() -> Box<dyn Mapped>>,
    constructors: Vec<Constructor>,
}

fn boxed_default<T: Typed + Default>() -> Box<dyn Mapped> {
    Box::new(T::default())
}

impl RecordInfo {
    /// Creates a record with the given fields, in declaration order.
    pub fn new(fields: impl IntoIterator<Item = FieldInfo>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Declares a parameterless constructor, `T::default()`.
    ///
    /// Records with one are filled through field mutators. Records
    /// without one are built by a [`Constructor`].
    #[inline]
    pub fn with_default<T: Typed + Default>(mut self) -> Self {
        self.default = Some(boxed_default::<T>);
        self
    }

    /// Declares a candidate constructor. Declaration order breaks ties.
    #[inline]
    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Declares `B`, embedded in `T`, as the base record.
    pub fn with_base<T: Typed, B: Typed>(
        mut self,
        get: fn(&T) -> &B,
        get_mut: fn(&mut T) -> &mut B,
    ) -> Self {
        self.base = Some(BaseInfo {
            shape: B::type_shape,
            project: getter(move |owner| owner.downcast_ref::<T>().map(|o| get(o) as &dyn Mapped)),
            project_mut: getter_mut(move |owner| {
                owner.downcast_mut::<T>().map(|o| get_mut(o) as &mut dyn Mapped)
            }),
        });
        self
    }

    /// Fields declared on this record, excluding the base.
    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    #[inline]
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name() == name)
    }

    #[inline]
    pub fn base(&self) -> Option<&BaseInfo> {
        self.base.as_ref()
    }

    #[inline]
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    #[inline]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Creates a value with the parameterless constructor.
    #[inline]
    pub fn create_default(&self) -> Option<Box<dyn Mapped>> {
        self.default.map(|create| create())
    }
}
