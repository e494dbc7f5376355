use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use vc_shape::{Shape, Typed, known_types};

use crate::{ClearTextMechanism, EncryptionMechanism};

// -----------------------------------------------------------------------------
// MapperOptions

/// Everything a [`Mapper`](crate::Mapper) can be configured with.
///
/// # Examples
///
/// ```
/// use vc_mapper::MapperOptions;
///
/// let options = MapperOptions::new()
///     .with_default_namespace("urn:shop")
///     .with_extra_type::<u32>()
///     .with_always_emit_nil(true)
///     .with_indent(true);
///
/// assert!(options.indent());
/// assert_eq!(options.plan_options().extra_types().count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MapperOptions {
    default_namespace: Option<String>,
    extra_types: Vec<&'static Shape>,
    root_element_name: Option<String>,
    redact: bool,
    encrypt_root: bool,
    always_emit_nil: bool,
    treat_empty_element_as_string: bool,
    use_interface_declared_attribute: bool,
    indent: bool,
    mechanism: Option<Arc<dyn EncryptionMechanism>>,
    encrypt_key: Option<String>,
}

impl MapperOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a default namespace on the root element.
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = Some(namespace.into());
        self
    }

    /// Allows `T` as the concrete type behind a type tag.
    pub fn with_extra_type<T: Typed>(self) -> Self {
        self.with_extra_shape(T::type_shape())
    }

    pub fn with_extra_shape(mut self, shape: &'static Shape) -> Self {
        self.extra_types.push(shape);
        self
    }

    /// Allows every type submitted with `register_type!`.
    pub fn with_registered_types(mut self) -> Self {
        self.extra_types.extend(known_types());
        self
    }

    /// Overrides the name of the root element.
    pub fn with_root_element_name(mut self, name: impl Into<String>) -> Self {
        self.root_element_name = Some(name.into());
        self
    }

    /// Masks the scalars of fields marked as redacted.
    #[inline]
    pub fn with_redact(mut self, redact: bool) -> Self {
        self.redact = redact;
        self
    }

    /// Encrypts the whole content of the root value.
    #[inline]
    pub fn with_encrypt_root(mut self, encrypt: bool) -> Self {
        self.encrypt_root = encrypt;
        self
    }

    /// Writes absent values as explicit nil elements instead of omitting them.
    #[inline]
    pub fn with_always_emit_nil(mut self, emit: bool) -> Self {
        self.always_emit_nil = emit;
        self
    }

    /// Reads empty untyped elements as empty strings rather than empty objects.
    #[inline]
    pub fn with_treat_empty_element_as_string(mut self, treat: bool) -> Self {
        self.treat_empty_element_as_string = treat;
        self
    }

    /// Lets fields without a markup declaration use the one of the
    /// interfaces their record implements.
    #[inline]
    pub fn with_interface_declared_attribute(mut self, enable: bool) -> Self {
        self.use_interface_declared_attribute = enable;
        self
    }

    /// Indents written documents.
    #[inline]
    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_mechanism(mut self, mechanism: impl EncryptionMechanism + 'static) -> Self {
        self.mechanism = Some(Arc::new(mechanism));
        self
    }

    pub fn with_shared_mechanism(mut self, mechanism: Arc<dyn EncryptionMechanism>) -> Self {
        self.mechanism = Some(mechanism);
        self
    }

    /// Key hint passed to every mechanism call.
    pub fn with_encrypt_key(mut self, key: impl Into<String>) -> Self {
        self.encrypt_key = Some(key.into());
        self
    }

    #[inline]
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    #[inline]
    pub fn indent(&self) -> bool {
        self.indent
    }

    #[inline]
    pub fn encrypt_root(&self) -> bool {
        self.encrypt_root
    }

    #[inline]
    pub fn encrypt_key(&self) -> Option<&str> {
        self.encrypt_key.as_deref()
    }

    /// The configured mechanism, [`ClearTextMechanism`] if none.
    pub fn mechanism(&self) -> Arc<dyn EncryptionMechanism> {
        match &self.mechanism {
            Some(mechanism) => mechanism.clone(),
            None => Arc::new(ClearTextMechanism),
        }
    }

    /// The part of the options plans depend on.
    pub fn plan_options(&self) -> PlanOptions {
        let mut extra_types: Vec<ShapeRef> = self.extra_types.iter().copied().map(ShapeRef).collect();
        extra_types.sort_by_key(|shape| shape.0.id());
        extra_types.dedup();

        PlanOptions {
            default_namespace: self.default_namespace.clone(),
            extra_types,
            root_element_name: self.root_element_name.clone(),
            redact: self.redact,
            encrypt_root: self.encrypt_root,
            always_emit_nil: self.always_emit_nil,
            treat_empty_element_as_string: self.treat_empty_element_as_string,
            use_interface_declared_attribute: self.use_interface_declared_attribute,
        }
    }
}

impl fmt::Debug for MapperOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperOptions")
            .field("plan", &self.plan_options())
            .field("indent", &self.indent)
            .field("encrypt_key", &self.encrypt_key.is_some())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// PlanOptions

/// Shape compared by identity.
#[derive(Clone, Copy)]
struct ShapeRef(&'static Shape);

impl PartialEq for ShapeRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.id() == other.0.id()
    }
}

impl Eq for ShapeRef {}

impl Hash for ShapeRef {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id().hash(state);
    }
}

impl fmt::Debug for ShapeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.type_path())
    }
}

/// The options a plan is built for, part of the plan cache key.
///
/// Two option sets that lead to the same plans compare equal: extra types are
/// an unordered set, and mechanism, key and indentation are left out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanOptions {
    default_namespace: Option<String>,
    extra_types: Vec<ShapeRef>,
    root_element_name: Option<String>,
    redact: bool,
    encrypt_root: bool,
    always_emit_nil: bool,
    treat_empty_element_as_string: bool,
    use_interface_declared_attribute: bool,
}

impl Default for PlanOptions {
    #[inline]
    fn default() -> Self {
        MapperOptions::default().plan_options()
    }
}

impl PlanOptions {
    #[inline]
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Allowed concrete types, ordered by type id.
    pub fn extra_types(&self) -> impl Iterator<Item = &'static Shape> + '_ {
        self.extra_types.iter().map(|shape| shape.0)
    }

    #[inline]
    pub fn root_element_name(&self) -> Option<&str> {
        self.root_element_name.as_deref()
    }

    #[inline]
    pub fn redact(&self) -> bool {
        self.redact
    }

    #[inline]
    pub fn encrypt_root(&self) -> bool {
        self.encrypt_root
    }

    #[inline]
    pub fn always_emit_nil(&self) -> bool {
        self.always_emit_nil
    }

    #[inline]
    pub fn treat_empty_element_as_string(&self) -> bool {
        self.treat_empty_element_as_string
    }

    #[inline]
    pub fn use_interface_declared_attribute(&self) -> bool {
        self.use_interface_declared_attribute
    }
}
