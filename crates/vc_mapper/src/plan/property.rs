use vc_shape::{FieldInfo, MarkupDecl, Shape};

use super::LazyPlan;
use crate::ConfigError;

/// Where a property goes in the owner's markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupKind {
    Attribute,
    Element,
    Text,
}

/// The mapping of one field of a record.
pub struct PropertyPlan {
    markup_name: &'static str,
    kind: MarkupKind,
    inline_list: bool,
    encrypted: bool,
    field: FieldInfo,
    child: LazyPlan,
}

impl PropertyPlan {
    /// Classifies a field whose declaration has already been checked
    /// against its base.
    pub(crate) fn new(owner: &'static Shape, field: FieldInfo) -> Result<Self, ConfigError> {
        let shape = field.shape();
        let decl = field.decl();
        let (kind, declared) = match decl {
            MarkupDecl::Attribute(name) => (MarkupKind::Attribute, name),
            MarkupDecl::Element(name) => (MarkupKind::Element, name),
            MarkupDecl::Text => (MarkupKind::Text, ""),
            MarkupDecl::Unspecified => (MarkupKind::Element, ""),
        };

        if kind != MarkupKind::Element && !shape.peel_optional().is_primitive_like() {
            return Err(ConfigError::NotScalar {
                ty: owner.type_path(),
                field: field.name(),
                decl,
            });
        }

        let markup_name = if declared.is_empty() {
            field.rename().unwrap_or(field.name())
        } else {
            declared
        };
        let encrypted = field.is_encrypted() || shape.is_encrypted();

        Ok(Self {
            markup_name,
            kind,
            inline_list: decl.is_element() && shape.as_list().is_some(),
            encrypted,
            child: LazyPlan::new(shape, encrypted),
            field,
        })
    }

    /// The field name, as matched against constructor parameters.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.field.name()
    }

    /// The attribute or element name.
    #[inline]
    pub fn markup_name(&self) -> &'static str {
        self.markup_name
    }

    #[inline]
    pub fn kind(&self) -> MarkupKind {
        self.kind
    }

    /// Returns `true` for a list written as repeated sibling elements.
    #[inline]
    pub fn is_inline_list(&self) -> bool {
        self.inline_list
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        self.field.shape().as_list().is_some()
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    #[inline]
    pub fn is_redacted(&self) -> bool {
        self.field.is_redacted()
    }

    /// Element name of the items of a wrapped list.
    #[inline]
    pub fn item_name(&self) -> Option<&'static str> {
        self.field.item()
    }

    #[inline]
    pub fn field(&self) -> &FieldInfo {
        &self.field
    }

    /// The plan of the field's declared type, built on first use.
    #[inline]
    pub(crate) fn child(&self) -> &LazyPlan {
        &self.child
    }
}
