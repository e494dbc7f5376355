//! Per-type mapping plans.
//!
//! A [`TypePlan`] is the immutable, shareable description of how one type is
//! written and read under one set of [`PlanOptions`]. Plans are built by the
//! [`TypePlanRegistry`](crate::TypePlanRegistry) and refer to the plans of
//! their children lazily, so recursive types are fine.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::sync::OnceLock;

use vc_shape::{FieldInfo, MarkupDecl, RecordInfo, Shape, ShapeKind};

use crate::{ConfigError, PlanOptions, TypePlanRegistry};

mod construct;
mod hierarchy;
mod property;

pub use construct::ConstructionPlan;
pub use property::{MarkupKind, PropertyPlan};

pub(crate) use construct::Pending;

// -----------------------------------------------------------------------------
// LazyPlan

/// A child plan, fetched from the registry on first use.
pub(crate) struct LazyPlan {
    shape: &'static Shape,
    encrypted: bool,
    plan: OnceLock<Arc<TypePlan>>,
}

impl LazyPlan {
    pub fn new(shape: &'static Shape, encrypted: bool) -> Self {
        Self {
            shape,
            encrypted,
            plan: OnceLock::new(),
        }
    }

    #[inline]
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    pub fn get(
        &self,
        registry: &TypePlanRegistry,
        options: &Arc<PlanOptions>,
    ) -> Result<Arc<TypePlan>, ConfigError> {
        if let Some(plan) = self.plan.get() {
            return Ok(plan.clone());
        }
        let plan = registry.get_plan(self.shape, self.encrypted, options)?;
        Ok(self.plan.get_or_init(|| plan).clone())
    }
}

// -----------------------------------------------------------------------------
// TypePlan

/// How one type maps to markup.
pub struct TypePlan {
    shape: &'static Shape,
    element_name: String,
    encrypted: bool,
    kind: PlanKind,
}

/// The kind-specific part of a [`TypePlan`].
pub(crate) enum PlanKind {
    Scalar,
    Optional(LazyPlan),
    List(LazyPlan),
    Interface,
    Dynamic,
    Record(RecordPlan),
}

impl TypePlan {
    pub(crate) fn build(
        shape: &'static Shape,
        encrypted: bool,
        options: &PlanOptions,
    ) -> Result<Self, ConfigError> {
        let encrypted = encrypted || shape.is_encrypted();
        let kind = match shape.kind() {
            ShapeKind::Scalar(_) => PlanKind::Scalar,
            ShapeKind::Optional(info) => PlanKind::Optional(LazyPlan::new(info.inner(), encrypted)),
            ShapeKind::List(info) => PlanKind::List(LazyPlan::new(info.item(), false)),
            ShapeKind::Interface(_) => PlanKind::Interface,
            ShapeKind::Dynamic => PlanKind::Dynamic,
            ShapeKind::Record(info) => PlanKind::Record(RecordPlan::build(shape, info, options)?),
        };
        let element_name = match options.root_element_name() {
            Some(name) => String::from(name),
            None => String::from(shape.element_name()),
        };

        Ok(Self {
            shape,
            element_name,
            encrypted,
            kind,
        })
    }

    #[inline]
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// Name of the element holding the value when it is the document root.
    #[inline]
    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    /// Returns `true` if the whole value is written through the encryption scope.
    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    #[inline]
    pub(crate) fn kind(&self) -> &PlanKind {
        &self.kind
    }

    #[inline]
    pub fn as_record(&self) -> Option<&RecordPlan> {
        match &self.kind {
            PlanKind::Record(record) => Some(record),
            _ => None,
        }
    }

    pub(crate) fn children(&self) -> Vec<&LazyPlan> {
        match &self.kind {
            PlanKind::Optional(inner) | PlanKind::List(inner) => alloc::vec![inner],
            PlanKind::Record(record) => record.properties.iter().map(PropertyPlan::child).collect(),
            PlanKind::Scalar | PlanKind::Interface | PlanKind::Dynamic => Vec::new(),
        }
    }
}

// -----------------------------------------------------------------------------
// RecordPlan

/// Properties and construction of a record.
pub struct RecordPlan {
    info: &'static RecordInfo,
    properties: Vec<PropertyPlan>,
    text: Option<usize>,
    encrypted_list: Option<usize>,
    construction: Option<ConstructionPlan>,
}

/// Fields of `shape` including inherited ones, base fields first.
fn collect_fields(shape: &'static Shape, info: &'static RecordInfo) -> Result<Vec<FieldInfo>, ConfigError> {
    let mut fields = Vec::new();
    if let Some(base) = info.base() {
        let base_shape = base.shape();
        let base_info = base_shape.as_record().ok_or(ConfigError::BaseNotRecord {
            ty: shape.type_path(),
        })?;
        for field in collect_fields(base_shape, base_info)? {
            fields.push(base.project_field(&field));
        }
    }

    for own in info.fields() {
        match fields.iter().position(|field: &FieldInfo| field.name() == own.name()) {
            Some(index) => fields[index] = hierarchy::resolve_override(shape, &fields[index], own)?,
            None => {
                hierarchy::check_new(shape, own)?;
                fields.push(own.clone());
            }
        }
    }
    Ok(fields)
}

/// The declaration an implemented interface gives to `field`, if any.
fn interface_decl(shape: &Shape, field: &FieldInfo) -> Option<MarkupDecl> {
    shape
        .casts()
        .iter()
        .filter_map(|cast| cast.interface_shape().as_interface())
        .find_map(|info| info.property(field.name()))
}

impl RecordPlan {
    fn build(
        shape: &'static Shape,
        info: &'static RecordInfo,
        options: &PlanOptions,
    ) -> Result<Self, ConfigError> {
        let ty = shape.type_path();

        let mut attributes = Vec::new();
        let mut content = Vec::new();
        for mut field in collect_fields(shape, info)? {
            if field.is_ignored() {
                continue;
            }
            if field.decl() == MarkupDecl::Unspecified
                && options.use_interface_declared_attribute()
                && let Some(decl) = interface_decl(shape, &field)
            {
                field = field.with_decl(decl);
            }
            let property = PropertyPlan::new(shape, field)?;
            match property.kind() {
                MarkupKind::Attribute => attributes.push(property),
                MarkupKind::Element | MarkupKind::Text => content.push(property),
            }
        }
        let mut properties = attributes;
        properties.append(&mut content);

        for (index, property) in properties.iter().enumerate() {
            let clash = properties[..index].iter().any(|other| {
                other.markup_name() == property.markup_name()
                    && other.kind() != MarkupKind::Text
                    && property.kind() != MarkupKind::Text
            });
            if clash {
                return Err(ConfigError::DuplicateName {
                    ty,
                    name: property.markup_name(),
                });
            }
        }

        let texts = positions(&properties, |p| p.kind() == MarkupKind::Text);
        if texts.len() > 1 {
            return Err(ConfigError::MultipleTextProperties { ty });
        }
        let text = texts.first().copied();

        let encrypted_lists = positions(&properties, |p| p.is_inline_list() && p.is_encrypted());
        if encrypted_lists.len() > 1 {
            return Err(ConfigError::MultipleEncryptedElementLists { ty });
        }
        let encrypted_list = encrypted_lists.first().copied();
        if let Some(index) = encrypted_list {
            let alone = properties
                .iter()
                .enumerate()
                .all(|(other, property)| other == index || property.kind() == MarkupKind::Attribute);
            if !alone {
                return Err(ConfigError::EncryptedElementListNotAlone {
                    ty,
                    field: properties[index].name(),
                });
            }
        }

        let construction = if info.has_default() {
            None
        } else if info.constructors().is_empty() {
            return Err(ConfigError::NoInstantiableType { ty });
        } else {
            Some(ConstructionPlan::new(info.constructors()))
        };

        log::debug!(
            "planned `{ty}`: {} properties, {}",
            properties.len(),
            if construction.is_some() { "constructor" } else { "default" },
        );

        Ok(Self {
            info,
            properties,
            text,
            encrypted_list,
            construction,
        })
    }

    /// Properties, attributes first.
    #[inline]
    pub fn properties(&self) -> &[PropertyPlan] {
        &self.properties
    }

    #[inline]
    pub fn info(&self) -> &'static RecordInfo {
        self.info
    }

    /// The property written as an attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|p| p.kind() == MarkupKind::Attribute && p.markup_name() == name)
    }

    /// The property read from a child element called `name`.
    ///
    /// When attributes are carried as members, attribute properties are
    /// children too.
    pub fn element(&self, name: &str, attributes_as_members: bool) -> Option<usize> {
        self.properties.iter().position(|p| match p.kind() {
            MarkupKind::Element => p.markup_name() == name,
            MarkupKind::Attribute => attributes_as_members && p.markup_name() == name,
            MarkupKind::Text => false,
        })
    }

    #[inline]
    pub fn text(&self) -> Option<usize> {
        self.text
    }

    /// The encrypted element list, whose content wraps the whole record.
    #[inline]
    pub fn encrypted_list(&self) -> Option<usize> {
        self.encrypted_list
    }

    /// `None` when the record is built from its default value.
    #[inline]
    pub fn construction(&self) -> Option<&ConstructionPlan> {
        self.construction.as_ref()
    }
}

fn positions(properties: &[PropertyPlan], predicate: impl Fn(&PropertyPlan) -> bool) -> Vec<usize> {
    properties
        .iter()
        .enumerate()
        .filter_map(|(index, property)| predicate(property).then_some(index))
        .collect()
}
