//! Checks redeclared fields against the base record they override.
//!
//! A derived field may refine the name of a base field declared with an empty
//! (template) name, or repeat it, but never move it between attribute and
//! element, nor rename it.

use vc_shape::{FieldInfo, MarkupDecl, Shape};

use crate::ConfigError;

/// Resolves the declaration of `derived`, which overrides `base`.
pub(crate) fn resolve_override(
    ty: &'static Shape,
    base: &FieldInfo,
    derived: &FieldInfo,
) -> Result<FieldInfo, ConfigError> {
    let conflict = || ConfigError::HierarchyConflict {
        ty: ty.type_path(),
        field: derived.name(),
        base: base.decl(),
        derived: derived.decl(),
    };
    let merge = |base: &'static str, derived: &'static str| match (base.is_empty(), derived.is_empty()) {
        (false, false) if base != derived => Err(conflict()),
        (_, true) => Ok(base),
        _ => Ok(derived),
    };

    let decl = match (base.decl(), derived.decl()) {
        (base, MarkupDecl::Unspecified) => base,
        (MarkupDecl::Attribute(b), MarkupDecl::Attribute(d)) => MarkupDecl::Attribute(merge(b, d)?),
        (MarkupDecl::Element(b), MarkupDecl::Element(d)) => MarkupDecl::Element(merge(b, d)?),
        (MarkupDecl::Text, MarkupDecl::Text) => MarkupDecl::Text,
        (MarkupDecl::Unspecified, own) => {
            check_new(ty, derived)?;
            own
        }
        _ => return Err(conflict()),
    };

    let mut resolved = derived.clone().with_decl(decl);
    if resolved.rename().is_none()
        && let Some(rename) = base.rename()
    {
        resolved = resolved.renamed(rename);
    }
    if base.is_encrypted() && !resolved.is_encrypted() {
        resolved = resolved.encrypted();
    }
    if base.is_redacted() && !resolved.is_redacted() {
        resolved = resolved.redacted();
    }
    Ok(resolved)
}

/// Checks a field that overrides nothing.
pub(crate) fn check_new(ty: &'static Shape, field: &FieldInfo) -> Result<(), ConfigError> {
    match field.decl().name() {
        Some("") => Err(ConfigError::TemplateNameWithoutBase {
            ty: ty.type_path(),
            field: field.name(),
        }),
        _ => Ok(()),
    }
}
