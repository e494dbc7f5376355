//! Type tags for values whose static type does not determine their runtime type.

use alloc::string::String;

use vc_shape::{Shape, ShapeKind};

use crate::{DocumentErrorKind, PlanOptions};

/// The tag written for a value of `runtime` held in a field of `declared`.
///
/// Only interface boxes need one. The short name is used unless another
/// allowed type shares it, in which case the full path is.
pub(crate) fn type_tag(declared: &Shape, runtime: &'static Shape, options: &PlanOptions) -> Option<&'static str> {
    if !matches!(declared.kind(), ShapeKind::Interface(_)) {
        return None;
    }
    let ambiguous = options
        .extra_types()
        .any(|other| other.id() != runtime.id() && other.name() == runtime.name());
    if ambiguous {
        log::warn!(
            "type name `{}` is ambiguous, tagging with `{}`",
            runtime.name(),
            runtime.type_path()
        );
        Some(runtime.type_path())
    } else {
        Some(runtime.name())
    }
}

/// Resolves a type tag read for a field of `declared`.
///
/// Candidates are the extra types plus `declared` itself, matched exactly on
/// their short name or full path.
pub(crate) fn resolve(
    declared: &'static Shape,
    tag: &str,
    options: &PlanOptions,
) -> Result<&'static Shape, DocumentErrorKind> {
    let named = |shape: &&'static Shape| shape.name() == tag || shape.type_path() == tag;
    let mut candidates = options.extra_types().chain(core::iter::once(declared)).filter(named);

    let first = candidates.next();
    if let Some(shape) = first.into_iter().chain(candidates).find(|shape| shape.can_cast_to(declared)) {
        return Ok(shape);
    }
    match first {
        Some(_) => Err(DocumentErrorKind::IncompatibleTypeHint {
            hint: String::from(tag),
            expected: declared.type_path(),
        }),
        None => Err(DocumentErrorKind::UnknownTypeHint(String::from(tag))),
    }
}
