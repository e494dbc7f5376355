use alloc::string::String;

use vc_markup::json::TEXT_MEMBER;
use vc_markup::{MarkupWriter, TextKind};
use vc_shape::{DynamicValue, Mapped, ScalarKind, Shape};

use super::{Context, text_kind};
use crate::plan::{LazyPlan, MarkupKind, PlanKind, RecordPlan};
use crate::{MapError, TypePlan, polymorphic, redact};

/// Per-value hints handed down from the owning property.
#[derive(Clone, Copy, Default)]
struct Hints {
    redact: bool,
    item_name: Option<&'static str>,
}

/// Writes values through their plans.
pub(crate) struct Serializer<'a, 'w> {
    cx: Context<'a>,
    writer: &'w mut dyn MarkupWriter,
}

fn is_absent(plan: &TypePlan, value: &dyn Mapped) -> bool {
    plan.shape()
        .as_optional()
        .is_some_and(|info| info.get(value).is_none())
}

impl<'a, 'w> Serializer<'a, 'w> {
    pub fn new(cx: Context<'a>, writer: &'w mut dyn MarkupWriter) -> Self {
        Self { cx, writer }
    }

    /// Writes `value` as the document root. An absent root is written as nil.
    pub fn serialize(&mut self, plan: &TypePlan, value: &dyn Mapped) -> Result<(), MapError> {
        self.write_present(plan.element_name(), plan, value, Hints::default())
    }

    fn write_element(
        &mut self,
        name: &str,
        plan: &TypePlan,
        value: &dyn Mapped,
        hints: Hints,
    ) -> Result<(), MapError> {
        if !self.cx.options.always_emit_nil() && is_absent(plan, value) {
            return Ok(());
        }
        self.write_present(name, plan, value, hints)
    }

    fn write_present(
        &mut self,
        name: &str,
        plan: &TypePlan,
        value: &dyn Mapped,
        hints: Hints,
    ) -> Result<(), MapError> {
        self.writer.begin_element(name)?;
        self.write_body(plan, value, hints)?;
        self.writer.end_element()?;
        Ok(())
    }

    /// Writes the attributes and content of the element just begun.
    fn write_body(&mut self, plan: &TypePlan, value: &dyn Mapped, hints: Hints) -> Result<(), MapError> {
        match plan.kind() {
            PlanKind::Optional(inner) => {
                let inner_value = plan.shape().as_optional().and_then(|info| info.get(value));
                match inner_value {
                    Some(inner_value) => {
                        let inner = self.cx.plan(inner)?;
                        self.write_body(&inner, inner_value, hints)
                    }
                    None => Ok(self.writer.nil()?),
                }
            }
            PlanKind::Interface => {
                let Some(inner) = plan.shape().as_interface().and_then(|info| info.inner(value)) else {
                    return Ok(());
                };
                let runtime = inner.shape();
                let concrete = self
                    .cx
                    .registry
                    .get_plan(runtime, plan.is_encrypted(), self.cx.options)?;
                if let Some(tag) = polymorphic::type_tag(plan.shape(), runtime, self.cx.options) {
                    self.writer.type_tag(tag)?;
                }
                self.write_body(&concrete, inner, hints)
            }
            PlanKind::Scalar => {
                let encrypt = plan.is_encrypted() && !self.cx.scope.is_active();
                if let Some((text, kind)) = self.scalar_text(plan.shape(), value, hints.redact, encrypt)? {
                    self.writer.text(&text, kind)?;
                }
                Ok(())
            }
            PlanKind::Dynamic => {
                let Some(value) = value.downcast_ref::<DynamicValue>() else {
                    return Ok(());
                };
                let entered = plan.is_encrypted() && self.cx.scope.enter();
                if entered {
                    self.writer.begin_capture()?;
                }
                self.write_dynamic(value)?;
                if entered {
                    self.seal()?;
                }
                Ok(())
            }
            PlanKind::List(item) => self.write_list(plan, item, value, hints),
            PlanKind::Record(record) => self.write_record(plan, record, value, hints),
        }
    }

    /// Formats a scalar, or an optional scalar if present.
    fn scalar_text(
        &mut self,
        shape: &'static Shape,
        value: &dyn Mapped,
        redact: bool,
        encrypt: bool,
    ) -> Result<Option<(String, TextKind)>, MapError> {
        if let Some(info) = shape.as_optional() {
            return match info.get(value) {
                Some(inner) => self.scalar_text(info.inner(), inner, redact, encrypt),
                None => Ok(None),
            };
        }
        let Some(info) = shape.as_scalar() else {
            return Ok(None);
        };

        let mut text = info.format(value)?;
        let mut kind = text_kind(info.kind());
        if redact {
            text = redact::redact(&text, info.kind());
            if info.kind() == ScalarKind::Boolean {
                kind = TextKind::String;
            }
        }
        if encrypt {
            text = self.cx.scope.encrypt(&text)?;
            kind = TextKind::String;
        }
        Ok(Some((text, kind)))
    }

    fn write_list(
        &mut self,
        plan: &TypePlan,
        item: &LazyPlan,
        value: &dyn Mapped,
        hints: Hints,
    ) -> Result<(), MapError> {
        let Some(info) = plan.shape().as_list() else {
            return Ok(());
        };
        let item_plan = self.cx.plan(item)?;
        let item_name = hints
            .item_name
            .unwrap_or(item_plan.shape().peel_optional().element_name());
        let item_hints = Hints {
            redact: hints.redact,
            item_name: None,
        };

        let entered = plan.is_encrypted() && self.cx.scope.enter();
        if entered {
            self.writer.begin_capture()?;
        }
        self.writer.begin_list()?;
        for item in info.items(value) {
            self.write_present(item_name, &item_plan, item, item_hints)?;
        }
        self.writer.end_list()?;
        if entered {
            self.seal()?;
        }
        Ok(())
    }

    fn write_record(
        &mut self,
        plan: &TypePlan,
        record: &RecordPlan,
        value: &dyn Mapped,
        hints: Hints,
    ) -> Result<(), MapError> {
        let flavor = self.writer.flavor();
        let outer_active = self.cx.scope.is_active();
        let entered = (plan.is_encrypted() || record.encrypted_list().is_some()) && self.cx.scope.enter();
        let covers_attributes = entered && flavor.attributes_as_members();

        let properties = record.properties();
        let split = properties
            .iter()
            .position(|p| p.kind() != MarkupKind::Attribute)
            .unwrap_or(properties.len());
        let (attributes, content) = properties.split_at(split);

        if covers_attributes {
            self.writer.begin_capture()?;
        }
        for property in attributes {
            let Some(field_value) = property.field().get(value) else {
                continue;
            };
            let redact = hints.redact || (self.cx.options.redact() && property.is_redacted());
            let encrypt =
                !outer_active && !covers_attributes && (property.is_encrypted() || plan.is_encrypted());
            let formatted = self.scalar_text(property.field().shape(), field_value, redact, encrypt)?;
            if let Some((text, kind)) = formatted {
                self.writer.attribute(property.markup_name(), &text, kind)?;
            }
        }

        if entered && !covers_attributes {
            self.writer.begin_capture()?;
        }
        for property in content {
            let Some(field_value) = property.field().get(value) else {
                continue;
            };
            let redact = hints.redact || (self.cx.options.redact() && property.is_redacted());

            if property.kind() == MarkupKind::Text {
                let encrypt = property.is_encrypted() && !self.cx.scope.is_active();
                let formatted = self.scalar_text(property.field().shape(), field_value, redact, encrypt)?;
                if let Some((text, kind)) = formatted {
                    self.writer.text(&text, kind)?;
                }
                continue;
            }

            let child = self.cx.plan(property.child())?;
            match child.kind() {
                PlanKind::List(item) if property.is_inline_list() && flavor.inline_lists() => {
                    let item_plan = self.cx.plan(item)?;
                    let items = child.shape().as_list().into_iter().flat_map(|info| info.items(field_value));
                    let item_hints = Hints {
                        redact,
                        item_name: None,
                    };
                    for item in items {
                        self.write_present(property.markup_name(), &item_plan, item, item_hints)?;
                    }
                }
                PlanKind::List(_)
                    if property.is_inline_list()
                        && child.shape().as_list().is_some_and(|info| info.len(field_value) == 0) =>
                {
                    // Repeated elements write nothing for an empty list in any flavor.
                }
                _ => {
                    let hints = Hints {
                        redact,
                        item_name: property.item_name(),
                    };
                    self.write_element(property.markup_name(), &child, field_value, hints)?;
                }
            }
        }

        if entered {
            self.seal()?;
        }
        Ok(())
    }

    fn write_dynamic(&mut self, value: &DynamicValue) -> Result<(), MapError> {
        match value {
            DynamicValue::Null => self.writer.nil()?,
            DynamicValue::Text(text) => self.writer.text(text, TextKind::String)?,
            DynamicValue::Object(members) => {
                for (name, member) in members {
                    if name == TEXT_MEMBER {
                        if let DynamicValue::Text(text) = member {
                            self.writer.text(text, TextKind::String)?;
                        }
                        continue;
                    }
                    self.writer.begin_element(name)?;
                    self.write_dynamic(member)?;
                    self.writer.end_element()?;
                }
            }
        }
        Ok(())
    }

    /// Ends the capture of the active scope and writes its ciphertext.
    fn seal(&mut self) -> Result<(), MapError> {
        let captured = self.writer.end_capture()?;
        self.cx.scope.exit();
        if !captured.is_empty() {
            let cipher = self.cx.scope.encrypt(&captured)?;
            self.writer.text(&cipher, TextKind::String)?;
        }
        Ok(())
    }
}
