//! The write and read state machines.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use vc_markup::TextKind;
use vc_shape::ScalarKind;

use crate::encryption::EncryptionScope;
use crate::{ConfigError, LazyPlan, PlanOptions, TypePlan, TypePlanRegistry};

mod cursor;
mod de;
mod ser;

pub(crate) use de::Deserializer;
pub(crate) use ser::Serializer;

/// State of one serialize or deserialize call.
pub(crate) struct Context<'a> {
    registry: &'a TypePlanRegistry,
    options: &'a Arc<PlanOptions>,
    scope: EncryptionScope<'a>,
    path: Vec<&'static str>,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a TypePlanRegistry, options: &'a Arc<PlanOptions>, scope: EncryptionScope<'a>) -> Self {
        Self {
            registry,
            options,
            scope,
            path: Vec::new(),
        }
    }

    #[inline]
    fn plan(&self, lazy: &LazyPlan) -> Result<Arc<TypePlan>, ConfigError> {
        lazy.get(self.registry, self.options)
    }

    /// Slash-separated path of the value being mapped.
    fn path(&self) -> String {
        self.path.join("/")
    }
}

fn text_kind(kind: ScalarKind) -> TextKind {
    match kind {
        ScalarKind::Text => TextKind::String,
        ScalarKind::Number => TextKind::Number,
        ScalarKind::Boolean => TextKind::Boolean,
    }
}
