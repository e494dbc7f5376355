#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod encryption;
mod engine;
mod error;
mod mapper;
mod options;
mod plan;
mod polymorphic;
mod redact;
mod registry;

#[cfg(test)]
mod tests;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use encryption::{ClearTextMechanism, EncryptionMechanism, SerializationState};
pub use error::{ConfigError, DocumentError, DocumentErrorKind, EncryptionError, MapError};
pub use mapper::{Json, JsonMapper, Mapper, MarkupFormat, Xml, XmlMapper};
pub use mapper::{from_json_str, from_xml_str, to_json_string, to_xml_string};
pub use options::{MapperOptions, PlanOptions};
pub use plan::{ConstructionPlan, MarkupKind, PropertyPlan, RecordPlan, TypePlan};
pub use registry::TypePlanRegistry;

pub(crate) use plan::LazyPlan;
