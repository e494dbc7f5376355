#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Exported macros refer to `$crate`, doc tests refer to `vc_shape`.
extern crate self as vc_shape;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod construct;
mod dynamic;
mod field;
mod interface;
mod known;
mod list;
mod mapped;
mod optional;
mod record;
mod scalar;
mod shape;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use cell::{GenericShapeCell, ShapeCell};
pub use construct::{ArgError, Constructor, ConstructorArgs, ParamInfo};
pub use dynamic::DynamicValue;
pub use field::{FieldInfo, MarkupDecl};
pub use interface::InterfaceInfo;
pub use known::{KnownType, known_types};
pub use list::ListInfo;
pub use mapped::{Mapped, Typed};
pub use optional::OptionalInfo;
pub use record::{BaseInfo, RecordInfo};
pub use scalar::{ConvertError, FnConverter, FromStrConverter, ScalarInfo, ScalarKind, ValueConverter};
pub use shape::{Cast, Shape, ShapeKind};
