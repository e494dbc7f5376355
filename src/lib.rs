#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_mapper as mapper;
pub use vc_markup as markup;
pub use vc_shape as shape;
