//! End-to-end behavior of the mapper.

pub(crate) mod models;

mod encryption;
mod polymorphism;
