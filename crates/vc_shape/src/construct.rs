use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::type_name;
use core::fmt;

use thiserror::Error;

use crate::{Mapped, Shape, Typed};

// -----------------------------------------------------------------------------
// ArgError

/// An error raised while invoking a [`Constructor`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArgError {
    #[error("missing constructor argument `{0}`")]
    Missing(&'static str),
    #[error("constructor argument `{name}` is not a `{expected}`")]
    Mismatch {
        name: &'static str,
        expected: &'static str,
    },
    #[error("{0}")]
    Invalid(String),
}

// -----------------------------------------------------------------------------
// ParamInfo

type DefaultFn = Arc<dyn Fn() -> Box<dyn Mapped> + Send + Sync>;

/// A named, typed constructor parameter.
#[derive(Clone)]
pub struct ParamInfo {
    name: &'static str,
    shape: fn() -> &'static Shape,
    default: Option<DefaultFn>,
}

impl ParamInfo {
    /// A parameter of type `P`.
    #[inline]
    pub fn new<P: Typed>(name: &'static str) -> Self {
        Self {
            name,
            shape: P::type_shape,
            default: None,
        }
    }

    /// A parameter of type `P` with its own default value.
    pub fn with_default<P: Typed>(name: &'static str, default: fn() -> P) -> Self {
        Self {
            name,
            shape: P::type_shape,
            default: Some(Arc::new(move || Box::new(default()) as Box<dyn Mapped>)),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }

    #[inline]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Creates the parameter's own default value.
    #[inline]
    pub fn default_value(&self) -> Option<Box<dyn Mapped>> {
        self.default.as_ref().map(|default| default())
    }
}

impl fmt::Debug for ParamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamInfo")
            .field("name", &self.name)
            .field("type", &self.shape().type_path())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ConstructorArgs

/// Arguments handed to a [`Constructor`], one slot per parameter.
#[derive(Default)]
pub struct ConstructorArgs {
    slots: Vec<(&'static str, Option<Box<dyn Mapped>>)>,
}

impl ConstructorArgs {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the argument for `name`.
    #[inline]
    pub fn push(&mut self, name: &'static str, value: Box<dyn Mapped>) {
        self.slots.push((name, Some(value)));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Takes the argument for `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_shape::ConstructorArgs;
    ///
    /// let mut args = ConstructorArgs::new();
    /// args.push("width", Box::new(3_u32));
    ///
    /// assert!(args.take::<i64>("width").is_err());
    /// assert_eq!(args.take::<u32>("width").unwrap(), 3);
    /// assert!(args.take::<u32>("width").is_err());
    /// ```
    pub fn take<T: Typed>(&mut self, name: &'static str) -> Result<T, ArgError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|(n, _)| *n == name)
            .ok_or(ArgError::Missing(name))?;
        let value = slot.1.take().ok_or(ArgError::Missing(name))?;
        value.take::<T>().map_err(|value| {
            slot.1 = Some(value);
            ArgError::Mismatch {
                name,
                expected: type_name::<T>(),
            }
        })
    }
}

// -----------------------------------------------------------------------------
// Constructor

type InvokeFn = Arc<dyn Fn(&mut ConstructorArgs) -> Result<Box<dyn Mapped>, ArgError> + Send + Sync>;

/// A way to build a record from named arguments.
///
/// # Examples
///
/// ```
/// use vc_shape::{Constructor, ConstructorArgs, ParamInfo};
///
/// let area = Constructor::new(|args| Ok(args.take::<u32>("w")? * args.take::<u32>("h")?))
///     .with_param(ParamInfo::new::<u32>("w"))
///     .with_param(ParamInfo::with_default("h", || 1_u32));
///
/// let mut args = ConstructorArgs::new();
/// args.push("w", Box::new(6_u32));
/// args.push("h", Box::new(7_u32));
///
/// let value = area.invoke(&mut args).unwrap();
/// assert_eq!(value.take::<u32>().ok(), Some(42));
/// assert_eq!(area.params().len(), 2);
/// ```
#[derive(Clone)]
pub struct Constructor {
    params: Vec<ParamInfo>,
    invoke: InvokeFn,
}

impl Constructor {
    /// Wraps a function building a `T`. Parameters are declared with [`with_param`](Self::with_param).
    pub fn new<T: Typed>(
        invoke: impl Fn(&mut ConstructorArgs) -> Result<T, ArgError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            params: Vec::new(),
            invoke: Arc::new(move |args: &mut ConstructorArgs| Ok(Box::new(invoke(args)?) as Box<dyn Mapped>)),
        }
    }

    #[inline]
    pub fn with_param(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    #[inline]
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    #[inline]
    pub fn invoke(&self, args: &mut ConstructorArgs) -> Result<Box<dyn Mapped>, ArgError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.params.iter().map(ParamInfo::name)).finish()
    }
}
