use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use core::marker::PhantomData;
use std::io::{Read, Write};

use vc_markup::json::{JsonReader, JsonWriter};
use vc_markup::xml::{XmlReader, XmlWriter};
use vc_markup::{MarkupError, MarkupReader, MarkupWriter, Position};
use vc_shape::{Mapped, Typed};

use crate::encryption::EncryptionScope;
use crate::engine::{Context, Deserializer, Serializer};
use crate::{
    ConfigError, DocumentError, DocumentErrorKind, MapError, MapperOptions, PlanOptions, TypePlan,
    TypePlanRegistry,
};

// -----------------------------------------------------------------------------
// MarkupFormat

/// A markup backend a [`Mapper`] reads and writes.
pub trait MarkupFormat: Send + Sync + 'static {
    fn writer(options: &MapperOptions) -> Box<dyn MarkupWriter>;

    fn reader(text: &str) -> Result<Box<dyn MarkupReader + '_>, MarkupError>;
}

/// XML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xml;

impl MarkupFormat for Xml {
    fn writer(options: &MapperOptions) -> Box<dyn MarkupWriter> {
        let mut writer = XmlWriter::new();
        if options.indent() {
            writer = writer.with_indent("  ");
        }
        if let Some(namespace) = options.default_namespace() {
            writer = writer.with_default_namespace(namespace);
        }
        Box::new(writer)
    }

    #[inline]
    fn reader(text: &str) -> Result<Box<dyn MarkupReader + '_>, MarkupError> {
        Ok(Box::new(XmlReader::new(text)))
    }
}

/// JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl MarkupFormat for Json {
    fn writer(options: &MapperOptions) -> Box<dyn MarkupWriter> {
        let writer = JsonWriter::new();
        if options.indent() {
            return Box::new(writer.pretty());
        }
        Box::new(writer)
    }

    #[inline]
    fn reader(text: &str) -> Result<Box<dyn MarkupReader + '_>, MarkupError> {
        Ok(Box::new(JsonReader::new(text)?))
    }
}

// -----------------------------------------------------------------------------
// Mapper

/// Serializes and deserializes values of `T` in the markup format `F`.
///
/// Creating a mapper builds the plan of `T` and of every type reachable from
/// it, so configuration errors are reported here rather than on the first
/// document. Plans are shared through a [`TypePlanRegistry`]: mappers of the
/// same type and equivalent options are cheap to create. A mapper can be used
/// from several threads at once, each call has its own encryption state.
///
/// # Examples
///
/// ```
/// use vc_mapper::{MapperOptions, XmlMapper};
///
/// let mapper = XmlMapper::<Vec<u32>>::new(MapperOptions::new()).unwrap();
/// let xml = mapper.serialize(&vec![1, 2]).unwrap();
/// assert_eq!(mapper.deserialize(&xml).unwrap(), vec![1, 2]);
/// ```
pub struct Mapper<T, F = Xml> {
    options: MapperOptions,
    plan_options: Arc<PlanOptions>,
    registry: Arc<TypePlanRegistry>,
    plan: Arc<TypePlan>,
    marker: PhantomData<fn() -> (T, F)>,
}

/// A [`Mapper`] of XML documents.
pub type XmlMapper<T> = Mapper<T, Xml>;

/// A [`Mapper`] of JSON documents.
pub type JsonMapper<T> = Mapper<T, Json>;

impl<T: Typed, F: MarkupFormat> Mapper<T, F> {
    /// Creates a mapper using the process-wide registry.
    pub fn new(options: MapperOptions) -> Result<Self, ConfigError> {
        Self::with_registry(options, TypePlanRegistry::global())
    }

    pub fn with_registry(options: MapperOptions, registry: Arc<TypePlanRegistry>) -> Result<Self, ConfigError> {
        let plan_options = Arc::new(options.plan_options());
        let plan = registry.warm(T::type_shape(), options.encrypt_root(), &plan_options)?;
        Ok(Self {
            options,
            plan_options,
            registry,
            plan,
            marker: PhantomData,
        })
    }

    #[inline]
    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// The plan of the root type.
    #[inline]
    pub fn plan(&self) -> &TypePlan {
        &self.plan
    }

    pub fn serialize(&self, value: &T) -> Result<String, MapError> {
        let mechanism = self.options.mechanism();
        let scope = EncryptionScope::new(&*mechanism, self.options.encrypt_key());
        let cx = Context::new(&self.registry, &self.plan_options, scope);

        let mut writer = F::writer(&self.options);
        Serializer::new(cx, &mut *writer).serialize(&self.plan, value)?;
        Ok(writer.finish()?)
    }

    pub fn serialize_to_writer(&self, value: &T, mut out: impl Write) -> Result<(), MapError> {
        let text = self.serialize(value)?;
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    pub fn deserialize(&self, text: &str) -> Result<T, MapError> {
        let mechanism = self.options.mechanism();
        let scope = EncryptionScope::new(&*mechanism, self.options.encrypt_key());
        let cx = Context::new(&self.registry, &self.plan_options, scope);

        let mut reader = F::reader(text)?;
        let value = Deserializer::new(cx, &mut *reader).deserialize(&self.plan)?;
        value.take::<T>().map_err(|found: Box<dyn Mapped>| {
            let kind = DocumentErrorKind::TypeMismatch {
                field: found.shape().name(),
                expected: T::type_shape().type_path(),
            };
            MapError::Document(DocumentError::new(kind, String::new(), Position::Unknown))
        })
    }

    pub fn deserialize_from_reader(&self, mut input: impl Read) -> Result<T, MapError> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        self.deserialize(&text)
    }
}

// -----------------------------------------------------------------------------
// Shortcuts

/// Serializes `value` to XML with default options.
pub fn to_xml_string<T: Typed>(value: &T) -> Result<String, MapError> {
    XmlMapper::<T>::new(MapperOptions::default())?.serialize(value)
}

/// Deserializes a `T` from XML with default options.
pub fn from_xml_str<T: Typed>(text: &str) -> Result<T, MapError> {
    XmlMapper::<T>::new(MapperOptions::default())?.deserialize(text)
}

/// Serializes `value` to JSON with default options.
pub fn to_json_string<T: Typed>(value: &T) -> Result<String, MapError> {
    JsonMapper::<T>::new(MapperOptions::default())?.serialize(value)
}

/// Deserializes a `T` from JSON with default options.
pub fn from_json_str<T: Typed>(text: &str) -> Result<T, MapError> {
    JsonMapper::<T>::new(MapperOptions::default())?.deserialize(text)
}
