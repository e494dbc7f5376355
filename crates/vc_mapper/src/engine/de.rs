use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use vc_markup::json::{ARRAY_ATTRIBUTE, TEXT_MEMBER};
use vc_markup::{MarkupReader, Token};
use vc_shape::{DynamicValue, Mapped, Shape};

use super::Context;
use super::cursor::{Cursor, Step};
use crate::plan::{LazyPlan, Pending, PlanKind, RecordPlan};
use crate::{DocumentError, DocumentErrorKind, MapError, TypePlan, polymorphic};

type Attributes = Vec<(String, String)>;

/// The next child of an element being read.
enum Child {
    Text(String),
    Element(String, Attributes),
    End,
}

/// Read state of one element's content.
struct Frame {
    /// Fragment depth of the cursor when the element started.
    depth: usize,
    /// The first text child is ciphertext to splice.
    decrypt: bool,
    /// Content came from a decrypted fragment.
    spliced: bool,
    /// The fragment read for this element owns the scope.
    entered: bool,
    started: bool,
}

impl Frame {
    fn new(depth: usize, decrypt: bool) -> Self {
        Self {
            depth,
            decrypt,
            spliced: false,
            entered: false,
            started: false,
        }
    }
}

fn root_matches(found: &str, expected: &str) -> bool {
    found == expected || found.split_once(':').is_some_and(|(_, local)| local == expected)
}

/// Reads values through their plans.
pub(crate) struct Deserializer<'a, 'r> {
    cx: Context<'a>,
    cursor: Cursor<'r>,
}

impl<'a, 'r> Deserializer<'a, 'r> {
    pub fn new(cx: Context<'a>, reader: &'r mut dyn MarkupReader) -> Self {
        Self {
            cx,
            cursor: Cursor::new(reader),
        }
    }

    /// Reads the document root as a value of `plan`.
    pub fn deserialize(&mut self, plan: &TypePlan) -> Result<Box<dyn Mapped>, MapError> {
        loop {
            match self.cursor.next()? {
                Step::Token(Token::Start(name)) => {
                    if self.cursor.flavor().named_root() && !root_matches(&name, plan.element_name()) {
                        return Err(self.fail(DocumentErrorKind::UnexpectedRoot {
                            expected: String::from(plan.element_name()),
                            found: name,
                        }));
                    }
                    let attributes = self.read_attributes()?;
                    let value = self.read_element(plan, attributes)?;
                    return value.ok_or_else(|| self.fail(DocumentErrorKind::NoValueProduced));
                }
                Step::Token(_) => {}
                Step::FragmentEnd | Step::Eof => return Err(self.fail(DocumentErrorKind::NoValueProduced)),
            }
        }
    }

    fn fail(&self, kind: DocumentErrorKind) -> MapError {
        MapError::Document(DocumentError::new(kind, self.cx.path(), self.cursor.position()))
    }

    // -------------------------------------------------------------------------
    // Token plumbing

    fn read_attributes(&mut self) -> Result<Attributes, MapError> {
        let mut attributes = Vec::new();
        loop {
            match self.cursor.next()? {
                Step::Token(Token::Attribute { name, value }) => attributes.push((name, value)),
                Step::Token(Token::AttributesEnd) => return Ok(attributes),
                Step::Token(other) => return Err(self.fail(DocumentErrorKind::UnexpectedToken(other.describe()))),
                Step::FragmentEnd => return Err(self.fail(DocumentErrorKind::ScopeExitedEarly)),
                Step::Eof => return Err(self.fail(DocumentErrorKind::NoValueProduced)),
            }
        }
    }

    /// Consumes the rest of an element whose attributes were read.
    fn skip_element(&mut self) -> Result<(), MapError> {
        let mut open = 1_usize;
        loop {
            match self.cursor.next()? {
                Step::Token(Token::Start(_)) => open += 1,
                Step::Token(Token::End(_)) => {
                    open -= 1;
                    if open == 0 {
                        return Ok(());
                    }
                }
                Step::Token(_) => {}
                Step::FragmentEnd => return Err(self.fail(DocumentErrorKind::ScopeExitedEarly)),
                Step::Eof => return Err(self.fail(DocumentErrorKind::NoValueProduced)),
            }
        }
    }

    fn next_child(&mut self, frame: &mut Frame) -> Result<Child, MapError> {
        loop {
            match self.cursor.next()? {
                Step::Token(Token::Text(text)) => {
                    let first = !frame.started;
                    frame.started = true;
                    if first && frame.decrypt && self.try_splice(&text, frame)? {
                        continue;
                    }
                    return Ok(Child::Text(text));
                }
                Step::Token(Token::Start(name)) => {
                    frame.started = true;
                    let attributes = self.read_attributes()?;
                    return Ok(Child::Element(name, attributes));
                }
                Step::Token(Token::End(_)) => {
                    if self.cursor.depth() != frame.depth {
                        return Err(self.fail(DocumentErrorKind::ScopeExitedEarly));
                    }
                    return Ok(Child::End);
                }
                Step::FragmentEnd if frame.entered && self.cursor.depth() == frame.depth => {
                    self.cx.scope.exit();
                    frame.entered = false;
                }
                Step::FragmentEnd => return Err(self.fail(DocumentErrorKind::ScopeExitedEarly)),
                Step::Token(other) => return Err(self.fail(DocumentErrorKind::UnexpectedToken(other.describe()))),
                Step::Eof => return Err(self.fail(DocumentErrorKind::NoValueProduced)),
            }
        }
    }

    /// Decrypts `text` and reads its plaintext before the rest of the element.
    ///
    /// Returns `false` when `text` does not decrypt, in which case it is read
    /// as plaintext. Decrypted content that is not a well-formed fragment is
    /// an error.
    fn try_splice(&mut self, text: &str, frame: &mut Frame) -> Result<bool, MapError> {
        let plaintext = match self.cx.scope.decrypt(text) {
            Ok(plaintext) => plaintext,
            Err(error) => {
                log::debug!("reading `{}` as plaintext: {error}", self.cx.path());
                return Ok(false);
            }
        };
        let fragment = self
            .cursor
            .fragment(&plaintext)
            .map_err(|error| self.fail(DocumentErrorKind::MalformedFragment(error)))?;
        frame.entered = self.cx.scope.enter();
        frame.spliced = true;
        self.cursor.splice(fragment);
        Ok(true)
    }

    fn decrypt_or_legacy(&mut self, text: String) -> String {
        if text.is_empty() {
            return text;
        }
        match self.cx.scope.decrypt(&text) {
            Ok(plaintext) => plaintext,
            Err(error) => {
                log::debug!("reading `{}` as plaintext: {error}", self.cx.path());
                text
            }
        }
    }

    fn is_nil(&self, attributes: &Attributes) -> bool {
        let nil = self.cursor.flavor().nil_attribute();
        attributes.iter().any(|(name, value)| name == nil && value == "true")
    }

    // -------------------------------------------------------------------------
    // Values

    /// Reads the content of an element whose attributes were read.
    ///
    /// Returns `None` for a nil element of a type with no absent value.
    fn read_element(&mut self, plan: &TypePlan, mut attributes: Attributes) -> Result<Option<Box<dyn Mapped>>, MapError> {
        let shape = plan.shape();
        if self.is_nil(&attributes) {
            self.skip_element()?;
            return Ok(match plan.kind() {
                PlanKind::Optional(_) => shape.as_optional().map(|info| info.none()),
                PlanKind::Dynamic => Some(Box::new(DynamicValue::Null)),
                _ => None,
            });
        }

        let type_attribute = self.cursor.flavor().type_attribute();
        let tag = attributes
            .iter()
            .position(|(name, _)| name == type_attribute)
            .map(|index| attributes.remove(index).1);

        match plan.kind() {
            PlanKind::Optional(inner) => {
                let inner = self.cx.plan(inner)?;
                if let Some(tag) = tag {
                    attributes.push((String::from(type_attribute), tag));
                }
                let value = self.read_element(&inner, attributes)?;
                let Some(info) = shape.as_optional() else {
                    return Ok(value);
                };
                match value {
                    Some(value) => info
                        .some(value)
                        .map(Some)
                        .map_err(|_| self.mismatch(shape)),
                    None => Ok(Some(info.none())),
                }
            }
            PlanKind::Interface => {
                let Some(tag) = tag else {
                    return Err(self.fail(DocumentErrorKind::NoTypeHint(shape.type_path())));
                };
                let concrete = polymorphic::resolve(shape, &tag, self.cx.options).map_err(|kind| self.fail(kind))?;
                let concrete_plan = self
                    .cx
                    .registry
                    .get_plan(concrete, plan.is_encrypted(), self.cx.options)?;
                let Some(value) = self.read_element(&concrete_plan, attributes)? else {
                    return Ok(None);
                };
                concrete
                    .cast_into(shape, value)
                    .map(Some)
                    .map_err(|_| self.mismatch(shape))
            }
            kind => {
                if let Some(tag) = tag
                    && !shape.is_primitive_like()
                {
                    let found = polymorphic::resolve(shape, &tag, self.cx.options).map_err(|kind| self.fail(kind))?;
                    if found.id() != shape.id() {
                        return Err(self.fail(DocumentErrorKind::IncompatibleTypeHint {
                            hint: tag,
                            expected: shape.type_path(),
                        }));
                    }
                }
                match kind {
                    PlanKind::Scalar => self.read_scalar(plan).map(Some),
                    PlanKind::List(item) => self.read_list(plan, item).map(Some),
                    PlanKind::Record(record) => self.read_record(plan, record, attributes).map(Some),
                    PlanKind::Dynamic => {
                        let decrypt = plan.is_encrypted() && !self.cx.scope.is_active();
                        let value = self.read_dynamic(attributes, decrypt)?;
                        Ok(Some(Box::new(value)))
                    }
                    PlanKind::Optional(_) | PlanKind::Interface => Ok(None),
                }
            }
        }
    }

    fn mismatch(&self, shape: &'static Shape) -> MapError {
        let field = self.cx.path.last().copied().unwrap_or("");
        self.fail(DocumentErrorKind::TypeMismatch {
            field,
            expected: shape.type_path(),
        })
    }

    /// Parses `text` as a value of a scalar or optional scalar shape.
    fn parse_scalar(&self, shape: &'static Shape, text: &str) -> Result<Box<dyn Mapped>, MapError> {
        if let Some(info) = shape.as_optional() {
            let inner = self.parse_scalar(info.inner(), text)?;
            return info.some(inner).map_err(|_| self.mismatch(shape));
        }
        if text.is_empty()
            && let Some(empty) = shape.empty_value()
        {
            return Ok(empty);
        }
        let Some(info) = shape.as_scalar() else {
            return Err(self.mismatch(shape));
        };
        info.parse(text)
            .map_err(|error| self.fail(DocumentErrorKind::InvalidValue(error)))
    }

    fn read_scalar(&mut self, plan: &TypePlan) -> Result<Box<dyn Mapped>, MapError> {
        let encrypted = plan.is_encrypted() && !self.cx.scope.is_active();
        let mut text = String::new();
        loop {
            match self.cursor.next()? {
                Step::Token(Token::Text(chunk)) => text.push_str(&chunk),
                Step::Token(Token::Start(name)) => {
                    if encrypted {
                        return Err(self.fail(DocumentErrorKind::DecryptNonString(name)));
                    }
                    return Err(self.fail(DocumentErrorKind::UnexpectedToken(Token::Start(name).describe())));
                }
                Step::Token(Token::End(_)) => break,
                Step::Token(other) => return Err(self.fail(DocumentErrorKind::UnexpectedToken(other.describe()))),
                Step::FragmentEnd => return Err(self.fail(DocumentErrorKind::ScopeExitedEarly)),
                Step::Eof => return Err(self.fail(DocumentErrorKind::NoValueProduced)),
            }
        }
        if encrypted {
            text = self.decrypt_or_legacy(text);
        }
        self.parse_scalar(plan.shape(), &text)
    }

    fn read_list(&mut self, plan: &TypePlan, item: &LazyPlan) -> Result<Box<dyn Mapped>, MapError> {
        let Some(info) = plan.shape().as_list() else {
            return Err(self.mismatch(plan.shape()));
        };
        let item_plan = self.cx.plan(item)?;
        let mut list = info.new_empty();

        let decrypt = plan.is_encrypted() && !self.cx.scope.is_active();
        let mut frame = Frame::new(self.cursor.depth(), decrypt);
        loop {
            match self.next_child(&mut frame)? {
                Child::End => break,
                Child::Text(_) => {}
                Child::Element(_, attributes) => {
                    if let Some(value) = self.read_element(&item_plan, attributes)? {
                        info.push(&mut *list, value)
                            .map_err(|_| self.mismatch(item_plan.shape()))?;
                    }
                }
            }
        }
        Ok(list)
    }

    fn read_record(
        &mut self,
        plan: &TypePlan,
        record: &RecordPlan,
        attributes: Attributes,
    ) -> Result<Box<dyn Mapped>, MapError> {
        let flavor = self.cursor.flavor();
        let outer_active = self.cx.scope.is_active();
        let mut values = Vec::new();

        for (name, text) in attributes {
            if flavor.is_reserved_attribute(&name) {
                continue;
            }
            let Some(index) = record.attribute(&name) else {
                log::trace!("ignoring unknown attribute `{name}` of `{}`", plan.shape().type_path());
                continue;
            };
            let property = &record.properties()[index];
            self.cx.path.push(property.name());
            let text = if !outer_active && (property.is_encrypted() || plan.is_encrypted()) {
                self.decrypt_or_legacy(text)
            } else {
                text
            };
            let value = self.parse_scalar(property.field().shape(), &text)?;
            self.store(record, &mut values, index, value)?;
            self.cx.path.pop();
        }

        let decrypt = (plan.is_encrypted() || record.encrypted_list().is_some()) && !outer_active;
        let mut frame = Frame::new(self.cursor.depth(), decrypt);
        let mut text = String::new();
        loop {
            let (name, attributes) = match self.next_child(&mut frame)? {
                Child::End => break,
                Child::Text(chunk) => {
                    text.push_str(&chunk);
                    continue;
                }
                Child::Element(name, attributes) => (name, attributes),
            };
            let Some(index) = record.element(&name, flavor.attributes_as_members()) else {
                log::trace!("skipping unknown element `{name}` of `{}`", plan.shape().type_path());
                self.skip_element()?;
                continue;
            };

            let property = &record.properties()[index];
            self.cx.path.push(property.name());
            let child = self.cx.plan(property.child())?;
            let value = match child.kind() {
                PlanKind::List(item) if property.is_inline_list() && flavor.inline_lists() => {
                    let item_plan = self.cx.plan(item)?;
                    match (self.read_element(&item_plan, attributes)?, child.shape().as_list()) {
                        (Some(item), Some(info)) => {
                            let mut list = info.new_empty();
                            info.push(&mut *list, item)
                                .map_err(|_| self.mismatch(item_plan.shape()))?;
                            Some(list)
                        }
                        _ => None,
                    }
                }
                _ => self.read_element(&child, attributes)?,
            };
            if let Some(value) = value {
                self.store(record, &mut values, index, value)?;
            }
            self.cx.path.pop();
        }

        if let Some(index) = record.text()
            && !text.is_empty()
        {
            let property = &record.properties()[index];
            self.cx.path.push(property.name());
            if property.is_encrypted() && !outer_active && !frame.spliced {
                text = self.decrypt_or_legacy(text);
            }
            let value = self.parse_scalar(property.field().shape(), &text)?;
            self.store(record, &mut values, index, value)?;
            self.cx.path.pop();
        }

        self.finish_record(plan, record, values)
    }

    /// Adds a value read for a property, merging repeated inline lists.
    fn store(
        &self,
        record: &RecordPlan,
        values: &mut Vec<Pending>,
        index: usize,
        value: Box<dyn Mapped>,
    ) -> Result<(), MapError> {
        let property = &record.properties()[index];
        let shape = property.field().shape();
        let Some(existing) = values.iter_mut().find(|pending| pending.index == index) else {
            values.push(Pending {
                index,
                name: property.name(),
                shape,
                value,
            });
            return Ok(());
        };
        let merged = match shape.as_list() {
            Some(info) if property.is_inline_list() => info.append(&mut *existing.value, value).is_ok(),
            _ => false,
        };
        if merged {
            Ok(())
        } else {
            Err(self.fail(DocumentErrorKind::CannotCombine(property.name())))
        }
    }

    fn finish_record(
        &self,
        plan: &TypePlan,
        record: &RecordPlan,
        values: Vec<Pending>,
    ) -> Result<Box<dyn Mapped>, MapError> {
        let (mut instance, leftovers) = match record.info().create_default() {
            Some(instance) => (instance, values),
            None => {
                let Some(construction) = record.construction() else {
                    return Err(self.fail(DocumentErrorKind::NoValueProduced));
                };
                construction.construct(values).map_err(|kind| self.fail(kind))?
            }
        };

        for pending in leftovers {
            let field = record.properties()[pending.index].field();
            let Err(value) = field.set(&mut *instance, pending.value) else {
                continue;
            };
            let appended = match (field.collection_mut(&mut *instance), field.shape().as_list()) {
                (Some(list), Some(info)) => info.append(list, value).is_ok(),
                _ => false,
            };
            if !appended {
                log::debug!(
                    "dropping value of `{}.{}`: no mutator",
                    plan.shape().type_path(),
                    field.name()
                );
            }
        }
        Ok(instance)
    }

    fn read_dynamic(&mut self, attributes: Attributes, decrypt: bool) -> Result<DynamicValue, MapError> {
        let flavor = self.cursor.flavor();
        let mut members: Vec<(String, DynamicValue)> = attributes
            .into_iter()
            .filter(|(name, _)| !flavor.is_reserved_attribute(name))
            .map(|(name, value)| (name, DynamicValue::Text(value)))
            .collect();
        let mut text = String::new();

        let mut frame = Frame::new(self.cursor.depth(), decrypt);
        loop {
            match self.next_child(&mut frame)? {
                Child::End => break,
                Child::Text(chunk) => text.push_str(&chunk),
                Child::Element(name, attributes) => {
                    if attributes.iter().any(|(name, _)| name == ARRAY_ATTRIBUTE) {
                        self.read_dynamic_entries(name, &mut members)?;
                    } else {
                        let value = self.read_dynamic_member(attributes)?;
                        members.push((name, value));
                    }
                }
            }
        }

        Ok(match (members.is_empty(), text.is_empty()) {
            (true, false) => DynamicValue::Text(text),
            (true, true) if self.cx.options.treat_empty_element_as_string() => DynamicValue::Text(text),
            (true, true) => DynamicValue::object(),
            (false, true) => DynamicValue::Object(members),
            (false, false) => {
                members.push((String::from(TEXT_MEMBER), DynamicValue::Text(text)));
                DynamicValue::Object(members)
            }
        })
    }

    fn read_dynamic_member(&mut self, attributes: Attributes) -> Result<DynamicValue, MapError> {
        if self.is_nil(&attributes) {
            self.skip_element()?;
            return Ok(DynamicValue::Null);
        }
        self.read_dynamic(attributes, false)
    }

    /// Reads the entries of an array as repeated members called `name`.
    fn read_dynamic_entries(&mut self, name: String, members: &mut Vec<(String, DynamicValue)>) -> Result<(), MapError> {
        let before = members.len();
        let mut frame = Frame::new(self.cursor.depth(), false);
        loop {
            match self.next_child(&mut frame)? {
                Child::End => break,
                Child::Text(_) => {}
                Child::Element(_, attributes) => {
                    let value = self.read_dynamic_member(attributes)?;
                    members.push((name.clone(), value));
                }
            }
        }
        if members.len() == before {
            let empty = if self.cx.options.treat_empty_element_as_string() {
                DynamicValue::Text(String::new())
            } else {
                DynamicValue::object()
            };
            members.push((name, empty));
        }
        Ok(())
    }
}
