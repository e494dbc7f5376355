use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::mem;

use serde_json::{Map, Number, Value};

use super::TEXT_MEMBER;
use crate::{Flavor, MarkupError, MarkupWriter, TextKind};

#[derive(Default)]
struct Frame {
    capture: bool,
    members: Map<String, Value>,
    text: Option<(String, TextKind)>,
    nil: bool,
    list: Option<Vec<Value>>,
}

fn typed(value: &str, kind: TextKind) -> Value {
    match kind {
        // A number `serde_json` cannot hold exactly stays a string.
        TextKind::Number => match value.parse::<Number>() {
            Ok(number) if number.to_string() == value => Value::Number(number),
            _ => {
                log::debug!("writing number `{value}` as a string");
                Value::String(String::from(value))
            }
        },
        TextKind::Boolean => match value {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(String::from(value)),
        },
        TextKind::String => Value::String(String::from(value)),
    }
}

impl Frame {
    fn is_empty(&self) -> bool {
        !self.nil && self.list.is_none() && self.text.is_none() && self.members.is_empty()
    }

    fn into_value(self) -> Value {
        if self.nil {
            return Value::Null;
        }
        if let Some(items) = self.list {
            return Value::Array(items);
        }
        let text = self.text.map(|(text, kind)| typed(&text, kind));
        let mut members = self.members;
        match text {
            Some(text) if members.is_empty() => text,
            Some(text) => {
                members.insert(String::from(TEXT_MEMBER), text);
                Value::Object(members)
            }
            None => Value::Object(members),
        }
    }

    fn attach(&mut self, name: String, value: Value) {
        if let Some(items) = &mut self.list {
            items.push(value);
            return;
        }
        if let Some(existing) = self.members.get_mut(&name) {
            match existing {
                Value::Array(items) => items.push(value),
                _ => {
                    let first = mem::take(existing);
                    *existing = Value::Array(vec![first, value]);
                }
            }
            return;
        }
        self.members.insert(name, value);
    }
}

/// Writes JSON text.
///
/// # Examples
///
/// ```
/// use vc_markup::{MarkupWriter, TextKind};
/// use vc_markup::json::JsonWriter;
///
/// let mut writer = JsonWriter::new();
/// writer.begin_element("Pet").unwrap();
/// writer.type_tag("Dog").unwrap();
/// writer.attribute("Age", "3", TextKind::Number).unwrap();
/// writer.begin_element("Name").unwrap();
/// writer.text("Rex", TextKind::String).unwrap();
/// writer.end_element().unwrap();
/// writer.end_element().unwrap();
/// assert_eq!(writer.finish().unwrap(), r#"{"$type":"Dog","Age":3,"Name":"Rex"}"#);
/// ```
#[derive(Default)]
pub struct JsonWriter {
    frames: Vec<(String, Frame)>,
    document: Option<Value>,
    pretty: bool,
}

impl JsonWriter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indents the completed document.
    #[inline]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn top(&mut self) -> Result<&mut Frame, MarkupError> {
        self.frames
            .last_mut()
            .map(|(_, frame)| frame)
            .ok_or(MarkupError::NoOpenElement)
    }
}

impl MarkupWriter for JsonWriter {
    #[inline]
    fn flavor(&self) -> Flavor {
        Flavor::Json
    }

    fn begin_element(&mut self, name: &str) -> Result<(), MarkupError> {
        if self.frames.is_empty() && self.document.is_some() {
            return Err(MarkupError::MultipleRoots);
        }
        self.frames.push((String::from(name), Frame::default()));
        Ok(())
    }

    fn attribute(&mut self, name: &str, value: &str, kind: TextKind) -> Result<(), MarkupError> {
        let frame = self.top()?;
        frame.members.insert(String::from(name), typed(value, kind));
        Ok(())
    }

    fn nil(&mut self) -> Result<(), MarkupError> {
        self.top()?.nil = true;
        Ok(())
    }

    fn text(&mut self, value: &str, kind: TextKind) -> Result<(), MarkupError> {
        let frame = self.top()?;
        match &mut frame.text {
            Some((text, _)) => text.push_str(value),
            None => frame.text = Some((String::from(value), kind)),
        }
        Ok(())
    }

    fn end_element(&mut self) -> Result<(), MarkupError> {
        match self.frames.last() {
            Some((_, frame)) if !frame.capture => {}
            _ => return Err(MarkupError::NoOpenElement),
        }
        let Some((name, frame)) = self.frames.pop() else {
            return Err(MarkupError::NoOpenElement);
        };
        let value = frame.into_value();

        match self.frames.last_mut() {
            Some((_, parent)) => parent.attach(name, value),
            None => self.document = Some(value),
        }
        Ok(())
    }

    fn begin_list(&mut self) -> Result<(), MarkupError> {
        let frame = self.top()?;
        if frame.list.is_none() {
            frame.list = Some(Vec::new());
        }
        Ok(())
    }

    fn begin_capture(&mut self) -> Result<(), MarkupError> {
        self.frames.push((
            String::new(),
            Frame {
                capture: true,
                ..Frame::default()
            },
        ));
        Ok(())
    }

    fn end_capture(&mut self) -> Result<String, MarkupError> {
        let open = self.frames.iter().rev().take_while(|(_, frame)| !frame.capture).count();
        if open == self.frames.len() {
            return Err(MarkupError::NoCapture);
        }
        if open > 0 {
            return Err(MarkupError::UnclosedCapture(open));
        }
        let Some((_, frame)) = self.frames.pop() else {
            return Err(MarkupError::NoCapture);
        };
        if frame.is_empty() {
            return Ok(String::new());
        }
        Ok(serde_json::to_string(&frame.into_value())?)
    }

    fn finish(&mut self) -> Result<String, MarkupError> {
        if self.frames.iter().any(|(_, frame)| frame.capture) {
            return Err(MarkupError::UnclosedCapture(self.frames.len()));
        }
        if !self.frames.is_empty() {
            return Err(MarkupError::UnclosedElements(self.frames.len()));
        }
        let document = self.document.take().unwrap_or(Value::Null);
        let text = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MarkupReader, Token};

    #[test]
    fn lists_and_nil() {
        let mut writer = JsonWriter::new();
        writer.begin_element("Root").unwrap();
        writer.begin_element("Tags").unwrap();
        writer.begin_list().unwrap();
        for tag in ["a", "b"] {
            writer.begin_element("Tag").unwrap();
            writer.text(tag, TextKind::String).unwrap();
            writer.end_element().unwrap();
        }
        writer.end_list().unwrap();
        writer.end_element().unwrap();
        writer.begin_element("Note").unwrap();
        writer.nil().unwrap();
        writer.end_element().unwrap();
        writer.begin_element("Ok").unwrap();
        writer.text("true", TextKind::Boolean).unwrap();
        writer.end_element().unwrap();
        writer.end_element().unwrap();
        assert_eq!(
            writer.finish().unwrap(),
            r#"{"Tags":["a","b"],"Note":null,"Ok":true}"#
        );
    }

    #[test]
    fn repeated_members_become_arrays() {
        let mut writer = JsonWriter::new();
        writer.begin_element("").unwrap();
        for n in ["1", "2", "3"] {
            writer.begin_element("N").unwrap();
            writer.text(n, TextKind::Number).unwrap();
            writer.end_element().unwrap();
        }
        writer.end_element().unwrap();
        assert_eq!(writer.finish().unwrap(), r#"{"N":[1,2,3]}"#);
    }

    #[test]
    fn inexact_numbers_stay_strings() {
        let mut writer = JsonWriter::new();
        writer.begin_element("").unwrap();
        for (name, n) in [("Big", "340282366920938463463374607431768211455"), ("Tiny", "0.0000001"), ("Half", "0.5")] {
            writer.begin_element(name).unwrap();
            writer.text(n, TextKind::Number).unwrap();
            writer.end_element().unwrap();
        }
        writer.end_element().unwrap();
        assert_eq!(
            writer.finish().unwrap(),
            r#"{"Big":"340282366920938463463374607431768211455","Tiny":"0.0000001","Half":0.5}"#
        );
    }

    #[test]
    fn capture_returns_members() {
        let mut writer = JsonWriter::new();
        writer.begin_element("").unwrap();
        writer.type_tag("Card").unwrap();
        writer.begin_capture().unwrap();
        writer.attribute("Pin", "12", TextKind::Number).unwrap();
        writer.begin_element("Holder").unwrap();
        writer.text("Al", TextKind::String).unwrap();
        writer.end_element().unwrap();
        let captured = writer.end_capture().unwrap();
        assert_eq!(captured, r#"{"Pin":12,"Holder":"Al"}"#);
        writer.text("CIPHER", TextKind::String).unwrap();
        writer.end_element().unwrap();
        assert_eq!(
            writer.finish().unwrap(),
            r##"{"$type":"Card","#text":"CIPHER"}"##
        );

        let mut fragment = crate::json::read_fragment(&captured).unwrap();
        assert_eq!(fragment.next_token().unwrap(), Some(Token::Start("Pin".into())));
    }

    #[test]
    fn empty_capture_is_empty() {
        let mut writer = JsonWriter::new();
        writer.begin_element("").unwrap();
        writer.begin_capture().unwrap();
        assert_eq!(writer.end_capture().unwrap(), "");
        writer.end_element().unwrap();
        assert_eq!(writer.finish().unwrap(), "{}");
    }

    #[test]
    fn capture_must_close_its_elements() {
        let mut writer = JsonWriter::new();
        writer.begin_element("").unwrap();
        assert!(matches!(writer.end_capture(), Err(MarkupError::NoCapture)));
        writer.begin_capture().unwrap();
        writer.begin_element("A").unwrap();
        assert!(matches!(writer.end_capture(), Err(MarkupError::UnclosedCapture(1))));
    }
}
