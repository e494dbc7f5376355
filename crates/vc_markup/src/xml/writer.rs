use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::mem;

use super::XSI_NAMESPACE;
use super::escape::{escape_attribute, escape_text};
use crate::{Flavor, MarkupError, MarkupWriter, TextKind};

struct Open {
    name: String,
    has_children: bool,
    /// Text was written, so no indentation may be added inside.
    has_text: bool,
}

/// Writes XML text.
///
/// The root element declares the `xsi` namespace and, when configured, a
/// default namespace. Captured content and elements holding text are never
/// indented.
///
/// # Examples
///
/// ```
/// use vc_markup::{MarkupWriter, TextKind};
/// use vc_markup::xml::XmlWriter;
///
/// let mut writer = XmlWriter::new();
/// writer.begin_element("a").unwrap();
/// writer.attribute("k", "<v>", TextKind::String).unwrap();
/// writer.text("1 & 2", TextKind::Number).unwrap();
/// writer.end_element().unwrap();
/// assert_eq!(
///     writer.finish().unwrap(),
///     r#"<a xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" k="&lt;v&gt;">1 &amp; 2</a>"#,
/// );
/// ```
pub struct XmlWriter {
    sinks: Vec<String>,
    open: Vec<Open>,
    captures: Vec<usize>,
    in_tag: bool,
    root_written: bool,
    indent: Option<String>,
    default_namespace: Option<String>,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            sinks: vec![String::new()],
            open: Vec::new(),
            captures: Vec::new(),
            in_tag: false,
            root_written: false,
            indent: None,
            default_namespace: None,
        }
    }

    /// Indents nested elements with `unit`, one level per depth.
    pub fn with_indent(mut self, unit: impl Into<String>) -> Self {
        self.indent = Some(unit.into());
        self
    }

    /// Declares `namespace` as the default namespace of the root element.
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = Some(namespace.into());
        self
    }

    fn sink(&mut self) -> &mut String {
        // There is always at least the document sink.
        let last = self.sinks.len() - 1;
        &mut self.sinks[last]
    }

    fn close_tag(&mut self) {
        if self.in_tag {
            self.in_tag = false;
            self.sink().push('>');
        }
    }

    fn newline(&mut self, depth: usize) {
        if !self.captures.is_empty() {
            return;
        }
        let Some(unit) = self.indent.take() else {
            return;
        };
        let sink = self.sink();
        sink.push('\n');
        for _ in 0..depth {
            sink.push_str(&unit);
        }
        self.indent = Some(unit);
    }

    fn capture_floor(&self) -> usize {
        self.captures.last().copied().unwrap_or(0)
    }
}

impl MarkupWriter for XmlWriter {
    #[inline]
    fn flavor(&self) -> Flavor {
        Flavor::Xml
    }

    fn begin_element(&mut self, name: &str) -> Result<(), MarkupError> {
        let is_root = self.open.is_empty() && self.captures.is_empty();
        if is_root && self.root_written {
            return Err(MarkupError::MultipleRoots);
        }

        self.close_tag();
        let indented = match self.open.last_mut() {
            Some(parent) => {
                parent.has_children = true;
                !parent.has_text
            }
            None => false,
        };
        if indented {
            self.newline(self.open.len());
        }

        let namespace = if is_root {
            self.default_namespace.clone()
        } else {
            None
        };
        let sink = self.sink();
        sink.push('<');
        sink.push_str(name);
        if is_root {
            sink.push_str(" xmlns:xsi=\"");
            sink.push_str(XSI_NAMESPACE);
            sink.push('"');
            if let Some(namespace) = namespace {
                sink.push_str(" xmlns=\"");
                escape_attribute(&namespace, sink);
                sink.push('"');
            }
        }

        self.open.push(Open {
            name: String::from(name),
            has_children: false,
            has_text: false,
        });
        self.in_tag = true;
        Ok(())
    }

    fn attribute(&mut self, name: &str, value: &str, _kind: TextKind) -> Result<(), MarkupError> {
        if !self.in_tag {
            return Err(MarkupError::AttributeAfterContent(String::from(name)));
        }
        let sink = self.sink();
        sink.push(' ');
        sink.push_str(name);
        sink.push_str("=\"");
        escape_attribute(value, sink);
        sink.push('"');
        Ok(())
    }

    fn nil(&mut self) -> Result<(), MarkupError> {
        self.attribute(Flavor::Xml.nil_attribute(), "true", TextKind::Boolean)
    }

    fn text(&mut self, value: &str, _kind: TextKind) -> Result<(), MarkupError> {
        if self.open.is_empty() && self.captures.is_empty() {
            return Err(MarkupError::NoOpenElement);
        }
        self.close_tag();
        if let Some(open) = self.open.last_mut()
            && !value.is_empty()
        {
            open.has_text = true;
        }
        escape_text(value, self.sink());
        Ok(())
    }

    fn end_element(&mut self) -> Result<(), MarkupError> {
        if self.open.len() <= self.capture_floor() {
            return Err(MarkupError::NoOpenElement);
        }
        let Some(open) = self.open.pop() else {
            return Err(MarkupError::NoOpenElement);
        };

        if mem::take(&mut self.in_tag) {
            self.sink().push_str(" />");
        } else {
            if open.has_children && !open.has_text {
                self.newline(self.open.len());
            }
            let sink = self.sink();
            sink.push_str("</");
            sink.push_str(&open.name);
            sink.push('>');
        }

        if self.open.is_empty() && self.captures.is_empty() {
            self.root_written = true;
        }
        Ok(())
    }

    fn begin_capture(&mut self) -> Result<(), MarkupError> {
        self.close_tag();
        self.captures.push(self.open.len());
        self.sinks.push(String::new());
        Ok(())
    }

    fn end_capture(&mut self) -> Result<String, MarkupError> {
        let Some(depth) = self.captures.pop() else {
            return Err(MarkupError::NoCapture);
        };
        if self.open.len() != depth {
            return Err(MarkupError::UnclosedCapture(self.open.len() - depth));
        }
        // Ensured by the capture being open.
        let captured = self.sinks.pop().unwrap_or_default();
        Ok(captured)
    }

    fn finish(&mut self) -> Result<String, MarkupError> {
        if !self.captures.is_empty() {
            return Err(MarkupError::UnclosedCapture(self.captures.len()));
        }
        if !self.open.is_empty() {
            return Err(MarkupError::UnclosedElements(self.open.len()));
        }
        Ok(mem::take(self.sink()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MarkupReader, Token};

    #[test]
    fn empty_elements_are_self_closed() {
        let mut writer = XmlWriter::new().with_default_namespace("urn:x");
        writer.begin_element("r").unwrap();
        writer.begin_element("e").unwrap();
        writer.nil().unwrap();
        writer.end_element().unwrap();
        writer.end_element().unwrap();
        assert_eq!(
            writer.finish().unwrap(),
            r#"<r xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns="urn:x"><e xsi:nil="true" /></r>"#
        );
    }

    #[test]
    fn indentation() {
        let mut writer = XmlWriter::new().with_indent("  ");
        writer.begin_element("r").unwrap();
        writer.begin_element("a").unwrap();
        writer.text("1", TextKind::Number).unwrap();
        writer.end_element().unwrap();
        writer.begin_element("b").unwrap();
        writer.end_element().unwrap();
        writer.end_element().unwrap();
        let out = writer.finish().unwrap();
        assert!(out.ends_with(">\n  <a>1</a>\n  <b />\n</r>"), "{out}");
    }

    #[test]
    fn mixed_content_is_not_indented() {
        let mut writer = XmlWriter::new().with_indent("  ");
        writer.begin_element("r").unwrap();
        writer.begin_element("m").unwrap();
        writer.text("hello", TextKind::String).unwrap();
        writer.begin_element("b").unwrap();
        writer.text("x", TextKind::String).unwrap();
        writer.end_element().unwrap();
        writer.end_element().unwrap();
        writer.end_element().unwrap();
        let out = writer.finish().unwrap();
        assert!(out.ends_with(">\n  <m>hello<b>x</b></m>\n</r>"), "{out}");
    }

    #[test]
    fn capture_collects_siblings() {
        let mut writer = XmlWriter::new().with_indent("  ");
        writer.begin_element("r").unwrap();
        writer.attribute("id", "1", TextKind::Number).unwrap();
        writer.begin_capture().unwrap();
        writer.begin_element("a").unwrap();
        writer.text("x", TextKind::String).unwrap();
        writer.end_element().unwrap();
        writer.begin_element("b").unwrap();
        writer.end_element().unwrap();
        let captured = writer.end_capture().unwrap();
        assert_eq!(captured, "<a>x</a><b />");
        writer.text(&captured, TextKind::String).unwrap();
        writer.end_element().unwrap();

        let out = writer.finish().unwrap();
        assert!(out.ends_with(r#" id="1">&lt;a&gt;x&lt;/a&gt;&lt;b /&gt;</r>"#), "{out}");

        let mut fragment = crate::xml::read_fragment(&captured).unwrap();
        assert_eq!(fragment.next_token().unwrap(), Some(Token::Start("a".into())));
    }

    #[test]
    fn misuse_is_reported() {
        let mut writer = XmlWriter::new();
        writer.begin_element("r").unwrap();
        writer.text("x", TextKind::String).unwrap();
        assert!(matches!(
            writer.attribute("late", "1", TextKind::Number),
            Err(MarkupError::AttributeAfterContent(_))
        ));
        assert!(matches!(writer.end_capture(), Err(MarkupError::NoCapture)));
        assert!(matches!(writer.finish(), Err(MarkupError::UnclosedElements(1))));
        writer.end_element().unwrap();
        assert!(matches!(writer.begin_element("again"), Err(MarkupError::MultipleRoots)));
    }
}
