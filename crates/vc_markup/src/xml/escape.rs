use alloc::borrow::Cow;
use alloc::string::String;

use crate::{MarkupError, Position};

pub(super) fn escape_text(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

pub(super) fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '\t' => out.push_str("&#x9;"),
            _ => out.push(c),
        }
    }
}

/// Resolves predefined and numeric character references.
pub(super) fn unescape(value: &str, position: impl Fn() -> Position) -> Result<Cow<'_, str>, MarkupError> {
    if !value.contains('&') {
        return Ok(Cow::Borrowed(value));
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp + 1..];

        let invalid = |entity: &str| MarkupError::InvalidEntity {
            entity: String::from(entity),
            position: position(),
        };
        let semi = rest.find(';').ok_or_else(|| invalid(rest))?;
        let entity = &rest[..semi];
        let resolved = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32).ok_or_else(|| invalid(entity))?
            }
        };
        out.push(resolved);
        rest = &rest[semi + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_then_unescape() {
        let mut out = String::new();
        escape_attribute("a<\"b\">&\n", &mut out);
        assert_eq!(out, "a&lt;&quot;b&quot;&gt;&amp;&#xA;");
        assert_eq!(unescape(&out, Position::default).unwrap(), "a<\"b\">&\n");
    }

    #[test]
    fn numeric_references() {
        assert_eq!(unescape("&#65;&#x42;&apos;", Position::default).unwrap(), "AB'");
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let err = unescape("x &nbsp; y", Position::default).unwrap_err();
        assert!(matches!(err, MarkupError::InvalidEntity { entity, .. } if entity == "nbsp"));
    }
}
