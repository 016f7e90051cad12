//! Minimal XML writing and reading helpers for the package parts.

use std::borrow::Cow;

use log::warn;

use crate::error::{Error, Result};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

/// Streaming writer for well-formed XML fragments.
///
/// Element nesting is the caller's responsibility; the writer only takes care of escaping.
pub(crate) struct XmlWriter {
    buf: String,
}

impl XmlWriter {
    /// Starts a new part with the XML declaration.
    pub(crate) fn new() -> Self {
        Self {
            buf: String::from(DECLARATION),
        }
    }

    /// Writes `<name attrs...>`.
    pub(crate) fn open(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.start_tag(name, attrs);
        self.buf.push('>');
    }

    /// Writes `<name attrs.../>`.
    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.start_tag(name, attrs);
        self.buf.push_str("/>");
    }

    /// Writes `</name>`.
    pub(crate) fn close(&mut self, name: &str) {
        self.buf.push_str("</");
        self.buf.push_str(name);
        self.buf.push('>');
    }

    /// Writes escaped character data.
    pub(crate) fn text(&mut self, text: &str) {
        self.buf.push_str(&escape(&sanitize(text)));
    }

    /// Writes `<name>text</name>`.
    pub(crate) fn element(&mut self, name: &str, text: &str) {
        self.open(name, &[]);
        self.text(text);
        self.close(name);
    }

    /// Returns the finished part.
    pub(crate) fn finish(self) -> String {
        self.buf
    }

    fn start_tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.buf.push('<');
        self.buf.push_str(name);
        for (key, value) in attrs {
            self.buf.push(' ');
            self.buf.push_str(key);
            self.buf.push_str("=\"");
            self.buf.push_str(&escape(&sanitize(value)));
            self.buf.push('"');
        }
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || ('\u{20}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || c >= '\u{10000}'
}

/// Drops characters XML 1.0 cannot represent, warning once per affected string.
pub(crate) fn sanitize(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    let cleaned: String = text.chars().filter(|c| is_xml_char(*c)).collect();
    warn!(
        "dropped {} character(s) that cannot be stored in the document",
        text.chars().count() - cleaned.chars().count()
    );
    Cow::Owned(cleaned)
}

/// Escapes markup characters for use in text and double-quoted attributes.
pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Reverses [`escape`], also accepting numeric character references.
pub(crate) fn unescape(text: &str) -> Result<Cow<'_, str>> {
    if !text.contains('&') {
        return Ok(Cow::Borrowed(text));
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| Error::Parse(format!("unterminated entity in {:?}", text)))?;
        let entity = &after[..semi];
        let decoded = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            numeric => decode_numeric(numeric)
                .ok_or_else(|| Error::Parse(format!("unknown entity &{};", numeric)))?,
        };
        out.push(decoded);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

fn decode_numeric(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// A start, end or empty-element tag found by [`Tags`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Tag<'a> {
    pub(crate) name: &'a str,
    attrs: &'a str,
    pub(crate) closing: bool,
    pub(crate) self_closing: bool,
}

impl<'a> Tag<'a> {
    /// Returns the raw (still escaped) value of a double-quoted attribute.
    pub(crate) fn attr(&self, key: &str) -> Option<&'a str> {
        let mut rest = self.attrs;
        while let Some(position) = rest.find(key) {
            let boundary = position == 0
                || rest[..position]
                    .chars()
                    .next_back()
                    .map_or(true, char::is_whitespace);
            let after = &rest[position + key.len()..];
            if boundary {
                if let Some(value) = after.strip_prefix("=\"") {
                    return value.find('"').map(|end| &value[..end]);
                }
            }
            rest = after;
        }
        None
    }
}

/// Iterator over the tags of an XML string, each paired with the character data preceding it.
///
/// Declarations, comments and processing instructions are skipped.
pub(crate) struct Tags<'a> {
    rest: &'a str,
}

impl<'a> Tags<'a> {
    pub(crate) fn new(xml: &'a str) -> Self {
        Self { rest: xml }
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = Result<(&'a str, Tag<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = self.rest.find('<')?;
            let text = &self.rest[..start];
            let Some(len) = self.rest[start..].find('>') else {
                self.rest = "";
                return Some(Err(Error::Parse("unterminated tag".into())));
            };
            let inner = &self.rest[start + 1..start + len];
            self.rest = &self.rest[start + len + 1..];

            if inner.starts_with('?') || inner.starts_with('!') {
                continue;
            }

            let (closing, inner) = match inner.strip_prefix('/') {
                Some(stripped) => (true, stripped),
                None => (false, inner),
            };
            let (self_closing, inner) = match inner.strip_suffix('/') {
                Some(stripped) => (true, stripped),
                None => (false, inner),
            };
            let (name, attrs) = match inner.find(char::is_whitespace) {
                Some(split) => (&inner[..split], inner[split..].trim()),
                None => (inner, ""),
            };

            return Some(Ok((
                text,
                Tag {
                    name,
                    attrs,
                    closing,
                    self_closing,
                },
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_escapes_text_and_attributes() {
        let mut writer = XmlWriter::new();
        writer.open("w:p", &[("w:val", "a\"b")]);
        writer.text("x < y & z");
        writer.close("w:p");
        let xml = writer.finish();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.ends_with("<w:p w:val=\"a&quot;b\">x &lt; y &amp; z</w:p>"));
    }

    #[test]
    fn sanitize_drops_control_characters() {
        assert_eq!(sanitize("ok\ttext"), "ok\ttext");
        assert_eq!(sanitize("bad\u{0}\u{7}text"), "badtext");
        assert_eq!(sanitize("\u{FFFE}x"), "x");
    }

    #[test]
    fn unescape_reverses_escape() {
        let original = "∇L < 0 & \"phase\" 'coherence' > 1";
        let escaped = escape(original);
        assert_eq!(unescape(&escaped).expect("valid entities"), original);
        assert_eq!(unescape("&#916;&#x3b1;").expect("numeric"), "Δα");
        assert!(unescape("&bogus;").is_err());
        assert!(unescape("&amp").is_err());
    }

    #[test]
    fn tags_split_names_attributes_and_text() {
        let xml = "<?xml version=\"1.0\"?><w:p><w:pStyle w:val=\"Heading1\"/><w:t xml:space=\"preserve\">Hi</w:t></w:p>";
        let tags: Vec<_> = Tags::new(xml).collect::<Result<_>>().expect("well formed");
        assert_eq!(tags.len(), 5);
        assert_eq!(tags[0].1.name, "w:p");
        assert_eq!(tags[1].1.attr("w:val"), Some("Heading1"));
        assert!(tags[1].1.self_closing);
        assert_eq!(tags[3].0, "Hi");
        assert!(tags[3].1.closing);
        assert_eq!(tags[3].1.name, "w:t");
    }

    #[test]
    fn attr_requires_word_boundary() {
        let xml = "<w:br xw:type=\"x\" w:type=\"page\"/>";
        let (_, tag) = Tags::new(xml).next().expect("one tag").expect("valid");
        assert_eq!(tag.attr("w:type"), Some("page"));
    }
}
