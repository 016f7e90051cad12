//! Utilities for working with styled text fragments.
//!
//! A paragraph is a sequence of [`Span`]s, each carrying its own [`Style`] overrides on top of the
//! paragraph's resolved style.  This is how mixed runs such as a bold `Keywords: ` label followed
//! by plain text are expressed.  [`parse_markup`] offers a compact way to write such paragraphs.

use std::borrow::Cow;

use thiserror::Error;

use crate::style::{Rgb, Style};

/// A slice of text together with inline style overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Span {
    text: String,
    style: Style,
}

impl Span {
    /// Creates a new span with the provided text and no overrides.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Creates a span with explicit overrides.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Returns the raw text contained in this span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the inline overrides of this span.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Returns whether the span forces bold text.
    pub fn is_bold(&self) -> bool {
        self.style.is_bold() == Some(true)
    }

    /// Returns whether the span forces italic text.
    pub fn is_italic(&self) -> bool {
        self.style.is_italic() == Some(true)
    }

    /// Returns the configured color for the span, if any.
    pub fn color(&self) -> Option<Rgb> {
        self.style.color()
    }

    /// Replaces the overrides and returns the updated span.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Convenience shorthand that marks the span as bold.
    pub fn bold(mut self) -> Self {
        self.style = self.style.bold();
        self
    }

    /// Convenience shorthand that marks the span as italic.
    pub fn italic(mut self) -> Self {
        self.style = self.style.italic();
        self
    }

    /// Convenience shorthand that assigns a color to the span.
    pub fn colored(mut self, color: Rgb) -> Self {
        self.style = self.style.colored(color);
        self
    }

    /// Convenience shorthand that overrides the font size (points).
    pub fn sized(mut self, size: f32) -> Self {
        self.style = self.style.with_size(size);
        self
    }

    /// Convenience shorthand that overrides the font family.
    pub fn font(mut self, family: impl Into<String>) -> Self {
        self.style = self.style.with_font_family(family);
        self
    }
}

impl From<&str> for Span {
    fn from(text: &str) -> Self {
        Span::new(text)
    }
}

impl From<String> for Span {
    fn from(text: String) -> Self {
        Span::new(text)
    }
}

/// Concatenates the text of all spans.
pub fn plain_text<'a, I>(spans: I) -> String
where
    I: IntoIterator<Item = &'a Span>,
{
    spans.into_iter().map(Span::text).collect()
}

/// Rewrites `\r\n` and lone `\r` line endings as `\n`.
pub fn normalize_line_breaks(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Errors reported by [`parse_markup`], with byte offsets into the input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    /// A `**`, `*` or `[color=…]{` was never closed.
    #[error("unterminated {kind} span opened at byte {start}")]
    Unterminated {
        /// `bold`, `italic` or `color`.
        kind: &'static str,
        /// Offset of the opening token.
        start: usize,
    },
    /// A closing `}` or `]` without a matching opener, or an unknown `[` directive.
    #[error("unexpected `{token}` at byte {index}")]
    Unexpected {
        /// The offending character.
        token: char,
        /// Its offset.
        index: usize,
    },
    /// A `[color=#RRGGBB]{` directive is malformed.
    #[error("malformed color directive at byte {index}: {reason}")]
    Color {
        /// Offset where the problem was found.
        index: usize,
        /// What was expected.
        reason: &'static str,
    },
}

impl MarkupError {
    /// Byte offset in the input where the problem was detected.
    pub fn index(&self) -> usize {
        match *self {
            MarkupError::Unterminated { start, .. } => start,
            MarkupError::Unexpected { index, .. } | MarkupError::Color { index, .. } => index,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Bold,
    Italic,
    Color,
}

impl Marker {
    fn closing(self) -> &'static str {
        match self {
            Marker::Bold => "**",
            Marker::Italic => "*",
            Marker::Color => "}",
        }
    }

    fn kind(self) -> &'static str {
        match self {
            Marker::Bold => "bold",
            Marker::Italic => "italic",
            Marker::Color => "color",
        }
    }
}

struct Frame {
    marker: Marker,
    start: usize,
    style: Style,
}

const COLOR_PREFIX: &str = "[color=#";

/// Parses a small markdown-like syntax into [`Span`]s.
///
/// `**bold**`, `*italic*` and `[color=#RRGGBB]{text}` are recognized and may be nested; the
/// innermost marker closes first.  A backslash makes the next character literal, so citations
/// are written as `\[1\]`.  Everything else is literal text.
///
/// ```
/// use paper_builder::richtext::parse_markup;
///
/// let spans = parse_markup("**Keywords:** fusion").unwrap();
/// assert_eq!(spans.len(), 2);
/// assert!(spans[0].is_bold());
/// ```
pub fn parse_markup(input: &str) -> Result<Vec<Span>, MarkupError> {
    let mut spans = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut buffer = String::new();
    let mut index = 0;

    while let Some(rest) = input.get(index..).filter(|rest| !rest.is_empty()) {
        let current = stack.last().map(|frame| frame.style.clone()).unwrap_or_default();

        if let Some(escaped) = rest.strip_prefix('\\') {
            // a trailing backslash stands for itself
            let ch = escaped.chars().next().unwrap_or('\\');
            buffer.push(ch);
            index += 1 + if escaped.is_empty() { 0 } else { ch.len_utf8() };
            continue;
        }

        if let Some(frame) = stack.last() {
            let closing = frame.marker.closing();
            if rest.starts_with(closing) {
                flush(&mut buffer, &mut spans, &current);
                stack.pop();
                index += closing.len();
                continue;
            }
        }

        let opened = if rest.starts_with("**") {
            Some((Marker::Bold, current.clone().bold(), 2))
        } else if rest.starts_with('*') {
            Some((Marker::Italic, current.clone().italic(), 1))
        } else if rest.starts_with("[color=") {
            let (color, length) = color_directive(input, index)?;
            Some((Marker::Color, current.clone().colored(color), length))
        } else {
            None
        };

        if let Some((marker, style, length)) = opened {
            flush(&mut buffer, &mut spans, &current);
            stack.push(Frame {
                marker,
                start: index,
                style,
            });
            index += length;
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        if matches!(ch, '[' | ']' | '}') {
            return Err(MarkupError::Unexpected { token: ch, index });
        }
        buffer.push(ch);
        index += ch.len_utf8();
    }

    if let Some(frame) = stack.pop() {
        return Err(MarkupError::Unterminated {
            kind: frame.marker.kind(),
            start: frame.start,
        });
    }
    flush(&mut buffer, &mut spans, &Style::new());
    Ok(spans)
}

fn flush(buffer: &mut String, spans: &mut Vec<Span>, style: &Style) {
    if !buffer.is_empty() {
        spans.push(Span::styled(std::mem::take(buffer), style.clone()));
    }
}

/// Parses `[color=#RRGGBB]{` at `index`, returning the color and the directive length.
fn color_directive(input: &str, index: usize) -> Result<(Rgb, usize), MarkupError> {
    let rest = &input[index..];
    if !rest.starts_with(COLOR_PREFIX) {
        return Err(MarkupError::Color {
            index: index + "[color=".len(),
            reason: "expected `#` and six hexadecimal digits",
        });
    }
    let hex_start = COLOR_PREFIX.len();
    let color = rest
        .get(hex_start..hex_start + 6)
        .and_then(Rgb::from_hex)
        .ok_or(MarkupError::Color {
            index: index + hex_start,
            reason: "expected six hexadecimal digits",
        })?;
    let tail = hex_start + 6;
    if !rest[tail..].starts_with("]{") {
        return Err(MarkupError::Color {
            index: index + tail,
            reason: "expected `]{` after the color",
        });
    }
    Ok((color, tail + 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_builders_set_overrides() {
        let span = Span::new("Hello")
            .bold()
            .italic()
            .sized(8.0)
            .colored(Rgb(10, 20, 30));
        assert_eq!(span.text(), "Hello");
        assert!(span.is_bold());
        assert!(span.is_italic());
        assert_eq!(span.style().size(), Some(8.0));
        assert_eq!(span.color(), Some(Rgb(10, 20, 30)));
    }

    #[test]
    fn plain_text_concatenates_spans() {
        let spans = [Span::new("Keywords: ").bold(), Span::new("fusion, detection")];
        assert_eq!(plain_text(&spans), "Keywords: fusion, detection");
    }

    #[test]
    fn parse_plain_text() {
        let spans = parse_markup("Hello world").expect("parse succeeds");
        assert_eq!(spans, vec![Span::new("Hello world")]);
    }

    #[test]
    fn parse_nested_styles() {
        let spans = parse_markup("This is **very *cool***!").expect("parse succeeds");
        let texts: Vec<_> = spans.iter().map(Span::text).collect();
        assert_eq!(texts, ["This is ", "very ", "cool", "!"]);
        assert!(!spans[0].is_bold());
        assert!(spans[1].is_bold() && !spans[1].is_italic());
        assert!(spans[2].is_bold() && spans[2].is_italic());
        assert!(!spans[3].is_bold());
    }

    #[test]
    fn parse_color_inside_bold() {
        let spans = parse_markup("**[color=#1F497D]{97.2%}** accuracy").expect("parse succeeds");
        assert_eq!(spans[0].text(), "97.2%");
        assert!(spans[0].is_bold());
        assert_eq!(spans[0].color(), Some(Rgb(0x1F, 0x49, 0x7D)));
        assert_eq!(spans[1].text(), " accuracy");
        assert_eq!(spans[1].color(), None);
    }

    #[test]
    fn parse_keeps_unicode_intact() {
        let spans = parse_markup("**∇L** ≈ ∑ αᵢ").expect("parse succeeds");
        assert_eq!(spans[0].text(), "∇L");
        assert_eq!(spans[1].text(), " ≈ ∑ αᵢ");
    }

    #[test]
    fn unterminated_marker_reports_its_opening() {
        assert_eq!(
            parse_markup("ok **oops").unwrap_err(),
            MarkupError::Unterminated {
                kind: "bold",
                start: 3
            }
        );
    }

    #[test]
    fn stray_closers_are_rejected() {
        let err = parse_markup("a } b").unwrap_err();
        assert_eq!(err, MarkupError::Unexpected { token: '}', index: 2 });
        assert!(matches!(
            parse_markup("[link]").unwrap_err(),
            MarkupError::Unexpected { token: '[', .. }
        ));
    }

    #[test]
    fn backslash_makes_markers_literal() {
        let spans = parse_markup(r"as shown in \[1\] and \*not italic\*").expect("parse succeeds");
        assert_eq!(spans, vec![Span::new("as shown in [1] and *not italic*")]);

        let spans = parse_markup(r"**a \} b** c:\\").expect("parse succeeds");
        assert_eq!(spans[0].text(), "a } b");
        assert!(spans[0].is_bold());
        assert_eq!(spans[1].text(), r" c:\");
        assert_eq!(parse_markup("end\\").expect("parse succeeds")[0].text(), "end\\");
    }

    #[test]
    fn line_breaks_are_normalized() {
        assert_eq!(normalize_line_breaks("a\r\nb\rc\n"), "a\nb\nc\n");
        assert!(matches!(normalize_line_breaks("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn malformed_colors_are_rejected() {
        let err = parse_markup("[color=#12FG34]{x}").unwrap_err();
        assert!(matches!(err, MarkupError::Color { index: 8, .. }));
        let err = parse_markup("[color=#12]").unwrap_err();
        assert!(matches!(err, MarkupError::Color { .. }));
        let err = parse_markup("[color=#123456]x").unwrap_err();
        assert_eq!(err.index(), 14);
    }
}
