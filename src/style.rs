//! Text styles and their resolution.
//!
//! A [`Style`] is a set of *optional* overrides attached to a block, a table region, a cell or
//! an inline span.  An [`EffectiveStyle`] is the fully specified result that a serializer needs.
//! The two are connected by [`resolve`], a pure function evaluated at save time: there is no
//! shared, mutable "normal" style that appends would have to keep in sync.
//!
//! Resolution is layered.  Callers stack overrides with [`Style::merged_over`] (the receiver
//! wins) and resolve the stack against the document default once:
//!
//! ```
//! use paper_builder::style::{resolve, EffectiveStyle, Style};
//!
//! let default = EffectiveStyle::default();
//! let heading = Style::new().bold().with_size(14.0);
//! let own = Style::new().italic();
//! let effective = resolve(&own.merged_over(&heading), &default);
//! assert!(effective.bold && effective.italic);
//! assert_eq!(effective.size, 14.0);
//! ```

use std::fmt;

use log::warn;

/// Smallest font size (in points) accepted by word processors.
pub const MIN_FONT_SIZE_PT: f32 = 1.0;
/// Largest font size (in points) accepted by word processors.
pub const MAX_FONT_SIZE_PT: f32 = 1638.0;
/// Longest font family name a word processor will store.
pub const MAX_FONT_NAME_LEN: usize = 31;

/// Default body font.
pub const DEFAULT_FONT_FAMILY: &str = "Times New Roman";
/// Default monospace font used for diagrams.
pub const DEFAULT_MONOSPACE_FAMILY: &str = "Courier New";
/// Default body font size in points.
pub const DEFAULT_FONT_SIZE_PT: f32 = 11.0;

/// Horizontal alignment of paragraphs and cell content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
    /// Fully justified paragraphs.
    Justified,
}

/// A 24-bit RGB text color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Black.
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Returns the color as an upper-case `RRGGBB` hex string.
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// Parses a `RRGGBB` hex string (without the leading `#`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

/// Optional style overrides.  Unset attributes are inherited during [`resolve`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    font_family: Option<String>,
    size: Option<f32>,
    bold: Option<bool>,
    italic: Option<bool>,
    alignment: Option<HorizontalAlignment>,
    color: Option<Rgb>,
}

impl Style {
    /// Creates a style that overrides nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the font family override, if any.
    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }

    /// Returns the size override in points, if any.
    pub fn size(&self) -> Option<f32> {
        self.size
    }

    /// Returns the bold override, if any.
    pub fn is_bold(&self) -> Option<bool> {
        self.bold
    }

    /// Returns the italic override, if any.
    pub fn is_italic(&self) -> Option<bool> {
        self.italic
    }

    /// Returns the alignment override, if any.
    pub fn alignment(&self) -> Option<HorizontalAlignment> {
        self.alignment
    }

    /// Returns the color override, if any.
    pub fn color(&self) -> Option<Rgb> {
        self.color
    }

    /// Returns true when no attribute is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Sets the font family and returns the updated style.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Sets the size in points and returns the updated style.
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the bold flag and returns the updated style.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Sets the italic flag and returns the updated style.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    /// Sets the alignment and returns the updated style.
    pub fn aligned(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Sets the color and returns the updated style.
    pub fn colored(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Convenience shorthand that marks the style as bold.
    pub fn bold(self) -> Self {
        self.with_bold(true)
    }

    /// Convenience shorthand that marks the style as italic.
    pub fn italic(self) -> Self {
        self.with_italic(true)
    }

    /// Layers `self` on top of `base`: attributes set on `self` win.
    pub fn merged_over(&self, base: &Style) -> Style {
        Style {
            font_family: self.font_family.clone().or_else(|| base.font_family.clone()),
            size: self.size.or(base.size),
            bold: self.bold.or(base.bold),
            italic: self.italic.or(base.italic),
            alignment: self.alignment.or(base.alignment),
            color: self.color.or(base.color),
        }
    }

    /// Merges `other` into `self` in place; attributes set on `other` win.
    pub fn apply(&mut self, other: &Style) {
        *self = other.merged_over(self);
    }
}

/// A fully specified style, ready to be serialized.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveStyle {
    /// Font family name.
    pub font_family: String,
    /// Font size in points.
    pub size: f32,
    /// Bold weight.
    pub bold: bool,
    /// Italic slant.
    pub italic: bool,
    /// Horizontal alignment.
    pub alignment: HorizontalAlignment,
    /// Text color; `None` leaves the word processor's automatic color.
    pub color: Option<Rgb>,
}

impl Default for EffectiveStyle {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            size: DEFAULT_FONT_SIZE_PT,
            bold: false,
            italic: false,
            alignment: HorizontalAlignment::Left,
            color: None,
        }
    }
}

impl EffectiveStyle {
    /// Creates a default style with the given family and size.
    pub fn new(font_family: impl Into<String>, size: f32) -> Self {
        Self {
            font_family: font_family.into(),
            size,
            ..Self::default()
        }
    }

    /// Size expressed in half-points, the unit used by word processing formats.
    pub fn half_points(&self) -> u32 {
        (self.size * 2.0).round() as u32
    }

    /// Replaces attributes a word processor cannot represent with those of `fallback`.
    ///
    /// Each replacement is reported through `log::warn!`; serialization never fails because
    /// of a style value.
    pub fn sanitized(mut self, fallback: &EffectiveStyle) -> Self {
        if !font_family_supported(&self.font_family) {
            warn!(
                "unsupported font family {:?}; falling back to {:?}",
                self.font_family, fallback.font_family
            );
            self.font_family = fallback.font_family.clone();
        }
        if !font_size_supported(self.size) {
            warn!(
                "unsupported font size {}pt; falling back to {}pt",
                self.size, fallback.size
            );
            self.size = fallback.size;
        }
        self
    }
}

fn font_family_supported(family: &str) -> bool {
    let trimmed = family.trim();
    !trimmed.is_empty()
        && trimmed.chars().count() <= MAX_FONT_NAME_LEN
        && !trimmed.chars().any(char::is_control)
}

fn font_size_supported(size: f32) -> bool {
    size.is_finite() && (MIN_FONT_SIZE_PT..=MAX_FONT_SIZE_PT).contains(&size)
}

/// Resolves a block's overrides against the document default.
pub fn resolve(block_style: &Style, default: &EffectiveStyle) -> EffectiveStyle {
    EffectiveStyle {
        font_family: block_style
            .font_family
            .clone()
            .unwrap_or_else(|| default.font_family.clone()),
        size: block_style.size.unwrap_or(default.size),
        bold: block_style.bold.unwrap_or(default.bold),
        italic: block_style.italic.unwrap_or(default.italic),
        alignment: block_style.alignment.unwrap_or(default.alignment),
        color: block_style.color.or(default.color),
    }
}

/// Vertical spacing around a paragraph, in points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spacing {
    /// Space above the paragraph.
    pub before: f32,
    /// Space below the paragraph.
    pub after: f32,
}

impl Spacing {
    /// Creates spacing with the given values in points.
    pub fn new(before: f32, after: f32) -> Self {
        Self { before, after }
    }
}

/// Horizontal indentation of a paragraph, in points.
///
/// A negative `first_line` produces a hanging indent, as used for numbered references.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Indent {
    /// Indentation of every line from the left margin.
    pub left: f32,
    /// Additional indentation of the first line; negative values hang.
    pub first_line: f32,
}

impl Indent {
    /// Left indentation without first-line adjustment.
    pub fn left(left: f32) -> Self {
        Self {
            left,
            first_line: 0.0,
        }
    }

    /// Hanging indentation: every line but the first is indented by `amount`.
    pub fn hanging(amount: f32) -> Self {
        Self {
            left: amount,
            first_line: -amount,
        }
    }

    /// Returns true when the indent changes nothing.
    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.first_line == 0.0
    }
}

/// Structural role of a block, used to pick its theme style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Document title (heading level 0).
    Title,
    /// Section heading of the given level (1-based).
    Heading(u8),
    /// Ordinary body text.
    Body,
    /// Figure or table caption.
    Caption,
    /// Monospace diagram text.
    Diagram,
    /// Plain-text equation.
    Equation,
    /// Bibliography entry.
    Reference,
}

/// Base styles per [`Role`], layered between the document default and block overrides.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    title: Style,
    headings: Vec<Style>,
    body: Style,
    caption: Style,
    diagram: Style,
    equation: Style,
    reference: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::new()
                .bold()
                .with_size(16.0)
                .aligned(HorizontalAlignment::Center),
            headings: vec![
                Style::new().bold().with_size(12.0),
                Style::new().bold().with_size(11.0),
                Style::new().bold().italic().with_size(11.0),
            ],
            body: Style::new(),
            caption: Style::new().italic(),
            diagram: Style::new()
                .with_font_family(DEFAULT_MONOSPACE_FAMILY)
                .with_size(8.0)
                .aligned(HorizontalAlignment::Center),
            equation: Style::new().aligned(HorizontalAlignment::Center),
            reference: Style::new().with_size(9.0),
        }
    }
}

impl Theme {
    /// Returns the base style for `role`.
    ///
    /// Heading levels past the configured list reuse the last heading style.
    pub fn style_for(&self, role: Role) -> &Style {
        match role {
            Role::Title => &self.title,
            Role::Heading(level) => {
                let index = usize::from(level.max(1)) - 1;
                self.headings
                    .get(index)
                    .or_else(|| self.headings.last())
                    .unwrap_or(&self.body)
            }
            Role::Body => &self.body,
            Role::Caption => &self.caption,
            Role::Diagram => &self.diagram,
            Role::Equation => &self.equation,
            Role::Reference => &self.reference,
        }
    }

    /// Returns the default paragraph spacing for `role`.
    pub fn spacing_for(&self, role: Role) -> Spacing {
        match role {
            Role::Title => Spacing::new(0.0, 12.0),
            Role::Heading(1) => Spacing::new(12.0, 6.0),
            Role::Heading(2) => Spacing::new(9.0, 6.0),
            Role::Heading(_) => Spacing::new(6.0, 3.0),
            Role::Body => Spacing::new(0.0, 6.0),
            Role::Caption => Spacing::new(6.0, 6.0),
            Role::Diagram => Spacing::new(6.0, 6.0),
            Role::Equation => Spacing::new(3.0, 3.0),
            Role::Reference => Spacing::new(0.0, 3.0),
        }
    }

    /// Replaces the title style and returns the updated theme.
    pub fn with_title(mut self, style: Style) -> Self {
        self.title = style;
        self
    }

    /// Replaces the heading styles (index 0 is level 1) and returns the updated theme.
    pub fn with_headings(mut self, styles: impl Into<Vec<Style>>) -> Self {
        self.headings = styles.into();
        self
    }

    /// Replaces the body style and returns the updated theme.
    pub fn with_body(mut self, style: Style) -> Self {
        self.body = style;
        self
    }

    /// Replaces the caption style and returns the updated theme.
    pub fn with_caption(mut self, style: Style) -> Self {
        self.caption = style;
        self
    }

    /// Replaces the diagram style and returns the updated theme.
    pub fn with_diagram(mut self, style: Style) -> Self {
        self.diagram = style;
        self
    }

    /// Replaces the equation style and returns the updated theme.
    pub fn with_equation(mut self, style: Style) -> Self {
        self.equation = style;
        self
    }

    /// Replaces the reference style and returns the updated theme.
    pub fn with_reference(mut self, style: Style) -> Self {
        self.reference = style;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_inherits_unset_attributes() {
        let default = EffectiveStyle::new("Georgia", 10.0);
        let effective = resolve(&Style::new().bold(), &default);
        assert_eq!(effective.font_family, "Georgia");
        assert_eq!(effective.size, 10.0);
        assert!(effective.bold);
        assert!(!effective.italic);
    }

    #[test]
    fn merged_over_prefers_receiver() {
        let base = Style::new().with_size(12.0).bold();
        let own = Style::new().with_size(8.0).with_bold(false);
        let merged = own.merged_over(&base);
        assert_eq!(merged.size(), Some(8.0));
        assert_eq!(merged.is_bold(), Some(false));
    }

    #[test]
    fn apply_lets_argument_win() {
        let mut style = Style::new().with_size(12.0);
        style.apply(&Style::new().with_size(7.0).italic());
        assert_eq!(style.size(), Some(7.0));
        assert_eq!(style.is_italic(), Some(true));
    }

    #[test]
    fn sanitized_falls_back_for_unsupported_values() {
        let fallback = EffectiveStyle::default();
        let style = EffectiveStyle::new("", f32::NAN).sanitized(&fallback);
        assert_eq!(style.font_family, DEFAULT_FONT_FAMILY);
        assert_eq!(style.size, DEFAULT_FONT_SIZE_PT);

        let long_name = "x".repeat(MAX_FONT_NAME_LEN + 1);
        let style = EffectiveStyle::new(long_name, 2000.0).sanitized(&fallback);
        assert_eq!(style.font_family, DEFAULT_FONT_FAMILY);
        assert_eq!(style.size, DEFAULT_FONT_SIZE_PT);
    }

    #[test]
    fn sanitized_keeps_supported_values() {
        let style = EffectiveStyle::new("Arial", 9.5).sanitized(&EffectiveStyle::default());
        assert_eq!(style.font_family, "Arial");
        assert_eq!(style.half_points(), 19);
    }

    #[test]
    fn rgb_hex_round_trip() {
        let color = Rgb(0x24, 0x5c, 0xa0);
        assert_eq!(color.hex(), "245CA0");
        assert_eq!(Rgb::from_hex("245ca0"), Some(color));
        assert_eq!(Rgb::from_hex("12FG34"), None);
        assert_eq!(Rgb::from_hex("123"), None);
    }

    #[test]
    fn theme_reuses_last_heading_style() {
        let theme = Theme::default();
        assert_eq!(theme.style_for(Role::Heading(7)), theme.style_for(Role::Heading(3)));
        assert_eq!(theme.style_for(Role::Heading(0)), theme.style_for(Role::Heading(1)));
    }

    #[test]
    fn hanging_indent_is_negative_first_line() {
        let indent = Indent::hanging(18.0);
        assert_eq!(indent.left, 18.0);
        assert_eq!(indent.first_line, -18.0);
        assert!(!indent.is_zero());
        assert!(Indent::default().is_zero());
    }
}
