//! Inline-styled text fragments used by the invoice layout.
//!
//! Profile texts may mark bold runs with `**…**`; [`parse_markup`] turns such a string into
//! [`Span`]s that the layout converts into [`genpdf`] styled strings.

use std::fmt;

use genpdf::style::{Color, Style, StyledString};

const BOLD_TOKEN: &str = "**";

/// A run of text sharing one set of inline attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    color: Option<Color>,
}

impl Span {
    /// Creates an unstyled span.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Marks the span as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Assigns a text color.
    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Converts the span into a [`StyledString`] carrying its attributes.
    pub fn to_styled_string(&self) -> StyledString {
        let mut style = Style::new();
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if self.bold {
            style.set_bold();
        }
        StyledString::new(self.text.clone(), style)
    }
}

impl From<&Span> for StyledString {
    fn from(span: &Span) -> Self {
        span.to_styled_string()
    }
}

impl From<Span> for StyledString {
    fn from(span: Span) -> Self {
        span.to_styled_string()
    }
}

/// A bold label followed by a regular value, e.g. `GSTIN: 27ABCFB7144F1ZM`.
pub fn label_value(label: &str, value: impl Into<String>) -> Vec<Span> {
    vec![Span::new(format!("{}: ", label)).bold(), Span::new(value)]
}

/// Error produced by [`parse_markup`] for an unbalanced bold marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    index: usize,
}

impl ParseError {
    /// Byte offset of the `**` that was never closed.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unterminated bold marker at byte {}", self.index)
    }
}

impl std::error::Error for ParseError {}

/// Splits `input` on `**` markers, alternating between regular and bold runs.
pub fn parse_markup(input: &str) -> Result<Vec<Span>, ParseError> {
    let mut spans = Vec::new();
    let mut rest = input;
    let mut offset = 0;
    let mut bold = false;

    while let Some(position) = rest.find(BOLD_TOKEN) {
        push_run(&mut spans, &rest[..position], bold);
        bold = !bold;
        offset += position + BOLD_TOKEN.len();
        rest = &rest[position + BOLD_TOKEN.len()..];
    }

    if bold {
        return Err(ParseError {
            index: offset - BOLD_TOKEN.len(),
        });
    }

    push_run(&mut spans, rest, false);
    Ok(spans)
}

fn push_run(spans: &mut Vec<Span>, text: &str, bold: bool) {
    if text.is_empty() {
        return;
    }
    let span = Span::new(text);
    spans.push(if bold { span.bold() } else { span });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_style_reflects_flags() {
        let styled = Span::new("Total")
            .bold()
            .colored(Color::Rgb(0x21, 0x41, 0x32))
            .to_styled_string();
        assert_eq!(styled.s, "Total");
        assert!(styled.style.is_bold());
        assert!(!styled.style.is_italic());
        assert_eq!(styled.style.color(), Some(Color::Rgb(0x21, 0x41, 0x32)));
    }

    #[test]
    fn label_value_bolds_only_the_label() {
        let spans = label_value("GSTIN", "27ABCFB7144F1ZM");
        assert_eq!(spans[0].text(), "GSTIN: ");
        assert!(spans[0].is_bold());
        assert_eq!(spans[1].text(), "27ABCFB7144F1ZM");
        assert!(!spans[1].is_bold());
    }

    #[test]
    fn parses_bold_runs() {
        let spans = parse_markup("**Payments:** Advance 25% **now**").expect("parse succeeds");
        let texts: Vec<_> = spans.iter().map(|s| (s.text(), s.is_bold())).collect();
        assert_eq!(
            texts,
            vec![
                ("Payments:", true),
                (" Advance 25% ", false),
                ("now", true)
            ]
        );
    }

    #[test]
    fn plain_text_is_one_span() {
        let spans = parse_markup("All rates are inclusive of taxes.").expect("parse succeeds");
        assert_eq!(spans, vec![Span::new("All rates are inclusive of taxes.")]);
        assert!(parse_markup("").expect("parse succeeds").is_empty());
    }

    #[test]
    fn reports_unterminated_marker() {
        let err = parse_markup("ok **broken").unwrap_err();
        assert_eq!(err.index(), 3);
    }
}
