use std::fmt::{self, Display};

use termion::color::{Bg, Fg};
use termion::style::{Bold, Italic, NoBold, NoItalic, NoUnderline, Underline};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::Colour;

/// Fancy text (styled)
///
/// Example:
///
/// ```
/// use threadline_cli::text::Fancy;
/// use threadline_cli::theme::Colour;
///
/// let fancy_text = Fancy::new("Hello").fg(Colour::Ansi(33)).bold();
/// assert_eq!(fancy_text.cols(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fancy {
    text: String,
    fg: Option<Colour>,
    bg: Option<Colour>,
    bold: bool,
    italic: bool,
    underline: bool,
}

impl Fancy {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Fancy {
            text: text.into(),
            fg: None,
            bg: None,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    pub fn fg(mut self, colour: Colour) -> Self {
        self.fg = Some(colour);
        self
    }

    pub fn bg(mut self, colour: Colour) -> Self {
        self.bg = Some(colour);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// The unstyled text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn get_bg(&self) -> Option<Colour> {
        self.bg
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of terminal columns the text occupies
    pub fn cols(&self) -> usize {
        self.text.width()
    }

    /// Keep at most `cols` columns from the start of the text
    pub fn truncate(&self, cols: usize) -> Fancy {
        let mut used = 0;
        let text = self
            .text
            .chars()
            .take_while(|c| {
                used += c.width().unwrap_or(0);
                used <= cols
            })
            .collect::<String>();

        self.with_text(text)
    }

    /// Drop `cols` columns from the start of the text
    pub fn truncate_front(&self, cols: usize) -> Fancy {
        let mut dropped = 0;
        let text = self
            .text
            .chars()
            .skip_while(|c| {
                if dropped >= cols {
                    return false;
                }
                dropped += c.width().unwrap_or(0);
                true
            })
            .collect::<String>();

        self.with_text(text)
    }

    fn with_text(&self, text: String) -> Fancy {
        Fancy {
            text,
            ..self.clone()
        }
    }
}

impl Display for Fancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(colour) = self.bg {
            write!(f, "{}", Bg(colour))?;
        }
        if let Some(colour) = self.fg {
            write!(f, "{}", Fg(colour))?;
        }
        if self.bold {
            write!(f, "{}", Bold)?;
        }
        if self.italic {
            write!(f, "{}", Italic)?;
        }
        if self.underline {
            write!(f, "{}", Underline)?;
        }

        write!(f, "{}", self.text)?;

        if self.underline {
            write!(f, "{}", NoUnderline)?;
        }
        if self.italic {
            write!(f, "{}", NoItalic)?;
        }
        if self.bold {
            write!(f, "{}", NoBold)?;
        }
        if self.fg.is_some() {
            write!(f, "{}", Fg(termion::color::Reset))?;
        }
        if self.bg.is_some() {
            write!(f, "{}", Bg(termion::color::Reset))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fancy_text() {
        let fancy_text = Fancy::new("Test")
            .fg(Colour::Ansi(15))
            .bg(Colour::Rgb(0, 0, 255))
            .bold()
            .underline()
            .italic();

        let expected = format!(
            "{}{}{}{}{}{}{}{}{}{}{}",
            Bg(termion::color::Rgb(0, 0, 255)),
            Fg(termion::color::AnsiValue(15)),
            Bold,
            Italic,
            Underline,
            "Test",
            NoUnderline,
            NoItalic,
            NoBold,
            Fg(termion::color::Reset),
            Bg(termion::color::Reset),
        );

        assert_eq!(fancy_text.to_string(), expected);
    }

    #[test]
    fn test_plain_text_has_no_escapes() {
        assert_eq!(Fancy::new("plain").to_string(), "plain");
    }

    #[test]
    fn test_truncate() {
        let text = Fancy::new("hello world").fg(Colour::Ansi(1));
        assert_eq!(text.truncate(5).text(), "hello");
        assert_eq!(text.truncate(5).fg, Some(Colour::Ansi(1)));
        assert_eq!(text.truncate(50).text(), "hello world");
        assert_eq!(text.truncate_front(6).text(), "world");
        assert!(text.truncate_front(11).is_empty());
    }

    #[test]
    fn test_wide_chars() {
        let text = Fancy::new("日本語");
        assert_eq!(text.cols(), 6);
        assert_eq!(text.truncate(3).text(), "日");
        assert_eq!(text.truncate_front(2).text(), "本語");
    }
}
