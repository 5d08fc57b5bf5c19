use std::fmt;
use std::str::FromStr;

use termion::color::{AnsiValue, Color, Reset, Rgb};

use crate::error::ParseThemeError;

/// A terminal colour that is cheap to copy around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    /// One of the 256 palette colours
    Ansi(u8),
    /// 24-bit colour
    Rgb(u8, u8, u8),
    /// The terminal's default
    Reset,
}

impl Color for Colour {
    fn write_fg(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Colour::Ansi(value) => AnsiValue(value).write_fg(f),
            Colour::Rgb(r, g, b) => Rgb(r, g, b).write_fg(f),
            Colour::Reset => Reset.write_fg(f),
        }
    }

    fn write_bg(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Colour::Ansi(value) => AnsiValue(value).write_bg(f),
            Colour::Rgb(r, g, b) => Rgb(r, g, b).write_bg(f),
            Colour::Reset => Reset.write_bg(f),
        }
    }
}

pub struct Theme {
    pub score: Colour,
    pub title: Colour,
    pub author: Colour,
    pub byline: Colour,
    pub body: Colour,
    pub vote_up: Colour,
    pub vote_down: Colour,
    pub max_depth: Colour,
    pub status: Colour,
    pub cursor: Colour,
}

pub static THREADLINE_256: Theme = Theme {
    score: Colour::Ansi(248),
    title: Colour::Ansi(33),
    author: Colour::Ansi(229),
    byline: Colour::Ansi(245),
    body: Colour::Ansi(252),
    vote_up: Colour::Ansi(208),
    vote_down: Colour::Ansi(69),
    max_depth: Colour::Ansi(167),
    status: Colour::Ansi(250),
    cursor: Colour::Ansi(236),
};

pub static THREADLINE_TRUE: Theme = Theme {
    score: Colour::Rgb(170, 170, 170),
    title: Colour::Rgb(0, 135, 255),
    author: Colour::Rgb(255, 255, 175),
    byline: Colour::Rgb(138, 138, 138),
    body: Colour::Rgb(208, 208, 208),
    vote_up: Colour::Rgb(255, 135, 0),
    vote_down: Colour::Rgb(95, 135, 255),
    max_depth: Colour::Rgb(215, 95, 95),
    status: Colour::Rgb(188, 188, 188),
    cursor: Colour::Rgb(48, 48, 48),
};

pub static THREADLINE_MONO: Theme = Theme {
    score: Colour::Reset,
    title: Colour::Reset,
    author: Colour::Reset,
    byline: Colour::Reset,
    body: Colour::Reset,
    vote_up: Colour::Reset,
    vote_down: Colour::Reset,
    max_depth: Colour::Reset,
    status: Colour::Reset,
    cursor: Colour::Ansi(8),
};

pub static THREADLINE_GREY: Theme = Theme {
    score: Colour::Ansi(244),
    title: Colour::Ansi(255),
    author: Colour::Ansi(250),
    byline: Colour::Ansi(242),
    body: Colour::Ansi(252),
    vote_up: Colour::Ansi(255),
    vote_down: Colour::Ansi(240),
    max_depth: Colour::Ansi(246),
    status: Colour::Ansi(248),
    cursor: Colour::Ansi(237),
};

/// Theme chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiTheme {
    Grey,
    Color256,
    Mono,
    TrueColor,
}

impl UiTheme {
    pub fn theme(self) -> &'static Theme {
        match self {
            UiTheme::Color256 => &THREADLINE_256,
            UiTheme::TrueColor => &THREADLINE_TRUE,
            UiTheme::Mono => &THREADLINE_MONO,
            UiTheme::Grey => &THREADLINE_GREY,
        }
    }
}

impl FromStr for UiTheme {
    type Err = ParseThemeError;

    fn from_str(theme: &str) -> Result<Self, Self::Err> {
        match theme {
            "true" => Ok(UiTheme::TrueColor),
            "256" => Ok(UiTheme::Color256),
            "mono" => Ok(UiTheme::Mono),
            "grey" | "gray" => Ok(UiTheme::Grey),
            _ => Err(ParseThemeError(theme.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_theme() {
        assert_eq!("256".parse::<UiTheme>().unwrap(), UiTheme::Color256);
        assert_eq!("gray".parse::<UiTheme>().unwrap(), UiTheme::Grey);
        assert_eq!("grey".parse::<UiTheme>().unwrap(), UiTheme::Grey);
        assert_eq!(
            "neon".parse::<UiTheme>().unwrap_err().to_string(),
            "'neon' is not a valid theme. Options are: true, 256, mono, grey or gray"
        );
    }

    #[test]
    fn test_colour_escapes() {
        assert_eq!(
            termion::color::Fg(Colour::Ansi(33)).to_string(),
            termion::color::Fg(AnsiValue(33)).to_string()
        );
        assert_eq!(
            termion::color::Bg(Colour::Rgb(1, 2, 3)).to_string(),
            termion::color::Bg(Rgb(1, 2, 3)).to_string()
        );
    }
}
