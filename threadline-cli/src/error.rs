use std::fmt;
use std::io;
use threadline::url;

#[derive(Debug)]
pub struct ParseThemeError(pub String);

#[derive(Debug)]
pub enum Error {
    Threadline(threadline::Error),
    NotATty,
}

impl From<threadline::Error> for Error {
    fn from(err: threadline::Error) -> Self {
        Error::Threadline(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Threadline(threadline::Error::Io(err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Threadline(threadline::Error::Url(err))
    }
}

impl fmt::Display for ParseThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a valid theme. Options are: true, 256, mono, grey or gray",
            self.0
        )
    }
}
