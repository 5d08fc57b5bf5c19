use std::num::ParseIntError;
use std::time::Duration;

use threadline::url::{self, Url};

pub fn as_usize((x, y): (u16, u16)) -> (usize, usize) {
    (usize::from(x), usize::from(y))
}

pub fn parse_url(src: &str) -> Result<Url, url::ParseError> {
    src.parse()
}

/// Whole seconds
pub fn parse_timeout(src: &str) -> Result<Duration, ParseIntError> {
    src.trim().parse().map(Duration::from_secs)
}

pub fn count_digits(num: i64) -> usize {
    let sign = usize::from(num < 0);
    let mut n = num.unsigned_abs();
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits + sign
}

/// Collapse whitespace so multi-line text fits on one row
pub fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_digits() {
        assert_eq!(count_digits(0), 1);
        assert_eq!(count_digits(1), 1);
        assert_eq!(count_digits(10), 2);
        assert_eq!(count_digits(50), 2);
        assert_eq!(count_digits(99), 2);
        assert_eq!(count_digits(101), 3);
        assert_eq!(count_digits(-101), 4);
        assert_eq!(count_digits(-99), 3);
        assert_eq!(count_digits(-50), 3);
        assert_eq!(count_digits(-10), 3);
        assert_eq!(count_digits(-1), 2);
        assert_eq!(count_digits(i64::MIN), 20);
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("30"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_timeout(" 5 "), Ok(Duration::from_secs(5)));
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_one_line() {
        assert_eq!(one_line("  first\n\nsecond  line "), "first second line");
        assert_eq!(one_line(""), "");
    }
}
