//! Whitespace and comment parsing.

use nom::{
    branch::alt,
    character::complete::{char, multispace1, not_line_ending},
    combinator::{map, recognize},
    multi::many0,
    sequence::pair,
    IResult,
};

/// A `;` comment running to the end of the line
fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char(';'), not_line_ending))(input)
}

/// Parse whitespace and comments - returns the matched string
pub(crate) fn blank_space(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((multispace1, comment))))(input)
}

/// Parse whitespace and comments and discard them
pub(crate) fn blank(input: &str) -> IResult<&str, ()> {
    map(blank_space, |_| ())(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_space() {
        assert_eq!(blank_space("   "), Ok(("", "   ")));
        assert_eq!(blank_space("\n\t  "), Ok(("", "\n\t  ")));
        assert_eq!(blank_space("  %0"), Ok(("%0", "  ")));
        assert_eq!(blank_space(""), Ok(("", "")));
    }

    #[test]
    fn test_blank_skips_comments() {
        assert_eq!(blank("; note\n  mov"), Ok(("mov", ())));
        assert_eq!(blank("  ; a\n ; b\nfence"), Ok(("fence", ())));
        assert_eq!(blank("; trailing"), Ok(("", ())));
    }
}
