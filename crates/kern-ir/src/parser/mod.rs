//! Parser for the IR text form produced by `Display`.

mod block;
mod error;
mod function;
mod instructions;
mod lower;
mod primitives;
mod unit;
mod whitespace;

use alloc::{format, string::String};

use error::parse_error;
pub use error::ParseError;
use function::parse_function_internal;
use lower::lower_function;
use unit::parse_unit_internal;
use whitespace::blank;

use crate::{function::Function, unit::Unit};

fn nom_error(input: &str, err: nom::Err<nom::error::Error<&str>>) -> ParseError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            parse_error(input, e.input, format!("unexpected input ({:?})", e.code))
        }
        nom::Err::Incomplete(_) => parse_error(input, "", String::from("unexpected end of input")),
    }
}

fn trailing(input: &str, remaining: &str) -> Result<(), ParseError> {
    if remaining.is_empty() {
        Ok(())
    } else {
        Err(parse_error(
            input,
            remaining,
            format!("unexpected input remaining: {}", remaining),
        ))
    }
}

/// Parse a unit from IR text.
pub fn parse_unit(input: &str) -> Result<Unit, ParseError> {
    let (rest, _) = blank(input).map_err(|e| nom_error(input, e))?;
    let (remaining, (pointer_size, raw_functions)) =
        parse_unit_internal(rest).map_err(|e| nom_error(input, e))?;
    trailing(input, remaining)?;

    let mut unit = Unit::new(pointer_size);
    for raw in &raw_functions {
        if unit.contains(&raw.name) {
            return Err(parse_error(
                input,
                raw.at,
                format!("function %{} defined twice", raw.name),
            ));
        }
        unit.add_function(lower_function(input, raw)?);
    }
    Ok(unit)
}

/// Parse a function from IR text.
pub fn parse_function(input: &str) -> Result<Function, ParseError> {
    let (rest, _) = blank(input).map_err(|e| nom_error(input, e))?;
    let (remaining, raw) = parse_function_internal(rest).map_err(|e| nom_error(input, e))?;
    trailing(input, remaining)?;
    lower_function(input, &raw)
}
