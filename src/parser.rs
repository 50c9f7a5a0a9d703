//! This module provides the parser for machine descriptions, utilizing the `pest` crate.
//! It defines the grammar for `.tm` files and functions to parse the input into a
//! `Description`.

use crate::types::{Description, Direction, MachineError, Symbol, Transition, TransitionField};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the description grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DescriptionParser;

/// Parses the given input string into a `Description`.
///
/// The description is a line-oriented format: the number of states, the number of input
/// symbols, one `next_state,write_symbol,direction` line per `(state, symbol)` pair, and
/// finally the input digits.
///
/// # Arguments
///
/// * `input` - A string slice containing the machine description.
///
/// # Returns
///
/// * `Ok(Description)` if the input is well formed and has a complete table.
/// * `Err(MachineError::ParseError)` if there are any syntax errors.
/// * `Err(MachineError::InvalidTransition)` if a row holds a negative value or an unknown
///   direction.
/// * `Err(MachineError::ValidationError)` if the number of rows does not match the counts.
pub fn parse(input: &str) -> Result<Description, MachineError> {
    let root = DescriptionParser::parse(Rule::description, input)
        .map_err(|e| MachineError::ParseError(Box::new(e)))?
        .next()
        .ok_or_else(|| MachineError::ValidationError("Empty description".to_string()))?;

    let description = parse_description(root)?;

    description.validate()?;

    Ok(description)
}

/// Parses the top-level structure of a description from a `Pair<Rule::description>`.
fn parse_description(pair: Pair<Rule>) -> Result<Description, MachineError> {
    let mut num_states: Option<usize> = None;
    let mut num_symbols: Option<Symbol> = None;
    let mut rows = Vec::new();
    let mut input = String::new();

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::num_states => num_states = Some(parse_count(p, "Number of states")?),
            Rule::num_symbols => num_symbols = Some(parse_count(p, "Number of symbols")?),
            Rule::transition => rows.push(parse_transition(p)?),
            Rule::input => input = p.as_str().trim().to_string(),
            _ => {} // EOI
        }
    }

    Ok(Description {
        num_states: check_required(num_states, "number of states")?,
        num_symbols: check_required(num_symbols, "number of symbols")?,
        rows,
        input,
    })
}

/// Parses a header count, which must be a non-negative integer that fits the target type.
fn parse_count<T: TryFrom<i64>>(pair: Pair<Rule>, what: &str) -> Result<T, MachineError> {
    let span = pair.as_span();
    let value = parse_integer(inner(pair)?)?;

    T::try_from(value).map_err(|_| {
        parse_error(
            &format!("{what} must be a non-negative integer, found {value}"),
            span,
        )
    })
}

/// Parses a single `next_state,write_symbol,direction` row.
fn parse_transition(pair: Pair<Rule>) -> Result<Transition, MachineError> {
    let (line, _) = pair.as_span().start_pos().line_col();
    let mut pairs = pair.into_inner();

    let next_state = parse_integer(next(&mut pairs)?)?;
    let write = parse_integer(next(&mut pairs)?)?;
    let direction = next(&mut pairs)?.as_str();

    let next_state = usize::try_from(next_state).map_err(|_| {
        MachineError::invalid_transition(
            TransitionField::NextState,
            format!("line {line}: state {next_state} is negative"),
        )
    })?;

    let write = Symbol::try_from(write).map_err(|_| {
        MachineError::invalid_transition(
            TransitionField::WriteSymbol,
            format!("line {line}: symbol {write} is not a valid symbol"),
        )
    })?;

    Ok(Transition {
        next_state,
        write,
        direction: parse_direction(direction, line)?,
    })
}

/// Parses a direction, which must be exactly one of `L`, `R` or `S`.
fn parse_direction(text: &str, line: usize) -> Result<Direction, MachineError> {
    let mut chars = text.chars();
    let direction = match (chars.next(), chars.next()) {
        (Some(c), None) => Direction::try_from(c).ok(),
        _ => None,
    };

    direction.ok_or_else(|| {
        MachineError::invalid_transition(
            TransitionField::Direction,
            format!("line {line}: unsupported direction '{text}'"),
        )
    })
}

/// Parses an `integer` pair into an `i64`.
fn parse_integer(pair: Pair<Rule>) -> Result<i64, MachineError> {
    let span = pair.as_span();
    pair.as_str()
        .parse::<i64>()
        .map_err(|e| parse_error(&format!("Invalid integer: {e}"), span))
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required<T>(value: Option<T>, name: &str) -> Result<T, MachineError> {
    value.ok_or_else(|| MachineError::ValidationError(format!("Missing {name} line")))
}

/// Creates a `MachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> MachineError {
    MachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Returns the first inner pair, e.g. the `integer` inside `num_states`.
fn inner(pair: Pair<Rule>) -> Result<Pair<Rule>, MachineError> {
    let span = pair.as_span();
    pair.into_inner()
        .next()
        .ok_or_else(|| parse_error("Unexpected empty token", span))
}

fn next<'i>(pairs: &mut Pairs<'i, Rule>) -> Result<Pair<'i, Rule>, MachineError> {
    pairs
        .next()
        .ok_or_else(|| MachineError::ValidationError("Incomplete transition line".to_string()))
}
