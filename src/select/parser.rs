
use std::char;

use input;
use select::{ Error, Selector, Complex, Step, Compound, Condition, Operator, Combinator };

type ParseResult<'i, T> = Result<(T, input::Input<'i>), Error>;

pub(crate) fn parse_selector_list(source: &str) -> Result<Selector, Error> {

    let mut alternatives = Vec::new();
    let mut rest = input::Input::new(source).skip_whitespace();

    loop {
        let (complex, new_rest) = parse_complex(rest)?;
        alternatives.push(complex);
        rest = new_rest.skip_whitespace();
        match rest.next_char() {
            None => break,
            Some((',', after)) => rest = after.skip_whitespace(),
            Some((token, _)) => return Err(Error::UnexpectedToken { token }),
        }
    }

    Ok(Selector::from_alternatives(alternatives))
}

fn into_complex(parts: Vec<(Option<Combinator>, Compound)>) -> Complex {
    let mut steps = Vec::with_capacity(parts.len());
    let mut combinator = None;
    for (left_combinator, compound) in parts.into_iter().rev() {
        steps.push(Step { compound, combinator });
        combinator = left_combinator;
    }
    Complex { steps }
}

fn parse_complex(input: input::Input) -> ParseResult<Complex> {

    let (first, mut rest) = match parse_compound(input)? {
        (Some(compound), rest) => (compound, rest),
        (None, rest) => return Err(match rest.peek() {
            None | Some(',') => Error::EmptySelector,
            Some('>') => Error::DanglingCombinator,
            Some(combinator @ '+') | Some(combinator @ '~') =>
                Error::UnsupportedCombinator { combinator },
            Some(token) => Error::UnexpectedToken { token },
        }),
    };
    let mut parts = vec![(None, first)];

    loop {
        let (had_whitespace, after_whitespace) = rest.take_whitespace();
        let (combinator, after) = match after_whitespace.peek() {
            None | Some(',') => return Ok((into_complex(parts), after_whitespace)),
            Some('>') => match after_whitespace.take_char('>') {
                Some(after) => (Combinator::Child, after.skip_whitespace()),
                None => return Err(Error::UnexpectedEnd),
            },
            Some(combinator @ '+') | Some(combinator @ '~') =>
                return Err(Error::UnsupportedCombinator { combinator }),
            Some(_) if had_whitespace => (Combinator::Descendant, after_whitespace),
            Some(token) => return Err(Error::UnexpectedToken { token }),
        };
        match parse_compound(after)? {
            (Some(compound), new_rest) => {
                parts.push((Some(combinator), compound));
                rest = new_rest;
            },
            (None, new_rest) => return Err(match new_rest.peek() {
                None | Some(',') => Error::DanglingCombinator,
                Some(token) => Error::UnexpectedToken { token },
            }),
        }
    }
}

fn parse_compound(input: input::Input) -> ParseResult<Option<Compound>> {

    let mut compound = Compound::default();
    let mut has_content = false;
    let mut rest = input;

    if let Some(after) = rest.take_char('*') {
        has_content = true;
        rest = after;
    } else if let Some((name, after)) = take_identifier(rest)? {
        compound.tag = Some(name.to_ascii_lowercase());
        has_content = true;
        rest = after;
    }
    if rest.peek() == Some('|') {
        return Err(Error::UnsupportedNamespace);
    }

    loop {
        let (condition, after) = match rest.next_char() {
            Some(('#', after)) => {
                let (id, after) = require_identifier(after)?;
                (Condition::Id(id), after)
            },
            Some(('.', after)) => {
                let (class, after) = require_identifier(after)?;
                (Condition::Class(class), after)
            },
            Some(('[', after)) => parse_attribute(after)?,
            Some((':', _)) => return Err(Error::UnsupportedPseudoClassOrElement),
            _ => break,
        };
        compound.conditions.push(condition);
        has_content = true;
        rest = after;
    }

    Ok((if has_content { Some(compound) } else { None }, rest))
}

fn parse_attribute(input: input::Input) -> ParseResult<Condition> {

    let rest = input.skip_whitespace();
    if rest.peek() == Some('|') {
        return Err(Error::UnsupportedNamespace);
    }
    let (name, rest) = match take_identifier(rest)? {
        Some((name, rest)) => (name.to_ascii_lowercase(), rest.skip_whitespace()),
        None => return Err(match rest.peek() {
            None => Error::UnexpectedEnd,
            Some(_) => Error::MissingAttributeName,
        }),
    };

    let (operator, rest) = match rest.next_char() {
        None => return Err(Error::UnexpectedEnd),
        Some((']', after)) => return Ok((
            Condition::Attribute { name, value: None, case_insensitive: false },
            after,
        )),
        Some(('=', after)) => (Operator::Equals, after),
        Some((token, after)) => {
            let operator = match token {
                '~' => Operator::Includes,
                '|' => Operator::DashMatch,
                '^' => Operator::Prefix,
                '$' => Operator::Suffix,
                '*' => Operator::Substring,
                _ => return Err(Error::UnexpectedToken { token }),
            };
            match after.take_char('=') {
                Some(after) => (operator, after),
                None if token == '|' => return Err(Error::UnsupportedNamespace),
                None => return Err(Error::UnexpectedToken { token }),
            }
        },
    };

    let rest = rest.skip_whitespace();
    let (value, rest) = match rest.peek() {
        None => return Err(Error::UnexpectedEnd),
        Some('"') | Some('\'') => parse_string(rest)?,
        Some(token) => match take_identifier(rest)? {
            Some(found) => found,
            None => return Err(Error::UnexpectedToken { token }),
        },
    };

    let rest = rest.skip_whitespace();
    let (case_insensitive, rest) = match take_identifier(rest)? {
        None => (false, rest),
        Some((flag, after)) =>
            if flag.eq_ignore_ascii_case("i") {
                (true, after.skip_whitespace())
            } else if flag.eq_ignore_ascii_case("s") {
                (false, after.skip_whitespace())
            } else {
                return Err(Error::UnexpectedToken { token: flag.chars().next().unwrap_or('?') });
            },
    };

    match rest.next_char() {
        Some((']', after)) => Ok((
            Condition::Attribute { name, value: Some((operator, value)), case_insensitive },
            after,
        )),
        Some((token, _)) => Err(Error::UnexpectedToken { token }),
        None => Err(Error::UnexpectedEnd),
    }
}

fn is_name_char(chr: char) -> bool {
    chr.is_ascii_alphanumeric() || chr == '-' || chr == '_' || !chr.is_ascii()
}

/// Consume the rest of an escape sequence, `input` being right after the backslash.
fn parse_escape(input: input::Input) -> ParseResult<char> {
    match input.next_char() {
        None => Ok(('\u{FFFD}', input)),
        Some(('\n', _)) | Some(('\r', _)) | Some(('\x0c', _)) => Err(Error::InvalidIdentifier),
        Some((chr, _)) if chr.is_ascii_hexdigit() => {
            let mut code_point = 0u32;
            let mut rest = input;
            for _ in 0..6 {
                match rest.next_char() {
                    Some((digit, after)) if digit.is_ascii_hexdigit() => {
                        code_point = code_point * 16 + digit.to_digit(16).unwrap_or(0);
                        rest = after;
                    },
                    _ => break,
                }
            }
            let rest = match rest.next_char() {
                Some((chr, after)) if input::is_whitespace(chr) => after,
                _ => rest,
            };
            let chr = char::from_u32(code_point)
                .filter(|&chr| chr != '\0')
                .unwrap_or('\u{FFFD}');
            Ok((chr, rest))
        },
        Some((chr, after)) => Ok((chr, after)),
    }
}

fn take_identifier(input: input::Input) -> Result<Option<(String, input::Input)>, Error> {

    let mut value = String::new();
    let mut escaped = Vec::new();
    let mut rest = input;

    loop {
        match rest.next_char() {
            Some(('\\', after)) => {
                let (chr, after) = parse_escape(after)?;
                value.push(chr);
                escaped.push(true);
                rest = after;
            },
            Some((chr, after)) if is_name_char(chr) => {
                value.push(chr);
                escaped.push(false);
                rest = after;
            },
            _ => break,
        }
    }

    let mut chars = value.chars().zip(escaped.iter().cloned());
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some((first, false)), _) if first.is_ascii_digit() => Err(Error::InvalidIdentifier),
        (Some(('-', false)), None) => Err(Error::InvalidIdentifier),
        (Some(('-', false)), Some((second, false))) if second.is_ascii_digit() =>
            Err(Error::InvalidIdentifier),
        _ => Ok(Some((value, rest))),
    }
}

fn require_identifier(input: input::Input) -> ParseResult<String> {
    match take_identifier(input)? {
        Some(found) => Ok(found),
        None => Err(match input.peek() {
            None => Error::UnexpectedEnd,
            Some(token) => Error::UnexpectedToken { token },
        }),
    }
}

fn parse_string(input: input::Input) -> ParseResult<String> {

    let (quote, mut rest) = match input.next_char() {
        Some(found) => found,
        None => return Err(Error::UnexpectedEnd),
    };
    let mut value = String::new();

    loop {
        match rest.next_char() {
            None => return Err(Error::UnexpectedEnd),
            Some((chr, after)) if chr == quote => return Ok((value, after)),
            Some(('\\', after)) => match after.next_char() {
                None => rest = after,
                Some(('\n', after_newline)) => rest = after_newline,
                Some(_) => {
                    let (chr, after) = parse_escape(after)?;
                    value.push(chr);
                    rest = after;
                },
            },
            Some(('\n', _)) => return Err(Error::UnexpectedToken { token: '\n' }),
            Some((chr, after)) => {
                value.push(chr);
                rest = after;
            },
        }
    }
}
