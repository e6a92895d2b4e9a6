
use std::error;
use std::fmt;

/// ASCII case-insensitive comparison, as used for tag and attribute names.
pub(crate) fn identifier_eq(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right)
}

/// Details about name invalidity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// A name cannot be zero-length.
    Empty,
    /// Tag names have to start with an ASCII letter.
    InvalidFirstCharacter {
        /// The offending first character.
        found: char,
    },
    /// The value contained whitespace.
    Whitespace {
        /// The detected whitespace character.
        whitespace: char,
    },
    /// The value contained a character that would end the name in markup.
    Forbidden {
        /// The detected forbidden character.
        forbidden: char,
    },
}

impl fmt::Display for IdentifierError {

    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            IdentifierError::Empty =>
                write!(fmt, "Name is empty"),
            IdentifierError::InvalidFirstCharacter { found } =>
                write!(fmt, "Name starts with invalid character '{}'",
                    found.escape_default(),
                ),
            IdentifierError::Forbidden { forbidden } =>
                write!(fmt, "Name contains forbidden character '{}'",
                    forbidden.escape_default(),
                ),
            IdentifierError::Whitespace { whitespace } =>
                write!(fmt, "Name contains whitespace character '{}'",
                    whitespace.escape_default(),
                ),
        }
    }
}

impl error::Error for IdentifierError {}

fn validate_chars(value: &str, forbidden: &[char]) -> Result<(), IdentifierError> {
    if value.is_empty() {
        return Err(IdentifierError::Empty);
    }
    if let Some(whitespace) = value.chars().find(|c| c.is_ascii_whitespace()) {
        return Err(IdentifierError::Whitespace { whitespace });
    }
    if let Some(forbidden) = value.chars().find(|c| forbidden.contains(c)) {
        return Err(IdentifierError::Forbidden { forbidden });
    }
    Ok(())
}

pub(crate) fn validate_tag_name(value: &str) -> Result<&str, IdentifierError> {

    const FORBIDDEN: &[char] = &['/', '>', '<', '\0'];

    validate_chars(value, FORBIDDEN)?;
    match value.chars().next() {
        Some(first) if !first.is_ascii_alphabetic() =>
            Err(IdentifierError::InvalidFirstCharacter { found: first }),
        _ => Ok(value),
    }
}

pub(crate) fn validate_attribute_name(value: &str) -> Result<&str, IdentifierError> {

    const FORBIDDEN: &[char] = &['/', '>', '=', '"', '\'', '<', '\0'];

    validate_chars(value, FORBIDDEN)?;
    Ok(value)
}
