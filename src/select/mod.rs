
//! CSS selectors matched against the open element stack.
//!
//! Supported are selector lists, type and universal selectors, `#id`, `.class`, attribute
//! selectors with all CSS level 4 value operators, and the descendant and child
//! combinators.
//!
//! # Examples
//!
//! ```
//! use html5_rewriter::{ Selector, SelectorError as Error };
//!
//! let selector: Selector = "ul > li.item, a[href^='https:' i]".parse().unwrap();
//!
//! let error = "p:last-child".parse::<Selector>().unwrap_err();
//! assert_eq!(error, Error::UnsupportedPseudoClassOrElement);
//! assert_eq!(
//!     error.to_string(),
//!     "Unsupported pseudo-class or pseudo-element in selector.",
//! );
//! ```

use std::str;
use std::fmt;
use std::error;

mod parser;
mod matcher;

pub(crate) use self::matcher::{
    MatchTarget,
};

/// Reasons a selector could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The selector (or one alternative of a list) is empty.
    EmptySelector,
    /// A character that is not valid at its position.
    UnexpectedToken {
        /// The unexpected character.
        token: char,
    },
    /// The selector ended in the middle of a construct.
    UnexpectedEnd,
    /// An attribute selector without a name, like `[=x]`.
    MissingAttributeName,
    /// A combinator without a right-hand side, like `div >`.
    DanglingCombinator,
    /// The sibling combinators `+` and `~`.
    UnsupportedCombinator {
        /// The combinator character.
        combinator: char,
    },
    /// Any selector starting with `:`.
    UnsupportedPseudoClassOrElement,
    /// Namespace prefixes like `svg|rect`.
    UnsupportedNamespace,
    /// An identifier that is not a valid CSS identifier.
    InvalidIdentifier,
}

impl fmt::Display for Error {

    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::EmptySelector =>
                write!(fmt, "The selector is empty."),
            Error::UnexpectedToken { token } =>
                write!(fmt, "Unexpected token `{}` in selector.", token.escape_default()),
            Error::UnexpectedEnd =>
                write!(fmt, "Unexpected end of selector."),
            Error::MissingAttributeName =>
                write!(fmt, "Missing attribute name in attribute selector."),
            Error::DanglingCombinator =>
                write!(fmt, "Dangling combinator in selector."),
            Error::UnsupportedCombinator { combinator } =>
                write!(fmt, "Unsupported combinator `{}` in selector.", combinator),
            Error::UnsupportedPseudoClassOrElement =>
                write!(fmt, "Unsupported pseudo-class or pseudo-element in selector."),
            Error::UnsupportedNamespace =>
                write!(fmt, "Namespaced selectors are not supported."),
            Error::InvalidIdentifier =>
                write!(fmt, "Invalid identifier in selector."),
        }
    }
}

impl error::Error for Error {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Condition {
    Id(String),
    Class(String),
    Attribute {
        name: String,
        value: Option<(Operator, String)>,
        case_insensitive: bool,
    },
}

/// One compound selector, e.g. `a.link[href]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Compound {
    /// Lowercased type selector, `None` for `*` or an omitted type.
    pub tag: Option<String>,
    pub conditions: Vec<Condition>,
}

/// A compound plus its relation to the compound before it (right to left).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Step {
    pub compound: Compound,
    /// How this step relates to the previous one. `None` for the subject.
    pub combinator: Option<Combinator>,
}

/// A complex selector stored right to left, the subject first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Complex {
    pub steps: Vec<Step>,
}

/// A compiled selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

impl Selector {

    pub(crate) fn from_alternatives(alternatives: Vec<Complex>) -> Selector {
        Selector { alternatives }
    }

    /// Whether `element`, with the given ancestors (root first), matches.
    pub(crate) fn matches<T>(&self, element: &T, ancestors: &[T]) -> bool
    where T: MatchTarget {
        self.alternatives
            .iter()
            .any(|complex| matcher::matches_complex(&complex.steps, element, ancestors))
    }
}

impl str::FromStr for Selector {

    type Err = Error;

    fn from_str(value: &str) -> Result<Selector, Error> {
        parser::parse_selector_list(value)
    }
}

/// Values usable as selector when registering handlers.
pub trait IntoSelector {

    /// Try to convert the value into a compiled selector.
    fn into_selector(self) -> Result<Selector, Error>;
}

impl<'a> IntoSelector for &'a str {

    fn into_selector(self) -> Result<Selector, Error> { self.parse() }
}

impl IntoSelector for String {

    fn into_selector(self) -> Result<Selector, Error> { self.parse() }
}

impl IntoSelector for Selector {

    fn into_selector(self) -> Result<Selector, Error> { Ok(self) }
}

impl<'a> IntoSelector for &'a Selector {

    fn into_selector(self) -> Result<Selector, Error> { Ok(self.clone()) }
}

impl IntoSelector for Result<Selector, Error> {

    fn into_selector(self) -> Result<Selector, Error> { self }
}
