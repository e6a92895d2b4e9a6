
//! Pending mutations recorded by handlers on content units.
//!
//! Handlers never write output themselves. They record insertions and removals on the unit
//! they were given, and the rewriter serializes the recorded state once every handler for
//! the unit has run.

use std::fmt;
use std::error;

use tendril;

use text;

pub(crate) mod attribute;
pub(crate) mod remove;

/// How inserted content is written to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Written verbatim and parsed as markup by the rewriter.
    Html,
    /// Escaped so it renders as the given text.
    Text,
}

/// One inserted piece of content.
#[derive(Debug, Clone)]
pub(crate) struct Piece {
    pub content_type: ContentType,
    pub content: tendril::StrTendril,
}

/// Inserted content in the order it was added.
#[derive(Debug, Clone, Default)]
pub(crate) struct Content {
    pieces: Vec<Piece>,
}

impl Content {

    pub fn single(content: &str, content_type: ContentType) -> Content {
        let mut single = Content::default();
        single.push(content, content_type);
        single
    }

    pub fn push(&mut self, content: &str, content_type: ContentType) {
        if !content.is_empty() {
            self.pieces.push(Piece {
                content_type,
                content: content.into(),
            });
        }
    }

    pub fn is_empty(&self) -> bool { self.pieces.is_empty() }

    /// Bytes held by the inserted text.
    pub fn len(&self) -> usize {
        self.pieces.iter().map(|piece| piece.content.len()).sum()
    }

    pub fn pieces(&self) -> &[Piece] { &self.pieces }
}

/// Mutations shared by comments and text chunks.
#[derive(Debug, Clone, Default)]
pub(crate) struct Mutations {
    pub before: Content,
    pub after: Content,
    /// Emitted in place of the unit once it is removed.
    pub replacement: Content,
    pub removed: bool,
}

impl Mutations {

    pub fn before(&mut self, content: &str, content_type: ContentType) {
        self.before.push(content, content_type);
    }

    pub fn after(&mut self, content: &str, content_type: ContentType) {
        self.after.push(content, content_type);
    }

    pub fn replace(&mut self, content: &str, content_type: ContentType) {
        self.replacement = Content::single(content, content_type);
        self.removed = true;
    }

    pub fn remove(&mut self) {
        self.replacement = Content::default();
        self.removed = true;
    }
}

/// Errors raised by mutating a content unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// A tag name was rejected.
    TagName {
        /// Why the name is not valid.
        error: text::IdentifierError,
    },
    /// An attribute name was rejected.
    AttributeName {
        /// Why the name is not valid.
        error: text::IdentifierError,
    },
    /// Comment text containing `-->`.
    CommentText,
}

impl fmt::Display for MutationError {

    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use text::IdentifierError as Invalid;
        match *self {
            MutationError::TagName { error: Invalid::Empty } =>
                write!(fmt, "Tag name can't be empty."),
            MutationError::TagName { error: Invalid::InvalidFirstCharacter { .. } } =>
                write!(fmt, "First character of the tag name should be an ASCII alphabetical character."),
            MutationError::TagName { error: Invalid::Whitespace { whitespace: chr } } |
            MutationError::TagName { error: Invalid::Forbidden { forbidden: chr } } =>
                write!(fmt, "`{}` character is forbidden in the tag name.", chr.escape_default()),
            MutationError::AttributeName { error: Invalid::Empty } =>
                write!(fmt, "Attribute name can't be empty."),
            MutationError::AttributeName { error: Invalid::InvalidFirstCharacter { found: chr } } |
            MutationError::AttributeName { error: Invalid::Whitespace { whitespace: chr } } |
            MutationError::AttributeName { error: Invalid::Forbidden { forbidden: chr } } =>
                write!(fmt, "`{}` character is forbidden in the attribute name.", chr.escape_default()),
            MutationError::CommentText =>
                write!(fmt, "Comment text shouldn't contain comment closing sequence (-->)."),
        }
    }
}

impl error::Error for MutationError {

    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            MutationError::TagName { ref error } |
            MutationError::AttributeName { ref error } => Some(error),
            MutationError::CommentText => None,
        }
    }
}
