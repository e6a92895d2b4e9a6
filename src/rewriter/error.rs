
use std::fmt;
use std::error;

use encoding;
use memory;
use parse;
use select;

/// Errors ending a rewriting session.
///
/// Once a rewriter returned an error, every following call returns it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewritingError {
    /// The configured encoding was rejected.
    UnsupportedEncoding {
        /// Why the encoding was rejected.
        error: encoding::Error,
    },
    /// A registered selector could not be compiled.
    InvalidSelector {
        /// The selector error.
        error: select::Error,
    },
    /// Buffered bytes would have exceeded the configured memory limit.
    MemoryLimitExceeded {
        /// Limit and requested amount.
        error: memory::MemoryLimitExceeded,
    },
    /// A handler returned `Directive::Stop`.
    RewriterStopped,
    /// The input is not acceptable in strict mode.
    Parse {
        /// Kind and location of the problem.
        error: parse::Error,
    },
    /// Inserted markup kept inserting markup.
    InsertionDepthExceeded {
        /// The nesting limit.
        limit: usize,
    },
    /// Input was written after the end was signalled.
    WriteAfterEnd,
    /// The end was signalled twice.
    EndAfterEnd,
}

impl fmt::Display for RewritingError {

    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RewritingError::UnsupportedEncoding { ref error } =>
                fmt::Display::fmt(error, fmt),
            RewritingError::InvalidSelector { ref error } =>
                fmt::Display::fmt(error, fmt),
            RewritingError::MemoryLimitExceeded { ref error } =>
                fmt::Display::fmt(error, fmt),
            RewritingError::RewriterStopped =>
                write!(fmt, "The rewriter has been stopped."),
            RewritingError::Parse { ref error } =>
                fmt::Display::fmt(error, fmt),
            RewritingError::InsertionDepthExceeded { limit } =>
                write!(fmt, "Content insertion depth limit ({}) was exceeded.", limit),
            RewritingError::WriteAfterEnd =>
                write!(fmt, "Data was written into the stream after it has ended."),
            RewritingError::EndAfterEnd =>
                write!(fmt, "Stream was ended twice."),
        }
    }
}

impl error::Error for RewritingError {

    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            RewritingError::UnsupportedEncoding { ref error } => Some(error),
            RewritingError::InvalidSelector { ref error } => Some(error),
            RewritingError::MemoryLimitExceeded { ref error } => Some(error),
            RewritingError::Parse { ref error } => Some(error),
            _ => None,
        }
    }
}

impl From<encoding::Error> for RewritingError {

    fn from(error: encoding::Error) -> RewritingError {
        RewritingError::UnsupportedEncoding { error }
    }
}

impl From<select::Error> for RewritingError {

    fn from(error: select::Error) -> RewritingError {
        RewritingError::InvalidSelector { error }
    }
}

impl From<memory::MemoryLimitExceeded> for RewritingError {

    fn from(error: memory::MemoryLimitExceeded) -> RewritingError {
        RewritingError::MemoryLimitExceeded { error }
    }
}

impl From<parse::Error> for RewritingError {

    fn from(error: parse::Error) -> RewritingError {
        RewritingError::Parse { error }
    }
}
