
//! Content units handed to handlers.
//!
//! Every unit is owned by the rewriter for the duration of a handler call. Mutations are
//! applied to the output after all handlers for the unit have run.

mod element;
mod comment;
mod text_chunk;
mod doctype;
mod document_end;

pub use self::element::{
    Element,
    Namespace,
};

pub(crate) use self::element::{
    ElementMutations,
};

pub use self::comment::{
    Comment,
};

pub use self::text_chunk::{
    TextChunk,
};

pub use self::doctype::{
    Doctype,
};

pub use self::document_end::{
    DocumentEnd,
};
