
//! Handler traits for content units.
//!
//! All traits are implemented for closures taking a mutable reference to the unit and
//! returning a `Directive`, so you shouldn't have to implement them directly.

use content;

/// What the rewriter does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Keep rewriting.
    Continue,
    /// Abort rewriting. The current unit is not written and every following call to the
    /// rewriter fails with `RewritingError::RewriterStopped`.
    Stop,
}

impl Default for Directive {

    fn default() -> Directive { Directive::Continue }
}

/// Handler for elements matching a selector.
pub trait ElementHandler {

    /// Inspect or mutate the element.
    fn handle_element(&mut self, element: &mut content::Element) -> Directive;
}

impl<F> ElementHandler for F where F: FnMut(&mut content::Element) -> Directive {

    fn handle_element(&mut self, element: &mut content::Element) -> Directive {
        self(element)
    }
}

/// Handler for comments.
pub trait CommentHandler {

    /// Inspect or mutate the comment.
    fn handle_comment(&mut self, comment: &mut content::Comment) -> Directive;
}

impl<F> CommentHandler for F where F: FnMut(&mut content::Comment) -> Directive {

    fn handle_comment(&mut self, comment: &mut content::Comment) -> Directive {
        self(comment)
    }
}

/// Handler for text chunks.
pub trait TextHandler {

    /// Inspect or mutate the text chunk.
    fn handle_text(&mut self, chunk: &mut content::TextChunk) -> Directive;
}

impl<F> TextHandler for F where F: FnMut(&mut content::TextChunk) -> Directive {

    fn handle_text(&mut self, chunk: &mut content::TextChunk) -> Directive {
        self(chunk)
    }
}

/// Handler for document type declarations.
pub trait DoctypeHandler {

    /// Inspect the doctype.
    fn handle_doctype(&mut self, doctype: &content::Doctype) -> Directive;
}

impl<F> DoctypeHandler for F where F: FnMut(&content::Doctype) -> Directive {

    fn handle_doctype(&mut self, doctype: &content::Doctype) -> Directive {
        self(doctype)
    }
}

/// Handler for the end of the document.
pub trait DocumentEndHandler {

    /// Append trailing content.
    fn handle_document_end(&mut self, end: &mut content::DocumentEnd) -> Directive;
}

impl<F> DocumentEndHandler for F where F: FnMut(&mut content::DocumentEnd) -> Directive {

    fn handle_document_end(&mut self, end: &mut content::DocumentEnd) -> Directive {
        self(end)
    }
}
