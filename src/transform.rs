
//! Handler registration.
//!
//! Handlers are registered either for elements matching a selector, or for the document
//! as a whole. Every unit is passed to all interested handlers in registration order.
//!
//! # Example
//!
//! ```
//! use html5_rewriter::{ Handlers, ElementContentHandlers, DocumentContentHandlers };
//! use html5_rewriter::{ Directive, ContentType };
//!
//! let handlers = Handlers::new()
//!     .on("a[href]", ElementContentHandlers::default()
//!         .element(|element| {
//!             element.set_attribute("rel", "nofollow").unwrap();
//!             Directive::Continue
//!         })
//!     )
//!     .on_document(DocumentContentHandlers::default()
//!         .end(|end| {
//!             end.append("<!-- rewritten -->", ContentType::Html);
//!             Directive::Continue
//!         })
//!     );
//! # let _ = handlers;
//! ```

use std::fmt;

use builder;
use content;
use select;

/// Handlers for elements matching a selector and for their contents.
#[derive(Default)]
pub struct ElementContentHandlers<'h> {
    element: Option<Box<dyn builder::ElementHandler + 'h>>,
    comments: Option<Box<dyn builder::CommentHandler + 'h>>,
    text: Option<Box<dyn builder::TextHandler + 'h>>,
}

impl<'h> ElementContentHandlers<'h> {

    /// Handle matching elements.
    pub fn element<F>(mut self, handler: F) -> Self
    where F: FnMut(&mut content::Element) -> builder::Directive + 'h {
        self.element = Some(Box::new(handler));
        self
    }

    /// Handle comments inside matching elements.
    pub fn comments<F>(mut self, handler: F) -> Self
    where F: FnMut(&mut content::Comment) -> builder::Directive + 'h {
        self.comments = Some(Box::new(handler));
        self
    }

    /// Handle text inside matching elements.
    pub fn text<F>(mut self, handler: F) -> Self
    where F: FnMut(&mut content::TextChunk) -> builder::Directive + 'h {
        self.text = Some(Box::new(handler));
        self
    }
}

/// Handlers for the document as a whole.
#[derive(Default)]
pub struct DocumentContentHandlers<'h> {
    doctype: Option<Box<dyn builder::DoctypeHandler + 'h>>,
    comments: Option<Box<dyn builder::CommentHandler + 'h>>,
    text: Option<Box<dyn builder::TextHandler + 'h>>,
    end: Option<Box<dyn builder::DocumentEndHandler + 'h>>,
}

impl<'h> DocumentContentHandlers<'h> {

    /// Handle document type declarations.
    pub fn doctype<F>(mut self, handler: F) -> Self
    where F: FnMut(&content::Doctype) -> builder::Directive + 'h {
        self.doctype = Some(Box::new(handler));
        self
    }

    /// Handle all comments.
    pub fn comments<F>(mut self, handler: F) -> Self
    where F: FnMut(&mut content::Comment) -> builder::Directive + 'h {
        self.comments = Some(Box::new(handler));
        self
    }

    /// Handle all text.
    pub fn text<F>(mut self, handler: F) -> Self
    where F: FnMut(&mut content::TextChunk) -> builder::Directive + 'h {
        self.text = Some(Box::new(handler));
        self
    }

    /// Handle the end of the document.
    pub fn end<F>(mut self, handler: F) -> Self
    where F: FnMut(&mut content::DocumentEnd) -> builder::Directive + 'h {
        self.end = Some(Box::new(handler));
        self
    }
}

/// One registration. Without selector it covers the whole document.
pub(crate) struct Registration<'h> {
    pub selector: Option<select::Selector>,
    pub element: Option<Box<dyn builder::ElementHandler + 'h>>,
    pub comments: Option<Box<dyn builder::CommentHandler + 'h>>,
    pub text: Option<Box<dyn builder::TextHandler + 'h>>,
    pub doctype: Option<Box<dyn builder::DoctypeHandler + 'h>>,
    pub end: Option<Box<dyn builder::DocumentEndHandler + 'h>>,
}

/// The set of registered handlers.
///
/// Selector errors are kept until the rewriter is constructed, so registrations can be
/// chained without intermediate results.
#[derive(Default)]
pub struct Handlers<'h> {
    registrations: Vec<Registration<'h>>,
    error: Option<select::Error>,
}

impl<'h> Handlers<'h> {

    /// An empty set of handlers. A rewriter without handlers passes input through.
    pub fn new() -> Handlers<'h> { Handlers::default() }

    /// Register handlers for elements matching the selector.
    pub fn on<S>(mut self, selector: S, handlers: ElementContentHandlers<'h>) -> Self
    where S: select::IntoSelector {
        match selector.into_selector() {
            Ok(selector) => self.registrations.push(Registration {
                selector: Some(selector),
                element: handlers.element,
                comments: handlers.comments,
                text: handlers.text,
                doctype: None,
                end: None,
            }),
            Err(error) => if self.error.is_none() {
                self.error = Some(error);
            },
        }
        self
    }

    /// Register handlers for the whole document.
    pub fn on_document(mut self, handlers: DocumentContentHandlers<'h>) -> Self {
        self.registrations.push(Registration {
            selector: None,
            element: None,
            comments: handlers.comments,
            text: handlers.text,
            doctype: handlers.doctype,
            end: handlers.end,
        });
        self
    }

    /// Number of registrations so far.
    pub fn len(&self) -> usize { self.registrations.len() }

    /// Whether nothing was registered.
    pub fn is_empty(&self) -> bool { self.registrations.is_empty() }

    pub(crate) fn into_registrations(self) -> Result<Vec<Registration<'h>>, select::Error> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.registrations),
        }
    }
}

impl<'h> fmt::Debug for Handlers<'h> {

    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Handlers")
            .field("registrations", &self.registrations.len())
            .field("error", &self.error)
            .finish()
    }
}
