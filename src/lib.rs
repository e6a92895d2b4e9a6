#![warn(missing_docs)]

//! A streaming HTML5 rewriter with CSS selector based handlers.
//!
//! Input is accepted in chunks of arbitrary size and rewritten output is produced as soon
//! as it is settled, so whole documents never need to be kept in memory. Handlers are
//! registered for elements matching a selector, or for the document as a whole, and can
//! inspect and mutate elements, comments, text and the end of the document.
//!
//! The tokenizer is deliberately small. It understands just enough of HTML5 to track open
//! elements, implied end tags, raw text elements and foreign content. Everything that is
//! not modified by a handler is written through byte for byte.
//!
//! # Example
//!
//! ```
//! # use std::error;
//! # fn example() -> Result<(), Box<dyn error::Error>> {
//! use html5_rewriter::{ rewrite_str, Settings, Handlers };
//! use html5_rewriter::{ ElementContentHandlers, DocumentContentHandlers };
//! use html5_rewriter::{ Directive, ContentType };
//!
//! let handlers = Handlers::new()
//!     .on("title", ElementContentHandlers::default()
//!         .element(|title| {
//!             title.set_inner_content("New Title", ContentType::Text);
//!             Directive::Continue
//!         })
//!     )
//!     .on("#items > li.item", ElementContentHandlers::default()
//!         .element(|item| {
//!             item.after("<li class=item>Second</li>", ContentType::Html);
//!             Directive::Continue
//!         })
//!     )
//!     .on_document(DocumentContentHandlers::default()
//!         .comments(|comment| {
//!             comment.remove();
//!             Directive::Continue
//!         })
//!     );
//!
//! let output = rewrite_str(r#"
//!     <html>
//!         <head><title>Template Title</title></head>
//!         <body>
//!             <!-- items -->
//!             <ul id="items"><li class="item">First</li></ul>
//!         </body>
//!     </html>
//! "#, handlers, Settings::default())?;
//!
//! assert!(output.contains("<title>New Title</title>"));
//! assert!(output.contains("<li class=\"item\">First</li><li class=item>Second</li>"));
//! assert!(!output.contains("<!--"));
//! # Ok(())
//! # }
//! # fn main() { example().unwrap() }
//! ```
//!
extern crate tendril;
extern crate encoding_rs;
extern crate memchr;
#[macro_use]
extern crate log;
#[cfg(test)]
extern crate env_logger;

#[cfg(test)]
fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[cfg(test)]
macro_rules! test_rewrite {
    ($settings:expr, $input:expr, $expected:expr, $handlers:expr $(,)*) => {{
        ::init_test_logging();
        let whole = ::rewriter::rewrite_chunked($input, 0, $settings, $handlers).unwrap();
        assert_eq!(whole, $expected);
        let chunked = ::rewriter::rewrite_chunked($input, 1, $settings, $handlers).unwrap();
        assert_eq!(chunked, $expected, "output differs when written byte by byte");
        whole
    }}
}

#[cfg(test)]
macro_rules! test_rewrite_error {
    ($settings:expr, $input:expr, $expected:pat, $handlers:expr $(,)*) => {{
        ::init_test_logging();
        let result = ::rewriter::rewrite_chunked($input, 0, $settings, $handlers);
        if let Err($expected) = result {
        } else {
            panic!("invalid result: {:?}", result);
        }
    }}
}

mod input;
mod location;
mod encoding;
mod memory;
mod event;
mod parse;
mod text;
mod select;
mod modifier;
pub mod content;
pub mod builder;
pub mod transform;
pub mod rewriter;
pub mod writer;

pub use location::{
    Location,
};

pub use encoding::{
    AsciiCompatibleEncoding,
    Error as EncodingError,
};

pub use memory::{
    MemorySettings,
    MemoryLimitExceeded,
};

pub use parse::{
    Error as ParseError,
};

pub use text::{
    IdentifierError,
};

pub use select::{
    Selector,
    IntoSelector,
    Error as SelectorError,
};

pub use modifier::{
    ContentType,
    MutationError,
};

pub use builder::{
    Directive,
};

pub use transform::{
    Handlers,
    ElementContentHandlers,
    DocumentContentHandlers,
};

pub use rewriter::{
    Rewriter,
    Settings,
    RewritingError,
    OutputSink,
};

pub use writer::{
    Writer,
    rewrite_str,
};
