
//! The streaming rewriter.
//!
//! A `Rewriter` accepts input in chunks of any size, runs the registered handlers and
//! writes the rewritten document to an output sink as soon as each part of it is settled.
//!
//! # Example
//!
//! ```
//! use html5_rewriter::{ Rewriter, Settings, Handlers, ElementContentHandlers };
//! use html5_rewriter::{ Directive, ContentType };
//!
//! let mut output = Vec::new();
//! {
//!     let handlers = Handlers::new()
//!         .on("h1", ElementContentHandlers::default()
//!             .element(|element| {
//!                 element.set_tag_name("h2").unwrap();
//!                 element.prepend("Chapter: ", ContentType::Text);
//!                 Directive::Continue
//!             })
//!         );
//!     let sink = |chunk: &[u8]| output.extend_from_slice(chunk);
//!     let mut rewriter = Rewriter::new(handlers, Settings::default(), sink).unwrap();
//!     rewriter.write(b"<h1>Int").unwrap();
//!     rewriter.write(b"ro</h1>").unwrap();
//!     rewriter.end().unwrap();
//! }
//! assert_eq!(String::from_utf8(output).unwrap(), "<h2>Chapter: Intro</h2>");
//! ```

use encoding;
use memory;
use parse;
use transform;

mod dispatch;
mod error;
mod settings;
mod tree;

pub use self::error::{
    RewritingError,
};

pub use self::settings::{
    Settings,
};

/// Receiver of rewritten output.
pub trait OutputSink {

    /// Handle the next chunk of output. Chunks are never empty.
    fn handle_chunk(&mut self, chunk: &[u8]);
}

impl<F> OutputSink for F where F: FnMut(&[u8]) {

    fn handle_chunk(&mut self, chunk: &[u8]) {
        self(chunk)
    }
}

#[derive(Debug)]
enum State {
    Idle,
    Active,
    Ended,
    Stopped,
    Failed(RewritingError),
}

/// A rewriting session over one document.
pub struct Rewriter<'h, O> {
    tokenizer: parse::Tokenizer,
    dispatcher: dispatch::Dispatcher<'h, O>,
    state: State,
}

impl<'h, O> Rewriter<'h, O> where O: OutputSink {

    /// Start a session.
    ///
    /// Fails when the encoding is not supported, a selector could not be compiled, or the
    /// preallocated parsing buffer exceeds the memory limit.
    pub fn new(handlers: transform::Handlers<'h>, settings: Settings, output: O)
    -> Result<Rewriter<'h, O>, RewritingError> {

        let encoding = encoding::AsciiCompatibleEncoding::for_label(&settings.encoding)?;
        let registrations = handlers.into_registrations()?;
        let limiter = memory::Limiter::new(settings.memory.max_allowed_memory_usage);
        let options = parse::Options::default()
            .strict(settings.strict)
            .preallocated_buffer_size(settings.memory.preallocated_parsing_buffer_size);
        let tokenizer = parse::Tokenizer::new(options, &limiter)?;
        debug!("rewriter started ({}, {} registrations, strict: {})",
            encoding.name(),
            registrations.len(),
            settings.strict,
        );
        Ok(Rewriter {
            tokenizer,
            dispatcher: dispatch::Dispatcher::new(registrations, encoding, limiter, output),
            state: State::Idle,
        })
    }

    fn check_open(&self) -> Result<(), RewritingError> {
        match self.state {
            State::Idle | State::Active => Ok(()),
            State::Ended => Err(RewritingError::WriteAfterEnd),
            State::Stopped => Err(RewritingError::RewriterStopped),
            State::Failed(ref error) => Err(error.clone()),
        }
    }

    fn fail(&mut self, error: RewritingError) -> RewritingError {
        debug!("rewriting failed: {}", error);
        self.state = match error {
            RewritingError::RewriterStopped => State::Stopped,
            ref other => State::Failed(other.clone()),
        };
        error
    }

    /// Feed the next chunk of input. Returns the number of bytes consumed, which is always
    /// the length of the chunk.
    pub fn write(&mut self, chunk: &[u8]) -> Result<usize, RewritingError> {
        self.check_open()?;
        if chunk.is_empty() {
            return Ok(0);
        }
        self.state = State::Active;
        match self.tokenizer.feed(chunk, &mut self.dispatcher) {
            Ok(()) => Ok(chunk.len()),
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Signal the end of input. Flushes all pending output and runs the document end
    /// handlers.
    pub fn end(&mut self) -> Result<(), RewritingError> {
        match self.check_open() {
            Err(RewritingError::WriteAfterEnd) => return Err(RewritingError::EndAfterEnd),
            other => other?,
        }
        let result = {
            let dispatcher = &mut self.dispatcher;
            self.tokenizer.finish(dispatcher).and_then(|()| dispatcher.finish())
        };
        match result {
            Ok(()) => {
                debug!("rewriter ended");
                self.state = State::Ended;
                Ok(())
            },
            Err(error) => Err(self.fail(error)),
        }
    }

    pub(crate) fn output_mut(&mut self) -> &mut O { self.dispatcher.output_mut() }

    pub(crate) fn into_output(self) -> O { self.dispatcher.into_output() }
}

/// Rewrite `input` in chunks of `chunk_size` bytes, all at once for zero.
#[cfg(test)]
pub(crate) fn rewrite_chunked(
    input: &str,
    chunk_size: usize,
    settings: Settings,
    handlers: transform::Handlers,
) -> Result<String, RewritingError> {
    let mut output = Vec::new();
    {
        let mut rewriter = Rewriter::new(handlers, settings, |chunk: &[u8]| {
            assert!(!chunk.is_empty());
            output.extend_from_slice(chunk);
        })?;
        if chunk_size == 0 {
            rewriter.write(input.as_bytes())?;
        } else {
            for chunk in input.as_bytes().chunks(chunk_size) {
                rewriter.write(chunk)?;
            }
        }
        rewriter.end()?;
    }
    Ok(String::from_utf8(output).unwrap())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use builder::Directive;
    use content;
    use memory;
    use modifier::ContentType;
    use parse;
    use transform::{ Handlers, ElementContentHandlers as OnElement, DocumentContentHandlers as OnDocument };
    use super::{ Rewriter, Settings, RewritingError, rewrite_chunked };

    fn settings() -> Settings { Settings::default() }

    fn session<'h>(handlers: Handlers<'h>, output: &'h RefCell<Vec<u8>>)
    -> Rewriter<'h, impl FnMut(&[u8]) + 'h> {
        Rewriter::new(handlers, settings(), move |chunk: &[u8]| {
            output.borrow_mut().extend_from_slice(chunk)
        }).unwrap()
    }

    #[test]
    fn passthrough() {
        let input = "<!DOCTYPE html><html><head><title>A &amp; B</title></head>\
            <body><p class=x>Hello<br/>World<!-- note --></p></body></html>";
        test_rewrite!(settings(), input, input, Handlers::new());
        test_rewrite!(settings(), "", "", Handlers::new());
    }

    #[test]
    fn comment_text() {
        test_rewrite!(settings(), "<!--Hey 42-->", "<!--Yo-->", Handlers::new()
            .on_document(OnDocument::default()
                .comments(|comment| {
                    assert_eq!(comment.text(), "Hey 42");
                    comment.set_text("Yo").unwrap();
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn comment_mutations() {
        test_rewrite!(settings(), "<div><!--a--><!--b--></div><!--c-->", "<div>[A]<i></i></div><!--c-->",
            Handlers::new().on("div", OnElement::default()
                .comments(|comment| {
                    match comment.text() {
                        "a" => comment.replace("[A]", ContentType::Text),
                        _ => {
                            comment.after("<i></i>", ContentType::Html);
                            comment.remove();
                        },
                    }
                    Directive::Continue
                })
            )
        );
        let result = rewrite_chunked("<!--x-->", 0, settings(), Handlers::new()
            .on_document(OnDocument::default()
                .comments(|comment| {
                    assert!(comment.set_text("-->").is_err());
                    Directive::Continue
                })
            )
        );
        assert_eq!(result, Ok("<!--x-->".into()));
    }

    #[test]
    fn text_chunks() {
        let chunks = RefCell::new(Vec::new());
        let output = rewrite_chunked("<span>Hey 42</span>", 0, settings(), Handlers::new()
            .on("span", OnElement::default()
                .text(|chunk| {
                    chunks.borrow_mut().push((chunk.as_str().to_string(), chunk.last_in_text_node()));
                    if !chunk.last_in_text_node() {
                        chunk.before("<div>", ContentType::Html);
                        chunk.after("</div>", ContentType::Text);
                    }
                    Directive::Continue
                })
            )
        );
        assert_eq!(output, Ok("<span><div>Hey 42&lt;/div&gt;</span>".into()));
        assert_eq!(*chunks.borrow(), vec![("Hey 42".to_string(), false), (String::new(), true)]);
    }

    #[test]
    fn text_chunks_across_writes() {
        let text = RefCell::new(String::new());
        let last = RefCell::new(0);
        let output = rewrite_chunked("<p>a\u{e9}b</p><p>c</p>", 1, settings(), Handlers::new()
            .on_document(OnDocument::default()
                .text(|chunk| {
                    text.borrow_mut().push_str(chunk.as_str());
                    if chunk.last_in_text_node() {
                        *last.borrow_mut() += 1;
                        text.borrow_mut().push('|');
                    }
                    Directive::Continue
                })
            )
        );
        assert_eq!(output, Ok("<p>a\u{e9}b</p><p>c</p>".into()));
        assert_eq!(*text.borrow(), "a\u{e9}b|c|");
        assert_eq!(*last.borrow(), 2);
    }

    #[test]
    fn text_replace() {
        test_rewrite!(settings(), "<b>x</b> y", "<b>1</b> y", Handlers::new()
            .on("b", OnElement::default()
                .text(|chunk| {
                    if !chunk.last_in_text_node() {
                        chunk.replace("1", ContentType::Text);
                    }
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn document_end() {
        test_rewrite!(settings(), "<p>x</p>", "<p>x</p><!--appended text-->hello &amp; world",
            Handlers::new().on_document(OnDocument::default()
                .end(|end| {
                    end.append("<!--appended text-->", ContentType::Html);
                    end.append("hello & world", ContentType::Text);
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn rename_element() {
        test_rewrite!(settings(), "Hi <div>", "Hi <span>", Handlers::new()
            .on("*", OnElement::default()
                .element(|element| {
                    let error = element.set_tag_name("").unwrap_err();
                    assert_eq!(error.to_string(), "Tag name can't be empty.");
                    element.set_tag_name("span").unwrap();
                    Directive::Continue
                })
            )
        );
        test_rewrite!(settings(), "<div a=1>x</div>", "<section a=1>x</section>", Handlers::new()
            .on("div", OnElement::default()
                .element(|element| {
                    element.set_tag_name("section").unwrap();
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn doctype() {
        let seen = RefCell::new(Vec::new());
        let input = r#"<!DOCTYPE math SYSTEM "http://www.w3.org/Math/DTD/mathml1/mathml.dtd">"#;
        let output = rewrite_chunked(input, 7, settings(), Handlers::new()
            .on_document(OnDocument::default()
                .doctype(|doctype| {
                    seen.borrow_mut().push(doctype.clone());
                    Directive::Continue
                })
            )
        );
        assert_eq!(output, Ok(input.into()));
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name(), Some("math"));
        assert_eq!(seen[0].public_id(), None);
        assert_eq!(seen[0].system_id(), Some("http://www.w3.org/Math/DTD/mathml1/mathml.dtd"));
    }

    #[test]
    fn memory_limit() {
        let settings = Settings::default()
            .memory(memory::MemorySettings::default()
                .preallocated_parsing_buffer_size(0)
                .max_allowed_memory_usage(5)
            );
        let output = RefCell::new(Vec::new());
        let mut rewriter = Rewriter::new(Handlers::new(), settings, |chunk: &[u8]| {
            output.borrow_mut().extend_from_slice(chunk)
        }).unwrap();
        match rewriter.write(b"<span alt='aaaaa") {
            Err(error @ RewritingError::MemoryLimitExceeded { .. }) =>
                assert_eq!(error.to_string(), "The memory limit has been exceeded."),
            other => panic!("unexpected result: {:?}", other),
        }
        match rewriter.write(b"'>") {
            Err(RewritingError::MemoryLimitExceeded { .. }) => (),
            other => panic!("error not repeated: {:?}", other),
        }
    }

    #[test]
    fn preallocation_over_limit() {
        let settings = Settings::default()
            .memory(memory::MemorySettings::default()
                .preallocated_parsing_buffer_size(100)
                .max_allowed_memory_usage(10)
            );
        let result = Rewriter::new(Handlers::new(), settings, |_: &[u8]| ());
        match result {
            Err(RewritingError::MemoryLimitExceeded { .. }) => (),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn pending_output_is_charged() {
        let limited = || Settings::default()
            .memory(memory::MemorySettings::default()
                .preallocated_parsing_buffer_size(0)
                .max_allowed_memory_usage(20)
            );
        test_rewrite_error!(limited(), "<p>x</p>", RewritingError::MemoryLimitExceeded { .. },
            Handlers::new().on("p", OnElement::default()
                .element(|element| {
                    element.append(&"0123456789".repeat(3), ContentType::Text);
                    Directive::Continue
                })
            )
        );
        test_rewrite!(limited(), "<p>x</p><p>y</p>", "<p>x012345678901</p><p>y012345678901</p>",
            Handlers::new().on("p", OnElement::default()
                .element(|element| {
                    element.append("012345678901", ContentType::Text);
                    Directive::Continue
                })
            )
        );
        test_rewrite!(limited(), "<p>x</p><p>y</p>", "<p>x</p>0123456789012<p>y</p>0123456789012",
            Handlers::new().on("p", OnElement::default()
                .element(|element| {
                    element.after("0123456789012", ContentType::Text);
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn unsupported_encoding() {
        let result = Rewriter::new(Handlers::new(), Settings::default().encoding("UTF-16"), |_: &[u8]| ());
        match result {
            Err(error @ RewritingError::UnsupportedEncoding { .. }) =>
                assert_eq!(error.to_string(), "Expected ASCII-compatible encoding."),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected error"),
        }
        let result = Rewriter::new(Handlers::new(), Settings::default().encoding("nope"), |_: &[u8]| ());
        match result {
            Err(error) => assert_eq!(error.to_string(), "Unknown character encoding has been provided."),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn other_encodings() {
        let output = RefCell::new(Vec::new());
        {
            let handlers = Handlers::new()
                .on("p", OnElement::default()
                    .text(|chunk| {
                        if !chunk.last_in_text_node() {
                            assert_eq!(chunk.as_str(), "caf\u{e9}");
                            chunk.after(" \u{e0} la carte", ContentType::Text);
                        }
                        Directive::Continue
                    })
                );
            let settings = Settings::default().encoding("windows-1252");
            let mut rewriter = Rewriter::new(handlers, settings, |chunk: &[u8]| {
                output.borrow_mut().extend_from_slice(chunk)
            }).unwrap();
            rewriter.write(b"<p>caf\xe9</p>").unwrap();
            rewriter.end().unwrap();
        }
        assert_eq!(*output.borrow(), b"<p>caf\xe9 \xe0 la carte</p>".to_vec());
    }

    #[test]
    fn invalid_selector() {
        let result = Rewriter::new(
            Handlers::new().on("p:last-child", OnElement::default()),
            settings(),
            |_: &[u8]| (),
        );
        match result {
            Err(error @ RewritingError::InvalidSelector { .. }) => assert_eq!(
                error.to_string(),
                "Unsupported pseudo-class or pseudo-element in selector.",
            ),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn attributes() {
        let seen = RefCell::new(Vec::new());
        let output = rewrite_chunked("<div foo=42 bar='1337'>", 0, settings(), Handlers::new()
            .on("div", OnElement::default()
                .element(|element| {
                    for (name, value) in element.attributes() {
                        seen.borrow_mut().push((name.to_string(), value.to_string()));
                    }
                    Directive::Continue
                })
            )
        );
        assert_eq!(output, Ok("<div foo=42 bar='1337'>".into()));
        assert_eq!(*seen.borrow(), vec![
            ("foo".to_string(), "42".to_string()),
            ("bar".to_string(), "1337".to_string()),
        ]);
    }

    #[test]
    fn attribute_mutations() {
        test_rewrite!(settings(), "<a HREF=x target=_blank>y</a>", "<a HREF=x rel=\"no&quot;pe\">y</a>",
            Handlers::new().on("a[href]", OnElement::default()
                .element(|element| {
                    assert_eq!(element.get_attribute("href"), Some("x"));
                    element.remove_attribute("target");
                    element.set_attribute("rel", "no\"pe").unwrap();
                    assert!(element.set_attribute("a b", "x").is_err());
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn remove_element() {
        test_rewrite!(
            settings(),
            "<div><span>42</span></div><h1>Hello</h1><h2>Hello2</h2>",
            "<div><span>42</span></div><h2>Hello2</h2>",
            Handlers::new().on("h1", OnElement::default()
                .element(|element| {
                    element.remove();
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn remove_and_keep_content() {
        test_rewrite!(settings(), "<p><b>a<i>b</i></b>c</p>", "<p>a<i>b</i>c</p>", Handlers::new()
            .on("b", OnElement::default()
                .element(|element| {
                    element.remove_and_keep_content();
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn handlers_inside_removed_elements_still_run() {
        let count = RefCell::new(0);
        let output = rewrite_chunked("<div><p>x</p></div><p>y</p>", 0, settings(), Handlers::new()
            .on("div", OnElement::default()
                .element(|element| {
                    element.remove();
                    Directive::Continue
                })
            )
            .on("p", OnElement::default()
                .element(|element| {
                    *count.borrow_mut() += 1;
                    element.append("!", ContentType::Text);
                    Directive::Continue
                })
            )
        );
        assert_eq!(output, Ok("<p>y!</p>".into()));
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn content_insertions() {
        test_rewrite!(
            settings(),
            "<ul><li>a</li></ul>",
            "[<ul>(<li>a</li>)</ul>]",
            Handlers::new().on("ul", OnElement::default()
                .element(|element| {
                    element.before("[", ContentType::Text);
                    element.after("]", ContentType::Text);
                    element.prepend("(", ContentType::Text);
                    element.append(")", ContentType::Text);
                    Directive::Continue
                })
            )
        );
        test_rewrite!(settings(), "<p>a<b>b</b></p>", "<p>&lt;new&gt;</p>", Handlers::new()
            .on("p", OnElement::default()
                .element(|element| {
                    element.set_inner_content("<new>", ContentType::Text);
                    Directive::Continue
                })
            )
        );
        test_rewrite!(settings(), "<p id=1>a</p><p>b</p>", "<hr><p></p>", Handlers::new()
            .on("p", OnElement::default()
                .element(|element| {
                    if element.has_attribute("id") {
                        element.replace("<hr>", ContentType::Html);
                    }
                    Directive::Continue
                })
            )
            .on("p", OnElement::default()
                .text(|chunk| {
                    if chunk.as_str() == "b" {
                        chunk.remove();
                    }
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn void_element_insertions() {
        test_rewrite!(settings(), "<p>a<br>b</p>", "<p>a<br>|b</p>", Handlers::new()
            .on("br", OnElement::default()
                .element(|element| {
                    assert!(!element.can_have_content());
                    element.append("ignored", ContentType::Text);
                    element.after("|", ContentType::Text);
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn inserted_markup_is_rewritten() {
        test_rewrite!(settings(), "<div></div>", "<div><b class=\"hit\">x</b></div>", Handlers::new()
            .on("div", OnElement::default()
                .element(|element| {
                    element.set_inner_content("<b>x</b>", ContentType::Html);
                    Directive::Continue
                })
            )
            .on("div > b", OnElement::default()
                .element(|element| {
                    element.set_attribute("class", "hit").unwrap();
                    Directive::Continue
                })
            )
        );
        test_rewrite!(settings(), "<p>a</p>", "<p>a<i>unclosed</p>", Handlers::new()
            .on("p", OnElement::default()
                .element(|element| {
                    element.append("<i>unclosed", ContentType::Html);
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn insertion_depth_limit() {
        test_rewrite_error!(settings(), "<b></b>",
            RewritingError::InsertionDepthExceeded { limit: 32 },
            Handlers::new().on("b", OnElement::default()
                .element(|element| {
                    element.after("<b></b>", ContentType::Html);
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn selectors() {
        test_rewrite!(
            settings(),
            "<div class=a><p>1</p><section><p>2</p></section></div><p>3</p>",
            "<div class=a><p>1!</p><section><p>2</p></section></div><p>3</p>",
            Handlers::new().on("div.a > p", OnElement::default()
                .element(|element| {
                    element.append("!", ContentType::Text);
                    Directive::Continue
                })
            )
        );
        test_rewrite!(
            settings(),
            "<div class=a><p>1</p><section><p>2</p></section></div><p>3</p>",
            "<div class=a><p>1!</p><section><p>2!</p></section></div><p>3</p>",
            Handlers::new().on(".a p", OnElement::default()
                .element(|element| {
                    element.append("!", ContentType::Text);
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn deep_nesting_with_failing_descendant_selector() {
        let input = format!("{}<b></b>", "<a>".repeat(60));
        test_rewrite!(settings(), &input[..], &input[..], Handlers::new()
            .on("x a a a a a a a b", OnElement::default()
                .element(|element| {
                    element.set_attribute("hit", "1").unwrap();
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn universal_selector_counts_elements() {
        let names = RefCell::new(Vec::new());
        let output = rewrite_chunked("<a><b></b><c><d/></c><br><e></a>", 0, settings(), Handlers::new()
            .on("*", OnElement::default()
                .element(|element| {
                    names.borrow_mut().push(element.tag_name().to_string());
                    Directive::Continue
                })
            )
        );
        assert!(output.is_ok());
        assert_eq!(*names.borrow(), vec!["a", "b", "c", "d", "br", "e"]);
    }

    #[test]
    fn registration_order() {
        test_rewrite!(settings(), "<p>x</p>", "<p>12x</p>", Handlers::new()
            .on("p", OnElement::default()
                .element(|element| {
                    element.prepend("1", ContentType::Text);
                    Directive::Continue
                })
            )
            .on("*", OnElement::default()
                .element(|element| {
                    element.prepend("2", ContentType::Text);
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn scoped_text_and_comments() {
        test_rewrite!(settings(), "a<p>b<!--c--></p>d", "a<p>B<!--C--></p>d", Handlers::new()
            .on("p", OnElement::default()
                .text(|chunk| {
                    if chunk.as_str() == "b" {
                        chunk.replace("B", ContentType::Text);
                    }
                    Directive::Continue
                })
                .comments(|comment| {
                    comment.set_text("C").unwrap();
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn implied_end_tags() {
        test_rewrite!(settings(), "<ul><li>a<li>b</ul>", "<ul><li>a!<li>b!</ul>", Handlers::new()
            .on("li", OnElement::default()
                .element(|element| {
                    element.append("!", ContentType::Text);
                    Directive::Continue
                })
            )
        );
        test_rewrite!(settings(), "<p>a<div>b</div>", "<p>a</p><div>b</div>", Handlers::new()
            .on("p", OnElement::default()
                .element(|element| {
                    element.after("</p>", ContentType::Html);
                    Directive::Continue
                })
            )
        );
        test_rewrite!(settings(), "<p>a<span>b</span>", "<p>a<span>b!</span>", Handlers::new()
            .on("p span", OnElement::default()
                .element(|element| {
                    element.append("!", ContentType::Text);
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn end_tag_closes_open_descendants() {
        test_rewrite!(settings(), "<div><b>x</div>y", "<div><b>x+</div>y", Handlers::new()
            .on("b", OnElement::default()
                .element(|element| {
                    element.append("+", ContentType::Text);
                    Directive::Continue
                })
            )
            .on("div b", OnElement::default()
                .text(|chunk| {
                    assert_ne!(chunk.as_str(), "y");
                    Directive::Continue
                })
            )
        );
        test_rewrite!(settings(), "</span>a</p>", "</span>a</p>", Handlers::new());
    }

    #[test]
    fn raw_text_elements() {
        test_rewrite!(
            settings(),
            "<script>if (a < b) { x = '<p>'; }</script><p>y</p>",
            "<script>if (a < b) { x = '<p>'; }</script><p class=\"p\">y</p>",
            Handlers::new().on("p", OnElement::default()
                .element(|element| {
                    element.set_attribute("class", "p").unwrap();
                    Directive::Continue
                })
            )
        );
        test_rewrite!(settings(), "<svg><title><p>x</p></title></svg>", "<svg><title><p class=\"p\">x</p></title></svg>",
            Handlers::new().on("p", OnElement::default()
                .element(|element| {
                    element.set_attribute("class", "p").unwrap();
                    Directive::Continue
                })
            )
        );
    }

    #[test]
    fn markup_inserted_into_raw_text_elements() {
        let handlers = || Handlers::new()
            .on("script", OnElement::default()
                .element(|element| {
                    element.prepend("<b>y</b>", ContentType::Html);
                    Directive::Continue
                })
            )
            .on("textarea", OnElement::default()
                .element(|element| {
                    element.append("<i>", ContentType::Html);
                    Directive::Continue
                })
            )
            .on("b, i", OnElement::default()
                .element(|element| {
                    element.set_attribute("hit", "1").unwrap();
                    Directive::Continue
                })
            );
        test_rewrite!(settings(), "<script>x</script>", "<script><b>y</b>x</script>", handlers());
        test_rewrite!(settings(), "<textarea>a</textarea><b></b>",
            "<textarea>a<i></textarea><b hit=\"1\"></b>", handlers());
    }

    #[test]
    fn foreign_content() {
        let seen = RefCell::new(Vec::new());
        let output = rewrite_chunked(
            "<svg><rect/><foreignObject><div></div></foreignObject></svg><math><mi/></math>",
            0,
            settings(),
            Handlers::new().on("*", OnElement::default()
                .element(|element| {
                    seen.borrow_mut().push((
                        element.tag_name().to_string(),
                        element.namespace_uri(),
                        element.can_have_content(),
                    ));
                    Directive::Continue
                })
            )
        );
        assert!(output.is_ok());
        assert_eq!(*seen.borrow(), vec![
            ("svg".to_string(), content::Namespace::Svg.uri(), true),
            ("rect".to_string(), content::Namespace::Svg.uri(), false),
            ("foreignobject".to_string(), content::Namespace::Svg.uri(), true),
            ("div".to_string(), content::Namespace::Html.uri(), true),
            ("math".to_string(), content::Namespace::MathMl.uri(), true),
            ("mi".to_string(), content::Namespace::MathMl.uri(), false),
        ]);
    }

    #[test]
    fn stop() {
        let output = RefCell::new(Vec::new());
        let mut rewriter = session(Handlers::new()
            .on("b", OnElement::default()
                .element(|_| Directive::Stop)
            ),
            &output,
        );
        rewriter.write(b"<a>x</a>").unwrap();
        assert_eq!(rewriter.write(b"<b>y</b>"), Err(RewritingError::RewriterStopped));
        assert_eq!(rewriter.write(b"z"), Err(RewritingError::RewriterStopped));
        assert_eq!(rewriter.end(), Err(RewritingError::RewriterStopped));
        assert_eq!(*output.borrow(), b"<a>x</a>".to_vec());
    }

    #[test]
    fn lifecycle() {
        let output = RefCell::new(Vec::new());
        let mut rewriter = session(Handlers::new(), &output);
        assert_eq!(rewriter.write(b""), Ok(0));
        assert_eq!(rewriter.write(b"abc"), Ok(3));
        assert_eq!(rewriter.end(), Ok(()));
        assert_eq!(rewriter.write(b"d"), Err(RewritingError::WriteAfterEnd));
        assert_eq!(rewriter.end(), Err(RewritingError::EndAfterEnd));
        assert_eq!(*output.borrow(), b"abc".to_vec());

        let output = RefCell::new(Vec::new());
        let mut rewriter = session(Handlers::new(), &output);
        assert_eq!(rewriter.end(), Ok(()));
        assert!(output.borrow().is_empty());
    }

    #[test]
    fn strict_and_lenient() {
        test_rewrite_error!(settings(), "<div", RewritingError::Parse {
            error: parse::Error::UnclosedTag { .. },
        }, Handlers::new());
        test_rewrite_error!(settings(), "<a b=1 b=2>", RewritingError::Parse {
            error: parse::Error::DuplicateAttribute { .. },
        }, Handlers::new());
        test_rewrite!(Settings::default().strict(false), "<div", "<div", Handlers::new());
        test_rewrite!(Settings::default().strict(false), "a<!--b", "a<!--b", Handlers::new());
    }

    #[test]
    fn output_is_incremental() {
        let output = RefCell::new(Vec::new());
        let mut rewriter = session(Handlers::new(), &output);
        rewriter.write(b"<p>Hello").unwrap();
        assert_eq!(*output.borrow(), b"<p>Hello".to_vec());
        rewriter.write(b" <b").unwrap();
        assert_eq!(*output.borrow(), b"<p>Hello ".to_vec());
        rewriter.write(b">!").unwrap();
        assert_eq!(*output.borrow(), b"<p>Hello <b>!".to_vec());
    }
}
