
//! Token dispatch.
//!
//! The dispatcher keeps the open element stack, passes content units to the interested
//! handlers and writes the result of their mutations to the output. Markup inserted by
//! handlers is tokenized by a nested tokenizer and dispatched like regular input, so it is
//! visible to selectors and handlers as well.

use std::mem;

use encoding_rs;
use tendril;

use builder::Directive;
use content;
use content::Namespace;
use encoding;
use event;
use memory;
use modifier;
use modifier::attribute::Attributes;
use parse;
use select;
use text;
use transform::Registration;
use rewriter::{ tree, OutputSink, RewritingError };

/// Nesting limit for markup inserted while dispatching inserted markup.
const MAX_INSERTION_DEPTH: usize = 32;

#[derive(Debug)]
enum EndTag {
    Keep,
    Rename(tendril::StrTendril),
    Remove,
}

/// An open element.
#[derive(Debug)]
struct Entry {
    name: String,
    namespace: Namespace,
    attributes: Vec<(String, String)>,
    /// Registrations whose selector matched this element or one of its ancestors, sorted.
    active: Vec<usize>,
    suppresses_contents: bool,
    append: modifier::Content,
    after: modifier::Content,
    end_tag: EndTag,
    _charge: Option<memory::Charge>,
}

impl Entry {

    fn new(name: String, namespace: Namespace, attributes: Vec<(String, String)>) -> Entry {
        Entry {
            name,
            namespace,
            attributes,
            active: Vec::new(),
            suppresses_contents: false,
            append: modifier::Content::default(),
            after: modifier::Content::default(),
            end_tag: EndTag::Keep,
            _charge: None,
        }
    }
}

impl select::MatchTarget for Entry {

    fn local_name(&self) -> &str { &self.name }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|&&(ref found, _)| text::identifier_eq(found, name))
            .map(|&(_, ref value)| value.as_str())
    }
}

fn merged(inherited: &[usize], matched: &[usize]) -> Vec<usize> {
    let mut active = inherited.to_vec();
    for &index in matched {
        if let Err(position) = active.binary_search(&index) {
            active.insert(position, index);
        }
    }
    active
}

pub(crate) struct Dispatcher<'h, O> {
    registrations: Vec<Registration<'h>>,
    encoding: encoding::AsciiCompatibleEncoding,
    limiter: memory::Limiter,
    stack: Vec<Entry>,
    /// Stack entries below the floor belong to the document around inserted markup.
    floor: usize,
    /// Number of open elements suppressing their contents.
    suppressed: usize,
    /// Decoder of the current text node, while text handlers are interested in it.
    decoder: Option<encoding_rs::Decoder>,
    depth: usize,
    output: O,
}

impl<'h, O> Dispatcher<'h, O> where O: OutputSink {

    pub fn new(
        registrations: Vec<Registration<'h>>,
        encoding: encoding::AsciiCompatibleEncoding,
        limiter: memory::Limiter,
        output: O,
    ) -> Dispatcher<'h, O> {
        Dispatcher {
            registrations,
            encoding,
            limiter,
            stack: Vec::new(),
            floor: 0,
            suppressed: 0,
            decoder: None,
            depth: 0,
            output,
        }
    }

    pub fn output_mut(&mut self) -> &mut O { &mut self.output }

    pub fn into_output(self) -> O { self.output }

    /// Close all open elements and run the document end handlers.
    pub fn finish(&mut self) -> Result<(), RewritingError> {
        while !self.stack.is_empty() {
            self.close_top(None)?;
        }
        let mut end = content::DocumentEnd::new();
        for registration in &mut self.registrations {
            if let Some(ref mut handler) = registration.end {
                if handler.handle_document_end(&mut end) == Directive::Stop {
                    return Err(stopped("document end"));
                }
            }
        }
        self.emit_content(&end.into_content())
    }

    fn is_visible(&self) -> bool { self.suppressed == 0 }

    fn emit(&mut self, bytes: &[u8]) {
        if !bytes.is_empty() {
            self.output.handle_chunk(bytes);
        }
    }

    fn emit_content(&mut self, content: &modifier::Content) -> Result<(), RewritingError> {
        for piece in content.pieces() {
            match piece.content_type {
                modifier::ContentType::Text => {
                    let escaped = text::escape_text(&piece.content);
                    let bytes = self.encoding.encode(&escaped);
                    self.emit(&bytes);
                },
                modifier::ContentType::Html => {
                    let bytes = self.encoding.encode(&piece.content);
                    self.dispatch_fragment(&bytes)?;
                },
            }
        }
        Ok(())
    }

    fn dispatch_fragment(&mut self, markup: &[u8]) -> Result<(), RewritingError> {
        if self.depth >= MAX_INSERTION_DEPTH {
            debug!("inserted markup nested deeper than {} levels", MAX_INSERTION_DEPTH);
            return Err(RewritingError::InsertionDepthExceeded { limit: MAX_INSERTION_DEPTH });
        }
        let mode = self.stack.last()
            .and_then(|entry| tree::content_mode(&entry.name, entry.namespace))
            .unwrap_or(parse::Mode::Data);
        let options = parse::Options::default().strict(false).mode(mode);
        let mut tokenizer = parse::Tokenizer::new(options, &self.limiter)?;
        let floor = mem::replace(&mut self.floor, self.stack.len());
        let decoder = self.decoder.take();
        self.depth += 1;
        trace!("dispatching {} bytes of inserted markup at depth {}", markup.len(), self.depth);

        let mut result = tokenizer.feed(markup, self);
        if result.is_ok() {
            result = tokenizer.finish(self);
        }
        while result.is_ok() && self.stack.len() > self.floor {
            result = self.close_top(None);
        }

        self.depth -= 1;
        self.floor = floor;
        self.decoder = decoder;
        result
    }

    fn current_active(&self) -> &[usize] {
        match self.stack.last() {
            Some(entry) => &entry.active,
            None => &[],
        }
    }

    /// Registrations with a handler of interest for the current position, in order.
    fn interested<F>(&self, has_handler: F) -> Vec<usize>
    where F: Fn(&Registration<'h>) -> bool {
        let active = self.current_active();
        self.registrations
            .iter()
            .enumerate()
            .filter(|&(index, registration)|
                has_handler(registration)
                && (registration.selector.is_none() || active.binary_search(&index).is_ok())
            )
            .map(|(index, _)| index)
            .collect()
    }

    fn handle_start_tag(
        &mut self,
        raw: &[u8],
        name: event::Span,
        attributes: &[event::AttributeSpan],
        self_closing: bool,
    ) -> Result<parse::Feedback, RewritingError> {

        let name = self.encoding.decode(&raw[name]).to_ascii_lowercase();
        let namespace = tree::child_namespace(
            self.stack.last().map(|entry| (entry.name.as_str(), entry.namespace)),
            &name,
        );
        if namespace == Namespace::Html {
            for implied in tree::implied_by(&name) {
                self.close_implied(implied)?;
            }
        }
        let has_contents = match namespace {
            Namespace::Html => !tree::is_void(&name),
            Namespace::Svg | Namespace::MathMl => !self_closing,
        };

        let attributes = Attributes::from_source(raw, attributes, &self.encoding);
        let mut entry = Entry::new(name, namespace, attributes.to_pairs());
        let matched: Vec<usize> = self.registrations
            .iter()
            .enumerate()
            .filter(|&(_, registration)| match registration.selector {
                Some(ref selector) => selector.matches(&entry, &self.stack[..]),
                None => false,
            })
            .map(|(index, _)| index)
            .collect();
        entry.active = merged(self.current_active(), &matched);

        let mut element = content::Element::new(
            &entry.name,
            namespace,
            attributes,
            self_closing,
            has_contents,
        );
        for &index in &matched {
            if let Some(ref mut handler) = self.registrations[index].element {
                if handler.handle_element(&mut element) == Directive::Stop {
                    return Err(stopped("element"));
                }
            }
        }

        let visible = self.is_visible();
        let start_tag =
            if element.is_modified() {
                Some(element.serialize_start_tag(&self.encoding))
            } else {
                None
            };
        let content::ElementMutations {
            before, after, prepend, append, inner, replacement, removal, renamed,
        } = element.into_mutations();

        if visible {
            self.emit_content(&before)?;
            if let Some(ref replacement) = replacement {
                self.emit_content(replacement)?;
            }
            if !removal.drops_tags() {
                match start_tag {
                    Some(ref start_tag) => self.emit(start_tag),
                    None => self.emit(raw),
                }
            }
        }
        if !has_contents {
            if visible {
                self.emit_content(&after)?;
            }
            return Ok(parse::Feedback::Continue);
        }

        let mode = tree::content_mode(&entry.name, namespace);
        entry.suppresses_contents = removal.drops_contents() || inner.is_some();
        entry.end_tag = match renamed {
            _ if removal.drops_tags() => EndTag::Remove,
            Some(name) => EndTag::Rename(name),
            None => EndTag::Keep,
        };
        if !removal.drops_contents() {
            entry.append = append;
        }
        entry.after = after;
        let pending = entry.append.len() + entry.after.len() + match entry.end_tag {
            EndTag::Rename(ref name) => name.len(),
            EndTag::Keep | EndTag::Remove => 0,
        };
        if pending > 0 {
            entry._charge = Some(self.limiter.charge(pending)?);
        }
        trace!("opened <{}> ({:?}) at depth {}", entry.name, namespace, self.stack.len());
        let suppresses_contents = entry.suppresses_contents;
        self.stack.push(entry);

        if visible && !removal.drops_contents() {
            self.emit_content(&prepend)?;
            if let Some(ref inner) = inner {
                self.emit_content(inner)?;
            }
        }
        if suppresses_contents {
            self.suppressed += 1;
        }

        Ok(match mode {
            Some(mode) => parse::Feedback::SwitchTo(mode),
            None => parse::Feedback::Continue,
        })
    }

    fn close_implied(&mut self, implied: tree::Implied) -> Result<(), RewritingError> {
        let found = match implied {
            tree::Implied::Current { targets } =>
                match self.stack[self.floor..].last() {
                    Some(entry) if entry.namespace == Namespace::Html
                        && targets.contains(&entry.name.as_str()) =>
                        Some(self.stack.len() - 1),
                    _ => None,
                },
            tree::Implied::InScope { targets, boundaries } => {
                let mut found = None;
                for (index, entry) in self.stack.iter().enumerate().skip(self.floor).rev() {
                    if entry.namespace != Namespace::Html {
                        break;
                    }
                    if targets.contains(&entry.name.as_str()) {
                        found = Some(index);
                        break;
                    }
                    if boundaries.contains(&entry.name.as_str()) {
                        break;
                    }
                }
                found
            },
        };
        if let Some(index) = found {
            while self.stack.len() > index {
                self.close_top(None)?;
            }
        }
        Ok(())
    }

    fn handle_end_tag(&mut self, raw: &[u8], name: event::Span) -> Result<(), RewritingError> {
        let name = self.encoding.decode(&raw[name]).to_ascii_lowercase();
        let found = self.stack[self.floor..].iter().rposition(|entry| entry.name == name);
        match found {
            Some(position) => {
                let index = self.floor + position;
                while self.stack.len() > index + 1 {
                    self.close_top(None)?;
                }
                self.close_top(Some(raw))
            },
            None => {
                trace!("stray end tag </{}> passed through", name);
                if self.is_visible() {
                    self.emit(raw);
                }
                Ok(())
            },
        }
    }

    /// Close the innermost element. Without end tag bytes it is closed implicitly.
    fn close_top(&mut self, end_tag: Option<&[u8]>) -> Result<(), RewritingError> {
        let (append, suppressed_contents) = match self.stack.last_mut() {
            Some(entry) => (
                mem::replace(&mut entry.append, modifier::Content::default()),
                mem::replace(&mut entry.suppresses_contents, false),
            ),
            None => return Ok(()),
        };
        if suppressed_contents {
            self.suppressed -= 1;
        }
        if self.is_visible() {
            self.emit_content(&append)?;
        }
        let entry = match self.stack.pop() {
            Some(entry) => entry,
            None => return Ok(()),
        };
        trace!("closed <{}>{}", entry.name, if end_tag.is_some() { "" } else { " implicitly" });
        if self.is_visible() {
            if let Some(raw) = end_tag {
                match entry.end_tag {
                    EndTag::Keep => self.emit(raw),
                    EndTag::Rename(ref name) => {
                        let mut tag = b"</".to_vec();
                        tag.extend_from_slice(&self.encoding.encode(name));
                        tag.push(b'>');
                        self.emit(&tag);
                    },
                    EndTag::Remove => (),
                }
            }
            self.emit_content(&entry.after)?;
        }
        Ok(())
    }

    fn handle_text(&mut self, raw: &[u8], last: bool) -> Result<(), RewritingError> {
        let interested = self.interested(|registration| registration.text.is_some());
        if interested.is_empty() {
            if last {
                self.decoder = None;
            } else if self.is_visible() {
                self.emit(raw);
            }
            return Ok(());
        }

        let decoded = {
            let encoding = self.encoding;
            let decoder = self.decoder.get_or_insert_with(|| encoding.new_decoder());
            let mut decoded = String::with_capacity(decoder
                .max_utf8_buffer_length(raw.len())
                .unwrap_or(raw.len()));
            let mut rest = raw;
            loop {
                let (result, read, _) = decoder.decode_to_string(rest, &mut decoded, last);
                rest = &rest[read..];
                match result {
                    encoding_rs::CoderResult::InputEmpty => break,
                    encoding_rs::CoderResult::OutputFull =>
                        decoded.reserve(rest.len().saturating_mul(3).saturating_add(16)),
                }
            }
            decoded
        };
        if last {
            self.decoder = None;
        }

        let mut chunk = content::TextChunk::new(decoded, last);
        for index in interested {
            if let Some(ref mut handler) = self.registrations[index].text {
                if handler.handle_text(&mut chunk) == Directive::Stop {
                    return Err(stopped("text"));
                }
            }
        }
        if self.is_visible() {
            let mutations = chunk.into_mutations();
            self.emit_content(&mutations.before)?;
            if mutations.removed {
                self.emit_content(&mutations.replacement)?;
            } else {
                self.emit(raw);
            }
            self.emit_content(&mutations.after)?;
        }
        Ok(())
    }

    fn handle_comment(&mut self, raw: &[u8], text: event::Span) -> Result<(), RewritingError> {
        let interested = self.interested(|registration| registration.comments.is_some());
        if interested.is_empty() {
            if self.is_visible() {
                self.emit(raw);
            }
            return Ok(());
        }

        let mut comment = content::Comment::new(self.encoding.decode(&raw[text]));
        for index in interested {
            if let Some(ref mut handler) = self.registrations[index].comments {
                if handler.handle_comment(&mut comment) == Directive::Stop {
                    return Err(stopped("comment"));
                }
            }
        }
        if self.is_visible() {
            let modified = comment.is_modified();
            let (text, mutations) = comment.into_parts();
            self.emit_content(&mutations.before)?;
            if mutations.removed {
                self.emit_content(&mutations.replacement)?;
            } else if modified {
                let mut serialized = b"<!--".to_vec();
                serialized.extend_from_slice(&self.encoding.encode(&text));
                serialized.extend_from_slice(b"-->");
                self.emit(&serialized);
            } else {
                self.emit(raw);
            }
            self.emit_content(&mutations.after)?;
        }
        Ok(())
    }

    fn handle_doctype(
        &mut self,
        raw: &[u8],
        name: Option<event::Span>,
        public_id: Option<event::Span>,
        system_id: Option<event::Span>,
    ) -> Result<(), RewritingError> {

        let interested = self.interested(|registration| registration.doctype.is_some());
        if !interested.is_empty() {
            let doctype = {
                let encoding = self.encoding;
                let decode = |span: Option<event::Span>| span.map(|span| encoding.decode(&raw[span]));
                content::Doctype::new(
                    decode(name).map(|name| name.to_ascii_lowercase()),
                    decode(public_id),
                    decode(system_id),
                )
            };
            for index in interested {
                if let Some(ref mut handler) = self.registrations[index].doctype {
                    if handler.handle_doctype(&doctype) == Directive::Stop {
                        return Err(stopped("doctype"));
                    }
                }
            }
        }
        if self.is_visible() {
            self.emit(raw);
        }
        Ok(())
    }
}

fn stopped(unit: &str) -> RewritingError {
    debug!("rewriting stopped by {} handler", unit);
    RewritingError::RewriterStopped
}

impl<'h, O> parse::TokenSink for Dispatcher<'h, O> where O: OutputSink {

    type Error = RewritingError;

    fn handle_event(&mut self, event: event::Event, raw: &[u8])
    -> Result<parse::Feedback, RewritingError> {
        match event {
            event::Event::Text =>
                self.handle_text(raw, false)?,
            event::Event::TextEnd =>
                self.handle_text(&[], true)?,
            event::Event::Comment { text } =>
                self.handle_comment(raw, text)?,
            event::Event::Doctype { name, public_id, system_id } =>
                self.handle_doctype(raw, name, public_id, system_id)?,
            event::Event::StartTag { name, attributes, self_closing } =>
                return self.handle_start_tag(raw, name, &attributes, self_closing),
            event::Event::EndTag { name } =>
                self.handle_end_tag(raw, name)?,
        }
        Ok(parse::Feedback::Continue)
    }
}
