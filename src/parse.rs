
//! Chunked, resumable HTML tokenizer.
//!
//! The tokenizer works on raw bytes of an ASCII-compatible encoding. It keeps only the
//! bytes of the token that is currently in progress; text is streamed out as soon as it
//! is seen. Every state transition can be driven by a single byte, so feeding the input
//! in arbitrary chunks yields the same tokens as feeding it at once (text runs may be
//! split differently).

use std::fmt;
use std::error;
use std::mem;

use memchr;

use event;
use location;
use memory;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Options {
    pub strict: bool,
    pub preallocated_buffer_size: usize,
    /// Mode the tokenizer starts in.
    pub mode: Mode,
}

impl Options {

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn preallocated_buffer_size(mut self, size: usize) -> Self {
        self.preallocated_buffer_size = size;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for Options {

    fn default() -> Options {
        Options {
            strict: true,
            preallocated_buffer_size: 0,
            mode: Mode::Data,
        }
    }
}

/// Markup that strict mode refuses to guess about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input ended inside a start or end tag.
    UnclosedTag {
        /// Name of the unfinished tag, as far as it was read.
        tag_name: String,
        /// Start of the tag.
        location: location::Location,
    },
    /// The input ended inside a comment.
    UnclosedComment {
        /// Start of the comment.
        location: location::Location,
    },
    /// The input ended inside a doctype declaration.
    UnclosedDoctype {
        /// Start of the doctype.
        location: location::Location,
    },
    /// The input ended inside a `<!` or `<?` markup declaration.
    UnclosedMarkupDeclaration {
        /// Start of the declaration.
        location: location::Location,
    },
    /// A tag or attribute name contained a NUL byte.
    NullInName {
        /// Start of the tag.
        location: location::Location,
    },
    /// An attribute name contained a quote, `<` or `=`.
    InvalidAttributeName {
        /// The offending character.
        character: char,
        /// Start of the tag.
        location: location::Location,
    },
    /// The same attribute name was used twice on one tag.
    DuplicateAttribute {
        /// Name of the tag.
        tag_name: String,
        /// Name of the repeated attribute.
        attribute_name: String,
        /// Start of the tag.
        location: location::Location,
    },
}

impl error::Error for Error {}

impl fmt::Display for Error {

    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UnclosedTag { ref tag_name, location } =>
                write!(fmt, "Unclosed tag '{}' at {}", tag_name, location),
            Error::UnclosedComment { location } =>
                write!(fmt, "Unclosed comment at {}", location),
            Error::UnclosedDoctype { location } =>
                write!(fmt, "Unclosed doctype directive at {}", location),
            Error::UnclosedMarkupDeclaration { location } =>
                write!(fmt, "Unclosed markup declaration at {}", location),
            Error::NullInName { location } =>
                write!(fmt, "NUL character in a name of the tag at {}", location),
            Error::InvalidAttributeName { character, location } =>
                write!(fmt, "Ambiguous character '{}' in attribute name of the tag at {}",
                    character.escape_default(),
                    location,
                ),
            Error::DuplicateAttribute { ref tag_name, ref attribute_name, location } =>
                write!(fmt, "Duplicate attribute '{}' on tag '{}' at {}",
                    attribute_name,
                    tag_name,
                    location,
                ),
        }
    }
}

/// Tokenizer mode requested by the consumer after a start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Data,
    /// Text until the matching end tag of the given (lowercase) element.
    RawText(&'static str),
    /// Text until the end of input.
    PlainText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Feedback {
    Continue,
    SwitchTo(Mode),
}

/// Receiver of the tokens.
pub(crate) trait TokenSink {

    type Error: From<Error> + From<memory::MemoryLimitExceeded>;

    /// Handle one token. `raw` holds the complete source bytes of the token.
    fn handle_event(&mut self, event: event::Event, raw: &[u8])
    -> Result<Feedback, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    RawText(&'static str),
    PlainText,
    TagOpen,
    EndTagOpen,
    TagName,
    BeforeAttributeName,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValueQuoted(u8),
    AttributeValueUnquoted,
    AfterAttributeValueQuoted,
    SelfClosingStartTag,
    MarkupDeclarationOpen,
    MarkupDeclarationDash,
    DoctypeKeyword(usize),
    DoctypeBody,
    CommentStart,
    CommentStartDash,
    Comment,
    CommentEndDash,
    CommentEnd,
    CommentEndBang,
    BogusComment,
    RawTextLessThan(&'static str),
    RawTextEndTagName(&'static str, usize),
}

impl State {

    fn for_mode(mode: Mode) -> State {
        match mode {
            Mode::Data => State::Data,
            Mode::RawText(name) => State::RawText(name),
            Mode::PlainText => State::PlainText,
        }
    }

    fn is_markup(&self) -> bool {
        match *self {
            State::Data | State::RawText(_) | State::PlainText => false,
            _ => true,
        }
    }
}

/// Spans collected for the token in progress, relative to the token start.
#[derive(Debug, Default)]
struct Draft {
    is_end_tag: bool,
    name_start: usize,
    name_end: usize,
    attributes: Vec<event::AttributeSpan>,
    attribute_start: usize,
    attribute_name_end: usize,
    value_start: usize,
    text_start: usize,
    text_end: usize,
}

impl Draft {

    fn push_attribute(&mut self, value: Option<event::Span>, raw_end: usize) {
        self.attributes.push(event::AttributeSpan {
            name: self.attribute_start..self.attribute_name_end,
            value,
            raw: self.attribute_start..raw_end,
        });
    }
}

fn is_whitespace(byte: u8) -> bool {
    match byte {
        b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => true,
        _ => false,
    }
}

const DOCTYPE_KEYWORD: &[u8] = b"doctype";

#[derive(Debug)]
pub(crate) struct Tokenizer {
    state: State,
    options: Options,
    pending: memory::Buffer,
    draft: Draft,
    in_text: bool,
    consumed: usize,
    token_start: usize,
    token_location: location::Location,
    cursor: location::Location,
    cursor_pos: usize,
}

type StepResult<E> = Result<usize, E>;

impl Tokenizer {

    pub fn new(options: Options, limiter: &memory::Limiter)
    -> Result<Tokenizer, memory::MemoryLimitExceeded> {
        Ok(Tokenizer {
            state: State::for_mode(options.mode),
            options,
            pending: memory::Buffer::new(limiter, options.preallocated_buffer_size)?,
            draft: Draft::default(),
            in_text: false,
            consumed: 0,
            token_start: 0,
            token_location: location::Location::at_start(),
            cursor: location::Location::at_start(),
            cursor_pos: 0,
        })
    }

    /// Tokenize the next chunk of input.
    pub fn feed<S>(&mut self, chunk: &[u8], sink: &mut S) -> Result<(), S::Error>
    where S: TokenSink {

        let mut pos = 0;
        while pos < chunk.len() {
            pos = self.step(chunk, pos, sink)?;
        }

        if self.state.is_markup() {
            let start = self.token_start_in_chunk();
            self.pending.extend(&chunk[start..])?;
        }
        self.cursor = self.cursor.with_consumed(&chunk[self.cursor_pos..]);
        self.cursor_pos = 0;
        self.consumed += chunk.len();
        Ok(())
    }

    /// Signal the end of input.
    ///
    /// Partial `<` and `</` sequences are text. Other unterminated markup is an error in
    /// strict mode and text otherwise.
    pub fn finish<S>(&mut self, sink: &mut S) -> Result<(), S::Error>
    where S: TokenSink {

        match self.state {
            State::Data | State::RawText(_) | State::PlainText => (),
            State::TagOpen
            | State::EndTagOpen
            | State::RawTextLessThan(_)
            | State::RawTextEndTagName(_, _) =>
                self.emit_pending_as_text(&[], 0, sink)?,
            state =>
                if self.options.strict {
                    return Err(self.unterminated(state).into());
                } else {
                    trace!("unterminated markup at {} passed through as text",
                        self.token_location,
                    );
                    self.emit_pending_as_text(&[], 0, sink)?;
                },
        }
        self.state = State::Data;
        self.finish_text(sink)
    }

    fn unterminated(&self, state: State) -> Error {
        let location = self.token_location;
        match state {
            State::DoctypeBody => Error::UnclosedDoctype { location },
            State::CommentStart
            | State::CommentStartDash
            | State::Comment
            | State::CommentEndDash
            | State::CommentEnd
            | State::CommentEndBang => Error::UnclosedComment { location },
            State::MarkupDeclarationOpen
            | State::MarkupDeclarationDash
            | State::DoctypeKeyword(_)
            | State::BogusComment => Error::UnclosedMarkupDeclaration { location },
            _ => {
                let raw = self.pending.as_slice();
                let name_end =
                    if state == State::TagName { raw.len() } else { self.draft.name_end };
                let name_start = self.draft.name_start.min(name_end);
                Error::UnclosedTag {
                    tag_name: String::from_utf8_lossy(&raw[name_start..name_end]).into_owned(),
                    location,
                }
            },
        }
    }

    fn rel(&self, pos: usize) -> usize {
        self.consumed + pos - self.token_start
    }

    fn token_start_in_chunk(&self) -> usize {
        if self.pending.is_empty() {
            self.token_start - self.consumed
        } else {
            0
        }
    }

    fn location_at(&mut self, chunk: &[u8], pos: usize) -> location::Location {
        self.cursor = self.cursor.with_consumed(&chunk[self.cursor_pos..pos]);
        self.cursor_pos = pos;
        self.cursor
    }

    fn start_token(&mut self, chunk: &[u8], pos: usize) {
        self.token_start = self.consumed + pos;
        self.token_location = self.location_at(chunk, pos);
        self.draft = Draft::default();
    }

    fn emit_text<S>(&mut self, text: &[u8], sink: &mut S) -> Result<(), S::Error>
    where S: TokenSink {
        if !text.is_empty() {
            self.in_text = true;
            sink.handle_event(event::Event::Text, text)?;
        }
        Ok(())
    }

    fn finish_text<S>(&mut self, sink: &mut S) -> Result<(), S::Error>
    where S: TokenSink {
        if self.in_text {
            self.in_text = false;
            sink.handle_event(event::Event::TextEnd, &[])?;
        }
        Ok(())
    }

    /// Hand out the bytes of the token in progress, up to `end` in `chunk`, as text.
    fn emit_pending_as_text<S>(&mut self, chunk: &[u8], end: usize, sink: &mut S)
    -> Result<(), S::Error>
    where S: TokenSink {
        if self.pending.is_empty() {
            let start = self.token_start_in_chunk();
            self.in_text = true;
            sink.handle_event(event::Event::Text, &chunk[start..end])?;
        } else {
            self.pending.extend(&chunk[..end])?;
            self.in_text = true;
            sink.handle_event(event::Event::Text, self.pending.as_slice())?;
            self.pending.clear();
        }
        Ok(())
    }

    fn emit_token<S, F>(&mut self, chunk: &[u8], end: usize, sink: &mut S, build: F)
    -> Result<(), S::Error>
    where
        S: TokenSink,
        F: FnOnce(&[u8]) -> event::Event,
    {
        self.state = State::Data;
        if !self.pending.is_empty() {
            self.pending.extend(&chunk[..end])?;
        }
        let feedback = {
            let raw = if self.pending.is_empty() {
                &chunk[self.token_start_in_chunk()..end]
            } else {
                self.pending.as_slice()
            };
            let event = build(raw);
            if self.options.strict {
                check_duplicate_attributes(&event, raw, self.token_location)?;
            }
            trace!("{} at {} ({} bytes)", event.description(), self.token_location, raw.len());
            sink.handle_event(event, raw)?
        };
        self.pending.clear();
        if let Feedback::SwitchTo(mode) = feedback {
            trace!("switching to {:?}", mode);
            self.state = State::for_mode(mode);
        }
        Ok(())
    }

    fn emit_tag<S>(&mut self, chunk: &[u8], end: usize, sink: &mut S) -> Result<(), S::Error>
    where S: TokenSink {
        let draft = mem::replace(&mut self.draft, Draft::default());
        let name = draft.name_start..draft.name_end;
        let event =
            if draft.is_end_tag {
                event::end_tag(name)
            } else {
                let self_closing = self.state == State::SelfClosingStartTag;
                event::start_tag(name, draft.attributes, self_closing)
            };
        self.emit_token(chunk, end, sink, move |_| event)
    }

    fn emit_comment<S>(&mut self, chunk: &[u8], end: usize, sink: &mut S)
    -> Result<(), S::Error>
    where S: TokenSink {
        let text = self.draft.text_start..self.draft.text_end.max(self.draft.text_start);
        self.emit_token(chunk, end, sink, move |_| event::comment(text))
    }

    fn check_name_byte(&self, byte: u8) -> Result<(), Error> {
        if byte == 0 && self.options.strict {
            return Err(Error::NullInName { location: self.token_location });
        }
        Ok(())
    }

    fn check_attribute_name_byte(&self, byte: u8) -> Result<(), Error> {
        self.check_name_byte(byte)?;
        match byte {
            b'"' | b'\'' | b'<' | b'=' if self.options.strict =>
                Err(Error::InvalidAttributeName {
                    character: byte as char,
                    location: self.token_location,
                }),
            _ => Ok(()),
        }
    }

    fn start_attribute(&mut self, byte: u8, pos: usize) -> Result<(), Error> {
        self.check_attribute_name_byte(byte)?;
        self.draft.attribute_start = self.rel(pos);
        self.state = State::AttributeName;
        Ok(())
    }

    fn step<S>(&mut self, chunk: &[u8], pos: usize, sink: &mut S) -> StepResult<S::Error>
    where S: TokenSink {

        let byte = chunk[pos];

        match self.state {
            State::Data =>
                match memchr::memchr(b'<', &chunk[pos..]) {
                    Some(len) => {
                        self.emit_text(&chunk[pos..(pos + len)], sink)?;
                        self.start_token(chunk, pos + len);
                        self.state = State::TagOpen;
                        Ok(pos + len + 1)
                    },
                    None => {
                        self.emit_text(&chunk[pos..], sink)?;
                        Ok(chunk.len())
                    },
                },
            State::PlainText => {
                self.emit_text(&chunk[pos..], sink)?;
                Ok(chunk.len())
            },
            State::RawText(name) =>
                match memchr::memchr(b'<', &chunk[pos..]) {
                    Some(len) => {
                        self.emit_text(&chunk[pos..(pos + len)], sink)?;
                        self.start_token(chunk, pos + len);
                        self.state = State::RawTextLessThan(name);
                        Ok(pos + len + 1)
                    },
                    None => {
                        self.emit_text(&chunk[pos..], sink)?;
                        Ok(chunk.len())
                    },
                },
            State::TagOpen =>
                match byte {
                    b'!' => {
                        self.finish_text(sink)?;
                        self.state = State::MarkupDeclarationOpen;
                        Ok(pos + 1)
                    },
                    b'/' => {
                        self.state = State::EndTagOpen;
                        Ok(pos + 1)
                    },
                    b'?' => {
                        self.finish_text(sink)?;
                        self.draft.text_start = self.rel(pos);
                        self.state = State::BogusComment;
                        Ok(pos + 1)
                    },
                    byte if byte.is_ascii_alphabetic() => {
                        self.finish_text(sink)?;
                        self.draft.is_end_tag = false;
                        self.draft.name_start = self.rel(pos);
                        self.state = State::TagName;
                        Ok(pos + 1)
                    },
                    _ => {
                        self.emit_pending_as_text(chunk, pos, sink)?;
                        self.state = State::Data;
                        Ok(pos)
                    },
                },
            State::EndTagOpen =>
                match byte {
                    byte if byte.is_ascii_alphabetic() => {
                        self.finish_text(sink)?;
                        self.draft.is_end_tag = true;
                        self.draft.name_start = self.rel(pos);
                        self.state = State::TagName;
                        Ok(pos + 1)
                    },
                    b'>' => {
                        self.emit_pending_as_text(chunk, pos + 1, sink)?;
                        self.state = State::Data;
                        Ok(pos + 1)
                    },
                    _ => {
                        self.finish_text(sink)?;
                        self.draft.text_start = self.rel(pos);
                        self.state = State::BogusComment;
                        Ok(pos)
                    },
                },
            State::TagName =>
                match byte {
                    byte if is_whitespace(byte) => {
                        self.draft.name_end = self.rel(pos);
                        self.state = State::BeforeAttributeName;
                        Ok(pos + 1)
                    },
                    b'/' => {
                        self.draft.name_end = self.rel(pos);
                        self.state = State::SelfClosingStartTag;
                        Ok(pos + 1)
                    },
                    b'>' => {
                        self.draft.name_end = self.rel(pos);
                        self.emit_tag(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    byte => {
                        self.check_name_byte(byte)?;
                        Ok(pos + 1)
                    },
                },
            State::BeforeAttributeName =>
                match byte {
                    byte if is_whitespace(byte) => Ok(pos + 1),
                    b'/' => {
                        self.state = State::SelfClosingStartTag;
                        Ok(pos + 1)
                    },
                    b'>' => {
                        self.emit_tag(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    byte => {
                        self.start_attribute(byte, pos)?;
                        Ok(pos + 1)
                    },
                },
            State::AttributeName =>
                match byte {
                    byte if is_whitespace(byte) => {
                        self.draft.attribute_name_end = self.rel(pos);
                        self.state = State::AfterAttributeName;
                        Ok(pos + 1)
                    },
                    b'/' => {
                        let end = self.rel(pos);
                        self.draft.attribute_name_end = end;
                        self.draft.push_attribute(None, end);
                        self.state = State::SelfClosingStartTag;
                        Ok(pos + 1)
                    },
                    b'=' => {
                        self.draft.attribute_name_end = self.rel(pos);
                        self.state = State::BeforeAttributeValue;
                        Ok(pos + 1)
                    },
                    b'>' => {
                        let end = self.rel(pos);
                        self.draft.attribute_name_end = end;
                        self.draft.push_attribute(None, end);
                        self.emit_tag(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    byte => {
                        self.check_attribute_name_byte(byte)?;
                        Ok(pos + 1)
                    },
                },
            State::AfterAttributeName =>
                match byte {
                    byte if is_whitespace(byte) => Ok(pos + 1),
                    b'/' => {
                        let end = self.draft.attribute_name_end;
                        self.draft.push_attribute(None, end);
                        self.state = State::SelfClosingStartTag;
                        Ok(pos + 1)
                    },
                    b'=' => {
                        self.state = State::BeforeAttributeValue;
                        Ok(pos + 1)
                    },
                    b'>' => {
                        let end = self.draft.attribute_name_end;
                        self.draft.push_attribute(None, end);
                        self.emit_tag(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    byte => {
                        let end = self.draft.attribute_name_end;
                        self.draft.push_attribute(None, end);
                        self.start_attribute(byte, pos)?;
                        Ok(pos + 1)
                    },
                },
            State::BeforeAttributeValue =>
                match byte {
                    byte if is_whitespace(byte) => Ok(pos + 1),
                    b'"' | b'\'' => {
                        self.draft.value_start = self.rel(pos) + 1;
                        self.state = State::AttributeValueQuoted(byte);
                        Ok(pos + 1)
                    },
                    b'>' => {
                        let end = self.rel(pos);
                        self.draft.push_attribute(Some(end..end), end);
                        self.emit_tag(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    _ => {
                        self.draft.value_start = self.rel(pos);
                        self.state = State::AttributeValueUnquoted;
                        Ok(pos + 1)
                    },
                },
            State::AttributeValueQuoted(quote) =>
                match memchr::memchr(quote, &chunk[pos..]) {
                    Some(len) => {
                        let value_end = self.rel(pos + len);
                        let value = self.draft.value_start..value_end;
                        self.draft.push_attribute(Some(value), value_end + 1);
                        self.state = State::AfterAttributeValueQuoted;
                        Ok(pos + len + 1)
                    },
                    None => Ok(chunk.len()),
                },
            State::AttributeValueUnquoted =>
                match byte {
                    byte if is_whitespace(byte) => {
                        let end = self.rel(pos);
                        let value = self.draft.value_start..end;
                        self.draft.push_attribute(Some(value), end);
                        self.state = State::BeforeAttributeName;
                        Ok(pos + 1)
                    },
                    b'>' => {
                        let end = self.rel(pos);
                        let value = self.draft.value_start..end;
                        self.draft.push_attribute(Some(value), end);
                        self.emit_tag(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    _ => Ok(pos + 1),
                },
            State::AfterAttributeValueQuoted =>
                match byte {
                    byte if is_whitespace(byte) => {
                        self.state = State::BeforeAttributeName;
                        Ok(pos + 1)
                    },
                    b'/' => {
                        self.state = State::SelfClosingStartTag;
                        Ok(pos + 1)
                    },
                    b'>' => {
                        self.emit_tag(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    _ => {
                        self.state = State::BeforeAttributeName;
                        Ok(pos)
                    },
                },
            State::SelfClosingStartTag =>
                match byte {
                    b'>' => {
                        self.emit_tag(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    _ => {
                        self.state = State::BeforeAttributeName;
                        Ok(pos)
                    },
                },
            State::MarkupDeclarationOpen =>
                match byte {
                    b'-' => {
                        self.state = State::MarkupDeclarationDash;
                        Ok(pos + 1)
                    },
                    b'd' | b'D' => {
                        self.state = State::DoctypeKeyword(1);
                        Ok(pos + 1)
                    },
                    _ => {
                        self.draft.text_start = self.rel(pos);
                        self.state = State::BogusComment;
                        Ok(pos)
                    },
                },
            State::MarkupDeclarationDash =>
                match byte {
                    b'-' => {
                        self.draft.text_start = self.rel(pos) + 1;
                        self.state = State::CommentStart;
                        Ok(pos + 1)
                    },
                    _ => {
                        self.draft.text_start = self.rel(pos) - 1;
                        self.state = State::BogusComment;
                        Ok(pos)
                    },
                },
            State::DoctypeKeyword(matched) =>
                if byte.to_ascii_lowercase() == DOCTYPE_KEYWORD[matched] {
                    if matched + 1 == DOCTYPE_KEYWORD.len() {
                        self.draft.text_start = self.rel(pos) + 1;
                        self.state = State::DoctypeBody;
                    } else {
                        self.state = State::DoctypeKeyword(matched + 1);
                    }
                    Ok(pos + 1)
                } else {
                    self.draft.text_start = self.rel(pos) - matched;
                    self.state = State::BogusComment;
                    Ok(pos)
                },
            State::DoctypeBody =>
                match memchr::memchr(b'>', &chunk[pos..]) {
                    Some(len) => {
                        let body = self.draft.text_start..self.rel(pos + len);
                        self.emit_token(chunk, pos + len + 1, sink, move |raw| {
                            event::doctype(raw, body)
                        })?;
                        Ok(pos + len + 1)
                    },
                    None => Ok(chunk.len()),
                },
            State::CommentStart =>
                match byte {
                    b'-' => {
                        self.state = State::CommentStartDash;
                        Ok(pos + 1)
                    },
                    b'>' => {
                        self.draft.text_end = self.draft.text_start;
                        self.emit_comment(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    _ => {
                        self.state = State::Comment;
                        Ok(pos)
                    },
                },
            State::CommentStartDash =>
                match byte {
                    b'-' => {
                        self.draft.text_end = self.draft.text_start;
                        self.state = State::CommentEnd;
                        Ok(pos + 1)
                    },
                    b'>' => {
                        self.draft.text_end = self.draft.text_start;
                        self.emit_comment(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    _ => {
                        self.state = State::Comment;
                        Ok(pos)
                    },
                },
            State::Comment =>
                match memchr::memchr(b'-', &chunk[pos..]) {
                    Some(len) => {
                        self.draft.text_end = self.rel(pos + len);
                        self.state = State::CommentEndDash;
                        Ok(pos + len + 1)
                    },
                    None => Ok(chunk.len()),
                },
            State::CommentEndDash =>
                match byte {
                    b'-' => {
                        self.state = State::CommentEnd;
                        Ok(pos + 1)
                    },
                    _ => {
                        self.state = State::Comment;
                        Ok(pos)
                    },
                },
            State::CommentEnd =>
                match byte {
                    b'>' => {
                        self.emit_comment(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    b'!' => {
                        self.state = State::CommentEndBang;
                        Ok(pos + 1)
                    },
                    b'-' => {
                        self.draft.text_end += 1;
                        Ok(pos + 1)
                    },
                    _ => {
                        self.state = State::Comment;
                        Ok(pos)
                    },
                },
            State::CommentEndBang =>
                match byte {
                    b'-' => {
                        self.draft.text_end = self.rel(pos);
                        self.state = State::CommentEndDash;
                        Ok(pos + 1)
                    },
                    b'>' => {
                        self.emit_comment(chunk, pos + 1, sink)?;
                        Ok(pos + 1)
                    },
                    _ => {
                        self.state = State::Comment;
                        Ok(pos)
                    },
                },
            State::BogusComment =>
                match memchr::memchr(b'>', &chunk[pos..]) {
                    Some(len) => {
                        self.draft.text_end = self.rel(pos + len);
                        self.emit_comment(chunk, pos + len + 1, sink)?;
                        Ok(pos + len + 1)
                    },
                    None => Ok(chunk.len()),
                },
            State::RawTextLessThan(name) =>
                match byte {
                    b'/' => {
                        self.state = State::RawTextEndTagName(name, 0);
                        Ok(pos + 1)
                    },
                    _ => {
                        self.emit_pending_as_text(chunk, pos, sink)?;
                        self.state = State::RawText(name);
                        Ok(pos)
                    },
                },
            State::RawTextEndTagName(name, matched) => {
                let expected = name.as_bytes();
                if matched < expected.len() && byte.to_ascii_lowercase() == expected[matched] {
                    self.state = State::RawTextEndTagName(name, matched + 1);
                    Ok(pos + 1)
                } else if matched == expected.len()
                    && (is_whitespace(byte) || byte == b'/' || byte == b'>')
                {
                    self.finish_text(sink)?;
                    self.draft.is_end_tag = true;
                    self.draft.name_start = 2;
                    self.state = State::TagName;
                    Ok(pos)
                } else {
                    self.emit_pending_as_text(chunk, pos, sink)?;
                    self.state = State::RawText(name);
                    Ok(pos)
                }
            },
        }
    }
}

fn check_duplicate_attributes(
    event: &event::Event,
    raw: &[u8],
    location: location::Location,
) -> Result<(), Error> {
    let (name, attributes) = match *event {
        event::Event::StartTag { ref name, ref attributes, .. } => (name, attributes),
        _ => return Ok(()),
    };
    for (index, attribute) in attributes.iter().enumerate() {
        let attribute_name = &raw[attribute.name.clone()];
        let is_duplicate = attributes[..index]
            .iter()
            .any(|previous| raw[previous.name.clone()].eq_ignore_ascii_case(attribute_name));
        if is_duplicate {
            return Err(Error::DuplicateAttribute {
                tag_name: String::from_utf8_lossy(&raw[name.clone()]).into_owned(),
                attribute_name: String::from_utf8_lossy(attribute_name).into_owned(),
                location,
            });
        }
    }
    Ok(())
}
