
//! Lexical tokens produced by the tokenizer.
//!
//! Events never own input bytes. Every range is relative to the raw bytes of the token
//! that are handed over together with the event.

use std::ops;

/// Byte range relative to the raw token bytes.
pub(crate) type Span = ops::Range<usize>;

/// Location of one attribute inside a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttributeSpan {
    pub name: Span,
    pub value: Option<Span>,
    /// Source text of the whole attribute, including quotes.
    pub raw: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    /// A run of text. The raw bytes are the text itself.
    Text,
    /// The current text node is complete.
    TextEnd,
    Comment {
        text: Span,
    },
    Doctype {
        name: Option<Span>,
        public_id: Option<Span>,
        system_id: Option<Span>,
    },
    StartTag {
        name: Span,
        attributes: Vec<AttributeSpan>,
        self_closing: bool,
    },
    EndTag {
        name: Span,
    },
}

impl Event {

    pub(crate) fn description(&self) -> &'static str {
        match *self {
            Event::Text => "text",
            Event::TextEnd => "text end",
            Event::Comment { .. } => "comment",
            Event::Doctype { .. } => "doctype",
            Event::StartTag { .. } => "start tag",
            Event::EndTag { .. } => "end tag",
        }
    }
}

pub(crate) fn comment(text: Span) -> Event {
    Event::Comment { text }
}

pub(crate) fn start_tag(name: Span, attributes: Vec<AttributeSpan>, self_closing: bool) -> Event {
    Event::StartTag { name, attributes, self_closing }
}

pub(crate) fn end_tag(name: Span) -> Event {
    Event::EndTag { name }
}

fn is_whitespace(byte: u8) -> bool {
    match byte {
        b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => true,
        _ => false,
    }
}

fn skip_whitespace(raw: &[u8], mut pos: usize, end: usize) -> usize {
    while pos < end && is_whitespace(raw[pos]) {
        pos += 1;
    }
    pos
}

fn take_word(raw: &[u8], pos: usize, end: usize) -> Span {
    let mut word_end = pos;
    while word_end < end && !is_whitespace(raw[word_end]) {
        word_end += 1;
    }
    pos..word_end
}

fn take_quoted(raw: &[u8], pos: usize, end: usize) -> Option<(Span, usize)> {
    if pos >= end {
        return None;
    }
    let quote = raw[pos];
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value_start = pos + 1;
    let value_end = match raw[value_start..end].iter().position(|&b| b == quote) {
        Some(len) => value_start + len,
        None => end,
    };
    Some((value_start..value_end, (value_end + 1).min(end)))
}

fn starts_with_keyword(raw: &[u8], pos: usize, end: usize, keyword: &str) -> bool {
    let keyword = keyword.as_bytes();
    end - pos >= keyword.len() && raw[pos..(pos + keyword.len())].eq_ignore_ascii_case(keyword)
}

/// Split the body of `<!DOCTYPE ...>` into its name and identifiers.
///
/// `body` spans the bytes between the `doctype` keyword and the closing `>`.
pub(crate) fn doctype(raw: &[u8], body: Span) -> Event {
    let end = body.end;
    let pos = skip_whitespace(raw, body.start, end);
    if pos >= end {
        return Event::Doctype { name: None, public_id: None, system_id: None };
    }

    let name = take_word(raw, pos, end);
    let pos = skip_whitespace(raw, name.end, end);

    let (public_id, system_id) =
        if starts_with_keyword(raw, pos, end, "public") {
            let pos = skip_whitespace(raw, pos + 6, end);
            match take_quoted(raw, pos, end) {
                Some((public_id, pos)) => {
                    let pos = skip_whitespace(raw, pos, end);
                    (Some(public_id), take_quoted(raw, pos, end).map(|(span, _)| span))
                },
                None => (None, None),
            }
        } else if starts_with_keyword(raw, pos, end, "system") {
            let pos = skip_whitespace(raw, pos + 6, end);
            (None, take_quoted(raw, pos, end).map(|(span, _)| span))
        } else {
            (None, None)
        };

    Event::Doctype { name: Some(name), public_id, system_id }
}
