
use location;

/// Cursor over selector source text.
#[derive(Debug, Copy, Clone)]
pub struct Input<'i> {
    content: &'i str,
    location: location::Location,
}

type Split<'i, T> = (T, Input<'i>);
type StrSplit<'i> = Split<'i, &'i str>;

impl<'i> Input<'i> {

    pub fn new(content: &'i str) -> Input<'i> {
        Input {
            content: content,
            location: location::Location::at_start(),
        }
    }

    pub fn is_empty(&self) -> bool { self.content.is_empty() }

    pub fn location(&self) -> location::Location { self.location }

    pub fn peek(&self) -> Option<char> { self.content.chars().next() }

    fn consumed(&self, len: usize) -> StrSplit<'i> {
        (&self.content[..len], self.advanced(len))
    }

    fn advanced(&self, len: usize) -> Input<'i> {
        Input {
            content: &self.content[len..],
            location: self.location.with_consumed(self.content[..len].as_bytes()),
        }
    }

    pub fn next_char(&self) -> Option<Split<'i, char>> {
        self.peek().map(|chr| (chr, self.advanced(chr.len_utf8())))
    }

    pub fn take_char(&self, chr: char) -> Option<Input<'i>> {
        if self.content.starts_with(chr) {
            Some(self.advanced(chr.len_utf8()))
        } else {
            None
        }
    }

    pub fn take_while<F>(&self, accept: F) -> StrSplit<'i>
    where F: Fn(char) -> bool {
        let len = match self.content.find(|chr: char| !accept(chr)) {
            Some(pos) => pos,
            None => self.content.len(),
        };
        self.consumed(len)
    }

    pub fn skip_whitespace(&self) -> Input<'i> {
        let (_, rest) = self.take_while(is_whitespace);
        rest
    }

    /// Whether whitespace was skipped, and the rest.
    pub fn take_whitespace(&self) -> Split<'i, bool> {
        let (whitespace, rest) = self.take_while(is_whitespace);
        (!whitespace.is_empty(), rest)
    }
}

pub fn is_whitespace(chr: char) -> bool {
    match chr {
        ' ' | '\t' | '\n' | '\r' | '\x0c' => true,
        _ => false,
    }
}
