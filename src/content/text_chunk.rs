
use modifier;

/// A piece of a text node passed to text handlers.
///
/// Text nodes arrive in chunks as the input does. The final chunk of every text node is
/// reported with `last_in_text_node` set and may be empty.
#[derive(Debug)]
pub struct TextChunk {
    text: String,
    last: bool,
    mutations: modifier::Mutations,
}

impl TextChunk {

    pub(crate) fn new(text: String, last: bool) -> TextChunk {
        TextChunk {
            text,
            last,
            mutations: modifier::Mutations::default(),
        }
    }

    /// The decoded text. Character references are not resolved.
    pub fn as_str(&self) -> &str { &self.text }

    /// Whether this is the final chunk of its text node.
    pub fn last_in_text_node(&self) -> bool { self.last }

    /// Insert content before the chunk.
    pub fn before(&mut self, content: &str, content_type: modifier::ContentType) {
        self.mutations.before(content, content_type);
    }

    /// Insert content after the chunk.
    pub fn after(&mut self, content: &str, content_type: modifier::ContentType) {
        self.mutations.after(content, content_type);
    }

    /// Replace the chunk.
    pub fn replace(&mut self, content: &str, content_type: modifier::ContentType) {
        self.mutations.replace(content, content_type);
    }

    /// Remove the chunk.
    pub fn remove(&mut self) { self.mutations.remove() }

    /// Whether the chunk was removed or replaced.
    pub fn is_removed(&self) -> bool { self.mutations.removed }

    pub(crate) fn into_mutations(self) -> modifier::Mutations { self.mutations }
}

impl AsRef<str> for TextChunk {

    fn as_ref(&self) -> &str { &self.text }
}
