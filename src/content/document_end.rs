
use modifier;

/// The end of the document, passed to document end handlers after the last input byte.
#[derive(Debug, Default)]
pub struct DocumentEnd {
    appended: modifier::Content,
}

impl DocumentEnd {

    pub(crate) fn new() -> DocumentEnd { DocumentEnd::default() }

    /// Append content to the end of the output.
    pub fn append(&mut self, content: &str, content_type: modifier::ContentType) {
        self.appended.push(content, content_type);
    }

    pub(crate) fn into_content(self) -> modifier::Content { self.appended }
}
