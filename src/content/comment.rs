
use modifier;

/// A comment passed to comment handlers.
#[derive(Debug)]
pub struct Comment {
    text: String,
    modified: bool,
    mutations: modifier::Mutations,
}

impl Comment {

    pub(crate) fn new(text: String) -> Comment {
        Comment {
            text,
            modified: false,
            mutations: modifier::Mutations::default(),
        }
    }

    /// The text between `<!--` and `-->`.
    pub fn text(&self) -> &str { &self.text }

    /// Replace the comment text.
    pub fn set_text(&mut self, text: &str) -> Result<(), modifier::MutationError> {
        if text.contains("-->") {
            return Err(modifier::MutationError::CommentText);
        }
        self.text = text.into();
        self.modified = true;
        Ok(())
    }

    /// Insert content before the comment.
    pub fn before(&mut self, content: &str, content_type: modifier::ContentType) {
        self.mutations.before(content, content_type);
    }

    /// Insert content after the comment.
    pub fn after(&mut self, content: &str, content_type: modifier::ContentType) {
        self.mutations.after(content, content_type);
    }

    /// Replace the comment.
    pub fn replace(&mut self, content: &str, content_type: modifier::ContentType) {
        self.mutations.replace(content, content_type);
    }

    /// Remove the comment.
    pub fn remove(&mut self) { self.mutations.remove() }

    /// Whether the comment was removed or replaced.
    pub fn is_removed(&self) -> bool { self.mutations.removed }

    pub(crate) fn is_modified(&self) -> bool { self.modified }

    pub(crate) fn into_parts(self) -> (String, modifier::Mutations) {
        (self.text, self.mutations)
    }
}

#[cfg(test)]
mod tests {
    use modifier::{ ContentType, MutationError };

    #[test]
    fn set_text() {
        let mut comment = super::Comment::new("Hey 42".into());
        assert_eq!(comment.text(), "Hey 42");
        assert_eq!(comment.set_text("a --> b"), Err(MutationError::CommentText));
        assert!(!comment.is_modified());
        comment.set_text("Yo").unwrap();
        assert_eq!(comment.text(), "Yo");
        assert!(comment.is_modified());
    }

    #[test]
    fn removal() {
        let mut comment = super::Comment::new("x".into());
        comment.before("a", ContentType::Text);
        comment.replace("b", ContentType::Html);
        assert!(comment.is_removed());
        let (_, mutations) = comment.into_parts();
        assert_eq!(mutations.before.len(), 1);
        assert_eq!(mutations.replacement.len(), 1);
    }
}
