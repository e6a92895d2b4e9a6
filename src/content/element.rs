
use tendril;

use encoding;
use text;
use modifier;
use modifier::attribute::Attributes;
use modifier::remove::Removal;

/// Namespace an element was opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Regular HTML content.
    Html,
    /// Inside an `<svg>` element.
    Svg,
    /// Inside a `<math>` element.
    MathMl,
}

impl Namespace {

    /// The namespace URI.
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::Svg => "http://www.w3.org/2000/svg",
            Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
        }
    }
}

/// A start tag passed to element handlers.
///
/// Mutations apply to the whole element. Content inserted with `prepend`, `append` or
/// `set_inner_content` goes between the tags, `before`, `after` and `replace` act outside of
/// them.
#[derive(Debug)]
pub struct Element {
    name: tendril::StrTendril,
    renamed: bool,
    namespace: Namespace,
    attributes: Attributes,
    self_closing: bool,
    can_have_content: bool,
    before: modifier::Content,
    after: modifier::Content,
    prepend: modifier::Content,
    append: modifier::Content,
    inner: Option<modifier::Content>,
    replacement: Option<modifier::Content>,
    removal: Removal,
}

/// Recorded element mutations, split for the rewriter.
#[derive(Debug, Default)]
pub(crate) struct ElementMutations {
    pub before: modifier::Content,
    pub after: modifier::Content,
    pub prepend: modifier::Content,
    pub append: modifier::Content,
    pub inner: Option<modifier::Content>,
    pub replacement: Option<modifier::Content>,
    pub removal: Removal,
    /// The new name, if the element was renamed.
    pub renamed: Option<tendril::StrTendril>,
}

impl Element {

    pub(crate) fn new(
        name: &str,
        namespace: Namespace,
        attributes: Attributes,
        self_closing: bool,
        can_have_content: bool,
    ) -> Element {
        Element {
            name: name.into(),
            renamed: false,
            namespace,
            attributes,
            self_closing,
            can_have_content,
            before: modifier::Content::default(),
            after: modifier::Content::default(),
            prepend: modifier::Content::default(),
            append: modifier::Content::default(),
            inner: None,
            replacement: None,
            removal: Removal::Keep,
        }
    }

    /// The lowercased tag name.
    pub fn tag_name(&self) -> &str { &self.name }

    /// Rename the element. The end tag is renamed along with it.
    pub fn set_tag_name(&mut self, name: &str) -> Result<(), modifier::MutationError> {
        let name = text::validate_tag_name(name)
            .map_err(|error| modifier::MutationError::TagName { error })?;
        self.name = name.to_ascii_lowercase().into();
        self.renamed = true;
        Ok(())
    }

    /// URI of the namespace the element lives in.
    pub fn namespace_uri(&self) -> &'static str { self.namespace.uri() }

    /// Whether the start tag ended in `/>`.
    pub fn is_self_closing(&self) -> bool { self.self_closing }

    /// Whether the element has contents and an end tag. False for void elements and
    /// self-closed foreign elements.
    pub fn can_have_content(&self) -> bool { self.can_have_content }

    /// Name and value pairs in source order.
    pub fn attributes<'a>(&'a self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.attributes.iter()
    }

    /// Value of the first attribute with the given name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> { self.attributes.get(name) }

    /// Whether an attribute with the given name exists.
    pub fn has_attribute(&self, name: &str) -> bool { self.attributes.has(name) }

    /// Set an attribute value, adding the attribute if it does not exist yet.
    pub fn set_attribute(&mut self, name: &str, value: &str)
    -> Result<(), modifier::MutationError> {
        self.attributes.set(name, value)
    }

    /// Remove all attributes with the given name.
    pub fn remove_attribute(&mut self, name: &str) { self.attributes.remove(name) }

    /// Insert content before the start tag.
    pub fn before(&mut self, content: &str, content_type: modifier::ContentType) {
        self.before.push(content, content_type);
    }

    /// Insert content after the end tag.
    pub fn after(&mut self, content: &str, content_type: modifier::ContentType) {
        self.after.push(content, content_type);
    }

    /// Insert content right after the start tag. Ignored without content.
    pub fn prepend(&mut self, content: &str, content_type: modifier::ContentType) {
        if self.can_have_content {
            self.prepend.push(content, content_type);
        }
    }

    /// Insert content right before the end tag. Ignored without content.
    pub fn append(&mut self, content: &str, content_type: modifier::ContentType) {
        if self.can_have_content {
            self.append.push(content, content_type);
        }
    }

    /// Replace the contents of the element. Ignored without content.
    pub fn set_inner_content(&mut self, content: &str, content_type: modifier::ContentType) {
        if self.can_have_content {
            self.prepend = modifier::Content::default();
            self.append = modifier::Content::default();
            self.inner = Some(modifier::Content::single(content, content_type));
        }
    }

    /// Replace the element and its contents.
    pub fn replace(&mut self, content: &str, content_type: modifier::ContentType) {
        self.replacement = Some(modifier::Content::single(content, content_type));
        self.removal = Removal::Full;
    }

    /// Remove the element and its contents.
    pub fn remove(&mut self) {
        self.replacement = None;
        self.removal = Removal::Full;
    }

    /// Remove the start and end tags but keep the contents.
    pub fn remove_and_keep_content(&mut self) {
        self.replacement = None;
        self.removal = Removal::Tags;
    }

    /// Whether the element was removed or replaced.
    pub fn is_removed(&self) -> bool { self.removal.is_removed() }

    pub(crate) fn is_modified(&self) -> bool {
        self.renamed || self.attributes.is_modified()
    }

    pub(crate) fn serialize_start_tag(&self, encoding: &encoding::AsciiCompatibleEncoding)
    -> Vec<u8> {
        let mut output = vec![b'<'];
        output.extend_from_slice(&encoding.encode(&self.name));
        self.attributes.serialize_into(&mut output, encoding);
        if self.self_closing {
            output.push(b'/');
        }
        output.push(b'>');
        output
    }

    pub(crate) fn into_mutations(self) -> ElementMutations {
        ElementMutations {
            before: self.before,
            after: self.after,
            prepend: self.prepend,
            append: self.append,
            inner: self.inner,
            replacement: self.replacement,
            removal: self.removal,
            renamed: if self.renamed { Some(self.name) } else { None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ Element, Namespace };
    use modifier::{ ContentType, MutationError };
    use modifier::attribute::Attributes;
    use modifier::remove::Removal;
    use encoding;
    use text;

    fn element(can_have_content: bool) -> Element {
        Element::new("div", Namespace::Html, Attributes::default(), false, can_have_content)
    }

    #[test]
    fn rename() {
        let mut div = element(true);
        assert_eq!(
            div.set_tag_name(""),
            Err(MutationError::TagName { error: text::IdentifierError::Empty }),
        );
        assert_eq!(div.tag_name(), "div");
        assert!(!div.is_modified());
        div.set_tag_name("SPAN").unwrap();
        assert_eq!(div.tag_name(), "span");
        let start = div.serialize_start_tag(&encoding::AsciiCompatibleEncoding::utf8());
        assert_eq!(start, b"<span>".to_vec());
        let mutations = div.into_mutations();
        assert_eq!(mutations.renamed.as_ref().map(|name| &**name), Some("span"));
    }

    #[test]
    fn attributes() {
        let mut div = element(true);
        div.set_attribute("Title", "a < b").unwrap();
        assert_eq!(div.get_attribute("title"), Some("a < b"));
        assert!(div.has_attribute("TITLE"));
        assert!(div.is_modified());
        let start = div.serialize_start_tag(&encoding::AsciiCompatibleEncoding::utf8());
        assert_eq!(String::from_utf8(start).unwrap(), "<div title=\"a < b\">");
        div.remove_attribute("title");
        assert_eq!(div.attributes().count(), 0);
    }

    #[test]
    fn content_operations() {
        let mut div = element(true);
        div.prepend("a", ContentType::Text);
        div.append("b", ContentType::Text);
        div.set_inner_content("c", ContentType::Html);
        div.append("d", ContentType::Text);
        assert!(!div.is_removed());
        let mutations = div.into_mutations();
        assert!(mutations.prepend.is_empty());
        assert_eq!(mutations.append.len(), 1);
        assert_eq!(mutations.inner.map(|inner| inner.len()), Some(1));
    }

    #[test]
    fn void_elements_ignore_contents() {
        let mut br = element(false);
        br.prepend("a", ContentType::Text);
        br.set_inner_content("b", ContentType::Text);
        let mutations = br.into_mutations();
        assert!(mutations.prepend.is_empty());
        assert!(mutations.inner.is_none());
    }

    #[test]
    fn removal_supersedes() {
        let mut div = element(true);
        div.replace("x", ContentType::Html);
        assert!(div.is_removed());
        div.remove_and_keep_content();
        let mutations = div.into_mutations();
        assert_eq!(mutations.removal, Removal::Tags);
        assert!(mutations.replacement.is_none());
    }

    #[test]
    fn namespaces() {
        assert_eq!(element(true).namespace_uri(), "http://www.w3.org/1999/xhtml");
        assert_eq!(Namespace::Svg.uri(), "http://www.w3.org/2000/svg");
    }
}
