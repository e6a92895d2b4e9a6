
//! Attribute lists of start tags.

use tendril;

use event;
use encoding;
use text;
use modifier;

#[derive(Debug, Clone)]
struct Attribute {
    /// Lowercased name.
    name: tendril::StrTendril,
    value: tendril::StrTendril,
    /// Source bytes, kept while the attribute is untouched.
    raw: Option<Vec<u8>>,
}

/// Attributes of a start tag in source order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Attributes {
    list: Vec<Attribute>,
    modified: bool,
}

impl Attributes {

    /// Decode the attributes of a tokenized start tag.
    pub fn from_source(
        raw: &[u8],
        spans: &[event::AttributeSpan],
        encoding: &encoding::AsciiCompatibleEncoding,
    ) -> Attributes {
        let list = spans
            .iter()
            .map(|span| Attribute {
                name: encoding.decode(&raw[span.name.clone()]).to_ascii_lowercase().into(),
                value: match span.value {
                    Some(ref value) => encoding.decode(&raw[value.clone()]).into(),
                    None => tendril::StrTendril::new(),
                },
                raw: Some(raw[span.raw.clone()].to_vec()),
            })
            .collect();
        Attributes { list, modified: false }
    }

    pub fn is_modified(&self) -> bool { self.modified }

    fn position(&self, name: &str) -> Option<usize> {
        self.list.iter().position(|attribute| text::identifier_eq(&attribute.name, name))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| &*self.list[index].value)
    }

    pub fn has(&self, name: &str) -> bool { self.position(name).is_some() }

    /// Replace the value of an existing attribute or add a new one at the end.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), modifier::MutationError> {
        let name = text::validate_attribute_name(name)
            .map_err(|error| modifier::MutationError::AttributeName { error })?;
        match self.position(name) {
            Some(index) => {
                let attribute = &mut self.list[index];
                attribute.value = value.into();
                attribute.raw = None;
            },
            None => self.list.push(Attribute {
                name: name.to_ascii_lowercase().into(),
                value: value.into(),
                raw: None,
            }),
        }
        self.modified = true;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) {
        let before = self.list.len();
        self.list.retain(|attribute| !text::identifier_eq(&attribute.name, name));
        if self.list.len() != before {
            self.modified = true;
        }
    }

    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.list.iter().map(|attribute| (&*attribute.name, &*attribute.value))
    }

    /// Name and value pairs for selector matching.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.iter().map(|(name, value)| (name.into(), value.into())).collect()
    }

    /// Append the serialized attributes, each with a leading space.
    pub fn serialize_into(&self, output: &mut Vec<u8>, encoding: &encoding::AsciiCompatibleEncoding) {
        for attribute in &self.list {
            output.push(b' ');
            match attribute.raw {
                Some(ref raw) => output.extend_from_slice(raw),
                None => {
                    output.extend_from_slice(&encoding.encode(&attribute.name));
                    output.extend_from_slice(b"=\"");
                    let value = text::escape_attribute_value(&attribute.value);
                    output.extend_from_slice(&encoding.encode(&value));
                    output.push(b'"');
                },
            }
        }
    }
}
