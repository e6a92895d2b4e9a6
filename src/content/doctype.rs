
/// A document type declaration passed to doctype handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    name: Option<String>,
    public_id: Option<String>,
    system_id: Option<String>,
}

impl Doctype {

    pub(crate) fn new(
        name: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
    ) -> Doctype {
        Doctype { name, public_id, system_id }
    }

    /// The lowercased doctype name, like `html`.
    pub fn name(&self) -> Option<&str> { self.name.as_ref().map(|name| name.as_str()) }

    /// The `PUBLIC` identifier.
    pub fn public_id(&self) -> Option<&str> { self.public_id.as_ref().map(|id| id.as_str()) }

    /// The `SYSTEM` identifier.
    pub fn system_id(&self) -> Option<&str> { self.system_id.as_ref().map(|id| id.as_str()) }
}
