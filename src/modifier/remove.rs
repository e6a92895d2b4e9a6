
//! Element removal.

/// How much of an element is dropped from the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removal {
    /// Nothing is removed.
    Keep,
    /// Only the start and end tags are dropped, the contents stay.
    Tags,
    /// The tags and everything between them are dropped.
    Full,
}

impl Removal {

    pub fn is_removed(self) -> bool { self != Removal::Keep }

    /// Whether output between the tags is suppressed.
    pub fn drops_contents(self) -> bool { self == Removal::Full }

    pub fn drops_tags(self) -> bool { self != Removal::Keep }
}

impl Default for Removal {

    fn default() -> Removal { Removal::Keep }
}
