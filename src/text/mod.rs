
//! Name validation and escaping of inserted content.

mod identifier;
mod encoded;

pub(crate) use self::identifier::{
    identifier_eq,
    validate_tag_name,
    validate_attribute_name,
};

pub(crate) use self::encoded::{
    escape_text,
    escape_attribute_value,
};

pub use self::identifier::{
    IdentifierError,
};
