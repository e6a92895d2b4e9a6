
//! Character encoding gate.
//!
//! The tokenizer works on raw bytes and relies on `<`, `>`, quotes and whitespace having
//! their ASCII values. Only encodings that keep the ASCII range intact are accepted.

use std::fmt;
use std::error;

use encoding_rs;

/// Reasons for rejecting an encoding label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The label is not a known encoding label.
    Unknown {
        /// The rejected label.
        label: String,
    },
    /// The encoding exists but is not ASCII-compatible (e.g. UTF-16).
    NotAsciiCompatible {
        /// Canonical name of the rejected encoding.
        name: &'static str,
    },
}

impl fmt::Display for Error {

    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Unknown { .. } =>
                write!(fmt, "Unknown character encoding has been provided."),
            Error::NotAsciiCompatible { .. } =>
                write!(fmt, "Expected ASCII-compatible encoding."),
        }
    }
}

impl error::Error for Error {}

/// A validated, ASCII-compatible document encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AsciiCompatibleEncoding {
    encoding: &'static encoding_rs::Encoding,
}

impl AsciiCompatibleEncoding {

    /// Resolve a WHATWG encoding label.
    pub fn for_label(label: &str) -> Result<AsciiCompatibleEncoding, Error> {
        let encoding = match encoding_rs::Encoding::for_label_no_replacement(label.trim().as_bytes()) {
            Some(encoding) => encoding,
            None => return Err(Error::Unknown { label: label.into() }),
        };
        AsciiCompatibleEncoding::new(encoding)
    }

    /// Wrap an already resolved encoding.
    pub fn new(encoding: &'static encoding_rs::Encoding)
    -> Result<AsciiCompatibleEncoding, Error> {
        if !encoding.is_ascii_compatible() {
            return Err(Error::NotAsciiCompatible { name: encoding.name() });
        }
        Ok(AsciiCompatibleEncoding { encoding })
    }

    /// UTF-8, the default document encoding.
    pub fn utf8() -> AsciiCompatibleEncoding {
        AsciiCompatibleEncoding { encoding: encoding_rs::UTF_8 }
    }

    /// Canonical encoding name.
    pub fn name(&self) -> &'static str { self.encoding.name() }

    pub(crate) fn decode(&self, bytes: &[u8]) -> String {
        self.encoding.decode_without_bom_handling(bytes).0.into_owned()
    }

    pub(crate) fn encode(&self, value: &str) -> Vec<u8> {
        let (bytes, _, _) = self.encoding.encode(value);
        bytes.into_owned()
    }

    pub(crate) fn new_decoder(&self) -> encoding_rs::Decoder {
        self.encoding.new_decoder_without_bom_handling()
    }
}

impl Default for AsciiCompatibleEncoding {

    fn default() -> AsciiCompatibleEncoding { AsciiCompatibleEncoding::utf8() }
}
