
use memory;

/// Configuration of a rewriting session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// WHATWG label of the document encoding. Defaults to `utf-8`.
    pub encoding: String,
    /// Buffer preallocation and memory limit.
    pub memory: memory::MemorySettings,
    /// Whether unterminated or malformed markup is an error. Defaults to `true`.
    pub strict: bool,
}

impl Settings {

    /// Set the document encoding label.
    pub fn encoding<L>(mut self, label: L) -> Self where L: Into<String> {
        self.encoding = label.into();
        self
    }

    /// Set the memory settings.
    pub fn memory(mut self, memory: memory::MemorySettings) -> Self {
        self.memory = memory;
        self
    }

    /// Switch between strict and lenient tokenizing.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl Default for Settings {

    fn default() -> Settings {
        Settings {
            encoding: "utf-8".into(),
            memory: memory::MemorySettings::default(),
            strict: true,
        }
    }
}
