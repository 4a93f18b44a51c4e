/// One `[service]` block of a service file, before any of its keys are checked.
///
/// The tokenizer emits a `Section` for every header it sees, even when a name repeats. Names
/// are compared case-sensitively and must be unique once the sections become services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<Entry>,
}

impl Section {
    #[must_use]
    pub(crate) fn new(name: String, entries: Vec<Entry>) -> Self {
        Self { name, entries }
    }

    /// The service name: the header text with surrounding whitespace trimmed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assignments in line order. A key may appear more than once; the last one wins when the
    /// service is assembled.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }
}

/// A single `key = value` line. Neither side has been interpreted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    value: String,
}

impl Entry {
    #[must_use]
    pub(crate) fn new(key: String, value: String) -> Self {
        Self { key, value }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}
