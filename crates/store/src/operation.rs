//! Operation descriptors.
//!
//! [`Operation`] names one backend call; [`CallEntry`] is the per-call record
//! handed to the [`CallLogger`](crate::CallLogger) before the backend runs.

use std::fmt;

/// The backend operations the instrumented facade exposes.
///
/// [`as_str`](Operation::as_str) yields the Redis command vocabulary, which is
/// used verbatim as the metric measurement name and field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Liveness round-trip.
    Ping,
    /// Read a string value.
    Get,
    /// Write a string value.
    Set,
    /// Remove a key.
    Delete,
    /// Push onto the head of a list.
    ListPush,
    /// Pop from the tail of a list.
    ListPop,
    /// Length of a list.
    ListLength,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 7] = [
        Self::Ping,
        Self::Get,
        Self::Set,
        Self::Delete,
        Self::ListPush,
        Self::ListPop,
        Self::ListLength,
    ];

    /// Metric/log name of the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Get => "get",
            Self::Set => "set",
            Self::Delete => "del",
            Self::ListPush => "lpush",
            Self::ListPop => "rpop",
            Self::ListLength => "llen",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attempted call: which operation, against which service, with which
/// arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallEntry<'a> {
    /// Service tag of the backend (e.g. `"redis"`).
    pub service: &'a str,
    /// The operation being attempted.
    pub operation: Operation,
    /// Key argument, if the operation takes one.
    pub key: Option<&'a str>,
    /// Value argument, if the operation takes one.
    pub value: Option<&'a str>,
}

impl<'a> CallEntry<'a> {
    /// Creates an entry with no arguments.
    #[must_use]
    pub fn new(service: &'a str, operation: Operation) -> Self {
        Self { service, operation, key: None, value: None }
    }

    /// Attaches the key argument.
    #[must_use]
    pub fn key(mut self, key: &'a str) -> Self {
        self.key = Some(key);
        self
    }

    /// Attaches the value argument.
    #[must_use]
    pub fn value(mut self, value: &'a str) -> Self {
        self.value = Some(value);
        self
    }

    /// Human-readable message, e.g. `"redis get"`.
    #[must_use]
    pub fn message(&self) -> String {
        format!("{} {}", self.service, self.operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names() {
        let names: Vec<_> = Operation::ALL.iter().map(|op| op.to_string()).collect();
        assert_eq!(names, ["ping", "get", "set", "del", "lpush", "rpop", "llen"]);
    }

    #[test]
    fn test_call_entry_builder() {
        let entry = CallEntry::new("redis", Operation::Set).key("a").value("1");
        assert_eq!(entry.key, Some("a"));
        assert_eq!(entry.value, Some("1"));
        assert_eq!(entry.message(), "redis set");
    }
}
