//! Log record data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::key::Key;

/// Severity of a log entry, ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    /// Diagnostic detail.
    Debug,
    /// Routine operational information.
    Info,
    /// Something surprising that the program recovered from.
    Warning,
    /// A failed operation.
    Error,
    /// A failure that needs immediate attention.
    Alert,
}

impl Severity {
    /// The variant name, as rendered in sink output.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Alert => "Alert",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One log record.
///
/// Entries are synthesised at the log call site by merging the call's
/// arguments with the ambient [`Key`]: the key's namespace prefixes the
/// call's namespace, the key's context pairs precede the call's pairs, and
/// the timestamp is captured at enqueue time, not when a sink gets around
/// to writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Severity of the record.
    pub severity: Severity,
    /// Final namespace, after merging with the ambient key.
    pub namespace: String,
    /// Message text.
    pub message: String,
    /// Wall-clock time captured at the log call site.
    pub time: DateTime<Utc>,
    /// Final context pairs, ambient pairs first.
    pub context: Vec<(String, String)>,
}

impl Entry {
    /// Merge a log call with the ambient key into a record.
    pub(crate) fn record(
        severity: Severity,
        key: &Key,
        namespace: &str,
        message: &str,
        pairs: Vec<(String, String)>,
    ) -> Self {
        let mut merged_namespace =
            String::with_capacity(key.namespace().len() + namespace.len());
        merged_namespace.push_str(key.namespace());
        merged_namespace.push_str(namespace);

        let mut context = Vec::with_capacity(key.context().len() + pairs.len());
        context.extend(key.context().iter().cloned());
        context.extend(pairs);

        Entry {
            severity,
            namespace: merged_namespace,
            message: message.to_string(),
            time: Utc::now(),
            context,
        }
    }
}
