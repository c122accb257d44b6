use crate::prelude::{SondeError, SondeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Identifier substrings that mark a task fed by a network receiver
/// (SpyServer) rather than a locally attached SDR.
pub const EXTERNAL_RECEIVER_MARKERS: &[&str] = &["SPY"];

/// What a receiver is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Idle,
    Scanning,
    Decoding,
}

impl TaskKind {
    /// Maps the backend's free-form `task` string.
    pub fn from_wire(task: &str) -> Self {
        if task == "Scanning" {
            TaskKind::Scanning
        } else if task.starts_with("Decoding") {
            TaskKind::Decoding
        } else {
            TaskKind::Idle
        }
    }
}

/// Where a task's samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Sdr,
    ExternalReceiver,
}

impl SourceKind {
    pub fn classify(identifier: &str) -> Self {
        if EXTERNAL_RECEIVER_MARKERS
            .iter()
            .any(|marker| identifier.contains(marker))
        {
            SourceKind::ExternalReceiver
        } else {
            SourceKind::Sdr
        }
    }
}

/// One receiver entry of a task snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub identifier: String,
    /// Tuned frequency in Hz; 0 when the receiver is not tuned.
    pub frequency_hz: f64,
    pub kind: TaskKind,
    pub decoder_type: Option<String>,
}

impl TaskRecord {
    pub fn idle(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            frequency_hz: 0.0,
            kind: TaskKind::Idle,
            decoder_type: None,
        }
    }

    pub fn scanning(identifier: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::Scanning,
            ..Self::idle(identifier)
        }
    }

    pub fn decoding(
        identifier: impl Into<String>,
        frequency_hz: f64,
        decoder_type: Option<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            frequency_hz,
            kind: TaskKind::Decoding,
            decoder_type,
        }
    }

    /// Frequency takes precedence over the task kind.
    pub fn is_tuned(&self) -> bool {
        self.frequency_hz > 0.0
    }
}

/// Formats a frequency in Hz as MHz with three decimals, e.g. `403.500`.
pub fn frequency_label(frequency_hz: f64) -> String {
    format!("{:.3}", frequency_hz / 1e6)
}

/// A full task-list poll, keyed and ordered by identifier.
pub type Snapshot = BTreeMap<String, TaskRecord>;

/// The per-receiver JSON object served by `get_task_list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
    pub freq: f64,
    pub task: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub decoder_type: Option<String>,
}

impl TaskEntry {
    pub fn into_record(self, identifier: impl Into<String>) -> TaskRecord {
        let kind = TaskKind::from_wire(&self.task);
        let decoder_type = if kind == TaskKind::Decoding || self.freq > 0.0 {
            self.decoder_type
        } else {
            None
        };
        TaskRecord {
            identifier: identifier.into(),
            frequency_hz: self.freq,
            kind,
            decoder_type,
        }
    }
}

/// An entry dropped from a snapshot because it did not match [`TaskEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub identifier: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSnapshot {
    pub snapshot: Snapshot,
    pub skipped: Vec<SkippedEntry>,
}

/// Parses a `get_task_list` body.
///
/// Malformed entries are skipped and reported; only a body that is not a JSON
/// object fails the whole parse.
pub fn parse_snapshot(body: &str) -> SondeResult<ParsedSnapshot> {
    let raw: BTreeMap<String, Value> =
        serde_json::from_str(body).map_err(|err| SondeError::Snapshot(err.to_string()))?;

    let mut snapshot = Snapshot::new();
    let mut skipped = Vec::new();
    for (identifier, value) in raw {
        match serde_json::from_value::<TaskEntry>(value) {
            Ok(entry) => {
                let record = entry.into_record(identifier.clone());
                snapshot.insert(identifier, record);
            }
            Err(err) => skipped.push(SkippedEntry {
                identifier,
                reason: err.to_string(),
            }),
        }
    }

    Ok(ParsedSnapshot { snapshot, skipped })
}
