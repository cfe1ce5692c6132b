//! One-way notification sink for AI decisions.
//!
//! The engine posts a [`Notification`] whenever a decision is worth explaining to a
//! player (sphere changes, decisions taken, alliances). Sinks never feed anything
//! back into the tick, so swapping one for another cannot change the outcome.

use crate::state::{Date, DecisionId, InfluenceLevel, NationId, StateDefId};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Routing tag used by presentation layers to filter messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    IncreaseOpinion,
    RemoveFromSphere,
    AddToSphere,
    Decision,
    Alliance,
    Colonization,
}

/// Payload describing what happened; rendering into text is the sink's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    OpinionIncreased {
        great_power: NationId,
        target: NationId,
        level: InfluenceLevel,
    },
    RemovedFromSphere {
        great_power: NationId,
        displaced: NationId,
        target: NationId,
    },
    AddedToSphere {
        great_power: NationId,
        target: NationId,
    },
    DecisionTaken {
        nation: NationId,
        decision: DecisionId,
    },
    AllianceFormed {
        first: NationId,
        second: NationId,
    },
    AllianceCancelled {
        first: NationId,
        second: NationId,
    },
    ColonyStarted {
        nation: NationId,
        state: StateDefId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub date: Date,
    pub category: Category,
    /// Nation the message is addressed to
    pub target: NationId,
    pub message: Message,
}

/// Fire-and-forget destination for notifications.
pub trait NotificationSink {
    fn post(&mut self, notification: Notification);
}

/// Collects everything; used by tests and by callers that render later.
impl NotificationSink for Vec<Notification> {
    fn post(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn post(&mut self, _notification: Notification) {}
}

/// Forwards notifications to the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn post(&mut self, notification: Notification) {
        log::debug!(
            "[{}] {:?} -> {}: {:?}",
            notification.date,
            notification.category,
            notification.target,
            notification.message
        );
    }
}

/// Writes one JSON object per line to any `Write` destination.
///
/// Serialization or I/O failures are logged once and the sink goes quiet, since
/// posting must never interrupt a tick.
pub struct JsonlSink<W: Write> {
    writer: W,
    failed: bool,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> NotificationSink for JsonlSink<W> {
    fn post(&mut self, notification: Notification) {
        if self.failed {
            return;
        }
        let result = serde_json::to_writer(&mut self.writer, &notification)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            log::warn!("Notification sink disabled: {}", e);
            self.failed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Notification {
        Notification {
            date: Date::from_ymd(1836, 1, 1),
            category: Category::AddToSphere,
            target: NationId(2),
            message: Message::AddedToSphere {
                great_power: NationId(0),
                target: NationId(2),
            },
        }
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Notification> = Vec::new();
        sink.post(sample());
        sink.post(sample());
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_jsonl_sink_writes_tagged_lines() {
        let mut sink = JsonlSink::new(Vec::new());
        sink.post(sample());
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains(r#""type":"added_to_sphere""#));
        assert!(out.contains(r#""category":"add_to_sphere""#));
    }
}
