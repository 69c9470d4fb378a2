//! Core domain types for the visitor log.
//!
//! This module defines the fundamental types used throughout the system:
//! - Visit records (one row per visitor stay)
//! - Entry/exit events submitted by callers
//! - Exit matching policy
//! - Reconciliation outcomes

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Records
// ============================================================================

/// One visitor stay, from entry to (optional) exit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: u64,
    pub name: String,
    /// National ID or similar document number, used to match exits
    pub personal_id: String,
    pub company: String,
    pub destination: String,
    pub entry_date: NaiveDate,
    pub entry_time: NaiveTime,
    pub exit_date: Option<NaiveDate>,
    pub exit_time: Option<NaiveTime>,
}

impl VisitRecord {
    /// A record without an exit date means the visitor is still on-site
    pub fn is_open(&self) -> bool {
        self.exit_date.is_none()
    }
}

// ============================================================================
// Events
// ============================================================================

/// Kind of submission at the front desk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Entry,
    Exit,
}

impl FromStr for EventKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "entrada" | "entry" => Ok(EventKind::Entry),
            "saida" | "saída" | "exit" => Ok(EventKind::Exit),
            other => Err(crate::Error::Other(format!("Unknown event kind: {}", other))),
        }
    }
}

/// An entry or exit submission carrying visitor identity and destination
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitEvent {
    pub kind: EventKind,
    pub name: String,
    pub personal_id: String,
    pub company: String,
    pub destination: String,
}

/// Owned copy of a field with surrounding whitespace removed
fn trimmed(value: impl Into<String>) -> String {
    let value = value.into();
    if value.trim().len() == value.len() {
        value
    } else {
        value.trim().to_string()
    }
}

/// Constructors trim every field, so the CLI and the web form store the same text
impl VisitEvent {
    pub fn entry(
        name: impl Into<String>,
        personal_id: impl Into<String>,
        company: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            kind: EventKind::Entry,
            name: trimmed(name),
            personal_id: trimmed(personal_id),
            company: trimmed(company),
            destination: trimmed(destination),
        }
    }

    /// Exit events only need the personal_id to match; the name is used for the message
    pub fn exit(name: impl Into<String>, personal_id: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Exit,
            name: trimmed(name),
            personal_id: trimmed(personal_id),
            company: String::new(),
            destination: String::new(),
        }
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Which open records an exit event closes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPolicy {
    /// Close every open record with the same personal_id
    #[default]
    CloseAll,
    /// Close only the last open record (in file order) with the same personal_id
    CloseMostRecent,
}

/// Result of applying an event to the visitor log
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    EntryRegistered { id: u64, name: String },
    ExitRegistered { name: String, closed: Vec<u64> },
    NoPendingEntry { personal_id: String },
}

impl Outcome {
    /// Whether the event changed the stored records
    pub fn mutated(&self) -> bool {
        !matches!(self, Outcome::NoPendingEntry { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::EntryRegistered { name, .. } => write!(f, "Entry registered for {}", name),
            Outcome::ExitRegistered { name, .. } => write!(f, "Exit registered for {}", name),
            Outcome::NoPendingEntry { .. } => {
                write!(f, "No pending entry found for this personal_id")
            }
        }
    }
}
