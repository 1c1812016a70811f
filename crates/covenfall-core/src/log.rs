//! Structured round log consumed by client-facing layers.
//!
//! Every observable outcome of a round becomes a [`LogEntry`]. Each entry
//! carries three parallel message variants so the transport layer can render
//! the same moment from three perspectives:
//!
//! - `public_message`: what everyone else sees
//! - `private_message`: what the targeted player sees
//! - `attacker_message`: what the acting player sees
//!
//! Entries are immutable once appended. The transport layer is responsible
//! for deciding which variant reaches which connection; the engine only
//! records them in resolution order.
//!
//! # Example
//!
//! ```
//! use covenfall_core::log::{LogEntry, LogKind, RoundLog};
//! use covenfall_core::player::PlayerId;
//!
//! let mut log = RoundLog::new();
//! log.push(
//!     LogEntry::new(LogKind::Damage, "Mira takes 7 damage.")
//!         .with_target(PlayerId::new("mira"))
//!         .with_private("You take 7 damage."),
//! );
//!
//! assert_eq!(log.len(), 1);
//! assert!(log.entries()[0].is_public());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::player::PlayerId;

/// Category of a log entry, used by consumers for filtering and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogKind {
    /// An ability was used.
    Action,
    /// Damage was dealt.
    Damage,
    /// Healing was applied.
    Heal,
    /// A status effect was applied, ticked, or expired.
    Effect,
    /// A player died.
    Death,
    /// A hidden role was revealed.
    Detection,
    /// Engine bookkeeping (invalidated actions, handler failures).
    System,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action => write!(f, "Action"),
            Self::Damage => write!(f, "Damage"),
            Self::Heal => write!(f, "Heal"),
            Self::Effect => write!(f, "Effect"),
            Self::Death => write!(f, "Death"),
            Self::Detection => write!(f, "Detection"),
            Self::System => write!(f, "System"),
        }
    }
}

/// A single immutable entry in the round log.
///
/// Built with [`LogEntry::new`] plus the `with_*` builders. A fresh entry is
/// public with the private and attacker variants mirroring the public text;
/// builders override the variants that differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    kind: LogKind,
    public: bool,
    target: Option<PlayerId>,
    attacker: Option<PlayerId>,
    public_message: String,
    private_message: String,
    attacker_message: String,
}

impl LogEntry {
    /// Creates a public entry whose three variants all carry `message`.
    #[must_use]
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            public: true,
            target: None,
            attacker: None,
            private_message: message.clone(),
            attacker_message: message.clone(),
            public_message: message,
        }
    }

    /// Marks the entry as private: the public variant must not be broadcast.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    /// Sets the player this entry is about.
    #[must_use]
    pub fn with_target(mut self, target: PlayerId) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the acting player.
    #[must_use]
    pub fn with_attacker(mut self, attacker: PlayerId) -> Self {
        self.attacker = Some(attacker);
        self
    }

    /// Overrides the message shown to the targeted player.
    #[must_use]
    pub fn with_private(mut self, message: impl Into<String>) -> Self {
        self.private_message = message.into();
        self
    }

    /// Overrides the message shown to the acting player.
    #[must_use]
    pub fn with_attacker_message(mut self, message: impl Into<String>) -> Self {
        self.attacker_message = message.into();
        self
    }

    /// Returns the entry's category.
    #[must_use]
    pub const fn kind(&self) -> LogKind {
        self.kind
    }

    /// Returns `true` if the public variant may be broadcast.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.public
    }

    /// Returns the player this entry is about, if any.
    #[must_use]
    pub fn target(&self) -> Option<&PlayerId> {
        self.target.as_ref()
    }

    /// Returns the acting player, if any.
    #[must_use]
    pub fn attacker(&self) -> Option<&PlayerId> {
        self.attacker.as_ref()
    }

    /// Returns the message shown to everyone else.
    #[must_use]
    pub fn public_message(&self) -> &str {
        &self.public_message
    }

    /// Returns the message shown to the targeted player.
    #[must_use]
    pub fn private_message(&self) -> &str {
        &self.private_message
    }

    /// Returns the message shown to the acting player.
    #[must_use]
    pub fn attacker_message(&self) -> &str {
        &self.attacker_message
    }
}

/// Ordered collection of log entries for one round.
///
/// Append-only during resolution; consumed whole as part of the round result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundLog {
    entries: Vec<LogEntry>,
}

impl RoundLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Returns the entries in append order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the log, returning the entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod log_entry_tests {
        use super::*;

        #[test]
        fn new_mirrors_message_across_variants() {
            let entry = LogEntry::new(LogKind::Heal, "Mira is healed.");
            assert_eq!(entry.public_message(), "Mira is healed.");
            assert_eq!(entry.private_message(), "Mira is healed.");
            assert_eq!(entry.attacker_message(), "Mira is healed.");
            assert!(entry.is_public());
        }

        #[test]
        fn builders_override_variants() {
            let entry = LogEntry::new(LogKind::Damage, "Mira takes 5 damage.")
                .with_target(PlayerId::new("mira"))
                .with_attacker(PlayerId::new("korga"))
                .with_private("You take 5 damage.")
                .with_attacker_message("You hit Mira for 5.");

            assert_eq!(entry.public_message(), "Mira takes 5 damage.");
            assert_eq!(entry.private_message(), "You take 5 damage.");
            assert_eq!(entry.attacker_message(), "You hit Mira for 5.");
            assert_eq!(entry.target(), Some(&PlayerId::new("mira")));
            assert_eq!(entry.attacker(), Some(&PlayerId::new("korga")));
        }

        #[test]
        fn private_suppresses_public_flag() {
            let entry = LogEntry::new(LogKind::System, "Your action fizzled.").private();
            assert!(!entry.is_public());
        }

        #[test]
        fn serialization_roundtrip() {
            let entry = LogEntry::new(LogKind::Detection, "A Warlock is revealed!")
                .with_target(PlayerId::new("vex"));
            let json = serde_json::to_string(&entry).unwrap();
            let back: LogEntry = serde_json::from_str(&json).unwrap();
            assert_eq!(entry, back);
        }
    }

    mod round_log_tests {
        use super::*;

        #[test]
        fn starts_empty() {
            let log = RoundLog::new();
            assert!(log.is_empty());
            assert_eq!(log.len(), 0);
        }

        #[test]
        fn push_preserves_order() {
            let mut log = RoundLog::new();
            log.push(LogEntry::new(LogKind::Action, "first"));
            log.push(LogEntry::new(LogKind::Action, "second"));

            let entries = log.into_entries();
            assert_eq!(entries[0].public_message(), "first");
            assert_eq!(entries[1].public_message(), "second");
        }
    }
}
