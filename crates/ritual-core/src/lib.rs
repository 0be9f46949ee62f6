//! # Ritual Core Library
//!
//! This library provides the domain engine for Ritual, a single-commitment
//! daily habit tracker. It turns a sequence of daily check-ins into durable
//! streak statistics, lifecycle transitions, an archive of past commitments,
//! per-day reflective notes, and a reminder schedule. Presentation, the OS
//! notification mechanism, and the purchase flow are external collaborators
//! behind narrow traits.
//!
//! ## Architecture
//!
//! - **Streak Engine**: pure computation of stats from a check-in event,
//!   keyed on local calendar days
//! - **Stores**: each collection (active commitment, archive, journal) has
//!   exactly one owning store with write-through persistence
//! - **Storage**: SQLite-backed key-value records with lenient loads
//! - **Reminders**: a slot model resynchronized against an external
//!   delivery service
//!
//! ## Key Components
//!
//! - [`CommitmentStore`]: active-slot state machine
//! - [`ArchiveStore`] / [`JournalStore`]: history with tiered visibility
//! - [`ReminderScheduler`]: desired-schedule owner
//! - [`EntitlementGate`]: single point for tier rules

pub mod archive;
pub mod calendar;
pub mod commitment;
pub mod entitlement;
pub mod error;
pub mod journal;
pub mod lifecycle;
pub mod reminders;
pub mod storage;
pub mod streak;

pub use archive::ArchiveStore;
pub use commitment::{
    ArchivedCommitment, Category, CommitDay, Commitment, CommitmentStats, CompletionType,
};
pub use entitlement::{EntitlementGate, EntitlementProvider, Feature, NoEntitlements};
pub use error::{CoreError, StorageError, ValidationError};
pub use journal::{JournalPrompt, JournalStore, MicroJournalEntry};
pub use lifecycle::CommitmentStore;
pub use reminders::{NotificationDelivery, ReminderScheduler, ReminderSlot};
pub use storage::{KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use streak::CheckInOutcome;
