//! Micro-journal: short per-day reflections attached to commitments.
//!
//! One entry may exist per (commitment, calendar day); writing again the
//! same day replaces the earlier note. The store also owns the prompting
//! policy -- whether a successful check-in should be followed by the
//! editor, a soft teaser, or nothing -- because that decision depends on
//! the entry count and the entitlement tier.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::sync::Arc;

use crate::calendar;
use crate::entitlement::{EntitlementGate, Feature};
use crate::error::ValidationError;
use crate::storage::{KeyValueStore, Repository};

const JOURNAL_RECORD: Repository<Vec<MicroJournalEntry>> = Repository::new("microJournal");

/// Maximum characters per entry.
pub const MAX_ENTRY_CHARS: usize = 140;

/// Entries a free-tier commitment may accumulate before journaling is
/// gated behind the teaser.
pub const FREE_ENTRY_LIMIT: usize = 10;

/// Days of history visible on the free tier.
const FREE_HISTORY_DAYS: i64 = 30;

/// A single reflective note for one commitment on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroJournalEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub text: String,
    pub commitment_id: Uuid,
}

impl MicroJournalEntry {
    /// Build an entry, clamping the text to [`MAX_ENTRY_CHARS`].
    fn new(date: NaiveDate, text: &str, commitment_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            text: text.chars().take(MAX_ENTRY_CHARS).collect(),
            commitment_id,
        }
    }
}

/// What to offer the user after a successful check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalPrompt {
    /// Open the entry editor.
    Editor,
    /// Show the soft upsell; no entry is created.
    Teaser,
    /// Offer nothing.
    Nothing,
}

/// Whether a streak value is a teaser milestone: days 1, 3, 5, 7, 14,
/// 21, 30, and every multiple of 30 thereafter.
pub fn is_milestone_streak(streak: u32) -> bool {
    matches!(streak, 1 | 3 | 5 | 7 | 14 | 21 | 30) || (streak > 30 && streak % 30 == 0)
}

/// Owner of all journal entries, across active and archived commitments.
pub struct JournalStore {
    entries: Vec<MicroJournalEntry>,
    store: Arc<dyn KeyValueStore>,
}

impl JournalStore {
    /// Build the store, restoring persisted entries. A missing or
    /// unreadable record reads as an empty journal.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = JOURNAL_RECORD.load(store.as_ref()).unwrap_or_default();
        Self { entries, store }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// All entries for a commitment, newest first.
    pub fn entries_for(&self, commitment_id: Uuid) -> Vec<&MicroJournalEntry> {
        self.entries
            .iter()
            .filter(|e| e.commitment_id == commitment_id)
            .collect()
    }

    /// Entries visible under the current tier: everything when the tier
    /// grants unlimited history, otherwise the trailing 30 days.
    pub fn visible_entries_for(
        &self,
        commitment_id: Uuid,
        gate: &EntitlementGate,
    ) -> Vec<&MicroJournalEntry> {
        self.visible_entries_as_of(commitment_id, gate, calendar::today())
    }

    /// [`Self::visible_entries_for`] with an explicit reference day.
    pub fn visible_entries_as_of(
        &self,
        commitment_id: Uuid,
        gate: &EntitlementGate,
        today: NaiveDate,
    ) -> Vec<&MicroJournalEntry> {
        let all = self.entries_for(commitment_id);
        if gate.has_access(Feature::UnlimitedArchive) {
            return all;
        }
        let cutoff = today - chrono::Duration::days(FREE_HISTORY_DAYS);
        all.into_iter().filter(|e| e.date >= cutoff).collect()
    }

    /// Today's entry for a commitment, if one was written.
    pub fn todays_entry(&self, commitment_id: Uuid) -> Option<&MicroJournalEntry> {
        self.entry_on(commitment_id, calendar::today())
    }

    pub fn entry_on(&self, commitment_id: Uuid, day: NaiveDate) -> Option<&MicroJournalEntry> {
        self.entries
            .iter()
            .find(|e| e.commitment_id == commitment_id && e.date == day)
    }

    /// Free-tier entries left for a commitment before the teaser kicks in.
    pub fn entries_remaining(&self, commitment_id: Uuid) -> usize {
        FREE_ENTRY_LIMIT.saturating_sub(self.entries_for(commitment_id).len())
    }

    /// Decide what to offer after a successful check-in.
    ///
    /// Entitled tiers and free commitments under the entry limit get the
    /// editor. At the limit, the teaser appears only on milestone
    /// streaks; otherwise nothing is offered.
    pub fn prompt_after_check_in(
        &self,
        commitment_id: Uuid,
        streak: u32,
        gate: &EntitlementGate,
    ) -> JournalPrompt {
        if gate.has_access(Feature::MicroJournaling) {
            return JournalPrompt::Editor;
        }
        if self.entries_for(commitment_id).len() < FREE_ENTRY_LIMIT {
            return JournalPrompt::Editor;
        }
        if is_milestone_streak(streak) {
            JournalPrompt::Teaser
        } else {
            JournalPrompt::Nothing
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Write today's entry for a commitment, replacing any earlier entry
    /// for the same day.
    ///
    /// # Errors
    /// Rejects blank or whitespace-only text with no state change.
    pub fn set_todays_entry(
        &mut self,
        commitment_id: Uuid,
        text: &str,
    ) -> Result<(), ValidationError> {
        self.set_entry_on(commitment_id, text, calendar::today())
    }

    /// [`Self::set_todays_entry`] with an explicit day.
    pub fn set_entry_on(
        &mut self,
        commitment_id: Uuid,
        text: &str,
        day: NaiveDate,
    ) -> Result<(), ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::BlankJournalText);
        }

        self.entries
            .retain(|e| !(e.commitment_id == commitment_id && e.date == day));
        self.entries
            .push(MicroJournalEntry::new(day, text, commitment_id));
        self.entries.sort_by(|a, b| b.date.cmp(&a.date));

        self.persist();
        Ok(())
    }

    /// Remove every entry belonging to a commitment. Called when an
    /// archived commitment is deleted.
    pub fn delete_entries_for(&mut self, commitment_id: Uuid) {
        self.entries.retain(|e| e.commitment_id != commitment_id);
        self.persist();
    }

    /// Remove a single entry by id.
    pub fn delete_entry(&mut self, id: Uuid) {
        self.entries.retain(|e| e.id != id);
        self.persist();
    }

    fn persist(&self) {
        JOURNAL_RECORD.save(self.store.as_ref(), &self.entries);
    }
}
