//! Archive of ended commitments.
//!
//! Snapshots are prepended as commitments leave the active lifecycle and
//! never mutated afterwards; the only write after insertion is deletion,
//! which also cascades into the journal so no orphaned entries remain.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use std::sync::Arc;

use crate::commitment::ArchivedCommitment;
use crate::entitlement::{EntitlementGate, Feature};
use crate::journal::JournalStore;
use crate::storage::{KeyValueStore, Repository};

const ARCHIVE_RECORD: Repository<Vec<ArchivedCommitment>> =
    Repository::new("archivedCommitments");

/// Days of archive history visible on the free tier.
const FREE_HISTORY_DAYS: i64 = 30;

/// Owner of the archived-commitment collection, newest first.
pub struct ArchiveStore {
    archived: Vec<ArchivedCommitment>,
    store: Arc<dyn KeyValueStore>,
}

impl ArchiveStore {
    /// Build the store, restoring persisted snapshots. A missing or
    /// unreadable record reads as an empty archive.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let archived = ARCHIVE_RECORD.load(store.as_ref()).unwrap_or_default();
        Self { archived, store }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Every archived commitment, newest first.
    pub fn all(&self) -> &[ArchivedCommitment] {
        &self.archived
    }

    /// Archived commitments visible under the current tier: everything
    /// with unlimited history, otherwise those ended in the last 30 days.
    pub fn visible(&self, gate: &EntitlementGate) -> Vec<&ArchivedCommitment> {
        self.visible_as_of(gate, Utc::now())
    }

    /// [`Self::visible`] with an explicit reference moment.
    pub fn visible_as_of(
        &self,
        gate: &EntitlementGate,
        now: DateTime<Utc>,
    ) -> Vec<&ArchivedCommitment> {
        if gate.has_access(Feature::UnlimitedArchive) {
            return self.archived.iter().collect();
        }
        let cutoff = now - Duration::days(FREE_HISTORY_DAYS);
        self.archived
            .iter()
            .filter(|a| a.end_date >= cutoff)
            .collect()
    }

    /// Archived commitments hidden behind the tier window.
    pub fn hidden_count(&self, gate: &EntitlementGate) -> usize {
        self.hidden_count_as_of(gate, Utc::now())
    }

    pub fn hidden_count_as_of(&self, gate: &EntitlementGate, now: DateTime<Utc>) -> usize {
        self.archived.len() - self.visible_as_of(gate, now).len()
    }

    pub fn get(&self, id: Uuid) -> Option<&ArchivedCommitment> {
        self.archived.iter().find(|a| a.id == id)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Prepend a fresh snapshot. Called by the lifecycle store's
    /// archival transition. The insert shifts the whole vector; archives
    /// hold at most a handful of entries.
    pub fn insert_front(&mut self, archived: ArchivedCommitment) {
        self.archived.insert(0, archived);
        self.persist();
    }

    /// Delete an archived commitment and, as one logical transaction,
    /// every journal entry that referenced it. Returns false if no
    /// snapshot with that id exists.
    pub fn delete(&mut self, id: Uuid, journal: &mut JournalStore) -> bool {
        let before = self.archived.len();
        self.archived.retain(|a| a.id != id);
        if self.archived.len() == before {
            return false;
        }
        debug!(%id, "deleting archived commitment and its journal entries");
        journal.delete_entries_for(id);
        self.persist();
        true
    }

    fn persist(&self) {
        ARCHIVE_RECORD.save(self.store.as_ref(), &self.archived);
    }
}
