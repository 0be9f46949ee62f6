//! Commitment lifecycle: the single active slot and its transitions.
//!
//! State machine over one slot:
//!
//! ```text
//! Empty -> Active -> (Empty)
//! ```
//!
//! `create` enters Active; `finish`, `reset`, and `abandon` each archive
//! the commitment and return the slot to Empty. There is no other way
//! out of Active. Every successful mutation is written through to the
//! key-value store before the call returns.

use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{debug, warn};

use std::sync::Arc;

use crate::archive::ArchiveStore;
use crate::calendar;
use crate::commitment::{ArchivedCommitment, Category, Commitment, CompletionType};
use crate::entitlement::EntitlementGate;
use crate::error::ValidationError;
use crate::reminders::ReminderScheduler;
use crate::storage::{KeyValueStore, Repository};
use crate::streak::{self, CheckInOutcome};

const ACTIVE_RECORD: Repository<Commitment> = Repository::new("activeCommitment");

/// Owner of the active commitment. The only writer of its stats and
/// history.
pub struct CommitmentStore {
    active: Option<Commitment>,
    store: Arc<dyn KeyValueStore>,
    /// Single-flight guard: a check-in observed while another is in
    /// flight is dropped, not queued.
    committing: bool,
}

impl CommitmentStore {
    /// Build the store, restoring the persisted slot. A missing or
    /// unreadable record reads as Empty.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let active = ACTIVE_RECORD.load(store.as_ref());
        Self {
            active,
            store,
            committing: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn active(&self) -> Option<&Commitment> {
        self.active.as_ref()
    }

    pub fn has_active_commitment(&self) -> bool {
        self.active.is_some()
    }

    pub fn has_committed_today(&self) -> bool {
        self.has_committed_on(calendar::today())
    }

    pub fn has_committed_on(&self, today: NaiveDate) -> bool {
        self.active
            .as_ref()
            .is_some_and(|c| c.stats.has_committed_on(today))
    }

    pub fn current_streak(&self) -> u32 {
        self.active.as_ref().map_or(0, |c| c.stats.current_streak)
    }

    // ── Creation ─────────────────────────────────────────────────────

    /// Create a commitment in the slot and synchronize reminders around
    /// the supplied time.
    ///
    /// A commitment already in the slot is replaced without an archive
    /// snapshot; callers wanting one must `finish`/`reset`/`abandon`
    /// first.
    ///
    /// # Errors
    /// Validation rejections (empty title, unchosen category, over-long
    /// identity statement) leave both the slot and the scheduler
    /// untouched.
    pub fn create(
        &mut self,
        title: &str,
        identity_statement: Option<&str>,
        category: Category,
        reminder_time: NaiveTime,
        scheduler: &mut ReminderScheduler,
        gate: &EntitlementGate,
    ) -> Result<uuid::Uuid, ValidationError> {
        let commitment = Commitment::new(title, identity_statement, category, reminder_time)?;
        let id = commitment.id;
        if let Some(previous) = &self.active {
            debug!(id = %previous.id, "replacing active commitment without archiving");
        }
        debug!(%id, "creating commitment");

        self.active = Some(commitment);
        self.persist();

        scheduler.set_preferred_time(reminder_time);
        scheduler.set_enabled(true);
        scheduler.resynchronize(title, gate);

        Ok(id)
    }

    // ── Daily check-in ───────────────────────────────────────────────

    /// Record today's check-in. Returns true iff state changed.
    ///
    /// No-op when the slot is empty, when today is already recorded, or
    /// when another check-in is in flight.
    pub fn check_in_today(&mut self) -> bool {
        self.check_in_on(calendar::today())
    }

    /// [`Self::check_in_today`] with an explicit day.
    pub fn check_in_on(&mut self, today: NaiveDate) -> bool {
        if self.committing || self.active.is_none() {
            return false;
        }

        self.committing = true;
        let mut recorded = false;
        if let Some(commitment) = self.active.as_mut() {
            if let CheckInOutcome::Recorded { stats, day } =
                streak::check_in(&commitment.stats, &commitment.history, today)
            {
                commitment.history.push(day);
                commitment.stats = stats;
                recorded = true;
            }
        }
        if recorded {
            self.persist();
        }
        self.committing = false;
        recorded
    }

    // ── Archival transitions ─────────────────────────────────────────

    /// Finish the active commitment: archive it as completed.
    pub fn finish(
        &mut self,
        archive: &mut ArchiveStore,
        scheduler: &ReminderScheduler,
    ) -> Option<ArchivedCommitment> {
        self.archive_active(CompletionType::Finished, archive, scheduler)
    }

    /// Reset the active commitment: archive it and free the slot for a
    /// fresh start.
    pub fn reset(
        &mut self,
        archive: &mut ArchiveStore,
        scheduler: &ReminderScheduler,
    ) -> Option<ArchivedCommitment> {
        self.archive_active(CompletionType::Reset, archive, scheduler)
    }

    /// Abandon the active commitment: archive it as given up.
    pub fn abandon(
        &mut self,
        archive: &mut ArchiveStore,
        scheduler: &ReminderScheduler,
    ) -> Option<ArchivedCommitment> {
        self.archive_active(CompletionType::Abandoned, archive, scheduler)
    }

    fn archive_active(
        &mut self,
        completion_type: CompletionType,
        archive: &mut ArchiveStore,
        scheduler: &ReminderScheduler,
    ) -> Option<ArchivedCommitment> {
        let commitment = self.active.take()?;
        let snapshot = ArchivedCommitment::from_active(&commitment, completion_type, Utc::now());
        debug!(id = %snapshot.id, completion = ?completion_type, "archiving commitment");

        archive.insert_front(snapshot.clone());
        scheduler.cancel_all();
        self.persist();
        Some(snapshot)
    }

    // ── Launch resynchronization ─────────────────────────────────────

    /// Reinstall reminders for the active commitment, if any. Called on
    /// startup and foreground resume, since the OS may have silently
    /// cleared the schedule.
    pub fn resynchronize_reminders(
        &self,
        scheduler: &mut ReminderScheduler,
        gate: &EntitlementGate,
    ) {
        if let Some(commitment) = &self.active {
            scheduler.resynchronize(&commitment.title, gate);
        }
    }

    fn persist(&self) {
        match &self.active {
            Some(commitment) => {
                ACTIVE_RECORD.save(self.store.as_ref(), commitment);
            }
            None => {
                if !ACTIVE_RECORD.clear(self.store.as_ref()) {
                    warn!("failed to clear active commitment record");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlement::NoEntitlements;
    use crate::storage::MemoryKvStore;
    use crate::reminders::NotificationDelivery;
    use std::sync::Mutex;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn reminder() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    struct SilentDelivery {
        cancel_count: Mutex<u32>,
        scheduled: Mutex<Vec<String>>,
    }

    impl SilentDelivery {
        fn new() -> Self {
            Self {
                cancel_count: Mutex::new(0),
                scheduled: Mutex::new(Vec::new()),
            }
        }
    }

    impl NotificationDelivery for SilentDelivery {
        fn is_authorized(&self) -> bool {
            true
        }
        fn request_authorization(&self) -> Result<bool, Box<dyn std::error::Error>> {
            Ok(true)
        }
        fn schedule(
            &self,
            id: &str,
            _time: NaiveTime,
            _title: &str,
            _body: &str,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.scheduled.lock().unwrap().push(id.to_string());
            Ok(())
        }
        fn cancel_all(&self) {
            *self.cancel_count.lock().unwrap() += 1;
            self.scheduled.lock().unwrap().clear();
        }
    }

    struct Fixture {
        store: CommitmentStore,
        archive: ArchiveStore,
        scheduler: ReminderScheduler,
        gate: EntitlementGate,
        delivery: Arc<SilentDelivery>,
    }

    fn fixture() -> Fixture {
        let kv = Arc::new(MemoryKvStore::new());
        let delivery = Arc::new(SilentDelivery::new());
        Fixture {
            store: CommitmentStore::load(kv.clone()),
            archive: ArchiveStore::load(kv.clone()),
            scheduler: ReminderScheduler::load(delivery.clone(), kv.clone()),
            gate: EntitlementGate::load(Arc::new(NoEntitlements), kv),
            delivery,
        }
    }

    fn create(f: &mut Fixture) {
        f.store
            .create(
                "Run every day",
                Some("I am a runner"),
                Category::Movement,
                reminder(),
                &mut f.scheduler,
                &f.gate,
            )
            .unwrap();
    }

    #[test]
    fn create_fills_the_slot_and_schedules_the_primary_reminder() {
        let mut f = fixture();
        create(&mut f);

        assert!(f.store.has_active_commitment());
        assert!(f.scheduler.notifications_enabled());
        assert_eq!(f.scheduler.preferred_time(), reminder());
        assert_eq!(
            *f.delivery.scheduled.lock().unwrap(),
            vec!["dailyCommitReminder-primary"]
        );
    }

    #[test]
    fn create_rejects_invalid_input_without_touching_state() {
        let mut f = fixture();
        let err = f
            .store
            .create("", None, Category::Movement, reminder(), &mut f.scheduler, &f.gate)
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
        assert!(!f.store.has_active_commitment());
        assert!(f.delivery.scheduled.lock().unwrap().is_empty());
    }

    #[test]
    fn create_over_active_slot_replaces_without_archiving() {
        let mut f = fixture();
        create(&mut f);
        let first = f.store.active().unwrap().id;

        let second = f
            .store
            .create("Meditate", None, Category::Mind, reminder(), &mut f.scheduler, &f.gate)
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(f.store.active().unwrap().title, "Meditate");
        assert!(f.archive.all().is_empty());
    }

    #[test]
    fn check_in_records_once_per_day() {
        let mut f = fixture();
        create(&mut f);

        assert!(f.store.check_in_on(d("2026-03-01")));
        assert!(!f.store.check_in_on(d("2026-03-01")));

        let stats = &f.store.active().unwrap().stats;
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.total_committed_days, 1);
        assert!(f.store.has_committed_on(d("2026-03-01")));
    }

    #[test]
    fn check_in_without_active_commitment_is_a_no_op() {
        let mut f = fixture();
        assert!(!f.store.check_in_on(d("2026-03-01")));
    }

    #[test]
    fn spec_scenario_gap_resets_streak_but_keeps_longest() {
        let mut f = fixture();
        create(&mut f);

        for day in ["2026-03-01", "2026-03-02", "2026-03-03"] {
            assert!(f.store.check_in_on(d(day)));
        }
        {
            let stats = &f.store.active().unwrap().stats;
            assert_eq!(stats.current_streak, 3);
            assert_eq!(stats.longest_streak, 3);
            assert_eq!(stats.total_committed_days, 3);
        }

        // skip 2026-03-04
        assert!(f.store.check_in_on(d("2026-03-05")));
        let stats = &f.store.active().unwrap().stats;
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.total_committed_days, 4);
    }

    #[test]
    fn finish_archives_and_clears_the_slot() {
        let mut f = fixture();
        create(&mut f);
        f.store.check_in_on(d("2026-03-01"));
        let id = f.store.active().unwrap().id;

        let snapshot = f.store.finish(&mut f.archive, &f.scheduler).unwrap();
        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.completion_type, CompletionType::Finished);
        assert_eq!(snapshot.total_committed_days, 1);

        assert!(!f.store.has_active_commitment());
        assert_eq!(f.archive.all().len(), 1);
        assert!(*f.delivery.cancel_count.lock().unwrap() >= 1);
        assert!(f.delivery.scheduled.lock().unwrap().is_empty());
    }

    #[test]
    fn each_transition_stamps_its_completion_type() {
        for (completion, run) in [
            (
                CompletionType::Finished,
                (|f: &mut Fixture| f.store.finish(&mut f.archive, &f.scheduler))
                    as fn(&mut Fixture) -> Option<ArchivedCommitment>,
            ),
            (CompletionType::Reset, |f| {
                f.store.reset(&mut f.archive, &f.scheduler)
            }),
            (CompletionType::Abandoned, |f| {
                f.store.abandon(&mut f.archive, &f.scheduler)
            }),
        ] {
            let mut f = fixture();
            create(&mut f);
            let snapshot = run(&mut f).unwrap();
            assert_eq!(snapshot.completion_type, completion);
            assert!(!f.store.has_active_commitment());
        }
    }

    #[test]
    fn archiving_an_empty_slot_is_a_no_op() {
        let mut f = fixture();
        assert!(f.store.finish(&mut f.archive, &f.scheduler).is_none());
        assert!(f.archive.all().is_empty());
    }

    #[test]
    fn state_survives_reload_through_the_store() {
        let kv = Arc::new(MemoryKvStore::new());
        let delivery = Arc::new(SilentDelivery::new());
        let mut scheduler = ReminderScheduler::load(delivery, kv.clone());
        let gate = EntitlementGate::load(Arc::new(NoEntitlements), kv.clone());

        let mut store = CommitmentStore::load(kv.clone());
        store
            .create("Read", None, Category::Mind, reminder(), &mut scheduler, &gate)
            .unwrap();
        store.check_in_on(d("2026-03-01"));
        store.check_in_on(d("2026-03-02"));

        let reloaded = CommitmentStore::load(kv);
        let commitment = reloaded.active().unwrap();
        assert_eq!(commitment.title, "Read");
        assert_eq!(commitment.stats.current_streak, 2);
        assert_eq!(commitment.history.len(), 2);
    }

    #[test]
    fn corrupt_active_record_loads_as_empty_slot() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set("activeCommitment", b"{ definitely not a commitment").unwrap();
        let store = CommitmentStore::load(kv);
        assert!(!store.has_active_commitment());
    }

    #[test]
    fn launch_resynchronization_reinstalls_reminders() {
        let mut f = fixture();
        create(&mut f);
        f.delivery.cancel_all(); // OS cleared the schedule

        f.store.resynchronize_reminders(&mut f.scheduler, &f.gate);
        assert_eq!(
            *f.delivery.scheduled.lock().unwrap(),
            vec!["dailyCommitReminder-primary"]
        );
    }
}
