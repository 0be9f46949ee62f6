//! Daily reminder scheduling.
//!
//! The scheduler owns a small model -- one primary reminder time plus a
//! fixed set of named optional slots -- and turns it into a desired
//! schedule handed to an external [`NotificationDelivery`] service.
//! Resynchronization is full-replace: cancel everything, then schedule
//! whatever the current state and tier call for. It runs after
//! commitment creation, on app resume (the OS may silently clear
//! schedules), and after any change to times, slot enablement, or tier.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use std::sync::Arc;

use crate::entitlement::{EntitlementGate, Feature};
use crate::storage::{KeyValueStore, Repository};

const SLOTS_RECORD: Repository<Vec<ReminderSlot>> = Repository::new("reminderSlots");
const ENABLED_RECORD: Repository<bool> = Repository::new("notificationsEnabled");
const PREFERRED_TIME_RECORD: Repository<NaiveTime> =
    Repository::new("preferredNotificationTime");

/// Identifier prefix for every scheduled reminder.
const REMINDER_ID_PREFIX: &str = "dailyCommitReminder";

/// Title line of every reminder notification.
const REMINDER_TITLE: &str = "Time to Commit";

/// External notification backend. Registration, permission UI, and
/// delivery all live behind this trait; the engine only produces the
/// desired schedule.
pub trait NotificationDelivery: Send + Sync {
    /// Whether the user has granted notification permission.
    fn is_authorized(&self) -> bool;

    /// Prompt for permission. Returns whether it was granted.
    fn request_authorization(&self) -> Result<bool, Box<dyn std::error::Error>>;

    /// Register a repeating daily notification.
    fn schedule(
        &self,
        id: &str,
        time: NaiveTime,
        title: &str,
        body: &str,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Drop every pending notification.
    fn cancel_all(&self);
}

/// A named, independently configurable reminder time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSlot {
    /// Stable key: "morning", "midday", "evening".
    pub id: String,
    pub time: NaiveTime,
    pub is_enabled: bool,
    pub label: String,
}

impl ReminderSlot {
    fn new(id: &str, hour: u32, minute: u32, is_enabled: bool, label: &str) -> Self {
        Self {
            id: id.to_string(),
            time: NaiveTime::from_hms_opt(hour, minute, 0)
                .unwrap_or(NaiveTime::MIN),
            is_enabled,
            label: label.to_string(),
        }
    }

    /// The optional slots a fresh installation starts with.
    pub fn default_slots() -> Vec<ReminderSlot> {
        vec![
            ReminderSlot::new("morning", 7, 0, true, "Morning"),
            ReminderSlot::new("midday", 12, 0, false, "Midday"),
            ReminderSlot::new("evening", 19, 0, false, "Evening"),
        ]
    }
}

fn default_preferred_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Reminder schedule owner.
pub struct ReminderScheduler {
    delivery: Arc<dyn NotificationDelivery>,
    store: Arc<dyn KeyValueStore>,
    slots: Vec<ReminderSlot>,
    notifications_enabled: bool,
    /// Time of the implicit primary slot.
    preferred_time: NaiveTime,
}

impl ReminderScheduler {
    /// Build the scheduler, restoring persisted slot state.
    pub fn load(delivery: Arc<dyn NotificationDelivery>, store: Arc<dyn KeyValueStore>) -> Self {
        let slots = SLOTS_RECORD
            .load(store.as_ref())
            .unwrap_or_else(ReminderSlot::default_slots);
        let notifications_enabled = ENABLED_RECORD.load(store.as_ref()).unwrap_or(false);
        let preferred_time = PREFERRED_TIME_RECORD
            .load(store.as_ref())
            .unwrap_or_else(default_preferred_time);
        Self {
            delivery,
            store,
            slots,
            notifications_enabled,
            preferred_time,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }

    pub fn preferred_time(&self) -> NaiveTime {
        self.preferred_time
    }

    pub fn slots(&self) -> &[ReminderSlot] {
        &self.slots
    }

    pub fn slot(&self, id: &str) -> Option<&ReminderSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Turn reminders on or off. Callers resynchronize afterwards.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.notifications_enabled = enabled;
        ENABLED_RECORD.save(self.store.as_ref(), &self.notifications_enabled);
    }

    /// Change the primary reminder time. Callers resynchronize afterwards.
    pub fn set_preferred_time(&mut self, time: NaiveTime) {
        self.preferred_time = time;
        PREFERRED_TIME_RECORD.save(self.store.as_ref(), &self.preferred_time);
    }

    /// Reconfigure a named slot. Unknown ids are ignored.
    /// Callers resynchronize afterwards.
    pub fn update_slot(&mut self, id: &str, time: Option<NaiveTime>, is_enabled: Option<bool>) {
        let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) else {
            return;
        };
        if let Some(time) = time {
            slot.time = time;
        }
        if let Some(is_enabled) = is_enabled {
            slot.is_enabled = is_enabled;
        }
        SLOTS_RECORD.save(self.store.as_ref(), &self.slots);
    }

    /// Replace the installed schedule with the desired one.
    ///
    /// Cancels every pending reminder first. If reminders are disabled,
    /// nothing further happens. Authorization is requested lazily on
    /// first need; a decline forces reminders off. The primary slot is
    /// always scheduled; extra slots only when the tier grants
    /// [`Feature::TriggerTimeReminders`]. Delivery failures are logged
    /// and dropped.
    pub fn resynchronize(&mut self, title: &str, gate: &EntitlementGate) {
        self.delivery.cancel_all();

        if !self.notifications_enabled {
            return;
        }

        if !self.delivery.is_authorized() {
            match self.delivery.request_authorization() {
                Ok(true) => {}
                Ok(false) => {
                    debug!("notification authorization declined, disabling reminders");
                    self.set_enabled(false);
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "notification authorization request failed");
                    self.set_enabled(false);
                    return;
                }
            }
        }

        self.schedule_one(&format!("{REMINDER_ID_PREFIX}-primary"), self.preferred_time, title);

        if gate.has_access(Feature::TriggerTimeReminders) {
            for slot in self.slots.iter().filter(|s| s.is_enabled) {
                self.schedule_one(&format!("{REMINDER_ID_PREFIX}-{}", slot.id), slot.time, title);
            }
        }
    }

    /// Drop every scheduled reminder. Called when the active commitment
    /// is archived.
    pub fn cancel_all(&self) {
        self.delivery.cancel_all();
    }

    fn schedule_one(&self, id: &str, time: NaiveTime, body: &str) {
        if let Err(e) = self.delivery.schedule(id, time, REMINDER_TITLE, body) {
            warn!(id, error = %e, "failed to schedule reminder");
        }
    }
}
