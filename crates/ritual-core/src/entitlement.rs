//! Entitlement gate for tier-dependent behavior.
//!
//! The archive, journal, and reminder components all consult one gate so
//! the tier rules live in a single place. The gate holds no domain state:
//! it caches per-feature lookups against an external provider and keeps a
//! locally persisted premium flag so an earlier unlock survives offline
//! restarts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::{KeyValueStore, Repository};

const PREMIUM_RECORD: Repository<bool> = Repository::new("isPremiumUser");

/// Tier-gated features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Per-day reflective notes beyond the free allowance.
    MicroJournaling,
    /// Archive and journal history beyond the trailing 30 days.
    UnlimitedArchive,
    /// Additional reminder slots beyond the primary time.
    TriggerTimeReminders,
    /// Declared but never exercised: the engine keeps one active slot.
    MultipleCommitments,
}

impl Feature {
    pub fn display_name(&self) -> &'static str {
        match self {
            Feature::MicroJournaling => "Micro-Journaling",
            Feature::UnlimitedArchive => "Unlimited Archive",
            Feature::TriggerTimeReminders => "Trigger-Time Reminders",
            Feature::MultipleCommitments => "Multiple Commitments",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Feature::MicroJournaling => "Capture your thoughts after each daily ritual",
            Feature::UnlimitedArchive => "Access your complete commitment history",
            Feature::TriggerTimeReminders => "Set reminders for challenging moments",
            Feature::MultipleCommitments => "Work on multiple identity goals",
        }
    }
}

/// External purchase/entitlement backend.
///
/// The engine only ever asks a yes/no question; catalog, payment, and
/// receipt verification live behind this trait.
pub trait EntitlementProvider: Send + Sync {
    fn is_entitled(&self, feature: Feature) -> bool;
}

/// Provider for installations with no purchase backend wired up.
pub struct NoEntitlements;

impl EntitlementProvider for NoEntitlements {
    fn is_entitled(&self, _feature: Feature) -> bool {
        false
    }
}

/// Cached per-feature access decisions.
pub struct EntitlementGate {
    provider: Arc<dyn EntitlementProvider>,
    store: Arc<dyn KeyValueStore>,
    is_premium: Mutex<bool>,
    cache: Mutex<HashMap<Feature, bool>>,
}

impl EntitlementGate {
    /// Build the gate, restoring the persisted premium flag.
    pub fn load(provider: Arc<dyn EntitlementProvider>, store: Arc<dyn KeyValueStore>) -> Self {
        let is_premium = PREMIUM_RECORD.load(store.as_ref()).unwrap_or(false);
        Self {
            provider,
            store,
            is_premium: Mutex::new(is_premium),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Whether the current tier grants `feature`.
    pub fn has_access(&self, feature: Feature) -> bool {
        if *self.is_premium.lock().expect("premium flag poisoned") {
            return true;
        }
        let mut cache = self.cache.lock().expect("entitlement cache poisoned");
        *cache
            .entry(feature)
            .or_insert_with(|| self.provider.is_entitled(feature))
    }

    /// Persisted premium flag (unlocks every feature).
    pub fn is_premium(&self) -> bool {
        *self.is_premium.lock().expect("premium flag poisoned")
    }

    /// Record a completed unlock and persist it.
    pub fn set_premium(&self, premium: bool) {
        *self.is_premium.lock().expect("premium flag poisoned") = premium;
        PREMIUM_RECORD.save(self.store.as_ref(), &premium);
        self.invalidate();
    }

    /// Drop cached lookups. Call when the provider signals a change.
    pub fn invalidate(&self) {
        debug!("entitlement cache invalidated");
        self.cache
            .lock()
            .expect("entitlement cache poisoned")
            .clear();
    }
}
