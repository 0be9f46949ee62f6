//! Domain model for commitments.
//!
//! A commitment is a single self-chosen daily action tied to an identity
//! goal. At most one commitment is active at a time; when it ends it is
//! snapshotted into an [`ArchivedCommitment`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Maximum length of an identity statement.
pub const MAX_IDENTITY_STATEMENT_LEN: usize = 200;

/// Category of a commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Movement,
    Mind,
    Sobriety,
    Health,
    Discipline,
    Skill,
    Purpose,
    /// Placeholder before the user has chosen a category.
    Unknown,
}

impl Category {
    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Movement => "Movement",
            Category::Mind => "Mind",
            Category::Sobriety => "Sobriety",
            Category::Health => "Health",
            Category::Discipline => "Discipline",
            Category::Skill => "Skill",
            Category::Purpose => "Purpose",
            Category::Unknown => "Choose Category",
        }
    }

    /// Emoji shown next to the category.
    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Movement => "\u{1F3C3}",
            Category::Mind => "\u{1F9E0}",
            Category::Sobriety => "\u{1F33F}",
            Category::Health => "\u{1F49A}",
            Category::Discipline => "\u{26A1}",
            Category::Skill => "\u{1F3AF}",
            Category::Purpose => "\u{2728}",
            Category::Unknown => "\u{2753}",
        }
    }

    /// All concrete categories a user can pick from.
    pub fn all() -> &'static [Category] {
        &[
            Category::Movement,
            Category::Mind,
            Category::Sobriety,
            Category::Health,
            Category::Discipline,
            Category::Skill,
            Category::Purpose,
        ]
    }
}

/// How an archived commitment left the active lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionType {
    Finished,
    Reset,
    Abandoned,
}

impl CompletionType {
    pub fn display_name(&self) -> &'static str {
        match self {
            CompletionType::Finished => "Completed",
            CompletionType::Reset => "Reset",
            CompletionType::Abandoned => "Abandoned",
        }
    }
}

/// A record of one successful check-in. Only successful days are ever
/// recorded; missed days have no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDay {
    pub id: Uuid,
    pub date: NaiveDate,
    pub did_commit: bool,
}

impl CommitDay {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            did_commit: true,
        }
    }
}

/// Streak statistics, always derived from the check-in history.
///
/// Invariants after any completed mutation:
/// `longest_streak >= current_streak` and
/// `total_committed_days == history.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_committed_days: u32,
    pub last_commit_date: Option<NaiveDate>,
}

impl CommitmentStats {
    /// Whether the last check-in happened on the given day.
    pub fn has_committed_on(&self, today: NaiveDate) -> bool {
        self.last_commit_date == Some(today)
    }
}

/// The single active commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub id: Uuid,
    pub title: String,
    pub identity_statement: Option<String>,
    pub category: Category,
    pub start_date: DateTime<Utc>,
    /// Time of day for the primary reminder.
    pub reminder_time: NaiveTime,
    pub stats: CommitmentStats,
    /// Append-only while the commitment is active; at most one entry per
    /// calendar day.
    pub history: Vec<CommitDay>,
}

impl Commitment {
    /// Build a new commitment with zero stats and empty history.
    ///
    /// # Errors
    /// Rejects an empty title, an unchosen category, or an over-long
    /// identity statement. Nothing is created on rejection.
    pub fn new(
        title: &str,
        identity_statement: Option<&str>,
        category: Category,
        reminder_time: NaiveTime,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if category == Category::Unknown {
            return Err(ValidationError::CategoryNotChosen);
        }
        let identity_statement = identity_statement
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if let Some(statement) = &identity_statement {
            let len = statement.chars().count();
            if len > MAX_IDENTITY_STATEMENT_LEN {
                return Err(ValidationError::IdentityStatementTooLong {
                    len,
                    max: MAX_IDENTITY_STATEMENT_LEN,
                });
            }
        }
        Ok(Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            identity_statement,
            category,
            start_date: Utc::now(),
            reminder_time,
            stats: CommitmentStats::default(),
            history: Vec::new(),
        })
    }
}

/// Immutable snapshot of a commitment taken at the moment it leaves the
/// active lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedCommitment {
    /// Reused from the commitment it snapshots.
    pub id: Uuid,
    pub title: String,
    pub identity_statement: Option<String>,
    pub category: Category,
    pub start_date: DateTime<Utc>,
    /// The archival moment.
    pub end_date: DateTime<Utc>,
    pub total_committed_days: u32,
    pub longest_streak: u32,
    pub completion_type: CompletionType,
}

impl ArchivedCommitment {
    /// Snapshot an active commitment.
    pub fn from_active(
        commitment: &Commitment,
        completion_type: CompletionType,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: commitment.id,
            title: commitment.title.clone(),
            identity_statement: commitment.identity_statement.clone(),
            category: commitment.category,
            start_date: commitment.start_date,
            end_date,
            total_committed_days: commitment.stats.total_committed_days,
            longest_streak: commitment.stats.longest_streak,
            completion_type,
        }
    }
}
