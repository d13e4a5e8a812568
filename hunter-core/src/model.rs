//! Player aggregate and the records it owns
//!
//! The whole [`Player`] is serialized wholesale as one JSON blob, both to the
//! local store and to the remote `players` table. Field names are camelCase
//! and every field has a default, so blobs written by older clients still load.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::economy::{self, Rank};

/// Generate a fresh record id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The single player record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Player {
    // Identity
    pub name: String,
    pub avatar: String,
    pub title: String,

    // Progression
    pub level: u32,
    pub xp: u64,
    pub xp_to_next_level: u64,
    pub lifetime_xp: u64,
    pub rank: Rank,
    pub stats: Stats,

    // Collections
    pub quests: Vec<Quest>,
    pub daily_quests: Vec<DailyQuest>,
    pub rewards: Vec<Reward>,
    pub inventory: Vec<InventoryItem>,
    pub schedule: Vec<ScheduleEntry>,
    pub todo_list: Vec<TodoItem>,
    pub activity_log: Vec<ActivityEvent>,
    pub workout_misses: Vec<WorkoutMiss>,

    pub settings: Settings,
    pub created_at: DateTime<Utc>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            name: "Hunter".to_string(),
            avatar: "default".to_string(),
            title: "Novice Hunter".to_string(),
            level: 1,
            xp: 0,
            xp_to_next_level: economy::xp_to_next_level(1),
            lifetime_xp: 0,
            rank: Rank::E,
            stats: Stats::default(),
            quests: Vec::new(),
            daily_quests: Vec::new(),
            rewards: Vec::new(),
            inventory: Vec::new(),
            schedule: Vec::new(),
            todo_list: Vec::new(),
            activity_log: Vec::new(),
            workout_misses: Vec::new(),
            settings: Settings::default(),
            created_at: Utc::now(),
        }
    }
}

impl Player {
    /// Create a player at onboarding
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Progress toward the next level (0.0 - 1.0)
    pub fn level_progress(&self) -> f64 {
        if self.xp_to_next_level == 0 {
            return 0.0;
        }
        (self.xp as f64 / self.xp_to_next_level as f64).min(1.0)
    }

    /// Daily missions not yet completed or skipped
    pub fn pending_dailies(&self) -> impl Iterator<Item = &DailyQuest> {
        self.daily_quests.iter().filter(|d| !d.is_resolved())
    }
}

/// Core attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub strength: u32,
    pub agility: u32,
    pub intelligence: u32,
    pub vitality: u32,
    pub sense: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            strength: 10,
            agility: 10,
            intelligence: 10,
            vitality: 10,
            sense: 10,
        }
    }
}

impl Stats {
    pub fn apply(&mut self, boost: &StatBoost) {
        self.strength = self.strength.saturating_add(boost.strength);
        self.agility = self.agility.saturating_add(boost.agility);
        self.intelligence = self.intelligence.saturating_add(boost.intelligence);
        self.vitality = self.vitality.saturating_add(boost.vitality);
        self.sense = self.sense.saturating_add(boost.sense);
    }
}

/// Stat increases granted by completing a quest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBoost {
    pub strength: u32,
    pub agility: u32,
    pub intelligence: u32,
    pub vitality: u32,
    pub sense: u32,
}

impl StatBoost {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// User-defined one-off task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Time limit in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    pub xp_reward: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_increases: Option<StatBoost>,
}

impl Quest {
    pub fn new(title: impl Into<String>, xp_reward: u64) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: String::new(),
            time_limit: None,
            xp_reward,
            stat_increases: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_time_limit(mut self, minutes: u32) -> Self {
        self.time_limit = Some(minutes);
        self
    }

    pub fn with_stats(mut self, boost: StatBoost) -> Self {
        self.stat_increases = Some(boost);
        self
    }
}

/// Recurring daily mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    pub xp_reward: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_increases: Option<StatBoost>,
    /// Custom skip penalty; computed from the reward when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty: Option<u64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub skipped: bool,
}

impl DailyQuest {
    pub fn new(title: impl Into<String>, xp_reward: u64) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: String::new(),
            time_limit: None,
            xp_reward,
            stat_increases: None,
            penalty: None,
            completed: false,
            skipped: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_penalty(mut self, penalty: u64) -> Self {
        self.penalty = Some(penalty);
        self
    }

    pub fn with_stats(mut self, boost: StatBoost) -> Self {
        self.stat_increases = Some(boost);
        self
    }

    /// Completed or skipped for today
    pub fn is_resolved(&self) -> bool {
        self.completed || self.skipped
    }

    /// XP lost when skipping this mission
    pub fn skip_penalty(&self) -> u64 {
        self.penalty
            .unwrap_or_else(|| economy::compute_skip_penalty(self.xp_reward as f64))
    }
}

/// Kind of XP-affecting action recorded in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    QuestCompleted,
    DailyCompleted,
    DailySkipped,
    AvatarChanged,
    TitleChanged,
    RewardClaimed,
    WorkoutMissed,
    LevelUp,
}

/// Append-only activity log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub id: String,
    pub kind: ActivityKind,
    pub description: String,
    /// Signed XP change caused by the action
    pub xp_delta: i64,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn new(kind: ActivityKind, description: impl Into<String>, xp_delta: i64) -> Self {
        Self {
            id: new_id(),
            kind,
            description: description.into(),
            xp_delta,
            timestamp: Utc::now(),
        }
    }
}

/// Reward the player can buy with XP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub cost: u64,
    #[serde(default)]
    pub claimed: bool,
}

impl Reward {
    pub fn new(title: impl Into<String>, cost: u64) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: String::new(),
            cost,
            claimed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub acquired_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub title: String,
    /// Day of week, e.g. "monday"
    pub day: String,
    /// Local time, e.g. "07:30"
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutMiss {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub sound_enabled: bool,
    pub notifications_enabled: bool,
    pub theme: String,
    pub sync_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            notifications_enabled: true,
            theme: "shadow".to_string(),
            sync_enabled: false,
        }
    }
}
