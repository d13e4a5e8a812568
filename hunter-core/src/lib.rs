//! Hunter Protocol core
//!
//! The player record of an RPG-styled productivity tracker: quests, daily
//! missions, XP and levels, rewards, and an activity log of every XP change.
//!
//! # Example
//!
//! ```rust,no_run
//! use hunter_core::{LocalStore, Quest};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = LocalStore::open("/tmp/hunter")?;
//! let mut player = store.load_player_or_default();
//!
//! let id = player.add_quest(Quest::new("Finish report", 50))?.id.clone();
//! player.complete_quest(&id)?;
//!
//! // Persist after every mutation
//! store.save_player(&player)?;
//! # Ok(())
//! # }
//! ```

// XP arithmetic
pub mod economy;

// Player aggregate and records
pub mod model;

// XP-affecting mutations
pub mod actions;

// Local JSON storage
pub mod store;

// Error types
pub mod error;

pub use actions::{Completion, XpChange};
pub use economy::{compute_avatar_cost, compute_skip_penalty, rank_for_level, Rank};
pub use error::{PlayerError, Result, StoreError, StoreResult};
pub use model::{
    ActivityEvent, ActivityKind, DailyQuest, InventoryItem, Player, Quest, Reward,
    ScheduleEntry, Settings, StatBoost, Stats, TodoItem, WorkoutMiss,
};
pub use store::LocalStore;
