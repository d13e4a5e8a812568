//! XP-affecting player actions
//!
//! Every action mutates the player in place and appends an [`ActivityEvent`].
//! XP changes all go through [`Player::apply_xp`], which is the only place
//! the `xp >= 0` clamp and level rollover happen.

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::economy::{self, rank_for_level};
use crate::error::{PlayerError, Result};
use crate::model::{
    new_id, ActivityEvent, ActivityKind, DailyQuest, InventoryItem, Player, Quest, Reward,
    WorkoutMiss,
};

/// Effect of a single XP change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpChange {
    /// Delta the action asked for
    pub requested: i64,
    /// Delta actually applied after clamping at zero
    pub applied: i64,
    /// Levels gained by this change
    pub levels_gained: u32,
}

/// Result of completing a quest or daily mission
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub title: String,
    pub xp: XpChange,
}

/// Signed delta for an unsigned amount, saturating at `i64::MAX`
fn xp_delta(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

impl Player {
    /// Apply a signed XP delta.
    ///
    /// Gains also count toward lifetime XP and may roll over several levels.
    /// Losses clamp at zero and never remove a level.
    pub fn apply_xp(&mut self, delta: i64) -> XpChange {
        if delta < 0 {
            let loss = delta.unsigned_abs().min(self.xp);
            self.xp -= loss;
            return XpChange {
                requested: delta,
                applied: -xp_delta(loss),
                levels_gained: 0,
            };
        }

        let gain = delta as u64;
        self.xp = self.xp.saturating_add(gain);
        self.lifetime_xp = self.lifetime_xp.saturating_add(gain);

        let mut levels_gained = 0;
        while self.xp_to_next_level > 0 && self.xp >= self.xp_to_next_level {
            self.xp -= self.xp_to_next_level;
            self.level += 1;
            self.xp_to_next_level = economy::xp_to_next_level(self.level);
            levels_gained += 1;
            self.log(
                ActivityKind::LevelUp,
                format!("Reached level {}", self.level),
                0,
            );
        }
        if levels_gained > 0 {
            self.rank = rank_for_level(self.level);
            debug!(level = self.level, rank = %self.rank, "Level up");
        }

        XpChange {
            requested: delta,
            applied: delta,
            levels_gained,
        }
    }

    fn log(&mut self, kind: ActivityKind, description: impl Into<String>, xp_delta: i64) {
        self.activity_log
            .push(ActivityEvent::new(kind, description, xp_delta));
    }

    /// Log an action and apply its XP, keeping the logged delta equal to
    /// what was actually applied.
    fn award(&mut self, kind: ActivityKind, description: String, delta: i64) -> XpChange {
        if delta >= 0 {
            self.log(kind, description, delta);
            self.apply_xp(delta)
        } else {
            let change = self.apply_xp(delta);
            self.log(kind, description, change.applied);
            change
        }
    }

    // ==================== Quests ====================

    pub fn add_quest(&mut self, quest: Quest) -> Result<&Quest> {
        if quest.title.trim().is_empty() {
            return Err(PlayerError::InvalidInput("quest title is empty".into()));
        }
        self.quests.push(quest);
        Ok(&self.quests[self.quests.len() - 1])
    }

    /// Complete a quest: award its XP and stat increases, then remove it.
    pub fn complete_quest(&mut self, id: &str) -> Result<Completion> {
        let index = self
            .quests
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| PlayerError::QuestNotFound(id.to_string()))?;
        let quest = self.quests.remove(index);

        if let Some(boost) = quest.stat_increases {
            self.stats.apply(&boost);
        }
        let xp = self.award(
            ActivityKind::QuestCompleted,
            format!("Completed quest: {}", quest.title),
            xp_delta(quest.xp_reward),
        );

        Ok(Completion {
            title: quest.title,
            xp,
        })
    }

    // ==================== Daily missions ====================

    pub fn add_daily_quest(&mut self, daily: DailyQuest) -> Result<&DailyQuest> {
        if daily.title.trim().is_empty() {
            return Err(PlayerError::InvalidInput("mission title is empty".into()));
        }
        self.daily_quests.push(daily);
        Ok(&self.daily_quests[self.daily_quests.len() - 1])
    }

    fn unresolved_daily(&mut self, id: &str) -> Result<&mut DailyQuest> {
        let daily = self
            .daily_quests
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| PlayerError::DailyNotFound(id.to_string()))?;
        if daily.is_resolved() {
            return Err(PlayerError::AlreadyResolved(daily.title.clone()));
        }
        Ok(daily)
    }

    /// Complete a daily mission for today.
    pub fn complete_daily(&mut self, id: &str) -> Result<Completion> {
        let daily = self.unresolved_daily(id)?;
        daily.completed = true;
        let title = daily.title.clone();
        let reward = daily.xp_reward;
        let boost = daily.stat_increases;

        if let Some(boost) = boost {
            self.stats.apply(&boost);
        }
        let xp = self.award(
            ActivityKind::DailyCompleted,
            format!("Completed daily mission: {}", title),
            xp_delta(reward),
        );

        Ok(Completion { title, xp })
    }

    /// Skip a daily mission, paying its penalty.
    pub fn skip_daily(&mut self, id: &str) -> Result<Completion> {
        let daily = self.unresolved_daily(id)?;
        daily.skipped = true;
        let title = daily.title.clone();
        let penalty = daily.skip_penalty();

        let xp = self.award(
            ActivityKind::DailySkipped,
            format!("Skipped daily mission: {}", title),
            -xp_delta(penalty),
        );

        Ok(Completion { title, xp })
    }

    /// Clear completion flags for a new day. Returns how many were reset.
    pub fn reset_dailies(&mut self) -> usize {
        let mut reset = 0;
        for daily in self.daily_quests.iter_mut().filter(|d| d.is_resolved()) {
            daily.completed = false;
            daily.skipped = false;
            reset += 1;
        }
        reset
    }

    // ==================== Identity ====================

    /// Change avatar, paying the lifetime-XP-scaled cost.
    ///
    /// Returns the cost paid.
    pub fn change_avatar(
        &mut self,
        avatar: impl Into<String>,
        base_cost: Option<f64>,
    ) -> Result<u64> {
        let avatar = avatar.into();
        if avatar.trim().is_empty() {
            return Err(PlayerError::InvalidInput("avatar is empty".into()));
        }

        let cost = economy::compute_avatar_cost(self.lifetime_xp as f64, base_cost);
        if self.xp < cost {
            return Err(PlayerError::InsufficientXp {
                required: cost,
                available: self.xp,
            });
        }

        self.award(
            ActivityKind::AvatarChanged,
            format!("Changed avatar to {}", avatar),
            -xp_delta(cost),
        );
        self.avatar = avatar;
        Ok(cost)
    }

    /// Change title. Free, but still logged.
    pub fn change_title(&mut self, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(PlayerError::InvalidInput("title is empty".into()));
        }
        self.log(
            ActivityKind::TitleChanged,
            format!("Changed title to {}", title),
            0,
        );
        self.title = title;
        Ok(())
    }

    // ==================== Rewards ====================

    pub fn add_reward(&mut self, reward: Reward) -> Result<&Reward> {
        if reward.title.trim().is_empty() {
            return Err(PlayerError::InvalidInput("reward title is empty".into()));
        }
        self.rewards.push(reward);
        Ok(&self.rewards[self.rewards.len() - 1])
    }

    /// Claim a reward: pay its cost and add it to the inventory.
    pub fn claim_reward(&mut self, id: &str) -> Result<&InventoryItem> {
        let reward = self
            .rewards
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| PlayerError::RewardNotFound(id.to_string()))?;
        if reward.claimed {
            return Err(PlayerError::AlreadyResolved(reward.title.clone()));
        }
        if self.xp < reward.cost {
            return Err(PlayerError::InsufficientXp {
                required: reward.cost,
                available: self.xp,
            });
        }
        reward.claimed = true;
        let title = reward.title.clone();
        let cost = reward.cost;

        self.award(
            ActivityKind::RewardClaimed,
            format!("Claimed reward: {}", title),
            -xp_delta(cost),
        );
        self.inventory.push(InventoryItem {
            id: new_id(),
            name: title,
            quantity: 1,
            acquired_at: Utc::now(),
        });
        Ok(&self.inventory[self.inventory.len() - 1])
    }

    // ==================== Workouts ====================

    /// Record a missed workout and deduct the fixed penalty.
    pub fn record_workout_miss(&mut self, date: NaiveDate, reason: Option<String>) -> XpChange {
        let change = self.award(
            ActivityKind::WorkoutMissed,
            format!("Missed workout on {}", date),
            -xp_delta(economy::WORKOUT_MISS_PENALTY),
        );
        self.workout_misses.push(WorkoutMiss { date, reason });
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::Rank;
    use crate::model::StatBoost;

    fn player_with_xp(xp: u64) -> Player {
        let mut player = Player::new("Jin");
        player.xp = xp;
        player
    }

    #[test]
    fn test_apply_xp_single_level() {
        let mut player = Player::new("Jin");
        let change = player.apply_xp(120);
        assert_eq!(change.levels_gained, 1);
        assert_eq!(player.level, 2);
        assert_eq!(player.xp, 20);
        assert_eq!(player.xp_to_next_level, 115);
        assert_eq!(player.lifetime_xp, 120);
    }

    #[test]
    fn test_apply_xp_multiple_levels() {
        let mut player = Player::new("Jin");
        // 100 + 115 + 132 = 347
        let change = player.apply_xp(350);
        assert_eq!(change.levels_gained, 3);
        assert_eq!(player.level, 4);
        assert_eq!(player.xp, 3);
        let level_ups = player
            .activity_log
            .iter()
            .filter(|e| e.kind == ActivityKind::LevelUp)
            .count();
        assert_eq!(level_ups, 3);
    }

    #[test]
    fn test_apply_xp_rank_up() {
        let mut player = Player::new("Jin");
        while player.level < 10 {
            player.apply_xp(500);
        }
        assert_eq!(player.rank, Rank::D);
    }

    #[test]
    fn test_negative_xp_clamps_at_zero() {
        let mut player = player_with_xp(10);
        player.level = 3;
        let change = player.apply_xp(-50);
        assert_eq!(player.xp, 0);
        assert_eq!(change.applied, -10);
        assert_eq!(player.level, 3);
        assert_eq!(player.lifetime_xp, 0);
    }

    #[test]
    fn test_complete_quest() {
        let mut player = Player::new("Jin");
        let id = player
            .add_quest(
                Quest::new("Read a chapter", 40).with_stats(StatBoost {
                    intelligence: 2,
                    ..Default::default()
                }),
            )
            .unwrap()
            .id
            .clone();

        let done = player.complete_quest(&id).unwrap();
        assert_eq!(done.xp.applied, 40);
        assert_eq!(player.xp, 40);
        assert_eq!(player.stats.intelligence, 12);
        assert!(player.quests.is_empty());

        let event = player.activity_log.last().unwrap();
        assert_eq!(event.kind, ActivityKind::QuestCompleted);
        assert_eq!(event.xp_delta, 40);

        assert_eq!(
            player.complete_quest(&id),
            Err(PlayerError::QuestNotFound(id.clone()))
        );
    }

    #[test]
    fn test_add_quest_rejects_empty_title() {
        let mut player = Player::new("Jin");
        assert!(matches!(
            player.add_quest(Quest::new("   ", 10)),
            Err(PlayerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_daily_complete_once() {
        let mut player = Player::new("Jin");
        let id = player
            .add_daily_quest(DailyQuest::new("100 push-ups", 30))
            .unwrap()
            .id
            .clone();

        player.complete_daily(&id).unwrap();
        assert_eq!(player.xp, 30);
        assert!(matches!(
            player.complete_daily(&id),
            Err(PlayerError::AlreadyResolved(_))
        ));
        assert!(matches!(
            player.skip_daily(&id),
            Err(PlayerError::AlreadyResolved(_))
        ));

        assert_eq!(player.reset_dailies(), 1);
        player.complete_daily(&id).unwrap();
        assert_eq!(player.xp, 60);
    }

    #[test]
    fn test_skip_daily_penalty() {
        let mut player = player_with_xp(80);
        let id = player
            .add_daily_quest(DailyQuest::new("Run 5k", 100))
            .unwrap()
            .id
            .clone();

        let skipped = player.skip_daily(&id).unwrap();
        assert_eq!(skipped.xp.applied, -35);
        assert_eq!(player.xp, 45);

        let event = player.activity_log.last().unwrap();
        assert_eq!(event.kind, ActivityKind::DailySkipped);
        assert_eq!(event.xp_delta, -35);
    }

    #[test]
    fn test_skip_daily_logs_clamped_delta() {
        let mut player = player_with_xp(3);
        let id = player
            .add_daily_quest(DailyQuest::new("Stretch", 10))
            .unwrap()
            .id
            .clone();

        player.skip_daily(&id).unwrap();
        assert_eq!(player.xp, 0);
        assert_eq!(player.activity_log.last().unwrap().xp_delta, -3);
    }

    #[test]
    fn test_change_avatar() {
        let mut player = player_with_xp(300);
        let cost = player.change_avatar("shadow-monarch", None).unwrap();
        assert_eq!(cost, 250);
        assert_eq!(player.xp, 50);
        assert_eq!(player.avatar, "shadow-monarch");
        assert_eq!(player.activity_log.last().unwrap().xp_delta, -250);
    }

    #[test]
    fn test_change_avatar_insufficient_xp() {
        let mut player = player_with_xp(100);
        let err = player.change_avatar("knight", Some(600.0)).unwrap_err();
        assert_eq!(
            err,
            PlayerError::InsufficientXp {
                required: 600,
                available: 100
            }
        );
        assert_eq!(player.avatar, "default");
        assert!(player.activity_log.is_empty());
    }

    #[test]
    fn test_change_title_is_free() {
        let mut player = player_with_xp(10);
        player.change_title("Wolf Slayer").unwrap();
        assert_eq!(player.title, "Wolf Slayer");
        assert_eq!(player.xp, 10);
        let event = player.activity_log.last().unwrap();
        assert_eq!(event.kind, ActivityKind::TitleChanged);
        assert_eq!(event.xp_delta, 0);
    }

    #[test]
    fn test_claim_reward() {
        let mut player = player_with_xp(90);
        let id = player
            .add_reward(Reward::new("Movie night", 60))
            .unwrap()
            .id
            .clone();

        let item = player.claim_reward(&id).unwrap();
        assert_eq!(item.name, "Movie night");
        assert_eq!(player.xp, 30);
        assert_eq!(player.inventory.len(), 1);
        assert!(matches!(
            player.claim_reward(&id),
            Err(PlayerError::AlreadyResolved(_))
        ));
    }

    #[test]
    fn test_claim_reward_insufficient_xp() {
        let mut player = player_with_xp(10);
        let id = player
            .add_reward(Reward::new("Gaming hour", 60))
            .unwrap()
            .id
            .clone();
        assert!(matches!(
            player.claim_reward(&id),
            Err(PlayerError::InsufficientXp { .. })
        ));
        assert!(!player.rewards[0].claimed);
    }

    #[test]
    fn test_workout_miss() {
        let mut player = player_with_xp(100);
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let change = player.record_workout_miss(date, Some("sick".into()));
        assert_eq!(change.applied, -25);
        assert_eq!(player.xp, 75);
        assert_eq!(player.workout_misses.len(), 1);
        assert_eq!(player.workout_misses[0].date, date);
    }

    #[test]
    fn test_oversized_reward_never_deducts() {
        let mut player = player_with_xp(50);
        let id = player
            .add_quest(Quest::new("Impossible raid", u64::MAX))
            .unwrap()
            .id
            .clone();

        let done = player.complete_quest(&id).unwrap();
        assert_eq!(done.xp.applied, i64::MAX);
        assert!(done.xp.levels_gained > 0);
        assert_eq!(player.lifetime_xp, i64::MAX as u64);
        assert!(player.activity_log.iter().all(|e| e.xp_delta >= 0));
    }

    #[test]
    fn test_oversized_penalty_never_awards() {
        let mut player = player_with_xp(50);
        let id = player
            .add_daily_quest(DailyQuest::new("Cold plunge", 10).with_penalty(u64::MAX))
            .unwrap()
            .id
            .clone();

        let skipped = player.skip_daily(&id).unwrap();
        assert_eq!(skipped.xp.applied, -50);
        assert_eq!(player.xp, 0);
        assert_eq!(player.level, 1);
    }
}
