//! Hunter CLI commands
//!
//! Each mutating command follows the same lifecycle as a UI event handler:
//! mutate the player, save it to the local store, then schedule a debounced
//! cloud push.

use anyhow::{anyhow, bail, Context};
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use hunter_core::{
    ActivityEvent, DailyQuest, LocalStore, Player, Quest, Reward, StatBoost, XpChange,
};
use hunter_sync::SyncReconciler;
use tracing::{info, warn};

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new player
    Init {
        /// Player name
        name: String,
        /// Overwrite an existing player
        #[arg(long)]
        force: bool,
    },

    /// Show player status
    Status,

    /// Manage quests
    #[command(subcommand)]
    Quest(QuestCommands),

    /// Manage daily missions
    #[command(subcommand)]
    Daily(DailyCommands),

    /// Manage rewards
    #[command(subcommand)]
    Reward(RewardCommands),

    /// Change avatar (costs XP)
    Avatar {
        /// New avatar name
        avatar: String,
        /// Base cost before lifetime scaling (default 250)
        #[arg(long)]
        base_cost: Option<f64>,
    },

    /// Change title
    Title {
        /// New title
        title: String,
    },

    /// Record a missed workout
    Miss {
        /// Why it was missed
        #[arg(short, long)]
        reason: Option<String>,
        /// Date of the miss (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show the activity log
    Log {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },

    /// Cloud sync operations
    #[command(subcommand)]
    Sync(SyncCommands),
}

#[derive(Debug, Subcommand)]
pub enum QuestCommands {
    /// Add a quest
    Add {
        title: String,
        /// XP reward
        #[arg(long, default_value = "50")]
        xp: u64,
        #[arg(short, long)]
        description: Option<String>,
        /// Time limit in minutes
        #[arg(long)]
        time_limit: Option<u32>,
        #[command(flatten)]
        stats: StatArgs,
    },
    /// Complete a quest by id (or unique id prefix)
    Complete { id: String },
    /// List open quests
    List,
}

#[derive(Debug, Subcommand)]
pub enum DailyCommands {
    /// Add a daily mission
    Add {
        title: String,
        /// XP reward
        #[arg(long, default_value = "30")]
        xp: u64,
        /// Custom skip penalty
        #[arg(long)]
        penalty: Option<u64>,
        #[arg(short, long)]
        description: Option<String>,
        #[command(flatten)]
        stats: StatArgs,
    },
    /// Complete a daily mission
    Complete { id: String },
    /// Skip a daily mission and pay its penalty
    Skip { id: String },
    /// Start a new day
    Reset,
    /// List daily missions
    List,
}

#[derive(Debug, Subcommand)]
pub enum RewardCommands {
    /// Add a reward
    Add {
        title: String,
        /// XP cost
        #[arg(long)]
        cost: u64,
    },
    /// Claim a reward
    Claim { id: String },
    /// List rewards
    List,
}

#[derive(Debug, Subcommand)]
pub enum SyncCommands {
    /// Push the local player now
    Push,
    /// Replace the local player with this device's cloud copy
    Pull,
    /// Show sync configuration and state
    Status,
}

/// Stat increases granted on completion
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatArgs {
    #[arg(long, default_value = "0")]
    pub strength: u32,
    #[arg(long, default_value = "0")]
    pub agility: u32,
    #[arg(long, default_value = "0")]
    pub intelligence: u32,
    #[arg(long, default_value = "0")]
    pub vitality: u32,
    #[arg(long, default_value = "0")]
    pub sense: u32,
}

impl StatArgs {
    fn into_boost(self) -> Option<StatBoost> {
        let boost = StatBoost {
            strength: self.strength,
            agility: self.agility,
            intelligence: self.intelligence,
            vitality: self.vitality,
            sense: self.sense,
        };
        (!boost.is_empty()).then_some(boost)
    }
}

/// Application state owned by the process
pub struct App {
    pub store: LocalStore,
    pub player: Player,
    pub sync: SyncReconciler,
}

impl App {
    pub fn new(store: LocalStore, sync: SyncReconciler) -> Self {
        let player = store.load_player_or_default();
        Self {
            store,
            player,
            sync,
        }
    }

    /// Persist locally, then schedule a cloud push
    async fn commit(&self) -> anyhow::Result<()> {
        self.store
            .save_player(&self.player)
            .context("saving player")?;
        self.sync.schedule_push(&self.player).await;
        Ok(())
    }

    /// Push anything still pending before the process exits
    pub async fn shutdown(&self) {
        if !self.sync.is_configured() {
            return;
        }
        if let Err(e) = self.sync.flush_pending().await {
            warn!(error = %e, "Pending changes were not synced");
        }
    }
}

/// Resolve a full id or unique prefix against known ids
fn resolve_id<'a>(ids: impl Iterator<Item = &'a str>, query: &str) -> anyhow::Result<String> {
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(query)).collect();
    if let Some(exact) = matches.iter().find(|id| **id == query) {
        return Ok(exact.to_string());
    }
    match matches.as_slice() {
        [] => Err(anyhow!("No entry matches '{}'", query)),
        [one] => Ok(one.to_string()),
        _ => Err(anyhow!("'{}' is ambiguous ({} matches)", query, matches.len())),
    }
}

/// Execute a command
pub async fn execute_command(app: &mut App, command: Commands) -> anyhow::Result<String> {
    match command {
        Commands::Init { name, force } => {
            if !force && app.store.load_player()?.is_some() {
                bail!("A player already exists; use --force to replace it");
            }
            app.player = Player::new(name);
            app.commit().await?;
            info!(name = %app.player.name, "Player created");
            Ok(format!("Welcome, {}. The System has chosen you.", app.player.name))
        }

        Commands::Status => Ok(format_status(&app.player, &app.sync)),

        Commands::Quest(cmd) => execute_quest(app, cmd).await,
        Commands::Daily(cmd) => execute_daily(app, cmd).await,
        Commands::Reward(cmd) => execute_reward(app, cmd).await,

        Commands::Avatar { avatar, base_cost } => {
            let cost = app.player.change_avatar(avatar, base_cost)?;
            app.commit().await?;
            Ok(format!("Avatar changed to {} (-{} XP)", app.player.avatar, cost))
        }

        Commands::Title { title } => {
            app.player.change_title(title)?;
            app.commit().await?;
            Ok(format!("Title changed to {}", app.player.title))
        }

        Commands::Miss { reason, date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let change = app.player.record_workout_miss(date, reason);
            app.commit().await?;
            Ok(format!("Workout missed on {}: {}", date, format_xp(&change)))
        }

        Commands::Log { count } => Ok(format_log(&app.player.activity_log, count)),

        Commands::Sync(cmd) => execute_sync(app, cmd).await,
    }
}

async fn execute_quest(app: &mut App, cmd: QuestCommands) -> anyhow::Result<String> {
    match cmd {
        QuestCommands::Add { title, xp, description, time_limit, stats } => {
            let mut quest = Quest::new(title, xp);
            if let Some(description) = description {
                quest = quest.with_description(description);
            }
            if let Some(minutes) = time_limit {
                quest = quest.with_time_limit(minutes);
            }
            if let Some(boost) = stats.into_boost() {
                quest = quest.with_stats(boost);
            }
            let id = app.player.add_quest(quest)?.id.clone();
            app.commit().await?;
            Ok(format!("Quest added: {}", id))
        }

        QuestCommands::Complete { id } => {
            let id = resolve_id(app.player.quests.iter().map(|q| q.id.as_str()), &id)?;
            let done = app.player.complete_quest(&id)?;
            app.commit().await?;
            Ok(format!("Quest complete: {} {}", done.title, format_xp(&done.xp)))
        }

        QuestCommands::List => {
            if app.player.quests.is_empty() {
                return Ok("No open quests".to_string());
            }
            let lines: Vec<String> = app
                .player
                .quests
                .iter()
                .map(|q| {
                    let limit = q
                        .time_limit
                        .map(|m| format!(" [{}m]", m))
                        .unwrap_or_default();
                    format!("{}  {} (+{} XP){}", short_id(&q.id), q.title, q.xp_reward, limit)
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

async fn execute_daily(app: &mut App, cmd: DailyCommands) -> anyhow::Result<String> {
    match cmd {
        DailyCommands::Add { title, xp, penalty, description, stats } => {
            let mut daily = DailyQuest::new(title, xp);
            if let Some(penalty) = penalty {
                daily = daily.with_penalty(penalty);
            }
            if let Some(description) = description {
                daily = daily.with_description(description);
            }
            if let Some(boost) = stats.into_boost() {
                daily = daily.with_stats(boost);
            }
            let id = app.player.add_daily_quest(daily)?.id.clone();
            app.commit().await?;
            Ok(format!("Daily mission added: {}", id))
        }

        DailyCommands::Complete { id } => {
            let id = resolve_id(app.player.daily_quests.iter().map(|d| d.id.as_str()), &id)?;
            let done = app.player.complete_daily(&id)?;
            app.commit().await?;
            Ok(format!("Daily mission complete: {} {}", done.title, format_xp(&done.xp)))
        }

        DailyCommands::Skip { id } => {
            let id = resolve_id(app.player.daily_quests.iter().map(|d| d.id.as_str()), &id)?;
            let skipped = app.player.skip_daily(&id)?;
            app.commit().await?;
            Ok(format!("Daily mission skipped: {} {}", skipped.title, format_xp(&skipped.xp)))
        }

        DailyCommands::Reset => {
            let reset = app.player.reset_dailies();
            app.commit().await?;
            Ok(format!("New day: {} mission(s) reset", reset))
        }

        DailyCommands::List => {
            if app.player.daily_quests.is_empty() {
                return Ok("No daily missions".to_string());
            }
            let lines: Vec<String> = app
                .player
                .daily_quests
                .iter()
                .map(|d| {
                    let mark = if d.completed {
                        "x"
                    } else if d.skipped {
                        "-"
                    } else {
                        " "
                    };
                    format!(
                        "[{}] {}  {} (+{} / -{} XP)",
                        mark,
                        short_id(&d.id),
                        d.title,
                        d.xp_reward,
                        d.skip_penalty()
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

async fn execute_reward(app: &mut App, cmd: RewardCommands) -> anyhow::Result<String> {
    match cmd {
        RewardCommands::Add { title, cost } => {
            let id = app.player.add_reward(Reward::new(title, cost))?.id.clone();
            app.commit().await?;
            Ok(format!("Reward added: {}", id))
        }

        RewardCommands::Claim { id } => {
            let id = resolve_id(app.player.rewards.iter().map(|r| r.id.as_str()), &id)?;
            let name = app.player.claim_reward(&id)?.name.clone();
            app.commit().await?;
            Ok(format!("Reward claimed: {}", name))
        }

        RewardCommands::List => {
            if app.player.rewards.is_empty() {
                return Ok("No rewards".to_string());
            }
            let lines: Vec<String> = app
                .player
                .rewards
                .iter()
                .map(|r| {
                    let mark = if r.claimed { "claimed" } else { "available" };
                    format!("{}  {} ({} XP, {})", short_id(&r.id), r.title, r.cost, mark)
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

async fn execute_sync(app: &mut App, cmd: SyncCommands) -> anyhow::Result<String> {
    match cmd {
        SyncCommands::Push => {
            app.sync.push_now(&app.player).await?;
            Ok(format!("Pushed as {}", app.sync.device_id()))
        }

        SyncCommands::Pull => match app.sync.pull().await? {
            Some(player) => {
                app.player = player;
                app.store.save_player(&app.player)?;
                Ok(format!(
                    "Restored {} (level {}) from cloud",
                    app.player.name, app.player.level
                ))
            }
            None => Ok(format!("No cloud copy for {}", app.sync.device_id())),
        },

        SyncCommands::Status => {
            let state = app.sync.state();
            let mut out = vec![
                format!("Device:     {}", app.sync.device_id()),
                format!(
                    "Configured: {}",
                    if app.sync.is_configured() { "yes" } else { "no" }
                ),
                format!("Status:     {}", state.status),
            ];
            if let Some(at) = state.last_synced_at {
                out.push(format!("Last sync:  {}", at.to_rfc3339()));
            }
            if let Some(error) = state.error {
                out.push(format!("Error:      {}", error));
            }
            Ok(out.join("\n"))
        }
    }
}

// ==================== Formatting ====================

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn format_xp(change: &XpChange) -> String {
    let mut out = format!("({:+} XP)", change.applied);
    if change.levels_gained > 0 {
        out.push_str(&format!(" LEVEL UP x{}", change.levels_gained));
    }
    out
}

fn format_status(player: &Player, sync: &SyncReconciler) -> String {
    let s = &player.stats;
    let pending = player.pending_dailies().count();
    [
        format!("{} - {}", player.name, player.title),
        format!("Rank:     {}", player.rank),
        format!(
            "Level:    {} ({}/{} XP, {:.0}%)",
            player.level,
            player.xp,
            player.xp_to_next_level,
            player.level_progress() * 100.0
        ),
        format!("Lifetime: {} XP", player.lifetime_xp),
        format!(
            "Stats:    STR {} | AGI {} | INT {} | VIT {} | SEN {}",
            s.strength, s.agility, s.intelligence, s.vitality, s.sense
        ),
        format!(
            "Quests:   {} open, {} daily pending",
            player.quests.len(),
            pending
        ),
        format!("Sync:     {}", sync.state().status),
    ]
    .join("\n")
}

fn format_log(log: &[ActivityEvent], count: usize) -> String {
    if log.is_empty() {
        return "No activity yet".to_string();
    }
    log.iter()
        .rev()
        .take(count)
        .map(|e| {
            format!(
                "{}  {:+5}  {}",
                e.timestamp.format("%Y-%m-%d %H:%M"),
                e.xp_delta,
                e.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App {
        let store = LocalStore::open(dir.path()).unwrap();
        App::new(store, SyncReconciler::unconfigured("device-test"))
    }

    #[test]
    fn test_resolve_id() {
        let ids = ["abc123", "abd456", "xyz789"];
        assert_eq!(resolve_id(ids.iter().copied(), "x").unwrap(), "xyz789");
        assert_eq!(resolve_id(ids.iter().copied(), "abc123").unwrap(), "abc123");
        assert!(resolve_id(ids.iter().copied(), "ab").is_err());
        assert!(resolve_id(ids.iter().copied(), "q").is_err());
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        execute_command(&mut app, Commands::Init { name: "Jin".into(), force: false })
            .await
            .unwrap();
        let err = execute_command(&mut app, Commands::Init { name: "Cha".into(), force: false })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--force"));

        execute_command(&mut app, Commands::Init { name: "Cha".into(), force: true })
            .await
            .unwrap();
        assert_eq!(app.player.name, "Cha");
    }

    #[tokio::test]
    async fn test_quest_flow_persists() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        execute_command(&mut app, Commands::Init { name: "Jin".into(), force: false })
            .await
            .unwrap();

        execute_command(
            &mut app,
            Commands::Quest(QuestCommands::Add {
                title: "Write tests".into(),
                xp: 120,
                description: None,
                time_limit: Some(30),
                stats: StatArgs {
                    intelligence: 1,
                    ..Default::default()
                },
            }),
        )
        .await
        .unwrap();

        let prefix = app.player.quests[0].id[..6].to_string();
        let out = execute_command(&mut app, Commands::Quest(QuestCommands::Complete { id: prefix }))
            .await
            .unwrap();
        assert!(out.contains("LEVEL UP"));

        // Reload from disk as a fresh process would
        let reloaded = LocalStore::open(dir.path()).unwrap().load_player().unwrap().unwrap();
        assert_eq!(reloaded.level, 2);
        assert_eq!(reloaded.xp, 20);
        assert_eq!(reloaded.stats.intelligence, 11);
        assert!(app.sync.state().has_unsynced_changes);
    }

    #[tokio::test]
    async fn test_sync_push_unconfigured_fails() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let err = execute_command(&mut app, Commands::Sync(SyncCommands::Push))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not configured"));

        let out = execute_command(&mut app, Commands::Sync(SyncCommands::Status))
            .await
            .unwrap();
        assert!(out.contains("Configured: no"));
    }
}
