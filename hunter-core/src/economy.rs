//! XP economy: penalties, costs and level thresholds
//!
//! All functions are pure and total. Inputs are plain `f64` so values coming
//! out of a loosely-typed blob can be passed through without validation;
//! non-finite inputs land on the nearest clamp bound.

use serde::{Deserialize, Serialize};

/// Fraction of a mission's XP reward charged when it is skipped
pub const SKIP_PENALTY_RATE: f64 = 0.35;
/// Smallest skip penalty
pub const SKIP_PENALTY_MIN: u64 = 5;
/// Largest skip penalty
pub const SKIP_PENALTY_MAX: u64 = 150;

/// Fraction of lifetime XP an avatar change costs
pub const AVATAR_COST_RATE: f64 = 0.02;
/// Avatar cost used when no base cost is given
pub const AVATAR_BASE_COST: u64 = 250;
/// Hard cap on avatar cost
pub const AVATAR_COST_CAP: u64 = 20_000;

/// XP required to go from level 1 to level 2
pub const BASE_LEVEL_XP: f64 = 100.0;
/// Growth factor of the level threshold per level
pub const LEVEL_XP_GROWTH: f64 = 1.15;

/// XP lost for each missed workout
pub const WORKOUT_MISS_PENALTY: u64 = 25;

/// Round half up (toward positive infinity).
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// `min(max(value, lo), hi)`; NaN collapses to `lo`.
fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Penalty for skipping a daily mission worth `xp`.
///
/// `clamp(round(xp * 0.35), 5, 150)`
pub fn compute_skip_penalty(xp: f64) -> u64 {
    clamp(
        round_half_up(xp * SKIP_PENALTY_RATE),
        SKIP_PENALTY_MIN as f64,
        SKIP_PENALTY_MAX as f64,
    ) as u64
}

/// Cost of changing avatar for a player with `lifetime_xp`.
///
/// `clamp(max(base, round(lifetime_xp * 0.02)), base, 20000)`, where `base`
/// falls back to 250 when missing, zero or not a number.
pub fn compute_avatar_cost(lifetime_xp: f64, base_cost: Option<f64>) -> u64 {
    let base = match base_cost {
        Some(b) if b.is_finite() && b != 0.0 => b,
        _ => AVATAR_BASE_COST as f64,
    };
    let scaled = round_half_up(lifetime_xp * AVATAR_COST_RATE);
    clamp(base.max(scaled), base, AVATAR_COST_CAP as f64) as u64
}

/// XP needed to advance past `level`. Level 0 is treated as level 1.
pub fn xp_to_next_level(level: u32) -> u64 {
    let exponent = level.max(1) - 1;
    round_half_up(BASE_LEVEL_XP * LEVEL_XP_GROWTH.powi(exponent as i32)) as u64
}

/// Hunter rank, derived from level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    E,
    D,
    C,
    B,
    A,
    S,
}

impl Default for Rank {
    fn default() -> Self {
        Self::E
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Rank::E => "E",
            Rank::D => "D",
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
        };
        write!(f, "{}-Rank", letter)
    }
}

/// Rank for a given level
pub fn rank_for_level(level: u32) -> Rank {
    match level {
        0..=9 => Rank::E,
        10..=19 => Rank::D,
        20..=34 => Rank::C,
        35..=49 => Rank::B,
        50..=74 => Rank::A,
        _ => Rank::S,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_penalty_floor_and_cap() {
        assert_eq!(compute_skip_penalty(0.0), 5);
        assert_eq!(compute_skip_penalty(-100.0), 5);
        assert_eq!(compute_skip_penalty(10.0), 5); // 3.5 -> 4, floored to 5
        assert_eq!(compute_skip_penalty(100.0), 35);
        assert_eq!(compute_skip_penalty(429.0), 150);
        assert_eq!(compute_skip_penalty(10_000.0), 150);
    }

    #[test]
    fn test_skip_penalty_monotonic() {
        let mut previous = compute_skip_penalty(0.0);
        for step in 0..=4290 {
            let xp = step as f64 / 10.0;
            let penalty = compute_skip_penalty(xp);
            assert!(penalty >= previous, "penalty dropped at xp={}", xp);
            assert!((SKIP_PENALTY_MIN..=SKIP_PENALTY_MAX).contains(&penalty));
            previous = penalty;
        }
    }

    #[test]
    fn test_skip_penalty_rounds_half_up() {
        // 50 * 0.35 = 17.5
        assert_eq!(compute_skip_penalty(50.0), 18);
    }

    #[test]
    fn test_skip_penalty_non_finite() {
        assert_eq!(compute_skip_penalty(f64::NAN), 5);
        assert_eq!(compute_skip_penalty(f64::INFINITY), 150);
        assert_eq!(compute_skip_penalty(f64::NEG_INFINITY), 5);
    }

    #[test]
    fn test_avatar_cost() {
        assert_eq!(compute_avatar_cost(0.0, Some(600.0)), 600);
        assert_eq!(compute_avatar_cost(1_000_000.0, Some(600.0)), 20_000);
        assert_eq!(compute_avatar_cost(50_000.0, Some(600.0)), 1000);
    }

    #[test]
    fn test_avatar_cost_base_fallback() {
        assert_eq!(compute_avatar_cost(0.0, None), 250);
        assert_eq!(compute_avatar_cost(0.0, Some(0.0)), 250);
        assert_eq!(compute_avatar_cost(0.0, Some(f64::NAN)), 250);
        assert_eq!(compute_avatar_cost(f64::NAN, None), 250);
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(xp_to_next_level(0), 100);
        assert_eq!(xp_to_next_level(1), 100);
        assert_eq!(xp_to_next_level(2), 115);
        assert_eq!(xp_to_next_level(3), 132); // 132.25
        assert!(xp_to_next_level(20) > xp_to_next_level(19));
    }

    #[test]
    fn test_rank_for_level() {
        assert_eq!(rank_for_level(1), Rank::E);
        assert_eq!(rank_for_level(10), Rank::D);
        assert_eq!(rank_for_level(34), Rank::C);
        assert_eq!(rank_for_level(35), Rank::B);
        assert_eq!(rank_for_level(74), Rank::A);
        assert_eq!(rank_for_level(75), Rank::S);
        assert_eq!(Rank::S.to_string(), "S-Rank");
    }
}
