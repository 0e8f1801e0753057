//! Named countdown scheduler
//!
//! One mechanism for every timed thing in a battle: skill cooldowns, the
//! match clock, the bet-wait countdown, shield expiry, heal ticks, delayed
//! skill impacts and opponent action scheduling. A countdown fires exactly
//! once when it reaches zero and is removed from the active set; periodic
//! behavior is the caller re-registering after each firing.

// Allow dead_code for introspection helpers that are part of the public API
#![allow(dead_code)]

use std::collections::BTreeMap;

use crate::battle::skills::SkillKey;

/// Identifies a countdown in a [`CountdownSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerKey {
    /// Match clock; firing forces resolution
    MatchClock,
    /// Server-provided wait before local combat begins
    BetWait,
    /// Next opponent action; re-registered with a fresh random delay
    OpponentAction,
    /// Shield drops when this fires
    ShieldExpiry,
    /// Next heal-over-time tick
    HealTick,
    /// Per-skill cooldown; removal means the skill is ready again
    Cooldown(SkillKey),
    /// Delayed skill impact (area-effect animation lead time)
    Impact(u32),
}

/// Set of active countdowns, decremented on a shared tick.
///
/// Keys are stored in a BTreeMap so that countdowns expiring on the same
/// tick fire in a stable order.
#[derive(Debug, Default)]
pub struct CountdownSet {
    active: BTreeMap<TimerKey, f32>,
}

impl CountdownSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-arm) a countdown. Re-arming replaces the remaining time.
    pub fn start(&mut self, key: TimerKey, seconds: f32) {
        self.active.insert(key, seconds.max(0.0));
    }

    /// Advance all countdowns by `dt` seconds and return the keys that
    /// reached zero. Fired keys are removed before returning, so a key
    /// fires at most once per registration.
    pub fn tick(&mut self, dt: f32) -> Vec<TimerKey> {
        let mut fired = Vec::new();
        for (key, remaining) in self.active.iter_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                fired.push(*key);
            }
        }
        for key in &fired {
            self.active.remove(key);
        }
        fired
    }

    /// Remaining seconds for a countdown, if it is active.
    pub fn remaining(&self, key: TimerKey) -> Option<f32> {
        self.active.get(&key).copied()
    }

    /// Whether a countdown is currently registered.
    pub fn is_active(&self, key: TimerKey) -> bool {
        self.active.contains_key(&key)
    }

    /// Cancel a countdown before it fires. Returns true if it was active.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.active.remove(&key).is_some()
    }

    /// Cancel every countdown in the set.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Number of active countdowns.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
