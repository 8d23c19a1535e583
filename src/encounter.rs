//! One-shot encounter timer gating how often standing in a monster patch can
//! start a battle.

use crate::settings::{ENCOUNTER_DELAY_MAX, ENCOUNTER_DELAY_MIN};
use rand::Rng;

/// Disarmed until `activate` rolls a fresh duration; fires once and disarms
/// again. Re-arming while armed is a no-op so that standing still in a patch
/// cannot restart the countdown.
#[derive(Debug, Clone, PartialEq)]
pub struct EncounterTimer {
    remaining: Option<f32>,
    min_delay: f32,
    max_delay: f32,
}

impl EncounterTimer {
    pub fn new() -> Self {
        EncounterTimer {
            remaining: None,
            min_delay: ENCOUNTER_DELAY_MIN,
            max_delay: ENCOUNTER_DELAY_MAX,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Arm with a freshly rolled duration. No-op while already armed.
    pub fn activate(&mut self) {
        self.activate_with(&mut rand::rng());
    }

    /// Arm using the provided RNG; the duration is re-rolled on every arm,
    /// never reused.
    pub fn activate_with<R: Rng>(&mut self, rng: &mut R) {
        if self.remaining.is_none() {
            self.remaining = Some(rng.random_range(self.min_delay..=self.max_delay));
        }
    }

    /// Cancel without firing (used when the player leaves the patch).
    pub fn disarm(&mut self) {
        self.remaining = None;
    }

    /// Count down. Returns true exactly once per arm, at the tick the
    /// duration elapses; the timer disarms itself in the same call.
    pub fn update(&mut self, dt: f32) -> bool {
        if let Some(remaining) = &mut self.remaining {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.remaining = None;
                return true;
            }
        }
        false
    }
}

impl Default for EncounterTimer {
    fn default() -> Self {
        EncounterTimer::new()
    }
}
