//! Evolution overlay: a short one-shot animation that blocks world input,
//! then swaps the monster's species in place and signals completion.

use crate::settings::EVOLUTION_DURATION;

#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOverlay {
    /// Roster slot of the evolving monster
    pub slot: usize,
    pub from_species: String,
    pub into_species: String,
    elapsed: f32,
    finished: bool,
}

/// Emitted exactly once, when the animation completes.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOutcome {
    pub slot: usize,
    pub into_species: String,
}

impl EvolutionOverlay {
    pub fn new(slot: usize, from_species: &str, into_species: &str) -> Self {
        EvolutionOverlay {
            slot,
            from_species: from_species.to_string(),
            into_species: into_species.to_string(),
            elapsed: 0.0,
            finished: false,
        }
    }

    /// Animation progress in [0, 1] for the presentation layer.
    pub fn progress(&self) -> f32 {
        (self.elapsed / EVOLUTION_DURATION).clamp(0.0, 1.0)
    }

    /// Advance the animation. Returns the outcome exactly once, when the
    /// duration elapses; the caller performs the roster swap.
    pub fn update(&mut self, dt: f32) -> Option<EvolutionOutcome> {
        if self.finished {
            return None;
        }
        self.elapsed += dt;
        if self.elapsed >= EVOLUTION_DURATION {
            self.finished = true;
            Some(EvolutionOutcome {
                slot: self.slot,
                into_species: self.into_species.clone(),
            })
        } else {
            None
        }
    }
}
