//! The scene director owns the single authoritative mode flag and the fade
//! tint, and serializes every mode switch through one pending-target slot.
//! All subsystems ask it for transitions; it never reaches into them.

use crate::settings::FADE_SPEED;

/// Which subsystem currently has control authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneMode {
    /// Free roam; the world simulates and the player can move
    World,
    /// Dialog overlay above a still-simulating world, player input blocked
    Dialog,
    /// Battle suspends world input entirely
    Battle,
    /// Evolution overlay above the world, player input blocked
    Evolution,
}

/// Fade tint phase. `Tinting` ramps toward full opacity, applies the pending
/// target there, then `Untinting` ramps back to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    Idle,
    Tinting,
    Untinting,
}

/// What a transition swaps in once the screen is fully tinted.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionTarget {
    /// Swap the current map and respawn the player
    Map { map_id: String, spawn: String },
    /// Install a battle session
    Battle(BattleKickoff),
    /// Tear down the battle and hand control back to the world
    ReturnToWorld,
}

/// Everything needed to build the battle session at the swap point.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleKickoff {
    /// Opponent roster seeds: (slot, species key, level). Slot gaps are
    /// kept as written in the trainer data.
    pub opponents: Vec<(usize, String, u8)>,
    /// Trainer id for trainer battles; None for wild encounters
    pub trainer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneDirector {
    mode: SceneMode,
    fade: Fade,
    tint_alpha: f32,
    pending: Option<TransitionTarget>,
}

impl SceneDirector {
    pub fn new() -> Self {
        SceneDirector {
            mode: SceneMode::World,
            fade: Fade::Idle,
            tint_alpha: 0.0,
            pending: None,
        }
    }

    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SceneMode) {
        self.mode = mode;
    }

    /// Current tint opacity for the renderer, 0-255.
    pub fn tint_alpha(&self) -> u8 {
        self.tint_alpha.round().clamp(0.0, 255.0) as u8
    }

    /// True from the moment a transition is requested until the tint has
    /// fully cleared again.
    pub fn is_transitioning(&self) -> bool {
        self.fade != Fade::Idle || self.pending.is_some()
    }

    /// Player input is blocked during any transition and whenever an
    /// overlay owns control.
    pub fn input_blocked(&self) -> bool {
        self.is_transitioning() || self.mode != SceneMode::World
    }

    /// Request a transition. Only one may be in flight: a new trigger while
    /// one is pending is ignored and reported as such.
    pub fn request_transition(&mut self, target: TransitionTarget) -> bool {
        if self.is_transitioning() {
            return false;
        }
        self.pending = Some(target);
        self.fade = Fade::Tinting;
        true
    }

    /// Advance the fade. Returns the pending target exactly once, at the
    /// tick the tint reaches full opacity; the caller applies it atomically
    /// before the next frame is drawn.
    pub fn update(&mut self, dt: f32) -> Option<TransitionTarget> {
        match self.fade {
            Fade::Idle => None,
            Fade::Tinting => {
                self.tint_alpha += FADE_SPEED * dt;
                if self.tint_alpha >= 255.0 {
                    self.tint_alpha = 255.0;
                    self.fade = Fade::Untinting;
                    self.pending.take()
                } else {
                    None
                }
            }
            Fade::Untinting => {
                self.tint_alpha -= FADE_SPEED * dt;
                if self.tint_alpha <= 0.0 {
                    self.tint_alpha = 0.0;
                    self.fade = Fade::Idle;
                }
                None
            }
        }
    }
}

impl Default for SceneDirector {
    fn default() -> Self {
        SceneDirector::new()
    }
}
