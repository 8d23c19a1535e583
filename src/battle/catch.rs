use crate::battle::state::TurnRng;
use crate::monster::Monster;

/// Probability in [0, 1] that a catch attempt on `target` succeeds.
///
/// chance = (species_catch_rate / 255) * (3*max_hp - 2*current_hp) / (3*max_hp)
///
/// The health term shrinks the chance linearly from 1 at zero health to 1/3
/// at full health, so lower health always means a better catch; the species
/// rate scales the whole curve.
pub fn calculate_catch_chance(target: &Monster, species_catch_rate: u8) -> f32 {
    let max_health = target.stats.max_health as f32;
    let current = target.health as f32;
    if max_health <= 0.0 {
        return 0.0;
    }

    let health_multiplier = (max_health * 3.0 - current * 2.0) / (max_health * 3.0);
    let chance = (species_catch_rate as f32 / 255.0) * health_multiplier;
    chance.clamp(0.0, 1.0)
}

/// Roll the attempt against a chance. Outcomes are 1-100; the attempt
/// succeeds when the roll lands within the chance percentage.
pub fn roll_catch_success(chance: f32, rng: &mut TurnRng) -> bool {
    let roll = rng.next_outcome("catch roll") as f32;
    roll <= chance * 100.0
}
