//! Post-battle progression: experience awards, level-ups, and evolution
//! eligibility. All of this runs after the battle session is torn down,
//! never mid-battle.

use crate::battle::state::{BattleEvent, ROSTER_SIZE};
use crate::errors::SpeciesDataResult;
use crate::monster::Monster;
use crate::species::get_species_data;

/// Experience granted per level of each defeated opponent.
pub const XP_PER_OPPONENT_LEVEL: u32 = 40;

/// Total experience a victory over opponents of these levels is worth.
pub fn experience_for_defeated(defeated_levels: &[u8]) -> u32 {
    defeated_levels
        .iter()
        .map(|&level| level as u32 * XP_PER_OPPONENT_LEVEL)
        .sum()
}

/// Grant victory experience to every surviving monster in the roster and
/// apply any level-ups it pays for. Returns the progression events in the
/// order they happened.
pub fn award_victory_experience(
    roster: &mut [Option<Monster>; ROSTER_SIZE],
    defeated_levels: &[u8],
) -> SpeciesDataResult<Vec<BattleEvent>> {
    let amount = experience_for_defeated(defeated_levels);
    let mut events = Vec::new();
    if amount == 0 {
        return Ok(events);
    }

    for monster in roster.iter_mut().flatten() {
        if monster.is_fainted() {
            continue;
        }
        let species = get_species_data(&monster.species)?;
        events.push(BattleEvent::ExperienceGained {
            monster: monster.name.clone(),
            amount,
        });
        if monster.gain_xp(amount, &species) > 0 {
            events.push(BattleEvent::LeveledUp {
                monster: monster.name.clone(),
                new_level: monster.level,
            });
        }
    }

    Ok(events)
}

/// Roster members whose level has crossed their species' evolution
/// threshold: (slot, current species, evolved species). Evaluated once per
/// battle, after rewards are applied.
pub fn pending_evolutions(
    roster: &[Option<Monster>; ROSTER_SIZE],
) -> SpeciesDataResult<Vec<(usize, String, String)>> {
    let mut pending = Vec::new();
    for (slot, monster) in roster.iter().enumerate() {
        let Some(monster) = monster else { continue };
        let species = get_species_data(&monster.species)?;
        if let Some(into) = monster.pending_evolution(&species) {
            pending.push((slot, monster.species.clone(), into));
        }
    }
    Ok(pending)
}
