//! Testing utilities for combat scenarios.
//!
//! - `ScriptedDice` for deterministic rolls
//! - Sample combatants to build encounters from

use crate::dice::DiceRoller;
use crate::items::get_weapon;
use crate::world::{
    AbilityScores, CharacterClass, ClassLevel, Combatant, Side, WeaponProficiencies,
};
use std::collections::VecDeque;

/// A dice primitive that returns queued values in order.
///
/// Values are returned as given, whatever the die size. Once the queue is
/// empty every die comes up 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    values: VecDeque<u32>,
    sides: Vec<u32>,
}

impl ScriptedDice {
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            sides: Vec::new(),
        }
    }

    /// Queue more values after the current ones.
    pub fn push(&mut self, values: impl IntoIterator<Item = u32>) {
        self.values.extend(values);
    }

    /// Values not yet rolled.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Dice rolled so far.
    pub fn rolled(&self) -> usize {
        self.sides.len()
    }

    /// Die size of every roll so far, in order.
    pub fn sides_rolled(&self) -> &[u32] {
        &self.sides
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.sides.push(sides);
        self.values.pop_front().unwrap_or(1)
    }
}

/// Roland, a level 1 fighter with a longsword.
///
/// STR 16, DEX 12, proficiency +2, AC 16, all weapon proficiencies.
pub fn sample_fighter() -> Combatant {
    Combatant::new("Roland", Side::Party)
        .with_ability_scores(AbilityScores::new(16, 12, 14, 10, 12, 8))
        .with_class(ClassLevel::new(CharacterClass::Fighter, 1))
        .with_armor_class(16)
        .with_proficiencies(WeaponProficiencies::all())
        .wielding(get_weapon("Longsword"), None)
}

/// Mira, a level 1 rogue with a shortsword in each hand.
///
/// STR 10, DEX 16, proficiency +2, AC 14.
pub fn sample_rogue() -> Combatant {
    Combatant::new("Mira", Side::Party)
        .with_ability_scores(AbilityScores::new(10, 16, 12, 12, 10, 14))
        .with_class(ClassLevel::new(CharacterClass::Rogue, 1))
        .with_armor_class(14)
        .with_proficiencies(WeaponProficiencies::all())
        .wielding(get_weapon("Shortsword"), get_weapon("Shortsword"))
}

/// A goblin with a scimitar. STR 8, DEX 14, AC 13.
pub fn sample_goblin() -> Combatant {
    Combatant::new("Goblin", Side::Hostile)
        .with_ability_scores(AbilityScores::new(8, 14, 10, 10, 8, 8))
        .with_armor_class(13)
        .with_proficiencies(WeaponProficiencies::all())
        .wielding(get_weapon("Scimitar"), None)
}
