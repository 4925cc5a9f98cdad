//! Turn-scoped attack resource tracking.
//!
//! An [`AttackTracker`] is a value: `use_attack` and `use_bonus_attack`
//! return a new tracker and leave the old one untouched, so an observer can
//! keep reading a copy while the host swaps in the updated one.

use crate::world::{CharacterClass, ClassLevel, CombatFeatures, EntityId, Subclass, WeaponItem};
use serde::{Deserialize, Serialize};

/// Attacks available to one entity during one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackTracker {
    pub entity_id: EntityId,
    pub max_attacks: u8,
    pub attacks_used: u8,
    pub is_multiattack: bool,
    pub bonus_attacks: u8,
    pub bonus_attacks_used: u8,
}

impl AttackTracker {
    /// Fresh tracker at the start of a turn.
    pub fn new(entity_id: EntityId, max_attacks: u8, bonus_attacks: u8) -> Self {
        Self {
            entity_id,
            max_attacks,
            attacks_used: 0,
            is_multiattack: false,
            bonus_attacks,
            bonus_attacks_used: 0,
        }
    }

    /// Fresh tracker for a monster's Multiattack.
    pub fn multiattack(entity_id: EntityId, attacks: u8, bonus_attacks: u8) -> Self {
        Self {
            is_multiattack: true,
            ..Self::new(entity_id, attacks, bonus_attacks)
        }
    }

    /// Spend one Attack-action attack. No-op once the pool is empty.
    #[must_use]
    pub fn use_attack(&self) -> Self {
        if !self.has_attacks_remaining() {
            return *self;
        }
        Self {
            attacks_used: self.attacks_used + 1,
            ..*self
        }
    }

    /// Spend one bonus-action attack. No-op once the pool is empty.
    #[must_use]
    pub fn use_bonus_attack(&self) -> Self {
        if !self.has_bonus_attacks_remaining() {
            return *self;
        }
        Self {
            bonus_attacks_used: self.bonus_attacks_used + 1,
            ..*self
        }
    }

    pub fn has_attacks_remaining(&self) -> bool {
        self.attacks_used < self.max_attacks
    }

    pub fn has_bonus_attacks_remaining(&self) -> bool {
        self.bonus_attacks_used < self.bonus_attacks
    }

    pub fn attacks_remaining(&self) -> u8 {
        self.max_attacks.saturating_sub(self.attacks_used)
    }

    pub fn bonus_attacks_remaining(&self) -> u8 {
        self.bonus_attacks.saturating_sub(self.bonus_attacks_used)
    }
}

/// Attacks per Attack action for one class.
///
/// | Class | Attacks |
/// |---|---|
/// | Fighter | 1, 2 at 5, 3 at 11, 4 at 20 |
/// | Barbarian, Monk, Paladin, Ranger | 1, 2 at 5 |
/// | Wizard (Bladesinging), Bard (Swords/Valor) | 1, 2 at 6 |
/// | Everyone else | 1 |
pub fn extra_attack_count(class: CharacterClass, level: u8, subclass: Option<Subclass>) -> u8 {
    match class {
        CharacterClass::Fighter => match level {
            20.. => 4,
            11.. => 3,
            5.. => 2,
            _ => 1,
        },
        CharacterClass::Barbarian
        | CharacterClass::Monk
        | CharacterClass::Paladin
        | CharacterClass::Ranger => {
            if level >= 5 {
                2
            } else {
                1
            }
        }
        CharacterClass::Wizard if subclass == Some(Subclass::Bladesinging) => {
            if level >= 6 {
                2
            } else {
                1
            }
        }
        CharacterClass::Bard
            if matches!(
                subclass,
                Some(Subclass::CollegeOfSwords) | Some(Subclass::CollegeOfValor)
            ) =>
        {
            if level >= 6 {
                2
            } else {
                1
            }
        }
        _ => 1,
    }
}

/// Attacks per Attack action for a multiclass character. Extra Attack from
/// different classes doesn't stack, so the best single class wins.
pub fn extra_attack_count_for(classes: &[ClassLevel]) -> u8 {
    classes
        .iter()
        .map(|c| extra_attack_count(c.class, c.level, c.subclass))
        .max()
        .unwrap_or(1)
}

/// What the combatant is holding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wielding<'a> {
    pub main_hand: Option<&'a WeaponItem>,
    pub off_hand: Option<&'a WeaponItem>,
}

impl<'a> Wielding<'a> {
    pub fn new(main_hand: Option<&'a WeaponItem>, off_hand: Option<&'a WeaponItem>) -> Self {
        Self {
            main_hand,
            off_hand,
        }
    }
}

/// Whether holding these weapons allows a two-weapon-fighting bonus attack.
pub fn two_weapon_fighting_eligible(features: CombatFeatures, wielding: Wielding<'_>) -> bool {
    match (wielding.main_hand, wielding.off_hand) {
        (Some(main), Some(off)) => {
            (main.is_light() && off.is_light()) || features.contains(CombatFeatures::DUAL_WIELDER)
        }
        _ => false,
    }
}

/// Whether Polearm Master grants its bonus attack with this main-hand weapon.
pub fn polearm_master_eligible(features: CombatFeatures, wielding: Wielding<'_>) -> bool {
    features.contains(CombatFeatures::POLEARM_MASTER)
        && wielding.main_hand.is_some_and(WeaponItem::is_polearm)
}

/// Bonus-action attacks available this turn. Two-weapon fighting and
/// Polearm Master don't stack; two-weapon fighting is checked first.
pub fn bonus_attack_count(features: CombatFeatures, wielding: Wielding<'_>) -> u8 {
    let two_weapon = two_weapon_fighting_eligible(features, wielding);
    let polearm = !two_weapon && polearm_master_eligible(features, wielding);
    u8::from(two_weapon) + u8::from(polearm)
}
