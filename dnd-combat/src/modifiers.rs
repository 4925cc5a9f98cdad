//! Attack and damage modifiers.
//!
//! Both entry points pick an ability modifier, add the rule-derived bonuses
//! (proficiency, fighting styles, feats) and finally add whatever the
//! [`ResolvedEffects`] provider reports, so external magic bonuses always
//! stack on top.

use crate::effects::ResolvedEffects;
use crate::weapon::WeaponContext;
use crate::world::{Ability, AbilityScores, CombatFeatures, FightingStyles};
use serde::{Deserialize, Serialize};

/// Fighting style bonus for Archery, Dueling and Thrown Weapon Fighting.
pub const FIGHTING_STYLE_BONUS: i32 = 2;

/// The ability modifiers an attack can draw on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AbilityModifiers {
    pub strength: i32,
    pub dexterity: i32,
    /// Used for spell attack rolls only.
    pub spellcasting: i32,
}

impl AbilityModifiers {
    pub fn new(strength: i32, dexterity: i32) -> Self {
        Self {
            strength,
            dexterity,
            spellcasting: 0,
        }
    }

    pub fn with_spellcasting(mut self, modifier: i32) -> Self {
        self.spellcasting = modifier;
        self
    }

    pub fn from_scores(scores: &AbilityScores) -> Self {
        Self::new(
            scores.modifier(Ability::Strength),
            scores.modifier(Ability::Dexterity),
        )
    }
}

/// How the strike is being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttackKind {
    #[default]
    Weapon,
    Unarmed,
    Improvised,
}

/// Everything the calculator reads for one attack.
#[derive(Debug, Clone, Copy)]
pub struct ModifierInputs<'a> {
    pub abilities: AbilityModifiers,
    pub weapon: &'a WeaponContext,
    pub attack_kind: AttackKind,
    pub proficiency_bonus: i32,
    pub proficient: bool,
    pub fighting_styles: FightingStyles,
    pub features: CombatFeatures,
    /// The second weapon of two-weapon fighting.
    pub offhand: bool,
}

impl<'a> ModifierInputs<'a> {
    pub fn new(abilities: AbilityModifiers, weapon: &'a WeaponContext, proficiency_bonus: i32) -> Self {
        Self {
            abilities,
            weapon,
            attack_kind: AttackKind::Weapon,
            proficiency_bonus,
            proficient: true,
            fighting_styles: FightingStyles::empty(),
            features: CombatFeatures::empty(),
            offhand: false,
        }
    }
}

/// Finesse takes the better of STR and DEX, ranged takes DEX, melee takes STR.
pub fn ability_modifier_for(inputs: &ModifierInputs<'_>) -> i32 {
    let weapon = inputs.weapon;
    let abilities = inputs.abilities;
    match inputs.attack_kind {
        AttackKind::Unarmed => abilities.strength,
        _ if weapon.is_spell => abilities.spellcasting,
        AttackKind::Weapon if weapon.is_finesse => abilities.strength.max(abilities.dexterity),
        _ if weapon.is_ranged => abilities.dexterity,
        _ => abilities.strength,
    }
}

/// Flat bonus added to the attack roll.
pub fn attack_modifier(inputs: &ModifierInputs<'_>, effects: &impl ResolvedEffects) -> i32 {
    let weapon = inputs.weapon;
    let ability = ability_modifier_for(inputs);

    let rule_bonus = match inputs.attack_kind {
        AttackKind::Unarmed => return ability + inputs.proficiency_bonus,
        AttackKind::Improvised => ability,
        AttackKind::Weapon if weapon.is_spell => ability + inputs.proficiency_bonus,
        AttackKind::Weapon => {
            let proficiency = if inputs.proficient {
                inputs.proficiency_bonus
            } else {
                0
            };
            let archery = if inputs.fighting_styles.contains(FightingStyles::ARCHERY) && weapon.is_ranged {
                FIGHTING_STYLE_BONUS
            } else {
                0
            };
            ability + proficiency + archery
        }
    };

    rule_bonus + effects.attack_bonus(weapon)
}

/// Flat bonus added to the damage roll.
///
/// Unarmed strikes return their whole damage (`1 + STR`), since they roll no dice.
pub fn damage_modifier(inputs: &ModifierInputs<'_>, effects: &impl ResolvedEffects) -> i32 {
    let weapon = inputs.weapon;
    let ability = ability_modifier_for(inputs);

    let rule_bonus = match inputs.attack_kind {
        AttackKind::Unarmed => return 1 + ability,
        AttackKind::Improvised => ability,
        AttackKind::Weapon if weapon.is_spell => 0,
        AttackKind::Weapon if inputs.offhand => {
            if inputs.fighting_styles.contains(FightingStyles::TWO_WEAPON) {
                ability
            } else {
                ability.min(0)
            }
        }
        AttackKind::Weapon => {
            let styles = inputs.fighting_styles;
            let dueling = if styles.contains(FightingStyles::DUELING)
                && !weapon.is_ranged
                && !weapon.is_two_handed
            {
                FIGHTING_STYLE_BONUS
            } else {
                0
            };
            let thrown = if styles.contains(FightingStyles::THROWN_WEAPON)
                && weapon.is_thrown
                && weapon.is_ranged
            {
                FIGHTING_STYLE_BONUS
            } else {
                0
            };
            let great_weapon_master = if inputs.features.contains(CombatFeatures::GREAT_WEAPON_MASTER)
                && weapon.is_heavy
            {
                inputs.proficiency_bonus
            } else {
                0
            };
            ability + dueling + thrown + great_weapon_master
        }
    };

    rule_bonus + effects.damage_bonus(weapon)
}
