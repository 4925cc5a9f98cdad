//! Weapon context: the normalized capability descriptor every other rule reads.

use crate::world::{DamageType, WeaponItem, WeaponProperty};
use serde::{Deserialize, Serialize};

/// What kind of strike is being made, independent of the specific weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeaponContext {
    pub is_melee: bool,
    pub is_ranged: bool,
    pub is_heavy: bool,
    pub is_thrown: bool,
    pub is_crossbow: bool,
    pub is_spell: bool,
    pub is_finesse: bool,
    pub is_light: bool,
    pub is_two_handed: bool,
    pub damage_type: Option<DamageType>,
}

impl WeaponContext {
    /// Derive the context for one attack with `weapon`.
    ///
    /// `thrown` marks a melee weapon with the Thrown property being thrown
    /// this attack. It is ignored for weapons that can't be thrown.
    pub fn for_weapon(weapon: &WeaponItem, thrown: bool) -> Self {
        let has = |p: WeaponProperty| weapon.properties.contains(&p);
        let is_thrown = has(WeaponProperty::Thrown);
        let is_ranged = has(WeaponProperty::Ammunition) || (is_thrown && thrown);

        Self {
            is_melee: !is_ranged,
            is_ranged,
            is_heavy: has(WeaponProperty::Heavy),
            is_thrown,
            is_crossbow: weapon.kind.is_crossbow(),
            is_spell: false,
            is_finesse: has(WeaponProperty::Finesse),
            is_light: has(WeaponProperty::Light),
            is_two_handed: has(WeaponProperty::TwoHanded),
            damage_type: Some(weapon.damage_type),
        }
    }

    pub fn unarmed() -> Self {
        Self {
            is_melee: true,
            damage_type: Some(DamageType::Bludgeoning),
            ..Self::default()
        }
    }

    /// An improvised weapon, melee or thrown.
    pub fn improvised(thrown: bool) -> Self {
        Self {
            is_melee: !thrown,
            is_ranged: thrown,
            is_thrown: thrown,
            damage_type: Some(DamageType::Bludgeoning),
            ..Self::default()
        }
    }

    /// A spell attack roll.
    pub fn spell(is_ranged: bool, damage_type: DamageType) -> Self {
        Self {
            is_melee: !is_ranged,
            is_ranged,
            is_spell: true,
            damage_type: Some(damage_type),
            ..Self::default()
        }
    }

    pub fn is_piercing(&self) -> bool {
        self.damage_type == Some(DamageType::Piercing)
    }
}
