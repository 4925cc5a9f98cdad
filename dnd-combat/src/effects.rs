//! Resolved effects: numeric attack and damage bonuses from magic items,
//! buffs and auras that are active right now.
//!
//! The engine only talks to the [`ResolvedEffects`] trait. [`EffectLedger`]
//! is the provider the host keeps on each combatant.

use crate::weapon::WeaponContext;
use crate::world::DamageType;
use serde::{Deserialize, Serialize};

/// Source of currently active attack/damage bonuses.
pub trait ResolvedEffects {
    fn attack_bonus(&self, weapon: &WeaponContext) -> i32;
    fn damage_bonus(&self, weapon: &WeaponContext) -> i32;
}

impl<T: ResolvedEffects + ?Sized> ResolvedEffects for &T {
    fn attack_bonus(&self, weapon: &WeaponContext) -> i32 {
        (**self).attack_bonus(weapon)
    }

    fn damage_bonus(&self, weapon: &WeaponContext) -> i32 {
        (**self).damage_bonus(weapon)
    }
}

/// A provider with nothing active.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl ResolvedEffects for NoEffects {
    fn attack_bonus(&self, _weapon: &WeaponContext) -> i32 {
        0
    }

    fn damage_bonus(&self, _weapon: &WeaponContext) -> i32 {
        0
    }
}

/// Which attacks a bonus applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusScope {
    All,
    Weapon,
    Melee,
    Ranged,
    Spell,
    DamageType(DamageType),
}

impl BonusScope {
    pub fn matches(&self, weapon: &WeaponContext) -> bool {
        match self {
            BonusScope::All => true,
            BonusScope::Weapon => !weapon.is_spell,
            BonusScope::Melee => weapon.is_melee && !weapon.is_spell,
            BonusScope::Ranged => weapon.is_ranged && !weapon.is_spell,
            BonusScope::Spell => weapon.is_spell,
            BonusScope::DamageType(damage_type) => weapon.damage_type == Some(*damage_type),
        }
    }
}

/// One active bonus, e.g. a +1 weapon or a Bless-style aura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBonus {
    pub source: String,
    pub attack: i32,
    pub damage: i32,
    pub scope: BonusScope,
}

impl ActiveBonus {
    pub fn new(source: impl Into<String>, attack: i32, damage: i32) -> Self {
        Self {
            source: source.into(),
            attack,
            damage,
            scope: BonusScope::All,
        }
    }

    pub fn scoped(mut self, scope: BonusScope) -> Self {
        self.scope = scope;
        self
    }
}

/// The active bonuses on one combatant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectLedger {
    bonuses: Vec<ActiveBonus>,
}

impl EffectLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, bonus: ActiveBonus) -> Self {
        self.bonuses.push(bonus);
        self
    }

    pub fn add(&mut self, bonus: ActiveBonus) {
        self.bonuses.push(bonus);
    }

    /// Drop every bonus granted by `source`.
    pub fn remove_source(&mut self, source: &str) {
        self.bonuses.retain(|b| b.source != source);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveBonus> {
        self.bonuses.iter()
    }

    fn matching<'a>(&'a self, weapon: &'a WeaponContext) -> impl Iterator<Item = &'a ActiveBonus> {
        self.bonuses.iter().filter(move |b| b.scope.matches(weapon))
    }
}

impl ResolvedEffects for EffectLedger {
    fn attack_bonus(&self, weapon: &WeaponContext) -> i32 {
        self.matching(weapon).map(|b| b.attack).sum()
    }

    fn damage_bonus(&self, weapon: &WeaponContext) -> i32 {
        self.matching(weapon).map(|b| b.damage).sum()
    }
}
