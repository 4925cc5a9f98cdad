//! Standard D&D 5e weapon table.
//!
//! The combat engine resolves weapons by name or by [`WeaponKind`] so that
//! light, polearm and crossbow rules read from one closed table instead of
//! string matching at each call site.

use crate::world::{DamageType, WeaponItem, WeaponKind, WeaponProperty};

/// Get a standard weapon by name (case-insensitive).
pub fn get_weapon(name: &str) -> Option<WeaponItem> {
    let name_lower = name.trim().to_lowercase();
    WEAPONS
        .iter()
        .find(|w| w.name.to_lowercase() == name_lower)
        .cloned()
}

/// Get the standard weapon of a kind. `Custom` has no table entry.
pub fn weapon_of_kind(kind: WeaponKind) -> Option<WeaponItem> {
    WEAPONS.iter().find(|w| w.kind == kind).cloned()
}

fn versatile(dice: &str) -> WeaponProperty {
    WeaponProperty::Versatile(dice.to_string())
}

lazy_static::lazy_static! {
    /// Standard D&D 5e weapons.
    pub static ref WEAPONS: Vec<WeaponItem> = vec![
        // Simple Melee Weapons
        WeaponItem::new(WeaponKind::Club, "Club", "1d4", DamageType::Bludgeoning)
            .with_properties(vec![WeaponProperty::Light]),
        WeaponItem::new(WeaponKind::Dagger, "Dagger", "1d4", DamageType::Piercing)
            .with_properties(vec![WeaponProperty::Finesse, WeaponProperty::Light, WeaponProperty::Thrown])
            .with_range(20, 60),
        WeaponItem::new(WeaponKind::Greatclub, "Greatclub", "1d8", DamageType::Bludgeoning)
            .with_properties(vec![WeaponProperty::TwoHanded]),
        WeaponItem::new(WeaponKind::Handaxe, "Handaxe", "1d6", DamageType::Slashing)
            .with_properties(vec![WeaponProperty::Light, WeaponProperty::Thrown])
            .with_range(20, 60),
        WeaponItem::new(WeaponKind::Javelin, "Javelin", "1d6", DamageType::Piercing)
            .with_properties(vec![WeaponProperty::Thrown])
            .with_range(30, 120),
        WeaponItem::new(WeaponKind::LightHammer, "Light Hammer", "1d4", DamageType::Bludgeoning)
            .with_properties(vec![WeaponProperty::Light, WeaponProperty::Thrown])
            .with_range(20, 60),
        WeaponItem::new(WeaponKind::Mace, "Mace", "1d6", DamageType::Bludgeoning),
        WeaponItem::new(WeaponKind::Quarterstaff, "Quarterstaff", "1d6", DamageType::Bludgeoning)
            .with_properties(vec![versatile("1d8")]),
        WeaponItem::new(WeaponKind::Sickle, "Sickle", "1d4", DamageType::Slashing)
            .with_properties(vec![WeaponProperty::Light]),
        WeaponItem::new(WeaponKind::Spear, "Spear", "1d6", DamageType::Piercing)
            .with_properties(vec![WeaponProperty::Thrown, versatile("1d8")])
            .with_range(20, 60),

        // Simple Ranged Weapons
        WeaponItem::new(WeaponKind::Dart, "Dart", "1d4", DamageType::Piercing)
            .with_properties(vec![WeaponProperty::Finesse, WeaponProperty::Thrown])
            .with_range(20, 60),
        WeaponItem::new(WeaponKind::LightCrossbow, "Light Crossbow", "1d8", DamageType::Piercing)
            .with_properties(vec![WeaponProperty::Ammunition, WeaponProperty::Loading, WeaponProperty::TwoHanded])
            .with_range(80, 320),
        WeaponItem::new(WeaponKind::Shortbow, "Shortbow", "1d6", DamageType::Piercing)
            .with_properties(vec![WeaponProperty::Ammunition, WeaponProperty::TwoHanded])
            .with_range(80, 320),
        WeaponItem::new(WeaponKind::Sling, "Sling", "1d4", DamageType::Bludgeoning)
            .with_properties(vec![WeaponProperty::Ammunition])
            .with_range(30, 120),

        // Martial Melee Weapons
        WeaponItem::new(WeaponKind::Battleaxe, "Battleaxe", "1d8", DamageType::Slashing)
            .martial()
            .with_properties(vec![versatile("1d10")]),
        WeaponItem::new(WeaponKind::Flail, "Flail", "1d8", DamageType::Bludgeoning).martial(),
        WeaponItem::new(WeaponKind::Glaive, "Glaive", "1d10", DamageType::Slashing)
            .martial()
            .with_properties(vec![WeaponProperty::Heavy, WeaponProperty::Reach, WeaponProperty::TwoHanded]),
        WeaponItem::new(WeaponKind::Greataxe, "Greataxe", "1d12", DamageType::Slashing)
            .martial()
            .with_properties(vec![WeaponProperty::Heavy, WeaponProperty::TwoHanded]),
        WeaponItem::new(WeaponKind::Greatsword, "Greatsword", "2d6", DamageType::Slashing)
            .martial()
            .with_properties(vec![WeaponProperty::Heavy, WeaponProperty::TwoHanded]),
        WeaponItem::new(WeaponKind::Halberd, "Halberd", "1d10", DamageType::Slashing)
            .martial()
            .with_properties(vec![WeaponProperty::Heavy, WeaponProperty::Reach, WeaponProperty::TwoHanded]),
        WeaponItem::new(WeaponKind::Lance, "Lance", "1d10", DamageType::Piercing)
            .martial()
            .with_properties(vec![WeaponProperty::Heavy, WeaponProperty::Reach]),
        WeaponItem::new(WeaponKind::Longsword, "Longsword", "1d8", DamageType::Slashing)
            .martial()
            .with_properties(vec![versatile("1d10")]),
        WeaponItem::new(WeaponKind::Maul, "Maul", "2d6", DamageType::Bludgeoning)
            .martial()
            .with_properties(vec![WeaponProperty::Heavy, WeaponProperty::TwoHanded]),
        WeaponItem::new(WeaponKind::Morningstar, "Morningstar", "1d8", DamageType::Piercing).martial(),
        WeaponItem::new(WeaponKind::Pike, "Pike", "1d10", DamageType::Piercing)
            .martial()
            .with_properties(vec![WeaponProperty::Heavy, WeaponProperty::Reach, WeaponProperty::TwoHanded]),
        WeaponItem::new(WeaponKind::Rapier, "Rapier", "1d8", DamageType::Piercing)
            .martial()
            .with_properties(vec![WeaponProperty::Finesse]),
        WeaponItem::new(WeaponKind::Scimitar, "Scimitar", "1d6", DamageType::Slashing)
            .martial()
            .with_properties(vec![WeaponProperty::Finesse, WeaponProperty::Light]),
        WeaponItem::new(WeaponKind::Shortsword, "Shortsword", "1d6", DamageType::Piercing)
            .martial()
            .with_properties(vec![WeaponProperty::Finesse, WeaponProperty::Light]),
        WeaponItem::new(WeaponKind::Trident, "Trident", "1d8", DamageType::Piercing)
            .martial()
            .with_properties(vec![WeaponProperty::Thrown, versatile("1d10")])
            .with_range(20, 60),
        WeaponItem::new(WeaponKind::Warhammer, "Warhammer", "1d8", DamageType::Bludgeoning)
            .martial()
            .with_properties(vec![versatile("1d10")]),
        WeaponItem::new(WeaponKind::WarPick, "War Pick", "1d8", DamageType::Piercing)
            .martial()
            .with_properties(vec![versatile("1d10")]),
        WeaponItem::new(WeaponKind::Whip, "Whip", "1d4", DamageType::Slashing)
            .martial()
            .with_properties(vec![WeaponProperty::Finesse, WeaponProperty::Reach]),

        // Martial Ranged Weapons
        WeaponItem::new(WeaponKind::Blowgun, "Blowgun", "1", DamageType::Piercing)
            .martial()
            .with_properties(vec![WeaponProperty::Ammunition, WeaponProperty::Loading])
            .with_range(25, 100),
        WeaponItem::new(WeaponKind::HandCrossbow, "Hand Crossbow", "1d6", DamageType::Piercing)
            .martial()
            .with_properties(vec![WeaponProperty::Ammunition, WeaponProperty::Light, WeaponProperty::Loading])
            .with_range(30, 120),
        WeaponItem::new(WeaponKind::HeavyCrossbow, "Heavy Crossbow", "1d10", DamageType::Piercing)
            .martial()
            .with_properties(vec![WeaponProperty::Ammunition, WeaponProperty::Heavy, WeaponProperty::Loading, WeaponProperty::TwoHanded])
            .with_range(100, 400),
        WeaponItem::new(WeaponKind::Longbow, "Longbow", "1d8", DamageType::Piercing)
            .martial()
            .with_properties(vec![WeaponProperty::Ammunition, WeaponProperty::Heavy, WeaponProperty::TwoHanded])
            .with_range(150, 600),
    ];
}
