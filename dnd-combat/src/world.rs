//! Combat-facing game state types.
//!
//! Contains the value types the combat engine reads: entity identities,
//! ability scores, conditions, classes, weapons, grid tokens, combatants
//! and the host's authoritative encounter state.

use crate::effects::EffectLedger;
use crate::tracker::AttackTracker;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for anything that can hold a token on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Ability scores container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    /// Score 8-9 = -1, 10-11 = 0, 12-13 = +1, etc.
    pub fn modifier(&self, ability: Ability) -> i32 {
        (self.get(ability) as i32 - 10).div_euclid(2)
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// Highest exhaustion level a creature can carry.
pub const MAX_EXHAUSTION: u8 = 6;

/// D&D 5e conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Blinded,
    Charmed,
    Deafened,
    Exhaustion(u8),
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
}

impl Condition {
    pub fn name(&self) -> &'static str {
        match self {
            Condition::Blinded => "Blinded",
            Condition::Charmed => "Charmed",
            Condition::Deafened => "Deafened",
            Condition::Exhaustion(_) => "Exhaustion",
            Condition::Frightened => "Frightened",
            Condition::Grappled => "Grappled",
            Condition::Incapacitated => "Incapacitated",
            Condition::Invisible => "Invisible",
            Condition::Paralyzed => "Paralyzed",
            Condition::Petrified => "Petrified",
            Condition::Poisoned => "Poisoned",
            Condition::Prone => "Prone",
            Condition::Restrained => "Restrained",
            Condition::Stunned => "Stunned",
            Condition::Unconscious => "Unconscious",
        }
    }

    /// Parse a condition tag from user-editable state.
    ///
    /// Matching is case-insensitive. `value` is only read for Exhaustion,
    /// where a missing value means level 1 and the level is clamped to 0..=6.
    /// Unknown tags return `None`.
    pub fn from_tag(tag: &str, value: Option<i32>) -> Option<Condition> {
        let condition = match tag.trim().to_lowercase().as_str() {
            "blinded" => Condition::Blinded,
            "charmed" => Condition::Charmed,
            "deafened" => Condition::Deafened,
            "exhaustion" | "exhausted" => {
                let level = value.unwrap_or(1).clamp(0, MAX_EXHAUSTION as i32);
                Condition::Exhaustion(level as u8)
            }
            "frightened" => Condition::Frightened,
            "grappled" => Condition::Grappled,
            "incapacitated" => Condition::Incapacitated,
            "invisible" => Condition::Invisible,
            "paralyzed" => Condition::Paralyzed,
            "petrified" => Condition::Petrified,
            "poisoned" => Condition::Poisoned,
            "prone" => Condition::Prone,
            "restrained" => Condition::Restrained,
            "stunned" => Condition::Stunned,
            "unconscious" => Condition::Unconscious,
            _ => return None,
        };
        Some(condition)
    }

    /// Conditions that stop a creature from taking actions at all.
    pub fn is_incapacitating(&self) -> bool {
        matches!(
            self,
            Condition::Incapacitated
                | Condition::Paralyzed
                | Condition::Petrified
                | Condition::Stunned
                | Condition::Unconscious
        )
    }

    /// Same condition tag, ignoring the exhaustion level.
    pub fn same_kind(&self, other: &Condition) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Exhaustion(level) => write!(f, "Exhaustion ({level})"),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// A condition applied to a creature with tracking info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCondition {
    pub condition: Condition,
    /// The entity responsible, e.g. whoever is grappling this creature.
    pub source: Option<EntityId>,
    pub duration_rounds: Option<u32>,
}

impl ActiveCondition {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            source: None,
            duration_rounds: None,
        }
    }

    pub fn from_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_duration(mut self, rounds: u32) -> Self {
        self.duration_rounds = Some(rounds);
        self
    }
}

/// A condition as stored in editable game state, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCondition {
    pub name: String,
    #[serde(default)]
    pub value: Option<i32>,
    #[serde(default)]
    pub source: Option<EntityId>,
}

impl RawCondition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            source: None,
        }
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }
}

/// Immutable snapshot of the conditions on one creature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSet {
    conditions: Vec<ActiveCondition>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from raw tags, skipping any tag that isn't a known condition.
    pub fn from_raw(raw: &[RawCondition]) -> Self {
        raw.iter()
            .filter_map(|r| match Condition::from_tag(&r.name, r.value) {
                Some(condition) => Some(ActiveCondition {
                    condition,
                    source: r.source,
                    duration_rounds: None,
                }),
                None => {
                    tracing::trace!(tag = %r.name, "ignoring unknown condition tag");
                    None
                }
            })
            .collect()
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(ActiveCondition::new(condition));
        self
    }

    pub fn push(&mut self, condition: ActiveCondition) {
        self.conditions.push(condition);
    }

    /// Remove every instance of a condition tag.
    pub fn remove(&mut self, condition: Condition) {
        self.conditions.retain(|c| !c.condition.same_kind(&condition));
    }

    pub fn has(&self, condition: Condition) -> bool {
        self.conditions
            .iter()
            .any(|c| c.condition.same_kind(&condition))
    }

    /// Highest exhaustion level present, 0 when not exhausted.
    pub fn exhaustion_level(&self) -> u8 {
        self.conditions
            .iter()
            .filter_map(|c| match c.condition {
                Condition::Exhaustion(level) => Some(level.min(MAX_EXHAUSTION)),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Incapacitating conditions present, in declaration order without repeats.
    pub fn incapacitating(&self) -> Vec<Condition> {
        let mut found: Vec<Condition> = Vec::new();
        for c in &self.conditions {
            if c.condition.is_incapacitating() && !found.contains(&c.condition) {
                found.push(c.condition);
            }
        }
        found
    }

    pub fn is_incapacitated(&self) -> bool {
        self.conditions.iter().any(|c| c.condition.is_incapacitating())
    }

    /// Who is grappling this creature, if anyone recorded it.
    pub fn grappler(&self) -> Option<EntityId> {
        self.conditions
            .iter()
            .find(|c| c.condition == Condition::Grappled)
            .and_then(|c| c.source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveCondition> {
        self.conditions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Count one round off every timed condition and drop the ones that run
    /// out. Returns the expired conditions.
    pub fn tick_round(&mut self) -> Vec<Condition> {
        let mut expired = Vec::new();
        self.conditions.retain_mut(|c| match c.duration_rounds {
            Some(rounds) if rounds <= 1 => {
                expired.push(c.condition);
                false
            }
            Some(ref mut rounds) => {
                *rounds -= 1;
                true
            }
            None => true,
        });
        expired
    }
}

impl FromIterator<ActiveCondition> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = ActiveCondition>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Condition>> for ConditionSet {
    fn from(conditions: Vec<Condition>) -> Self {
        conditions.into_iter().map(ActiveCondition::new).collect()
    }
}

// ============================================================================
// Classes and Features
// ============================================================================

/// D&D character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Barbarian,
    Bard,
    Cleric,
    Druid,
    Fighter,
    Monk,
    Paladin,
    Ranger,
    Rogue,
    Sorcerer,
    Warlock,
    Wizard,
}

impl CharacterClass {
    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Barbarian => "Barbarian",
            CharacterClass::Bard => "Bard",
            CharacterClass::Cleric => "Cleric",
            CharacterClass::Druid => "Druid",
            CharacterClass::Fighter => "Fighter",
            CharacterClass::Monk => "Monk",
            CharacterClass::Paladin => "Paladin",
            CharacterClass::Ranger => "Ranger",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::Sorcerer => "Sorcerer",
            CharacterClass::Warlock => "Warlock",
            CharacterClass::Wizard => "Wizard",
        }
    }

    pub fn from_name(name: &str) -> Option<CharacterClass> {
        let class = match name.trim().to_lowercase().as_str() {
            "barbarian" => CharacterClass::Barbarian,
            "bard" => CharacterClass::Bard,
            "cleric" => CharacterClass::Cleric,
            "druid" => CharacterClass::Druid,
            "fighter" => CharacterClass::Fighter,
            "monk" => CharacterClass::Monk,
            "paladin" => CharacterClass::Paladin,
            "ranger" => CharacterClass::Ranger,
            "rogue" => CharacterClass::Rogue,
            "sorcerer" => CharacterClass::Sorcerer,
            "warlock" => CharacterClass::Warlock,
            "wizard" => CharacterClass::Wizard,
            _ => return None,
        };
        Some(class)
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Subclasses that change the attack count. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subclass {
    Bladesinging,
    CollegeOfSwords,
    CollegeOfValor,
    Other,
}

impl Subclass {
    /// Accepts the usual spellings found on character sheets.
    pub fn from_name(name: &str) -> Subclass {
        let lower = name.trim().to_lowercase();
        if lower.contains("bladesing") {
            Subclass::Bladesinging
        } else if lower.contains("swords") {
            Subclass::CollegeOfSwords
        } else if lower.contains("valor") {
            Subclass::CollegeOfValor
        } else {
            Subclass::Other
        }
    }
}

/// Class information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLevel {
    pub class: CharacterClass,
    pub level: u8,
    pub subclass: Option<Subclass>,
}

impl ClassLevel {
    pub fn new(class: CharacterClass, level: u8) -> Self {
        Self {
            class,
            level,
            subclass: None,
        }
    }

    pub fn with_subclass(mut self, subclass: Subclass) -> Self {
        self.subclass = Some(subclass);
        self
    }
}

bitflags! {
    /// Feats and features that change how attacks are counted or resolved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CombatFeatures: u16 {
        const DUAL_WIELDER = 1 << 0;
        const POLEARM_MASTER = 1 << 1;
        const GREAT_WEAPON_MASTER = 1 << 2;
        const CROSSBOW_EXPERT = 1 << 3;
        const SHARPSHOOTER = 1 << 4;
    }
}

impl CombatFeatures {
    /// Map a feat name from a character sheet onto its flag.
    pub fn from_feat_name(name: &str) -> CombatFeatures {
        match name.trim().to_lowercase().as_str() {
            "dual wielder" => CombatFeatures::DUAL_WIELDER,
            "polearm master" => CombatFeatures::POLEARM_MASTER,
            "great weapon master" => CombatFeatures::GREAT_WEAPON_MASTER,
            "crossbow expert" => CombatFeatures::CROSSBOW_EXPERT,
            "sharpshooter" => CombatFeatures::SHARPSHOOTER,
            _ => CombatFeatures::empty(),
        }
    }

    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> CombatFeatures {
        names
            .into_iter()
            .fold(CombatFeatures::empty(), |acc, n| acc | CombatFeatures::from_feat_name(n))
    }
}

bitflags! {
    /// Fighting styles that feed the modifier calculator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FightingStyles: u8 {
        const ARCHERY = 1 << 0;
        const DUELING = 1 << 1;
        const THROWN_WEAPON = 1 << 2;
        const TWO_WEAPON = 1 << 3;
    }
}

impl FightingStyles {
    pub fn from_style_name(name: &str) -> FightingStyles {
        let lower = name.trim().to_lowercase();
        match lower.trim_end_matches(" fighting").trim_end_matches(" style") {
            "archery" => FightingStyles::ARCHERY,
            "dueling" => FightingStyles::DUELING,
            "thrown weapon" => FightingStyles::THROWN_WEAPON,
            "two-weapon" | "two weapon" => FightingStyles::TWO_WEAPON,
            _ => FightingStyles::empty(),
        }
    }
}

// ============================================================================
// Damage Types
// ============================================================================

/// Common D&D damage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Slashing,
    Piercing,
    Bludgeoning,
    Fire,
    Cold,
    Lightning,
    Thunder,
    Acid,
    Poison,
    Necrotic,
    Radiant,
    Force,
    Psychic,
}

impl DamageType {
    pub fn name(&self) -> &'static str {
        match self {
            DamageType::Slashing => "slashing",
            DamageType::Piercing => "piercing",
            DamageType::Bludgeoning => "bludgeoning",
            DamageType::Fire => "fire",
            DamageType::Cold => "cold",
            DamageType::Lightning => "lightning",
            DamageType::Thunder => "thunder",
            DamageType::Acid => "acid",
            DamageType::Poison => "poison",
            DamageType::Necrotic => "necrotic",
            DamageType::Radiant => "radiant",
            DamageType::Force => "force",
            DamageType::Psychic => "psychic",
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Weapons
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponCategory {
    Simple,
    Martial,
}

/// The standard weapons, plus `Custom` for anything homebrewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Club,
    Dagger,
    Greatclub,
    Handaxe,
    Javelin,
    LightHammer,
    Mace,
    Quarterstaff,
    Sickle,
    Spear,
    Dart,
    LightCrossbow,
    Shortbow,
    Sling,
    Battleaxe,
    Flail,
    Glaive,
    Greataxe,
    Greatsword,
    Halberd,
    Lance,
    Longsword,
    Maul,
    Morningstar,
    Pike,
    Rapier,
    Scimitar,
    Shortsword,
    Trident,
    Warhammer,
    WarPick,
    Whip,
    Blowgun,
    HandCrossbow,
    HeavyCrossbow,
    Longbow,
    Custom,
}

impl WeaponKind {
    pub fn is_crossbow(&self) -> bool {
        matches!(
            self,
            WeaponKind::LightCrossbow | WeaponKind::HandCrossbow | WeaponKind::HeavyCrossbow
        )
    }

    /// Weapons Polearm Master works with.
    pub fn is_polearm(&self) -> bool {
        matches!(
            self,
            WeaponKind::Glaive
                | WeaponKind::Halberd
                | WeaponKind::Pike
                | WeaponKind::Quarterstaff
                | WeaponKind::Spear
        )
    }
}

/// Weapon properties per D&D 5e.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponProperty {
    Finesse,
    Light,
    Heavy,
    TwoHanded,
    Versatile(String),
    Thrown,
    Ammunition,
    Loading,
    Reach,
}

impl WeaponProperty {
    /// Parse a raw property string such as `"Thrown (range 20/60)"` or
    /// `"Versatile (1d10)"`. Unknown properties return `None`.
    pub fn from_tag(tag: &str) -> Option<WeaponProperty> {
        let lower = tag.trim().to_lowercase();
        let head = lower.split('(').next().unwrap_or("").trim();
        let property = match head {
            "finesse" => WeaponProperty::Finesse,
            "light" => WeaponProperty::Light,
            "heavy" => WeaponProperty::Heavy,
            "two-handed" | "two handed" | "twohanded" => WeaponProperty::TwoHanded,
            "versatile" => {
                let dice = lower
                    .split_once('(')
                    .map(|(_, rest)| rest.trim_end_matches(')').trim().to_string())
                    .unwrap_or_default();
                WeaponProperty::Versatile(dice)
            }
            "thrown" => WeaponProperty::Thrown,
            "ammunition" => WeaponProperty::Ammunition,
            "loading" => WeaponProperty::Loading,
            "reach" => WeaponProperty::Reach,
            _ => return None,
        };
        Some(property)
    }
}

/// Weapons with D&D 5e properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponItem {
    pub kind: WeaponKind,
    pub name: String,
    pub category: WeaponCategory,
    pub damage_dice: String,
    pub damage_type: DamageType,
    pub properties: Vec<WeaponProperty>,
    pub range: Option<(u32, u32)>,
}

impl WeaponItem {
    pub fn new(
        kind: WeaponKind,
        name: impl Into<String>,
        damage_dice: impl Into<String>,
        damage_type: DamageType,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            category: WeaponCategory::Simple,
            damage_dice: damage_dice.into(),
            damage_type,
            properties: Vec::new(),
            range: None,
        }
    }

    /// A homebrew weapon described by raw property strings.
    pub fn from_raw(
        name: impl Into<String>,
        damage_dice: impl Into<String>,
        damage_type: DamageType,
        properties: &[&str],
    ) -> Self {
        Self::new(WeaponKind::Custom, name, damage_dice, damage_type)
            .with_properties(properties.iter().filter_map(|p| WeaponProperty::from_tag(p)).collect())
    }

    pub fn martial(mut self) -> Self {
        self.category = WeaponCategory::Martial;
        self
    }

    pub fn with_properties(mut self, properties: Vec<WeaponProperty>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_range(mut self, normal: u32, long: u32) -> Self {
        self.range = Some((normal, long));
        self
    }

    pub fn has(&self, property: &WeaponProperty) -> bool {
        self.properties.contains(property)
    }

    pub fn is_light(&self) -> bool {
        self.has(&WeaponProperty::Light)
    }

    pub fn is_polearm(&self) -> bool {
        self.kind.is_polearm()
    }

    pub fn versatile_damage(&self) -> Option<&str> {
        self.properties.iter().find_map(|p| match p {
            WeaponProperty::Versatile(dice) => Some(dice.as_str()),
            _ => None,
        })
    }
}

// ============================================================================
// Grid and Tokens
// ============================================================================

/// A square on the battle grid. One square is 5 feet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Distance in squares; diagonals count as one square.
    pub fn distance(&self, other: GridPosition) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }

    pub fn is_within_5ft(&self, other: GridPosition) -> bool {
        self.distance(other) <= 1
    }

    pub fn offset_from(&self, origin: GridPosition) -> (i32, i32) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// Which side of the fight a token is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Party,
    Hostile,
    Neutral,
}

impl Side {
    pub fn is_enemy_of(&self, other: Side) -> bool {
        matches!(
            (self, other),
            (Side::Party, Side::Hostile) | (Side::Hostile, Side::Party)
        )
    }
}

/// A token on the map, as seen by the spatial helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: EntityId,
    pub name: String,
    pub position: GridPosition,
    pub side: Side,
}

// ============================================================================
// Combat
// ============================================================================

/// Which weapon categories a combatant is proficient with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeaponProficiencies {
    pub simple: bool,
    pub martial: bool,
}

impl WeaponProficiencies {
    pub fn all() -> Self {
        Self {
            simple: true,
            martial: true,
        }
    }

    pub fn simple_only() -> Self {
        Self {
            simple: true,
            martial: false,
        }
    }

    pub fn covers(&self, weapon: &WeaponItem) -> bool {
        match weapon.category {
            WeaponCategory::Simple => self.simple,
            WeaponCategory::Martial => self.martial,
        }
    }
}

/// Combat participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub id: EntityId,
    pub name: String,
    pub side: Side,
    pub position: GridPosition,
    pub armor_class: u8,
    pub ability_scores: AbilityScores,
    pub proficiency_bonus: i32,
    pub classes: Vec<ClassLevel>,
    /// Monster Multiattack count, used instead of class Extra Attack.
    pub multiattack: Option<u8>,
    pub features: CombatFeatures,
    pub fighting_styles: FightingStyles,
    pub proficiencies: WeaponProficiencies,
    pub main_hand: Option<WeaponItem>,
    pub off_hand: Option<WeaponItem>,
    pub conditions: ConditionSet,
    pub swim_speed: Option<u32>,
    pub is_dodging: bool,
    pub bonuses: EffectLedger,
}

impl Combatant {
    pub fn new(name: impl Into<String>, side: Side) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            side,
            position: GridPosition::default(),
            armor_class: 10,
            ability_scores: AbilityScores::default(),
            proficiency_bonus: 2,
            classes: Vec::new(),
            multiattack: None,
            features: CombatFeatures::empty(),
            fighting_styles: FightingStyles::empty(),
            proficiencies: WeaponProficiencies::simple_only(),
            main_hand: None,
            off_hand: None,
            conditions: ConditionSet::new(),
            swim_speed: None,
            is_dodging: false,
            bonuses: EffectLedger::new(),
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = GridPosition::new(x, y);
        self
    }

    pub fn with_armor_class(mut self, ac: u8) -> Self {
        self.armor_class = ac;
        self
    }

    pub fn with_ability_scores(mut self, scores: AbilityScores) -> Self {
        self.ability_scores = scores;
        self
    }

    pub fn with_proficiency_bonus(mut self, bonus: i32) -> Self {
        self.proficiency_bonus = bonus;
        self
    }

    pub fn with_class(mut self, class: ClassLevel) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_multiattack(mut self, attacks: u8) -> Self {
        self.multiattack = Some(attacks);
        self
    }

    pub fn with_features(mut self, features: CombatFeatures) -> Self {
        self.features |= features;
        self
    }

    pub fn with_fighting_styles(mut self, styles: FightingStyles) -> Self {
        self.fighting_styles |= styles;
        self
    }

    pub fn with_proficiencies(mut self, proficiencies: WeaponProficiencies) -> Self {
        self.proficiencies = proficiencies;
        self
    }

    pub fn wielding(mut self, main_hand: Option<WeaponItem>, off_hand: Option<WeaponItem>) -> Self {
        self.main_hand = main_hand;
        self.off_hand = off_hand;
        self
    }

    pub fn with_condition(mut self, condition: ActiveCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_swim_speed(mut self, feet: u32) -> Self {
        self.swim_speed = Some(feet);
        self
    }

    pub fn with_bonuses(mut self, bonuses: EffectLedger) -> Self {
        self.bonuses = bonuses;
        self
    }

    pub fn token(&self) -> Token {
        Token {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            side: self.side,
        }
    }
}

/// The host's authoritative copy of an encounter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Encounter {
    pub round: u32,
    pub turn_index: usize,
    pub underwater: bool,
    pub combatants: Vec<Combatant>,
    pub trackers: HashMap<EntityId, AttackTracker>,
}

impl Encounter {
    pub fn new() -> Self {
        Self {
            round: 1,
            ..Self::default()
        }
    }

    pub fn underwater(mut self) -> Self {
        self.underwater = true;
        self
    }

    /// Add a combatant at the end of the turn order.
    pub fn add_combatant(&mut self, combatant: Combatant) -> EntityId {
        let id = combatant.id;
        self.combatants.push(combatant);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.combatants.get(self.turn_index)
    }

    /// Advance the turn pointer, rolling the round over at the end of the order.
    pub fn next_turn(&mut self) {
        self.turn_index += 1;
        if self.turn_index >= self.combatants.len() {
            self.turn_index = 0;
            self.round += 1;
        }
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.combatants.iter().map(Combatant::token).collect()
    }

    pub fn incapacitated_ids(&self) -> HashSet<EntityId> {
        self.combatants
            .iter()
            .filter(|c| c.conditions.is_incapacitated())
            .map(|c| c.id)
            .collect()
    }
}
