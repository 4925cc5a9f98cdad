//! Dice rolling primitive.
//!
//! The combat engine only decides *whether* to roll twice ([`RollMode`]);
//! the dice themselves come from a [`DiceRoller`]. [`RngDice`] is the
//! RNG-backed roller the host uses, and `testing::ScriptedDice` replays
//! fixed values for tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
    #[error("Too many dice: {0}")]
    TooManyDice(u32),
}

/// Most dice one component of a damage expression may roll.
pub const MAX_DICE_COUNT: u32 = 100;

/// Whether a d20 is rolled once, or twice keeping the higher or lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RollMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl RollMode {
    /// Decide the mode from whether any advantage and any disadvantage exist.
    /// Both present cancel to `Normal`, regardless of how many of each.
    pub fn from_sources(any_advantage: bool, any_disadvantage: bool) -> RollMode {
        match (any_advantage, any_disadvantage) {
            (true, false) => RollMode::Advantage,
            (false, true) => RollMode::Disadvantage,
            _ => RollMode::Normal,
        }
    }

    /// Combine two modes (advantage + disadvantage = normal).
    pub fn combine(self, other: RollMode) -> RollMode {
        match (self, other) {
            (RollMode::Normal, x) | (x, RollMode::Normal) => x,
            (a, b) if a == b => a,
            _ => RollMode::Normal,
        }
    }
}

/// Standard D&D die types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DieType {
    pub fn sides(&self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
            DieType::D100 => 100,
        }
    }

    pub fn from_sides(sides: u32) -> Option<DieType> {
        match sides {
            4 => Some(DieType::D4),
            6 => Some(DieType::D6),
            8 => Some(DieType::D8),
            10 => Some(DieType::D10),
            12 => Some(DieType::D12),
            20 => Some(DieType::D20),
            100 => Some(DieType::D100),
            _ => None,
        }
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// A single die component of a damage expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceComponent {
    pub count: u32,
    pub die_type: DieType,
}

/// Weapon damage dice, e.g. `2d6`, `1d8+1` or a flat `1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDice {
    pub components: Vec<DiceComponent>,
    pub modifier: i32,
}

impl DamageDice {
    /// Parse damage notation.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim().to_lowercase();
        if notation.is_empty() {
            return Err(DiceError::NoDice);
        }

        let mut components = Vec::new();
        let mut modifier: i32 = 0;
        let mut current = String::new();
        let mut sign: i32 = 1;

        for ch in notation.chars() {
            match ch {
                '+' | '-' => {
                    if !current.is_empty() {
                        Self::parse_component(&current, sign, &mut components, &mut modifier)?;
                        current.clear();
                    }
                    sign = if ch == '+' { 1 } else { -1 };
                }
                ' ' => continue,
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            Self::parse_component(&current, sign, &mut components, &mut modifier)?;
        }

        if components.is_empty() && modifier == 0 {
            return Err(DiceError::NoDice);
        }

        Ok(DamageDice {
            components,
            modifier,
        })
    }

    fn parse_component(
        s: &str,
        sign: i32,
        components: &mut Vec<DiceComponent>,
        modifier: &mut i32,
    ) -> Result<(), DiceError> {
        if let Some((count_str, sides_str)) = s.split_once('d') {
            if sign < 0 {
                return Err(DiceError::InvalidNotation(s.to_string()));
            }
            let count: u32 = if count_str.is_empty() {
                1
            } else {
                count_str
                    .parse()
                    .map_err(|_| DiceError::InvalidNotation(s.to_string()))?
            };
            let sides: u32 = sides_str
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
            if count > MAX_DICE_COUNT {
                return Err(DiceError::TooManyDice(count));
            }
            let die_type = DieType::from_sides(sides).ok_or(DiceError::InvalidDieSize(sides))?;
            components.push(DiceComponent { count, die_type });
        } else {
            let value: i32 = s
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
            *modifier = modifier
                .checked_add(sign * value)
                .ok_or_else(|| DiceError::InvalidNotation(s.to_string()))?;
        }
        Ok(())
    }

    /// Critical hit damage: every die is rolled twice, flat amounts are not.
    pub fn doubled(&self) -> Self {
        Self {
            components: self
                .components
                .iter()
                .map(|c| DiceComponent {
                    count: c.count.saturating_mul(2),
                    die_type: c.die_type,
                })
                .collect(),
            modifier: self.modifier,
        }
    }

    pub fn has_dice(&self) -> bool {
        self.components.iter().any(|c| c.count > 0)
    }

    /// Roll every component with `roller`.
    ///
    /// Components built by hand rather than parsed are capped at twice
    /// [`MAX_DICE_COUNT`] dice, the size of a doubled critical.
    pub fn roll<D: DiceRoller + ?Sized>(&self, roller: &mut D) -> RollResult {
        let cap = MAX_DICE_COUNT * 2;
        let rolls: Vec<u32> = self
            .components
            .iter()
            .flat_map(|c| std::iter::repeat(c.die_type.sides()).take(c.count.min(cap) as usize))
            .map(|sides| roller.roll_die(sides))
            .collect();
        let total = roll_total(&rolls, self.modifier);
        RollResult {
            kept: rolls.clone(),
            rolls,
            modifier: self.modifier,
            total,
            mode: RollMode::Normal,
        }
    }
}

impl FromStr for DamageDice {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DamageDice::parse(s)
    }
}

impl fmt::Display for DamageDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dice: Vec<String> = self
            .components
            .iter()
            .map(|c| format!("{}{}", c.count, c.die_type))
            .collect();
        match (dice.is_empty(), self.modifier) {
            (true, m) => write!(f, "{m}"),
            (false, 0) => write!(f, "{}", dice.join("+")),
            (false, m) if m > 0 => write!(f, "{}+{m}", dice.join("+")),
            (false, m) => write!(f, "{}-{}", dice.join("+"), m.abs()),
        }
    }
}

/// Result of a roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// Every die rolled, including the discarded one of an advantage pair.
    pub rolls: Vec<u32>,
    pub kept: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
    pub mode: RollMode,
}

impl RollResult {
    /// The kept die when exactly one die counts, e.g. a d20.
    pub fn natural(&self) -> Option<u32> {
        match self.kept.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }

    pub fn is_natural_20(&self) -> bool {
        self.natural() == Some(20)
    }

    pub fn is_natural_1(&self) -> bool {
        self.natural() == Some(1)
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: Vec<String> = self.rolls.iter().map(|r| r.to_string()).collect();
        write!(f, "[{}]", shown.join(", "))?;
        match self.modifier {
            0 => {}
            m if m > 0 => write!(f, " + {m}")?,
            m => write!(f, " - {}", m.abs())?,
        }
        write!(f, " = {}", self.total)
    }
}

/// Sum of the dice plus `modifier`, saturating at the bounds of `i32`.
fn roll_total(dice: &[u32], modifier: i32) -> i32 {
    let sum: i64 = dice.iter().map(|&d| i64::from(d)).sum::<i64>() + i64::from(modifier);
    sum.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// The dice primitive.
pub trait DiceRoller {
    /// Roll one die with `sides` faces.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Roll `count` dice of `sides` plus `modifier`. A non-normal mode on a
    /// single die rolls it twice and keeps the higher or lower; it has no
    /// effect on multi-die rolls.
    fn roll(&mut self, count: u32, sides: u32, modifier: i32, mode: RollMode) -> RollResult {
        if count == 1 && mode != RollMode::Normal {
            let first = self.roll_die(sides);
            let second = self.roll_die(sides);
            let chosen = match mode {
                RollMode::Advantage => first.max(second),
                _ => first.min(second),
            };
            return RollResult {
                rolls: vec![first, second],
                kept: vec![chosen],
                modifier,
                total: roll_total(&[chosen], modifier),
                mode,
            };
        }

        let rolls: Vec<u32> = (0..count).map(|_| self.roll_die(sides)).collect();
        let total = roll_total(&rolls, modifier);
        RollResult {
            kept: rolls.clone(),
            rolls,
            modifier,
            total,
            mode: RollMode::Normal,
        }
    }

    fn roll_d20(&mut self, modifier: i32, mode: RollMode) -> RollResult {
        self.roll(1, 20, modifier, mode)
    }
}

impl<D: DiceRoller + ?Sized> DiceRoller for &mut D {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

/// Dice backed by a random number generator.
#[derive(Debug, Clone)]
pub struct RngDice<R = StdRng> {
    rng: R,
}

impl RngDice<StdRng> {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible dice, useful for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RngDice<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RngDice<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DiceRoller for RngDice<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides.max(1))
    }
}
