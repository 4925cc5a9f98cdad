//! D&D 5e (2024) combat resolution engine.
//!
//! This crate provides:
//! - Condition effects on attack rolls (advantage, disadvantage, auto-crit, exhaustion)
//! - Attack and damage modifiers from abilities, proficiency, fighting styles and feats
//! - Per-turn attack tracking with Extra Attack, two-weapon fighting and Polearm Master
//! - Optional flanking on a square grid
//! - A host-authoritative session that serializes actions and broadcasts outcomes
//!
//! The rule functions are pure; dice and active magic bonuses come in through
//! the [`DiceRoller`] and [`ResolvedEffects`] traits.
//!
//! # Quick Start
//!
//! ```ignore
//! use dnd_combat::testing::{sample_fighter, sample_goblin};
//! use dnd_combat::{AttackRequest, CombatHost, Encounter, HostConfig, RngDice};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut encounter = Encounter::new();
//!     let fighter = encounter.add_combatant(sample_fighter().at(0, 0));
//!     let goblin = encounter.add_combatant(sample_goblin().at(1, 0));
//!
//!     let host = CombatHost::spawn(HostConfig::default(), encounter, RngDice::new());
//!     host.begin_turn(fighter).await?;
//!
//!     let outcome = host.attack(AttackRequest::new(fighter, goblin)).await?;
//!     println!("{}", outcome.narrative);
//!
//!     host.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod combat;
pub mod conditions;
pub mod config;
pub mod dice;
pub mod effects;
pub mod error;
pub mod flanking;
pub mod host;
pub mod items;
pub mod modifiers;
pub mod testing;
pub mod tracker;
pub mod weapon;
pub mod world;

// Primary public API
pub use combat::{AttackOutcome, AttackRequest, CombatController, Hand};
pub use conditions::{resolve_condition_effects, AttackConditionContext, ConditionEffectResult};
pub use config::{CombatRules, HostConfig};
pub use dice::{DamageDice, DiceRoller, RngDice, RollMode, RollResult};
pub use effects::{EffectLedger, NoEffects, ResolvedEffects};
pub use error::{CombatError, ConfigError, HostError};
pub use flanking::check_flanking;
pub use host::{CombatHost, HostHandle, SessionEvent};
pub use modifiers::{attack_modifier, damage_modifier, ModifierInputs};
pub use tracker::{bonus_attack_count, extra_attack_count, AttackTracker};
pub use weapon::WeaponContext;
pub use world::{Combatant, Condition, ConditionSet, Encounter, EntityId};
