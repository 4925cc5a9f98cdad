//! Error types for the controller, the session host and configuration.
//!
//! The rule functions themselves never fail; these only cover refusing an
//! action and the plumbing around it.

use crate::dice::DiceError;
use crate::world::{Condition, EntityId};
use thiserror::Error;

/// Why the controller refused an attack.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CombatError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),

    #[error("{name} cannot act ({})", format_conditions(.reasons))]
    AttackerCannotAct { name: String, reasons: Vec<Condition> },

    #[error("{0} has no attacks remaining this turn")]
    NoAttacksRemaining(String),

    #[error("{0} has no bonus attacks remaining this turn")]
    NoBonusAttacksRemaining(String),

    #[error("{0} has no bonus attack available with that weapon")]
    NoBonusAttackAvailable(String),

    #[error("{0} needs a free off hand to grip with both hands")]
    NoFreeHand(String),

    #[error("{name} has no weapon in the {hand}")]
    NoWeaponInHand { name: String, hand: &'static str },

    #[error("Invalid damage dice: {0}")]
    InvalidDamageDice(#[from] DiceError),
}

fn format_conditions(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors talking to a running host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Combat host has stopped")]
    Stopped,

    #[error("Combat host dropped the reply")]
    ReplyDropped,

    #[error("Action rejected: {0}")]
    Rejected(#[from] CombatError),
}

/// Errors loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
