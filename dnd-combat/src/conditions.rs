//! Condition effect resolution for attack rolls.
//!
//! Turns the attacker's and target's conditions plus the spatial situation
//! into advantage/disadvantage sources, a roll mode, auto-crit and the
//! exhaustion penalty. Every contribution is collected first and the roll
//! mode is decided once at the end, so any advantage and any disadvantage
//! cancel to a normal roll no matter how many of each there are.
//!
//! Resolution is pure and must run fresh for every attack: conditions and
//! positions change from one attack to the next.

use crate::dice::RollMode;
use crate::world::{Condition, ConditionSet, EntityId};
use serde::{Deserialize, Serialize};

/// Penalty to d20 tests per level of exhaustion.
pub const EXHAUSTION_PENALTY_PER_LEVEL: i32 = 2;

/// Spatial and environmental facts for one attack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackConditionContext {
    pub is_ranged: bool,
    pub is_within_5ft: bool,
    pub any_enemy_within_5ft_of_attacker: bool,
    pub target_is_dodging: bool,
    pub target_entity_id: Option<EntityId>,
    pub attacker_grappler_entity_id: Option<EntityId>,
    pub is_underwater: bool,
    pub weapon_damage_type: Option<String>,
    pub attacker_has_swim_speed: bool,
    /// Name of an ally flanking the target with the attacker.
    pub flanking_ally: Option<String>,
    /// Crossbow Expert with a crossbow, or Sharpshooter.
    pub ignores_ranged_in_melee: bool,
}

impl AttackConditionContext {
    pub fn melee_adjacent() -> Self {
        Self {
            is_within_5ft: true,
            ..Self::default()
        }
    }

    pub fn ranged() -> Self {
        Self {
            is_ranged: true,
            ..Self::default()
        }
    }
}

/// Output of [`resolve_condition_effects`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEffectResult {
    pub advantage_sources: Vec<String>,
    pub disadvantage_sources: Vec<String>,
    pub roll_mode: RollMode,
    pub auto_crit: bool,
    pub attacker_cannot_act: bool,
    /// Which conditions stop the attacker from acting, for display.
    pub cannot_act_reasons: Vec<Condition>,
    pub exhaustion_penalty: i32,
}

impl ConditionEffectResult {
    /// Total flat modifier the caller adds to the d20.
    pub fn roll_penalty(&self) -> i32 {
        self.exhaustion_penalty
    }
}

/// Resolve every condition-driven effect on one attack roll.
///
/// Never early-returns: when the attacker can't act the remaining fields are
/// still filled in for display, and callers must refuse the attack.
pub fn resolve_condition_effects(
    attacker: &ConditionSet,
    target: &ConditionSet,
    context: &AttackConditionContext,
) -> ConditionEffectResult {
    let mut advantage = Vec::new();
    let mut disadvantage = Vec::new();
    let mut auto_crit = false;

    let cannot_act_reasons = attacker.incapacitating();
    let attacker_cannot_act = !cannot_act_reasons.is_empty();

    let exhaustion_penalty = -EXHAUSTION_PENALTY_PER_LEVEL * attacker.exhaustion_level() as i32;

    // Attacker conditions. Grappled only zeroes Speed.
    for (condition, label) in [
        (Condition::Blinded, "Attacker is Blinded"),
        (Condition::Frightened, "Attacker is Frightened"),
        (Condition::Poisoned, "Attacker is Poisoned"),
        (Condition::Prone, "Attacker is Prone"),
        (Condition::Restrained, "Attacker is Restrained"),
    ] {
        if attacker.has(condition) {
            disadvantage.push(label.to_string());
        }
    }
    if attacker.has(Condition::Invisible) {
        advantage.push("Attacker is Invisible".to_string());
    }

    // Target conditions.
    if target.has(Condition::Blinded) {
        advantage.push("Target is Blinded".to_string());
    }
    if target.has(Condition::Paralyzed) {
        advantage.push("Target is Paralyzed".to_string());
        auto_crit |= context.is_within_5ft;
    }
    if target.has(Condition::Petrified) {
        advantage.push("Target is Petrified".to_string());
    }
    if target.has(Condition::Prone) {
        if !context.is_ranged && context.is_within_5ft {
            advantage.push("Target is Prone (melee within 5 ft)".to_string());
        } else {
            disadvantage.push("Target is Prone (ranged or beyond 5 ft)".to_string());
        }
    }
    if target.has(Condition::Restrained) {
        advantage.push("Target is Restrained".to_string());
    }
    if target.has(Condition::Stunned) {
        advantage.push("Target is Stunned".to_string());
    }
    if target.has(Condition::Unconscious) {
        advantage.push("Target is Unconscious".to_string());
        auto_crit |= context.is_within_5ft;
    }

    if context.target_is_dodging {
        disadvantage.push("Target is Dodging".to_string());
    }

    if context.is_ranged
        && context.any_enemy_within_5ft_of_attacker
        && !context.ignores_ranged_in_melee
    {
        disadvantage.push("Ranged attack with an enemy within 5 ft".to_string());
    }

    if context.is_underwater {
        if context.is_ranged {
            disadvantage.push("Ranged attack underwater".to_string());
        } else {
            let piercing = context
                .weapon_damage_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("piercing"));
            if !piercing && !context.attacker_has_swim_speed {
                disadvantage.push("Melee attack underwater without a piercing weapon".to_string());
            }
        }
    }

    if let Some(ally) = &context.flanking_ally {
        if !context.is_ranged {
            advantage.push(format!("Flanking with {ally}"));
        }
    }

    let roll_mode = RollMode::from_sources(!advantage.is_empty(), !disadvantage.is_empty());

    tracing::debug!(
        ?roll_mode,
        advantage = advantage.len(),
        disadvantage = disadvantage.len(),
        auto_crit,
        attacker_cannot_act,
        exhaustion_penalty,
        "resolved condition effects"
    );

    ConditionEffectResult {
        advantage_sources: advantage,
        disadvantage_sources: disadvantage,
        roll_mode,
        auto_crit,
        attacker_cannot_act,
        cannot_act_reasons,
        exhaustion_penalty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none() -> ConditionSet {
        ConditionSet::new()
    }

    fn with(conditions: &[Condition]) -> ConditionSet {
        ConditionSet::from(conditions.to_vec())
    }

    #[test]
    fn test_no_conditions_is_normal() {
        let result = resolve_condition_effects(&none(), &none(), &AttackConditionContext::default());
        assert_eq!(result.roll_mode, RollMode::Normal);
        assert!(!result.auto_crit);
        assert!(!result.attacker_cannot_act);
        assert_eq!(result.exhaustion_penalty, 0);
        assert!(result.advantage_sources.is_empty());
        assert!(result.disadvantage_sources.is_empty());
    }

    #[test]
    fn test_paralyzed_target_auto_crit_only_adjacent() {
        let target = with(&[Condition::Paralyzed]);

        let close = resolve_condition_effects(&none(), &target, &AttackConditionContext::melee_adjacent());
        assert!(close.auto_crit);
        assert!(!close.advantage_sources.is_empty());
        assert_eq!(close.roll_mode, RollMode::Advantage);

        let far = resolve_condition_effects(&none(), &target, &AttackConditionContext::default());
        assert!(!far.auto_crit);
        assert!(!far.advantage_sources.is_empty());
    }

    #[test]
    fn test_unconscious_target_auto_crit() {
        let target = with(&[Condition::Unconscious]);
        let result = resolve_condition_effects(&none(), &target, &AttackConditionContext::melee_adjacent());
        assert!(result.auto_crit);
        assert_eq!(result.roll_mode, RollMode::Advantage);
    }

    #[test]
    fn test_poisoned_attacker_blinded_target_cancel() {
        let result = resolve_condition_effects(
            &with(&[Condition::Poisoned]),
            &with(&[Condition::Blinded]),
            &AttackConditionContext::default(),
        );
        assert_eq!(result.roll_mode, RollMode::Normal);
        assert!(!result.advantage_sources.is_empty());
        assert!(!result.disadvantage_sources.is_empty());
    }

    #[test]
    fn test_cancellation_ignores_counts() {
        // Three disadvantage sources against one advantage source.
        let result = resolve_condition_effects(
            &with(&[Condition::Poisoned, Condition::Blinded, Condition::Restrained]),
            &with(&[Condition::Stunned]),
            &AttackConditionContext::default(),
        );
        assert_eq!(result.disadvantage_sources.len(), 3);
        assert_eq!(result.advantage_sources.len(), 1);
        assert_eq!(result.roll_mode, RollMode::Normal);
    }

    #[test]
    fn test_exhaustion_penalty() {
        let attacker = with(&[Condition::Exhaustion(3)]);
        let result = resolve_condition_effects(&attacker, &none(), &AttackConditionContext::default());
        assert_eq!(result.exhaustion_penalty, -6);
        assert_eq!(result.roll_penalty(), -6);
        assert_eq!(result.roll_mode, RollMode::Normal);
    }

    #[test]
    fn test_incapacitated_attacker_still_resolves() {
        let attacker = with(&[Condition::Stunned, Condition::Poisoned]);
        let result = resolve_condition_effects(&attacker, &none(), &AttackConditionContext::default());
        assert!(result.attacker_cannot_act);
        assert_eq!(result.cannot_act_reasons, vec![Condition::Stunned]);
        assert_eq!(result.roll_mode, RollMode::Disadvantage);
    }

    #[test]
    fn test_grappled_attacker_has_no_penalty() {
        let attacker = with(&[Condition::Grappled]);
        let result = resolve_condition_effects(&attacker, &none(), &AttackConditionContext::default());
        assert_eq!(result.roll_mode, RollMode::Normal);
        assert!(result.disadvantage_sources.is_empty());
    }

    #[test]
    fn test_invisible_attacker_has_advantage() {
        let attacker = with(&[Condition::Invisible]);
        let result = resolve_condition_effects(&attacker, &none(), &AttackConditionContext::ranged());
        assert_eq!(result.roll_mode, RollMode::Advantage);
    }

    #[test]
    fn test_prone_target_depends_on_range() {
        let target = with(&[Condition::Prone]);

        let melee = resolve_condition_effects(&none(), &target, &AttackConditionContext::melee_adjacent());
        assert_eq!(melee.roll_mode, RollMode::Advantage);

        let ranged_ctx = AttackConditionContext {
            is_ranged: true,
            is_within_5ft: true,
            ..Default::default()
        };
        let ranged = resolve_condition_effects(&none(), &target, &ranged_ctx);
        assert_eq!(ranged.roll_mode, RollMode::Disadvantage);

        // Reach weapon from 10 ft away.
        let reach = resolve_condition_effects(&none(), &target, &AttackConditionContext::default());
        assert_eq!(reach.roll_mode, RollMode::Disadvantage);
    }

    #[test]
    fn test_dodging_target() {
        let ctx = AttackConditionContext {
            target_is_dodging: true,
            ..AttackConditionContext::melee_adjacent()
        };
        let result = resolve_condition_effects(&none(), &none(), &ctx);
        assert_eq!(result.roll_mode, RollMode::Disadvantage);
        assert_eq!(result.disadvantage_sources, vec!["Target is Dodging".to_string()]);
    }

    #[test]
    fn test_ranged_in_melee() {
        let ctx = AttackConditionContext {
            any_enemy_within_5ft_of_attacker: true,
            ..AttackConditionContext::ranged()
        };
        let result = resolve_condition_effects(&none(), &none(), &ctx);
        assert_eq!(result.roll_mode, RollMode::Disadvantage);

        let expert = AttackConditionContext {
            ignores_ranged_in_melee: true,
            ..ctx.clone()
        };
        let result = resolve_condition_effects(&none(), &none(), &expert);
        assert_eq!(result.roll_mode, RollMode::Normal);

        // An adjacent enemy doesn't matter for melee attacks.
        let melee = AttackConditionContext {
            is_ranged: false,
            ..ctx
        };
        let result = resolve_condition_effects(&none(), &none(), &melee);
        assert_eq!(result.roll_mode, RollMode::Normal);
    }

    #[test]
    fn test_underwater_melee() {
        let slashing = AttackConditionContext {
            is_underwater: true,
            weapon_damage_type: Some("slashing".to_string()),
            ..AttackConditionContext::melee_adjacent()
        };
        let result = resolve_condition_effects(&none(), &none(), &slashing);
        assert_eq!(result.roll_mode, RollMode::Disadvantage);

        let piercing = AttackConditionContext {
            weapon_damage_type: Some("piercing".to_string()),
            ..slashing.clone()
        };
        let result = resolve_condition_effects(&none(), &none(), &piercing);
        assert!(result.disadvantage_sources.is_empty());

        let swimmer = AttackConditionContext {
            attacker_has_swim_speed: true,
            ..slashing
        };
        let result = resolve_condition_effects(&none(), &none(), &swimmer);
        assert!(result.disadvantage_sources.is_empty());
    }

    #[test]
    fn test_underwater_ranged_always_disadvantage() {
        let ctx = AttackConditionContext {
            is_underwater: true,
            weapon_damage_type: Some("piercing".to_string()),
            attacker_has_swim_speed: true,
            ..AttackConditionContext::ranged()
        };
        let result = resolve_condition_effects(&none(), &none(), &ctx);
        assert_eq!(result.roll_mode, RollMode::Disadvantage);
    }

    #[test]
    fn test_flanking_melee_only() {
        let melee = AttackConditionContext {
            flanking_ally: Some("Bree".to_string()),
            ..AttackConditionContext::melee_adjacent()
        };
        let result = resolve_condition_effects(&none(), &none(), &melee);
        assert_eq!(result.advantage_sources, vec!["Flanking with Bree".to_string()]);

        let ranged = AttackConditionContext {
            is_ranged: true,
            ..melee
        };
        let result = resolve_condition_effects(&none(), &none(), &ranged);
        assert!(result.advantage_sources.is_empty());
    }

    #[test]
    fn test_each_attacker_condition_labels_its_source() {
        let cases = [
            (Condition::Blinded, "Attacker is Blinded", RollMode::Disadvantage),
            (Condition::Frightened, "Attacker is Frightened", RollMode::Disadvantage),
            (Condition::Poisoned, "Attacker is Poisoned", RollMode::Disadvantage),
            (Condition::Prone, "Attacker is Prone", RollMode::Disadvantage),
            (Condition::Restrained, "Attacker is Restrained", RollMode::Disadvantage),
            (Condition::Invisible, "Attacker is Invisible", RollMode::Advantage),
        ];
        for (condition, label, mode) in cases {
            let result = resolve_condition_effects(
                &with(&[condition]),
                &none(),
                &AttackConditionContext::melee_adjacent(),
            );
            let (expected, other) = match mode {
                RollMode::Advantage => (&result.advantage_sources, &result.disadvantage_sources),
                _ => (&result.disadvantage_sources, &result.advantage_sources),
            };
            assert_eq!(expected, &vec![label.to_string()], "{condition}");
            assert!(other.is_empty(), "{condition}");
            assert_eq!(result.roll_mode, mode, "{condition}");
        }
    }

    #[test]
    fn test_each_target_condition_labels_its_source() {
        let cases = [
            (Condition::Blinded, "Target is Blinded"),
            (Condition::Paralyzed, "Target is Paralyzed"),
            (Condition::Petrified, "Target is Petrified"),
            (Condition::Prone, "Target is Prone (melee within 5 ft)"),
            (Condition::Restrained, "Target is Restrained"),
            (Condition::Stunned, "Target is Stunned"),
            (Condition::Unconscious, "Target is Unconscious"),
        ];
        for (condition, label) in cases {
            let result = resolve_condition_effects(
                &none(),
                &with(&[condition]),
                &AttackConditionContext::melee_adjacent(),
            );
            assert_eq!(result.advantage_sources, vec![label.to_string()], "{condition}");
            assert!(result.disadvantage_sources.is_empty(), "{condition}");
            assert_eq!(result.roll_mode, RollMode::Advantage, "{condition}");
        }
    }

    #[test]
    fn test_dodging_target_and_ranged_in_melee_label_sources() {
        let dodging = resolve_condition_effects(
            &none(),
            &none(),
            &AttackConditionContext {
                target_is_dodging: true,
                ..AttackConditionContext::melee_adjacent()
            },
        );
        assert_eq!(dodging.disadvantage_sources, vec!["Target is Dodging".to_string()]);

        let crowded = resolve_condition_effects(
            &none(),
            &none(),
            &AttackConditionContext {
                any_enemy_within_5ft_of_attacker: true,
                ..AttackConditionContext::ranged()
            },
        );
        assert_eq!(
            crowded.disadvantage_sources,
            vec!["Ranged attack with an enemy within 5 ft".to_string()]
        );
    }

    #[test]
    fn test_source_order_follows_rule_order() {
        let result = resolve_condition_effects(
            &with(&[Condition::Restrained, Condition::Blinded]),
            &with(&[Condition::Prone]),
            &AttackConditionContext {
                target_is_dodging: true,
                ..AttackConditionContext::ranged()
            },
        );
        assert_eq!(
            result.disadvantage_sources,
            vec![
                "Attacker is Blinded".to_string(),
                "Attacker is Restrained".to_string(),
                "Target is Prone (ranged or beyond 5 ft)".to_string(),
                "Target is Dodging".to_string(),
            ]
        );
    }
}
