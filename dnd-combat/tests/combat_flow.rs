//! End-to-end combat scenarios through the controller.
//!
//! Run with: `cargo test -p dnd-combat --test combat_flow`

use dnd_combat::combat::fresh_tracker;
use dnd_combat::conditions::AttackConditionContext;
use dnd_combat::items::get_weapon;
use dnd_combat::modifiers::{AbilityModifiers, AttackKind};
use dnd_combat::testing::{sample_fighter, sample_goblin, sample_rogue, ScriptedDice};
use dnd_combat::tracker::Wielding;
use dnd_combat::world::{ActiveCondition, CharacterClass, ClassLevel, CombatFeatures, Side};
use dnd_combat::*;

fn encounter(combatants: Vec<Combatant>) -> (Encounter, Vec<EntityId>) {
    let mut encounter = Encounter::new();
    let ids = combatants
        .into_iter()
        .map(|c| encounter.add_combatant(c))
        .collect();
    (encounter, ids)
}

// =============================================================================
// Resolver scenarios
// =============================================================================

#[test]
fn test_no_conditions_is_a_plain_roll() {
    let context = AttackConditionContext::default();
    let result = resolve_condition_effects(&ConditionSet::new(), &ConditionSet::new(), &context);
    assert_eq!(result.roll_mode, RollMode::Normal);
    assert!(!result.auto_crit);
    assert!(!result.attacker_cannot_act);
    assert_eq!(result.exhaustion_penalty, 0);
}

#[test]
fn test_paralyzed_target_auto_crit_only_adjacent() {
    let target = ConditionSet::new().with(Condition::Paralyzed);

    let near = resolve_condition_effects(
        &ConditionSet::new(),
        &target,
        &AttackConditionContext::melee_adjacent(),
    );
    assert!(near.auto_crit);
    assert!(!near.advantage_sources.is_empty());

    let far = resolve_condition_effects(&ConditionSet::new(), &target, &AttackConditionContext::default());
    assert!(!far.auto_crit);
    assert_eq!(far.roll_mode, RollMode::Advantage);
}

#[test]
fn test_poisoned_attacker_blinded_target_cancel() {
    let result = resolve_condition_effects(
        &ConditionSet::new().with(Condition::Poisoned),
        &ConditionSet::new().with(Condition::Blinded),
        &AttackConditionContext::default(),
    );
    assert_eq!(result.roll_mode, RollMode::Normal);
    assert!(!result.advantage_sources.is_empty());
    assert!(!result.disadvantage_sources.is_empty());
}

#[test]
fn test_prone_target_melee_versus_ranged() {
    let prone = ConditionSet::new().with(Condition::Prone);

    let melee = resolve_condition_effects(
        &ConditionSet::new(),
        &prone,
        &AttackConditionContext::melee_adjacent(),
    );
    assert_eq!(melee.roll_mode, RollMode::Advantage);

    let ranged = AttackConditionContext {
        is_within_5ft: true,
        ..AttackConditionContext::ranged()
    };
    let ranged = resolve_condition_effects(&ConditionSet::new(), &prone, &ranged);
    assert_eq!(ranged.roll_mode, RollMode::Disadvantage);
}

#[test]
fn test_exhaustion_level_three() {
    let attacker = ConditionSet::new().with(Condition::Exhaustion(3));
    let result = resolve_condition_effects(&attacker, &ConditionSet::new(), &AttackConditionContext::default());
    assert_eq!(result.exhaustion_penalty, -6);
}

#[test]
fn test_underwater_piercing_exception() {
    let club = AttackConditionContext {
        is_underwater: true,
        weapon_damage_type: Some("bludgeoning".to_string()),
        ..AttackConditionContext::melee_adjacent()
    };
    let result = resolve_condition_effects(&ConditionSet::new(), &ConditionSet::new(), &club);
    assert_eq!(result.roll_mode, RollMode::Disadvantage);

    let spear = AttackConditionContext {
        weapon_damage_type: Some("piercing".to_string()),
        ..club
    };
    let result = resolve_condition_effects(&ConditionSet::new(), &ConditionSet::new(), &spear);
    assert!(result.disadvantage_sources.is_empty());
}

// =============================================================================
// Modifiers and trackers
// =============================================================================

#[test]
fn test_unarmed_strike_modifiers() {
    let weapon = WeaponContext::unarmed();
    let inputs = ModifierInputs {
        attack_kind: AttackKind::Unarmed,
        ..ModifierInputs::new(AbilityModifiers::new(3, 0), &weapon, 2)
    };
    assert_eq!(attack_modifier(&inputs, &NoEffects), 5);
    assert_eq!(damage_modifier(&inputs, &NoEffects), 4);
}

#[test]
fn test_fighter_extra_attacks() {
    assert_eq!(extra_attack_count(CharacterClass::Fighter, 4, None), 1);
    assert_eq!(extra_attack_count(CharacterClass::Fighter, 11, None), 3);
    assert_eq!(extra_attack_count(CharacterClass::Fighter, 20, None), 4);
}

#[test]
fn test_tracker_never_exceeds_max() {
    let mut tracker = fresh_tracker(&sample_fighter().with_class(ClassLevel::new(CharacterClass::Fighter, 5)));
    for _ in 0..3 {
        tracker = tracker.use_attack();
    }
    assert_eq!(tracker.attacks_used, tracker.max_attacks);
    assert_eq!(tracker.max_attacks, 2);
}

#[test]
fn test_bonus_attacks_do_not_stack() {
    let shortsword = get_weapon("Shortsword").unwrap();
    let spear = get_weapon("Spear").unwrap();
    let features = CombatFeatures::POLEARM_MASTER | CombatFeatures::DUAL_WIELDER;

    let twf = Wielding::new(Some(&shortsword), Some(&shortsword));
    assert_eq!(bonus_attack_count(CombatFeatures::empty(), twf), 1);

    let polearm = Wielding::new(Some(&spear), None);
    assert_eq!(bonus_attack_count(CombatFeatures::POLEARM_MASTER, polearm), 1);

    let both = Wielding::new(Some(&spear), Some(&shortsword));
    assert_eq!(bonus_attack_count(features, both), 1);
}

// =============================================================================
// Full turns
// =============================================================================

#[test]
fn test_two_rounds_of_melee() {
    let fighter = sample_fighter()
        .at(0, 0)
        .with_class(ClassLevel::new(CharacterClass::Fighter, 5));
    let goblin = sample_goblin().at(1, 0);
    let (encounter, ids) = encounter(vec![fighter, goblin]);
    let (roland, goblin) = (ids[0], ids[1]);
    let mut combat = CombatController::new(CombatRules::default(), encounter);

    // Round 1: two swings, then the goblin's turn.
    let mut dice = ScriptedDice::new([14, 5, 3]);
    assert_eq!(combat.begin_turn(roland).unwrap().max_attacks, 2);
    let first = combat.attack(&AttackRequest::new(roland, goblin), &mut dice).unwrap();
    assert!(first.hit);
    assert_eq!(first.damage, 8);
    let second = combat.attack(&AttackRequest::new(roland, goblin), &mut dice).unwrap();
    assert!(!second.hit);
    assert!(matches!(
        combat.attack(&AttackRequest::new(roland, goblin), &mut dice),
        Err(CombatError::NoAttacksRemaining(_))
    ));
    assert_eq!(combat.end_turn(), Some(goblin));

    // The goblin dodges instead of attacking.
    combat.begin_turn(goblin).unwrap();
    combat.set_dodging(goblin, true).unwrap();
    assert_eq!(combat.end_turn(), Some(roland));
    assert_eq!(combat.encounter().round, 2);

    // Round 2: attacks against the dodging goblin have disadvantage.
    combat.begin_turn(roland).unwrap();
    let mut dice = ScriptedDice::new([18, 6, 2]);
    let outcome = combat.attack(&AttackRequest::new(roland, goblin), &mut dice).unwrap();
    assert_eq!(outcome.conditions.roll_mode, RollMode::Disadvantage);
    assert_eq!(outcome.attack_roll.total, 11);
    assert!(!outcome.hit);
}

#[test]
fn test_rogue_two_weapon_turn() {
    let (encounter, ids) = encounter(vec![sample_rogue().at(0, 0), sample_goblin().at(0, 1)]);
    let mut combat = CombatController::new(CombatRules::default(), encounter);
    let mut dice = ScriptedDice::new([16, 6, 16, 6]);

    let tracker = combat.begin_turn(ids[0]).unwrap();
    assert_eq!((tracker.max_attacks, tracker.bonus_attacks), (1, 1));

    let main = combat.attack(&AttackRequest::new(ids[0], ids[1]), &mut dice).unwrap();
    let off = combat
        .attack(&AttackRequest::new(ids[0], ids[1]).with_hand(Hand::OffHand), &mut dice)
        .unwrap();
    assert_eq!(main.damage, 9);
    assert_eq!(off.damage, 6);
    assert!(!off.tracker.has_attacks_remaining());
    assert!(!off.tracker.has_bonus_attacks_remaining());
}

#[test]
fn test_unconscious_target_takes_a_critical() {
    let goblin = sample_goblin()
        .at(1, 1)
        .with_condition(ActiveCondition::new(Condition::Unconscious));
    let (encounter, ids) = encounter(vec![sample_fighter().at(0, 0), goblin]);
    let mut combat = CombatController::new(CombatRules::default(), encounter);
    let mut dice = ScriptedDice::new([9, 2, 5, 5]);

    let outcome = combat.attack(&AttackRequest::new(ids[0], ids[1]), &mut dice).unwrap();
    assert!(outcome.conditions.auto_crit);
    assert!(outcome.critical);
    assert_eq!(outcome.damage, 13);
    assert!(outcome.narrative.contains("Critical hit"));
}

#[test]
fn test_flanking_table_rule() {
    let ally = Combatant::new("Bree", Side::Party).at(1, 2);
    let (encounter, ids) = encounter(vec![sample_fighter().at(1, 0), sample_goblin().at(1, 1), ally]);
    let rules = CombatRules {
        flanking: true,
        ..CombatRules::default()
    };
    let mut combat = CombatController::new(rules, encounter);

    let mut dice = ScriptedDice::new([3, 12, 2]);
    let outcome = combat.attack(&AttackRequest::new(ids[0], ids[1]), &mut dice).unwrap();
    assert_eq!(outcome.conditions.roll_mode, RollMode::Advantage);
    assert_eq!(outcome.attack_roll.total, 17);

    // A knocked-out ally no longer flanks.
    combat
        .add_condition(ids[2], ActiveCondition::new(Condition::Unconscious))
        .unwrap();
    combat.begin_turn(ids[0]).unwrap();
    let mut dice = ScriptedDice::new([3]);
    let outcome = combat.attack(&AttackRequest::new(ids[0], ids[1]), &mut dice).unwrap();
    assert_eq!(outcome.conditions.roll_mode, RollMode::Normal);
}
