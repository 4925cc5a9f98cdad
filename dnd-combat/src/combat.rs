//! Combat-turn controller.
//!
//! Runs one attack end to end against the host's [`Encounter`]: pick the
//! weapon, resolve conditions, check the attack tracker, compute modifiers,
//! roll, and record the spent attack. Nothing is written back unless the
//! attack is allowed, so a refused request leaves the encounter untouched.

use crate::conditions::{resolve_condition_effects, AttackConditionContext, ConditionEffectResult};
use crate::config::CombatRules;
use crate::dice::{DamageDice, DiceRoller, RollMode, RollResult};
use crate::error::CombatError;
use crate::flanking::{any_enemy_within_5ft, check_flanking};
use crate::modifiers::{attack_modifier, damage_modifier, AbilityModifiers, AttackKind, ModifierInputs};
use crate::tracker::{
    bonus_attack_count, extra_attack_count_for, polearm_master_eligible,
    two_weapon_fighting_eligible, AttackTracker, Wielding,
};
use crate::weapon::WeaponContext;
use crate::world::{
    ActiveCondition, CombatFeatures, Combatant, Condition, DamageType, Encounter, EntityId,
    GridPosition,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Damage of a polearm's butt end.
pub const POLEARM_BUTT_DICE: &str = "1d4";

/// What the attacker strikes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Hand {
    #[default]
    MainHand,
    /// Two-weapon fighting with the off-hand weapon.
    OffHand,
    /// Polearm Master's bonus attack with the other end of the main-hand polearm.
    PolearmButt,
    /// The main-hand weapon held in both hands, rolling its Versatile die.
    TwoHanded,
    Unarmed,
}

impl Hand {
    /// Bonus-action strikes draw on the tracker's bonus pool.
    pub fn is_bonus_attack(&self) -> bool {
        matches!(self, Hand::OffHand | Hand::PolearmButt)
    }

    fn label(&self) -> &'static str {
        match self {
            Hand::MainHand | Hand::PolearmButt => "main hand",
            Hand::OffHand => "off hand",
            Hand::TwoHanded => "both hands",
            Hand::Unarmed => "empty hand",
        }
    }
}

/// An action request as it arrives from a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRequest {
    pub attacker: EntityId,
    pub target: EntityId,
    #[serde(default)]
    pub hand: Hand,
    /// Throw a weapon with the Thrown property instead of swinging it.
    #[serde(default)]
    pub thrown: bool,
}

impl AttackRequest {
    pub fn new(attacker: EntityId, target: EntityId) -> Self {
        Self {
            attacker,
            target,
            hand: Hand::MainHand,
            thrown: false,
        }
    }

    pub fn with_hand(mut self, hand: Hand) -> Self {
        self.hand = hand;
        self
    }

    pub fn thrown(mut self) -> Self {
        self.thrown = true;
        self
    }
}

/// Everything the host computed for one attack. Observers render this as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub attacker: EntityId,
    pub attacker_name: String,
    pub target: EntityId,
    pub target_name: String,
    pub hand: Hand,
    pub weapon_name: String,
    pub weapon: WeaponContext,
    pub conditions: ConditionEffectResult,
    pub attack_modifier: i32,
    /// Total includes the attack modifier and the exhaustion penalty.
    pub attack_roll: RollResult,
    pub target_ac: u8,
    pub hit: bool,
    pub critical: bool,
    pub damage_modifier: i32,
    /// Dice rolled for damage. `None` on a miss and for flat damage.
    pub damage_roll: Option<RollResult>,
    pub damage: i32,
    pub damage_type: Option<DamageType>,
    /// Tracker after this attack was spent.
    pub tracker: AttackTracker,
    pub narrative: String,
}

/// The weapon chosen for one attack.
struct Strike {
    name: String,
    context: WeaponContext,
    dice: Option<DamageDice>,
    kind: AttackKind,
    proficient: bool,
    offhand: bool,
}

impl Strike {
    fn choose(attacker: &Combatant, hand: Hand, thrown: bool) -> Result<Self, CombatError> {
        let wielding = Wielding::new(attacker.main_hand.as_ref(), attacker.off_hand.as_ref());
        let no_weapon = || CombatError::NoWeaponInHand {
            name: attacker.name.clone(),
            hand: hand.label(),
        };
        let no_bonus = || CombatError::NoBonusAttackAvailable(attacker.name.clone());

        match hand {
            Hand::Unarmed => Ok(Self {
                name: "Unarmed Strike".to_string(),
                context: WeaponContext::unarmed(),
                dice: None,
                kind: AttackKind::Unarmed,
                proficient: true,
                offhand: false,
            }),
            Hand::MainHand => {
                let weapon = attacker.main_hand.as_ref().ok_or_else(no_weapon)?;
                Ok(Self {
                    name: weapon.name.clone(),
                    context: WeaponContext::for_weapon(weapon, thrown),
                    dice: Some(DamageDice::parse(&weapon.damage_dice)?),
                    kind: AttackKind::Weapon,
                    proficient: attacker.proficiencies.covers(weapon),
                    offhand: false,
                })
            }
            Hand::TwoHanded => {
                let weapon = attacker.main_hand.as_ref().ok_or_else(no_weapon)?;
                if attacker.off_hand.is_some() {
                    return Err(CombatError::NoFreeHand(attacker.name.clone()));
                }
                let dice = weapon.versatile_damage().unwrap_or(&weapon.damage_dice);
                Ok(Self {
                    name: weapon.name.clone(),
                    context: WeaponContext {
                        is_two_handed: true,
                        ..WeaponContext::for_weapon(weapon, thrown)
                    },
                    dice: Some(DamageDice::parse(dice)?),
                    kind: AttackKind::Weapon,
                    proficient: attacker.proficiencies.covers(weapon),
                    offhand: false,
                })
            }
            Hand::OffHand => {
                let weapon = attacker.off_hand.as_ref().ok_or_else(no_weapon)?;
                if !two_weapon_fighting_eligible(attacker.features, wielding) {
                    return Err(no_bonus());
                }
                Ok(Self {
                    name: weapon.name.clone(),
                    context: WeaponContext::for_weapon(weapon, thrown),
                    dice: Some(DamageDice::parse(&weapon.damage_dice)?),
                    kind: AttackKind::Weapon,
                    proficient: attacker.proficiencies.covers(weapon),
                    offhand: true,
                })
            }
            Hand::PolearmButt => {
                let weapon = attacker.main_hand.as_ref().ok_or_else(no_weapon)?;
                if !polearm_master_eligible(attacker.features, wielding) {
                    return Err(no_bonus());
                }
                Ok(Self {
                    name: format!("{} (butt end)", weapon.name),
                    context: WeaponContext {
                        damage_type: Some(DamageType::Bludgeoning),
                        ..WeaponContext::for_weapon(weapon, false)
                    },
                    dice: Some(DamageDice::parse(POLEARM_BUTT_DICE)?),
                    kind: AttackKind::Weapon,
                    proficient: attacker.proficiencies.covers(weapon),
                    offhand: false,
                })
            }
        }
    }
}

/// Tracker for a combatant starting a turn.
pub fn fresh_tracker(combatant: &Combatant) -> AttackTracker {
    let wielding = Wielding::new(combatant.main_hand.as_ref(), combatant.off_hand.as_ref());
    let bonus = bonus_attack_count(combatant.features, wielding);
    match combatant.multiattack {
        Some(attacks) => AttackTracker::multiattack(combatant.id, attacks, bonus),
        None => AttackTracker::new(combatant.id, extra_attack_count_for(&combatant.classes), bonus),
    }
}

/// Owns the authoritative encounter and runs actions against it.
#[derive(Debug, Clone)]
pub struct CombatController {
    rules: CombatRules,
    encounter: Encounter,
}

impl CombatController {
    pub fn new(rules: CombatRules, encounter: Encounter) -> Self {
        Self { rules, encounter }
    }

    pub fn rules(&self) -> &CombatRules {
        &self.rules
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    pub fn encounter_mut(&mut self) -> &mut Encounter {
        &mut self.encounter
    }

    pub fn into_encounter(self) -> Encounter {
        self.encounter
    }

    /// The tracker for this turn, if the entity has one yet.
    pub fn tracker(&self, entity: EntityId) -> Option<AttackTracker> {
        self.encounter.trackers.get(&entity).copied()
    }

    /// Start `entity`'s turn: a fresh tracker, and its Dodge ends.
    pub fn begin_turn(&mut self, entity: EntityId) -> Result<AttackTracker, CombatError> {
        let combatant = self
            .encounter
            .get_mut(entity)
            .ok_or(CombatError::UnknownEntity(entity))?;
        combatant.is_dodging = false;
        let tracker = fresh_tracker(combatant);
        debug!(
            entity = %entity,
            attacks = tracker.max_attacks,
            bonus_attacks = tracker.bonus_attacks,
            "turn started"
        );
        self.encounter.trackers.insert(entity, tracker);
        Ok(tracker)
    }

    /// End the current combatant's turn and return whose turn is next.
    ///
    /// Every tracker is discarded, including ones spent by off-turn attacks.
    /// When the round rolls over, timed conditions count down.
    pub fn end_turn(&mut self) -> Option<EntityId> {
        self.encounter.trackers.clear();
        let round = self.encounter.round;
        self.encounter.next_turn();
        if self.encounter.round != round {
            for combatant in &mut self.encounter.combatants {
                for expired in combatant.conditions.tick_round() {
                    debug!(entity = %combatant.id, condition = %expired, "condition expired");
                }
            }
        }
        self.encounter.current_combatant().map(|c| c.id)
    }

    pub fn set_dodging(&mut self, entity: EntityId, dodging: bool) -> Result<(), CombatError> {
        self.combatant_mut(entity)?.is_dodging = dodging;
        Ok(())
    }

    pub fn move_to(&mut self, entity: EntityId, position: GridPosition) -> Result<(), CombatError> {
        self.combatant_mut(entity)?.position = position;
        Ok(())
    }

    pub fn add_condition(
        &mut self,
        entity: EntityId,
        condition: ActiveCondition,
    ) -> Result<(), CombatError> {
        self.combatant_mut(entity)?.conditions.push(condition);
        Ok(())
    }

    pub fn remove_condition(
        &mut self,
        entity: EntityId,
        condition: Condition,
    ) -> Result<(), CombatError> {
        self.combatant_mut(entity)?.conditions.remove(condition);
        Ok(())
    }

    fn combatant_mut(&mut self, entity: EntityId) -> Result<&mut Combatant, CombatError> {
        self.encounter
            .get_mut(entity)
            .ok_or(CombatError::UnknownEntity(entity))
    }

    /// Resolve one attack, spending it from the attacker's tracker.
    pub fn attack<D: DiceRoller + ?Sized>(
        &mut self,
        request: &AttackRequest,
        dice: &mut D,
    ) -> Result<AttackOutcome, CombatError> {
        match self.resolve_attack(request, dice) {
            Ok(outcome) => {
                info!(
                    attacker = %outcome.attacker_name,
                    target = %outcome.target_name,
                    weapon = %outcome.weapon_name,
                    roll = outcome.attack_roll.total,
                    hit = outcome.hit,
                    critical = outcome.critical,
                    damage = outcome.damage,
                    "attack resolved"
                );
                self.encounter
                    .trackers
                    .insert(outcome.attacker, outcome.tracker);
                Ok(outcome)
            }
            Err(err) => {
                warn!(attacker = %request.attacker, error = %err, "attack rejected");
                Err(err)
            }
        }
    }

    fn resolve_attack<D: DiceRoller + ?Sized>(
        &self,
        request: &AttackRequest,
        dice: &mut D,
    ) -> Result<AttackOutcome, CombatError> {
        let encounter = &self.encounter;
        let attacker = encounter
            .get(request.attacker)
            .ok_or(CombatError::UnknownEntity(request.attacker))?;
        let target = encounter
            .get(request.target)
            .ok_or(CombatError::UnknownEntity(request.target))?;

        let tracker = self
            .tracker(attacker.id)
            .unwrap_or_else(|| fresh_tracker(attacker));

        let strike = Strike::choose(attacker, request.hand, request.thrown)?;
        let weapon = strike.context;

        // Conditions and positions are read fresh for every attack.
        let tokens = encounter.tokens();
        let incapacitated = encounter.incapacitated_ids();
        let attacker_token = attacker.token();
        let flanking_ally = if self.rules.flanking && weapon.is_melee {
            check_flanking(&attacker_token, &target.token(), &tokens, &incapacitated)
        } else {
            None
        };
        let context = AttackConditionContext {
            is_ranged: weapon.is_ranged,
            is_within_5ft: attacker.position.is_within_5ft(target.position),
            any_enemy_within_5ft_of_attacker: any_enemy_within_5ft(
                &attacker_token,
                &tokens,
                &incapacitated,
            ),
            target_is_dodging: target.is_dodging,
            target_entity_id: Some(target.id),
            attacker_grappler_entity_id: attacker.conditions.grappler(),
            is_underwater: encounter.underwater,
            weapon_damage_type: weapon.damage_type.map(|t| t.name().to_string()),
            attacker_has_swim_speed: attacker.swim_speed.is_some(),
            flanking_ally,
            ignores_ranged_in_melee: ignores_ranged_in_melee(attacker.features, &weapon),
        };
        let effects = resolve_condition_effects(&attacker.conditions, &target.conditions, &context);

        if effects.attacker_cannot_act {
            return Err(CombatError::AttackerCannotAct {
                name: attacker.name.clone(),
                reasons: effects.cannot_act_reasons.clone(),
            });
        }

        let tracker = if request.hand.is_bonus_attack() {
            if !tracker.has_bonus_attacks_remaining() {
                return Err(CombatError::NoBonusAttacksRemaining(attacker.name.clone()));
            }
            tracker.use_bonus_attack()
        } else {
            if !tracker.has_attacks_remaining() {
                return Err(CombatError::NoAttacksRemaining(attacker.name.clone()));
            }
            tracker.use_attack()
        };

        let inputs = ModifierInputs {
            attack_kind: strike.kind,
            proficient: strike.proficient,
            fighting_styles: attacker.fighting_styles,
            features: attacker.features,
            offhand: strike.offhand,
            ..ModifierInputs::new(
                AbilityModifiers::from_scores(&attacker.ability_scores),
                &weapon,
                attacker.proficiency_bonus,
            )
        };
        let attack_mod = attack_modifier(&inputs, &attacker.bonuses);
        let damage_mod = damage_modifier(&inputs, &attacker.bonuses);

        let attack_roll = dice.roll_d20(attack_mod + effects.roll_penalty(), effects.roll_mode);
        let natural_miss = self.rules.natural_one_misses && attack_roll.is_natural_1();
        let natural_hit = self.rules.natural_twenty_hits && attack_roll.is_natural_20();
        let hit = !natural_miss && (natural_hit || attack_roll.total >= i32::from(target.armor_class));
        let critical = hit && (attack_roll.is_natural_20() || effects.auto_crit);

        let damage_roll = match (&strike.dice, hit) {
            (Some(damage_dice), true) if critical => Some(damage_dice.doubled().roll(dice)),
            (Some(damage_dice), true) => Some(damage_dice.roll(dice)),
            _ => None,
        };
        let damage = if hit {
            damage_roll
                .as_ref()
                .map_or(0, |r| r.total)
                .saturating_add(damage_mod)
                .max(0)
        } else {
            0
        };

        let narrative = narrate(
            &attacker.name,
            &target.name,
            &strike.name,
            &attack_roll,
            target.armor_class,
            hit,
            critical,
            damage,
            weapon.damage_type,
        );

        Ok(AttackOutcome {
            attacker: attacker.id,
            attacker_name: attacker.name.clone(),
            target: target.id,
            target_name: target.name.clone(),
            hand: request.hand,
            weapon_name: strike.name,
            weapon,
            conditions: effects,
            attack_modifier: attack_mod,
            attack_roll,
            target_ac: target.armor_class,
            hit,
            critical,
            damage_modifier: damage_mod,
            damage_roll,
            damage,
            damage_type: weapon.damage_type,
            tracker,
            narrative,
        })
    }
}

/// Crossbow Expert with a crossbow, or Sharpshooter with any ranged weapon.
fn ignores_ranged_in_melee(features: CombatFeatures, weapon: &WeaponContext) -> bool {
    (features.contains(CombatFeatures::CROSSBOW_EXPERT) && weapon.is_crossbow)
        || (features.contains(CombatFeatures::SHARPSHOOTER) && !weapon.is_spell)
}

#[allow(clippy::too_many_arguments)]
fn narrate(
    attacker: &str,
    target: &str,
    weapon: &str,
    roll: &RollResult,
    target_ac: u8,
    hit: bool,
    critical: bool,
    damage: i32,
    damage_type: Option<DamageType>,
) -> String {
    let mode = match roll.mode {
        RollMode::Normal => "",
        RollMode::Advantage => " with advantage",
        RollMode::Disadvantage => " with disadvantage",
    };
    let mut text = format!(
        "{attacker} attacks {target} with {weapon}{mode}: {} vs AC {target_ac}.",
        roll.total
    );
    let kind = damage_type.map(|t| format!(" {t}")).unwrap_or_default();
    if critical {
        text.push_str(&format!(" Critical hit! {damage}{kind} damage."));
    } else if hit {
        text.push_str(&format!(" Hit for {damage}{kind} damage."));
    } else if roll.is_natural_1() {
        text.push_str(" Natural 1, a miss.");
    } else {
        text.push_str(" Miss.");
    }
    text
}
