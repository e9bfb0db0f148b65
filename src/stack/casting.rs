//! Playing lands, casting spells and activating abilities.
//!
//! Every entry point validates completely before mutating: priority,
//! timing, target, then cost. Mana is paid against a copy of the pool that
//! is committed only once everything else has passed.

use tracing::info;

use crate::cards::{ActivatedAbility, AbilityTiming, CardDefinition, Keyword};
use crate::core::{EntityId, MatchState, PlayerId, Result, RulesError};
use crate::effects::{Effect, EffectContext, EffectResolver, EffectSlot, FilterContext, Target, TargetFilter};
use crate::mana::{ManaCost, ManaPool};
use crate::triggers::GameEvent;

use super::priority::{StackEntry, StackEntryId, StackEntryKind};

/// Play a land from hand: sorcery timing, limited per turn, no stack.
pub fn play_land(state: &mut MatchState, player: PlayerId, card: EntityId) -> Result<()> {
    state.ensure_priority(player)?;
    let board = state.board(player)?;
    let Some(instance) = board.hand_card(card) else {
        return Err(RulesError::illegal(format!("{card} is not in {player}'s hand")));
    };
    if !instance.definition.is_land() {
        return Err(RulesError::illegal(format!("{} is not a land", instance.name())));
    }
    state.ensure_sorcery_timing(player)?;
    if board.lands_played_this_turn >= state.config.lands_per_turn {
        return Err(RulesError::illegal("no land plays remaining this turn"));
    }

    let board = &mut state.players[player];
    let Some(instance) = board.take_from_hand(card) else {
        return Err(RulesError::illegal(format!("{card} is not in {player}'s hand")));
    };
    board.lands_played_this_turn += 1;
    info!(match_id = %state.id, %player, card = %instance, "land played");
    state.put_onto_battlefield(crate::cards::Permanent::new(instance, player));
    state.stack.clear_passes();
    Ok(())
}

/// Cast a spell from hand, putting it on the stack.
pub fn cast_spell(
    state: &mut MatchState,
    player: PlayerId,
    card: EntityId,
    target: Option<Target>,
    x: u32,
) -> Result<StackEntryId> {
    state.ensure_priority(player)?;
    let board = state.board(player)?;
    let Some(instance) = board.hand_card(card) else {
        return Err(RulesError::illegal(format!("{card} is not in {player}'s hand")));
    };
    let definition = &instance.definition;
    if definition.is_land() {
        return Err(RulesError::illegal(format!("{} is a land and is played, not cast", instance.name())));
    }
    if !definition.is_type(crate::cards::CardType::Instant) {
        state.ensure_sorcery_timing(player)?;
    }

    let cost = definition.mana_cost.unwrap_or_default();
    let filter = spell_target_filter(definition);
    let target = check_target(state, player, card, filter, target)?;
    let pool = pay_from_copy(board.mana_pool, &cost, x)?;
    let effects: Vec<Effect> = definition.effects_for(EffectSlot::Spell).cloned().collect();
    let name = instance.name().to_string();

    // Validation done.
    let board = &mut state.players[player];
    board.mana_pool = pool;
    let Some(instance) = board.take_from_hand(card) else {
        return Err(RulesError::illegal(format!("{card} is not in {player}'s hand")));
    };

    let mut entry = StackEntry::new(StackEntryKind::Spell, card, player, name.clone())
        .with_card(instance)
        .with_effects(effects)
        .with_x(x);
    if let Some((target, filter)) = target {
        entry = entry.with_target(target, filter);
    }
    let id = state.stack.push(entry);
    state.stack.set_priority(player);
    state.emit(GameEvent::SpellCast { caster: player, card });

    info!(match_id = %state.id, %player, spell = %name, entry = %id, "spell cast");
    state.log(format!("{player} casts {name}"));
    Ok(id)
}

/// Activate an ability of a permanent.
///
/// Mana abilities resolve immediately and return `None`; other abilities
/// go on the stack.
pub fn activate_ability(
    state: &mut MatchState,
    player: PlayerId,
    permanent: EntityId,
    index: usize,
    target: Option<Target>,
    x: u32,
) -> Result<Option<StackEntryId>> {
    state.ensure_priority(player)?;
    let perm = state.require_permanent(permanent)?;
    if perm.controller != player {
        return Err(RulesError::illegal(format!("{player} does not control {}", perm.name())));
    }
    let Some(ability) = perm.definition().abilities.get(index) else {
        return Err(RulesError::not_found(format!("{} has no ability #{index}", perm.name())));
    };

    if ability.requires_tap {
        if perm.tapped {
            return Err(RulesError::illegal(format!("{} is already tapped", perm.name())));
        }
        if perm.is_creature() && perm.summoning_sick && !state.has_keyword(perm, Keyword::Haste) {
            return Err(RulesError::illegal(format!("{} has summoning sickness", perm.name())));
        }
    }
    if let Some(max) = ability.max_per_turn {
        if perm.activations(index) >= max {
            return Err(RulesError::illegal(format!(
                "{} can be activated only {max} time(s) per turn",
                ability.description
            )));
        }
    }
    if ability.timing == AbilityTiming::SorcerySpeed {
        state.ensure_sorcery_timing(player)?;
    }

    let cost = ability.mana_cost.unwrap_or_default();
    let filter = ability_target_filter(ability);
    let target = check_target(state, player, permanent, filter, target)?;
    let pool = pay_from_copy(state.board(player)?.mana_pool, &cost, x)?;

    let ability = ability.clone();
    let name = perm.name().to_string();

    // Validation done: pay costs.
    state.players[player].mana_pool = pool;
    if let Some(perm) = state.permanent_mut(permanent) {
        if ability.requires_tap {
            perm.tapped = true;
        }
        perm.record_activation(index);
    }
    if ability.sacrifice_self {
        state.destroy(permanent);
    }

    if ability.is_mana_ability() {
        let ctx = EffectContext::new(player, permanent).with_x(x);
        for effect in &ability.effects {
            EffectResolver::apply(state, effect, &ctx);
        }
        return Ok(None);
    }

    let mut entry = StackEntry::new(
        StackEntryKind::ActivatedAbility,
        permanent,
        player,
        format!("{name}: {}", ability.description),
    )
    .with_effects(ability.effects)
    .with_x(x);
    if let Some((target, filter)) = target {
        entry = entry.with_target(target, filter);
    }
    let id = state.stack.push(entry);
    state.stack.set_priority(player);

    info!(match_id = %state.id, %player, source = %name, entry = %id, "ability activated");
    state.log(format!("{player} activates {name}"));
    Ok(Some(id))
}

/// Filter a spell's target must pass, if it takes one.
#[must_use]
pub fn spell_target_filter(definition: &CardDefinition) -> Option<TargetFilter> {
    if let Some(filter) = definition.target_for(EffectSlot::Spell) {
        return Some(filter.clone());
    }
    if definition.is_aura() {
        return Some(TargetFilter::creature());
    }
    definition
        .effects_for(EffectSlot::Spell)
        .any(Effect::uses_target)
        .then(TargetFilter::creature_or_player)
}

/// Filter an ability's target must pass, if it takes one.
#[must_use]
pub fn ability_target_filter(ability: &ActivatedAbility) -> Option<TargetFilter> {
    if let Some(filter) = &ability.target {
        return Some(filter.clone());
    }
    ability
        .effects
        .iter()
        .any(Effect::uses_target)
        .then(TargetFilter::creature_or_player)
}

fn check_target(
    state: &MatchState,
    player: PlayerId,
    source: EntityId,
    filter: Option<TargetFilter>,
    target: Option<Target>,
) -> Result<Option<(Target, TargetFilter)>> {
    match (filter, target) {
        (None, None) => Ok(None),
        (None, Some(_)) => Err(RulesError::IllegalTarget("this takes no target".into())),
        (Some(filter), None) => Err(RulesError::IllegalTarget(format!("a target is required: {}", filter.describe()))),
        (Some(filter), Some(target)) => {
            let ctx = FilterContext::new(state, player).with_source(source);
            filter.evaluate(&ctx, &target).into_result()?;
            Ok(Some((target, filter)))
        }
    }
}

fn pay_from_copy(mut pool: ManaPool, cost: &ManaCost, x: u32) -> Result<ManaPool> {
    if x > 0 && !cost.has_x() {
        return Err(RulesError::illegal(format!("{cost} has no X")));
    }
    cost.pay(&mut pool, x)?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, CardInstance, CardType, Permanent};
    use crate::core::{MatchConfig, MatchId, MatchStatus};
    use crate::effects::Recipient;
    use crate::mana::ManaColor;
    use crate::turn::Step;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn running() -> MatchState {
        let mut state = MatchState::new(MatchId::new(1), MatchConfig::default(), 2, 42);
        state.status = MatchStatus::Running;
        state.step = Step::PrecombatMain;
        state.stack.set_priority(P0);
        state
    }

    fn to_hand(state: &mut MatchState, player: PlayerId, def: CardDefinition) -> EntityId {
        let id = state.allocate_entity();
        state.players[player].hand.push(CardInstance::new(id, player, def));
        id
    }

    fn shock() -> CardDefinition {
        CardDefinition::new(CardId::new(1), "Shock")
            .with_type(CardType::Instant)
            .with_mana_cost(ManaCost::parse("{R}").unwrap())
            .with_effect(EffectSlot::Spell, Effect::deal_damage(2, Recipient::Target))
    }

    #[test]
    fn test_cast_pays_and_pushes() {
        let mut state = running();
        state.players[P0].mana_pool.add(ManaColor::Red, 2);
        let card = to_hand(&mut state, P0, shock());

        let id = cast_spell(&mut state, P0, card, Some(Target::Player(P1)), 0).unwrap();

        assert_eq!(state.stack.peek_top().unwrap().id, id);
        assert_eq!(state.players[P0].mana_pool.get(ManaColor::Red), 1);
        assert!(state.players[P0].hand.is_empty());
        assert_eq!(state.stack.priority_player(), Some(P0));
        assert_eq!(state.events, vec![GameEvent::SpellCast { caster: P0, card }]);
    }

    #[test]
    fn test_cast_failures_leave_state_unchanged() {
        let mut state = running();
        let card = to_hand(&mut state, P0, shock());

        let err = cast_spell(&mut state, P0, card, Some(Target::Player(P1)), 0).unwrap_err();
        assert!(matches!(err, RulesError::InsufficientMana { required: 1, available: 0 }));

        state.players[P0].mana_pool.add(ManaColor::Red, 1);
        let err = cast_spell(&mut state, P0, card, None, 0).unwrap_err();
        assert!(matches!(err, RulesError::IllegalTarget(_)));

        let err = cast_spell(&mut state, P1, card, Some(Target::Player(P1)), 0).unwrap_err();
        assert!(matches!(err, RulesError::IllegalAction(_)));

        assert_eq!(state.players[P0].hand.len(), 1);
        assert_eq!(state.players[P0].mana_pool.total(), 1);
        assert!(state.stack.is_empty());
    }

    #[test]
    fn test_sorcery_timing() {
        let mut state = running();
        let bear = CardDefinition::new(CardId::new(2), "Grizzly Bears")
            .with_type(CardType::Creature)
            .with_mana_cost(ManaCost::parse("{1}{G}").unwrap())
            .with_power_toughness(2, 2);
        let card = to_hand(&mut state, P0, bear);
        state.players[P0].mana_pool.add(ManaColor::Green, 2);

        state.step = Step::Upkeep;
        let err = cast_spell(&mut state, P0, card, None, 0).unwrap_err();
        assert_eq!(err.to_string(), "illegal action: sorcery-speed actions require a main step");

        state.step = Step::PrecombatMain;
        assert!(cast_spell(&mut state, P0, card, None, 0).is_ok());
    }

    #[test]
    fn test_play_land_once_per_turn() {
        let mut state = running();
        let forest = || CardDefinition::new(CardId::new(3), "Forest").with_type(CardType::Land);
        let first = to_hand(&mut state, P0, forest());
        let second = to_hand(&mut state, P0, forest());

        play_land(&mut state, P0, first).unwrap();
        assert!(state.permanent(first).is_some());

        let err = play_land(&mut state, P0, second).unwrap_err();
        assert!(matches!(err, RulesError::IllegalAction(_)));
        assert_eq!(state.players[P0].hand.len(), 1);
    }

    #[test]
    fn test_mana_ability_resolves_immediately() {
        let mut state = running();
        let id = state.allocate_entity();
        let mountain = CardDefinition::new(CardId::new(4), "Mountain")
            .with_type(CardType::Land)
            .with_ability(ActivatedAbility::mana(ManaColor::Red));
        state.players[P0]
            .battlefield
            .push(Permanent::new(CardInstance::new(id, P0, mountain), P0));

        assert_eq!(activate_ability(&mut state, P0, id, 0, None, 0).unwrap(), None);
        assert_eq!(state.players[P0].mana_pool.get(ManaColor::Red), 1);
        assert!(state.permanent(id).unwrap().tapped);
        assert!(state.stack.is_empty());

        let err = activate_ability(&mut state, P0, id, 0, None, 0).unwrap_err();
        assert!(matches!(err, RulesError::IllegalAction(_)));
    }

    #[test]
    fn test_tap_ability_blocked_by_summoning_sickness() {
        let mut state = running();
        let id = state.allocate_entity();
        let pinger = CardDefinition::new(CardId::new(5), "Prodigal Pyromancer")
            .with_type(CardType::Creature)
            .with_power_toughness(1, 1)
            .with_ability(
                ActivatedAbility::new("{T}: deal 1 damage to any target.")
                    .with_tap()
                    .with_effect(Effect::deal_damage(1, Recipient::Target)),
            );
        state.players[P0]
            .battlefield
            .push(Permanent::new(CardInstance::new(id, P0, pinger), P0));

        let err = activate_ability(&mut state, P0, id, 0, Some(Target::Player(P1)), 0).unwrap_err();
        assert!(err.to_string().contains("summoning sickness"));

        state.permanent_mut(id).unwrap().summoning_sick = false;
        let entry = activate_ability(&mut state, P0, id, 0, Some(Target::Player(P1)), 0).unwrap();
        assert!(entry.is_some());
        assert_eq!(state.stack.len(), 1);
    }

    #[test]
    fn test_target_filters() {
        let aura = CardDefinition::new(CardId::new(6), "Holy Strength")
            .with_type(CardType::Enchantment)
            .with_subtype("Aura");
        assert_eq!(spell_target_filter(&aura), Some(TargetFilter::creature()));
        assert_eq!(spell_target_filter(&shock()), Some(TargetFilter::creature_or_player()));

        let divination = CardDefinition::new(CardId::new(7), "Divination")
            .with_type(CardType::Sorcery)
            .with_effect(EffectSlot::Spell, Effect::draw(2));
        assert_eq!(spell_target_filter(&divination), None);
    }

    #[test]
    fn test_sorcery_speed_ability() {
        let mut state = running();
        let id = state.allocate_entity();
        let totem = CardDefinition::new(CardId::new(8), "Training Totem")
            .with_type(CardType::Artifact)
            .with_ability(
                ActivatedAbility::new("Draw a card. Activate only as a sorcery.")
                    .with_effect(Effect::draw(1))
                    .sorcery_speed(),
            );
        state.players[P0]
            .battlefield
            .push(Permanent::new(CardInstance::new(id, P0, totem), P0));

        state.step = Step::Upkeep;
        assert!(activate_ability(&mut state, P0, id, 0, None, 0).is_err());

        state.step = Step::PostcombatMain;
        assert!(activate_ability(&mut state, P0, id, 0, None, 0).unwrap().is_some());
    }

    #[test]
    fn test_activation_limit_per_turn() {
        let mut state = running();
        let id = state.allocate_entity();
        let shrine = CardDefinition::new(CardId::new(9), "Healing Shrine")
            .with_type(CardType::Artifact)
            .with_ability(
                ActivatedAbility::new("You gain 1 life. Activate only once each turn.")
                    .with_effect(Effect::gain_life(1))
                    .with_max_per_turn(1),
            );
        state.players[P0]
            .battlefield
            .push(Permanent::new(CardInstance::new(id, P0, shrine), P0));

        assert!(activate_ability(&mut state, P0, id, 0, None, 0).unwrap().is_some());
        let err = activate_ability(&mut state, P0, id, 0, None, 0).unwrap_err();
        assert!(err.to_string().contains("only 1 time(s) per turn"));
        assert_eq!(state.stack.len(), 1);

        state.permanent_mut(id).unwrap().reset_end_of_turn();
        assert!(activate_ability(&mut state, P0, id, 0, None, 0).unwrap().is_some());
    }
}
