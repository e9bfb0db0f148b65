//! Priority passing and stack resolution.

use tracing::{debug, info};

use crate::cards::Permanent;
use crate::core::{MatchState, PendingInteraction, PlayerId, Result, RulesError};
use crate::effects::{EffectResolver, FilterContext, RunOutcome, Target};
use crate::turn;

use super::priority::{PassOutcome, StackEntry};

/// The priority holder passes.
///
/// Once every player in the match has passed in succession, the top of
/// the stack resolves, or the step ends if the stack is empty.
pub fn pass_priority(state: &mut MatchState, player: PlayerId) -> Result<()> {
    state.ensure_priority(player)?;
    let in_match = state.players_in_match();

    match state.stack.pass(player, &in_match) {
        PassOutcome::PriorityTo(next) => {
            debug!(match_id = %state.id, from = %player, to = %next, "priority passed");
        }
        PassOutcome::AllPassed if state.stack.is_empty() => turn::advance(state),
        PassOutcome::AllPassed => resolve_top(state),
    }
    Ok(())
}

/// Resolve the top entry of the stack.
///
/// A targeted entry whose target is gone or no longer passes its filter is
/// countered on resolution: none of its effects run.
pub fn resolve_top(state: &mut MatchState) {
    let Some(top) = state.stack.peek_top() else {
        return;
    };
    let target_legal = match (&top.target, &top.target_filter) {
        (Some(target), Some(filter)) => {
            let ctx = FilterContext::new(state, top.controller).with_source(top.source);
            filter.evaluate(&ctx, target).is_pass()
        }
        _ => true,
    };
    let Some(entry) = state.stack.pop() else {
        return;
    };

    if !target_legal {
        info!(match_id = %state.id, entry = %entry.id, "countered on resolution");
        state.log(format!("{} is countered: its target is illegal", entry.description));
        if let Some(card) = entry.card {
            state.put_into_graveyard(card);
        }
        after_resolution(state);
        return;
    }

    info!(match_id = %state.id, entry = %entry.id, description = %entry.description, "resolving");
    match EffectResolver::run(state, entry, 0) {
        RunOutcome::Finished(entry) => {
            finish(state, entry);
            after_resolution(state);
        }
        RunOutcome::Suspended => {}
    }
}

/// Answer a `MayEffectPrompt` and continue resolving the held entry.
pub fn answer_may(state: &mut MatchState, player: PlayerId, accept: bool) -> Result<()> {
    state.ensure_running()?;
    let (entry, effect_index) = match state.pending_interaction.take() {
        Some(PendingInteraction::MayEffectPrompt { player: p, entry, effect_index, .. }) if p == player => {
            (entry, effect_index)
        }
        other => {
            state.pending_interaction = other;
            return Err(RulesError::illegal(format!("{player} has no pending prompt")));
        }
    };

    let entry = *entry;
    if accept {
        if let Some(effect) = entry.effects.get(effect_index) {
            let ctx = crate::effects::EffectContext::for_entry(&entry);
            EffectResolver::apply(state, effect, &ctx);
        }
    }
    state.log(format!("{player} answers {}", if accept { "yes" } else { "no" }));

    match EffectResolver::run(state, entry, effect_index + 1) {
        RunOutcome::Finished(entry) => {
            finish(state, entry);
            after_resolution(state);
        }
        RunOutcome::Suspended => {}
    }
    Ok(())
}

/// Move a resolved entry's card where it belongs.
///
/// Permanent spells enter the battlefield under their controller (auras
/// attached to their target); other spells go to the graveyard.
fn finish(state: &mut MatchState, entry: StackEntry) {
    let Some(card) = entry.card else {
        return;
    };
    if !card.definition.is_permanent_card() {
        state.put_into_graveyard(card);
        return;
    }

    let mut permanent = Permanent::new(card, entry.controller);
    if permanent.definition().is_aura() {
        if let Some(Target::Permanent(host)) = entry.target {
            permanent.attached_to = Some(host);
        }
    }
    state.put_onto_battlefield(permanent);
}

/// After a resolution the active player receives priority.
fn after_resolution(state: &mut MatchState) {
    let active = state.active_player;
    state.stack.set_priority(active);
    turn::settle(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId, CardInstance, CardType};
    use crate::core::{MatchConfig, MatchId, MatchStatus};
    use crate::effects::{Effect, EffectSlot, Recipient, TargetFilter};
    use crate::stack::{cast_spell, StackEntryKind};
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

    fn bear(state: &mut MatchState, owner: PlayerId) -> crate::core::EntityId {
        let id = state.allocate_entity();
        let def = CardDefinition::new(CardId::new(2), "Grizzly Bears")
            .with_type(CardType::Creature)
            .with_power_toughness(2, 2);
        state.players[owner]
            .battlefield
            .push(Permanent::new(CardInstance::new(id, owner, def), owner));
        id
    }

    fn in_hand(state: &mut MatchState, player: PlayerId, def: CardDefinition) -> crate::core::EntityId {
        let id = state.allocate_entity();
        state.players[player].hand.push(CardInstance::new(id, player, def));
        id
    }

    #[test]
    fn test_two_passes_resolve_top() {
        let mut state = running();
        let card = in_hand(
            &mut state,
            P0,
            CardDefinition::new(CardId::new(1), "Lava Spike")
                .with_type(CardType::Instant)
                .with_effect(EffectSlot::Spell, Effect::deal_damage(3, Recipient::EachOpponent)),
        );
        cast_spell(&mut state, P0, card, None, 0).unwrap();

        pass_priority(&mut state, P0).unwrap();
        assert_eq!(state.stack.len(), 1);
        pass_priority(&mut state, P1).unwrap();

        assert!(state.stack.is_empty());
        assert_eq!(state.players[P1].life, 17);
        assert_eq!(state.players[P0].graveyard.len(), 1);
        assert_eq!(state.stack.priority_player(), Some(P0));
    }

    #[test]
    fn test_pass_requires_priority() {
        let mut state = running();
        assert!(matches!(pass_priority(&mut state, P1), Err(RulesError::IllegalAction(_))));
    }

    #[test]
    fn test_illegal_target_counters_on_resolution() {
        let mut state = running();
        let victim = bear(&mut state, P1);
        let card = in_hand(
            &mut state,
            P0,
            CardDefinition::new(CardId::new(3), "Murder")
                .with_type(CardType::Instant)
                .with_effect(EffectSlot::Spell, Effect::Destroy { recipient: Recipient::Target })
                .with_target(EffectSlot::Spell, TargetFilter::creature()),
        );
        cast_spell(&mut state, P0, card, Some(Target::Permanent(victim)), 0).unwrap();

        // The target leaves before resolution.
        state.return_to_hand(victim);
        resolve_top(&mut state);

        assert!(state.stack.is_empty());
        assert_eq!(state.players[P0].graveyard.len(), 1);
        assert_eq!(state.players[P1].hand.len(), 1);
    }

    #[test]
    fn test_permanent_spell_enters_battlefield() {
        let mut state = running();
        let card = in_hand(
            &mut state,
            P0,
            CardDefinition::new(CardId::new(2), "Grizzly Bears")
                .with_type(CardType::Creature)
                .with_power_toughness(2, 2),
        );
        cast_spell(&mut state, P0, card, None, 0).unwrap();
        resolve_top(&mut state);

        let perm = state.permanent(card).unwrap();
        assert!(perm.summoning_sick);
        assert_eq!(perm.controller, P0);
    }

    #[test]
    fn test_aura_attaches_to_target() {
        let mut state = running();
        let host = bear(&mut state, P0);
        let card = in_hand(
            &mut state,
            P0,
            CardDefinition::new(CardId::new(4), "Holy Strength")
                .with_type(CardType::Enchantment)
                .with_subtype("Aura")
                .with_effect(EffectSlot::Static, Effect::BoostAttached { power: 1, toughness: 2 }),
        );
        cast_spell(&mut state, P0, card, Some(Target::Permanent(host)), 0).unwrap();
        resolve_top(&mut state);

        assert_eq!(state.permanent(card).unwrap().attached_to, Some(host));
        let host = state.permanent(host).unwrap();
        assert_eq!(state.effective_toughness(host), 4);
    }

    #[test]
    fn test_may_prompt_resumes_resolution() {
        let mut state = running();
        let entry = StackEntry::new(StackEntryKind::TriggeredAbility, crate::core::EntityId(99), P0, "test")
            .with_effects(vec![Effect::may("Draw?", Effect::gain_life(5)), Effect::gain_life(1)]);
        state.stack.push(entry);
        resolve_top(&mut state);
        assert!(matches!(state.pending_interaction, Some(PendingInteraction::MayEffectPrompt { .. })));

        assert!(answer_may(&mut state, P1, true).is_err());
        answer_may(&mut state, P0, true).unwrap();

        assert!(state.pending_interaction.is_none());
        assert_eq!(state.players[P0].life, 26);
        assert_eq!(state.stack.priority_player(), Some(P0));
    }
}
