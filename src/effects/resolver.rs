//! Effect resolution - executing effects on match state.
//!
//! `EffectResolver::apply` gives every `Effect` variant its meaning.
//! `EffectResolver::run` walks a stack entry's effect list in order and
//! suspends on `May` effects, storing the entry in a `MayEffectPrompt` so
//! resolution resumes after the answer.

use smallvec::SmallVec;
use tracing::debug;

use crate::cards::{CardDefinition, CardId, CardInstance, CardType, Keyword, Permanent};
use crate::core::{EntityId, MatchState, PendingInteraction, PlayerId};
use crate::stack::StackEntry;

use super::effect::{Effect, Recipient};
use super::targeting::Target;

/// Who is applying an effect and what it points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectContext {
    pub controller: PlayerId,
    pub source: EntityId,
    pub target: Option<Target>,
    /// Value chosen for X.
    pub x: u32,
}

impl EffectContext {
    #[must_use]
    pub fn new(controller: PlayerId, source: EntityId) -> Self {
        Self {
            controller,
            source,
            target: None,
            x: 0,
        }
    }

    /// Context for the effects of a stack entry.
    #[must_use]
    pub fn for_entry(entry: &StackEntry) -> Self {
        Self {
            controller: entry.controller,
            source: entry.source,
            target: entry.target,
            x: entry.x,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_x(mut self, x: u32) -> Self {
        self.x = x;
        self
    }
}

/// Result of applying one effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    Success,
    /// Nothing to act on (target gone, static effect, ...).
    Skipped(String),
}

/// Outcome of running an entry's effect list.
#[derive(Debug)]
pub enum RunOutcome {
    /// All effects applied; the entry is handed back for cleanup.
    Finished(StackEntry),
    /// Waiting on a `MayEffectPrompt`, which now holds the entry.
    Suspended,
}

/// Resolves effects on match state.
pub struct EffectResolver;

impl EffectResolver {
    /// Apply an entry's effects from `start`, suspending on the first `May`.
    pub fn run(state: &mut MatchState, entry: StackEntry, start: usize) -> RunOutcome {
        let ctx = EffectContext::for_entry(&entry);

        for index in start..entry.effects.len() {
            let prompt = match &entry.effects[index] {
                Effect::May { prompt, .. } => Some(prompt.clone()),
                _ => None,
            };
            if let Some(prompt) = prompt {
                state.pending_interaction = Some(PendingInteraction::MayEffectPrompt {
                    player: entry.controller,
                    prompt,
                    entry: Box::new(entry),
                    effect_index: index,
                });
                return RunOutcome::Suspended;
            }

            let result = Self::apply(state, &entry.effects[index], &ctx);
            if let ResolveResult::Skipped(reason) = result {
                debug!(match_id = %state.id, entry = %entry.id, %reason, "effect skipped");
            }
        }

        RunOutcome::Finished(entry)
    }

    /// Apply a single effect.
    ///
    /// Outside a stack entry a `May` applies its wrapped effect directly.
    pub fn apply(state: &mut MatchState, effect: &Effect, ctx: &EffectContext) -> ResolveResult {
        match effect {
            Effect::DealDamage { amount, recipient } => Self::damage_each(state, *amount, *recipient, ctx),
            Effect::DealXDamage { recipient } => {
                let amount = i32::try_from(ctx.x).unwrap_or(i32::MAX);
                Self::damage_each(state, amount, *recipient, ctx)
            }

            Effect::GainLife { amount, recipient } => {
                Self::each_player(state, *recipient, ctx, |state, player| {
                    state.players[player].life += amount;
                    state.log(format!("{player} gains {amount} life"));
                })
            }
            Effect::LoseLife { amount, recipient } => {
                Self::each_player(state, *recipient, ctx, |state, player| {
                    state.players[player].life -= amount;
                    state.log(format!("{player} loses {amount} life"));
                })
            }
            Effect::DrawCards { count, recipient } => {
                Self::each_player(state, *recipient, ctx, |state, player| {
                    state.draw_cards(player, *count);
                    state.log(format!("{player} draws {count}"));
                })
            }
            Effect::AddMana { color, amount } => {
                state.players[ctx.controller].mana_pool.add(*color, *amount);
                ResolveResult::Success
            }

            Effect::Destroy { recipient } => Self::each_permanent(state, *recipient, ctx, |state, id| {
                state.destroy(id);
            }),
            Effect::Sacrifice { recipient } => {
                let controller = ctx.controller;
                Self::each_permanent(state, *recipient, ctx, |state, id| {
                    if state.permanent(id).is_some_and(|p| p.controller == controller) {
                        state.destroy(id);
                    }
                })
            }
            Effect::Boost { power, toughness, recipient } => {
                Self::each_permanent(state, *recipient, ctx, |state, id| {
                    if let Some(perm) = state.permanent_mut(id) {
                        perm.power_modifier += power;
                        perm.toughness_modifier += toughness;
                    }
                })
            }
            Effect::GrantKeyword { keyword, recipient } => {
                Self::each_permanent(state, *recipient, ctx, |state, id| {
                    if let Some(perm) = state.permanent_mut(id) {
                        if !perm.granted_keywords.contains(keyword) {
                            perm.granted_keywords.push(*keyword);
                        }
                    }
                })
            }
            Effect::Tap { recipient } => Self::each_permanent(state, *recipient, ctx, |state, id| {
                if let Some(perm) = state.permanent_mut(id) {
                    perm.tapped = true;
                }
            }),
            Effect::Untap { recipient } => Self::each_permanent(state, *recipient, ctx, |state, id| {
                if let Some(perm) = state.permanent_mut(id) {
                    perm.tapped = false;
                }
            }),
            Effect::ReturnToHand { recipient } => Self::each_permanent(state, *recipient, ctx, |state, id| {
                state.return_to_hand(id);
            }),
            Effect::CreateToken { name, power, toughness, keywords, count } => {
                for _ in 0..*count {
                    let mut definition = CardDefinition::new(CardId::new(0), name.clone())
                        .with_type(CardType::Creature)
                        .with_power_toughness(*power, *toughness);
                    for keyword in keywords {
                        definition = definition.with_keyword(*keyword);
                    }
                    let id = state.allocate_entity();
                    let token = CardInstance::token(id, ctx.controller, definition);
                    state.put_onto_battlefield(Permanent::new(token, ctx.controller));
                }
                ResolveResult::Success
            }

            Effect::CounterSpell => {
                let Some(Target::StackEntry(id)) = ctx.target else {
                    return ResolveResult::Skipped("no stack entry targeted".into());
                };
                match state.stack.remove(id) {
                    Some(countered) => {
                        state.log(format!("{} is countered", countered.description));
                        if let Some(card) = countered.card {
                            state.put_into_graveyard(card);
                        }
                        ResolveResult::Success
                    }
                    None => ResolveResult::Skipped(format!("{id} already left the stack")),
                }
            }

            Effect::StaticBoost { .. } | Effect::BoostAttached { .. } | Effect::GrantKeywordAttached { .. } => {
                ResolveResult::Skipped("static effects are not applied".into())
            }

            Effect::May { effect, .. } => Self::apply(state, effect, ctx),
        }
    }

    /// Deal damage from `source` to a player or permanent.
    ///
    /// Damage to a permanent is marked on it. A source on the battlefield
    /// with deathtouch flags the damage as deathtouch damage; one with
    /// lifelink gains its controller that much life.
    pub fn deal_damage(state: &mut MatchState, source: EntityId, target: Target, amount: i32) {
        if amount <= 0 {
            return;
        }
        let (deathtouch, lifelink) = state.permanent(source).map_or((false, None), |p| {
            (
                state.has_keyword(p, Keyword::Deathtouch),
                state.has_keyword(p, Keyword::Lifelink).then_some(p.controller),
            )
        });

        match target {
            Target::Player(player) => {
                if !state.is_in_match(player) {
                    return;
                }
                state.players[player].life -= i64::from(amount);
                state.log(format!("{source} deals {amount} damage to {player}"));
            }
            Target::Permanent(id) => {
                let Some(perm) = state.permanent_mut(id) else {
                    return;
                };
                perm.marked_damage += amount;
                perm.deathtouch_damage |= deathtouch;
                let name = perm.name().to_string();
                state.log(format!("{source} deals {amount} damage to {name}"));
            }
            Target::StackEntry(_) => return,
        }

        if let Some(controller) = lifelink {
            state.players[controller].life += i64::from(amount);
        }
    }

    // === Recipient Resolution ===

    fn recipients(state: &MatchState, recipient: Recipient, ctx: &EffectContext) -> SmallVec<[Target; 2]> {
        match recipient {
            Recipient::Target => ctx.target.into_iter().collect(),
            Recipient::Source => state
                .permanent(ctx.source)
                .map(|p| Target::Permanent(p.id()))
                .into_iter()
                .collect(),
            Recipient::Controller => SmallVec::from_elem(Target::Player(ctx.controller), 1),
            Recipient::EachOpponent => state
                .opponents(ctx.controller)
                .into_iter()
                .map(Target::Player)
                .collect(),
        }
    }

    fn damage_each(state: &mut MatchState, amount: i32, recipient: Recipient, ctx: &EffectContext) -> ResolveResult {
        let targets = Self::recipients(state, recipient, ctx);
        if targets.is_empty() {
            return ResolveResult::Skipped("no damage recipient".into());
        }
        for target in targets {
            Self::deal_damage(state, ctx.source, target, amount);
        }
        ResolveResult::Success
    }

    fn each_player(
        state: &mut MatchState,
        recipient: Recipient,
        ctx: &EffectContext,
        mut apply: impl FnMut(&mut MatchState, PlayerId),
    ) -> ResolveResult {
        let players: SmallVec<[PlayerId; 2]> = Self::recipients(state, recipient, ctx)
            .into_iter()
            .filter_map(|t| match t {
                Target::Player(p) if state.is_in_match(p) => Some(p),
                _ => None,
            })
            .collect();
        if players.is_empty() {
            return ResolveResult::Skipped("no player to affect".into());
        }
        for player in players {
            apply(state, player);
        }
        ResolveResult::Success
    }

    fn each_permanent(
        state: &mut MatchState,
        recipient: Recipient,
        ctx: &EffectContext,
        mut apply: impl FnMut(&mut MatchState, EntityId),
    ) -> ResolveResult {
        let permanents: SmallVec<[EntityId; 2]> = Self::recipients(state, recipient, ctx)
            .into_iter()
            .filter_map(|t| match t {
                Target::Permanent(id) if state.permanent(id).is_some() => Some(id),
                _ => None,
            })
            .collect();
        if permanents.is_empty() {
            return ResolveResult::Skipped("no permanent to affect".into());
        }
        for id in permanents {
            apply(state, id);
        }
        ResolveResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MatchConfig, MatchId};
    use crate::mana::ManaColor;
    use crate::stack::StackEntryKind;

    fn state() -> MatchState {
        MatchState::new(MatchId::new(1), MatchConfig::default(), 2, 42)
    }

    fn creature(state: &mut MatchState, owner: PlayerId, p: i32, t: i32, keywords: &[Keyword]) -> EntityId {
        let id = state.allocate_entity();
        let mut def = CardDefinition::new(CardId::new(id.raw()), format!("Creature {}", id.raw()))
            .with_type(CardType::Creature)
            .with_power_toughness(p, t);
        for k in keywords {
            def = def.with_keyword(*k);
        }
        state.players[owner]
            .battlefield
            .push(Permanent::new(CardInstance::new(id, owner, def), owner));
        id
    }

    #[test]
    fn test_damage_to_player_and_each_opponent() {
        let mut state = state();
        let p0 = PlayerId::new(0);
        let ctx = EffectContext::new(p0, EntityId(99)).with_target(Target::Player(PlayerId::new(1)));

        EffectResolver::apply(&mut state, &Effect::deal_damage(3, Recipient::Target), &ctx);
        assert_eq!(state.players[PlayerId::new(1)].life, 17);

        EffectResolver::apply(&mut state, &Effect::deal_damage(2, Recipient::EachOpponent), &ctx);
        assert_eq!(state.players[PlayerId::new(1)].life, 15);
        assert_eq!(state.players[p0].life, 20);
    }

    #[test]
    fn test_x_damage_marks_permanent() {
        let mut state = state();
        let bear = creature(&mut state, PlayerId::new(1), 2, 2, &[]);
        let ctx = EffectContext::new(PlayerId::new(0), EntityId(99))
            .with_target(Target::Permanent(bear))
            .with_x(4);

        EffectResolver::apply(&mut state, &Effect::DealXDamage { recipient: Recipient::Target }, &ctx);
        assert_eq!(state.permanent(bear).unwrap().marked_damage, 4);
    }

    #[test]
    fn test_lifelink_and_deathtouch_sources() {
        let mut state = state();
        let p0 = PlayerId::new(0);
        let source = creature(&mut state, p0, 1, 1, &[Keyword::Lifelink, Keyword::Deathtouch]);
        let victim = creature(&mut state, PlayerId::new(1), 5, 5, &[]);

        EffectResolver::deal_damage(&mut state, source, Target::Permanent(victim), 1);

        let victim = state.permanent(victim).unwrap();
        assert_eq!(victim.marked_damage, 1);
        assert!(victim.deathtouch_damage);
        assert_eq!(state.players[p0].life, 21);
    }

    #[test]
    fn test_boost_and_grant_keyword() {
        let mut state = state();
        let bear = creature(&mut state, PlayerId::new(0), 2, 2, &[]);
        let ctx = EffectContext::new(PlayerId::new(0), EntityId(99)).with_target(Target::Permanent(bear));

        EffectResolver::apply(&mut state, &Effect::boost(3, 3, Recipient::Target), &ctx);
        EffectResolver::apply(
            &mut state,
            &Effect::GrantKeyword { keyword: Keyword::Trample, recipient: Recipient::Target },
            &ctx,
        );

        let perm = state.permanent(bear).unwrap();
        assert_eq!(perm.base_power(), 5);
        assert!(perm.has_own_keyword(Keyword::Trample));
    }

    #[test]
    fn test_missing_target_is_skipped() {
        let mut state = state();
        let ctx = EffectContext::new(PlayerId::new(0), EntityId(99)).with_target(Target::Permanent(EntityId(1234)));

        let result = EffectResolver::apply(&mut state, &Effect::Destroy { recipient: Recipient::Target }, &ctx);
        assert!(matches!(result, ResolveResult::Skipped(_)));
    }

    #[test]
    fn test_create_tokens_and_add_mana() {
        let mut state = state();
        let p0 = PlayerId::new(0);
        let ctx = EffectContext::new(p0, EntityId(99));

        EffectResolver::apply(
            &mut state,
            &Effect::CreateToken {
                name: "Soldier".into(),
                power: 1,
                toughness: 1,
                keywords: vec![Keyword::Vigilance],
                count: 2,
            },
            &ctx,
        );
        EffectResolver::apply(&mut state, &Effect::AddMana { color: ManaColor::Green, amount: 2 }, &ctx);

        let board = &state.players[p0];
        assert_eq!(board.battlefield.len(), 2);
        assert!(board.battlefield.iter().all(|p| p.card.is_token && p.has_own_keyword(Keyword::Vigilance)));
        assert_eq!(board.mana_pool.get(ManaColor::Green), 2);
        assert_eq!(state.events.len(), 2);
    }

    #[test]
    fn test_counter_spell_removes_entry() {
        let mut state = state();
        let p1 = PlayerId::new(1);
        let card_id = state.allocate_entity();
        let card = CardInstance::new(card_id, p1, CardDefinition::new(CardId::new(7), "Shock").with_type(CardType::Instant));
        let target_id = state
            .stack
            .push(StackEntry::new(StackEntryKind::Spell, card_id, p1, "Shock").with_card(card));

        let ctx = EffectContext::new(PlayerId::new(0), EntityId(99)).with_target(Target::StackEntry(target_id));
        assert_eq!(EffectResolver::apply(&mut state, &Effect::CounterSpell, &ctx), ResolveResult::Success);
        assert!(state.stack.is_empty());
        assert_eq!(state.players[p1].graveyard.len(), 1);
    }

    #[test]
    fn test_run_suspends_on_may() {
        let mut state = state();
        let p0 = PlayerId::new(0);
        let entry = StackEntry::new(StackEntryKind::TriggeredAbility, EntityId(99), p0, "test")
            .with_effects(vec![Effect::gain_life(1), Effect::may("Draw a card?", Effect::draw(1)), Effect::gain_life(1)]);

        let outcome = EffectResolver::run(&mut state, entry, 0);
        assert!(matches!(outcome, RunOutcome::Suspended));
        assert_eq!(state.players[p0].life, 21);
        match &state.pending_interaction {
            Some(PendingInteraction::MayEffectPrompt { effect_index, prompt, .. }) => {
                assert_eq!(*effect_index, 1);
                assert_eq!(prompt, "Draw a card?");
            }
            other => panic!("expected MayEffectPrompt, got {other:?}"),
        }
    }
}
