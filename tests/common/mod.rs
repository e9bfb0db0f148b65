//! Shared harness for integration tests.
//!
//! Builds two-player matches from the reference catalog, skips the
//! mulligan, and sets up board positions directly on the match state.

#![allow(dead_code)]

use std::sync::Arc;

use rust_tcg::cards::{catalog, CardId, CardInstance, CardRegistry, Permanent};
use rust_tcg::{EntityId, ManaColor, Match, MatchConfig, MatchId, PlayerId, Step};

pub const P0: PlayerId = PlayerId::new(0);
pub const P1: PlayerId = PlayerId::new(1);
pub const P2: PlayerId = PlayerId::new(2);

pub fn registry() -> Arc<CardRegistry> {
    Arc::new(catalog::reference_registry())
}

/// A match with `players` decks of 40 Forests, opening hands dealt.
pub fn dealt(players: usize, config: MatchConfig) -> Match {
    let decks = vec![vec![catalog::FOREST; 40]; players];
    Match::new(MatchId::new(1), registry(), decks, P0, config, 42).unwrap()
}

/// A two-player match where everyone kept, in turn 1's upkeep.
pub fn started() -> Match {
    started_with(2, MatchConfig::default())
}

pub fn started_with(players: usize, config: MatchConfig) -> Match {
    let mut m = dealt(players, config);
    for seat in 0..players {
        m.keep_hand(PlayerId::new(seat as u8)).unwrap();
    }
    assert_eq!(m.step(), Step::Upkeep);
    m
}

fn instance(m: &mut Match, owner: PlayerId, card: CardId) -> CardInstance {
    let definition = m.registry().require(card).unwrap().clone();
    let id = m.state_mut().allocate_entity();
    CardInstance::new(id, owner, definition)
}

/// Put a card straight onto the battlefield, untapped and able to attack.
pub fn put_permanent(m: &mut Match, controller: PlayerId, card: CardId) -> EntityId {
    let mut permanent = Permanent::new(instance(m, controller, card), controller);
    permanent.summoning_sick = false;
    let id = permanent.id();
    m.state_mut().players[controller].battlefield.push(permanent);
    id
}

/// Put an aura onto the battlefield attached to `host`.
pub fn attach(m: &mut Match, controller: PlayerId, card: CardId, host: EntityId) -> EntityId {
    let mut permanent = Permanent::new(instance(m, controller, card), controller);
    permanent.attached_to = Some(host);
    let id = permanent.id();
    m.state_mut().players[controller].battlefield.push(permanent);
    id
}

pub fn put_in_hand(m: &mut Match, player: PlayerId, card: CardId) -> EntityId {
    let instance = instance(m, player, card);
    let id = instance.id;
    m.state_mut().players[player].hand.push(instance);
    id
}

pub fn add_mana(m: &mut Match, player: PlayerId, color: ManaColor, amount: u32) {
    m.state_mut().players[player].mana_pool.add(color, amount);
}

/// The current priority holder passes.
pub fn pass(m: &mut Match) {
    let holder = m.priority_player().expect("someone holds priority");
    m.pass_priority(holder).unwrap();
}

/// Pass priority until the match reaches `step` (of any turn).
pub fn advance_to(m: &mut Match, step: Step) {
    for _ in 0..200 {
        if m.step() == step {
            return;
        }
        assert!(
            m.pending_interaction().is_none(),
            "stuck on {:?} before reaching {step}",
            m.pending_interaction()
        );
        pass(m);
    }
    panic!("never reached {step}");
}

/// Pass priority until the stack is empty again.
pub fn resolve_stack(m: &mut Match) {
    for _ in 0..50 {
        if m.stack().is_empty() {
            return;
        }
        pass(m);
    }
    panic!("stack did not empty");
}

pub fn permanent(m: &Match, id: EntityId) -> Option<&Permanent> {
    m.state().permanent(id)
}
