//! Match state: the aggregate root of one game.
//!
//! `MatchState` holds everything the rules read or write: players' boards,
//! the stack and priority, the current step, combat bookkeeping, pending
//! triggers and the active `PendingInteraction`. It is exclusively owned by
//! a `Match` and mutated only through the engine's entry points.
//!
//! ## Ownership
//!
//! Each zone owns its cards. A permanent refers to another (aura
//! attachment, blocking) by `EntityId` only and resolves the reference by
//! lookup, so a dangling reference is simply a failed lookup.
//!
//! ## Zones
//!
//! Libraries are ordered bottom-first: the top card is the last element.

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::action::{Action, ActionRecord};
use super::config::MatchConfig;
use super::entity::{EntityId, MatchId};
use super::error::{Result, RulesError};
use super::interaction::PendingInteraction;
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::cards::{CardInstance, Keyword, Permanent};
use crate::combat::CombatState;
use crate::effects::{Effect, EffectSlot, FilterContext, Target};
use crate::mana::ManaPool;
use crate::rules::GameResult;
use crate::stack::PriorityStack;
use crate::triggers::{GameEvent, PendingTrigger};
use crate::turn::Step;

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Lobby,
    /// Opening hands dealt; players are deciding on mulligans.
    Mulligan,
    Running,
    Finished,
}

/// Everything one player has in the match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerBoard {
    /// May go negative.
    pub life: i64,
    pub mana_pool: ManaPool,
    pub battlefield: Vec<Permanent>,
    pub hand: Vec<CardInstance>,
    /// Top card is the last element.
    pub library: Vec<CardInstance>,
    pub graveyard: Vec<CardInstance>,

    pub lands_played_this_turn: u32,

    // === Mulligan ===
    pub mulligans: u32,
    pub kept_hand: bool,

    // === Loss conditions ===
    pub has_lost: bool,
    /// Tried to draw from an empty library since the last state-based check.
    pub drew_from_empty_library: bool,
}

impl PlayerBoard {
    #[must_use]
    pub fn new(life: i64) -> Self {
        Self {
            life,
            mana_pool: ManaPool::new(),
            battlefield: Vec::new(),
            hand: Vec::new(),
            library: Vec::new(),
            graveyard: Vec::new(),
            lands_played_this_turn: 0,
            mulligans: 0,
            kept_hand: false,
            has_lost: false,
            drew_from_empty_library: false,
        }
    }

    /// Find a card in hand.
    #[must_use]
    pub fn hand_card(&self, id: EntityId) -> Option<&CardInstance> {
        self.hand.iter().find(|c| c.id == id)
    }

    /// Remove a card from hand.
    pub fn take_from_hand(&mut self, id: EntityId) -> Option<CardInstance> {
        let index = self.hand.iter().position(|c| c.id == id)?;
        Some(self.hand.remove(index))
    }
}

/// Complete state of one match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchState {
    pub id: MatchId,
    pub config: MatchConfig,
    pub status: MatchStatus,

    // === Turn structure ===
    /// Starts at 1.
    pub turn_number: u32,
    pub active_player: PlayerId,
    pub starting_player: PlayerId,
    pub step: Step,

    // === Stack and priority ===
    pub stack: PriorityStack,

    // === Players ===
    pub players: PlayerMap<PlayerBoard>,

    // === Suspension ===
    pub pending_interaction: Option<PendingInteraction>,
    /// Triggers waiting to be put on the stack, already in APNAP order.
    pub pending_triggers: Vec<PendingTrigger>,
    /// Events not yet scanned for triggers.
    pub events: Vec<GameEvent>,

    pub combat: CombatState,
    pub result: Option<GameResult>,

    /// Deterministic RNG.
    pub rng: GameRng,

    // === History ===
    pub history: Vector<ActionRecord>,
    pub log: Vector<String>,

    next_entity: EntityId,
    action_sequence: u32,
}

impl MatchState {
    /// Create a match in the lobby with empty boards.
    #[must_use]
    pub fn new(id: MatchId, config: MatchConfig, player_count: usize, seed: u64) -> Self {
        let life = config.starting_life;
        Self {
            id,
            config,
            status: MatchStatus::Lobby,
            turn_number: 1,
            active_player: PlayerId::new(0),
            starting_player: PlayerId::new(0),
            step: Step::Untap,
            stack: PriorityStack::new(),
            players: PlayerMap::new(player_count, |_| PlayerBoard::new(life)),
            pending_interaction: None,
            pending_triggers: Vec::new(),
            events: Vec::new(),
            combat: CombatState::default(),
            result: None,
            rng: GameRng::new(seed),
            history: Vector::new(),
            log: Vector::new(),
            next_entity: EntityId::FIRST,
            action_sequence: 0,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    /// Allocate a new entity ID.
    pub fn allocate_entity(&mut self) -> EntityId {
        let id = self.next_entity;
        self.next_entity = id.next();
        id
    }

    // === Players ===

    /// Seated and not yet lost.
    #[must_use]
    pub fn is_in_match(&self, player: PlayerId) -> bool {
        self.players.get(player).is_some_and(|b| !b.has_lost)
    }

    /// Players still in the match, in seat order.
    #[must_use]
    pub fn players_in_match(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|(_, board)| !board.has_lost)
            .map(|(p, _)| p)
            .collect()
    }

    /// Players still in the match in turn order starting with `first`
    /// (included if still in the match).
    #[must_use]
    pub fn players_in_match_from(&self, first: PlayerId) -> Vec<PlayerId> {
        let count = self.player_count();
        let mut order = Vec::with_capacity(count);
        let mut player = first;
        for _ in 0..count {
            if self.is_in_match(player) {
                order.push(player);
            }
            player = player.next_seat(count);
        }
        order
    }

    /// Next player in turn order after `player` who is still in the match.
    #[must_use]
    pub fn next_in_match(&self, player: PlayerId) -> PlayerId {
        let count = self.player_count();
        let mut next = player.next_seat(count);
        for _ in 0..count {
            if self.is_in_match(next) {
                return next;
            }
            next = next.next_seat(count);
        }
        player
    }

    /// Opponents of `player` still in the match, in seat order.
    #[must_use]
    pub fn opponents(&self, player: PlayerId) -> Vec<PlayerId> {
        self.players_in_match().into_iter().filter(|p| *p != player).collect()
    }

    /// Player attacked by the active player this turn.
    #[must_use]
    pub fn defending_player(&self) -> PlayerId {
        self.next_in_match(self.active_player)
    }

    /// Board of a player, or an error for an unknown seat.
    pub fn board(&self, player: PlayerId) -> Result<&PlayerBoard> {
        self.players
            .get(player)
            .ok_or_else(|| RulesError::not_found(format!("{player} is not seated in this match")))
    }

    // === Permanents ===

    /// All permanents, by seat then battlefield order.
    pub fn permanents(&self) -> impl Iterator<Item = &Permanent> {
        self.players.iter().flat_map(|(_, board)| board.battlefield.iter())
    }

    #[must_use]
    pub fn permanent(&self, id: EntityId) -> Option<&Permanent> {
        self.permanents().find(|p| p.id() == id)
    }

    pub fn permanent_mut(&mut self, id: EntityId) -> Option<&mut Permanent> {
        self.players
            .iter_mut()
            .flat_map(|(_, board)| board.battlefield.iter_mut())
            .find(|p| p.id() == id)
    }

    /// Look up a permanent or fail with `NotFound`.
    pub fn require_permanent(&self, id: EntityId) -> Result<&Permanent> {
        self.permanent(id)
            .ok_or_else(|| RulesError::not_found(format!("{id} is not on the battlefield")))
    }

    /// Take a permanent off the battlefield.
    pub fn remove_permanent(&mut self, id: EntityId) -> Option<Permanent> {
        for (_, board) in self.players.iter_mut() {
            if let Some(index) = board.battlefield.iter().position(|p| p.id() == id) {
                return Some(board.battlefield.remove(index));
            }
        }
        None
    }

    /// Put a permanent onto its controller's battlefield and fire its
    /// enters-the-battlefield event.
    pub fn put_onto_battlefield(&mut self, permanent: Permanent) {
        let id = permanent.id();
        let controller = permanent.controller;
        self.log(format!("{} enters the battlefield under {controller}'s control", permanent.card));
        self.players[controller].battlefield.push(permanent);
        self.emit(GameEvent::EnteredBattlefield { permanent: id });
    }

    /// Put a card into its owner's graveyard. Tokens cease to exist.
    pub fn put_into_graveyard(&mut self, card: CardInstance) {
        if card.is_token {
            return;
        }
        let owner = card.owner;
        self.players[owner].graveyard.push(card);
    }

    /// Move a permanent to its owner's graveyard. Creatures fire a death
    /// event. Returns false if it was not on the battlefield.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(permanent) = self.remove_permanent(id) else {
            return false;
        };
        let controller = permanent.controller;
        let was_creature = permanent.is_creature();
        self.log(format!("{} is put into the graveyard", permanent.card));
        self.put_into_graveyard(permanent.card);
        if was_creature {
            self.emit(GameEvent::Died { card: id, controller });
        }
        true
    }

    /// Return a permanent to its owner's hand. Tokens cease to exist.
    pub fn return_to_hand(&mut self, id: EntityId) -> bool {
        let Some(permanent) = self.remove_permanent(id) else {
            return false;
        };
        let card = permanent.card;
        self.log(format!("{card} returns to its owner's hand"));
        if !card.is_token {
            let owner = card.owner;
            self.players[owner].hand.push(card);
        }
        true
    }

    // === Characteristics ===

    /// Power including anthems and attached boosts.
    #[must_use]
    pub fn effective_power(&self, permanent: &Permanent) -> i32 {
        let (power, _) = self.static_boosts(permanent);
        permanent.base_power() + power
    }

    /// Toughness including anthems and attached boosts.
    #[must_use]
    pub fn effective_toughness(&self, permanent: &Permanent) -> i32 {
        let (_, toughness) = self.static_boosts(permanent);
        permanent.base_toughness() + toughness
    }

    /// Printed, granted, or conferred by something attached to it.
    #[must_use]
    pub fn has_keyword(&self, permanent: &Permanent, keyword: Keyword) -> bool {
        if permanent.has_own_keyword(keyword) {
            return true;
        }
        let id = permanent.id();
        self.permanents()
            .filter(|source| source.attached_to == Some(id))
            .flat_map(|source| source.definition().effects_for(EffectSlot::Static))
            .any(|effect| matches!(effect, Effect::GrantKeywordAttached { keyword: k } if *k == keyword))
    }

    /// Sum of static power/toughness bonuses applying to `permanent`.
    ///
    /// Anthem filters are evaluated from the anthem controller's point of
    /// view. They see printed and granted keywords only, never other
    /// static effects.
    fn static_boosts(&self, permanent: &Permanent) -> (i32, i32) {
        let target = Target::Permanent(permanent.id());
        let mut power = 0;
        let mut toughness = 0;
        for source in self.permanents() {
            for effect in source.definition().effects_for(EffectSlot::Static) {
                match effect {
                    Effect::StaticBoost { filter, power: p, toughness: t } => {
                        let ctx = FilterContext::new(self, source.controller).with_source(source.id());
                        if filter.evaluate(&ctx, &target).is_pass() {
                            power += p;
                            toughness += t;
                        }
                    }
                    Effect::BoostAttached { power: p, toughness: t }
                        if source.attached_to == Some(permanent.id()) =>
                    {
                        power += p;
                        toughness += t;
                    }
                    _ => {}
                }
            }
        }
        (power, toughness)
    }

    // === Cards ===

    /// Draw cards from the top of the library. Drawing from an empty
    /// library flags the player for a state-based loss.
    pub fn draw_cards(&mut self, player: PlayerId, count: u32) {
        for _ in 0..count {
            let board = &mut self.players[player];
            match board.library.pop() {
                Some(card) => board.hand.push(card),
                None => {
                    board.drew_from_empty_library = true;
                    debug!(match_id = %self.id, %player, "draw from empty library");
                    return;
                }
            }
        }
    }

    // === Mana ===

    /// Empty every mana pool.
    pub fn drain_mana_pools(&mut self) {
        for (_, board) in self.players.iter_mut() {
            board.mana_pool.clear();
        }
    }

    // === Validation ===

    /// A player may take a priority action: the match is running, nothing
    /// is pending, and they hold priority.
    pub fn ensure_priority(&self, player: PlayerId) -> Result<()> {
        self.ensure_running()?;
        if let Some(pending) = &self.pending_interaction {
            return Err(RulesError::illegal(format!("waiting for {pending}")));
        }
        if self.stack.priority_player() != Some(player) {
            return Err(RulesError::illegal(format!("{player} does not hold priority")));
        }
        Ok(())
    }

    /// The match has started and not finished.
    pub fn ensure_running(&self) -> Result<()> {
        match self.status {
            MatchStatus::Running => Ok(()),
            MatchStatus::Finished => Err(RulesError::illegal("the match is over")),
            MatchStatus::Lobby | MatchStatus::Mulligan => Err(RulesError::illegal("the match has not started")),
        }
    }

    /// Sorcery timing: own turn, main step, empty stack.
    pub fn ensure_sorcery_timing(&self, player: PlayerId) -> Result<()> {
        if player != self.active_player {
            return Err(RulesError::illegal("sorcery-speed actions require your own turn"));
        }
        if !self.step.is_main() {
            return Err(RulesError::illegal("sorcery-speed actions require a main step"));
        }
        if !self.stack.is_empty() {
            return Err(RulesError::illegal("sorcery-speed actions require an empty stack"));
        }
        Ok(())
    }

    // === Events and history ===

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Append a line to the game log.
    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push_back(line.into());
    }

    /// Append an accepted action to the history.
    pub fn record(&mut self, player: PlayerId, action: Action) {
        let sequence = self.action_sequence;
        self.action_sequence += 1;
        self.history
            .push_back(ActionRecord::new(player, action, self.turn_number, sequence));
    }
}
