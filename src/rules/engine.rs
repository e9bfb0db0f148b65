//! The `Match` aggregate: every entry point a server calls.
//!
//! Each mutating method validates the request, applies it, appends it to
//! the action history, and runs state-based actions and trigger stacking
//! before returning. A rejected request returns an error and leaves the
//! match unchanged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::cards::{CardId, CardInstance, CardRegistry, Permanent};
use crate::combat::DamageAssignment;
use crate::core::{
    Action, ActionRecord, EntityId, MatchConfig, MatchId, MatchState, MatchStatus, PendingInteraction, PlayerId,
    Result, RulesError,
};
use crate::effects::Target;
use crate::mana::ManaPool;
use crate::stack::{self, StackEntry, StackEntryId};
use crate::triggers;
use crate::turn::{self, Step};

use super::view::PlayerView;

/// Result of a completed match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Every remaining player lost at once.
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Draw => false,
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::Winner(p) => write!(f, "{p} wins"),
            GameResult::Draw => write!(f, "draw"),
        }
    }
}

/// One match: its state plus the shared card registry.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use rust_tcg::cards::catalog;
/// use rust_tcg::core::{MatchConfig, MatchId, MatchStatus, PlayerId};
/// use rust_tcg::rules::Match;
///
/// let registry = Arc::new(catalog::reference_registry());
/// let deck = vec![catalog::MOUNTAIN; 20];
/// let mut m = Match::new(
///     MatchId::new(1),
///     registry,
///     vec![deck.clone(), deck],
///     PlayerId::new(0),
///     MatchConfig::default(),
///     42,
/// )
/// .unwrap();
///
/// assert_eq!(m.status(), MatchStatus::Mulligan);
/// m.keep_hand(PlayerId::new(0)).unwrap();
/// m.keep_hand(PlayerId::new(1)).unwrap();
/// assert_eq!(m.status(), MatchStatus::Running);
/// assert_eq!(m.priority_player(), Some(PlayerId::new(0)));
/// ```
#[derive(Clone, Debug)]
pub struct Match {
    state: MatchState,
    registry: Arc<CardRegistry>,
}

impl Match {
    /// Create a match and deal opening hands.
    ///
    /// `decks[i]` is the deck of `PlayerId(i)`; every card id must be in
    /// the registry.
    pub fn new(
        id: MatchId,
        registry: Arc<CardRegistry>,
        decks: Vec<Vec<CardId>>,
        starting_player: PlayerId,
        config: MatchConfig,
        seed: u64,
    ) -> Result<Self> {
        let player_count = decks.len();
        config.validate(player_count)?;
        if starting_player.index() >= player_count {
            return Err(RulesError::InvalidConfig(format!(
                "starting player {starting_player} is not seated"
            )));
        }

        let mut state = MatchState::new(id, config, player_count, seed);
        state.starting_player = starting_player;
        state.active_player = starting_player;

        for (seat, deck) in decks.iter().enumerate() {
            let player = PlayerId::new(seat as u8);
            for card_id in deck {
                let definition = registry.require(*card_id)?.clone();
                let entity = state.allocate_entity();
                state.players[player]
                    .library
                    .push(CardInstance::new(entity, player, definition));
            }
        }

        info!(match_id = %id, players = player_count, starting = %starting_player, seed, "match created");
        turn::deal_opening_hands(&mut state);
        Ok(Self { state, registry })
    }

    /// Rebuild a match from a `snapshot`.
    pub fn restore(registry: Arc<CardRegistry>, bytes: &[u8]) -> Result<Self> {
        let state: MatchState = bincode::deserialize(bytes)?;
        debug!(match_id = %state.id, "match restored");
        Ok(Self { state, registry })
    }

    /// Encode the full match state for persistence between requests.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.state)?)
    }

    // === Mulligan ===

    pub fn keep_hand(&mut self, player: PlayerId) -> Result<()> {
        self.run(player, Action::KeepHand, |state| turn::keep_hand(state, player))
    }

    pub fn mulligan(&mut self, player: PlayerId) -> Result<()> {
        self.run(player, Action::Mulligan, |state| turn::mulligan(state, player))
    }

    pub fn bottom_cards(&mut self, player: PlayerId, cards: &[EntityId]) -> Result<()> {
        self.run(player, Action::BottomCards(cards.to_vec()), |state| {
            turn::bottom_cards(state, player, cards)
        })
    }

    // === Priority actions ===

    pub fn play_land(&mut self, player: PlayerId, card: EntityId) -> Result<()> {
        self.run(player, Action::PlayLand { card }, |state| stack::play_land(state, player, card))
    }

    /// Cast a spell from hand. `x` is ignored by costs without `{X}`
    /// unless nonzero, which is rejected.
    pub fn cast_spell(&mut self, player: PlayerId, card: EntityId, target: Option<Target>, x: u32) -> Result<StackEntryId> {
        let mut id = None;
        self.run(player, Action::CastSpell { card, target, x }, |state| {
            id = Some(stack::cast_spell(state, player, card, target, x)?);
            Ok(())
        })?;
        id.ok_or_else(|| RulesError::illegal("spell was not cast"))
    }

    /// Activate an ability. Returns `None` for mana abilities, which do
    /// not use the stack.
    pub fn activate_ability(
        &mut self,
        player: PlayerId,
        permanent: EntityId,
        index: usize,
        target: Option<Target>,
        x: u32,
    ) -> Result<Option<StackEntryId>> {
        let mut id = None;
        let action = Action::ActivateAbility { permanent, index, target, x };
        self.run(player, action, |state| {
            id = stack::activate_ability(state, player, permanent, index, target, x)?;
            Ok(())
        })?;
        Ok(id)
    }

    pub fn pass_priority(&mut self, player: PlayerId) -> Result<()> {
        self.run(player, Action::PassPriority, |state| stack::pass_priority(state, player))
    }

    // === Combat ===

    pub fn declare_attackers(&mut self, player: PlayerId, attackers: &[EntityId]) -> Result<()> {
        let action = Action::DeclareAttackers(SmallVec::from_slice(attackers));
        self.run(player, action, |state| turn::declare_attackers(state, player, attackers))
    }

    /// Declare `(blocker, attacker)` pairs.
    pub fn declare_blockers(&mut self, player: PlayerId, blocks: &[(EntityId, EntityId)]) -> Result<()> {
        self.run(player, Action::DeclareBlockers(blocks.to_vec()), |state| {
            turn::declare_blockers(state, player, blocks)
        })
    }

    pub fn assign_combat_damage(
        &mut self,
        player: PlayerId,
        attacker: EntityId,
        assignment: DamageAssignment,
    ) -> Result<()> {
        let action = Action::AssignCombatDamage {
            attacker,
            assignment: assignment.clone(),
        };
        self.run(player, action, |state| {
            turn::assign_combat_damage(state, player, attacker, assignment)
        })
    }

    // === Interaction responses ===

    pub fn choose_target(&mut self, player: PlayerId, target: Target) -> Result<()> {
        self.run(player, Action::ChooseTarget(target), |state| {
            triggers::choose_target(state, player, target)
        })
    }

    pub fn answer_may(&mut self, player: PlayerId, accept: bool) -> Result<()> {
        self.run(player, Action::AnswerMay(accept), |state| stack::answer_may(state, player, accept))
    }

    pub fn discard(&mut self, player: PlayerId, cards: &[EntityId]) -> Result<()> {
        self.run(player, Action::Discard(cards.to_vec()), |state| turn::discard(state, player, cards))
    }

    /// Dispatch a decoded `Action` to its entry point.
    pub fn apply(&mut self, player: PlayerId, action: Action) -> Result<()> {
        match action {
            Action::KeepHand => self.keep_hand(player),
            Action::Mulligan => self.mulligan(player),
            Action::BottomCards(cards) => self.bottom_cards(player, &cards),
            Action::PlayLand { card } => self.play_land(player, card),
            Action::CastSpell { card, target, x } => self.cast_spell(player, card, target, x).map(|_| ()),
            Action::ActivateAbility { permanent, index, target, x } => {
                self.activate_ability(player, permanent, index, target, x).map(|_| ())
            }
            Action::PassPriority => self.pass_priority(player),
            Action::DeclareAttackers(attackers) => self.declare_attackers(player, &attackers),
            Action::DeclareBlockers(blocks) => self.declare_blockers(player, &blocks),
            Action::AssignCombatDamage { attacker, assignment } => {
                self.assign_combat_damage(player, attacker, assignment)
            }
            Action::ChooseTarget(target) => self.choose_target(player, target),
            Action::AnswerMay(accept) => self.answer_may(player, accept),
            Action::Discard(cards) => self.discard(player, &cards),
        }
    }

    fn run(&mut self, player: PlayerId, action: Action, op: impl FnOnce(&mut MatchState) -> Result<()>) -> Result<()> {
        self.state.board(player)?;
        if self.state.status == MatchStatus::Finished {
            return Err(RulesError::illegal("the match is over"));
        }
        if let Err(err) = op(&mut self.state) {
            debug!(match_id = %self.state.id, %player, action = action.name(), error = %err, "action rejected");
            return Err(err);
        }
        debug!(match_id = %self.state.id, %player, action = action.name(), "action accepted");
        self.state.record(player, action);
        turn::settle(&mut self.state);
        Ok(())
    }

    // === Views ===

    /// Full state, for trusted collaborators.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Mutable state, for tests and tooling that set up positions.
    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<CardRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn id(&self) -> MatchId {
        self.state.id
    }

    #[must_use]
    pub fn status(&self) -> MatchStatus {
        self.state.status
    }

    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.state.result.as_ref()
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.state.turn_number
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.state.active_player
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.state.step
    }

    #[must_use]
    pub fn priority_player(&self) -> Option<PlayerId> {
        self.state.stack.priority_player()
    }

    /// Stack entries, bottom to top.
    #[must_use]
    pub fn stack(&self) -> &[StackEntry] {
        self.state.stack.entries()
    }

    #[must_use]
    pub fn pending_interaction(&self) -> Option<&PendingInteraction> {
        self.state.pending_interaction.as_ref()
    }

    pub fn life(&self, player: PlayerId) -> Result<i64> {
        Ok(self.state.board(player)?.life)
    }

    pub fn hand_size(&self, player: PlayerId) -> Result<usize> {
        Ok(self.state.board(player)?.hand.len())
    }

    pub fn battlefield(&self, player: PlayerId) -> Result<&[Permanent]> {
        Ok(&self.state.board(player)?.battlefield)
    }

    pub fn mana_pool(&self, player: PlayerId) -> Result<ManaPool> {
        Ok(self.state.board(player)?.mana_pool)
    }

    /// Accepted actions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &ActionRecord> {
        self.state.history.iter()
    }

    /// Human-readable game log.
    pub fn game_log(&self) -> impl Iterator<Item = &String> {
        self.state.log.iter()
    }

    /// What `player` is allowed to see.
    pub fn view_for(&self, player: PlayerId) -> Result<PlayerView> {
        PlayerView::project(&self.state, player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::catalog;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn new_match() -> Match {
        let registry = Arc::new(catalog::reference_registry());
        let deck = vec![catalog::MOUNTAIN; 30];
        Match::new(MatchId::new(9), registry, vec![deck.clone(), deck], P0, MatchConfig::default(), 5).unwrap()
    }

    #[test]
    fn test_new_validates_decks_and_seats() {
        let registry = Arc::new(catalog::reference_registry());
        let unknown = vec![vec![CardId::new(60_000)], vec![catalog::MOUNTAIN]];
        assert!(matches!(
            Match::new(MatchId::new(1), registry.clone(), unknown, P0, MatchConfig::default(), 1),
            Err(RulesError::NotFound(_))
        ));

        let one = vec![vec![catalog::MOUNTAIN; 10]];
        assert!(matches!(
            Match::new(MatchId::new(1), registry.clone(), one, P0, MatchConfig::default(), 1),
            Err(RulesError::InvalidConfig(_))
        ));

        let decks = vec![vec![catalog::MOUNTAIN; 10], vec![catalog::MOUNTAIN; 10]];
        assert!(Match::new(MatchId::new(1), registry, decks, PlayerId::new(2), MatchConfig::default(), 1).is_err());
    }

    #[test]
    fn test_rejected_action_is_not_recorded() {
        let mut m = new_match();
        assert!(m.keep_hand(P1).is_err());
        assert_eq!(m.history().count(), 0);

        m.keep_hand(P0).unwrap();
        assert_eq!(m.history().count(), 1);
    }

    #[test]
    fn test_apply_dispatches_actions() {
        let mut m = new_match();
        m.apply(P0, Action::KeepHand).unwrap();
        m.apply(P1, Action::KeepHand).unwrap();
        m.apply(P0, Action::PassPriority).unwrap();
        assert_eq!(m.priority_player(), Some(P1));
        assert!(m.apply(P0, Action::PassPriority).is_err());
    }

    #[test]
    fn test_snapshot_restore() {
        let mut m = new_match();
        m.keep_hand(P0).unwrap();
        let bytes = m.snapshot().unwrap();

        let mut restored = Match::restore(m.registry().clone(), &bytes).unwrap();
        assert_eq!(restored.status(), MatchStatus::Mulligan);
        assert_eq!(restored.hand_size(P1).unwrap(), 7);
        assert_eq!(restored.history().count(), 1);

        restored.keep_hand(P1).unwrap();
        assert_eq!(restored.status(), MatchStatus::Running);
    }

    #[test]
    fn test_game_result_display() {
        assert_eq!(GameResult::Winner(P1).to_string(), "Player 1 wins");
        assert!(GameResult::Winner(P1).is_winner(P1));
        assert!(!GameResult::Draw.is_winner(P0));
    }
}
