//! The stack and priority bookkeeping.
//!
//! Entries resolve in LIFO order. Players pass priority in seat order;
//! when every player still in the match has passed in succession without
//! an intervening action, the top entry resolves (or the step ends if the
//! stack is empty).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::CardInstance;
use crate::core::{EntityId, PlayerId};
use crate::effects::{Effect, Target, TargetFilter};

/// Unique identifier for a stack entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackEntryId(pub u32);

impl StackEntryId {
    /// Create a new stack entry ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for StackEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StackEntry({})", self.0)
    }
}

/// What put an entry on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackEntryKind {
    Spell,
    TriggeredAbility,
    ActivatedAbility,
}

/// An entry on the stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    /// Assigned by `PriorityStack::push`.
    pub id: StackEntryId,

    pub kind: StackEntryKind,

    /// The spell's card or the permanent the ability comes from.
    pub source: EntityId,

    /// Who controls this entry (makes choices, receives its effects).
    pub controller: PlayerId,

    /// The card itself while a spell is on the stack.
    pub card: Option<CardInstance>,

    /// The effects to apply in order on resolution.
    pub effects: Vec<Effect>,

    pub target: Option<Target>,

    /// Re-checked against `target` on resolution.
    pub target_filter: Option<TargetFilter>,

    /// Value chosen for X when cast or activated.
    pub x: u32,

    pub description: String,
}

impl StackEntry {
    /// A new entry; the id is assigned when it is pushed.
    #[must_use]
    pub fn new(kind: StackEntryKind, source: EntityId, controller: PlayerId, description: impl Into<String>) -> Self {
        Self {
            id: StackEntryId::new(0),
            kind,
            source,
            controller,
            card: None,
            effects: Vec::new(),
            target: None,
            target_filter: None,
            x: 0,
            description: description.into(),
        }
    }

    /// Attach the spell's card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: CardInstance) -> Self {
        self.card = Some(card);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }

    /// Set the chosen target and the filter it must still pass on resolution.
    #[must_use]
    pub fn with_target(mut self, target: Target, filter: TargetFilter) -> Self {
        self.target = Some(target);
        self.target_filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_x(mut self, x: u32) -> Self {
        self.x = x;
        self
    }

    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.kind == StackEntryKind::Spell
    }
}

/// Result of a priority pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every player in the match passed in succession.
    AllPassed,
    /// Priority moves to this player.
    PriorityTo(PlayerId),
}

/// The stack plus who holds priority.
///
/// ## N-Player Support
///
/// Priority passes in seat order among the players still in the match.
/// `pass` takes that list so players who lost are skipped.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PriorityStack {
    /// Index 0 = bottom, last = top.
    entries: Vec<StackEntry>,

    priority_player: Option<PlayerId>,

    /// Players who passed since the last push, resolution or step change.
    passed_by: SmallVec<[PlayerId; 4]>,

    next_id: u32,
}

impl PriorityStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Stack ===

    /// Push an entry, assigning its ID. Clears the pass record.
    pub fn push(&mut self, mut entry: StackEntry) -> StackEntryId {
        let id = StackEntryId::new(self.next_id);
        self.next_id += 1;
        entry.id = id;
        self.entries.push(entry);
        self.passed_by.clear();
        id
    }

    /// Remove and return the top entry.
    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    #[must_use]
    pub fn peek_top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn get(&self, id: StackEntryId) -> Option<&StackEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Remove an entry from anywhere in the stack.
    pub fn remove(&mut self, id: StackEntryId) -> Option<StackEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    /// All entries, bottom to top.
    #[must_use]
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // === Priority ===

    #[must_use]
    pub fn priority_player(&self) -> Option<PlayerId> {
        self.priority_player
    }

    /// Give priority to a player and start a fresh round of passes.
    pub fn set_priority(&mut self, player: PlayerId) {
        self.priority_player = Some(player);
        self.passed_by.clear();
    }

    /// Nobody holds priority (turn-based actions, pending decisions).
    pub fn clear_priority(&mut self) {
        self.priority_player = None;
    }

    /// Forget earlier passes without moving priority.
    pub fn clear_passes(&mut self) {
        self.passed_by.clear();
    }

    #[must_use]
    pub fn has_passed(&self, player: PlayerId) -> bool {
        self.passed_by.contains(&player)
    }

    /// Record a pass by the priority holder.
    ///
    /// `in_match` lists the players still in the match in seat order.
    /// Returns `AllPassed` once each of them has passed, otherwise moves
    /// priority to the next of them after `player`.
    pub fn pass(&mut self, player: PlayerId, in_match: &[PlayerId]) -> PassOutcome {
        if !self.passed_by.contains(&player) {
            self.passed_by.push(player);
        }

        if in_match.iter().all(|p| self.passed_by.contains(p)) {
            self.priority_player = None;
            return PassOutcome::AllPassed;
        }

        let next = next_in_order(player, in_match);
        self.priority_player = Some(next);
        PassOutcome::PriorityTo(next)
    }
}

/// The seat after `player` among `in_match`, wrapping around.
fn next_in_order(player: PlayerId, in_match: &[PlayerId]) -> PlayerId {
    in_match
        .iter()
        .copied()
        .find(|p| *p > player)
        .or_else(|| in_match.first().copied())
        .unwrap_or(player)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(desc: &str) -> StackEntry {
        StackEntry::new(StackEntryKind::Spell, EntityId(10), PlayerId::new(0), desc)
    }

    fn seats(n: u8) -> Vec<PlayerId> {
        (0..n).map(PlayerId::new).collect()
    }

    #[test]
    fn test_push_assigns_ids_lifo() {
        let mut stack = PriorityStack::new();
        let a = stack.push(entry("a"));
        let b = stack.push(entry("b"));

        assert_ne!(a, b);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek_top().unwrap().description, "b");
        assert_eq!(stack.pop().unwrap().id, b);
        assert_eq!(stack.pop().unwrap().id, a);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_remove_from_middle() {
        let mut stack = PriorityStack::new();
        let a = stack.push(entry("a"));
        let _b = stack.push(entry("b"));

        assert_eq!(stack.remove(a).unwrap().description, "a");
        assert!(stack.get(a).is_none());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_all_players_pass() {
        let mut stack = PriorityStack::new();
        let order = seats(2);
        stack.set_priority(PlayerId::new(0));

        assert_eq!(stack.pass(PlayerId::new(0), &order), PassOutcome::PriorityTo(PlayerId::new(1)));
        assert_eq!(stack.priority_player(), Some(PlayerId::new(1)));
        assert_eq!(stack.pass(PlayerId::new(1), &order), PassOutcome::AllPassed);
        assert_eq!(stack.priority_player(), None);
    }

    #[test]
    fn test_push_resets_passes() {
        let mut stack = PriorityStack::new();
        let order = seats(3);
        stack.set_priority(PlayerId::new(0));

        stack.pass(PlayerId::new(0), &order);
        stack.pass(PlayerId::new(1), &order);
        stack.push(entry("response"));
        assert!(!stack.has_passed(PlayerId::new(0)));

        stack.set_priority(PlayerId::new(2));
        assert_eq!(stack.pass(PlayerId::new(2), &order), PassOutcome::PriorityTo(PlayerId::new(0)));
    }

    #[test]
    fn test_pass_skips_eliminated_players() {
        let mut stack = PriorityStack::new();
        let order = vec![PlayerId::new(0), PlayerId::new(2)];
        stack.set_priority(PlayerId::new(0));

        assert_eq!(stack.pass(PlayerId::new(0), &order), PassOutcome::PriorityTo(PlayerId::new(2)));
        assert_eq!(stack.pass(PlayerId::new(2), &order), PassOutcome::AllPassed);
    }

    #[test]
    fn test_next_wraps_around() {
        assert_eq!(next_in_order(PlayerId::new(3), &seats(4)), PlayerId::new(0));
        assert_eq!(next_in_order(PlayerId::new(1), &seats(4)), PlayerId::new(2));
    }

    #[test]
    fn test_stack_serialization() {
        let mut stack = PriorityStack::new();
        stack.push(entry("bolt").with_x(2));
        stack.set_priority(PlayerId::new(1));

        let bytes = bincode::serialize(&stack).unwrap();
        let restored: PriorityStack = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored.entries(), stack.entries());
        assert_eq!(restored.priority_player(), Some(PlayerId::new(1)));
    }
}
