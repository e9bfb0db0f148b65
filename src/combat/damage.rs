//! Combat damage assignment and application.
//!
//! When the combat damage step begins, every attacking creature gets a
//! `DamageContext`. Attackers whose damage has only one legal split
//! resolve automatically; the rest raise a `CombatDamageAssignment`
//! interaction, one attacker at a time. Once every assignment is in, all
//! combat damage is dealt at once.
//!
//! If any attacker or blocker has first strike or double strike, the step
//! runs two passes. First and double strikers deal damage in the first;
//! state-based actions follow; then survivors without first strike, and
//! double strikers again, deal damage in the regular pass. Lethal amounts
//! for the regular pass account for damage already marked.
//!
//! ## Assignment rules
//!
//! Entries are read in the order given. Each blocker must receive its
//! remaining lethal damage before a later recipient receives anything;
//! the last recipient may take any remainder. Damage to the defending
//! player requires trample (after every blocker has lethal damage) or
//! "assign as though unblocked" (all damage to the player).

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cards::{Keyword, Permanent};
use crate::core::{EntityId, MatchState, MatchStatus, PendingInteraction, PlayerId, Result, RulesError};
use crate::effects::{EffectResolver, Target};
use crate::rules::state_based;

/// A combat damage pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamagePass {
    /// Only first and double strikers deal damage.
    FirstStrike,
    /// Everyone except first-strike-only creatures deals damage.
    #[default]
    Regular,
}

impl DamagePass {
    /// Whether `permanent` deals combat damage in this pass.
    #[must_use]
    pub fn strikes(self, state: &MatchState, permanent: &Permanent) -> bool {
        let first = state.has_keyword(permanent, Keyword::FirstStrike);
        let double = state.has_keyword(permanent, Keyword::DoubleStrike);
        match self {
            DamagePass::FirstStrike => first || double,
            DamagePass::Regular => !first || double,
        }
    }
}

/// Something that can receive an attacker's combat damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageRecipient {
    Blocker(EntityId),
    Player(PlayerId),
}

impl DamageRecipient {
    fn target(self) -> Target {
        match self {
            DamageRecipient::Blocker(id) => Target::Permanent(id),
            DamageRecipient::Player(p) => Target::Player(p),
        }
    }
}

/// Ordered split of one attacker's damage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageAssignment {
    pub entries: Vec<(DamageRecipient, i32)>,
}

impl DamageAssignment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append damage to a blocker (builder pattern).
    #[must_use]
    pub fn to_blocker(mut self, blocker: EntityId, amount: i32) -> Self {
        self.entries.push((DamageRecipient::Blocker(blocker), amount));
        self
    }

    /// Append damage to a player (builder pattern).
    #[must_use]
    pub fn to_player(mut self, player: PlayerId, amount: i32) -> Self {
        self.entries.push((DamageRecipient::Player(player), amount));
        self
    }

    /// Sum of all entries, widened so client-supplied amounts can't overflow.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.entries.iter().map(|(_, amount)| i64::from(*amount)).sum()
    }

    /// Amount assigned to one recipient.
    #[must_use]
    pub fn amount_to(&self, recipient: DamageRecipient) -> i64 {
        self.entries
            .iter()
            .filter(|(r, _)| *r == recipient)
            .map(|(_, amount)| i64::from(*amount))
            .sum()
    }
}

/// A blocker and the damage still needed to destroy it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerLethal {
    pub id: EntityId,
    pub lethal: i32,
}

/// What the controller of one attacker needs to assign its damage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageContext {
    pub attacker: EntityId,
    pub controller: PlayerId,
    /// Effective power when the step began.
    pub power: i32,
    pub defender: PlayerId,
    /// Blockers still on the battlefield, in block order.
    pub blockers: Vec<BlockerLethal>,
    pub trample: bool,
    pub assign_as_unblocked: bool,
}

impl DamageContext {
    /// Build the context for an attacker, or `None` if it left combat.
    #[must_use]
    pub fn build(state: &MatchState, attacker: EntityId) -> Option<Self> {
        let perm = state.permanent(attacker).filter(|p| p.attacking)?;
        let deathtouch = state.has_keyword(perm, Keyword::Deathtouch);

        let blockers = state
            .combat
            .blockers_of(attacker)
            .into_iter()
            .filter_map(|id| state.permanent(id))
            .map(|blocker| {
                let remaining = (state.effective_toughness(blocker) - blocker.marked_damage).max(0);
                BlockerLethal {
                    id: blocker.id(),
                    lethal: if deathtouch { remaining.min(1) } else { remaining },
                }
            })
            .collect();

        Some(Self {
            attacker,
            controller: perm.controller,
            power: state.effective_power(perm).max(0),
            defender: state.combat.defending_player.unwrap_or_else(|| state.defending_player()),
            blockers,
            trample: state.has_keyword(perm, Keyword::Trample),
            assign_as_unblocked: state.has_keyword(perm, Keyword::AssignAsThoughUnblocked),
        })
    }

    /// The assignment when there is only one legal way to split damage.
    #[must_use]
    pub fn automatic(&self, was_blocked: bool) -> Option<DamageAssignment> {
        if self.power == 0 {
            return Some(DamageAssignment::new());
        }
        if !was_blocked {
            return Some(DamageAssignment::new().to_player(self.defender, self.power));
        }
        match self.blockers.as_slice() {
            // Blocked, but every blocker left combat.
            [] if self.trample => Some(DamageAssignment::new().to_player(self.defender, self.power)),
            [] => Some(DamageAssignment::new()),
            [only] if !self.trample && !self.assign_as_unblocked => {
                Some(DamageAssignment::new().to_blocker(only.id, self.power))
            }
            _ => None,
        }
    }

    fn lethal_of(&self, blocker: EntityId) -> Option<i32> {
        self.blockers.iter().find(|b| b.id == blocker).map(|b| b.lethal)
    }
}

/// Check a submitted assignment against its context.
pub fn validate_assignment(ctx: &DamageContext, assignment: &DamageAssignment) -> Result<()> {
    let invalid = |reason: String| Err(RulesError::InvalidDamageAssignment(reason));

    for (index, (recipient, amount)) in assignment.entries.iter().enumerate() {
        if *amount < 0 {
            return invalid(format!("negative damage to {recipient:?}"));
        }
        if *amount > ctx.power {
            return invalid(format!("{amount} damage to {recipient:?} exceeds power {}", ctx.power));
        }
        if assignment.entries[..index].iter().any(|(r, _)| r == recipient) {
            return invalid(format!("{recipient:?} appears more than once"));
        }
        match recipient {
            DamageRecipient::Blocker(id) if ctx.lethal_of(*id).is_none() => {
                return invalid(format!("{id} is not blocking {}", ctx.attacker));
            }
            DamageRecipient::Player(p) if *p != ctx.defender => {
                return invalid(format!("{p} is not the defending player"));
            }
            DamageRecipient::Player(_) if !ctx.trample && !ctx.assign_as_unblocked => {
                return invalid("damage to the player requires trample".into());
            }
            _ => {}
        }
    }

    let total = assignment.total();
    if total != i64::from(ctx.power) {
        return invalid(format!("assigned {total} damage, power is {}", ctx.power));
    }

    let to_player = assignment.amount_to(DamageRecipient::Player(ctx.defender));

    // Assigned as though unblocked.
    if ctx.assign_as_unblocked && to_player == i64::from(ctx.power) {
        return Ok(());
    }

    if to_player > 0 {
        if !ctx.trample {
            return invalid("without trample, damage goes either all to the player or all to blockers".into());
        }
        if let Some(short) = ctx
            .blockers
            .iter()
            .find(|b| assignment.amount_to(DamageRecipient::Blocker(b.id)) < i64::from(b.lethal))
        {
            return invalid(format!(
                "{} must be assigned lethal damage ({}) before the player",
                short.id, short.lethal
            ));
        }
    }

    let mut short_of_lethal: Option<EntityId> = None;
    for (recipient, amount) in &assignment.entries {
        if let Some(earlier) = short_of_lethal {
            if *amount > 0 {
                return invalid(format!("{earlier} must be assigned lethal damage before {recipient:?}"));
            }
        }
        if let DamageRecipient::Blocker(id) = recipient {
            let lethal = ctx.lethal_of(*id).unwrap_or(0);
            if *amount < lethal {
                short_of_lethal = Some(*id);
            }
        }
    }

    Ok(())
}

// === Step flow ===

/// Start the combat damage step. Returns true if it paused for an
/// assignment; otherwise damage has been dealt.
pub fn begin(state: &mut MatchState) -> bool {
    state.combat.pass = if any_first_strike(state) {
        DamagePass::FirstStrike
    } else {
        DamagePass::Regular
    };
    start_pass(state)
}

fn any_first_strike(state: &MatchState) -> bool {
    state
        .combat
        .attackers
        .iter()
        .chain(state.combat.blocks.iter().map(|(blocker, _)| blocker))
        .filter_map(|id| state.permanent(*id))
        .any(|p| DamagePass::FirstStrike.strikes(state, p))
}

/// Collect automatic assignments for the current pass and ask for the
/// rest. Returns true if paused.
fn start_pass(state: &mut MatchState) -> bool {
    state.combat.assignments.clear();
    state.combat.awaiting.clear();
    let pass = state.combat.pass;

    let attackers = state.combat.attackers.clone();
    for attacker in attackers {
        let Some(perm) = state.permanent(attacker) else {
            continue;
        };
        if !pass.strikes(state, perm) {
            continue;
        }
        let was_blocked = perm.was_blocked;
        let Some(ctx) = DamageContext::build(state, attacker) else {
            continue;
        };
        match ctx.automatic(was_blocked) {
            Some(assignment) => state.combat.assignments.push((attacker, assignment)),
            None => state.combat.awaiting.push(ctx),
        }
    }

    if request_next(state) {
        return true;
    }
    finish_pass(state)
}

/// Deal the current pass's damage; after the first-strike pass, run
/// state-based actions and start the regular pass. Returns true if the
/// regular pass paused.
fn finish_pass(state: &mut MatchState) -> bool {
    apply(state);
    if state.combat.pass == DamagePass::Regular {
        return false;
    }
    state_based::check(state);
    if state.status != MatchStatus::Running {
        return false;
    }
    state.combat.pass = DamagePass::Regular;
    start_pass(state)
}

/// Accept an assignment for the attacker the interaction is asking about.
/// Returns true once every assignment is in and damage has been dealt.
pub fn submit(state: &mut MatchState, player: PlayerId, attacker: EntityId, assignment: DamageAssignment) -> Result<bool> {
    let ctx = match &state.pending_interaction {
        Some(PendingInteraction::CombatDamageAssignment { player: p, context }) if *p == player => context,
        Some(PendingInteraction::CombatDamageAssignment { .. }) => {
            return Err(RulesError::illegal(format!("{player} is not assigning combat damage")));
        }
        _ => return Err(RulesError::illegal("no combat damage assignment is pending")),
    };
    if ctx.attacker != attacker {
        return Err(RulesError::InvalidDamageAssignment(format!(
            "expected an assignment for {}, got {attacker}",
            ctx.attacker
        )));
    }
    validate_assignment(ctx, &assignment)?;

    debug!(match_id = %state.id, %attacker, total = assignment.total(), "damage assignment accepted");
    state.pending_interaction = None;
    state.combat.assignments.push((attacker, assignment));

    if request_next(state) {
        return Ok(false);
    }
    Ok(!finish_pass(state))
}

/// Raise the interaction for the next attacker awaiting assignment.
fn request_next(state: &mut MatchState) -> bool {
    if state.combat.awaiting.is_empty() {
        return false;
    }
    let context = state.combat.awaiting.remove(0);
    state.pending_interaction = Some(PendingInteraction::CombatDamageAssignment {
        player: context.controller,
        context,
    });
    true
}

/// Deal all combat damage simultaneously.
///
/// Every amount is computed before any is dealt, so blockers that will be
/// destroyed still strike back.
fn apply(state: &mut MatchState) {
    let mut hits: Vec<(EntityId, Target, i32)> = Vec::new();

    for (attacker, assignment) in &state.combat.assignments {
        for (recipient, amount) in &assignment.entries {
            hits.push((*attacker, recipient.target(), *amount));
        }
    }
    let pass = state.combat.pass;
    for (blocker, attacker) in &state.combat.blocks {
        let (Some(blocker_perm), Some(_)) = (state.permanent(*blocker), state.permanent(*attacker)) else {
            continue;
        };
        if pass.strikes(state, blocker_perm) {
            hits.push((*blocker, Target::Permanent(*attacker), state.effective_power(blocker_perm)));
        }
    }

    for (source, target, amount) in hits {
        EffectResolver::deal_damage(state, source, target, amount);
    }
    state.combat.assignments.clear();
    info!(match_id = %state.id, ?pass, "combat damage dealt");
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFENDER: PlayerId = PlayerId::new(1);

    fn ctx(power: i32, lethals: &[i32], trample: bool, unblocked: bool) -> DamageContext {
        DamageContext {
            attacker: EntityId(100),
            controller: PlayerId::new(0),
            power,
            defender: DEFENDER,
            blockers: lethals
                .iter()
                .enumerate()
                .map(|(i, lethal)| BlockerLethal { id: EntityId(200 + i as u32), lethal: *lethal })
                .collect(),
            trample,
            assign_as_unblocked: unblocked,
        }
    }

    fn b(i: u32) -> EntityId {
        EntityId(200 + i)
    }

    #[test]
    fn test_split_between_two_blockers() {
        let ctx = ctx(2, &[1, 1], false, false);
        let ok = DamageAssignment::new().to_blocker(b(0), 1).to_blocker(b(1), 1);
        assert!(validate_assignment(&ctx, &ok).is_ok());

        let all_first = DamageAssignment::new().to_blocker(b(0), 2);
        assert!(validate_assignment(&ctx, &all_first).is_ok());
    }

    #[test]
    fn test_ordering_requires_lethal_first() {
        let ctx = ctx(3, &[2, 2], false, false);
        let skip = DamageAssignment::new().to_blocker(b(0), 1).to_blocker(b(1), 2);
        assert!(matches!(
            validate_assignment(&ctx, &skip),
            Err(RulesError::InvalidDamageAssignment(_))
        ));

        // The last recipient may take less than lethal.
        let ok = DamageAssignment::new().to_blocker(b(0), 2).to_blocker(b(1), 1);
        assert!(validate_assignment(&ctx, &ok).is_ok());
    }

    #[test]
    fn test_total_must_equal_power() {
        let ctx = ctx(4, &[1, 1], false, false);
        let short = DamageAssignment::new().to_blocker(b(0), 1).to_blocker(b(1), 1);
        let err = validate_assignment(&ctx, &short).unwrap_err();
        assert_eq!(err.to_string(), "invalid damage assignment: assigned 2 damage, power is 4");
    }

    #[test]
    fn test_trample_excess_to_player() {
        let ctx = ctx(8, &[2], true, false);
        assert!(validate_assignment(&ctx, &DamageAssignment::new().to_blocker(b(0), 2).to_player(DEFENDER, 6)).is_ok());
        assert!(validate_assignment(&ctx, &DamageAssignment::new().to_blocker(b(0), 5).to_player(DEFENDER, 3)).is_ok());
        assert!(validate_assignment(&ctx, &DamageAssignment::new().to_blocker(b(0), 1).to_player(DEFENDER, 7)).is_err());
    }

    #[test]
    fn test_player_damage_requires_trample() {
        let ctx = ctx(3, &[1, 1], false, false);
        let attempt = DamageAssignment::new().to_blocker(b(0), 1).to_blocker(b(1), 1).to_player(DEFENDER, 1);
        assert!(validate_assignment(&ctx, &attempt).is_err());
    }

    #[test]
    fn test_assign_as_though_unblocked() {
        let ctx = ctx(3, &[3], false, true);
        assert!(validate_assignment(&ctx, &DamageAssignment::new().to_player(DEFENDER, 3)).is_ok());
        assert!(validate_assignment(&ctx, &DamageAssignment::new().to_blocker(b(0), 3)).is_ok());
        // Mixing requires trample.
        assert!(validate_assignment(&ctx, &DamageAssignment::new().to_blocker(b(0), 2).to_player(DEFENDER, 1)).is_err());
    }

    #[test]
    fn test_rejects_unknown_and_duplicate_recipients() {
        let ctx = ctx(2, &[1], true, false);
        let stranger = DamageAssignment::new().to_blocker(EntityId(999), 2);
        assert!(validate_assignment(&ctx, &stranger).is_err());

        let twice = DamageAssignment::new().to_blocker(b(0), 1).to_blocker(b(0), 1);
        assert!(validate_assignment(&ctx, &twice).is_err());

        let other_player = DamageAssignment::new().to_blocker(b(0), 1).to_player(PlayerId::new(0), 1);
        assert!(validate_assignment(&ctx, &other_player).is_err());

        let negative = DamageAssignment::new().to_blocker(b(0), 3).to_player(DEFENDER, -1);
        assert!(validate_assignment(&ctx, &negative).is_err());
    }

    #[test]
    fn test_huge_amounts_rejected() {
        let ctx = ctx(8, &[2, 2], true, false);
        let huge = DamageAssignment::new().to_blocker(b(0), i32::MAX).to_blocker(b(1), i32::MAX);
        let err = validate_assignment(&ctx, &huge).unwrap_err();
        assert!(err.to_string().contains("exceeds power 8"));

        // Wrapping i32 arithmetic would make these sum to 8.
        let wrapping = DamageAssignment::new()
            .to_blocker(b(0), i32::MAX)
            .to_blocker(b(1), i32::MAX)
            .to_player(DEFENDER, 10);
        assert!(validate_assignment(&ctx, &wrapping).is_err());
        assert_eq!(wrapping.total(), 2 * i64::from(i32::MAX) + 10);
    }

    #[test]
    fn test_over_assignment_allowed() {
        let ctx = ctx(5, &[1, 1], false, false);
        let heavy = DamageAssignment::new().to_blocker(b(0), 4).to_blocker(b(1), 1);
        assert!(validate_assignment(&ctx, &heavy).is_ok());
    }

    #[test]
    fn test_automatic_cases() {
        assert_eq!(
            ctx(2, &[], false, false).automatic(false),
            Some(DamageAssignment::new().to_player(DEFENDER, 2))
        );
        assert_eq!(
            ctx(3, &[2], false, false).automatic(true),
            Some(DamageAssignment::new().to_blocker(b(0), 3))
        );
        assert_eq!(ctx(3, &[2], true, false).automatic(true), None);
        assert_eq!(ctx(3, &[1, 1], false, false).automatic(true), None);
        assert_eq!(ctx(3, &[], false, false).automatic(true), Some(DamageAssignment::new()));
    }
}
