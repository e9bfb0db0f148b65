//! Attacker and blocker declarations.

use rustc_hash::FxHashSet;
use tracing::info;

use crate::cards::Keyword;
use crate::core::{EntityId, MatchState, PendingInteraction, PlayerId, Result, RulesError};
use crate::effects::{FilterContext, Target, TargetFilter};
use crate::triggers::GameEvent;

/// Creatures `player` could attack with right now.
#[must_use]
pub fn attack_candidates(state: &MatchState, player: PlayerId) -> Vec<EntityId> {
    state
        .players
        .get(player)
        .map(|board| {
            board
                .battlefield
                .iter()
                .filter(|p| p.is_creature() && !p.tapped)
                .filter(|p| !p.summoning_sick || state.has_keyword(p, Keyword::Haste))
                .filter(|p| !state.has_keyword(p, Keyword::Defender))
                .map(|p| p.id())
                .collect()
        })
        .unwrap_or_default()
}

/// Creatures `defender` controls that could legally block some attacker.
#[must_use]
pub fn block_candidates(state: &MatchState, defender: PlayerId) -> Vec<EntityId> {
    let filters: Vec<(EntityId, TargetFilter)> = state
        .combat
        .attackers
        .iter()
        .map(|a| (*a, TargetFilter::able_to_block(state, *a)))
        .collect();

    state
        .permanents()
        .filter(|p| p.controller == defender && p.is_creature())
        .filter(|p| {
            filters.iter().any(|(attacker, filter)| {
                let ctx = FilterContext::new(state, defender).with_source(*attacker);
                filter.evaluate(&ctx, &Target::Permanent(p.id())).is_pass()
            })
        })
        .map(|p| p.id())
        .collect()
}

/// Apply the active player's attack declaration.
///
/// Returns true if at least one creature attacks.
pub fn declare_attackers(state: &mut MatchState, player: PlayerId, attackers: &[EntityId]) -> Result<bool> {
    let candidates = match &state.pending_interaction {
        Some(PendingInteraction::DeclareAttackers { player: p, candidates }) if *p == player => candidates,
        _ => return Err(RulesError::illegal(format!("{player} is not declaring attackers"))),
    };

    let mut seen = FxHashSet::default();
    for attacker in attackers {
        if !seen.insert(*attacker) {
            return Err(RulesError::illegal(format!("{attacker} is declared twice")));
        }
        if !candidates.contains(attacker) {
            let name = state.permanent(*attacker).map_or_else(|| attacker.to_string(), |p| p.name().to_string());
            return Err(RulesError::illegal(format!("{name} cannot attack")));
        }
    }

    state.pending_interaction = None;
    let defender = state.defending_player();
    state.combat.defending_player = Some(defender);
    state.combat.attackers = attackers.to_vec();

    for attacker in attackers {
        let Some(perm) = state.permanent(*attacker) else {
            continue;
        };
        let vigilance = state.has_keyword(perm, Keyword::Vigilance);
        let name = perm.name().to_string();
        if let Some(perm) = state.permanent_mut(*attacker) {
            perm.attacking = true;
            if !vigilance {
                perm.tapped = true;
            }
        }
        state.log(format!("{name} attacks {defender}"));
        state.emit(GameEvent::Attacked { attacker: *attacker });
    }

    info!(match_id = %state.id, %player, count = attackers.len(), "attackers declared");
    Ok(!attackers.is_empty())
}

/// Apply the defending player's block declaration of `(blocker, attacker)`
/// pairs. Each blocker blocks at most one attacker.
pub fn declare_blockers(state: &mut MatchState, player: PlayerId, blocks: &[(EntityId, EntityId)]) -> Result<()> {
    match &state.pending_interaction {
        Some(PendingInteraction::DeclareBlockers { player: p, .. }) if *p == player => {}
        _ => return Err(RulesError::illegal(format!("{player} is not declaring blockers"))),
    }

    let mut seen = FxHashSet::default();
    for (blocker, attacker) in blocks {
        if !seen.insert(*blocker) {
            return Err(RulesError::illegal(format!("{blocker} can block only one attacker")));
        }
        if !state.combat.attackers.contains(attacker) || !state.permanent(*attacker).is_some_and(|p| p.attacking) {
            return Err(RulesError::illegal(format!("{attacker} is not attacking")));
        }
        let filter = TargetFilter::able_to_block(state, *attacker);
        let ctx = FilterContext::new(state, player).with_source(*attacker);
        if let Err(err) = filter.evaluate(&ctx, &Target::Permanent(*blocker)).into_result() {
            let reason = match err {
                RulesError::IllegalTarget(reason) => reason,
                other => other.to_string(),
            };
            return Err(RulesError::illegal(format!("illegal block: {reason}")));
        }
    }

    state.pending_interaction = None;
    state.combat.blocks = blocks.to_vec();

    for (blocker, attacker) in blocks {
        if let Some(perm) = state.permanent_mut(*blocker) {
            perm.blocking = true;
            perm.blocking_targets.push(*attacker);
        }
        if let Some(perm) = state.permanent_mut(*attacker) {
            perm.was_blocked = true;
        }
        state.emit(GameEvent::Blocked { blocker: *blocker, attacker: *attacker });
    }

    info!(match_id = %state.id, %player, count = blocks.len(), "blockers declared");
    Ok(())
}
