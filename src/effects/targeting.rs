//! Targeting and legality predicates.
//!
//! A `TargetFilter` is a stateless, composable predicate (`AllOf`, `AnyOf`,
//! `Not` over atomic checks) evaluated against a candidate `Target` and a
//! `FilterContext`. Evaluation yields a `Verdict`: pass, or fail with a
//! human-readable reason.
//!
//! Filters are evaluated when a target is chosen and again when the entry
//! resolves; results are never cached.
//!
//! The same framework decides block legality: `TargetFilter::able_to_block`
//! builds a filter from the attacker's keywords that is evaluated against
//! each proposed blocker.

use serde::{Deserialize, Serialize};

use crate::cards::{CardDefinition, CardType, Keyword};
use crate::core::{EntityId, MatchState, PlayerId, Result, RulesError};
use crate::mana::ManaColor;
use crate::stack::{StackEntry, StackEntryId};

/// Something an entry can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Player(PlayerId),
    Permanent(EntityId),
    StackEntry(StackEntryId),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Player(p) => write!(f, "{p}"),
            Target::Permanent(id) => write!(f, "{id}"),
            Target::StackEntry(id) => write!(f, "{id}"),
        }
    }
}

/// Outcome of evaluating a filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Convert to a result, failing with `IllegalTarget`.
    pub fn into_result(self) -> Result<()> {
        match self {
            Verdict::Pass => Ok(()),
            Verdict::Fail(reason) => Err(RulesError::IllegalTarget(reason)),
        }
    }
}

/// Point of view a filter is evaluated from.
#[derive(Clone, Copy)]
pub struct FilterContext<'a> {
    pub state: &'a MatchState,
    /// Player choosing or controlling the effect ("you").
    pub controller: PlayerId,
    /// Object the effect comes from.
    pub source: Option<EntityId>,
}

impl<'a> FilterContext<'a> {
    #[must_use]
    pub fn new(state: &'a MatchState, controller: PlayerId) -> Self {
        Self {
            state,
            controller,
            source: None,
        }
    }

    /// Set the source object (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Human-readable name of a target.
    #[must_use]
    pub fn describe(&self, target: &Target) -> String {
        match target {
            Target::Player(p) => p.to_string(),
            Target::Permanent(id) => self
                .state
                .permanent(*id)
                .map_or_else(|| id.to_string(), |p| p.name().to_string()),
            Target::StackEntry(id) => self
                .state
                .stack
                .get(*id)
                .map_or_else(|| id.to_string(), |e| e.description.clone()),
        }
    }
}

/// Composable legality predicate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFilter {
    // === Combinators ===
    /// Always passes.
    Any,
    /// Always fails with the given reason.
    Never(String),
    AllOf(Vec<TargetFilter>),
    AnyOf(Vec<TargetFilter>),
    Not(Box<TargetFilter>),

    // === Kinds ===
    /// A player still in the match.
    Player,
    /// A permanent on the battlefield.
    Permanent,
    /// An entry on the stack.
    Spell,

    // === Player predicates ===
    You,
    Opponent,

    // === Object predicates ===
    HasType(CardType),
    HasSubtype(String),
    HasColor(ManaColor),
    HasKeyword(Keyword),
    IsTapped,
    IsAttacking,
    IsBlocking,
    ControlledByYou,
    ControlledByOpponent,
    /// The object the effect comes from.
    IsSource,
}

impl TargetFilter {
    // === Common Filters ===

    /// A creature on the battlefield.
    #[must_use]
    pub fn creature() -> Self {
        TargetFilter::AllOf(vec![
            TargetFilter::Permanent,
            TargetFilter::HasType(CardType::Creature),
        ])
    }

    /// "Any target": a creature or a player.
    #[must_use]
    pub fn creature_or_player() -> Self {
        TargetFilter::AnyOf(vec![TargetFilter::Player, Self::creature()])
    }

    /// A creature you control.
    #[must_use]
    pub fn creature_you_control() -> Self {
        TargetFilter::AllOf(vec![Self::creature(), TargetFilter::ControlledByYou])
    }

    /// A spell on the stack (not an ability).
    #[must_use]
    pub fn spell() -> Self {
        TargetFilter::Spell
    }

    /// Filter a blocker must pass to block `attacker`.
    ///
    /// Evaluated from the defending player's point of view: an untapped
    /// creature they control; a flying attacker also requires flying or
    /// reach; an unblockable attacker admits nothing.
    #[must_use]
    pub fn able_to_block(state: &MatchState, attacker: EntityId) -> Self {
        let Some(attacker) = state.permanent(attacker) else {
            return TargetFilter::Never(format!("{attacker} is not attacking"));
        };
        if state.has_keyword(attacker, Keyword::CantBeBlocked) {
            return TargetFilter::Never(format!("{} can't be blocked", attacker.name()));
        }

        let mut parts = vec![
            Self::creature(),
            TargetFilter::ControlledByYou,
            TargetFilter::Not(Box::new(TargetFilter::IsTapped)),
        ];
        if state.has_keyword(attacker, Keyword::Flying) {
            parts.push(TargetFilter::AnyOf(vec![
                TargetFilter::HasKeyword(Keyword::Flying),
                TargetFilter::HasKeyword(Keyword::Reach),
            ]));
        }
        TargetFilter::AllOf(parts)
    }

    // === Evaluation ===

    /// Evaluate this filter against a candidate.
    #[must_use]
    pub fn evaluate(&self, ctx: &FilterContext<'_>, target: &Target) -> Verdict {
        match self {
            TargetFilter::Any => Verdict::Pass,
            TargetFilter::Never(reason) => Verdict::Fail(reason.clone()),
            TargetFilter::AllOf(filters) => {
                for filter in filters {
                    let verdict = filter.evaluate(ctx, target);
                    if !verdict.is_pass() {
                        return verdict;
                    }
                }
                Verdict::Pass
            }
            TargetFilter::AnyOf(filters) => {
                let mut reasons = Vec::new();
                for filter in filters {
                    match filter.evaluate(ctx, target) {
                        Verdict::Pass => return Verdict::Pass,
                        Verdict::Fail(reason) => reasons.push(reason),
                    }
                }
                if reasons.is_empty() {
                    Verdict::Fail(format!("{} matches no option", ctx.describe(target)))
                } else {
                    Verdict::Fail(reasons.join("; "))
                }
            }
            TargetFilter::Not(inner) => match inner.evaluate(ctx, target) {
                Verdict::Pass => Verdict::Fail(format!(
                    "{} must not be {}",
                    ctx.describe(target),
                    inner.describe()
                )),
                Verdict::Fail(_) => Verdict::Pass,
            },
            _ => self.evaluate_atomic(ctx, target),
        }
    }

    fn evaluate_atomic(&self, ctx: &FilterContext<'_>, target: &Target) -> Verdict {
        let passed = match (self, target) {
            (TargetFilter::Player, Target::Player(p)) => ctx.state.is_in_match(*p),
            (TargetFilter::Player, _) => false,
            (TargetFilter::Permanent, Target::Permanent(id)) => ctx.state.permanent(*id).is_some(),
            (TargetFilter::Permanent, _) => false,
            (TargetFilter::Spell, Target::StackEntry(id)) => ctx
                .state
                .stack
                .get(*id)
                .is_some_and(StackEntry::is_spell),
            (TargetFilter::Spell, _) => false,

            (TargetFilter::You, Target::Player(p)) => *p == ctx.controller,
            (TargetFilter::Opponent, Target::Player(p)) => *p != ctx.controller,
            (TargetFilter::You | TargetFilter::Opponent, _) => false,

            (TargetFilter::HasType(card_type), _) => {
                definition_of(ctx, target).is_some_and(|d| d.is_type(*card_type))
            }
            (TargetFilter::HasSubtype(subtype), _) => {
                definition_of(ctx, target).is_some_and(|d| d.has_subtype(subtype))
            }
            (TargetFilter::HasColor(color), _) => {
                definition_of(ctx, target).is_some_and(|d| d.colors().contains(color))
            }
            (TargetFilter::HasKeyword(keyword), Target::Permanent(id)) => ctx
                .state
                .permanent(*id)
                .is_some_and(|p| ctx.state.has_keyword(p, *keyword)),
            (TargetFilter::HasKeyword(keyword), Target::StackEntry(id)) => ctx
                .state
                .stack
                .get(*id)
                .and_then(|e| e.card.as_ref())
                .is_some_and(|c| c.definition.has_keyword(*keyword)),
            (TargetFilter::IsTapped, Target::Permanent(id)) => {
                ctx.state.permanent(*id).is_some_and(|p| p.tapped)
            }
            (TargetFilter::IsAttacking, Target::Permanent(id)) => {
                ctx.state.permanent(*id).is_some_and(|p| p.attacking)
            }
            (TargetFilter::IsBlocking, Target::Permanent(id)) => {
                ctx.state.permanent(*id).is_some_and(|p| p.blocking)
            }
            (TargetFilter::ControlledByYou, _) => {
                controller_of(ctx, target).is_some_and(|c| c == ctx.controller)
            }
            (TargetFilter::ControlledByOpponent, _) => {
                controller_of(ctx, target).is_some_and(|c| c != ctx.controller)
            }
            (TargetFilter::IsSource, Target::Permanent(id)) => ctx.source == Some(*id),
            _ => false,
        };

        if passed {
            Verdict::Pass
        } else {
            Verdict::Fail(format!("{} is not {}", ctx.describe(target), self.describe()))
        }
    }

    /// Every candidate in the match that passes this filter: players in
    /// seat order, then permanents in battlefield order, then stack entries
    /// from the bottom up.
    #[must_use]
    pub fn legal_targets(&self, ctx: &FilterContext<'_>) -> Vec<Target> {
        let players = ctx
            .state
            .players
            .player_ids()
            .map(Target::Player);
        let permanents = ctx.state.permanents().map(|p| Target::Permanent(p.id()));
        let entries = ctx
            .state
            .stack
            .entries()
            .iter()
            .map(|e| Target::StackEntry(e.id));

        players
            .chain(permanents)
            .chain(entries)
            .filter(|t| self.evaluate(ctx, t).is_pass())
            .collect()
    }

    /// Short English description, used in failure reasons.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            TargetFilter::Any => "anything".into(),
            TargetFilter::Never(reason) => reason.clone(),
            TargetFilter::AllOf(filters) => filters
                .iter()
                .map(TargetFilter::describe)
                .collect::<Vec<_>>()
                .join(" and "),
            TargetFilter::AnyOf(filters) => filters
                .iter()
                .map(TargetFilter::describe)
                .collect::<Vec<_>>()
                .join(" or "),
            TargetFilter::Not(inner) => format!("not {}", inner.describe()),
            TargetFilter::Player => "a player".into(),
            TargetFilter::Permanent => "a permanent".into(),
            TargetFilter::Spell => "a spell".into(),
            TargetFilter::You => "you".into(),
            TargetFilter::Opponent => "an opponent".into(),
            TargetFilter::HasType(t) => format!("a {t:?}").to_lowercase(),
            TargetFilter::HasSubtype(s) => format!("a {s}"),
            TargetFilter::HasColor(c) => format!("{c:?}").to_lowercase(),
            TargetFilter::HasKeyword(k) => format!("with {k}"),
            TargetFilter::IsTapped => "tapped".into(),
            TargetFilter::IsAttacking => "attacking".into(),
            TargetFilter::IsBlocking => "blocking".into(),
            TargetFilter::ControlledByYou => "under your control".into(),
            TargetFilter::ControlledByOpponent => "under an opponent's control".into(),
            TargetFilter::IsSource => "the source".into(),
        }
    }
}

fn definition_of<'a>(ctx: &FilterContext<'a>, target: &Target) -> Option<&'a CardDefinition> {
    match target {
        Target::Player(_) => None,
        Target::Permanent(id) => ctx.state.permanent(*id).map(|p| p.definition()),
        Target::StackEntry(id) => ctx
            .state
            .stack
            .get(*id)
            .and_then(|e| e.card.as_ref())
            .map(|c| &c.definition),
    }
}

fn controller_of(ctx: &FilterContext<'_>, target: &Target) -> Option<PlayerId> {
    match target {
        Target::Player(_) => None,
        Target::Permanent(id) => ctx.state.permanent(*id).map(|p| p.controller),
        Target::StackEntry(id) => ctx.state.stack.get(*id).map(|e| e.controller),
    }
}
