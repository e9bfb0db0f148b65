//! Card definitions - static card data.
//!
//! `CardDefinition` holds the printed properties of a card: types, cost,
//! power/toughness, keywords, and the effects it declares at each
//! `EffectSlot`. Runtime state (tapped, damage, modifiers) lives on
//! `Permanent`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::ability::ActivatedAbility;
use crate::effects::{Effect, EffectSlot, TargetFilter};
use crate::mana::{ManaColor, ManaCost};

/// Unique identifier for a card definition.
///
/// This identifies the printed card (e.g. "Lightning Bolt"), not a
/// specific copy in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
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

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Card types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Land,
    Creature,
    Artifact,
    Enchantment,
    Instant,
    Sorcery,
}

/// Keyword abilities the rules engine interprets directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Flying,
    Reach,
    Trample,
    Vigilance,
    Haste,
    Defender,
    Deathtouch,
    Lifelink,
    /// Deals combat damage in a pass before creatures without it.
    FirstStrike,
    /// Deals combat damage in both the first-strike and regular passes.
    DoubleStrike,
    /// No creature can block this attacker.
    CantBeBlocked,
    /// Its controller may assign its combat damage as though it weren't blocked.
    AssignAsThoughUnblocked,
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Keyword::Flying => "flying",
            Keyword::Reach => "reach",
            Keyword::Trample => "trample",
            Keyword::Vigilance => "vigilance",
            Keyword::Haste => "haste",
            Keyword::Defender => "defender",
            Keyword::Deathtouch => "deathtouch",
            Keyword::Lifelink => "lifelink",
            Keyword::FirstStrike => "first strike",
            Keyword::DoubleStrike => "double strike",
            Keyword::CantBeBlocked => "can't be blocked",
            Keyword::AssignAsThoughUnblocked => "assign damage as though unblocked",
        };
        write!(f, "{name}")
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use rust_tcg::cards::{CardDefinition, CardId, CardType, Keyword};
/// use rust_tcg::mana::ManaCost;
///
/// let drake = CardDefinition::new(CardId::new(1), "Wind Drake")
///     .with_type(CardType::Creature)
///     .with_mana_cost("{2}{U}".parse::<ManaCost>().unwrap())
///     .with_power_toughness(2, 2)
///     .with_keyword(Keyword::Flying);
///
/// assert!(drake.is_creature());
/// assert!(drake.has_keyword(Keyword::Flying));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this card definition.
    pub id: CardId,

    /// Card name.
    pub name: String,

    /// Set code the card is printed in.
    pub set_code: String,

    // === Characteristics ===
    /// Card types.
    pub types: SmallVec<[CardType; 2]>,

    /// Subtypes ("Goblin", "Aura", "Forest").
    pub subtypes: Vec<String>,

    /// Mana cost. `None` for lands.
    pub mana_cost: Option<ManaCost>,

    /// Printed power (creatures only).
    pub power: Option<i32>,

    /// Printed toughness (creatures only).
    pub toughness: Option<i32>,

    /// Printed keywords.
    pub keywords: SmallVec<[Keyword; 4]>,

    // === Abilities ===
    /// Effects declared per slot, in declaration order.
    pub effects: Vec<(EffectSlot, Effect)>,

    /// Target requirement per slot (the spell's target, an aura's
    /// enchant restriction, a trigger's target).
    pub targets: Vec<(EffectSlot, TargetFilter)>,

    /// Activated abilities, addressed by index.
    pub abilities: Vec<ActivatedAbility>,
}

impl CardDefinition {
    /// Create a new card definition with no types or abilities.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            set_code: String::new(),
            types: SmallVec::new(),
            subtypes: Vec::new(),
            mana_cost: None,
            power: None,
            toughness: None,
            keywords: SmallVec::new(),
            effects: Vec::new(),
            targets: Vec::new(),
            abilities: Vec::new(),
        }
    }

    /// Set the set code (builder pattern).
    #[must_use]
    pub fn with_set_code(mut self, set_code: impl Into<String>) -> Self {
        self.set_code = set_code.into();
        self
    }

    /// Add a card type (builder pattern).
    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        if !self.types.contains(&card_type) {
            self.types.push(card_type);
        }
        self
    }

    /// Add a subtype (builder pattern).
    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    /// Set the mana cost (builder pattern).
    #[must_use]
    pub fn with_mana_cost(mut self, cost: ManaCost) -> Self {
        self.mana_cost = Some(cost);
        self
    }

    /// Set printed power and toughness (builder pattern).
    #[must_use]
    pub fn with_power_toughness(mut self, power: i32, toughness: i32) -> Self {
        self.power = Some(power);
        self.toughness = Some(toughness);
        self
    }

    /// Add a keyword (builder pattern).
    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    /// Declare an effect at a slot (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, slot: EffectSlot, effect: Effect) -> Self {
        self.effects.push((slot, effect));
        self
    }

    /// Declare the target requirement for a slot (builder pattern).
    #[must_use]
    pub fn with_target(mut self, slot: EffectSlot, filter: TargetFilter) -> Self {
        self.targets.retain(|(s, _)| *s != slot);
        self.targets.push((slot, filter));
        self
    }

    /// Add an activated ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, ability: ActivatedAbility) -> Self {
        self.abilities.push(ability);
        self
    }

    // === Queries ===

    /// Check for a card type.
    #[must_use]
    pub fn is_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.is_type(CardType::Creature)
    }

    #[must_use]
    pub fn is_land(&self) -> bool {
        self.is_type(CardType::Land)
    }

    /// Instants and sorceries are the only non-permanent types.
    #[must_use]
    pub fn is_permanent_card(&self) -> bool {
        !self.is_type(CardType::Instant) && !self.is_type(CardType::Sorcery)
    }

    /// An enchantment with the Aura subtype.
    #[must_use]
    pub fn is_aura(&self) -> bool {
        self.is_type(CardType::Enchantment) && self.has_subtype("Aura")
    }

    #[must_use]
    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.iter().any(|s| s.eq_ignore_ascii_case(subtype))
    }

    /// Check for a printed keyword.
    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Colors of the card, taken from the colored symbols of its cost.
    #[must_use]
    pub fn colors(&self) -> SmallVec<[ManaColor; 2]> {
        let Some(cost) = self.mana_cost else {
            return SmallVec::new();
        };
        ManaColor::ALL
            .into_iter()
            .filter(|c| cost.colored(*c) > 0)
            .collect()
    }

    /// Effects declared at one slot, in declaration order.
    pub fn effects_for(&self, slot: EffectSlot) -> impl Iterator<Item = &Effect> {
        self.effects
            .iter()
            .filter(move |(s, _)| *s == slot)
            .map(|(_, e)| e)
    }

    /// Target requirement declared for a slot.
    #[must_use]
    pub fn target_for(&self, slot: EffectSlot) -> Option<&TargetFilter> {
        self.targets
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, f)| f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Recipient;

    #[test]
    fn test_card_id() {
        let id = CardId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Card(42)");
    }

    #[test]
    fn test_creature_builder() {
        let card = CardDefinition::new(CardId::new(1), "Grizzly Bears")
            .with_set_code("10E")
            .with_type(CardType::Creature)
            .with_subtype("Bear")
            .with_mana_cost(ManaCost::generic(1).with_colored(ManaColor::Green, 1))
            .with_power_toughness(2, 2);

        assert!(card.is_creature());
        assert!(card.is_permanent_card());
        assert!(card.has_subtype("bear"));
        assert_eq!(card.power, Some(2));
        assert_eq!(card.colors().as_slice(), &[ManaColor::Green]);
    }

    #[test]
    fn test_instant_is_not_permanent() {
        let bolt = CardDefinition::new(CardId::new(2), "Lightning Bolt")
            .with_type(CardType::Instant)
            .with_effect(EffectSlot::Spell, Effect::deal_damage(3, Recipient::Target))
            .with_target(EffectSlot::Spell, TargetFilter::creature_or_player());

        assert!(!bolt.is_permanent_card());
        assert_eq!(bolt.effects_for(EffectSlot::Spell).count(), 1);
        assert!(bolt.target_for(EffectSlot::Spell).is_some());
        assert!(bolt.target_for(EffectSlot::OnEnterBattlefield).is_none());
    }

    #[test]
    fn test_aura_detection() {
        let aura = CardDefinition::new(CardId::new(3), "Holy Strength")
            .with_type(CardType::Enchantment)
            .with_subtype("Aura");
        assert!(aura.is_aura());
        assert!(aura.is_permanent_card());
    }

    #[test]
    fn test_land_is_colorless() {
        let forest = CardDefinition::new(CardId::new(4), "Forest").with_type(CardType::Land);
        assert!(forest.is_land());
        assert!(forest.colors().is_empty());
    }

    #[test]
    fn test_card_definition_serialization() {
        let card = CardDefinition::new(CardId::new(1), "Test")
            .with_type(CardType::Creature)
            .with_keyword(Keyword::Trample)
            .with_power_toughness(3, 3);

        let json = serde_json::to_string(&card).unwrap();
        let deserialized: CardDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(card, deserialized);
    }
}
