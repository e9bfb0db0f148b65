//! Reference card definitions.
//!
//! A small fixed card pool covering every mechanic the engine interprets:
//! basic lands, keyword creatures, triggered and activated abilities,
//! burn, an X spell, a counterspell, auras and an anthem. Tests build
//! matches from it, and it doubles as a format example for a full card
//! library.
//!
//! ```
//! use rust_tcg::cards::catalog;
//!
//! let registry = catalog::reference_registry();
//! let bolt = registry.get(catalog::LIGHTNING_BOLT).unwrap();
//! assert_eq!(bolt.name, "Lightning Bolt");
//! assert_eq!(registry.cards_in_set(catalog::SET_CODE).len(), registry.len());
//! ```

use super::ability::ActivatedAbility;
use super::definition::{CardDefinition, CardId, CardType, Keyword};
use super::registry::CardRegistry;
use crate::effects::{Effect, EffectSlot, Recipient, TargetFilter};
use crate::mana::{ManaColor, ManaCost};

pub const SET_CODE: &str = "REF";

// === Lands ===
pub const PLAINS: CardId = CardId::new(1);
pub const ISLAND: CardId = CardId::new(2);
pub const SWAMP: CardId = CardId::new(3);
pub const MOUNTAIN: CardId = CardId::new(4);
pub const FOREST: CardId = CardId::new(5);

// === Creatures ===
pub const GRIZZLY_BEARS: CardId = CardId::new(10);
pub const RAGING_GOBLIN: CardId = CardId::new(11);
pub const WALL_OF_WOOD: CardId = CardId::new(12);
pub const COLOSSAL_DREADMAW: CardId = CardId::new(13);
pub const WIND_DRAKE: CardId = CardId::new(14);
pub const GIANT_SPIDER: CardId = CardId::new(15);
pub const THORN_ELEMENTAL: CardId = CardId::new(16);
pub const PRODIGAL_PYROMANCER: CardId = CardId::new(17);
pub const FLAMETONGUE_KAVU: CardId = CardId::new(18);
pub const DARK_CONFIDANT: CardId = CardId::new(19);
pub const SERRA_ANGEL: CardId = CardId::new(20);
pub const VAMPIRE_NIGHTHAWK: CardId = CardId::new(21);
pub const LLANOWAR_ELVES: CardId = CardId::new(22);
pub const CURIOUS_SAGE: CardId = CardId::new(23);
pub const GOBLIN_BOMBARDIER: CardId = CardId::new(24);
pub const WHITE_KNIGHT: CardId = CardId::new(25);
pub const FENCING_ACE: CardId = CardId::new(26);

// === Instants and sorceries ===
pub const LIGHTNING_BOLT: CardId = CardId::new(30);
pub const BLAZE: CardId = CardId::new(31);
pub const COUNTERSPELL: CardId = CardId::new(32);
pub const GIANT_GROWTH: CardId = CardId::new(33);
pub const DIVINATION: CardId = CardId::new(34);
pub const UNSUMMON: CardId = CardId::new(35);
pub const MURDER: CardId = CardId::new(36);
pub const RAISE_THE_ALARM: CardId = CardId::new(37);

// === Enchantments ===
pub const HOLY_STRENGTH: CardId = CardId::new(40);
pub const GLORIOUS_ANTHEM: CardId = CardId::new(41);
pub const ARCANE_FLIGHT: CardId = CardId::new(42);

/// The reference cards in a registry.
#[must_use]
pub fn reference_registry() -> CardRegistry {
    reference_cards().into_iter().collect()
}

/// Every reference card definition.
#[must_use]
pub fn reference_cards() -> Vec<CardDefinition> {
    let mut cards = vec![
        basic_land(PLAINS, "Plains", ManaColor::White),
        basic_land(ISLAND, "Island", ManaColor::Blue),
        basic_land(SWAMP, "Swamp", ManaColor::Black),
        basic_land(MOUNTAIN, "Mountain", ManaColor::Red),
        basic_land(FOREST, "Forest", ManaColor::Green),
    ];
    cards.extend(creatures());
    cards.extend(spells());
    cards.extend(enchantments());
    cards.into_iter().map(|card| card.with_set_code(SET_CODE)).collect()
}

fn basic_land(id: CardId, name: &str, color: ManaColor) -> CardDefinition {
    CardDefinition::new(id, name)
        .with_type(CardType::Land)
        .with_subtype(name)
        .with_ability(ActivatedAbility::mana(color))
}

fn cost(generic: u32, colored: &[(ManaColor, u32)]) -> ManaCost {
    colored
        .iter()
        .fold(ManaCost::generic(generic), |cost, (color, count)| cost.with_colored(*color, *count))
}

fn creature(id: CardId, name: &str, mana_cost: ManaCost, power: i32, toughness: i32) -> CardDefinition {
    CardDefinition::new(id, name)
        .with_type(CardType::Creature)
        .with_mana_cost(mana_cost)
        .with_power_toughness(power, toughness)
}

fn creatures() -> Vec<CardDefinition> {
    use ManaColor::{Black, Blue, Green, Red, White};

    vec![
        creature(GRIZZLY_BEARS, "Grizzly Bears", cost(1, &[(Green, 1)]), 2, 2).with_subtype("Bear"),
        creature(RAGING_GOBLIN, "Raging Goblin", cost(0, &[(Red, 1)]), 1, 1)
            .with_subtype("Goblin")
            .with_keyword(Keyword::Haste),
        creature(WALL_OF_WOOD, "Wall of Wood", cost(0, &[(Green, 1)]), 0, 3)
            .with_subtype("Wall")
            .with_keyword(Keyword::Defender),
        creature(COLOSSAL_DREADMAW, "Colossal Dreadmaw", cost(4, &[(Green, 2)]), 6, 6)
            .with_subtype("Dinosaur")
            .with_keyword(Keyword::Trample),
        creature(WIND_DRAKE, "Wind Drake", cost(2, &[(Blue, 1)]), 2, 2)
            .with_subtype("Drake")
            .with_keyword(Keyword::Flying),
        creature(GIANT_SPIDER, "Giant Spider", cost(3, &[(Green, 1)]), 2, 4)
            .with_subtype("Spider")
            .with_keyword(Keyword::Reach),
        creature(THORN_ELEMENTAL, "Thorn Elemental", cost(5, &[(Green, 2)]), 7, 7)
            .with_subtype("Elemental")
            .with_keyword(Keyword::AssignAsThoughUnblocked),
        creature(PRODIGAL_PYROMANCER, "Prodigal Pyromancer", cost(2, &[(Red, 1)]), 1, 1)
            .with_subtype("Wizard")
            .with_ability(
                ActivatedAbility::new("{T}: Deal 1 damage to any target.")
                    .with_tap()
                    .with_effect(Effect::deal_damage(1, Recipient::Target))
                    .with_target(TargetFilter::creature_or_player()),
            ),
        creature(FLAMETONGUE_KAVU, "Flametongue Kavu", cost(3, &[(Red, 1)]), 4, 2)
            .with_subtype("Kavu")
            .with_effect(EffectSlot::OnEnterBattlefield, Effect::deal_damage(4, Recipient::Target))
            .with_target(EffectSlot::OnEnterBattlefield, TargetFilter::creature()),
        creature(DARK_CONFIDANT, "Dark Confidant", cost(1, &[(Black, 1)]), 2, 1)
            .with_subtype("Wizard")
            .with_effect(EffectSlot::UpkeepTriggered, Effect::draw(1))
            .with_effect(
                EffectSlot::UpkeepTriggered,
                Effect::LoseLife {
                    amount: 1,
                    recipient: Recipient::Controller,
                },
            ),
        creature(SERRA_ANGEL, "Serra Angel", cost(3, &[(White, 2)]), 4, 4)
            .with_subtype("Angel")
            .with_keyword(Keyword::Flying)
            .with_keyword(Keyword::Vigilance),
        creature(VAMPIRE_NIGHTHAWK, "Vampire Nighthawk", cost(1, &[(Black, 2)]), 2, 3)
            .with_subtype("Vampire")
            .with_keyword(Keyword::Flying)
            .with_keyword(Keyword::Deathtouch)
            .with_keyword(Keyword::Lifelink),
        creature(LLANOWAR_ELVES, "Llanowar Elves", cost(0, &[(Green, 1)]), 1, 1)
            .with_subtype("Elf")
            .with_ability(ActivatedAbility::mana(Green)),
        creature(CURIOUS_SAGE, "Curious Sage", cost(1, &[(Blue, 1)]), 1, 1)
            .with_subtype("Wizard")
            .with_effect(EffectSlot::OnEnterBattlefield, Effect::may("Draw a card?", Effect::draw(1))),
        creature(GOBLIN_BOMBARDIER, "Goblin Bombardier", cost(1, &[(Red, 1)]), 1, 1)
            .with_subtype("Goblin")
            .with_ability(
                ActivatedAbility::new("Sacrifice this: Deal 2 damage to any target.")
                    .with_sacrifice()
                    .with_effect(Effect::deal_damage(2, Recipient::Target))
                    .with_target(TargetFilter::creature_or_player())
                    .with_max_per_turn(1),
            ),
        creature(WHITE_KNIGHT, "White Knight", cost(0, &[(White, 2)]), 2, 2)
            .with_subtype("Knight")
            .with_keyword(Keyword::FirstStrike),
        creature(FENCING_ACE, "Fencing Ace", cost(1, &[(White, 1)]), 1, 1)
            .with_subtype("Soldier")
            .with_keyword(Keyword::DoubleStrike),
    ]
}

fn spells() -> Vec<CardDefinition> {
    use ManaColor::{Black, Blue, Green, Red, White};

    vec![
        CardDefinition::new(LIGHTNING_BOLT, "Lightning Bolt")
            .with_type(CardType::Instant)
            .with_mana_cost(cost(0, &[(Red, 1)]))
            .with_effect(EffectSlot::Spell, Effect::deal_damage(3, Recipient::Target)),
        CardDefinition::new(BLAZE, "Blaze")
            .with_type(CardType::Sorcery)
            .with_mana_cost(cost(0, &[(Red, 1)]).with_x())
            .with_effect(EffectSlot::Spell, Effect::DealXDamage { recipient: Recipient::Target }),
        CardDefinition::new(COUNTERSPELL, "Counterspell")
            .with_type(CardType::Instant)
            .with_mana_cost(cost(0, &[(Blue, 2)]))
            .with_effect(EffectSlot::Spell, Effect::CounterSpell)
            .with_target(EffectSlot::Spell, TargetFilter::spell()),
        CardDefinition::new(GIANT_GROWTH, "Giant Growth")
            .with_type(CardType::Instant)
            .with_mana_cost(cost(0, &[(Green, 1)]))
            .with_effect(EffectSlot::Spell, Effect::boost(3, 3, Recipient::Target))
            .with_target(EffectSlot::Spell, TargetFilter::creature()),
        CardDefinition::new(DIVINATION, "Divination")
            .with_type(CardType::Sorcery)
            .with_mana_cost(cost(2, &[(Blue, 1)]))
            .with_effect(EffectSlot::Spell, Effect::draw(2)),
        CardDefinition::new(UNSUMMON, "Unsummon")
            .with_type(CardType::Instant)
            .with_mana_cost(cost(0, &[(Blue, 1)]))
            .with_effect(EffectSlot::Spell, Effect::ReturnToHand { recipient: Recipient::Target })
            .with_target(EffectSlot::Spell, TargetFilter::creature()),
        CardDefinition::new(MURDER, "Murder")
            .with_type(CardType::Instant)
            .with_mana_cost(cost(1, &[(Black, 2)]))
            .with_effect(EffectSlot::Spell, Effect::Destroy { recipient: Recipient::Target })
            .with_target(EffectSlot::Spell, TargetFilter::creature()),
        CardDefinition::new(RAISE_THE_ALARM, "Raise the Alarm")
            .with_type(CardType::Instant)
            .with_mana_cost(cost(1, &[(White, 1)]))
            .with_effect(
                EffectSlot::Spell,
                Effect::CreateToken {
                    name: "Soldier".into(),
                    power: 1,
                    toughness: 1,
                    keywords: Vec::new(),
                    count: 2,
                },
            ),
    ]
}

fn enchantments() -> Vec<CardDefinition> {
    use ManaColor::{Blue, White};

    vec![
        CardDefinition::new(HOLY_STRENGTH, "Holy Strength")
            .with_type(CardType::Enchantment)
            .with_subtype("Aura")
            .with_mana_cost(cost(0, &[(White, 1)]))
            .with_effect(EffectSlot::Static, Effect::BoostAttached { power: 1, toughness: 2 }),
        CardDefinition::new(GLORIOUS_ANTHEM, "Glorious Anthem")
            .with_type(CardType::Enchantment)
            .with_mana_cost(cost(1, &[(White, 2)]))
            .with_effect(EffectSlot::Static, Effect::anthem(TargetFilter::creature_you_control(), 1, 1)),
        CardDefinition::new(ARCANE_FLIGHT, "Arcane Flight")
            .with_type(CardType::Enchantment)
            .with_subtype("Aura")
            .with_mana_cost(cost(0, &[(Blue, 1)]))
            .with_effect(EffectSlot::Static, Effect::GrantKeywordAttached { keyword: Keyword::Flying }),
    ]
}
