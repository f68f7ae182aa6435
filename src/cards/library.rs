//! A small sample card library.
//!
//! Every card here is plain data built from the ability and effect
//! vocabulary. The set covers what the rules core needs to be exercised end
//! to end: basic lands, vanilla and keyword creatures, lords and an anthem,
//! pump, burn, counter, blink and ability-removal spells, a copy creature,
//! a prototype creature, a punisher, a fog with an optional additional cost
//! and tokens.
//!
//! ```
//! use ccg_rules::cards::library;
//!
//! let registry = library::sample_registry().unwrap();
//! let bears = registry.get(library::GRIZZLY_BEARS).unwrap();
//! assert_eq!(bears.name, "Grizzly Bears");
//! ```

use smallvec::smallvec;

use super::ability::{AbilityCost, ActivatedAbility};
use super::characteristics::{CardType, Color, ColorSet, Keyword, Supertype};
use super::definition::{CardDefinition, CardId};
use super::filter::ObjectFilter;
use super::mana::ManaKind;
use super::registry::CardRegistry;
use super::Ability;
use crate::core::error::Result;
use crate::effects::{Effect, EffectCondition, EffectTarget, PlayerRef, TargetSpec, UnlessCost};
use crate::layers::{Duration, Modification, Value};
use crate::replacement::{DamageFilter, ReplacementKind};
use crate::triggers::{ObjectSubject, TriggerCondition};

pub const PLAINS: CardId = CardId::new(1);
pub const ISLAND: CardId = CardId::new(2);
pub const SWAMP: CardId = CardId::new(3);
pub const MOUNTAIN: CardId = CardId::new(4);
pub const FOREST: CardId = CardId::new(5);

pub const GRIZZLY_BEARS: CardId = CardId::new(10);
pub const HILL_GIANT: CardId = CardId::new(11);
pub const SERRA_ANGEL: CardId = CardId::new(12);
pub const GIANT_SPIDER: CardId = CardId::new(13);
pub const LLANOWAR_ELVES: CardId = CardId::new(14);
pub const ELVISH_CHAMPION: CardId = CardId::new(15);
pub const COLOSSAL_DREADMAW: CardId = CardId::new(16);
pub const VAMPIRE_NIGHTHAWK: CardId = CardId::new(17);
pub const SOUL_WARDEN: CardId = CardId::new(18);
pub const PRODIGAL_SORCERER: CardId = CardId::new(19);
pub const ISAMARU: CardId = CardId::new(20);
pub const MIRROR_MIMIC: CardId = CardId::new(21);
pub const BLITZ_AUTOMATON: CardId = CardId::new(22);
pub const DEMANDING_DRAGON: CardId = CardId::new(23);

pub const GLORIOUS_ANTHEM: CardId = CardId::new(30);
pub const GIANT_GROWTH: CardId = CardId::new(31);
pub const LIGHTNING_BOLT: CardId = CardId::new(32);
pub const COUNTERSPELL: CardId = CardId::new(33);
pub const CLOUDSHIFT: CardId = CardId::new(34);
pub const UNDERGROWTH: CardId = CardId::new(35);
pub const TURN_TO_FROG: CardId = CardId::new(36);
pub const RAISE_THE_ALARM: CardId = CardId::new(37);
pub const SPAWN_GERM: CardId = CardId::new(38);

pub const SOLDIER_TOKEN: CardId = CardId::new(50);
pub const GERM_TOKEN: CardId = CardId::new(51);

fn basic_land(id: CardId, name: &str, color: Color) -> CardDefinition {
    CardDefinition::new(id, name)
        .with_supertypes(&[Supertype::Basic])
        .with_types(&[CardType::Land])
        .with_subtypes(&[name])
        .with_ability(Ability::tap_for_mana(ManaKind::Colored(color)))
}

fn creature(id: CardId, name: &str, cost: &str, power: i32, toughness: i32) -> CardDefinition {
    CardDefinition::new(id, name)
        .with_cost(cost)
        .with_types(&[CardType::Creature])
        .with_pt(power, toughness)
}

fn instant(id: CardId, name: &str, cost: &str) -> CardDefinition {
    CardDefinition::new(id, name).with_cost(cost).with_types(&[CardType::Instant])
}

fn lands() -> Vec<CardDefinition> {
    vec![
        basic_land(PLAINS, "Plains", Color::White),
        basic_land(ISLAND, "Island", Color::Blue),
        basic_land(SWAMP, "Swamp", Color::Black),
        basic_land(MOUNTAIN, "Mountain", Color::Red),
        basic_land(FOREST, "Forest", Color::Green),
    ]
}

fn creatures() -> Vec<CardDefinition> {
    vec![
        creature(GRIZZLY_BEARS, "Grizzly Bears", "{1}{G}", 2, 2).with_subtypes(&["Bear"]),
        creature(HILL_GIANT, "Hill Giant", "{3}{R}", 3, 3).with_subtypes(&["Giant"]),
        creature(SERRA_ANGEL, "Serra Angel", "{3}{W}{W}", 4, 4)
            .with_subtypes(&["Angel"])
            .with_keyword(Keyword::Flying)
            .with_keyword(Keyword::Vigilance),
        creature(GIANT_SPIDER, "Giant Spider", "{3}{G}", 2, 4)
            .with_subtypes(&["Spider"])
            .with_keyword(Keyword::Reach),
        creature(LLANOWAR_ELVES, "Llanowar Elves", "{G}", 1, 1)
            .with_subtypes(&["Elf", "Druid"])
            .with_ability(Ability::tap_for_mana(ManaKind::Colored(Color::Green))),
        // Other Elf creatures get +1/+1.
        creature(ELVISH_CHAMPION, "Elvish Champion", "{1}{G}{G}", 2, 2)
            .with_subtypes(&["Elf"])
            .with_ability(Ability::static_for(
                ObjectFilter::creature().with_subtype("Elf").other(),
                Modification::pump(1, 1),
            )),
        creature(COLOSSAL_DREADMAW, "Colossal Dreadmaw", "{4}{G}{G}", 6, 6)
            .with_subtypes(&["Dinosaur"])
            .with_keyword(Keyword::Trample),
        creature(VAMPIRE_NIGHTHAWK, "Vampire Nighthawk", "{1}{B}{B}", 2, 3)
            .with_subtypes(&["Vampire", "Shaman"])
            .with_keyword(Keyword::Flying)
            .with_keyword(Keyword::Deathtouch)
            .with_keyword(Keyword::Lifelink),
        // Whenever another creature enters the battlefield, you gain 1 life.
        creature(SOUL_WARDEN, "Soul Warden", "{W}", 1, 1)
            .with_subtypes(&["Human", "Cleric"])
            .with_ability(Ability::triggered(
                TriggerCondition::EntersBattlefield(ObjectSubject::Matching(ObjectFilter::creature().other())),
                vec![Effect::gain_life(1)],
            )),
        // {T}: 1 damage to any target.
        creature(PRODIGAL_SORCERER, "Prodigal Sorcerer", "{2}{U}", 1, 1)
            .with_subtypes(&["Human", "Wizard"])
            .with_ability(Ability::Activated(
                ActivatedAbility::new(
                    AbilityCost::tap(),
                    vec![Effect::damage(Value::Fixed(1), EffectTarget::Target(0))],
                )
                .with_targets(vec![TargetSpec::any_target()]),
            )),
        creature(ISAMARU, "Isamaru, Hound of Konda", "{W}", 2, 2)
            .with_supertypes(&[Supertype::Legendary])
            .with_subtypes(&["Dog"]),
        // When this enters, it becomes a copy of another target creature.
        creature(MIRROR_MIMIC, "Mirror Mimic", "{3}{U}", 1, 1)
            .with_subtypes(&["Shapeshifter"])
            .with_ability(Ability::triggered_targeted(
                TriggerCondition::enters_self(),
                vec![TargetSpec::permanent(ObjectFilter::creature().other())],
                vec![Effect::BecomeCopy {
                    of: EffectTarget::Target(0),
                    duration: Duration::Indefinite,
                }],
            )),
        CardDefinition::new(BLITZ_AUTOMATON, "Blitz Automaton")
            .with_cost("{7}")
            .with_types(&[CardType::Artifact, CardType::Creature])
            .with_subtypes(&["Construct"])
            .with_pt(6, 4)
            .with_keyword(Keyword::Haste)
            .with_prototype("{2}{R}", 3, 2),
        // When this enters, it deals 5 damage to target opponent unless
        // that player sacrifices a creature.
        creature(DEMANDING_DRAGON, "Demanding Dragon", "{3}{R}{R}", 5, 5)
            .with_subtypes(&["Dragon"])
            .with_keyword(Keyword::Flying)
            .with_ability(Ability::triggered_targeted(
                TriggerCondition::enters_self(),
                vec![TargetSpec::opponent()],
                vec![Effect::damage(Value::Fixed(5), EffectTarget::Target(0))
                    .unless(PlayerRef::Target(0), UnlessCost::Sacrifice(ObjectFilter::creature()))],
            )),
    ]
}

fn noncreature_spells() -> Vec<CardDefinition> {
    // Prevent all combat damage this turn. With the additional cost paid,
    // damage dealt by red creatures isn't prevented.
    let fog = |sources: DamageFilter| Effect::CreateReplacement {
        kind: ReplacementKind::prevent_all(sources),
        duration: Duration::EndOfTurn,
    };
    let undergrowth = Effect::Conditional {
        condition: EffectCondition::AdditionalCostPaid,
        then: Box::new(fog(
            DamageFilter::combat().from_sources(ObjectFilter::any().without_colors(ColorSet::single(Color::Red))),
        )),
        otherwise: Some(Box::new(fog(DamageFilter::combat()))),
    };

    vec![
        CardDefinition::new(GLORIOUS_ANTHEM, "Glorious Anthem")
            .with_cost("{1}{W}{W}")
            .with_types(&[CardType::Enchantment])
            .with_ability(Ability::static_for(
                ObjectFilter::creature().you_control(),
                Modification::pump(1, 1),
            )),
        instant(GIANT_GROWTH, "Giant Growth", "{G}").with_spell(
            vec![TargetSpec::creature()],
            vec![Effect::until_end_of_turn(0, Modification::pump(3, 3))],
        ),
        instant(LIGHTNING_BOLT, "Lightning Bolt", "{R}").with_spell(
            vec![TargetSpec::any_target()],
            vec![Effect::damage(Value::Fixed(3), EffectTarget::Target(0))],
        ),
        instant(COUNTERSPELL, "Counterspell", "{U}{U}")
            .with_spell(vec![TargetSpec::spell()], vec![Effect::CounterSpell(EffectTarget::Target(0))]),
        instant(CLOUDSHIFT, "Cloudshift", "{W}").with_spell(
            vec![TargetSpec::permanent(ObjectFilter::creature().you_control())],
            vec![Effect::Blink(EffectTarget::Target(0))],
        ),
        instant(UNDERGROWTH, "Undergrowth", "{G}")
            .with_additional_cost("{2}{R}")
            .with_spell(Vec::new(), vec![undergrowth]),
        // Until end of turn, target creature loses all abilities and becomes
        // a blue Frog with base power and toughness 1/1.
        instant(TURN_TO_FROG, "Turn to Frog", "{1}{U}").with_spell(
            vec![TargetSpec::creature()],
            vec![
                Effect::until_end_of_turn(0, Modification::RemoveAllAbilities),
                Effect::until_end_of_turn(0, Modification::SetColors(ColorSet::single(Color::Blue))),
                Effect::until_end_of_turn(0, Modification::SetSubtypes(smallvec!["Frog".into()])),
                Effect::until_end_of_turn(0, Modification::set_pt(1, 1)),
            ],
        ),
        instant(RAISE_THE_ALARM, "Raise the Alarm", "{1}{W}").with_spell(
            Vec::new(),
            vec![Effect::CreateTokens {
                card: SOLDIER_TOKEN,
                count: 2,
                player: PlayerRef::Controller,
            }],
        ),
        CardDefinition::new(SPAWN_GERM, "Spawn Germ")
            .with_cost("{B}")
            .with_types(&[CardType::Sorcery])
            .with_spell(
                Vec::new(),
                vec![Effect::CreateTokens {
                    card: GERM_TOKEN,
                    count: 1,
                    player: PlayerRef::Controller,
                }],
            ),
    ]
}

fn tokens() -> Vec<CardDefinition> {
    vec![
        CardDefinition::new(SOLDIER_TOKEN, "Soldier")
            .with_colors(ColorSet::single(Color::White))
            .with_types(&[CardType::Creature])
            .with_subtypes(&["Soldier"])
            .with_pt(1, 1)
            .token(),
        CardDefinition::new(GERM_TOKEN, "Germ")
            .with_colors(ColorSet::single(Color::Black))
            .with_types(&[CardType::Creature])
            .with_subtypes(&["Phyrexian", "Germ"])
            .with_pt(0, 0)
            .token(),
    ]
}

/// Every sample card, validated.
pub fn sample_registry() -> Result<CardRegistry> {
    let mut registry = CardRegistry::new();
    registry.register_all(
        lands()
            .into_iter()
            .chain(creatures())
            .chain(noncreature_spells())
            .chain(tokens()),
    )?;
    Ok(registry)
}

/// A 40-card red-green deck of sample cards.
#[must_use]
pub fn starter_deck() -> Vec<CardId> {
    let counts = [
        (FOREST, 9),
        (MOUNTAIN, 8),
        (LLANOWAR_ELVES, 4),
        (GRIZZLY_BEARS, 4),
        (HILL_GIANT, 3),
        (GIANT_SPIDER, 2),
        (COLOSSAL_DREADMAW, 2),
        (BLITZ_AUTOMATON, 2),
        (LIGHTNING_BOLT, 3),
        (GIANT_GROWTH, 3),
    ];
    counts
        .iter()
        .flat_map(|(card, n)| std::iter::repeat(*card).take(*n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_registry_validates() {
        let registry = sample_registry().unwrap();
        assert_eq!(registry.len(), 5 + 14 + 9 + 2);
        assert!(registry.get(GERM_TOKEN).unwrap().token);
    }

    #[test]
    fn test_starter_deck() {
        let deck = starter_deck();
        assert_eq!(deck.len(), 40);
        let registry = sample_registry().unwrap();
        assert!(deck.iter().all(|c| registry.contains(*c)));
        assert!(deck.iter().all(|c| !registry.get(*c).unwrap().token));
    }

    #[test]
    fn test_prototype_characteristics() {
        let registry = sample_registry().unwrap();
        let automaton = registry.get(BLITZ_AUTOMATON).unwrap();
        assert_eq!(automaton.characteristics(false).pt(), Some((6, 4)));
        let proto = automaton.characteristics(true);
        assert_eq!(proto.pt(), Some((3, 2)));
        assert!(proto.colors.contains(Color::Red));
    }
}
