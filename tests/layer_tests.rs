//! Continuous effect layer integration tests.
//!
//! Objects are put straight onto the battlefield and stored effects are
//! added by hand, so each test isolates one layering rule.

use std::sync::Arc;

use ccg_rules::cards::library::{
    self, BLITZ_AUTOMATON, CLOUDSHIFT, ELVISH_CHAMPION, GIANT_SPIDER, GLORIOUS_ANTHEM, GRIZZLY_BEARS,
    LLANOWAR_ELVES, MIRROR_MIMIC, MOUNTAIN, PLAINS, SERRA_ANGEL,
};
use ccg_rules::cards::{
    Ability, CardDefinition, CardId, CardType, Color, CounterKind, Keyword, ObjectFilter, Subtype,
};
use ccg_rules::core::{CastOptions, ObjectId, ObjectRef, PlayerAction, PlayerId, RulesConfig, Target};
use ccg_rules::decision::Deciders;
use ccg_rules::game::Game;
use ccg_rules::layers::{ContinuousEffect, Duration, EffectId, LayerSystem, Modification, Value};
use ccg_rules::rules::RulesEngine;
use ccg_rules::stack::Step;

const P0: PlayerId = PlayerId(0);
const P1: PlayerId = PlayerId(1);

const ELF_AERIE: CardId = CardId(100);
const GOBLIN_RAIDER: CardId = CardId(101);
const CROWD_MIND: CardId = CardId(102);

fn game() -> Game {
    let mut cards = library::sample_registry().unwrap();
    cards
        .register_all([
            // Elf creatures have flying.
            CardDefinition::new(ELF_AERIE, "Elf Aerie")
                .with_cost("{1}{G}")
                .with_types(&[CardType::Enchantment])
                .with_ability(Ability::static_for(
                    ObjectFilter::creature().with_subtype("Elf"),
                    Modification::grant(Keyword::Flying),
                )),
            CardDefinition::new(GOBLIN_RAIDER, "Goblin Raider")
                .with_cost("{1}{R}")
                .with_types(&[CardType::Creature])
                .with_subtypes(&["Goblin"])
                .with_pt(1, 2),
            // Power and toughness are each the number of creatures you control.
            CardDefinition::new(CROWD_MIND, "Crowd Mind")
                .with_cost("{2}{U}")
                .with_types(&[CardType::Creature])
                .with_pt(0, 0)
                .with_ability(Ability::characteristic_defining(Modification::SetPt {
                    power: Value::CountOf(ObjectFilter::creature().you_control()),
                    toughness: Value::CountOf(ObjectFilter::creature().you_control()),
                })),
        ])
        .unwrap();
    Game::new(RulesConfig::new(2), Arc::new(cards), 3).unwrap()
}

fn object_ref(game: &Game, id: ObjectId) -> ObjectRef {
    game.state().object(id).unwrap().object_ref()
}

/// Store an indefinite effect on `targets` with the next timestamp.
fn add_effect(game: &mut Game, targets: &[ObjectId], modification: Modification) -> EffectId {
    let affected: Vec<ObjectRef> = targets.iter().map(|id| object_ref(game, *id)).collect();
    let state = game.state_mut();
    let timestamp = state.next_timestamp();
    state.effects.add(ContinuousEffect::new(
        targets[0],
        P0,
        timestamp,
        Duration::Indefinite,
        &affected,
        modification,
    ))
}

fn pt(game: &Game, id: ObjectId) -> (i32, i32) {
    let derived = game.derived(id).unwrap();
    (derived.power(), derived.toughness())
}

#[test]
fn test_anthem_and_pump_stack() {
    let mut game = game();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    let their_bears = game.put_onto_battlefield(GRIZZLY_BEARS, P1).unwrap();
    game.put_onto_battlefield(GLORIOUS_ANTHEM, P0).unwrap();

    assert_eq!(pt(&game, bears), (3, 3));
    assert_eq!(pt(&game, their_bears), (2, 2));

    add_effect(&mut game, &[bears], Modification::pump(3, 3));
    assert_eq!(pt(&game, bears), (6, 6));
}

#[test]
fn test_setting_applies_before_modifying_regardless_of_timestamp() {
    let mut game = game();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();

    add_effect(&mut game, &[bears], Modification::pump(3, 3));
    add_effect(&mut game, &[bears], Modification::set_pt(1, 1));
    assert_eq!(pt(&game, bears), (4, 4));
}

#[test]
fn test_counters_apply_with_modifications() {
    let mut game = game();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    game.state_mut()
        .object_mut(bears)
        .unwrap()
        .add_counters(CounterKind::PlusOne, 2);
    add_effect(&mut game, &[bears], Modification::set_pt(0, 1));

    assert_eq!(pt(&game, bears), (2, 3));
}

#[test]
fn test_switch_applies_last() {
    let mut game = game();
    let spider = game.put_onto_battlefield(GIANT_SPIDER, P0).unwrap();

    add_effect(&mut game, &[spider], Modification::SwitchPt);
    add_effect(&mut game, &[spider], Modification::pump(1, 0));
    assert_eq!(pt(&game, spider), (4, 3));
}

#[test]
fn test_lord_pumps_other_elves() {
    let mut game = game();
    let champion = game.put_onto_battlefield(ELVISH_CHAMPION, P0).unwrap();
    let elves = game.put_onto_battlefield(LLANOWAR_ELVES, P0).unwrap();
    let their_elves = game.put_onto_battlefield(LLANOWAR_ELVES, P1).unwrap();

    assert_eq!(pt(&game, champion), (2, 2));
    assert_eq!(pt(&game, elves), (2, 2));
    assert_eq!(pt(&game, their_elves), (2, 2));
}

#[test]
fn test_losing_abilities_removes_lord_bonus() {
    let mut game = game();
    let champion = game.put_onto_battlefield(ELVISH_CHAMPION, P0).unwrap();
    let elves = game.put_onto_battlefield(LLANOWAR_ELVES, P0).unwrap();

    add_effect(&mut game, &[champion], Modification::RemoveAllAbilities);
    assert_eq!(pt(&game, elves), (1, 1));
    assert!(game.derived(champion).unwrap().characteristics.abilities.is_empty());
}

#[test]
fn test_ability_removal_applies_first_when_it_removes_the_grant() {
    let mut game = game();
    let aerie = game.put_onto_battlefield(ELF_AERIE, P0).unwrap();
    let elves = game.put_onto_battlefield(LLANOWAR_ELVES, P0).unwrap();
    assert!(game.derived(elves).unwrap().characteristics.has_keyword(Keyword::Flying));

    // Newer than the aerie, but the aerie's grant depends on it.
    add_effect(&mut game, &[aerie], Modification::RemoveAllAbilities);
    assert!(!game.derived(elves).unwrap().characteristics.has_keyword(Keyword::Flying));
}

#[test]
fn test_text_change_redirects_lord() {
    let mut game = game();
    let champion = game.put_onto_battlefield(ELVISH_CHAMPION, P0).unwrap();
    let elves = game.put_onto_battlefield(LLANOWAR_ELVES, P0).unwrap();
    let goblin = game.put_onto_battlefield(GOBLIN_RAIDER, P0).unwrap();
    assert_eq!(pt(&game, goblin), (1, 2));

    add_effect(
        &mut game,
        &[champion],
        Modification::ReplaceSubtypeWord {
            from: Subtype::from("Elf"),
            to: Subtype::from("Goblin"),
        },
    );
    assert_eq!(pt(&game, elves), (1, 1));
    assert_eq!(pt(&game, goblin), (2, 3));
    let champion_chars = game.characteristics(champion).unwrap();
    assert!(champion_chars.has_subtype(&Subtype::from("Goblin")));
    assert!(!champion_chars.has_subtype(&Subtype::from("Elf")));
}

#[test]
fn test_copy_then_modify() {
    let mut game = game();
    let angel = game.put_onto_battlefield(SERRA_ANGEL, P1).unwrap();
    let mimic = game.put_onto_battlefield(MIRROR_MIMIC, P0).unwrap();

    let angel_ref = object_ref(&game, angel);
    add_effect(&mut game, &[angel], Modification::pump(2, 2));
    add_effect(&mut game, &[mimic], Modification::CopyOf(angel_ref));
    add_effect(&mut game, &[mimic], Modification::pump(1, 1));

    let copy = game.derived(mimic).unwrap();
    assert_eq!(copy.characteristics.name, "Serra Angel");
    assert!(copy.characteristics.has_keyword(Keyword::Flying));
    assert_eq!(copy.controller, P0);
    // The angel's pump isn't copiable; the mimic's own pump still applies.
    assert_eq!(pt(&game, mimic), (5, 5));

    let copiable = LayerSystem::copiable_values(game.state(), game.cards(), mimic).unwrap();
    assert_eq!(copiable.pt(), Some((4, 4)));
}

#[test]
fn test_control_change_moves_anthem_bonus() {
    let mut game = game();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    game.put_onto_battlefield(GLORIOUS_ANTHEM, P1).unwrap();
    assert_eq!(pt(&game, bears), (2, 2));

    add_effect(&mut game, &[bears], Modification::ChangeController(P1));
    let derived = game.derived(bears).unwrap();
    assert_eq!(derived.controller, P1);
    assert_eq!(derived.owner, P0);
    assert_eq!(pt(&game, bears), (3, 3));
}

#[test]
fn test_prototype_values() {
    let mut game = game();
    let full = game.put_onto_battlefield(BLITZ_AUTOMATON, P0).unwrap();
    let proto = game.put_onto_battlefield(BLITZ_AUTOMATON, P0).unwrap();
    game.state_mut().object_mut(proto).unwrap().cast = CastOptions::prototyped();

    assert_eq!(pt(&game, full), (6, 4));
    assert!(game.characteristics(full).unwrap().colors.is_colorless());
    assert_eq!(pt(&game, proto), (3, 2));
    assert!(game.characteristics(proto).unwrap().colors.contains(Color::Red));
}

#[test]
fn test_characteristic_defining_before_setting() {
    let mut game = game();
    let mind = game.put_onto_battlefield(CROWD_MIND, P0).unwrap();
    game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    game.put_onto_battlefield(GRIZZLY_BEARS, P1).unwrap();
    assert_eq!(pt(&game, mind), (3, 3));

    add_effect(&mut game, &[mind], Modification::set_pt(1, 1));
    assert_eq!(pt(&game, mind), (1, 1));
}

#[test]
fn test_effect_on_departed_object_stops_applying() {
    let mut game = game();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    add_effect(&mut game, &[bears], Modification::pump(3, 3));
    assert_eq!(pt(&game, bears), (5, 5));

    // A new object for the same card after a zone change.
    let state = game.state_mut();
    let timestamp = state.next_timestamp();
    state.object_mut(bears).unwrap().reset_for_zone_change(timestamp);
    assert_eq!(pt(&game, bears), (2, 2));
}

#[test]
fn test_view_is_recomputed_from_base_values() {
    let mut game = game();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    add_effect(&mut game, &[bears], Modification::pump(1, 1));

    let first = game.view();
    let second = game.view();
    assert_eq!(first.get(bears), second.get(bears));
    assert_eq!(game.state().object(bears).unwrap().card, GRIZZLY_BEARS);
    let base = game.cards().get(GRIZZLY_BEARS).unwrap().characteristics(false);
    assert_eq!(base.pt(), Some((2, 2)));
}

#[test]
fn test_anthem_then_shrink() {
    let mut game = game();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    game.put_onto_battlefield(GLORIOUS_ANTHEM, P0).unwrap();
    add_effect(&mut game, &[bears], Modification::pump(-2, -2));
    assert_eq!(pt(&game, bears), (1, 1));
}

#[test]
fn test_removing_effect_restores_value() {
    let mut game = game();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    let before = game.derived(bears).unwrap();

    let id = add_effect(&mut game, &[bears], Modification::SwitchPt);
    add_effect(&mut game, &[bears], Modification::pump(1, 0));
    assert_eq!(pt(&game, bears), (2, 3));

    game.state_mut().effects.remove(id).unwrap();
    assert_eq!(pt(&game, bears), (3, 2));
    assert!(game.state_mut().effects.remove(id).is_none());
    assert_eq!(game.derived(bears).unwrap().characteristics.name, before.characteristics.name);
}

#[test]
fn test_prototyped_permanent_blinks_back_to_normal() {
    let mut game = game();
    for _ in 0..3 {
        game.put_onto_battlefield(MOUNTAIN, P0).unwrap();
    }
    let automaton = game.put_in_hand(BLITZ_AUTOMATON, P0).unwrap();
    assert_eq!(pt(&game, automaton), (6, 4));
    game.set_step(P0, Step::PrecombatMain);
    game.step(&mut Deciders::autopilot(2)).unwrap();

    game.apply_action(P0, &PlayerAction::cast_with(automaton, &[], CastOptions::prototyped()))
        .unwrap();
    assert_eq!(pt(&game, automaton), (3, 2));
    for _ in 0..2 {
        let holder = game.priority_holder().unwrap();
        game.apply_action(holder, &PlayerAction::PassPriority).unwrap();
    }
    assert_eq!(pt(&game, automaton), (3, 2));
    assert!(game.characteristics(automaton).unwrap().colors.contains(Color::Red));

    // A copy takes the prototype values.
    let mimic = game.put_onto_battlefield(MIRROR_MIMIC, P1).unwrap();
    let automaton_ref = object_ref(&game, automaton);
    add_effect(&mut game, &[mimic], Modification::CopyOf(automaton_ref));
    assert_eq!(pt(&game, mimic), (3, 2));

    game.put_onto_battlefield(PLAINS, P0).unwrap();
    let cloudshift = game.put_in_hand(CLOUDSHIFT, P0).unwrap();
    game.apply_action(P0, &PlayerAction::cast(cloudshift, &[Target::Object(automaton_ref)]))
        .unwrap();
    for _ in 0..2 {
        let holder = game.priority_holder().unwrap();
        game.apply_action(holder, &PlayerAction::PassPriority).unwrap();
    }
    assert_eq!(pt(&game, automaton), (6, 4));
    assert!(game.characteristics(automaton).unwrap().colors.is_colorless());
}
