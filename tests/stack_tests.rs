//! Priority and stack integration tests.
//!
//! These tests cast spells from the sample library through the public
//! action interface and check resolution order, countering, fizzling and
//! rollback of illegal actions.

use std::sync::Arc;

use ccg_rules::cards::library::{
    self, CLOUDSHIFT, COUNTERSPELL, FOREST, GIANT_GROWTH, GRIZZLY_BEARS, ISLAND, LIGHTNING_BOLT, MOUNTAIN, PLAINS,
    SPAWN_GERM, SWAMP,
};
use ccg_rules::cards::{CardDefinition, CardId, CardType};
use ccg_rules::core::{IllegalReason, ObjectId, PlayerAction, PlayerId, RulesConfig, RulesError, Target};
use ccg_rules::decision::Deciders;
use ccg_rules::effects::{Effect, EffectTarget, TargetSpec};
use ccg_rules::game::Game;
use ccg_rules::layers::Value;
use ccg_rules::rules::RulesEngine;
use ccg_rules::stack::Step;
use ccg_rules::zones::ZoneKey;

const P0: PlayerId = PlayerId(0);
const P1: PlayerId = PlayerId(1);

fn game(players: usize) -> Game {
    let cards = Arc::new(library::sample_registry().unwrap());
    Game::new(RulesConfig::new(players), cards, 7).unwrap()
}

/// Begin `active`'s precombat main phase; `active` gets priority.
fn main_phase(game: &mut Game, active: PlayerId) {
    let players = game.state().player_count();
    game.set_step(active, Step::PrecombatMain);
    game.step(&mut Deciders::autopilot(players)).unwrap();
    assert_eq!(game.priority_holder(), Some(active));
}

/// Every live player passes once, in turn.
fn pass_round(game: &mut Game) {
    for _ in 0..game.state().live_players().len() {
        let holder = game.priority_holder().unwrap();
        game.apply_action(holder, &PlayerAction::PassPriority).unwrap();
    }
}

fn target(game: &Game, id: ObjectId) -> Target {
    Target::Object(game.state().object(id).unwrap().object_ref())
}

#[test]
fn test_bolt_resolves() {
    let mut game = game(2);
    let mountain = game.put_onto_battlefield(MOUNTAIN, P0).unwrap();
    let bolt = game.put_in_hand(LIGHTNING_BOLT, P0).unwrap();
    main_phase(&mut game, P0);

    game.apply_action(P0, &PlayerAction::cast(bolt, &[Target::Player(P1)])).unwrap();
    assert_eq!(game.stack().len(), 1);
    assert!(game.state().object(mountain).unwrap().tapped);
    assert_eq!(game.priority_holder(), Some(P0));

    pass_round(&mut game);
    assert!(game.stack().is_empty());
    assert_eq!(game.life(P1), 17);
    assert!(game.zone(ZoneKey::graveyard(P0)).contains(&bolt));
}

#[test]
fn test_counterspell_resolves_first() {
    let mut game = game(2);
    game.put_onto_battlefield(MOUNTAIN, P0).unwrap();
    let bolt = game.put_in_hand(LIGHTNING_BOLT, P0).unwrap();
    game.put_onto_battlefield(ISLAND, P1).unwrap();
    game.put_onto_battlefield(ISLAND, P1).unwrap();
    let counter = game.put_in_hand(COUNTERSPELL, P1).unwrap();
    main_phase(&mut game, P0);

    game.apply_action(P0, &PlayerAction::cast(bolt, &[Target::Player(P1)])).unwrap();
    game.apply_action(P0, &PlayerAction::PassPriority).unwrap();
    assert_eq!(game.priority_holder(), Some(P1));

    let bolt_on_stack = target(&game, bolt);
    game.apply_action(P1, &PlayerAction::cast(counter, &[bolt_on_stack])).unwrap();
    assert_eq!(game.stack().len(), 2);
    assert_eq!(game.stack().top().unwrap().source, counter);

    pass_round(&mut game);
    assert!(game.stack().is_empty(), "the countered bolt left the stack");
    assert_eq!(game.life(P1), 20);
    assert!(game.zone(ZoneKey::graveyard(P0)).contains(&bolt));
    assert!(game.zone(ZoneKey::graveyard(P1)).contains(&counter));
    assert_eq!(game.priority_holder(), Some(P0));
}

#[test]
fn test_spell_fizzles_when_target_blinks() {
    let mut game = game(2);
    game.put_onto_battlefield(MOUNTAIN, P0).unwrap();
    let bolt = game.put_in_hand(LIGHTNING_BOLT, P0).unwrap();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P1).unwrap();
    game.put_onto_battlefield(PLAINS, P1).unwrap();
    let cloudshift = game.put_in_hand(CLOUDSHIFT, P1).unwrap();
    main_phase(&mut game, P0);

    let old_bears = target(&game, bears);
    game.apply_action(P0, &PlayerAction::cast(bolt, &[old_bears])).unwrap();
    game.apply_action(P0, &PlayerAction::PassPriority).unwrap();
    game.apply_action(P1, &PlayerAction::cast(cloudshift, &[old_bears])).unwrap();

    pass_round(&mut game);
    assert_eq!(game.stack().len(), 1, "cloudshift resolved, bolt waits");
    assert_ne!(target(&game, bears), old_bears, "blinked bears is a new object");

    pass_round(&mut game);
    assert!(game.stack().is_empty());
    assert!(game.zone(ZoneKey::BATTLEFIELD).contains(&bears));
    assert_eq!(game.state().object(bears).unwrap().damage, 0);
    assert!(game.zone(ZoneKey::graveyard(P0)).contains(&bolt));
}

#[test]
fn test_pump_in_response_saves_creature() {
    let mut game = game(2);
    game.put_onto_battlefield(MOUNTAIN, P0).unwrap();
    let bolt = game.put_in_hand(LIGHTNING_BOLT, P0).unwrap();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P1).unwrap();
    game.put_onto_battlefield(FOREST, P1).unwrap();
    let growth = game.put_in_hand(GIANT_GROWTH, P1).unwrap();
    main_phase(&mut game, P0);

    let t = target(&game, bears);
    game.apply_action(P0, &PlayerAction::cast(bolt, &[t])).unwrap();
    game.apply_action(P0, &PlayerAction::PassPriority).unwrap();
    game.apply_action(P1, &PlayerAction::cast(growth, &[t])).unwrap();

    pass_round(&mut game);
    assert_eq!(game.derived(bears).unwrap().toughness(), 5);
    pass_round(&mut game);

    assert!(game.zone(ZoneKey::BATTLEFIELD).contains(&bears));
    assert_eq!(game.state().object(bears).unwrap().damage, 3);
}

#[test]
fn test_lethal_bolt_kills_creature() {
    let mut game = game(2);
    game.put_onto_battlefield(MOUNTAIN, P0).unwrap();
    let bolt = game.put_in_hand(LIGHTNING_BOLT, P0).unwrap();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P1).unwrap();
    main_phase(&mut game, P0);

    let t = target(&game, bears);
    game.apply_action(P0, &PlayerAction::cast(bolt, &[t])).unwrap();
    pass_round(&mut game);

    assert!(game.zone(ZoneKey::graveyard(P1)).contains(&bears));
    assert!(!game.zone(ZoneKey::BATTLEFIELD).contains(&bears));
}

#[test]
fn test_illegal_action_leaves_state_unchanged() {
    let mut game = game(2);
    let bolt = game.put_in_hand(LIGHTNING_BOLT, P0).unwrap();
    main_phase(&mut game, P0);
    let before = game.checkpoint().unwrap();

    let err = game
        .apply_action(P0, &PlayerAction::cast(bolt, &[Target::Player(P1)]))
        .unwrap_err();
    assert!(err.is_illegal_action());
    assert_eq!(game.checkpoint().unwrap(), before);
    assert!(game.zone(ZoneKey::hand(P0)).contains(&bolt));
}

#[test]
fn test_wrong_target_rejected() {
    let mut game = game(2);
    game.put_onto_battlefield(FOREST, P0).unwrap();
    let growth = game.put_in_hand(GIANT_GROWTH, P0).unwrap();
    game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    main_phase(&mut game, P0);
    let before = game.checkpoint().unwrap();

    let err = game
        .apply_action(P0, &PlayerAction::cast(growth, &[Target::Player(P1)]))
        .unwrap_err();
    assert!(matches!(
        err,
        RulesError::IllegalAction {
            reason: IllegalReason::InvalidTarget,
            ..
        }
    ));
    assert_eq!(game.checkpoint().unwrap(), before);
}

#[test]
fn test_sorcery_needs_empty_stack_and_own_turn() {
    let mut game = game(2);
    game.put_onto_battlefield(MOUNTAIN, P0).unwrap();
    let bolt = game.put_in_hand(LIGHTNING_BOLT, P0).unwrap();
    game.put_onto_battlefield(SWAMP, P1).unwrap();
    let germ = game.put_in_hand(SPAWN_GERM, P1).unwrap();
    main_phase(&mut game, P0);

    game.apply_action(P0, &PlayerAction::cast(bolt, &[Target::Player(P1)])).unwrap();
    game.apply_action(P0, &PlayerAction::PassPriority).unwrap();
    let err = game.apply_action(P1, &PlayerAction::cast(germ, &[])).unwrap_err();
    assert!(matches!(
        err,
        RulesError::IllegalAction {
            reason: IllegalReason::Timing,
            ..
        }
    ));
    assert!(!game
        .legal_actions(P1)
        .iter()
        .any(|a| matches!(a, PlayerAction::CastSpell { card, .. } if *card == germ)));
}

#[test]
fn test_acting_without_priority_rejected() {
    let mut game = game(2);
    game.put_onto_battlefield(MOUNTAIN, P1).unwrap();
    let bolt = game.put_in_hand(LIGHTNING_BOLT, P1).unwrap();
    main_phase(&mut game, P0);

    let err = game
        .apply_action(P1, &PlayerAction::cast(bolt, &[Target::Player(P0)]))
        .unwrap_err();
    assert!(matches!(
        err,
        RulesError::IllegalAction {
            reason: IllegalReason::NoPriority,
            ..
        }
    ));
    assert!(game.legal_actions(P1).is_empty());
}

#[test]
fn test_legal_actions_enumerate_targets() {
    let mut game = game(2);
    game.put_onto_battlefield(MOUNTAIN, P0).unwrap();
    let bolt = game.put_in_hand(LIGHTNING_BOLT, P0).unwrap();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P1).unwrap();
    main_phase(&mut game, P0);

    let actions = game.legal_actions(P0);
    assert_eq!(actions[0], PlayerAction::PassPriority);
    let bolt_targets: Vec<Target> = actions
        .iter()
        .filter_map(|a| match a {
            PlayerAction::CastSpell { card, targets, .. } if *card == bolt => Some(targets[0]),
            _ => None,
        })
        .collect();
    assert_eq!(
        bolt_targets,
        vec![Target::Player(P0), Target::Player(P1), target(&game, bears)]
    );
}

#[test]
fn test_all_pass_on_empty_stack_ends_step() {
    let mut game = game(3);
    main_phase(&mut game, P0);
    pass_round(&mut game);
    assert_eq!(game.turn().step, Step::BeginCombat);
    assert_eq!(game.priority_holder(), None);
}

const TWIN_SHOT: CardId = CardId(100);

#[test]
fn test_spell_with_one_legal_target_left_still_resolves() {
    let mut cards = library::sample_registry().unwrap();
    // Deals 2 damage to each of two target creatures.
    cards
        .register(
            CardDefinition::new(TWIN_SHOT, "Twin Shot")
                .with_cost("{R}{R}")
                .with_types(&[CardType::Instant])
                .with_spell(
                    vec![TargetSpec::creature(), TargetSpec::creature()],
                    vec![
                        Effect::damage(Value::Fixed(2), EffectTarget::Target(0)),
                        Effect::damage(Value::Fixed(2), EffectTarget::Target(1)),
                    ],
                ),
        )
        .unwrap();
    let mut game = Game::new(RulesConfig::new(2), Arc::new(cards), 7).unwrap();
    game.put_onto_battlefield(MOUNTAIN, P0).unwrap();
    game.put_onto_battlefield(MOUNTAIN, P0).unwrap();
    let shot = game.put_in_hand(TWIN_SHOT, P0).unwrap();
    let blinked = game.put_onto_battlefield(GRIZZLY_BEARS, P1).unwrap();
    let stays = game.put_onto_battlefield(GRIZZLY_BEARS, P1).unwrap();
    game.put_onto_battlefield(PLAINS, P1).unwrap();
    let cloudshift = game.put_in_hand(CLOUDSHIFT, P1).unwrap();
    main_phase(&mut game, P0);

    let targets = [target(&game, blinked), target(&game, stays)];
    game.apply_action(P0, &PlayerAction::cast(shot, &targets)).unwrap();
    game.apply_action(P0, &PlayerAction::PassPriority).unwrap();
    game.apply_action(P1, &PlayerAction::cast(cloudshift, &[targets[0]])).unwrap();
    pass_round(&mut game);
    pass_round(&mut game);

    assert!(game.stack().is_empty());
    assert!(game.zone(ZoneKey::BATTLEFIELD).contains(&blinked));
    assert_eq!(game.state().object(blinked).unwrap().damage, 0);
    assert!(game.zone(ZoneKey::graveyard(P1)).contains(&stays));
    assert!(game.zone(ZoneKey::graveyard(P0)).contains(&shot));
}
