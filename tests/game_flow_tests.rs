//! Turn structure, combat and state-based action integration tests.

use std::sync::Arc;

use ccg_rules::cards::library::{
    self, COLOSSAL_DREADMAW, FOREST, GIANT_SPIDER, GRIZZLY_BEARS, ISAMARU, LIGHTNING_BOLT, LLANOWAR_ELVES, MOUNTAIN,
    PRODIGAL_SORCERER, SERRA_ANGEL, SPAWN_GERM, SWAMP, VAMPIRE_NIGHTHAWK,
};
use ccg_rules::cards::CounterKind;
use ccg_rules::core::{IllegalReason, PlayerAction, PlayerId, RulesConfig, RulesError, Target};
use ccg_rules::decision::{AutoPilot, Deciders, DecisionError, DecisionMaker, DecisionRequest, DecisionResponse};
use ccg_rules::game::{EventLog, Game, StepOutcome};
use ccg_rules::rules::{GameResult, RulesEngine};
use ccg_rules::stack::Step;
use ccg_rules::zones::ZoneKey;

const P0: PlayerId = PlayerId(0);
const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

fn game(players: usize, seed: u64) -> Game {
    let cards = Arc::new(library::sample_registry().unwrap());
    Game::new(RulesConfig::new(players), cards, seed).unwrap()
}

fn started(seed: u64) -> Game {
    let mut game = game(2, seed);
    let deck = library::starter_deck();
    game.start(&[deck.clone(), deck]).unwrap();
    game
}

fn aggressive(players: usize) -> Deciders {
    let mut deciders = Deciders::autopilot(players);
    for seat in 0..players {
        deciders = deciders.with(PlayerId::new(seat as u8), AutoPilot::aggressive());
    }
    deciders
}

fn pass_round(game: &mut Game) {
    for _ in 0..game.state().live_players().len() {
        let holder = game.priority_holder().unwrap();
        game.apply_action(holder, &PlayerAction::PassPriority).unwrap();
    }
}

/// Blocks the first attacker it is offered with the first creature it can.
struct BlockFirst;

impl DecisionMaker for BlockFirst {
    fn decide(&mut self, request: &DecisionRequest) -> Result<DecisionResponse, DecisionError> {
        Ok(match request {
            DecisionRequest::Blockers { options, .. } => {
                DecisionResponse::Blockers(options.first().copied().into_iter().collect())
            }
            other => other.fallback(),
        })
    }
}

/// Run `active`'s combat from the beginning of combat to the postcombat
/// main phase.
fn run_combat(game: &mut Game, active: PlayerId, deciders: &mut Deciders) {
    game.set_step(active, Step::BeginCombat);
    for _ in 0..40 {
        if game.turn().step == Step::PostcombatMain {
            return;
        }
        game.step(deciders).unwrap();
    }
    panic!("combat did not finish");
}

#[test]
fn test_autopilot_game_reaches_a_result() {
    let mut game = started(17);
    let log = EventLog::new();
    game.add_listener(log.clone());

    let result = game.run_until_end(&mut aggressive(2), 20_000).unwrap();
    assert!(result.is_some());
    assert_eq!(game.result(), result.as_ref());
    assert_eq!(log.result(), result);
    assert!(log.count("step_began") > 0);
    assert!(matches!(game.step(&mut aggressive(2)).unwrap(), StepOutcome::GameOver(_)));
}

#[test]
fn test_same_seed_same_game() {
    let mut a = started(99);
    let mut b = started(99);
    a.run_until_end(&mut aggressive(2), 600).unwrap();
    b.run_until_end(&mut aggressive(2), 600).unwrap();
    assert_eq!(a.checkpoint().unwrap(), b.checkpoint().unwrap());
}

#[test]
fn test_restored_game_continues_identically() {
    let mut original = started(5);
    original.run_until_end(&mut aggressive(2), 300).unwrap();

    let bytes = original.checkpoint().unwrap();
    let mut restored = Game::restore(original.config().clone(), Arc::clone(original.cards()), &bytes).unwrap();
    assert_eq!(restored.checkpoint().unwrap(), bytes);

    original.run_until_end(&mut aggressive(2), 300).unwrap();
    restored.run_until_end(&mut aggressive(2), 300).unwrap();
    assert_eq!(original.checkpoint().unwrap(), restored.checkpoint().unwrap());
}

#[test]
fn test_turn_passes_and_permanents_untap() {
    let mut game = game(3, 1);
    let forest = game.put_onto_battlefield(FOREST, P1).unwrap();
    game.state_mut().object_mut(forest).unwrap().tapped = true;
    game.set_step(P0, Step::End);

    let mut deciders = Deciders::autopilot(3);
    // End: begin and three passes. Cleanup. Untap of the next turn.
    for _ in 0..6 {
        game.step(&mut deciders).unwrap();
    }
    assert_eq!(game.turn().active, P1);
    assert_eq!(game.turn().step, Step::Upkeep);
    assert!(!game.state().object(forest).unwrap().tapped);
}

#[test]
fn test_cleanup_discards_to_hand_size() {
    let mut game = game(2, 1);
    for _ in 0..9 {
        game.put_in_hand(FOREST, P0).unwrap();
    }
    game.set_step(P0, Step::Cleanup);
    game.step(&mut Deciders::autopilot(2)).unwrap();

    assert_eq!(game.zone(ZoneKey::hand(P0)).len(), 7);
    assert_eq!(game.zone(ZoneKey::graveyard(P0)).len(), 2);
}

#[test]
fn test_unblocked_attack_deals_damage() {
    let mut game = game(2, 1);
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    let mut deciders = Deciders::autopilot(2).with(P0, AutoPilot::aggressive());

    run_combat(&mut game, P0, &mut deciders);
    assert_eq!(game.life(P1), 18);
    assert!(game.state().object(bears).unwrap().tapped);
}

#[test]
fn test_summoning_sick_creature_cannot_attack() {
    let mut game = game(2, 1);
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    game.state_mut().object_mut(bears).unwrap().summoning_sick = true;
    let mut deciders = Deciders::autopilot(2).with(P0, AutoPilot::aggressive());

    run_combat(&mut game, P0, &mut deciders);
    assert_eq!(game.life(P1), 20);
}

#[test]
fn test_block_with_vigilance_attacker() {
    let mut game = game(2, 1);
    let angel = game.put_onto_battlefield(SERRA_ANGEL, P0).unwrap();
    let spider = game.put_onto_battlefield(GIANT_SPIDER, P1).unwrap();
    let mut deciders = Deciders::autopilot(2).with(P0, AutoPilot::aggressive()).with(P1, BlockFirst);

    run_combat(&mut game, P0, &mut deciders);
    assert_eq!(game.life(P1), 20);
    assert!(game.zone(ZoneKey::graveyard(P1)).contains(&spider));
    let angel_obj = game.state().object(angel).unwrap();
    assert_eq!(angel_obj.damage, 2);
    assert!(!angel_obj.tapped);
}

#[test]
fn test_deathtouch_and_lifelink_in_combat() {
    let mut game = game(2, 1);
    let hawk = game.put_onto_battlefield(VAMPIRE_NIGHTHAWK, P0).unwrap();
    let spider = game.put_onto_battlefield(GIANT_SPIDER, P1).unwrap();
    let mut deciders = Deciders::autopilot(2).with(P0, AutoPilot::aggressive()).with(P1, BlockFirst);

    run_combat(&mut game, P0, &mut deciders);
    assert!(game.zone(ZoneKey::graveyard(P1)).contains(&spider));
    assert!(game.zone(ZoneKey::BATTLEFIELD).contains(&hawk));
    assert_eq!(game.life(P0), 22);
    assert_eq!(game.life(P1), 20);
}

#[test]
fn test_trample_assigns_excess_to_player() {
    let mut game = game(2, 1);
    game.put_onto_battlefield(COLOSSAL_DREADMAW, P0).unwrap();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P1).unwrap();
    let mut deciders = Deciders::autopilot(2).with(P0, AutoPilot::aggressive()).with(P1, BlockFirst);

    run_combat(&mut game, P0, &mut deciders);
    assert!(game.zone(ZoneKey::graveyard(P1)).contains(&bears));
    assert_eq!(game.life(P1), 16);
}

#[test]
fn test_drawing_from_empty_library_loses() {
    let mut game = game(2, 1);
    game.state_mut().turn.number = 3;
    game.set_step(P1, Step::Draw);

    let outcome = game.step(&mut Deciders::autopilot(2)).unwrap();
    assert_eq!(outcome, StepOutcome::GameOver(GameResult::Winner(P0)));
    assert!(game.state().player(P1).lost);
    assert!(matches!(
        game.apply_action(P0, &PlayerAction::PassPriority),
        Err(RulesError::GameOver)
    ));
}

#[test]
fn test_eliminated_player_leaves_multiplayer_game() {
    let mut game = game(3, 1);
    game.put_onto_battlefield(MOUNTAIN, P0).unwrap();
    let bolt = game.put_in_hand(LIGHTNING_BOLT, P0).unwrap();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P2).unwrap();
    game.state_mut().player_mut(P2).life = 3;
    game.set_step(P0, Step::PrecombatMain);
    game.step(&mut Deciders::autopilot(3)).unwrap();

    game.apply_action(P0, &PlayerAction::cast(bolt, &[Target::Player(P2)])).unwrap();
    pass_round(&mut game);

    assert!(game.state().player(P2).lost);
    assert!(game.result().is_none());
    assert_eq!(game.state().live_players(), vec![P0, P1]);
    assert!(game.state().object(bears).is_none());
    assert_eq!(game.priority_holder(), Some(P0));

    // Two passes now end the step.
    pass_round(&mut game);
    assert_eq!(game.turn().step, Step::BeginCombat);
}

#[test]
fn test_legend_rule_keeps_one() {
    let mut game = game(2, 1);
    let first = game.put_onto_battlefield(ISAMARU, P0).unwrap();
    let second = game.put_onto_battlefield(ISAMARU, P0).unwrap();
    let theirs = game.put_onto_battlefield(ISAMARU, P1).unwrap();
    game.set_step(P0, Step::PrecombatMain);
    game.step(&mut Deciders::autopilot(2)).unwrap();

    let battlefield = game.zone(ZoneKey::BATTLEFIELD);
    assert!(battlefield.contains(&first));
    assert!(!battlefield.contains(&second));
    assert!(battlefield.contains(&theirs));
    assert!(game.zone(ZoneKey::graveyard(P0)).contains(&second));
}

#[test]
fn test_one_land_per_turn() {
    let mut game = game(2, 1);
    let a = game.put_in_hand(FOREST, P0).unwrap();
    let b = game.put_in_hand(FOREST, P0).unwrap();
    game.set_step(P0, Step::PrecombatMain);
    game.step(&mut Deciders::autopilot(2)).unwrap();

    game.apply_action(P0, &PlayerAction::PlayLand { card: a }).unwrap();
    let err = game.apply_action(P0, &PlayerAction::PlayLand { card: b }).unwrap_err();
    assert!(matches!(
        err,
        RulesError::IllegalAction {
            reason: IllegalReason::LandLimit,
            ..
        }
    ));
    assert!(!game
        .legal_actions(P0)
        .iter()
        .any(|a| matches!(a, PlayerAction::PlayLand { .. })));
}

#[test]
fn test_creature_mana_pays_for_spells() {
    let mut game = game(2, 1);
    let forest = game.put_onto_battlefield(FOREST, P0).unwrap();
    let elves = game.put_onto_battlefield(LLANOWAR_ELVES, P0).unwrap();
    let bears = game.put_in_hand(GRIZZLY_BEARS, P0).unwrap();
    game.set_step(P0, Step::PrecombatMain);
    game.step(&mut Deciders::autopilot(2)).unwrap();

    game.apply_action(P0, &PlayerAction::cast(bears, &[])).unwrap();
    assert!(game.state().object(forest).unwrap().tapped);
    assert!(game.state().object(elves).unwrap().tapped);
    pass_round(&mut game);
    assert!(game.zone(ZoneKey::BATTLEFIELD).contains(&bears));
}

#[test]
fn test_tap_ability_once_per_untap() {
    let mut game = game(2, 1);
    let sorcerer = game.put_onto_battlefield(PRODIGAL_SORCERER, P0).unwrap();
    game.set_step(P0, Step::PrecombatMain);
    game.step(&mut Deciders::autopilot(2)).unwrap();

    let ping = PlayerAction::activate(sorcerer, 0, &[Target::Player(P1)]);
    game.apply_action(P0, &ping).unwrap();
    assert!(game.state().object(sorcerer).unwrap().tapped);

    let err = game.apply_action(P0, &ping).unwrap_err();
    assert!(matches!(
        err,
        RulesError::IllegalAction {
            reason: IllegalReason::UnpayableCost,
            ..
        }
    ));

    pass_round(&mut game);
    assert_eq!(game.life(P1), 19);
}

#[test]
fn test_zero_toughness_token_dies_and_ceases_to_exist() {
    let mut game = game(2, 1);
    let log = EventLog::new();
    game.add_listener(log.clone());
    game.put_onto_battlefield(SWAMP, P0).unwrap();
    let spell = game.put_in_hand(SPAWN_GERM, P0).unwrap();
    game.set_step(P0, Step::PrecombatMain);
    game.step(&mut Deciders::autopilot(2)).unwrap();

    game.apply_action(P0, &PlayerAction::cast(spell, &[])).unwrap();
    pass_round(&mut game);

    assert_eq!(log.count("created"), 1);
    assert_eq!(game.zone(ZoneKey::graveyard(P0)).len(), 1);
    assert!(game.zone(ZoneKey::graveyard(P0)).contains(&spell));
    assert!(game.view().battlefield().all(|o| !o.characteristics.is_creature()));
    assert!(game.state().objects.values().all(|o| !o.token));
}

#[test]
fn test_poison_threshold_loses() {
    let mut below = game(2, 1);
    below.state_mut().player_mut(P1).poison = 9;
    below.set_step(P0, Step::Upkeep);
    assert_eq!(
        below.step(&mut Deciders::autopilot(2)).unwrap(),
        StepOutcome::StepBegan(Step::Upkeep)
    );
    assert!(!below.state().player(P1).lost);

    let mut at = game(2, 1);
    at.state_mut().player_mut(P1).poison = 10;
    at.set_step(P0, Step::Upkeep);
    assert_eq!(
        at.step(&mut Deciders::autopilot(2)).unwrap(),
        StepOutcome::GameOver(GameResult::Winner(P0))
    );
    assert!(at.state().player(P1).lost);
}

#[test]
fn test_plus_and_minus_counters_annihilate() {
    let mut game = game(2, 1);
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, P0).unwrap();
    let obj = game.state_mut().object_mut(bears).unwrap();
    obj.add_counters(CounterKind::PlusOne, 2);
    obj.add_counters(CounterKind::MinusOne, 1);
    game.set_step(P0, Step::Upkeep);
    game.step(&mut Deciders::autopilot(2)).unwrap();

    let obj = game.state().object(bears).unwrap();
    assert_eq!(obj.counter(CounterKind::PlusOne), 1);
    assert_eq!(obj.counter(CounterKind::MinusOne), 0);
    let derived = game.derived(bears).unwrap();
    assert_eq!((derived.power(), derived.toughness()), (3, 3));
}

#[test]
fn test_step_rejects_wrong_number_of_deciders() {
    let mut game = game(3, 1);
    game.set_step(P0, Step::Upkeep);
    assert!(matches!(game.step(&mut Deciders::autopilot(2)), Err(RulesError::Config(_))));
}
