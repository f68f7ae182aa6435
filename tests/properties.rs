//! Property tests for ordering, costs and layer arithmetic.

use std::sync::Arc;

use proptest::prelude::*;

use ccg_rules::cards::library::{self, GRIZZLY_BEARS, LIGHTNING_BOLT, MOUNTAIN};
use ccg_rules::cards::ManaCost;
use ccg_rules::core::{apnap_order, GameRng, ObjectId, PlayerAction, PlayerId, RulesConfig, Target};
use ccg_rules::decision::{AutoPilot, Deciders};
use ccg_rules::game::Game;
use ccg_rules::layers::{ContinuousEffect, Duration, Modification};
use ccg_rules::rules::{GameResult, RulesEngine};
use ccg_rules::stack::Step;

const COLOR_SYMBOLS: [char; 5] = ['W', 'U', 'B', 'R', 'G'];

fn bears_with(effects: &[Modification]) -> (i32, i32) {
    let cards = Arc::new(library::sample_registry().unwrap());
    let mut game = Game::new(RulesConfig::new(2), cards, 1).unwrap();
    let bears = game.put_onto_battlefield(GRIZZLY_BEARS, PlayerId::new(0)).unwrap();
    let bears_ref = game.state().object(bears).unwrap().object_ref();
    for modification in effects {
        let state = game.state_mut();
        let timestamp = state.next_timestamp();
        state.effects.add(ContinuousEffect::new(
            bears,
            PlayerId::new(0),
            timestamp,
            Duration::Indefinite,
            &[bears_ref],
            modification.clone(),
        ));
    }
    let derived = game.derived(bears).unwrap();
    (derived.power(), derived.toughness())
}

proptest! {
    /// APNAP order is a rotation of the seats starting at the active player.
    #[test]
    fn apnap_is_rotation(players in 2usize..9, active in 0u8..8) {
        let active = PlayerId::new(active % players as u8);
        let order = apnap_order(active, players);

        prop_assert_eq!(order.len(), players);
        prop_assert_eq!(order[0], active);
        let mut seats: Vec<u8> = order.iter().map(|p| p.0).collect();
        seats.sort_unstable();
        prop_assert_eq!(seats, (0..players as u8).collect::<Vec<_>>());
        for pair in order.windows(2) {
            prop_assert_eq!(pair[1], pair[0].next(players));
        }
    }

    /// Parsing brace notation counts every symbol once.
    #[test]
    fn mana_value_counts_symbols(generic in 0u32..12, colored in prop::array::uniform5(0u32..3)) {
        let mut text = if generic > 0 { format!("{{{generic}}}") } else { String::new() };
        for (symbol, count) in COLOR_SYMBOLS.iter().zip(colored) {
            for _ in 0..count {
                text.push('{');
                text.push(*symbol);
                text.push('}');
            }
        }
        let cost = ManaCost::parse(&text).unwrap();
        prop_assert_eq!(cost.mana_value(), generic + colored.iter().sum::<u32>());
    }

    /// Pumps commute: the order they were created in never matters.
    #[test]
    fn pumps_commute(pumps in prop::collection::vec((-3i32..4, -3i32..4), 0..6)) {
        let forward: Vec<Modification> = pumps.iter().map(|(p, t)| Modification::pump(*p, *t)).collect();
        let backward: Vec<Modification> = forward.iter().rev().cloned().collect();

        let expected = (
            2 + pumps.iter().map(|(p, _)| p).sum::<i32>(),
            2 + pumps.iter().map(|(_, t)| t).sum::<i32>(),
        );
        prop_assert_eq!(bears_with(&forward), expected);
        prop_assert_eq!(bears_with(&backward), expected);
    }

    /// The newest setting effect wins and every pump applies on top of it,
    /// however the two kinds are interleaved.
    #[test]
    fn setting_then_modifying(
        effects in prop::collection::vec((any::<bool>(), 0i32..5, 0i32..5), 1..8),
    ) {
        let modifications: Vec<Modification> = effects
            .iter()
            .map(|(set, p, t)| if *set { Modification::set_pt(*p, *t) } else { Modification::pump(*p, *t) })
            .collect();

        let base = effects
            .iter()
            .rev()
            .find(|(set, _, _)| *set)
            .map_or((2, 2), |(_, p, t)| (*p, *t));
        let pumped = effects.iter().filter(|(set, _, _)| !set).fold(base, |(p, t), (_, dp, dt)| (p + dp, t + dt));
        prop_assert_eq!(bears_with(&modifications), pumped);
    }

    /// Forked seeds depend only on the parent seed.
    #[test]
    fn forks_are_reproducible(seed in any::<u64>()) {
        let mut a = GameRng::new(seed);
        let mut b = GameRng::new(seed);
        for _ in 0..4 {
            prop_assert_eq!(a.fork().seed(), b.fork().seed());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// The last spell cast is the first to resolve.
    #[test]
    fn stack_resolves_last_in_first_out(spells in 1usize..5) {
        let cards = Arc::new(library::sample_registry().unwrap());
        let mut game = Game::new(RulesConfig::new(2), cards, 2).unwrap();
        let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
        for _ in 0..spells {
            game.put_onto_battlefield(MOUNTAIN, p0).unwrap();
        }
        let bolts: Vec<ObjectId> = (0..spells).map(|_| game.put_in_hand(LIGHTNING_BOLT, p0).unwrap()).collect();
        game.set_step(p0, Step::PrecombatMain);
        game.step(&mut Deciders::autopilot(2)).unwrap();
        for bolt in &bolts {
            game.apply_action(p0, &PlayerAction::cast(*bolt, &[Target::Player(p1)])).unwrap();
        }

        for resolved in 1..=spells {
            for _ in 0..2 {
                let holder = game.priority_holder().unwrap();
                game.apply_action(holder, &PlayerAction::PassPriority).unwrap();
            }
            let remaining: Vec<ObjectId> = game.stack().iter().map(|o| o.source).collect();
            prop_assert_eq!(remaining, bolts[..spells - resolved].to_vec());
            prop_assert_eq!(game.life(p1), 20 - 3 * resolved as i32);
        }
    }

    /// A game restored from a checkpoint plays on exactly like the original.
    #[test]
    fn checkpoints_restore_the_same_game(seed in any::<u64>(), warmup in 0usize..200) {
        let cards = Arc::new(library::sample_registry().unwrap());
        let mut game = Game::new(RulesConfig::new(2), Arc::clone(&cards), seed).unwrap();
        let deck = library::starter_deck();
        game.start(&[deck.clone(), deck]).unwrap();
        let mut deciders = Deciders::autopilot(2);
        for _ in 0..warmup {
            if game.state().is_over() {
                break;
            }
            game.step(&mut deciders).unwrap();
        }

        let bytes = game.checkpoint().unwrap();
        let mut restored = Game::restore(RulesConfig::new(2), cards, &bytes).unwrap();
        prop_assert_eq!(restored.checkpoint().unwrap(), bytes);

        let a = game.run_until_end(&mut Deciders::autopilot(2), 500).unwrap();
        let b = restored.run_until_end(&mut Deciders::autopilot(2), 500).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(game.checkpoint().unwrap(), restored.checkpoint().unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Autopilot games never hit a rules error, and a winner is still in
    /// the game.
    #[test]
    fn autopilot_games_stay_consistent(seed in any::<u64>(), players in 2usize..5) {
        let cards = Arc::new(library::sample_registry().unwrap());
        let mut game = Game::new(RulesConfig::new(players), cards, seed).unwrap();
        let deck = library::starter_deck();
        game.start(&vec![deck; players]).unwrap();

        let mut deciders = Deciders::autopilot(players);
        for seat in 0..players {
            deciders = deciders.with(PlayerId::new(seat as u8), AutoPilot::aggressive());
        }
        let result = game.run_until_end(&mut deciders, 3_000).unwrap();

        match result {
            Some(GameResult::Winner(p)) => {
                prop_assert!(!game.state().player(p).lost);
                prop_assert_eq!(game.state().live_players(), vec![p]);
            }
            Some(GameResult::Draw) => prop_assert!(game.state().live_players().is_empty()),
            None => prop_assert!(game.state().live_players().len() >= 2),
        }
    }
}
