//! Running many independent games across worker threads.
//!
//! Each game owns its state and its decision makers exclusively; only the
//! card registry is shared, through an `Arc`. Games never talk to each other,
//! so a worker simply takes the next unplayed match until none are left.
//!
//! ```
//! use std::sync::Arc;
//! use ccg_rules::cards::library;
//! use ccg_rules::core::RulesConfig;
//! use ccg_rules::host::{GameHost, MatchSpec};
//!
//! let cards = Arc::new(library::sample_registry().unwrap());
//! let host = GameHost::new(RulesConfig::new(2), cards).with_threads(2).with_max_steps(500);
//! let deck = library::starter_deck();
//! let specs = MatchSpec::series(7, 4, &[deck.clone(), deck]);
//!
//! let reports = host.run(&specs).unwrap();
//! assert_eq!(reports.len(), 4);
//! assert!(reports.iter().all(|r| r.error.is_none()));
//! ```

use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CardRegistry};
use crate::core::config::RulesConfig;
use crate::core::error::{Result, RulesError};
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;
use crate::decision::{AutoPilot, Deciders, DecisionMaker, Style};
use crate::game::Game;
use crate::rules::GameResult;

/// One game to play: its seed and a deck per seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpec {
    pub seed: u64,
    pub decks: Vec<Vec<CardId>>,
}

impl MatchSpec {
    #[must_use]
    pub fn new(seed: u64, decks: Vec<Vec<CardId>>) -> Self {
        Self { seed, decks }
    }

    /// `count` matches with the same decks and seeds forked from `base_seed`.
    #[must_use]
    pub fn series(base_seed: u64, count: usize, decks: &[Vec<CardId>]) -> Vec<Self> {
        let mut rng = GameRng::new(base_seed);
        (0..count).map(|_| Self::new(rng.fork().seed(), decks.to_vec())).collect()
    }
}

/// How a match went.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Position of the match in the list passed to [`GameHost::run`].
    pub index: usize,
    pub seed: u64,
    /// `None` when the step limit was reached first, or on error.
    pub result: Option<GameResult>,
    pub turns: u32,
    pub steps: usize,
    /// Actions other than passes.
    pub actions: usize,
    pub final_life: Vec<i32>,
    /// The error that stopped the match, if any.
    pub error: Option<String>,
}

impl MatchReport {
    fn failed(index: usize, seed: u64, error: impl std::fmt::Display) -> Self {
        Self {
            index,
            seed,
            result: None,
            turns: 0,
            steps: 0,
            actions: 0,
            final_life: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        match self.result {
            Some(GameResult::Winner(p)) => Some(p),
            _ => None,
        }
    }
}

/// Plays matches in parallel.
pub struct GameHost {
    config: RulesConfig,
    cards: Arc<CardRegistry>,
    threads: usize,
    max_steps: usize,
    styles: Vec<Style>,
}

impl GameHost {
    /// A host with one thread per available core, 10 000 steps per match
    /// and aggressive autopilots in every seat.
    #[must_use]
    pub fn new(config: RulesConfig, cards: Arc<CardRegistry>) -> Self {
        let threads = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let styles = vec![Style::Aggressive; config.player_count];
        Self {
            config,
            cards,
            threads,
            max_steps: 10_000,
            styles,
        }
    }

    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// The autopilot style of each seat.
    #[must_use]
    pub fn with_styles(mut self, styles: Vec<Style>) -> Self {
        self.styles = styles;
        self
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Play every match with autopilots. Reports come back in `specs`
    /// order.
    pub fn run(&self, specs: &[MatchSpec]) -> Result<Vec<MatchReport>> {
        let styles = self.styles.clone();
        self.run_with(specs, move |_| {
            Deciders::new(
                styles
                    .iter()
                    .map(|style| {
                        let pilot = match style {
                            Style::Passive => AutoPilot::passive(),
                            Style::Aggressive => AutoPilot::aggressive(),
                        };
                        Box::new(pilot) as Box<dyn DecisionMaker>
                    })
                    .collect(),
            )
        })
    }

    /// Play every match, building each match's decision makers on the
    /// worker thread that plays it.
    pub fn run_with<F>(&self, specs: &[MatchSpec], deciders: F) -> Result<Vec<MatchReport>>
    where
        F: Fn(&MatchSpec) -> Deciders + Sync,
    {
        self.config.validate()?;
        if self.styles.len() != self.config.player_count {
            return Err(RulesError::Config(format!(
                "{} autopilot styles for {} players",
                self.styles.len(),
                self.config.player_count
            )));
        }

        let workers = self.threads.min(specs.len()).max(1);
        log::info!("host: {} matches on {} threads", specs.len(), workers);

        let next = AtomicUsize::new(0);
        let mut reports: Vec<MatchReport> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        let mut done = Vec::new();
                        loop {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            let Some(spec) = specs.get(index) else {
                                break;
                            };
                            let played = panic::catch_unwind(AssertUnwindSafe(|| {
                                let mut makers = deciders(spec);
                                self.play(index, spec, &mut makers)
                            }));
                            done.push(played.unwrap_or_else(|_| {
                                log::warn!("host: match {} (seed {}) panicked", index, spec.seed);
                                MatchReport::failed(index, spec.seed, "match panicked")
                            }));
                        }
                        done
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(done) => done,
                    Err(_) => {
                        log::warn!("host: a worker thread panicked");
                        Vec::new()
                    }
                })
                .collect()
        });

        let lost: Vec<usize> = (0..specs.len())
            .filter(|i| !reports.iter().any(|r| r.index == *i))
            .collect();
        for index in lost {
            reports.push(MatchReport::failed(index, specs[index].seed, "worker thread panicked"));
        }
        reports.sort_by_key(|r| r.index);
        let finished = reports.iter().filter(|r| r.result.is_some()).count();
        log::info!("host: {} of {} matches finished", finished, specs.len());
        Ok(reports)
    }

    /// Play one match on the current thread.
    pub fn play(&self, index: usize, spec: &MatchSpec, deciders: &mut Deciders) -> MatchReport {
        if deciders.player_count() != self.config.player_count {
            let e = RulesError::Config(format!(
                "{} decision makers for {} players",
                deciders.player_count(),
                self.config.player_count
            ));
            return MatchReport::failed(index, spec.seed, &e);
        }
        let mut game = match Game::new(self.config.clone(), Arc::clone(&self.cards), spec.seed) {
            Ok(game) => game,
            Err(e) => return MatchReport::failed(index, spec.seed, &e),
        };
        if let Err(e) = game.start(&spec.decks) {
            return MatchReport::failed(index, spec.seed, &e);
        }

        let mut steps = 0;
        let mut error = None;
        while steps < self.max_steps {
            steps += 1;
            match game.step(deciders) {
                Ok(crate::game::StepOutcome::GameOver(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    log::warn!("match {} (seed {}): {}", index, spec.seed, e);
                    error = Some(e.to_string());
                    break;
                }
            }
        }

        let state = game.state();
        MatchReport {
            index,
            seed: spec.seed,
            result: state.result.clone(),
            turns: state.turn.number,
            steps,
            actions: state.history.iter().filter(|r| !r.action.is_pass()).count(),
            final_life: state.players.iter().map(|(_, p)| p.life).collect(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::library;

    fn host(threads: usize) -> GameHost {
        let cards = Arc::new(library::sample_registry().unwrap());
        GameHost::new(RulesConfig::new(2), cards)
            .with_threads(threads)
            .with_max_steps(3_000)
    }

    fn specs(count: usize) -> Vec<MatchSpec> {
        let deck = library::starter_deck();
        MatchSpec::series(42, count, &[deck.clone(), deck])
    }

    #[test]
    fn test_series_seeds_are_distinct_and_stable() {
        let a = specs(5);
        let b = specs(5);
        assert_eq!(a, b);
        let mut seeds: Vec<u64> = a.iter().map(|s| s.seed).collect();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 5);
    }

    #[test]
    fn test_reports_in_spec_order() {
        let specs = specs(6);
        let reports = host(3).run(&specs).unwrap();
        assert_eq!(reports.len(), 6);
        for (i, (report, spec)) in reports.iter().zip(&specs).enumerate() {
            assert_eq!(report.index, i);
            assert_eq!(report.seed, spec.seed);
            assert!(report.error.is_none());
        }
    }

    #[test]
    fn test_thread_count_does_not_change_results() {
        let specs = specs(4);
        let single = host(1).run(&specs).unwrap();
        let many = host(4).run(&specs).unwrap();
        assert_eq!(single, many);
    }

    #[test]
    fn test_bad_deck_is_reported_not_fatal() {
        let deck = library::starter_deck();
        let specs = vec![
            MatchSpec::new(1, vec![deck.clone()]),
            MatchSpec::new(2, vec![deck.clone(), deck]),
        ];
        let reports = host(2).run(&specs).unwrap();
        assert!(reports[0].error.is_some());
        assert!(reports[1].error.is_none());
    }

    #[test]
    fn test_style_count_must_match_players() {
        let err = host(1).with_styles(vec![Style::Passive]).run(&specs(1)).unwrap_err();
        assert!(matches!(err, RulesError::Config(_)));
    }

    #[test]
    fn test_wrong_decider_count_fails_every_match() {
        let reports = host(2).run_with(&specs(3), |_| Deciders::autopilot(1)).unwrap();
        assert_eq!(reports.len(), 3);
        for report in &reports {
            assert!(report.result.is_none());
            assert!(report.error.as_deref().is_some_and(|e| e.contains("decision makers")));
        }
    }

    #[test]
    fn test_panicking_match_is_reported() {
        let specs = specs(3);
        let bad_seed = specs[1].seed;
        let reports = host(2)
            .run_with(&specs, |spec| {
                assert_ne!(spec.seed, bad_seed, "deciders for this match can't be built");
                Deciders::autopilot(2)
            })
            .unwrap();
        assert_eq!(reports.len(), 3);
        assert!(reports[0].error.is_none());
        assert_eq!(reports[1].error.as_deref(), Some("match panicked"));
        assert!(reports[2].error.is_none());
    }
}
