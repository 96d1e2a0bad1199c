//! Trainer: one policy playing one private game copy, one step at a time.
//!
//! A step is encode -> predict -> decode -> attempt. Invalid attempts
//! are expected, recorded, and charged against the move budget; the
//! episode only ends on a terminal predicate or an integrity failure.
//! The worker loop in the manager calls `step` with the trainer's mutex
//! held and releases between steps, so every field here is updated
//! atomically with respect to snapshot readers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{Card, SessionRng, TrainConfig};
use crate::error::GameError;
use crate::game::Game;
use crate::playfield::PileId;
use crate::policy::{decode_action, Experience, Policy, StateEncoder};

/// Why an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeEnd {
    Won,
    Stuck,
    MaxMoves,
    MinScore,
    /// Integrity failure; the episode was abandoned, not finished.
    Aborted,
}

/// Trainer lifecycle. `Running` is only entered when the manager
/// assigns a fresh game copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainerStatus {
    Idle,
    Running,
    Terminated(EpisodeEnd),
    /// The worker failed; excluded from ranking for the generation.
    Dead,
}

/// The most recent prediction, kept for the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub subject: Card,
    pub from: PileId,
    pub to: PileId,
    /// Score after the attempt.
    pub next_score: i64,
    /// Policy's estimate of the final episode score.
    pub predicted_final: f64,
    /// Attempts so far this episode, invalid included.
    pub total_moves: u32,
    /// Whether the attempt was accepted.
    pub valid: bool,
    /// |predicted final - score after the attempt|.
    pub deviation: f64,
}

/// Episode outcome used to rank policies at the generation boundary.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeFitness {
    pub score: i64,
    pub moves: u32,
    pub reason: EpisodeEnd,
    /// Opaque loss scalar from the policy.
    pub loss: f64,
}

/// What a single `step` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// A move was applied.
    Advanced,
    /// Every tried candidate was rejected; budget charged, episode continues.
    NoCandidate,
    /// The episode just ended.
    Terminated(EpisodeEnd),
    /// Nothing to do (not running).
    Parked,
}

/// One worker's trainer.
pub struct Trainer {
    worker_id: usize,
    game: Game,
    policy: Arc<dyn Policy>,
    encoder: Arc<dyn StateEncoder>,
    rng: SessionRng,
    status: TrainerStatus,
    generation: u64,
    /// Attempts this episode, invalid included.
    moves: u32,
    invalid_moves: u32,
    loss: f64,
    last_prediction: Option<PredictionRecord>,
    /// Set by `mark_dead`; drained once by the manager for reporting.
    failure: Option<String>,
    max_moves: u32,
    min_score: i64,
    fallback_candidates: usize,
    sample_actions: bool,
}

impl Trainer {
    /// Create a trainer in the `Idle` state.
    #[must_use]
    pub fn new(
        worker_id: usize,
        policy: Arc<dyn Policy>,
        encoder: Arc<dyn StateEncoder>,
        rng: SessionRng,
        config: &TrainConfig,
    ) -> Self {
        let loss = policy.loss_estimate();
        Self {
            worker_id,
            game: Game::new(config.game),
            policy,
            encoder,
            rng,
            status: TrainerStatus::Idle,
            generation: 0,
            moves: 0,
            invalid_moves: 0,
            loss,
            last_prediction: None,
            failure: None,
            max_moves: config.max_moves,
            min_score: config.min_score,
            fallback_candidates: config.fallback_candidates.max(1),
            sample_actions: config.sample_actions,
        }
    }

    /// Start a new episode on a private deep copy of the dealt game.
    ///
    /// Only the manager calls this, with the trainer's mutex held and
    /// no worker running.
    pub fn begin_episode(&mut self, game: Game, generation: u64) {
        self.game = game;
        self.generation = generation;
        self.moves = 0;
        self.invalid_moves = 0;
        self.last_prediction = None;
        self.status = TrainerStatus::Running;
    }

    /// Install the next generation's policy. Status is left alone; the
    /// trainer re-enters `Running` only via `begin_episode`.
    pub fn install_policy(&mut self, policy: Arc<dyn Policy>, generation: u64) {
        self.loss = policy.loss_estimate();
        self.policy = policy;
        self.generation = generation;
    }

    /// Mark this trainer dead after a worker failure.
    pub fn mark_dead(&mut self, detail: impl Into<String>) {
        self.status = TrainerStatus::Dead;
        self.failure = Some(detail.into());
    }

    /// Drain the failure detail, if any. The manager calls this once
    /// per failure to build the session's worker-failure records.
    pub fn take_failure(&mut self) -> Option<String> {
        self.failure.take()
    }

    /// Perform one training step.
    ///
    /// An integrity failure aborts the episode and comes back as an
    /// error; the trainer itself stays usable for the next generation.
    pub fn step(&mut self) -> Result<StepOutcome, GameError> {
        if self.status != TrainerStatus::Running {
            return Ok(StepOutcome::Parked);
        }

        if let Some(reason) = self.terminal_reason() {
            self.finish_episode(reason);
            return Ok(StepOutcome::Terminated(reason));
        }

        let encoded = self.encoder.encode(&self.game);
        let output = self.policy.predict(&encoded);
        let candidates = self.rank_candidates(&output.action_scores);
        let predicted_final = f64::from(output.value) * 100.0;

        let mut advanced = false;
        let mut attempted = false;
        for index in candidates {
            let Some(mv) = decode_action(&self.game, index) else {
                continue;
            };

            attempted = true;
            self.moves += 1;
            let valid = self.game.play(mv.card, mv.to).is_ok();
            if !valid {
                self.invalid_moves += 1;
            }
            self.record_prediction(mv.card, mv.from, mv.to, predicted_final, valid);

            if valid {
                advanced = true;
                break;
            }
            if self.moves >= self.max_moves {
                break;
            }
        }

        // A step where nothing could even be attempted is a no-op that
        // still burns budget, so a policy stuck on undecodable indices
        // cannot stall the episode forever.
        if !attempted {
            self.moves += 1;
        }

        if advanced {
            if let Err(err) = self.game.verify_integrity() {
                self.finish_episode(EpisodeEnd::Aborted);
                return Err(err);
            }
        }

        if let Some(reason) = self.terminal_reason() {
            self.finish_episode(reason);
            return Ok(StepOutcome::Terminated(reason));
        }

        Ok(if advanced {
            StepOutcome::Advanced
        } else {
            StepOutcome::NoCandidate
        })
    }

    /// Candidate action indices, best first, truncated to the fallback
    /// budget. With sampling enabled the first pick is drawn from the
    /// score distribution instead of taken greedily.
    fn rank_candidates(&mut self, scores: &[f32]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|a, b| {
            scores[*b]
                .partial_cmp(&scores[*a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order.truncate(self.fallback_candidates);

        if self.sample_actions {
            if let Some(sampled) = self.rng.choose_weighted(scores) {
                if let Some(pos) = order.iter().position(|i| *i == sampled) {
                    order.swap(0, pos);
                } else {
                    order.insert(0, sampled);
                    order.truncate(self.fallback_candidates);
                }
            }
        }

        order
    }

    fn record_prediction(
        &mut self,
        subject: Card,
        from: PileId,
        to: PileId,
        predicted_final: f64,
        valid: bool,
    ) {
        let next_score = self.game.score();
        self.last_prediction = Some(PredictionRecord {
            subject,
            from,
            to,
            next_score,
            predicted_final,
            total_moves: self.moves,
            valid,
            deviation: (predicted_final - next_score as f64).abs(),
        });
    }

    fn terminal_reason(&self) -> Option<EpisodeEnd> {
        if self.game.is_won() {
            Some(EpisodeEnd::Won)
        } else if self.game.is_stuck() {
            Some(EpisodeEnd::Stuck)
        } else if self.moves >= self.max_moves {
            Some(EpisodeEnd::MaxMoves)
        } else if self.game.is_min_score_reached(self.min_score) {
            Some(EpisodeEnd::MinScore)
        } else {
            None
        }
    }

    fn finish_episode(&mut self, reason: EpisodeEnd) {
        self.status = TrainerStatus::Terminated(reason);

        let experience = Experience {
            score: self.game.score(),
            moves: self.moves - self.invalid_moves,
            invalid_moves: self.invalid_moves,
            won: reason == EpisodeEnd::Won,
        };
        if let Some(refreshed) = self.policy.update(&experience) {
            self.policy = refreshed;
        }
        self.loss = self.policy.loss_estimate();
    }

    /// Episode fitness, available once terminated. `Aborted` and dead
    /// trainers report `None` and are excluded from ranking.
    #[must_use]
    pub fn fitness(&self) -> Option<EpisodeFitness> {
        match self.status {
            TrainerStatus::Terminated(reason) if reason != EpisodeEnd::Aborted => {
                Some(EpisodeFitness {
                    score: self.game.score(),
                    moves: self.moves,
                    reason,
                    loss: self.loss,
                })
            }
            _ => None,
        }
    }

    // === Snapshot accessors (read with the mutex held) ===

    #[must_use]
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    #[must_use]
    pub fn status(&self) -> TrainerStatus {
        self.status
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn score(&self) -> i64 {
        self.game.score()
    }

    #[must_use]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    #[must_use]
    pub fn invalid_moves(&self) -> u32 {
        self.invalid_moves
    }

    #[must_use]
    pub fn loss(&self) -> f64 {
        self.loss
    }

    #[must_use]
    pub fn last_prediction(&self) -> Option<PredictionRecord> {
        self.last_prediction
    }

    #[must_use]
    pub fn policy(&self) -> &Arc<dyn Policy> {
        &self.policy
    }

    #[must_use]
    pub fn lineage(&self) -> String {
        self.policy.lineage()
    }

    #[must_use]
    pub fn policy_kind(&self) -> &'static str {
        self.policy.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameConfig, Rank, Suit};
    use crate::policy::{SolitaireEncoder, UniformPolicy, ACTION_SPACE};

    fn trainer_with_budget(max_moves: u32) -> Trainer {
        let config = TrainConfig::default().with_max_moves(max_moves);
        Trainer::new(
            0,
            Arc::new(UniformPolicy::new(ACTION_SPACE)),
            Arc::new(SolitaireEncoder::new()),
            SessionRng::new(77),
            &config,
        )
    }

    fn dealt_game() -> Game {
        let mut game = Game::new(GameConfig::default());
        game.deal(&mut SessionRng::new(12));
        game
    }

    #[test]
    fn test_idle_trainer_parks() {
        let mut trainer = trainer_with_budget(10);
        assert_eq!(trainer.step().unwrap(), StepOutcome::Parked);
        assert_eq!(trainer.status(), TrainerStatus::Idle);
    }

    #[test]
    fn test_episode_terminates_within_budget() {
        let mut trainer = trainer_with_budget(30);
        trainer.begin_episode(dealt_game(), 1);
        assert_eq!(trainer.status(), TrainerStatus::Running);

        let mut steps = 0;
        loop {
            match trainer.step().unwrap() {
                StepOutcome::Terminated(_) => break,
                _ => steps += 1,
            }
            assert!(steps < 10_000, "episode failed to terminate");
        }
        assert!(matches!(trainer.status(), TrainerStatus::Terminated(_)));
        assert!(trainer.fitness().is_some());
        assert!(trainer.moves() <= 30 + trainer.fallback_candidates as u32);
    }

    #[test]
    fn test_invalid_attempts_are_recorded() {
        let mut trainer = trainer_with_budget(100);
        trainer.begin_episode(dealt_game(), 1);

        while !matches!(trainer.step().unwrap(), StepOutcome::Terminated(_)) {}
        // Uniform policy over 169 mostly-illegal actions is guaranteed
        // to hit rejections.
        assert!(trainer.invalid_moves() > 0);
        if let Some(record) = trainer.last_prediction() {
            assert!(record.total_moves <= trainer.moves());
        }
    }

    #[test]
    fn test_integrity_failure_aborts_episode() {
        let mut trainer = trainer_with_budget(50);

        // Duplicate 5 of hearts: the first successful move trips the
        // conservation check and the episode aborts.
        let five = Card::new(Suit::Hearts, Rank::new(5));
        let mut game = Game::empty(GameConfig::default());
        game.place_unchecked(PileId::tableau(0), five, true);
        game.place_unchecked(PileId::tableau(2), five, true);
        trainer.begin_episode(game, 1);

        let mut result = trainer.step();
        for _ in 0..200 {
            if result.is_err() || matches!(result, Ok(StepOutcome::Terminated(_))) {
                break;
            }
            result = trainer.step();
        }

        assert!(matches!(result, Err(GameError::DuplicateCard { .. })));
        assert_eq!(trainer.status(), TrainerStatus::Terminated(EpisodeEnd::Aborted));
        assert!(trainer.fitness().is_none());

        // An abort is contained to the episode; the trainer is still
        // usable for the next generation.
        trainer.begin_episode(dealt_game(), 2);
        assert_eq!(trainer.status(), TrainerStatus::Running);
    }

    #[test]
    fn test_mark_dead_records_detail() {
        let mut trainer = trainer_with_budget(10);
        trainer.mark_dead("policy step panicked");

        assert_eq!(trainer.status(), TrainerStatus::Dead);
        assert!(trainer.fitness().is_none());
        assert_eq!(trainer.take_failure().as_deref(), Some("policy step panicked"));
        assert_eq!(trainer.take_failure(), None);
    }

    #[test]
    fn test_begin_episode_resets_counters() {
        let mut trainer = trainer_with_budget(5);
        trainer.begin_episode(dealt_game(), 1);
        while !matches!(trainer.step().unwrap(), StepOutcome::Terminated(_)) {}
        assert!(trainer.moves() > 0);

        trainer.begin_episode(dealt_game(), 2);
        assert_eq!(trainer.moves(), 0);
        assert_eq!(trainer.generation(), 2);
        assert_eq!(trainer.status(), TrainerStatus::Running);
    }
}
