use core::time::Duration;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::*;

/// Valid transitions:
/// - NotStarted -> InProgress
/// - InProgress -> Complete
/// - any -> InProgress (new deal)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

impl EngineState {
    pub const fn is_running(self) -> bool {
        matches!(self, Self::InProgress)
    }
}

/// Everything the presentation layer renders for the current session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub cards: Deck,
    /// Face-up cards awaiting a match decision, at most two.
    pub flipped_cards: Vec<CardId>,
    pub matched_pairs: usize,
    pub attempts: u32,
    pub time_elapsed: u32,
    pub is_game_complete: bool,
    pub is_game_started: bool,
    pub current_level: DifficultyLevel,
}

impl GameState {
    fn not_started(level: DifficultyLevel) -> Self {
        Self {
            cards: Deck::default(),
            flipped_cards: Vec::new(),
            matched_pairs: 0,
            attempts: 0,
            time_elapsed: 0,
            is_game_complete: false,
            is_game_started: false,
            current_level: level,
        }
    }

    fn dealt(cards: Deck, level: DifficultyLevel) -> Self {
        Self {
            cards,
            is_game_started: true,
            ..Self::not_started(level)
        }
    }
}

/// Result of a finished game, taken before the best-score map is updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub level_id: String,
    pub attempts: u32,
    pub time_elapsed: u32,
    pub is_new_best: bool,
    pub previous_best: Option<BestScore>,
}

/// Seed derived from the wall clock.
pub fn entropy_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

/// Single-writer game session: deals, sequences flips and keeps best scores.
///
/// Delayed effects (the "no match" cue, flipping a mismatched pair back, the celebration cue) are queued on an
/// internal [`Scheduler`] and only run when the host calls [`GameEngine::tick`] or [`GameEngine::run_pending`].
/// Every queued task is tagged with the deal it belongs to, so a new deal silently discards older work.
#[derive(Debug)]
pub struct GameEngine<S: ScoreStore, F: FeedbackSink> {
    state: GameState,
    best_scores: BestScores,
    last_summary: Option<GameSummary>,
    generation: u64,
    scheduler: Scheduler,
    config: EngineConfig,
    rng: SmallRng,
    store: S,
    feedback: F,
}

impl<S: ScoreStore, F: FeedbackSink> GameEngine<S, F> {
    pub fn new(store: S, feedback: F) -> Self {
        Self::with_config(EngineConfig::default(), store, feedback, entropy_seed())
    }

    pub fn with_config(config: EngineConfig, store: S, feedback: F, seed: u64) -> Self {
        Self {
            state: GameState::not_started(DifficultyLevel::default()),
            best_scores: BestScores::new(),
            last_summary: None,
            generation: 0,
            scheduler: Scheduler::new(),
            config,
            rng: SmallRng::seed_from_u64(seed),
            store,
            feedback,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn engine_state(&self) -> EngineState {
        if !self.state.is_game_started {
            EngineState::NotStarted
        } else if self.state.is_game_complete {
            EngineState::Complete
        } else {
            EngineState::InProgress
        }
    }

    /// Whether the game clock should be running.
    pub fn is_running(&self) -> bool {
        self.engine_state().is_running()
    }

    pub fn cards(&self) -> &[Card] {
        self.state.cards.cards()
    }

    pub fn current_level(&self) -> &DifficultyLevel {
        &self.state.current_level
    }

    pub fn progress(&self) -> u8 {
        progress_percent(self.state.matched_pairs, self.state.current_level.pairs())
    }

    pub fn grid_dimensions(&self) -> GridDimensions {
        self.state.current_level.grid_dimensions()
    }

    pub fn best_scores(&self) -> &BestScores {
        &self.best_scores
    }

    pub fn best_score(&self, level_id: &str) -> Option<&BestScore> {
        self.best_scores.get(level_id)
    }

    pub fn last_summary(&self) -> Option<&GameSummary> {
        self.last_summary.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pending_tasks(&self) -> &[ScheduledTask] {
        self.scheduler.pending()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    /// Deals a fresh deck for `level` and starts a new session.
    pub fn initialize_game(&mut self, level: DifficultyLevel) {
        self.generation += 1;
        let cards = generate_deck(&level, &mut self.rng);
        log::debug!(
            "New game on {:?} with {} cards (gen {})",
            level.id(),
            cards.len(),
            self.generation
        );
        self.state = GameState::dealt(cards, level);
        self.last_summary = None;
    }

    /// Redeals the current level, dropping in-progress state.
    pub fn reset_game(&mut self) {
        let level = self.state.current_level.clone();
        self.initialize_game(level);
    }

    /// Selects a level without dealing.
    pub fn set_current_level(&mut self, level: DifficultyLevel) {
        self.state.current_level = level;
    }

    pub fn update_time(&mut self, seconds: u32) {
        self.state.time_elapsed = seconds;
    }

    /// Replaces the in-memory best scores with the stored ones, an unreadable store counts as empty.
    pub fn load_best_scores(&mut self) {
        self.best_scores = match self.store.load_scores() {
            Ok(scores) => scores,
            Err(err) => {
                log::warn!("Could not load best scores: {}", err);
                BestScores::new()
            }
        };
    }

    /// Routes a UI button cue through the same guarded path as game cues.
    pub fn button_press(&mut self) {
        self.notify(FeedbackEvent::ButtonPress);
    }

    /// Turns a card face up, resolving the pair when it is the second one.
    ///
    /// Flips are ignored when the game is complete, the card is unknown, already face up or matched, or two cards
    /// are still waiting to be flipped back.
    pub fn flip_card(&mut self, card_id: &str) -> FlipOutcome {
        if self.state.is_game_complete || self.state.flipped_cards.len() >= 2 {
            return FlipOutcome::NoChange;
        }
        let Some(card) = self.state.cards.get_mut(card_id) else {
            log::trace!("flip on unknown card {:?}", card_id);
            return FlipOutcome::NoChange;
        };
        if !card.is_flippable() {
            return FlipOutcome::NoChange;
        }

        card.flip_up();
        let id = card.id.clone();
        log::debug!("flip card {}", id);
        self.state.flipped_cards.push(id);
        self.notify(FeedbackEvent::CardFlip);

        if self.state.flipped_cards.len() == 2 {
            self.resolve_pair()
        } else {
            FlipOutcome::Flipped
        }
    }

    /// Flips the card at a board position, in dealing order.
    pub fn flip_card_at(&mut self, index: usize) -> FlipOutcome {
        let Some(id) = self.state.cards.cards().get(index).map(|card| card.id.clone()) else {
            return FlipOutcome::NoChange;
        };
        self.flip_card(id.as_str())
    }

    /// Advances the engine clock, running delayed effects that became due.
    pub fn tick(&mut self, delta: Duration) {
        for task in self.scheduler.advance(delta) {
            self.run_task(task);
        }
    }

    /// Runs every queued effect right away.
    pub fn run_pending(&mut self) {
        for task in self.scheduler.advance_all() {
            self.run_task(task);
        }
    }

    fn resolve_pair(&mut self) -> FlipOutcome {
        self.state.attempts += 1;

        let (first, second) = match self.state.flipped_cards.as_slice() {
            [first, second] => (first.clone(), second.clone()),
            _ => return FlipOutcome::NoChange,
        };
        let (Some(a), Some(b)) = (
            self.state.cards.get(first.as_str()),
            self.state.cards.get(second.as_str()),
        ) else {
            return FlipOutcome::NoChange;
        };

        if pairs_match(a, b) {
            let value = a.value.clone();
            for card in self.state.cards.iter_mut().filter(|card| card.value == value) {
                card.mark_matched();
            }
            self.state.matched_pairs += 1;
            self.state.flipped_cards.clear();
            log::info!(
                "match {:?}, {}/{} pairs",
                value,
                self.state.matched_pairs,
                self.state.current_level.pairs()
            );
            self.notify(FeedbackEvent::CardMatch);

            if self.state.matched_pairs == self.state.current_level.pairs() {
                self.state.is_game_complete = true;
                self.scheduler.schedule(
                    self.config.completion_feedback_delay(),
                    self.generation,
                    PendingAction::CompletionFeedback,
                );
                self.record_completion();
                FlipOutcome::Completed
            } else {
                FlipOutcome::Matched
            }
        } else {
            log::debug!("no match between {} and {}", first, second);
            self.scheduler.schedule(
                self.config.no_match_feedback_delay(),
                self.generation,
                PendingAction::NoMatchFeedback,
            );
            self.scheduler.schedule(
                self.config.flip_back_delay(),
                self.generation,
                PendingAction::FlipBack { first, second },
            );
            FlipOutcome::Mismatched
        }
    }

    fn record_completion(&mut self) {
        let level_id = self.state.current_level.id().to_owned();
        let attempts = self.state.attempts;
        let time_elapsed = self.state.time_elapsed;
        let previous_best = self.best_scores.get(&level_id).cloned();
        let is_new_best = is_new_best_score(attempts, &level_id, &self.best_scores);

        log::info!(
            "Game complete on {:?}: {} attempts in {}s",
            level_id,
            attempts,
            time_elapsed
        );

        if is_new_best {
            log::info!("New best score on {:?}: {} attempts", level_id, attempts);
            self.best_scores.insert(
                level_id.clone(),
                BestScore::new(attempts, time_elapsed, chrono::Utc::now()),
            );
            if let Err(err) = self.store.save_scores(&self.best_scores) {
                log::warn!("Could not save best scores: {}", err);
            }
        }

        self.last_summary = Some(GameSummary {
            level_id,
            attempts,
            time_elapsed,
            is_new_best,
            previous_best,
        });
    }

    fn run_task(&mut self, task: ScheduledTask) {
        if task.generation != self.generation {
            log::debug!(
                "Dropping stale {:?} from gen {} (now gen {})",
                task.action,
                task.generation,
                self.generation
            );
            return;
        }

        match task.action {
            PendingAction::NoMatchFeedback => self.notify(FeedbackEvent::CardNoMatch),
            PendingAction::CompletionFeedback => self.notify(FeedbackEvent::GameComplete),
            PendingAction::FlipBack { first, second } => {
                for id in [&first, &second] {
                    if let Some(card) = self.state.cards.get_mut(id.as_str()) {
                        card.flip_down();
                    }
                }
                self.state
                    .flipped_cards
                    .retain(|id| *id != first && *id != second);
                log::trace!("flipped back {} and {}", first, second);
            }
        }
    }

    fn notify(&mut self, event: FeedbackEvent) {
        let sent = match event {
            FeedbackEvent::CardFlip => self.feedback.card_flip(),
            FeedbackEvent::CardMatch => self.feedback.card_match(),
            FeedbackEvent::CardNoMatch => self.feedback.card_no_match(),
            FeedbackEvent::GameComplete => self.feedback.game_complete(),
            FeedbackEvent::ButtonPress => self.feedback.button_press(),
        };
        if let Err(err) = sent {
            log::warn!("Feedback {:?} failed: {}", event, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Debug, Default)]
    struct Recorder(Rc<RefCell<Vec<FeedbackEvent>>>);

    impl Recorder {
        fn events(&self) -> Vec<FeedbackEvent> {
            self.0.borrow().clone()
        }
    }

    impl FeedbackSink for Recorder {
        fn emit(&mut self, event: FeedbackEvent) -> core::result::Result<(), FeedbackError> {
            self.0.borrow_mut().push(event);
            Ok(())
        }
    }

    struct Broken;

    impl FeedbackSink for Broken {
        fn emit(&mut self, _event: FeedbackEvent) -> core::result::Result<(), FeedbackError> {
            Err(FeedbackError::Unavailable("no vibrator".into()))
        }
    }

    struct FailingStore;

    impl ScoreStore for FailingStore {
        fn load_scores(&self) -> core::result::Result<BestScores, StoreError> {
            Err(StoreError::Unavailable("locked".into()))
        }

        fn save_scores(&mut self, _scores: &BestScores) -> core::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }
    }

    fn two_pairs() -> DifficultyLevel {
        DifficultyLevel::new("tiny", "Tiny", 4, 2, vec!["A".into(), "B".into()]).unwrap()
    }

    fn ids_of<S: ScoreStore, F: FeedbackSink>(engine: &GameEngine<S, F>, value: &str) -> (String, String) {
        let ids: Vec<String> = engine
            .cards()
            .iter()
            .filter(|card| card.value == value)
            .map(|card| card.id.to_string())
            .collect();
        (ids[0].clone(), ids[1].clone())
    }

    fn engine() -> GameEngine<MemoryScoreStore, Recorder> {
        GameEngine::with_config(EngineConfig::default(), MemoryScoreStore::new(), Recorder::default(), 11)
    }

    #[test]
    fn starts_not_started() {
        let engine = engine();
        assert_eq!(EngineState::default(), EngineState::NotStarted);
        assert_eq!(engine.engine_state(), EngineState::NotStarted);
        assert!(engine.cards().is_empty());
        assert_eq!(engine.current_level().id(), "easy");
        assert!(!engine.is_running());
    }

    #[test]
    fn initialize_resets_counters() {
        let mut engine = engine();
        engine.initialize_game(DifficultyLevel::medium());
        engine.update_time(30);
        engine.flip_card_at(0);

        engine.initialize_game(DifficultyLevel::hard());

        let state = engine.state();
        assert_eq!(state.cards.len(), 30);
        assert!(state.flipped_cards.is_empty());
        assert_eq!(state.matched_pairs, 0);
        assert_eq!(state.attempts, 0);
        assert_eq!(state.time_elapsed, 0);
        assert!(state.is_game_started);
        assert!(!state.is_game_complete);
        assert_eq!(engine.engine_state(), EngineState::InProgress);
        assert_eq!(engine.grid_dimensions(), GridDimensions::new(5, 6));
    }

    #[test]
    fn set_current_level_does_not_deal() {
        let mut engine = engine();
        engine.set_current_level(DifficultyLevel::hard());
        assert_eq!(engine.engine_state(), EngineState::NotStarted);
        assert!(engine.cards().is_empty());

        engine.reset_game();
        assert_eq!(engine.cards().len(), 30);
    }

    #[test]
    fn flip_guards_are_no_ops() {
        let mut engine = engine();
        engine.initialize_game(two_pairs());
        let (a1, _) = ids_of(&engine, "A");

        assert_eq!(engine.flip_card("missing"), FlipOutcome::NoChange);
        assert_eq!(engine.flip_card(&a1), FlipOutcome::Flipped);
        assert_eq!(engine.flip_card(&a1), FlipOutcome::NoChange);
        assert_eq!(engine.state().flipped_cards.len(), 1);
        assert_eq!(engine.state().attempts, 0);
        assert_eq!(engine.feedback().events(), vec![FeedbackEvent::CardFlip]);
    }

    #[test]
    fn third_card_blocked_until_flip_back() {
        let mut engine = engine();
        engine.initialize_game(two_pairs());
        let (a1, a2) = ids_of(&engine, "A");
        let (b1, _) = ids_of(&engine, "B");

        engine.flip_card(&a1);
        assert_eq!(engine.flip_card(&b1), FlipOutcome::Mismatched);
        assert_eq!(engine.flip_card(&a2), FlipOutcome::NoChange);
        assert_eq!(engine.state().attempts, 1);

        engine.tick(Duration::from_millis(1000));
        assert_eq!(engine.flip_card(&a2), FlipOutcome::Flipped);
    }

    #[test]
    fn mismatch_feedback_then_flip_back() {
        let mut engine = engine();
        engine.initialize_game(two_pairs());
        let (a1, _) = ids_of(&engine, "A");
        let (b1, _) = ids_of(&engine, "B");

        engine.flip_card(&a1);
        engine.flip_card(&b1);

        engine.tick(Duration::from_millis(799));
        assert_eq!(engine.feedback().events().len(), 2);

        engine.tick(Duration::from_millis(1));
        assert_eq!(
            engine.feedback().events().last(),
            Some(&FeedbackEvent::CardNoMatch)
        );
        assert!(engine.state().cards.get(&a1).unwrap().is_flipped);

        engine.tick(Duration::from_millis(200));
        assert!(!engine.state().cards.get(&a1).unwrap().is_flipped);
        assert!(!engine.state().cards.get(&b1).unwrap().is_flipped);
        assert!(engine.state().flipped_cards.is_empty());
        assert!(engine.pending_tasks().is_empty());
    }

    #[test]
    fn reset_mid_delay_discards_stale_flip_back() {
        let mut engine = engine();
        engine.initialize_game(two_pairs());
        let (a1, _) = ids_of(&engine, "A");
        let (b1, _) = ids_of(&engine, "B");
        engine.flip_card(&a1);
        engine.flip_card(&b1);

        engine.reset_game();
        // ids are derived from values, so the new deal reuses them
        engine.flip_card(&a1);
        engine.run_pending();

        assert!(engine.state().cards.get(&a1).unwrap().is_flipped);
        assert_eq!(engine.state().flipped_cards, vec![CardId::from(a1.as_str())]);
        assert!(!engine.feedback().events().contains(&FeedbackEvent::CardNoMatch));
    }

    #[test]
    fn completion_records_best_and_delays_celebration() {
        let store = MemoryScoreStore::new();
        let recorder = Recorder::default();
        let mut engine =
            GameEngine::with_config(EngineConfig::default(), store.clone(), recorder.clone(), 3);
        engine.initialize_game(two_pairs());
        let (a1, a2) = ids_of(&engine, "A");
        let (b1, b2) = ids_of(&engine, "B");

        engine.flip_card(&a1);
        assert_eq!(engine.flip_card(&a2), FlipOutcome::Matched);
        engine.update_time(9);
        engine.flip_card(&b1);
        assert_eq!(engine.flip_card(&b2), FlipOutcome::Completed);

        assert_eq!(engine.engine_state(), EngineState::Complete);
        assert_eq!(engine.progress(), 100);
        assert_eq!(recorder.events().last(), Some(&FeedbackEvent::CardMatch));

        engine.tick(Duration::from_millis(500));
        assert_eq!(recorder.events().last(), Some(&FeedbackEvent::GameComplete));

        let best = engine.best_score("tiny").unwrap();
        assert_eq!((best.attempts, best.time_elapsed), (2, 9));
        assert_eq!(store.snapshot().get("tiny"), Some(best));

        let summary = engine.last_summary().unwrap();
        assert!(summary.is_new_best);
        assert_eq!(summary.previous_best, None);
        assert_eq!(engine.flip_card(&a1), FlipOutcome::NoChange);
    }

    #[test]
    fn worse_game_keeps_previous_best() {
        let mut scores = BestScores::new();
        scores.insert("tiny".into(), BestScore::new(2, 5, chrono::Utc::now()));
        let store = MemoryScoreStore::with_scores(scores.clone());
        let mut engine =
            GameEngine::with_config(EngineConfig::default(), store.clone(), NoFeedback, 8);
        engine.load_best_scores();
        engine.initialize_game(two_pairs());
        let (a1, a2) = ids_of(&engine, "A");
        let (b1, b2) = ids_of(&engine, "B");

        engine.flip_card(&a1);
        engine.flip_card(&b1);
        engine.run_pending();
        engine.flip_card(&a1);
        engine.flip_card(&a2);
        engine.flip_card(&b1);
        engine.flip_card(&b2);

        assert_eq!(engine.state().attempts, 3);
        assert_eq!(engine.best_scores(), &scores);
        assert_eq!(store.snapshot(), scores);
        let summary = engine.last_summary().unwrap();
        assert!(!summary.is_new_best);
        assert_eq!(summary.previous_best.as_ref().map(|best| best.attempts), Some(2));
    }

    #[test]
    fn failing_collaborators_do_not_disturb_play() {
        let mut engine = GameEngine::with_config(EngineConfig::default(), FailingStore, Broken, 21);
        engine.load_best_scores();
        assert!(engine.best_scores().is_empty());

        engine.initialize_game(two_pairs());
        engine.button_press();
        let (a1, a2) = ids_of(&engine, "A");
        let (b1, b2) = ids_of(&engine, "B");
        engine.flip_card(&a1);
        engine.flip_card(&a2);
        engine.flip_card(&b1);
        assert_eq!(engine.flip_card(&b2), FlipOutcome::Completed);
        engine.run_pending();

        assert_eq!(engine.best_score("tiny").map(|best| best.attempts), Some(2));
    }

    /// Only counts celebrations, everything else goes to `emit`.
    #[derive(Clone, Debug, Default)]
    struct CelebrationCounter {
        completions: Rc<RefCell<u32>>,
        presses: Rc<RefCell<u32>>,
    }

    impl FeedbackSink for CelebrationCounter {
        fn emit(&mut self, _event: FeedbackEvent) -> core::result::Result<(), FeedbackError> {
            Ok(())
        }

        fn game_complete(&mut self) -> core::result::Result<(), FeedbackError> {
            *self.completions.borrow_mut() += 1;
            Ok(())
        }

        fn button_press(&mut self) -> core::result::Result<(), FeedbackError> {
            *self.presses.borrow_mut() += 1;
            Ok(())
        }
    }

    #[test]
    fn engine_uses_per_event_sink_methods() {
        let counter = CelebrationCounter::default();
        let mut engine =
            GameEngine::with_config(EngineConfig::default(), MemoryScoreStore::new(), counter.clone(), 6);
        engine.initialize_game(two_pairs());
        engine.button_press();
        let (a1, a2) = ids_of(&engine, "A");
        let (b1, b2) = ids_of(&engine, "B");
        for id in [&a1, &a2, &b1, &b2] {
            engine.flip_card(id);
        }
        assert_eq!(*counter.completions.borrow(), 0);

        engine.run_pending();

        assert_eq!(*counter.completions.borrow(), 1);
        assert_eq!(*counter.presses.borrow(), 1);
    }

    #[test]
    fn log_feedback_plays_a_full_game() {
        let mut engine =
            GameEngine::with_config(EngineConfig::default(), MemoryScoreStore::new(), LogFeedback, 12);
        engine.initialize_game(two_pairs());
        let (a1, a2) = ids_of(&engine, "A");
        let (b1, b2) = ids_of(&engine, "B");
        engine.flip_card(&a1);
        engine.flip_card(&b1);
        engine.run_pending();
        for id in [&a1, &a2, &b1, &b2] {
            engine.flip_card(id);
        }
        engine.run_pending();

        assert_eq!(engine.engine_state(), EngineState::Complete);
        assert_eq!(engine.state().attempts, 3);
    }

    #[test]
    fn custom_delays_are_honored() {
        let config = EngineConfig {
            no_match_feedback_delay_ms: 100,
            flip_back_delay_ms: 200,
            ..EngineConfig::default()
        };
        let mut engine = GameEngine::with_config(config, MemoryScoreStore::new(), Recorder::default(), 4);
        engine.initialize_game(two_pairs());
        let (a1, _) = ids_of(&engine, "A");
        let (b1, _) = ids_of(&engine, "B");
        engine.flip_card(&a1);
        engine.flip_card(&b1);

        engine.tick(Duration::from_millis(200));

        assert!(engine.state().flipped_cards.is_empty());
    }
}
