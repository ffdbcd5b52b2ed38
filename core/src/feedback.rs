use serde::{Deserialize, Serialize};

use crate::FeedbackError;

/// Haptic/sound cue requested by the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackEvent {
    CardFlip,
    CardMatch,
    CardNoMatch,
    GameComplete,
    ButtonPress,
}

/// Fire-and-forget cue output. Errors are reported but never acted upon by the engine.
pub trait FeedbackSink {
    fn emit(&mut self, event: FeedbackEvent) -> Result<(), FeedbackError>;

    fn card_flip(&mut self) -> Result<(), FeedbackError> {
        self.emit(FeedbackEvent::CardFlip)
    }

    fn card_match(&mut self) -> Result<(), FeedbackError> {
        self.emit(FeedbackEvent::CardMatch)
    }

    fn card_no_match(&mut self) -> Result<(), FeedbackError> {
        self.emit(FeedbackEvent::CardNoMatch)
    }

    fn game_complete(&mut self) -> Result<(), FeedbackError> {
        self.emit(FeedbackEvent::GameComplete)
    }

    fn button_press(&mut self) -> Result<(), FeedbackError> {
        self.emit(FeedbackEvent::ButtonPress)
    }
}

/// Discards every cue.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {
    fn emit(&mut self, _event: FeedbackEvent) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Writes cues to the log, handy where no haptics exist.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn emit(&mut self, event: FeedbackEvent) -> Result<(), FeedbackError> {
        log::info!("feedback: {:?}", event);
        Ok(())
    }
}
