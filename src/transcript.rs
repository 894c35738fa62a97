//! Append-only transcript of question/answer turns and the per-turn
//! feedback state machine.

/// Lifecycle of one turn's negative-feedback box.
///
/// `Submitted` is terminal: once feedback has been sent for a turn, further
/// submit attempts for that turn are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackState {
    /// Box not shown (initial state).
    Hidden,
    /// Box revealed by a thumbs-down; `error` marks an empty-input attempt.
    Visible { error: bool },
    /// Feedback sent, box hidden again, submit deregistered.
    Submitted,
}

/// One question/answer exchange rendered in the transcript.
///
/// Turns carry a stable id assigned at creation instead of relying on their
/// position among rendered siblings, so handlers stay correct even if the
/// rendering ever reorders.
#[derive(Debug, Clone)]
pub struct Turn {
    pub id: u64,
    pub question: String,
    /// Answer as returned by the backend, before link formatting.
    pub answer: String,
    /// Answer with URLs rewritten to anchor markup; this is what renders.
    pub answer_html: String,
    pub feedback: FeedbackState,
}

/// The ordered, append-only log of turns. Turns are never removed or
/// reordered; ids are a monotonically increasing sequence.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return its id.
    pub fn push(&mut self, question: String, answer: String, answer_html: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.turns.push(Turn {
            id,
            question,
            answer,
            answer_html,
            feedback: FeedbackState::Hidden,
        });
        id
    }

    pub fn get(&self, id: u64) -> Option<&Turn> {
        self.turns.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Turn> {
        self.turns.iter_mut().find(|t| t.id == id)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last_id(&self) -> Option<u64> {
        self.turns.last().map(|t| t.id)
    }

    /// Thumbs-down: reveal the feedback box unless feedback was already sent.
    pub fn reveal_feedback_box(&mut self, id: u64) {
        if let Some(turn) = self.get_mut(id) {
            match turn.feedback {
                FeedbackState::Hidden => turn.feedback = FeedbackState::Visible { error: false },
                FeedbackState::Visible { .. } | FeedbackState::Submitted => {}
            }
        }
    }

    /// Flag or clear the empty-input error on a visible feedback box.
    pub fn set_feedback_error(&mut self, id: u64, error: bool) {
        if let Some(turn) = self.get_mut(id) {
            if matches!(turn.feedback, FeedbackState::Visible { .. }) {
                turn.feedback = FeedbackState::Visible { error };
            }
        }
    }

    /// Move a turn's feedback box to its terminal state.
    pub fn mark_submitted(&mut self, id: u64) {
        if let Some(turn) = self.get_mut(id) {
            turn.feedback = FeedbackState::Submitted;
        }
    }
}
