//! Chat transcript controller: input gate, ask flow, feedback flow and the
//! transient confirmation popup.
//!
//! All UI state lives here as plain data so the whole widget is testable
//! without a terminal or a network; the `ui` module is a thin renderer over
//! it and tests drive it through a mock [`Backend`].

use std::time::Duration;

use tokio::time::Instant;
use tracing::error;

use crate::api::{AnswerRecord, Backend, FeedbackRecord};
use crate::linkify::linkify;
use crate::transcript::{FeedbackState, Transcript};

/// How long a confirmation popup stays on screen.
pub const POPUP_TTL: Duration = Duration::from_millis(3000);

/// Validation message shown while no document is selected.
pub const DOC_SELECTION_MESSAGE: &str = "Please select a document.";

/// Inline error shown on an empty feedback submission.
pub const FEEDBACK_ERROR_MESSAGE: &str = "Please provide feedback.";

/// Popup text for the positive feedback path.
pub const THANKS_POPUP: &str = "Thank you for your response!";

/// Popup text for a successful negative feedback submission.
pub const FEEDBACK_SAVED_POPUP: &str = "Your feedback has been submitted successfully!";

/// Transient centered overlay; removed by [`ChatController::sweep_popup`]
/// once its TTL elapses. No user dismiss action exists.
#[derive(Debug, Clone)]
pub struct Popup {
    pub text: &'static str,
    shown_at: Instant,
}

impl Popup {
    fn new(text: &'static str) -> Self {
        Popup {
            text,
            shown_at: Instant::now(),
        }
    }

    fn expired(&self) -> bool {
        self.shown_at.elapsed() >= POPUP_TTL
    }
}

/// The chat widget's state and behavior, generic over the backend seam.
///
/// One controller per session. Methods take `&mut self`, so at most one ask
/// can ever be in flight; the ask control is additionally hidden while a
/// request runs, mirroring the widget's only overlap guard.
pub struct ChatController<B: Backend> {
    backend: B,
    selected_file: String,
    selected_language: String,
    query: String,
    transcript: Transcript,
    ask_visible: bool,
    loader_visible: bool,
    doc_message: Option<&'static str>,
    popup: Option<Popup>,
}

impl<B: Backend> ChatController<B> {
    pub fn new(backend: B, selected_file: String, selected_language: String) -> Self {
        let mut controller = ChatController {
            backend,
            selected_file,
            selected_language,
            query: String::new(),
            transcript: Transcript::new(),
            ask_visible: false,
            loader_visible: false,
            doc_message: None,
            popup: None,
        };
        // Initial gate evaluation, as on page load.
        controller.update_ask_visibility();
        controller
    }

    // -----------------------------------------------------------------------
    // Input gate
    // -----------------------------------------------------------------------

    /// Change the document selection. An empty value re-hides the ask
    /// control and raises the fixed validation message.
    pub fn set_file(&mut self, value: &str) {
        self.selected_file = value.to_string();
        self.doc_message = if self.selected_file.is_empty() {
            Some(DOC_SELECTION_MESSAGE)
        } else {
            None
        };
        self.update_ask_visibility();
    }

    /// Change the language selection.
    pub fn set_language(&mut self, value: &str) {
        self.selected_language = value.to_string();
        self.update_ask_visibility();
    }

    fn update_ask_visibility(&mut self) {
        self.ask_visible = !self.selected_file.is_empty() && !self.selected_language.is_empty();
    }

    // -----------------------------------------------------------------------
    // Query composer
    // -----------------------------------------------------------------------

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
    }

    /// Enter in the query composer. Shift+Enter inserts a literal newline;
    /// Enter alone activates the ask control (whether or not it is shown,
    /// exactly like a programmatic click on it).
    pub async fn press_enter(&mut self, shift: bool) {
        if shift {
            self.query.push('\n');
        } else {
            self.ask().await;
        }
    }

    /// A pointer click on the ask control. Impossible while the control is
    /// hidden, so this is a no-op then.
    pub async fn click_ask(&mut self) {
        if self.ask_visible {
            self.ask().await;
        }
    }

    // -----------------------------------------------------------------------
    // Ask flow
    // -----------------------------------------------------------------------

    async fn ask(&mut self) {
        if self.selected_file.is_empty() {
            self.doc_message = Some(DOC_SELECTION_MESSAGE);
            return;
        }
        self.doc_message = None;

        self.begin_ask();
        let question = self.query.clone();
        let result = self
            .backend
            .ask(&question, &self.selected_file, &self.selected_language)
            .await;
        match result {
            Ok(answer) => {
                self.transcript
                    .push(question, answer.clone(), linkify(&answer));
                self.query.clear();
            }
            Err(e) => {
                // Swallowed: the widget shows no error state for a failed
                // ask, it just returns to ready.
                error!(error = %e, "ask request failed");
            }
        }
        self.finish_ask();
    }

    fn begin_ask(&mut self) {
        self.loader_visible = true;
        self.ask_visible = false;
    }

    fn finish_ask(&mut self) {
        self.loader_visible = false;
        self.ask_visible = true;
    }

    // -----------------------------------------------------------------------
    // Feedback flow
    // -----------------------------------------------------------------------

    /// Thumbs-up on a turn: log the pair as correct and thank the user.
    /// Repeated clicks re-send; only the negative path deregisters itself.
    pub async fn rate_up(&mut self, id: u64) {
        let Some(turn) = self.transcript.get(id) else {
            return;
        };
        let question = turn.question.clone();
        let answer = turn.answer.clone();
        self.send_logs(&question, &answer, true, "").await;
        self.popup = Some(Popup::new(THANKS_POPUP));
    }

    /// Thumbs-down on a turn: reveal its feedback box.
    pub fn rate_down(&mut self, id: u64) {
        self.transcript.reveal_feedback_box(id);
    }

    /// Submit free-text feedback for a turn whose box is visible.
    ///
    /// Empty or whitespace-only text raises the inline error and leaves the
    /// box open for a retry. A successful submission hides the box and is
    /// terminal for this turn.
    pub async fn submit_feedback(&mut self, id: u64, text: &str) {
        let Some(turn) = self.transcript.get(id) else {
            return;
        };
        if !matches!(turn.feedback, FeedbackState::Visible { .. }) {
            return;
        }

        if text.trim().is_empty() {
            self.transcript.set_feedback_error(id, true);
            return;
        }
        self.transcript.set_feedback_error(id, false);

        let turn = self.transcript.get(id).expect("turn exists");
        let question = turn.question.clone();
        let answer = turn.answer.clone();
        self.send_logs(&question, &answer, false, text).await;

        self.transcript.mark_submitted(id);
        self.popup = Some(Popup::new(FEEDBACK_SAVED_POPUP));
    }

    /// Forward one rating to both logging endpoints. Failures are logged
    /// and otherwise ignored; they never disturb rendered turns.
    async fn send_logs(&self, question: &str, answer: &str, is_correct: bool, feedback: &str) {
        let record = AnswerRecord {
            prompt: question.to_string(),
            chat_ans: answer.to_string(),
            human_ans: feedback.to_string(),
        };
        if let Err(e) = self.backend.save_answers(&record).await {
            error!(error = %e, "saving answer data failed");
        }

        let record = FeedbackRecord {
            question: question.to_string(),
            answer: answer.to_string(),
            is_correct,
            feedback: feedback.to_string(),
        };
        if let Err(e) = self.backend.save_feedback(&record).await {
            error!(error = %e, "saving feedback failed");
        }
    }

    // -----------------------------------------------------------------------
    // Popup lifecycle
    // -----------------------------------------------------------------------

    /// Drop the popup once it has been on screen for [`POPUP_TTL`]. Called
    /// by the render loop every frame.
    pub fn sweep_popup(&mut self) {
        if self.popup.as_ref().is_some_and(Popup::expired) {
            self.popup = None;
        }
    }

    // -----------------------------------------------------------------------
    // Read-only view for the renderer and tests
    // -----------------------------------------------------------------------

    pub fn ask_visible(&self) -> bool {
        self.ask_visible
    }

    pub fn loader_visible(&self) -> bool {
        self.loader_visible
    }

    pub fn doc_message(&self) -> Option<&'static str> {
        self.doc_message
    }

    pub fn popup(&self) -> Option<&'static str> {
        self.popup.as_ref().map(|p| p.text)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}
