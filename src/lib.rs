pub mod api;
pub mod cli;
pub mod controller;
pub mod linkify;
pub mod transcript;
pub mod ui;

pub use api::{AnswerRecord, ApiError, AskResponse, Backend, FeedbackRecord, HttpBackend};
pub use controller::{
    ChatController, DOC_SELECTION_MESSAGE, FEEDBACK_ERROR_MESSAGE, FEEDBACK_SAVED_POPUP,
    POPUP_TTL, THANKS_POPUP,
};
pub use linkify::linkify;
pub use transcript::{FeedbackState, Transcript, Turn};
