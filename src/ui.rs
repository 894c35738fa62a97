//! Interactive terminal front end: a raw-mode composer over the controller.
//!
//! Key map: type to compose, Enter submits, Shift+Enter inserts a newline.
//! Up/Down select a transcript turn, Ctrl-G rates it up, Ctrl-B rates it
//! down and opens its feedback box. `/file NAME`, `/lang CODE` and `/quit`
//! are composer commands. Ctrl-C or Esc quits.

use std::io::{self, Write};
use std::time::Duration;

use colored::*;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute};

use crate::api::Backend;
use crate::controller::{ChatController, FEEDBACK_ERROR_MESSAGE};
use crate::transcript::FeedbackState;

/// Which input area key events land in.
enum Focus {
    Compose,
    Feedback { turn: u64, buffer: String },
}

/// What a key event means while the query composer has focus.
#[derive(Debug, PartialEq, Eq)]
enum ComposerAction {
    Insert(char),
    Backspace,
    Submit { shift: bool },
    SelectPrev,
    SelectNext,
    RateUp,
    RateDown,
    Quit,
    Ignore,
}

fn composer_action(key: &KeyEvent) -> ComposerAction {
    if key.kind != KeyEventKind::Press {
        return ComposerAction::Ignore;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => ComposerAction::Submit {
            shift: key.modifiers.contains(KeyModifiers::SHIFT),
        },
        KeyCode::Backspace => ComposerAction::Backspace,
        KeyCode::Up => ComposerAction::SelectPrev,
        KeyCode::Down => ComposerAction::SelectNext,
        KeyCode::Esc => ComposerAction::Quit,
        KeyCode::Char('c') if ctrl => ComposerAction::Quit,
        KeyCode::Char('g') if ctrl => ComposerAction::RateUp,
        KeyCode::Char('b') if ctrl => ComposerAction::RateDown,
        KeyCode::Char(c) => ComposerAction::Insert(c),
        _ => ComposerAction::Ignore,
    }
}

/// Run the interactive session until the user quits.
pub async fn run<B: Backend>(
    mut controller: ChatController<B>,
) -> Result<(), Box<dyn std::error::Error>> {
    terminal::enable_raw_mode()?;
    let result = event_loop(&mut controller).await;
    terminal::disable_raw_mode()?;
    result
}

async fn event_loop<B: Backend>(
    controller: &mut ChatController<B>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout();
    let mut focus = Focus::Compose;
    let mut selected: Option<u64> = None;

    loop {
        controller.sweep_popup();
        render(&mut stdout, controller, &focus, selected)?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        let mut next_focus: Option<Focus> = None;
        match &mut focus {
            Focus::Compose => match composer_action(&key) {
                ComposerAction::Quit => break,
                ComposerAction::Insert(c) => controller.push_query_char(c),
                ComposerAction::Backspace => controller.pop_query_char(),
                ComposerAction::SelectPrev => {
                    selected = step_selection(controller, selected, -1);
                }
                ComposerAction::SelectNext => {
                    selected = step_selection(controller, selected, 1);
                }
                ComposerAction::RateUp => {
                    if let Some(id) = selected.or_else(|| controller.transcript().last_id()) {
                        controller.rate_up(id).await;
                    }
                }
                ComposerAction::RateDown => {
                    if let Some(id) = selected.or_else(|| controller.transcript().last_id()) {
                        controller.rate_down(id);
                        let visible = matches!(
                            controller.transcript().get(id).map(|t| t.feedback),
                            Some(FeedbackState::Visible { .. })
                        );
                        if visible {
                            next_focus = Some(Focus::Feedback {
                                turn: id,
                                buffer: String::new(),
                            });
                        }
                    }
                }
                ComposerAction::Submit { shift } => {
                    if shift {
                        controller.press_enter(true).await;
                    } else {
                        let query = controller.query().trim().to_string();
                        if query == "/quit" {
                            break;
                        }
                        if let Some(value) = query.strip_prefix("/file") {
                            controller.set_file(value.trim());
                            controller.set_query("");
                        } else if let Some(value) = query.strip_prefix("/lang") {
                            controller.set_language(value.trim());
                            controller.set_query("");
                        } else {
                            write!(stdout, "\r\n{}\r\n", "waiting for answer…".yellow())?;
                            stdout.flush()?;
                            controller.press_enter(false).await;
                            // Scroll to the newest message.
                            selected = controller.transcript().last_id();
                        }
                    }
                }
                ComposerAction::Ignore => {}
            },
            Focus::Feedback { turn, buffer } => {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc => next_focus = Some(Focus::Compose),
                        KeyCode::Backspace => {
                            buffer.pop();
                        }
                        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                            buffer.push('\n');
                        }
                        KeyCode::Enter => {
                            let id = *turn;
                            let text = buffer.clone();
                            controller.submit_feedback(id, &text).await;
                            let done = matches!(
                                controller.transcript().get(id).map(|t| t.feedback),
                                Some(FeedbackState::Submitted)
                            );
                            if done {
                                next_focus = Some(Focus::Compose);
                            }
                        }
                        KeyCode::Char(c) => buffer.push(c),
                        _ => {}
                    }
                }
            }
        }
        if let Some(f) = next_focus {
            focus = f;
        }
    }
    Ok(())
}

fn step_selection<B: Backend>(
    controller: &ChatController<B>,
    selected: Option<u64>,
    delta: isize,
) -> Option<u64> {
    let turns = controller.transcript().turns();
    if turns.is_empty() {
        return None;
    }
    let current = selected
        .and_then(|id| turns.iter().position(|t| t.id == id))
        .unwrap_or(turns.len() - 1);
    let next = current
        .saturating_add_signed(delta)
        .min(turns.len() - 1);
    Some(turns[next].id)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render<B: Backend>(
    stdout: &mut io::Stdout,
    controller: &ChatController<B>,
    focus: &Focus,
    selected: Option<u64>,
) -> io::Result<()> {
    let (cols, rows) = terminal::size().unwrap_or((80, 24));
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("{}", "askdoc".bold().cyan()));
    lines.push(String::new());

    let highlighted = selected.or_else(|| controller.transcript().last_id());
    for turn in controller.transcript().turns() {
        let marker = if Some(turn.id) == highlighted { "▌" } else { " " };
        for (i, line) in turn.question.lines().enumerate() {
            let label = if i == 0 { "you ▸" } else { "     " };
            lines.push(format!("{} {} {}", marker, label.bold(), line.cyan()));
        }
        for (i, line) in turn.answer_html.lines().enumerate() {
            let label = if i == 0 { "bot ▸" } else { "     " };
            lines.push(format!("{} {} {}", marker, label.bold(), line.green()));
        }
        match turn.feedback {
            FeedbackState::Hidden => {
                lines.push(format!("{}", "        👍 Ctrl-G   👎 Ctrl-B".dimmed()));
            }
            FeedbackState::Visible { error } => {
                let buffer = match focus {
                    Focus::Feedback { turn: t, buffer } if *t == turn.id => buffer.as_str(),
                    _ => "",
                };
                lines.push(format!(
                    "        {} {}",
                    "feedback ▸".bold().yellow(),
                    buffer
                ));
                if error {
                    lines.push(format!("        {}", FEEDBACK_ERROR_MESSAGE.red()));
                }
            }
            FeedbackState::Submitted => {}
        }
        lines.push(String::new());
    }

    if let Some(text) = controller.popup() {
        let pad = (cols as usize).saturating_sub(text.len() + 4) / 2;
        lines.push(format!("{}{}", " ".repeat(pad), format!("  {}  ", text).black().on_cyan()));
        lines.push(String::new());
    }

    if let Some(message) = controller.doc_message() {
        lines.push(format!("{}", message.red()));
    }
    if controller.loader_visible() {
        lines.push(format!("{}", "waiting for answer…".yellow()));
    }

    if controller.ask_visible() {
        for (i, line) in controller.query().split('\n').enumerate() {
            let label = if i == 0 { "ask ▸" } else { "    …" };
            lines.push(format!("{} {}", label.bold(), line));
        }
    } else if controller.doc_message().is_none() && !controller.loader_visible() {
        lines.push(format!(
            "{}",
            "(select a document and language to ask: /file NAME, /lang CODE)".dimmed()
        ));
    }
    lines.push(format!(
        "{}",
        "Enter send · Shift-Enter newline · ↑/↓ select · Ctrl-G/Ctrl-B rate · /quit".dimmed()
    ));

    // Tail-render: the newest content stays on screen.
    let visible = rows.saturating_sub(1) as usize;
    let start = lines.len().saturating_sub(visible);

    execute!(stdout, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
    for line in &lines[start..] {
        write!(stdout, "{}\r\n", line)?;
    }
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_enter_submits() {
        assert_eq!(
            composer_action(&key(KeyCode::Enter, KeyModifiers::NONE)),
            ComposerAction::Submit { shift: false }
        );
    }

    #[test]
    fn test_shift_enter_is_newline_submit_variant() {
        assert_eq!(
            composer_action(&key(KeyCode::Enter, KeyModifiers::SHIFT)),
            ComposerAction::Submit { shift: true }
        );
    }

    #[test]
    fn test_plain_chars_insert() {
        assert_eq!(
            composer_action(&key(KeyCode::Char('x'), KeyModifiers::NONE)),
            ComposerAction::Insert('x')
        );
    }

    #[test]
    fn test_ctrl_keys_rate_and_quit() {
        assert_eq!(
            composer_action(&key(KeyCode::Char('g'), KeyModifiers::CONTROL)),
            ComposerAction::RateUp
        );
        assert_eq!(
            composer_action(&key(KeyCode::Char('b'), KeyModifiers::CONTROL)),
            ComposerAction::RateDown
        );
        assert_eq!(
            composer_action(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            ComposerAction::Quit
        );
    }

    #[test]
    fn test_release_events_ignored() {
        let mut k = key(KeyCode::Enter, KeyModifiers::NONE);
        k.kind = KeyEventKind::Release;
        assert_eq!(composer_action(&k), ComposerAction::Ignore);
    }
}
