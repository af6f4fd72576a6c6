// src/terminal.rs
// Terminal input/output for the announcer client.
//
// Keys are read with crossterm while raw mode is held for the session, so
// every line printed meanwhile goes through `emit`, which ends lines with
// `\r\n`:
// - m: toggle mute
// - ESC / q / Ctrl+C: exit

use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::defs::Colors;
use crate::diff::WinnerEvent;
use crate::prize::prizes_by_priority;
use crate::snapshot::GameState;

const KEY_POLL_WINDOW: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    ToggleMute,
    Exit,
    None,
}

pub fn key_action(key: &KeyEvent) -> KeyAction {
    // Raw mode turns Ctrl+C into a key press instead of SIGINT
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => KeyAction::Exit,
            _ => KeyAction::None,
        };
    }
    match key.code {
        KeyCode::Char('m') | KeyCode::Char('M') => KeyAction::ToggleMute,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Exit,
        _ => KeyAction::None,
    }
}

/// Text with every line ending as `\r\n`
pub fn crlf(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

/// Print one line (or several) to stdout, correct in raw and cooked mode
pub fn emit(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "{}\r\n", crlf(text));
    let _ = stdout.flush();
}

pub fn emit_err(text: &str) {
    let mut stderr = std::io::stderr().lock();
    let _ = write!(stderr, "{}\r\n", crlf(text));
}

fn read_key(window: Duration) -> std::io::Result<KeyAction> {
    if !event::poll(window)? {
        return Ok(KeyAction::None);
    }
    match event::read()? {
        // Only process key press events, not key release events
        Event::Key(key_event) if key_event.kind == KeyEventKind::Press => Ok(key_action(&key_event)),
        _ => Ok(KeyAction::None),
    }
}

/// Hold raw mode and forward key actions from a blocking thread until
/// `stop` is set. Returns `None` when stdin is not a terminal.
pub fn spawn_key_reader(actions: mpsc::UnboundedSender<KeyAction>, stop: Arc<AtomicBool>) -> Option<JoinHandle<()>> {
    if !std::io::stdin().is_terminal() {
        log::debug!("stdin is not a terminal, key controls disabled");
        return None;
    }
    if let Err(e) = enable_raw_mode() {
        log::warn!("Could not enable raw mode, key controls disabled: {e}");
        return None;
    }

    Some(tokio::task::spawn_blocking(move || {
        while !stop.load(Ordering::Relaxed) {
            match read_key(KEY_POLL_WINDOW) {
                Ok(KeyAction::None) => {}
                Ok(action) => {
                    if actions.send(action).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("Key input failed, key controls disabled: {e}");
                    break;
                }
            }
        }
        if let Err(e) = disable_raw_mode() {
            log::warn!("Could not restore the terminal: {e}");
        }
    }))
}

pub fn format_winner_line(event: &WinnerEvent) -> String {
    format!(
        "🏆 {}{}{} - {} (ticket {})",
        Colors::yellow(),
        event.prize.label(),
        Colors::reset(),
        event.display_name(),
        event.ticket_id
    )
}

pub fn print_winners(events: &[WinnerEvent]) {
    for event in events {
        emit(&format_winner_line(event));
    }
}

/// Current winners per prize, highest prize first
pub fn winners_summary(state: &GameState) -> Vec<String> {
    prizes_by_priority()
        .into_iter()
        .filter(|prize| !state.winners.get(*prize).is_empty())
        .map(|prize| {
            let names: Vec<String> = state
                .winners
                .get(prize)
                .iter()
                .map(|ticket| match state.directory.resolve(ticket) {
                    Some(name) => format!("{name} ({ticket})"),
                    None => format!("ticket {ticket}"),
                })
                .collect();
            format!("{}: {}", prize.label(), names.join(", "))
        })
        .collect()
}

pub fn show_on_terminal(game_id: &str, state: &GameState, muted: bool) {
    emit(&format!("Game ID: {game_id}"));
    match state.last_called() {
        Some(number) => emit(&format!("Last number: {}{number}{}", Colors::green(), Colors::reset())),
        None => emit("No numbers called yet"),
    }
    emit(&format!("Numbers called: {}", state.called_numbers.len()));

    let summary = winners_summary(state);
    if summary.is_empty() {
        emit("No winners yet");
    } else {
        emit("\nWinners:");
        for line in summary {
            emit(&format!("  {line}"));
        }
    }

    let audio = if muted { "🔇 muted" } else { "🔊 on" };
    emit(&format!("\nAudio: {audio}   [m] mute/unmute   [ESC/q] exit\n"));
}
