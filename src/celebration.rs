// src/celebration.rs
// Visual celebration fired alongside the biggest prizes. Fire-and-forget:
// nothing waits on it and nothing it does can fail the announcement path.

use crossterm::style::{Color, Stylize};
use rand::Rng;

use crate::prize::PrizeType;
use crate::terminal;

pub trait Celebration: Send + Sync {
    fn celebrate(&self, prize: PrizeType, winner: &str);
}

/// Does nothing. Used when output is not a terminal.
pub struct NoCelebration;

impl Celebration for NoCelebration {
    fn celebrate(&self, _prize: PrizeType, _winner: &str) {}
}

/// Prints a burst of coloured confetti around the winner's name.
pub struct TerminalConfetti {
    pub width: usize,
    pub rows: usize,
}

const CONFETTI: [char; 6] = ['*', '+', 'o', '.', '~', '^'];
const PALETTE: [Color; 6] = [Color::Red, Color::Yellow, Color::Green, Color::Cyan, Color::Magenta, Color::Blue];

impl Default for TerminalConfetti {
    fn default() -> Self {
        TerminalConfetti { width: 48, rows: 2 }
    }
}

impl TerminalConfetti {
    fn burst_line(&self, rng: &mut impl Rng) -> String {
        let mut line = String::new();
        for _ in 0..self.width {
            if rng.random_bool(0.45) {
                let glyph = CONFETTI[rng.random_range(0..CONFETTI.len())];
                let color = PALETTE[rng.random_range(0..PALETTE.len())];
                line.push_str(&glyph.to_string().with(color).bold().to_string());
            } else {
                line.push(' ');
            }
        }
        line
    }
}

impl Celebration for TerminalConfetti {
    fn celebrate(&self, prize: PrizeType, winner: &str) {
        let mut rng = rand::rng();
        let mut out = String::new();
        for _ in 0..self.rows {
            out.push_str(&self.burst_line(&mut rng));
            out.push('\n');
        }
        let banner = format!("  {} - {}  ", prize.label().to_uppercase(), winner);
        out.push_str(&banner.with(Color::Yellow).bold().to_string());
        out.push('\n');
        for _ in 0..self.rows {
            out.push_str(&self.burst_line(&mut rng));
            out.push('\n');
        }

        terminal::emit(out.trim_end_matches('\n'));
    }
}
