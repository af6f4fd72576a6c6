// src/defs.rs
// Shared constants and small helpers for the tombola announcer.

use std::time::Duration;

pub const UNKNOWN_PLAYER: &str = "Unknown Player";

pub const NUMBER_CALL_PRIORITY: u8 = 1;

pub const DEFAULT_INTER_ANNOUNCEMENT_DELAY: Duration = Duration::from_millis(500);

// Number range of a 90-ball game
pub const FIRSTNUMBER: u8 = 1;
pub const LASTNUMBER: u8 = 90;

pub struct Colors;

impl Colors {
    pub fn green() -> &'static str {
        "\x1b[1;32m"
    }

    pub fn yellow() -> &'static str {
        "\x1b[1;33m"
    }

    pub fn magenta() -> &'static str {
        "\x1b[1;35m"
    }

    pub fn reset() -> &'static str {
        "\x1b[0m"
    }
}

pub fn is_valid_number(number: u8) -> bool {
    (FIRSTNUMBER..=LASTNUMBER).contains(&number)
}
