// src/announcement.rs
// Playable announcement units and the keys used to deduplicate them.

use std::fmt;
use std::time::Duration;

use crate::prize::PrizeType;
use crate::snapshot::TicketId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKey {
    Win,
    Jackpot,
    Fanfare,
    Applause,
}

impl SoundKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundKey::Win => "win",
            SoundKey::Jackpot => "jackpot",
            SoundKey::Fanfare => "fanfare",
            SoundKey::Applause => "applause",
        }
    }
}

impl fmt::Display for SoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Winner(PrizeType, TicketId),
    Number(u8),
}

/// One playable unit: an optional sound cue followed by a spoken message.
///
/// Fields are private so an announcement cannot change once it is queued.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    message: String,
    sound: Option<SoundKey>,
    priority: u8,
    inter_announcement_delay: Duration,
    key: DedupKey,
}

impl Announcement {
    pub fn new(
        message: impl Into<String>,
        sound: Option<SoundKey>,
        priority: u8,
        inter_announcement_delay: Duration,
        key: DedupKey,
    ) -> Self {
        Announcement {
            message: message.into(),
            sound,
            priority,
            inter_announcement_delay,
            key,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn sound(&self) -> Option<SoundKey> {
        self.sound
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn inter_announcement_delay(&self) -> Duration {
        self.inter_announcement_delay
    }

    pub fn key(&self) -> &DedupKey {
        &self.key
    }
}
