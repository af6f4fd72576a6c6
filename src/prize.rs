// src/prize.rs
// This module defines the prize categories validated by the game backend,
// together with their announcement priority, sound cue and message templates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::announcement::SoundKey;

// Serialized names are the keys under the game's `winners` node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrizeType {
    QuickFive,
    TopLine,
    MiddleLine,
    BottomLine,
    Corners,
    StarCorners,
    FullHouse,
    SecondFullHouse,
    HalfSheet,
    FullSheet,
}

impl PrizeType {
    pub const ALL: [PrizeType; 10] = [
        PrizeType::QuickFive,
        PrizeType::TopLine,
        PrizeType::MiddleLine,
        PrizeType::BottomLine,
        PrizeType::Corners,
        PrizeType::StarCorners,
        PrizeType::FullHouse,
        PrizeType::SecondFullHouse,
        PrizeType::HalfSheet,
        PrizeType::FullSheet,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PrizeType::QuickFive => "quickFive",
            PrizeType::TopLine => "topLine",
            PrizeType::MiddleLine => "middleLine",
            PrizeType::BottomLine => "bottomLine",
            PrizeType::Corners => "corners",
            PrizeType::StarCorners => "starCorners",
            PrizeType::FullHouse => "fullHouse",
            PrizeType::SecondFullHouse => "secondFullHouse",
            PrizeType::HalfSheet => "halfSheet",
            PrizeType::FullSheet => "fullSheet",
        }
    }

    /// Parse a wire key. Unknown keys yield `None` and are ignored by callers.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|prize| prize.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrizeType::QuickFive => "Quick Five",
            PrizeType::TopLine => "Top Line",
            PrizeType::MiddleLine => "Middle Line",
            PrizeType::BottomLine => "Bottom Line",
            PrizeType::Corners => "Corners",
            PrizeType::StarCorners => "Star Corners",
            PrizeType::FullHouse => "Full House",
            PrizeType::SecondFullHouse => "Second Full House",
            PrizeType::HalfSheet => "Half Sheet",
            PrizeType::FullSheet => "Full Sheet",
        }
    }

    /// Playback priority, higher plays first.
    pub fn priority(&self) -> u8 {
        match self {
            PrizeType::FullHouse => 10,
            PrizeType::SecondFullHouse => 9,
            PrizeType::FullSheet => 8,
            PrizeType::HalfSheet => 7,
            PrizeType::StarCorners => 6,
            PrizeType::Corners => 5,
            PrizeType::TopLine | PrizeType::MiddleLine | PrizeType::BottomLine => 4,
            PrizeType::QuickFive => 3,
        }
    }

    pub fn sound(&self) -> SoundKey {
        match self {
            PrizeType::FullHouse | PrizeType::SecondFullHouse => SoundKey::Jackpot,
            PrizeType::HalfSheet | PrizeType::FullSheet => SoundKey::Applause,
            PrizeType::TopLine
            | PrizeType::MiddleLine
            | PrizeType::BottomLine
            | PrizeType::Corners
            | PrizeType::StarCorners => SoundKey::Fanfare,
            PrizeType::QuickFive => SoundKey::Win,
        }
    }

    pub fn celebrates(&self) -> bool {
        matches!(
            self,
            PrizeType::FullHouse | PrizeType::SecondFullHouse | PrizeType::FullSheet | PrizeType::HalfSheet
        )
    }

    /// Candidate message openings. Never empty.
    pub fn templates(&self) -> &'static [&'static str] {
        match self {
            PrizeType::QuickFive => &[
                "Quick Five goes to",
                "Fastest fingers! Quick Five claimed by",
                "The first five are done for",
            ],
            PrizeType::TopLine => &[
                "Top Line completed by",
                "The top row is gone! Congratulations",
            ],
            PrizeType::MiddleLine => &[
                "Middle Line completed by",
                "Right through the middle! Well done",
            ],
            PrizeType::BottomLine => &[
                "Bottom Line completed by",
                "The bottom row is cleared! Congratulations",
            ],
            PrizeType::Corners => &[
                "All four corners for",
                "Corners claimed by",
            ],
            PrizeType::StarCorners => &[
                "Star Corners for",
                "Corners and centre! Star Corners claimed by",
            ],
            PrizeType::FullHouse => &[
                "Full House! The jackpot goes to",
                "House full! Big congratulations to",
                "We have a Full House winner,",
            ],
            PrizeType::SecondFullHouse => &[
                "Second Full House for",
                "Another house is full! Congratulations",
            ],
            PrizeType::HalfSheet => &[
                "Half Sheet completed by",
                "Half Sheet bonus goes to",
            ],
            PrizeType::FullSheet => &[
                "Full Sheet completed by",
                "The whole sheet is done! Congratulations",
            ],
        }
    }
}

impl fmt::Display for PrizeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// All prizes, highest priority first, ties kept in declaration order.
pub fn prizes_by_priority() -> Vec<PrizeType> {
    let mut prizes = PrizeType::ALL.to_vec();
    prizes.sort_by(|a, b| b.priority().cmp(&a.priority()));
    prizes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roundtrip() {
        for prize in PrizeType::ALL {
            assert_eq!(PrizeType::from_key(prize.key()), Some(prize));
        }
        assert_eq!(PrizeType::from_key("earlyFive"), None);
    }

    #[test]
    fn test_serde_uses_wire_keys() {
        let json = serde_json::to_string(&PrizeType::SecondFullHouse).unwrap();
        assert_eq!(json, "\"secondFullHouse\"");
        let prize: PrizeType = serde_json::from_str("\"starCorners\"").unwrap();
        assert_eq!(prize, PrizeType::StarCorners);
    }

    #[test]
    fn test_full_house_outranks_everything() {
        for prize in PrizeType::ALL {
            if prize != PrizeType::FullHouse {
                assert!(PrizeType::FullHouse.priority() > prize.priority(), "{prize}");
            }
        }
    }

    #[test]
    fn test_sound_classes() {
        assert_eq!(PrizeType::FullHouse.sound(), SoundKey::Jackpot);
        assert_eq!(PrizeType::FullSheet.sound(), SoundKey::Applause);
        assert_eq!(PrizeType::TopLine.sound(), SoundKey::Fanfare);
        assert_eq!(PrizeType::QuickFive.sound(), SoundKey::Win);
    }

    #[test]
    fn test_every_prize_has_templates() {
        for prize in PrizeType::ALL {
            assert!(!prize.templates().is_empty());
        }
    }

    #[test]
    fn test_prizes_by_priority_is_stable() {
        let ordered = prizes_by_priority();
        assert_eq!(ordered[0], PrizeType::FullHouse);
        assert_eq!(ordered.last(), Some(&PrizeType::QuickFive));
        let lines: Vec<_> = ordered.iter().filter(|p| p.priority() == 4).copied().collect();
        assert_eq!(lines, vec![PrizeType::TopLine, PrizeType::MiddleLine, PrizeType::BottomLine]);
    }
}
