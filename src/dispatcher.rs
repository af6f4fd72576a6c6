// src/dispatcher.rs
// Turns winner events and number calls into playable announcements.
//
// Template choice is random on purpose so repeated prizes do not sound
// identical; the random source is injected so it can be seeded.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::announcement::{Announcement, DedupKey};
use crate::defs::{DEFAULT_INTER_ANNOUNCEMENT_DELAY, NUMBER_CALL_PRIORITY};
use crate::diff::WinnerEvent;

pub struct AnnouncementDispatcher<R: Rng = StdRng> {
    rng: R,
    inter_announcement_delay: Duration,
    last_key: Option<DedupKey>,
}

impl AnnouncementDispatcher<StdRng> {
    /// Dispatcher seeded from the thread-local generator
    pub fn from_entropy_seed(inter_announcement_delay: Duration) -> Self {
        Self::new(StdRng::seed_from_u64(rand::random()), inter_announcement_delay)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), DEFAULT_INTER_ANNOUNCEMENT_DELAY)
    }
}

impl<R: Rng> AnnouncementDispatcher<R> {
    pub fn new(rng: R, inter_announcement_delay: Duration) -> Self {
        AnnouncementDispatcher {
            rng,
            inter_announcement_delay,
            last_key: None,
        }
    }

    /// Build the announcement for a winner.
    ///
    /// Returns `None` when the same prize and ticket was the last thing
    /// dispatched.
    pub fn dispatch(&mut self, event: &WinnerEvent) -> Option<Announcement> {
        let key = DedupKey::Winner(event.prize, event.ticket_id.clone());
        if !self.remember(&key) {
            log::debug!("Suppressed repeated announcement for {} ticket {}", event.prize, event.ticket_id);
            return None;
        }

        let templates = event.prize.templates();
        let template = templates[self.rng.random_range(0..templates.len())];
        let message = format_winner_message(template, event.player_name.as_deref(), event.ticket_id.as_str());

        Some(Announcement::new(
            message,
            Some(event.prize.sound()),
            event.prize.priority(),
            self.inter_announcement_delay,
            key,
        ))
    }

    /// Build the announcement for a called number, deduplicated by the number.
    pub fn dispatch_number(&mut self, number: u8) -> Option<Announcement> {
        let key = DedupKey::Number(number);
        if !self.remember(&key) {
            return None;
        }
        Some(Announcement::new(
            format!("Number {number}"),
            None,
            NUMBER_CALL_PRIORITY,
            self.inter_announcement_delay,
            key,
        ))
    }

    /// Forget the last dispatched key (new game)
    pub fn reset(&mut self) {
        self.last_key = None;
    }

    // Returns false when `key` matches the previous dispatch.
    fn remember(&mut self, key: &DedupKey) -> bool {
        if self.last_key.as_ref() == Some(key) {
            return false;
        }
        self.last_key = Some(key.clone());
        true
    }
}

/// `"<template> <player> with ticket number <ticket>!"`, or the ticket-only
/// form when the player is unknown.
pub fn format_winner_message(template: &str, player_name: Option<&str>, ticket_id: &str) -> String {
    match player_name {
        Some(name) => format!("{template} {name} with ticket number {ticket_id}!"),
        None => format!("{template} ticket number {ticket_id}!"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announcement::SoundKey;
    use crate::prize::PrizeType;
    use crate::snapshot::TicketId;
    use chrono::Utc;

    fn event(prize: PrizeType, ticket: &str, name: Option<&str>) -> WinnerEvent {
        WinnerEvent {
            prize,
            ticket_id: TicketId::new(ticket),
            player_name: name.map(str::to_string),
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn test_message_is_one_of_the_prize_templates() {
        // Template choice is random; only membership in the set is asserted.
        let expected: Vec<String> = PrizeType::FullHouse
            .templates()
            .iter()
            .map(|t| format!("{t} Priya with ticket number 47!"))
            .collect();

        for seed in 0..20 {
            let mut dispatcher = AnnouncementDispatcher::with_seed(seed);
            let announcement = dispatcher.dispatch(&event(PrizeType::FullHouse, "47", Some("Priya"))).unwrap();
            assert!(expected.contains(&announcement.message().to_string()), "{}", announcement.message());
        }
    }

    #[test]
    fn test_ticket_only_message_without_player() {
        let mut dispatcher = AnnouncementDispatcher::with_seed(7);
        let announcement = dispatcher.dispatch(&event(PrizeType::TopLine, "9", None)).unwrap();
        assert!(announcement.message().ends_with(" ticket number 9!"));
        assert!(!announcement.message().contains(" with "));
    }

    #[test]
    fn test_priority_and_sound_follow_prize() {
        let mut dispatcher = AnnouncementDispatcher::with_seed(1);
        let announcement = dispatcher.dispatch(&event(PrizeType::HalfSheet, "3", Some("Om"))).unwrap();
        assert_eq!(announcement.priority(), PrizeType::HalfSheet.priority());
        assert_eq!(announcement.sound(), Some(SoundKey::Applause));
        assert_eq!(announcement.inter_announcement_delay(), DEFAULT_INTER_ANNOUNCEMENT_DELAY);
    }

    #[test]
    fn test_immediate_repeat_is_suppressed() {
        let mut dispatcher = AnnouncementDispatcher::with_seed(3);
        let winner = event(PrizeType::Corners, "11", Some("Isha"));
        assert!(dispatcher.dispatch(&winner).is_some());
        assert!(dispatcher.dispatch(&winner).is_none());

        // Another event in between makes the pair new again.
        assert!(dispatcher.dispatch(&event(PrizeType::Corners, "12", None)).is_some());
        assert!(dispatcher.dispatch(&winner).is_some());
    }

    #[test]
    fn test_number_calls_dedup_by_number() {
        let mut dispatcher = AnnouncementDispatcher::with_seed(0);
        let first = dispatcher.dispatch_number(42).unwrap();
        assert_eq!(first.message(), "Number 42");
        assert_eq!(first.priority(), NUMBER_CALL_PRIORITY);
        assert_eq!(first.sound(), None);
        assert!(dispatcher.dispatch_number(42).is_none());
        assert!(dispatcher.dispatch_number(43).is_some());
    }

    #[test]
    fn test_reset_allows_redispatch() {
        let mut dispatcher = AnnouncementDispatcher::with_seed(0);
        assert!(dispatcher.dispatch_number(5).is_some());
        dispatcher.reset();
        assert!(dispatcher.dispatch_number(5).is_some());
    }

    #[test]
    fn test_same_seed_same_choice() {
        let winner = event(PrizeType::QuickFive, "2", Some("Nia"));
        let a = AnnouncementDispatcher::with_seed(99).dispatch(&winner).unwrap();
        let b = AnnouncementDispatcher::with_seed(99).dispatch(&winner).unwrap();
        assert_eq!(a.message(), b.message());
    }
}
