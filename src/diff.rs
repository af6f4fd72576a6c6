// src/diff.rs
// Winner diff engine: compares consecutive winner snapshots and reports only
// the tickets that newly appeared under each prize.

use chrono::{DateTime, Utc};

use crate::booking::BookingDirectory;
use crate::defs::UNKNOWN_PLAYER;
use crate::prize::{prizes_by_priority, PrizeType};
use crate::snapshot::{TicketId, WinnerSnapshot};

/// A newly observed winner. Lives only until it is turned into an announcement.
#[derive(Debug, Clone, PartialEq)]
pub struct WinnerEvent {
    pub prize: PrizeType,
    pub ticket_id: TicketId,
    /// `None` when neither the bookings nor the player index know the ticket
    pub player_name: Option<String>,
    pub detected_at: DateTime<Utc>,
}

impl WinnerEvent {
    pub fn display_name(&self) -> &str {
        self.player_name.as_deref().unwrap_or(UNKNOWN_PLAYER)
    }
}

/// Holds the last seen snapshot; the only writer of that state.
#[derive(Debug, Default)]
pub struct WinnerTracker {
    previous: WinnerSnapshot,
}

impl WinnerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `snapshot` as already announced without emitting anything.
    pub fn prime(&mut self, snapshot: WinnerSnapshot) {
        self.previous = snapshot;
    }

    /// Forget every previously seen winner
    pub fn reset(&mut self) {
        self.previous = WinnerSnapshot::new();
    }

    pub fn previous(&self) -> &WinnerSnapshot {
        &self.previous
    }

    /// Compute the winners present in `current` but not in the previous
    /// snapshot, then replace the previous snapshot with `current`.
    ///
    /// Events come out highest priority prize first, and within a prize in
    /// the order the backend listed the tickets. Shrinking lists yield nothing.
    pub fn diff(&mut self, current: WinnerSnapshot, directory: &BookingDirectory) -> Vec<WinnerEvent> {
        let detected_at = Utc::now();
        let mut events = Vec::new();

        for prize in prizes_by_priority() {
            let current_ids = current.get(prize);
            if current_ids.is_empty() {
                continue;
            }
            for ticket_id in current_ids.iter().filter(|id| !self.previous.contains(prize, id)) {
                let player_name = directory.resolve(ticket_id);
                if player_name.is_none() {
                    log::debug!("No player found for ticket {ticket_id} ({prize})");
                }
                events.push(WinnerEvent {
                    prize,
                    ticket_id: ticket_id.clone(),
                    player_name,
                    detected_at,
                });
            }
        }

        // Wholesale replacement so prizes removed upstream do not linger.
        self.previous = current;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(events: &[WinnerEvent]) -> Vec<(PrizeType, &str)> {
        events.iter().map(|e| (e.prize, e.ticket_id.as_str())).collect()
    }

    #[test]
    fn test_reports_only_new_winners() {
        let mut tracker = WinnerTracker::new();
        tracker.prime(WinnerSnapshot::new().with(PrizeType::FullHouse, ["12"]));

        let current = WinnerSnapshot::new()
            .with(PrizeType::FullHouse, ["12", "47"])
            .with(PrizeType::TopLine, ["9"]);
        let events = tracker.diff(current, &BookingDirectory::new());

        assert_eq!(keys(&events), vec![(PrizeType::FullHouse, "47"), (PrizeType::TopLine, "9")]);
    }

    #[test]
    fn test_same_snapshot_twice_is_idempotent() {
        let mut tracker = WinnerTracker::new();
        let snapshot = WinnerSnapshot::new()
            .with(PrizeType::QuickFive, ["1", "2"])
            .with(PrizeType::Corners, ["3"]);

        assert_eq!(tracker.diff(snapshot.clone(), &BookingDirectory::new()).len(), 3);
        assert!(tracker.diff(snapshot, &BookingDirectory::new()).is_empty());
    }

    #[test]
    fn test_shrinking_lists_emit_nothing() {
        let mut tracker = WinnerTracker::new();
        tracker.prime(
            WinnerSnapshot::new()
                .with(PrizeType::TopLine, ["1", "2", "3"])
                .with(PrizeType::Corners, ["4"]),
        );

        let events = tracker.diff(
            WinnerSnapshot::new().with(PrizeType::TopLine, ["2"]),
            &BookingDirectory::new(),
        );
        assert!(events.is_empty());
        assert_eq!(tracker.previous().get(PrizeType::TopLine).len(), 1);
        assert!(tracker.previous().get(PrizeType::Corners).is_empty());
    }

    #[test]
    fn test_removed_prize_announces_again_when_it_returns() {
        let mut tracker = WinnerTracker::new();
        let won = WinnerSnapshot::new().with(PrizeType::Corners, ["4"]);
        tracker.prime(won.clone());

        assert!(tracker.diff(WinnerSnapshot::new(), &BookingDirectory::new()).is_empty());
        assert_eq!(tracker.diff(won, &BookingDirectory::new()).len(), 1);
    }

    #[test]
    fn test_null_prize_entry_is_empty() {
        let mut tracker = WinnerTracker::new();
        let current = WinnerSnapshot::from_value(&json!({ "corners": null }));
        assert!(tracker.diff(current, &BookingDirectory::new()).is_empty());
    }

    #[test]
    fn test_events_are_ordered_by_prize_priority() {
        let mut tracker = WinnerTracker::new();
        let current = WinnerSnapshot::new()
            .with(PrizeType::QuickFive, ["5"])
            .with(PrizeType::FullHouse, ["6"])
            .with(PrizeType::Corners, ["7"]);
        let events = tracker.diff(current, &BookingDirectory::new());
        assert_eq!(
            keys(&events),
            vec![(PrizeType::FullHouse, "6"), (PrizeType::Corners, "7"), (PrizeType::QuickFive, "5")]
        );
    }

    #[test]
    fn test_names_resolved_through_directory() {
        let mut tracker = WinnerTracker::new();
        let directory = BookingDirectory::new()
            .with_booking("47", "Priya")
            .with_player("Dev", ["9"]);
        let current = WinnerSnapshot::new()
            .with(PrizeType::FullHouse, ["47"])
            .with(PrizeType::TopLine, ["9", "10"]);

        let events = tracker.diff(current, &directory);
        assert_eq!(events[0].player_name.as_deref(), Some("Priya"));
        assert_eq!(events[1].player_name.as_deref(), Some("Dev"));
        assert_eq!(events[2].player_name, None);
        assert_eq!(events[2].display_name(), UNKNOWN_PLAYER);
    }

    #[test]
    fn test_reset_forgets_previous() {
        let mut tracker = WinnerTracker::new();
        let snapshot = WinnerSnapshot::new().with(PrizeType::HalfSheet, ["2"]);
        tracker.diff(snapshot.clone(), &BookingDirectory::new());
        tracker.reset();
        assert_eq!(tracker.diff(snapshot, &BookingDirectory::new()).len(), 1);
    }
}
