// src/announcer.rs
// Top-level composition of the announcement engine.
//
// The Announcer is built explicitly by the application and owns the winner
// tracker, the dispatcher and a handle to the queue. Every external update
// flows through it: diff -> dispatch -> enqueue, with celebrations fired for
// the biggest prizes.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use crate::booking::BookingDirectory;
use crate::celebration::Celebration;
use crate::diff::{WinnerEvent, WinnerTracker};
use crate::dispatcher::AnnouncementDispatcher;
use crate::player::AnnouncementPlayer;
use crate::queue::AnnouncementQueue;
use crate::snapshot::{GameState, WinnerSnapshot};

pub struct Announcer<R: Rng = StdRng> {
    tracker: WinnerTracker,
    dispatcher: AnnouncementDispatcher<R>,
    queue: AnnouncementQueue,
    celebration: Arc<dyn Celebration>,
    announce_numbers: bool,
    last_number: Option<u8>,
}

impl<R: Rng> Announcer<R> {
    pub fn new(
        player: Arc<AnnouncementPlayer>,
        dispatcher: AnnouncementDispatcher<R>,
        celebration: Arc<dyn Celebration>,
        announce_numbers: bool,
    ) -> Self {
        Announcer {
            tracker: WinnerTracker::new(),
            dispatcher,
            queue: AnnouncementQueue::new(player),
            celebration,
            announce_numbers,
            last_number: None,
        }
    }

    pub fn queue(&self) -> &AnnouncementQueue {
        &self.queue
    }

    pub fn tracker(&self) -> &WinnerTracker {
        &self.tracker
    }

    /// Treat everything in `state` as already announced (joining mid-game).
    pub fn prime(&mut self, state: &GameState) {
        self.tracker.prime(state.winners.clone());
        self.last_number = state.last_called();
        log::info!("Primed with {} existing winners", state.winners.winner_count());
    }

    /// Handle a complete winners snapshot. Returns the newly observed winners.
    pub fn on_snapshot(&mut self, snapshot: WinnerSnapshot, directory: &BookingDirectory) -> Vec<WinnerEvent> {
        let events = self.tracker.diff(snapshot, directory);
        for event in &events {
            log::info!(
                "New winner: {} - {} (ticket {})",
                event.prize.label(),
                event.display_name(),
                event.ticket_id
            );
            let Some(announcement) = self.dispatcher.dispatch(event) else {
                continue;
            };
            if event.prize.celebrates() {
                self.celebration.celebrate(event.prize, event.display_name());
            }
            self.queue.enqueue(announcement);
        }
        events
    }

    /// Read out a called number once, however many polls still report it.
    pub fn on_number_called(&mut self, number: u8) {
        if self.last_number == Some(number) {
            return;
        }
        self.last_number = Some(number);
        if !self.announce_numbers {
            return;
        }
        if let Some(announcement) = self.dispatcher.dispatch_number(number) {
            self.queue.enqueue(announcement);
        }
    }

    /// Handle one complete game node from the store.
    pub fn on_game_state(&mut self, state: GameState) -> Vec<WinnerEvent> {
        if let Some(number) = state.last_called() {
            self.on_number_called(number);
        }
        self.on_snapshot(state.winners, &state.directory)
    }

    /// Start over for a new game
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.dispatcher.reset();
        self.last_number = None;
    }

    pub fn toggle_mute(&self) -> bool {
        self.queue.toggle_mute()
    }

    /// Silence everything and wait for playback to stop.
    pub async fn shutdown(&self) {
        self.queue.shutdown().await;
        log::info!("Announcer stopped");
    }
}
