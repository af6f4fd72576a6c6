// src/queue.rs
// Priority queue of pending announcements with a single drain task that
// plays them one at a time.
//
// State machine: Idle -> Draining -> Idle. Muting is an orthogonal flag that
// empties the queue and interrupts the drain task without changing the
// Idle/Draining bookkeeping.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::time::sleep;

use crate::announcement::Announcement;
use crate::player::AnnouncementPlayer;

#[derive(Default)]
struct QueueState {
    pending: Vec<Announcement>,
    draining: bool,
    muted: bool,
}

struct QueueInner {
    state: Mutex<QueueState>,
    player: Arc<AnnouncementPlayer>,
    // Bumped on every mute; the drain task abandons its current wait when it changes.
    interrupt: watch::Sender<u64>,
    idle: watch::Sender<bool>,
}

impl QueueInner {
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn drain(self: Arc<Self>) {
        let mut interrupt = self.interrupt.subscribe();
        log::debug!("Announcement drain started");

        loop {
            let next = {
                let mut state = self.state();
                // Read under the lock so a mute racing with this pop is not lost.
                interrupt.borrow_and_update();
                if state.pending.is_empty() {
                    state.draining = false;
                    self.idle.send_replace(true);
                    None
                } else {
                    Some(state.pending.remove(0))
                }
            };
            let Some(announcement) = next else {
                break;
            };

            log::info!("Announcing (priority {}): {}", announcement.priority(), announcement.message());
            tokio::select! {
                _ = self.player.play(&announcement) => {}
                _ = interrupt.changed() => {
                    log::debug!("Announcement interrupted: {}", announcement.message());
                    continue;
                }
            }

            tokio::select! {
                _ = sleep(announcement.inter_announcement_delay()) => {}
                _ = interrupt.changed() => {}
            }
        }

        log::debug!("Announcement drain finished");
    }
}

/// Cheap to clone; all clones share the same queue.
#[derive(Clone)]
pub struct AnnouncementQueue {
    inner: Arc<QueueInner>,
}

impl AnnouncementQueue {
    pub fn new(player: Arc<AnnouncementPlayer>) -> Self {
        let (interrupt, _) = watch::channel(0u64);
        let (idle, _) = watch::channel(true);
        AnnouncementQueue {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                player,
                interrupt,
                idle,
            }),
        }
    }

    /// Queue an announcement and start draining if nothing is playing.
    ///
    /// Pending items stay sorted by descending priority, equal priorities in
    /// arrival order. Dropped silently while muted or when an announcement
    /// for the same event is still waiting. Must be called from within a
    /// tokio runtime.
    pub fn enqueue(&self, announcement: Announcement) {
        let start_drain = {
            let mut state = self.inner.state();
            if state.muted {
                log::debug!("Muted, dropping: {}", announcement.message());
                return;
            }
            if state.pending.iter().any(|pending| pending.key() == announcement.key()) {
                log::debug!("Already queued, dropping: {}", announcement.message());
                return;
            }
            state.pending.push(announcement);
            // sort_by is stable, which keeps arrival order among ties
            state.pending.sort_by(|a, b| b.priority().cmp(&a.priority()));

            if state.draining {
                false
            } else {
                state.draining = true;
                self.inner.idle.send_replace(false);
                true
            }
        };

        if start_drain {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(inner.drain());
        }
    }

    /// Drop everything pending, stop what is playing, refuse new items.
    pub fn mute(&self) {
        let dropped = {
            let mut state = self.inner.state();
            state.muted = true;
            let dropped = state.pending.len();
            state.pending.clear();
            self.inner.player.set_muted(true);
            self.inner.interrupt.send_modify(|generation| *generation += 1);
            dropped
        };
        self.inner.player.cancel();
        log::info!("Announcements muted ({dropped} pending dropped)");
    }

    pub fn unmute(&self) {
        let mut state = self.inner.state();
        state.muted = false;
        self.inner.player.set_muted(false);
        log::info!("Announcements unmuted");
    }

    /// Returns the new muted state
    pub fn toggle_mute(&self) -> bool {
        if self.is_muted() {
            self.unmute();
            false
        } else {
            self.mute();
            true
        }
    }

    pub fn is_muted(&self) -> bool {
        self.inner.state().muted
    }

    pub fn is_draining(&self) -> bool {
        self.inner.state().draining
    }

    /// Number of announcements waiting, not counting the one playing
    pub fn len(&self) -> usize {
        self.inner.state().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Messages waiting, in playback order
    pub fn pending_messages(&self) -> Vec<String> {
        self.inner.state().pending.iter().map(|a| a.message().to_string()).collect()
    }

    /// Resolves once no drain task is running.
    pub async fn wait_idle(&self) {
        let mut idle = self.inner.idle.subscribe();
        let _ = idle.wait_for(|idle| *idle).await;
    }

    /// Mute and wait for the drain task to wind down.
    pub async fn shutdown(&self) {
        self.mute();
        self.wait_idle().await;
    }
}
