//! Auction countdown for the draft room.
//!
//! A countdown walks a nomination through three phases, each held for the
//! league's timer duration:
//!
//! ```text
//! idle ──start()──→ goingOnce ──→ goingTwice ──→ sold ──→ idle
//!                       │              │
//!                       └───clear()────┴──────────────────→ idle
//! ```
//!
//! # Integration
//!
//! The countdown is owned by the room actor and polled from its
//! `tokio::select!` loop. While idle, [`Countdown::wait_for_advance`] pends
//! forever, so the branch simply never fires:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* may call countdown.start()/clear() */ }
//!         phase = countdown.wait_for_advance() => {
//!             /* broadcast the new phase; resolve the sale on Sold */
//!         }
//!     }
//! }
//! ```
//!
//! No lock is held and no task is spawned, so cancelling is just clearing a
//! field and a command is never blocked behind a pending transition.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace};

/// Default hold time for each phase.
pub const DEFAULT_PHASE_DURATION: Duration = Duration::from_secs(10);

/// A running countdown's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    GoingOnce,
    GoingTwice,
    /// Terminal. The countdown is idle again once this is reported.
    Sold,
}

impl CountdownPhase {
    fn next(self) -> Self {
        match self {
            Self::GoingOnce => Self::GoingTwice,
            Self::GoingTwice | Self::Sold => Self::Sold,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Running {
    phase: CountdownPhase,
    /// When the next transition fires (Tokio instant for `sleep_until`).
    deadline: Instant,
}

/// A cancellable going-once / going-twice / sold countdown.
///
/// One per room. At most one countdown runs at a time.
#[derive(Debug)]
pub struct Countdown {
    phase_duration: Duration,
    running: Option<Running>,
}

impl Countdown {
    /// Creates an idle countdown whose phases each last `phase_duration`.
    pub fn new(phase_duration: Duration) -> Self {
        Self {
            phase_duration,
            running: None,
        }
    }

    /// Creates an idle countdown with whole-second phases.
    pub fn with_secs(secs: u32) -> Self {
        Self::new(Duration::from_secs(u64::from(secs)))
    }

    /// Starts the countdown in [`CountdownPhase::GoingOnce`].
    ///
    /// Returns `None` without touching the deadline if a countdown is
    /// already running.
    pub fn start(&mut self) -> Option<CountdownPhase> {
        if self.running.is_some() {
            trace!("countdown already running, start ignored");
            return None;
        }
        let phase = CountdownPhase::GoingOnce;
        self.running = Some(Running {
            phase,
            deadline: Instant::now() + self.phase_duration,
        });
        debug!(phase_secs = self.phase_duration.as_secs(), "countdown started");
        Some(phase)
    }

    /// Cancels any pending transition. Returns `true` if one was pending.
    pub fn clear(&mut self) -> bool {
        let was_running = self.running.take().is_some();
        if was_running {
            debug!("countdown cleared");
        }
        was_running
    }

    /// Waits for the next phase transition and applies it.
    ///
    /// Pends forever while idle. Cancel-safe: dropping the future before it
    /// resolves leaves the countdown untouched.
    pub async fn wait_for_advance(&mut self) -> CountdownPhase {
        let Some(running) = self.running else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(running.deadline).await;

        let phase = running.phase.next();
        if phase == CountdownPhase::Sold {
            self.running = None;
        } else {
            self.running = Some(Running {
                phase,
                deadline: running.deadline + self.phase_duration,
            });
        }
        debug!(?phase, "countdown advanced");
        phase
    }

    /// `true` while a countdown is in progress.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The current phase, or `None` when idle.
    pub fn phase(&self) -> Option<CountdownPhase> {
        self.running.map(|r| r.phase)
    }

    /// Time left until the next transition, or `None` when idle.
    pub fn remaining(&self) -> Option<Duration> {
        self.running
            .map(|r| r.deadline.saturating_duration_since(Instant::now()))
    }

    /// How long each phase lasts.
    pub fn phase_duration(&self) -> Duration {
        self.phase_duration
    }

    /// Changes the phase length. Takes effect from the next transition.
    pub fn set_phase_duration(&mut self, phase_duration: Duration) {
        self.phase_duration = phase_duration;
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_PHASE_DURATION)
    }
}
