//! Snapshot acquisition loop
//!
//! One owner thread holds the channel selector and decides when to fetch.
//! Each fetch runs on a short-lived worker that reads the channel id once and
//! hands its outcome back over an mpsc channel, so command handling never
//! waits on the network. At most one fetch is in flight; a cadence tick that
//! lands while a fetch is still running is skipped rather than queued.

use crate::api::SnapshotSource;
use crate::error::{AcquisitionError, SelectError};
use crate::models::{Channel, Command, FetchOutcome, Frame};
use crate::selector::ChannelSelector;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_CADENCE: Duration = Duration::from_secs(1);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Where decoded frames end up
pub trait DisplaySink {
    fn show(&mut self, frame: &Frame, overlay: &str);

    fn close(&mut self);

    /// Operator-facing message (failed fetches, rejected channel ids)
    fn report(&mut self, _message: &str) {}
}

/// Non-blocking source of operator commands
pub trait CommandSource {
    /// Next pending command, waiting at most `timeout`
    fn poll(&mut self, timeout: Duration) -> Option<Command>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Outcome sent back by a fetch worker
struct Completed {
    channel_id: String,
    outcome: FetchOutcome,
}

pub struct Acquisition<S: SnapshotSource> {
    source: Arc<S>,
    selector: ChannelSelector,
    cadence: Duration,
    poll_interval: Duration,
    last_fetch: Option<Instant>,
    in_flight: bool,
    fetch_count: usize,
    stopped: bool,
    result_tx: Sender<Completed>,
    result_rx: Receiver<Completed>,
}

impl<S: SnapshotSource> Acquisition<S> {
    /// Refuses to start without at least one channel
    pub fn new(source: Arc<S>, channels: Vec<Channel>) -> Result<Self, AcquisitionError> {
        let selector = ChannelSelector::new(channels)?;
        let (result_tx, result_rx) = channel();
        Ok(Self {
            source,
            selector,
            cadence: DEFAULT_CADENCE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            last_fetch: None,
            in_flight: false,
            fetch_count: 0,
            stopped: false,
            result_tx,
            result_rx,
        })
    }

    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn selector(&self) -> &ChannelSelector {
        &self.selector
    }

    pub fn current(&self) -> &Channel {
        self.selector.current()
    }

    /// Number of fetches started so far
    pub fn fetch_count(&self) -> usize {
        self.fetch_count
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Time left until the next fetch is due
    pub fn until_due(&self, now: Instant) -> Duration {
        match self.last_fetch {
            Some(last) => self.cadence.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Apply an operator command
    pub fn handle(&mut self, command: Command) -> Result<Flow, SelectError> {
        if self.stopped {
            return Ok(Flow::Quit);
        }

        let switched = match command {
            Command::Quit => {
                self.stopped = true;
                log::info!("Quit requested after {} fetches", self.fetch_count);
                return Ok(Flow::Quit);
            }
            Command::Next => self.selector.next().clone(),
            Command::Previous => self.selector.previous().clone(),
            Command::JumpManual(id) => self.selector.jump_to(&id)?.clone(),
        };

        log::info!("Switched to channel {}", switched.id);
        // Show the new channel without waiting out the cadence
        self.last_fetch = None;
        Ok(Flow::Continue)
    }

    /// Deliver finished fetches to `sink`, then start a new fetch if one is due
    pub fn tick(&mut self, now: Instant, sink: &mut dyn DisplaySink) {
        if self.stopped {
            return;
        }

        loop {
            match self.result_rx.try_recv() {
                Ok(completed) => {
                    self.in_flight = false;
                    self.deliver(completed, sink);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if !self.in_flight && self.until_due(now).is_zero() {
            self.last_fetch = Some(now);
            self.spawn_fetch();
        }
    }

    fn spawn_fetch(&mut self) {
        let source = Arc::clone(&self.source);
        let tx = self.result_tx.clone();
        let channel_id = self.selector.current().id.clone();

        self.in_flight = true;
        self.fetch_count += 1;

        thread::spawn(move || {
            let outcome = source.fetch(&channel_id);
            // Receiver is gone once the loop has quit
            let _ = tx.send(Completed { channel_id, outcome });
        });
    }

    fn deliver(&mut self, completed: Completed, sink: &mut dyn DisplaySink) {
        let current = self.selector.current();
        if completed.channel_id != current.id {
            log::debug!(
                "Dropping result for channel {} (now on {})",
                completed.channel_id,
                current.id
            );
            return;
        }

        match completed.outcome {
            FetchOutcome::Success(frame) => {
                let overlay = frame.overlay_text(&current.label);
                sink.show(&frame, &overlay);
            }
            other => {
                let message = format!("Channel {}: {}", completed.channel_id, other.describe());
                log::warn!("{}", message);
                sink.report(&message);
            }
        }
    }

    /// Drive the loop until Quit, then close the sink
    pub fn run(&mut self, commands: &mut dyn CommandSource, sink: &mut dyn DisplaySink) {
        log::info!(
            "Polling channel {} every {:?}",
            self.selector.current().id,
            self.cadence
        );

        while !self.stopped {
            self.tick(Instant::now(), sink);

            let Some(command) = commands.poll(self.poll_interval) else {
                continue;
            };
            match self.handle(command) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    log::warn!("{}", e);
                    sink.report(&e.to_string());
                }
            }
        }

        sink.close();
    }
}

#[cfg(test)]
#[path = "acquisition_tests.rs"]
mod tests;
