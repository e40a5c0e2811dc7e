//! Progress broadcasting to live subscribers and attached sinks.
//!
//! The broadcaster keeps the latest snapshot and a subscriber set behind
//! one mutex. Each subscriber owns a small drop-oldest queue, so a slow
//! consumer observes fewer intermediate snapshots but always the terminal
//! one, and the producer never blocks. Duplicate `(progress, status)`
//! snapshots are suppressed; terminal events detach every subscriber.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::warn;

use simufisc_core::models::{ProgressEvent, ProgressSnapshot, SimulationStatus};
use simufisc_core::streaming::{BoundedChannel, OverflowPolicy};
use simufisc_core::traits::ProgressSink;

/// Queue depth per subscriber before coalescing kicks in.
const SUBSCRIBER_QUEUE_CAPACITY: usize = 32;

/// Wall-clock interval between heartbeat events.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Publishes per-run progress snapshots to subscribers and sinks.
pub struct ProgressBroadcaster {
    simulation_id: String,
    state: Mutex<BroadcastState>,
}

struct BroadcastState {
    latest: Option<ProgressSnapshot>,
    last_key: Option<(u8, SimulationStatus)>,
    subscribers: Vec<BoundedChannel<ProgressEvent>>,
    sinks: Vec<Box<dyn ProgressSink>>,
    closed: bool,
}

impl ProgressBroadcaster {
    pub fn new(simulation_id: impl Into<String>) -> Self {
        Self {
            simulation_id: simulation_id.into(),
            state: Mutex::new(BroadcastState {
                latest: None,
                last_key: None,
                subscribers: Vec::new(),
                sinks: Vec::new(),
                closed: false,
            }),
        }
    }

    pub fn simulation_id(&self) -> &str {
        &self.simulation_id
    }

    /// Attach a live subscriber.
    ///
    /// Late subscribers receive the latest snapshot immediately, then
    /// follow the stream until the terminal event.
    pub fn subscribe(&self) -> ProgressSubscription {
        let mut state = self.lock_state();
        let channel = BoundedChannel::new(SUBSCRIBER_QUEUE_CAPACITY, OverflowPolicy::DropOldest);
        if let Some(latest) = &state.latest {
            channel.send(event_for(latest));
        }
        if state.closed {
            channel.close();
        } else {
            state.subscribers.push(channel.clone());
        }
        ProgressSubscription {
            channel,
            finished: false,
        }
    }

    /// Attach a fire-and-forget sink receiving every delivered event.
    pub fn attach_sink(&self, sink: Box<dyn ProgressSink>) {
        self.lock_state().sinks.push(sink);
    }

    /// Publish one snapshot.
    ///
    /// Non-terminal snapshots repeating the last `(progress, status)` pair
    /// are dropped. A terminal snapshot closes the stream: its event is
    /// delivered and every subscriber is detached.
    pub fn publish(&self, snapshot: ProgressSnapshot) {
        let mut state = self.lock_state();
        if state.closed {
            return;
        }
        let key = (snapshot.progress, snapshot.status);
        let terminal = snapshot.status.is_terminal();
        if !terminal && state.last_key == Some(key) {
            return;
        }

        let event = event_for(&snapshot);
        state.latest = Some(snapshot);
        state.last_key = Some(key);
        Self::fan_out(&mut state, &event);

        if terminal {
            state.closed = true;
            for subscriber in state.subscribers.drain(..) {
                subscriber.close();
            }
        }
    }

    /// Emit a liveness event without progress change.
    pub fn heartbeat(&self) {
        let mut state = self.lock_state();
        if state.closed {
            return;
        }
        Self::fan_out(&mut state, &ProgressEvent::Heartbeat);
    }

    /// Latest snapshot, for poll-style clients.
    pub fn latest_snapshot(&self) -> Option<ProgressSnapshot> {
        self.lock_state().latest.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_state().subscribers.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    /// Spawn a thread emitting heartbeats at `interval` until the returned
    /// handle is dropped or the stream closes.
    pub fn start_heartbeat(self: &Arc<Self>, interval: Duration) -> HeartbeatHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let broadcaster = Arc::clone(self);
        let flag = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            const TICK: Duration = Duration::from_millis(25);
            let mut elapsed = Duration::ZERO;
            loop {
                thread::sleep(TICK.min(interval));
                if flag.load(Ordering::SeqCst) || broadcaster.is_closed() {
                    break;
                }
                elapsed += TICK.min(interval);
                if elapsed >= interval {
                    elapsed = Duration::ZERO;
                    broadcaster.heartbeat();
                }
            }
        });
        HeartbeatHandle {
            stop,
            thread: Some(thread),
        }
    }

    fn fan_out(state: &mut BroadcastState, event: &ProgressEvent) {
        for subscriber in &state.subscribers {
            subscriber.send(event.clone());
        }
        for sink in &mut state.sinks {
            if let Err(error) = sink.publish(event) {
                warn!(%error, "progress sink rejected event");
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BroadcastState> {
        self.state.lock().expect("broadcaster lock poisoned")
    }
}

/// Map a snapshot to its wire event.
fn event_for(snapshot: &ProgressSnapshot) -> ProgressEvent {
    match snapshot.status {
        SimulationStatus::Completed => ProgressEvent::Completed(snapshot.clone()),
        SimulationStatus::Failed => ProgressEvent::Error {
            message: snapshot
                .message
                .clone()
                .unwrap_or_else(|| "simulation failed".to_string()),
        },
        _ => ProgressEvent::Progress(snapshot.clone()),
    }
}

/// Subscriber handle yielding events until the terminal one.
pub struct ProgressSubscription {
    channel: BoundedChannel<ProgressEvent>,
    finished: bool,
}

impl ProgressSubscription {
    /// Next event, waiting at most `timeout`.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<ProgressEvent> {
        if self.finished {
            return None;
        }
        let event = self.channel.recv_timeout(timeout)?;
        if event.is_terminal() {
            self.finished = true;
        }
        Some(event)
    }
}

impl Iterator for ProgressSubscription {
    type Item = ProgressEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let event = self.channel.recv()?;
        if event.is_terminal() {
            self.finished = true;
        }
        Some(event)
    }
}

/// Stops the heartbeat thread when dropped.
pub struct HeartbeatHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
