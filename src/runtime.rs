use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Live metrics are due for recomputation.
    Tick,
}

/// Source of app events (keyboard, resize, metrics ticks)
pub trait AppEventSource: 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;

    /// Sender that timers use to post ticks into the same stream.
    fn sender(&self) -> Sender<AppEvent>;
}

/// Production event source: a crossterm reader thread feeding a channel
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => key_tx.send(AppEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => key_tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    log::warn!("terminal input closed: {e}");
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Test event source for unit and headless tests
pub struct TestEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Posts `AppEvent::Tick` on a fixed interval until cancelled.
///
/// Cancellation happens once, either through `cancel` or on drop, and waits
/// for the thread to exit so no tick is sent afterwards.
#[derive(Debug)]
pub struct MetricsTimer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MetricsTimer {
    pub fn start(tx: Sender<AppEvent>, interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            // Short naps keep cancellation latency low for long intervals.
            let nap = interval.min(Duration::from_millis(10));
            let mut since_tick = Duration::ZERO;

            while !thread_stop.load(Ordering::Acquire) {
                thread::sleep(nap);
                since_tick += nap;
                if since_tick < interval {
                    continue;
                }
                since_tick = Duration::ZERO;
                if thread_stop.load(Ordering::Acquire) || tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        log::debug!("metrics timer started ({interval:?})");
        Self {
            stop,
            handle: Some(handle),
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.store(true, Ordering::Release);
            if handle.join().is_err() {
                log::warn!("metrics timer thread panicked");
            }
            log::debug!("metrics timer cancelled");
        }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: AppEventSource> {
    event_source: E,
    idle_timeout: Duration,
}

impl<E: AppEventSource> Runner<E> {
    pub fn new(event_source: E, idle_timeout: Duration) -> Self {
        Self {
            event_source,
            idle_timeout,
        }
    }

    /// Blocks up to the idle timeout; `None` when nothing arrived.
    pub fn step(&self) -> Option<AppEvent> {
        match self.event_source.recv_timeout(self.idle_timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.event_source.sender()
    }
}
