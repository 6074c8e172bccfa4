//! Async driver for [`PhaseEngine`].
//!
//! `PhaseScheduler` is a cloneable handle. Collaborators receive it explicitly
//! and either call the command methods or [`dispatch`](PhaseScheduler::dispatch)
//! a parsed [`Command`].
//!
//! At most one tick source is in flight. Every command that starts a
//! countdown cancels the previous source under the state lock, bumps the
//! generation, mutates the engine and only then spawns the new source. A tick
//! re-checks its generation under the same lock before touching the engine,
//! so a cancelled source can never mutate state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::engine::{PhaseEngine, SchedulerSnapshot};
use super::phase::{Phase, PhaseDurations};
use crate::command::Command;
use crate::error::{CoreError, Result};
use crate::events::Event;

/// Period between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const EVENT_BUFFER: usize = 64;

struct TickSource {
    generation: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TickSource {
    fn stop(self) {
        self.cancel.cancel();
        self.task.abort();
        debug!(generation = self.generation, "tick source cancelled");
    }
}

struct Inner {
    engine: PhaseEngine,
    ticker: Option<TickSource>,
    generation: u64,
}

impl Inner {
    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        self.generation += 1;
    }
}

struct Shared {
    inner: Mutex<Inner>,
    events: broadcast::Sender<Event>,
    state: watch::Sender<SchedulerSnapshot>,
    runtime: Handle,
    live_sources: Arc<AtomicUsize>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, engine: &PhaseEngine, event: Option<&Event>) {
        self.state.send_replace(engine.snapshot());
        if let Some(event) = event {
            if let Event::PhaseStarted { phase, cause, .. } = event {
                info!(phase = %phase, ?cause, "phase started");
            }
            // No subscribers is fine.
            let _ = self.events.send(event.clone());
        }
    }

    /// Returns false once the calling source is stale.
    fn on_tick(&self, generation: u64) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation || !inner.engine.is_running() {
            return false;
        }
        let event = inner.engine.tick();
        self.publish(&inner.engine, event.as_ref());
        true
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.stop_ticker();
    }
}

/// Decrements the live-source count when a tick task ends or is aborted.
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn new(count: Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(count)
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handle to the phase scheduler. Cloning shares the same scheduler.
#[derive(Clone)]
pub struct PhaseScheduler {
    shared: Arc<Shared>,
}

impl PhaseScheduler {
    /// Create a paused focus scheduler with the default durations.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NoRuntime` when called outside a tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_durations(PhaseDurations::default())
    }

    /// # Errors
    ///
    /// Returns `CoreError::NoRuntime` when called outside a tokio runtime.
    pub fn with_durations(durations: PhaseDurations) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CoreError::NoRuntime)?;
        let engine = PhaseEngine::with_durations(durations);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (state, _) = watch::channel(engine.snapshot());
        Ok(Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    engine,
                    ticker: None,
                    generation: 0,
                }),
                events,
                state,
                runtime,
                live_sources: Arc::new(AtomicUsize::new(0)),
            }),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> SchedulerSnapshot {
        self.shared.lock().engine.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().engine.phase()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.shared.lock().engine.remaining_secs()
    }

    pub fn remaining_text(&self) -> String {
        self.shared.lock().engine.remaining_text()
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().engine.is_running()
    }

    pub fn skip_visible(&self) -> bool {
        self.shared.lock().engine.skip_visible()
    }

    /// Whether a tick source is currently installed. Diagnostics only.
    pub fn has_tick_source(&self) -> bool {
        self.shared.lock().ticker.is_some()
    }

    /// Number of tick tasks that have not yet been torn down. Diagnostics only.
    pub fn active_tick_sources(&self) -> usize {
        self.shared.live_sources.load(Ordering::SeqCst)
    }

    /// Runtime captured at construction; collaborators spawn onto it.
    pub(crate) fn runtime(&self) -> &Handle {
        &self.shared.runtime
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    /// Watch the observable state; updated after every mutation and tick.
    pub fn watch(&self) -> watch::Receiver<SchedulerSnapshot> {
        self.shared.state.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_focus(&self) -> Event {
        self.restart(PhaseEngine::start_focus)
    }

    pub fn pause(&self) -> Option<Event> {
        self.transition_if(PhaseEngine::is_running, PhaseEngine::pause)
    }

    /// Restart ticking from the frozen remaining value.
    pub fn resume(&self) -> Option<Event> {
        self.transition_if(|engine| !engine.is_running(), PhaseEngine::resume)
    }

    pub fn toggle_pause(&self) -> Option<Event> {
        self.transition_if(|_| true, PhaseEngine::toggle_pause)
    }

    pub fn reset(&self) -> Event {
        self.restart(PhaseEngine::reset)
    }

    pub fn skip_break(&self) -> Event {
        self.restart(PhaseEngine::skip_break)
    }

    /// Route an external command. Never fails.
    pub fn dispatch(&self, command: Command) -> Option<Event> {
        debug!(%command, "dispatching command");
        match command {
            Command::StartFocus => Some(self.start_focus()),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::TogglePause => self.toggle_pause(),
            Command::Reset => Some(self.reset()),
            Command::SkipBreak => Some(self.skip_break()),
        }
    }

    /// Pause and release the tick source.
    pub fn shutdown(&self) {
        let mut inner = self.shared.lock();
        inner.stop_ticker();
        let event = inner.engine.pause();
        self.shared.publish(&inner.engine, event.as_ref());
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn restart<F>(&self, f: F) -> Event
    where
        F: FnOnce(&mut PhaseEngine) -> Event,
    {
        let mut inner = self.shared.lock();
        inner.stop_ticker();
        let event = f(&mut inner.engine);
        self.commit(&mut inner, Some(&event));
        event
    }

    /// Like `restart`, but leaves the tick source alone when `applies`
    /// says the command is a no-op in the current state.
    fn transition_if<P, F>(&self, applies: P, f: F) -> Option<Event>
    where
        P: FnOnce(&PhaseEngine) -> bool,
        F: FnOnce(&mut PhaseEngine) -> Option<Event>,
    {
        let mut inner = self.shared.lock();
        if !applies(&inner.engine) {
            return None;
        }
        inner.stop_ticker();
        let event = f(&mut inner.engine);
        self.commit(&mut inner, event.as_ref());
        event
    }

    fn commit(&self, inner: &mut Inner, event: Option<&Event>) {
        if inner.engine.is_running() {
            let generation = inner.generation;
            inner.ticker = Some(spawn_ticker(&self.shared, generation));
        }
        self.shared.publish(&inner.engine, event);
    }
}

fn spawn_ticker(shared: &Arc<Shared>, generation: u64) -> TickSource {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let weak = Arc::downgrade(shared);
    let guard = LiveGuard::new(Arc::clone(&shared.live_sources));
    // First tick one full period after the command, not immediately.
    let first = Instant::now() + TICK_PERIOD;

    let task = shared.runtime.spawn(async move {
        let _guard = guard;
        let mut ticker = interval_at(first, TICK_PERIOD);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(shared) = weak.upgrade() else { break };
                    if !shared.on_tick(generation) {
                        break;
                    }
                }
            }
        }
        debug!(generation, "tick source stopped");
    });

    debug!(generation, "tick source started");
    TickSource {
        generation,
        cancel,
        task,
    }
}
