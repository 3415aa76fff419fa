//! The scheduler: module registry, tick thread, and state machine.
//!
//! The engine owns an ordered list of modules and drives them from one
//! dedicated thread at a fixed tick interval. Module updates within a tick
//! are sequential; no cross-module synchronization is needed. External
//! threads interact with modules through the modules' own locked entry
//! points and with the engine through a [`StopHandle`].

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use conqueror_core::error::{EngineError, Result};

use crate::module::Module;

/// Lifecycle states of the engine.
///
/// Transitions: `Uninitialized -> Initialized -> Running -> Stopping ->
/// Shutdown`. The tick loop performs `Running -> Stopping` itself when its
/// tick budget is exhausted; [`StopHandle::request_stop`] does the same from
/// any thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineState {
    /// Constructed, modules may still be registered.
    Uninitialized = 0,
    /// All modules initialized successfully.
    Initialized = 1,
    /// Tick loop running on its dedicated thread.
    Running = 2,
    /// Stop observed or requested; the loop exits at the next tick boundary.
    Stopping = 3,
    /// Loop joined and modules shut down.
    Shutdown = 4,
}

impl EngineState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Initialized,
            2 => Self::Running,
            3 => Self::Stopping,
            _ => Self::Shutdown,
        }
    }
}

/// State shared between the engine, its tick thread, and stop handles.
#[derive(Debug)]
struct SharedState {
    state: AtomicU8,
    ticks: AtomicU64,
}

impl SharedState {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(EngineState::Uninitialized as u8),
            ticks: AtomicU64::new(0),
        }
    }

    fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: EngineState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn transition(&self, from: EngineState, to: EngineState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Cloneable handle for observing and stopping a running engine from other
/// threads (e.g. the console router).
#[derive(Debug, Clone)]
pub struct StopHandle {
    shared: Arc<SharedState>,
}

impl StopHandle {
    /// Request the tick loop to stop at the next tick boundary.
    ///
    /// Returns `true` if this call performed the `Running -> Stopping`
    /// transition; `false` if the engine was not running.
    pub fn request_stop(&self) -> bool {
        let stopped = self
            .shared
            .transition(EngineState::Running, EngineState::Stopping);
        if stopped {
            tracing::info!("engine stop requested");
        }
        stopped
    }

    /// Current engine state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.shared.state()
    }

    /// True while the tick loop is live.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.state() == EngineState::Running
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.shared.ticks.load(Ordering::Acquire)
    }
}

/// The module scheduler.
pub struct Engine {
    modules: Vec<Arc<dyn Module>>,
    shared: Arc<SharedState>,
    tick_interval: Duration,
    tick_budget: Option<u64>,
    loop_handle: Option<JoinHandle<()>>,
}

impl Engine {
    /// Create an engine ticking at the given interval.
    #[must_use]
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            modules: Vec::new(),
            shared: Arc::new(SharedState::new()),
            tick_interval,
            tick_budget: None,
            loop_handle: None,
        }
    }

    /// Stop the loop automatically after `ticks` iterations.
    #[must_use]
    pub fn with_tick_budget(mut self, ticks: u64) -> Self {
        self.tick_budget = Some(ticks);
        self
    }

    /// Register a module. Registration order defines init and per-tick
    /// update order; shutdown runs in reverse.
    pub fn register(&mut self, module: Arc<dyn Module>) -> Result<()> {
        if self.shared.state() != EngineState::Uninitialized {
            return Err(EngineError::InvalidState(
                "modules can only be registered before init".into(),
            ));
        }
        tracing::debug!(module = module.name(), "module registered");
        self.modules.push(module);
        Ok(())
    }

    /// Initialize every registered module in registration order.
    ///
    /// The first failure aborts the sequence: modules initialized so far are
    /// shut down in reverse order and the error is returned. The engine
    /// never runs partially initialized.
    pub fn init(&mut self) -> Result<()> {
        if self.shared.state() != EngineState::Uninitialized {
            return Err(EngineError::InvalidState(format!(
                "init called in state {:?}",
                self.shared.state()
            )));
        }

        for (index, module) in self.modules.iter().enumerate() {
            if let Err(err) = module.init() {
                tracing::error!(module = module.name(), %err, "module failed to initialize");
                for initialized in self.modules[..index].iter().rev() {
                    initialized.shutdown();
                }
                return Err(EngineError::ModuleInit {
                    module: module.name().to_string(),
                    reason: err.to_string(),
                });
            }
            tracing::info!(module = module.name(), "module initialized");
        }

        self.shared.set_state(EngineState::Initialized);
        Ok(())
    }

    /// Start the tick loop on its dedicated thread.
    pub fn run(&mut self) -> Result<()> {
        if !self
            .shared
            .transition(EngineState::Initialized, EngineState::Running)
        {
            return Err(EngineError::InvalidState(format!(
                "run called in state {:?}",
                self.shared.state()
            )));
        }

        let modules: Vec<Arc<dyn Module>> = self.modules.clone();
        let shared = Arc::clone(&self.shared);
        let interval = self.tick_interval;
        let budget = self.tick_budget;

        let handle = std::thread::Builder::new()
            .name("engine-tick".into())
            .spawn(move || tick_loop(&modules, &shared, interval, budget))
            .map_err(|err| EngineError::InvalidState(format!("failed to spawn tick loop: {err}")))?;

        self.loop_handle = Some(handle);
        tracing::info!(?interval, "engine running");
        Ok(())
    }

    /// Handle for observing and stopping the engine from other threads.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Current engine state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.shared.state()
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.shared.ticks.load(Ordering::Acquire)
    }

    /// Block until the tick loop exits (tick budget reached or stop
    /// requested). No-op if the loop never started.
    pub fn wait(&mut self) {
        if let Some(handle) = self.loop_handle.take() {
            let _ = handle.join();
        }
    }

    /// Stop the loop, join its thread, and shut every module down in
    /// reverse registration order. Idempotent.
    pub fn shutdown(&mut self) {
        self.shared
            .transition(EngineState::Running, EngineState::Stopping);
        self.wait();

        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "module shutting down");
            module.shutdown();
        }
        self.modules.clear();
        self.shared.set_state(EngineState::Shutdown);
        tracing::info!(ticks = self.tick_count(), "engine shut down");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if !matches!(
            self.shared.state(),
            EngineState::Uninitialized | EngineState::Shutdown
        ) {
            self.shutdown();
        }
    }
}

/// The fixed-rate tick loop body.
fn tick_loop(
    modules: &[Arc<dyn Module>],
    shared: &SharedState,
    interval: Duration,
    budget: Option<u64>,
) {
    let mut completed: u64 = 0;
    while shared.state() == EngineState::Running {
        let started = Instant::now();

        for module in modules {
            module.update();
        }

        completed += 1;
        shared.ticks.store(completed, Ordering::Release);

        if budget.is_some_and(|limit| completed >= limit) {
            shared.transition(EngineState::Running, EngineState::Stopping);
            tracing::info!(ticks = completed, "tick budget exhausted");
            break;
        }

        // Fixed-rate cadence; a slow tick skips its sleep instead of
        // accumulating debt.
        if let Some(remaining) = interval.checked_sub(started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Probe module recording every lifecycle call into a shared journal.
    struct ProbeModule {
        name: &'static str,
        journal: Arc<Mutex<Vec<String>>>,
        fail_init: bool,
        updates: AtomicU64,
    }

    impl ProbeModule {
        fn new(name: &'static str, journal: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                journal,
                fail_init: false,
                updates: AtomicU64::new(0),
            })
        }

        fn failing(name: &'static str, journal: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                journal,
                fail_init: true,
                updates: AtomicU64::new(0),
            })
        }

        fn record(&self, event: &str) {
            self.journal
                .lock()
                .unwrap()
                .push(format!("{}:{event}", self.name));
        }
    }

    impl Module for ProbeModule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn init(&self) -> Result<()> {
            self.record("init");
            if self.fail_init {
                return Err(EngineError::InvalidConfig("probe told to fail".into()));
            }
            Ok(())
        }

        fn update(&self) {
            self.updates.fetch_add(1, Ordering::Relaxed);
        }

        fn shutdown(&self) {
            self.record("shutdown");
        }
    }

    fn journal() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_init_order_and_reverse_shutdown() {
        let log = journal();
        let mut engine = Engine::new(Duration::from_millis(1));
        engine.register(ProbeModule::new("a", Arc::clone(&log))).unwrap();
        engine.register(ProbeModule::new("b", Arc::clone(&log))).unwrap();
        engine.register(ProbeModule::new("c", Arc::clone(&log))).unwrap();

        engine.init().unwrap();
        engine.shutdown();

        let entries = log.lock().unwrap().clone();
        assert_eq!(
            entries,
            vec!["a:init", "b:init", "c:init", "c:shutdown", "b:shutdown", "a:shutdown"]
        );
        assert_eq!(engine.state(), EngineState::Shutdown);
    }

    #[test]
    fn test_init_failure_aborts_and_unwinds() {
        let log = journal();
        let mut engine = Engine::new(Duration::from_millis(1));
        engine.register(ProbeModule::new("a", Arc::clone(&log))).unwrap();
        engine.register(ProbeModule::failing("bad", Arc::clone(&log))).unwrap();
        engine.register(ProbeModule::new("never", Arc::clone(&log))).unwrap();

        let err = engine.init().unwrap_err();
        assert!(matches!(err, EngineError::ModuleInit { ref module, .. } if module == "bad"));

        // The module after the failure was never touched; the one before it
        // was unwound.
        let entries = log.lock().unwrap().clone();
        assert_eq!(entries, vec!["a:init", "bad:init", "a:shutdown"]);
        assert_eq!(engine.state(), EngineState::Uninitialized);
    }

    #[test]
    fn test_run_requires_init() {
        let mut engine = Engine::new(Duration::from_millis(1));
        assert!(engine.run().is_err());
    }

    #[test]
    fn test_register_after_init_rejected() {
        let log = journal();
        let mut engine = Engine::new(Duration::from_millis(1));
        engine.register(ProbeModule::new("a", Arc::clone(&log))).unwrap();
        engine.init().unwrap();

        let err = engine.register(ProbeModule::new("late", log)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }

    #[test]
    fn test_tick_budget_stops_loop() {
        let log = journal();
        let probe = ProbeModule::new("counted", log);
        let mut engine = Engine::new(Duration::from_millis(1)).with_tick_budget(25);
        engine.register(Arc::clone(&probe) as Arc<dyn Module>).unwrap();

        engine.init().unwrap();
        engine.run().unwrap();
        engine.wait();

        assert_eq!(engine.state(), EngineState::Stopping);
        assert_eq!(engine.tick_count(), 25);
        assert_eq!(probe.updates.load(Ordering::Relaxed), 25);

        engine.shutdown();
        assert_eq!(engine.state(), EngineState::Shutdown);
    }

    #[test]
    fn test_stop_handle_interrupts_loop() {
        let log = journal();
        let mut engine = Engine::new(Duration::from_millis(1));
        engine.register(ProbeModule::new("a", log)).unwrap();

        engine.init().unwrap();
        engine.run().unwrap();
        let handle = engine.stop_handle();
        assert!(handle.is_running());

        assert!(handle.request_stop());
        engine.wait();
        assert_eq!(engine.state(), EngineState::Stopping);

        // A second request is a no-op.
        assert!(!handle.request_stop());
        engine.shutdown();
    }

    #[test]
    fn test_updates_run_in_registration_order() {
        // Modules that append their name per update; after one tick the
        // journal must read in registration order.
        struct OrderProbe {
            name: &'static str,
            journal: Arc<Mutex<Vec<String>>>,
        }
        impl Module for OrderProbe {
            fn name(&self) -> &'static str {
                self.name
            }
            fn init(&self) -> Result<()> {
                Ok(())
            }
            fn update(&self) {
                self.journal.lock().unwrap().push(self.name.to_string());
            }
            fn shutdown(&self) {}
        }

        let log = journal();
        let mut engine = Engine::new(Duration::from_millis(1)).with_tick_budget(1);
        for name in ["first", "second", "third"] {
            engine
                .register(Arc::new(OrderProbe {
                    name,
                    journal: Arc::clone(&log),
                }))
                .unwrap();
        }

        engine.init().unwrap();
        engine.run().unwrap();
        engine.wait();
        engine.shutdown();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }
}
