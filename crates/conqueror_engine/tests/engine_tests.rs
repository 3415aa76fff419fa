//! End-to-end engine tests: full module roster, real tick thread, and
//! concurrent command producers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;

use conqueror_core::catalog::{BuildingCatalog, UnitCatalog};
use conqueror_core::error::{EngineError, Result};
use conqueror_core::unit::GridPos;

use conqueror_engine::chat::ChatModule;
use conqueror_engine::combat::CombatModule;
use conqueror_engine::console::{Console, ConsoleRouter};
use conqueror_engine::diagnostics::DiagnosticsModule;
use conqueror_engine::economy::EconomyModule;
use conqueror_engine::engine::{Engine, EngineState};
use conqueror_engine::government::{GovernmentKind, GovernmentModule};
use conqueror_engine::module::Module;
use conqueror_engine::scenario::{EconomySetup, Scenario};
use conqueror_engine::units::{UnitEventKind, UnitModule};

const TICK: Duration = Duration::from_millis(1);

struct Harness {
    engine: Engine,
    units: Arc<UnitModule>,
    chat: Arc<ChatModule>,
    government: Arc<GovernmentModule>,
    diagnostics: Arc<DiagnosticsModule>,
}

/// Build an engine with the full module roster, mirroring the headless
/// runner's registration order.
fn build_harness(scenario: Scenario, budget: Option<u64>) -> Harness {
    let units = Arc::new(UnitModule::new(scenario.grid, scenario.units));
    let combat = Arc::new(CombatModule::new(UnitCatalog::standard()));
    let economy = Arc::new(EconomyModule::new(
        scenario.economy,
        BuildingCatalog::standard(),
    ));
    let government = Arc::new(GovernmentModule::new(scenario.government));
    let chat = Arc::new(ChatModule::new());
    let diagnostics = Arc::new(DiagnosticsModule::new());

    let mut engine = Engine::new(TICK);
    if let Some(ticks) = budget {
        engine = engine.with_tick_budget(ticks);
    }
    engine.register(Arc::clone(&units) as Arc<dyn Module>).unwrap();
    engine.register(Arc::clone(&combat) as Arc<dyn Module>).unwrap();
    engine.register(Arc::clone(&economy) as Arc<dyn Module>).unwrap();
    engine.register(Arc::clone(&government) as Arc<dyn Module>).unwrap();
    engine.register(Arc::clone(&chat) as Arc<dyn Module>).unwrap();
    engine.register(Arc::clone(&diagnostics) as Arc<dyn Module>).unwrap();

    Harness {
        engine,
        units,
        chat,
        government,
        diagnostics,
    }
}

#[test]
fn unit_crosses_walled_map_within_budget() {
    let mut harness = build_harness(Scenario::default(), Some(60));
    harness.engine.init().unwrap();

    // Clear init-time events so the drain below starts at the command.
    harness.units.drain_events();
    harness.units.set_destination(0, GridPos::new(18, 18));

    harness.engine.run().unwrap();
    harness.engine.wait();

    let status = harness.units.status();
    assert_eq!(status[0].position, GridPos::new(18, 18));
    assert_eq!(status[0].destination, GridPos::new(18, 18));
    assert!(!status[0].moving);

    let events = harness.units.drain_events();
    let path_len = events
        .iter()
        .find_map(|e| match e.kind {
            UnitEventKind::DestinationSet { id: 0, path_len, .. } => Some(path_len),
            _ => None,
        })
        .expect("destination command must be acknowledged");
    // The wall forces a detour at least as long as the Manhattan distance.
    assert!(path_len >= 34, "path length {path_len} shorter than the lower bound");

    // The walk never enters the wall at row 10, columns 5-14.
    for event in &events {
        if let UnitEventKind::Moved { position, .. } | UnitEventKind::Arrived { position, .. } =
            event.kind
        {
            assert!(
                !(position.y == 10 && (5..=14).contains(&position.x)),
                "unit stepped into the wall at {position}"
            );
        }
    }

    harness.engine.shutdown();
    assert_eq!(harness.engine.state(), EngineState::Shutdown);
    assert_eq!(harness.diagnostics.ticks(), 60);
}

#[test]
fn engine_init_failure_unwinds_earlier_modules() {
    let scenario = Scenario {
        economy: EconomySetup {
            starting_treasury: 0,
            buildings: vec!["Unbuildable Folly".into()],
        },
        ..Scenario::default()
    };
    let mut harness = build_harness(scenario, None);

    let err = harness.engine.init().unwrap_err();
    assert!(matches!(err, EngineError::ModuleInit { ref module, .. } if module == "economy"));

    // The unit module initialized before the economy failed, then was
    // unwound: its units are gone.
    assert_eq!(harness.units.unit_count(), 0);
    assert!(harness.engine.run().is_err());
}

#[test]
fn concurrent_commands_never_break_movement_invariants() {
    let mut harness = build_harness(Scenario::default(), None);
    harness.engine.init().unwrap();
    harness.engine.run().unwrap();

    let mut producers = Vec::new();
    for thread_index in 0..4u32 {
        let units = Arc::clone(&harness.units);
        producers.push(std::thread::spawn(move || {
            for i in 0..200u32 {
                let id = (thread_index + i) % 2;
                // A spread of reachable cells, wall cells, and bogus ids.
                let target = GridPos::new((i * 7 + thread_index) % 20, (i * 3) % 20);
                units.set_destination(id, target);
                if i % 50 == 0 {
                    units.set_destination(99, target);
                }
            }
        }));
    }

    // Observe snapshots while the producers hammer the module.
    let deadline = Instant::now() + Duration::from_secs(5);
    while producers.iter().any(|p| !p.is_finished()) && Instant::now() < deadline {
        for unit in harness.units.status() {
            assert_eq!(
                unit.moving,
                unit.waypoints_remaining > 0,
                "unit {} violates the moving/waypoints invariant",
                unit.id
            );
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    for producer in producers {
        producer.join().unwrap();
    }

    // Let queued paths drain, then verify the invariant at rest.
    harness.engine.stop_handle().request_stop();
    harness.engine.wait();
    for unit in harness.units.status() {
        assert_eq!(unit.moving, unit.waypoints_remaining > 0);
    }

    harness.engine.shutdown();
}

#[test]
fn shutdown_order_is_reverse_of_init() {
    use std::sync::Mutex;

    struct OrderProbe {
        name: &'static str,
        journal: Arc<Mutex<Vec<&'static str>>>,
    }
    impl Module for OrderProbe {
        fn name(&self) -> &'static str {
            self.name
        }
        fn init(&self) -> Result<()> {
            self.journal.lock().unwrap().push(self.name);
            Ok(())
        }
        fn update(&self) {}
        fn shutdown(&self) {
            self.journal.lock().unwrap().push(self.name);
        }
    }

    let journal = Arc::new(Mutex::new(Vec::new()));
    let scenario = Scenario::default();
    let units = Arc::new(UnitModule::new(scenario.grid, scenario.units));

    let mut engine = Engine::new(TICK).with_tick_budget(5);
    engine
        .register(Arc::new(OrderProbe {
            name: "outer",
            journal: Arc::clone(&journal),
        }))
        .unwrap();
    engine.register(Arc::clone(&units) as Arc<dyn Module>).unwrap();
    engine
        .register(Arc::new(OrderProbe {
            name: "inner",
            journal: Arc::clone(&journal),
        }))
        .unwrap();

    engine.init().unwrap();
    engine.run().unwrap();
    engine.wait();
    engine.shutdown();

    // Probes bracket the unit module going down in the opposite order they
    // came up.
    assert_eq!(*journal.lock().unwrap(), vec!["outer", "inner", "inner", "outer"]);
}

#[test]
fn console_drives_engine_to_arrival_and_quit() {
    let mut harness = build_harness(Scenario::default(), None);
    harness.engine.init().unwrap();
    harness.engine.run().unwrap();

    let router = ConsoleRouter {
        units: Arc::clone(&harness.units),
        chat: Arc::clone(&harness.chat),
        government: Arc::clone(&harness.government),
        stop: harness.engine.stop_handle(),
    };
    let (tx, rx) = unbounded::<String>();
    let console = Console::spawn(rx, router);

    tx.send("move 0 4 1".to_string()).unwrap();
    tx.send("govern technocracy".to_string()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let status = harness.units.status();
        if status[0].position == GridPos::new(4, 1) && !status[0].moving {
            break;
        }
        assert!(Instant::now() < deadline, "unit never arrived at (4, 1)");
        std::thread::sleep(Duration::from_millis(5));
    }

    let (kind, _) = harness.government.snapshot();
    assert_eq!(kind, GovernmentKind::Technocracy);

    tx.send("quit".to_string()).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while harness.engine.stop_handle().is_running() {
        assert!(Instant::now() < deadline, "quit never stopped the engine");
        std::thread::sleep(Duration::from_millis(5));
    }

    harness.engine.wait();
    console.shutdown();
    harness.engine.shutdown();
    assert_eq!(harness.engine.state(), EngineState::Shutdown);
}
