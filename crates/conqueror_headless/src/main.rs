//! Headless Conqueror engine runner.
//!
//! Runs the engine without graphics, controlled by line commands on stdin.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin until `quit`
//! cargo run -p conqueror_headless
//!
//! # Run a scenario file for a bounded number of ticks
//! cargo run -p conqueror_headless -- --scenario maps/proving_grounds.ron --ticks 600
//! ```
//!
//! # Commands (stdin, one per line)
//!
//! - `move <id> <x> <y>` - send a unit to a destination
//! - `status` - log a snapshot of every unit
//! - `say <text>` - post a chat message
//! - `govern <kind>` - change the form of government
//! - `quit` - stop the engine
//!
//! Logs go to stderr; the final state report goes to stdout as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use conqueror_core::catalog::{BuildingCatalog, UnitCatalog};
use conqueror_engine::chat::ChatModule;
use conqueror_engine::combat::CombatModule;
use conqueror_engine::console::{stdin_source, Console, ConsoleRouter};
use conqueror_engine::diagnostics::DiagnosticsModule;
use conqueror_engine::economy::EconomyModule;
use conqueror_engine::engine::Engine;
use conqueror_engine::government::GovernmentModule;
use conqueror_engine::module::Module;
use conqueror_engine::scenario::Scenario;
use conqueror_engine::units::{UnitModule, UnitSnapshot};

#[derive(Parser)]
#[command(name = "conqueror_headless")]
#[command(about = "Headless Conqueror engine runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Scenario file to load (RON); defaults to the built-in proving grounds
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Stop after this many ticks, overriding the scenario's budget
    #[arg(short, long)]
    ticks: Option<u64>,
}

/// Final state printed to stdout when the engine stops.
#[derive(Serialize)]
struct FinalReport {
    ticks: u64,
    treasury: u64,
    units: Vec<UnitSnapshot>,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli) {
        tracing::error!(%err, "engine failed");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = match &cli.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    if cli.ticks.is_some() {
        scenario.max_ticks = cli.ticks;
    }
    tracing::info!(name = %scenario.name, "scenario loaded");

    let tick_interval = scenario.tick_interval();
    let max_ticks = scenario.max_ticks;

    let units = Arc::new(UnitModule::new(scenario.grid, scenario.units));
    let combat = Arc::new(CombatModule::new(UnitCatalog::standard()));
    let economy = Arc::new(EconomyModule::new(
        scenario.economy,
        BuildingCatalog::standard(),
    ));
    let government = Arc::new(GovernmentModule::new(scenario.government));
    let chat = Arc::new(ChatModule::new());
    let diagnostics = Arc::new(DiagnosticsModule::new());

    let mut engine = Engine::new(tick_interval);
    if let Some(budget) = max_ticks {
        engine = engine.with_tick_budget(budget);
    }
    engine.register(Arc::clone(&units) as Arc<dyn Module>)?;
    engine.register(Arc::clone(&combat) as Arc<dyn Module>)?;
    engine.register(Arc::clone(&economy) as Arc<dyn Module>)?;
    engine.register(Arc::clone(&government) as Arc<dyn Module>)?;
    engine.register(Arc::clone(&chat) as Arc<dyn Module>)?;
    engine.register(Arc::clone(&diagnostics) as Arc<dyn Module>)?;

    engine.init()?;
    engine.run()?;

    let console = Console::spawn(
        stdin_source(),
        ConsoleRouter {
            units: Arc::clone(&units),
            chat: Arc::clone(&chat),
            government: Arc::clone(&government),
            stop: engine.stop_handle(),
        },
    );

    // Blocks until the tick budget is exhausted or a `quit` command lands.
    engine.wait();

    let report = FinalReport {
        ticks: engine.tick_count(),
        treasury: economy.treasury(),
        units: units.status(),
    };

    console.shutdown();
    engine.shutdown();

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
