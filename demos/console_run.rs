//! Console forecast example
//!
//! Runs a short forecast against the shipped tree model and prints the live
//! tables to stdout, followed by per-gas statistics.
//!
//! Run with: `cargo run --example console_run`

use ghgcast::{
    load_model, summarize, ConsoleSink, Driver, DriverConfig, TelemetrySimulator,
    DEFAULT_MODEL_PATH,
};
use std::time::Duration;

fn main() -> ghgcast::Result<()> {
    println!("=== GHGcast Console Example ===\n");

    let model = load_model(DEFAULT_MODEL_PATH)?;
    let simulator = TelemetrySimulator::seeded(42)?;
    let config = DriverConfig::new()
        .with_iterations(5)
        .with_pause(Duration::from_millis(300));

    let mut driver = Driver::new(config, model, simulator)?;
    driver.run(&mut ConsoleSink::stdout())?;

    println!("\n=== Statistics ===\n");
    for s in summarize(driver.log().records()) {
        println!(
            "{:<5} n={:<3} mean={:>8.2} min={:>8.2} max={:>8.2}",
            s.gas_type.label(),
            s.count,
            s.mean,
            s.min,
            s.max
        );
    }
    Ok(())
}
