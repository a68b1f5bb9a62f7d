//! Stress tests for GHGcast
//!
//! Run with: cargo test --release stress -- --ignored

use ghgcast::*;
use std::time::{Duration, Instant};

#[test]
#[ignore] // Run manually with --ignored
fn stress_test_simulation() {
    let mut simulator = TelemetrySimulator::seeded(1).unwrap();

    let iterations = 1_000_000;
    let start = Instant::now();

    for i in 0..iterations {
        let reading = simulator.generate_reading(GasType::ALL[i % 2]);
        assert!(reading.site_id < 5);
    }

    let elapsed = start.elapsed();
    let rate = iterations as f64 / elapsed.as_secs_f64();

    println!("Generated {} readings in {:?}", iterations, elapsed);
    println!("Rate: {:.0} readings/second", rate);

    assert!(
        rate > 100_000.0,
        "Should generate at least 100k readings/s, got {:.0}",
        rate
    );
}

#[test]
#[ignore]
fn stress_test_long_run() {
    let model = LinearModel::from_weights(10.0, [0.25; FEATURE_COUNT]);
    let simulator = TelemetrySimulator::seeded(2).unwrap();
    let config = DriverConfig::new()
        .with_iterations(5_000)
        .with_pause(Duration::ZERO);

    let start = Instant::now();
    let mut driver = Driver::new(config, model, simulator).unwrap();
    driver.run(&mut NullSink).unwrap();
    let elapsed = start.elapsed();

    println!(
        "Ran {} ticks with full re-aggregation in {:?}",
        driver.iteration(),
        elapsed
    );

    assert_eq!(driver.log().len(), 10_000);
    let rows = aggregate(driver.log().records());
    assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 10_000);
}
