//! Realistic subscription workload scenarios.
//!
//! # Scenarios
//!
//! - **Fanout**: Few events with very large aggregates, publish heavy
//! - **Churn**: Many events, widgets constantly subscribing, unsubscribing and dying

pub mod churn;
pub mod fanout;

pub use churn::{ChurnConfig, ChurnScenario, ChurnStats};
pub use fanout::{FanoutConfig, FanoutScenario};

/// Common trait for benchmark scenarios.
pub trait Scenario {
    /// Human-readable name of the scenario.
    fn name(&self) -> &'static str;

    /// Number of widgets in this scenario.
    fn widget_count(&self) -> usize;

    /// Set up the scenario (spawn widgets, initial subscriptions).
    fn setup(&mut self);

    /// Run one round of the scenario.
    fn update(&mut self);

    /// Clean up the scenario.
    fn teardown(&mut self);
}
