//! Subscription churn scenario.
//!
//! Simulates a UI where components come and go:
//! - Random groups of widgets subscribe to and unsubscribe from random events
//! - Events are published with and without payload
//! - Widgets are destroyed and replaced, leaving stale members in aggregates
//!
//! This scenario tests:
//! - Union and difference cost on mid-sized aggregates
//! - Aggregate removal and re-creation as events lose and regain subscribers
//! - Dispatch skipping destroyed widgets

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_bus::{Handle, widget::Collection};

use crate::fixture::{Fixture, Payload};
use crate::scenarios::Scenario;

/// Configuration for the churn benchmark.
pub struct ChurnConfig {
    /// Number of live widgets kept in the pool.
    pub widget_count: usize,
    /// Number of distinct event names.
    pub event_count: usize,
    /// Random operations per update.
    pub operations: usize,
    /// Largest target collection used by a single subscribe or unsubscribe.
    pub max_target: usize,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            widget_count: 2_000,
            event_count: 32,
            operations: 1_000,
            max_target: 16,
            seed: 12345,
        }
    }
}

/// Outcome counters, used to check that runs are reproducible.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChurnStats {
    pub subscribed: u64,
    pub unsubscribed: u64,
    pub unsubscribe_misses: u64,
    pub published: u64,
    pub publish_misses: u64,
    pub respawned: u64,
}

pub struct ChurnScenario {
    config: ChurnConfig,
    rng: ChaCha8Rng,
    fixture: Option<Fixture>,
    events: Vec<String>,
    stats: ChurnStats,
}

impl ChurnScenario {
    pub fn new(config: ChurnConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let events = (0..config.event_count).map(|i| format!("churn-{i}")).collect();
        Self {
            config,
            rng,
            fixture: None,
            events,
            stats: ChurnStats::default(),
        }
    }

    pub fn stats(&self) -> &ChurnStats {
        &self.stats
    }

    /// Returns `true` if no registered event has an empty aggregate.
    pub fn aggregates_non_empty(&self) -> bool {
        let Some(fixture) = &self.fixture else {
            return true;
        };
        fixture
            .registry
            .event_names()
            .iter()
            .all(|name| fixture.registry.subscribers(name).is_some_and(|a| !a.is_empty()))
    }

    fn random_event(&mut self) -> String {
        let index = self.rng.gen_range(0..self.events.len());
        self.events[index].clone()
    }

    fn random_target(&mut self, fixture: &Fixture) -> Collection<Payload> {
        let size = self.rng.gen_range(1..=self.config.max_target.max(1));
        let picks: Vec<_> = (0..size)
            .map(|_| fixture.widgets[self.rng.gen_range(0..fixture.widgets.len())])
            .collect();
        fixture.collection(picks)
    }

    fn step(&mut self, fixture: &mut Fixture) {
        match self.rng.gen_range(0..10) {
            0..=3 => {
                let event = self.random_event();
                let target = self.random_target(fixture);
                if fixture
                    .registry
                    .subscribe(&target, &event, fixture.counting_listener())
                    .is_ok()
                {
                    self.stats.subscribed += 1;
                }
            }
            4..=6 => {
                let event = self.random_event();
                let target = self.random_target(fixture);
                if fixture.registry.unsubscribe(&target, &event) {
                    self.stats.unsubscribed += 1;
                } else {
                    self.stats.unsubscribe_misses += 1;
                }
            }
            7..=8 => {
                let event = self.random_event();
                let published = if self.rng.gen_bool(0.5) {
                    fixture.registry.publish(&event)
                } else {
                    fixture.registry.publish_with(&event, &[self.rng.r#gen()])
                };
                if published {
                    self.stats.published += 1;
                } else {
                    self.stats.publish_misses += 1;
                }
            }
            _ => {
                let index = self.rng.gen_range(0..fixture.widgets.len());
                fixture.toolkit.destroy(fixture.widgets[index]);
                fixture.widgets[index] = fixture.toolkit.spawn();
                self.stats.respawned += 1;
            }
        }
    }
}

impl Scenario for ChurnScenario {
    fn name(&self) -> &'static str {
        "churn"
    }

    fn widget_count(&self) -> usize {
        self.config.widget_count
    }

    fn setup(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.stats = ChurnStats::default();
        self.fixture = Some(Fixture::new(self.config.widget_count.max(1)));
    }

    fn update(&mut self) {
        let Some(mut fixture) = self.fixture.take() else {
            return;
        };
        for _ in 0..self.config.operations {
            self.step(&mut fixture);
        }
        self.fixture = Some(fixture);
    }

    fn teardown(&mut self) {
        self.fixture = None;
    }
}
