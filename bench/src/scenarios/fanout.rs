//! Fanout scenario.
//!
//! A handful of events, each subscribed by a large share of the widgets. Every round
//! publishes each event once with a small payload. This measures dispatch cost per member,
//! including the aggregate snapshot taken by every publish.

use crate::fixture::Fixture;
use crate::scenarios::Scenario;

/// Configuration for the fanout benchmark.
pub struct FanoutConfig {
    /// Number of widgets.
    pub widget_count: usize,
    /// Number of distinct events.
    pub event_count: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            widget_count: 10_000,
            event_count: 4,
        }
    }
}

pub struct FanoutScenario {
    config: FanoutConfig,
    fixture: Option<Fixture>,
    events: Vec<String>,
}

impl FanoutScenario {
    pub fn new(config: FanoutConfig) -> Self {
        let events = (0..config.event_count).map(|i| format!("fanout-{i}")).collect();
        Self {
            config,
            fixture: None,
            events,
        }
    }

    /// Listener invocations so far.
    pub fn hits(&self) -> u64 {
        self.fixture.as_ref().map_or(0, |f| f.hits.get())
    }
}

impl Scenario for FanoutScenario {
    fn name(&self) -> &'static str {
        "fanout"
    }

    fn widget_count(&self) -> usize {
        self.config.widget_count
    }

    fn setup(&mut self) {
        let fixture = Fixture::new(self.config.widget_count);
        // Event i gets every widget whose index is not a multiple of i + 2.
        for (i, event) in self.events.iter().enumerate() {
            let stride = i + 2;
            let target = fixture.collection(
                fixture
                    .widgets
                    .iter()
                    .enumerate()
                    .filter(|(n, _)| n % stride != 0)
                    .map(|(_, w)| *w),
            );
            if !target.widgets().is_empty() {
                let _ = fixture
                    .registry
                    .subscribe(&target, event, fixture.counting_listener());
            }
        }
        self.fixture = Some(fixture);
    }

    fn update(&mut self) {
        let Some(fixture) = &self.fixture else {
            return;
        };
        for event in &self.events {
            fixture.registry.publish_with(event, &[1, 2]);
        }
    }

    fn teardown(&mut self) {
        self.fixture = None;
    }
}
