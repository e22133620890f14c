//! End-to-end discovery scenarios
//!
//! Each scenario generates a capture with the simulator, runs a full
//! discovery pass and compares the labels with the simulator's ground truth.

use awre_core::{AwreResult, Label, MessageTypeId};
use awre_engine::{DiscoveryConfig, DiscoveryEngine};
use tracing::info;

use crate::simulator::{ProtocolSimulator, SimulatorConfig};

/// A capture setup plus the engine configuration to run on it
#[derive(Clone, Debug)]
pub struct Scenario {
    pub name: &'static str,
    pub simulator: SimulatorConfig,
    pub discovery: DiscoveryConfig,
}

impl Scenario {
    pub fn new(name: &'static str, simulator: SimulatorConfig) -> Self {
        Scenario {
            name,
            simulator,
            discovery: DiscoveryConfig::default(),
        }
    }

    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }
}

/// Outcome of one scenario
#[derive(Clone, Debug)]
pub struct ScenarioReport {
    pub name: &'static str,
    /// Ground truth labels
    pub expected: Vec<Label>,
    /// Labels of the default message type
    pub found: Vec<Label>,
}

impl ScenarioReport {
    /// Expected labels found with the right range and type
    pub fn matched(&self) -> usize {
        self.expected
            .iter()
            .filter(|e| self.found.iter().any(|f| same_field(e, f)))
            .count()
    }

    pub fn missing(&self) -> Vec<Label> {
        self.expected
            .iter()
            .filter(|e| !self.found.iter().any(|f| same_field(e, f)))
            .copied()
            .collect()
    }

    pub fn unexpected(&self) -> Vec<Label> {
        self.found
            .iter()
            .filter(|f| !self.expected.iter().any(|e| same_field(e, f)))
            .copied()
            .collect()
    }

    /// Check if discovery reproduced the ground truth, colors included
    pub fn is_exact(&self) -> bool {
        self.expected == self.found
    }
}

fn same_field(a: &Label, b: &Label) -> bool {
    a.field_type == b.field_type && a.range == b.range
}

/// Generate the capture and run discovery on it
pub fn run_scenario(scenario: &Scenario) -> AwreResult<ScenarioReport> {
    let mut simulator = ProtocolSimulator::new(scenario.simulator.clone());
    let corpus = simulator.corpus();
    let mut engine = DiscoveryEngine::with_config(corpus, scenario.discovery.clone());

    let mut result = engine.run()?;
    let report = ScenarioReport {
        name: scenario.name,
        expected: simulator.ground_truth(),
        found: result.remove(&MessageTypeId::DEFAULT).unwrap_or_default(),
    };

    info!(
        scenario = report.name,
        matched = report.matched(),
        expected = report.expected.len(),
        found = report.found.len(),
        "scenario complete"
    );

    Ok(report)
}

/// Scenarios the default engine configuration is expected to solve exactly
pub fn standard_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("two_stations", SimulatorConfig::default()),
        Scenario::new("mixed_lengths", SimulatorConfig::mixed_lengths()),
        Scenario::new("beacon", SimulatorConfig::beacon()),
        Scenario::new("short_capture", SimulatorConfig::default().with_message_count(8)),
    ]
}
