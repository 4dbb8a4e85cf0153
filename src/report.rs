use std::fmt;
use strum::Display;
use tracing::{
    info,
    warn,
};

/// Where in the pipeline a branch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Devices,
    Objects,
    Indicators,
    Detail,
    Sample,
}

/// A request that failed without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchFailure {
    pub stage: Stage,
    pub target: String,
    pub error: String,
}

impl BranchFailure {
    pub fn new(stage: Stage, target: impl Into<String>, error: &dyn fmt::Display) -> Self {
        let failure = Self {
            stage,
            target: target.into(),
            error: error.to_string(),
        };
        warn!(stage = %failure.stage, target = %failure.target, error = %failure.error, "branch failed");
        failure
    }
}

/// Counters and failures of one run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub devices: usize,
    pub objects: usize,
    pub indicators: usize,
    pub lines_emitted: usize,
    pub skipped_no_data: usize,
    pub failures: Vec<BranchFailure>,
}

impl RunReport {
    pub fn absorb(&mut self, failures: impl IntoIterator<Item = BranchFailure>) {
        self.failures.extend(failures);
    }

    pub fn failures_at(&self, stage: Stage) -> usize {
        self.failures.iter().filter(|f| f.stage == stage).count()
    }

    pub fn log_summary(&self) {
        info!(
            devices = self.devices,
            objects = self.objects,
            indicators = self.indicators,
            lines = self.lines_emitted,
            no_data = self.skipped_no_data,
            failures = self.failures.len(),
            "run finished"
        );
        if !self.failures.is_empty() {
            warn!(
                devices = self.failures_at(Stage::Devices),
                objects = self.failures_at(Stage::Objects),
                indicators = self.failures_at(Stage::Indicators),
                detail = self.failures_at(Stage::Detail),
                sample = self.failures_at(Stage::Sample),
                "some branches contributed no lines"
            );
        }
    }
}
