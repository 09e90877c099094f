use crate::domain::value_objects::severity::Severity;
use crate::domain::value_objects::thresholds::Thresholds;

/// Change of a monotonic counter between two invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaReading {
    pub previous: Option<u64>,
    pub current: u64,
    pub delta: u64,
}

impl DeltaReading {
    /// An absent baseline counts as `current`, so a cold start never alarms.
    /// A counter that went backwards was reset (reboot) and yields 0.
    #[must_use]
    pub fn compute(previous: Option<u64>, current: u64) -> Self {
        let baseline = previous.unwrap_or(current);
        Self {
            previous,
            current,
            delta: current.saturating_sub(baseline),
        }
    }

    #[must_use]
    pub const fn is_cold_start(&self) -> bool {
        self.previous.is_none()
    }

    #[must_use]
    pub fn is_reset(&self) -> bool {
        self.previous.is_some_and(|p| self.current < p)
    }

    #[must_use]
    pub fn classify(&self, thresholds: &Thresholds) -> Severity {
        thresholds.classify(self.delta)
    }

    #[must_use]
    pub fn describe(&self, severity: Severity, thresholds: &Thresholds) -> String {
        if self.is_cold_start() {
            return format!("no baseline yet, recorded {}", self.current);
        }
        if let Some(previous) = self.previous.filter(|p| self.current < *p) {
            return format!(
                "counter reset ({previous} -> {}), baseline re-established",
                self.current
            );
        }
        match thresholds.limit_for(severity) {
            Some(limit) => format!(
                "{} since last check (above {} threshold {limit})",
                self.delta,
                severity.label().to_lowercase()
            ),
            None => format!("{} since last check", self.delta),
        }
    }
}
