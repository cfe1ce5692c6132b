use crate::step::TickReport;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Accumulated timing and outcome counters across AI ticks.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct AiMetrics {
    pub total_ticks: u64,
    pub total_time: Duration,
    pub strategy_time: Duration,
    pub alliance_time: Duration,
    /// Priorities and actions combined
    pub influence_time: Duration,
    pub research_time: Duration,
    pub decision_time: Duration,
    pub focus_time: Duration,
    pub construction_time: Duration,
    /// Investment, starting and upgrading combined
    pub colonization_time: Duration,

    pub rivals_chosen: u64,
    pub alliances_formed: u64,
    pub influence_actions: u64,
    pub research_started: u64,
    pub decisions_taken: u64,
    pub focuses_assigned: u64,
    pub projects_queued: u64,
    pub colonial_investments: u64,
    pub colonies_started: u64,
    pub colonies_integrated: u64,
}

impl AiMetrics {
    pub fn record(&mut self, report: &TickReport) {
        let t = &report.timings;
        self.total_ticks += 1;
        self.total_time += t.total();
        self.strategy_time += t.strategy;
        self.alliance_time += t.alliances;
        self.influence_time += t.influence;
        self.research_time += t.research;
        self.decision_time += t.decisions;
        self.focus_time += t.focuses;
        self.construction_time += t.construction;
        self.colonization_time += t.colonization;

        self.rivals_chosen += report.rivals_chosen as u64;
        self.alliances_formed += report.alliances_formed as u64;
        self.influence_actions += report.influence_actions as u64;
        self.research_started += report.research_started as u64;
        self.decisions_taken += report.decisions_taken as u64;
        self.focuses_assigned += report.focuses_assigned as u64;
        self.projects_queued += report.projects_queued as u64;
        self.colonial_investments += report.colonial_investments as u64;
        self.colonies_started += report.colonies_started as u64;
        self.colonies_integrated += report.colonies_integrated as u64;
    }

    pub fn tick_avg_ms(&self) -> f64 {
        if self.total_ticks == 0 {
            0.0
        } else {
            self.total_time.as_secs_f64() * 1000.0 / self.total_ticks as f64
        }
    }

    /// Share of total time spent in each component, for the runner's summary.
    pub fn breakdown(&self) -> Vec<(&'static str, f64)> {
        let total = self.total_time.as_secs_f64();
        let share = |d: Duration| {
            if total == 0.0 {
                0.0
            } else {
                d.as_secs_f64() / total
            }
        };
        vec![
            ("strategy", share(self.strategy_time)),
            ("alliances", share(self.alliance_time)),
            ("influence", share(self.influence_time)),
            ("research", share(self.research_time)),
            ("decisions", share(self.decision_time)),
            ("focuses", share(self.focus_time)),
            ("construction", share(self.construction_time)),
            ("colonization", share(self.colonization_time)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::ComponentTimings;

    #[test]
    fn test_empty_metrics() {
        let metrics = AiMetrics::default();
        assert_eq!(metrics.tick_avg_ms(), 0.0);
        assert!(metrics.breakdown().iter().all(|&(_, s)| s == 0.0));
    }

    #[test]
    fn test_record_accumulates() {
        let report = TickReport {
            alliances_formed: 2,
            projects_queued: 3,
            timings: ComponentTimings {
                research: Duration::from_millis(3),
                construction: Duration::from_millis(1),
                ..ComponentTimings::default()
            },
            ..TickReport::default()
        };
        let mut metrics = AiMetrics::default();
        metrics.record(&report);
        metrics.record(&report);

        assert_eq!(metrics.total_ticks, 2);
        assert_eq!(metrics.alliances_formed, 4);
        assert_eq!(metrics.projects_queued, 6);
        assert_eq!(metrics.total_time, Duration::from_millis(8));
        assert!((metrics.tick_avg_ms() - 4.0).abs() < 1e-9);

        let research = metrics
            .breakdown()
            .into_iter()
            .find(|&(name, _)| name == "research")
            .map(|(_, s)| s)
            .unwrap_or_default();
        assert!((research - 0.75).abs() < 1e-9);
    }
}
