//! Per-tick AI orchestration.

use crate::ai;
use crate::notify::NotificationSink;
use crate::state::WorldState;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::instrument;

/// Wall time spent in each component during one tick.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentTimings {
    pub strategy: Duration,
    pub alliances: Duration,
    pub influence: Duration,
    pub research: Duration,
    pub decisions: Duration,
    pub focuses: Duration,
    pub construction: Duration,
    pub colonization: Duration,
}

impl ComponentTimings {
    pub fn total(&self) -> Duration {
        self.strategy
            + self.alliances
            + self.influence
            + self.research
            + self.decisions
            + self.focuses
            + self.construction
            + self.colonization
    }
}

/// What one call to [`run_ai_tick`] did.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub rivals_chosen: usize,
    pub alliances_formed: usize,
    /// Relationship slots given a priority tier
    pub priorities_assigned: usize,
    pub influence_actions: usize,
    pub research_started: usize,
    pub decisions_taken: usize,
    pub focuses_assigned: usize,
    pub projects_queued: usize,
    pub colonial_investments: usize,
    pub colonies_started: usize,
    pub colonies_integrated: usize,
    pub timings: ComponentTimings,
}

fn timed<T>(slot: &mut Duration, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    *slot += start.elapsed();
    out
}

/// One-time setup after a world is loaded: static tech weights and focus lookup.
pub fn prepare_world(state: &mut WorldState) {
    ai::initialize_ai_tech_weights(state);
    ai::identify_focuses(state);
}

/// Runs every AI component once, in a fixed order.
///
/// Later components observe the writes of earlier ones: alliance formation sees
/// this tick's threat flags, influence actions see this tick's priorities. The
/// caller owns the calendar; this never advances the date.
#[instrument(skip_all, name = "ai_tick")]
pub fn run_ai_tick(state: &mut WorldState, sink: &mut dyn NotificationSink) -> TickReport {
    let mut report = TickReport::default();
    let mut t = ComponentTimings::default();

    report.rivals_chosen = timed(&mut t.strategy, || ai::update_ai_general_status(state, sink));
    report.alliances_formed = timed(&mut t.alliances, || ai::form_alliances(state, sink));
    report.priorities_assigned = timed(&mut t.influence, || ai::update_influence_priorities(state));
    report.influence_actions =
        timed(&mut t.influence, || ai::perform_influence_actions(state, sink));
    report.research_started = timed(&mut t.research, || ai::update_ai_research(state));
    report.decisions_taken = timed(&mut t.decisions, || ai::take_ai_decisions(state, sink));
    report.focuses_assigned = timed(&mut t.focuses, || ai::update_focuses(state));
    report.projects_queued = timed(&mut t.construction, || ai::update_ai_econ_construction(state));
    report.colonial_investments =
        timed(&mut t.colonization, || ai::update_ai_colonial_investment(state));
    report.colonies_started =
        timed(&mut t.colonization, || ai::update_ai_colony_starting(state, sink));
    report.colonies_integrated = timed(&mut t.colonization, || ai::upgrade_colonies(state));

    report.timings = t;
    log::info!(
        "{}: {} rivals, {} alliances, {} influence actions, {} research, {} decisions, {} projects, {} colonies",
        state.date,
        report.rivals_chosen,
        report.alliances_formed,
        report.influence_actions,
        report.research_started,
        report.decisions_taken,
        report.projects_queued,
        report.colonies_started
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Fixed;
    use crate::notify::{Category, Message, Notification};
    use crate::state::{NationId, TechCategory, TechId};
    use crate::testing::WorldStateBuilder;

    const A: NationId = NationId(0);
    const B: NationId = NationId(1);
    const C: NationId = NationId(2);

    /// A weak nation squeezed between a strong neighbor and a middling one.
    fn world() -> WorldState {
        let mut state = WorldStateBuilder::new()
            .date(1840, 1, 1)
            .nations(3)
            .province(A)
            .province(B)
            .province(C)
            .border(A, B)
            .border(A, C)
            .border(B, C)
            .military(A, 50)
            .military(B, 200)
            .military(C, 100)
            .folder("army", TechCategory::Army)
            .tech(0, 1836, 100)
            .build();
        prepare_world(&mut state);
        state
    }

    #[test]
    fn test_prepare_world_sets_weights() {
        let state = world();
        assert_eq!(state.technology(TechId(0)).ai_weight, Fixed::from_int(1500));
    }

    #[test]
    fn test_threat_feeds_alliance_in_same_tick() {
        let mut state = world();
        let mut sink: Vec<Notification> = Vec::new();
        let report = run_ai_tick(&mut state, &mut sink);

        assert!(state.nation(A).ai_is_threatened);
        // C is threatened by B and A is exactly strong enough for it
        assert_eq!(report.alliances_formed, 1);
        assert_eq!(report.rivals_chosen, 0);
        assert!(sink
            .iter()
            .any(|n| n.category == Category::Alliance
                && matches!(n.message, Message::AllianceFormed { .. })));
        assert_eq!(report.research_started, 3);
        assert_eq!(state.nation(A).current_research, Some(TechId(0)));
    }

    #[test]
    fn test_tick_does_not_advance_date() {
        let mut state = world();
        let date = state.date;
        run_ai_tick(&mut state, &mut Vec::new());
        assert_eq!(state.date, date);
    }

    #[test]
    fn test_ticks_are_reproducible() {
        let mut first = world();
        let mut second = world();
        let mut first_log = Vec::new();
        let mut second_log = Vec::new();
        for _ in 0..3 {
            let a = run_ai_tick(&mut first, &mut first_log);
            let b = run_ai_tick(&mut second, &mut second_log);
            assert_eq!(a.alliances_formed, b.alliances_formed);
            assert_eq!(a.projects_queued, b.projects_queued);
        }
        assert_eq!(first.checksum(), second.checksum());
        assert_eq!(first_log, second_log);
    }

    #[test]
    fn test_timings_sum_to_total() {
        let mut state = world();
        let report = run_ai_tick(&mut state, &mut Vec::new());
        let t = &report.timings;
        assert!(t.total() >= t.strategy + t.research);
    }
}
