//! National focus allocation.

use crate::defines::demographics::{
    LITERACY_CAP_THRESHOLD_RAW, RESEARCH_OPTIMUM_THRESHOLD_RAW,
};
use crate::fixed::Fixed;
use crate::state::{FocusId, NationId, PopType, StateInstanceId, WorldState};
use crate::systems::{diplomacy, nations};
use tracing::instrument;

/// Finds the clergy and soldier promotion focuses. Run once after loading.
pub fn identify_focuses(state: &mut WorldState) {
    for (i, focus) in state.focuses.iter().enumerate() {
        if !focus.promotion_amount.is_positive() {
            continue;
        }
        let id = FocusId(i as u32);
        match focus.promotion {
            Some(PopType::Clergy) => {
                state.focus_catalog.clergy.get_or_insert(id);
            }
            Some(PopType::Soldiers) => {
                state.focus_catalog.soldier.get_or_insert(id);
            }
            _ => {}
        }
    }
    if state.focus_catalog.clergy.is_none() {
        log::warn!("No clergy promotion focus defined");
    }
}

fn clergy_fraction(clergy: Fixed, total: Fixed) -> Fixed {
    clergy.checked_ratio(total).unwrap_or(Fixed::ZERO)
}

/// Focus `nation` wants on one of its states, if any.
fn focus_for_state(
    state: &WorldState,
    si: StateInstanceId,
    max_clergy: bool,
    threatened: bool,
) -> Option<FocusId> {
    let config = &state.config;
    let demo = &state.state_instance(si).demographics;
    let local = clergy_fraction(demo.clergy, demo.total);
    let literacy_limit = config.max_clergy_for_literacy * Fixed::from_raw(LITERACY_CAP_THRESHOLD_RAW);
    let research_limit =
        config.clergy_research_optimum * Fixed::from_raw(RESEARCH_OPTIMUM_THRESHOLD_RAW);
    let catalog = &state.focus_catalog;

    if max_clergy {
        if threatened {
            catalog.soldier
        } else if local < literacy_limit {
            catalog.clergy
        } else {
            None
        }
    } else if local < research_limit {
        catalog.clergy
    } else {
        None
    }
}

fn allocate(state: &mut WorldState, nation: NationId) -> usize {
    state.nation_mut(nation).flashpoint_focus_state = None;
    let mut slots = nations::max_national_focuses(state, nation);
    if slots <= 0 {
        return 0;
    }

    let n = state.nation(nation);
    let max_clergy = clergy_fraction(n.demographics.clergy, n.demographics.total)
        >= state.config.clergy_research_optimum;
    let threatened = n.ai_is_threatened || diplomacy::is_at_war(state, nation);

    let mut states: Vec<StateInstanceId> = n
        .owned_states
        .iter()
        .copied()
        .filter(|&si| state.state_instance(si).demographics.total.is_positive())
        .collect();
    states.sort_by(|&a, &b| {
        let pa = state.state_instance(a).demographics.total;
        let pb = state.state_instance(b).demographics.total;
        pb.cmp(&pa).then(a.cmp(&b))
    });

    let mut assigned = 0;
    for si in states {
        if slots == 0 {
            break;
        }
        if let Some(focus) = focus_for_state(state, si, max_clergy, threatened) {
            state.state_instance_mut(si).owner_focus = Some(focus);
            slots -= 1;
            assigned += 1;
        }
    }
    assigned
}

/// Clears AI-owned state focuses and reassigns them. Returns the number assigned.
#[instrument(skip_all, name = "ai_focus")]
pub fn update_focuses(state: &mut WorldState) -> usize {
    for i in 0..state.state_instances.len() {
        let owner = state.state_instances[i].owner;
        if !state.nation(owner).is_player_controlled {
            state.state_instances[i].owner_focus = None;
        }
    }

    let nations: Vec<NationId> = state.ai_nations().collect();
    nations.into_iter().map(|n| allocate(state, n)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::WorldStateBuilder;

    const A: NationId = NationId(0);
    const B: NationId = NationId(1);
    const CLERGY: FocusId = FocusId(1);
    const SOLDIER: FocusId = FocusId(2);

    fn focus(state: &WorldState, si: u32) -> Option<FocusId> {
        state.state_instance(StateInstanceId(si)).owner_focus
    }

    /// States 0..3 owned by A with populations 3000, 2000, 1000; nation clergy
    /// share given by `nation_clergy` per 1000.
    fn world(nation_clergy: i64) -> WorldState {
        let mut state = WorldStateBuilder::new()
            .nations(2)
            .focus("farmers", Some(PopType::Farmers), 1)
            .focus("clergy", Some(PopType::Clergy), 1)
            .focus("soldiers", Some(PopType::Soldiers), 1)
            .state(A, 1, 2000)
            .state_demographics(20, 0, 0)
            .state(A, 1, 3000)
            .state_demographics(150, 0, 0)
            .state(A, 1, 1000)
            .state_demographics(5, 0, 0)
            .population(A, 6000, 6 * nation_clergy)
            .province(B)
            .build();
        identify_focuses(&mut state);
        state.nation_mut(A).national_focus_modifier = 5;
        state
    }

    #[test]
    fn test_identify() {
        let state = world(0);
        assert_eq!(state.focus_catalog.clergy, Some(CLERGY));
        assert_eq!(state.focus_catalog.soldier, Some(SOLDIER));
    }

    #[test]
    fn test_clergy_below_research_optimum() {
        // Nation at 1% clergy: not saturated, target states under 2.4%
        let mut state = world(10);
        assert_eq!(update_focuses(&mut state), 2);
        assert_eq!(focus(&state, 0), Some(CLERGY));
        assert_eq!(focus(&state, 1), None);
        assert_eq!(focus(&state, 2), Some(CLERGY));
    }

    #[test]
    fn test_saturated_clergy_peacetime() {
        // Nation at 3%: only states below 3.2% get clergy
        let mut state = world(30);
        update_focuses(&mut state);
        assert_eq!(focus(&state, 0), Some(CLERGY));
        assert_eq!(focus(&state, 1), None);
        assert_eq!(focus(&state, 2), Some(CLERGY));
    }

    #[test]
    fn test_saturated_clergy_threatened() {
        let mut state = world(30);
        state.nation_mut(A).ai_is_threatened = true;
        assert_eq!(update_focuses(&mut state), 3);
        for si in 0..3 {
            assert_eq!(focus(&state, si), Some(SOLDIER));
        }
    }

    #[test]
    fn test_slots_go_to_largest_states() {
        let mut state = world(30);
        state.nation_mut(A).ai_is_threatened = true;
        // 6000 people: one base slot only
        state.nation_mut(A).national_focus_modifier = 0;
        assert_eq!(update_focuses(&mut state), 1);
        assert_eq!(focus(&state, 1), Some(SOLDIER));
        assert_eq!(focus(&state, 0), None);
    }

    #[test]
    fn test_player_focus_kept_and_flashpoint_cleared() {
        let mut state = world(10);
        state.state_instance_mut(StateInstanceId(1)).owner_focus = Some(SOLDIER);
        state.nation_mut(A).flashpoint_focus_state = Some(StateInstanceId(0));
        update_focuses(&mut state);
        assert_eq!(focus(&state, 1), None);
        assert_eq!(state.nation(A).flashpoint_focus_state, None);

        let mut state = world(10);
        state.nation_mut(A).is_player_controlled = true;
        state.state_instance_mut(StateInstanceId(1)).owner_focus = Some(SOLDIER);
        assert_eq!(update_focuses(&mut state), 0);
        assert_eq!(focus(&state, 1), Some(SOLDIER));
    }
}
