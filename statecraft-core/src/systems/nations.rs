use crate::state::{NationId, WorldState};

/// National focus slots: one, plus one per population step, plus modifiers.
pub fn max_national_focuses(state: &WorldState, nation: NationId) -> i32 {
    let n = state.nation(nation);
    let per_step = n
        .demographics
        .total
        .checked_ratio(state.config.population_per_focus)
        .map(|r| r.to_int() as i32)
        .unwrap_or(0);
    (1 + per_step + n.national_focus_modifier).max(0)
}

/// Clears the nation's rival and threat flags once it owns nothing.
pub fn clear_dead_nation(state: &mut WorldState, nation: NationId) {
    let n = state.nation_mut(nation);
    n.ai_is_threatened = false;
    n.ai_rival = None;
}
