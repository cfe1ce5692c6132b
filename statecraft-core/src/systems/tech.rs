use crate::defines::economy::{TECH_COST_DECAY_PER_YEAR_RAW, TECH_COST_FLOOR_RAW};
use crate::fixed::Fixed;
use crate::state::{TechId, WorldState};

/// Research cost after the catch-up discount.
///
/// Cost drops 2% per year past the technology's availability year, down to half
/// the base cost.
pub fn effective_technology_cost(state: &WorldState, tech: TechId) -> Fixed {
    let t = state.technology(tech);
    let years_past = (state.date.year() - t.year).max(0) as i64;
    let discount = Fixed::from_raw(TECH_COST_DECAY_PER_YEAR_RAW * years_past);
    let factor = (Fixed::ONE - discount).max(Fixed::from_raw(TECH_COST_FLOOR_RAW));
    t.cost * factor
}

/// Technology stored just before `tech` when both share a folder.
pub fn folder_predecessor(state: &WorldState, tech: TechId) -> Option<TechId> {
    let index = tech.index().checked_sub(1)?;
    let prev = TechId(index as u32);
    (state.technology(prev).folder == state.technology(tech).folder).then_some(prev)
}
