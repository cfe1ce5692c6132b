//! Colonial points, claims and integration.

use crate::defines::colonization::{
    GUARD_FREE_LEVELS, INTEGRATION_MIN_POPULATION, INTEGRATION_POINTS_PER_PROVINCE,
};
use crate::fixed::Fixed;
use crate::state::{
    ClaimId, ColonizationClaim, NationId, ProvinceId, StateDefId, StateInstanceId, WorldState,
};

/// Colonial points not yet tied up in claims.
pub fn free_colonial_points(state: &WorldState, nation: NationId) -> i32 {
    let invested: i32 = state
        .claims
        .iter()
        .filter(|c| c.colonizer == nation)
        .map(|c| c.points_invested)
        .sum();
    state.nation(nation).colonial_points - invested
}

/// Points the next investment in `claim` costs, or `None` once the race is past
/// the influence stage.
pub fn investment_cost(state: &WorldState, claim: ClaimId) -> Option<i32> {
    let c = state.claim(claim);
    let config = &state.config;
    match state.state_definition(c.state).colonization_stage {
        0 | 1 => Some(config.colonization_interest_cost),
        2 if c.level <= GUARD_FREE_LEVELS => Some(config.colonization_influence_cost),
        2 => Some(
            config.colonization_influence_cost
                + config.colonization_extra_guard_cost * (c.level - GUARD_FREE_LEVELS) as i32,
        ),
        _ => None,
    }
}

/// Unowned land provinces of the state definition.
fn unowned_provinces(state: &WorldState, def: StateDefId) -> impl Iterator<Item = ProvinceId> + '_ {
    state
        .state_definition(def)
        .provinces
        .iter()
        .copied()
        .filter(move |&p| {
            let prov = state.province(p);
            prov.owner.is_none() && !prov.is_sea
        })
}

/// `nation` owns a province bordering one of the state's unowned provinces.
pub fn borders_state(state: &WorldState, nation: NationId, def: StateDefId) -> bool {
    unowned_provinces(state, def).any(|p| {
        state
            .province(p)
            .neighbors
            .iter()
            .any(|&q| state.province(q).owner == Some(nation))
    })
}

pub fn has_claim(state: &WorldState, nation: NationId, def: StateDefId) -> bool {
    state
        .state_definition(def)
        .claims
        .iter()
        .any(|&c| state.claim(c).colonizer == nation)
}

/// Cheap feasibility check for planting a first claim.
///
/// The nation must not already claim the state, must afford the start cost, and
/// must either border the state or reach one of its coastal provinces by sea.
pub fn fast_can_start_colony(
    state: &WorldState,
    nation: NationId,
    def: StateDefId,
    free_points: i32,
) -> bool {
    if state.state_definition(def).colonization_stage > 1 || has_claim(state, nation, def) {
        return false;
    }
    if unowned_provinces(state, def).next().is_none() {
        return false;
    }
    let adjacent = borders_state(state, nation, def);
    if free_points < state.config.colony_start_cost(adjacent) {
        return false;
    }
    let n = state.nation(nation);
    let has_port = n
        .owned_provinces
        .iter()
        .any(|&p| state.province(p).is_coast);
    let coastal_target = unowned_provinces(state, def).any(|p| state.province(p).is_coast);
    adjacent || (has_port && coastal_target)
}

/// Plants a level-1 claim and moves the state into the interest stage.
pub fn start_colony(state: &mut WorldState, nation: NationId, def: StateDefId, cost: i32) -> ClaimId {
    let id = ClaimId(state.claims.len() as u32);
    state.claims.push(ColonizationClaim {
        state: def,
        colonizer: nation,
        level: 1,
        points_invested: cost,
        last_investment: state.date,
    });
    let sd = &mut state.state_definitions[def.index()];
    sd.claims.push(id);
    if sd.colonization_stage == 0 {
        sd.colonization_stage = 1;
    }
    id
}

/// Invests in a claim, raising its level and resetting the cooldown.
pub fn increase_colonial_investment(state: &mut WorldState, claim: ClaimId, cost: i32) {
    let date = state.date;
    let c = &mut state.claims[claim.index()];
    c.points_invested += cost;
    c.level = c.level.saturating_add(1);
    c.last_investment = date;
}

/// Colonial state ready to become a regular state.
pub fn can_integrate_colony(state: &WorldState, si: StateInstanceId) -> bool {
    if !state.state_is_colonial(si) {
        return false;
    }
    let instance = state.state_instance(si);
    if instance.demographics.total < Fixed::from_int(INTEGRATION_MIN_POPULATION) {
        return false;
    }
    let needed = INTEGRATION_POINTS_PER_PROVINCE * state.provinces_of_state(si).count() as i32;
    free_colonial_points(state, instance.owner) >= needed
}

pub fn upgrade_colonial_state(state: &mut WorldState, si: StateInstanceId) {
    let provinces: Vec<ProvinceId> = state.provinces_of_state(si).collect();
    for p in provinces {
        state.province_mut(p).is_colonial = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::WorldStateBuilder;

    #[test]
    fn test_investment_cost_by_stage() {
        let mut state = WorldStateBuilder::new()
            .nations(1)
            .province(NationId(0))
            .unowned_state(&[false])
            .build();
        let def = StateDefId(1);
        let claim = start_colony(&mut state, NationId(0), def, 25);
        assert_eq!(investment_cost(&state, claim), Some(5));

        state.state_definitions[def.index()].colonization_stage = 2;
        assert_eq!(investment_cost(&state, claim), Some(10));

        state.claims[claim.index()].level = 6;
        assert_eq!(investment_cost(&state, claim), Some(10 + 4 * 2));

        state.state_definitions[def.index()].colonization_stage = 3;
        assert_eq!(investment_cost(&state, claim), None);
    }

    #[test]
    fn test_free_points_subtract_claims() {
        let mut state = WorldStateBuilder::new()
            .nations(1)
            .province(NationId(0))
            .unowned_state(&[true])
            .colonial_points(NationId(0), 60)
            .build();
        assert_eq!(free_colonial_points(&state, NationId(0)), 60);
        let claim = start_colony(&mut state, NationId(0), StateDefId(1), 25);
        increase_colonial_investment(&mut state, claim, 5);
        assert_eq!(free_colonial_points(&state, NationId(0)), 30);
        assert_eq!(state.claim(claim).level, 2);
    }

    #[test]
    fn test_start_needs_reach() {
        let state = WorldStateBuilder::new()
            .nations(1)
            .province(NationId(0))
            .unowned_state(&[false])
            .build();
        // Landlocked home, inland target, no shared border
        assert!(!fast_can_start_colony(&state, NationId(0), StateDefId(1), 100));
    }

    #[test]
    fn test_start_by_sea() {
        let mut state = WorldStateBuilder::new()
            .nations(1)
            .province(NationId(0))
            .unowned_state(&[true])
            .build();
        state.province_mut(ProvinceId(0)).is_coast = true;
        assert!(fast_can_start_colony(&state, NationId(0), StateDefId(1), 25));
        assert!(!fast_can_start_colony(&state, NationId(0), StateDefId(1), 24));
    }
}
