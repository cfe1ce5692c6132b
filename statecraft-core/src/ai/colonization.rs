//! Colonial races: investing in contested claims, planting new ones, integrating
//! mature colonies.

use crate::notify::{Category, Message, Notification, NotificationSink};
use crate::state::{ClaimId, NationId, StateDefId, StateInstanceId, WorldState};
use crate::systems::colonization::{
    borders_state, can_integrate_colony, fast_can_start_colony, free_colonial_points,
    increase_colonial_investment, investment_cost, start_colony, upgrade_colonial_state,
};
use crate::systems::diplomacy;
use tracing::instrument;

/// Whether the claim may receive an investment this tick, ignoring points.
fn claim_is_investable(state: &WorldState, claim: ClaimId) -> bool {
    let c = state.claim(claim);
    let def = state.state_definition(c.state);
    let config = &state.config;

    def.colonization_stage <= 2
        && state.crisis.colony != Some(c.state)
        && !(state.crisis.war.is_some() && diplomacy::is_at_war(state, c.colonizer))
        && def.claims.len() > 1
        && c.last_investment.add_days(config.colonization_days_between_investment) <= state.date
}

/// Each colonial rank invests in at most one contested claim per tick.
///
/// Returns the number of investments made.
#[instrument(skip_all, name = "ai_colonial_investment")]
pub fn update_ai_colonial_investment(state: &mut WorldState) -> usize {
    let max_rank = state.config.colonial_rank as usize;
    let mut chosen: Vec<Option<(ClaimId, i32)>> = vec![None; max_rank + 1];
    let mut free: Vec<Option<i32>> = vec![None; max_rank + 1];

    for i in 0..state.claims.len() {
        let claim = ClaimId(i as u32);
        let colonizer = state.claim(claim).colonizer;
        let n = state.nation(colonizer);
        let rank = n.colonial_rank as usize;

        if n.is_player_controlled || !n.is_alive() || rank == 0 || rank > max_rank {
            continue;
        }
        if chosen[rank].is_some() || !claim_is_investable(state, claim) {
            continue;
        }
        let Some(cost) = investment_cost(state, claim) else {
            continue;
        };
        let points = *free[rank].get_or_insert_with(|| free_colonial_points(state, colonizer));
        if points >= cost {
            chosen[rank] = Some((claim, cost));
        }
    }

    let mut invested = 0;
    for (claim, cost) in chosen.into_iter().flatten() {
        increase_colonial_investment(state, claim, cost);
        log::debug!("{} invested {} in {}", state.claim(claim).colonizer, cost, claim);
        invested += 1;
    }
    invested
}

/// Ranked colonizers plant claims on open states they can reach and afford.
///
/// Returns the number of claims started.
#[instrument(skip_all, name = "ai_colony_starting")]
pub fn update_ai_colony_starting(state: &mut WorldState, sink: &mut dyn NotificationSink) -> usize {
    let max_rank = state.config.colonial_rank;
    let ranked: Vec<NationId> = state
        .nations_by_colonial_rank()
        .into_iter()
        .filter(|&n| state.nation(n).colonial_rank <= max_rank)
        .collect();
    let mut free: Vec<i32> = ranked
        .iter()
        .map(|&n| {
            if state.nation(n).is_player_controlled || diplomacy::is_at_war_in_crisis(state, n) {
                0
            } else {
                free_colonial_points(state, n)
            }
        })
        .collect();

    let mut started = 0;
    for d in 0..state.state_definitions.len() {
        let def = StateDefId(d as u32);
        if state.state_definition(def).colonization_stage > 1 {
            continue;
        }
        for (i, &nation) in ranked.iter().enumerate() {
            if free[i] <= 0 || !fast_can_start_colony(state, nation, def, free[i]) {
                continue;
            }
            let cost = state.config.colony_start_cost(borders_state(state, nation, def));
            free[i] -= cost;
            start_colony(state, nation, def, cost);
            log::debug!("{} started a colony in {}", nation, def);
            sink.post(Notification {
                date: state.date,
                category: Category::Colonization,
                target: nation,
                message: Message::ColonyStarted { nation, state: def },
            });
            started += 1;
        }
    }
    started
}

/// Integrates every AI colonial state that meets the requirements.
#[instrument(skip_all, name = "ai_colony_upgrade")]
pub fn upgrade_colonies(state: &mut WorldState) -> usize {
    let ready: Vec<StateInstanceId> = (0..state.state_instances.len())
        .map(|i| StateInstanceId(i as u32))
        .filter(|&si| {
            !state.nation(state.state_instance(si).owner).is_player_controlled
                && can_integrate_colony(state, si)
        })
        .collect();
    for &si in &ready {
        upgrade_colonial_state(state, si);
    }
    ready.len()
}
