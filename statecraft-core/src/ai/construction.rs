//! Construction scheduler: factories first, then naval bases, railroads and forts.
//!
//! Each nation gets a project budget per tick. Every project created, whatever its
//! kind, spends one unit; the scheduler never touches projects already queued.

use crate::defines::economy::MAX_FACTORY_LEVEL;
use crate::error::ConstructionError;
use crate::fixed::Fixed;
use crate::rng;
use crate::state::{
    FactoryTypeId, IssueRules, NationId, PartyId, ProvinceBuildingKind, ProvinceId,
    StateInstanceId, WorldState,
};
use crate::systems::{map, politics};
use std::collections::HashMap;
use tracing::instrument;

/// Projects `nation` may start this tick: one per `treasury_per_project` of
/// treasury, never fewer than `min_projects`.
pub fn construction_budget(state: &WorldState, nation: NationId) -> i32 {
    let config = &state.config;
    let per_treasury = state
        .nation(nation)
        .treasury
        .checked_ratio(config.treasury_per_project)
        .map(|r| r.to_int().clamp(0, i32::MAX as i64) as i32)
        .unwrap_or(0);
    per_treasury.max(config.min_projects)
}

/// The scheduler runs only at full spending or above, and while the treasury is
/// shrinking.
fn is_investing(state: &WorldState, nation: NationId) -> bool {
    let n = state.nation(nation);
    n.spending_level >= Fixed::ONE && n.treasury < n.last_treasury
}

/// Appoints a party that allows factory construction, if one is available.
///
/// Only for weakly industrialized nations whose current rules forbid building.
fn bootstrap_industry(state: &mut WorldState, nation: NationId) -> Option<PartyId> {
    let config = &state.config;
    let n = state.nation(nation);
    if n.industrial_score >= config.industrial_bootstrap_score
        || n.issue_rules.contains(IssueRules::BUILD_FACTORY)
    {
        return None;
    }
    if !politics::can_appoint_ruling_party(state, nation)
        || politics::is_election_ongoing(state, nation)
    {
        return None;
    }
    if let Some(last) = n.ruling_party_last_appointed {
        if state.date.days_since(last) < config.ruling_party_cooldown_days {
            return None;
        }
    }

    let party = n.parties.iter().copied().find(|&p| {
        n.ruling_party != Some(p)
            && politics::party_is_allowed(state, nation, p)
            && state.party(p).issue_rules.contains(IssueRules::BUILD_FACTORY)
    })?;
    politics::appoint_ruling_party(state, nation, party);
    Some(party)
}

/// Factory types worth building.
///
/// Prefers types whose output the nation lacks; falls back to anything whose
/// inputs are fully supplied.
pub fn factory_candidates(state: &WorldState, nation: NationId) -> Vec<FactoryTypeId> {
    let n = state.nation(nation);
    let supplied: Vec<FactoryTypeId> = state
        .factory_type_ids()
        .filter(|&ft| {
            state.factory_type_available(nation, ft)
                && state
                    .factory_type(ft)
                    .inputs
                    .iter()
                    .all(|&c| n.demand_satisfaction(c) >= Fixed::ONE)
        })
        .collect();

    let short: Vec<FactoryTypeId> = supplied
        .iter()
        .copied()
        .filter(|&ft| n.demand_satisfaction(state.factory_type(ft).output) < Fixed::ONE)
        .collect();

    if short.is_empty() {
        supplied
    } else {
        short
    }
}

/// Owned non-colonial states, most populous first.
fn states_by_population(state: &WorldState, nation: NationId) -> Vec<StateInstanceId> {
    let mut states: Vec<StateInstanceId> = state
        .nation(nation)
        .owned_states
        .iter()
        .copied()
        .filter(|&si| !state.state_is_colonial(si))
        .collect();
    states.sort_by(|&a, &b| {
        let pa = state.state_instance(a).demographics.total;
        let pb = state.state_instance(b).demographics.total;
        pb.cmp(&pa).then(a.cmp(&b))
    });
    states
}

/// Logs a rejected project. Guards upstream make this unreachable.
fn report_rejected(err: ConstructionError) {
    log::warn!("Skipping construction: {}", err);
    debug_assert!(false, "construction guard missed: {}", err);
}

fn queue_factory(
    state: &mut WorldState,
    si: StateInstanceId,
    nation: NationId,
    ft: FactoryTypeId,
    upgrade: bool,
    budget: &mut i32,
) {
    match state.create_state_construction(si, nation, ft, upgrade) {
        Ok(_) => *budget -= 1,
        Err(e) => report_rejected(e),
    }
}

fn schedule_factories(state: &mut WorldState, nation: NationId, seed: u64, budget: &mut i32) {
    let rules = state.nation(nation).issue_rules;
    let can_build = rules.contains(IssueRules::BUILD_FACTORY);
    let can_expand = rules.contains(IssueRules::EXPAND_FACTORY);
    if !can_build && !can_expand {
        return;
    }

    let candidates = factory_candidates(state, nation);
    if candidates.is_empty() {
        return;
    }
    let cap = state.config.factories_per_state.max(0) as usize;

    for si in states_by_population(state, nation) {
        if *budget <= 0 {
            break;
        }
        if state.state_instance(si).demographics.factory_workers_saturated() {
            continue;
        }

        if !can_build {
            // Upgrade-only: first profitable candidate factory with headroom
            let upgrade = state
                .factories_in_state(si)
                .find(|f| {
                    candidates.contains(&f.factory_type)
                        && !f.unprofitable
                        && f.level < MAX_FACTORY_LEVEL
                        && !state.factory_in_progress(si, f.factory_type)
                })
                .map(|f| f.factory_type);
            if let Some(ft) = upgrade {
                queue_factory(state, si, nation, ft, true, budget);
            }
            continue;
        }

        let roll = rng::draw(seed, nation.0 as u64 + *budget as u64);
        let ft = candidates[(roll % candidates.len() as u64) as usize];
        if state.factory_type(ft).is_coastal && !state.state_is_coastal(si) {
            continue;
        }
        if state.factory_in_progress(si, ft) {
            continue;
        }

        let existing = state
            .factories_in_state(si)
            .find(|f| f.factory_type == ft)
            .map(|f| f.level);
        // Without EXPAND_FACTORY an existing type gets a second factory if there is room.
        // No forced demolition when the state is full.
        match existing {
            Some(level) if can_expand && level < MAX_FACTORY_LEVEL => {
                queue_factory(state, si, nation, ft, true, budget);
            }
            _ if state.state_factory_count(si) < cap => {
                queue_factory(state, si, nation, ft, false, budget);
            }
            _ => {}
        }
    }
}

/// Provinces that could take one more level of `kind`.
fn building_candidates(
    state: &WorldState,
    nation: NationId,
    kind: ProvinceBuildingKind,
) -> Vec<ProvinceId> {
    let max = state.nation(nation).max_building_levels.get(kind);
    state
        .nation(nation)
        .owned_provinces
        .iter()
        .copied()
        .filter(|&p| {
            let prov = state.province(p);
            let level = prov.buildings.get(kind) as u16 + prov.min_build.get(kind) as u16;
            prov.controller == Some(nation)
                && !prov.under_siege
                && (kind != ProvinceBuildingKind::NavalBase || prov.is_coast)
                && level < max as u16
                && !state.province_building_in_progress(p, kind)
        })
        .collect()
}

fn schedule_buildings(state: &mut WorldState, nation: NationId, budget: &mut i32) {
    let mut distances: Option<HashMap<ProvinceId, u32>> = None;
    let railways = state
        .nation(nation)
        .issue_rules
        .contains(IssueRules::BUILD_RAILWAY);

    for kind in ProvinceBuildingKind::ALL {
        if *budget <= 0 {
            return;
        }
        if kind == ProvinceBuildingKind::Railroad && !railways {
            continue;
        }
        let mut provinces = building_candidates(state, nation, kind);
        if provinces.is_empty() {
            continue;
        }
        let dist = distances.get_or_insert_with(|| map::distances_from_capital(state, nation));
        map::sort_by_distance(&mut provinces, dist);

        for p in provinces {
            if *budget <= 0 {
                return;
            }
            // One new naval base per state at a time
            let new_base = kind == ProvinceBuildingKind::NavalBase
                && state.province(p).buildings.get(kind) == 0;
            let si = state.province(p).state_instance;
            if new_base && si.is_some_and(|si| state.state_instance(si).naval_base_is_taken) {
                continue;
            }
            match state.create_province_construction(p, nation, kind) {
                Ok(_) => {
                    *budget -= 1;
                    if let (true, Some(si)) = (new_base, si) {
                        state.state_instance_mut(si).naval_base_is_taken = true;
                    }
                }
                Err(e) => report_rejected(e),
            }
        }
    }
}

/// Projects created for one nation this tick.
fn schedule_nation(state: &mut WorldState, nation: NationId, seed: u64) -> usize {
    let budget = construction_budget(state, nation);
    let mut remaining = budget;

    if let Some(party) = bootstrap_industry(state, nation) {
        log::debug!("{} appointed {} to allow factories", nation, party);
    }
    schedule_factories(state, nation, seed, &mut remaining);
    schedule_buildings(state, nation, &mut remaining);

    (budget - remaining) as usize
}

/// Queues construction for every investing AI nation. Returns projects created.
#[instrument(skip_all, name = "ai_construction")]
pub fn update_ai_econ_construction(state: &mut WorldState) -> usize {
    let seed = rng::tick_seed(state.rng_seed, state.date);
    let nations: Vec<NationId> = state
        .ai_nations()
        .filter(|&n| is_investing(state, n))
        .collect();

    let mut created = 0;
    for n in nations {
        created += schedule_nation(state, n, seed);
    }
    created
}
