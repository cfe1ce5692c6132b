//! Technology choice for AI nations.

use crate::fixed::Fixed;
use crate::rng;
use crate::state::{NationId, NationalModifier, TechCategory, TechId, WorldState};
use crate::systems::tech::{effective_technology_cost, folder_predecessor};
use rayon::prelude::*;
use tracing::instrument;

const BASE_WEIGHT: i64 = 1000;

/// Multiplier a granted national modifier applies to a technology's weight.
fn modifier_factor(modifier: NationalModifier) -> Fixed {
    use NationalModifier::*;
    match modifier {
        ResearchPoints | ResearchPointsModifier => Fixed::from_int(3),
        EducationEfficiency | EducationEfficiencyModifier => Fixed::TWO,
        PopGrowth | ColonialLifeRating => Fixed::from_raw(16_000),
        MaxNationalFocus => Fixed::from_raw(17_000),
        RgoOutput | FactoryOutput | FactoryThroughput | FactoryInput => Fixed::from_raw(12_000),
        Other => Fixed::ONE,
    }
}

/// Computes every technology's static AI weight. Run once after loading.
#[instrument(skip_all, name = "ai_tech_weights")]
pub fn initialize_ai_tech_weights(state: &mut WorldState) {
    for i in 0..state.technologies.len() {
        let category = state.tech_category(TechId(i as u32));
        let tech = &mut state.technologies[i];

        let mut weight = Fixed::from_int(BASE_WEIGHT);
        if category == TechCategory::Army {
            weight *= Fixed::from_raw(15_000);
        }
        if tech.increases_naval_base {
            weight *= Fixed::from_raw(11_000);
        } else if category == TechCategory::Navy {
            weight *= Fixed::from_raw(9_000);
        }
        for &(modifier, _) in &tech.modifiers {
            weight *= modifier_factor(modifier);
        }
        tech.ai_weight = weight;
    }
}

/// Technologies `nation` may start now: arrived, unresearched, with the in-folder
/// predecessor (if any) done.
pub fn research_candidates(state: &WorldState, nation: NationId) -> Vec<TechId> {
    let n = state.nation(nation);
    let year = state.date.year();
    state
        .technology_ids()
        .filter(|&t| {
            !n.has_researched(t)
                && state.technology(t).year <= year
                && folder_predecessor(state, t).map_or(true, |p| n.has_researched(p))
        })
        .collect()
}

/// Highest weight-per-cost candidate; ties go to the larger `handle ^ draw`.
fn pick_research(state: &WorldState, nation: NationId, seed: u64) -> Option<TechId> {
    let n = state.nation(nation);
    let rval = rng::draw(seed, nation.0 as u64);

    research_candidates(state, nation)
        .into_iter()
        .map(|t| {
            let mut weight = state.technology(t).ai_weight;
            if n.ai_is_threatened && state.tech_category(t) == TechCategory::Army {
                weight = weight + weight;
            }
            let cost = effective_technology_cost(state, t).max(Fixed::ONE);
            (weight / cost, t.0 as u64 ^ rval, t)
        })
        .max_by_key(|&(weight, key, _)| (weight, key))
        .map(|(_, _, t)| t)
}

/// Starts research for every idle AI nation. Returns the number started.
#[instrument(skip_all, name = "ai_research")]
pub fn update_ai_research(state: &mut WorldState) -> usize {
    // PHASE 1: Idle, civilized AI nations
    let idle: Vec<NationId> = state
        .ai_nations()
        .filter(|&n| {
            let nation = state.nation(n);
            nation.current_research.is_none() && nation.is_civilized
        })
        .collect();
    let seed = rng::tick_seed(state.rng_seed, state.date);

    // PHASE 2: Pick in parallel; each nation reads only its own flags
    let picks: Vec<(NationId, TechId)> = {
        let _span = tracing::info_span!("research_parallel", count = idle.len()).entered();
        let world = &*state;
        idle.into_par_iter()
            .filter_map(|n| pick_research(world, n, seed).map(|t| (n, t)))
            .collect()
    };

    // PHASE 3: Apply
    let started = picks.len();
    for (n, t) in picks {
        log::trace!("{} researching {}", n, t);
        state.nation_mut(n).current_research = Some(t);
    }
    started
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::WorldStateBuilder;

    const A: NationId = NationId(0);
    const B: NationId = NationId(1);

    /// Army folder: T0 (1836, 100), T1 (1837, 100).
    /// Commerce folder: T2 (1836, 60), T3 (1850, 10).
    fn world() -> WorldState {
        WorldStateBuilder::new()
            .date(1840, 1, 1)
            .nations(2)
            .province(A)
            .province(B)
            .folder("army", TechCategory::Army)
            .folder("commerce", TechCategory::Commerce)
            .tech(0, 1836, 100)
            .tech(0, 1837, 100)
            .tech(1, 1836, 60)
            .tech(1, 1850, 10)
            .build()
    }

    #[test]
    fn test_candidates_follow_folder_order() {
        let mut state = world();
        assert_eq!(research_candidates(&state, A), vec![TechId(0), TechId(2)]);

        state.nation_mut(A).researched[0] = true;
        assert_eq!(research_candidates(&state, A), vec![TechId(1), TechId(2)]);
    }

    #[test]
    fn test_cheapest_per_weight_wins() {
        let mut state = world();
        assert_eq!(update_ai_research(&mut state), 2);
        assert_eq!(state.nation(A).current_research, Some(TechId(2)));
    }

    #[test]
    fn test_threat_favors_army() {
        let mut state = world();
        state.nation_mut(A).ai_is_threatened = true;
        update_ai_research(&mut state);
        assert_eq!(state.nation(A).current_research, Some(TechId(0)));
        assert_eq!(state.nation(B).current_research, Some(TechId(2)));
    }

    #[test]
    fn test_skipped_nations() {
        let mut state = world();
        state.nation_mut(A).is_player_controlled = true;
        state.nation_mut(B).is_civilized = false;
        assert_eq!(update_ai_research(&mut state), 0);

        let mut state = world();
        state.nation_mut(A).current_research = Some(TechId(1));
        update_ai_research(&mut state);
        assert_eq!(state.nation(A).current_research, Some(TechId(1)));
    }

    #[test]
    fn test_tie_break_is_reproducible() {
        // Two identical technologies in separate folders
        let build = || {
            WorldStateBuilder::new()
                .seed(7)
                .nations(4)
                .province(NationId(0))
                .province(NationId(1))
                .province(NationId(2))
                .province(NationId(3))
                .folder("a", TechCategory::Culture)
                .folder("b", TechCategory::Culture)
                .tech(0, 1836, 100)
                .tech(1, 1836, 100)
                .build()
        };
        let mut first = build();
        let mut second = build();
        update_ai_research(&mut first);
        update_ai_research(&mut second);
        for n in first.nation_ids() {
            let pick = first.nation(n).current_research;
            assert!(matches!(pick, Some(TechId(0)) | Some(TechId(1))));
            assert_eq!(pick, second.nation(n).current_research);
        }
    }

    #[test]
    fn test_static_weights() {
        let mut state = WorldStateBuilder::new()
            .folder("army", TechCategory::Army)
            .folder("navy", TechCategory::Navy)
            .folder("commerce", TechCategory::Commerce)
            .folder("industry", TechCategory::Industry)
            .tech(0, 1836, 100)
            .tech(1, 1836, 100)
            .tech(1, 1836, 100)
            .tech(2, 1836, 100)
            .tech(3, 1836, 100)
            .tech_modifier(TechId(3), NationalModifier::ResearchPoints, 1)
            .tech_modifier(TechId(4), NationalModifier::FactoryOutput, 1)
            .tech_modifier(TechId(4), NationalModifier::FactoryInput, 1)
            .build();
        state.technologies[2].increases_naval_base = true;

        initialize_ai_tech_weights(&mut state);
        let weights: Vec<_> = state.technologies.iter().map(|t| t.ai_weight).collect();
        assert_eq!(
            weights,
            vec![
                Fixed::from_int(1500),
                Fixed::from_int(900),
                Fixed::from_int(1100),
                Fixed::from_int(3000),
                Fixed::from_int(1440),
            ]
        );
    }
}
