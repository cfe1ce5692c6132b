//! Great power influence: target ranking and the sphere state machine.
//!
//! A relationship moves `Neutral → Friendly → InSphere` only by spending
//! influence; the one backward edge is removing a rival power's sphere member.

use crate::defines::influence::{
    ADJACENCY_MULTIPLIER, CULTURE_GROUP_BONUS, FOREIGN_SPHERE_DIVISOR, TARGETS_PER_TIER,
};
use crate::fixed::Fixed;
use crate::notify::{Category, Message, Notification, NotificationSink};
use crate::state::{InfluenceLevel, InfluencePriority, NationId, WorldState};
use crate::systems::diplomacy;
use rayon::prelude::*;
use tracing::instrument;

/// Priority tiers from most to least urgent.
const TIERS: [InfluencePriority; 3] = [
    InfluencePriority::Three,
    InfluencePriority::Two,
    InfluencePriority::One,
];

/// How attractive `target` is to `great_power`.
///
/// Sums, over every commodity the power actually demands, the share of that demand
/// the target's market could cover times how undersupplied the power is. Shared
/// culture adds a flat bonus; otherwise a target already in some sphere is
/// discounted. Bordering targets are multiplied.
pub fn influence_weight(state: &WorldState, great_power: NationId, target: NationId) -> Fixed {
    let gp = state.nation(great_power);
    let t = state.nation(target);

    let mut weight = Fixed::ZERO;
    for (c, market) in gp.markets.iter().enumerate() {
        if market.real_demand <= Fixed::EPSILON {
            continue;
        }
        let pool = t
            .markets
            .get(c)
            .map(|m| m.domestic_market_pool)
            .unwrap_or(Fixed::ZERO);
        let share = pool
            .checked_ratio(market.real_demand)
            .unwrap_or(Fixed::ZERO)
            .min(Fixed::ONE);
        let unmet = (Fixed::ONE - market.demand_satisfaction).max(Fixed::ZERO);
        weight += share * unmet;
    }

    if gp.culture_group == t.culture_group {
        weight += Fixed::from_int(CULTURE_GROUP_BONUS);
    } else if t.in_sphere_of.is_some() {
        weight = weight / Fixed::from_int(FOREIGN_SPHERE_DIVISOR);
    }
    if state.are_adjacent(great_power, target) {
        weight = weight * Fixed::from_int(ADJACENCY_MULTIPLIER);
    }
    weight
}

/// Every nation `great_power` could court, best first (ties by ascending handle).
pub fn rank_influence_targets(state: &WorldState, great_power: NationId) -> Vec<NationId> {
    let limit = state.config.large_population_limit;
    let mut weighted: Vec<(Fixed, NationId)> = state
        .living_nations()
        .filter(|&t| {
            let n = state.nation(t);
            t != great_power
                && !n.is_great_power
                && n.in_sphere_of != Some(great_power)
                && n.demographics.total <= limit
        })
        .map(|t| (influence_weight(state, great_power, t), t))
        .collect();
    weighted.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    weighted.into_iter().map(|(_, t)| t).collect()
}

/// Recomputes the priority tier of every AI great power's relationships.
///
/// The top two targets get tier three, the next two tier two, the next two tier
/// one; everything else ends up with no priority bit. Player great powers keep
/// whatever priorities they set. Returns the number of priorities assigned.
#[instrument(skip_all, name = "ai_influence_priorities")]
pub fn update_influence_priorities(state: &mut WorldState) -> usize {
    // PHASE 1: Find AI great powers and reset their priorities
    let powers: Vec<NationId> = state
        .ai_nations()
        .filter(|&n| state.nation(n).is_great_power)
        .collect();

    for i in 0..state.gp_relationships.len() {
        let gp = state.gp_relationships[i].great_power;
        if !state.nation(gp).is_player_controlled {
            state.gp_relationships[i].status.clear_priority();
        }
    }

    // PHASE 2: Rank targets per power in parallel
    let rankings: Vec<(NationId, Vec<NationId>)> = {
        let _span = tracing::info_span!("influence_parallel", count = powers.len()).entered();
        let world = &*state;
        powers
            .into_par_iter()
            .map(|gp| {
                let mut ranked = rank_influence_targets(world, gp);
                ranked.truncate(TARGETS_PER_TIER * TIERS.len());
                (gp, ranked)
            })
            .collect()
    };

    // PHASE 3: Write tiers back
    let mut assigned = 0;
    for (gp, targets) in rankings {
        for (i, target) in targets.into_iter().enumerate() {
            let tier = TIERS[i / TARGETS_PER_TIER];
            let rel = state.force_create_gp_relationship(gp, target);
            state.gp_relationships[rel.index()]
                .status
                .set_priority(tier);
            assigned += 1;
        }
    }
    assigned
}

/// Spends accumulated influence, at most one action per relationship.
///
/// Returns the number of actions taken.
#[instrument(skip_all, name = "ai_influence_actions")]
pub fn perform_influence_actions(state: &mut WorldState, sink: &mut dyn NotificationSink) -> usize {
    let increase_cost = state.config.increase_opinion_cost;
    let remove_cost = state.config.remove_from_sphere_cost;
    let add_cost = state.config.add_to_sphere_cost;
    let penalty = state.config.remove_from_sphere_relation_penalty;
    let date = state.date;

    let mut actions = 0;
    for i in 0..state.gp_relationships.len() {
        let rel = &state.gp_relationships[i];
        let (gp, target, influence, status) = (rel.great_power, rel.target, rel.influence, rel.status);

        if state.nation(gp).is_player_controlled || status.is_banned() {
            continue;
        }
        // Any war on either side freezes the relationship, not only a war between the two
        if diplomacy::is_at_war(state, gp) || diplomacy::is_at_war(state, target) {
            continue;
        }
        let level = status.level();
        if level == InfluenceLevel::InSphere {
            continue;
        }
        let sphere = state.nation(target).in_sphere_of;

        if influence >= increase_cost && level == InfluenceLevel::Neutral {
            let rel = &mut state.gp_relationships[i];
            rel.influence -= increase_cost;
            rel.status.set_level(level.increased());
            sink.post(Notification {
                date,
                category: Category::IncreaseOpinion,
                target: gp,
                message: Message::OpinionIncreased {
                    great_power: gp,
                    target,
                    level: level.increased(),
                },
            });
            actions += 1;
        } else if let Some(displaced) = sphere.filter(|&other| {
            other != gp && influence >= remove_cost && level == InfluenceLevel::Friendly
        }) {
            state.gp_relationships[i].influence -= remove_cost;
            state.nation_mut(target).in_sphere_of = None;
            if let Some(other) = state.gp_relationship(displaced, target) {
                let status = &mut state.gp_relationships[other.index()].status;
                status.set_level(status.level().decreased());
            }
            diplomacy::adjust_relationship(state, gp, displaced, penalty);
            log::debug!("{} removed {} from the sphere of {}", gp, target, displaced);

            let message = Message::RemovedFromSphere {
                great_power: gp,
                displaced,
                target,
            };
            for to in [gp, displaced, target] {
                sink.post(Notification {
                    date,
                    category: Category::RemoveFromSphere,
                    target: to,
                    message: message.clone(),
                });
            }
            actions += 1;
        } else if sphere.is_none() && influence >= add_cost && level == InfluenceLevel::Friendly {
            let rel = &mut state.gp_relationships[i];
            rel.influence -= add_cost;
            rel.status.set_level(level.increased());
            state.nation_mut(target).in_sphere_of = Some(gp);
            log::debug!("{} added {} to its sphere", gp, target);

            for to in [gp, target] {
                sink.post(Notification {
                    date,
                    category: Category::AddToSphere,
                    target: to,
                    message: Message::AddedToSphere {
                        great_power: gp,
                        target,
                    },
                });
            }
            actions += 1;
        }
    }
    actions
}
