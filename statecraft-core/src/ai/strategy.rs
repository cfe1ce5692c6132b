//! Threat assessment and rival selection.

use crate::defines::strategy::MAX_RELATION;
use crate::fixed::Fixed;
use crate::notify::{Category, Message, Notification, NotificationSink};
use crate::state::{NationId, WorldState};
use crate::systems::{diplomacy, nations};
use tracing::instrument;

/// Military picture of one nation as seen by its AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrengthAssessment {
    /// 1.2, or 1.8 after a recent lost war
    pub safety_factor: Fixed,
    /// Strongest bordering nation that is neither allied nor a sphere-mate
    pub greatest_neighbor: Fixed,
    /// Own score plus a share of every subject's score
    pub self_strength: Fixed,
    /// `self_strength` plus sphere leader and allies
    pub defensive_strength: Fixed,
}

impl StrengthAssessment {
    pub fn is_threatened(&self) -> bool {
        self.defensive_strength < self.safety_factor * self.greatest_neighbor
    }
}

pub fn assess(state: &WorldState, nation: NationId) -> StrengthAssessment {
    let config = &state.config;
    let n = state.nation(nation);

    let recent_loss = n
        .last_war_loss
        .is_some_and(|loss| state.date.days_since(loss) < config.war_loss_memory_days);
    let safety_factor = if recent_loss {
        config.war_loss_safety_factor
    } else {
        config.safety_factor
    };

    let sphere = n.in_sphere_of;
    let greatest_neighbor = n
        .neighbors
        .iter()
        .filter(|&&other| {
            let same_sphere = sphere.is_some() && sphere == state.nation(other).in_sphere_of;
            !diplomacy::are_allied(state, nation, other) && !same_sphere
        })
        .map(|&other| state.nation(other).military_score)
        .max()
        .unwrap_or(Fixed::ZERO);

    let self_strength = n.military_score
        + state
            .subjects_of(nation)
            .map(|s| config.subject_strength_share * state.nation(s).military_score)
            .sum::<Fixed>();

    let sphere_strength = sphere
        .map(|leader| state.nation(leader).military_score)
        .unwrap_or(Fixed::ZERO);
    let ally_strength: Fixed = state
        .diplomacy
        .relations
        .iter()
        .filter(|(_, rel)| rel.allied)
        .filter_map(|(&(a, b), _)| match (a == nation, b == nation) {
            (true, false) => Some(b),
            (false, true) => Some(a),
            _ => None,
        })
        .map(|ally| state.nation(ally).military_score)
        .sum();

    StrengthAssessment {
        safety_factor,
        greatest_neighbor,
        self_strength,
        defensive_strength: self_strength + sphere_strength + ally_strength,
    }
}

/// Lowest-relation neighbour inside the rival strength band, first in scan order on ties.
fn pick_rival(state: &WorldState, nation: NationId, assessment: &StrengthAssessment) -> Option<NationId> {
    let config = &state.config;
    let threatened = assessment.is_threatened();
    let lower = assessment.self_strength * config.rival_min_ratio;
    let upper = assessment.self_strength * config.rival_max_ratio;

    let mut min_relation = Fixed::from_int(MAX_RELATION);
    let mut potential = None;
    for &other in &state.nation(nation).neighbors {
        let o = state.nation(other);
        if !o.is_alive() || o.overlord.is_some() || o.in_sphere_of == Some(nation) {
            continue;
        }
        if threatened && diplomacy::are_allied(state, nation, other) {
            continue;
        }
        if !(lower < o.military_score && o.military_score <= upper) {
            continue;
        }
        let relation = state.relation(nation, other).value;
        if relation < min_relation {
            min_relation = relation;
            potential = Some(other);
        }
    }
    potential
}

fn should_drop_rival(state: &WorldState, nation: NationId, rival: NationId, self_strength: Fixed) -> bool {
    let r = state.nation(rival);
    let multiple = Fixed::from_int(state.config.rival_drop_multiple);
    !r.is_alive()
        || r.overlord.is_some()
        || r.in_sphere_of == Some(nation)
        || r.military_score * multiple < self_strength
        || self_strength * multiple < r.military_score
}

/// Recomputes every nation's threat flag and chooses or drops rivals.
///
/// Returns the number of rivals newly chosen.
#[instrument(skip_all, name = "ai_strategy")]
pub fn update_ai_general_status(state: &mut WorldState, sink: &mut dyn NotificationSink) -> usize {
    let mut rivals_chosen = 0;

    for n in (0..state.nations.len() as u32).map(NationId) {
        if !state.nation(n).is_alive() {
            nations::clear_dead_nation(state, n);
            continue;
        }

        let assessment = assess(state, n);
        state.nation_mut(n).ai_is_threatened = assessment.is_threatened();

        match state.nation(n).ai_rival {
            None => {
                if let Some(rival) = pick_rival(state, n, &assessment) {
                    if !state.nation(n).is_player_controlled && diplomacy::are_allied(state, n, rival) {
                        diplomacy::cancel_alliance(state, n, rival);
                        for target in [n, rival] {
                            sink.post(Notification {
                                date: state.date,
                                category: Category::Alliance,
                                target,
                                message: Message::AllianceCancelled {
                                    first: n,
                                    second: rival,
                                },
                            });
                        }
                    }
                    state.nation_mut(n).ai_rival = Some(rival);
                    rivals_chosen += 1;
                    log::debug!("{} chose {} as rival", n, rival);
                }
            }
            Some(rival) => {
                if should_drop_rival(state, n, rival, assessment.self_strength) {
                    state.nation_mut(n).ai_rival = None;
                    log::debug!("{} dropped rival {}", n, rival);
                }
            }
        }
    }

    rivals_chosen
}
