//! Alliance formation plus the acceptance tests other nations' requests go through.

use crate::notify::{Category, Message, Notification, NotificationSink};
use crate::state::{NationId, WorldState};
use crate::systems::diplomacy::{self, WarSide};
use tracing::instrument;

/// Why an AI would or would not accept an alliance offer.
///
/// Each flag is one named condition so a presentation layer can explain a refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllianceAssessment {
    /// The receiving nation feels threatened
    pub threatened: bool,
    /// Neither side has marked the other as rival
    pub not_rivals: bool,
    /// Capitals share a continent, or the nations border each other
    pub close_enough: bool,
    /// Requester's score is at least half the receiver's
    pub strong_enough: bool,
}

impl AllianceAssessment {
    pub fn evaluate(state: &WorldState, target: NationId, from: NationId) -> Self {
        let t = state.nation(target);
        let f = state.nation(from);

        let same_continent = match (t.capital, f.capital) {
            (Some(a), Some(b)) => state.province(a).continent == state.province(b).continent,
            _ => false,
        };

        Self {
            threatened: t.ai_is_threatened,
            not_rivals: t.ai_rival != Some(from) && f.ai_rival != Some(target),
            close_enough: same_continent || state.are_adjacent(target, from),
            strong_enough: f.military_score + f.military_score >= t.military_score,
        }
    }

    pub fn accepts(&self) -> bool {
        self.threatened && self.not_rivals && self.close_enough && self.strong_enough
    }
}

/// Would `target` accept an alliance proposed by `from`?
pub fn ai_will_accept_alliance(state: &WorldState, target: NationId, from: NationId) -> bool {
    AllianceAssessment::evaluate(state, target, from).accepts()
}

/// Would `target` grant military access to `from`?
///
/// Only a nation at war gets access, never the target's own rival. Fighting the
/// target's rival, or anyone the target itself is fighting, earns it.
pub fn ai_will_grant_access(state: &WorldState, target: NationId, from: NationId) -> bool {
    if !diplomacy::is_at_war(state, from) {
        return false;
    }
    let rival = state.nation(target).ai_rival;
    if rival == Some(from) {
        return false;
    }
    if rival.is_some_and(|r| diplomacy::are_at_war(state, from, r)) {
        return true;
    }

    diplomacy::wars(state).any(|(_, war)| {
        let enemies = match diplomacy::war_side(war, target) {
            Some(WarSide::Attacker) => &war.defenders,
            Some(WarSide::Defender) => &war.attackers,
            None => return false,
        };
        enemies
            .iter()
            .any(|&enemy| diplomacy::are_at_war(state, enemy, from))
    })
}

/// Threatened AI nations ally with their strongest willing neighbour.
///
/// Returns the number of alliances formed.
#[instrument(skip_all, name = "ai_alliances")]
pub fn form_alliances(state: &mut WorldState, sink: &mut dyn NotificationSink) -> usize {
    let mut formed = 0;
    let nations: Vec<NationId> = state.ai_nations().collect();

    for n in nations {
        let me = state.nation(n);
        if !me.ai_is_threatened || me.overlord.is_some() {
            continue;
        }

        let best = me
            .neighbors
            .iter()
            .copied()
            .filter(|&other| {
                let o = state.nation(other);
                o.is_alive()
                    && !o.is_player_controlled
                    && o.overlord.is_none()
                    && !diplomacy::are_allied(state, n, other)
                    && !diplomacy::are_at_war(state, other, n)
                    && ai_will_accept_alliance(state, other, n)
            })
            .max_by_key(|&other| (state.nation(other).military_score, other));

        if let Some(ally) = best {
            diplomacy::make_alliance(state, n, ally);
            formed += 1;
            log::debug!("{} allied with {}", n, ally);
            for target in [n, ally] {
                sink.post(Notification {
                    date: state.date,
                    category: Category::Alliance,
                    target,
                    message: Message::AllianceFormed {
                        first: n,
                        second: ally,
                    },
                });
            }
        }
    }

    formed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ContinentId;
    use crate::testing::WorldStateBuilder;

    const A: NationId = NationId(0);
    const B: NationId = NationId(1);
    const C: NationId = NationId(2);
    const D: NationId = NationId(3);

    /// A is threatened; B and C border A and are threatened too.
    fn threatened_trio() -> WorldState {
        let mut state = WorldStateBuilder::new()
            .nations(3)
            .province(A)
            .province(B)
            .province(C)
            .border(A, B)
            .border(A, C)
            .military(A, 50)
            .military(B, 80)
            .military(C, 60)
            .build();
        for n in [A, B, C] {
            state.nation_mut(n).ai_is_threatened = true;
        }
        state
    }

    #[test]
    fn test_assessment_conditions() {
        let mut state = threatened_trio();
        let assessment = AllianceAssessment::evaluate(&state, B, A);
        assert!(assessment.accepts());

        state.nation_mut(B).military_score = crate::fixed::Fixed::from_int(101);
        let assessment = AllianceAssessment::evaluate(&state, B, A);
        assert!(!assessment.strong_enough);
        assert!(assessment.threatened && assessment.not_rivals && assessment.close_enough);

        state.nation_mut(A).ai_rival = Some(B);
        assert!(!AllianceAssessment::evaluate(&state, B, A).not_rivals);
    }

    #[test]
    fn test_distance_requirement() {
        let mut state = WorldStateBuilder::new()
            .nations(2)
            .province(A)
            .province(B)
            .build();
        state.nation_mut(B).ai_is_threatened = true;
        // Same (default) continent, no border
        assert!(AllianceAssessment::evaluate(&state, B, A).close_enough);
        let capital = state.nation(B).capital.unwrap();
        state.province_mut(capital).continent = ContinentId(1);
        assert!(!AllianceAssessment::evaluate(&state, B, A).close_enough);
    }

    #[test]
    fn test_picks_strongest_willing_neighbor() {
        let mut state = threatened_trio();
        let mut sink = Vec::new();
        let formed = form_alliances(&mut state, &mut sink);
        // A takes the stronger B; C then allies with A, its only neighbour
        assert!(diplomacy::are_allied(&state, A, B));
        assert_eq!(formed, 2);
        assert!(diplomacy::are_allied(&state, C, A));
        assert_eq!(sink.len(), 4);
    }

    #[test]
    fn test_skips_players_and_unthreatened() {
        let mut state = threatened_trio();
        state.nation_mut(B).is_player_controlled = true;
        state.nation_mut(C).ai_is_threatened = false;
        let formed = form_alliances(&mut state, &mut Vec::new());
        assert_eq!(formed, 0);
    }

    #[test]
    fn test_no_alliance_with_enemy() {
        let mut state = threatened_trio();
        diplomacy::declare_war(&mut state, A, B);
        form_alliances(&mut state, &mut Vec::new());
        assert!(!diplomacy::are_allied(&state, A, B));
        assert!(diplomacy::are_allied(&state, A, C));
    }

    #[test]
    fn test_access_rules() {
        let mut state = WorldStateBuilder::new()
            .nations(4)
            .province(A)
            .province(B)
            .province(C)
            .province(D)
            .build();
        // Requester at peace: refused
        assert!(!ai_will_grant_access(&state, A, B));

        // B fights A's rival C: granted
        state.nation_mut(A).ai_rival = Some(C);
        diplomacy::declare_war(&mut state, B, C);
        assert!(ai_will_grant_access(&state, A, B));

        // Never to the rival itself
        assert!(!ai_will_grant_access(&state, A, C));
    }

    #[test]
    fn test_access_for_cobelligerent() {
        let mut state = WorldStateBuilder::new()
            .nations(4)
            .province(A)
            .province(B)
            .province(C)
            .province(D)
            .build();
        // A fights D; B also fights D in a separate war
        diplomacy::declare_war(&mut state, A, D);
        diplomacy::declare_war(&mut state, B, D);
        assert!(ai_will_grant_access(&state, A, B));
        // C fights nobody A is fighting
        diplomacy::declare_war(&mut state, C, B);
        assert!(!ai_will_grant_access(&state, A, C));
    }
}
