//! Decision adoption, evaluated in batches of nations.

use crate::fixed::Fixed;
use crate::notify::{Category, Message, Notification, NotificationSink};
use crate::rng;
use crate::state::{DecisionId, NationId, TriggerId, WorldState};
use crate::trigger::{apply_effect, evaluate_batch};
use rayon::prelude::*;
use std::ops::Range;
use tracing::instrument;

/// Evaluates an optional trigger over `range`; an absent trigger is true everywhere.
fn column(state: &WorldState, trigger: Option<TriggerId>, range: Range<usize>) -> Vec<bool> {
    match trigger {
        Some(t) => evaluate_batch(state, &state.triggers[t.index()], range)
            .into_iter()
            .map(Fixed::is_positive)
            .collect(),
        None => vec![true; range.len()],
    }
}

/// Nations in `range` that would take `decision` now.
fn batch_takers(state: &WorldState, decision: DecisionId, range: Range<usize>) -> Vec<NationId> {
    let d = &state.decisions[decision.index()];
    let potential = column(state, d.potential, range.clone());
    let allow = column(state, d.allow, range.clone());
    let will_do = column(state, d.ai_will_do, range.clone());

    range
        .enumerate()
        .filter(|&(i, n)| {
            let nation = &state.nations[n];
            potential[i] && !nation.is_player_controlled && nation.is_alive() && allow[i] && will_do[i]
        })
        .map(|(_, n)| NationId(n as u32))
        .collect()
}

/// Every nation that would take `decision`, in handle order.
pub fn decision_takers(state: &WorldState, decision: DecisionId) -> Vec<NationId> {
    let width = state.config.decision_batch_width.max(1);
    let count = state.nations.len();
    let batches: Vec<Range<usize>> = (0..count)
        .step_by(width)
        .map(|start| start..(start + width).min(count))
        .collect();

    let _span = tracing::info_span!("decisions_parallel", count = batches.len()).entered();
    batches
        .into_par_iter()
        .map(|range| batch_takers(state, decision, range))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

/// Applies every decision AI nations want and are allowed to take.
///
/// Returns the number of (nation, decision) effects applied.
#[instrument(skip_all, name = "ai_decisions")]
pub fn take_ai_decisions(state: &mut WorldState, sink: &mut dyn NotificationSink) -> usize {
    let mut taken = 0;
    for i in 0..state.decisions.len() {
        let decision = DecisionId(i as u32);
        let Some(effect) = state.decisions[i].effect else {
            continue;
        };

        for nation in decision_takers(state, decision) {
            let seed = rng::effect_seed(state.date, nation, decision);
            apply_effect(state, effect, nation, seed);
            log::debug!("{} took decision {}", nation, state.decisions[i].name);
            sink.post(Notification {
                date: state.date,
                category: Category::Decision,
                target: nation,
                message: Message::DecisionTaken { nation, decision },
            });
            taken += 1;
        }
    }
    taken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::testing::WorldStateBuilder;
    use crate::trigger::{EffectOp, TriggerProgram};

    const A: NationId = NationId(0);
    const B: NationId = NationId(1);
    const C: NationId = NationId(2);

    fn prog(src: &str) -> Option<TriggerProgram> {
        Some(TriggerProgram::parse(src).unwrap())
    }

    fn three_nations() -> WorldStateBuilder {
        WorldStateBuilder::new()
            .nations(3)
            .province(A)
            .province(B)
            .province(C)
            .great_power(A)
            .treasury(A, 500)
            .treasury(B, 50)
            .treasury(C, 500)
    }

    #[test]
    fn test_potential_gates_effect() {
        let mut state = three_nations()
            .decision(
                "gp_reform",
                prog("is_great_power"),
                None,
                None,
                vec![EffectOp::AddIndustrialScore(Fixed::from_int(5))],
            )
            .build();
        let mut sink = Vec::new();
        assert_eq!(take_ai_decisions(&mut state, &mut sink), 1);
        assert_eq!(state.nation(A).industrial_score, Fixed::from_int(5));
        assert_eq!(state.nation(B).industrial_score, Fixed::ZERO);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].category, Category::Decision);
        assert_eq!(sink[0].target, A);
    }

    #[test]
    fn test_all_conjuncts_required() {
        let mut state = three_nations()
            .decision(
                "spend",
                None,
                prog("treasury 100 >"),
                prog("is_great_power not"),
                vec![EffectOp::AddTreasury(Fixed::from_int(-100))],
            )
            .build();
        take_ai_decisions(&mut state, &mut Vec::new());
        // A fails ai_will_do, B fails allow
        assert_eq!(state.nation(A).treasury, Fixed::from_int(500));
        assert_eq!(state.nation(B).treasury, Fixed::from_int(50));
        assert_eq!(state.nation(C).treasury, Fixed::from_int(400));
    }

    #[test]
    fn test_players_and_dead_skipped() {
        let mut state = three_nations()
            .nations(1)
            .player(A)
            .decision("gift", None, None, None, vec![EffectOp::AddTreasury(Fixed::ONE)])
            .build();
        let taken = take_ai_decisions(&mut state, &mut Vec::new());
        assert_eq!(taken, 2);
        assert_eq!(state.nation(NationId(3)).treasury, Fixed::ZERO);
    }

    #[test]
    fn test_decision_without_effect_ignored() {
        let mut state = three_nations()
            .decision("empty", None, None, None, Vec::new())
            .build();
        assert_eq!(take_ai_decisions(&mut state, &mut Vec::new()), 0);
    }

    #[test]
    fn test_random_effect_is_seeded() {
        let build = || {
            three_nations()
                .decision(
                    "windfall",
                    None,
                    None,
                    None,
                    vec![EffectOp::RandomTreasury(Fixed::from_int(100))],
                )
                .build()
        };
        let mut first = build();
        let mut second = build();
        take_ai_decisions(&mut first, &mut Vec::new());
        take_ai_decisions(&mut second, &mut Vec::new());
        assert_eq!(first.checksum(), second.checksum());
    }

    mod properties {
        use super::*;
        use crate::trigger::evaluate;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn batching_matches_scalar_evaluation(
                treasuries in proptest::collection::vec(0i64..300, 1..40),
                players in proptest::collection::vec(any::<bool>(), 40),
                width in 1usize..9,
            ) {
                let count = treasuries.len();
                let mut b = WorldStateBuilder::new()
                    .config(AiConfig { decision_batch_width: width, ..AiConfig::default() })
                    .nations(count);
                for (i, &t) in treasuries.iter().enumerate() {
                    let n = NationId(i as u32);
                    b = b.province(n).treasury(n, t);
                    if players[i] {
                        b = b.player(n);
                    }
                }
                let state = b
                    .decision(
                        "rich",
                        prog("treasury 100 >"),
                        prog("treasury 250 <"),
                        prog("treasury 2 * 300 -"),
                        vec![EffectOp::AddTreasury(Fixed::ONE)],
                    )
                    .build();

                let scalar: Vec<NationId> = state
                    .nation_ids()
                    .filter(|&n| {
                        let triggers = &state.triggers;
                        !state.nation(n).is_player_controlled
                            && evaluate(&state, &triggers[0], n).is_positive()
                            && evaluate(&state, &triggers[1], n).is_positive()
                            && evaluate(&state, &triggers[2], n).is_positive()
                    })
                    .collect();
                prop_assert_eq!(decision_takers(&state, DecisionId(0)), scalar);
            }
        }
    }
}
