//! Trigger and effect interpreter.
//!
//! Designer-authored conditions are compiled into an immutable postfix
//! instruction list ([`TriggerProgram`]). Programs are validated once when they
//! are built, so evaluation cannot fail.
//!
//! Two entry points share the same instruction semantics:
//!
//! - [`evaluate`]: one nation, one value
//! - [`evaluate_batch`]: a contiguous nation range, one column of values per
//!   stack slot
//!
//! For every program and range, `evaluate_batch(s, p, r)[i] == evaluate(s, p, r.start + i)`.
//! The batched path exists for throughput only.
//!
//! Truth values are `Fixed::ONE`/`Fixed::ZERO`; any positive value counts as true.

use crate::error::TriggerError;
use crate::fixed::Fixed;
use crate::state::{EffectId, IssueRules, NationId, WorldState};
use crate::systems::{diplomacy, politics};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Nation attribute readable by a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    MilitaryScore,
    IndustrialScore,
    Treasury,
    Population,
    OwnedProvinces,
    ColonialRank,
    IsGreatPower,
    IsCivilized,
    IsThreatened,
    IsAtWar,
    HasRival,
    /// Current year (same for every nation)
    Year,
    /// 1 if the combined issue rules contain the mask
    HasIssueRule(IssueRules),
}

impl Field {
    pub fn from_name(name: &str) -> Option<Field> {
        Some(match name {
            "military_score" => Field::MilitaryScore,
            "industrial_score" => Field::IndustrialScore,
            "treasury" => Field::Treasury,
            "population" => Field::Population,
            "owned_provinces" => Field::OwnedProvinces,
            "colonial_rank" => Field::ColonialRank,
            "is_great_power" => Field::IsGreatPower,
            "is_civilized" => Field::IsCivilized,
            "is_threatened" => Field::IsThreatened,
            "is_at_war" => Field::IsAtWar,
            "has_rival" => Field::HasRival,
            "year" => Field::Year,
            "can_build_factory" => Field::HasIssueRule(IssueRules::BUILD_FACTORY),
            "can_expand_factory" => Field::HasIssueRule(IssueRules::EXPAND_FACTORY),
            "can_build_railway" => Field::HasIssueRule(IssueRules::BUILD_RAILWAY),
            _ => return None,
        })
    }

    fn load(self, state: &WorldState, nation: NationId) -> Fixed {
        let n = state.nation(nation);
        match self {
            Field::MilitaryScore => n.military_score,
            Field::IndustrialScore => n.industrial_score,
            Field::Treasury => n.treasury,
            Field::Population => n.demographics.total,
            Field::OwnedProvinces => Fixed::from_int(n.owned_provinces.len() as i64),
            Field::ColonialRank => Fixed::from_int(n.colonial_rank as i64),
            Field::IsGreatPower => truth(n.is_great_power),
            Field::IsCivilized => truth(n.is_civilized),
            Field::IsThreatened => truth(n.ai_is_threatened),
            Field::IsAtWar => truth(diplomacy::is_at_war(state, nation)),
            Field::HasRival => truth(n.ai_rival.is_some()),
            Field::Year => Fixed::from_int(state.date.year() as i64),
            Field::HasIssueRule(mask) => truth(n.issue_rules.contains(mask)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerOp {
    Const(Fixed),
    Load(Field),
    Add,
    Sub,
    Mul,
    Gt,
    Ge,
    Lt,
    Eq,
    And,
    Or,
    Not,
}

impl TriggerOp {
    /// (values popped, values pushed)
    fn arity(self) -> (usize, usize) {
        match self {
            TriggerOp::Const(_) | TriggerOp::Load(_) => (0, 1),
            TriggerOp::Not => (1, 1),
            _ => (2, 1),
        }
    }
}

#[inline]
fn truth(b: bool) -> Fixed {
    if b {
        Fixed::ONE
    } else {
        Fixed::ZERO
    }
}

#[inline]
fn binary(op: TriggerOp, a: Fixed, b: Fixed) -> Fixed {
    match op {
        TriggerOp::Add => a.saturating_add(b),
        TriggerOp::Sub => a.saturating_sub(b),
        TriggerOp::Mul => a * b,
        TriggerOp::Gt => truth(a > b),
        TriggerOp::Ge => truth(a >= b),
        TriggerOp::Lt => truth(a < b),
        TriggerOp::Eq => truth(a == b),
        TriggerOp::And => truth(a.is_positive() && b.is_positive()),
        TriggerOp::Or => truth(a.is_positive() || b.is_positive()),
        TriggerOp::Const(_) | TriggerOp::Load(_) | TriggerOp::Not => Fixed::ZERO,
    }
}

/// Validated postfix program producing exactly one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerProgram {
    ops: Vec<TriggerOp>,
}

impl TriggerProgram {
    pub fn new(ops: Vec<TriggerOp>) -> Result<Self, TriggerError> {
        let mut depth = 0usize;
        for (i, op) in ops.iter().enumerate() {
            let (pop, push) = op.arity();
            if depth < pop {
                return Err(TriggerError::StackUnderflow(i));
            }
            depth = depth - pop + push;
        }
        if depth != 1 {
            return Err(TriggerError::UnbalancedProgram(depth));
        }
        Ok(Self { ops })
    }

    /// Parses whitespace-separated postfix tokens, e.g.
    /// `"military_score 50 > is_great_power not and"`.
    pub fn parse(source: &str) -> Result<Self, TriggerError> {
        let ops = source
            .split_whitespace()
            .map(|tok| -> Result<TriggerOp, TriggerError> {
                Ok(match tok {
                    "+" => TriggerOp::Add,
                    "-" => TriggerOp::Sub,
                    "*" => TriggerOp::Mul,
                    ">" => TriggerOp::Gt,
                    ">=" => TriggerOp::Ge,
                    "<" => TriggerOp::Lt,
                    "==" => TriggerOp::Eq,
                    "and" => TriggerOp::And,
                    "or" => TriggerOp::Or,
                    "not" => TriggerOp::Not,
                    "true" => TriggerOp::Const(Fixed::ONE),
                    "false" => TriggerOp::Const(Fixed::ZERO),
                    _ => match parse_fixed(tok) {
                        Some(v) => TriggerOp::Const(v),
                        None => TriggerOp::Load(
                            Field::from_name(tok)
                                .ok_or_else(|| TriggerError::UnknownField(tok.to_string()))?,
                        ),
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ops)
    }

    pub fn ops(&self) -> &[TriggerOp] {
        &self.ops
    }
}

/// Decimal literal to `Fixed` without going through floats ("-2.5" → -25000).
fn parse_fixed(tok: &str) -> Option<Fixed> {
    let (neg, body) = match tok.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => (true, rest),
        _ => (false, tok),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if frac_part.len() > 4 || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let int: i64 = int_part.parse().ok()?;
    let mut frac: i64 = if frac_part.is_empty() { 0 } else { frac_part.parse().ok()? };
    for _ in frac_part.len()..4 {
        frac *= 10;
    }
    let raw = int.checked_mul(Fixed::SCALE)?.checked_add(frac)?;
    Some(Fixed::from_raw(if neg { -raw } else { raw }))
}

/// Evaluates `program` for a single nation.
pub fn evaluate(state: &WorldState, program: &TriggerProgram, nation: NationId) -> Fixed {
    let mut stack: Vec<Fixed> = Vec::with_capacity(program.ops.len());
    for &op in &program.ops {
        match op {
            TriggerOp::Const(v) => stack.push(v),
            TriggerOp::Load(field) => stack.push(field.load(state, nation)),
            TriggerOp::Not => {
                if let Some(top) = stack.last_mut() {
                    *top = truth(!top.is_positive());
                }
            }
            _ => {
                // Validated at construction: two operands are always present
                let b = stack.pop().unwrap_or_default();
                let a = stack.pop().unwrap_or_default();
                stack.push(binary(op, a, b));
            }
        }
    }
    stack.pop().unwrap_or_default()
}

/// Evaluates `program` for every nation index in `range`, column by column.
pub fn evaluate_batch(
    state: &WorldState,
    program: &TriggerProgram,
    range: Range<usize>,
) -> Vec<Fixed> {
    let width = range.len();
    let mut stack: Vec<Vec<Fixed>> = Vec::with_capacity(program.ops.len());
    for &op in &program.ops {
        match op {
            TriggerOp::Const(v) => stack.push(vec![v; width]),
            TriggerOp::Load(field) => stack.push(
                range
                    .clone()
                    .map(|i| field.load(state, NationId(i as u32)))
                    .collect(),
            ),
            TriggerOp::Not => {
                if let Some(top) = stack.last_mut() {
                    for v in top.iter_mut() {
                        *v = truth(!v.is_positive());
                    }
                }
            }
            _ => {
                let b = stack.pop().unwrap_or_default();
                let mut a = stack.pop().unwrap_or_default();
                for (x, y) in a.iter_mut().zip(b) {
                    *x = binary(op, *x, y);
                }
                stack.push(a);
            }
        }
    }
    stack.pop().unwrap_or_else(|| vec![Fixed::ZERO; width])
}

// ============================================================================
// Effects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectOp {
    AddTreasury(Fixed),
    AddMilitaryScore(Fixed),
    AddIndustrialScore(Fixed),
    /// Adds a seeded amount in `[0, max]` to the treasury
    RandomTreasury(Fixed),
    SetIssueRule(IssueRules),
    ClearIssueRule(IssueRules),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectProgram {
    pub ops: Vec<EffectOp>,
}

impl EffectProgram {
    pub fn new(ops: Vec<EffectOp>) -> Self {
        Self { ops }
    }
}

/// Applies an effect to `nation`. This is the only trigger-side write.
pub fn apply_effect(state: &mut WorldState, effect: EffectId, nation: NationId, seed: u64) {
    let ops = state.effects[effect.index()].ops.clone();
    let mut rules_changed = false;
    for op in ops {
        let n = state.nation_mut(nation);
        match op {
            EffectOp::AddTreasury(v) => n.treasury = n.treasury.saturating_add(v),
            EffectOp::AddMilitaryScore(v) => {
                n.military_score = n.military_score.saturating_add(v).max(Fixed::ZERO)
            }
            EffectOp::AddIndustrialScore(v) => {
                n.industrial_score = n.industrial_score.saturating_add(v).max(Fixed::ZERO)
            }
            EffectOp::RandomTreasury(max) => {
                let span = max.raw().max(0) as u64 + 1;
                let amount = Fixed::from_raw((seed % span) as i64);
                n.treasury = n.treasury.saturating_add(amount);
            }
            EffectOp::SetIssueRule(mask) => {
                n.base_issue_rules = n.base_issue_rules | mask;
                rules_changed = true;
            }
            EffectOp::ClearIssueRule(mask) => {
                n.base_issue_rules = IssueRules(n.base_issue_rules.0 & !mask.0);
                rules_changed = true;
            }
        }
    }
    if rules_changed {
        politics::recompute_issue_rules(state, nation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::WorldStateBuilder;

    fn world() -> WorldState {
        WorldStateBuilder::new()
            .nations(4)
            .province(NationId(0))
            .province(NationId(1))
            .province(NationId(1))
            .province(NationId(2))
            .military(NationId(0), 100)
            .military(NationId(1), 30)
            .military(NationId(2), 75)
            .treasury(NationId(1), 500)
            .great_power(NationId(2))
            .build()
    }

    #[test]
    fn test_parse_and_evaluate() {
        let state = world();
        let prog = TriggerProgram::parse("military_score 50 > is_great_power not and").unwrap();
        assert_eq!(evaluate(&state, &prog, NationId(0)), Fixed::ONE);
        assert_eq!(evaluate(&state, &prog, NationId(1)), Fixed::ZERO);
        assert_eq!(evaluate(&state, &prog, NationId(2)), Fixed::ZERO);
    }

    #[test]
    fn test_arithmetic_result() {
        let state = world();
        let prog = TriggerProgram::parse("treasury 0.5 * owned_provinces +").unwrap();
        assert_eq!(evaluate(&state, &prog, NationId(1)), Fixed::from_int(252));
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            TriggerProgram::parse("1 +"),
            Err(TriggerError::StackUnderflow(1))
        );
        assert_eq!(
            TriggerProgram::parse("1 2"),
            Err(TriggerError::UnbalancedProgram(2))
        );
        assert_eq!(TriggerProgram::new(vec![]), Err(TriggerError::UnbalancedProgram(0)));
        assert_eq!(
            TriggerProgram::parse("prestige 1 >"),
            Err(TriggerError::UnknownField("prestige".to_string()))
        );
    }

    #[test]
    fn test_parse_fixed_literals() {
        assert_eq!(parse_fixed("2.5"), Some(Fixed::from_raw(25_000)));
        assert_eq!(parse_fixed("-0.0001"), Some(Fixed::from_raw(-1)));
        assert_eq!(parse_fixed("12"), Some(Fixed::from_int(12)));
        assert_eq!(parse_fixed("1.23456"), None);
        assert_eq!(parse_fixed("-"), None);
        assert_eq!(parse_fixed("abc"), None);
    }

    #[test]
    fn test_batch_matches_scalar_on_subrange() {
        let state = world();
        let prog = TriggerProgram::parse("military_score 40 >= owned_provinces 1 > or").unwrap();
        let batch = evaluate_batch(&state, &prog, 1..4);
        let scalar: Vec<_> = (1..4).map(|i| evaluate(&state, &prog, NationId(i))).collect();
        assert_eq!(batch, scalar);
    }

    #[test]
    fn test_effect_sets_issue_rule() {
        let mut state = world();
        state.effects.push(EffectProgram::new(vec![
            EffectOp::SetIssueRule(IssueRules::BUILD_FACTORY),
            EffectOp::AddTreasury(Fixed::from_int(10)),
        ]));
        apply_effect(&mut state, EffectId(0), NationId(1), 0);
        let n = state.nation(NationId(1));
        assert!(n.issue_rules.contains(IssueRules::BUILD_FACTORY));
        assert_eq!(n.treasury, Fixed::from_int(510));
    }

    #[test]
    fn test_random_treasury_is_seeded() {
        let mut a = world();
        let mut b = world();
        for s in [&mut a, &mut b] {
            s.effects
                .push(EffectProgram::new(vec![EffectOp::RandomTreasury(Fixed::from_int(10))]));
            apply_effect(s, EffectId(0), NationId(0), 12345);
        }
        assert_eq!(a.nation(NationId(0)).treasury, b.nation(NationId(0)).treasury);
        assert!(a.nation(NationId(0)).treasury <= Fixed::from_int(10));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const FIELDS: [Field; 7] = [
            Field::MilitaryScore,
            Field::Treasury,
            Field::OwnedProvinces,
            Field::IsGreatPower,
            Field::HasRival,
            Field::Year,
            Field::IsAtWar,
        ];

        const BINARY: [TriggerOp; 8] = [
            TriggerOp::Add,
            TriggerOp::Sub,
            TriggerOp::Mul,
            TriggerOp::Gt,
            TriggerOp::Ge,
            TriggerOp::Lt,
            TriggerOp::And,
            TriggerOp::Or,
        ];

        /// Turns arbitrary choices into a well-formed program.
        fn build_program(choices: &[(u8, i64)]) -> TriggerProgram {
            let mut ops = Vec::new();
            let mut depth = 0usize;
            for &(c, v) in choices {
                let pick = v.unsigned_abs() as usize;
                match c % 4 {
                    0 => {
                        ops.push(TriggerOp::Const(Fixed::from_int(v)));
                        depth += 1;
                    }
                    1 => {
                        ops.push(TriggerOp::Load(FIELDS[pick % FIELDS.len()]));
                        depth += 1;
                    }
                    2 if depth >= 2 => {
                        ops.push(BINARY[pick % BINARY.len()]);
                        depth -= 1;
                    }
                    3 if depth >= 1 => ops.push(TriggerOp::Not),
                    _ => {
                        ops.push(TriggerOp::Const(Fixed::ONE));
                        depth += 1;
                    }
                }
            }
            if depth == 0 {
                ops.push(TriggerOp::Const(Fixed::ZERO));
                depth = 1;
            }
            while depth > 1 {
                ops.push(TriggerOp::And);
                depth -= 1;
            }
            TriggerProgram::new(ops).unwrap()
        }

        proptest! {
            #[test]
            fn batched_equals_elementwise_scalar(
                choices in prop::collection::vec((any::<u8>(), -1000i64..1000), 1..24),
                start in 0usize..4,
                len in 0usize..4,
            ) {
                let state = world();
                let prog = build_program(&choices);
                let end = (start + len).min(state.nations.len());
                let batch = evaluate_batch(&state, &prog, start..end);
                prop_assert_eq!(batch.len(), end - start);
                for (i, v) in batch.iter().enumerate() {
                    prop_assert_eq!(*v, evaluate(&state, &prog, NationId((start + i) as u32)));
                }
            }
        }
    }
}
