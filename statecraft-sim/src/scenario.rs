//! Seeded synthetic worlds and the stand-in upstream simulation between AI ticks.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statecraft_core::fixed::Fixed;
use statecraft_core::state::{
    InfluencePriority, IssueRules, NationId, NationalModifier, PopType, ProvinceBuildingKind,
    ProvinceId, TechCategory, TechId,
};
use statecraft_core::testing::WorldStateBuilder;
use statecraft_core::trigger::{EffectOp, TriggerProgram};
use statecraft_core::WorldState;

const COMMODITIES: usize = 5;
const TECHS_PER_FOLDER: i32 = 4;
const FOLDERS: [(&str, TechCategory); 4] = [
    ("army_doctrine", TechCategory::Army),
    ("naval_engineering", TechCategory::Navy),
    ("market_structure", TechCategory::Commerce),
    ("mechanization", TechCategory::Industry),
];

fn program(source: &str) -> anyhow::Result<Option<TriggerProgram>> {
    TriggerProgram::parse(source)
        .map(Some)
        .map_err(|e| anyhow::anyhow!("bad trigger {:?}: {}", source, e))
}

/// Builds a world of `count` nations (at least two) plus half as many open colonial
/// states. The same `seed` always yields the same world.
pub fn generate(count: usize, seed: u64) -> anyhow::Result<WorldState> {
    let count = count.max(2);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut b = WorldStateBuilder::new()
        .seed(seed)
        .date(1836, 1, 1)
        .nations(count)
        .commodities(COMMODITIES)
        .focus("farming", Some(PopType::Farmers), 1)
        .focus("clergy", Some(PopType::Clergy), 1)
        .focus("soldiers", Some(PopType::Soldiers), 1)
        .factory_type("cement_works", 3, &[], false)
        .factory_type("steel_mill", 2, &[1], false)
        .factory_type("machine_parts", 0, &[2], false)
        .factory_type("shipyard", 4, &[2, 0], true);

    for (f, &(name, category)) in FOLDERS.iter().enumerate() {
        b = b.folder(name, category);
        for k in 0..TECHS_PER_FOLDER {
            b = b.tech(f as u32, 1836 + 5 * k, 80 + 40 * k as i64);
        }
    }
    b = b
        .tech_modifier(TechId(9), NationalModifier::ResearchPoints, 1)
        .tech_modifier(TechId(13), NationalModifier::FactoryOutput, 1)
        .tech_modifier(TechId(14), NationalModifier::MaxNationalFocus, 1);

    b = b
        .decision(
            "industrial_push",
            program("is_civilized")?,
            program("treasury 400 >")?,
            program("industrial_score 60 <")?,
            vec![
                EffectOp::AddTreasury(Fixed::from_int(-200)),
                EffectOp::AddIndustrialScore(Fixed::from_int(10)),
            ],
        )
        .decision(
            "raise_levies",
            program("is_threatened")?,
            program("treasury 100 >")?,
            None,
            vec![
                EffectOp::AddTreasury(Fixed::from_int(-50)),
                EffectOp::AddMilitaryScore(Fixed::from_int(5)),
            ],
        )
        .decision(
            "railway_charter",
            program("can_build_railway not")?,
            program("year 1850 >")?,
            program("industrial_score 40 >")?,
            vec![EffectOp::SetIssueRule(IssueRules::BUILD_RAILWAY)],
        );

    let industrial: Vec<i64> = (0..count).map(|_| rng.gen_range(5..120)).collect();
    let mut by_industry: Vec<usize> = (0..count).collect();
    by_industry.sort_by_key(|&i| (std::cmp::Reverse(industrial[i]), i));
    let great_powers = (count / 6).max(1);
    let colonizers = (count / 4).clamp(1, 4);

    let mut next_province = 0u32;
    for i in 0..count {
        let n = NationId(i as u32);
        let provinces = rng.gen_range(1..=3usize);
        let population = rng.gen_range(20_000..400_000i64);
        let clergy_per_mille = rng.gen_range(5..40i64);
        let workers = population / 20;

        b = b
            .state(n, provinces, population)
            .state_demographics(
                population * clergy_per_mille / 1000,
                workers,
                workers * rng.gen_range(50..=100i64) / 100,
            )
            .population(n, population, population * clergy_per_mille / 1000)
            .military(n, rng.gen_range(20..300))
            .industrial(n, industrial[i])
            .culture_group(n, rng.gen_range(0..3))
            .party(n, "conservative", 0, IssueRules::NONE)
            .party(
                n,
                "liberal",
                1,
                IssueRules::BUILD_FACTORY | IssueRules::EXPAND_FACTORY | IssueRules::BUILD_RAILWAY,
            );
        for p in 1..provinces as u32 {
            b = b.link(ProvinceId(next_province + p - 1), ProvinceId(next_province + p));
        }
        next_province += provinces as u32;

        let treasury = rng.gen_range(50..1_500i64);
        b = b
            .treasury(n, treasury)
            .last_treasury(n, treasury + rng.gen_range(-20..60i64));
        for kind in ProvinceBuildingKind::ALL {
            b = b.max_building_level(n, kind, 6);
        }
        if rng.gen_bool(0.5) {
            b = b.issue_rules(n, IssueRules::BUILD_FACTORY | IssueRules::EXPAND_FACTORY);
        }
        for c in 0..COMMODITIES as u32 {
            let demand = rng.gen_range(0..500i64);
            let satisfaction = Fixed::from_raw(rng.gen_range(2_000..=10_000i64));
            b = b
                .market(n, c, demand, satisfaction)
                .market_pool(n, c, rng.gen_range(0..400i64));
        }
    }

    for i in 0..count {
        let n = NationId(i as u32);
        let next = NationId(((i + 1) % count) as u32);
        if n != next && (count > 2 || i == 0) {
            b = b.border(n, next);
        }
    }
    for (rank, &i) in by_industry.iter().enumerate() {
        let n = NationId(i as u32);
        if rank < great_powers {
            b = b.great_power(n);
        }
        if rank < colonizers {
            b = b
                .colonial_rank(n, rank as u16 + 1)
                .colonial_points(n, rng.gen_range(40..160));
        }
    }

    for _ in 0..(count / 2).max(1) {
        b = b.unowned_state(&[true, rng.gen_bool(0.5)]);
    }

    let mut state = b.build();
    for p in state.provinces.iter_mut() {
        if p.owner.is_some() && rng.gen_bool(0.4) {
            p.is_coast = true;
        }
    }
    Ok(state)
}

/// Stand-in for the economy, research and diplomacy systems that run between AI
/// ticks: treasuries drift, research completes, influence accrues, the date moves on.
pub fn advance(state: &mut WorldState, days: i32, rng: &mut ChaCha8Rng) {
    for n in state.nations.iter_mut().filter(|n| n.is_alive()) {
        n.last_treasury = n.treasury;
        let income = Fixed::from_int(rng.gen_range(0..40i64));
        let spending = n.spending_level * Fixed::from_int(rng.gen_range(0..50i64));
        n.treasury = (n.treasury + income - spending).max(Fixed::ZERO);

        if let Some(t) = n.current_research {
            if rng.gen_bool(0.2) {
                if let Some(done) = n.researched.get_mut(t.index()) {
                    *done = true;
                }
                n.current_research = None;
            }
        }
    }

    for rel in state.gp_relationships.iter_mut() {
        let gain = match rel.status.priority() {
            Some(InfluencePriority::Three) => 3,
            Some(InfluencePriority::Two) => 2,
            Some(InfluencePriority::One) => 1,
            None => 0,
        };
        rel.influence += Fixed::from_int(gain * days as i64);
    }

    state.date = state.date.add_days(days);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_seeded() {
        let a = generate(12, 5).unwrap();
        let b = generate(12, 5).unwrap();
        let c = generate(12, 6).unwrap();
        assert_eq!(a.checksum(), b.checksum());
        assert_ne!(a.checksum(), c.checksum());
        assert_eq!(a.nations.len(), 12);
        assert_eq!(a.nations.iter().filter(|n| n.is_great_power).count(), 2);
    }

    #[test]
    fn test_advance_moves_date_and_treasury() {
        let mut state = generate(4, 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let before: Vec<Fixed> = state.nations.iter().map(|n| n.treasury).collect();
        let date = state.date;

        advance(&mut state, 7, &mut rng);
        assert_eq!(state.date, date.add_days(7));
        for (n, &t) in state.nations.iter().zip(&before) {
            assert_eq!(n.last_treasury, t);
        }
    }
}
