//! Fluent construction of small worlds for tests and synthetic scenarios.
//!
//! Handles are assigned in call order: the first `province()` is `ProvinceId(0)`,
//! the first state created (by `province`, `state` or `unowned_state`) is
//! `StateDefId(0)`, and so on.

use crate::fixed::Fixed;
use crate::state::*;
use crate::trigger::{EffectOp, EffectProgram, TriggerProgram};

pub struct WorldStateBuilder {
    state: WorldState,
}

impl WorldStateBuilder {
    pub fn new() -> Self {
        Self {
            state: WorldState::default(),
        }
    }

    pub fn date(mut self, year: i32, month: u8, day: u8) -> Self {
        self.state.date = Date::from_ymd(year, month, day);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.state.rng_seed = seed;
        self
    }

    pub fn config(mut self, config: crate::config::AiConfig) -> Self {
        self.state.config = config;
        self
    }

    /// Adds `count` living-capable nations (they stay dead until given a province).
    pub fn nations(mut self, count: usize) -> Self {
        for _ in 0..count {
            let id = self.state.nations.len();
            self.state.nations.push(NationState {
                name: format!("N{:03}", id),
                ..Default::default()
            });
        }
        self
    }

    fn nation_mut(&mut self, nation: NationId) -> &mut NationState {
        &mut self.state.nations[nation.index()]
    }

    fn push_province(&mut self, owner: Option<NationId>, def: StateDefId) -> ProvinceId {
        let id = ProvinceId(self.state.provinces.len() as u32);
        self.state.provinces.push(ProvinceState {
            owner,
            controller: owner,
            state_def: Some(def),
            x: id.0 as i32 * 10,
            ..Default::default()
        });
        self.state.state_definitions[def.index()].provinces.push(id);
        if let Some(n) = owner {
            let nation = self.nation_mut(n);
            nation.owned_provinces.push(id);
            nation.capital.get_or_insert(id);
        }
        id
    }

    fn push_state_definition(&mut self) -> StateDefId {
        let id = StateDefId(self.state.state_definitions.len() as u32);
        self.state.state_definitions.push(StateDefinition {
            name: format!("S{:03}", id.0),
            ..Default::default()
        });
        id
    }

    fn push_state_instance(&mut self, owner: NationId, def: StateDefId, capital: ProvinceId) -> StateInstanceId {
        let id = StateInstanceId(self.state.state_instances.len() as u32);
        self.state.state_instances.push(StateInstance {
            definition: def,
            owner,
            capital,
            demographics: Demographics::default(),
            owner_focus: None,
            naval_base_is_taken: false,
            pending_factories: Vec::new(),
        });
        for &p in &self.state.state_definitions[def.index()].provinces {
            self.state.provinces[p.index()].state_instance = Some(id);
        }
        self.nation_mut(owner).owned_states.push(id);
        id
    }

    /// One owned province forming its own single-province state.
    pub fn province(mut self, owner: NationId) -> Self {
        let def = self.push_state_definition();
        let p = self.push_province(Some(owner), def);
        self.push_state_instance(owner, def, p);
        self
    }

    /// An owned state of `provinces` provinces with the given population.
    pub fn state(mut self, owner: NationId, provinces: usize, population: i64) -> Self {
        let def = self.push_state_definition();
        let first = self.push_province(Some(owner), def);
        for _ in 1..provinces {
            self.push_province(Some(owner), def);
        }
        let si = self.push_state_instance(owner, def, first);
        let demo = &mut self.state.state_instances[si.index()].demographics;
        demo.total = Fixed::from_int(population);
        self.nation_mut(owner).demographics.total += Fixed::from_int(population);
        self
    }

    /// Sets the population mix of the most recently created state instance.
    pub fn state_demographics(mut self, clergy: i64, factory_workers: i64, employed: i64) -> Self {
        if let Some(si) = self.state.state_instances.last_mut() {
            si.demographics.clergy = Fixed::from_int(clergy);
            si.demographics.factory_workers = Fixed::from_int(factory_workers);
            si.demographics.employed_factory_workers = Fixed::from_int(employed);
        }
        self
    }

    /// Unowned state definition; one province per entry, `true` = coastal.
    pub fn unowned_state(mut self, coastal: &[bool]) -> Self {
        let def = self.push_state_definition();
        for &c in coastal {
            let p = self.push_province(None, def);
            self.state.provinces[p.index()].is_coast = c;
        }
        self
    }

    /// Symmetric province adjacency.
    pub fn link(mut self, a: ProvinceId, b: ProvinceId) -> Self {
        self.state.provinces[a.index()].neighbors.push(b);
        self.state.provinces[b.index()].neighbors.push(a);
        self
    }

    pub fn coastal(mut self, province: ProvinceId) -> Self {
        self.state.provinces[province.index()].is_coast = true;
        self
    }

    /// Symmetric nation adjacency.
    pub fn border(mut self, a: NationId, b: NationId) -> Self {
        self.nation_mut(a).neighbors.push(b);
        self.nation_mut(b).neighbors.push(a);
        self
    }

    pub fn military(mut self, nation: NationId, score: i64) -> Self {
        self.nation_mut(nation).military_score = Fixed::from_int(score);
        self
    }

    pub fn industrial(mut self, nation: NationId, score: i64) -> Self {
        self.nation_mut(nation).industrial_score = Fixed::from_int(score);
        self
    }

    pub fn treasury(mut self, nation: NationId, amount: i64) -> Self {
        self.nation_mut(nation).treasury = Fixed::from_int(amount);
        self
    }

    pub fn last_treasury(mut self, nation: NationId, amount: i64) -> Self {
        self.nation_mut(nation).last_treasury = Fixed::from_int(amount);
        self
    }

    pub fn great_power(mut self, nation: NationId) -> Self {
        self.nation_mut(nation).is_great_power = true;
        self
    }

    pub fn player(mut self, nation: NationId) -> Self {
        self.nation_mut(nation).is_player_controlled = true;
        self
    }

    pub fn uncivilized(mut self, nation: NationId) -> Self {
        self.nation_mut(nation).is_civilized = false;
        self
    }

    pub fn subject_of(mut self, subject: NationId, overlord: NationId) -> Self {
        self.nation_mut(subject).overlord = Some(overlord);
        self
    }

    pub fn sphere_of(mut self, member: NationId, leader: NationId) -> Self {
        self.nation_mut(member).in_sphere_of = Some(leader);
        self
    }

    pub fn alliance(mut self, a: NationId, b: NationId) -> Self {
        self.state.relation_mut(a, b).allied = true;
        self
    }

    pub fn relation(mut self, a: NationId, b: NationId, value: i64) -> Self {
        self.state.relation_mut(a, b).value = Fixed::from_int(value);
        self
    }

    pub fn culture_group(mut self, nation: NationId, group: u32) -> Self {
        self.nation_mut(nation).culture_group = CultureGroupId(group);
        self
    }

    pub fn issue_rules(mut self, nation: NationId, rules: IssueRules) -> Self {
        let n = self.nation_mut(nation);
        n.base_issue_rules = rules;
        n.issue_rules = rules;
        self
    }

    /// Nation-wide population and clergy.
    pub fn population(mut self, nation: NationId, total: i64, clergy: i64) -> Self {
        let demo = &mut self.nation_mut(nation).demographics;
        demo.total = Fixed::from_int(total);
        demo.clergy = Fixed::from_int(clergy);
        self
    }

    pub fn colonial_points(mut self, nation: NationId, points: i32) -> Self {
        self.nation_mut(nation).colonial_points = points;
        self
    }

    pub fn colonial_rank(mut self, nation: NationId, rank: u16) -> Self {
        self.nation_mut(nation).colonial_rank = rank;
        self
    }

    pub fn max_building_level(mut self, nation: NationId, kind: ProvinceBuildingKind, level: u8) -> Self {
        self.nation_mut(nation).max_building_levels.set(kind, level);
        self
    }

    pub fn party(mut self, nation: NationId, name: &str, ideology: u8, rules: IssueRules) -> Self {
        let id = PartyId(self.state.parties.len() as u32);
        self.state.parties.push(PoliticalParty {
            name: name.to_string(),
            ideology,
            issue_rules: rules,
            active: true,
        });
        self.nation_mut(nation).parties.push(id);
        self
    }

    pub fn folder(mut self, name: &str, category: TechCategory) -> Self {
        self.state.tech_folders.push(TechFolder {
            name: name.to_string(),
            category,
        });
        self
    }

    /// Technology with a default AI weight of 1000.
    pub fn tech(mut self, folder: u32, year: i32, cost: i64) -> Self {
        let id = self.state.technologies.len();
        self.state.technologies.push(Technology {
            name: format!("T{:03}", id),
            folder: FolderId(folder),
            year,
            cost: Fixed::from_int(cost),
            ai_weight: Fixed::from_int(1000),
            increases_naval_base: false,
            modifiers: Vec::new(),
        });
        self
    }

    pub fn tech_modifier(mut self, tech: TechId, modifier: NationalModifier, value: i64) -> Self {
        self.state.technologies[tech.index()]
            .modifiers
            .push((modifier, Fixed::from_int(value)));
        self
    }

    pub fn researched(mut self, nation: NationId, tech: TechId) -> Self {
        let researched = &mut self.nation_mut(nation).researched;
        if researched.len() <= tech.index() {
            researched.resize(tech.index() + 1, false);
        }
        researched[tech.index()] = true;
        self
    }

    pub fn commodities(mut self, count: usize) -> Self {
        self.state.commodity_count = count;
        self
    }

    /// Sets a nation's market view of one commodity.
    pub fn market(mut self, nation: NationId, commodity: u32, real_demand: i64, satisfaction: Fixed) -> Self {
        let count = self.state.commodity_count;
        let markets = &mut self.nation_mut(nation).markets;
        if markets.len() < count {
            markets.resize(count, full_market());
        }
        if let Some(m) = markets.get_mut(commodity as usize) {
            m.real_demand = Fixed::from_int(real_demand);
            m.demand_satisfaction = satisfaction;
        }
        self
    }

    /// Sets how much of a commodity a nation's domestic market supplies.
    pub fn market_pool(mut self, nation: NationId, commodity: u32, pool: i64) -> Self {
        let count = self.state.commodity_count;
        let markets = &mut self.nation_mut(nation).markets;
        if markets.len() < count {
            markets.resize(count, full_market());
        }
        if let Some(m) = markets.get_mut(commodity as usize) {
            m.domestic_market_pool = Fixed::from_int(pool);
        }
        self
    }

    pub fn factory_type(mut self, name: &str, output: u32, inputs: &[u32], coastal: bool) -> Self {
        self.state.factory_types.push(FactoryType {
            name: name.to_string(),
            output: CommodityId(output),
            inputs: inputs.iter().copied().map(CommodityId).collect(),
            is_coastal: coastal,
            available_from_start: true,
        });
        self
    }

    /// Places a factory in a province.
    pub fn factory(mut self, province: ProvinceId, factory_type: u32, level: u8) -> Self {
        self.state.provinces[province.index()].factories.push(Factory {
            factory_type: FactoryTypeId(factory_type),
            level,
            unprofitable: false,
        });
        self
    }

    pub fn focus(mut self, name: &str, promotion: Option<PopType>, amount: i64) -> Self {
        self.state.focuses.push(NationalFocus {
            name: name.to_string(),
            promotion,
            promotion_amount: Fixed::from_int(amount),
        });
        self
    }

    /// Registers a decision with already-validated trigger programs.
    pub fn decision(
        mut self,
        name: &str,
        potential: Option<TriggerProgram>,
        allow: Option<TriggerProgram>,
        ai_will_do: Option<TriggerProgram>,
        effect: Vec<EffectOp>,
    ) -> Self {
        let mut register = |prog: Option<TriggerProgram>| {
            prog.map(|p| {
                self.state.triggers.push(p);
                TriggerId(self.state.triggers.len() as u32 - 1)
            })
        };
        let potential = register(potential);
        let allow = register(allow);
        let ai_will_do = register(ai_will_do);
        let effect = if effect.is_empty() {
            None
        } else {
            self.state.effects.push(EffectProgram::new(effect));
            Some(EffectId(self.state.effects.len() as u32 - 1))
        };
        self.state.decisions.push(Decision {
            name: name.to_string(),
            potential,
            allow,
            ai_will_do,
            effect,
        });
        self
    }

    /// Great power relationship with a starting influence balance and level.
    pub fn influence(mut self, great_power: NationId, target: NationId, amount: i64, level: InfluenceLevel) -> Self {
        let id = self.state.force_create_gp_relationship(great_power, target);
        let rel = &mut self.state.gp_relationships[id.index()];
        rel.influence = Fixed::from_int(amount);
        rel.status.set_level(level);
        self
    }

    pub fn build(mut self) -> WorldState {
        let techs = self.state.technologies.len();
        let commodities = self.state.commodity_count;
        for n in &mut self.state.nations {
            n.researched.resize(techs.max(n.researched.len()), false);
            if n.markets.len() < commodities {
                n.markets.resize(commodities, full_market());
            }
        }
        self.state
    }
}

fn full_market() -> CommodityMarket {
    CommodityMarket {
        real_demand: Fixed::ZERO,
        demand_satisfaction: Fixed::ONE,
        domestic_market_pool: Fixed::ZERO,
    }
}

impl Default for WorldStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
