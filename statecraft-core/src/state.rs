//! World arena: plain records addressed by typed integer handles.
//!
//! Every component receives `&WorldState` or `&mut WorldState` explicitly. Records
//! never own each other; relationships are handles into the sibling tables, and the
//! accessors in [`crate::query`] resolve them.

use crate::config::AiConfig;
use crate::fixed::Fixed;
use crate::trigger::{EffectProgram, TriggerProgram};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Hash, Eq, PartialEq, Clone, Copy, Debug, Default, Serialize, Deserialize, PartialOrd, Ord,
        )]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

entity_id!(
    /// Handle of a political entity.
    NationId
);
entity_id!(ProvinceId);
entity_id!(
    /// Handle of an owned, active state region.
    StateInstanceId
);
entity_id!(
    /// Handle of a state template (exists before anyone owns it).
    StateDefId
);
entity_id!(TechId);
entity_id!(FolderId);
entity_id!(FactoryTypeId);
entity_id!(CommodityId);
entity_id!(DecisionId);
entity_id!(TriggerId);
entity_id!(EffectId);
entity_id!(PartyId);
entity_id!(FocusId);
entity_id!(CultureGroupId);
entity_id!(ContinentId);
entity_id!(GpRelationshipId);
entity_id!(ConstructionId);
entity_id!(ClaimId);
entity_id!(WarId);

// ============================================================================
// Calendar
// ============================================================================

const MONTH_LENGTHS: [i32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAYS_PER_YEAR: i32 = 365;

/// A day on the simulation calendar (365-day years, no leap days).
///
/// Stored as a day count so "within four years" and investment cooldowns are plain
/// integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Date(pub i32);

impl Date {
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Self {
        let month = month.clamp(1, 12) as usize;
        let before: i32 = MONTH_LENGTHS[..month - 1].iter().sum();
        Self(year * DAYS_PER_YEAR + before + (day.max(1) as i32 - 1))
    }

    #[inline]
    pub fn days(self) -> i32 {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.div_euclid(DAYS_PER_YEAR)
    }

    /// (year, month, day)
    pub fn to_ymd(self) -> (i32, u8, u8) {
        let year = self.year();
        let mut rem = self.0.rem_euclid(DAYS_PER_YEAR);
        let mut month = 0;
        while rem >= MONTH_LENGTHS[month] {
            rem -= MONTH_LENGTHS[month];
            month += 1;
        }
        (year, month as u8 + 1, rem as u8 + 1)
    }

    #[inline]
    pub fn add_days(self, days: i32) -> Self {
        Self(self.0 + days)
    }

    /// Whole days from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn days_since(self, earlier: Date) -> i32 {
        self.0 - earlier.0
    }
}

impl Default for Date {
    fn default() -> Self {
        Self::from_ymd(1836, 1, 1)
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (y, m, d) = self.to_ymd();
        write!(f, "{}.{}.{}", y, m, d)
    }
}

// ============================================================================
// Bit sets
// ============================================================================

/// Nation-level policy permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IssueRules(pub u32);

impl IssueRules {
    pub const NONE: IssueRules = IssueRules(0);
    pub const BUILD_FACTORY: IssueRules = IssueRules(1 << 0);
    pub const EXPAND_FACTORY: IssueRules = IssueRules(1 << 1);
    pub const BUILD_RAILWAY: IssueRules = IssueRules(1 << 2);

    #[inline]
    pub fn contains(self, other: IssueRules) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    #[inline]
    pub fn intersects(self, other: IssueRules) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for IssueRules {
    type Output = IssueRules;
    fn bitor(self, rhs: IssueRules) -> IssueRules {
        IssueRules(self.0 | rhs.0)
    }
}

/// Sphere level of a great power toward a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InfluenceLevel {
    Neutral,
    Friendly,
    InSphere,
}

impl InfluenceLevel {
    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => InfluenceLevel::Neutral,
            1 => InfluenceLevel::Friendly,
            _ => InfluenceLevel::InSphere,
        }
    }

    fn bits(self) -> u8 {
        match self {
            InfluenceLevel::Neutral => 0,
            InfluenceLevel::Friendly => 1,
            InfluenceLevel::InSphere => 2,
        }
    }

    pub fn increased(self) -> Self {
        match self {
            InfluenceLevel::Neutral => InfluenceLevel::Friendly,
            _ => InfluenceLevel::InSphere,
        }
    }

    pub fn decreased(self) -> Self {
        match self {
            InfluenceLevel::InSphere => InfluenceLevel::Friendly,
            _ => InfluenceLevel::Neutral,
        }
    }
}

/// Influence priority tier; `Three` is the most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfluencePriority {
    One,
    Two,
    Three,
}

/// Packed status word of a great power/target relationship.
///
/// Layout: bits 0-1 sphere level, bits 2-4 priority (at most one set), bit 5 banned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InfluenceStatus(pub u8);

impl InfluenceStatus {
    pub const LEVEL_MASK: u8 = 0b0000_0011;
    pub const PRIORITY_ONE: u8 = 0b0000_0100;
    pub const PRIORITY_TWO: u8 = 0b0000_1000;
    pub const PRIORITY_THREE: u8 = 0b0001_0000;
    pub const PRIORITY_MASK: u8 = 0b0001_1100;
    pub const BANNED: u8 = 0b0010_0000;

    pub fn level(self) -> InfluenceLevel {
        InfluenceLevel::from_bits(self.0 & Self::LEVEL_MASK)
    }

    pub fn set_level(&mut self, level: InfluenceLevel) {
        self.0 = (self.0 & !Self::LEVEL_MASK) | level.bits();
    }

    pub fn is_banned(self) -> bool {
        self.0 & Self::BANNED != 0
    }

    pub fn set_banned(&mut self, banned: bool) {
        if banned {
            self.0 |= Self::BANNED;
        } else {
            self.0 &= !Self::BANNED;
        }
    }

    pub fn priority(self) -> Option<InfluencePriority> {
        match self.0 & Self::PRIORITY_MASK {
            Self::PRIORITY_ONE => Some(InfluencePriority::One),
            Self::PRIORITY_TWO => Some(InfluencePriority::Two),
            Self::PRIORITY_THREE => Some(InfluencePriority::Three),
            _ => None,
        }
    }

    pub fn clear_priority(&mut self) {
        self.0 &= !Self::PRIORITY_MASK;
    }

    /// Replaces any existing priority bit.
    pub fn set_priority(&mut self, priority: InfluencePriority) {
        self.clear_priority();
        self.0 |= match priority {
            InfluencePriority::One => Self::PRIORITY_ONE,
            InfluencePriority::Two => Self::PRIORITY_TWO,
            InfluencePriority::Three => Self::PRIORITY_THREE,
        };
    }

    pub fn priority_bit_count(self) -> u32 {
        (self.0 & Self::PRIORITY_MASK).count_ones()
    }
}

// ============================================================================
// Records
// ============================================================================

/// Aggregated population counts (nation- or state-wide).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Demographics {
    pub total: Fixed,
    pub clergy: Fixed,
    pub soldiers: Fixed,
    pub factory_workers: Fixed,
    pub employed_factory_workers: Fixed,
}

impl Demographics {
    /// Clergy share of the population, `None` for an empty population.
    pub fn clergy_fraction(&self) -> Option<Fixed> {
        self.clergy.checked_ratio(self.total)
    }

    /// True when every factory worker already has a job.
    pub fn factory_workers_saturated(&self) -> bool {
        self.employed_factory_workers >= self.factory_workers && self.factory_workers.is_positive()
    }
}

/// Per-commodity market view of one nation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CommodityMarket {
    pub real_demand: Fixed,
    /// 1.0 = fully supplied
    pub demand_satisfaction: Fixed,
    pub domestic_market_pool: Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvinceBuildingKind {
    NavalBase,
    Railroad,
    Fort,
}

impl ProvinceBuildingKind {
    pub const ALL: [ProvinceBuildingKind; 3] = [
        ProvinceBuildingKind::NavalBase,
        ProvinceBuildingKind::Railroad,
        ProvinceBuildingKind::Fort,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            ProvinceBuildingKind::NavalBase => 0,
            ProvinceBuildingKind::Railroad => 1,
            ProvinceBuildingKind::Fort => 2,
        }
    }
}

/// Levels of the three province buildings, indexed by [`ProvinceBuildingKind::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingLevels(pub [u8; 3]);

impl BuildingLevels {
    #[inline]
    pub fn get(&self, kind: ProvinceBuildingKind) -> u8 {
        self.0[kind.index()]
    }

    #[inline]
    pub fn set(&mut self, kind: ProvinceBuildingKind, level: u8) {
        self.0[kind.index()] = level;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NationState {
    pub name: String,
    pub is_player_controlled: bool,
    pub is_great_power: bool,
    pub is_civilized: bool,
    pub owned_provinces: Vec<ProvinceId>,
    pub owned_states: Vec<StateInstanceId>,
    pub capital: Option<ProvinceId>,
    /// Bordering nations (kept symmetric by the builder)
    pub neighbors: Vec<NationId>,
    pub culture_group: CultureGroupId,

    pub military_score: Fixed,
    pub industrial_score: Fixed,
    /// Money stockpile
    pub treasury: Fixed,
    pub last_treasury: Fixed,
    /// 1.0 = normal spending
    pub spending_level: Fixed,

    pub ai_is_threatened: bool,
    pub ai_rival: Option<NationId>,
    pub last_war_loss: Option<Date>,
    pub overlord: Option<NationId>,
    pub in_sphere_of: Option<NationId>,

    /// Rules granted regardless of the ruling party
    pub base_issue_rules: IssueRules,
    /// Combined rules (base | ruling party)
    pub issue_rules: IssueRules,
    pub government_can_appoint: bool,
    /// Bit per ideology the government allows in power
    pub allowed_ideologies: u32,
    pub parties: Vec<PartyId>,
    pub ruling_party: Option<PartyId>,
    pub ruling_party_last_appointed: Option<Date>,
    pub election_ongoing: bool,

    pub current_research: Option<TechId>,
    /// Indexed by [`TechId`]
    pub researched: Vec<bool>,

    pub demographics: Demographics,
    pub national_focus_modifier: i32,
    pub flashpoint_focus_state: Option<StateInstanceId>,

    /// Indexed by [`CommodityId`]
    pub markets: Vec<CommodityMarket>,
    /// Factory types this nation has built at least once
    pub active_factory_types: FxHashSet<FactoryTypeId>,
    pub max_building_levels: BuildingLevels,

    /// 0 = not a colonizer
    pub colonial_rank: u16,
    pub colonial_points: i32,
}

impl Default for NationState {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_player_controlled: false,
            is_great_power: false,
            is_civilized: true,
            owned_provinces: Vec::new(),
            owned_states: Vec::new(),
            capital: None,
            neighbors: Vec::new(),
            culture_group: CultureGroupId::default(),
            military_score: Fixed::ZERO,
            industrial_score: Fixed::ZERO,
            treasury: Fixed::ZERO,
            last_treasury: Fixed::ZERO,
            spending_level: Fixed::ONE,
            ai_is_threatened: false,
            ai_rival: None,
            last_war_loss: None,
            overlord: None,
            in_sphere_of: None,
            base_issue_rules: IssueRules::NONE,
            issue_rules: IssueRules::NONE,
            government_can_appoint: true,
            allowed_ideologies: u32::MAX,
            parties: Vec::new(),
            ruling_party: None,
            ruling_party_last_appointed: None,
            election_ongoing: false,
            current_research: None,
            researched: Vec::new(),
            demographics: Demographics::default(),
            national_focus_modifier: 0,
            flashpoint_focus_state: None,
            markets: Vec::new(),
            active_factory_types: FxHashSet::default(),
            max_building_levels: BuildingLevels::default(),
            colonial_rank: 0,
            colonial_points: 0,
        }
    }
}

impl NationState {
    /// Dead nations own nothing and are skipped by every component.
    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.owned_provinces.is_empty()
    }

    #[inline]
    pub fn has_researched(&self, tech: TechId) -> bool {
        self.researched.get(tech.index()).copied().unwrap_or(false)
    }

    /// Demand satisfaction for a commodity; unknown commodities count as fully supplied.
    pub fn demand_satisfaction(&self, commodity: CommodityId) -> Fixed {
        self.markets
            .get(commodity.index())
            .map(|m| m.demand_satisfaction)
            .unwrap_or(Fixed::ONE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Factory {
    pub factory_type: FactoryTypeId,
    pub level: u8,
    pub unprofitable: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvinceState {
    pub owner: Option<NationId>,
    pub controller: Option<NationId>,
    pub state_def: Option<StateDefId>,
    pub state_instance: Option<StateInstanceId>,
    pub continent: ContinentId,
    pub is_coast: bool,
    pub is_sea: bool,
    pub is_colonial: bool,
    /// Map coordinates, used for travel cost between neighbours
    pub x: i32,
    pub y: i32,
    pub neighbors: Vec<ProvinceId>,
    pub under_siege: bool,
    pub buildings: BuildingLevels,
    /// Levels granted by local modifiers that count against the build cap
    pub min_build: BuildingLevels,
    pub factories: Vec<Factory>,
    /// In-flight province building projects targeting this province
    pub pending_buildings: Vec<ConstructionId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDefinition {
    pub name: String,
    pub provinces: Vec<ProvinceId>,
    /// 0 = no race, 1 = interest, 2 = influence, 3+ = resolved
    pub colonization_stage: u8,
    /// Competing colonization claims
    pub claims: Vec<ClaimId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateInstance {
    pub definition: StateDefId,
    pub owner: NationId,
    pub capital: ProvinceId,
    pub demographics: Demographics,
    pub owner_focus: Option<FocusId>,
    pub naval_base_is_taken: bool,
    /// In-flight factory projects in this state
    pub pending_factories: Vec<ConstructionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechCategory {
    Army,
    Navy,
    Commerce,
    Culture,
    Industry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechFolder {
    pub name: String,
    pub category: TechCategory,
}

/// National modifiers a technology can grant that the AI weighs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NationalModifier {
    ResearchPoints,
    ResearchPointsModifier,
    EducationEfficiency,
    EducationEfficiencyModifier,
    PopGrowth,
    MaxNationalFocus,
    ColonialLifeRating,
    RgoOutput,
    FactoryOutput,
    FactoryThroughput,
    FactoryInput,
    Other,
}

/// Technologies are stored folder by folder; the previous entry in the table is the
/// in-folder prerequisite when it shares the folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    pub folder: FolderId,
    pub year: i32,
    pub cost: Fixed,
    /// Precomputed once at load by `initialize_ai_tech_weights`
    pub ai_weight: Fixed,
    pub increases_naval_base: bool,
    pub modifiers: Vec<(NationalModifier, Fixed)>,
}

/// Upper bound on factory inputs.
pub const MAX_FACTORY_INPUTS: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryType {
    pub name: String,
    pub output: CommodityId,
    /// At most [`MAX_FACTORY_INPUTS`]
    pub inputs: Vec<CommodityId>,
    pub is_coastal: bool,
    pub available_from_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoliticalParty {
    pub name: String,
    pub ideology: u8,
    pub issue_rules: IssueRules,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PopType {
    Clergy,
    Soldiers,
    FactoryWorkers,
    Farmers,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NationalFocus {
    pub name: String,
    pub promotion: Option<PopType>,
    pub promotion_amount: Fixed,
}

/// Well-known focuses, identified once at load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FocusCatalog {
    pub clergy: Option<FocusId>,
    pub soldier: Option<FocusId>,
}

/// Designer-defined one-shot decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub name: String,
    pub potential: Option<TriggerId>,
    pub allow: Option<TriggerId>,
    pub ai_will_do: Option<TriggerId>,
    pub effect: Option<EffectId>,
}

/// Directional great power → target influence relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpRelationship {
    pub great_power: NationId,
    pub target: NationId,
    pub influence: Fixed,
    pub status: InfluenceStatus,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DiplomaticRelation {
    pub allied: bool,
    pub value: Fixed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct War {
    pub attackers: Vec<NationId>,
    pub defenders: Vec<NationId>,
}

impl War {
    pub fn involves(&self, nation: NationId) -> bool {
        self.attackers.contains(&nation) || self.defenders.contains(&nation)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiplomacyState {
    /// Symmetric relations keyed by (smaller, larger) handle
    pub relations: FxHashMap<(NationId, NationId), DiplomaticRelation>,
    /// Ended wars are removed by the war collaborator; slots may be `None`
    pub wars: Vec<Option<War>>,
}

/// The active great-power crisis, if any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrisisState {
    /// Colony under dispute; frozen for investment
    pub colony: Option<StateDefId>,
    pub war: Option<WarId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonizationClaim {
    pub state: StateDefId,
    pub colonizer: NationId,
    pub level: u8,
    pub points_invested: i32,
    pub last_investment: Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstructionProject {
    Province {
        province: ProvinceId,
        nation: NationId,
        kind: ProvinceBuildingKind,
        is_pop_project: bool,
    },
    State {
        state: StateInstanceId,
        nation: NationId,
        factory_type: FactoryTypeId,
        is_upgrade: bool,
        is_pop_project: bool,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldState {
    pub date: Date,
    pub rng_seed: u64,
    pub config: AiConfig,

    pub nations: Vec<NationState>,
    pub provinces: Vec<ProvinceState>,
    pub state_definitions: Vec<StateDefinition>,
    pub state_instances: Vec<StateInstance>,

    pub tech_folders: Vec<TechFolder>,
    pub technologies: Vec<Technology>,
    pub commodity_count: usize,
    pub factory_types: Vec<FactoryType>,
    pub parties: Vec<PoliticalParty>,
    pub focuses: Vec<NationalFocus>,
    pub focus_catalog: FocusCatalog,

    pub decisions: Vec<Decision>,
    pub triggers: Vec<TriggerProgram>,
    pub effects: Vec<EffectProgram>,

    pub gp_relationships: Vec<GpRelationship>,
    /// (great power, target) → relationship
    pub gp_index: FxHashMap<(NationId, NationId), GpRelationshipId>,
    pub diplomacy: DiplomacyState,
    pub crisis: CrisisState,

    pub claims: Vec<ColonizationClaim>,
    pub constructions: Vec<ConstructionProject>,
}

impl WorldState {
    /// Deterministic checksum over every field the AI reads or writes.
    ///
    /// Tables are walked in handle order, so identical worlds hash identically
    /// across runs and thread counts.
    pub fn checksum(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.date.hash(&mut hasher);

        for n in &self.nations {
            n.owned_provinces.len().hash(&mut hasher);
            n.military_score.hash(&mut hasher);
            n.treasury.hash(&mut hasher);
            n.ai_is_threatened.hash(&mut hasher);
            n.ai_rival.hash(&mut hasher);
            n.in_sphere_of.hash(&mut hasher);
            n.issue_rules.hash(&mut hasher);
            n.ruling_party.hash(&mut hasher);
            n.current_research.hash(&mut hasher);
            n.researched.hash(&mut hasher);
            n.colonial_points.hash(&mut hasher);
            n.flashpoint_focus_state.hash(&mut hasher);
        }

        for si in &self.state_instances {
            si.owner.hash(&mut hasher);
            si.owner_focus.hash(&mut hasher);
            si.naval_base_is_taken.hash(&mut hasher);
            si.pending_factories.hash(&mut hasher);
        }

        // Hash-map iteration order is unspecified; sort the keys first.
        let mut relations: Vec<_> = self.diplomacy.relations.iter().collect();
        relations.sort_by_key(|(k, _)| **k);
        for (key, rel) in relations {
            key.hash(&mut hasher);
            rel.allied.hash(&mut hasher);
            rel.value.hash(&mut hasher);
        }

        for rel in &self.gp_relationships {
            rel.great_power.hash(&mut hasher);
            rel.target.hash(&mut hasher);
            rel.influence.hash(&mut hasher);
            rel.status.hash(&mut hasher);
        }

        for claim in &self.claims {
            claim.state.hash(&mut hasher);
            claim.colonizer.hash(&mut hasher);
            claim.level.hash(&mut hasher);
            claim.points_invested.hash(&mut hasher);
            claim.last_investment.hash(&mut hasher);
        }

        self.constructions.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_roundtrip_ymd() {
        let d = Date::from_ymd(1836, 3, 15);
        assert_eq!(d.to_ymd(), (1836, 3, 15));
        assert_eq!(d.year(), 1836);
    }

    #[test]
    fn test_date_year_rollover() {
        let d = Date::from_ymd(1836, 12, 31).add_days(1);
        assert_eq!(d.to_ymd(), (1837, 1, 1));
    }

    #[test]
    fn test_four_year_window() {
        let loss = Date::from_ymd(1836, 1, 1);
        assert_eq!(Date::from_ymd(1840, 1, 1).days_since(loss), 365 * 4);
    }

    #[test]
    fn test_influence_status_packing() {
        let mut status = InfluenceStatus::default();
        assert_eq!(status.level(), InfluenceLevel::Neutral);
        status.set_level(InfluenceLevel::Friendly);
        status.set_priority(InfluencePriority::Two);
        status.set_banned(true);
        assert_eq!(status.level(), InfluenceLevel::Friendly);
        assert_eq!(status.priority(), Some(InfluencePriority::Two));
        assert!(status.is_banned());

        status.set_priority(InfluencePriority::Three);
        assert_eq!(status.priority_bit_count(), 1);
        status.clear_priority();
        assert_eq!(status.priority(), None);
        assert_eq!(status.level(), InfluenceLevel::Friendly);
    }

    #[test]
    fn test_issue_rules() {
        let rules = IssueRules::BUILD_FACTORY | IssueRules::BUILD_RAILWAY;
        assert!(rules.contains(IssueRules::BUILD_FACTORY));
        assert!(!rules.contains(IssueRules::EXPAND_FACTORY));
        assert!(rules.intersects(IssueRules::EXPAND_FACTORY | IssueRules::BUILD_RAILWAY));
    }

    #[test]
    fn test_saturated_workers() {
        let mut demo = Demographics {
            factory_workers: Fixed::from_int(100),
            employed_factory_workers: Fixed::from_int(100),
            ..Default::default()
        };
        assert!(demo.factory_workers_saturated());
        demo.employed_factory_workers = Fixed::from_int(50);
        assert!(!demo.factory_workers_saturated());
        // No workers at all still counts as spare capacity
        demo.factory_workers = Fixed::ZERO;
        demo.employed_factory_workers = Fixed::ZERO;
        assert!(!demo.factory_workers_saturated());
    }
}
