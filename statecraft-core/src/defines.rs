//! Decision-engine constants (defines).
//!
//! These are the defaults behind [`AiConfig`](crate::config::AiConfig). Ratios are
//! expressed as raw [`Fixed`](crate::fixed::Fixed) values (scale 10000) so they can
//! be used in `const` context.

/// Threat assessment and rival selection
pub mod strategy {
    /// Multiplier on the strongest hostile neighbour before a nation feels threatened (1.2)
    pub const SAFETY_FACTOR_RAW: i64 = 12_000;

    /// Safety factor after a recent lost war (1.8)
    pub const WAR_LOSS_SAFETY_FACTOR_RAW: i64 = 18_000;

    /// How long a lost war keeps the raised safety factor (4 years)
    pub const WAR_LOSS_MEMORY_DAYS: i32 = 365 * 4;

    /// Share of a subject's military score counted toward its overlord (0.75)
    pub const SUBJECT_STRENGTH_SHARE_RAW: i64 = 7_500;

    /// A new rival must be stronger than this share of our strength (0.5)
    pub const RIVAL_MIN_RATIO_RAW: i64 = 5_000;

    /// A new rival may be at most this share of our strength (1.25)
    pub const RIVAL_MAX_RATIO_RAW: i64 = 12_500;

    /// An existing rival is dropped once either side is more than this multiple of the other
    pub const RIVAL_DROP_MULTIPLE: i64 = 2;

    /// Upper bound of a diplomatic relation value
    pub const MAX_RELATION: i64 = 200;
}

/// Sphere of influence
pub mod influence {
    pub const INCREASE_OPINION_COST: i64 = 50;
    pub const REMOVE_FROM_SPHERE_COST: i64 = 100;
    pub const ADD_TO_SPHERE_COST: i64 = 100;

    /// Relation change between the acting power and the displaced sphere leader
    pub const REMOVE_FROM_SPHERE_RELATION_PENALTY: i64 = -10;

    /// Targets above this population are too large to court
    pub const LARGE_POPULATION_LIMIT: i64 = 15_000_000;

    /// Bonus for sharing a culture group with the target
    pub const CULTURE_GROUP_BONUS: i64 = 4;

    /// Divisor applied when the target already sits in another sphere
    pub const FOREIGN_SPHERE_DIVISOR: i64 = 3;

    /// Multiplier when the target borders the great power
    pub const ADJACENCY_MULTIPLIER: i64 = 3;

    /// Targets per priority tier (highest tier first)
    pub const TARGETS_PER_TIER: usize = 2;
}

/// Research, decisions and construction
pub mod economy {
    /// Treasury needed per simultaneous construction project
    pub const TREASURY_PER_PROJECT: i64 = 8_000;

    /// Minimum project budget for any nation that runs the scheduler
    pub const MIN_PROJECTS: i32 = 2;

    /// Below this industrial score the AI tries to appoint a pro-industry party
    pub const INDUSTRIAL_BOOTSTRAP_SCORE: i64 = 10;

    /// Days between ruling party appointments
    pub const RULING_PARTY_COOLDOWN_DAYS: i32 = 365;

    /// Maximum factories (existing plus queued builds) in one state
    pub const FACTORIES_PER_STATE: i32 = 8;

    /// Highest level a factory can be upgraded to
    pub const MAX_FACTORY_LEVEL: u8 = 255;

    /// Technology cost discount per year past availability (2%)
    pub const TECH_COST_DECAY_PER_YEAR_RAW: i64 = 200;

    /// Technology cost never drops below this share of its base (0.5)
    pub const TECH_COST_FLOOR_RAW: i64 = 5_000;

    /// Nations evaluated per batch when adopting decisions
    pub const DECISION_BATCH_WIDTH: usize = 64;
}

/// Colonization
pub mod colonization {
    /// Number of colonial ranks that may invest and claim each tick
    pub const COLONIAL_RANK: u16 = 8;

    pub const DAYS_BETWEEN_INVESTMENT: i32 = 30;

    /// Cost of an investment while the race is still in the interest stage
    pub const INTEREST_COST: i32 = 5;

    /// Cost of an investment once the race is in the influence stage
    pub const INFLUENCE_COST: i32 = 10;

    /// Extra cost per level above [`GUARD_FREE_LEVELS`]
    pub const EXTRA_GUARD_COST: i32 = 4;

    /// Levels that cost only [`INFLUENCE_COST`]
    pub const GUARD_FREE_LEVELS: u8 = 4;

    /// Points spent to plant the first claim
    pub const INTEREST_COST_INITIAL: i32 = 25;

    /// Added to the initial cost when the colonizer borders the state (a discount)
    pub const INTEREST_COST_NEIGHBOR_MODIFIER: i32 = -10;

    /// Population a colonial state needs before it can be integrated
    pub const INTEGRATION_MIN_POPULATION: i64 = 250_000;

    /// Colonial points needed per province to integrate a colonial state
    pub const INTEGRATION_POINTS_PER_PROVINCE: i32 = 2;
}

/// Demographics and national focus
pub mod demographics {
    /// Clergy share that maximizes research (0.02)
    pub const CLERGY_RESEARCH_OPTIMUM_RAW: i64 = 200;

    /// Clergy share that caps literacy growth (0.04)
    pub const MAX_CLERGY_FOR_LITERACY_RAW: i64 = 400;

    /// A state below this share of the literacy cap still gets a clergy focus (0.8)
    pub const LITERACY_CAP_THRESHOLD_RAW: i64 = 8_000;

    /// A state below this share of the research optimum gets a clergy focus (1.2)
    pub const RESEARCH_OPTIMUM_THRESHOLD_RAW: i64 = 12_000;

    /// Population per additional national focus slot
    pub const POPULATION_PER_FOCUS: i64 = 1_000_000;
}
