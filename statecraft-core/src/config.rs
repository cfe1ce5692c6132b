use crate::defines::{colonization, demographics, economy, influence, strategy};
use crate::fixed::Fixed;
use serde::{Deserialize, Serialize};

/// Decision engine configuration.
///
/// Every tunable the AI components read lives here. The defaults come from
/// [`crate::defines`]; a runner can override any subset by deserializing a
/// partial JSON object (missing fields fall back to the default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    // === Strategic assessment ===
    pub safety_factor: Fixed,
    pub war_loss_safety_factor: Fixed,
    pub war_loss_memory_days: i32,
    pub subject_strength_share: Fixed,
    pub rival_min_ratio: Fixed,
    pub rival_max_ratio: Fixed,
    pub rival_drop_multiple: i64,

    // === Influence ===
    pub increase_opinion_cost: Fixed,
    pub remove_from_sphere_cost: Fixed,
    pub add_to_sphere_cost: Fixed,
    pub remove_from_sphere_relation_penalty: Fixed,
    pub large_population_limit: Fixed,

    // === Economy ===
    pub treasury_per_project: Fixed,
    pub min_projects: i32,
    pub industrial_bootstrap_score: Fixed,
    pub ruling_party_cooldown_days: i32,
    pub factories_per_state: i32,
    /// Nations per batch in decision adoption
    pub decision_batch_width: usize,

    // === Colonization ===
    pub colonial_rank: u16,
    pub colonization_days_between_investment: i32,
    pub colonization_interest_cost: i32,
    pub colonization_influence_cost: i32,
    pub colonization_extra_guard_cost: i32,
    pub colonization_interest_cost_initial: i32,
    pub colonization_interest_cost_neighbor_modifier: i32,

    // === Demographics ===
    pub clergy_research_optimum: Fixed,
    pub max_clergy_for_literacy: Fixed,
    pub population_per_focus: Fixed,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            safety_factor: Fixed::from_raw(strategy::SAFETY_FACTOR_RAW),
            war_loss_safety_factor: Fixed::from_raw(strategy::WAR_LOSS_SAFETY_FACTOR_RAW),
            war_loss_memory_days: strategy::WAR_LOSS_MEMORY_DAYS,
            subject_strength_share: Fixed::from_raw(strategy::SUBJECT_STRENGTH_SHARE_RAW),
            rival_min_ratio: Fixed::from_raw(strategy::RIVAL_MIN_RATIO_RAW),
            rival_max_ratio: Fixed::from_raw(strategy::RIVAL_MAX_RATIO_RAW),
            rival_drop_multiple: strategy::RIVAL_DROP_MULTIPLE,

            increase_opinion_cost: Fixed::from_int(influence::INCREASE_OPINION_COST),
            remove_from_sphere_cost: Fixed::from_int(influence::REMOVE_FROM_SPHERE_COST),
            add_to_sphere_cost: Fixed::from_int(influence::ADD_TO_SPHERE_COST),
            remove_from_sphere_relation_penalty: Fixed::from_int(
                influence::REMOVE_FROM_SPHERE_RELATION_PENALTY,
            ),
            large_population_limit: Fixed::from_int(influence::LARGE_POPULATION_LIMIT),

            treasury_per_project: Fixed::from_int(economy::TREASURY_PER_PROJECT),
            min_projects: economy::MIN_PROJECTS,
            industrial_bootstrap_score: Fixed::from_int(economy::INDUSTRIAL_BOOTSTRAP_SCORE),
            ruling_party_cooldown_days: economy::RULING_PARTY_COOLDOWN_DAYS,
            factories_per_state: economy::FACTORIES_PER_STATE,
            decision_batch_width: economy::DECISION_BATCH_WIDTH,

            colonial_rank: colonization::COLONIAL_RANK,
            colonization_days_between_investment: colonization::DAYS_BETWEEN_INVESTMENT,
            colonization_interest_cost: colonization::INTEREST_COST,
            colonization_influence_cost: colonization::INFLUENCE_COST,
            colonization_extra_guard_cost: colonization::EXTRA_GUARD_COST,
            colonization_interest_cost_initial: colonization::INTEREST_COST_INITIAL,
            colonization_interest_cost_neighbor_modifier:
                colonization::INTEREST_COST_NEIGHBOR_MODIFIER,

            clergy_research_optimum: Fixed::from_raw(demographics::CLERGY_RESEARCH_OPTIMUM_RAW),
            max_clergy_for_literacy: Fixed::from_raw(demographics::MAX_CLERGY_FOR_LITERACY_RAW),
            population_per_focus: Fixed::from_int(demographics::POPULATION_PER_FOCUS),
        }
    }
}

impl AiConfig {
    /// Points needed to plant a claim, with the neighbour modifier when adjacent.
    pub fn colony_start_cost(&self, adjacent: bool) -> i32 {
        let modifier = if adjacent {
            self.colonization_interest_cost_neighbor_modifier
        } else {
            0
        };
        self.colonization_interest_cost_initial + modifier
    }
}
