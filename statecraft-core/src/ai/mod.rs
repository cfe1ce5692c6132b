//! AI decision components.
//!
//! Each component is a free function over `&mut WorldState`, run once per tick in the
//! order [`crate::step::run_ai_tick`] fixes. Components read whatever they need but
//! only write the fields they own (threat flags, alliances, influence, research,
//! focuses, construction queues, colonial claims), so later components see the
//! decisions of earlier ones within the same tick.
//!
//! # Determinism
//!
//! Ties are broken by handle order or by [`crate::rng::draw`], never by iteration
//! order of a hash map or by thread scheduling. The parallel regions (research and
//! decisions) collect results in nation order before applying them.

pub mod alliance;
pub mod colonization;
pub mod construction;
pub mod decisions;
pub mod focus;
pub mod influence;
pub mod research;
pub mod strategy;

pub use alliance::{ai_will_accept_alliance, ai_will_grant_access, form_alliances, AllianceAssessment};
pub use colonization::{update_ai_colonial_investment, update_ai_colony_starting, upgrade_colonies};
pub use construction::{construction_budget, update_ai_econ_construction};
pub use decisions::take_ai_decisions;
pub use focus::{identify_focuses, update_focuses};
pub use influence::{perform_influence_actions, update_influence_priorities};
pub use research::{initialize_ai_tech_weights, update_ai_research};
pub use strategy::{assess, update_ai_general_status, StrengthAssessment};
