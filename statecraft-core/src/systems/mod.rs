//! Capabilities the AI relies on but does not decide: alliances and wars, party
//! appointment, technology cost, focus slots, colonization bookkeeping, map distance.

pub mod colonization;
pub mod diplomacy;
pub mod map;
pub mod nations;
pub mod politics;
pub mod tech;

pub use diplomacy::{are_allied, are_at_war, is_at_war};
pub use nations::max_national_focuses;
pub use tech::effective_technology_cost;
