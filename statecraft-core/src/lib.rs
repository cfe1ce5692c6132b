//! # Statecraft Core
//!
//! Deterministic AI decision layer for a grand-strategy simulation.
//!
//! Once per tick, every computer-controlled nation reassesses its military
//! position, picks rivals and allies, steers great-power influence, chooses
//! research, adopts decisions, sets national focuses, queues construction and
//! competes for colonies. Each component is a free function over
//! [`WorldState`]; [`run_ai_tick`] runs them in a fixed order.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ WorldState  │────▶│ run_ai_tick  │────▶│ NotificationSink │
//! │ (arena)     │◀────│ (components) │     │ (one-way)        │
//! └─────────────┘     └──────┬───────┘     └──────────────────┘
//!                            │
//!                     ┌──────▼───────┐
//!                     │  TickReport  │──▶ AiMetrics
//!                     └──────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`WorldState`] | Arena of nations, provinces, states, relationships, wars |
//! | [`Fixed`] | Fixed-point scalar used for every simulation quantity |
//! | [`AiConfig`] | Tunable constants, carried inside the world |
//! | [`TriggerProgram`] | Postfix condition/weight program, evaluated per nation or per batch |
//! | [`NotificationSink`] | Destination for player-facing messages |
//! | [`AiMetrics`] | Per-component timings and outcome counters |
//!
//! ## Determinism
//!
//! Given the same world and seed, a tick produces the same state and the same
//! notifications regardless of thread count. Randomness comes only from
//! [`rng::draw`], a pure function of a seed and a salt.

pub mod ai;
pub mod config;
pub mod defines;
pub mod error;
pub mod fixed;
pub mod metrics;
pub mod notify;
mod query;
pub mod rng;
pub mod state;
pub mod step;
pub mod systems;
pub mod testing;
pub mod trigger;

pub use config::AiConfig;
pub use error::{ConstructionError, TriggerError};
pub use fixed::Fixed;
pub use metrics::AiMetrics;
pub use notify::{
    Category, JsonlSink, LogSink, Message, Notification, NotificationSink, NullSink,
};
pub use state::{Date, NationId, WorldState};
pub use step::{prepare_world, run_ai_tick, ComponentTimings, TickReport};
pub use trigger::TriggerProgram;
