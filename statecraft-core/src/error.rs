use crate::state::{FactoryTypeId, ProvinceBuildingKind, ProvinceId, StateInstanceId};
use thiserror::Error;

/// Rejected construction project.
///
/// The scheduler guards against both cases before calling the constructors, so
/// seeing one means an upstream check is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("{kind:?} already in progress in {province}")]
    BuildingInProgress {
        province: ProvinceId,
        kind: ProvinceBuildingKind,
    },
    #[error("factory {factory_type} already in progress in {state}")]
    FactoryInProgress {
        state: StateInstanceId,
        factory_type: FactoryTypeId,
    },
    #[error("unknown construction target: {0}")]
    UnknownTarget(String),
}

/// Rejected trigger or effect program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("stack underflow at instruction {0}")]
    StackUnderflow(usize),
    #[error("program leaves {0} values on the stack (expected 1)")]
    UnbalancedProgram(usize),
    #[error("unknown field: {0}")]
    UnknownField(String),
}
