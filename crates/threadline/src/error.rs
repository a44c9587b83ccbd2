use crate::types::ConfigError;

/// Construction-time failures reported synchronously by `start`/`mount`.
///
/// None of these are retried: they depend on the environment (driver, surface)
/// or on the fixed shader sources, not on transient conditions.
#[derive(Debug, thiserror::Error)]
pub enum BackdropError {
    #[error("no rendering context available: {0}")]
    ContextCreation(String),
    #[error("shader program failed to compile: {0}")]
    ProgramCompile(String),
    #[error("failed to allocate drawable mesh: {0}")]
    MeshAllocation(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, BackdropError>;

/// Failure of a single draw call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    /// The frame could not be produced but the next one may succeed.
    #[error("transient draw failure: {0}")]
    Transient(String),
    /// The context can no longer render; the loop should wind down.
    #[error("fatal draw failure: {0}")]
    Fatal(String),
}
