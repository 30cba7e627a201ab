use crate::time::ClockConfig;
use crate::window::RuntimeConfig;

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub clock: ClockConfig,
    pub runtime: RuntimeConfig,
}
