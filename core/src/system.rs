use serde::{Deserialize, Serialize};
use crate::{InteractionTable, State};

/// Integrator driving the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegratorKind {
    #[default]
    VelocityVerlet,
    /// Velocity Verlet coupled to an isotropic NpT barostat
    NptIso,
}

/// Global simulation parameters the pressure analysis depends on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub time_step: f64,
    /// Rotational degrees of freedom enabled
    #[serde(default)]
    pub rotation: bool,
    #[serde(default)]
    pub integrator: IntegratorKind,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            time_step: 0.01,
            rotation: false,
            integrator: IntegratorKind::VelocityVerlet,
        }
    }
}

/// Everything a pressure computation reads: particles, interactions and
/// simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct System {
    pub state: State,
    pub interactions: InteractionTable,
    #[serde(default)]
    pub parameters: SimulationParameters,
}

impl System {
    pub fn new(state: State, interactions: InteractionTable, parameters: SimulationParameters) -> Self {
        Self {
            state,
            interactions,
            parameters,
        }
    }
}
