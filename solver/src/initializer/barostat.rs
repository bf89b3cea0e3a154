use mdpress_core::{BoxGeometry, IntegratorKind, InteractionTable, SimulationParameters, State};
use na::Vector3;
use crate::comm::Communicator;
use crate::error::BarostatError;

/// Geometry bit of a box length fluctuating along x
pub const NPTGEOM_XDIR: u8 = 1;
/// Geometry bit of a box length fluctuating along y
pub const NPTGEOM_YDIR: u8 = 2;
/// Geometry bit of a box length fluctuating along z
pub const NPTGEOM_ZDIR: u8 = 4;

const AXIS_BITS: [u8; 3] = [NPTGEOM_XDIR, NPTGEOM_YDIR, NPTGEOM_ZDIR];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NptPhase {
    #[default]
    Uninitialized,
    Initialized,
    Integrating,
}

/// Isotropic NpT barostat: a piston of mass `piston` couples the
/// instantaneous pressure to the box volume.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NptIso {
    p_ext: f64,
    p_inst: f64,
    p_diff: f64,
    piston: f64,
    inv_piston: f64,
    volume: f64,
    p_vir: [f64; 3],
    p_vel: [f64; 3],
    geometry: u8,
    dimension: usize,
    non_const_dim: Option<usize>,
    cubic_box: bool,
    phase: NptPhase,
}

impl NptIso {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the barostat. Collective, the parameters of the root rank
    /// win.
    ///
    /// `rescale` enables the box length fluctuation per axis. Anisotropic
    /// rescaling is not possible with long range electrostatic or magnetic
    /// interactions, those need `cubic_box`. Nothing changes on error.
    pub fn initialize(&mut self, p_ext: f64, piston: f64, rescale: [bool; 3], cubic_box: bool,
                      interactions: &InteractionTable, comm: &dyn Communicator) -> Result<(), BarostatError> {
        if p_ext < 0.0 {
            return Err(BarostatError::NegativePressure(p_ext));
        }
        if piston <= 0.0 {
            return Err(BarostatError::PistonMass(piston));
        }
        let mut geometry = 0u8;
        let mut dimension = 0usize;
        let mut non_const_dim = None;
        for (axis, _) in rescale.iter().enumerate().filter(|(_, enabled)| **enabled) {
            geometry |= AXIS_BITS[axis];
            dimension += 1;
            non_const_dim = Some(axis);
        }
        if dimension == 0 {
            return Err(BarostatError::NoDimension);
        }
        if dimension < 3 && !cubic_box {
            if interactions.electrostatics.is_active() {
                return Err(BarostatError::AnisotropicElectrostatics);
            }
            if interactions.magnetostatics.is_active() {
                return Err(BarostatError::AnisotropicMagnetostatics);
            }
        }

        let mut parameters = [
            geometry as f64,
            dimension as f64,
            if cubic_box { 1.0 } else { 0.0 },
            non_const_dim.map_or(-1.0, |axis| axis as f64),
            p_ext,
            piston,
        ];
        comm.broadcast(&mut parameters, 0);
        self.geometry = parameters[0] as u8;
        self.dimension = parameters[1] as usize;
        self.cubic_box = parameters[2] != 0.0;
        self.non_const_dim = if parameters[3] < 0.0 { None } else { Some(parameters[3] as usize) };
        self.p_ext = parameters[4];
        self.piston = parameters[5];
        self.phase = NptPhase::Initialized;
        log::info!("NpT barostat set up: p_ext {}, piston {}, geometry {:#05b}, cubic {}",
            self.p_ext, self.piston, self.geometry, self.cubic_box);
        Ok(())
    }

    /// Error if NpT integration is configured without a piston mass.
    pub fn sanity_check(&self, parameters: &SimulationParameters) -> Result<(), BarostatError> {
        if parameters.integrator == IntegratorKind::NptIso && self.piston <= 0.0 {
            return Err(BarostatError::PistonNotSet);
        }
        Ok(())
    }

    /// Starts NpT integration in a box of the current `geometry`.
    ///
    /// With `recalc_forces` the pressure accumulators are cleared, the next
    /// force calculation refills them.
    pub fn enter_integration(&mut self, geometry: &BoxGeometry, parameters: &SimulationParameters,
                             recalc_forces: bool) -> Result<(), BarostatError> {
        if parameters.integrator != IntegratorKind::NptIso {
            return Err(BarostatError::IntegratorNotNpt);
        }
        let non_const_dim = match self.non_const_dim {
            Some(axis) if self.dimension > 0 => axis,
            _ => return Err(BarostatError::DimensionNotSet),
        };
        if let Err(error) = self.sanity_check(parameters) {
            log::warn!("{error}");
        }
        self.inv_piston = if self.piston > 0.0 { 1.0 / self.piston } else { 0.0 };
        self.volume = geometry.length[non_const_dim].powi(self.dimension as i32);
        if recalc_forces {
            self.p_inst = 0.0;
            self.p_vir = [0.0; 3];
            self.p_vel = [0.0; 3];
        }
        self.phase = NptPhase::Integrating;
        log::debug!("NpT integration started at volume {}", self.volume);
        Ok(())
    }

    pub fn leave_integration(&mut self) {
        if self.phase == NptPhase::Integrating {
            self.phase = NptPhase::Initialized;
        }
    }

    pub fn is_integrating(&self) -> bool {
        self.phase == NptPhase::Integrating
    }

    pub fn reset_virials(&mut self) {
        if self.is_integrating() {
            self.p_vir = [0.0; 3];
        }
    }

    /// Virial hook of the force loop, `d` is the minimum image separation the
    /// `force` acts along.
    pub fn add_virial_contribution(&mut self, force: &Vector3<f64>, d: &Vector3<f64>) {
        if self.is_integrating() {
            for k in 0..3 {
                self.p_vir[k] += force[k] * d[k];
            }
        }
    }

    /// Kinetic hook of the integrator, `velocity` in length per time step.
    pub fn add_velocity_contribution(&mut self, velocity: &Vector3<f64>, mass: f64) {
        if self.is_integrating() {
            for k in 0..3 {
                self.p_vel[k] += mass * velocity[k] * velocity[k];
            }
        }
    }

    /// Reduces the virial and kinetic sums, updates the instantaneous
    /// pressure and the piston momentum and synchronizes them. Collective.
    pub fn finalize_instantaneous_pressure(&mut self, comm: &dyn Communicator,
                                           time_step: f64) -> Result<(), BarostatError> {
        if time_step <= 0.0 {
            return Err(BarostatError::InvalidTimeStep(time_step));
        }
        if !self.is_integrating() {
            return Ok(());
        }
        let send = [self.p_vir[0], self.p_vir[1], self.p_vir[2], self.p_vel[0], self.p_vel[1], self.p_vel[2]];
        if let Some(sum) = comm.reduce_sum(&send, 0) {
            let mut p_inst = 0.0;
            for axis in (0..3).filter(|axis| self.geometry & AXIS_BITS[*axis] != 0) {
                p_inst += sum[axis] + sum[3 + axis] / (time_step * time_step);
            }
            self.p_inst = p_inst / (self.dimension as f64 * self.volume);
            self.p_diff += (self.p_inst - self.p_ext) * 0.5 * time_step;
        }
        self.synchronize(comm);
        Ok(())
    }

    fn synchronize(&mut self, comm: &dyn Communicator) {
        let mut data = [self.p_inst, self.p_diff, self.volume];
        comm.broadcast(&mut data, 0);
        self.p_inst = data[0];
        self.p_diff = data[1];
        self.volume = data[2];
    }

    /// Moves the piston by half a time step and rescales box and positions to
    /// the new volume.
    ///
    /// Runs on replicated data: every rank holds the same synchronized
    /// barostat state and computes the same update.
    pub fn propagate_box(&mut self, state: &mut State, time_step: f64) -> Result<(), BarostatError> {
        let Some(non_const_dim) = self.non_const_dim.filter(|_| self.is_integrating()) else {
            return Ok(());
        };
        let volume = self.volume + self.inv_piston * self.p_diff * 0.5 * time_step;
        if volume <= 0.0 {
            return Err(BarostatError::NegativeVolume {
                piston: self.piston,
                time_step,
                p_diff: self.p_diff,
                volume,
            });
        }
        self.volume = volume;
        let old_length = state.geometry.length[non_const_dim];
        let new_length = volume.powf(1.0 / self.dimension as f64);
        let scale = new_length / old_length;
        for axis in 0..3 {
            if self.cubic_box || self.geometry & AXIS_BITS[axis] != 0 {
                state.geometry.length[axis] *= scale;
                for particle in &mut state.particles {
                    particle.position[axis] *= scale;
                }
            }
        }
        state.invalidate();
        log::debug!("Box rescaled by {} to volume {}", scale, volume);
        Ok(())
    }

    pub fn p_ext(&self) -> f64 {
        self.p_ext
    }

    pub fn p_inst(&self) -> f64 {
        self.p_inst
    }

    pub fn p_diff(&self) -> f64 {
        self.p_diff
    }

    pub fn piston(&self) -> f64 {
        self.piston
    }

    pub fn inv_piston(&self) -> f64 {
        self.inv_piston
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn p_vir(&self) -> [f64; 3] {
        self.p_vir
    }

    pub fn p_vel(&self) -> [f64; 3] {
        self.p_vel
    }

    /// Bitmask of the fluctuating axes, see [NPTGEOM_XDIR]
    pub fn geometry(&self) -> u8 {
        self.geometry
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Last fluctuating axis, its length defines the volume
    pub fn non_const_dim(&self) -> Option<usize> {
        self.non_const_dim
    }

    pub fn cubic_box(&self) -> bool {
        self.cubic_box
    }

    pub fn phase(&self) -> NptPhase {
        self.phase
    }
}
