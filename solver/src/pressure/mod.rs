//! Virial pressure of a system, scalar and tensor.

mod bins;
mod tensor;

pub use bins::{calc_bins_sphere, SphereBins};
pub use tensor::local_stress_tensor;

use mdpress_core::{BoxGeometry, CoulombMethod, Electrostatics, System};
use crate::cells::{CellStructure, VirialBackend};
use crate::comm::Communicator;
use crate::electrostatics::KSpaceSolver;
use crate::error::PressureError;
use crate::observable::{ObservableStat, SCALAR};

/// Which pairs the stress tensor of a particle subset includes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PairScope {
    /// Only pairs and bonds with both partners in the subset
    #[default]
    WithinSubset,
    /// Pairs between the subset and all particles outside of it
    AgainstAll,
}

impl PairScope {
    /// `0` is [PairScope::WithinSubset], `1` is [PairScope::AgainstAll].
    pub fn from_flag(flag: i32) -> Option<Self> {
        match flag {
            0 => Some(PairScope::WithinSubset),
            1 => Some(PairScope::AgainstAll),
            _ => None,
        }
    }
}

/// Number of electrostatic slots of the scalar pressure.
pub fn coulomb_slots(electrostatics: &Electrostatics) -> usize {
    if !electrostatics.is_active() {
        return 0;
    }
    match electrostatics.method {
        CoulombMethod::None => 0,
        CoulombMethod::DebyeHueckel { .. } => 1,
        CoulombMethod::P3m { .. } => 2,
    }
}

/// Every edge has to be positive; infinite edges are open axes.
pub(crate) fn check_box(geometry: &BoxGeometry) -> Result<(), PressureError> {
    match (0..3).find(|axis| !(geometry.length[*axis] > 0.0)) {
        Some(axis) => Err(PressureError::InvalidBoxLength { axis, length: geometry.length[axis] }),
        None => Ok(()),
    }
}

pub(crate) fn check_volume(volume: f64) -> Result<f64, PressureError> {
    if volume > 0.0 && volume.is_finite() {
        Ok(volume)
    } else {
        Err(PressureError::InvalidVolume(volume))
    }
}

pub(crate) fn check_time_step(time_step: f64) -> Result<f64, PressureError> {
    if time_step > 0.0 {
        Ok(time_step)
    } else {
        Err(PressureError::InvalidTimeStep(time_step))
    }
}

/// Divisor of the kinetic slot: `3 V dt^2`, twice that with rotation.
pub(crate) fn kinetic_divisor(volume: f64, time_step: f64, rotation: bool) -> f64 {
    let degrees = if rotation { 6.0 } else { 3.0 };
    degrees * volume * time_step * time_step
}

/// Owns the pressure accumulators and the decomposition used to fill them.
pub struct PressureEngine {
    backend: Box<dyn VirialBackend>,
    kspace: Option<Box<dyn KSpaceSolver>>,
    /// Partial sums of this rank
    virials: ObservableStat,
    total_pressure: ObservableStat,
    p_tensor: ObservableStat,
    needs_resort: bool,
    n_particles: usize,
}

impl PressureEngine {
    pub fn new(cell_structure: CellStructure) -> Self {
        Self {
            backend: cell_structure.into_backend(),
            kspace: None,
            virials: ObservableStat::new(),
            total_pressure: ObservableStat::new(),
            p_tensor: ObservableStat::new(),
            needs_resort: true,
            n_particles: 0,
        }
    }

    pub fn with_kspace_solver(mut self, solver: Box<dyn KSpaceSolver>) -> Self {
        self.kspace = Some(solver);
        self
    }

    pub fn set_kspace_solver(&mut self, solver: Option<Box<dyn KSpaceSolver>>) {
        self.kspace = solver;
    }

    pub fn set_cell_structure(&mut self, cell_structure: CellStructure) {
        self.backend = cell_structure.into_backend();
        self.needs_resort = true;
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Local partial sums of the last scalar computation.
    pub fn virials(&self) -> &ObservableStat {
        &self.virials
    }

    pub fn total_pressure(&self) -> &ObservableStat {
        &self.total_pressure
    }

    pub fn p_tensor(&self) -> &ObservableStat {
        &self.p_tensor
    }

    /// Marks the stored results as outdated, e.g. after the interactions
    /// changed.
    pub fn invalidate(&mut self) {
        self.total_pressure.set_initialized(false);
        self.p_tensor.set_initialized(false);
        self.needs_resort = true;
    }

    /// Computes the category decomposed scalar pressure into `result`.
    /// Collective, only the root rank gets an initialized `result`.
    pub fn pressure_calc(&mut self, system: &mut System, comm: &dyn Communicator,
                         result: &mut ObservableStat) -> Result<(), PressureError> {
        check_box(&system.state.geometry)?;
        let volume = check_volume(system.state.geometry.volume())?;
        let time_step = check_time_step(system.parameters.time_step)?;
        let n_coulomb = coulomb_slots(&system.interactions.electrostatics);
        if n_coulomb == 2 && self.kspace.is_none() {
            return Err(PressureError::MissingKSpaceSolver);
        }
        let n_bonded = system.interactions.bonded.len();
        let n_pair_types = system.interactions.n_pair_types();
        self.virials.reset(n_bonded, n_pair_types, n_coulomb, SCALAR)?;
        result.reset(n_bonded, n_pair_types, n_coulomb, SCALAR)?;

        let n_particles = system.state.particles.len();
        if self.needs_resort || system.state.resort_particles || self.n_particles != n_particles {
            self.backend.resort(system, comm);
            system.state.resort_particles = false;
            system.state.rebuild_verlet_list = true;
            self.needs_resort = false;
            self.n_particles = n_particles;
        }
        if system.state.rebuild_verlet_list {
            self.backend.rebuild_pair_lists(system);
            system.state.rebuild_verlet_list = false;
        }
        self.backend.calculate_virials(system, &mut self.virials)?;

        self.virials.ideal_mut()[0] /= kinetic_divisor(volume, time_step, system.parameters.rotation);
        if let Some(kspace) = self.kspace.as_mut().filter(|_| n_coulomb == 2) {
            self.virials.coulomb_mut(1)?[0] += kspace.kspace_virial(system, comm);
        }
        for value in &mut self.virials.data_mut()[1..] {
            *value /= 3.0 * volume;
        }

        if let Some(sum) = comm.reduce_sum(self.virials.data(), 0) {
            result.data_mut().copy_from_slice(&sum);
            result.set_initialized(true);
        }
        Ok(())
    }

    /// Scalar pressure of the whole system, `None` on all ranks but root.
    pub fn compute_scalar_pressure(&mut self, system: &mut System,
                                   comm: &dyn Communicator) -> Result<Option<&ObservableStat>, PressureError> {
        let mut total_pressure = std::mem::take(&mut self.total_pressure);
        let outcome = self.pressure_calc(system, comm, &mut total_pressure);
        self.total_pressure = total_pressure;
        outcome?;
        Ok(comm.is_root().then_some(&self.total_pressure))
    }

    /// Stress tensor of the particles with identities in `subset`, see
    /// [local_stress_tensor]. Not collective.
    pub fn compute_tensor(&mut self, system: &System, volume: f64, subset: &[usize],
                          scope: PairScope) -> Result<&ObservableStat, PressureError> {
        local_stress_tensor(system, volume, subset, scope, &mut self.p_tensor)?;
        Ok(&self.p_tensor)
    }
}

impl Default for PressureEngine {
    fn default() -> Self {
        Self::new(CellStructure::default())
    }
}
