use mdpress_core::System;
use crate::cells::VirialBackend;
use crate::comm::Communicator;
use crate::error::PressureError;
use crate::observable::ObservableStat;
use crate::virial::{add_pair_virials, add_particle_virials};

/// All pairs without spatial structure. Particles are dealt round robin, the
/// owner of the first particle of a pair computes it.
#[derive(Debug, Default)]
pub struct NSquare {
    owned: Vec<usize>,
}

impl NSquare {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VirialBackend for NSquare {
    fn name(&self) -> &'static str {
        "nsquare"
    }

    fn resort(&mut self, system: &System, comm: &dyn Communicator) {
        self.owned = (0..system.state.particles.len())
            .filter(|i| i % comm.size() == comm.rank())
            .collect();
        log::debug!("N-square on rank {}: {} particles owned", comm.rank(), self.owned.len());
    }

    fn calculate_virials(&mut self, system: &System, virials: &mut ObservableStat) -> Result<(), PressureError> {
        let particles = &system.state.particles;
        for &i in &self.owned {
            let p1 = &particles[i];
            add_particle_virials(system, p1, virials)?;
            for p2 in &particles[i + 1..] {
                add_pair_virials(system, p1, p2, virials)?;
            }
        }
        Ok(())
    }
}
