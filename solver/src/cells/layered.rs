use mdpress_core::System;
use crate::cells::{CellGrid, VirialBackend};
use crate::comm::Communicator;
use crate::error::PressureError;
use crate::observable::ObservableStat;
use crate::virial::{add_pair_virials, add_particle_virials};

/// Slabs along z at least as thick as the interaction range. Every rank owns
/// a contiguous stack of layers and computes the pairs within them and with
/// the adjacent layers.
#[derive(Debug, Default)]
pub struct Layered {
    grid: CellGrid,
    owned_layers: Vec<usize>,
}

impl Layered {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VirialBackend for Layered {
    fn name(&self) -> &'static str {
        "layered"
    }

    fn resort(&mut self, system: &System, comm: &dyn Communicator) {
        let n_cells = CellGrid::dimensions(system, system.interactions.max_cut(), [false, false, true]);
        self.grid = CellGrid::build(system, n_cells);
        self.owned_layers = self.grid.owned_cells(comm);
        log::debug!("Layered on rank {}: {}, layers {:?}", comm.rank(), self.grid, self.owned_layers);
    }

    fn calculate_virials(&mut self, system: &System, virials: &mut ObservableStat) -> Result<(), PressureError> {
        let particles = &system.state.particles;
        for &layer in &self.owned_layers {
            for &i in self.grid.particles(layer) {
                add_particle_virials(system, &particles[i], virials)?;
            }
        }
        self.grid.pairs(&self.owned_layers)
            .try_for_each(|(i, j)| add_pair_virials(system, &particles[i], &particles[j], virials))
    }
}
