use mdpress_core::System;
use crate::cells::{CellGrid, VirialBackend};
use crate::comm::Communicator;
use crate::error::PressureError;
use crate::observable::ObservableStat;
use crate::virial::{add_pair_virials, add_particle_virials};

/// Regular cell grid with cells at least as large as the interaction range
/// plus a skin. Ranks own contiguous blocks of cells and keep Verlet lists of
/// the pairs closer than the cell range.
#[derive(Debug, Default)]
pub struct DomainDecomposition {
    skin: f64,
    range: f64,
    grid: CellGrid,
    owned_cells: Vec<usize>,
    owned_particles: Vec<usize>,
    verlet_pairs: Vec<(usize, usize)>,
}

impl DomainDecomposition {
    pub fn new(skin: f64) -> Self {
        Self {
            skin: skin.max(0.0),
            ..Default::default()
        }
    }

    pub fn verlet_pairs(&self) -> &[(usize, usize)] {
        &self.verlet_pairs
    }
}

impl VirialBackend for DomainDecomposition {
    fn name(&self) -> &'static str {
        "domain decomposition"
    }

    fn resort(&mut self, system: &System, comm: &dyn Communicator) {
        self.range = system.interactions.max_cut() + self.skin;
        let n_cells = CellGrid::dimensions(system, self.range, [true; 3]);
        self.grid = CellGrid::build(system, n_cells);
        self.owned_cells = self.grid.owned_cells(comm);
        self.owned_particles = self.owned_cells.iter()
            .flat_map(|cell| self.grid.particles(*cell).iter().copied())
            .collect();
        log::debug!("Domain decomposition on rank {}: {}, {} particles owned",
            comm.rank(), self.grid, self.owned_particles.len());
    }

    fn rebuild_pair_lists(&mut self, system: &System) {
        let state = &system.state;
        let range2 = self.range * self.range;
        let pairs = self.grid.pairs(&self.owned_cells)
            .filter(|&(i, j)| {
                let d = state.geometry.get_mi_vector(&state.particles[i].position, &state.particles[j].position);
                d.norm_squared() <= range2
            })
            .collect();
        self.verlet_pairs = pairs;
        log::debug!("Verlet lists rebuilt, {} pairs within {}", self.verlet_pairs.len(), self.range);
    }

    fn calculate_virials(&mut self, system: &System, virials: &mut ObservableStat) -> Result<(), PressureError> {
        let particles = &system.state.particles;
        for &i in &self.owned_particles {
            add_particle_virials(system, &particles[i], virials)?;
        }
        for &(i, j) in &self.verlet_pairs {
            add_pair_virials(system, &particles[i], &particles[j], virials)?;
        }
        Ok(())
    }
}
