//! Spatial decompositions deciding which rank computes which virials.
//!
//! Every rank holds the full particle snapshot; a backend assigns particles
//! and pairs to ranks so that after the sum reduction each pair and each
//! particle has been counted exactly once.

mod domain_decomposition;
mod layered;
mod nsquare;

pub use domain_decomposition::DomainDecomposition;
pub use layered::Layered;
pub use nsquare::NSquare;

use itertools::iproduct;
use mdpress_core::System;
use na::Vector3;
use rayon::prelude::*;
use crate::comm::Communicator;
use crate::error::PressureError;
use crate::observable::ObservableStat;

/// Upper bound of cells along one axis
const MAX_CELLS_PER_DIM: usize = 64;
/// Upper bound of cells of a grid
const MAX_NUM_CELLS: usize = 32768;

/// Strategy filling the raw virial sums of the pairs and particles this
/// rank owns.
pub trait VirialBackend: Send {
    fn name(&self) -> &'static str;

    /// Reassigns particles to ranks, called when they moved.
    fn resort(&mut self, system: &System, comm: &dyn Communicator);

    /// Rebuilds cached pair lists, if the backend has any.
    fn rebuild_pair_lists(&mut self, _system: &System) {}

    /// Adds kinetic, bonded, non-bonded and real space electrostatic virials
    /// to `virials`. No rescaling and no reduction is done here.
    fn calculate_virials(&mut self, system: &System, virials: &mut ObservableStat) -> Result<(), PressureError>;
}

/// Available decompositions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellStructure {
    /// Cubic cells of at least interaction range plus `skin`, with Verlet
    /// pair lists
    DomainDecomposition { skin: f64 },
    /// Every pair, particles distributed round robin
    NSquare,
    /// Slabs along z, contiguous layers per rank
    Layered,
}

impl Default for CellStructure {
    fn default() -> Self {
        CellStructure::DomainDecomposition { skin: 0.4 }
    }
}

impl CellStructure {
    pub fn into_backend(self) -> Box<dyn VirialBackend> {
        match self {
            CellStructure::DomainDecomposition { skin } => Box::new(DomainDecomposition::new(skin)),
            CellStructure::NSquare => Box::new(NSquare::new()),
            CellStructure::Layered => Box::new(Layered::new()),
        }
    }
}

/// Regular grid of cells over the box with the particle indices of every
/// cell and the neighbor cells within one cell distance.
#[derive(Clone, Debug, Default)]
pub(crate) struct CellGrid {
    n_cells: [usize; 3],
    cell_size: Vector3<f64>,
    /// Particle indices per cell, ascending
    cells: Vec<Vec<usize>>,
    /// Neighbor cells of every cell including itself, ascending and unique
    neighbors: Vec<Vec<usize>>,
}

impl CellGrid {
    /// Number of cells along an axis for cells at least `range` long.
    pub(crate) fn cells_along(length: f64, range: f64) -> usize {
        if !length.is_finite() || range <= 0.0 {
            return 1;
        }
        ((length / range).floor() as usize).clamp(1, MAX_CELLS_PER_DIM)
    }

    /// Grid dimensions for cells of at least `range` along the `axes`, with
    /// no more cells than twice the particle count.
    pub(crate) fn dimensions(system: &System, range: f64, axes: [bool; 3]) -> [usize; 3] {
        let length = &system.state.geometry.length;
        let mut n_cells = [1usize; 3];
        for axis in (0..3).filter(|axis| axes[*axis]) {
            n_cells[axis] = Self::cells_along(length[axis], range);
        }
        let max_cells = (2 * system.state.particles.len()).clamp(1, MAX_NUM_CELLS);
        while n_cells.iter().product::<usize>() > max_cells {
            if let Some(largest) = n_cells.iter_mut().max() {
                *largest -= 1;
            }
        }
        n_cells
    }

    pub(crate) fn build(system: &System, n_cells: [usize; 3]) -> Self {
        let geometry = &system.state.geometry;
        let cell_size = Vector3::from_fn(|axis, _| geometry.length[axis] / n_cells[axis] as f64);
        let total = n_cells[0] * n_cells[1] * n_cells[2];

        let cell_of_particle: Vec<usize> = system.state.particles.par_iter()
            .map(|p| {
                let folded = geometry.fold_position(&p.position);
                let mut index = [0usize; 3];
                for axis in 0..3 {
                    let i = folded[axis] / cell_size[axis];
                    index[axis] = if i.is_finite() { (i as usize).min(n_cells[axis] - 1) } else { 0 };
                }
                (index[0] * n_cells[1] + index[1]) * n_cells[2] + index[2]
            })
            .collect();
        let mut cells = vec![vec![]; total];
        for (particle, cell) in cell_of_particle.into_iter().enumerate() {
            cells[cell].push(particle);
        }

        let neighbors = (0..total)
            .map(|cell| {
                let x = cell / (n_cells[1] * n_cells[2]);
                let y = cell / n_cells[2] % n_cells[1];
                let z = cell % n_cells[2];
                let mut neighbors: Vec<usize> = iproduct!(-1i64..=1, -1i64..=1, -1i64..=1)
                    .map(|(dx, dy, dz)| {
                        let shift = |i: usize, d: i64, n: usize| (i as i64 + d).rem_euclid(n as i64) as usize;
                        (shift(x, dx, n_cells[0]) * n_cells[1] + shift(y, dy, n_cells[1])) * n_cells[2]
                            + shift(z, dz, n_cells[2])
                    })
                    .collect();
                neighbors.sort_unstable();
                neighbors.dedup();
                neighbors
            })
            .collect();

        CellGrid {
            n_cells,
            cell_size,
            cells,
            neighbors,
        }
    }

    pub(crate) fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Rank owning `cell`, contiguous blocks of cells per rank.
    pub(crate) fn owner(&self, cell: usize, n_ranks: usize) -> usize {
        cell * n_ranks / self.n_cells()
    }

    pub(crate) fn owned_cells(&self, comm: &dyn Communicator) -> Vec<usize> {
        (0..self.n_cells())
            .filter(|cell| self.owner(*cell, comm.size()) == comm.rank())
            .collect()
    }

    pub(crate) fn particles(&self, cell: usize) -> &[usize] {
        &self.cells[cell]
    }

    /// Every particle pair `(i, j)`, `i < j`, once, with `i` in one of
    /// `cells` and `j` in a neighbor cell.
    pub(crate) fn pairs<'a>(&'a self, cells: &'a [usize]) -> impl Iterator<Item = (usize, usize)> + 'a {
        cells.iter().flat_map(move |&cell| {
            self.cells[cell].iter().flat_map(move |&i| {
                self.neighbors[cell].iter().flat_map(move |&neighbor| {
                    self.cells[neighbor].iter().filter(move |j| **j > i).map(move |&j| (i, j))
                })
            })
        })
    }
}

impl std::fmt::Display for CellGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{} cells of {:.3}x{:.3}x{:.3}", self.n_cells[0], self.n_cells[1], self.n_cells[2],
               self.cell_size.x, self.cell_size.y, self.cell_size.z)
    }
}
