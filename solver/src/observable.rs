use mdpress_core::type_pair_index;
use crate::error::ObservableError;

/// Chunk size of scalar observables
pub const SCALAR: usize = 1;
/// Chunk size of 3x3 tensor observables, stored row major
pub const TENSOR: usize = 9;

/// Category decomposed sums of a scalar or tensor observable.
///
/// The buffer holds `chunk_size` values for every category, in this order:
/// the ideal (kinetic) contribution, one chunk per bond type, one chunk per
/// unordered particle type pair and one chunk per electrostatic sub-method
/// (real space first, then k-space).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObservableStat {
    data: Vec<f64>,
    chunk_size: usize,
    n_bonded: usize,
    n_particle_types: usize,
    n_non_bonded: usize,
    n_coulomb: usize,
    init_status: bool,
}

impl ObservableStat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize for the given categories and zero everything.
    ///
    /// `n_pair_types` is the number of unordered particle type pairs and has to
    /// be `n * (n + 1) / 2` for some number of particle types `n`.
    pub fn reset(&mut self, n_bonded: usize, n_pair_types: usize, n_coulomb: usize,
                 chunk_size: usize) -> Result<(), ObservableError> {
        if chunk_size != SCALAR && chunk_size != TENSOR {
            return Err(ObservableError::InvalidChunkSize(chunk_size));
        }
        let n_particle_types = particle_types_from_pairs(n_pair_types)
            .ok_or(ObservableError::NotTriangular(n_pair_types))?;
        let len = chunk_size * (1 + n_bonded + n_pair_types + n_coulomb);
        self.data.clear();
        self.data.resize(len, 0.0);
        if self.data.capacity() > 2 * len {
            self.data.shrink_to(len);
        }
        self.chunk_size = chunk_size;
        self.n_bonded = n_bonded;
        self.n_particle_types = n_particle_types;
        self.n_non_bonded = n_pair_types;
        self.n_coulomb = n_coulomb;
        self.init_status = false;
        log::debug!("Observable reset to {} values ({} bonded, {} non-bonded, {} coulomb, chunk {})",
            len, n_bonded, n_pair_types, n_coulomb, chunk_size);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn n_bonded(&self) -> usize {
        self.n_bonded
    }

    pub fn n_particle_types(&self) -> usize {
        self.n_particle_types
    }

    pub fn n_coulomb(&self) -> usize {
        self.n_coulomb
    }

    pub fn is_initialized(&self) -> bool {
        self.init_status
    }

    pub(crate) fn set_initialized(&mut self, init_status: bool) {
        self.init_status = init_status;
    }

    /// Raw buffer, all categories
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    fn chunk(&self, slot: usize) -> &[f64] {
        &self.data[slot * self.chunk_size..(slot + 1) * self.chunk_size]
    }

    fn chunk_mut(&mut self, slot: usize) -> &mut [f64] {
        let chunk_size = self.chunk_size;
        &mut self.data[slot * chunk_size..(slot + 1) * chunk_size]
    }

    pub fn ideal(&self) -> &[f64] {
        self.chunk(0)
    }

    pub fn ideal_mut(&mut self) -> &mut [f64] {
        self.chunk_mut(0)
    }

    fn bonded_slot(&self, type_num: usize) -> Result<usize, ObservableError> {
        if type_num >= self.n_bonded {
            return Err(ObservableError::BondedOutOfRange { index: type_num, count: self.n_bonded });
        }
        Ok(1 + type_num)
    }

    fn non_bonded_slot(&self, i: usize, j: usize) -> Result<usize, ObservableError> {
        type_pair_index(i, j, self.n_particle_types)
            .map(|index| 1 + self.n_bonded + index)
            .ok_or(ObservableError::NonBondedOutOfRange { i, j, n_types: self.n_particle_types })
    }

    fn coulomb_slot(&self, index: usize) -> Result<usize, ObservableError> {
        if index >= self.n_coulomb {
            return Err(ObservableError::CoulombOutOfRange { index, count: self.n_coulomb });
        }
        Ok(1 + self.n_bonded + self.n_non_bonded + index)
    }

    pub fn bonded(&self, type_num: usize) -> Result<&[f64], ObservableError> {
        let slot = self.bonded_slot(type_num)?;
        Ok(self.chunk(slot))
    }

    pub fn bonded_mut(&mut self, type_num: usize) -> Result<&mut [f64], ObservableError> {
        let slot = self.bonded_slot(type_num)?;
        Ok(self.chunk_mut(slot))
    }

    /// Contribution of the unordered particle type pair `(i, j)`.
    pub fn nonbonded(&self, i: usize, j: usize) -> Result<&[f64], ObservableError> {
        let slot = self.non_bonded_slot(i, j)?;
        Ok(self.chunk(slot))
    }

    pub fn nonbonded_mut(&mut self, i: usize, j: usize) -> Result<&mut [f64], ObservableError> {
        let slot = self.non_bonded_slot(i, j)?;
        Ok(self.chunk_mut(slot))
    }

    /// Electrostatic contribution of one sub-method, 0 is real space and 1 is
    /// k-space.
    pub fn coulomb(&self, index: usize) -> Result<&[f64], ObservableError> {
        let slot = self.coulomb_slot(index)?;
        Ok(self.chunk(slot))
    }

    pub fn coulomb_mut(&mut self, index: usize) -> Result<&mut [f64], ObservableError> {
        let slot = self.coulomb_slot(index)?;
        Ok(self.chunk_mut(slot))
    }

    /// The whole electrostatic block, `n_coulomb * chunk_size` values.
    pub fn coulomb_all(&self) -> &[f64] {
        let start = (1 + self.n_bonded + self.n_non_bonded) * self.chunk_size;
        &self.data[start..]
    }

    /// Sum over all categories, one value per chunk component.
    pub fn total(&self) -> Result<Vec<f64>, ObservableError> {
        if !self.init_status {
            return Err(ObservableError::NotInitialized);
        }
        Ok(sum_chunks(&self.data, self.chunk_size))
    }

    /// Sum over the electrostatic sub-methods.
    pub fn coulomb_total(&self) -> Result<Vec<f64>, ObservableError> {
        if !self.init_status {
            return Err(ObservableError::NotInitialized);
        }
        Ok(sum_chunks(self.coulomb_all(), self.chunk_size))
    }
}

fn sum_chunks(data: &[f64], chunk_size: usize) -> Vec<f64> {
    let mut total = vec![0.0; chunk_size];
    for chunk in data.chunks(chunk_size) {
        for (t, v) in total.iter_mut().zip(chunk) {
            *t += v;
        }
    }
    total
}

/// Inverse of `n * (n + 1) / 2`.
fn particle_types_from_pairs(n_pair_types: usize) -> Option<usize> {
    let mut n = ((2.0 * n_pair_types as f64).sqrt()) as usize;
    while n * (n + 1) / 2 > n_pair_types {
        n -= 1;
    }
    while (n + 1) * (n + 2) / 2 <= n_pair_types {
        n += 1;
    }
    if n * (n + 1) / 2 == n_pair_types {
        Some(n)
    } else {
        None
    }
}
