use std::f64::consts::PI;
use itertools::iproduct;
use mdpress_core::System;
use crate::comm::Communicator;

/// Long range part of a split electrostatic method.
pub trait KSpaceSolver: Send {
    /// Scalar k-space virial, the full value on the root rank and zero on
    /// all others. Collective.
    fn kspace_virial(&mut self, system: &System, comm: &dyn Communicator) -> f64;
}

/// Plain Ewald summation of the reciprocal space part.
///
/// Sums over all wave vectors `2 pi (nx/Lx, ny/Ly, nz/Lz)` with
/// `nx^2 + ny^2 + nz^2 <= kmax^2`. The self energy is included. `alpha` has to
/// match the real space splitting parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct EwaldKSpace {
    pub alpha: f64,
    pub kmax: i64,
}

impl EwaldKSpace {
    pub fn new(alpha: f64, kmax: i64) -> Self {
        Self { alpha, kmax }
    }

    /// Reciprocal space energy plus self energy.
    pub fn kspace_energy(&self, system: &System) -> f64 {
        let particles = &system.state.particles;
        let length = system.state.geometry.length;
        let volume = system.state.geometry.volume();
        let prefactor = system.interactions.electrostatics.prefactor;
        if particles.iter().all(|p| p.charge == 0.0) || !volume.is_finite() {
            return 0.0;
        }
        let kmax = self.kmax;
        let mut energy = 0.0;
        for (nx, ny, nz) in iproduct!(-kmax..=kmax, -kmax..=kmax, -kmax..=kmax) {
            let n2 = nx * nx + ny * ny + nz * nz;
            if n2 == 0 || n2 > kmax * kmax {
                continue;
            }
            let k = [2.0 * PI * nx as f64 / length.x, 2.0 * PI * ny as f64 / length.y, 2.0 * PI * nz as f64 / length.z];
            let k2 = k[0] * k[0] + k[1] * k[1] + k[2] * k[2];
            let (mut s_re, mut s_im) = (0.0, 0.0);
            for p in particles.iter().filter(|p| p.charge != 0.0) {
                let phase = k[0] * p.position.x + k[1] * p.position.y + k[2] * p.position.z;
                s_re += p.charge * phase.cos();
                s_im += p.charge * phase.sin();
            }
            energy += 4.0 * PI / k2 * (-k2 / (4.0 * self.alpha * self.alpha)).exp() * (s_re * s_re + s_im * s_im);
        }
        let self_energy = self.alpha / PI.sqrt() * particles.iter().map(|p| p.charge * p.charge).sum::<f64>();
        prefactor * (energy / (2.0 * volume) - self_energy)
    }
}

impl KSpaceSolver for EwaldKSpace {
    /// The k-space energy stands in for the virial, by homogeneity of the
    /// Coulomb interaction.
    fn kspace_virial(&mut self, system: &System, comm: &dyn Communicator) -> f64 {
        if comm.is_root() {
            self.kspace_energy(system)
        } else {
            0.0
        }
    }
}
