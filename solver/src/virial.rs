//! Virial kernels shared by the decomposition backends and the tensor pass.
//!
//! Every kernel adds to chunks of an [ObservableStat]; a chunk of one value
//! receives the dot product, a chunk of nine values the outer product.

use mdpress_core::{Bond, Particle, System};
use na::Vector3;
use crate::error::PressureError;
use crate::forces::{bond_force, non_bonded_pair_force, short_range_coulomb_force};
use crate::observable::{ObservableStat, TENSOR};

/// Adds `force . d` to a scalar chunk or `force (x) d` to a tensor chunk.
pub fn add_virial(slot: &mut [f64], force: &Vector3<f64>, d: &Vector3<f64>) {
    if slot.len() == TENSOR {
        for k in 0..3 {
            for l in 0..3 {
                slot[k * 3 + l] += force[k] * d[l];
            }
        }
    } else {
        slot[0] += force.dot(d);
    }
}

/// Raw kinetic term `m v v` of one particle, plus `omega omega` with
/// rotation. Velocities are per time step, the caller rescales.
pub fn add_kinetic_virial(slot: &mut [f64], p: &Particle, rotation: bool) {
    add_virial(slot, &(p.velocity * p.mass), &p.velocity);
    if rotation {
        add_virial(slot, &p.omega, &p.omega);
    }
}

/// Bonded virials of all bonds owned by `p1` for which `qualifies` holds.
pub fn add_bonded_virials(system: &System, p1: &Particle, virials: &mut ObservableStat,
                          qualifies: impl Fn(&Bond) -> bool) -> Result<(), PressureError> {
    for bond in p1.bonds.iter().filter(|bond| qualifies(bond)) {
        let force = bond_force(system, p1, bond)?;
        force.deposit(virials.bonded_mut(bond.type_num)?);
    }
    Ok(())
}

/// Non-bonded and short range electrostatic virial of the pair.
pub fn add_pair_virials(system: &System, p1: &Particle, p2: &Particle,
                        virials: &mut ObservableStat) -> Result<(), PressureError> {
    let interactions = &system.interactions;
    let d = system.state.geometry.get_mi_vector(&p1.position, &p2.position);
    let dist = d.norm();

    if let Some(ia) = interactions.get_ia_param(p1.type_id, p2.type_id) {
        if ia.interacts() {
            let force = non_bonded_pair_force(ia, p1, p2, &d, dist);
            add_virial(virials.nonbonded_mut(p1.type_id, p2.type_id)?, &force, &d);
        }
    }

    let q1q2 = p1.charge * p2.charge;
    if virials.n_coulomb() > 0 && q1q2 != 0.0 {
        let force = short_range_coulomb_force(&interactions.electrostatics, q1q2, &d, dist);
        add_virial(virials.coulomb_mut(0)?, &force, &d);
    }
    Ok(())
}

/// Kinetic and bonded contributions of a particle a backend owns.
pub fn add_particle_virials(system: &System, p1: &Particle,
                            virials: &mut ObservableStat) -> Result<(), PressureError> {
    add_kinetic_virial(virials.ideal_mut(), p1, system.parameters.rotation);
    add_bonded_virials(system, p1, virials, |_| true)
}
