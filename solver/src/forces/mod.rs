mod bonded;
mod coulomb;
mod non_bonded;

pub use bonded::{bond_force, BondForce};
pub use coulomb::{dh_coulomb_pair_force, erfc, p3m_real_space_pair_force, short_range_coulomb_force};
pub use non_bonded::{gb_pair_force, lj_pair_force, ljcos_pair_force, non_bonded_pair_force, tabulated_pair_force};

use mdpress_core::System;
use na::Vector3;
use rayon::prelude::*;
use crate::error::PressureError;
use crate::initializer::NptIso;

/// Computes the forces on all particles of the system.
///
/// Every pair is visited once; with an integrating barostat every pair and
/// bond force is also fed into its virial.
pub fn calculate_forces(system: &mut System, mut npt: Option<&mut NptIso>) -> Result<(), PressureError> {
    system.state.particles.par_iter_mut().for_each(|p| p.force = Vector3::zeros());
    if let Some(npt) = npt.as_deref_mut() {
        npt.reset_virials();
    }

    let n = system.state.particles.len();
    let mut forces = vec![Vector3::zeros(); n];
    {
        let state = &system.state;
        let interactions = &system.interactions;
        for i in 0..n {
            let p1 = &state.particles[i];
            for j in (i + 1)..n {
                let p2 = &state.particles[j];
                let d = state.geometry.get_mi_vector(&p1.position, &p2.position);
                let dist = d.norm();
                let mut force = Vector3::zeros();
                if let Some(ia) = interactions.get_ia_param(p1.type_id, p2.type_id) {
                    if ia.interacts() {
                        force += non_bonded_pair_force(ia, p1, p2, &d, dist);
                    }
                }
                force += short_range_coulomb_force(&interactions.electrostatics, p1.charge * p2.charge, &d, dist);
                forces[i] += force;
                forces[j] -= force;
                if let Some(npt) = npt.as_deref_mut() {
                    npt.add_virial_contribution(&force, &d);
                }
            }

            for bond in &p1.bonds {
                match bond_force(system, p1, bond)? {
                    BondForce::Pair { partner, force, d } => {
                        forces[i] += force;
                        forces[index(system, partner)?] -= force;
                        if let Some(npt) = npt.as_deref_mut() {
                            npt.add_virial_contribution(&force, &d);
                        }
                    }
                    BondForce::Angle { left, right, force_left, force_right, d_left, d_right } => {
                        forces[index(system, left)?] += force_left;
                        forces[index(system, right)?] += force_right;
                        forces[i] -= force_left + force_right;
                        if let Some(npt) = npt.as_deref_mut() {
                            npt.add_virial_contribution(&-force_left, &d_left);
                            npt.add_virial_contribution(&-force_right, &d_right);
                        }
                    }
                }
            }
        }
    }

    system.state.particles.par_iter_mut()
        .zip(forces.par_iter())
        .for_each(|(p, force)| p.force = *force);
    Ok(())
}

fn index(system: &System, identity: usize) -> Result<usize, PressureError> {
    system.state.index_of(identity).ok_or(PressureError::MissingParticle { identity })
}
