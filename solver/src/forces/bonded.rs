use mdpress_core::{Bond, BondedInteraction, Particle, System};
use na::Vector3;
use crate::error::PressureError;
use crate::forces::non_bonded::lj_pair_force;
use crate::virial::add_virial;

/// Smallest sine of a bond angle used to avoid the division by zero of a
/// straight angle.
const TINY_SIN_VALUE: f64 = 1e-10;

/// Force of one bond together with the separations it acts along.
#[derive(Clone, Debug, PartialEq)]
pub enum BondForce {
    /// `force` acts on the bond owner, the partner gets `-force`; `d` is
    /// owner minus partner.
    Pair {
        partner: usize,
        force: Vector3<f64>,
        d: Vector3<f64>,
    },
    /// Forces on the two outer particles of an angle, the middle particle
    /// (the owner) gets the negative sum.
    Angle {
        left: usize,
        right: usize,
        force_left: Vector3<f64>,
        force_right: Vector3<f64>,
        d_left: Vector3<f64>,
        d_right: Vector3<f64>,
    },
}

impl BondForce {
    /// Adds the virial of the bond to `slot`.
    pub fn deposit(&self, slot: &mut [f64]) {
        match self {
            BondForce::Pair { force, d, .. } => add_virial(slot, force, d),
            BondForce::Angle { force_left, force_right, d_left, d_right, .. } => {
                add_virial(slot, &-force_left, d_left);
                add_virial(slot, &-force_right, d_right);
            }
        }
    }
}

/// Recomputes the force of `bond` owned by `p1`.
pub fn bond_force(system: &System, p1: &Particle, bond: &Bond) -> Result<BondForce, PressureError> {
    let interaction = system.interactions.bonded.get(bond.type_num)
        .ok_or(PressureError::UnknownBondType { type_num: bond.type_num, identity: p1.identity })?;
    let expected = interaction.n_partners();
    if bond.partners.len() != expected {
        return Err(PressureError::BondArity {
            type_num: bond.type_num,
            identity: p1.identity,
            expected,
            found: bond.partners.len(),
        });
    }
    let partner = |identity: usize| {
        system.state.particle(identity).ok_or(PressureError::MissingParticle { identity })
    };
    let geometry = &system.state.geometry;

    if let BondedInteraction::Angle { bend, phi0 } = interaction {
        let left = partner(bond.partners[0])?;
        let right = partner(bond.partners[1])?;
        let d_left = geometry.get_mi_vector(&p1.position, &left.position);
        let d_right = geometry.get_mi_vector(&p1.position, &right.position);
        let (force_left, force_right) = angle_force(*bend, *phi0, &d_left, &d_right);
        return Ok(BondForce::Angle {
            left: left.identity,
            right: right.identity,
            force_left,
            force_right,
            d_left,
            d_right,
        });
    }

    let p2 = partner(bond.partners[0])?;
    let d = geometry.get_mi_vector(&p1.position, &p2.position);
    let dist = d.norm();
    let broken = || PressureError::BondBroken {
        type_num: bond.type_num,
        identity: p1.identity,
        partner: p2.identity,
        distance: dist,
    };
    let subtracted_lj = || {
        system.interactions.get_ia_param(p1.type_id, p2.type_id)
            .and_then(|ia| ia.lj.as_ref())
            .map_or(Vector3::zeros(), |lj| lj_pair_force(lj, &d, dist))
    };
    let force = match interaction {
        BondedInteraction::Fene { k, drmax, r0 } =>
            fene_force(*k, *drmax, *r0, &d, dist).ok_or_else(broken)?,
        BondedInteraction::Harmonic { k, r, r_cut } => {
            if *r_cut > 0.0 && dist > *r_cut {
                return Err(broken());
            }
            harmonic_force(*k, *r, &d, dist)
        }
        BondedInteraction::SubtLjHarm { k, r } => harmonic_force(*k, *r, &d, dist) - subtracted_lj(),
        BondedInteraction::SubtLjFene { k, drmax } =>
            fene_force(*k, *drmax, 0.0, &d, dist).ok_or_else(broken)? - subtracted_lj(),
        BondedInteraction::SubtLj => -subtracted_lj(),
        BondedInteraction::Angle { .. } => unreachable!("angle bonds are handled above"),
    };
    Ok(BondForce::Pair { partner: p2.identity, force, d })
}

fn harmonic_force(k: f64, r: f64, d: &Vector3<f64>, dist: f64) -> Vector3<f64> {
    if dist > 0.0 {
        d * (-k * (dist - r) / dist)
    } else {
        Vector3::zeros()
    }
}

/// `None` if the bond is stretched beyond `drmax`.
fn fene_force(k: f64, drmax: f64, r0: f64, d: &Vector3<f64>, dist: f64) -> Option<Vector3<f64>> {
    let dr = dist - r0;
    if dr.abs() >= drmax {
        return None;
    }
    if dist == 0.0 {
        return Some(Vector3::zeros());
    }
    let fac = -k * dr / ((1.0 - (dr / drmax).powi(2)) * dist);
    Some(d * fac)
}

/// Forces on the outer particles of a cosine angle potential. `d_left` and
/// `d_right` point from the outer particles to the middle one.
fn angle_force(bend: f64, phi0: f64, d_left: &Vector3<f64>, d_right: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let len_left = d_left.norm();
    let len_right = d_right.norm();
    if len_left == 0.0 || len_right == 0.0 {
        return (Vector3::zeros(), Vector3::zeros());
    }
    let u_left = -d_left / len_left;
    let u_right = -d_right / len_right;
    let cos_phi = u_left.dot(&u_right).clamp(-1.0, 1.0);
    let phi = cos_phi.acos();
    let sin_phi = (1.0 - cos_phi * cos_phi).sqrt().max(TINY_SIN_VALUE);
    let fac = bend * (phi - phi0).sin() / sin_phi;
    let force_left = (u_right - u_left * cos_phi) * (fac / len_left);
    let force_right = (u_left - u_right * cos_phi) * (fac / len_right);
    (force_left, force_right)
}
