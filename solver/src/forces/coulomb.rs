use mdpress_core::{CoulombMethod, Electrostatics};
use na::Vector3;

/// `exp(x^2) * erfc(x)` for `x >= 0`, rational approximation with an
/// absolute error below 1.5e-7 (Abramowitz and Stegun 7.1.26).
pub fn erfc_part(x: f64) -> f64 {
    const P: f64 = 0.3275911;
    const A: [f64; 5] = [0.254829592, -0.284496736, 1.421413741, -1.453152027, 1.061405429];
    let t = 1.0 / (1.0 + P * x);
    t * (A[0] + t * (A[1] + t * (A[2] + t * (A[3] + t * A[4]))))
}

pub fn erfc(x: f64) -> f64 {
    if x < 0.0 {
        2.0 - erfc(-x)
    } else {
        (-x * x).exp() * erfc_part(x)
    }
}

/// Screened Coulomb force on the first particle.
pub fn dh_coulomb_pair_force(prefactor: f64, kappa: f64, r_cut: f64, q1q2: f64,
                             d: &Vector3<f64>, dist: f64) -> Vector3<f64> {
    if dist >= r_cut || dist == 0.0 {
        return Vector3::zeros();
    }
    let fac = if kappa > 0.0 {
        let kappa_dist = kappa * dist;
        prefactor * q1q2 * (-kappa_dist).exp() * (1.0 + kappa_dist) / (dist * dist * dist)
    } else {
        prefactor * q1q2 / (dist * dist * dist)
    };
    d * fac
}

/// Real space part of the Ewald split Coulomb force.
pub fn p3m_real_space_pair_force(prefactor: f64, alpha: f64, r_cut: f64, q1q2: f64,
                                 d: &Vector3<f64>, dist: f64) -> Vector3<f64> {
    if dist >= r_cut || dist == 0.0 {
        return Vector3::zeros();
    }
    let adist = alpha * dist;
    let exp_adist = (-adist * adist).exp();
    let erfc_adist = exp_adist * erfc_part(adist);
    let fac = prefactor * q1q2
        * (erfc_adist / dist + 2.0 * alpha / std::f64::consts::PI.sqrt() * exp_adist)
        / (dist * dist);
    d * fac
}

/// Short range electrostatic force between two charges for the configured
/// method.
pub fn short_range_coulomb_force(electrostatics: &Electrostatics, q1q2: f64,
                                 d: &Vector3<f64>, dist: f64) -> Vector3<f64> {
    if !electrostatics.is_active() || q1q2 == 0.0 {
        return Vector3::zeros();
    }
    match electrostatics.method {
        CoulombMethod::None => Vector3::zeros(),
        CoulombMethod::DebyeHueckel { kappa, r_cut } =>
            dh_coulomb_pair_force(electrostatics.prefactor, kappa, r_cut, q1q2, d, dist),
        CoulombMethod::P3m { alpha, r_cut } =>
            p3m_real_space_pair_force(electrostatics.prefactor, alpha, r_cut, q1q2, d, dist),
    }
}
