use mdpress_core::{GayBerne, IaParameters, LennardJones, LjCos, Particle, Tabulated};
use na::Vector3;

/// Lennard-Jones force on the first particle, `d` is its minimum image
/// separation from the second one.
pub fn lj_pair_force(lj: &LennardJones, d: &Vector3<f64>, dist: f64) -> Vector3<f64> {
    if dist < lj.max_cut() && dist > lj.offset {
        let r_off = dist - lj.offset;
        let frac2 = (lj.sigma / r_off).powi(2);
        let frac6 = frac2 * frac2 * frac2;
        let fac = 48.0 * lj.eps * frac6 * (frac6 - 0.5) / (r_off * dist);
        d * fac
    } else {
        Vector3::zeros()
    }
}

pub fn ljcos_pair_force(lj_cos: &LjCos, d: &Vector3<f64>, dist: f64) -> Vector3<f64> {
    if dist >= lj_cos.max_cut() || dist <= lj_cos.offset {
        return Vector3::zeros();
    }
    let r_off = dist - lj_cos.offset;
    let fac = if r_off < lj_cos.rmin {
        let frac2 = (lj_cos.sigma / r_off).powi(2);
        let frac6 = frac2 * frac2 * frac2;
        48.0 * lj_cos.eps * frac6 * (frac6 - 0.5) / (r_off * dist)
    } else {
        lj_cos.alfa * lj_cos.eps * (lj_cos.alfa * r_off * r_off + lj_cos.beta).sin() * r_off / dist
    };
    d * fac
}

/// Linear interpolation of the tabulated radial force. Distances below the
/// table start use the first entry.
pub fn tabulated_pair_force(tabulated: &Tabulated, d: &Vector3<f64>, dist: f64) -> Vector3<f64> {
    let n = tabulated.forces.len();
    if dist > tabulated.max || n == 0 || dist == 0.0 {
        return Vector3::zeros();
    }
    let force = if n == 1 {
        tabulated.forces[0]
    } else {
        let r = dist.max(tabulated.min);
        let step = (tabulated.max - tabulated.min) / (n - 1) as f64;
        let x = (r - tabulated.min) / step;
        let index = (x.floor() as usize).min(n - 2);
        let frac = x - index as f64;
        tabulated.forces[index] * (1.0 - frac) + tabulated.forces[index + 1] * frac
    };
    d * (force / dist)
}

/// Gay-Berne force on the first particle with director `u1`.
///
/// The potential is `4 eps(u1, u2, r) (X^12 - X^6)` with
/// `X = sigma0 / (r - sigma(u1, u2, r) + sigma0)`; the force is its negative
/// gradient with respect to the separation, directors held fixed.
pub fn gb_pair_force(gb: &GayBerne, u1: &Vector3<f64>, u2: &Vector3<f64>,
                     d: &Vector3<f64>, dist: f64) -> Vector3<f64> {
    if dist >= gb.cut || dist == 0.0 {
        return Vector3::zeros();
    }
    let chi1 = gb.chi1();
    let chi2 = gb.chi2();
    let r_hat = d / dist;
    let a1 = r_hat.dot(u1);
    let a2 = r_hat.dot(u2);
    let c = u1.dot(u2);
    let plus = a1 + a2;
    let minus = a1 - a2;

    let shape = |chi: f64| {
        let p = 1.0 + chi * c;
        let m = 1.0 - chi * c;
        let s = plus * plus / p + minus * minus / m;
        let ds_da1 = 2.0 * plus / p + 2.0 * minus / m;
        let ds_da2 = 2.0 * plus / p - 2.0 * minus / m;
        (s, ds_da1, ds_da2)
    };
    let (s1, ds1_da1, ds1_da2) = shape(chi1);
    let (s2, ds2_da1, ds2_da2) = shape(chi2);

    let sigma = gb.sigma / (1.0 - 0.5 * chi1 * s1).sqrt();
    let dsigma = sigma.powi(3) / (gb.sigma * gb.sigma) * 0.25 * chi1;
    let e1 = 1.0 / (1.0 - chi1 * chi1 * c * c).sqrt();
    let e2 = 1.0 - 0.5 * chi2 * s2;
    let eps = gb.eps * e1.powf(gb.nu) * e2.powf(gb.mu);
    let deps = -eps * gb.mu / e2 * 0.5 * chi2;

    let denominator = dist - sigma + gb.sigma;
    if denominator <= 0.0 {
        log::warn!("Gay-Berne particles overlap at distance {dist}, force ignored");
        return Vector3::zeros();
    }
    let x = gb.sigma / denominator;
    let x6 = x.powi(6);
    let x12 = x6 * x6;
    let g = x12 - x6;
    // dg/dX * dX/dsigma, dX/dr is the negative of it
    let g_sigma = (12.0 * x12 - 6.0 * x6) / x * x * x / gb.sigma;

    let du_dr = -4.0 * eps * g_sigma;
    let du_da1 = 4.0 * deps * ds2_da1 * g + 4.0 * eps * g_sigma * dsigma * ds1_da1;
    let du_da2 = 4.0 * deps * ds2_da2 * g + 4.0 * eps * g_sigma * dsigma * ds1_da2;

    -(r_hat * du_dr + (u1 - r_hat * a1) * (du_da1 / dist) + (u2 - r_hat * a2) * (du_da2 / dist))
}

/// Sum of all non-bonded forces of the type pair on `p1`.
pub fn non_bonded_pair_force(ia: &IaParameters, p1: &Particle, p2: &Particle,
                             d: &Vector3<f64>, dist: f64) -> Vector3<f64> {
    let mut force = Vector3::zeros();
    if let Some(lj) = &ia.lj {
        force += lj_pair_force(lj, d, dist);
    }
    if let Some(lj_cos) = &ia.lj_cos {
        force += ljcos_pair_force(lj_cos, d, dist);
    }
    if let Some(tabulated) = &ia.tabulated {
        force += tabulated_pair_force(tabulated, d, dist);
    }
    if let Some(gay_berne) = &ia.gay_berne {
        force += gb_pair_force(gay_berne, &p1.director, &p2.director, d, dist);
    }
    force
}
