use std::f64::consts::PI;
use mdpress_core::State;
use na::Vector3;
use crate::error::PressureError;

/// Particles binned into concentric spherical shells.
#[derive(Clone, Debug, PartialEq)]
pub struct SphereBins {
    /// Volume of every shell
    pub volumes: Vec<f64>,
    /// Number of particles in every shell
    pub counts: Vec<usize>,
    /// Particle identities of all shells, shell after shell
    pub elements: Vec<usize>,
}

impl SphereBins {
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Identities of the particles in shell `bin`, `None` past the last
    /// shell.
    pub fn bin(&self, bin: usize) -> Option<&[usize]> {
        let count = *self.counts.get(bin)?;
        let start: usize = self.counts[..bin].iter().sum();
        self.elements.get(start..start + count)
    }
}

/// Sorts the particles into `r_bins` shells of equal thickness between
/// `r_min` and `r_max` around `center`, distances by minimum image.
/// Particles outside of the shells are left out.
pub fn calc_bins_sphere(state: &State, r_min: f64, r_max: f64, r_bins: usize,
                        center: &Vector3<f64>) -> Result<SphereBins, PressureError> {
    if r_bins == 0 {
        return Err(PressureError::InvalidBins("at least one bin is needed".to_string()));
    }
    if r_min < 0.0 || r_max <= r_min {
        return Err(PressureError::InvalidBins(format!("radii {r_min} to {r_max} do not form a shell")));
    }
    let d_bin = (r_max - r_min) / r_bins as f64;
    let bin_of: Vec<Option<usize>> = state.particles.iter()
        .map(|p| {
            let dist = state.geometry.get_mi_vector(center, &p.position).norm() - r_min;
            if dist < 0.0 || dist > r_max - r_min {
                return None;
            }
            Some((dist / d_bin).floor() as usize).filter(|bin| *bin < r_bins)
        })
        .collect();

    let mut bins = SphereBins {
        volumes: Vec::with_capacity(r_bins),
        counts: vec![0; r_bins],
        elements: vec![],
    };
    for bin in 0..r_bins {
        let inner = r_min + bin as f64 * d_bin;
        let outer = r_min + (bin + 1) as f64 * d_bin;
        bins.volumes.push(4.0 / 3.0 * PI * (outer.powi(3) - inner.powi(3)));
        for (p, _) in state.particles.iter().zip(&bin_of).filter(|(_, b)| **b == Some(bin)) {
            bins.elements.push(p.identity);
            bins.counts[bin] += 1;
        }
        log::debug!("Bin {} from {} to {}: volume {}, {} particles", bin, inner, outer,
            bins.volumes[bin], bins.counts[bin]);
    }
    Ok(bins)
}
