use mdpress_core::State;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use crate::error::InitError;

/// Draws Maxwell-Boltzmann velocities for `temperature` in reduced units
/// (`k_B = 1`). Velocities are stored per time step, so they are scaled by
/// `time_step`. The same seed gives the same velocities.
pub fn initialize_velocities(state: &mut State, temperature: f64, time_step: f64, seed: u64) -> Result<(), InitError> {
    if temperature < 0.0 {
        return Err(InitError::NegativeTemperature(temperature));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    for particle in &mut state.particles {
        if particle.mass <= 0.0 {
            return Err(InitError::InvalidMass { identity: particle.identity, mass: particle.mass });
        }
        let sigma = f64::sqrt(temperature / particle.mass) * time_step;
        let normal_distribution = Normal::new(0.0f64, sigma)
            .map_err(|_| InitError::NegativeTemperature(temperature))?;
        particle.velocity.x = normal_distribution.sample(&mut rng);
        particle.velocity.y = normal_distribution.sample(&mut rng);
        particle.velocity.z = normal_distribution.sample(&mut rng);
    }
    Ok(())
}
