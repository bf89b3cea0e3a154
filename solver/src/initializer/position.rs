use na::Vector3;
use mdpress_core::{BoxGeometry, Particle, State};
use crate::error::InitError;

/// State with `number_particles` particles at the origin, identities in
/// storage order.
pub fn initialize_particles(number_particles: usize, geometry: BoxGeometry) -> State {
    let particles = (0..number_particles)
        .map(|identity| Particle { identity, ..Default::default() })
        .collect();
    State::new(particles, geometry)
}

/// Initialize particles position on uniform grid of size [grid_size] in [start_position]
/// with cell size [unit_cell_size] starting from [first_particle] in [state].
pub fn initialize_particles_position(state: &mut State,
                                     first_particle: usize,
                                     type_id: usize,
                                     start_position: (f64, f64, f64),
                                     grid_size: (usize, usize, usize),
                                     unit_cell_size: f64) -> Result<(), InitError> {
    let needed = first_particle + grid_size.0 * grid_size.1 * grid_size.2;
    if needed > state.particles.len() {
        return Err(InitError::TooBig { needed, available: state.particles.len() });
    }
    for x in 0..grid_size.0 {
        for y in 0..grid_size.1 {
            for z in 0..grid_size.2 {
                let particle = &mut state.particles[first_particle + x * grid_size.1 * grid_size.2 + y * grid_size.2 + z];
                particle.position = Vector3::new(start_position.0 + x as f64 * unit_cell_size,
                                                 start_position.1 + y as f64 * unit_cell_size,
                                                 start_position.2 + z as f64 * unit_cell_size);
                particle.type_id = type_id;
            }
        }
    }
    state.invalidate();
    Ok(())
}
