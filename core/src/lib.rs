mod geometry;
mod interactions;
mod particle;
mod periodic_fold;
mod save_data;
mod system;
extern crate nalgebra as na;
extern crate serde;

pub use geometry::BoxGeometry;
pub use interactions::*;
pub use particle::{Bond, Particle, State};
pub use periodic_fold::{fold, fold_with_images};
pub use save_data::{load_system_from_file, save_system_to_file, SaveLoadError};
pub use system::{IntegratorKind, SimulationParameters, System};
