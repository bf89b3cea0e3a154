use na::Vector3;
use serde::{Deserialize, Serialize};
use crate::BoxGeometry;

/// One bonded interaction stored on the particle that owns it.
///
/// `type_num` indexes the bonded interaction table, `partners` are particle
/// identities. Pair bonds have one partner, angle bonds two (left, right) with
/// the owning particle in the middle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub type_num: usize,
    pub partners: Vec<usize>,
}

impl Bond {
    pub fn pair(type_num: usize, partner: usize) -> Self {
        Self { type_num, partners: vec![partner] }
    }

    pub fn angle(type_num: usize, left: usize, right: usize) -> Self {
        Self { type_num, partners: vec![left, right] }
    }
}

fn zero_vector() -> Vector3<f64> {
    Vector3::zeros()
}

fn default_mass() -> f64 {
    1.0
}

fn default_director() -> Vector3<f64> {
    Vector3::z()
}

/// Structure that keeps all data for particle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Unique identity of the particle, referenced by bonds
    pub identity: usize,
    /// Particle type, indexes the non-bonded interaction table
    #[serde(default)]
    pub type_id: usize,
    /// position of particle in 3d space, not necessarily folded
    pub position: Vector3<f64>,
    /// velocity of particle, in length per time step
    #[serde(default = "zero_vector")]
    pub velocity: Vector3<f64>,
    /// Angular velocity, only used with rotational degrees of freedom
    #[serde(default = "zero_vector")]
    pub omega: Vector3<f64>,
    /// Unit orientation vector for anisotropic potentials
    #[serde(default = "default_director")]
    pub director: Vector3<f64>,
    /// The sum of the forces acting on the particle
    #[serde(default = "zero_vector")]
    pub force: Vector3<f64>,
    /// Mass of particle
    #[serde(default = "default_mass")]
    pub mass: f64,
    /// Charge of particle
    #[serde(default)]
    pub charge: f64,
    /// Bonds owned by this particle
    #[serde(default)]
    pub bonds: Vec<Bond>,
}

impl Particle {
    /// Create new particle of given type in given position with given velocity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nalgebra::Vector3;
    /// # use mdpress_core::Particle;
    /// let particle = Particle::new(3, 1, Vector3::new(0.5, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    /// assert_eq!(particle.identity, 3);
    /// assert_eq!(particle.type_id, 1);
    /// assert_eq!(particle.mass, 1.0);
    /// assert!(particle.bonds.is_empty());
    /// ```
    pub fn new(identity: usize, type_id: usize, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Particle {
            identity,
            type_id,
            position,
            velocity,
            ..Default::default()
        }
    }

    pub fn with_bond(mut self, bond: Bond) -> Self {
        self.bonds.push(bond);
        self
    }
}

impl Default for Particle {
    /// Particle at the origin at rest, unit mass, no charge, pointing along z.
    fn default() -> Self {
        Particle {
            identity: 0,
            type_id: 0,
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            omega: Vector3::zeros(),
            director: default_director(),
            force: Vector3::zeros(),
            mass: default_mass(),
            charge: 0.0,
            bonds: vec![],
        }
    }
}

/// Structure that keeps current state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Particles that exists right now
    pub particles: Vec<Particle>,
    /// Periodic box
    pub geometry: BoxGeometry,
    /// Set when particles moved far enough that rank ownership is stale
    #[serde(default = "default_true")]
    pub resort_particles: bool,
    /// Set when pair lists built from old positions can no longer be trusted
    #[serde(default = "default_true")]
    pub rebuild_verlet_list: bool,
}

fn default_true() -> bool {
    true
}

impl State {
    pub fn new(particles: Vec<Particle>, geometry: BoxGeometry) -> Self {
        Self {
            particles,
            geometry,
            resort_particles: true,
            rebuild_verlet_list: true,
        }
    }

    /// Index of the particle with `identity` in [State::particles].
    pub fn index_of(&self, identity: usize) -> Option<usize> {
        if let Some(particle) = self.particles.get(identity) {
            if particle.identity == identity {
                return Some(identity);
            }
        }
        self.particles.iter().position(|p| p.identity == identity)
    }

    pub fn particle(&self, identity: usize) -> Option<&Particle> {
        self.index_of(identity).map(|i| &self.particles[i])
    }

    /// Largest particle type plus one.
    pub fn n_particle_types(&self) -> usize {
        self.particles.iter().map(|p| p.type_id + 1).max().unwrap_or(0)
    }

    /// Marks ownership and pair lists as stale, call after moving particles.
    pub fn invalidate(&mut self) {
        self.resort_particles = true;
        self.rebuild_verlet_list = true;
    }
}
