use std::path::PathBuf;
use clap::{Parser, Subcommand};
use clap::ValueEnum;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// path to file with system data
    #[arg(short = 'f', long)]
    pub file: PathBuf,
    /// pretty print json files
    #[arg(long, default_value_t = false)]
    pub pretty_print: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum CellStructureChoose {
    /// cell grid with verlet lists
    Dd,
    /// all pairs
    Nsquare,
    /// slabs along z
    Layered,
}

#[derive(Subcommand)]
pub enum Commands {
    /// initialize system on uniform grid
    Init {
        /// number of particles along every axis
        #[arg(short = 's', long, num_args = 3, value_delimiter = ' ')]
        size: Vec<usize>,
        /// lattice cell
        #[arg(short = 'l', long)]
        lattice_cell: f64,
        /// mass of every particle
        #[arg(long, default_value_t = 1.0)]
        particle_mass: f64,
        /// temperature in reduced units
        #[arg(short = 'T', long, default_value_t = 0.0)]
        temperature: f64,
        /// time step of the simulation
        #[arg(long, default_value_t = 0.01)]
        time_step: f64,
        /// seed of the velocity generator
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// lennard-jones epsilon and sigma between all particles
        #[arg(long, num_args = 2, value_delimiter = ' ')]
        lj: Option<Vec<f64>>,
    },
    /// scalar pressure, all categories or a single one
    Pressure {
        /// decomposition used to evaluate the virials
        #[arg(short = 'c', long, value_enum, default_value_t = CellStructureChoose::Dd)]
        cell_structure: CellStructureChoose,
        /// skin of the dd cells
        #[arg(long, default_value_t = 0.4)]
        skin: f64,
        /// ideal | total | coulomb | bonded <type> | nonbonded <type1> <type2>
        category: Vec<String>,
        /// cutoff of the ewald k-space sum for p3m electrostatics
        #[arg(long)]
        kmax: Option<i64>,
        /// file for a table of all categories
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// stress tensor of a particle subset
    StressTensor {
        /// volume the tensor is normalized with
        #[arg(short = 'v', long)]
        volume: f64,
        /// identities of the subset
        #[arg(short = 'p', long, num_args = 1.., value_delimiter = ' ')]
        particles: Vec<usize>,
        /// pairs of the subset with all other particles instead of pairs inside it
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// particles binned in spherical shells
    SphereBins {
        #[arg(long, default_value_t = 0.0)]
        r_min: f64,
        /// half of the shortest box length if not set
        #[arg(long)]
        r_max: Option<f64>,
        /// number of particles over 20 if not set
        #[arg(long)]
        r_bins: Option<usize>,
        /// center of the shells
        #[arg(long, num_args = 3, value_delimiter = ' ')]
        center: Vec<f64>,
    },
}
