use thiserror::Error;

/// Misuse of an [ObservableStat](crate::observable::ObservableStat).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObservableError {
    #[error("bond type {index} does not exist, there are {count} bond types")]
    BondedOutOfRange { index: usize, count: usize },
    #[error("particle type pair ({i}, {j}) does not exist, there are {n_types} particle types")]
    NonBondedOutOfRange { i: usize, j: usize, n_types: usize },
    #[error("electrostatic contribution {index} does not exist, there are {count}")]
    CoulombOutOfRange { index: usize, count: usize },
    #[error("chunk size must be 1 or 9, got {0}")]
    InvalidChunkSize(usize),
    #[error("{0} is not a number of particle type pairs")]
    NotTriangular(usize),
    #[error("observable has not been computed")]
    NotInitialized,
}

/// Failures of the pressure computations. Everything but
/// [PressureError::Observable] means the particle data or the interaction
/// setup is inconsistent and no result is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PressureError {
    #[error(transparent)]
    Observable(#[from] ObservableError),
    #[error("particle {identity} does not exist")]
    MissingParticle { identity: usize },
    #[error("bond type {type_num} of particle {identity} unknown")]
    UnknownBondType { type_num: usize, identity: usize },
    #[error("bond type {type_num} of particle {identity} needs {expected} partners, got {found}")]
    BondArity {
        type_num: usize,
        identity: usize,
        expected: usize,
        found: usize,
    },
    #[error("bond type {type_num} between particle {identity} and {partner} broken at distance {distance}")]
    BondBroken {
        type_num: usize,
        identity: usize,
        partner: usize,
        distance: f64,
    },
    #[error("cannot calculate the pressure tensor for coulomb method {0}")]
    UnsupportedCoulombMethod(&'static str),
    #[error("long range electrostatics are active, but no k-space solver is set")]
    MissingKSpaceSolver,
    #[error("volume must be positive and finite, got {0}")]
    InvalidVolume(f64),
    #[error("box length along axis {axis} must be positive, got {length}")]
    InvalidBoxLength { axis: usize, length: f64 },
    #[error("time step must be positive, got {0}")]
    InvalidTimeStep(f64),
    #[error("invalid binning: {0}")]
    InvalidBins(String),
}

/// Configuration and integration errors of the NpT barostat.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarostatError {
    #[error("the external pressure must be positive, got {0}")]
    NegativePressure(f64),
    #[error("the piston mass must be positive, got {0}")]
    PistonMass(f64),
    #[error("at least one of the x y z components must be enabled as fluctuating dimension for box length motion")]
    NoDimension,
    #[error("if electrostatics is being used you must use the cubic box npt")]
    AnisotropicElectrostatics,
    #[error("if magnetostatics is being used you must use the cubic box npt")]
    AnisotropicMagnetostatics,
    #[error("the configured integrator is not the NpT integrator")]
    IntegratorNotNpt,
    #[error("npt integration requested but the barostat dimension is not set")]
    DimensionNotSet,
    #[error("npt on, but piston mass not set")]
    PistonNotSet,
    #[error("time step must be positive, got {0}")]
    InvalidTimeStep(f64),
    #[error("piston {piston}, time step {time_step} and p_diff {p_diff} made the volume non-positive ({volume}), decrease the time step")]
    NegativeVolume {
        piston: f64,
        time_step: f64,
        p_diff: f64,
        volume: f64,
    },
}

/// Errors of the system initializers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitError {
    #[error("{needed} particles do not fit, only {available} exist")]
    TooBig { needed: usize, available: usize },
    #[error("temperature must not be negative, got {0}")]
    NegativeTemperature(f64),
    #[error("particle {identity} has non-positive mass {mass}")]
    InvalidMass { identity: usize, mass: f64 },
}
