use std::path::Path;
use nalgebra::Vector3;
use thiserror::Error;
use mdpress_core::{load_system_from_file, save_system_to_file, BoxGeometry, CoulombMethod, IaParameters,
                   InteractionTable, LennardJones, SaveLoadError, SimulationParameters, System};
use mdpress_solver::{calc_bins_sphere, CellStructure, EwaldKSpace, InitError, LocalCommunicator, ObservableError,
                     ObservableStat, PairScope, PressureEngine, PressureError, TENSOR};
use mdpress_solver::initializer::{initialize_particles, initialize_particles_position, initialize_velocities};
use crate::args::CellStructureChoose;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    SaveLoad(#[from] SaveLoadError),
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    Pressure(#[from] PressureError),
    #[error(transparent)]
    Observable(#[from] ObservableError),
    #[error("can't write table: {0}")]
    Csv(#[from] csv::Error),
    #[error("wrong # or type of arguments for: {0}")]
    Usage(&'static str),
    #[error("unknown feature of pressure: {0}")]
    UnknownCategory(String),
    #[error("bond type {0} does not exist")]
    UnknownBondType(usize),
    #[error("particle type {0} does not exist")]
    UnknownParticleType(usize),
}

/// A single category of the scalar pressure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Category {
    Ideal,
    Total,
    Coulomb,
    Bonded(usize),
    NonBonded(usize, usize),
}

impl Category {
    /// Parses `ideal`, `total`, `coulomb`, a bond name with its type number
    /// or a non-bonded name with two particle types. No words means all
    /// categories.
    pub fn parse(words: &[String]) -> Result<Option<Self>, CliError> {
        let Some(first) = words.first() else {
            return Ok(None);
        };
        let number = |index: usize, usage: &'static str| words.get(index)
            .and_then(|word| word.parse::<usize>().ok())
            .ok_or(CliError::Usage(usage));
        let category = match first.as_str() {
            "ideal" => Category::Ideal,
            "total" => Category::Total,
            "coulomb" => Category::Coulomb,
            "bonded" | "fene" | "harmonic" | "subt_lj_harm" | "subt_lj_fene" | "subt_lj" | "angle" => {
                Category::Bonded(number(1, "pressure bonded <type_num>")?)
            }
            "nonbonded" | "lj" | "lj-cos" | "tabulated" | "gb" => {
                let usage = "pressure nonbonded <type1> <type2>";
                Category::NonBonded(number(1, usage)?, number(2, usage)?)
            }
            other => return Err(CliError::UnknownCategory(other.to_string())),
        };
        Ok(Some(category))
    }

    pub fn value(&self, stat: &ObservableStat, interactions: &InteractionTable) -> Result<f64, CliError> {
        let value = match *self {
            Category::Ideal => stat.ideal()[0],
            Category::Total => stat.total()?[0],
            Category::Coulomb => stat.coulomb_total()?[0],
            Category::Bonded(type_num) => {
                if type_num >= interactions.bonded.len() {
                    return Err(CliError::UnknownBondType(type_num));
                }
                stat.bonded(type_num)?[0]
            }
            Category::NonBonded(i, j) => {
                if let Some(unknown) = [i, j].into_iter().find(|t| *t >= interactions.n_particle_types) {
                    return Err(CliError::UnknownParticleType(unknown));
                }
                stat.nonbonded(i, j)?[0]
            }
        };
        Ok(value)
    }
}

pub fn cell_structure(choose: CellStructureChoose, skin: f64) -> CellStructure {
    match choose {
        CellStructureChoose::Dd => CellStructure::DomainDecomposition { skin },
        CellStructureChoose::Nsquare => CellStructure::NSquare,
        CellStructureChoose::Layered => CellStructure::Layered,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn initialize(file: &Path,
                  size: &[usize],
                  lattice_cell: f64,
                  particle_mass: f64,
                  temperature: f64,
                  time_step: f64,
                  seed: u64,
                  lj: Option<&[f64]>,
                  pretty_print: bool) -> Result<(), CliError> {
    let [nx, ny, nz] = size else {
        return Err(CliError::Usage("init --size <nx> <ny> <nz>"));
    };
    let particles_count = nx * ny * nz;
    let geometry = BoxGeometry::new(Vector3::new(lattice_cell * *nx as f64,
                                                 lattice_cell * *ny as f64,
                                                 lattice_cell * *nz as f64));
    let mut state = initialize_particles(particles_count, geometry);
    let half = 0.5 * lattice_cell;
    initialize_particles_position(&mut state, 0, 0, (half, half, half), (*nx, *ny, *nz), lattice_cell)?;
    state.particles.iter_mut().for_each(|p| p.mass = particle_mass);
    initialize_velocities(&mut state, temperature, time_step, seed)?;

    let mut interactions = InteractionTable::new(1);
    if let Some(lj) = lj {
        let [eps, sigma] = lj else {
            return Err(CliError::Usage("init --lj <eps> <sigma>"));
        };
        interactions.set_non_bonded(0, 0, IaParameters::lennard_jones(LennardJones::new(*eps, *sigma)));
    }
    let parameters = SimulationParameters { time_step, ..Default::default() };
    let system = System::new(state, interactions, parameters);
    save_system_to_file(&system, file, pretty_print)?;
    log::info!("Initialized {} particles in {}", particles_count, file.to_string_lossy());
    Ok(())
}

/// Scalar pressure of the system in `file`, all categories or the one
/// named by `category`. Writes all categories to `csv` if given. With P3M
/// electrostatics the k-space part is summed by Ewald up to `kmax`.
pub fn pressure(file: &Path,
                cell_structure: CellStructure,
                category: &[String],
                kmax: Option<i64>,
                csv: Option<&Path>) -> Result<String, CliError> {
    let category = Category::parse(category)?;
    let mut system = load_system_from_file(file)?;
    if system.state.particles.is_empty() {
        return Ok(String::from("(no particles)"));
    }
    let mut engine = PressureEngine::new(cell_structure);
    if let (CoulombMethod::P3m { alpha, .. }, Some(kmax)) = (&system.interactions.electrostatics.method, kmax) {
        engine.set_kspace_solver(Some(Box::new(EwaldKSpace::new(*alpha, kmax))));
    }
    let mut result = ObservableStat::new();
    engine.pressure_calc(&mut system, &LocalCommunicator, &mut result)?;
    log::debug!("Pressure computed with {} backend", engine.backend_name());

    if let Some(csv) = csv {
        write_pressure_table(csv, &result, &system.interactions)?;
    }
    match category {
        Some(category) => Ok(category.value(&result, &system.interactions)?.to_string()),
        None => print_detailed_pressure(&result, &system.interactions),
    }
}

/// Labels and values of all printed categories, in output order.
fn pressure_rows(stat: &ObservableStat, interactions: &InteractionTable) -> Result<Vec<(String, f64)>, CliError> {
    let mut rows = vec![
        (String::from("pressure"), stat.total()?[0]),
        (String::from("ideal"), stat.ideal()[0]),
    ];
    for (type_num, bond) in interactions.bonded.iter().enumerate() {
        rows.push((format!("{} {}", type_num, bond.name()), stat.bonded(type_num)?[0]));
    }
    for i in 0..interactions.n_particle_types {
        for j in (i..interactions.n_particle_types).filter(|j| interactions.check_if_particles_interact(i, *j)) {
            rows.push((format!("{} {} nonbonded", i, j), stat.nonbonded(i, j)?[0]));
        }
    }
    Ok(rows)
}

fn print_detailed_pressure(stat: &ObservableStat, interactions: &InteractionTable) -> Result<String, CliError> {
    let mut out = String::new();
    for (label, value) in pressure_rows(stat, interactions)? {
        out += &format!("{{ {} {} }} ", label, value);
    }
    if stat.n_coulomb() > 0 {
        out += &format!("{{ coulomb {}", stat.coulomb_total()?[0]);
        if stat.n_coulomb() > 1 {
            for part in stat.coulomb_all() {
                out += &format!(" {}", part);
            }
        }
        out += " }";
    }
    Ok(out.trim_end().to_string())
}

fn write_pressure_table(path: &Path, stat: &ObservableStat, interactions: &InteractionTable) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["category", "value"])?;
    for (label, value) in pressure_rows(stat, interactions)? {
        writer.write_record([label, value.to_string()])?;
    }
    for (index, value) in stat.coulomb_all().iter().enumerate() {
        writer.write_record([format!("coulomb {}", index), value.to_string()])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn tensor_values(values: &[f64]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

/// Stress tensor of the particles `particles` normalized with `volume`.
pub fn stress_tensor(file: &Path, volume: f64, particles: &[usize], all: bool) -> Result<String, CliError> {
    let system = load_system_from_file(file)?;
    if system.state.particles.is_empty() {
        return Ok(String::from("(no particles)"));
    }
    let scope = if all { PairScope::AgainstAll } else { PairScope::WithinSubset };
    let mut engine = PressureEngine::new(CellStructure::NSquare);
    let tensor = engine.compute_tensor(&system, volume, particles, scope)?;
    let interactions = &system.interactions;

    let mut out = format!("{{ pressure {} }} ", tensor_values(&tensor.total()?));
    out += &format!("{{ ideal {} }} ", tensor_values(tensor.ideal()));
    for (type_num, bond) in interactions.bonded.iter().enumerate() {
        out += &format!("{{ {} {} {} }} ", type_num, bond.name(), tensor_values(tensor.bonded(type_num)?));
    }
    for i in 0..interactions.n_particle_types {
        for j in (i..interactions.n_particle_types).filter(|j| interactions.check_if_particles_interact(i, *j)) {
            out += &format!("{{ {} {} nonbonded {} }} ", i, j, tensor_values(tensor.nonbonded(i, j)?));
        }
    }
    if tensor.n_coulomb() > 0 {
        out += &format!("{{ coulomb {} }}", tensor_values(&tensor.coulomb_all()[..TENSOR]));
    }
    Ok(out.trim_end().to_string())
}

/// Particle identities in spherical shells around `center`, one
/// `{ volume { ids } }` group per shell.
pub fn sphere_bins(file: &Path,
                   r_min: f64,
                   r_max: Option<f64>,
                   r_bins: Option<usize>,
                   center: &[f64]) -> Result<String, CliError> {
    let [x, y, z] = center else {
        return Err(CliError::Usage("sphere-bins --center <x> <y> <z>"));
    };
    let system = load_system_from_file(file)?;
    let state = &system.state;
    let r_max = r_max.unwrap_or_else(|| state.geometry.min_length() / 2.0);
    let r_bins = r_bins.unwrap_or(state.particles.len() / 20);
    let bins = calc_bins_sphere(state, r_min, r_max, r_bins, &Vector3::new(*x, *y, *z))?;
    let groups: Vec<String> = (0..bins.len())
        .map(|bin| {
            let ids: Vec<String> = bins.bin(bin).into_iter().flatten().map(|id| id.to_string()).collect();
            format!("{{ {:e} {{ {} }} }}", bins.volumes[bin], ids.join(" "))
        })
        .collect();
    Ok(groups.join(" "))
}
