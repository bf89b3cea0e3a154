use std::path::PathBuf;
use nalgebra::Vector3;
use tempdir::TempDir;
use mdpress_core::{load_system_from_file, save_system_to_file, Bond, BondedInteraction, BoxGeometry,
                   CoulombMethod, Electrostatics, InteractionTable, Particle, SimulationParameters, State, System};
use mdpress_solver::{CellStructure, PressureError};
use crate::args::CellStructureChoose;
use crate::commands::{initialize, pressure, sphere_bins, stress_tensor, Category, CliError};

fn temp_file(temp_dir: &TempDir, name: &str) -> PathBuf {
    temp_dir.path().join(name)
}

fn harmonic_pair() -> System {
    let p1 = Particle::new(0, 0, Vector3::new(1.0, 1.0, 1.0), Vector3::zeros())
        .with_bond(Bond::pair(0, 1));
    let p2 = Particle::new(1, 0, Vector3::new(3.0, 1.0, 1.0), Vector3::zeros());
    let mut interactions = InteractionTable::new(1);
    interactions.add_bonded(BondedInteraction::Harmonic { k: 1.0, r: 1.0, r_cut: 0.0 });
    System::new(State::new(vec![p1, p2], BoxGeometry::cubic(10.0)), interactions,
                SimulationParameters::default())
}

fn saved(temp_dir: &TempDir, system: &System) -> PathBuf {
    let path = temp_file(temp_dir, "system.json");
    save_system_to_file(system, &path, false).expect("Can't save system");
    path
}

fn words(line: &str) -> Vec<String> {
    line.split_whitespace().map(String::from).collect()
}

fn bin_ids(out: &str) -> Vec<Vec<usize>> {
    out.split("} }")
        .filter_map(|group| group.rsplit_once('{'))
        .map(|(_, ids)| ids.split_whitespace().map(|id| id.parse().expect("Not an id")).collect())
        .collect()
}

#[test]
fn initialization() {
    let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
    let path = temp_file(&temp_dir, "init.json");
    initialize(&path, &[3, 3, 3], 1.5, 2.0, 1.0, 0.005, 42, Some(&[1.0, 1.0][..]), true)
        .expect("Can't initialize");
    let system = load_system_from_file(&path).expect("Can't load system");
    assert_eq!(system.state.particles.len(), 27);
    assert_eq!(system.state.geometry.length, Vector3::new(4.5, 4.5, 4.5));
    assert_eq!(system.state.particles[0].position, Vector3::new(0.75, 0.75, 0.75));
    assert!(system.state.particles.iter().all(|p| p.mass == 2.0));
    assert!(system.state.particles.iter().any(|p| p.velocity != Vector3::zeros()));
    assert!(system.interactions.check_if_particles_interact(0, 0));
    assert_eq!(system.parameters.time_step, 0.005);

    let res = initialize(&path, &[3, 3], 1.5, 1.0, 1.0, 0.005, 42, None, false);
    assert!(matches!(res, Err(CliError::Usage(_))));
}

#[test]
fn detailed_pressure() {
    let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
    let path = saved(&temp_dir, &harmonic_pair());
    let expected = -2.0 / 3000.0;
    for choose in [CellStructureChoose::Dd, CellStructureChoose::Nsquare, CellStructureChoose::Layered] {
        let out = pressure(&path, crate::commands::cell_structure(choose, 0.4), &[], None, None).expect("Can't compute pressure");
        assert_eq!(out, format!("{{ pressure {} }} {{ ideal 0 }} {{ 0 HARMONIC {} }}", expected, expected),
                   "{choose:?}");
    }
}

#[test]
fn single_category() {
    let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
    let path = saved(&temp_dir, &harmonic_pair());
    let value = |line: &str| -> f64 {
        pressure(&path, CellStructure::NSquare, &words(line), None, None)
            .expect("Can't compute pressure")
            .parse()
            .expect("Not a number")
    };
    assert!((value("harmonic 0") + 2.0 / 3000.0).abs() < 1e-15);
    assert!((value("total") - value("bonded 0")).abs() < 1e-15);
    assert_eq!(value("ideal"), 0.0);
    assert_eq!(value("nonbonded 0 0"), 0.0);
    assert_eq!(value("coulomb"), 0.0);

    let err = |line: &str| pressure(&path, CellStructure::NSquare, &words(line), None, None)
        .expect_err("Must fail");
    assert!(matches!(err("bonded 3"), CliError::UnknownBondType(3)));
    assert!(matches!(err("lj 0 2"), CliError::UnknownParticleType(2)));
    assert!(matches!(err("bonded"), CliError::Usage(_)));
    assert!(matches!(err("volume"), CliError::UnknownCategory(_)));
}

#[test]
fn category_parsing() {
    assert_eq!(Category::parse(&[]).expect("empty is fine"), None);
    assert_eq!(Category::parse(&words("fene 2")).expect("valid"), Some(Category::Bonded(2)));
    assert_eq!(Category::parse(&words("gb 1 0")).expect("valid"), Some(Category::NonBonded(1, 0)));
    assert!(Category::parse(&words("nonbonded 1 x")).is_err());
}

#[test]
fn pressure_table() {
    let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
    let mut system = harmonic_pair();
    system.state.particles[1].charge = 1.0;
    system.state.particles[0].charge = -1.0;
    system.interactions.electrostatics = Electrostatics {
        prefactor: 1.0,
        method: CoulombMethod::DebyeHueckel { kappa: 1.0, r_cut: 3.0 },
    };
    let path = saved(&temp_dir, &system);
    let csv = temp_file(&temp_dir, "pressure.csv");
    let out = pressure(&path, CellStructure::default(), &[], None, Some(&csv)).expect("Can't compute pressure");
    assert!(out.ends_with('}'));
    assert!(out.contains("{ coulomb "));

    let table = std::fs::read_to_string(&csv).expect("Can't read table");
    let labels: Vec<&str> = table.lines().map(|line| line.split(',').next().unwrap_or_default()).collect();
    assert_eq!(labels, vec!["category", "pressure", "ideal", "0 HARMONIC", "coulomb 0"]);
}

#[test]
fn no_particles() {
    let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
    let mut system = harmonic_pair();
    system.state.particles.clear();
    let path = saved(&temp_dir, &system);
    assert_eq!(pressure(&path, CellStructure::default(), &[], None, None).expect("Empty is fine"), "(no particles)");
    assert_eq!(stress_tensor(&path, 1.0, &[], false).expect("Empty is fine"), "(no particles)");
}

#[test]
fn stress_tensor_output() {
    let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
    let path = saved(&temp_dir, &harmonic_pair());
    let out = stress_tensor(&path, 1000.0, &[0, 1], false).expect("Can't compute tensor");
    assert!(out.starts_with("{ pressure "));
    let bonded = out.split("{ 0 HARMONIC ").nth(1).expect("No bonded group");
    let values: Vec<f64> = bonded.split_whitespace()
        .take_while(|word| *word != "}")
        .map(|word| word.parse().expect("Not a number"))
        .collect();
    assert_eq!(values.len(), 9);
    assert!((values[0] + 2.0 / 3000.0).abs() < 1e-15);
    assert!(values[1..].iter().all(|v| *v == 0.0));

    let alone = stress_tensor(&path, 1000.0, &[0], true).expect("Can't compute tensor");
    assert!(alone.contains("{ 0 HARMONIC "));
    assert!(matches!(stress_tensor(&path, 1000.0, &[7], false),
                     Err(CliError::Pressure(PressureError::MissingParticle { identity: 7 }))));
}

#[test]
fn stress_tensor_rejects_p3m() {
    let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
    let mut system = harmonic_pair();
    system.interactions.electrostatics = Electrostatics {
        prefactor: 1.0,
        method: CoulombMethod::P3m { alpha: 1.0, r_cut: 3.0 },
    };
    let path = saved(&temp_dir, &system);
    assert!(matches!(stress_tensor(&path, 1000.0, &[0, 1], false),
                     Err(CliError::Pressure(PressureError::UnsupportedCoulombMethod("P3M")))));
    assert!(matches!(pressure(&path, CellStructure::default(), &[], None, None),
                     Err(CliError::Pressure(PressureError::MissingKSpaceSolver))));
}

#[test]
fn p3m_pressure_with_ewald() {
    let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
    let mut system = harmonic_pair();
    system.state.particles[0].charge = 1.0;
    system.state.particles[1].charge = -1.0;
    system.interactions.electrostatics = Electrostatics {
        prefactor: 1.0,
        method: CoulombMethod::P3m { alpha: 0.5, r_cut: 4.0 },
    };
    let path = saved(&temp_dir, &system);
    let out = pressure(&path, CellStructure::NSquare, &[], Some(6), None).expect("Can't compute pressure");
    // total followed by the real space and k-space parts
    let coulomb: Vec<f64> = out.split("{ coulomb ").nth(1).expect("No coulomb group")
        .split_whitespace()
        .take_while(|word| *word != "}")
        .map(|word| word.parse().expect("Not a number"))
        .collect();
    assert_eq!(coulomb.len(), 3);
    assert!(coulomb[2] != 0.0);
    assert!((coulomb[0] - coulomb[1] - coulomb[2]).abs() < 1e-12);
}

#[test]
fn spherical_bins() {
    let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
    let path = temp_file(&temp_dir, "lattice.json");
    initialize(&path, &[4, 4, 4], 1.0, 1.0, 0.0, 0.01, 0, None, false).expect("Can't initialize");
    // r_max 2 and 64 / 20 = 3 bins by default, the closest 8 particles sit
    // at 0.866 and the next 24 at 1.658
    let out = sphere_bins(&path, 0.0, None, None, &[2.0, 2.0, 2.0]).expect("Can't bin");
    let counts: Vec<usize> = bin_ids(&out).iter().map(|ids| ids.len()).collect();
    assert_eq!(counts, vec![0, 8, 24]);

    assert!(matches!(sphere_bins(&path, 0.0, None, Some(0), &[2.0, 2.0, 2.0]),
                     Err(CliError::Pressure(PressureError::InvalidBins(_)))));
    assert!(matches!(sphere_bins(&path, 0.0, None, None, &[2.0]), Err(CliError::Usage(_))));
}
