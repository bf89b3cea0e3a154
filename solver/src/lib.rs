extern crate mdpress_core;
extern crate nalgebra as na;
extern crate rand_distr;
extern crate rayon;
pub mod cells;
pub mod comm;
pub mod electrostatics;
pub mod error;
pub mod forces;
pub mod initializer;
pub mod observable;
pub mod pressure;
pub mod virial;

pub use cells::{CellStructure, VirialBackend};
pub use comm::{Communicator, LocalCommunicator, ThreadCommunicator};
pub use electrostatics::{EwaldKSpace, KSpaceSolver};
pub use error::{BarostatError, InitError, ObservableError, PressureError};
pub use initializer::NptIso;
pub use observable::{ObservableStat, SCALAR, TENSOR};
pub use pressure::{calc_bins_sphere, PairScope, PressureEngine, SphereBins};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::calculate_forces;
    use crate::initializer::{initialize_particles, initialize_particles_position, initialize_velocities};
    use mdpress_core::*;
    use na::Vector3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const BACKENDS: [CellStructure; 3] = [
        CellStructure::DomainDecomposition { skin: 0.4 },
        CellStructure::NSquare,
        CellStructure::Layered,
    ];

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-12 + 1e-9 * a.abs().max(b.abs()), "{a} != {b}");
    }

    fn trace(tensor: &[f64]) -> f64 {
        tensor[0] + tensor[4] + tensor[8]
    }

    fn harmonic_pair() -> System {
        let mut interactions = InteractionTable::new(1);
        interactions.add_bonded(BondedInteraction::Harmonic { k: 1.0, r: 1.0, r_cut: 0.0 });
        let particles = vec![
            Particle::new(0, 0, Vector3::new(1.0, 1.0, 1.0), Vector3::zeros()).with_bond(Bond::pair(0, 1)),
            Particle::new(1, 0, Vector3::new(3.0, 1.0, 1.0), Vector3::zeros()),
        ];
        System::new(State::new(particles, BoxGeometry::cubic(10.0)), interactions, SimulationParameters::default())
    }

    /// 216 jittered particles of two types with bonds, angles, charges and
    /// all short range interaction kinds.
    fn mixed_system(seed: u64) -> System {
        let mut state = initialize_particles(216, BoxGeometry::cubic(12.0));
        initialize_particles_position(&mut state, 0, 0, (1.0, 1.0, 1.0), (6, 6, 6), 2.0)
            .expect("Can't init particles");
        initialize_velocities(&mut state, 1.2, 0.01, seed).expect("Can't init velocities");
        let mut rng = StdRng::seed_from_u64(seed);
        for particle in &mut state.particles {
            particle.position += Vector3::new(rng.gen_range(-0.3..0.3), rng.gen_range(-0.3..0.3), rng.gen_range(-0.3..0.3));
            particle.type_id = particle.identity % 2;
            particle.charge = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            particle.mass = rng.gen_range(0.5..2.0);
            particle.omega = Vector3::new(rng.gen_range(-0.1..0.1), 0.0, rng.gen_range(-0.1..0.1));
            particle.director = Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 1.0).normalize();
        }

        let mut interactions = InteractionTable::new(2);
        interactions.set_non_bonded(0, 0, IaParameters::lennard_jones(LennardJones::new(1.0, 1.0)));
        interactions.set_non_bonded(0, 1, IaParameters {
            lj: Some(LennardJones::new(0.8, 1.1)),
            tabulated: Some(Tabulated { min: 0.5, max: 2.5, forces: vec![3.0, 1.0, 0.2, -0.1, 0.0] }),
            ..Default::default()
        });
        interactions.set_non_bonded(1, 1, IaParameters {
            lj_cos: Some(LjCos::new(1.0, 1.0, 1.8, 0.0)),
            gay_berne: Some(GayBerne { eps: 1.0, sigma: 0.5, cut: 2.0, k1: 2.0, k2: 3.0, mu: 2.0, nu: 1.0 }),
            ..Default::default()
        });
        interactions.electrostatics = Electrostatics {
            prefactor: 0.7,
            method: CoulombMethod::DebyeHueckel { kappa: 0.5, r_cut: 2.5 },
        };
        let harmonic = interactions.add_bonded(BondedInteraction::Harmonic { k: 2.0, r: 2.0, r_cut: 0.0 });
        let fene = interactions.add_bonded(BondedInteraction::Fene { k: 5.0, drmax: 2.0, r0: 1.5 });
        let angle = interactions.add_bonded(BondedInteraction::Angle { bend: 1.5, phi0: std::f64::consts::PI });
        // chains along z
        for i in (0..216).step_by(6) {
            state.particles[i].bonds.push(Bond::pair(harmonic, i + 1));
            state.particles[i + 2].bonds.push(Bond::pair(fene, i + 3));
            state.particles[i + 4].bonds.push(Bond::angle(angle, i + 3, i + 5));
        }
        System::new(state, interactions, SimulationParameters::default())
    }

    fn scalar_pressure(system: &System, cell_structure: CellStructure) -> ObservableStat {
        let mut system = system.clone();
        let mut engine = PressureEngine::new(cell_structure);
        engine.compute_scalar_pressure(&mut system, &LocalCommunicator)
            .expect("valid system")
            .expect("root rank")
            .clone()
    }

    fn assert_same_observable(a: &ObservableStat, b: &ObservableStat) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.data().iter().zip(b.data()) {
            assert_close(*x, *y);
        }
    }

    #[test]
    fn harmonic_bond_pressure() {
        for cell_structure in BACKENDS {
            let pressure = scalar_pressure(&harmonic_pair(), cell_structure);
            assert!(pressure.is_initialized());
            assert_eq!(pressure.ideal(), &[0.0]);
            assert_close(pressure.bonded(0).expect("bond type")[0], -2.0 / 3000.0);
            assert_eq!(pressure.nonbonded(0, 0).expect("type pair"), &[0.0]);
            assert_eq!(pressure.n_coulomb(), 0);
            assert_close(pressure.total().expect("computed")[0], -2.0 / 3000.0);
        }
    }

    #[test]
    fn harmonic_bond_tensor() {
        let system = harmonic_pair();
        let mut engine = PressureEngine::default();
        let tensor = engine.compute_tensor(&system, 1000.0, &[0, 1], PairScope::WithinSubset)
            .expect("valid subset");
        let bonded = tensor.bonded(0).expect("bond type");
        assert_close(bonded[0], -2.0 / 3000.0);
        assert!(bonded[1..].iter().all(|v| *v == 0.0));
        // the bond owner is not in the subset
        let tensor = engine.compute_tensor(&system, 1000.0, &[1], PairScope::WithinSubset)
            .expect("valid subset");
        assert_eq!(tensor.bonded(0).expect("bond type"), &[0.0; 9]);
    }

    #[test]
    fn lennard_jones_force() {
        let mut interactions = InteractionTable::new(1);
        interactions.set_non_bonded(0, 0, IaParameters::lennard_jones(LennardJones::new(1.712, 0.3418)));
        let mut p2 = Particle::new(1, 0, Vector3::zeros(), Vector3::zeros());
        p2.position.x = 0.5;
        let particles = vec![Particle::default(), p2];
        let mut system = System::new(State::new(particles, BoxGeometry::cubic(2.0)), interactions,
                                     SimulationParameters::default());
        calculate_forces(&mut system, None).expect("valid system");
        let force_p1 = &system.state.particles[0].force;
        assert_eq!(format!("{:.8}", force_p1.x), "6.67445797");
        assert_eq!(format!("{:.8}", force_p1.y), "0.00000000");
        assert_eq!(format!("{:.8}", force_p1.z), "0.00000000");
        assert_eq!(format!("{:.8}", system.state.particles[1].force.x), "-6.67445797");
    }

    #[test]
    fn backends_agree() {
        let system = mixed_system(3);
        let reference = scalar_pressure(&system, CellStructure::NSquare);
        assert!(reference.bonded(0).expect("bond type")[0] != 0.0);
        assert!(reference.bonded(2).expect("bond type")[0] != 0.0);
        assert!(reference.nonbonded(1, 1).expect("type pair")[0] != 0.0);
        assert!(reference.coulomb(0).expect("real space")[0] != 0.0);
        for cell_structure in BACKENDS {
            assert_same_observable(&scalar_pressure(&system, cell_structure), &reference);
        }
    }

    #[test]
    fn categories_add_up() {
        let system = mixed_system(5);
        let pressure = scalar_pressure(&system, CellStructure::default());
        let mut sum = pressure.ideal()[0] + pressure.coulomb_total().expect("computed")[0];
        for bond_type in 0..pressure.n_bonded() {
            sum += pressure.bonded(bond_type).expect("bond type")[0];
        }
        for i in 0..2 {
            for j in i..2 {
                sum += pressure.nonbonded(i, j).expect("type pair")[0];
            }
        }
        assert_close(pressure.total().expect("computed")[0], sum);
    }

    #[test]
    fn rank_count_does_not_matter() {
        let system = mixed_system(11);
        let reference = scalar_pressure(&system, CellStructure::NSquare);
        for cell_structure in BACKENDS {
            for n_ranks in [2, 3, 4] {
                let results: Vec<Option<ObservableStat>> = std::thread::scope(|s| {
                    let handles: Vec<_> = ThreadCommunicator::group(n_ranks)
                        .into_iter()
                        .map(|comm| {
                            let mut system = system.clone();
                            s.spawn(move || {
                                let mut engine = PressureEngine::new(cell_structure);
                                engine.compute_scalar_pressure(&mut system, &comm)
                                    .expect("valid system")
                                    .cloned()
                            })
                        })
                        .collect();
                    handles.into_iter().map(|h| h.join().expect("rank panicked")).collect()
                });
                assert!(results[1..].iter().all(|r| r.is_none()));
                let root = results[0].as_ref().expect("root result");
                assert_same_observable(root, &reference);
            }
        }
    }

    #[test]
    fn tensor_trace_is_scalar_pressure() {
        let mut system = mixed_system(7);
        system.parameters.rotation = true;
        let scalar = scalar_pressure(&system, CellStructure::default());
        let all: Vec<usize> = (0..system.state.particles.len()).collect();
        let mut engine = PressureEngine::default();
        let tensor = engine.compute_tensor(&system, system.state.geometry.volume(), &all, PairScope::WithinSubset)
            .expect("valid subset");
        assert_close(trace(tensor.ideal()), scalar.ideal()[0]);
        for bond_type in 0..3 {
            assert_close(trace(tensor.bonded(bond_type).expect("bond type")), scalar.bonded(bond_type).expect("bond type")[0]);
        }
        assert_close(trace(tensor.nonbonded(0, 1).expect("type pair")), scalar.nonbonded(1, 0).expect("type pair")[0]);
        assert_close(trace(tensor.coulomb(0).expect("real space")), scalar.coulomb(0).expect("real space")[0]);
        assert_close(trace(&tensor.total().expect("computed")), scalar.total().expect("computed")[0]);
    }

    #[test]
    fn tensor_is_reproducible() {
        let system = mixed_system(13);
        let subset: Vec<usize> = (0..216).filter(|i| i % 3 != 1).rev().collect();
        let mut engine = PressureEngine::default();
        let first = engine.compute_tensor(&system, 100.0, &subset, PairScope::AgainstAll)
            .expect("valid subset")
            .clone();
        let second = engine.compute_tensor(&system, 100.0, &subset, PairScope::AgainstAll)
            .expect("valid subset");
        assert_eq!(first.data(), second.data());
        assert!(first.is_initialized());
    }

    #[test]
    fn tensor_scopes() {
        let mut interactions = InteractionTable::new(1);
        interactions.set_non_bonded(0, 0, IaParameters::lennard_jones(LennardJones::new(1.0, 1.0)));
        let particles = vec![
            Particle::new(0, 0, Vector3::new(1.0, 1.0, 1.0), Vector3::zeros()),
            Particle::new(1, 0, Vector3::new(2.1, 1.0, 1.0), Vector3::zeros()),
            Particle::new(2, 0, Vector3::new(1.0, 2.2, 1.0), Vector3::zeros()),
        ];
        let system = System::new(State::new(particles, BoxGeometry::cubic(10.0)), interactions,
                                 SimulationParameters::default());
        let mut engine = PressureEngine::default();
        let pair = |engine: &mut PressureEngine, subset: &[usize], scope| {
            engine.compute_tensor(&system, 1.0, subset, scope).expect("valid subset")
                .nonbonded(0, 0).expect("type pair").to_vec()
        };
        let within = pair(&mut engine, &[0, 1], PairScope::WithinSubset);
        let against = pair(&mut engine, &[0, 1], PairScope::AgainstAll);
        let pair_01 = pair(&mut engine, &[1, 0, 1], PairScope::WithinSubset);
        let all = pair(&mut engine, &[0, 1, 2], PairScope::WithinSubset);
        // 0-1 only inside, 0-2 and 1-2 only against the rest
        assert!(within[0] != 0.0 && within[4] == 0.0);
        for k in 0..9 {
            assert_close(within[k], pair_01[k]);
            assert_close(within[k] + against[k], all[k]);
        }
        assert_eq!(PairScope::from_flag(1), Some(PairScope::AgainstAll));
        assert_eq!(PairScope::from_flag(2), None);
    }

    #[test]
    fn tensor_rejects_kspace_electrostatics() {
        let mut system = harmonic_pair();
        let mut engine = PressureEngine::default();
        engine.compute_tensor(&system, 1000.0, &[0, 1], PairScope::WithinSubset).expect("valid subset");
        system.interactions.electrostatics = Electrostatics {
            prefactor: 1.0,
            method: CoulombMethod::P3m { alpha: 1.0, r_cut: 3.0 },
        };
        let before = engine.p_tensor().clone();
        assert!(matches!(engine.compute_tensor(&system, 1000.0, &[0, 1], PairScope::WithinSubset),
                         Err(PressureError::UnsupportedCoulombMethod(_))));
        assert_eq!(engine.p_tensor(), &before);
    }

    struct FixedKSpace(f64);

    impl KSpaceSolver for FixedKSpace {
        fn kspace_virial(&mut self, _system: &System, comm: &dyn Communicator) -> f64 {
            if comm.is_root() { self.0 } else { 0.0 }
        }
    }

    #[test]
    fn kspace_contribution() {
        let mut system = harmonic_pair();
        system.interactions.electrostatics = Electrostatics {
            prefactor: 1.0,
            method: CoulombMethod::P3m { alpha: 1.0, r_cut: 3.0 },
        };
        let mut engine = PressureEngine::new(CellStructure::NSquare);
        assert_eq!(engine.compute_scalar_pressure(&mut system, &LocalCommunicator).err(),
                   Some(PressureError::MissingKSpaceSolver));
        let mut engine = engine.with_kspace_solver(Box::new(FixedKSpace(6.0)));
        let pressure = engine.compute_scalar_pressure(&mut system, &LocalCommunicator)
            .expect("valid system")
            .expect("root rank");
        assert_eq!(pressure.n_coulomb(), 2);
        assert_eq!(pressure.coulomb(0).expect("real space"), &[0.0]);
        assert_close(pressure.coulomb(1).expect("k-space")[0], 6.0 / 3000.0);
        assert_close(pressure.total().expect("computed")[0], 4.0 / 3000.0);
    }

    #[test]
    fn ewald_kspace_solver() {
        let mut system = harmonic_pair();
        system.state.particles[0].charge = 1.0;
        system.state.particles[1].charge = -1.0;
        system.interactions.electrostatics = Electrostatics {
            prefactor: 1.0,
            method: CoulombMethod::P3m { alpha: 0.8, r_cut: 4.0 },
        };
        let mut engine = PressureEngine::new(CellStructure::NSquare)
            .with_kspace_solver(Box::new(EwaldKSpace::new(0.8, 6)));
        let pressure = engine.compute_scalar_pressure(&mut system, &LocalCommunicator)
            .expect("valid system")
            .expect("root rank");
        let kspace = EwaldKSpace::new(0.8, 6).kspace_energy(&system);
        assert_close(pressure.coulomb(1).expect("k-space")[0], kspace / 3000.0);
        // attractive pair
        assert!(pressure.coulomb(0).expect("real space")[0] < 0.0);
    }

    #[test]
    fn integrity_errors() {
        let mut system = harmonic_pair();
        system.state.particles[0].bonds.push(Bond::pair(0, 9));
        let mut engine = PressureEngine::new(CellStructure::NSquare);
        assert_eq!(engine.compute_scalar_pressure(&mut system, &LocalCommunicator).err(),
                   Some(PressureError::MissingParticle { identity: 9 }));
        assert!(!engine.total_pressure().is_initialized());

        let mut system = harmonic_pair();
        system.state.particles[1].bonds.push(Bond::pair(4, 0));
        assert_eq!(engine.compute_scalar_pressure(&mut system, &LocalCommunicator).err(),
                   Some(PressureError::UnknownBondType { type_num: 4, identity: 1 }));
        assert_eq!(engine.compute_tensor(&system, 1.0, &[0, 5], PairScope::AgainstAll).err(),
                   Some(PressureError::MissingParticle { identity: 5 }));
        assert_eq!(engine.compute_tensor(&system, 0.0, &[0], PairScope::AgainstAll).err(),
                   Some(PressureError::InvalidVolume(0.0)));
    }

    #[test]
    fn negative_box_length_is_rejected() {
        // positive volume from two negative edges
        let mut system = harmonic_pair();
        system.state.geometry = BoxGeometry::new(Vector3::new(-10.0, -10.0, 10.0));
        let expected = PressureError::InvalidBoxLength { axis: 0, length: -10.0 };
        for cell_structure in [CellStructure::default(), CellStructure::NSquare, CellStructure::Layered] {
            let mut engine = PressureEngine::new(cell_structure);
            assert_eq!(engine.compute_scalar_pressure(&mut system, &LocalCommunicator).err(),
                       Some(expected.clone()));
        }
        let mut engine = PressureEngine::default();
        assert_eq!(engine.compute_tensor(&system, 1000.0, &[0, 1], PairScope::WithinSubset).err(),
                   Some(expected));
        system.state.geometry = BoxGeometry::new(Vector3::new(10.0, 10.0, 0.0));
        assert_eq!(engine.compute_tensor(&system, 1000.0, &[0, 1], PairScope::WithinSubset).err(),
                   Some(PressureError::InvalidBoxLength { axis: 2, length: 0.0 }));
    }

    #[test]
    fn kinetic_pressure() {
        let mut system = harmonic_pair();
        system.state.particles[0].velocity = Vector3::new(0.01, 0.02, 0.0);
        system.state.particles[0].mass = 2.0;
        system.state.particles[1].omega = Vector3::new(0.0, 0.0, 0.03);
        let pressure = scalar_pressure(&system, CellStructure::NSquare);
        // 2 * 0.0005 / (3 * 1000 * 0.01^2)
        assert_close(pressure.ideal()[0], 0.001 / 0.3);
        system.parameters.rotation = true;
        let pressure = scalar_pressure(&system, CellStructure::NSquare);
        assert_close(pressure.ideal()[0], (0.001 + 0.0009) / 0.6);
    }

    #[test]
    fn resort_follows_moved_particles() {
        let mut system = mixed_system(17);
        let mut engine = PressureEngine::new(CellStructure::DomainDecomposition { skin: 0.1 });
        engine.compute_scalar_pressure(&mut system, &LocalCommunicator).expect("valid system");
        assert!(!system.state.resort_particles);
        assert!(!system.state.rebuild_verlet_list);
        for particle in &mut system.state.particles {
            particle.position.x += 3.7;
        }
        system.state.invalidate();
        let moved = engine.compute_scalar_pressure(&mut system, &LocalCommunicator)
            .expect("valid system")
            .expect("root rank")
            .clone();
        assert_same_observable(&moved, &scalar_pressure(&system, CellStructure::NSquare));
        assert_eq!(engine.backend_name(), "domain decomposition");
    }

    #[test]
    fn barostat_pressure_matches_scalar_pressure() {
        let mut system = mixed_system(19);
        system.parameters.integrator = IntegratorKind::NptIso;
        let scalar = scalar_pressure(&system, CellStructure::default());

        let mut npt = NptIso::new();
        npt.initialize(1.0, 10.0, [true; 3], true, &system.interactions, &LocalCommunicator)
            .expect("valid barostat");
        npt.enter_integration(&system.state.geometry, &system.parameters, true)
            .expect("npt integrator");
        calculate_forces(&mut system, Some(&mut npt)).expect("valid system");
        for particle in &system.state.particles {
            npt.add_velocity_contribution(&particle.velocity, particle.mass);
        }
        npt.finalize_instantaneous_pressure(&LocalCommunicator, system.parameters.time_step)
            .expect("valid time step");
        assert_close(npt.p_inst(), scalar.total().expect("computed")[0]);

        let volume = npt.volume();
        npt.propagate_box(&mut system.state, system.parameters.time_step).expect("positive volume");
        assert!(system.state.resort_particles);
        assert_close(system.state.geometry.volume(), npt.volume());
        assert!(npt.volume() != volume);
    }
}
