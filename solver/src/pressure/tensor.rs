use itertools::Itertools;
use mdpress_core::{CoulombMethod, System};
use crate::error::PressureError;
use crate::observable::{ObservableStat, TENSOR};
use crate::pressure::{check_box, check_time_step, check_volume, kinetic_divisor, PairScope};
use crate::virial::{add_bonded_virials, add_kinetic_virial, add_pair_virials};

/// Category decomposed stress tensor of a particle subset inside `volume`.
///
/// Works on the full particle snapshot with a direct loop over pairs, so it
/// is meant for small subsets. `subset` holds particle identities, repeated
/// identities are counted once. Pairs are evaluated in subset order, the same
/// input always gives bit identical results.
///
/// # Errors
///
/// [PressureError::UnsupportedCoulombMethod] with k-space electrostatics,
/// before anything is computed. Missing particles and invalid bonds as for
/// the scalar pressure.
pub fn local_stress_tensor(system: &System, volume: f64, subset: &[usize], scope: PairScope,
                           result: &mut ObservableStat) -> Result<(), PressureError> {
    let interactions = &system.interactions;
    let electrostatics = &interactions.electrostatics;
    let n_coulomb = match electrostatics.method {
        _ if !electrostatics.is_active() => 0,
        CoulombMethod::None => 0,
        CoulombMethod::DebyeHueckel { .. } => 1,
        CoulombMethod::P3m { .. } => return Err(PressureError::UnsupportedCoulombMethod("P3M")),
    };
    check_box(&system.state.geometry)?;
    let volume = check_volume(volume)?;
    let time_step = check_time_step(system.parameters.time_step)?;
    result.reset(interactions.bonded.len(), interactions.n_pair_types(), n_coulomb, TENSOR)?;

    let state = &system.state;
    let indices: Vec<usize> = subset.iter()
        .unique()
        .map(|identity| state.index_of(*identity).ok_or(PressureError::MissingParticle { identity: *identity }))
        .collect::<Result<_, _>>()?;
    let mut in_subset = vec![false; state.particles.len()];
    for &i in &indices {
        in_subset[i] = true;
    }

    for (position, &i) in indices.iter().enumerate() {
        let p1 = &state.particles[i];
        add_kinetic_virial(result.ideal_mut(), p1, system.parameters.rotation);

        add_bonded_virials(system, p1, result, |bond| match scope {
            PairScope::AgainstAll => true,
            // unknown partners qualify so the bond reports them
            PairScope::WithinSubset => bond.partners.iter()
                .all(|identity| state.index_of(*identity).map_or(true, |j| in_subset[j])),
        })?;

        match scope {
            PairScope::WithinSubset => {
                for &j in &indices[position + 1..] {
                    add_pair_virials(system, p1, &state.particles[j], result)?;
                }
            }
            PairScope::AgainstAll => {
                for (p2, _) in state.particles.iter().zip(&in_subset).filter(|(_, inside)| !**inside) {
                    add_pair_virials(system, p1, p2, result)?;
                }
            }
        }
    }

    let divisor = kinetic_divisor(volume, time_step, system.parameters.rotation);
    result.ideal_mut().iter_mut().for_each(|value| *value /= divisor);
    for value in &mut result.data_mut()[TENSOR..] {
        *value /= 3.0 * volume;
    }
    result.set_initialized(true);
    Ok(())
}
