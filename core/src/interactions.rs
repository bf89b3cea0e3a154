use serde::{Deserialize, Serialize};

/// Slot of the unordered type pair `(i, j)` in a symmetric table over
/// `n_types` particle types.
///
/// The pair is normalized to `i <= j` and mapped row by row onto the upper
/// triangle: `(0,0), (0,1), .., (0,n-1), (1,1), ..`. Returns `None` if either
/// type is out of range.
///
/// # Examples
///
/// ```
/// # use mdpress_core::type_pair_index;
/// assert_eq!(type_pair_index(0, 0, 3), Some(0));
/// assert_eq!(type_pair_index(2, 1, 3), Some(4));
/// assert_eq!(type_pair_index(1, 2, 3), Some(4));
/// assert_eq!(type_pair_index(3, 0, 3), None);
/// ```
pub fn type_pair_index(i: usize, j: usize, n_types: usize) -> Option<usize> {
    if i >= n_types || j >= n_types {
        return None;
    }
    let (i, j) = if i > j { (j, i) } else { (i, j) };
    Some(i * n_types - i * i.saturating_sub(1) / 2 + (j - i))
}

/// Number of slots of a symmetric table over `n_types` particle types.
pub fn n_type_pairs(n_types: usize) -> usize {
    n_types * (n_types + 1) / 2
}

/// Bonded interaction parameters, indexed by bond type number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BondedInteraction {
    /// Finitely extensible nonlinear elastic bond
    Fene { k: f64, drmax: f64, r0: f64 },
    /// Harmonic spring, breaks beyond `r_cut` if `r_cut` is positive
    Harmonic { k: f64, r: f64, r_cut: f64 },
    /// Harmonic spring with the Lennard-Jones interaction of the pair removed
    SubtLjHarm { k: f64, r: f64 },
    /// FENE bond with the Lennard-Jones interaction of the pair removed
    SubtLjFene { k: f64, drmax: f64 },
    /// Removes the Lennard-Jones interaction of the pair
    SubtLj,
    /// Cosine angle potential `bend * (1 - cos(phi - phi0))` around the owner
    Angle { bend: f64, phi0: f64 },
}

impl BondedInteraction {
    /// Number of partners a bond of this kind references.
    pub fn n_partners(&self) -> usize {
        match self {
            BondedInteraction::Angle { .. } => 2,
            _ => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BondedInteraction::Fene { .. } => "FENE",
            BondedInteraction::Harmonic { .. } => "HARMONIC",
            BondedInteraction::SubtLjHarm { .. } => "SUBT_LJ_HARM",
            BondedInteraction::SubtLjFene { .. } => "SUBT_LJ_FENE",
            BondedInteraction::SubtLj => "SUBT_LJ",
            BondedInteraction::Angle { .. } => "angle",
        }
    }
}

/// Lennard-Jones 12-6 interaction acting on `r - offset`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LennardJones {
    pub eps: f64,
    pub sigma: f64,
    pub cut: f64,
    #[serde(default)]
    pub offset: f64,
}

impl LennardJones {
    /// Lennard-Jones with the usual cutoff of 2.5 sigma.
    pub fn new(eps: f64, sigma: f64) -> Self {
        Self {
            eps,
            sigma,
            cut: sigma * 2.5,
            offset: 0.0,
        }
    }

    pub fn with_cut(mut self, cut: f64) -> Self {
        self.cut = cut;
        self
    }

    pub fn max_cut(&self) -> f64 {
        self.cut + self.offset
    }
}

/// Lennard-Jones core with an attractive cosine tail.
///
/// Below `rmin = 2^(1/6) sigma` the interaction is the Lennard-Jones one, from
/// `rmin` to `cut` it is `eps/2 * (cos(alfa r^2 + beta) - 1)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LjCos {
    pub eps: f64,
    pub sigma: f64,
    pub cut: f64,
    pub offset: f64,
    pub alfa: f64,
    pub beta: f64,
    pub rmin: f64,
}

impl LjCos {
    pub fn new(eps: f64, sigma: f64, cut: f64, offset: f64) -> Self {
        let rmin = 2.0f64.powf(1.0 / 6.0) * sigma;
        let alfa = std::f64::consts::PI / (cut * cut - rmin * rmin);
        let beta = std::f64::consts::PI - rmin * rmin * alfa;
        Self {
            eps,
            sigma,
            cut,
            offset,
            alfa,
            beta,
            rmin,
        }
    }

    pub fn max_cut(&self) -> f64 {
        self.cut + self.offset
    }
}

/// Radial force magnitude tabulated on an even grid from `min` to `max`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tabulated {
    pub min: f64,
    pub max: f64,
    pub forces: Vec<f64>,
}

/// Gay-Berne interaction between two uniaxial particles.
///
/// `k1` is the length to breadth ratio, `k2` the side to end well depth ratio,
/// `mu` and `nu` the usual exponents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GayBerne {
    pub eps: f64,
    pub sigma: f64,
    pub cut: f64,
    pub k1: f64,
    pub k2: f64,
    pub mu: f64,
    pub nu: f64,
}

impl GayBerne {
    pub fn chi1(&self) -> f64 {
        (self.k1 * self.k1 - 1.0) / (self.k1 * self.k1 + 1.0)
    }

    pub fn chi2(&self) -> f64 {
        let k2_mu = self.k2.powf(1.0 / self.mu);
        (k2_mu - 1.0) / (k2_mu + 1.0)
    }
}

/// Non-bonded interactions of one type pair, every present one is applied.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IaParameters {
    #[serde(default)]
    pub lj: Option<LennardJones>,
    #[serde(default)]
    pub lj_cos: Option<LjCos>,
    #[serde(default)]
    pub tabulated: Option<Tabulated>,
    #[serde(default)]
    pub gay_berne: Option<GayBerne>,
}

impl IaParameters {
    pub fn lennard_jones(lj: LennardJones) -> Self {
        Self {
            lj: Some(lj),
            ..Default::default()
        }
    }

    pub fn interacts(&self) -> bool {
        self.lj.is_some() || self.lj_cos.is_some() || self.tabulated.is_some() || self.gay_berne.is_some()
    }

    /// Largest distance at which any of the interactions is non-zero.
    pub fn max_cut(&self) -> f64 {
        let mut cut = 0.0f64;
        if let Some(lj) = &self.lj {
            cut = cut.max(lj.max_cut());
        }
        if let Some(lj_cos) = &self.lj_cos {
            cut = cut.max(lj_cos.max_cut());
        }
        if let Some(tabulated) = &self.tabulated {
            cut = cut.max(tabulated.max);
        }
        if let Some(gay_berne) = &self.gay_berne {
            cut = cut.max(gay_berne.cut);
        }
        cut
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CoulombMethod {
    #[default]
    None,
    /// Screened Coulomb interaction, cut off at `r_cut`
    DebyeHueckel { kappa: f64, r_cut: f64 },
    /// Particle-particle particle-mesh Ewald, real space part cut off at `r_cut`
    P3m { alpha: f64, r_cut: f64 },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Electrostatics {
    /// Coupling strength (Bjerrum length times temperature)
    pub prefactor: f64,
    pub method: CoulombMethod,
}

impl Electrostatics {
    pub fn is_active(&self) -> bool {
        self.prefactor != 0.0 && self.method != CoulombMethod::None
    }

    pub fn r_cut(&self) -> f64 {
        match self.method {
            CoulombMethod::None => 0.0,
            CoulombMethod::DebyeHueckel { r_cut, .. } => r_cut,
            CoulombMethod::P3m { r_cut, .. } => r_cut,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Magnetostatics {
    /// Dipolar coupling strength
    pub prefactor: f64,
}

impl Magnetostatics {
    pub fn is_active(&self) -> bool {
        self.prefactor != 0.0
    }
}

/// All interaction parameters of a system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionTable {
    pub n_particle_types: usize,
    #[serde(default)]
    pub bonded: Vec<BondedInteraction>,
    /// Upper triangle over type pairs, see [type_pair_index]
    #[serde(default)]
    pub non_bonded: Vec<IaParameters>,
    #[serde(default)]
    pub electrostatics: Electrostatics,
    #[serde(default)]
    pub magnetostatics: Magnetostatics,
}

impl InteractionTable {
    pub fn new(n_particle_types: usize) -> Self {
        Self {
            n_particle_types,
            non_bonded: vec![IaParameters::default(); n_type_pairs(n_particle_types)],
            ..Default::default()
        }
    }

    /// Adds a bond type and returns its type number.
    pub fn add_bonded(&mut self, interaction: BondedInteraction) -> usize {
        self.bonded.push(interaction);
        self.bonded.len() - 1
    }

    /// Sets the interactions of type pair `(i, j)`. Returns `false` if either
    /// type is out of range.
    pub fn set_non_bonded(&mut self, i: usize, j: usize, parameters: IaParameters) -> bool {
        match type_pair_index(i, j, self.n_particle_types) {
            Some(index) if index < self.non_bonded.len() => {
                self.non_bonded[index] = parameters;
                true
            }
            _ => false,
        }
    }

    pub fn get_ia_param(&self, i: usize, j: usize) -> Option<&IaParameters> {
        type_pair_index(i, j, self.n_particle_types).and_then(|index| self.non_bonded.get(index))
    }

    pub fn check_if_particles_interact(&self, i: usize, j: usize) -> bool {
        self.get_ia_param(i, j).map_or(false, |ia| ia.interacts())
    }

    pub fn n_pair_types(&self) -> usize {
        n_type_pairs(self.n_particle_types)
    }

    /// Largest interaction range of all non-bonded and real space
    /// electrostatic interactions.
    pub fn max_cut(&self) -> f64 {
        let non_bonded = self.non_bonded.iter().map(|ia| ia.max_cut()).fold(0.0, f64::max);
        if self.electrostatics.is_active() {
            non_bonded.max(self.electrostatics.r_cut())
        } else {
            non_bonded
        }
    }
}
