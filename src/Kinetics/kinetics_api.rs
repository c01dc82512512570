//! # Phase and mechanism capabilities
//!
//! A reaction never owns thermodynamic data. Everything it needs to know about substances
//! (which substances exist, their phases, elemental composition, site sizes, charges and the
//! concentration convention of each phase) is asked through two traits:
//!
//! - [`ThermoPhase`]: one phase (bulk gas or liquid with 3 dimensions, surface with 2)
//! - [`Kinetics`]: the mechanism governing the reactions, i.e. a list of phases plus the
//!   policy for undeclared substances
//!
//! [`PhaseData`] and [`KineticsMechanism`] are plain in-memory implementations.
//!
//! ```
//! use KiReaction::Kinetics::kinetics_api::{Kinetics, KineticsMechanism, PhaseData};
//! let gas = PhaseData::from_formulae("gas", 3, &["H2", "O2", "H2O"]).unwrap();
//! let kin = KineticsMechanism::new(vec![gas]);
//! assert_eq!(kin.kinetics_species_index("O2"), Some(1));
//! ```
use crate::Kinetics::molmass::parse_formula;
use crate::Kinetics::rate_units::Units;
use crate::Kinetics::reaction_errors::ReactionError;
use crate::settings::KineticsSettings;
use nalgebra::DMatrix;

/// thermodynamic phase as seen by a reaction
pub trait ThermoPhase {
    fn name(&self) -> &str;
    /// 3 for bulk phases, 2 for surfaces
    fn n_dim(&self) -> usize;
    fn standard_concentration_units(&self) -> Units;
    fn n_species(&self) -> usize;
    fn species_index(&self, name: &str) -> Option<usize>;
    fn n_elements(&self) -> usize;
    fn element_name(&self, m: usize) -> &str;
    /// number of atoms of element `m` in species `k`
    fn n_atoms(&self, k: usize, m: usize) -> f64;
    /// number of surface sites occupied by species `k`
    fn size(&self, k: usize) -> f64;
    fn charge(&self, k: usize) -> f64;
}

/// mechanism governing a set of reactions
pub trait Kinetics {
    fn n_phases(&self) -> usize;
    fn thermo(&self, n: usize) -> &dyn ThermoPhase;
    /// phase where the reactions take place
    fn reaction_phase_index(&self) -> usize;
    fn surface_phase_index(&self) -> Option<usize>;
    /// index of a species in the list of all species of all phases
    fn kinetics_species_index(&self, name: &str) -> Option<usize>;
    fn species_phase_index(&self, k: usize) -> Option<usize>;
    fn skip_undeclared_species(&self) -> bool;
    fn skip_undeclared_third_bodies(&self) -> bool;

    fn species_phase(&self, name: &str) -> Option<&dyn ThermoPhase> {
        let k = self.kinetics_species_index(name)?;
        let n = self.species_phase_index(k)?;
        Some(self.thermo(n))
    }
}

/// in-memory phase: substances with their elemental composition, site sizes and charges
#[derive(Debug, Clone)]
pub struct PhaseData {
    pub name: String,
    n_dim: usize,
    species: Vec<String>,
    elements: Vec<String>,
    /// rows - species, columns - elements
    atoms: DMatrix<f64>,
    sizes: Vec<f64>,
    charges: Vec<f64>,
}

impl PhaseData {
    pub fn new(name: &str, n_dim: usize) -> Self {
        Self {
            name: name.to_string(),
            n_dim,
            species: Vec::new(),
            elements: Vec::new(),
            atoms: DMatrix::zeros(0, 0),
            sizes: Vec::new(),
            charges: Vec::new(),
        }
    }
    /// phase whose species compositions are parsed from their names
    pub fn from_formulae(
        name: &str,
        n_dim: usize,
        formulae: &[&str],
    ) -> Result<Self, ReactionError> {
        let mut phase = Self::new(name, n_dim);
        for formula in formulae {
            let counts = parse_formula(formula, None)?;
            let mut composition: Vec<(&str, f64)> = counts
                .iter()
                .map(|(element, n)| (element.as_str(), *n as f64))
                .collect();
            // HashMap order is random, keep element columns reproducible
            composition.sort_by(|a, b| a.0.cmp(b.0));
            phase.add_species(formula, &composition);
        }
        Ok(phase)
    }
    /// add species with composition [(element, number of atoms)]; size 1, charge 0
    pub fn add_species(&mut self, name: &str, composition: &[(&str, f64)]) -> &mut Self {
        for (element, _) in composition {
            if !self.elements.iter().any(|e| e == element) {
                self.elements.push(element.to_string());
            }
        }
        self.species.push(name.to_string());
        self.sizes.push(1.0);
        self.charges.push(0.0);
        self.atoms
            .resize_mut(self.species.len(), self.elements.len(), 0.0);
        let k = self.species.len() - 1;
        for (element, n) in composition {
            if let Some(m) = self.elements.iter().position(|e| e == element) {
                self.atoms[(k, m)] += n;
            }
        }
        self
    }

    pub fn set_size(&mut self, name: &str, size: f64) -> &mut Self {
        if let Some(k) = self.species_index(name) {
            self.sizes[k] = size;
        }
        self
    }

    pub fn set_charge(&mut self, name: &str, charge: f64) -> &mut Self {
        if let Some(k) = self.species_index(name) {
            self.charges[k] = charge;
        }
        self
    }

    pub fn species_names(&self) -> &[String] {
        &self.species
    }
}

impl ThermoPhase for PhaseData {
    fn name(&self) -> &str {
        &self.name
    }
    fn n_dim(&self) -> usize {
        self.n_dim
    }
    fn standard_concentration_units(&self) -> Units {
        Units::concentration(self.n_dim)
    }
    fn n_species(&self) -> usize {
        self.species.len()
    }
    fn species_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s == name)
    }
    fn n_elements(&self) -> usize {
        self.elements.len()
    }
    fn element_name(&self, m: usize) -> &str {
        &self.elements[m]
    }
    fn n_atoms(&self, k: usize, m: usize) -> f64 {
        self.atoms[(k, m)]
    }
    fn size(&self, k: usize) -> f64 {
        self.sizes[k]
    }
    fn charge(&self, k: usize) -> f64 {
        self.charges[k]
    }
}

/// in-memory mechanism: phases plus settings for undeclared species
#[derive(Debug, Clone)]
pub struct KineticsMechanism {
    phases: Vec<PhaseData>,
    reaction_phase: usize,
    surface_phase: Option<usize>,
    pub settings: KineticsSettings,
}

impl KineticsMechanism {
    /// If one of the phases is a surface, reactions take place on it (interface kinetics),
    /// otherwise in the first phase.
    pub fn new(phases: Vec<PhaseData>) -> Self {
        let surface_phase = phases.iter().position(|p| p.n_dim < 3);
        Self {
            reaction_phase: surface_phase.unwrap_or(0),
            surface_phase,
            phases,
            settings: KineticsSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: KineticsSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn phases(&self) -> &[PhaseData] {
        &self.phases
    }
}

impl Kinetics for KineticsMechanism {
    fn n_phases(&self) -> usize {
        self.phases.len()
    }
    fn thermo(&self, n: usize) -> &dyn ThermoPhase {
        &self.phases[n]
    }
    fn reaction_phase_index(&self) -> usize {
        self.reaction_phase
    }
    fn surface_phase_index(&self) -> Option<usize> {
        self.surface_phase
    }
    fn kinetics_species_index(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for phase in &self.phases {
            if let Some(k) = phase.species_index(name) {
                return Some(offset + k);
            }
            offset += phase.n_species();
        }
        None
    }
    fn species_phase_index(&self, k: usize) -> Option<usize> {
        let mut offset = 0;
        for (n, phase) in self.phases.iter().enumerate() {
            if k < offset + phase.n_species() {
                return Some(n);
            }
            offset += phase.n_species();
        }
        None
    }
    fn skip_undeclared_species(&self) -> bool {
        self.settings.skip_undeclared_species
    }
    fn skip_undeclared_third_bodies(&self) -> bool {
        self.settings.skip_undeclared_third_bodies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interface() -> KineticsMechanism {
        let gas = PhaseData::from_formulae("gas", 3, &["H2", "O2", "H2O"]).unwrap();
        let mut surf = PhaseData::new("Pt_surf", 2);
        surf.add_species("PT(S)", &[("Pt", 1.0)])
            .add_species("H(S)", &[("H", 1.0)])
            .add_species("O2(S)", &[("O", 2.0)])
            .set_size("O2(S)", 2.0);
        KineticsMechanism::new(vec![gas, surf])
    }

    #[test]
    fn test_phase_from_formulae() {
        let gas = PhaseData::from_formulae("gas", 3, &["H2", "O2", "H2O", "AR"]).unwrap();
        assert_eq!(gas.n_species(), 4);
        assert_eq!(gas.n_elements(), 3);
        let k = gas.species_index("H2O").unwrap();
        let h = gas.elements.iter().position(|e| e == "H").unwrap();
        let o = gas.elements.iter().position(|e| e == "O").unwrap();
        assert_eq!(gas.n_atoms(k, h), 2.0);
        assert_eq!(gas.n_atoms(k, o), 1.0);
        // species added before a new element got a zero for it
        let ar = gas.elements.iter().position(|e| e == "Ar").unwrap();
        assert_eq!(gas.n_atoms(0, ar), 0.0);
        assert_eq!(gas.standard_concentration_units(), Units::concentration(3));
    }

    #[test]
    fn test_bad_formula_in_phase() {
        assert!(PhaseData::from_formulae("gas", 3, &["H2", "2X"]).is_err());
    }

    #[test]
    fn test_mechanism_indices() {
        let kin = interface();
        assert_eq!(kin.n_phases(), 2);
        assert_eq!(kin.reaction_phase_index(), 1);
        assert_eq!(kin.surface_phase_index(), Some(1));
        assert_eq!(kin.kinetics_species_index("H2O"), Some(2));
        assert_eq!(kin.kinetics_species_index("H(S)"), Some(4));
        assert_eq!(kin.kinetics_species_index("CO"), None);
        assert_eq!(kin.species_phase_index(4), Some(1));
        assert_eq!(kin.species_phase_index(10), None);
        assert_eq!(kin.species_phase("O2").unwrap().name(), "gas");
        let surf = kin.species_phase("O2(S)").unwrap();
        assert_eq!(surf.n_dim(), 2);
        assert_eq!(surf.size(surf.species_index("O2(S)").unwrap()), 2.0);
    }

    #[test]
    fn test_gas_mechanism_has_no_surface() {
        let gas = PhaseData::from_formulae("gas", 3, &["H2"]).unwrap();
        let kin = KineticsMechanism::new(vec![gas]);
        assert_eq!(kin.reaction_phase_index(), 0);
        assert_eq!(kin.surface_phase_index(), None);
        assert!(!kin.skip_undeclared_species());
    }
}
