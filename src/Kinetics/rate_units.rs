//! Dimensional analysis of rate coefficients.
//!
//! The units of a rate coefficient are kept as a [`UnitStack`]: a list of
//! (units, exponent) pairs where the first entry is the standard concentration
//! of the reaction phase. Rate models need the per-stage exponents (e.g. the
//! falloff high-pressure limit drops one concentration factor), so the stack is
//! only flattened on request with [`UnitStack::product`].
use crate::Kinetics::kinetics_api::Kinetics;
use crate::Kinetics::reaction::Reaction;
use crate::Kinetics::reaction_equation::{GENERIC_THIRD_BODY, is_falloff_marker};
use crate::Kinetics::reaction_errors::ReactionError;
use approx::relative_eq;
use std::fmt;
use std::ops;

/// base dimensions of the SI system used by the kinetics (quantity is in kmol)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Mass,
    Length,
    Time,
    Temperature,
    Current,
    Quantity,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Mass,
        Dimension::Length,
        Dimension::Time,
        Dimension::Temperature,
        Dimension::Current,
        Dimension::Quantity,
    ];

    /// order used when rendering units, so that rate units read like `m^3 / kmol / s`
    const DISPLAY_ORDER: [Dimension; 6] = [
        Dimension::Mass,
        Dimension::Length,
        Dimension::Quantity,
        Dimension::Temperature,
        Dimension::Current,
        Dimension::Time,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Dimension::Mass => "kg",
            Dimension::Length => "m",
            Dimension::Time => "s",
            Dimension::Temperature => "K",
            Dimension::Current => "A",
            Dimension::Quantity => "kmol",
        }
    }
}

/// physical units: a scale factor and an exponent for each base dimension
#[derive(Debug, Clone, Copy)]
pub struct Units {
    pub factor: f64,
    exponents: [f64; 6],
}

impl Units {
    pub fn new(factor: f64, dims: &[(Dimension, f64)]) -> Self {
        let mut exponents = [0.0; 6];
        for (dim, exp) in dims {
            exponents[dim.index()] += exp;
        }
        Self { factor, exponents }
    }

    pub fn dimensionless() -> Self {
        Self::new(1.0, &[])
    }
    /// kmol/m^3 for bulk phases, kmol/m^2 for surfaces, kmol/m for edges
    pub fn concentration(n_dim: usize) -> Self {
        Self::new(
            1.0,
            &[
                (Dimension::Quantity, 1.0),
                (Dimension::Length, -(n_dim as f64)),
            ],
        )
    }

    pub fn per_second() -> Self {
        Self::new(1.0, &[(Dimension::Time, -1.0)])
    }

    pub fn exponent(&self, dim: Dimension) -> f64 {
        self.exponents[dim.index()]
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(|e| *e == 0.0)
    }

    pub fn pow(&self, exponent: f64) -> Self {
        let mut exponents = self.exponents;
        for e in exponents.iter_mut() {
            *e *= exponent;
        }
        Self {
            factor: self.factor.powf(exponent),
            exponents,
        }
    }
}

impl PartialEq for Units {
    fn eq(&self, other: &Self) -> bool {
        relative_eq!(self.factor, other.factor, epsilon = 1e-12)
            && self
                .exponents
                .iter()
                .zip(other.exponents.iter())
                .all(|(a, b)| relative_eq!(*a, *b, epsilon = 1e-12))
    }
}

impl ops::Mul for Units {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut exponents = self.exponents;
        for (e, r) in exponents.iter_mut().zip(rhs.exponents.iter()) {
            *e += r;
        }
        Self {
            factor: self.factor * rhs.factor,
            exponents,
        }
    }
}

impl ops::Div for Units {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self * rhs.pow(-1.0)
    }
}

fn format_exponent(symbol: &str, exp: f64) -> String {
    if exp == 1.0 {
        symbol.to_string()
    } else {
        format!("{}^{}", symbol, exp)
    }
}

impl fmt::Display for Units {
    /// renders units like `m^3 / kmol / s`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut num = Vec::new();
        let mut den = Vec::new();
        for dim in Dimension::DISPLAY_ORDER {
            let exp = self.exponent(dim);
            if exp > 0.0 {
                num.push(format_exponent(dim.symbol(), exp));
            } else if exp < 0.0 {
                den.push(format_exponent(dim.symbol(), -exp));
            }
        }
        let mut out = if num.is_empty() {
            String::new()
        } else {
            num.join(" * ")
        };
        if self.factor != 1.0 {
            out = if out.is_empty() {
                format!("{}", self.factor)
            } else {
                format!("{} {}", self.factor, out)
            };
        }
        if out.is_empty() {
            out.push('1');
        }
        for d in den {
            out.push_str(" / ");
            out.push_str(&d);
        }
        write!(f, "{}", out)
    }
}

/// layered units of a rate coefficient; entry 0 is the standard concentration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnitStack {
    pub stack: Vec<(Units, f64)>,
}

impl UnitStack {
    pub fn new(standard_units: Units) -> Self {
        Self {
            stack: vec![(standard_units, 0.0)],
        }
    }
    /// undetermined units
    pub fn empty() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn standard_units(&self) -> Option<Units> {
        self.stack.first().map(|(u, _)| *u)
    }

    pub fn standard_exponent(&self) -> f64 {
        self.stack.first().map(|(_, e)| *e).unwrap_or(0.0)
    }
    /// add to the exponent of the standard concentration entry
    pub fn join(&mut self, exponent: f64) {
        if let Some(first) = self.stack.first_mut() {
            first.1 += exponent;
        }
    }
    /// add to the exponent of the entry with matching units, appending a new entry if there is none
    pub fn update(&mut self, units: Units, exponent: f64) {
        if let Some(entry) = self.stack.iter_mut().find(|(u, _)| *u == units) {
            entry.1 += exponent;
        } else {
            self.stack.push((units, exponent));
        }
    }
    /// flatten the stack into a single unit
    pub fn product(&self) -> Units {
        self.stack
            .iter()
            .fold(Units::dimensionless(), |acc, (u, e)| acc * u.pow(*e))
    }
}

/// Units of the rate coefficient required by the rate model of `reaction`.
///
/// Invalid reactions (species missing from the mechanism) get an empty stack.
/// Explicit orders replace the stoichiometric coefficients of the corresponding
/// species; `M` and `(+...)` pseudo species never contribute. Each species is
/// looked up in its own phase, so interface reactions mixing bulk and surface
/// species get one stack entry per concentration convention.
pub fn calculate_rate_coeff_units(
    reaction: &Reaction,
    kin: &dyn Kinetics,
) -> Result<UnitStack, ReactionError> {
    if !reaction.valid() || kin.n_phases() == 0 {
        return Ok(UnitStack::empty());
    }
    let rxn_phase = kin.thermo(kin.reaction_phase_index());
    let mut rate_units = UnitStack::new(rxn_phase.standard_concentration_units());
    // output units: standard concentration per second
    rate_units.join(1.0);
    rate_units.update(Units::per_second(), 1.0);

    for (species, order) in reaction.orders.iter() {
        let phase = kin
            .species_phase(species)
            .ok_or_else(|| ReactionError::UnknownSpecies(species.clone()))?;
        rate_units.update(phase.standard_concentration_units(), -order);
    }
    for (species, stoich) in reaction.reactants.iter() {
        // pseudo species may still be present if the equation has not been resolved yet
        if species == GENERIC_THIRD_BODY || is_falloff_marker(species) {
            continue;
        }
        if !reaction.orders.contains_key(species) {
            let phase = kin
                .species_phase(species)
                .ok_or_else(|| ReactionError::UnknownSpecies(species.clone()))?;
            rate_units.update(phase.standard_concentration_units(), -stoich);
        }
    }
    if reaction.third_body().is_some() {
        // collision partner concentration is the last factor
        rate_units.join(-1.0);
    }
    Ok(rate_units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concentration_units() {
        let gas = Units::concentration(3);
        assert_eq!(gas.exponent(Dimension::Quantity), 1.0);
        assert_eq!(gas.exponent(Dimension::Length), -3.0);
        assert_eq!(gas.to_string(), "kmol / m^3");
        let surf = Units::concentration(2);
        assert_ne!(gas, surf);
    }

    #[test]
    fn test_units_algebra() {
        let conc = Units::concentration(3);
        let k = conc.pow(-1.0) * Units::per_second();
        assert_eq!(k.to_string(), "m^3 / kmol / s");
        assert_eq!(k / Units::per_second(), conc.pow(-1.0));
        assert!((conc / conc).is_dimensionless());
    }

    #[test]
    fn test_unit_stack_join_and_update() {
        let conc = Units::concentration(3);
        let mut stack = UnitStack::new(conc);
        stack.join(1.0);
        stack.update(Units::per_second(), 1.0);
        // bimolecular reaction
        stack.update(conc, -1.0);
        stack.update(conc, -1.0);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.standard_exponent(), -1.0);
        assert_eq!(stack.product().to_string(), "m^3 / kmol / s");
        // surface species go into their own entry
        stack.update(Units::concentration(2), -1.0);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn test_empty_stack() {
        let mut stack = UnitStack::empty();
        stack.join(1.0);
        assert!(stack.is_empty());
        assert_eq!(stack.standard_units(), None);
        assert!(stack.product().is_dimensionless());
    }
}
