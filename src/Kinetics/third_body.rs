/// eng
/// Collision partners ("third bodies") of three-body and falloff reactions.
///
/// A three-body reaction is written "H + O2 + M <=> HO2 + M" with the generic collision partner M,
/// or "H + O2 + AR <=> HO2 + AR" with an explicitly named partner. In the rate expression M stands
/// for the effective concentration sum(eff_k * C_k) where eff_k are the third body efficiencies.
/// A falloff reaction marks the partner in brackets: "CH3 + CH3 (+M) <=> C2H6 (+M)" or "(+AR)".
/// When the equation is set, the partner is removed from reactants and products and kept in
/// [`ThirdBody`]; when the equation is rendered, it is put back.
use crate::Kinetics::rates::{
    ArrheniusKind, ArrheniusParams, ArrheniusRate, FalloffRate, RateShape, ReactionRate,
};
use crate::Kinetics::reaction::ReactionVariant;
use crate::Kinetics::reaction_document::{Document, composition_value, get_composition, get_f64};
use crate::Kinetics::reaction_equation::{
    Composition, GENERIC_THIRD_BODY, falloff_marker, falloff_marker_interior,
};
use crate::Kinetics::reaction_errors::ReactionError;
use log::debug;
use serde_json::Value;

/// collision partner of a reaction
#[derive(Debug, Clone, PartialEq)]
pub struct ThirdBody {
    /// efficiency of species not listed in `efficiencies`
    pub default_efficiency: f64,
    pub efficiencies: Composition,
    /// the equation names one species instead of M
    pub specified_collision_partner: bool,
    /// rate is multiplied by the third body concentration (false for falloff reactions)
    pub mass_action: bool,
}

impl Default for ThirdBody {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ThirdBody {
    pub fn new(default_efficiency: f64) -> Self {
        Self {
            default_efficiency,
            efficiencies: Composition::new(),
            specified_collision_partner: false,
            mass_action: true,
        }
    }
    /// single named collision partner with efficiency 1 and all others 0
    pub fn specified(species: &str) -> Self {
        let mut tb = Self::new(0.0);
        tb.efficiencies.insert(species.to_string(), 1.0);
        tb.specified_collision_partner = true;
        tb
    }
    /// read "efficiencies" and "default-efficiency" of a reaction node
    pub fn set_efficiencies(&mut self, node: &Document) -> Result<(), ReactionError> {
        self.default_efficiency = get_f64(node, "default-efficiency", 1.0)?;
        if let Some(efficiencies) = get_composition(node, "efficiencies")? {
            self.efficiencies = efficiencies;
        }
        Ok(())
    }

    pub fn efficiency(&self, species: &str) -> f64 {
        self.efficiencies
            .get(species)
            .copied()
            .unwrap_or(self.default_efficiency)
    }
    /// name used in the equation: M or the named partner
    pub fn collision_partner(&self) -> &str {
        if self.specified_collision_partner {
            self.efficiencies
                .keys()
                .next()
                .map_or(GENERIC_THIRD_BODY, String::as_str)
        } else {
            GENERIC_THIRD_BODY
        }
    }

    /// Switch to the generic partner M. Efficiencies given for M are kept; those of a previously
    /// named partner are dropped.
    pub fn set_generic(&mut self) {
        if self.specified_collision_partner {
            let mass_action = self.mass_action;
            *self = Self::new(1.0);
            self.mass_action = mass_action;
        }
    }

    fn write_efficiencies(&self, out: &mut Document) {
        out.insert(
            "efficiencies".to_string(),
            composition_value(&self.efficiencies),
        );
        if self.default_efficiency != 1.0 {
            out.insert(
                "default-efficiency".to_string(),
                Value::from(self.default_efficiency),
            );
        }
    }
}

// remove one unit of the collision partner; a coefficient with integer part 1 removes the species
fn decrement(composition: &mut Composition, species: &str) {
    if let Some(stoich) = composition.get_mut(species) {
        if stoich.trunc() != 1.0 {
            *stoich -= 1.0;
        } else {
            composition.shift_remove(species);
        }
    }
}

/// Reaction with a collision partner M whose concentration multiplies the rate
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThreeBodyReaction {
    pub third_body: ThirdBody,
}

impl ThreeBodyReaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_third_body(third_body: ThirdBody) -> Self {
        Self { third_body }
    }
    /// Find a species present on both sides and use it as the collision partner.
    /// Returns false if there is none.
    pub fn detect_efficiencies(
        &mut self,
        equation: &str,
        reactants: &mut Composition,
        products: &mut Composition,
    ) -> Result<bool, ReactionError> {
        let candidates: Vec<&String> = reactants
            .keys()
            .filter(|species| products.contains_key(*species))
            .collect();
        let partner = match candidates.as_slice() {
            [] => return Ok(false),
            [single] => single.to_string(),
            _ => {
                return Err(ReactionError::AmbiguousCollisionPartner(
                    equation.to_string(),
                ));
            }
        };
        debug!("collision partner '{}' in '{}'", partner, equation);
        decrement(reactants, &partner);
        decrement(products, &partner);
        self.third_body = ThirdBody::specified(&partner);
        Ok(true)
    }
}

impl ReactionVariant for ThreeBodyReaction {
    fn type_name(&self, _rate: Option<&dyn ReactionRate>) -> &'static str {
        "three-body"
    }
    fn third_body(&self) -> Option<&ThirdBody> {
        Some(&self.third_body)
    }
    fn third_body_mut(&mut self) -> Option<&mut ThirdBody> {
        Some(&mut self.third_body)
    }
    fn resolve_equation(
        &mut self,
        equation: &str,
        reactants: &mut Composition,
        products: &mut Composition,
    ) -> Result<(), ReactionError> {
        let generic_on_both_sides = reactants.contains_key(GENERIC_THIRD_BODY)
            && products.contains_key(GENERIC_THIRD_BODY);
        if !generic_on_both_sides {
            if !self.detect_efficiencies(equation, reactants, products)? {
                return Err(ReactionError::MissingThirdBody(equation.to_string()));
            }
            return Ok(());
        }
        reactants.shift_remove(GENERIC_THIRD_BODY);
        products.shift_remove(GENERIC_THIRD_BODY);
        self.third_body.set_generic();
        Ok(())
    }
    fn decorate(&self, side: String) -> String {
        format!("{} + {}", side, self.third_body.collision_partner())
    }
    fn set_parameters(&mut self, node: &Document) -> Result<(), ReactionError> {
        if !self.third_body.specified_collision_partner {
            self.third_body.set_efficiencies(node)?;
        }
        Ok(())
    }
    fn get_parameters(&self, out: &mut Document) {
        if !self.third_body.specified_collision_partner {
            out.insert("type".to_string(), Value::from("three-body"));
            self.third_body.write_efficiencies(out);
        }
    }
    fn accepts_rate(&self, shape: RateShape) -> bool {
        shape == RateShape::MassAction
    }
    fn default_rate(&self) -> Box<dyn ReactionRate> {
        Box::new(ArrheniusRate::new(
            ArrheniusKind::Bulk,
            ArrheniusParams::default(),
        ))
    }
}

/// Pressure dependent reaction with the collision partner in brackets: "A (+M) <=> B (+M)"
#[derive(Debug, Clone, PartialEq)]
pub struct FalloffReaction {
    pub third_body: ThirdBody,
}

impl Default for FalloffReaction {
    fn default() -> Self {
        Self::with_third_body(ThirdBody::default())
    }
}

impl FalloffReaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_third_body(mut third_body: ThirdBody) -> Self {
        third_body.mass_action = false;
        Self { third_body }
    }
}

impl ReactionVariant for FalloffReaction {
    fn type_name(&self, rate: Option<&dyn ReactionRate>) -> &'static str {
        if rate.is_some_and(|r| r.chemically_activated()) {
            "chemically-activated"
        } else {
            "falloff"
        }
    }
    fn third_body(&self) -> Option<&ThirdBody> {
        Some(&self.third_body)
    }
    fn third_body_mut(&mut self) -> Option<&mut ThirdBody> {
        Some(&mut self.third_body)
    }
    fn resolve_equation(
        &mut self,
        equation: &str,
        reactants: &mut Composition,
        products: &mut Composition,
    ) -> Result<(), ReactionError> {
        // the parser gives the bracketed partner the coefficient -1
        let (marker, partner) = reactants
            .iter()
            .filter(|(_, stoich)| **stoich == -1.0)
            .find_map(|(species, _)| {
                falloff_marker_interior(species).map(|p| (species.clone(), p.to_string()))
            })
            .ok_or_else(|| ReactionError::MissingFalloffThirdBody(equation.to_string()))?;
        if !products.contains_key(&marker) {
            return Err(ReactionError::UnmatchedFalloffThirdBody {
                equation: equation.to_string(),
                third_body: partner,
            });
        }
        reactants.shift_remove(&marker);
        products.shift_remove(&marker);
        debug!("falloff collision partner '{}' in '{}'", partner, equation);
        if partner == GENERIC_THIRD_BODY {
            self.third_body.set_generic();
        } else {
            self.third_body = ThirdBody::specified(&partner);
        }
        self.third_body.mass_action = false;
        Ok(())
    }
    fn decorate(&self, side: String) -> String {
        format!("{} {}", side, falloff_marker(self.third_body.collision_partner()))
    }
    fn set_parameters(&mut self, node: &Document) -> Result<(), ReactionError> {
        if !self.third_body.specified_collision_partner {
            self.third_body.set_efficiencies(node)?;
        }
        Ok(())
    }
    fn get_parameters(&self, out: &mut Document) {
        if !self.third_body.specified_collision_partner && !self.third_body.efficiencies.is_empty()
        {
            self.third_body.write_efficiencies(out);
        }
    }
    fn accepts_rate(&self, shape: RateShape) -> bool {
        shape == RateShape::Falloff
    }
    fn default_rate(&self) -> Box<dyn ReactionRate> {
        let zero = ArrheniusParams::default();
        Box::new(FalloffRate::new(zero, zero, None))
    }
}
