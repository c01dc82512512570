//! # Reaction
//!
//! A single chemical reaction: stoichiometry parsed from the equation, flags, explicit reaction
//! orders, the rate coefficient model and the node the reaction was read from.
//!
//! Reactions differ in the way they treat the collision partner, so the variant part lives in
//! [`ReactionKind`] (dispatched with `enum_dispatch`):
//! - `Elementary` - mass action, pressure dependent (PLOG, Chebyshev) and interface reactions
//! - `ThreeBody` - "A + B + M <=> AB + M"
//! - `Falloff` - "A + B (+M) <=> AB (+M)", also chemically activated reactions
//! - `CustomRate` - rate given by a user function
//!
//! ```
//! use KiReaction::Kinetics::kinetics_api::{KineticsMechanism, PhaseData};
//! use KiReaction::Kinetics::reaction_factory::new_reaction;
//! use serde_json::json;
//! let gas = PhaseData::from_formulae("gas", 3, &["H", "O2", "HO2", "AR"]).unwrap();
//! let kin = KineticsMechanism::new(vec![gas]);
//! let node = json!({"equation": "H + O2 + AR <=> HO2 + AR", "rate-constant": [7.0e17, -0.8, 0.0]});
//! let reaction = new_reaction(node.as_object().unwrap(), &kin).unwrap();
//! assert_eq!(reaction.reaction_type(), "three-body");
//! assert_eq!(reaction.equation(), "H + O2 + AR <=> HO2 + AR");
//! ```
use crate::Kinetics::balance;
use crate::Kinetics::kinetics_api::Kinetics;
use crate::Kinetics::rate_units::{UnitStack, calculate_rate_coeff_units};
use crate::Kinetics::rates::{
    ArrheniusKind, ArrheniusParams, ArrheniusRate, CustomRate, RateShape, ReactionRate,
    new_reaction_rate,
};
use crate::Kinetics::reaction_document::{
    Document, composition_value, get_bool, get_composition, get_str, require_str,
};
use crate::Kinetics::reaction_equation::{
    Composition, composition_string, falloff_marker, parse_reaction_equation,
};
use crate::Kinetics::reaction_errors::ReactionError;
use crate::Kinetics::reaction_factory::interface_rate_node;
use crate::Kinetics::third_body::{FalloffReaction, ThirdBody, ThreeBodyReaction};
use enum_dispatch::enum_dispatch;
use log::{debug, warn};
use serde_json::Value;

/// Behaviour that depends on the kind of reaction
#[enum_dispatch]
pub trait ReactionVariant {
    fn type_name(&self, rate: Option<&dyn ReactionRate>) -> &'static str;
    fn third_body(&self) -> Option<&ThirdBody> {
        None
    }
    fn third_body_mut(&mut self) -> Option<&mut ThirdBody> {
        None
    }
    /// Rewrite the freshly parsed stoichiometry, e.g. take out the collision partner
    fn resolve_equation(
        &mut self,
        _equation: &str,
        _reactants: &mut Composition,
        _products: &mut Composition,
    ) -> Result<(), ReactionError> {
        Ok(())
    }
    /// one side of the equation as it is written
    fn decorate(&self, side: String) -> String {
        side
    }
    fn set_parameters(&mut self, _node: &Document) -> Result<(), ReactionError> {
        Ok(())
    }
    fn get_parameters(&self, _out: &mut Document) {}
    fn accepts_rate(&self, shape: RateShape) -> bool;
    /// rate model of a reaction created without parameters
    fn default_rate(&self) -> Box<dyn ReactionRate>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementaryReaction;

impl ReactionVariant for ElementaryReaction {
    fn type_name(&self, _rate: Option<&dyn ReactionRate>) -> &'static str {
        "elementary"
    }
    fn accepts_rate(&self, shape: RateShape) -> bool {
        matches!(
            shape,
            RateShape::MassAction | RateShape::PressureDependent | RateShape::Interface
        )
    }
    fn default_rate(&self) -> Box<dyn ReactionRate> {
        Box::new(ArrheniusRate::new(
            ArrheniusKind::Bulk,
            ArrheniusParams::default(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomRateReaction;

impl ReactionVariant for CustomRateReaction {
    fn type_name(&self, _rate: Option<&dyn ReactionRate>) -> &'static str {
        "custom-rate-function"
    }
    fn accepts_rate(&self, shape: RateShape) -> bool {
        shape == RateShape::Custom
    }
    fn default_rate(&self) -> Box<dyn ReactionRate> {
        Box::new(CustomRate::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(ReactionVariant)]
pub enum ReactionKind {
    Elementary(ElementaryReaction),
    ThreeBody(ThreeBodyReaction),
    Falloff(FalloffReaction),
    CustomRate(CustomRateReaction),
}

impl ReactionKind {
    /// kind of reaction for a node "type"
    pub fn from_type_name(type_name: &str) -> Result<Self, ReactionError> {
        let kind = match type_name {
            "elementary"
            | "reaction"
            | "Arrhenius"
            | "pressure-dependent-Arrhenius"
            | "Chebyshev"
            | "interface-Arrhenius"
            | "sticking-Arrhenius" => ElementaryReaction.into(),
            "three-body" => ThreeBodyReaction::new().into(),
            "falloff" | "chemically-activated" => FalloffReaction::new().into(),
            "custom-rate-function" => CustomRateReaction.into(),
            other => return Err(ReactionError::UnknownReactionType(other.to_string())),
        };
        Ok(kind)
    }
}

#[derive(Debug)]
pub struct Reaction {
    pub reactants: Composition,
    pub products: Composition,
    pub reversible: bool,
    /// an intentional duplicate of another reaction of the mechanism
    pub duplicate: bool,
    /// explicit reaction orders {species: order}
    pub orders: Composition,
    pub allow_nonreactant_orders: bool,
    pub allow_negative_orders: bool,
    pub id: String,
    /// node the reaction was created from
    pub input: Document,
    valid: bool,
    rate: Box<dyn ReactionRate>,
    kind: ReactionKind,
}

impl Reaction {
    /// empty reaction with the default rate model of its kind
    pub fn new(kind: ReactionKind) -> Self {
        Self {
            reactants: Composition::new(),
            products: Composition::new(),
            reversible: true,
            duplicate: false,
            orders: Composition::new(),
            allow_nonreactant_orders: false,
            allow_negative_orders: false,
            id: String::new(),
            input: Document::new(),
            valid: true,
            rate: kind.default_rate(),
            kind,
        }
    }
    /// reaction from resolved stoichiometry, i.e. without collision partner in the compositions
    pub fn from_composition(
        kind: ReactionKind,
        reactants: Composition,
        products: Composition,
        rate: Box<dyn ReactionRate>,
    ) -> Result<Self, ReactionError> {
        let mut reaction = Self::new(kind);
        reaction.reactants = reactants;
        reaction.products = products;
        reaction.set_rate(rate)?;
        Ok(reaction)
    }
    /// Reaction read from a node: equation, orders, flags, third body efficiencies and the rate
    /// model with units derived from the mechanism.
    pub fn from_node(
        node: &Document,
        kin: &dyn Kinetics,
        kind: ReactionKind,
    ) -> Result<Self, ReactionError> {
        let mut reaction = Self::new(kind);
        reaction.set_parameters(node, kin)?;
        let units = if kin.n_phases() > 0 {
            reaction.calculate_rate_coeff_units(kin)?
        } else {
            UnitStack::empty()
        };
        let surface = kin.n_phases() > 0 && kin.thermo(kin.reaction_phase_index()).n_dim() != 3;
        let rate = if surface && matches!(reaction.kind, ReactionKind::Elementary(_)) {
            new_reaction_rate(&interface_rate_node(node)?, units)?
        } else {
            new_reaction_rate(node, units)?
        };
        reaction.set_rate(rate)?;
        reaction.check()?;
        debug!(
            "created {} reaction '{}'",
            reaction.reaction_type(),
            reaction.equation()
        );
        Ok(reaction)
    }

    pub fn kind(&self) -> &ReactionKind {
        &self.kind
    }

    pub fn rate(&self) -> &dyn ReactionRate {
        self.rate.as_ref()
    }
    /// Attach a rate model. Rates that cannot describe this kind of reaction are rejected.
    pub fn set_rate(&mut self, rate: Box<dyn ReactionRate>) -> Result<(), ReactionError> {
        if !self.kind.accepts_rate(rate.shape()) {
            return Err(ReactionError::IncompatibleRate {
                reaction_type: self.kind.type_name(None).to_string(),
                rate_type: rate.rate_type().to_string(),
            });
        }
        let generic_marker = falloff_marker("M");
        if rate.strips_falloff_marker() && self.reactants.contains_key(&generic_marker) {
            warn!(
                "Specifying '(+M)' in the reaction equation for Chebyshev reactions is deprecated: '{}'",
                self.equation()
            );
            self.reactants.shift_remove(&generic_marker);
            self.products.shift_remove(&generic_marker);
        }
        if rate.forbids_generic_third_body() && self.reactants.contains_key("M") {
            return Err(ReactionError::SuperfluousThirdBody(self.equation()));
        }
        self.rate = rate;
        Ok(())
    }
    /// "elementary", "three-body", "falloff", "chemically-activated" or "custom-rate-function"
    pub fn reaction_type(&self) -> &'static str {
        self.kind.type_name(Some(self.rate.as_ref()))
    }

    pub fn third_body(&self) -> Option<&ThirdBody> {
        self.kind.third_body()
    }

    pub fn third_body_mut(&mut self) -> Option<&mut ThirdBody> {
        self.kind.third_body_mut()
    }
    /// false if some species is missing from the mechanism
    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }
    /// Replace the stoichiometry with the one given by `equation`.
    pub fn set_equation(
        &mut self,
        equation: &str,
        kin: Option<&dyn Kinetics>,
    ) -> Result<(), ReactionError> {
        let parsed = parse_reaction_equation(equation, kin)?;
        self.reactants = parsed.reactants;
        self.products = parsed.products;
        self.reversible = parsed.reversible;
        self.valid = parsed.valid;
        self.kind
            .resolve_equation(equation, &mut self.reactants, &mut self.products)
    }

    pub fn set_parameters(
        &mut self,
        node: &Document,
        kin: &dyn Kinetics,
    ) -> Result<(), ReactionError> {
        if node.is_empty() {
            return Ok(());
        }
        self.input = node.clone();
        self.set_equation(require_str(node, "equation")?, Some(kin))?;
        if let Some(orders) = get_composition(node, "orders")? {
            for (species, order) in orders {
                if kin.kinetics_species_index(&species).is_none() {
                    self.valid = false;
                }
                self.orders.insert(species, order);
            }
        }
        self.id = get_str(node, "id")?.unwrap_or_default().to_string();
        self.duplicate = get_bool(node, "duplicate", false)?;
        self.allow_negative_orders = get_bool(node, "negative-orders", false)?;
        self.allow_nonreactant_orders = get_bool(node, "nonreactant-orders", false)?;
        self.kind.set_parameters(node)
    }
    /// Validate reaction orders and the rate model.
    pub fn check(&self) -> Result<(), ReactionError> {
        if !self.allow_nonreactant_orders {
            if let Some(species) = self
                .orders
                .keys()
                .find(|s| !self.reactants.contains_key(*s))
            {
                return Err(ReactionError::NonReactantOrder {
                    equation: self.equation(),
                    species: species.clone(),
                });
            }
        }
        if !self.allow_negative_orders {
            if let Some((species, _)) = self.orders.iter().find(|(_, order)| **order < 0.0) {
                return Err(ReactionError::NegativeOrder {
                    equation: self.equation(),
                    species: species.clone(),
                });
            }
        }
        // reverse rate from thermochemistry holds for mass action kinetics only
        if self.reversible && !self.orders.is_empty() {
            return Err(ReactionError::OrdersOnReversible(self.equation()));
        }
        self.rate.check(&self.equation(), &self.input)
    }

    pub fn reactant_string(&self) -> String {
        self.kind.decorate(composition_string(&self.reactants))
    }

    pub fn product_string(&self) -> String {
        self.kind.decorate(composition_string(&self.products))
    }

    pub fn equation(&self) -> String {
        let arrow = if self.reversible { "<=>" } else { "=>" };
        format!("{} {} {}", self.reactant_string(), arrow, self.product_string())
    }
    /// Parameters needed to recreate the reaction. With `with_input` the node the reaction was
    /// read from is laid over them, so that fields unknown to the reaction are kept.
    pub fn parameters(&self, with_input: bool) -> Document {
        let mut out = Document::new();
        self.get_parameters(&mut out);
        if with_input {
            for (key, value) in &self.input {
                out.insert(key.clone(), value.clone());
            }
        }
        arrange_keys(out)
    }

    pub fn get_parameters(&self, out: &mut Document) {
        out.insert("equation".to_string(), Value::from(self.equation()));
        if self.duplicate {
            out.insert("duplicate".to_string(), Value::Bool(true));
        }
        if !self.orders.is_empty() {
            out.insert("orders".to_string(), composition_value(&self.orders));
        }
        if self.allow_negative_orders {
            out.insert("negative-orders".to_string(), Value::Bool(true));
        }
        if self.allow_nonreactant_orders {
            out.insert("nonreactant-orders".to_string(), Value::Bool(true));
        }
        for (key, value) in self.rate.parameters() {
            // Arrhenius is the default rate and is not written
            let implicit_type =
                key == "type" && value.as_str().is_some_and(|t| t.starts_with("Arrhenius"));
            if !implicit_type {
                out.insert(key, value);
            }
        }
        self.kind.get_parameters(out);
    }

    pub fn calculate_rate_coeff_units(
        &self,
        kin: &dyn Kinetics,
    ) -> Result<UnitStack, ReactionError> {
        calculate_rate_coeff_units(self, kin)
    }

    pub fn check_balance(&self, kin: &dyn Kinetics) -> Result<(), ReactionError> {
        balance::check_balance(self, kin)
    }
    /// true if all species are declared and the reaction is balanced; false if the reaction
    /// should be skipped
    pub fn check_species(&self, kin: &dyn Kinetics) -> Result<bool, ReactionError> {
        balance::check_species(self, kin)
    }

    pub fn undeclared_third_bodies(&self, kin: &dyn Kinetics) -> (Vec<String>, bool) {
        balance::undeclared_third_bodies(self, kin)
    }

    pub fn uses_electrochemistry(&self, kin: &dyn Kinetics) -> Result<bool, ReactionError> {
        balance::uses_electrochemistry(self, kin)
    }
}

const HEAD_KEYS: [&str; 2] = ["type", "equation"];
const TAIL_KEYS: [&str; 4] = ["duplicate", "orders", "negative-orders", "nonreactant-orders"];

// type and equation first, flags and orders last
fn arrange_keys(out: Document) -> Document {
    let mut arranged = Document::new();
    for key in HEAD_KEYS {
        if let Some(value) = out.get(key) {
            arranged.insert(key.to_string(), value.clone());
        }
    }
    let mut tail = Vec::new();
    for key in TAIL_KEYS {
        if let Some(value) = out.get(key) {
            tail.push((key.to_string(), value.clone()));
        }
    }
    for (key, value) in out {
        if !HEAD_KEYS.contains(&key.as_str()) && !TAIL_KEYS.contains(&key.as_str()) {
            arranged.insert(key, value);
        }
    }
    arranged.extend(tail);
    arranged
}
