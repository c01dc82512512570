//v 0.1.0
//! # Rate coefficient models attached to reactions
//!
//! Only the parameters of rate models live here: they are read from a reaction node, checked
//! against the reaction equation and written back. Units of the rate coefficient are supplied
//! by the reaction ([`crate::Kinetics::rate_units`]) when the model is created.
//!
//! | type | model | node fields |
//! |------|-------|-------------|
//! | `Arrhenius` (reaction types `elementary`, `three-body`) | A*T^b*exp(-Ea/RT) | `rate-constant` |
//! | `interface-Arrhenius` | same, on a surface | `rate-constant` |
//! | `sticking-Arrhenius` | sticking probability | `sticking-coefficient` |
//! | `falloff`, `chemically-activated` | Lindemann or Troe blending | `low-P-rate-constant`, `high-P-rate-constant`, `Troe` |
//! | `pressure-dependent-Arrhenius` | interpolation between pressures | `rate-constants` |
//! | `Chebyshev` | Chebyshev polynomials in T and P | `temperature-range`, `pressure-range`, `data` |
//! | `custom-rate-function` | user function | none |
//!
//! Arrhenius parameters may be given as a map {"A": .., "b": .., "Ea": ..} or as a list [A, b, Ea].
use crate::Kinetics::rate_units::{UnitStack, Units};
use crate::Kinetics::reaction_document::{Document, get_bool, invalid_field, missing_field};
use crate::Kinetics::reaction_errors::ReactionError;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Which kind of reaction a rate model can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateShape {
    /// bulk mass action kinetics
    MassAction,
    /// explicit pressure dependence (no third body)
    PressureDependent,
    Falloff,
    Interface,
    Custom,
}

/// Rate coefficient model as seen by a reaction.
/// Capability queries replace inspection of concrete rate types by the reaction.
pub trait ReactionRate: fmt::Debug {
    fn rate_type(&self) -> &str;
    fn shape(&self) -> RateShape;
    fn parameters(&self) -> Document;
    /// validate parameters against the reaction they belong to
    fn check(&self, equation: &str, input: &Document) -> Result<(), ReactionError>;
    fn rate_units(&self) -> &UnitStack;
    /// "(+M)" in the equation is an optional decoration to be removed
    fn strips_falloff_marker(&self) -> bool {
        false
    }
    /// a generic third body "M" must not be present in the equation
    fn forbids_generic_third_body(&self) -> bool {
        false
    }
    fn chemically_activated(&self) -> bool {
        false
    }
}

/// parameters of the modified Arrhenius expression k = A*T^b*exp(-Ea/RT)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArrheniusParams {
    #[serde(rename = "A")]
    pub a: f64,
    pub b: f64,
    #[serde(rename = "Ea")]
    pub ea: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArrheniusInput {
    Map(ArrheniusParams),
    List([f64; 3]),
}

impl ArrheniusParams {
    pub fn new(a: f64, b: f64, ea: f64) -> Self {
        Self { a, b, ea }
    }

    fn from_value(node: &Document, field: &str, value: &Value) -> Result<Self, ReactionError> {
        match serde_json::from_value::<ArrheniusInput>(value.clone()) {
            Ok(ArrheniusInput::Map(params)) => Ok(params),
            Ok(ArrheniusInput::List([a, b, ea])) => Ok(Self { a, b, ea }),
            Err(_) => Err(invalid_field(
                node,
                field,
                "expected {A, b, Ea} or [A, b, Ea] with numeric values",
            )),
        }
    }

    fn from_field(node: &Document, field: &str) -> Result<Self, ReactionError> {
        let value = node.get(field).ok_or_else(|| missing_field(node, field))?;
        Self::from_value(node, field, value)
    }

    fn to_value(self) -> Value {
        json!({"A": self.a, "b": self.b, "Ea": self.ea})
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrheniusKind {
    Bulk,
    Interface,
    Sticking,
}

impl ArrheniusKind {
    fn type_name(self) -> &'static str {
        match self {
            ArrheniusKind::Bulk => "Arrhenius",
            ArrheniusKind::Interface => "interface-Arrhenius",
            ArrheniusKind::Sticking => "sticking-Arrhenius",
        }
    }
    fn field(self) -> &'static str {
        match self {
            ArrheniusKind::Sticking => "sticking-coefficient",
            _ => "rate-constant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrheniusRate {
    pub kind: ArrheniusKind,
    pub params: ArrheniusParams,
    /// negative pre-exponential factor is declared on purpose
    pub allow_negative_a: bool,
    units: UnitStack,
}

impl ArrheniusRate {
    pub fn new(kind: ArrheniusKind, params: ArrheniusParams) -> Self {
        Self {
            kind,
            params,
            allow_negative_a: false,
            units: UnitStack::empty(),
        }
    }

    pub fn from_node(
        kind: ArrheniusKind,
        node: &Document,
        units: UnitStack,
    ) -> Result<Self, ReactionError> {
        Ok(Self {
            kind,
            params: ArrheniusParams::from_field(node, kind.field())?,
            allow_negative_a: get_bool(node, "negative-A", false)?,
            units,
        })
    }
    /// units of A
    pub fn pre_exponential_units(&self) -> Units {
        self.units.product()
    }
}

impl ReactionRate for ArrheniusRate {
    fn rate_type(&self) -> &str {
        self.kind.type_name()
    }
    fn shape(&self) -> RateShape {
        match self.kind {
            ArrheniusKind::Bulk => RateShape::MassAction,
            _ => RateShape::Interface,
        }
    }
    fn parameters(&self) -> Document {
        let mut out = Document::new();
        out.insert("type".to_string(), Value::from(self.rate_type()));
        out.insert(self.kind.field().to_string(), self.params.to_value());
        if self.allow_negative_a {
            out.insert("negative-A".to_string(), Value::Bool(true));
        }
        out
    }
    fn check(&self, equation: &str, _input: &Document) -> Result<(), ReactionError> {
        if self.params.a < 0.0 && !self.allow_negative_a {
            return Err(ReactionError::RateCheck {
                equation: equation.to_string(),
                reason: "Undeclared negative pre-exponential factor found".to_string(),
            });
        }
        Ok(())
    }
    fn rate_units(&self) -> &UnitStack {
        &self.units
    }
}

/// Lindemann falloff, or Troe falloff when the Troe parameters [A, T3, T1, (T2)] are given
#[derive(Debug, Clone, PartialEq)]
pub struct FalloffRate {
    pub low_rate: ArrheniusParams,
    pub high_rate: ArrheniusParams,
    pub troe: Option<Vec<f64>>,
    pub chemically_activated: bool,
    pub allow_negative_a: bool,
    units: UnitStack,
}

const TROE_KEYS: [&str; 4] = ["A", "T3", "T1", "T2"];

fn troe_from_value(node: &Document, value: &Value) -> Result<Vec<f64>, ReactionError> {
    let bad = || invalid_field(node, "Troe", "expected {A, T3, T1, T2} or a list of numbers");
    match value {
        Value::Array(items) => items.iter().map(|v| v.as_f64().ok_or_else(bad)).collect(),
        Value::Object(map) => {
            let mut coeffs = Vec::new();
            for key in TROE_KEYS {
                match map.get(key) {
                    Some(v) => coeffs.push(v.as_f64().ok_or_else(bad)?),
                    None => break,
                }
            }
            Ok(coeffs)
        }
        _ => Err(bad()),
    }
}

impl FalloffRate {
    pub fn new(
        low_rate: ArrheniusParams,
        high_rate: ArrheniusParams,
        troe: Option<Vec<f64>>,
    ) -> Self {
        Self {
            low_rate,
            high_rate,
            troe,
            chemically_activated: false,
            allow_negative_a: false,
            units: UnitStack::empty(),
        }
    }

    pub fn from_node(node: &Document, units: UnitStack) -> Result<Self, ReactionError> {
        let troe = match node.get("Troe") {
            Some(value) => Some(troe_from_value(node, value)?),
            None => None,
        };
        Ok(Self {
            low_rate: ArrheniusParams::from_field(node, "low-P-rate-constant")?,
            high_rate: ArrheniusParams::from_field(node, "high-P-rate-constant")?,
            troe,
            chemically_activated: node.get("type").and_then(Value::as_str)
                == Some("chemically-activated"),
            allow_negative_a: get_bool(node, "negative-A", false)?,
            units,
        })
    }
    /// Units of the low pressure limit. The high pressure limit has one concentration factor more.
    pub fn low_rate_units(&self) -> Units {
        let mut units = self.units.clone();
        if self.chemically_activated {
            units.join(1.0);
        }
        units.product()
    }

    pub fn high_rate_units(&self) -> Units {
        let mut units = self.units.clone();
        units.join(if self.chemically_activated { 2.0 } else { 1.0 });
        units.product()
    }
}

impl ReactionRate for FalloffRate {
    fn rate_type(&self) -> &str {
        if self.troe.is_some() { "Troe" } else { "Lindemann" }
    }
    fn shape(&self) -> RateShape {
        RateShape::Falloff
    }
    fn parameters(&self) -> Document {
        let mut out = Document::new();
        let type_name = if self.chemically_activated {
            "chemically-activated"
        } else {
            "falloff"
        };
        out.insert("type".to_string(), Value::from(type_name));
        out.insert("low-P-rate-constant".to_string(), self.low_rate.to_value());
        out.insert("high-P-rate-constant".to_string(), self.high_rate.to_value());
        if let Some(troe) = &self.troe {
            let coeffs: serde_json::Map<String, Value> = TROE_KEYS
                .iter()
                .zip(troe.iter())
                .map(|(k, v)| (k.to_string(), Value::from(*v)))
                .collect();
            out.insert("Troe".to_string(), Value::Object(coeffs));
        }
        if self.allow_negative_a {
            out.insert("negative-A".to_string(), Value::Bool(true));
        }
        out
    }
    fn check(&self, equation: &str, _input: &Document) -> Result<(), ReactionError> {
        let fail = |reason: String| ReactionError::RateCheck {
            equation: equation.to_string(),
            reason,
        };
        if self.low_rate.a * self.high_rate.a < 0.0 {
            return Err(fail(
                "Inconsistent signs of low and high pressure pre-exponential factors".to_string(),
            ));
        }
        if !self.allow_negative_a && (self.low_rate.a < 0.0 || self.high_rate.a < 0.0) {
            return Err(fail(
                "Undeclared negative pre-exponential factor found".to_string(),
            ));
        }
        if let Some(troe) = &self.troe {
            if troe.len() != 3 && troe.len() != 4 {
                return Err(fail(format!(
                    "Troe falloff needs 3 or 4 parameters, got {}",
                    troe.len()
                )));
            }
        }
        Ok(())
    }
    fn rate_units(&self) -> &UnitStack {
        &self.units
    }
    fn chemically_activated(&self) -> bool {
        self.chemically_activated
    }
}

/// Arrhenius expressions given at a set of pressures ("PLOG")
#[derive(Debug, Clone, PartialEq)]
pub struct PlogRate {
    /// (pressure as given in the node, rate at that pressure)
    pub rates: Vec<(Value, ArrheniusParams)>,
    units: UnitStack,
}

impl PlogRate {
    pub fn from_node(node: &Document, units: UnitStack) -> Result<Self, ReactionError> {
        let field = "rate-constants";
        let items = node
            .get(field)
            .ok_or_else(|| missing_field(node, field))?
            .as_array()
            .ok_or_else(|| invalid_field(node, field, "expected a list of rate constants"))?;
        let mut rates = Vec::with_capacity(items.len());
        for item in items {
            let pressure = item
                .get("P")
                .cloned()
                .ok_or_else(|| invalid_field(node, field, "rate constant without pressure 'P'"))?;
            rates.push((pressure, ArrheniusParams::from_value(node, field, item)?));
        }
        Ok(Self { rates, units })
    }
}

impl ReactionRate for PlogRate {
    fn rate_type(&self) -> &str {
        "pressure-dependent-Arrhenius"
    }
    fn shape(&self) -> RateShape {
        RateShape::PressureDependent
    }
    fn parameters(&self) -> Document {
        let rates: Vec<Value> = self
            .rates
            .iter()
            .map(|(p, k)| json!({"P": p, "A": k.a, "b": k.b, "Ea": k.ea}))
            .collect();
        let mut out = Document::new();
        out.insert("type".to_string(), Value::from(self.rate_type()));
        out.insert("rate-constants".to_string(), Value::Array(rates));
        out
    }
    fn check(&self, equation: &str, _input: &Document) -> Result<(), ReactionError> {
        if self.rates.is_empty() {
            return Err(ReactionError::RateCheck {
                equation: equation.to_string(),
                reason: "no rate constants given for pressure-dependent-Arrhenius rate"
                    .to_string(),
            });
        }
        Ok(())
    }
    fn rate_units(&self) -> &UnitStack {
        &self.units
    }
    fn forbids_generic_third_body(&self) -> bool {
        true
    }
}

/// rows - temperature polynomials, columns - pressure polynomials
#[derive(Debug, Clone, PartialEq)]
pub struct ChebyshevRate {
    pub temperature_range: (f64, f64),
    pub pressure_range: (Value, Value),
    pub coeffs: DMatrix<f64>,
    units: UnitStack,
}

impl ChebyshevRate {
    pub fn from_node(node: &Document, units: UnitStack) -> Result<Self, ReactionError> {
        let t_range = node
            .get("temperature-range")
            .ok_or_else(|| missing_field(node, "temperature-range"))?;
        let temperature_range = match serde_json::from_value::<[f64; 2]>(t_range.clone()) {
            Ok([t_min, t_max]) => (t_min, t_max),
            Err(_) => {
                return Err(invalid_field(
                    node,
                    "temperature-range",
                    "expected [Tmin, Tmax]",
                ));
            }
        };
        let pressure_range = match node.get("pressure-range") {
            Some(Value::Array(p)) if p.len() == 2 => (p[0].clone(), p[1].clone()),
            Some(_) => {
                return Err(invalid_field(
                    node,
                    "pressure-range",
                    "expected [Pmin, Pmax]",
                ));
            }
            None => return Err(missing_field(node, "pressure-range")),
        };
        let data = node.get("data").ok_or_else(|| missing_field(node, "data"))?;
        let rows: Vec<Vec<f64>> = serde_json::from_value(data.clone())
            .map_err(|_| invalid_field(node, "data", "expected a matrix of numbers"))?;
        let n_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != n_cols) {
            return Err(invalid_field(node, "data", "rows have different lengths"));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Ok(Self {
            temperature_range,
            pressure_range,
            coeffs: DMatrix::from_row_slice(rows.len(), n_cols, &flat),
            units,
        })
    }
}

impl ReactionRate for ChebyshevRate {
    fn rate_type(&self) -> &str {
        "Chebyshev"
    }
    fn shape(&self) -> RateShape {
        RateShape::PressureDependent
    }
    fn parameters(&self) -> Document {
        let data: Vec<Vec<f64>> = self
            .coeffs
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect();
        let mut out = Document::new();
        out.insert("type".to_string(), Value::from(self.rate_type()));
        out.insert(
            "temperature-range".to_string(),
            json!([self.temperature_range.0, self.temperature_range.1]),
        );
        out.insert(
            "pressure-range".to_string(),
            json!([self.pressure_range.0, self.pressure_range.1]),
        );
        out.insert("data".to_string(), json!(data));
        out
    }
    fn check(&self, equation: &str, _input: &Document) -> Result<(), ReactionError> {
        let fail = |reason: &str| ReactionError::RateCheck {
            equation: equation.to_string(),
            reason: reason.to_string(),
        };
        if self.coeffs.is_empty() {
            return Err(fail("Chebyshev rate without coefficients"));
        }
        if self.temperature_range.0 >= self.temperature_range.1 {
            return Err(fail("Chebyshev temperature range must be increasing"));
        }
        Ok(())
    }
    fn rate_units(&self) -> &UnitStack {
        &self.units
    }
    fn strips_falloff_marker(&self) -> bool {
        true
    }
}

/// rate given by an external function; nothing to store
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomRate {
    units: UnitStack,
}

impl ReactionRate for CustomRate {
    fn rate_type(&self) -> &str {
        "custom-rate-function"
    }
    fn shape(&self) -> RateShape {
        RateShape::Custom
    }
    fn parameters(&self) -> Document {
        let mut out = Document::new();
        out.insert("type".to_string(), Value::from(self.rate_type()));
        out
    }
    fn check(&self, _equation: &str, _input: &Document) -> Result<(), ReactionError> {
        Ok(())
    }
    fn rate_units(&self) -> &UnitStack {
        &self.units
    }
}

/// rate model name for a node "type": reaction types with an Arrhenius rate map to "Arrhenius"
pub fn rate_type_of(node: &Document) -> &str {
    match node.get("type").and_then(Value::as_str) {
        None | Some("elementary") | Some("reaction") | Some("three-body") => "Arrhenius",
        Some(other) => other,
    }
}

/// Build the rate model described by a reaction node. `units` are the rate coefficient units
/// calculated for the reaction.
pub fn new_reaction_rate(
    node: &Document,
    units: UnitStack,
) -> Result<Box<dyn ReactionRate>, ReactionError> {
    let rate: Box<dyn ReactionRate> = match rate_type_of(node) {
        "Arrhenius" => Box::new(ArrheniusRate::from_node(ArrheniusKind::Bulk, node, units)?),
        "interface-Arrhenius" => Box::new(ArrheniusRate::from_node(
            ArrheniusKind::Interface,
            node,
            units,
        )?),
        "sticking-Arrhenius" => Box::new(ArrheniusRate::from_node(
            ArrheniusKind::Sticking,
            node,
            units,
        )?),
        "falloff" | "chemically-activated" => Box::new(FalloffRate::from_node(node, units)?),
        "pressure-dependent-Arrhenius" => Box::new(PlogRate::from_node(node, units)?),
        "Chebyshev" => Box::new(ChebyshevRate::from_node(node, units)?),
        "custom-rate-function" => Box::new(CustomRate { units }),
        other => return Err(ReactionError::UnknownRateType(other.to_string())),
    };
    Ok(rate)
}

/// Parameterless rate model for a reaction created without a node.
pub fn default_rate(type_name: &str) -> Result<Box<dyn ReactionRate>, ReactionError> {
    let zero = ArrheniusParams::default();
    let rate: Box<dyn ReactionRate> = match type_name {
        "elementary" | "three-body" | "Arrhenius" => {
            Box::new(ArrheniusRate::new(ArrheniusKind::Bulk, zero))
        }
        "interface-Arrhenius" => Box::new(ArrheniusRate::new(ArrheniusKind::Interface, zero)),
        "sticking-Arrhenius" => Box::new(ArrheniusRate::new(ArrheniusKind::Sticking, zero)),
        "falloff" => Box::new(FalloffRate::new(zero, zero, None)),
        "chemically-activated" => {
            let mut rate = FalloffRate::new(zero, zero, None);
            rate.chemically_activated = true;
            Box::new(rate)
        }
        "pressure-dependent-Arrhenius" => Box::new(PlogRate {
            rates: Vec::new(),
            units: UnitStack::empty(),
        }),
        "Chebyshev" => Box::new(ChebyshevRate {
            temperature_range: (290.0, 3000.0),
            pressure_range: (Value::from(0.001), Value::from(100.0)),
            coeffs: DMatrix::zeros(0, 0),
            units: UnitStack::empty(),
        }),
        "custom-rate-function" => Box::new(CustomRate::default()),
        other => return Err(ReactionError::UnknownRateType(other.to_string())),
    };
    Ok(rate)
}
