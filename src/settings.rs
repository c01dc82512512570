//! # Settings Module
//!
//! ## Purpose
//! Policy of a kinetics mechanism towards reactions that refer to species it does not declare.
//! Mechanisms are often assembled from a bigger reaction set than the set of species of interest,
//! so such reactions may be dropped silently instead of stopping the loading.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "skip_undeclared_species": true,
//!   "skip_undeclared_third_bodies": false
//! }
//! ```
//!
//! ## Usage Pattern
//! ```rust
//! use KiReaction::settings::KineticsSettings;
//!
//! let settings = KineticsSettings::from_json(r#"{"skip_undeclared_species": true}"#).unwrap();
//! assert!(settings.skip_undeclared_species);
//! assert!(!settings.skip_undeclared_third_bodies);
//! ```
use crate::Kinetics::reaction_errors::ReactionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Handling of undeclared species while loading reactions.
///
/// # Fields
/// * `skip_undeclared_species` - drop reactions with undeclared reactants, products or species
///   with explicit orders instead of raising an error
/// * `skip_undeclared_third_bodies` - ignore efficiencies given for undeclared species
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KineticsSettings {
    pub skip_undeclared_species: bool,
    pub skip_undeclared_third_bodies: bool,
}

impl KineticsSettings {
    pub fn new(skip_undeclared_species: bool, skip_undeclared_third_bodies: bool) -> Self {
        Self {
            skip_undeclared_species,
            skip_undeclared_third_bodies,
        }
    }

    pub fn from_value(value: Value) -> Result<Self, ReactionError> {
        serde_json::from_value(value).map_err(|e| ReactionError::Settings(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ReactionError> {
        serde_json::from_str(json).map_err(|e| ReactionError::Settings(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ReactionError> {
        serde_json::to_string_pretty(self).map_err(|e| ReactionError::Settings(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = KineticsSettings::default();
        assert!(!settings.skip_undeclared_species);
        assert!(!settings.skip_undeclared_third_bodies);
        assert_eq!(KineticsSettings::from_json("{}").unwrap(), settings);
    }

    #[test]
    fn test_from_value() {
        let settings = KineticsSettings::from_value(json!({
            "skip_undeclared_species": true,
            "skip_undeclared_third_bodies": true
        }))
        .unwrap();
        assert_eq!(settings, KineticsSettings::new(true, true));
        let json = settings.to_json().unwrap();
        assert_eq!(KineticsSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            KineticsSettings::from_value(json!({"skip_undeclared_species": "yes"})),
            Err(ReactionError::Settings(_))
        ));
        assert!(KineticsSettings::from_json(r#"{"skip_everything": true}"#).is_err());
        assert!(KineticsSettings::from_json("not json").is_err());
    }
}
