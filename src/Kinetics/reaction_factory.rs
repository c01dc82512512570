//! # Creating reactions from reaction nodes
//!
//! A node without an explicit "type" is classified from its equation:
//! - in a bulk phase, an equation with one species on both sides (the collision partner), integer
//!   coefficients and three molecules on one side is a three-body reaction, e.g.
//!   "2 O + AR <=> O2 + AR"; anything else is elementary
//! - on a surface the rate model is "interface-Arrhenius" if the node has "rate-constant" and
//!   "sticking-Arrhenius" if it has "sticking-coefficient"
//!
//! [`get_reactions`] loads a list of nodes, dropping reactions with undeclared species when the
//! mechanism is configured to skip them.
use crate::Kinetics::kinetics_api::Kinetics;
use crate::Kinetics::rates::default_rate;
use crate::Kinetics::reaction::{ElementaryReaction, Reaction, ReactionKind};
use crate::Kinetics::reaction_document::{Document, equation_of, get_str, require_str};
use crate::Kinetics::reaction_errors::ReactionError;
use log::{debug, info};
use serde_json::Value;

/// Three-body reaction written with an explicit collision partner instead of M.
pub fn is_three_body(reaction: &Reaction) -> bool {
    let is_integer = |x: f64| x.trunc() == x;
    // collision partner candidates: integer coefficients on both sides
    let found = reaction
        .reactants
        .iter()
        .filter(|(species, stoich)| {
            reaction
                .products
                .get(*species)
                .is_some_and(|prod| is_integer(**stoich) && is_integer(*prod))
        })
        .count();
    if found != 1 {
        return false;
    }
    if !reaction.reactants.values().all(|x| is_integer(*x))
        || !reaction.products.values().all(|x| is_integer(*x))
    {
        return false;
    }
    let nreac: f64 = reaction.reactants.values().sum();
    let nprod: f64 = reaction.products.values().sum();
    nreac == 3.0 || nprod == 3.0
}

/// Kind of reaction described by a node.
pub fn classify(node: &Document, kin: &dyn Kinetics) -> Result<ReactionKind, ReactionError> {
    if let Some(type_name) = get_str(node, "type")? {
        return ReactionKind::from_type_name(type_name);
    }
    if kin.n_phases() > 0 && kin.thermo(kin.reaction_phase_index()).n_dim() == 3 {
        let mut trial = Reaction::new(ElementaryReaction.into());
        trial.set_equation(require_str(node, "equation")?, Some(kin))?;
        if is_three_body(&trial) {
            debug!("'{}' is a three-body reaction", equation_of(node));
            return ReactionKind::from_type_name("three-body");
        }
    }
    Ok(ElementaryReaction.into())
}

/// Rate node of an elementary surface reaction with the interface rate type filled in.
pub fn interface_rate_node(node: &Document) -> Result<Document, ReactionError> {
    let mut rate_node = node.clone();
    let type_name = match get_str(node, "type")? {
        None | Some("elementary") => "Arrhenius",
        Some(other) => other,
    };
    let prefix = if node.contains_key("rate-constant") {
        "interface-"
    } else if node.contains_key("sticking-coefficient") {
        "sticking-"
    } else {
        return Err(ReactionError::UninferableInterfaceType(
            equation_of(node).to_string(),
        ));
    };
    let rate_type = if type_name.starts_with(prefix) {
        type_name.to_string()
    } else {
        format!("{}{}", prefix, type_name)
    };
    rate_node.insert("type".to_string(), Value::from(rate_type));
    Ok(rate_node)
}

/// Reaction of the kind given by the node "type" or inferred from the equation.
pub fn new_reaction(node: &Document, kin: &dyn Kinetics) -> Result<Reaction, ReactionError> {
    let kind = classify(node, kin)?;
    Reaction::from_node(node, kin, kind)
}

/// Empty reaction of the given type, e.g. "three-body" or "Chebyshev".
pub fn new_reaction_of_type(type_name: &str) -> Result<Reaction, ReactionError> {
    let mut reaction = Reaction::new(ReactionKind::from_type_name(type_name)?);
    reaction.set_rate(default_rate(type_name)?)?;
    Ok(reaction)
}

/// Result of loading one reaction node
#[derive(Debug)]
pub enum ReactionOutcome {
    Accepted(Reaction),
    /// refers to undeclared species and the mechanism skips such reactions
    Skipped { equation: String },
}

pub fn load_reaction(
    node: &Document,
    kin: &dyn Kinetics,
) -> Result<ReactionOutcome, ReactionError> {
    let reaction = new_reaction(node, kin)?;
    if reaction.check_species(kin)? {
        Ok(ReactionOutcome::Accepted(reaction))
    } else {
        info!("reaction '{}' skipped", reaction.equation());
        Ok(ReactionOutcome::Skipped {
            equation: reaction.equation(),
        })
    }
}

/// Load all reaction nodes of a list, keeping their order. The first fatal error stops loading.
pub fn get_reactions(items: &Value, kin: &dyn Kinetics) -> Result<Vec<Reaction>, ReactionError> {
    let nodes = items.as_array().ok_or_else(|| ReactionError::InvalidField {
        equation: String::new(),
        field: "reactions".to_string(),
        reason: "expected a list of reaction nodes".to_string(),
    })?;
    let mut reactions = Vec::with_capacity(nodes.len());
    for item in nodes {
        let node = item.as_object().ok_or_else(|| ReactionError::InvalidField {
            equation: String::new(),
            field: "reactions".to_string(),
            reason: format!("reaction node must be a map, got {}", item),
        })?;
        if let ReactionOutcome::Accepted(reaction) = load_reaction(node, kin)? {
            reactions.push(reaction);
        }
    }
    info!("{} of {} reactions loaded", reactions.len(), nodes.len());
    Ok(reactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::kinetics_api::{KineticsMechanism, PhaseData};
    use serde_json::json;

    fn mechanism() -> KineticsMechanism {
        let gas = PhaseData::from_formulae("gas", 3, &["H", "O", "O2", "HO2", "H2", "H2O", "AR"])
            .unwrap();
        KineticsMechanism::new(vec![gas])
    }

    fn trial(equation: &str, kin: &KineticsMechanism) -> Reaction {
        let mut r = Reaction::new(ElementaryReaction.into());
        r.set_equation(equation, Some(kin)).unwrap();
        r
    }

    #[test]
    fn test_is_three_body() {
        let kin = mechanism();
        assert!(is_three_body(&trial("H + O2 + AR <=> HO2 + AR", &kin)));
        assert!(is_three_body(&trial("2 O + AR <=> O2 + AR", &kin)));
        assert!(!is_three_body(&trial("2 H2 + O2 => 2 H2O", &kin)));
        // several candidates
        assert!(!is_three_body(&trial("H + O2 + AR <=> H + O2 + AR", &kin)));
        // fractional coefficient
        assert!(!is_three_body(&trial("0.5 O2 + H2 + AR <=> H2O + AR", &kin)));
        // four molecules on both sides
        assert!(!is_three_body(&trial("2 H2 + O2 + AR <=> 2 H2O + 2 AR", &kin)));
    }

    #[test]
    fn test_classify() {
        let kin = mechanism();
        let node = json!({"equation": "H + O2 + AR <=> HO2 + AR"});
        assert!(matches!(
            classify(node.as_object().unwrap(), &kin).unwrap(),
            ReactionKind::ThreeBody(_)
        ));
        let node = json!({"equation": "H2 + O <=> H + HO2"});
        assert!(matches!(
            classify(node.as_object().unwrap(), &kin).unwrap(),
            ReactionKind::Elementary(_)
        ));
        let node = json!({"equation": "H2 + O <=> H + HO2", "type": "plasma"});
        assert_eq!(
            classify(node.as_object().unwrap(), &kin).unwrap_err(),
            ReactionError::UnknownReactionType("plasma".to_string())
        );
    }

    #[test]
    fn test_classify_without_phases() {
        let kin = KineticsMechanism::new(vec![]);
        let node = json!({"equation": "A <=> B", "rate-constant": [1.0, 0.0, 0.0]});
        assert!(matches!(
            classify(node.as_object().unwrap(), &kin).unwrap(),
            ReactionKind::Elementary(_)
        ));
        let r = new_reaction(node.as_object().unwrap(), &kin).unwrap();
        assert_eq!(r.reaction_type(), "elementary");
        assert!(r.check_balance(&kin).is_err());
    }

    #[test]
    fn test_interface_rate_node() {
        let node = json!({"equation": "H2 + 2 PT(S) => 2 H(S)", "rate-constant": [4.4e21, 1.0, 0.0]});
        let rate_node = interface_rate_node(node.as_object().unwrap()).unwrap();
        assert_eq!(rate_node["type"], "interface-Arrhenius");
        let node = json!({"equation": "H2 + 2 PT(S) => 2 H(S)", "sticking-coefficient": [0.046, 0.0, 0.0]});
        let rate_node = interface_rate_node(node.as_object().unwrap()).unwrap();
        assert_eq!(rate_node["type"], "sticking-Arrhenius");
        let node = json!({"equation": "H2 + 2 PT(S) => 2 H(S)"});
        assert_eq!(
            interface_rate_node(node.as_object().unwrap()).unwrap_err(),
            ReactionError::UninferableInterfaceType("H2 + 2 PT(S) => 2 H(S)".to_string())
        );
    }

    #[test]
    fn test_new_reaction_of_type() {
        let r = new_reaction_of_type("Chebyshev").unwrap();
        assert_eq!(r.reaction_type(), "elementary");
        assert_eq!(r.rate().rate_type(), "Chebyshev");
        let r = new_reaction_of_type("chemically-activated").unwrap();
        assert_eq!(r.reaction_type(), "chemically-activated");
        assert!(new_reaction_of_type("plasma").is_err());
    }

    #[test]
    fn test_get_reactions_skips_undeclared() {
        let mut kin = mechanism();
        let items = json!([
            {"equation": "2 O + M <=> O2 + M", "type": "three-body", "rate-constant": [1.2e17, -1.0, 0.0]},
            {"equation": "H + CH4 <=> H2 + CH3", "rate-constant": [6.6e8, 1.62, 10840.0]},
            {"equation": "H + O2 <=> O + OH2", "rate-constant": [2.65e16, -0.671, 17041.0]}
        ]);
        assert!(matches!(
            get_reactions(&items, &kin),
            Err(ReactionError::UndeclaredSpecies { .. })
        ));
        kin.settings.skip_undeclared_species = true;
        let reactions = get_reactions(&items, &kin).unwrap();
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].equation(), "2 O + M <=> O2 + M");

        let outcome = load_reaction(items[1].as_object().unwrap(), &kin).unwrap();
        assert!(matches!(
            outcome,
            ReactionOutcome::Skipped { equation } if equation == "H + CH4 <=> H2 + CH3"
        ));
        assert!(get_reactions(&json!({"equation": "H2 <=> 2 H"}), &kin).is_err());
    }
}
