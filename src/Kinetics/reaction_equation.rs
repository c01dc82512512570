/// eng
/// Parsing of reaction equations such as "2 H2 + O2 => 2 H2O", "H + O2 + M <=> HO2 + M" or
/// "CH3 + CH3 (+M) <=> C2H6 (+M)" into maps {substance: stoichiometric coefficient} for
/// reactants and products.
/// Terms must be separated by whitespace: "2 H2 + O2", not "2H2+O2", because substance names may
/// contain '+' and digits (e.g. "H3O+", "C4H71-3").
/// A falloff third body "(+M)" (or "(+ M)", or "(+AR)") is stored with the stoichiometric
/// coefficient -1 so that the falloff reaction can find and remove it afterwards.
use crate::Kinetics::kinetics_api::Kinetics;
use crate::Kinetics::reaction_errors::ReactionError;
use indexmap::IndexMap;
use log::trace;
use regex::Regex;
use std::sync::LazyLock;

/// ordered map {substance: stoichiometric coefficient}
pub type Composition = IndexMap<String, f64>;

/// symbol of the generic collision partner
pub const GENERIC_THIRD_BODY: &str = "M";
/// opening of the falloff third body mark "(+M)"
pub const FALLOFF_PREFIX: &str = "(+";

const REVERSIBLE_ARROWS: [&str; 2] = ["<=>", "="];
const IRREVERSIBLE_ARROW: &str = "=>";

static COEFFICIENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.?\d*|\.\d+)([eEdD][+-]?\d+)?$").expect("valid coefficient regex")
});

/// result of parsing a reaction equation
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEquation {
    pub reactants: Composition,
    pub products: Composition,
    pub reversible: bool,
    /// false if some substance is not declared in the mechanism
    pub valid: bool,
}

/// "(+M)", "(+AR)"
pub fn is_falloff_marker(name: &str) -> bool {
    falloff_marker_interior(name).is_some()
}
/// "(+AR)" -> "AR"; None if `name` is not a closed, non-empty mark
pub fn falloff_marker_interior(name: &str) -> Option<&str> {
    name.strip_prefix(FALLOFF_PREFIX)
        .and_then(|s| s.strip_suffix(')'))
        .filter(|s| !s.is_empty())
}

pub fn falloff_marker(third_body: &str) -> String {
    format!("{}{})", FALLOFF_PREFIX, third_body)
}

fn is_arrow(token: &str) -> bool {
    token == IRREVERSIBLE_ARROW || REVERSIBLE_ARROWS.contains(&token)
}
// token that completes the term before it
fn is_term_boundary(token: &str) -> bool {
    token == "+" || token.starts_with(FALLOFF_PREFIX) || is_arrow(token)
}

fn parse_coefficient(token: &str, equation: &str) -> Result<f64, ReactionError> {
    let invalid = || ReactionError::InvalidCoefficient {
        equation: equation.to_string(),
        token: token.to_string(),
    };
    if !COEFFICIENT.is_match(token) {
        return Err(invalid());
    }
    // Fortran-style exponent 1.5d0
    let value: f64 = token.replace(&['d', 'D'][..], "e").parse().map_err(|_| invalid())?;
    if value <= 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

/// Parse `equation` into reactant and product maps.
///
/// When `kin` is given, every substance that is neither `M` nor a falloff mark must be declared in
/// the mechanism; otherwise the result is flagged invalid (this is not an error, so that a document
/// may contain reactions for substances missing from the current mechanism). Without a mechanism
/// nothing can be resolved and the result is always flagged invalid.
pub fn parse_reaction_equation(
    equation: &str,
    kin: Option<&dyn Kinetics>,
) -> Result<ParsedEquation, ReactionError> {
    let mut tokens: Vec<&str> = equation.split_whitespace().collect();
    // makes parsing of the last substance not a special case
    tokens.push("+");

    let mut parsed = ParsedEquation {
        reactants: Composition::new(),
        products: Composition::new(),
        reversible: true,
        valid: true,
    };
    let mut last_used: Option<usize> = None;
    let mut on_reactant_side = true;
    let mut arrow_found = false;
    for i in 1..tokens.len() {
        let token = tokens[i];
        if is_term_boundary(token) {
            let mut species = tokens[i - 1].to_string();
            // first token of the current term
            let start = last_used.map_or(0, |u| u + 1);
            let stoich = if last_used.is_some_and(|u| tokens[u] == FALLOFF_PREFIX) {
                // falloff third body with space: "(+ M)"
                species = format!("{}{}", FALLOFF_PREFIX, species);
                if !is_falloff_marker(&species) {
                    return Err(ReactionError::MalformedEquation {
                        equation: equation.to_string(),
                        token: tokens[i - 1].to_string(),
                        last_used: FALLOFF_PREFIX.to_string(),
                    });
                }
                -1.0
            } else if last_used == Some(i - 1) && is_falloff_marker(&species) {
                // falloff third body without space: "(+M)"
                -1.0
            } else if start + 1 == i {
                1.0
            } else if start + 2 == i {
                parse_coefficient(tokens[i - 2], equation)?
            } else {
                return Err(ReactionError::MalformedEquation {
                    equation: equation.to_string(),
                    token: token.to_string(),
                    last_used: last_used.map_or("n/a", |u| tokens[u]).to_string(),
                });
            };
            trace!("term '{}' with coefficient {} in '{}'", species, stoich, equation);
            let declared = match kin {
                Some(kin) => {
                    stoich == -1.0
                        || species == GENERIC_THIRD_BODY
                        || kin.kinetics_species_index(&species).is_some()
                }
                None => false,
            };
            if !declared {
                parsed.valid = false;
            }
            let side = if on_reactant_side {
                &mut parsed.reactants
            } else {
                &mut parsed.products
            };
            *side.entry(species).or_insert(0.0) += stoich;
            last_used = Some(i);
        }
        // tokens after the arrow belong to products
        if is_arrow(token) {
            if arrow_found {
                return Err(ReactionError::MultipleArrows {
                    equation: equation.to_string(),
                });
            }
            arrow_found = true;
            parsed.reversible = token != IRREVERSIBLE_ARROW;
            on_reactant_side = false;
        }
    }
    Ok(parsed)
}

fn format_coefficient(coefficient: f64) -> String {
    format!("{}", coefficient)
}

/// "2 H2 + O2"
pub fn composition_string(composition: &Composition) -> String {
    composition
        .iter()
        .map(|(species, &stoich)| {
            if stoich != 1.0 {
                format!("{} {}", format_coefficient(stoich), species)
            } else {
                species.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::kinetics_api::{KineticsMechanism, PhaseData};

    fn mechanism() -> KineticsMechanism {
        let gas = PhaseData::from_formulae(
            "gas",
            3,
            &["H", "O2", "HO2", "H2", "H2O", "AR", "A", "B", "C", "D"],
        )
        .unwrap();
        KineticsMechanism::new(vec![gas])
    }

    fn comp(pairs: &[(&str, f64)]) -> Composition {
        pairs.iter().map(|(s, c)| (s.to_string(), *c)).collect()
    }

    #[test]
    fn test_simple_reversible() {
        let kin = mechanism();
        let parsed = parse_reaction_equation("A + B <=> C + D", Some(&kin)).unwrap();
        assert_eq!(parsed.reactants, comp(&[("A", 1.0), ("B", 1.0)]));
        assert_eq!(parsed.products, comp(&[("C", 1.0), ("D", 1.0)]));
        assert!(parsed.reversible);
        assert!(parsed.valid);

        let parsed = parse_reaction_equation("A + B = C", Some(&kin)).unwrap();
        assert!(parsed.reversible);
    }

    #[test]
    fn test_irreversible() {
        let kin = mechanism();
        let parsed = parse_reaction_equation("A => B", Some(&kin)).unwrap();
        assert!(!parsed.reversible);
        assert_eq!(parsed.reactants, comp(&[("A", 1.0)]));
        assert_eq!(parsed.products, comp(&[("B", 1.0)]));
    }

    #[test]
    fn test_coefficients() {
        let kin = mechanism();
        let parsed = parse_reaction_equation("2 A + B = 3 C", Some(&kin)).unwrap();
        assert_eq!(parsed.reactants, comp(&[("A", 2.0), ("B", 1.0)]));
        assert_eq!(parsed.products, comp(&[("C", 3.0)]));

        let parsed = parse_reaction_equation("0.5 O2 + H2 => H2O", Some(&kin)).unwrap();
        assert_eq!(parsed.reactants["O2"], 0.5);
        let parsed = parse_reaction_equation("1.5d0 A => 1.5e0 B", Some(&kin)).unwrap();
        assert_eq!(parsed.products["B"], 1.5);
    }

    #[test]
    fn test_repeated_species_accumulate() {
        let kin = mechanism();
        let parsed = parse_reaction_equation("H + H + M <=> H2 + M", Some(&kin)).unwrap();
        assert_eq!(parsed.reactants, comp(&[("H", 2.0), ("M", 1.0)]));
        assert_eq!(parsed.products, comp(&[("H2", 1.0), ("M", 1.0)]));
        assert!(parsed.valid);
    }

    #[test]
    fn test_falloff_marks() {
        let kin = mechanism();
        let parsed = parse_reaction_equation("A (+M) <=> B (+M)", Some(&kin)).unwrap();
        assert_eq!(parsed.reactants, comp(&[("A", 1.0), ("(+M)", -1.0)]));
        assert_eq!(parsed.products, comp(&[("B", 1.0), ("(+M)", -1.0)]));
        assert!(parsed.valid);

        let parsed = parse_reaction_equation("2 A (+ AR) <=> B (+ AR)", Some(&kin)).unwrap();
        assert_eq!(parsed.reactants, comp(&[("A", 2.0), ("(+AR)", -1.0)]));
        assert_eq!(parsed.products, comp(&[("B", 1.0), ("(+AR)", -1.0)]));
    }

    #[test]
    fn test_undeclared_species_is_not_an_error() {
        let kin = mechanism();
        let parsed = parse_reaction_equation("A + X <=> C", Some(&kin)).unwrap();
        assert!(!parsed.valid);
        assert_eq!(parsed.reactants, comp(&[("A", 1.0), ("X", 1.0)]));
        // nothing can be resolved without a mechanism
        let parsed = parse_reaction_equation("A <=> C", None).unwrap();
        assert!(!parsed.valid);
    }

    #[test]
    fn test_malformed_equations() {
        let kin = mechanism();
        let err = parse_reaction_equation("2 x A + B <=> C", Some(&kin)).unwrap_err();
        assert!(matches!(err, ReactionError::MalformedEquation { .. }));
        let err = parse_reaction_equation("two A <=> C", Some(&kin)).unwrap_err();
        assert_eq!(
            err,
            ReactionError::InvalidCoefficient {
                equation: "two A <=> C".to_string(),
                token: "two".to_string()
            }
        );
        let err = parse_reaction_equation("0 A <=> C", Some(&kin)).unwrap_err();
        assert!(matches!(err, ReactionError::InvalidCoefficient { .. }));
        let err = parse_reaction_equation("A <=> B => C", Some(&kin)).unwrap_err();
        assert!(matches!(err, ReactionError::MultipleArrows { .. }));
        // spaced falloff mark without the closing bracket
        let err = parse_reaction_equation("A + A (+ Ä <=> B (+ Ä", Some(&kin)).unwrap_err();
        assert_eq!(
            err,
            ReactionError::MalformedEquation {
                equation: "A + A (+ Ä <=> B (+ Ä".to_string(),
                token: "Ä".to_string(),
                last_used: "(+".to_string()
            }
        );
    }

    #[test]
    fn test_composition_string() {
        let c = comp(&[("H2", 2.0), ("O2", 1.0), ("CH4", 0.5)]);
        assert_eq!(composition_string(&c), "2 H2 + O2 + 0.5 CH4");
        assert_eq!(composition_string(&Composition::new()), "");
    }

    #[test]
    fn test_falloff_marker_helpers() {
        assert!(is_falloff_marker("(+M)"));
        assert!(is_falloff_marker("(+AR)"));
        assert!(!is_falloff_marker("(+"));
        assert!(!is_falloff_marker("M"));
        assert!(!is_falloff_marker("(+)"));
        assert!(!is_falloff_marker("(+Ä"));
        assert_eq!(falloff_marker_interior("(+AR)"), Some("AR"));
        assert_eq!(falloff_marker_interior("(+Ä)"), Some("Ä"));
        assert_eq!(falloff_marker_interior("(+Ä"), None);
        assert_eq!(falloff_marker("M"), "(+M)");
    }
}
