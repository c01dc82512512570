/// Module to calculate the atomic composition of a chemical formula
///
///  # Examples
/// ```
/// use KiReaction::Kinetics::molmass::parse_formula;
/// let atomic_composition = parse_formula("Na(NO3)2", None).unwrap();
/// assert_eq!(atomic_composition["O"], 6);
/// println!("{:?}", atomic_composition);
/// ```
pub mod molmass;
/// eng
/// Interfaces through which a reaction looks at the mechanism it belongs to: phases with their
/// species, elements and standard concentration units, plus the policy towards undeclared species.
/// `PhaseData` and `KineticsMechanism` are plain in-memory implementations of these interfaces.
pub mod kinetics_api;
/// errors raised while reading, checking and writing reactions
pub mod reaction_errors;
/// helpers to read typed fields from reaction nodes (JSON maps)
pub mod reaction_document;
/// eng
/// The module takes as input a reaction equation and produces the following data:
/// 1) map of reactants {substance: stoichiometric coefficient}
/// 2) the same for products
/// 3) reversibility of the reaction ("<=>" or "=" vs "=>")
/// Collision partners "M" and falloff marks "(+M)" are kept as pseudo substances, the reaction
/// decides what to do with them.
///  # Examples
/// ```
/// use KiReaction::Kinetics::reaction_equation::parse_reaction_equation;
/// let parsed = parse_reaction_equation("2 H2 + O2 => 2 H2O", None).unwrap();
/// assert_eq!(parsed.reactants["H2"], 2.0);
/// assert!(!parsed.reversible);
/// ```
pub mod reaction_equation;
/// units of rate coefficients derived from the reaction orders and the phases of the species
pub mod rate_units;
/// rate coefficient models: Arrhenius, interface and sticking Arrhenius, falloff, PLOG,
/// Chebyshev and custom rate functions
pub mod rates;
/// eng
/// Collision partners: efficiencies of third bodies, three-body reactions "A + B + M <=> AB + M"
/// and falloff reactions "A + B (+M) <=> AB (+M)"
pub mod third_body;
/// eng
/// Reaction entity: stoichiometry, flags, orders, the rate model and the kind of reaction.
/// Reactions are read from and written to nodes like
/// ```json
/// {"equation": "2 O + M <=> O2 + M", "type": "three-body", "rate-constant": {"A": 1.2e+17, "b": -1.0, "Ea": 0.0},
///  "efficiencies": {"AR": 0.83, "H2O": 15.4}}
/// ```
pub mod reaction;
/// element, charge and site balance of reactions and checks of species against the mechanism
pub mod balance;
/// eng
/// Creation of reactions from nodes: the kind of reaction is taken from the "type" field or
/// inferred from the equation, rate types of surface reactions are inferred from the node fields.
///  # Examples
/// ```
/// use KiReaction::Kinetics::kinetics_api::{KineticsMechanism, PhaseData};
/// use KiReaction::Kinetics::reaction_factory::get_reactions;
/// use serde_json::json;
/// let gas = PhaseData::from_formulae("gas", 3, &["H", "O", "O2", "OH", "H2"]).unwrap();
/// let kin = KineticsMechanism::new(vec![gas]);
/// let reactions = get_reactions(&json!([
///     {"equation": "H + O2 <=> O + OH", "rate-constant": [2.65e16, -0.671, 17041.0]},
///     {"equation": "O + H2 <=> H + OH", "rate-constant": {"A": 3.87e4, "b": 2.7, "Ea": 6260.0}}
/// ]), &kin).unwrap();
/// assert_eq!(reactions.len(), 2);
/// ```
pub mod reaction_factory;
