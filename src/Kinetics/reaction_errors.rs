use thiserror::Error;

/// error types raised while building and validating a reaction
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReactionError {
    #[error("Error parsing reaction string '{equation}'.\nCurrent token: '{token}'\nlast_used: '{last_used}'")]
    MalformedEquation {
        equation: String,
        token: String,
        last_used: String,
    },
    #[error("Invalid stoichiometric coefficient '{token}' in reaction '{equation}'")]
    InvalidCoefficient { equation: String, token: String },
    #[error("Reaction '{equation}' contains more than one reaction arrow")]
    MultipleArrows { equation: String },
    #[error("Unknown reaction type '{0}'")]
    UnknownReactionType(String),
    #[error("Unknown rate type '{0}'")]
    UnknownRateType(String),
    #[error("Unable to infer interface reaction type for reaction '{0}'")]
    UninferableInterfaceType(String),
    #[error("Reaction '{equation}': missing field '{field}'")]
    MissingField { equation: String, field: String },
    #[error("Reaction '{equation}': invalid field '{field}': {reason}")]
    InvalidField {
        equation: String,
        field: String,
        reason: String,
    },
    #[error("Reaction order specified for non-reactant species '{species}' in reaction '{equation}'")]
    NonReactantOrder { equation: String, species: String },
    #[error("Negative reaction order specified for species '{species}' in reaction '{equation}'")]
    NegativeOrder { equation: String, species: String },
    #[error("Reaction orders may only be given for irreversible reactions: '{0}'")]
    OrdersOnReversible(String),
    #[error("Reaction '{equation}'\ncontains undeclared species: '{}'", .species.join("', '"))]
    UndeclaredSpecies {
        equation: String,
        species: Vec<String>,
    },
    #[error("Reaction '{equation}'\ndefines reaction orders for undeclared species: '{}'", .species.join("', '"))]
    UndeclaredOrderSpecies {
        equation: String,
        species: Vec<String>,
    },
    #[error("Reaction '{equation}'\ndefines third-body efficiencies for undeclared species: '{}'", .species.join("', '"))]
    UndeclaredEfficiencies {
        equation: String,
        species: Vec<String>,
    },
    #[error("Reaction '{equation}'\nis a three-body reaction with undeclared species: '{}'", .species.join("', '"))]
    UndeclaredThirdBody {
        equation: String,
        species: Vec<String>,
    },
    #[error("Species '{0}' is not found in any phase of the mechanism")]
    UnknownSpecies(String),
    #[error("The following reaction is unbalanced: {equation}\n{table}")]
    Unbalanced { equation: String, table: String },
    #[error("Number of surface sites not balanced in reaction {equation}.\nReactant sites: {reactant_sites}\nProduct sites: {product_sites}")]
    UnbalancedSites {
        equation: String,
        reactant_sites: f64,
        product_sites: f64,
    },
    #[error("Reaction equation '{0}' does not contain third body 'M'")]
    MissingThirdBody(String),
    #[error("Found more than one explicitly specified collision partner\nin reaction '{0}'")]
    AmbiguousCollisionPartner(String),
    #[error("Reactants for reaction '{0}' do not contain a pressure-dependent third body")]
    MissingFalloffThirdBody(String),
    #[error("Unable to match third body '{third_body}' in reactants and products of reaction '{equation}'")]
    UnmatchedFalloffThirdBody { equation: String, third_body: String },
    #[error("Found superfluous 'M' in pressure-dependent-Arrhenius reaction '{0}'")]
    SuperfluousThirdBody(String),
    #[error("Incompatible types: '{rate_type}' rate cannot be used by a '{reaction_type}' reaction")]
    IncompatibleRate {
        reaction_type: String,
        rate_type: String,
    },
    #[error("Reaction '{equation}': {reason}")]
    RateCheck { equation: String, reason: String },
    #[error("Invalid settings: {0}")]
    Settings(String),
    #[error("Invalid chemical formula '{formula}': {reason}")]
    Formula { formula: String, reason: String },
}
