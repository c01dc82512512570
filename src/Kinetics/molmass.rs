/// Module to calculate the atomic composition of a chemical formula
///
/// Formulae written in upper case as it is common in kinetic mechanisms ("AR", "HE", "NA") are
/// understood: an upper case letter following another one is taken as the second letter of the
/// element symbol when it is not an element by itself.
use crate::Kinetics::reaction_errors::ReactionError;
use log::trace;
use std::collections::HashMap;

/// element symbols of the periodic table
const ELEMENTS: &[&str] = &[
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U",
];

pub fn is_element(symbol: &str) -> bool {
    ELEMENTS.contains(&symbol)
}

fn filter_phases_marks(formula: &str) -> String {
    let mut formula = formula.to_string();
    let phases = ["(C)", "(c)", "(L)", "(l)", "(G)", "(g)", "(S)", "(s)"];
    for phase in phases {
        formula = formula.replace(phase, "");
    }
    formula
}
// Chemical formulae may contain special names for chemical groups i.e. groups of atoms, e.g. Me (methyl) group,
// which is converted into {"C":1, "H":3}
fn handle_groups(
    counts: HashMap<String, usize>,
    groups: Option<&HashMap<String, HashMap<String, usize>>>,
) -> HashMap<String, usize> {
    let Some(groups) = groups else {
        return counts;
    };
    let mut expanded = HashMap::new();
    for (name, count) in counts {
        match groups.get(&name) {
            Some(atomic_composition) => {
                for (atom, quantity) in atomic_composition {
                    *expanded.entry(atom.clone()).or_insert(0) += quantity * count;
                }
            }
            None => *expanded.entry(name).or_insert(0) += count,
        }
    }
    expanded
}

struct FormulaParser<'a> {
    formula: &'a str,
    chars: Vec<char>,
    pos: usize,
    groups: Option<&'a HashMap<String, HashMap<String, usize>>>,
}

impl FormulaParser<'_> {
    fn error(&self, reason: String) -> ReactionError {
        ReactionError::Formula {
            formula: self.formula.to_string(),
            reason,
        }
    }

    fn read_count(&mut self) -> Result<usize, ReactionError> {
        let start = self.pos;
        while self.pos < self.chars.len() && self.chars[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(1);
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse()
            .map_err(|_| self.error(format!("bad count '{}'", digits)))
    }

    fn is_known(&self, symbol: &str) -> bool {
        is_element(symbol) || self.groups.is_some_and(|g| g.contains_key(symbol))
    }

    fn read_symbol(&mut self) -> String {
        let mut symbol = self.chars[self.pos].to_string();
        self.pos += 1;
        if let Some(&c) = self.chars.get(self.pos) {
            if c.is_lowercase() {
                symbol.push(c);
                self.pos += 1;
                // group names like "Me" or "Ph" may be longer
                while let Some(&c) = self.chars.get(self.pos) {
                    if !c.is_lowercase() || self.is_known(&symbol) {
                        break;
                    }
                    symbol.push(c);
                    self.pos += 1;
                }
            } else if c.is_uppercase() && !self.is_known(&c.to_string()) {
                // "AR" -> "Ar"
                symbol.extend(c.to_lowercase());
                self.pos += 1;
            }
        }
        symbol
    }

    fn parse_group(&mut self, depth: usize) -> Result<HashMap<String, usize>, ReactionError> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            if c == '(' {
                self.pos += 1;
                let inner = self.parse_group(depth + 1)?;
                let multiplier = self.read_count()?;
                for (element, n) in inner {
                    *counts.entry(element).or_insert(0) += n * multiplier;
                }
            } else if c == ')' {
                if depth == 0 {
                    return Err(self.error("unbalanced ')'".to_string()));
                }
                self.pos += 1;
                return Ok(counts);
            } else if c.is_uppercase() {
                let symbol = self.read_symbol();
                let count = self.read_count()?;
                trace!("element {} x{} in {}", symbol, count, self.formula);
                *counts.entry(symbol).or_insert(0) += count;
            } else {
                return Err(self.error(format!("unexpected character '{}'", c)));
            }
        }
        if depth > 0 {
            return Err(self.error("unbalanced '('".to_string()));
        }
        Ok(counts)
    }
}

/// Function to parse a chemical formula and return a HashMap of elements and their counts. Argument groups is optional.
/// It is needed if formula contains special names for chemical groups like Me, Ph, etc. In that case this argument should
/// contain the names of these groups and their atomic composition { "Me":{"C":1, "H":3}}
pub fn parse_formula(
    formula: &str,
    groups: Option<&HashMap<String, HashMap<String, usize>>>,
) -> Result<HashMap<String, usize>, ReactionError> {
    let cleaned = filter_phases_marks(&formula.replace(' ', ""));
    if cleaned.is_empty() {
        return Err(ReactionError::Formula {
            formula: formula.to_string(),
            reason: "empty formula".to_string(),
        });
    }
    let mut parser = FormulaParser {
        formula,
        chars: cleaned.chars().collect(),
        pos: 0,
        groups,
    };
    let counts = parser.parse_group(0)?;
    Ok(handle_groups(counts, groups))
}
