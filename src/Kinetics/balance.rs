/// eng
/// Checks of a reaction against the mechanism it belongs to:
/// - are all species (reactants, products, species with explicit orders, collision partners
///   with efficiencies) declared in the mechanism
/// - is every element balanced (relative tolerance 1e-4)
/// - for surface reactions, is the number of occupied surface sites balanced (relative
///   tolerance 1e-5)
/// - does the reaction transfer charge between phases (electrochemical reaction)
use crate::Kinetics::kinetics_api::{Kinetics, ThermoPhase};
use crate::Kinetics::reaction::Reaction;
use crate::Kinetics::reaction_equation::Composition;
use crate::Kinetics::reaction_errors::ReactionError;
use indexmap::IndexMap;
use log::{debug, info};
use prettytable::{Cell, Row, Table};

const ELEMENT_TOLERANCE: f64 = 1e-4;
const SITE_TOLERANCE: f64 = 1e-5;
const CHARGE_TOLERANCE: f64 = 1e-4;

fn phase_and_index<'a>(
    kin: &'a dyn Kinetics,
    species: &str,
) -> Result<(&'a dyn ThermoPhase, usize), ReactionError> {
    let unknown = || ReactionError::UnknownSpecies(species.to_string());
    let phase = kin.species_phase(species).ok_or_else(unknown)?;
    let k = phase.species_index(species).ok_or_else(unknown)?;
    Ok((phase, k))
}

/// Compare the number of atoms of each element in reactants and products.
pub fn check_balance(reaction: &Reaction, kin: &dyn Kinetics) -> Result<(), ReactionError> {
    // element -> number of atoms
    let mut balr: IndexMap<String, f64> = IndexMap::new();
    let mut balp: IndexMap<String, f64> = IndexMap::new();
    for (species, stoich) in &reaction.products {
        let (phase, k) = phase_and_index(kin, species)?;
        for m in 0..phase.n_elements() {
            let element = phase.element_name(m);
            balr.entry(element.to_string()).or_insert(0.0);
            *balp.entry(element.to_string()).or_insert(0.0) += stoich * phase.n_atoms(k, m);
        }
    }
    for (species, stoich) in &reaction.reactants {
        let (phase, k) = phase_and_index(kin, species)?;
        for m in 0..phase.n_elements() {
            *balr.entry(phase.element_name(m).to_string()).or_insert(0.0) +=
                stoich * phase.n_atoms(k, m);
        }
    }

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Element"),
        Cell::new("Reactants"),
        Cell::new("Products"),
    ]));
    let mut balanced = true;
    for (element, in_reactants) in &balr {
        let in_products = balp.get(element).copied().unwrap_or(0.0);
        let sum = in_reactants + in_products;
        let diff = (in_products - in_reactants).abs();
        if sum > 0.0 && diff / sum > ELEMENT_TOLERANCE {
            balanced = false;
            table.add_row(Row::new(vec![
                Cell::new(element),
                Cell::new(&in_reactants.to_string()),
                Cell::new(&in_products.to_string()),
            ]));
        }
    }
    if !balanced {
        return Err(ReactionError::Unbalanced {
            equation: reaction.equation(),
            table: table.to_string(),
        });
    }

    if kin.n_phases() == 0 || kin.thermo(kin.reaction_phase_index()).n_dim() == 3 {
        return Ok(());
    }
    let Some(surface) = kin.surface_phase_index() else {
        return Ok(());
    };
    let surf = kin.thermo(surface);
    let sites = |composition: &Composition| -> f64 {
        composition
            .iter()
            .filter_map(|(species, stoich)| {
                surf.species_index(species).map(|k| stoich * surf.size(k))
            })
            .sum()
    };
    let reactant_sites = sites(&reaction.reactants);
    let product_sites = sites(&reaction.products);
    if (reactant_sites - product_sites).abs() > SITE_TOLERANCE * (reactant_sites + product_sites) {
        return Err(ReactionError::UnbalancedSites {
            equation: reaction.equation(),
            reactant_sites,
            product_sites,
        });
    }
    Ok(())
}

fn undeclared<'a>(
    composition: &'a Composition,
    kin: &dyn Kinetics,
) -> impl Iterator<Item = String> {
    composition
        .keys()
        .filter(move |species| kin.kinetics_species_index(species).is_none())
        .cloned()
}

/// Collision partners with efficiencies that are not declared in the mechanism, and whether the
/// equation names a collision partner explicitly.
pub fn undeclared_third_bodies(reaction: &Reaction, kin: &dyn Kinetics) -> (Vec<String>, bool) {
    match reaction.third_body() {
        Some(tb) => (
            undeclared(&tb.efficiencies, kin).collect(),
            tb.specified_collision_partner,
        ),
        None => (Vec::new(), false),
    }
}

/// Ok(true) if all species of the reaction are declared and it is balanced.
/// Ok(false) if the reaction refers to undeclared species and the mechanism skips such reactions.
pub fn check_species(reaction: &Reaction, kin: &dyn Kinetics) -> Result<bool, ReactionError> {
    let species: Vec<String> = undeclared(&reaction.reactants, kin)
        .chain(undeclared(&reaction.products, kin))
        .collect();
    if !species.is_empty() {
        if kin.skip_undeclared_species() {
            info!(
                "skipping reaction '{}' with undeclared species {:?}",
                reaction.equation(),
                species
            );
            return Ok(false);
        }
        return Err(ReactionError::UndeclaredSpecies {
            equation: reaction.equation(),
            species,
        });
    }

    let species: Vec<String> = undeclared(&reaction.orders, kin).collect();
    if !species.is_empty() {
        if kin.skip_undeclared_species() {
            info!(
                "skipping reaction '{}' with orders for undeclared species {:?}",
                reaction.equation(),
                species
            );
            return Ok(false);
        }
        return Err(ReactionError::UndeclaredOrderSpecies {
            equation: reaction.equation(),
            species,
        });
    }

    let (species, specified_collision_partner) = undeclared_third_bodies(reaction, kin);
    if !species.is_empty() {
        if !kin.skip_undeclared_third_bodies() {
            if reaction.input.contains_key("efficiencies") {
                return Err(ReactionError::UndeclaredEfficiencies {
                    equation: reaction.equation(),
                    species,
                });
            }
            return Err(ReactionError::UndeclaredThirdBody {
                equation: reaction.equation(),
                species,
            });
        } else if kin.skip_undeclared_species() && specified_collision_partner {
            info!(
                "skipping reaction '{}' with undeclared collision partner {:?}",
                reaction.equation(),
                species
            );
            return Ok(false);
        }
        debug!("ignoring efficiencies of undeclared species {:?}", species);
    }

    check_balance(reaction, kin)?;
    Ok(true)
}

/// true if the reaction moves charge from one phase to another
pub fn uses_electrochemistry(
    reaction: &Reaction,
    kin: &dyn Kinetics,
) -> Result<bool, ReactionError> {
    let mut e_counter = vec![0.0; kin.n_phases()];
    let sides = [(&reaction.products, 1.0), (&reaction.reactants, -1.0)];
    for (composition, sign) in sides {
        for (species, stoich) in composition {
            let unknown = || ReactionError::UnknownSpecies(species.clone());
            let kkin = kin.kinetics_species_index(species).ok_or_else(unknown)?;
            let n = kin.species_phase_index(kkin).ok_or_else(unknown)?;
            let phase = kin.thermo(n);
            let k = phase.species_index(species).ok_or_else(unknown)?;
            e_counter[n] += sign * stoich * phase.charge(k);
        }
    }
    Ok(e_counter.iter().any(|delta| delta.abs() > CHARGE_TOLERANCE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::kinetics_api::{KineticsMechanism, PhaseData};
    use crate::Kinetics::reaction::ElementaryReaction;

    fn gas() -> KineticsMechanism {
        let gas = PhaseData::from_formulae("gas", 3, &["H2", "O2", "H2O", "OH", "H"]).unwrap();
        KineticsMechanism::new(vec![gas])
    }

    fn reaction(equation: &str, kin: &KineticsMechanism) -> Reaction {
        let mut r = Reaction::new(ElementaryReaction.into());
        r.set_equation(equation, Some(kin)).unwrap();
        r
    }

    #[test]
    fn test_element_balance() {
        let kin = gas();
        assert!(check_balance(&reaction("2 H2 + O2 => 2 H2O", &kin), &kin).is_ok());
        let err = check_balance(&reaction("H2 + O2 => H2O", &kin), &kin).unwrap_err();
        match err {
            ReactionError::Unbalanced { equation, table } => {
                assert_eq!(equation, "H2 + O2 => H2O");
                assert!(table.contains('O'));
                // hydrogen is balanced and not listed
                assert!(!table.contains("H "));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_tolerance() {
        let kin = gas();
        // 0.00001 relative difference is accepted
        assert!(check_balance(&reaction("1.00001 H2 + 0.5 O2 => H2O", &kin), &kin).is_ok());
        assert!(check_balance(&reaction("1.01 H2 + 0.5 O2 => H2O", &kin), &kin).is_err());
    }

    fn surface() -> KineticsMechanism {
        let gas = PhaseData::from_formulae("gas", 3, &["H2", "O2", "H2O"]).unwrap();
        let mut surf = PhaseData::new("surface", 2);
        surf.add_species("PT(S)", &[("Pt", 1.0)])
            .add_species("H(S)", &[("H", 1.0), ("Pt", 1.0)])
            .add_species("O2(S)", &[("O", 2.0), ("Pt", 2.0)])
            .set_size("O2(S)", 2.0);
        KineticsMechanism::new(vec![gas, surf])
    }

    #[test]
    fn test_site_balance() {
        let kin = surface();
        let r = reaction("H2 + 2 PT(S) => 2 H(S)", &kin);
        assert!(check_balance(&r, &kin).is_ok());
        let r = reaction("O2 + 2 PT(S) => O2(S)", &kin);
        assert!(check_balance(&r, &kin).is_ok());

        // platinum is kept in the element balance, but O2(S) occupies 2 sites
        let mut bad = PhaseData::new("surface", 2);
        bad.add_species("PT(S)", &[("Pt", 1.0)])
            .add_species("O2(S)", &[("O", 2.0), ("Pt", 1.0)])
            .set_size("O2(S)", 2.0);
        let kin = KineticsMechanism::new(vec![
            PhaseData::from_formulae("gas", 3, &["O2"]).unwrap(),
            bad,
        ]);
        let r = reaction("O2 + PT(S) => O2(S)", &kin);
        assert_eq!(
            check_balance(&r, &kin).unwrap_err(),
            ReactionError::UnbalancedSites {
                equation: "O2 + PT(S) => O2(S)".to_string(),
                reactant_sites: 1.0,
                product_sites: 2.0
            }
        );
    }

    #[test]
    fn test_check_species_policy() {
        let kin = gas();
        let r = reaction("H2 + O2 => 2 OH", &kin);
        assert!(check_species(&r, &kin).unwrap());
        let r = reaction("H2 + CO => 2 OH", &kin);
        assert!(!r.valid());
        assert!(matches!(
            check_species(&r, &kin),
            Err(ReactionError::UndeclaredSpecies { .. })
        ));
        let mut skipping = kin.clone();
        skipping.settings.skip_undeclared_species = true;
        assert!(!check_species(&r, &skipping).unwrap());

        let mut r = reaction("H2 + O2 => 2 OH", &kin);
        r.orders.insert("N2".to_string(), 1.0);
        assert_eq!(
            check_species(&r, &kin).unwrap_err(),
            ReactionError::UndeclaredOrderSpecies {
                equation: "H2 + O2 => 2 OH".to_string(),
                species: vec!["N2".to_string()]
            }
        );
        assert!(!check_species(&r, &skipping).unwrap());
    }

    #[test]
    fn test_electrochemistry() {
        let mut metal = PhaseData::new("metal", 3);
        metal.add_species("electron", &[("E", 1.0)]).set_charge("electron", -1.0);
        let mut solution = PhaseData::new("solution", 3);
        solution
            .add_species("Li+", &[("Li", 1.0), ("E", -1.0)])
            .set_charge("Li+", 1.0);
        let mut anode = PhaseData::new("anode_surface", 2);
        anode.add_species("Li(S)", &[("Li", 1.0)]);
        let kin = KineticsMechanism::new(vec![metal, solution, anode]);
        let r = reaction("Li+ + electron <=> Li(S)", &kin);
        assert!(uses_electrochemistry(&r, &kin).unwrap());

        let kin = gas();
        let r = reaction("2 H2 + O2 => 2 H2O", &kin);
        assert!(!uses_electrochemistry(&r, &kin).unwrap());
    }
}
