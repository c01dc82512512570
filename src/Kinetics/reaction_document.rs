/// Access to the fields of a reaction node.
/// A reaction is read from (and written back to) a JSON object like
/// {"equation": "H + O2 + M <=> HO2 + M", "type": "three-body",
///  "rate-constant": {"A": 2.0e12, "b": -0.6, "Ea": 0.0}, "efficiencies": {"AR": 0.83}}
/// Key order of the node is preserved (serde_json "preserve_order" feature).
use crate::Kinetics::reaction_equation::Composition;
use crate::Kinetics::reaction_errors::ReactionError;
use serde_json::{Map, Value};

pub type Document = Map<String, Value>;

pub fn equation_of(node: &Document) -> &str {
    node.get("equation").and_then(Value::as_str).unwrap_or("")
}

pub fn invalid_field(node: &Document, field: &str, reason: &str) -> ReactionError {
    ReactionError::InvalidField {
        equation: equation_of(node).to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

pub fn missing_field(node: &Document, field: &str) -> ReactionError {
    ReactionError::MissingField {
        equation: equation_of(node).to_string(),
        field: field.to_string(),
    }
}

pub fn get_str<'a>(node: &'a Document, field: &str) -> Result<Option<&'a str>, ReactionError> {
    match node.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(invalid_field(node, field, "expected a string")),
    }
}

pub fn require_str<'a>(node: &'a Document, field: &str) -> Result<&'a str, ReactionError> {
    get_str(node, field)?.ok_or_else(|| missing_field(node, field))
}

pub fn get_bool(node: &Document, field: &str, default: bool) -> Result<bool, ReactionError> {
    match node.get(field) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(invalid_field(node, field, "expected a boolean")),
    }
}

pub fn get_f64(node: &Document, field: &str, default: f64) -> Result<f64, ReactionError> {
    match node.get(field) {
        None => Ok(default),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| invalid_field(node, field, "expected a number")),
    }
}
/// {species: number} map, e.g. "orders" or "efficiencies"
pub fn get_composition(node: &Document, field: &str) -> Result<Option<Composition>, ReactionError> {
    let Some(value) = node.get(field) else {
        return Ok(None);
    };
    let Value::Object(map) = value else {
        return Err(invalid_field(node, field, "expected a map {species: number}"));
    };
    let mut composition = Composition::new();
    for (species, v) in map {
        let x = v.as_f64().ok_or_else(|| {
            invalid_field(node, field, &format!("value for '{}' is not a number", species))
        })?;
        composition.insert(species.clone(), x);
    }
    Ok(Some(composition))
}

pub fn composition_value(composition: &Composition) -> Value {
    Value::Object(
        composition
            .iter()
            .map(|(species, x)| (species.clone(), Value::from(*x)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_field_access() {
        let n = node(json!({
            "equation": "A <=> B",
            "duplicate": true,
            "default-efficiency": 0.5,
            "orders": {"A": 1.5}
        }));
        assert_eq!(equation_of(&n), "A <=> B");
        assert!(get_bool(&n, "duplicate", false).unwrap());
        assert!(!get_bool(&n, "negative-orders", false).unwrap());
        assert_eq!(get_f64(&n, "default-efficiency", 1.0).unwrap(), 0.5);
        assert_eq!(get_f64(&n, "missing", 1.0).unwrap(), 1.0);
        assert_eq!(get_composition(&n, "orders").unwrap().unwrap()["A"], 1.5);
        assert!(get_composition(&n, "efficiencies").unwrap().is_none());
        assert_eq!(get_str(&n, "type").unwrap(), None);
    }

    #[test]
    fn test_wrong_field_types() {
        let n = node(json!({"equation": 5, "duplicate": "yes", "orders": [1, 2]}));
        assert_eq!(equation_of(&n), "");
        assert!(matches!(
            require_str(&n, "equation"),
            Err(ReactionError::InvalidField { .. })
        ));
        assert!(get_bool(&n, "duplicate", false).is_err());
        assert!(get_composition(&n, "orders").is_err());
        assert!(matches!(
            require_str(&n, "type"),
            Err(ReactionError::MissingField { .. })
        ));
    }

    #[test]
    fn test_composition_value_keeps_order() {
        let mut c = Composition::new();
        c.insert("O2".to_string(), 0.4);
        c.insert("AR".to_string(), 0.7);
        let v = composition_value(&c);
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["O2", "AR"]);
    }
}
