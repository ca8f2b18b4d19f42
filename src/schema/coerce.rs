//! Type coercion of raw values to declared field types
//!
//! Lax policy:
//! - string: numbers are stringified
//! - int: integral floats and trimmed numeric strings are converted
//! - float: any number, trimmed numeric strings
//! - bool: 0/1 and true/false/yes/no/on/off strings
//! - list: arrays only, items coerced one by one
//!
//! Strict policy accepts only values that already have the declared type.
//! Null is never coerced; absence is decided before coercion.

use serde_json::{Number, Value};

use super::types::{CoercionPolicy, FieldType};

/// Coerces `value` to `field_type`, returning the reason on failure.
pub fn coerce(
    value: &Value,
    field_type: &FieldType,
    policy: CoercionPolicy,
) -> Result<Value, String> {
    if value.is_null() {
        return Err("null is not a valid value".to_string());
    }

    match field_type {
        FieldType::String => to_string(value, policy),
        FieldType::Int => to_int(value, policy),
        FieldType::Float => to_float(value, policy),
        FieldType::Bool => to_bool(value, policy),
        FieldType::List { item } => to_list(value, item, policy),
    }
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {}, got {}", expected, json_type_name(value))
}

fn to_string(value: &Value, policy: CoercionPolicy) -> Result<Value, String> {
    match (value, policy) {
        (Value::String(_), _) => Ok(value.clone()),
        (Value::Number(n), CoercionPolicy::Lax) => Ok(Value::String(n.to_string())),
        _ => Err(mismatch("string", value)),
    }
}

fn to_int(value: &Value, policy: CoercionPolicy) -> Result<Value, String> {
    if let Some(i) = value.as_i64() {
        return Ok(Value::from(i));
    }
    if value.is_u64() {
        return Err("integer out of range for int".to_string());
    }
    if policy == CoercionPolicy::Strict {
        return Err(mismatch("int", value));
    }

    match value {
        Value::Number(n) => {
            let f = n.as_f64().unwrap_or(f64::NAN);
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                Ok(Value::from(f as i64))
            } else {
                Err(format!("float {} has a fractional part or is out of range", n))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("cannot parse {:?} as int", s)),
        _ => Err(mismatch("int", value)),
    }
}

fn to_float(value: &Value, policy: CoercionPolicy) -> Result<Value, String> {
    match (value, policy) {
        (Value::Number(_), CoercionPolicy::Strict) => Ok(value.clone()),
        (Value::Number(n), CoercionPolicy::Lax) => n
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("number {} is not representable as float", n)),
        (Value::String(s), CoercionPolicy::Lax) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("cannot parse {:?} as float", s)),
        _ => Err(mismatch("float", value)),
    }
}

fn to_bool(value: &Value, policy: CoercionPolicy) -> Result<Value, String> {
    if let Value::Bool(_) = value {
        return Ok(value.clone());
    }
    if policy == CoercionPolicy::Strict {
        return Err(mismatch("bool", value));
    }

    match value {
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(format!("number {} is not a valid bool", n)),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(format!("cannot parse {:?} as bool", s)),
        },
        _ => Err(mismatch("bool", value)),
    }
}

fn to_list(value: &Value, item: &FieldType, policy: CoercionPolicy) -> Result<Value, String> {
    let items = value.as_array().ok_or_else(|| mismatch("list", value))?;

    items
        .iter()
        .enumerate()
        .map(|(i, elem)| {
            coerce(elem, item, policy).map_err(|reason| format!("item {}: {}", i, reason))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lax(value: Value, ty: FieldType) -> Result<Value, String> {
        coerce(&value, &ty, CoercionPolicy::Lax)
    }

    fn strict(value: Value, ty: FieldType) -> Result<Value, String> {
        coerce(&value, &ty, CoercionPolicy::Strict)
    }

    #[test]
    fn test_numbers_stringify_under_lax() {
        assert_eq!(lax(json!(23), FieldType::String).unwrap(), json!("23"));
        assert_eq!(lax(json!(1.5), FieldType::String).unwrap(), json!("1.5"));
    }

    #[test]
    fn test_strict_string_rejects_numbers() {
        let err = strict(json!(23), FieldType::String).unwrap_err();
        assert_eq!(err, "expected string, got int");
    }

    #[test]
    fn test_bool_is_not_a_string() {
        assert!(lax(json!(true), FieldType::String).is_err());
    }

    #[test]
    fn test_int_from_string_and_integral_float() {
        assert_eq!(lax(json!(" 42 "), FieldType::Int).unwrap(), json!(42));
        assert_eq!(lax(json!(3.0), FieldType::Int).unwrap(), json!(3));
        assert!(lax(json!(3.5), FieldType::Int).is_err());
        assert!(lax(json!("forty"), FieldType::Int).is_err());
        assert!(strict(json!("42"), FieldType::Int).is_err());
    }

    #[test]
    fn test_int_out_of_range() {
        assert!(lax(json!(u64::MAX), FieldType::Int).is_err());
    }

    #[test]
    fn test_float_accepts_integers() {
        assert_eq!(lax(json!(100), FieldType::Float).unwrap(), json!(100.0));
        assert_eq!(strict(json!(100), FieldType::Float).unwrap(), json!(100));
        assert_eq!(lax(json!("2.5"), FieldType::Float).unwrap(), json!(2.5));
        assert!(lax(json!("NaN"), FieldType::Float).is_err());
    }

    #[test]
    fn test_bool_spellings() {
        assert_eq!(lax(json!("Yes"), FieldType::Bool).unwrap(), json!(true));
        assert_eq!(lax(json!("off"), FieldType::Bool).unwrap(), json!(false));
        assert_eq!(lax(json!(1), FieldType::Bool).unwrap(), json!(true));
        assert!(lax(json!(2), FieldType::Bool).is_err());
        assert!(strict(json!("true"), FieldType::Bool).is_err());
    }

    #[test]
    fn test_list_items_coerced() {
        let ty = FieldType::list_of(FieldType::String);
        assert_eq!(lax(json!([1, "a"]), ty.clone()).unwrap(), json!(["1", "a"]));

        let err = lax(json!(["a", null]), ty.clone()).unwrap_err();
        assert!(err.starts_with("item 1:"));

        assert!(lax(json!("a"), ty).is_err());
    }

    #[test]
    fn test_null_never_coerces() {
        assert!(lax(Value::Null, FieldType::String).is_err());
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(1)), "int");
        assert_eq!(json_type_name(&json!(1.5)), "float");
        assert_eq!(json_type_name(&json!([])), "list");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
