use crate::errors::{CompileError, Result};

/// Render a number the way the wire format expects: integers without a
/// decimal point, floats as the shortest decimal that round-trips.
pub fn encode_number(n: f64) -> String {
    // std Display already produces the shortest round-tripping form
    format!("{}", n)
}

/// Render a dense vector literal: `[n1,n2,...]`, no internal whitespace.
pub fn encode_vector(v: &[f64]) -> Result<String> {
    if v.is_empty() {
        return Err(CompileError::EmptyVector);
    }
    let dims: Vec<String> = v.iter().copied().map(encode_number).collect();
    Ok(format!("[{}]", dims.join(",")))
}

/// Parse a vector literal back into its dimensions. Counterpart of
/// `encode_vector`, used to check round-trip exactness.
pub fn parse_vector(s: &str) -> Option<Vec<f64>> {
    let inner = s.strip_prefix('[')?.strip_suffix(']')?;
    inner
        .split(',')
        .map(|d| d.trim().parse::<f64>().ok())
        .collect()
}

/// Render `field^boost` pairs joined by single spaces, insertion order.
/// A boost of exactly 1.0 abbreviates to the bare field name.
pub fn encode_boost_map(fields: &[(String, f64)]) -> String {
    fields
        .iter()
        .map(|(field, boost)| {
            if *boost == 1.0 {
                field.clone()
            } else {
                format!("{}^{}", field, encode_number(*boost))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a boost string back into pairs. Accepts both `field^2` and the
/// bare-field abbreviation for boost 1.0.
pub fn parse_boost_map(s: &str) -> Vec<(String, f64)> {
    s.split_whitespace()
        .map(|token| match token.split_once('^') {
            Some((field, boost)) => (field.to_string(), boost.parse().unwrap_or(1.0)),
            None => (token.to_string(), 1.0),
        })
        .collect()
}

/// Comma-join a field list, preserving order. Alias entries like
/// `alias:expression` pass through verbatim.
pub fn encode_field_list(fields: &[String]) -> String {
    fields.join(",")
}
