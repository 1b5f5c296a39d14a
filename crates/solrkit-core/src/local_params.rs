use std::fmt;

/// Builder for the `{!name key=value ...}` embedded mini-syntax. Keys
/// render in the order they were pushed; callers push them in a fixed
/// order per parser so output stays stable. Absent keys are never
/// pushed, which keeps "absent" distinct from "empty string".
#[derive(Debug, Clone, PartialEq)]
pub struct LocalParams {
    name: &'static str,
    pairs: Vec<(&'static str, String)>,
}

impl LocalParams {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pairs: Vec::new(),
        }
    }

    pub fn pair(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.pairs.push((key, value.into()));
        self
    }

    pub fn pair_opt(self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.pair(key, v),
            None => self,
        }
    }
}

impl fmt::Display for LocalParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{!{}", self.name)?;
        for (key, value) in &self.pairs {
            write!(f, " {}={}", key, quote(value))?;
        }
        write!(f, "}}")
    }
}

// Single-quote any value the dialect cannot carry bare: whitespace and
// `}` would terminate the clause early, `'` needs escaping, and an
// empty string must still occupy its slot.
fn quote(value: &str) -> String {
    let needs_quoting =
        value.is_empty() || value.contains(char::is_whitespace) || value.contains(['}', '\'']);
    if needs_quoting {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    } else {
        value.to_string()
    }
}
