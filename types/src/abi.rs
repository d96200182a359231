//! Contract interface description (solc JSON ABI).
//!
//! Parsing is delegated to [`alloy_json_abi::JsonAbi`]. Old compiler artifacts
//! are normalized first: an entry without `type` is a function, and a missing
//! `stateMutability` is derived from the legacy `constant`/`payable` flags.

use alloy_json_abi::{Function, JsonAbi, StateMutability};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// The parsed JSON ABI array of a deployed contract.
#[derive(Debug, Clone)]
pub struct ContractInterface(JsonAbi);

impl ContractInterface {
    #[must_use]
    pub fn new(abi: JsonAbi) -> Self {
        Self(abi)
    }

    #[must_use]
    pub fn json_abi(&self) -> &JsonAbi {
        &self.0
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.0.functions.values().flatten()
    }

    /// Look up a function by name and arity, which disambiguates overloads.
    #[must_use]
    pub fn function(&self, name: &str, arity: usize) -> Option<&Function> {
        self.0
            .functions
            .get(name)?
            .iter()
            .find(|function| function.inputs.len() == arity)
    }

    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.0.functions.contains_key(name)
    }

    #[must_use]
    pub fn function_count(&self) -> usize {
        self.0.functions.values().map(Vec::len).sum()
    }
}

/// Whether calling `function` cannot change chain state.
#[must_use]
pub fn is_read_only(function: &Function) -> bool {
    matches!(
        function.state_mutability,
        StateMutability::Pure | StateMutability::View
    )
}

impl<'de> Deserialize<'de> for ContractInterface {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut entries = Vec::<Value>::deserialize(deserializer)?;
        for entry in &mut entries {
            if let Value::Object(map) = entry {
                normalize_entry(map);
            }
        }
        serde_json::from_value(Value::Array(entries))
            .map(Self)
            .map_err(D::Error::custom)
    }
}

fn normalize_entry(map: &mut Map<String, Value>) {
    let kind = match map.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        Some(_) => return,
        None => {
            map.insert("type".to_string(), Value::from("function"));
            "function".to_string()
        }
    };

    if matches!(kind.as_str(), "function" | "constructor" | "fallback" | "receive")
        && !map.contains_key("stateMutability")
    {
        let flag = |key: &str| map.get(key).and_then(Value::as_bool) == Some(true);
        let mutability = if flag("payable") {
            "payable"
        } else if flag("constant") {
            "view"
        } else {
            "nonpayable"
        };
        map.insert("stateMutability".to_string(), Value::from(mutability));
    }
    map.remove("constant");
    map.remove("payable");

    if matches!(kind.as_str(), "function" | "constructor") {
        map.entry("inputs").or_insert_with(|| Value::Array(Vec::new()));
    }
    if kind == "function" {
        map.entry("outputs").or_insert_with(|| Value::Array(Vec::new()));
    }
    for key in ["inputs", "outputs"] {
        if let Some(Value::Array(params)) = map.get_mut(key) {
            params.iter_mut().for_each(normalize_param);
        }
    }
}

fn normalize_param(param: &mut Value) {
    let Value::Object(map) = param else {
        return;
    };
    map.entry("name").or_insert_with(|| Value::from(""));
    if let Some(Value::Array(components)) = map.get_mut("components") {
        components.iter_mut().for_each(normalize_param);
    }
}
