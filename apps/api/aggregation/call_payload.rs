use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::decoding::decode_hex_values;

/// One recipient of a proposed spend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub address: String,
    pub amount: String,
}

/// What the interpreter extracted from a proposal's call arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallSummary {
    pub asset_id: Option<String>,
    pub requested: U256,
    pub beneficiaries: Vec<Beneficiary>,
}

/// The two spend shapes recognized in call arguments. A direct `amount`
/// means a single spend; a `calls` list means a batch of spends. Anything
/// else carries no spend.
#[derive(Debug)]
enum SpendShape {
    Single {
        amount: Value,
        beneficiary: Option<Value>,
    },
    Batch(Vec<Value>),
    None,
}

fn classify_spend(args: &Value) -> SpendShape {
    if let Some(amount) = args.get("amount") {
        return SpendShape::Single {
            amount: amount.clone(),
            beneficiary: args.get("beneficiary").cloned(),
        };
    }

    match args.get("calls") {
        Some(Value::Array(calls)) if !calls.is_empty() => SpendShape::Batch(calls.clone()),
        _ => SpendShape::None,
    }
}

/// Interpret a proposal's decoded call arguments: extract the referenced
/// asset, the total requested amount, and the beneficiary list.
pub fn interpret_proposed_call(args: &Value) -> CallSummary {
    let asset_id = extract_asset_id(args);
    let decoded = decode_hex_values(args);

    let mut requested = U256::ZERO;
    let mut beneficiaries = Vec::new();

    match classify_spend(&decoded) {
        SpendShape::Single { amount, beneficiary } => {
            if let Some(amount) = parse_amount(&amount) {
                requested = amount;
                if let Some(address) = beneficiary.as_ref().and_then(beneficiary_address) {
                    beneficiaries.push(Beneficiary {
                        address,
                        amount: amount.to_string(),
                    });
                }
            }
        }
        SpendShape::Batch(calls) => {
            for call in &calls {
                let Some(raw) = call.get("amount") else {
                    continue;
                };
                let Some(amount) = parse_amount(raw) else {
                    continue;
                };

                requested = requested.saturating_add(amount);
                if let Some(address) = call.get("beneficiary").and_then(beneficiary_address) {
                    beneficiaries.push(Beneficiary {
                        address,
                        amount: amount.to_string(),
                    });
                }
            }
        }
        SpendShape::None => {}
    }

    CallSummary {
        asset_id,
        requested,
        beneficiaries,
    }
}

/// Asset id from a multi-location asset kind: the `GeneralIndex` entry of
/// the interior component list, when present.
fn extract_asset_id(args: &Value) -> Option<String> {
    let interior = args.pointer("/assetKind/assetId/value/interior/value")?;
    let components = interior.as_array()?;

    components
        .iter()
        .find(|entry| entry.get("__kind").and_then(Value::as_str) == Some("GeneralIndex"))
        .and_then(|entry| entry.get("value"))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

/// Exact `U256` from a JSON amount: decimal strings, `0x` hex strings, or
/// non-negative integers. Anything else is skipped with a warning.
fn parse_amount(value: &Value) -> Option<U256> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().map(U256::from),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x") {
                Some(hex_body) => U256::from_str_radix(hex_body, 16).ok(),
                None => U256::from_str_radix(s, 10).ok(),
            }
        }
        _ => None,
    };

    if parsed.is_none() {
        warn!(amount = %value, "Unparseable amount in proposed call args, skipping");
    }

    parsed
}

/// A beneficiary is either a plain address string or a multi-location whose
/// account id sits at `value.interior.value.id` (already hex-decoded where
/// applicable).
fn beneficiary_address(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => value
            .pointer("/value/interior/value/id")
            .or_else(|| value.pointer("/id"))
            .and_then(Value::as_str)
            .map(str::to_owned),
        _ => None,
    }
}
