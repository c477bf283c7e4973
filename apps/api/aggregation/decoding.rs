use alloy::primitives::hex;
use serde_json::Value;

/// Recursion guard for adversarially deep call-argument trees.
const MAX_DEPTH: usize = 64;

/// Walk a decoded call-argument tree and replace every `0x`-hex string whose
/// bytes are printable ASCII with the decoded text. Always builds a new
/// value; the input is never mutated.
pub fn decode_hex_values(value: &Value) -> Value {
    walk(value, 0)
}

fn walk(value: &Value, depth: usize) -> Value {
    if depth >= MAX_DEPTH {
        return value.clone();
    }

    match value {
        Value::String(s) => Value::String(decode_hex_string(s).unwrap_or_else(|| s.clone())),
        Value::Array(items) => Value::Array(items.iter().map(|v| walk(v, depth + 1)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), walk(v, depth + 1)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Decode a single `0x`-prefixed hex string to ASCII. `None` means "leave
/// the original alone": not hex, malformed hex, or non-printable bytes.
pub fn decode_hex_string(s: &str) -> Option<String> {
    let hex_body = s.strip_prefix("0x")?;
    if hex_body.is_empty() || hex_body.len() % 2 != 0 {
        return None;
    }

    let bytes = hex::decode(hex_body).ok()?;
    if !bytes.iter().all(|b| (0x20..=0x7e).contains(b)) {
        return None;
    }

    String::from_utf8(bytes).ok()
}
