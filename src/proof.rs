//! Local re-computation of the backend's report proof hash.
//!
//! The backend hashes the meta report (before `proof_hash` and
//! `blockchain_tx` are attached) as compact, key-sorted, ASCII-only JSON.

use crate::{normalize::unwrap_envelope, util::sha256_hex};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

const EXCLUDED_KEYS: &[&str] = &["proof_hash", "proofHash", "blockchain_tx", "blockchainTx"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProofCheck {
    Verified,
    Mismatch { expected: String, actual: String },
    Absent,
}

pub fn verify(raw: &Value) -> ProofCheck {
    let Ok(meta) = unwrap_envelope(raw) else {
        return ProofCheck::Absent;
    };
    let Some(expected) = meta
        .get("proof_hash")
        .or_else(|| meta.get("proofHash"))
        .and_then(Value::as_str)
    else {
        return ProofCheck::Absent;
    };

    let mut body = meta.clone();
    for key in EXCLUDED_KEYS {
        body.remove(*key);
    }
    let actual = sha256_hex(canonical_json(&Value::Object(body)).as_bytes());

    if actual.eq_ignore_ascii_case(expected.trim_start_matches("0x")) {
        ProofCheck::Verified
    } else {
        ProofCheck::Mismatch {
            expected: expected.to_string(),
            actual,
        }
    }
}

/// Compact JSON with sorted keys, non-printable-ASCII chars as `\uXXXX` and
/// floats in Python `repr` form (`1e-05`, `1e+16`, `3.0`).
pub fn canonical_json(v: &Value) -> String {
    let mut out = String::new();
    write_canonical(&mut out, v);
    out
}

fn write_canonical(out: &mut String, v: &Value) {
    match v {
        Value::Null | Value::Bool(_) => out.push_str(&v.to_string()),
        Value::Number(n) => match (n.is_f64(), n.as_f64()) {
            (true, Some(f)) => out.push_str(&python_float(f)),
            _ => out.push_str(&n.to_string()),
        },
        Value::String(s) => write_ascii_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_ascii_string(out, key);
                out.push(':');
                write_canonical(out, &map[key.as_str()]);
            }
            out.push('}');
        }
    }
}

fn write_ascii_string(out: &mut String, s: &str) {
    let quoted = Value::String(s.to_string()).to_string();
    for ch in quoted.chars() {
        if (ch as u32) < 0x7f {
            out.push(ch);
            continue;
        }
        let mut units = [0u16; 2];
        for unit in ch.encode_utf16(&mut units) {
            let _ = write!(out, "\\u{:04x}", unit);
        }
    }
}

/// Shortest round-trip digits, fixed notation when the decimal exponent is in
/// `-4..16`, scientific with a signed two-digit exponent otherwise.
fn python_float(f: f64) -> String {
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let sign = if f.is_sign_negative() { "-" } else { "" };

    if (-4..16).contains(&exp) {
        let point = exp + 1;
        let body = if point <= 0 {
            format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
        } else if point as usize >= digits.len() {
            format!("{digits}{}.0", "0".repeat(point as usize - digits.len()))
        } else {
            let (int, frac) = digits.split_at(point as usize);
            format!("{int}.{frac}")
        };
        return format!("{sign}{body}");
    }

    let (first, rest) = digits.split_at(1);
    let frac = if rest.is_empty() {
        String::new()
    } else {
        format!(".{rest}")
    };
    let exp_sign = if exp < 0 { '-' } else { '+' };
    format!("{sign}{first}{frac}e{exp_sign}{:02}", exp.abs())
}
