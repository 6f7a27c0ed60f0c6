use forensight::proof::{canonical_json, verify, ProofCheck};
use serde_json::{json, Value};

const EXPECTED: &str = "e71e447172988407b1a4a3f2ad05e5849bdb8087dbb34a8fc4f59cd411fff292";

fn meta(proof_hash: &str) -> Value {
    json!({
        "status": "success",
        "meta_report": {
            "session_id": "c0ffee",
            "results": [{
                "file": "café.jpg",
                "type": "image",
                "report": {
                    "verdict": "Likely Original",
                    "authenticity_score": 0.88,
                    "tamperingPercentage": 12.0,
                    "explanation": "No splicing \u{2014} clean.\nSecond line"
                }
            }],
            "final_summary": "Résumé: nothing suspicious 😀",
            "entities": [{"name": "Zoë", "type": "PERSON"}],
            "relations": [],
            "proof_hash": proof_hash,
            "blockchain_tx": {"tx_hash": "mock_tx_0xe71e447172988407", "chain_id": "STUB_TESTNET"}
        }
    })
}

#[test]
fn canonical_json_sorts_keys_and_escapes_non_ascii() {
    let v = json!({"b": "é😀", "a": [1, 2.5]});
    assert_eq!(canonical_json(&v), r#"{"a":[1,2.5],"b":"\u00e9\ud83d\ude00"}"#);
}

#[test]
fn backend_hash_verifies() {
    assert_eq!(verify(&meta(EXPECTED)), ProofCheck::Verified);
}

#[test]
fn edited_report_is_a_mismatch() {
    let mut raw = meta(EXPECTED);
    raw["meta_report"]["final_summary"] = json!("Résumé: all clear");
    match verify(&raw) {
        ProofCheck::Mismatch { expected, actual } => {
            assert_eq!(expected, EXPECTED);
            assert_ne!(actual, EXPECTED);
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[test]
fn report_without_hash_is_absent() {
    assert_eq!(
        verify(&json!({"metaReport": {"finalSummary": "x"}})),
        ProofCheck::Absent
    );
    assert_eq!(verify(&json!("not an object")), ProofCheck::Absent);
}

#[test]
fn floats_use_python_repr_form() {
    let v = json!([1e-05, 1e16, 1e15, 0.0001, 1.5e-07, 123456789012345680.0, -0.0, 3.0, 2.5e-300, 7]);
    assert_eq!(
        canonical_json(&v),
        "[1e-05,1e+16,1000000000000000.0,0.0001,1.5e-07,1.2345678901234568e+17,-0.0,3.0,2.5e-300,7]"
    );
}

#[test]
fn report_with_extreme_scores_verifies() {
    let raw = json!({"meta_report": {
        "session_id": "s",
        "results": [{"file": "tiny.jpg", "type": "image", "report": {
            "verdict": "Likely Original",
            "tamperingPercentage": 1e-05,
            "authenticity_score": 0.99999,
            "pixels": 1e16,
            "ratio": 1.5e-07,
            "big": 123456789012345680.0,
            "neg": -0.00025,
            "whole": 3.0,
            "count": 7
        }}],
        "final_summary": "x",
        "proof_hash": "68a99680fe7eace6ed5cd5130b280faa25f218baf097e3affe2478f734f15c13"
    }});
    assert_eq!(verify(&raw), ProofCheck::Verified);
}
