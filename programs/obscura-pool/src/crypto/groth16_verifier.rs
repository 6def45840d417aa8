//! Groth16 Zero-Knowledge Proof Verifier
//!
//! Implements the verification equation
//! ```text
//! e(A, B) = e(α, β) · e(vk_x, γ) · e(C, δ)
//! ```
//! as one four-term product check
//! ```text
//! e(A, B) · e(-α, β) · e(-vk_x, γ) · e(-C, δ) = 1
//! ```
//! where `vk_x = IC[0] + Σ(public_input[i] · IC[i+1])`.
//!
//! Verification is FAIL-CLOSED: any malformed input yields `false`.
//!
//! ## References
//! - Groth16 paper: https://eprint.iacr.org/2016/260

use serde::Deserialize;

use super::curve_utils::{
    add_g1, negate_g1, scalar_mul_g1, validate_g1, validate_g2, G1Point, G2Point,
    G1_POINT_LEN, G2_POINT_LEN,
};
use super::field::{FieldArithmetic, Fq, Fq2, Fr};
use super::pairing::product_is_identity;
use crate::error::{MixerError, Result};
use crate::state::verification_key::VerificationKey;

// ============================================================================
// PROOF STRUCTURE
// ============================================================================

/// Expected proof data length in bytes.
/// A = 64 bytes (G1 uncompressed)
/// B = 128 bytes (G2 uncompressed)
/// C = 64 bytes (G1 uncompressed)
pub const PROOF_DATA_LEN: usize = 2 * G1_POINT_LEN + G2_POINT_LEN;

/// Groth16 proof: A, C ∈ G1 and B ∈ G2, plus the public inputs the
/// prover committed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    pub a: G1Point,
    pub b: G2Point,
    pub c: G1Point,
    pub public_inputs: Vec<Fr>,
}

impl Proof {
    pub fn new(a: G1Point, b: G2Point, c: G1Point, public_inputs: Vec<Fr>) -> Self {
        Self { a, b, c, public_inputs }
    }

    /// Parse proof points from the 256-byte A || B || C layout.
    ///
    /// Only field ranges are checked here; curve membership is checked
    /// during verification.
    pub fn from_bytes(data: &[u8], public_inputs: Vec<Fr>) -> Result<Self> {
        if data.len() != PROOF_DATA_LEN {
            return Err(MixerError::InvalidProofFormat(format!(
                "expected {} bytes, got {}",
                PROOF_DATA_LEN,
                data.len()
            )));
        }

        let mut a = [0u8; G1_POINT_LEN];
        let mut b = [0u8; G2_POINT_LEN];
        let mut c = [0u8; G1_POINT_LEN];
        a.copy_from_slice(&data[0..64]);
        b.copy_from_slice(&data[64..192]);
        c.copy_from_slice(&data[192..256]);

        Ok(Self::new(
            G1Point::from_bytes(&a)?,
            G2Point::from_bytes(&b)?,
            G1Point::from_bytes(&c)?,
            public_inputs,
        ))
    }

    /// Serialize proof points to bytes.
    pub fn to_bytes(&self) -> [u8; PROOF_DATA_LEN] {
        let mut bytes = [0u8; PROOF_DATA_LEN];
        bytes[0..64].copy_from_slice(&self.a.to_bytes());
        bytes[64..192].copy_from_slice(&self.b.to_bytes());
        bytes[192..256].copy_from_slice(&self.c.to_bytes());
        bytes
    }

    /// Load a snarkjs `proof.json` together with its `public.json`.
    pub fn from_snarkjs_json(proof_json: &str, public_json: &str) -> Result<Self> {
        let raw: SnarkjsProof = serde_json::from_str(proof_json)
            .map_err(|e| MixerError::InvalidProofFormat(e.to_string()))?;
        let inputs: Vec<String> = serde_json::from_str(public_json)
            .map_err(|e| MixerError::InvalidProofFormat(e.to_string()))?;

        let public_inputs = inputs
            .iter()
            .map(|s| Fr::from_decimal_str(s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(
            g1_from_snarkjs(&raw.pi_a)?,
            g2_from_snarkjs(&raw.pi_b)?,
            g1_from_snarkjs(&raw.pi_c)?,
            public_inputs,
        ))
    }
}

#[derive(Deserialize)]
struct SnarkjsProof {
    pi_a: Vec<String>,
    pi_b: Vec<Vec<String>>,
    pi_c: Vec<String>,
}

// ============================================================================
// SNARKJS POINT ENCODING
// ============================================================================

/// snarkjs writes G1 points as projective decimal triples `[x, y, "1"]`.
pub(crate) fn g1_from_snarkjs(coords: &[String]) -> Result<G1Point> {
    match coords {
        [x, y, z] if z == "1" => Ok(G1Point::new(
            Fq::from_decimal_str(x)?,
            Fq::from_decimal_str(y)?,
        )),
        [_, _, z] if z == "0" => Ok(G1Point::infinity()),
        _ => Err(MixerError::InvalidProofFormat(
            "G1 point must be [x, y, z] with z in {0, 1}".into(),
        )),
    }
}

/// G2 points are `[[x.c0, x.c1], [y.c0, y.c1], ["1", "0"]]`.
pub(crate) fn g2_from_snarkjs(coords: &[Vec<String>]) -> Result<G2Point> {
    let fq2 = |pair: &[String]| -> Result<Fq2> {
        match pair {
            [c0, c1] => Ok(Fq2::new(Fq::from_decimal_str(c0)?, Fq::from_decimal_str(c1)?)),
            _ => Err(MixerError::InvalidProofFormat(
                "Fq2 element must have two coordinates".into(),
            )),
        }
    };
    match coords {
        [x, y, z] => {
            let z = fq2(z)?;
            if z == Fq2::one() {
                Ok(G2Point::new(fq2(x)?, fq2(y)?))
            } else if z.is_zero() {
                Ok(G2Point::infinity())
            } else {
                Err(MixerError::InvalidProofFormat(
                    "G2 point must be affine (z = 1)".into(),
                ))
            }
        }
        _ => Err(MixerError::InvalidProofFormat(
            "G2 point must have three coordinates".into(),
        )),
    }
}

// ============================================================================
// VERIFICATION
// ============================================================================

/// Compute vk_x = IC[0] + Σ(inputs[i] · IC[i+1]).
pub fn compute_vk_x(ic: &[G1Point], inputs: &[Fr]) -> Result<G1Point> {
    let (base, rest) = ic
        .split_first()
        .ok_or_else(|| MixerError::InvalidVerificationKey("empty IC".into()))?;
    if rest.len() != inputs.len() {
        return Err(MixerError::InvalidPublicInputs {
            expected: rest.len(),
            actual: inputs.len(),
        });
    }

    let mut acc = base.clone();
    for (point, input) in rest.iter().zip(inputs) {
        let term = scalar_mul_g1(point, input.value())?;
        acc = add_g1(&acc, &term)?;
    }
    Ok(acc)
}

/// Verify a Groth16 proof against `key` and the expected public inputs.
///
/// Returns `false` when:
/// - `proof.public_inputs` differs from `public_inputs`
/// - the input count does not match `key.ic().len() - 1`
/// - A, B or C fails curve (and, for B, subgroup) validation
/// - the pairing product is not the identity
pub fn verify(proof: &Proof, key: &VerificationKey, public_inputs: &[Fr]) -> bool {
    match check(proof, key, public_inputs) {
        Ok(valid) => valid,
        Err(err) => {
            tracing::debug!(error = %err, "groth16 proof rejected as malformed");
            false
        }
    }
}

fn check(proof: &Proof, key: &VerificationKey, public_inputs: &[Fr]) -> Result<bool> {
    let expected = key.num_public_inputs();
    for actual in [public_inputs.len(), proof.public_inputs.len()] {
        if actual != expected {
            return Err(MixerError::InvalidPublicInputs { expected, actual });
        }
    }
    if proof.public_inputs != public_inputs {
        tracing::debug!("proof public inputs differ from expected inputs");
        return Ok(false);
    }

    validate_g1(&proof.a)?;
    validate_g2(&proof.b)?;
    validate_g1(&proof.c)?;

    let vk_x = compute_vk_x(key.ic(), public_inputs)?;

    // Key points were validated when the key was built.
    let g1s = [
        proof.a.clone(),
        negate_g1(key.alpha_g1())?,
        negate_g1(&vk_x)?,
        negate_g1(&proof.c)?,
    ];
    let g2s = [
        proof.b.clone(),
        key.beta_g2().clone(),
        key.gamma_g2().clone(),
        key.delta_g2().clone(),
    ];

    Ok(product_is_identity(&g1s, &g2s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TrapdoorSetup;
    use num_bigint::BigUint;

    fn inputs(values: &[u64]) -> Vec<Fr> {
        values.iter().map(|v| Fr::from_u64(*v)).collect()
    }

    #[test]
    fn test_valid_proof_verifies() {
        let setup = TrapdoorSetup::new(3);
        let inputs = inputs(&[1, 2, 3]);
        let proof = setup.prove(&inputs);
        assert!(verify(&proof, setup.key(), &inputs));
    }

    #[test]
    fn test_verify_is_deterministic() {
        let setup = TrapdoorSetup::new(2);
        let inputs = inputs(&[7, 9]);
        let proof = setup.prove(&inputs);
        let first = verify(&proof, setup.key(), &inputs);
        for _ in 0..3 {
            assert_eq!(verify(&proof, setup.key(), &inputs), first);
        }
    }

    #[test]
    fn test_wrong_inputs_rejected() {
        let setup = TrapdoorSetup::new(2);
        let good = inputs(&[7, 9]);
        let mut proof = setup.prove(&good);
        let bad = inputs(&[7, 10]);
        // Mismatch with the proof's committed inputs
        assert!(!verify(&proof, setup.key(), &bad));
        // Consistent but wrong inputs still fail the pairing
        proof.public_inputs = bad.clone();
        assert!(!verify(&proof, setup.key(), &bad));
    }

    #[test]
    fn test_tampered_points_rejected() {
        let setup = TrapdoorSetup::new(1);
        let inputs = inputs(&[5]);
        let proof = setup.prove(&inputs);

        let mut swapped = proof.clone();
        swapped.a = proof.c.clone();
        assert!(!verify(&swapped, setup.key(), &inputs));

        let mut off_curve = proof.clone();
        off_curve.c = G1Point::new(Fq::from_u64(1), Fq::from_u64(3));
        assert!(!verify(&off_curve, setup.key(), &inputs));
    }

    #[test]
    fn test_wrong_input_count_rejected() {
        let setup = TrapdoorSetup::new(2);
        let inputs = inputs(&[1]);
        let proof = Proof::new(
            G1Point::generator(),
            G2Point::generator(),
            G1Point::generator(),
            inputs.clone(),
        );
        assert!(!verify(&proof, setup.key(), &inputs));
    }

    #[test]
    fn test_input_count_error_names_offending_vector() {
        let setup = TrapdoorSetup::new(2);
        let expected = inputs(&[1, 2]);
        let mut proof = setup.prove(&expected);
        proof.public_inputs.pop();
        assert_eq!(
            check(&proof, setup.key(), &expected),
            Err(MixerError::InvalidPublicInputs {
                expected: 2,
                actual: 1
            })
        );

        let proof = setup.prove(&expected);
        assert_eq!(
            check(&proof, setup.key(), &inputs(&[1, 2, 3])),
            Err(MixerError::InvalidPublicInputs {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_compute_vk_x_linear_combination() {
        let g = G1Point::generator();
        let ic = vec![
            scalar_mul_g1(&g, &BigUint::from(2u32)).unwrap(),
            scalar_mul_g1(&g, &BigUint::from(3u32)).unwrap(),
            scalar_mul_g1(&g, &BigUint::from(5u32)).unwrap(),
        ];
        // 2 + 3·4 + 5·6 = 44
        let vk_x = compute_vk_x(&ic, &inputs(&[4, 6])).unwrap();
        assert_eq!(vk_x, scalar_mul_g1(&g, &BigUint::from(44u32)).unwrap());
    }

    #[test]
    fn test_proof_bytes_roundtrip() {
        let setup = TrapdoorSetup::new(1);
        let proof = setup.prove(&inputs(&[8]));
        let parsed = Proof::from_bytes(&proof.to_bytes(), proof.public_inputs.clone()).unwrap();
        assert_eq!(parsed, proof);
    }

    #[test]
    fn test_invalid_proof_length() {
        let err = Proof::from_bytes(&[0u8; 100], vec![]).unwrap_err();
        assert!(matches!(err, MixerError::InvalidProofFormat(_)));
        let err = Proof::from_bytes(&[0u8; 300], vec![]).unwrap_err();
        assert!(matches!(err, MixerError::InvalidProofFormat(_)));
    }

    #[test]
    fn test_snarkjs_proof_json() {
        let setup = TrapdoorSetup::new(1);
        let proof = setup.prove(&inputs(&[8]));
        let (proof_json, public_json) = setup.to_snarkjs_json(&proof);
        let parsed = Proof::from_snarkjs_json(&proof_json, &public_json).unwrap();
        assert_eq!(parsed, proof);
        assert!(verify(&parsed, setup.key(), &parsed.public_inputs.clone()));
    }

    #[test]
    fn test_snarkjs_rejects_projective_z() {
        let json = r#"{"pi_a":["1","2","5"],"pi_b":[["0","0"],["0","0"],["0","0"]],"pi_c":["1","2","1"]}"#;
        assert!(Proof::from_snarkjs_json(json, "[]").is_err());
    }
}
