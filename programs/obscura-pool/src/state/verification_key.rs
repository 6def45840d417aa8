//! Verification Key for Groth16 proofs
//!
//! Stores the verification key from the trusted setup ceremony.
//! The VK is used to verify withdrawal proofs.
//!
//! # Security
//! - VK MUST come from a properly executed trusted setup
//! - Compromised VK = compromised pool (fake proofs possible)
//! - Every point is validated once at construction; the key is immutable
//!   afterwards and exposes no setters

use serde::Deserialize;

use crate::crypto::curve_utils::{
    validate_g1, validate_g2, G1Point, G2Point, G1_POINT_LEN, G2_POINT_LEN,
};
use crate::crypto::groth16_verifier::{g1_from_snarkjs, g2_from_snarkjs};
use crate::error::{MixerError, Result};

/// Fixed byte prefix of the serialized key: α, β, γ, δ.
const FIXED_LEN: usize = G1_POINT_LEN + 3 * G2_POINT_LEN;

/// Validated Groth16 verification key.
///
/// # Point Encodings
/// - G1 points: 64 bytes (32 bytes x, 32 bytes y)
/// - G2 points: 128 bytes, EIP-197 order (x.c1, x.c0, y.c1, y.c0)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationKey {
    /// α ∈ G1
    alpha_g1: G1Point,

    /// β ∈ G2
    beta_g2: G2Point,

    /// γ ∈ G2 - paired with the public input accumulator
    gamma_g2: G2Point,

    /// δ ∈ G2 - paired with proof point C
    delta_g2: G2Point,

    /// IC[0] + Σ(public_input[i] * IC[i+1])
    ///
    /// For the withdrawal circuit with 4 public inputs
    /// (merkle_root, nullifier_hash, recipient, amount) this holds 5 points.
    ic: Vec<G1Point>,
}

impl VerificationKey {
    /// Build a key, validating every point.
    pub fn new(
        alpha_g1: G1Point,
        beta_g2: G2Point,
        gamma_g2: G2Point,
        delta_g2: G2Point,
        ic: Vec<G1Point>,
    ) -> Result<Self> {
        if ic.is_empty() {
            return Err(MixerError::InvalidVerificationKey(
                "IC must contain at least one point".into(),
            ));
        }

        let invalid = |name: &str, err: MixerError| {
            MixerError::InvalidVerificationKey(format!("{}: {}", name, err))
        };
        validate_g1(&alpha_g1).map_err(|e| invalid("alpha", e))?;
        validate_g2(&beta_g2).map_err(|e| invalid("beta", e))?;
        validate_g2(&gamma_g2).map_err(|e| invalid("gamma", e))?;
        validate_g2(&delta_g2).map_err(|e| invalid("delta", e))?;
        for (i, point) in ic.iter().enumerate() {
            validate_g1(point).map_err(|e| invalid(&format!("IC[{}]", i), e))?;
        }

        Ok(Self {
            alpha_g1,
            beta_g2,
            gamma_g2,
            delta_g2,
            ic,
        })
    }

    /// Parse `alpha || beta || gamma || delta || IC[0] || IC[1] || ...`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < FIXED_LEN + G1_POINT_LEN
            || (data.len() - FIXED_LEN) % G1_POINT_LEN != 0
        {
            return Err(MixerError::InvalidVerificationKey(format!(
                "unexpected key length {}",
                data.len()
            )));
        }

        let g1_at = |offset: usize| -> Result<G1Point> {
            let mut buf = [0u8; G1_POINT_LEN];
            buf.copy_from_slice(&data[offset..offset + G1_POINT_LEN]);
            G1Point::from_bytes(&buf)
        };
        let g2_at = |offset: usize| -> Result<G2Point> {
            let mut buf = [0u8; G2_POINT_LEN];
            buf.copy_from_slice(&data[offset..offset + G2_POINT_LEN]);
            G2Point::from_bytes(&buf)
        };

        let alpha = g1_at(0)?;
        let beta = g2_at(G1_POINT_LEN)?;
        let gamma = g2_at(G1_POINT_LEN + G2_POINT_LEN)?;
        let delta = g2_at(G1_POINT_LEN + 2 * G2_POINT_LEN)?;
        let ic = (FIXED_LEN..data.len())
            .step_by(G1_POINT_LEN)
            .map(g1_at)
            .collect::<Result<Vec<_>>>()?;

        Self::new(alpha, beta, gamma, delta, ic)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FIXED_LEN + self.ic.len() * G1_POINT_LEN);
        out.extend_from_slice(&self.alpha_g1.to_bytes());
        out.extend_from_slice(&self.beta_g2.to_bytes());
        out.extend_from_slice(&self.gamma_g2.to_bytes());
        out.extend_from_slice(&self.delta_g2.to_bytes());
        for point in &self.ic {
            out.extend_from_slice(&point.to_bytes());
        }
        out
    }

    /// Load a snarkjs `verification_key.json`.
    pub fn from_snarkjs_json(json: &str) -> Result<Self> {
        let raw: SnarkjsVerificationKey = serde_json::from_str(json)
            .map_err(|e| MixerError::InvalidVerificationKey(e.to_string()))?;

        if let Some(protocol) = raw.protocol.as_deref() {
            if protocol != "groth16" {
                return Err(MixerError::InvalidVerificationKey(format!(
                    "unsupported protocol {}",
                    protocol
                )));
            }
        }
        if let Some(n_public) = raw.n_public {
            if n_public + 1 != raw.ic.len() {
                return Err(MixerError::InvalidVerificationKey(format!(
                    "nPublic {} does not match {} IC points",
                    n_public,
                    raw.ic.len()
                )));
            }
        }

        let ic = raw
            .ic
            .iter()
            .map(|p| g1_from_snarkjs(p))
            .collect::<Result<Vec<_>>>()?;

        Self::new(
            g1_from_snarkjs(&raw.vk_alpha_1)?,
            g2_from_snarkjs(&raw.vk_beta_2)?,
            g2_from_snarkjs(&raw.vk_gamma_2)?,
            g2_from_snarkjs(&raw.vk_delta_2)?,
            ic,
        )
    }

    pub fn alpha_g1(&self) -> &G1Point {
        &self.alpha_g1
    }

    pub fn beta_g2(&self) -> &G2Point {
        &self.beta_g2
    }

    pub fn gamma_g2(&self) -> &G2Point {
        &self.gamma_g2
    }

    pub fn delta_g2(&self) -> &G2Point {
        &self.delta_g2
    }

    pub fn ic(&self) -> &[G1Point] {
        &self.ic
    }

    /// Expected number of public inputs (IC length - 1).
    pub fn num_public_inputs(&self) -> usize {
        self.ic.len() - 1
    }
}

#[derive(Deserialize)]
struct SnarkjsVerificationKey {
    protocol: Option<String>,
    #[serde(rename = "nPublic")]
    n_public: Option<usize>,
    vk_alpha_1: Vec<String>,
    vk_beta_2: Vec<Vec<String>>,
    vk_gamma_2: Vec<Vec<String>>,
    vk_delta_2: Vec<Vec<String>>,
    #[serde(rename = "IC")]
    ic: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::field::{FieldArithmetic, Fq};
    use crate::test_utils::TrapdoorSetup;

    #[test]
    fn test_bytes_roundtrip() {
        let setup = TrapdoorSetup::new(4);
        let bytes = setup.key().to_bytes();
        assert_eq!(bytes.len(), 64 + 3 * 128 + 5 * 64);
        assert_eq!(&VerificationKey::from_bytes(&bytes).unwrap(), setup.key());
    }

    #[test]
    fn test_snarkjs_roundtrip() {
        let setup = TrapdoorSetup::new(4);
        let json = setup.key_to_snarkjs_json();
        let key = VerificationKey::from_snarkjs_json(&json).unwrap();
        assert_eq!(&key, setup.key());
        assert_eq!(key.num_public_inputs(), 4);
    }

    #[test]
    fn test_empty_ic_rejected() {
        let err = VerificationKey::new(
            G1Point::generator(),
            G2Point::generator(),
            G2Point::generator(),
            G2Point::generator(),
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, MixerError::InvalidVerificationKey(_)));
    }

    #[test]
    fn test_off_curve_point_rejected() {
        let bad = G1Point::new(Fq::from_u64(1), Fq::from_u64(3));
        let err = VerificationKey::new(
            G1Point::generator(),
            G2Point::generator(),
            G2Point::generator(),
            G2Point::generator(),
            vec![G1Point::generator(), bad],
        )
        .unwrap_err();
        assert!(matches!(err, MixerError::InvalidVerificationKey(_)));
    }

    #[test]
    fn test_truncated_bytes_rejected() {
        let setup = TrapdoorSetup::new(1);
        let bytes = setup.key().to_bytes();
        assert!(VerificationKey::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        assert!(VerificationKey::from_bytes(&bytes[..FIXED_LEN]).is_err());
    }

    #[test]
    fn test_snarkjs_n_public_mismatch() {
        let setup = TrapdoorSetup::new(2);
        let json = setup
            .key_to_snarkjs_json()
            .replace("\"nPublic\":2", "\"nPublic\":3");
        assert!(VerificationKey::from_snarkjs_json(&json).is_err());
    }
}
