//! Test-only trusted setup with known trapdoor
//!
//! With α, β, γ, δ and the IC scalars k_i known, a valid proof for any
//! inputs x is A = a·G1, B = b·G2, C = c·G1 with
//! ```text
//! c = (a·b - α·β - x·γ) / δ,   x = k_0 + Σ k_{i+1}·input_i
//! ```
//! which lets the tests drive the real pairing check end to end.

use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde_json::json;

use crate::crypto::curve_utils::{scalar_mul_g1, scalar_mul_g2, G1Point, G2Point};
use crate::crypto::field::{FieldArithmetic, Fq, Fr};
use crate::crypto::groth16_verifier::Proof;
use crate::state::VerificationKey;

pub struct TrapdoorSetup {
    alpha: Fr,
    beta: Fr,
    gamma: Fr,
    delta: Fr,
    ic_scalars: Vec<Fr>,
    key: VerificationKey,
}

fn random_nonzero(rng: &mut StdRng) -> Fr {
    loop {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        let value = Fr::reduce(&BigUint::from_bytes_be(&bytes));
        if !value.is_zero() {
            return value;
        }
    }
}

fn g1_mul(k: &Fr) -> G1Point {
    scalar_mul_g1(&G1Point::generator(), k.value()).expect("generator is valid")
}

fn g2_mul(k: &Fr) -> G2Point {
    scalar_mul_g2(&G2Point::generator(), k.value()).expect("generator is valid")
}

impl TrapdoorSetup {
    /// Deterministic setup for a circuit with `num_inputs` public inputs.
    pub fn new(num_inputs: usize) -> Self {
        Self::with_seed(num_inputs, 0x0b5c_0a2a)
    }

    pub fn with_seed(num_inputs: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let alpha = random_nonzero(&mut rng);
        let beta = random_nonzero(&mut rng);
        let gamma = random_nonzero(&mut rng);
        let delta = random_nonzero(&mut rng);
        let ic_scalars: Vec<Fr> = (0..=num_inputs).map(|_| random_nonzero(&mut rng)).collect();

        let key = VerificationKey::new(
            g1_mul(&alpha),
            g2_mul(&beta),
            g2_mul(&gamma),
            g2_mul(&delta),
            ic_scalars.iter().map(g1_mul).collect(),
        )
        .expect("trapdoor key is valid");

        Self {
            alpha,
            beta,
            gamma,
            delta,
            ic_scalars,
            key,
        }
    }

    pub fn key(&self) -> &VerificationKey {
        &self.key
    }

    /// Valid proof for `inputs`.
    pub fn prove(&self, inputs: &[Fr]) -> Proof {
        assert_eq!(inputs.len() + 1, self.ic_scalars.len(), "input count");
        let mut rng = StdRng::seed_from_u64(inputs.len() as u64 ^ 0x5eed);
        let a = random_nonzero(&mut rng);
        let b = random_nonzero(&mut rng);

        let x = self.ic_scalars[1..]
            .iter()
            .zip(inputs)
            .fold(self.ic_scalars[0].clone(), |acc, (k, input)| {
                acc.add(&k.mul(input))
            });

        let numerator = a
            .mul(&b)
            .sub(&self.alpha.mul(&self.beta))
            .sub(&x.mul(&self.gamma));
        let c = numerator.mul(&self.delta.inverse().expect("delta is non-zero"));

        Proof::new(g1_mul(&a), g2_mul(&b), g1_mul(&c), inputs.to_vec())
    }

    /// snarkjs `verification_key.json` for this setup.
    pub fn key_to_snarkjs_json(&self) -> String {
        let ic: Vec<_> = self.key.ic().iter().map(g1_json).collect();
        json!({
            "protocol": "groth16",
            "curve": "bn128",
            "nPublic": self.key.num_public_inputs(),
            "vk_alpha_1": g1_json(self.key.alpha_g1()),
            "vk_beta_2": g2_json(self.key.beta_g2()),
            "vk_gamma_2": g2_json(self.key.gamma_g2()),
            "vk_delta_2": g2_json(self.key.delta_g2()),
            "IC": ic,
        })
        .to_string()
    }

    /// snarkjs `proof.json` and `public.json` for `proof`.
    pub fn to_snarkjs_json(&self, proof: &Proof) -> (String, String) {
        let proof_json = json!({
            "pi_a": g1_json(&proof.a),
            "pi_b": g2_json(&proof.b),
            "pi_c": g1_json(&proof.c),
            "protocol": "groth16",
            "curve": "bn128",
        })
        .to_string();
        let public: Vec<String> = proof.public_inputs.iter().map(|i| i.to_string()).collect();
        (proof_json, json!(public).to_string())
    }
}

fn g1_json(p: &G1Point) -> serde_json::Value {
    json!([p.x.to_string(), p.y.to_string(), "1"])
}

fn g2_json(p: &G2Point) -> serde_json::Value {
    json!([
        [p.x.c0.to_string(), p.x.c1.to_string()],
        [p.y.c0.to_string(), p.y.c1.to_string()],
        ["1", "0"],
    ])
}

/// Point that passes field-range checks but is off the curve.
pub fn off_curve_g1() -> G1Point {
    G1Point::new(Fq::from_u64(1), Fq::from_u64(3))
}
