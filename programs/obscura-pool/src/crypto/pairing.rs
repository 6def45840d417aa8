//! Optimal-ate pairing product check over BN254
//!
//! Points are validated with this crate's own arithmetic, then converted
//! into arkworks affine points for the Miller loop and final
//! exponentiation. Returns true iff Π e(g1ᵢ, g2ᵢ) = 1 in GT.

use ark_bn254::{Bn254, Fq as ArkFq, Fq2 as ArkFq2, G1Affine, G2Affine};
use ark_ec::pairing::Pairing;
use ark_ff::{One, PrimeField};
#[cfg(test)]
use ark_ff::BigInteger;
#[cfg(test)]
use num_bigint::BigUint;

use super::curve_utils::{validate_g1, validate_g2, G1Point, G2Point};
use super::field::{Fq, Fq2};
use crate::error::{MixerError, Result};

/// Check Π e(g1s[i], g2s[i]) == 1.
///
/// Every point is validated first (G2 includes the subgroup check). An
/// empty product is the identity.
pub fn pairing_product_check(g1s: &[G1Point], g2s: &[G2Point]) -> Result<bool> {
    if g1s.len() != g2s.len() {
        return Err(MixerError::PairingLengthMismatch {
            g1: g1s.len(),
            g2: g2s.len(),
        });
    }
    for p in g1s {
        validate_g1(p)?;
    }
    for p in g2s {
        validate_g2(p)?;
    }
    Ok(product_is_identity(g1s, g2s))
}

/// Pairing product over points the caller has already validated.
pub(crate) fn product_is_identity(g1s: &[G1Point], g2s: &[G2Point]) -> bool {
    let lhs: Vec<G1Affine> = g1s.iter().map(to_ark_g1).collect();
    let rhs: Vec<G2Affine> = g2s.iter().map(to_ark_g2).collect();
    Bn254::multi_pairing(lhs, rhs).0.is_one()
}

// ============================================================================
// CONVERSIONS
// ============================================================================

fn to_ark_fq(value: &Fq) -> ArkFq {
    ArkFq::from_be_bytes_mod_order(&value.to_bytes_be())
}

fn to_ark_fq2(value: &Fq2) -> ArkFq2 {
    ArkFq2::new(to_ark_fq(&value.c0), to_ark_fq(&value.c1))
}

pub(crate) fn to_ark_g1(p: &G1Point) -> G1Affine {
    if p.is_infinity() {
        return G1Affine::identity();
    }
    G1Affine::new_unchecked(to_ark_fq(&p.x), to_ark_fq(&p.y))
}

pub(crate) fn to_ark_g2(p: &G2Point) -> G2Affine {
    if p.is_infinity() {
        return G2Affine::identity();
    }
    G2Affine::new_unchecked(to_ark_fq2(&p.x), to_ark_fq2(&p.y))
}

#[cfg(test)]
fn from_ark_fq(value: &ArkFq) -> Fq {
    Fq::reduce(&BigUint::from_bytes_be(&value.into_bigint().to_bytes_be()))
}

#[cfg(test)]
pub(crate) fn from_ark_g1(p: &G1Affine) -> G1Point {
    if p.infinity {
        return G1Point::infinity();
    }
    G1Point::new(from_ark_fq(&p.x), from_ark_fq(&p.y))
}

#[cfg(test)]
pub(crate) fn from_ark_g2(p: &G2Affine) -> G2Point {
    if p.infinity {
        return G2Point::infinity();
    }
    G2Point::new(
        Fq2::new(from_ark_fq(&p.x.c0), from_ark_fq(&p.x.c1)),
        Fq2::new(from_ark_fq(&p.y.c0), from_ark_fq(&p.y.c1)),
    )
}
