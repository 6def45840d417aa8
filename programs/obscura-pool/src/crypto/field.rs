//! Prime Field Arithmetic for BN254
//!
//! ## Field Parameters
//! - Base field: Fq with q = 21888242871839275222246405745257275088696311157297823662689037894645226208583
//! - Scalar field: Fr with r = 21888242871839275222246405745257275088548364400416034343698204186575808495617
//! - Quadratic extension: Fq2 = Fq[u] / (u² + 1)
//!
//! Every `FieldElement` is reduced into `[0, modulus)` at construction.
//! Out-of-range integers are rejected, never silently normalized, unless the
//! caller explicitly asks for `reduce`.

use std::fmt;
use std::marker::PhantomData;
use std::sync::OnceLock;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use crate::error::{MixerError, Result};

// ============================================================================
// BN254 FIELD PARAMETERS
// ============================================================================

/// BN254 base field modulus (q) - big-endian bytes
pub const BN254_FIELD_MODULUS: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29,
    0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x97, 0x81, 0x6a, 0x91, 0x68, 0x71, 0xca, 0x8d,
    0x3c, 0x20, 0x8c, 0x16, 0xd8, 0x7c, 0xfd, 0x47,
];

/// BN254 scalar field modulus (r) - order of G1 - big-endian bytes
pub const BN254_SCALAR_MODULUS: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29,
    0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91,
    0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x01,
];

/// Selects the modulus a `FieldElement` is reduced by.
pub trait FieldModulus:
    Clone + Copy + fmt::Debug + PartialEq + Eq + std::hash::Hash + Send + Sync + 'static
{
    /// Short name used in error messages.
    const NAME: &'static str;

    fn modulus() -> &'static BigUint;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BaseModulus;

impl FieldModulus for BaseModulus {
    const NAME: &'static str = "base";

    fn modulus() -> &'static BigUint {
        static Q: OnceLock<BigUint> = OnceLock::new();
        Q.get_or_init(|| BigUint::from_bytes_be(&BN254_FIELD_MODULUS))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScalarModulus;

impl FieldModulus for ScalarModulus {
    const NAME: &'static str = "scalar";

    fn modulus() -> &'static BigUint {
        static R: OnceLock<BigUint> = OnceLock::new();
        R.get_or_init(|| BigUint::from_bytes_be(&BN254_SCALAR_MODULUS))
    }
}

/// Base field modulus q as a big integer.
pub fn base_modulus() -> &'static BigUint {
    BaseModulus::modulus()
}

/// Scalar field modulus r as a big integer.
pub fn scalar_modulus() -> &'static BigUint {
    ScalarModulus::modulus()
}

// ============================================================================
// FIELD ARITHMETIC TRAIT
// ============================================================================

/// Operations shared by Fq and Fq2, so the curve formulas can be written once
/// for G1 and G2.
pub trait FieldArithmetic: Clone + PartialEq + fmt::Debug {
    fn zero() -> Self;
    fn one() -> Self;
    fn from_u64(value: u64) -> Self;
    fn is_zero(&self) -> bool;
    fn add(&self, rhs: &Self) -> Self;
    fn sub(&self, rhs: &Self) -> Self;
    fn mul(&self, rhs: &Self) -> Self;
    fn neg(&self) -> Self;
    fn inverse(&self) -> Result<Self>;

    fn square(&self) -> Self {
        self.mul(self)
    }

    fn double(&self) -> Self {
        self.add(self)
    }
}

// ============================================================================
// PRIME FIELD ELEMENT
// ============================================================================

/// Integer reduced modulo `M::modulus()`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldElement<M: FieldModulus> {
    value: BigUint,
    _modulus: PhantomData<M>,
}

/// Element of the BN254 base field (curve coordinates).
pub type Fq = FieldElement<BaseModulus>;

/// Element of the BN254 scalar field (proof scalars, public inputs, hashes).
pub type Fr = FieldElement<ScalarModulus>;

impl<M: FieldModulus> FieldElement<M> {
    /// Wrap an integer that must already be below the modulus.
    pub fn new(value: BigUint) -> Result<Self> {
        if &value >= M::modulus() {
            return Err(MixerError::FieldElementOutOfRange { field: M::NAME });
        }
        Ok(Self::from_reduced(value))
    }

    /// Reduce an arbitrary integer into the field.
    pub fn reduce(value: &BigUint) -> Self {
        Self::from_reduced(value % M::modulus())
    }

    fn from_reduced(value: BigUint) -> Self {
        Self {
            value,
            _modulus: PhantomData,
        }
    }

    /// Parse a 32-byte big-endian encoding. Non-canonical values are rejected.
    pub fn from_bytes_be(bytes: &[u8; 32]) -> Result<Self> {
        Self::new(BigUint::from_bytes_be(bytes))
    }

    /// 32-byte big-endian encoding, zero-padded on the left.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        biguint_to_bytes32(&self.value)
    }

    /// Parse a decimal string as produced by snarkjs / circom tooling.
    pub fn from_decimal_str(s: &str) -> Result<Self> {
        let value = BigUint::parse_bytes(s.trim().as_bytes(), 10).ok_or_else(|| {
            MixerError::InvalidProofFormat(format!("not a decimal integer: {s:?}"))
        })?;
        Self::new(value)
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }
}

impl<M: FieldModulus> FieldArithmetic for FieldElement<M> {
    fn zero() -> Self {
        Self::from_reduced(BigUint::zero())
    }

    fn one() -> Self {
        Self::from_reduced(BigUint::one())
    }

    fn from_u64(value: u64) -> Self {
        // Both moduli exceed 2^253, so any u64 is already reduced.
        Self::from_reduced(BigUint::from(value))
    }

    fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    fn add(&self, rhs: &Self) -> Self {
        let sum = &self.value + &rhs.value;
        let m = M::modulus();
        if &sum >= m {
            Self::from_reduced(sum - m)
        } else {
            Self::from_reduced(sum)
        }
    }

    fn sub(&self, rhs: &Self) -> Self {
        if self.value >= rhs.value {
            Self::from_reduced(&self.value - &rhs.value)
        } else {
            Self::from_reduced(M::modulus() - &rhs.value + &self.value)
        }
    }

    fn mul(&self, rhs: &Self) -> Self {
        Self::from_reduced((&self.value * &rhs.value) % M::modulus())
    }

    fn neg(&self) -> Self {
        if self.value.is_zero() {
            self.clone()
        } else {
            Self::from_reduced(M::modulus() - &self.value)
        }
    }

    fn inverse(&self) -> Result<Self> {
        mod_inverse(&self.value, M::modulus()).map(Self::from_reduced)
    }
}

impl<M: FieldModulus> fmt::Debug for FieldElement<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{})", M::NAME, hex::encode(self.to_bytes_be()))
    }
}

impl<M: FieldModulus> fmt::Display for FieldElement<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// ============================================================================
// QUADRATIC EXTENSION Fq2
// ============================================================================

/// Element c0 + c1·u of Fq2, with u² = -1.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fq2 {
    pub c0: Fq,
    pub c1: Fq,
}

impl Fq2 {
    pub fn new(c0: Fq, c1: Fq) -> Self {
        Self { c0, c1 }
    }
}

impl FieldArithmetic for Fq2 {
    fn zero() -> Self {
        Self::new(Fq::zero(), Fq::zero())
    }

    fn one() -> Self {
        Self::new(Fq::one(), Fq::zero())
    }

    fn from_u64(value: u64) -> Self {
        Self::new(Fq::from_u64(value), Fq::zero())
    }

    fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }

    fn add(&self, rhs: &Self) -> Self {
        Self::new(self.c0.add(&rhs.c0), self.c1.add(&rhs.c1))
    }

    fn sub(&self, rhs: &Self) -> Self {
        Self::new(self.c0.sub(&rhs.c0), self.c1.sub(&rhs.c1))
    }

    fn mul(&self, rhs: &Self) -> Self {
        // (a0 + a1 u)(b0 + b1 u) = (a0 b0 - a1 b1) + (a0 b1 + a1 b0) u
        let c0 = self.c0.mul(&rhs.c0).sub(&self.c1.mul(&rhs.c1));
        let c1 = self.c0.mul(&rhs.c1).add(&self.c1.mul(&rhs.c0));
        Self::new(c0, c1)
    }

    fn neg(&self) -> Self {
        Self::new(self.c0.neg(), self.c1.neg())
    }

    fn inverse(&self) -> Result<Self> {
        // 1 / (a0 + a1 u) = (a0 - a1 u) / (a0² + a1²)
        let norm = self.c0.square().add(&self.c1.square());
        let norm_inv = norm.inverse()?;
        Ok(Self::new(self.c0.mul(&norm_inv), self.c1.neg().mul(&norm_inv)))
    }
}

// ============================================================================
// MODULAR INVERSE
// ============================================================================

/// Inverse of `a` modulo `m` by the extended Euclidean algorithm.
///
/// Fails with `NoInverseExists` when gcd(a, m) != 1, which includes a ≡ 0.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint> {
    if m.is_zero() {
        return Err(MixerError::NoInverseExists);
    }
    let modulus = BigInt::from_biguint(Sign::Plus, m.clone());
    let mut old_r = BigInt::from_biguint(Sign::Plus, a % m);
    let mut r = modulus.clone();
    let mut old_s = BigInt::one();
    let mut s = BigInt::zero();

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return Err(MixerError::NoInverseExists);
    }

    let normalized = ((old_s % &modulus) + &modulus) % &modulus;
    normalized.to_biguint().ok_or(MixerError::NoInverseExists)
}

/// Left-pad a big integer into 32 big-endian bytes.
///
/// Callers only pass values below 2^256.
pub(crate) fn biguint_to_bytes32(value: &BigUint) -> [u8; 32] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    let len = bytes.len().min(32);
    out[32 - len..].copy_from_slice(&bytes[bytes.len() - len..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moduli_match_known_values() {
        assert_eq!(
            base_modulus().to_string(),
            "21888242871839275222246405745257275088696311157297823662689037894645226208583"
        );
        assert_eq!(
            scalar_modulus().to_string(),
            "21888242871839275222246405745257275088548364400416034343698204186575808495617"
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        let q = base_modulus().clone();
        assert_eq!(
            Fq::new(q.clone()),
            Err(MixerError::FieldElementOutOfRange { field: "base" })
        );
        assert!(Fq::new(q - 1u32).is_ok());
        assert!(Fr::from_bytes_be(&BN254_SCALAR_MODULUS).is_err());
        assert!(Fq::from_bytes_be(&BN254_SCALAR_MODULUS).is_ok());
    }

    #[test]
    fn test_reduce_wraps() {
        let q = base_modulus().clone();
        let wrapped = Fq::reduce(&(q + 5u32));
        assert_eq!(wrapped, Fq::from_u64(5));
    }

    #[test]
    fn test_sub_wraps_below_zero() {
        let a = Fq::from_u64(3);
        let b = Fq::from_u64(5);
        assert_eq!(a.sub(&b).add(&b), a);
        assert_eq!(a.sub(&b), Fq::from_u64(2).neg());
    }

    #[test]
    fn test_neg_zero_is_zero() {
        assert!(Fr::zero().neg().is_zero());
    }

    #[test]
    fn test_inverse_roundtrip() {
        let a = Fq::from_u64(123_456_789);
        let inv = a.inverse().unwrap();
        assert_eq!(a.mul(&inv), Fq::one());
    }

    #[test]
    fn test_mod_inverse_small() {
        let inv = mod_inverse(&BigUint::from(3u32), &BigUint::from(11u32)).unwrap();
        assert_eq!(inv, BigUint::from(4u32));
    }

    #[test]
    fn test_mod_inverse_no_inverse() {
        assert_eq!(
            mod_inverse(&BigUint::from(6u32), &BigUint::from(9u32)),
            Err(MixerError::NoInverseExists)
        );
        assert_eq!(
            mod_inverse(&BigUint::zero(), base_modulus()),
            Err(MixerError::NoInverseExists)
        );
        assert!(Fr::zero().inverse().is_err());
    }

    #[test]
    fn test_fq2_u_squared_is_minus_one() {
        let u = Fq2::new(Fq::zero(), Fq::one());
        assert_eq!(u.square(), Fq2::one().neg());
    }

    #[test]
    fn test_fq2_inverse() {
        let a = Fq2::new(Fq::from_u64(9), Fq::from_u64(1));
        let inv = a.inverse().unwrap();
        assert_eq!(a.mul(&inv), Fq2::one());
        assert!(Fq2::zero().inverse().is_err());
    }

    #[test]
    fn test_bytes_roundtrip_pads() {
        let a = Fr::from_u64(0x0102);
        let bytes = a.to_bytes_be();
        assert!(bytes[..30].iter().all(|&b| b == 0));
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
        assert_eq!(Fr::from_bytes_be(&bytes).unwrap(), a);
    }

    #[test]
    fn test_decimal_parsing() {
        assert_eq!(Fq::from_decimal_str("42").unwrap(), Fq::from_u64(42));
        assert!(Fq::from_decimal_str("0x2a").is_err());
        assert!(Fr::from_decimal_str(&scalar_modulus().to_string()).is_err());
    }
}
