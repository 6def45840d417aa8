//! BN254 Elliptic Curve Operations for Groth16 Verification
//!
//! ## Curve Parameters
//! - G1: y² = x³ + 3 over Fq, generator (1, 2), prime order r
//! - G2: y² = x³ + 3/(9+u) over Fq2, order h·r with cofactor h != 1
//!
//! ## Point Representations
//! - Affine coordinates; (0, 0) encodes the point at infinity. Neither
//!   curve contains (0, 0) because b != 0.
//! - G1 points: 64 bytes (32 bytes x, 32 bytes y) - big-endian
//! - G2 points: 128 bytes in EIP-197 order: x.c1 || x.c0 || y.c1 || y.c0
//!
//! Every public operation validates its inputs first and fails with
//! `PointNotOnCurve` before computing anything.

use num_bigint::BigUint;
use num_traits::Zero;

use super::field::{scalar_modulus, FieldArithmetic, Fq, Fq2};
use crate::error::{MixerError, Result};

// ============================================================================
// CONSTANTS
// ============================================================================

/// G1 point size in bytes
pub const G1_POINT_LEN: usize = 64;

/// G2 point size in bytes
pub const G2_POINT_LEN: usize = 128;

const TWIST_B_C0: [u8; 32] = [
    0x2b, 0x14, 0x9d, 0x40, 0xce, 0xb8, 0xaa, 0xae,
    0x81, 0xbe, 0x18, 0x99, 0x1b, 0xe0, 0x6a, 0xc3,
    0xb5, 0xb4, 0xc5, 0xe5, 0x59, 0xdb, 0xef, 0xa3,
    0x32, 0x67, 0xe6, 0xdc, 0x24, 0xa1, 0x38, 0xe5,
];

const TWIST_B_C1: [u8; 32] = [
    0x00, 0x97, 0x13, 0xb0, 0x3a, 0xf0, 0xfe, 0xd4,
    0xcd, 0x2c, 0xaf, 0xad, 0xee, 0xd8, 0xfd, 0xf4,
    0xa7, 0x4f, 0xa0, 0x84, 0xe5, 0x2d, 0x18, 0x52,
    0xe4, 0xa2, 0xbd, 0x06, 0x85, 0xc3, 0x15, 0xd2,
];

const G2_GENERATOR_X_C0: [u8; 32] = [
    0x18, 0x00, 0xde, 0xef, 0x12, 0x1f, 0x1e, 0x76,
    0x42, 0x6a, 0x00, 0x66, 0x5e, 0x5c, 0x44, 0x79,
    0x67, 0x43, 0x22, 0xd4, 0xf7, 0x5e, 0xda, 0xdd,
    0x46, 0xde, 0xbd, 0x5c, 0xd9, 0x92, 0xf6, 0xed,
];

const G2_GENERATOR_X_C1: [u8; 32] = [
    0x19, 0x8e, 0x93, 0x93, 0x92, 0x0d, 0x48, 0x3a,
    0x72, 0x60, 0xbf, 0xb7, 0x31, 0xfb, 0x5d, 0x25,
    0xf1, 0xaa, 0x49, 0x33, 0x35, 0xa9, 0xe7, 0x12,
    0x97, 0xe4, 0x85, 0xb7, 0xae, 0xf3, 0x12, 0xc2,
];

const G2_GENERATOR_Y_C0: [u8; 32] = [
    0x12, 0xc8, 0x5e, 0xa5, 0xdb, 0x8c, 0x6d, 0xeb,
    0x4a, 0xab, 0x71, 0x80, 0x8d, 0xcb, 0x40, 0x8f,
    0xe3, 0xd1, 0xe7, 0x69, 0x0c, 0x43, 0xd3, 0x7b,
    0x4c, 0xe6, 0xcc, 0x01, 0x66, 0xfa, 0x7d, 0xaa,
];

const G2_GENERATOR_Y_C1: [u8; 32] = [
    0x09, 0x06, 0x89, 0xd0, 0x58, 0x5f, 0xf0, 0x75,
    0xec, 0x9e, 0x99, 0xad, 0x69, 0x0c, 0x33, 0x95,
    0xbc, 0x4b, 0x31, 0x33, 0x70, 0xb3, 0x8e, 0xf3,
    0x55, 0xac, 0xda, 0xdc, 0xd1, 0x22, 0x97, 0x5b,
];

// ============================================================================
// POINT TYPES
// ============================================================================

/// Affine point on G1.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct G1Point {
    pub x: Fq,
    pub y: Fq,
}

/// Affine point on the G2 twist.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct G2Point {
    pub x: Fq2,
    pub y: Fq2,
}

impl G1Point {
    pub fn new(x: Fq, y: Fq) -> Self {
        Self { x, y }
    }

    pub fn infinity() -> Self {
        Self::new(Fq::zero(), Fq::zero())
    }

    pub fn generator() -> Self {
        Self::new(Fq::from_u64(1), Fq::from_u64(2))
    }

    pub fn is_infinity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Decode 64 bytes (x || y, big-endian). Checks field range only;
    /// curve membership is checked by `validate_g1`.
    pub fn from_bytes(bytes: &[u8; G1_POINT_LEN]) -> Result<Self> {
        Ok(Self::new(
            Fq::from_bytes_be(&chunk32(bytes, 0))?,
            Fq::from_bytes_be(&chunk32(bytes, 32))?,
        ))
    }

    pub fn to_bytes(&self) -> [u8; G1_POINT_LEN] {
        let mut out = [0u8; G1_POINT_LEN];
        out[0..32].copy_from_slice(&self.x.to_bytes_be());
        out[32..64].copy_from_slice(&self.y.to_bytes_be());
        out
    }
}

impl G2Point {
    pub fn new(x: Fq2, y: Fq2) -> Self {
        Self { x, y }
    }

    pub fn infinity() -> Self {
        Self::new(Fq2::zero(), Fq2::zero())
    }

    pub fn generator() -> Self {
        // Constants are below q, so decoding cannot fail.
        let coord = |bytes: &[u8; 32]| Fq::reduce(&BigUint::from_bytes_be(bytes));
        Self::new(
            Fq2::new(coord(&G2_GENERATOR_X_C0), coord(&G2_GENERATOR_X_C1)),
            Fq2::new(coord(&G2_GENERATOR_Y_C0), coord(&G2_GENERATOR_Y_C1)),
        )
    }

    pub fn is_infinity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Decode 128 bytes in EIP-197 order (imaginary part first).
    pub fn from_bytes(bytes: &[u8; G2_POINT_LEN]) -> Result<Self> {
        let x_c1 = Fq::from_bytes_be(&chunk32(bytes, 0))?;
        let x_c0 = Fq::from_bytes_be(&chunk32(bytes, 32))?;
        let y_c1 = Fq::from_bytes_be(&chunk32(bytes, 64))?;
        let y_c0 = Fq::from_bytes_be(&chunk32(bytes, 96))?;
        Ok(Self::new(Fq2::new(x_c0, x_c1), Fq2::new(y_c0, y_c1)))
    }

    pub fn to_bytes(&self) -> [u8; G2_POINT_LEN] {
        let mut out = [0u8; G2_POINT_LEN];
        out[0..32].copy_from_slice(&self.x.c1.to_bytes_be());
        out[32..64].copy_from_slice(&self.x.c0.to_bytes_be());
        out[64..96].copy_from_slice(&self.y.c1.to_bytes_be());
        out[96..128].copy_from_slice(&self.y.c0.to_bytes_be());
        out
    }
}

fn chunk32(bytes: &[u8], offset: usize) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes[offset..offset + 32]);
    out
}

// ============================================================================
// GENERIC SHORT WEIERSTRASS ARITHMETIC
// ============================================================================

/// Affine point on y² = x³ + b. Implemented by G1 and G2 so the group law
/// is written once.
trait ShortWeierstrass: Clone + PartialEq {
    type Field: FieldArithmetic;

    fn x(&self) -> &Self::Field;
    fn y(&self) -> &Self::Field;
    fn from_xy(x: Self::Field, y: Self::Field) -> Self;
    fn coeff_b() -> Self::Field;

    fn zero_point() -> Self {
        Self::from_xy(Self::Field::zero(), Self::Field::zero())
    }

    fn is_zero_point(&self) -> bool {
        self.x().is_zero() && self.y().is_zero()
    }
}

impl ShortWeierstrass for G1Point {
    type Field = Fq;

    fn x(&self) -> &Fq {
        &self.x
    }

    fn y(&self) -> &Fq {
        &self.y
    }

    fn from_xy(x: Fq, y: Fq) -> Self {
        Self::new(x, y)
    }

    fn coeff_b() -> Fq {
        Fq::from_u64(3)
    }
}

impl ShortWeierstrass for G2Point {
    type Field = Fq2;

    fn x(&self) -> &Fq2 {
        &self.x
    }

    fn y(&self) -> &Fq2 {
        &self.y
    }

    fn from_xy(x: Fq2, y: Fq2) -> Self {
        Self::new(x, y)
    }

    fn coeff_b() -> Fq2 {
        twist_b().clone()
    }
}

/// b' = 3 / (9 + u)
fn twist_b() -> &'static Fq2 {
    static TWIST_B: std::sync::OnceLock<Fq2> = std::sync::OnceLock::new();
    TWIST_B.get_or_init(|| {
        let coord = |bytes: &[u8; 32]| Fq::reduce(&BigUint::from_bytes_be(bytes));
        Fq2::new(coord(&TWIST_B_C0), coord(&TWIST_B_C1))
    })
}

fn on_curve<P: ShortWeierstrass>(p: &P) -> bool {
    if p.is_zero_point() {
        return true;
    }
    let lhs = p.y().square();
    let rhs = p.x().square().mul(p.x()).add(&P::coeff_b());
    lhs == rhs
}

fn negate<P: ShortWeierstrass>(p: &P) -> P {
    if p.is_zero_point() {
        return p.clone();
    }
    P::from_xy(p.x().clone(), p.y().neg())
}

fn double<P: ShortWeierstrass>(p: &P) -> Result<P> {
    if p.is_zero_point() || p.y().is_zero() {
        return Ok(P::zero_point());
    }
    // λ = 3x² / 2y
    let three = P::Field::from_u64(3);
    let lambda = three.mul(&p.x().square()).mul(&p.y().double().inverse()?);
    let x3 = lambda.square().sub(&p.x().double());
    let y3 = lambda.mul(&p.x().sub(&x3)).sub(p.y());
    Ok(P::from_xy(x3, y3))
}

fn add<P: ShortWeierstrass>(a: &P, b: &P) -> Result<P> {
    if a.is_zero_point() {
        return Ok(b.clone());
    }
    if b.is_zero_point() {
        return Ok(a.clone());
    }
    if a.x() == b.x() {
        if a.y() == b.y() {
            return double(a);
        }
        // Same x, opposite y
        return Ok(P::zero_point());
    }
    // λ = (y2 - y1) / (x2 - x1)
    let lambda = b.y().sub(a.y()).mul(&b.x().sub(a.x()).inverse()?);
    let x3 = lambda.square().sub(a.x()).sub(b.x());
    let y3 = lambda.mul(&a.x().sub(&x3)).sub(a.y());
    Ok(P::from_xy(x3, y3))
}

/// Double-and-add over the big-endian bits of `k`, without reduction.
fn mul_unreduced<P: ShortWeierstrass>(p: &P, k: &BigUint) -> Result<P> {
    let mut acc = P::zero_point();
    if k.is_zero() || p.is_zero_point() {
        return Ok(acc);
    }
    for byte in k.to_bytes_be() {
        for bit in (0..8).rev() {
            acc = double(&acc)?;
            if (byte >> bit) & 1 == 1 {
                acc = add(&acc, p)?;
            }
        }
    }
    Ok(acc)
}

// ============================================================================
// G1 OPERATIONS
// ============================================================================

/// Check y² = x³ + 3 (or infinity).
pub fn is_on_curve_g1(p: &G1Point) -> bool {
    on_curve(p)
}

/// G1 has cofactor 1, so curve membership is full validation.
pub fn validate_g1(p: &G1Point) -> Result<()> {
    if !on_curve(p) {
        return Err(MixerError::PointNotOnCurve);
    }
    Ok(())
}

pub fn add_g1(a: &G1Point, b: &G1Point) -> Result<G1Point> {
    validate_g1(a)?;
    validate_g1(b)?;
    add(a, b)
}

pub fn double_g1(p: &G1Point) -> Result<G1Point> {
    validate_g1(p)?;
    double(p)
}

/// For BN254: -P = (x, q - y)
pub fn negate_g1(p: &G1Point) -> Result<G1Point> {
    validate_g1(p)?;
    Ok(negate(p))
}

/// k·P with k reduced modulo r. Scalar 0 maps to infinity.
pub fn scalar_mul_g1(p: &G1Point, k: &BigUint) -> Result<G1Point> {
    validate_g1(p)?;
    mul_unreduced(p, &(k % scalar_modulus()))
}

// ============================================================================
// G2 OPERATIONS
// ============================================================================

/// Check the twisted curve equation over Fq2 (or infinity).
pub fn is_on_curve_g2(p: &G2Point) -> bool {
    on_curve(p)
}

/// r·P == O. Only meaningful for points already on the twist.
pub fn is_in_subgroup_g2(p: &G2Point) -> bool {
    on_curve(p)
        && mul_unreduced(p, scalar_modulus())
            .map(|q| q.is_zero_point())
            .unwrap_or(false)
}

/// Full G2 validation: on the twist and in the order-r subgroup.
pub fn validate_g2(p: &G2Point) -> Result<()> {
    if !on_curve(p) {
        return Err(MixerError::PointNotOnCurve);
    }
    if !is_in_subgroup_g2(p) {
        return Err(MixerError::PointNotInSubgroup);
    }
    Ok(())
}

pub fn add_g2(a: &G2Point, b: &G2Point) -> Result<G2Point> {
    validate_on_twist(a)?;
    validate_on_twist(b)?;
    add(a, b)
}

pub fn double_g2(p: &G2Point) -> Result<G2Point> {
    validate_on_twist(p)?;
    double(p)
}

pub fn negate_g2(p: &G2Point) -> Result<G2Point> {
    validate_on_twist(p)?;
    Ok(negate(p))
}

/// k·P with k reduced modulo r. Requires full subgroup validation, since
/// reducing k is only sound for points of order r.
pub fn scalar_mul_g2(p: &G2Point, k: &BigUint) -> Result<G2Point> {
    validate_g2(p)?;
    mul_unreduced(p, &(k % scalar_modulus()))
}

fn validate_on_twist(p: &G2Point) -> Result<()> {
    if !on_curve(p) {
        return Err(MixerError::PointNotOnCurve);
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
