//! IEEE 754-2008 decimal128 in the binary integer decimal (BID) encoding.

use crate::{Error, Result};

use rust_decimal::Decimal;

const BIAS: i32 = 6176;
const EXPONENT_MASK: u128 = 0x3fff;
const SMALL_COEFFICIENT_MASK: u128 = (1 << 113) - 1;
const MAX_COEFFICIENT: u128 = 9_999_999_999_999_999_999_999_999_999_999_999;

/// Decodes 16 little-endian bytes.
///
/// NaN and infinities have no `Decimal` counterpart and are rejected, as are
/// values whose precision does not fit 96 bits of mantissa at scale <= 28.
pub fn decode(bytes: [u8; 16]) -> Result<Decimal> {
    let bits = u128::from_le_bytes(bytes);
    let negative = bits >> 127 == 1;

    let (exponent, coefficient) = if (bits >> 125) & 0b11 == 0b11 {
        match (bits >> 122) & 0b1_1111 {
            0b1_1110 => return Err(Error::marshal("decimal128 infinity is not representable")),
            0b1_1111 => return Err(Error::marshal("decimal128 NaN is not representable")),
            // The implied 0b100 prefix puts the coefficient above the
            // maximum, such encodings are non-canonical zeros.
            _ => (((bits >> 111) & EXPONENT_MASK) as i32, 0),
        }
    } else {
        (
            ((bits >> 113) & EXPONENT_MASK) as i32,
            bits & SMALL_COEFFICIENT_MASK,
        )
    };

    let coefficient = if coefficient > MAX_COEFFICIENT {
        0
    } else {
        coefficient
    };

    let mut exponent = exponent - BIAS;
    let mut mantissa = coefficient as i128;

    // Shift positive exponents into the mantissa and drop trailing zeros of
    // fractions that exceed the maximum scale.
    while exponent > 0 {
        mantissa = mantissa
            .checked_mul(10)
            .ok_or_else(|| Error::marshal("decimal128 value out of range"))?;
        exponent -= 1;
    }
    while exponent < -28 && mantissa % 10 == 0 && mantissa != 0 {
        mantissa /= 10;
        exponent += 1;
    }
    if mantissa == 0 {
        exponent = exponent.max(-28);
    }

    if negative {
        mantissa = -mantissa;
    }

    Decimal::try_from_i128_with_scale(mantissa, (-exponent) as u32)
        .map_err(|e| Error::marshal(format!("decimal128 value out of range: {e}")))
}

/// Encodes a decimal as 16 little-endian bytes.
pub fn encode(value: Decimal) -> [u8; 16] {
    let coefficient = value.mantissa().unsigned_abs();
    let exponent = (BIAS - value.scale() as i32) as u128;

    let mut bits = (exponent << 113) | coefficient;
    if value.is_sign_negative() && coefficient != 0 {
        bits |= 1 << 127;
    }

    bits.to_le_bytes()
}
