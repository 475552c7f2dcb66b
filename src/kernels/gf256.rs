//! Arithmetic over GF(2^8) with the primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11d).
//!
//! Exponent and logarithm tables are built at compile time. The exponent table
//! is doubled so that `exp[log a + log b]` never needs a modulo.

/// The primitive polynomial used to reduce products.
pub const PRIMITIVE_POLY: u16 = 0x11d;

struct Tables {
    exp: [u8; 512],
    log: [u8; 256],
}

const fn build_tables() -> Tables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE_POLY;
        }
        i += 1;
    }
    while i < 512 {
        exp[i] = exp[i - 255];
        i += 1;
    }
    Tables { exp, log }
}

static TABLES: Tables = build_tables();

#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    TABLES.exp[TABLES.log[a as usize] as usize + TABLES.log[b as usize] as usize]
}

/// Divides `a` by `b`. `b` must be non-zero.
#[inline]
pub fn div(a: u8, b: u8) -> u8 {
    debug_assert!(b != 0, "division by zero in GF(256)");
    if a == 0 {
        return 0;
    }
    TABLES.exp[(TABLES.log[a as usize] as usize + 255 - TABLES.log[b as usize] as usize) % 255]
}

/// Raises the generator to `power` (any integer, reduced modulo 255).
#[inline]
pub fn alpha_pow(power: i64) -> u8 {
    TABLES.exp[power.rem_euclid(255) as usize]
}

//==================================================================================
// Polynomials
//==================================================================================
// Coefficients are stored highest degree first, which matches the order in
// which codeword symbols are transmitted.

/// Multiplies two polynomials.
pub fn poly_mul(p: &[u8], q: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; p.len() + q.len() - 1];
    for (i, &a) in p.iter().enumerate() {
        if a == 0 {
            continue;
        }
        for (j, &b) in q.iter().enumerate() {
            result[i + j] ^= mul(a, b);
        }
    }
    result
}

/// Evaluates a polynomial at `x` with Horner's rule.
pub fn poly_eval(p: &[u8], x: u8) -> u8 {
    p.iter().fold(0u8, |acc, &coef| mul(acc, x) ^ coef)
}

/// Evaluates a polynomial whose coefficients are stored lowest degree first.
pub fn poly_eval_ascending(p: &[u8], x: u8) -> u8 {
    p.iter().rev().fold(0u8, |acc, &coef| mul(acc, x) ^ coef)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_cover_every_nonzero_element() {
        let mut seen = [false; 256];
        for power in 0..255 {
            seen[alpha_pow(power) as usize] = true;
        }
        assert!(!seen[0]);
        assert!(seen[1..].iter().all(|&s| s));
    }

    #[test]
    fn test_mul_div_are_inverse() {
        for a in 1..=255u8 {
            for b in [1u8, 2, 3, 29, 142, 255] {
                assert_eq!(div(mul(a, b), b), a);
            }
        }
        assert_eq!(mul(0, 77), 0);
        assert_eq!(div(0, 77), 0);
    }

    #[test]
    fn test_known_products() {
        // 2 * 128 overflows and is reduced by 0x11d.
        assert_eq!(mul(2, 128), 0x1d);
        assert_eq!(alpha_pow(8), 0x1d);
        assert_eq!(alpha_pow(-1), alpha_pow(254));
    }

    #[test]
    fn test_poly_eval_orders_agree() {
        let p = [3u8, 0, 7, 1];
        let mut reversed = p;
        reversed.reverse();
        for x in [0u8, 1, 2, 99] {
            assert_eq!(poly_eval(&p, x), poly_eval_ascending(&reversed, x));
        }
        // (x + 1)(x + 2) has roots 1 and 2.
        let product = poly_mul(&[1, 1], &[1, 2]);
        assert_eq!(poly_eval(&product, 1), 0);
        assert_eq!(poly_eval(&product, 2), 0);
    }
}
