use crate::common::constants::FOUR_PI;
use num_complex::Complex64;

/// Evaluates the full band of spherical harmonics Y_{l,m} for a fixed degree,
/// returning the 2l+1 complex values ordered by m from -l to l.
///
/// Only the non-negative orders are evaluated directly; negative orders come
/// from the conjugate-symmetry relation `Y_{l,-m} = (-1)^m conj(Y_{l,m})`.
pub fn spherical_harmonic_band(degree: u32, theta: f64, phi: f64) -> Vec<Complex64> {
    let degree = degree as usize;
    let width = 2 * degree + 1;
    let mut band = vec![Complex64::new(0.0, 0.0); width];

    let x = theta.cos();
    for order in 0..=degree {
        let value = y_lm_nonnegative_order(degree, order, x, phi);
        band[degree + order] = value;
        if order > 0 {
            let mirrored = if order % 2 == 0 {
                value.conj()
            } else {
                -value.conj()
            };
            band[degree - order] = mirrored;
        }
    }

    band
}

/// Single spherical harmonic Y_{l,m}(theta, phi).
pub fn y_lm(degree: u32, order: i32, theta: f64, phi: f64) -> Complex64 {
    assert!(
        order.unsigned_abs() <= degree,
        "spherical harmonics requires |order| <= degree"
    );

    let x = theta.cos();
    if order >= 0 {
        return y_lm_nonnegative_order(degree as usize, order as usize, x, phi);
    }

    let positive_order = order.unsigned_abs() as usize;
    let positive = y_lm_nonnegative_order(degree as usize, positive_order, x, phi);
    if positive_order % 2 == 0 {
        positive.conj()
    } else {
        -positive.conj()
    }
}

fn y_lm_nonnegative_order(degree: usize, order: usize, x: f64, phi: f64) -> Complex64 {
    let associated_legendre = associated_legendre_polynomial(degree, order, x);
    let normalization =
        (((2 * degree + 1) as f64) * factorial_ratio(degree, order) / FOUR_PI).sqrt();
    let phase = Complex64::from_polar(1.0, (order as f64) * phi);

    phase * (normalization * associated_legendre)
}

/// Associated Legendre P_l^m(x) with the Condon-Shortley phase, via the
/// standard upward recurrence in l from the closed-form diagonal P_m^m.
fn associated_legendre_polynomial(degree: usize, order: usize, x: f64) -> f64 {
    debug_assert!(order <= degree);

    let mut p_mm = 1.0;
    if order > 0 {
        let root = (1.0 - x * x).max(0.0).sqrt();
        for k in 1..=order {
            p_mm *= -((2 * k - 1) as f64) * root;
        }
    }

    if degree == order {
        return p_mm;
    }

    let p_m_plus_1_m = x * ((2 * order + 1) as f64) * p_mm;
    if degree == order + 1 {
        return p_m_plus_1_m;
    }

    let mut p_lm2 = p_mm;
    let mut p_lm1 = p_m_plus_1_m;
    for l in (order + 2)..=degree {
        let numerator = ((2 * l - 1) as f64) * x * p_lm1 - ((l + order - 1) as f64) * p_lm2;
        let p_lm = numerator / ((l - order) as f64);
        p_lm2 = p_lm1;
        p_lm1 = p_lm;
    }

    p_lm1
}

fn factorial_ratio(degree: usize, order: usize) -> f64 {
    if order == 0 {
        return 1.0;
    }

    let mut ratio = 1.0;
    for term in (degree - order + 1)..=(degree + order) {
        ratio /= term as f64;
    }

    ratio
}
