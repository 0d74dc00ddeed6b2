#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wigner3jInput {
    pub two_j1: i32,
    pub two_j2: i32,
    pub two_j3: i32,
    pub two_m1: i32,
    pub two_m2: i32,
    pub two_m3: i32,
}

impl Wigner3jInput {
    pub fn new(
        two_j1: i32,
        two_j2: i32,
        two_j3: i32,
        two_m1: i32,
        two_m2: i32,
        two_m3: i32,
    ) -> Self {
        Self {
            two_j1,
            two_j2,
            two_j3,
            two_m1,
            two_m2,
            two_m3,
        }
    }

    /// Input for the equal-degree triple (l, l, l; m1, m2, m3) used by the
    /// third-order invariant contraction.
    pub fn equal_degrees(degree: u32, m1: i32, m2: i32, m3: i32) -> Self {
        let two_l = 2 * degree as i32;
        Self::new(two_l, two_l, two_l, 2 * m1, 2 * m2, 2 * m3)
    }
}

/// Computes the Wigner 3j coefficient using doubled quantum numbers.
///
/// All `two_*` values represent `2*j` or `2*m` (e.g., `two_j=3` means `j=3/2`).
/// Inputs outside the angular-momentum selection rules return zero.
pub fn wigner_3j(input: Wigner3jInput) -> f64 {
    let Wigner3jInput {
        two_j1,
        two_j2,
        two_j3,
        two_m1,
        two_m2,
        two_m3,
    } = input;

    if two_j1 < 0 || two_j2 < 0 || two_j3 < 0 {
        return 0.0;
    }

    if two_m1 + two_m2 + two_m3 != 0 {
        return 0.0;
    }

    if two_m1.abs() > two_j1 || two_m2.abs() > two_j2 || two_m3.abs() > two_j3 {
        return 0.0;
    }

    if (two_j1 - two_m1).rem_euclid(2) != 0
        || (two_j2 - two_m2).rem_euclid(2) != 0
        || (two_j3 - two_m3).rem_euclid(2) != 0
    {
        return 0.0;
    }

    if (two_j1 + two_j2 + two_j3).rem_euclid(2) != 0 {
        return 0.0;
    }

    if two_j1 + two_j2 < two_j3 || two_j1 + two_j3 < two_j2 || two_j2 + two_j3 < two_j1 {
        return 0.0;
    }

    // Racah sum in log-factorial form; the terms array mirrors the classical
    // semiinteger formulation.
    let mut terms = [
        two_j1 + two_j2 - two_j3,
        two_j2 + two_j3 - two_j1,
        two_j3 + two_j1 - two_j2,
        two_j1 + two_m1,
        two_j1 - two_m1,
        two_j2 + two_m2,
        two_j2 - two_m2,
        two_j3 + two_m3,
        two_j3 - two_m3,
        two_j1 + two_j2 + two_j3 + 2,
        two_j2 - two_j3 - two_m1,
        two_j1 - two_j3 + two_m2,
    ];

    for (index, term) in terms.iter_mut().enumerate() {
        if index < 10 && *term < 0 {
            return 0.0;
        }

        if term.rem_euclid(2) != 0 {
            return 0.0;
        }

        *term /= 2;
    }

    let max0 = terms[10].max(terms[11]).max(0) + 1;
    let min0 = terms[0].min(terms[4]).min(terms[5]) + 1;
    if max0 > min0 {
        return 0.0;
    }

    let mut log_factorial = LogFactorial::new();
    let mut prefactor_log = -log_factorial.value((terms[9] + 1) as usize);
    for value in terms.iter().take(9) {
        prefactor_log += log_factorial.value((*value + 1) as usize);
    }
    prefactor_log *= 0.5;

    let mut sign = if (max0 - 1).rem_euclid(2) != 0 {
        -1.0
    } else {
        1.0
    };
    let mut result = 0.0;
    for i in max0..=min0 {
        let j = 2 - i;
        let denominator_log = log_factorial.value(i as usize)
            + log_factorial.value((j + terms[0]) as usize)
            + log_factorial.value((j + terms[4]) as usize)
            + log_factorial.value((j + terms[5]) as usize)
            + log_factorial.value((i - terms[10]) as usize)
            + log_factorial.value((i - terms[11]) as usize);

        result += sign * (prefactor_log - denominator_log).exp();
        sign = -sign;
    }

    if (two_j1 - two_j2 - two_m3).rem_euclid(4) != 0 {
        result = -result;
    }

    result
}

#[derive(Default)]
struct LogFactorial {
    values: Vec<f64>,
}

impl LogFactorial {
    fn new() -> Self {
        Self { values: vec![0.0] }
    }

    /// One-based index: `value(n + 1)` is `ln(n!)`.
    fn value(&mut self, one_based_index: usize) -> f64 {
        debug_assert!(one_based_index >= 1, "log-factorial index must be >= 1");
        let factorial_n = one_based_index - 1;

        while self.values.len() <= factorial_n {
            let next_index = self.values.len();
            let next_value = self.values[next_index - 1] + (next_index as f64).ln();
            self.values.push(next_value);
        }

        self.values[factorial_n]
    }
}

/// Precomputed Wigner 3j coefficients for the equal-degree triple (l, l, l),
/// keyed by (m1, m2) with m3 fixed to -m1-m2.
///
/// Built once per engine for the configured degree; lookups outside the
/// selection rules (|m3| > l) report `None` and contribute zero to the
/// third-order contraction.
#[derive(Debug, Clone)]
pub struct Wigner3jTable {
    degree: u32,
    width: usize,
    coefficients: Vec<f64>,
}

impl Wigner3jTable {
    pub fn new(degree: u32) -> Self {
        let l = degree as i32;
        let width = (2 * degree + 1) as usize;
        let mut coefficients = vec![0.0; width * width];

        for m1 in -l..=l {
            for m2 in -l..=l {
                let m3 = -m1 - m2;
                if m3.abs() > l {
                    continue;
                }
                let row = (m1 + l) as usize;
                let column = (m2 + l) as usize;
                coefficients[row * width + column] =
                    wigner_3j(Wigner3jInput::equal_degrees(degree, m1, m2, m3));
            }
        }

        Self {
            degree,
            width,
            coefficients,
        }
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Coefficient for (l m1; l m2; l -m1-m2), or `None` when the triple
    /// falls outside the selection rules.
    pub fn get(&self, m1: i32, m2: i32) -> Option<f64> {
        let l = self.degree as i32;
        if m1.abs() > l || m2.abs() > l || (m1 + m2).abs() > l {
            return None;
        }
        let row = (m1 + l) as usize;
        let column = (m2 + l) as usize;
        Some(self.coefficients[row * self.width + column])
    }
}

#[cfg(test)]
mod tests {
    use super::{Wigner3jInput, Wigner3jTable, wigner_3j};
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn wigner_3j_returns_zero_for_selection_rule_violations() {
        let cases = [
            Wigner3jInput::new(2, 2, 0, 0, 0, 2),  // m1 + m2 + m3 != 0
            Wigner3jInput::new(2, 2, 8, 0, 0, 0),  // triangle inequality violation
            Wigner3jInput::new(2, 2, 0, 4, -4, 0), // |m1| > j1
            Wigner3jInput::new(1, 1, 1, 1, -1, 0), // j1 + j2 + j3 not integer
            Wigner3jInput::new(2, 2, 2, 1, -1, 0), // parity mismatch between j and m
        ];

        for input in cases {
            let actual = wigner_3j(input);
            assert!(
                actual.abs() <= 1.0e-15,
                "selection-rule violation should return 0, got {actual:.16e} for {input:?}"
            );
        }
    }

    #[test]
    fn wigner_3j_matches_tabulated_reference_values() {
        let cases = [
            ("j=0,m=0", Wigner3jInput::new(0, 0, 0, 0, 0, 0), 1.0),
            (
                "(1,1,0;0,0,0)",
                Wigner3jInput::new(2, 2, 0, 0, 0, 0),
                -1.0 / 3.0_f64.sqrt(),
            ),
            (
                "(1,1,2;0,0,0)",
                Wigner3jInput::new(2, 2, 4, 0, 0, 0),
                (2.0_f64 / 15.0_f64).sqrt(),
            ),
            (
                "(2,2,2;0,0,0)",
                Wigner3jInput::new(4, 4, 4, 0, 0, 0),
                -(2.0_f64 / 35.0_f64).sqrt(),
            ),
            (
                "(1/2,1/2,0;1/2,-1/2,0)",
                Wigner3jInput::new(1, 1, 0, 1, -1, 0),
                FRAC_1_SQRT_2,
            ),
            (
                "(3/2,1,1/2;1/2,0,-1/2)",
                Wigner3jInput::new(3, 2, 1, 1, 0, -1),
                1.0 / 6.0_f64.sqrt(),
            ),
        ];

        for (label, input, expected) in cases {
            let actual = wigner_3j(input);
            assert_scalar_close(label, expected, actual, 1.0e-15, 1.0e-14);
        }
    }

    #[test]
    fn equal_degree_table_matches_direct_evaluation() {
        for degree in [2u32, 4, 6] {
            let table = Wigner3jTable::new(degree);
            let l = degree as i32;

            for m1 in -l..=l {
                for m2 in -l..=l {
                    let m3 = -m1 - m2;
                    let lookup = table.get(m1, m2);
                    if m3.abs() > l {
                        assert_eq!(lookup, None, "l={degree} m1={m1} m2={m2}");
                        continue;
                    }

                    let direct = wigner_3j(Wigner3jInput::equal_degrees(degree, m1, m2, m3));
                    let tabulated = lookup.expect("in-range triple should be tabulated");
                    assert_scalar_close(
                        &format!("l={degree} m1={m1} m2={m2}"),
                        direct,
                        tabulated,
                        1.0e-15,
                        1.0e-14,
                    );
                }
            }
        }
    }

    #[test]
    fn equal_degree_table_is_symmetric_under_column_exchange() {
        // (l l l) carries even perimeter, so the 3j symbol is invariant under
        // any permutation of its columns.
        let table = Wigner3jTable::new(4);
        for m1 in -4i32..=4 {
            for m2 in -4i32..=4 {
                if (m1 + m2).abs() > 4 {
                    continue;
                }
                let forward = table.get(m1, m2).unwrap();
                let swapped = table.get(m2, m1).unwrap();
                assert_scalar_close(
                    &format!("m1={m1} m2={m2}"),
                    forward,
                    swapped,
                    1.0e-15,
                    1.0e-14,
                );
            }
        }
    }

    fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
        let abs_diff = (actual - expected).abs();
        let rel_diff = abs_diff / expected.abs().max(1.0);
        assert!(
            abs_diff <= abs_tol || rel_diff <= rel_tol,
            "{label} expected={expected:.15e} actual={actual:.15e} abs_diff={abs_diff:.15e} rel_diff={rel_diff:.15e}"
        );
    }
}
