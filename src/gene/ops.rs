//! Operation catalogs — the fixed tables a genome's opcodes index into.
//!
//! Each entry pairs a symbolic formatter (used to render human-readable
//! formulas) with a numeric function over three equal-length vectors.
//! Every function is total: the guarded variants substitute 0 or the
//! unchanged operand where the naive form would produce NaN or Inf.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::f64::consts::E;

/// Renders one sub-expression from the formulas of its three operands.
pub type OpFormat = fn(&str, &str, &str) -> String;

/// Applies one operation to three equal-length operand vectors.
pub type OpEval = fn(&DVector<f64>, &DVector<f64>, &DVector<f64>) -> DVector<f64>;

/// One catalog entry: symbolic formatter + numeric function.
pub struct NamedOp {
    pub format: OpFormat,
    pub eval: OpEval,
}

/// Magnitudes below this count as zero for the guarded divide/log.
const GUARD_EPS: f64 = 1e-12;

/// Selects which operation catalog a genome's opcodes index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogKey {
    /// 22-op catalog used by the soma/dendrite growth programs.
    Developmental,
    /// 7-op arithmetic catalog (add, sub, mult, guarded divide/log,
    /// clamped exp, 3-input select).
    Arithmetic,
}

impl CatalogKey {
    /// The ordered entries of this catalog.
    pub fn ops(self) -> &'static [NamedOp] {
        match self {
            CatalogKey::Developmental => DEVELOPMENTAL_OPS,
            CatalogKey::Arithmetic => ARITHMETIC_OPS,
        }
    }
}

/// 22 operations for developmental growth programs. Unary ops read in1,
/// binary ops read in1/in2, rmux reads all three.
pub const DEVELOPMENTAL_OPS: &[NamedOp] = &[
    // 0 abs
    NamedOp {
        format: |a, _, _| format!("|{}|", a),
        eval: |a, _, _| a.map(f64::abs),
    },
    // 1 sqrt
    NamedOp {
        format: |a, _, _| format!("sqrt(|{}|)", a),
        eval: |a, _, _| a.map(|x| x.abs().sqrt()),
    },
    // 2 sqr
    NamedOp {
        format: |a, _, _| format!("{}^2", a),
        eval: |a, _, _| a.map(|x| x * x),
    },
    // 3 cube
    NamedOp {
        format: |a, _, _| format!("{}^3", a),
        eval: |a, _, _| a.map(|x| x * x * x),
    },
    // 4 exp, rescaled so [-1,1] maps into [-1,1]
    NamedOp {
        format: |a, _, _| format!("exp({})", a),
        eval: |a, _, _| a.map(|x| (2.0 * (x + 1.0).exp() - E * E - 1.0) / (E * E - 1.0)),
    },
    // 5 sin
    NamedOp {
        format: |a, _, _| format!("sin({})", a),
        eval: |a, _, _| a.map(f64::sin),
    },
    // 6 cos
    NamedOp {
        format: |a, _, _| format!("cos({})", a),
        eval: |a, _, _| a.map(f64::cos),
    },
    // 7 tanh
    NamedOp {
        format: |a, _, _| format!("tanh({})", a),
        eval: |a, _, _| a.map(f64::tanh),
    },
    // 8 inv (negation)
    NamedOp {
        format: |a, _, _| format!("inv({})", a),
        eval: |a, _, _| a.map(|x| -x),
    },
    // 9 step
    NamedOp {
        format: |a, _, _| format!("step({})", a),
        eval: |a, _, _| a.map(|x| if x < 0.0 { 0.0 } else { 1.0 }),
    },
    // 10 hyp
    NamedOp {
        format: |a, b, _| format!("hyp({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, |x, y| ((x * x + y * y) / 2.0).sqrt()),
    },
    // 11 add (average)
    NamedOp {
        format: |a, b, _| format!("add({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, |x, y| (x + y) / 2.0),
    },
    // 12 sub (half difference)
    NamedOp {
        format: |a, b, _| format!("sub({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, |x, y| (x - y) / 2.0),
    },
    // 13 mult
    NamedOp {
        format: |a, b, _| format!("mult({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, |x, y| x * y),
    },
    // 14 max
    NamedOp {
        format: |a, b, _| format!("max({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, f64::max),
    },
    // 15 min
    NamedOp {
        format: |a, b, _| format!("min({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, f64::min),
    },
    // 16 and
    NamedOp {
        format: |a, b, _| format!("and({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, |x, y| if x > 0.0 && y > 0.0 { 1.0 } else { -1.0 }),
    },
    // 17 or
    NamedOp {
        format: |a, b, _| format!("or({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, |x, y| if x > 0.0 || y > 0.0 { 1.0 } else { -1.0 }),
    },
    // 18 rmux: in3 selects between in1 and in2
    NamedOp {
        format: |a, b, c| format!("rmux({}, {}, {})", a, b, c),
        eval: |a, b, c| DVector::from_fn(a.nrows(), |i, _| if c[i] > 0.0 { a[i] } else { b[i] }),
    },
    // 19 imult (negated product)
    NamedOp {
        format: |a, b, _| format!("imult({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, |x, y| -(x * y)),
    },
    // 20 xor
    NamedOp {
        format: |a, b, _| format!("xor({}, {})", a, b),
        eval: |a, b, _| {
            a.zip_map(b, |x, y| {
                if (x > 0.0 && y > 0.0) || (x < 0.0 && y < 0.0) {
                    -1.0
                } else {
                    1.0
                }
            })
        },
    },
    // 21 istep
    NamedOp {
        format: |a, _, _| format!("istep({})", a),
        eval: |a, _, _| a.map(|x| if x < 1.0 { 0.0 } else { -1.0 }),
    },
];

/// 7 arithmetic operations with guarded divide, log, and exp.
pub const ARITHMETIC_OPS: &[NamedOp] = &[
    // 0 add
    NamedOp {
        format: |a, b, _| format!("+({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, |x, y| x + y),
    },
    // 1 sub
    NamedOp {
        format: |a, b, _| format!("-({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, |x, y| x - y),
    },
    // 2 mult
    NamedOp {
        format: |a, b, _| format!("*({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, |x, y| x * y),
    },
    // 3 guarded divide: numerator passes through where the denominator is ~0
    NamedOp {
        format: |a, b, _| format!("/({}, {})", a, b),
        eval: |a, b, _| a.zip_map(b, |x, y| if y.abs() < GUARD_EPS { x } else { x / y }),
    },
    // 4 guarded log: 0 where the input is ~0, else log|x|
    NamedOp {
        format: |a, _, _| format!("log({})", a),
        eval: |a, _, _| a.map(|x| if x.abs() < GUARD_EPS { 0.0 } else { x.abs().ln() }),
    },
    // 5 clamped exp: saturates at e^200 above, 0 below -200
    NamedOp {
        format: |a, _, _| format!("exp({})", a),
        eval: |a, _, _| {
            a.map(|x| {
                if x > 200.0 {
                    (200.0f64).exp()
                } else if x > -200.0 {
                    x.exp()
                } else {
                    0.0
                }
            })
        },
    },
    // 6 if: in1 selects between in2 and in3
    NamedOp {
        format: |a, b, c| format!("if({}, {}, {})", a, b, c),
        eval: |a, b, c| DVector::from_fn(a.nrows(), |i, _| if a[i] > 0.0 { b[i] } else { c[i] }),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(op: &NamedOp, a: &DVector<f64>, b: &DVector<f64>, c: &DVector<f64>) -> DVector<f64> {
        (op.eval)(a, b, c)
    }

    #[test]
    fn test_shape_preservation() {
        let ones = DVector::from_element(100, 1.0);
        for catalog in [CatalogKey::Developmental, CatalogKey::Arithmetic] {
            for op in catalog.ops() {
                let out = apply(op, &ones, &ones, &ones);
                assert_eq!(out.nrows(), 100);
                assert!(out.iter().all(|v| v.is_finite()));
            }
        }
    }

    #[test]
    fn test_guarded_divide() {
        let num = DVector::from_element(100, 1.0);
        let den = DVector::from_element(100, 0.0);
        let out = apply(&ARITHMETIC_OPS[3], &num, &den, &den);
        assert_eq!(out, num);
        assert!(out.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_guarded_log() {
        let zeros = DVector::from_element(100, 0.0);
        let out = apply(&ARITHMETIC_OPS[4], &zeros, &zeros, &zeros);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_clamped_exp_saturates() {
        let big = DVector::from_vec(vec![300.0, -300.0, 0.0]);
        let out = apply(&ARITHMETIC_OPS[5], &big, &big, &big);
        assert_eq!(out[0], (200.0f64).exp());
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], 1.0);
    }

    #[test]
    fn test_logic_ops() {
        let pos = DVector::from_element(1, 0.5);
        let neg = DVector::from_element(1, -0.5);
        // and
        assert_eq!(apply(&DEVELOPMENTAL_OPS[16], &pos, &pos, &pos)[0], 1.0);
        assert_eq!(apply(&DEVELOPMENTAL_OPS[16], &pos, &neg, &pos)[0], -1.0);
        // xor: same sign -> -1, mixed -> 1
        assert_eq!(apply(&DEVELOPMENTAL_OPS[20], &pos, &pos, &pos)[0], -1.0);
        assert_eq!(apply(&DEVELOPMENTAL_OPS[20], &pos, &neg, &pos)[0], 1.0);
    }

    #[test]
    fn test_rmux_selects() {
        let a = DVector::from_element(1, 2.0);
        let b = DVector::from_element(1, 3.0);
        let hi = DVector::from_element(1, 1.0);
        let lo = DVector::from_element(1, -1.0);
        assert_eq!(apply(&DEVELOPMENTAL_OPS[18], &a, &b, &hi)[0], 2.0);
        assert_eq!(apply(&DEVELOPMENTAL_OPS[18], &a, &b, &lo)[0], 3.0);
    }

    #[test]
    fn test_formatters() {
        let f = (DEVELOPMENTAL_OPS[0].format)("in0", "in1", "in2");
        assert_eq!(f, "|in0|");
        let f = (ARITHMETIC_OPS[0].format)("in0", "in1", "in2");
        assert_eq!(f, "+(in0, in1)");
        let f = (ARITHMETIC_OPS[6].format)("a", "b", "c");
        assert_eq!(f, "if(a, b, c)");
    }
}
