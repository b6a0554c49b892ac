//! Human-readable fit equations.
//!
//! Each catalog model has one fixed template. Parameters are printed in
//! scientific notation with two fraction digits and an explicit, at least
//! two-digit exponent (`1.23e+00`, `-4.50e-07`).

use crate::error::CoreError;
use crate::models::ModelKind;

/// Format `v` like C's `%.2e`.
pub fn format_sci(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Rust prints `1.23e0` / `1.23e-7`; normalise the exponent.
    let s = format!("{v:.2e}");
    let Some((mantissa, exp)) = s.split_once('e') else {
        return s;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.abs())
}

/// Render the fitted equation for `model`.
pub fn format_equation(model: ModelKind, params: &[f64]) -> Result<String, CoreError> {
    if params.len() != model.param_count() {
        return Err(CoreError::ParamCount {
            model: model.name().to_string(),
            expected: model.param_count(),
            got: params.len(),
        });
    }
    let mut params = params.to_vec();
    model.normalize_params(&mut params);
    let p: Vec<String> = params.iter().map(|&v| format_sci(v)).collect();

    let eq = match model {
        ModelKind::Linear => format!("y = {}*x + {}", p[0], p[1]),
        ModelKind::Quadratic => format!("y = {}*x^2 + {}*x + {}", p[0], p[1], p[2]),
        ModelKind::Cubic => format!("y = {}*x^3 + {}*x^2 + {}*x + {}", p[0], p[1], p[2], p[3]),
        ModelKind::Fourth => format!(
            "y = {}*x^4 + {}*x^3 + {}*x^2 + {}*x + {}",
            p[0], p[1], p[2], p[3], p[4]
        ),
        ModelKind::Power => format!("y = {}*x^({}) + {}", p[0], p[1], p[2]),
        ModelKind::Root => format!("y = {}*sqrt(x) + {}", p[0], p[1]),
        ModelKind::Piecewise2 => {
            let (x0, y0, k1, k2) = (&p[0], &p[1], &p[2], &p[3]);
            format!(
                "y = {y0} + {k1}*(x - {x0}) for x < {x0}; y = {y0} + {k2}*(x - {x0}) for x >= {x0}"
            )
        }
        ModelKind::Piecewise3 => {
            let (x0, x1, b) = (&p[0], &p[1], &p[2]);
            let (k1, k2, k3) = (&p[3], &p[4], &p[5]);
            // Segment intercepts, so each piece reads as a plain line.
            let y0 = format_sci(params[3] * params[0] + params[2]);
            let y1 = format_sci(params[3] * params[0] + params[2] + params[4] * (params[1] - params[0]));
            format!(
                "y = {k1}*x + {b} for x < {x0}; y = {y0} + {k2}*(x - {x0}) for {x0} <= x < {x1}; \
                 y = {y1} + {k3}*(x - {x1}) for x >= {x1}"
            )
        }
    };
    Ok(eq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sci_matches_printf() {
        assert_eq!(format_sci(1.234), "1.23e+00");
        assert_eq!(format_sci(0.456), "4.56e-01");
        assert_eq!(format_sci(-45600.0), "-4.56e+04");
        assert_eq!(format_sci(0.0), "0.00e+00");
        assert_eq!(format_sci(1.5e-120), "1.50e-120");
        assert_eq!(format_sci(f64::NAN), "nan");
    }

    #[test]
    fn linear_template() {
        let eq = format_equation(ModelKind::Linear, &[1.23, 0.456]).unwrap();
        assert_eq!(eq, "y = 1.23e+00*x + 4.56e-01");
    }

    #[test]
    fn every_model_has_a_template() {
        for m in ModelKind::ALL {
            let params = vec![1.0; m.param_count()];
            let eq = format_equation(m, &params).unwrap();
            assert!(eq.starts_with("y = "), "{m}: {eq}");
        }
    }

    #[test]
    fn power_and_root_templates() {
        assert_eq!(
            format_equation(ModelKind::Power, &[2.0, 0.5, -1.0]).unwrap(),
            "y = 2.00e+00*x^(5.00e-01) + -1.00e+00"
        );
        assert_eq!(
            format_equation(ModelKind::Root, &[3.0, 4.0]).unwrap(),
            "y = 3.00e+00*sqrt(x) + 4.00e+00"
        );
    }

    #[test]
    fn formatting_is_deterministic() {
        let params = [0.1 + 0.2, 1.0 / 3.0, -7.0e-9];
        let a = format_equation(ModelKind::Quadratic, &params).unwrap();
        let b = format_equation(ModelKind::Quadratic, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn piecewise3_breaks_print_in_ascending_order() {
        let ordered = format_equation(ModelKind::Piecewise3, &[1.0, 3.0, 0.0, 1.0, 2.0, 0.5]).unwrap();
        let crossed = format_equation(ModelKind::Piecewise3, &[3.0, 1.0, 0.0, 1.0, 2.0, 0.5]).unwrap();
        assert_eq!(ordered, crossed);
        assert!(ordered.contains("for 1.00e+00 <= x < 3.00e+00"), "{ordered}");
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = format_equation(ModelKind::Cubic, &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, CoreError::ParamCount { expected: 4, got: 2, .. }));
    }
}
