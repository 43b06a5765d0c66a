//! Render-independent figure descriptions.
//!
//! All series and bounds are computed here, outside of any backend, so the SVG
//! chart and the terminal preview draw exactly the same geometry.

use crate::domain::{Lang, LinearResponse, SpectralResponse};
use crate::math::linspace;
use crate::report::unit_label;

/// Samples along the fitted spectral curve.
const CURVE_SAMPLES: usize = 100;
/// Samples along the tangent construction.
const TANGENT_SAMPLES: usize = 50;

/// Marker used for measured points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Hollow circle.
    Circle,
    /// Diagonal cross.
    Cross,
}

/// One saved chart: measured points, fitted curve, optional tangent.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// File stem of the saved artifact.
    pub name: &'static str,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub marker: Marker,
    pub curve: Vec<(f64, f64)>,
    /// Empty when the figure has no tangent construction.
    pub tangent: Vec<(f64, f64)>,
}

impl Figure {
    /// Mean photocurrent against `cos α`; the line spans the first to last cosine.
    pub fn angle(response: &LinearResponse, current_unit: &str, lang: Lang) -> Figure {
        let ends = [response.points.first(), response.points.last()];
        let curve = ends
            .into_iter()
            .flatten()
            .map(|&(x, _)| (x, response.fit.eval(x)))
            .collect();
        Figure {
            name: "angle-photocurrent",
            x_label: "cos α".to_string(),
            y_label: mean_current_label(current_unit, lang),
            points: response.points.clone(),
            marker: Marker::Circle,
            curve,
            tangent: Vec::new(),
        }
    }

    /// Mean photocurrent against `r⁻²`; the line spans `0` to the largest `r⁻²`.
    pub fn distance(response: &LinearResponse, current_unit: &str, lang: Lang) -> Figure {
        let x_max = response
            .points
            .iter()
            .map(|p| p.0)
            .fold(f64::NEG_INFINITY, f64::max);
        let curve = if x_max.is_finite() {
            vec![(0.0, response.fit.eval(0.0)), (x_max, response.fit.eval(x_max))]
        } else {
            Vec::new()
        };
        let per_m2 = match lang {
            Lang::En => "m⁻²",
            Lang::Ru => "м⁻²",
        };
        Figure {
            name: "distance-photocurrent",
            x_label: format!("r⁻², {per_m2}"),
            y_label: mean_current_label(current_unit, lang),
            points: response.points.clone(),
            marker: Marker::Cross,
            curve,
            tangent: Vec::new(),
        }
    }

    /// Spectral response with the cubic and the tangent, non-negative parts only.
    pub fn spectra(response: &SpectralResponse, current_unit: &str, lang: Lang) -> Figure {
        let (lo, hi) = response
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));

        let curve = if lo.is_finite() && hi.is_finite() {
            non_negative(linspace(lo, hi, CURVE_SAMPLES), |x| response.fit.eval(x))
        } else {
            Vec::new()
        };
        let tangent = non_negative(linspace(0.0, response.tangent.point_x, TANGENT_SAMPLES), |x| {
            response.tangent.eval(x)
        });

        Figure {
            name: "spectra",
            x_label: format!("E, {}", unit_label(lang, "eV")),
            y_label: format!("I, {}", unit_label(lang, current_unit)),
            points: response.points.clone(),
            marker: Marker::Circle,
            curve,
            tangent,
        }
    }

    /// Padded `(x_min, x_max, y_min, y_max)` over every series, if non-degenerate.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let all = self.points.iter().chain(&self.curve).chain(&self.tangent);
        let (mut x0, mut x1, mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in all.filter(|(x, y)| x.is_finite() && y.is_finite()) {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y0 = y0.min(y);
            y1 = y1.max(y);
        }
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) {
            return None;
        }
        let (x0, x1) = pad_range(x0, x1, 0.05);
        let (y0, y1) = pad_range(y0, y1, 0.05);
        Some((x0, x1, y0, y1))
    }
}

fn mean_current_label(current_unit: &str, lang: Lang) -> String {
    format!("⟨I⟩, {}", unit_label(lang, current_unit))
}

fn non_negative(xs: Vec<f64>, f: impl Fn(f64) -> f64) -> Vec<(f64, f64)> {
    xs.into_iter().map(|x| (x, f(x))).filter(|&(_, y)| y >= 0.0).collect()
}

/// Widen `[min, max]` by `frac` of its span (or a unit span when flat).
pub(crate) fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = if span > 0.0 { span * frac } else { min.abs().max(1.0) * frac };
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PolynomialFit, Tangent};

    fn line(m: f64, b: f64, n: usize) -> PolynomialFit {
        PolynomialFit {
            degree: 1,
            coefficients: vec![m, b],
            sse: 0.0,
            n,
        }
    }

    #[test]
    fn angle_line_spans_first_to_last_cosine() {
        let response = LinearResponse {
            points: vec![(1.0, 2.0), (0.5, 1.1), (0.0, 0.1)],
            fit: line(2.0, 0.0, 3),
        };
        let fig = Figure::angle(&response, "uA", Lang::En);
        assert_eq!(fig.curve, vec![(1.0, 2.0), (0.0, 0.0)]);
        assert_eq!(fig.marker, Marker::Circle);
        assert_eq!(fig.y_label, "⟨I⟩, µA");
    }

    #[test]
    fn distance_line_starts_at_zero() {
        let response = LinearResponse {
            points: vec![(100.0, 5.0), (25.0, 1.5)],
            fit: line(0.05, 0.1, 2),
        };
        let fig = Figure::distance(&response, "uA", Lang::Ru);
        assert_eq!(fig.curve[0], (0.0, 0.1));
        assert_eq!(fig.curve[1].0, 100.0);
        assert_eq!(fig.marker, Marker::Cross);
        assert_eq!(fig.y_label, "⟨I⟩, мкА");
    }

    #[test]
    fn spectra_drops_negative_parts() {
        // y = x - 2 on [1, 3]; tangent = the line itself, from 0 to 2
        let response = SpectralResponse {
            points: vec![(1.0, 0.0), (3.0, 1.0)],
            fit: line(1.0, -2.0, 2),
            tangent: Tangent {
                slope: 1.0,
                point_x: 2.0,
                point_y: 0.0,
            },
            band_gap: 2.0,
        };
        let fig = Figure::spectra(&response, "uA", Lang::En);
        assert!(fig.curve.iter().all(|&(x, y)| y >= 0.0 && x >= 2.0 - 1e-12));
        assert_eq!(fig.tangent, vec![(2.0, 0.0)]);
        assert_eq!(fig.x_label, "E, eV");
    }

    #[test]
    fn bounds_are_padded() {
        let fig = Figure {
            name: "t",
            x_label: String::new(),
            y_label: String::new(),
            points: vec![(0.0, 0.0), (10.0, 20.0)],
            marker: Marker::Circle,
            curve: vec![],
            tangent: vec![],
        };
        assert_eq!(fig.bounds(), Some((-0.5, 10.5, -1.0, 21.0)));
    }
}
