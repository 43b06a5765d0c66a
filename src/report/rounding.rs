//! Rounding of measured values by their uncertainty.
//!
//! Particle Data Group convention: look at the three leading digits of the
//! uncertainty.
//!
//! - `100..=354`: keep two significant digits
//! - `355..=949`: keep one significant digit
//! - `950..=999`: round up to `1000` and keep two significant digits
//!
//! The value is then rounded to the same decimal place as the uncertainty.

/// A value/uncertainty pair rounded to a common decimal place.
#[derive(Debug, Clone, PartialEq)]
pub struct Rounded {
    pub value: String,
    pub uncertainty: String,
}

/// Round `value ± sigma`. Returns `None` when `sigma` is zero or not finite.
pub fn round_pdg(value: f64, sigma: f64) -> Option<Rounded> {
    let sigma = sigma.abs();
    if !(sigma.is_finite() && sigma > 0.0 && value.is_finite()) {
        return None;
    }

    let mut exp = sigma.log10().floor() as i32;
    let mut leading = (sigma / 10f64.powi(exp - 2)).round();
    // log10 can land one decade off near exact powers of ten
    if leading >= 1000.0 {
        exp += 1;
        leading = (sigma / 10f64.powi(exp - 2)).round();
    } else if leading < 100.0 {
        exp -= 1;
        leading = (sigma / 10f64.powi(exp - 2)).round();
    }

    let (sigma, exp, digits) = match leading as u32 {
        0..=354 => (sigma, exp, 2),
        355..=949 => (sigma, exp, 1),
        _ => (10f64.powi(exp + 1), exp + 1, 2),
    };
    let place = exp - digits + 1;

    Some(Rounded {
        value: fixed(value, place),
        uncertainty: fixed(sigma, place),
    })
}

/// Format `x` rounded to the decimal place `10^place`.
fn fixed(x: f64, place: i32) -> String {
    if place >= 0 {
        let step = 10f64.powi(place);
        format!("{:.0}", (x / step).round() * step)
    } else {
        let decimals = (-place) as usize;
        format!("{x:.decimals$}")
    }
}
