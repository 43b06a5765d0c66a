//! Unit symbol resolution.
//!
//! The registry is built once at startup and shared read-only by every component
//! that needs to interpret a unit symbol (ingest, configuration, reports).
//!
//! Supported forms:
//! - base symbols (`V`, `A`, `m`, `eV`, `°`, ...), including the Russian lab symbols
//!   (`В`, `А`, `м`, `эВ`, ...)
//! - one SI prefix in front of a prefixable base (`mV`, `нм`, `мкА`, ...)
//! - products / quotients with integer powers (`J*s`, `J·s`, `m/s`, `m^-2`)

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::error::ReduceError;
use crate::quantity::unit::{Dimension, Unit};

/// Elementary charge in coulombs (exact since the 2019 SI redefinition).
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

#[derive(Debug, Clone)]
struct BaseUnit {
    dimension: Dimension,
    scale: f64,
    prefixable: bool,
}

/// Immutable symbol → unit table.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    bases: HashMap<&'static str, BaseUnit>,
    /// Sorted longest-first so multi-character prefixes (`мк`) win.
    prefixes: Vec<(&'static str, f64)>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    pub fn new() -> Self {
        let mut bases = HashMap::new();
        let mut add = |symbols: &[&'static str], dimension: Dimension, scale: f64, prefixable: bool| {
            for &s in symbols {
                bases.insert(
                    s,
                    BaseUnit {
                        dimension,
                        scale,
                        prefixable,
                    },
                );
            }
        };

        add(&["m", "м"], Dimension::LENGTH, 1.0, true);
        add(&["g", "г"], Dimension::MASS, 1e-3, true);
        add(&["s", "с"], Dimension::TIME, 1.0, true);
        add(&["A", "А"], Dimension::CURRENT, 1.0, true);
        add(&["V", "В"], Dimension::VOLTAGE, 1.0, true);
        add(&["C", "Кл"], Dimension::CHARGE, 1.0, true);
        add(&["J", "Дж"], Dimension::ENERGY, 1.0, true);
        add(&["W", "Вт"], Dimension::POWER, 1.0, true);
        add(&["Hz", "Гц"], Dimension::FREQUENCY, 1.0, true);
        add(&["eV", "эВ"], Dimension::ENERGY, ELEMENTARY_CHARGE, true);
        add(&["rad", "рад"], Dimension::DIMENSIONLESS, 1.0, false);
        add(&["°", "deg", "degree", "град"], Dimension::DIMENSIONLESS, PI / 180.0, false);
        add(&["", "1", "-"], Dimension::DIMENSIONLESS, 1.0, false);
        add(&["%"], Dimension::DIMENSIONLESS, 1e-2, false);

        let mut prefixes: Vec<(&'static str, f64)> = vec![
            ("G", 1e9),
            ("M", 1e6),
            ("k", 1e3),
            ("c", 1e-2),
            ("m", 1e-3),
            ("u", 1e-6),
            ("µ", 1e-6),
            ("μ", 1e-6),
            ("n", 1e-9),
            ("p", 1e-12),
            ("Г", 1e9),
            ("М", 1e6),
            ("к", 1e3),
            ("с", 1e-2),
            ("м", 1e-3),
            ("мк", 1e-6),
            ("н", 1e-9),
            ("п", 1e-12),
        ];
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self { bases, prefixes }
    }

    /// Resolve a unit symbol.
    pub fn parse(&self, symbol: &str) -> Result<Unit, ReduceError> {
        let trimmed = symbol.trim();
        let unit = self.parse_expression(trimmed)?;
        Ok(unit.relabel(trimmed))
    }

    fn parse_expression(&self, expr: &str) -> Result<Unit, ReduceError> {
        if let Some(unit) = self.parse_simple(expr) {
            return Ok(unit);
        }

        let mut parts = expr.split('/');
        let numerator = parts.next().unwrap_or_default();
        let mut unit = self.parse_product(numerator, expr)?;
        for denominator in parts {
            let d = self.parse_product(denominator, expr)?;
            unit = &unit / &d;
        }
        Ok(unit)
    }

    fn parse_product(&self, expr: &str, whole: &str) -> Result<Unit, ReduceError> {
        let expr = expr.trim();
        if expr.is_empty() || expr == "1" {
            return Ok(Unit::dimensionless());
        }
        let mut acc = Unit::dimensionless();
        for factor in expr.split(['*', '·', ' ']).filter(|f| !f.is_empty()) {
            let (base, power) = match factor.split_once('^') {
                Some((b, p)) => {
                    let p: i8 = p
                        .trim()
                        .parse()
                        .map_err(|_| ReduceError::UnknownUnit(whole.to_string()))?;
                    (b, p)
                }
                None => split_superscript(factor),
            };
            let unit = self
                .parse_simple(base)
                .ok_or_else(|| ReduceError::UnknownUnit(whole.to_string()))?;
            acc = &acc * &unit.powi(power);
        }
        Ok(acc)
    }

    fn parse_simple(&self, symbol: &str) -> Option<Unit> {
        if let Some(base) = self.bases.get(symbol) {
            return Some(Unit::new(symbol, base.dimension, base.scale));
        }
        for &(prefix, factor) in &self.prefixes {
            let Some(rest) = symbol.strip_prefix(prefix) else {
                continue;
            };
            if let Some(base) = self.bases.get(rest).filter(|b| b.prefixable) {
                return Some(Unit::new(symbol, base.dimension, base.scale * factor));
            }
        }
        None
    }
}

/// Split a trailing superscript exponent (`m²`, `m⁻²`) from a factor.
fn split_superscript(factor: &str) -> (&str, i8) {
    const SUPERS: [(char, i8); 10] = [
        ('⁰', 0),
        ('¹', 1),
        ('²', 2),
        ('³', 3),
        ('⁴', 4),
        ('⁵', 5),
        ('⁶', 6),
        ('⁷', 7),
        ('⁸', 8),
        ('⁹', 9),
    ];
    let Some(idx) = factor.find(|c: char| c == '⁻' || SUPERS.iter().any(|(s, _)| *s == c)) else {
        return (factor, 1);
    };
    let (base, exp) = factor.split_at(idx);
    let mut sign = 1i8;
    let mut value = 0i8;
    for c in exp.chars() {
        if c == '⁻' {
            sign = -1;
        } else if let Some((_, d)) = SUPERS.iter().find(|(s, _)| *s == c) {
            value = value.saturating_mul(10).saturating_add(*d);
        }
    }
    (base, sign * value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_prefixed_latin_and_cyrillic_symbols() {
        let reg = UnitRegistry::new();

        let nm = reg.parse("nm").unwrap();
        assert_eq!(nm.dimension(), Dimension::LENGTH);
        assert_relative_eq!(nm.scale(), 1e-9);

        let mka = reg.parse("мкА").unwrap();
        assert_eq!(mka.dimension(), Dimension::CURRENT);
        assert_relative_eq!(mka.scale(), 1e-6);
        assert_eq!(mka.symbol(), "мкА");

        let cm = reg.parse("см").unwrap();
        assert_eq!(cm.dimension(), Dimension::LENGTH);
        assert_relative_eq!(cm.scale(), 1e-2);

        let volt = reg.parse("В").unwrap();
        assert_eq!(volt.dimension(), Dimension::VOLTAGE);
    }

    #[test]
    fn degrees_are_dimensionless_with_radian_scale() {
        let reg = UnitRegistry::new();
        let deg = reg.parse("°").unwrap();
        assert!(deg.dimension().is_dimensionless());
        assert_relative_eq!(deg.scale(), PI / 180.0);
    }

    #[test]
    fn parses_compound_expressions() {
        let reg = UnitRegistry::new();
        assert_eq!(reg.parse("J*s").unwrap().dimension(), Dimension::ACTION);
        assert_eq!(reg.parse("m/s").unwrap().dimension(), Dimension::VELOCITY);
        assert_eq!(reg.parse("m^-2").unwrap().dimension(), Dimension::LENGTH.powi(-2));
        assert_eq!(reg.parse("м⁻²").unwrap().dimension(), Dimension::LENGTH.powi(-2));
        let kev = reg.parse("keV").unwrap();
        assert_relative_eq!(kev.scale(), 1e3 * ELEMENTARY_CHARGE);
    }

    #[test]
    fn unknown_symbols_are_rejected() {
        let reg = UnitRegistry::new();
        assert_eq!(
            reg.parse("furlong"),
            Err(ReduceError::UnknownUnit("furlong".to_string()))
        );
        // Degrees take no prefix.
        assert!(reg.parse("m°").is_err());
    }
}
