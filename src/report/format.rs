//! Text reports for both experiments.
//!
//! Formatting code lives in one place so the reduction code stays free of
//! presentation concerns. Reports are plain UTF-8; the Russian locale uses the
//! lab notebook labels, Cyrillic unit symbols and a decimal comma.

use std::fs;
use std::path::Path;

use crate::domain::{ExternalResults, InternalResults, Lang, LinearResponse};
use crate::error::ReduceError;
use crate::quantity::Quantity;
use crate::report::rounding::round_pdg;

/// Significant digits for quantities printed without an uncertainty.
const PLAIN_DIGITS: i32 = 5;

/// Localize a number already rendered with a decimal point.
pub fn localize(lang: Lang, number: String) -> String {
    match lang {
        Lang::En => number,
        Lang::Ru => number.replace('.', ","),
    }
}

/// Unit symbol in the report language.
pub fn unit_label(lang: Lang, symbol: &str) -> String {
    if lang == Lang::En {
        let en = match symbol {
            "В" => "V",
            "мВ" => "mV",
            "А" => "A",
            "мкА" | "uA" => "µA",
            "нА" => "nA",
            "эВ" => "eV",
            "Дж" => "J",
            "Гц" => "Hz",
            "м" => "m",
            "нм" => "nm",
            "см" => "cm",
            other => other,
        };
        return en.to_string();
    }
    let ru = match symbol {
        "V" => "В",
        "mV" => "мВ",
        "A" => "А",
        "uA" | "µA" | "μA" => "мкА",
        "nA" => "нА",
        "eV" => "эВ",
        "J" => "Дж",
        "Hz" => "Гц",
        "m" => "м",
        "nm" => "нм",
        "cm" => "см",
        other => other,
    };
    ru.to_string()
}

/// `x` with `PLAIN_DIGITS` significant digits, trailing zeros dropped.
pub fn format_plain(lang: Lang, x: f64) -> String {
    if x == 0.0 || !x.is_finite() {
        return localize(lang, format!("{x}"));
    }
    let magnitude = x.abs().log10().floor() as i32;
    let decimals = (PLAIN_DIGITS - 1 - magnitude).max(0) as usize;
    let mut s = format!("{x:.decimals$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    localize(lang, s)
}

/// `x` in scientific notation, e.g. `6.891786e14`.
pub fn format_scientific(lang: Lang, x: f64, decimals: usize) -> String {
    localize(lang, format!("{x:.decimals$e}"))
}

/// `(v ± σ) unit` with PDG rounding, or `v unit` for exact quantities.
pub fn format_quantity(lang: Lang, q: &Quantity) -> String {
    let unit = unit_label(lang, q.unit().symbol());
    match q.uncertainty().and_then(|s| round_pdg(q.magnitude(), s)) {
        Some(r) => format!(
            "({} ± {}) {unit}",
            localize(lang, r.value),
            localize(lang, r.uncertainty)
        ),
        None => format!("{} {unit}", format_plain(lang, q.magnitude())),
    }
}

/// Stopping voltage decomposition, photon frequency/energy and work function.
pub fn format_external_report(results: &ExternalResults, lang: Lang) -> String {
    let est = &results.stopping_voltage;
    let v_unit = unit_label(lang, est.unit.symbol());
    let plain = |x: f64| format!("{} {v_unit}", format_plain(lang, x));

    let (l_u, l_mean, l_instr, l_stat, l_total, l_nu, l_e, l_a, l_at) = match lang {
        Lang::En => (
            "Stopping voltage",
            "mean",
            "instrumental error",
            "statistical error",
            "total error",
            "Photon frequency",
            "Photon energy",
            "Work function",
            "at",
        ),
        Lang::Ru => (
            "Задерживающее напряжение",
            "среднее значение",
            "приборная погрешность",
            "статистическая погрешность",
            "полная погрешность",
            "Частота фотона",
            "Энергия фотона",
            "Работа выхода",
            "при",
        ),
    };

    let mut out = String::new();
    out.push_str(&format!("{l_u}: U = {}\n", format_quantity(lang, &est.to_quantity())));
    out.push_str(&format!("  - {l_mean}: {}\n", plain(est.mean)));
    out.push_str(&format!("  - {l_instr}: {}\n", plain(est.instrumental_error)));
    out.push_str(&format!("  - {l_stat}: {}\n", plain(est.statistical_error)));
    out.push_str(&format!("  - {l_total}: {}\n", plain(est.total_error)));
    out.push('\n');
    out.push_str(&format!(
        "{l_nu}: ν = {} {}\n",
        format_scientific(lang, results.frequency.magnitude(), 6),
        unit_label(lang, results.frequency.unit().symbol())
    ));
    out.push_str(&format!("{l_e}: E = {}\n", format_quantity(lang, &results.photon_energy)));
    out.push_str(&format!(
        "{l_a}: A = {} {l_at} P = {}\n",
        format_quantity(lang, &results.work_function),
        localize(lang, format!("{}", est.confidence_level))
    ));
    out
}

/// Band gap plus the linear-response coefficients of whichever branches succeeded.
pub fn format_internal_report(results: &InternalResults, lang: Lang) -> String {
    let mut out = String::new();

    match (&results.spectral, lang) {
        (Some(s), Lang::En) => out.push_str(&format!("Band gap: {:.3} eV\n", s.band_gap)),
        (Some(s), Lang::Ru) => out.push_str(&format!(
            "Ширина запрещённой зоны: {} эВ\n",
            localize(lang, format!("{:.3}", s.band_gap))
        )),
        (None, _) => {}
    }

    let lines = [
        (&results.angle, "Angle dependence, ⟨I⟩ vs cos α", "Зависимость ⟨I⟩ от cos α"),
        (&results.distance, "Distance dependence, ⟨I⟩ vs r⁻²", "Зависимость ⟨I⟩ от r⁻²"),
    ];
    for (response, en, ru) in lines {
        if let Some(r) = response {
            let label = if lang == Lang::En { en } else { ru };
            out.push_str(&format!("{label}: {}\n", format_linear(lang, r)));
        }
    }

    if !results.failures.is_empty() {
        out.push('\n');
        let heading = match lang {
            Lang::En => "Failed branches:",
            Lang::Ru => "Ошибки:",
        };
        out.push_str(heading);
        out.push('\n');
        for failure in &results.failures {
            out.push_str(&format!("  - {failure}\n"));
        }
    }
    out
}

fn format_linear(lang: Lang, r: &LinearResponse) -> String {
    let (slope, intercept) = match lang {
        Lang::En => ("slope", "intercept"),
        Lang::Ru => ("наклон", "смещение"),
    };
    format!(
        "{slope} = {}, {intercept} = {} (RMSE {})",
        format_plain(lang, r.slope()),
        format_plain(lang, r.intercept()),
        format_plain(lang, r.fit.rmse())
    )
}

/// Write a report to `path` (UTF-8, replacing any previous file).
pub fn write_report(path: &Path, text: &str) -> Result<(), ReduceError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| ReduceError::Input(format!("failed to create '{}': {e}", dir.display())))?;
    }
    fs::write(path, text).map_err(|e| ReduceError::Input(format!("failed to write '{}': {e}", path.display())))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConfidenceEstimate, PolynomialFit, SpectralResponse, Tangent};
    use crate::quantity::UnitRegistry;

    fn external() -> ExternalResults {
        let reg = UnitRegistry::new();
        let volt = reg.parse("V").unwrap();
        let ev = reg.parse("eV").unwrap();
        ExternalResults {
            stopping_voltage: ConfidenceEstimate {
                mean: -1.2025,
                statistical_error: 0.027_175,
                instrumental_error: 0.1,
                total_error: 0.103_627,
                confidence_level: 0.95,
                sample_size: 4,
                t_factor: 3.182_446,
                unit: volt,
            },
            wavelength: Quantity::new(435.0, reg.parse("nm").unwrap()),
            frequency: Quantity::new(6.891_786_344e14, reg.parse("Hz").unwrap()),
            photon_energy: Quantity::new(2.850_211_458, ev.clone()),
            work_function: Quantity::with_uncertainty(1.647_711, 0.103_627, ev),
        }
    }

    #[test]
    fn external_report_in_english() {
        let text = format_external_report(&external(), Lang::En);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Stopping voltage: U = (-1.20 ± 0.10) V");
        assert_eq!(lines[1], "  - mean: -1.2025 V");
        assert_eq!(lines[2], "  - instrumental error: 0.1 V");
        assert_eq!(lines[3], "  - statistical error: 0.027175 V");
        assert_eq!(lines[6], "Photon frequency: ν = 6.891786e14 Hz");
        assert_eq!(lines[7], "Photon energy: E = 2.8502 eV");
        assert_eq!(lines[8], "Work function: A = (1.65 ± 0.10) eV at P = 0.95");
    }

    #[test]
    fn external_report_in_russian() {
        let text = format_external_report(&external(), Lang::Ru);
        assert!(text.starts_with("Задерживающее напряжение: U = (-1,20 ± 0,10) В\n"), "{text}");
        assert!(text.contains("  - приборная погрешность: 0,1 В\n"));
        assert!(text.contains("Частота фотона: ν = 6,891786e14 Гц\n"));
        assert!(text.contains("Работа выхода: A = (1,65 ± 0,10) эВ при P = 0,95\n"));
    }

    fn spectral(band_gap: f64) -> SpectralResponse {
        SpectralResponse {
            points: vec![],
            fit: PolynomialFit {
                degree: 3,
                coefficients: vec![0.0, 0.0, 1.0, -1.0],
                sse: 0.0,
                n: 4,
            },
            tangent: Tangent {
                slope: 1.0,
                point_x: 1.5,
                point_y: 0.5,
            },
            band_gap,
        }
    }

    #[test]
    fn internal_report_prints_band_gap_with_three_decimals() {
        let results = InternalResults {
            spectral: Some(spectral(1.123_456)),
            ..Default::default()
        };
        assert_eq!(format_internal_report(&results, Lang::En), "Band gap: 1.123 eV\n");
        assert_eq!(
            format_internal_report(&results, Lang::Ru),
            "Ширина запрещённой зоны: 1,123 эВ\n"
        );
    }

    #[test]
    fn internal_report_lists_failures() {
        let results = InternalResults {
            failures: vec!["[internal/spectral/threshold] no crossing".to_string()],
            ..Default::default()
        };
        let text = format_internal_report(&results, Lang::En);
        assert!(text.contains("Failed branches:\n  - [internal/spectral/threshold] no crossing\n"));
        assert!(!text.contains("Band gap"));
    }

    #[test]
    fn plain_numbers_keep_five_significant_digits() {
        assert_eq!(format_plain(Lang::En, 1.2025), "1.2025");
        assert_eq!(format_plain(Lang::En, 0.1), "0.1");
        assert_eq!(format_plain(Lang::En, 12345.678), "12346");
        assert_eq!(format_plain(Lang::Ru, 0.5), "0,5");
    }

    #[test]
    fn report_is_written_to_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("results.txt");
        write_report(&path, "Band gap: 1.000 eV\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "Band gap: 1.000 eV\n");
    }
}
