//! TempoNest JSON configuration builder.
//!
//! `build_config` turns a `ConfigRequest` into an `AnalysisConfig` without
//! touching the filesystem; `GeneratedConfig` owns the serialized text once the
//! user asks for it.

pub mod catalog;
pub mod output;
pub mod request;

pub use output::*;
pub use request::*;

use std::collections::BTreeMap;

use crate::domain::{AnalysisConfig, Element, ElementKind, Globals, Parameter, PriorType, Sampler};
use crate::error::AppError;

/// Assemble and validate a full analysis configuration.
pub fn build_config(request: &ConfigRequest) -> Result<AnalysisConfig, AppError> {
    validate_globals(&request.globals)?;
    validate_sampler(&request.sampler)?;

    if request.elements.is_empty() {
        return Err(AppError::invalid("At least one element is required."));
    }

    let elements = request
        .elements
        .iter()
        .enumerate()
        .map(|(i, e)| {
            build_element(e)
                .map_err(|err| AppError::new(err.exit_code(), format!("Element {}: {}", i + 1, err.message())))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(elements = elements.len(), "assembled analysis config");

    Ok(AnalysisConfig {
        globals: request.globals.clone(),
        sampler: request.sampler.clone(),
        elements,
    })
}

/// Build one element from its request.
pub fn build_element(request: &ElementRequest) -> Result<Element, AppError> {
    let kind = request.kind();
    let parameters = match request {
        ElementRequest::TimingModel => Vec::new(),
        ElementRequest::PowerLawRedNoise { parameters } | ElementRequest::PowerLawDmNoise { parameters } => {
            power_law_parameters(kind, parameters)?
        }
        ElementRequest::Efac(white) | ElementRequest::Equad(white) => {
            vec![white_noise_parameter(kind, white)?]
        }
    };

    Ok(Element {
        name: kind,
        parameters,
    })
}

/// Prior family for a named sub-parameter.
///
/// Amplitude-like quantities (and the EFAC/EQUAD scalings, outside of the
/// EFAC special case) are sampled in log space.
pub fn prior_for(kind: ElementKind, name: &str) -> PriorType {
    match kind {
        ElementKind::Efac => PriorType::Uniform,
        ElementKind::Equad => PriorType::LogUniform,
        _ if matches!(name, "amplitude" | "global" | "per_flag") => PriorType::LogUniform,
        _ => PriorType::Uniform,
    }
}

fn power_law_parameters(
    kind: ElementKind,
    overrides: &BTreeMap<String, ParameterOverride>,
) -> Result<Vec<Parameter>, AppError> {
    if let Some(unknown) = overrides.keys().find(|k| catalog::lookup(kind, k).is_none()) {
        return Err(AppError::invalid(format!(
            "Unknown parameter '{unknown}' for {}.",
            kind.display_name()
        )));
    }

    catalog::recommended(kind)
        .iter()
        .map(|rec| {
            let ov = overrides.get(rec.name).cloned().unwrap_or_default();
            let min_value = ov.min_value.unwrap_or(rec.min_value);
            let max_value = ov.max_value.unwrap_or(rec.max_value);
            check_bounds(rec.name, min_value, max_value)?;

            Ok(Parameter {
                name: rec.name.to_string(),
                description: None,
                prior_type: prior_for(kind, rec.name),
                include: ov.include.unwrap_or(true),
                fit: ov.fit.unwrap_or(true),
                min_value,
                max_value,
                flag: None,
            })
        })
        .collect()
}

fn white_noise_parameter(kind: ElementKind, request: &WhiteNoiseRequest) -> Result<Parameter, AppError> {
    let label = kind.display_name().to_lowercase();
    let (name, description, flag) = match request.mode {
        WhiteNoiseMode::Global => {
            if request.flag.is_some() {
                return Err(AppError::invalid("A flag is only valid in per_flag mode."));
            }
            ("global", format!("global scaling for {label} error bars"), None)
        }
        WhiteNoiseMode::PerFlag => {
            let flag = request.flag.as_deref().unwrap_or(DEFAULT_FLAG).trim().to_string();
            if flag.is_empty() {
                return Err(AppError::invalid("Per-flag mode requires a non-empty flag."));
            }
            ("per_flag", format!("per flag model for {label} error bars"), Some(flag))
        }
    };

    let rec = catalog::lookup(kind, name)
        .ok_or_else(|| AppError::new(4, format!("No recommended bounds for {} {name}.", kind.display_name())))?;
    let min_value = request.min_value.unwrap_or(rec.min_value);
    let max_value = request.max_value.unwrap_or(rec.max_value);
    check_bounds(name, min_value, max_value)?;

    Ok(Parameter {
        name: name.to_string(),
        description: Some(description),
        prior_type: prior_for(kind, name),
        include: true,
        fit: true,
        min_value,
        max_value,
        flag,
    })
}

fn check_bounds(name: &str, min_value: f64, max_value: f64) -> Result<(), AppError> {
    if !(min_value.is_finite() && max_value.is_finite()) {
        return Err(AppError::invalid(format!("Bounds for '{name}' must be finite.")));
    }
    if min_value > max_value {
        return Err(AppError::invalid(format!(
            "Bounds for '{name}' are inverted: min {min_value} > max {max_value}."
        )));
    }
    Ok(())
}

fn validate_globals(globals: &Globals) -> Result<(), AppError> {
    if globals.num_tempo2_its < 1 {
        return Err(AppError::invalid("Number of tempo2 iterations must be >= 1."));
    }
    Ok(())
}

fn validate_sampler(sampler: &Sampler) -> Result<(), AppError> {
    if !(0.0..=1.0).contains(&sampler.efficiency) {
        return Err(AppError::invalid(format!(
            "Sampler efficiency must be in [0, 1], got {}.",
            sampler.efficiency
        )));
    }
    if sampler.live_points < 1 {
        return Err(AppError::invalid("Live points must be >= 1."));
    }
    Ok(())
}
