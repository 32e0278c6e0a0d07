//! Config builder input: everything the user selected, collected in one value.
//!
//! A request can be read from a JSON file, built from CLI shorthands, or both
//! (CLI elements are appended after the file's elements).

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::domain::{ElementKind, Globals, Sampler};
use crate::error::AppError;

/// Flag used by per-flag EFAC/EQUAD when none is given.
pub const DEFAULT_FLAG: &str = "-fe";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigRequest {
    pub globals: Globals,
    pub sampler: Sampler,
    pub elements: Vec<ElementRequest>,
}

impl ConfigRequest {
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::invalid(format!("Failed to open config request '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(file)
            .map_err(|e| AppError::invalid(format!("Invalid config request '{}': {e}", path.display())))
    }
}

/// One requested element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ElementRequest {
    TimingModel,
    PowerLawRedNoise {
        #[serde(default)]
        parameters: BTreeMap<String, ParameterOverride>,
    },
    PowerLawDmNoise {
        #[serde(default)]
        parameters: BTreeMap<String, ParameterOverride>,
    },
    Efac(WhiteNoiseRequest),
    Equad(WhiteNoiseRequest),
}

impl ElementRequest {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRequest::TimingModel => ElementKind::TimingModel,
            ElementRequest::PowerLawRedNoise { .. } => ElementKind::PowerLawRedNoise,
            ElementRequest::PowerLawDmNoise { .. } => ElementKind::PowerLawDmNoise,
            ElementRequest::Efac(_) => ElementKind::Efac,
            ElementRequest::Equad(_) => ElementKind::Equad,
        }
    }
}

/// User overrides for one power-law sub-parameter; unset fields keep defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterOverride {
    pub include: Option<bool>,
    pub fit: Option<bool>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// Global vs per-flag modelling of EFAC/EQUAD (mutually exclusive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhiteNoiseMode {
    #[default]
    Global,
    PerFlag,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WhiteNoiseRequest {
    pub mode: WhiteNoiseMode,
    /// Observation flag for `per_flag` mode (defaults to `-fe`).
    pub flag: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// CLI shorthand for an element.
///
/// Grammar: `timing | red | dm | (efac|equad)[:global | :per_flag[=FLAG]]`.
impl FromStr for ElementRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (head, mode) = match s.split_once(':') {
            Some((h, m)) => (h, Some(m)),
            None => (s, None),
        };

        let head = head.to_ascii_lowercase().replace('-', "_");
        let simple = |req: ElementRequest| match mode {
            None => Ok(req),
            Some(_) => Err(format!("element '{head}' takes no mode")),
        };

        match head.as_str() {
            "timing" | "timing_model" | "tm" => simple(ElementRequest::TimingModel),
            "red" | "red_noise" | "power_law_red_noise" => simple(ElementRequest::PowerLawRedNoise {
                parameters: BTreeMap::new(),
            }),
            "dm" | "dm_noise" | "power_law_dm_noise" => simple(ElementRequest::PowerLawDmNoise {
                parameters: BTreeMap::new(),
            }),
            "efac" => Ok(ElementRequest::Efac(parse_white_noise(mode)?)),
            "equad" => Ok(ElementRequest::Equad(parse_white_noise(mode)?)),
            other => Err(format!(
                "unknown element '{other}' (expected timing, red, dm, efac, equad)"
            )),
        }
    }
}

fn parse_white_noise(mode: Option<&str>) -> Result<WhiteNoiseRequest, String> {
    let Some(mode) = mode else {
        return Ok(WhiteNoiseRequest::default());
    };

    let (name, flag) = match mode.split_once('=') {
        Some((n, f)) => (n, Some(f.to_string())),
        None => (mode, None),
    };

    match name.to_ascii_lowercase().replace('-', "_").as_str() {
        "global" if flag.is_none() => Ok(WhiteNoiseRequest::default()),
        "global" => Err("global mode takes no flag".to_string()),
        "per_flag" | "flag" => Ok(WhiteNoiseRequest {
            mode: WhiteNoiseMode::PerFlag,
            flag,
            ..WhiteNoiseRequest::default()
        }),
        other => Err(format!("unknown mode '{other}' (expected global or per_flag)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_parses_every_kind() {
        let kinds: Vec<ElementKind> = ["timing", "red", "dm", "efac", "equad:per_flag"]
            .iter()
            .map(|s| s.parse::<ElementRequest>().unwrap().kind())
            .collect();
        assert_eq!(kinds, ElementKind::ALL.to_vec());
    }

    #[test]
    fn shorthand_per_flag_keeps_custom_flag() {
        let req: ElementRequest = "efac:per-flag=-be".parse().unwrap();
        let ElementRequest::Efac(white) = req else {
            panic!("expected EFAC");
        };
        assert_eq!(white.mode, WhiteNoiseMode::PerFlag);
        assert_eq!(white.flag.as_deref(), Some("-be"));
    }

    #[test]
    fn shorthand_rejects_mode_on_power_law() {
        assert!("red:global".parse::<ElementRequest>().is_err());
        assert!("efac:global=-fe".parse::<ElementRequest>().is_err());
        assert!("spin".parse::<ElementRequest>().is_err());
    }

    #[test]
    fn request_json_accepts_partial_documents() {
        let json = r#"{
            "sampler": { "id": "polychord", "live_points": 500 },
            "elements": [
                { "kind": "timing_model" },
                { "kind": "power_law_red_noise",
                  "parameters": { "amplitude": { "min_value": -17.0 } } },
                { "kind": "equad", "mode": "per_flag", "flag": "-group" }
            ]
        }"#;
        let req: ConfigRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.sampler.live_points, 500);
        assert_eq!(req.sampler.efficiency, 0.1);
        assert_eq!(req.globals, Globals::default());
        assert_eq!(req.elements.len(), 3);
        match &req.elements[1] {
            ElementRequest::PowerLawRedNoise { parameters } => {
                assert_eq!(parameters["amplitude"].min_value, Some(-17.0));
            }
            other => panic!("unexpected element {other:?}"),
        }
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let docs = [
            r#"{"sampler":{"live_point":1}}"#,
            r#"{"globals":{"roots":"x"}}"#,
            r#"{"elemnts":[]}"#,
            r#"{"elements":[{"kind":"efac","mode":"per_flag","flg":"-be"}]}"#,
            r#"{"elements":[{"kind":"power_law_dm_noise","parameter":{}}]}"#,
        ];
        for (i, doc) in docs.iter().enumerate() {
            let path = dir.path().join(format!("request_{i}.json"));
            std::fs::write(&path, doc).unwrap();
            let err = ConfigRequest::from_json_file(&path).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{doc}");
            assert!(err.message().contains("unknown field"), "{}", err.message());
        }
    }
}
