//! Read/write generated config JSON files.
//!
//! The JSON text is produced once per "generate" action and kept, so it can be
//! printed and written any number of times without rebuilding the config.

use std::fs::{self, File};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::domain::AnalysisConfig;
use crate::error::AppError;

/// Default output file name for the config builder.
pub const DEFAULT_CONFIG_FILE: &str = "temponest_config.json";

/// A serialized config, ready for display or persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedConfig {
    pub config: AnalysisConfig,
    pub json: String,
}

impl GeneratedConfig {
    /// Serialize `config` with 4-space indentation.
    pub fn generate(config: AnalysisConfig) -> Result<Self, AppError> {
        let json = to_json_string(&config)?;
        Ok(Self { config, json })
    }

    /// Write the cached JSON text to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::invalid(format!("Failed to create directory '{}': {e}", parent.display()))
            })?;
        }

        let mut text = self.json.clone();
        text.push('\n');
        fs::write(path, text)
            .map_err(|e| AppError::invalid(format!("Failed to write config JSON '{}': {e}", path.display())))?;

        tracing::info!(path = %path.display(), bytes = self.json.len(), "config written");
        Ok(())
    }
}

/// Read a previously generated config file.
pub fn read_config(path: &Path) -> Result<AnalysisConfig, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::invalid(format!("Failed to open config JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::invalid(format!("Invalid config JSON: {e}")))
}

fn to_json_string<T: Serialize>(value: &T) -> Result<String, AppError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| AppError::new(4, format!("Failed to serialize config: {e}")))?;
    String::from_utf8(buf).map_err(|e| AppError::new(4, format!("Config JSON is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigRequest, ElementRequest, build_config};

    fn sample_config() -> AnalysisConfig {
        let request = ConfigRequest {
            elements: vec![
                ElementRequest::TimingModel,
                "red".parse().unwrap(),
                "efac:per_flag".parse().unwrap(),
                "equad".parse().unwrap(),
            ],
            ..ConfigRequest::default()
        };
        build_config(&request).unwrap()
    }

    #[test]
    fn json_uses_four_space_indent_and_exact_fields() {
        let generated = GeneratedConfig::generate(sample_config()).unwrap();
        assert!(generated.json.starts_with("{\n    \"globals\": {\n        \"root\": \"results/TNest-\""));

        let value: serde_json::Value = serde_json::from_str(&generated.json).unwrap();
        let top: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(top.len(), 3);
        for key in ["globals", "sampler", "elements"] {
            assert!(top.contains(&key));
        }

        let elements = value["elements"].as_array().unwrap();
        assert_eq!(elements[0]["name"], "Timing Model");
        assert_eq!(elements[0]["parameters"].as_array().unwrap().len(), 0);

        let amp = &elements[1]["parameters"][0];
        assert_eq!(amp["name"], "amplitude");
        assert_eq!(amp["prior_type"], "log_uniform");
        assert!(amp.get("description").is_none());
        assert!(amp.get("flag").is_none());

        let per_flag = &elements[2]["parameters"][0];
        assert_eq!(per_flag["name"], "per_flag");
        assert_eq!(per_flag["prior_type"], "uniform");
        assert_eq!(per_flag["flag"], "-fe");
        assert_eq!(value["sampler"]["id"], "multinest");
    }

    /// Keys, in text order, of every object opened by a line equal to `opener`.
    fn object_keys(json: &str, opener: &str) -> Vec<Vec<String>> {
        let indent = opener.len() - opener.trim_start().len();
        let key_indent = " ".repeat(indent + 4);
        let mut objects = Vec::new();
        let mut current: Option<Vec<String>> = None;
        for line in json.lines() {
            if line == opener {
                current = Some(Vec::new());
            } else if let Some(keys) = current.as_mut() {
                if let Some(rest) = line.strip_prefix(&key_indent).filter(|r| r.starts_with('"')) {
                    keys.push(rest[1..].split('"').next().unwrap().to_string());
                } else if line.len() - line.trim_start().len() == indent && line.trim_start().starts_with('}') {
                    objects.extend(current.take());
                }
            }
        }
        objects
    }

    #[test]
    fn fields_follow_document_order() {
        let json = GeneratedConfig::generate(sample_config()).unwrap().json;

        assert_eq!(
            object_keys(&json, "    \"globals\": {"),
            vec![vec!["root", "use_original_errors", "num_tempo2_its"]]
        );
        assert_eq!(
            object_keys(&json, "    \"sampler\": {"),
            vec![vec![
                "id",
                "sample",
                "importance_sampling",
                "constant_efficiency",
                "efficiency",
                "live_points",
            ]]
        );

        let power_law = vec!["name", "prior_type", "include", "fit", "min_value", "max_value"];
        let global = vec!["name", "description", "prior_type", "include", "fit", "min_value", "max_value"];
        let per_flag = vec![
            "name",
            "description",
            "prior_type",
            "include",
            "fit",
            "min_value",
            "max_value",
            "flag",
        ];
        let params = object_keys(&json, &format!("{}{{", " ".repeat(16)));
        assert_eq!(params, vec![power_law.clone(), power_law, per_flag, global]);
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_CONFIG_FILE);

        let generated = GeneratedConfig::generate(sample_config()).unwrap();
        generated.write_to(&path).unwrap();
        // Re-writing the cached text is allowed and idempotent.
        generated.write_to(&path).unwrap();

        let back = read_config(&path).unwrap();
        assert_eq!(back, generated.config);
    }
}
