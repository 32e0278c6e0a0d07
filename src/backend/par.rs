//! tempo2 parameter (`.par`) files.
//!
//! We only need a faithful key/value round trip: the simulator never solves
//! for the spin parameters, it just carries the template through and stamps
//! the data span (`START`, `FINISH`, `NTOA`) on write.

use std::fs;
use std::path::Path;

use crate::error::AppError;

/// Stand-in pulsar used when no template is supplied.
const FAKE_PAR: &str = "\
PSRJ           J0000+0000
RAJ            00:00:00.0
DECJ           00:00:00.0
F0             200.0 1
F1             -1e-15 1
PEPOCH         56658
POSEPOCH       56658
DM             10.0
EPHEM          DE440
CLK            TT(BIPM2019)
UNITS          TDB
TZRMJD         56658
TZRFRQ         1400
TZRSITE        @
";

/// Ordered `.par` entries (`KEY value...`).
#[derive(Debug, Clone, PartialEq)]
pub struct ParFile {
    entries: Vec<(String, String)>,
}

impl Default for ParFile {
    fn default() -> Self {
        Self::parse(FAKE_PAR)
    }
}

impl ParFile {
    /// Parse par text; blank lines and `#` / `C ` comments are skipped.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("C "))
            .map(|l| match l.split_once(char::is_whitespace) {
                Some((k, v)) => (k.to_string(), v.trim().to_string()),
                None => (l.to_string(), String::new()),
            })
            .collect();
        Self { entries }
    }

    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::invalid(format!("Failed to read par file '{}': {e}", path.display())))?;
        let par = Self::parse(&text);
        if par.get("PSRJ").or_else(|| par.get("PSR")).is_none() {
            return Err(AppError::invalid(format!(
                "Par file '{}' has no PSRJ/PSR entry.",
                path.display()
            )));
        }
        Ok(par)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace `key` in place, or append it.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// First whitespace-separated token of `key` as a number.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?
            .split_whitespace()
            .next()?
            .replace(['D', 'd'], "e")
            .parse()
            .ok()
    }

    pub fn name(&self) -> &str {
        self.get("PSRJ").or_else(|| self.get("PSR")).unwrap_or("FAKE")
    }

    /// Reference epoch for the spin model.
    pub fn pepoch(&self) -> Option<f64> {
        self.get_f64("PEPOCH")
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (k, v) in &self.entries {
            out.push_str(&format!("{k:<15}{v}\n"));
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<(), AppError> {
        fs::write(path, self.render())
            .map_err(|e| AppError::invalid(format!("Failed to write par file '{}': {e}", path.display())))
    }
}
