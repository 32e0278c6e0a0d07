//! Recommended parameter bounds for the standard TempoNest setup.
//!
//! Bounds are in the sampler's native units: `log10` amplitudes for the
//! power-law processes and EQUAD, raw spectral index, and the EFAC prior range.

use crate::domain::ElementKind;

/// Default `[min, max]` bounds for one sub-parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommended {
    pub name: &'static str,
    pub min_value: f64,
    pub max_value: f64,
}

const POWER_LAW: [Recommended; 2] = [
    Recommended {
        name: "amplitude",
        min_value: -18.0,
        max_value: -10.0,
    },
    Recommended {
        name: "spectral_index",
        min_value: 0.0,
        max_value: 7.0,
    },
];

const EFAC: [Recommended; 2] = [
    Recommended {
        name: "global",
        min_value: -1.0,
        max_value: 0.7,
    },
    Recommended {
        name: "per_flag",
        min_value: -1.0,
        max_value: 0.7,
    },
];

const EQUAD: [Recommended; 2] = [
    Recommended {
        name: "global",
        min_value: -9.0,
        max_value: -3.0,
    },
    Recommended {
        name: "per_flag",
        min_value: -9.0,
        max_value: -3.0,
    },
];

/// Catalog entries for an element kind (empty for the timing model).
pub fn recommended(kind: ElementKind) -> &'static [Recommended] {
    match kind {
        ElementKind::TimingModel => &[],
        ElementKind::PowerLawRedNoise | ElementKind::PowerLawDmNoise => &POWER_LAW,
        ElementKind::Efac => &EFAC,
        ElementKind::Equad => &EQUAD,
    }
}

/// Look up a single catalog entry.
pub fn lookup(kind: ElementKind, name: &str) -> Option<Recommended> {
    recommended(kind).iter().find(|r| r.name == name).copied()
}
