//! Mode and band filters
//!
//! Mode labels in the source data are inconsistent ("DMR", "DMR/FM",
//! "DSTAR", "D-STAR"...), so modes are matched with regular expressions
//! searched anywhere in the label rather than against a fixed enum.

use regex::Regex;

use crate::error::SearchError;

// ============ Mode presets ============

/// Analog FM only
pub const MODE_FM: &str = r"^FM$";
pub const MODE_DMR: &str = r"DMR";
/// Yaesu System Fusion
pub const MODE_YSF: &str = r"YSF";
pub const MODE_D_STAR: &str = r"D\-?STAR";

// ============ Band presets (MHz, inclusive) ============

pub const BAND_2M: &[(f64, f64)] = &[(144.0, 148.0)];
pub const BAND_1_25M: &[(f64, f64)] = &[(219.0, 225.0)];
pub const BAND_70CM: &[(f64, f64)] = &[(420.0, 450.0)];
pub const BAND_GMRS: &[(f64, f64)] = &[(462.5500, 462.7250), (467.5500, 467.7250)];

/// Look up a band preset by name ("2m", "1.25m", "70cm", "gmrs")
pub fn band_preset(name: &str) -> Option<&'static [(f64, f64)]> {
    match name.trim().to_lowercase().as_str() {
        "2m" | "2 m" | "vhf" => Some(BAND_2M),
        "1.25m" | "1.25 m" | "220" => Some(BAND_1_25M),
        "70cm" | "70 cm" | "uhf" => Some(BAND_70CM),
        "gmrs" => Some(BAND_GMRS),
        _ => None,
    }
}

/// Matches a record's mode label against any of a set of patterns
#[derive(Debug, Clone)]
pub struct ModeFilter {
    patterns: Vec<Regex>,
}

impl ModeFilter {
    /// Compile a non-empty set of patterns
    pub fn new<I, S>(patterns: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|e| {
                    SearchError::invalid("modes", format!("bad pattern {:?}: {}", p, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_regexes(patterns)
    }

    /// Single pattern, treated as a one-element set
    pub fn single(pattern: &str) -> Result<Self, SearchError> {
        Self::new([pattern])
    }

    /// Use already-compiled patterns
    pub fn from_regexes(patterns: Vec<Regex>) -> Result<Self, SearchError> {
        if patterns.is_empty() {
            return Err(SearchError::invalid("modes", "at least one pattern is required"));
        }
        Ok(Self { patterns })
    }

    /// Look up a mode preset by name ("fm", "dmr", "ysf", "dstar")
    pub fn preset(name: &str) -> Option<Self> {
        let pattern = match name.trim().to_lowercase().as_str() {
            "fm" => MODE_FM,
            "dmr" => MODE_DMR,
            "ysf" | "fusion" | "c4fm" => MODE_YSF,
            "dstar" | "d-star" | "d star" => MODE_D_STAR,
            _ => return None,
        };
        Self::single(pattern).ok()
    }

    /// Whether any pattern is found in `mode`
    pub fn matches(&self, mode: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(mode))
    }
}

/// Inclusive frequency range, held in whole Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandRange {
    low_hz: u64,
    high_hz: u64,
}

impl BandRange {
    /// Range from MHz bounds
    pub fn from_mhz(low_mhz: f64, high_mhz: f64) -> Result<Self, SearchError> {
        if !low_mhz.is_finite() || !high_mhz.is_finite() {
            return Err(SearchError::invalid(
                "bands",
                format!("({}, {}) is not a finite range", low_mhz, high_mhz),
            ));
        }
        if low_mhz < 0.0 || low_mhz > high_mhz {
            return Err(SearchError::invalid(
                "bands",
                format!("({}, {}) must satisfy 0 <= low <= high", low_mhz, high_mhz),
            ));
        }

        Ok(Self {
            low_hz: mhz_to_hz(low_mhz),
            high_hz: mhz_to_hz(high_mhz),
        })
    }

    pub fn low_hz(&self) -> u64 {
        self.low_hz
    }

    pub fn high_hz(&self) -> u64 {
        self.high_hz
    }

    pub fn contains_hz(&self, frequency_hz: u64) -> bool {
        (self.low_hz..=self.high_hz).contains(&frequency_hz)
    }
}

fn mhz_to_hz(mhz: f64) -> u64 {
    (mhz * 1_000_000.0).round() as u64
}

/// Matches a frequency against any of a flat set of ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandFilter {
    ranges: Vec<BandRange>,
}

impl BandFilter {
    /// Build from a non-empty set of ranges
    pub fn new(ranges: Vec<BandRange>) -> Result<Self, SearchError> {
        if ranges.is_empty() {
            return Err(SearchError::invalid("bands", "at least one range is required"));
        }
        Ok(Self { ranges })
    }

    /// Build from `(low_MHz, high_MHz)` pairs
    pub fn from_mhz_pairs(pairs: &[(f64, f64)]) -> Result<Self, SearchError> {
        let ranges = pairs
            .iter()
            .map(|&(low, high)| BandRange::from_mhz(low, high))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ranges)
    }

    /// Build from named presets, e.g. `["2m", "70cm"]`
    pub fn from_presets<I, S>(names: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pairs = Vec::new();
        for name in names {
            let name = name.as_ref();
            let preset = band_preset(name)
                .ok_or_else(|| SearchError::invalid("bands", format!("unknown band {:?}", name)))?;
            pairs.extend_from_slice(preset);
        }
        Self::from_mhz_pairs(&pairs)
    }

    pub fn ranges(&self) -> &[BandRange] {
        &self.ranges
    }

    pub fn matches(&self, frequency_hz: u64) -> bool {
        self.ranges.iter().any(|r| r.contains_hz(frequency_hz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_fm_is_anchored() {
        let fm = ModeFilter::single(MODE_FM).unwrap();
        assert!(fm.matches("FM"));
        assert!(!fm.matches("DMR"));
        assert!(!fm.matches("FM/DMR"));
    }

    #[test]
    fn test_mode_any_pattern() {
        let filter = ModeFilter::new([MODE_DMR, MODE_D_STAR]).unwrap();
        assert!(filter.matches("DMR"));
        assert!(filter.matches("FM/DMR"));
        assert!(filter.matches("DSTAR"));
        assert!(filter.matches("D-STAR"));
        assert!(!filter.matches("YSF"));
    }

    #[test]
    fn test_mode_invalid_and_empty() {
        assert_eq!(ModeFilter::single("(").unwrap_err().parameter(), "modes");
        assert_eq!(
            ModeFilter::new(Vec::<String>::new()).unwrap_err().parameter(),
            "modes"
        );
    }

    #[test]
    fn test_mode_preset() {
        assert!(ModeFilter::preset("D-Star").unwrap().matches("D-STAR"));
        assert!(ModeFilter::preset("fusion").unwrap().matches("YSF"));
        assert!(ModeFilter::preset("p25").is_none());
    }

    #[test]
    fn test_band_contains() {
        let two_m = BandFilter::from_mhz_pairs(BAND_2M).unwrap();
        let seventy = BandFilter::from_mhz_pairs(BAND_70CM).unwrap();
        assert!(two_m.matches(146_000_000));
        assert!(!seventy.matches(146_000_000));

        // Both endpoints inclusive
        assert!(two_m.matches(144_000_000));
        assert!(two_m.matches(148_000_000));
        assert!(!two_m.matches(148_000_001));
    }

    #[test]
    fn test_band_fractional_edges() {
        let gmrs = BandFilter::from_mhz_pairs(BAND_GMRS).unwrap();
        assert!(gmrs.matches(462_550_000));
        assert!(gmrs.matches(462_725_000));
        assert!(gmrs.matches(467_600_000));
        assert!(!gmrs.matches(462_750_000));
        assert_eq!(gmrs.ranges()[0].high_hz(), 462_725_000);
    }

    #[test]
    fn test_band_validation() {
        assert_eq!(BandRange::from_mhz(148.0, 144.0).unwrap_err().parameter(), "bands");
        assert!(BandRange::from_mhz(f64::NAN, 144.0).is_err());
        assert!(BandRange::from_mhz(-1.0, 144.0).is_err());
        assert!(BandFilter::new(Vec::new()).is_err());
    }

    #[test]
    fn test_band_presets() {
        let filter = BandFilter::from_presets(["2m", "70CM"]).unwrap();
        assert!(filter.matches(146_520_000));
        assert!(filter.matches(446_000_000));
        assert!(!filter.matches(223_500_000));
        assert!(BandFilter::from_presets(["6m"]).is_err());
    }
}
