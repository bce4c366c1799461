use crate::core::grid::dims::{GridDim, GridDims};
use crate::core::models::atom::AtomTyping;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Version tag written into persisted caches by default.
pub const DEFAULT_SCORING_VERSION: &str = "xbdock-xs-1";
/// Penalty per Angstrom outside the box.
pub const DEFAULT_SLOPE: f64 = 1e6;
/// Lattice spacing in Angstroms.
pub const DEFAULT_GRANULARITY: f64 = 0.375;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Search box size must be positive on every axis (axis {axis} is {size})")]
    InvalidBoxSize { axis: usize, size: f64 },

    #[error("Grid granularity must be positive, got {0}")]
    InvalidGranularity(f64),

    #[error("Slope must be finite and non-negative, got {0}")]
    InvalidSlope(f64),

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

fn default_version() -> String {
    DEFAULT_SCORING_VERSION.to_string()
}

fn default_slope() -> f64 {
    DEFAULT_SLOPE
}

fn default_granularity() -> f64 {
    DEFAULT_GRANULARITY
}

/// The docking box: a center, edge lengths, and lattice spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBox {
    pub center: [f64; 3],
    pub size: [f64; 3],
    #[serde(default = "default_granularity")]
    pub granularity: f64,
}

impl SearchBox {
    pub fn new(center: [f64; 3], size: [f64; 3]) -> Self {
        Self {
            center,
            size,
            granularity: DEFAULT_GRANULARITY,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.granularity > 0.0) {
            return Err(ConfigError::InvalidGranularity(self.granularity));
        }
        for (axis, &size) in self.size.iter().enumerate() {
            if !(size > 0.0) {
                return Err(ConfigError::InvalidBoxSize { axis, size });
            }
        }
        Ok(())
    }

    /// Lattice dimensions covering the box.
    ///
    /// Each axis gets `ceil(size / granularity)` intervals; the box grows
    /// symmetrically about its center to a whole number of intervals.
    pub fn grid_dims(&self) -> GridDims {
        std::array::from_fn(|i| {
            let n = (self.size[i] / self.granularity).ceil() as usize;
            let half_span = n as f64 * self.granularity / 2.0;
            GridDim::new(self.center[i] - half_span, self.center[i] + half_span, n)
        })
    }
}

/// Settings shared by both evaluators and by cache persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Tag identifying the scoring function a persisted cache was built with.
    #[serde(default = "default_version")]
    pub version: String,
    pub search_box: SearchBox,
    #[serde(default = "default_slope")]
    pub slope: f64,
    #[serde(default)]
    pub atom_typing: AtomTyping,
}

impl ScoringConfig {
    /// Reads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Toml`] if the file
    /// cannot be read or parsed, and the validation errors of
    /// [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.slope.is_finite() && self.slope >= 0.0) {
            return Err(ConfigError::InvalidSlope(self.slope));
        }
        self.search_box.validate()
    }

    pub fn grid_dims(&self) -> GridDims {
        self.search_box.grid_dims()
    }
}

#[derive(Default)]
pub struct ScoringConfigBuilder {
    version: Option<String>,
    search_box: Option<SearchBox>,
    slope: Option<f64>,
    atom_typing: Option<AtomTyping>,
}

impl ScoringConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
    pub fn search_box(mut self, search_box: SearchBox) -> Self {
        self.search_box = Some(search_box);
        self
    }
    pub fn slope(mut self, slope: f64) -> Self {
        self.slope = Some(slope);
        self
    }
    pub fn atom_typing(mut self, typing: AtomTyping) -> Self {
        self.atom_typing = Some(typing);
        self
    }

    pub fn build(self) -> Result<ScoringConfig, ConfigError> {
        let config = ScoringConfig {
            version: self.version.unwrap_or_else(default_version),
            search_box: self
                .search_box
                .ok_or(ConfigError::MissingParameter("search_box"))?,
            slope: self.slope.unwrap_or(DEFAULT_SLOPE),
            atom_typing: self.atom_typing.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
