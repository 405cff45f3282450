use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::constants::*;
use crate::error::ConfigError;

/// Supported upscale factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Scale {
    X2,
    X3,
    X4,
}

impl Scale {
    pub const ALL: [Scale; 3] = [Scale::X2, Scale::X3, Scale::X4];

    pub const fn factor(self) -> i64 {
        match self {
            Scale::X2 => 2,
            Scale::X3 => 3,
            Scale::X4 => 4,
        }
    }

    /// Pixel-shuffle factors applied in order; x4 is two x2 stages.
    pub const fn stages(self) -> &'static [i64] {
        match self {
            Scale::X2 => &[2],
            Scale::X3 => &[3],
            Scale::X4 => &[2, 2],
        }
    }
}

impl TryFrom<u32> for Scale {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Scale::X2),
            3 => Ok(Scale::X3),
            4 => Ok(Scale::X4),
            other => Err(ConfigError::UnsupportedScale(other)),
        }
    }
}

impl From<Scale> for u32 {
    fn from(scale: Scale) -> u32 {
        scale.factor() as u32
    }
}

impl Display for Scale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.factor())
    }
}

/// How the blocks inside a residual group are wired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockChaining {
    /// Each block consumes the previous block's output.
    #[default]
    Sequential,
    /// Every block is built from the group input and only the last one
    /// reaches the tail convolution.
    Detached,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcanConfig {
    pub scale: Scale,
    #[serde(default = "default_num_filters")]
    pub num_filters: i64,
    #[serde(default = "default_num_res_groups")]
    pub num_res_groups: usize,
    #[serde(default = "default_num_res_blocks")]
    pub num_res_blocks: usize,
    #[serde(default = "default_reduction")]
    pub reduction: i64,
    /// Residual scaling; `None` or `Some(0.0)` leaves the scale op out.
    #[serde(default = "default_scaling")]
    pub scaling: Option<f64>,
    #[serde(default)]
    pub block_chaining: BlockChaining,
}

fn default_num_filters() -> i64 {
    DEFAULT_NUM_FILTERS
}

fn default_num_res_groups() -> usize {
    DEFAULT_NUM_RES_GROUPS
}

fn default_num_res_blocks() -> usize {
    DEFAULT_NUM_RES_BLOCKS
}

fn default_reduction() -> i64 {
    DEFAULT_REDUCTION
}

fn default_scaling() -> Option<f64> {
    DEFAULT_SCALING
}

impl RcanConfig {
    pub fn new(scale: Scale) -> Self {
        RcanConfig {
            scale,
            num_filters: DEFAULT_NUM_FILTERS,
            num_res_groups: DEFAULT_NUM_RES_GROUPS,
            num_res_blocks: DEFAULT_NUM_RES_BLOCKS,
            reduction: DEFAULT_REDUCTION,
            scaling: DEFAULT_SCALING,
            block_chaining: BlockChaining::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RcanConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_block_params(self.num_filters, self.reduction)
    }

    /// The scaling constant to apply, if any. Zero counts as disabled.
    pub fn effective_scaling(&self) -> Option<f64> {
        effective_scaling(self.scaling)
    }
}

pub(crate) fn effective_scaling(scaling: Option<f64>) -> Option<f64> {
    scaling.filter(|s| *s != 0.)
}

pub(crate) fn validate_block_params(num_filters: i64, reduction: i64) -> Result<(), ConfigError> {
    if num_filters <= 0 {
        return Err(ConfigError::ZeroFilters(num_filters));
    }
    if reduction <= 0 {
        return Err(ConfigError::ZeroReduction(reduction));
    }
    if num_filters / reduction == 0 {
        return Err(ConfigError::BottleneckTooNarrow { num_filters, reduction });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_conversions() {
        for scale in Scale::ALL {
            assert_eq!(Scale::try_from(u32::from(scale)).unwrap(), scale);
        }
        assert_eq!(Scale::X4.stages(), &[2, 2]);
        assert_eq!(Scale::X3.to_string(), "x3");
    }

    #[test]
    fn test_unsupported_scale() {
        for bad in [0, 1, 5, 8] {
            assert!(matches!(Scale::try_from(bad), Err(ConfigError::UnsupportedScale(s)) if s == bad));
        }
    }

    #[test]
    fn test_json_defaults() {
        let config = RcanConfig::from_json_str(r#"{ "scale": 4 }"#).unwrap();
        assert_eq!(config, RcanConfig::new(Scale::X4));
    }

    #[test]
    fn test_json_overrides() {
        let config = RcanConfig::from_json_str(
            r#"{ "scale": 3, "num_filters": 32, "reduction": 8, "scaling": null, "block_chaining": "detached" }"#,
        ).unwrap();
        assert_eq!(config.scale, Scale::X3);
        assert_eq!(config.num_filters, 32);
        assert_eq!(config.num_res_groups, DEFAULT_NUM_RES_GROUPS);
        assert_eq!(config.scaling, None);
        assert_eq!(config.block_chaining, BlockChaining::Detached);
    }

    #[test]
    fn test_json_rejects_bad_scale() {
        let err = RcanConfig::from_json_str(r#"{ "scale": 5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().contains("Unsupported upscale factor: 5"));
    }

    #[test]
    fn test_json_requires_scale() {
        assert!(RcanConfig::from_json_str(r#"{ "num_filters": 64 }"#).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = RcanConfig::new(Scale::X2);
        assert!(config.validate().is_ok());

        config.num_filters = 8;
        assert!(matches!(config.validate(), Err(ConfigError::BottleneckTooNarrow { num_filters: 8, reduction: 16 })));

        config.reduction = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroReduction(0))));

        config.num_filters = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroFilters(0))));
    }

    #[test]
    fn test_effective_scaling() {
        let mut config = RcanConfig::new(Scale::X2);
        assert_eq!(config.effective_scaling(), Some(1.0));
        config.scaling = Some(0.0);
        assert_eq!(config.effective_scaling(), None);
        config.scaling = None;
        assert_eq!(config.effective_scaling(), None);
    }
}
