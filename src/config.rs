use std::path::Path;

use crate::error::Error;
use crate::types::EstimateType;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".damage-estimate.toml";

/// Settings the host owns: who may see the estimate and how it is shown.
/// Passed explicitly into the dialog hook; nothing reads it ambiently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// Display mode; `Disabled` skips the estimate entirely.
    pub estimate_type: EstimateType,
    /// Show the estimate only to the GM.
    pub only_gm: bool,
}

/// Raw TOML structure for `.damage-estimate.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct DamageEstimateTomlConfig {
    #[serde(default)]
    estimate_type: Option<RawEstimateType>,
    #[serde(default)]
    only_gm: bool,
}

/// The mode as written in TOML: a name, or the host's stored integer.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawEstimateType {
    /// Integer setting exported from the host (0 to 3).
    HostValue(u8),
    /// Kebab-case name such as `"average-and-range"`.
    Named(EstimateType),
}

impl RawEstimateType {
    /// Resolve either spelling to a display mode.
    const fn resolve(self) -> EstimateType {
        return match self {
            RawEstimateType::HostValue(value) => EstimateType::from_host_value(value),
            RawEstimateType::Named(estimate_type) => estimate_type,
        };
    }
}

impl Config {
    /// Load config from `.damage-estimate.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed: never silently
    /// falls back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the content is not valid TOML or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: DamageEstimateTomlConfig = toml::from_str(content)?;
        return Ok(Self {
            estimate_type: raw.estimate_type.map_or(EstimateType::default(), RawEstimateType::resolve),
            only_gm: raw.only_gm,
        });
    }

    /// Replace the display mode for one invocation, if an override was given.
    pub const fn with_estimate_type(self, estimate_type: Option<EstimateType>) -> Self {
        return match estimate_type {
            Some(estimate_type) => Self { estimate_type, ..self },
            None => self,
        };
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.estimate_type, EstimateType::AverageAndRange);
        assert!(!config.only_gm);
    }

    #[test]
    fn reads_both_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "only_gm = true\nestimate_type = \"range\"\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.estimate_type, EstimateType::Range);
        assert!(config.only_gm);
    }

    #[test]
    fn accepts_host_integer_setting() {
        assert_eq!(Config::parse("estimate_type = 0").unwrap().estimate_type, EstimateType::Disabled);
        assert_eq!(Config::parse("estimate_type = 1").unwrap().estimate_type, EstimateType::Average);
        assert_eq!(Config::parse("estimate_type = 7").unwrap().estimate_type, EstimateType::AverageAndRange);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(matches!(Config::parse("estimate_type = \"loud\""), Err(Error::TomlDe(_))));
        assert!(matches!(Config::parse("only_gm = \"yes\""), Err(Error::TomlDe(_))));
        assert!(matches!(Config::parse("colour = 3"), Err(Error::TomlDe(_))));
    }

    #[test]
    fn override_replaces_only_the_mode() {
        let config = Config::parse("only_gm = true").unwrap();
        let overridden = config.with_estimate_type(Some(EstimateType::Average));
        assert_eq!(overridden.estimate_type, EstimateType::Average);
        assert!(overridden.only_gm);
        assert_eq!(config.with_estimate_type(None), config);
    }
}
