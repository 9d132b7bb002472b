//! Build configuration
//!
//! Everything the build pipeline needs besides the project itself: where
//! the WiX binaries live, where outputs go and which extra options are
//! passed to candle and light.
//!
//! ```no_run
//! use wix_compose::BuildConfig;
//!
//! let config = BuildConfig::new("out")
//!     .wix_bin_dir(r"C:\Program Files (x86)\WiX Toolset v3.11\bin")
//!     .extension("WixNetFxExtension.dll")
//!     .define("Edition", "Pro")
//!     .preserve_temp_files();
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable pointing at the directory holding candle and light
pub const WIX_BIN_DIR_ENV: &str = "WIX_BIN_DIR";

/// Build configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory receiving the source, the package and intermediates;
    /// the current directory when unset
    pub output_dir: Option<PathBuf>,
    /// Directory holding candle and light; `WIX_BIN_DIR` or `PATH` when unset
    pub wix_bin_dir: Option<PathBuf>,
    /// Directory holding `MakeSfxCA.exe` and the `x86`/`x64` `sfxca.dll`;
    /// `<wix bin>/../SDK` when unset
    pub sdk_dir: Option<PathBuf>,
    /// Keep the generated source and intermediates after a successful build
    pub preserve_temp_files: bool,
    /// Extension assemblies passed in addition to the detected ones
    pub extensions: Vec<String>,
    /// Preprocessor defines
    pub defines: BTreeMap<String, Option<String>>,
    /// Raw options appended to the candle command line
    pub candle_options: Vec<String>,
    /// Raw options appended to the light command line
    pub light_options: Vec<String>,
    /// Cultures for localization
    pub cultures: Vec<String>,
    /// Warning codes to suppress
    pub suppress_warnings: Vec<String>,
    pub warnings_as_errors: bool,
    /// Skip ICE validation
    pub skip_validation: bool,
    pub verbose: bool,
}

impl BuildConfig {
    /// Create a configuration writing to `output_dir`
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: Some(output_dir.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    /// Load from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn output<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn wix_bin_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.wix_bin_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn sdk_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.sdk_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn preserve_temp_files(mut self) -> Self {
        self.preserve_temp_files = true;
        self
    }

    /// Add an extension assembly
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        if !self.extensions.contains(&ext) {
            self.extensions.push(ext);
        }
        self
    }

    /// Add a preprocessor define
    pub fn define<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.defines.insert(key.into(), Some(value.into()));
        self
    }

    /// Add a preprocessor define without a value
    pub fn define_flag<K: Into<String>>(mut self, key: K) -> Self {
        self.defines.insert(key.into(), None);
        self
    }

    pub fn candle_option(mut self, option: impl Into<String>) -> Self {
        self.candle_options.push(option.into());
        self
    }

    pub fn light_option(mut self, option: impl Into<String>) -> Self {
        self.light_options.push(option.into());
        self
    }

    pub fn culture(mut self, culture: impl Into<String>) -> Self {
        self.cultures.push(culture.into());
        self
    }

    pub fn suppress_warning(mut self, code: impl Into<String>) -> Self {
        self.suppress_warnings.push(code.into());
        self
    }

    pub fn warnings_as_errors(mut self) -> Self {
        self.warnings_as_errors = true;
        self
    }

    pub fn skip_validation(mut self) -> Self {
        self.skip_validation = true;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Output directory, defaulting to the current directory
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = BuildConfig::new("out")
            .extension("WixNetFxExtension.dll")
            .extension("WixNetFxExtension.dll")
            .define("Edition", "Pro")
            .define_flag("Debug")
            .preserve_temp_files()
            .skip_validation();

        assert_eq!(config.output_dir(), PathBuf::from("out"));
        assert_eq!(config.extensions.len(), 1);
        assert_eq!(config.defines.get("Edition"), Some(&Some("Pro".to_string())));
        assert_eq!(config.defines.get("Debug"), Some(&None));
        assert!(config.preserve_temp_files);
        assert!(config.skip_validation);
    }

    #[test]
    fn test_default_output_dir() {
        assert_eq!(BuildConfig::default().output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
output_dir: dist
wix_bin_dir: C:\WiX\bin
preserve_temp_files: true
extensions:
  - WixNetFxExtension.dll
light_options:
  - -sval
"#;
        let config = BuildConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("dist")));
        assert_eq!(config.wix_bin_dir, Some(PathBuf::from(r"C:\WiX\bin")));
        assert!(config.preserve_temp_files);
        assert_eq!(config.light_options, vec!["-sval".to_string()]);
        assert!(!config.verbose);
    }
}
