//! WiX v3 toolchain discovery and invocation
//!
//! Locates candle and light, builds their command lines and runs them,
//! treating a tool as successful only when it exits with 0 and the
//! expected output file exists. Managed custom actions are packaged with
//! `MakeSfxCA` from the deployment SDK.

use crate::compiler::ManagedPackage;
use crate::config::{BuildConfig, WIX_BIN_DIR_ENV};
use crate::error::{Result, WixError};
use crate::model::Platform;
use log::debug;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runtime configuration shipped next to a packaged managed custom action
pub const CUSTOM_ACTION_CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<configuration>
    <startup useLegacyV2RuntimeActivationPolicy="true">
        <supportedRuntime version="v4.0" />
        <supportedRuntime version="v2.0.50727" />
    </startup>
</configuration>
"#;

/// Interop assembly every managed custom action is packaged with
pub const DEPLOYMENT_ASSEMBLY: &str = "Microsoft.Deployment.WindowsInstaller.dll";

/// Located WiX v3 installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WixToolset {
    pub bin_dir: PathBuf,
    pub candle_path: PathBuf,
    pub light_path: PathBuf,
}

impl WixToolset {
    /// Find candle and light: the configured directory, then `WIX_BIN_DIR`,
    /// then `PATH`
    pub fn locate(config: &BuildConfig) -> Result<Self> {
        if let Some(dir) = &config.wix_bin_dir {
            return Self::from_dir(dir);
        }
        if let Some(dir) = env::var_os(WIX_BIN_DIR_ENV) {
            return Self::from_dir(Path::new(&dir));
        }

        let candle = which::which("candle").map_err(|_| WixError::ToolNotFound {
            tool: "candle".to_string(),
        })?;
        let light = which::which("light").map_err(|_| WixError::ToolNotFound {
            tool: "light".to_string(),
        })?;
        let bin_dir = candle.parent().unwrap_or(Path::new(".")).to_path_buf();
        debug!("Using WiX toolset from PATH: {}", bin_dir.display());

        Ok(Self {
            bin_dir,
            candle_path: candle,
            light_path: light,
        })
    }

    /// Toolset installed in `dir`; both tools must exist
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let candle = tool_in(dir, "candle").ok_or_else(|| WixError::ToolNotFound {
            tool: dir.join("candle.exe").display().to_string(),
        })?;
        let light = tool_in(dir, "light").ok_or_else(|| WixError::ToolNotFound {
            tool: dir.join("light.exe").display().to_string(),
        })?;
        debug!("Using WiX toolset from {}", dir.display());

        Ok(Self {
            bin_dir: dir.to_path_buf(),
            candle_path: candle,
            light_path: light,
        })
    }

    /// Toolset with conventional file names under `dir`, without checking
    /// that they exist
    pub fn assume(dir: impl Into<PathBuf>) -> Self {
        let bin_dir = dir.into();
        Self {
            candle_path: bin_dir.join("candle.exe"),
            light_path: bin_dir.join("light.exe"),
            bin_dir,
        }
    }

    /// Directory of the deployment SDK
    pub fn sdk_dir(&self, config: &BuildConfig) -> PathBuf {
        config
            .sdk_dir
            .clone()
            .unwrap_or_else(|| self.bin_dir.join("..").join("SDK"))
    }

    /// Arguments compiling `source` into `object`
    pub fn candle_args(
        &self,
        config: &BuildConfig,
        platform: Platform,
        extensions: &[String],
        source: &Path,
        object: &Path,
    ) -> Vec<String> {
        let mut args = vec![
            "-nologo".to_string(),
            "-arch".to_string(),
            platform.as_str().to_string(),
        ];

        for (key, value) in &config.defines {
            match value {
                Some(v) => args.push(format!("-d{}={}", key, v)),
                None => args.push(format!("-d{}", key)),
            }
        }

        push_extensions(&mut args, extensions);
        push_warning_flags(&mut args, config);
        args.extend(config.candle_options.iter().cloned());

        args.push("-out".to_string());
        args.push(object.to_string_lossy().to_string());
        args.push(source.to_string_lossy().to_string());
        args
    }

    /// Arguments linking `objects` into `output`
    pub fn light_args(
        &self,
        config: &BuildConfig,
        extensions: &[String],
        objects: &[PathBuf],
        output: &Path,
    ) -> Vec<String> {
        let mut args = vec!["-nologo".to_string()];

        push_extensions(&mut args, extensions);

        if config.skip_validation {
            args.push("-sval".to_string());
        }
        if !config.cultures.is_empty() {
            args.push(format!("-cultures:{}", config.cultures.join(";")));
        }
        push_warning_flags(&mut args, config);
        args.extend(config.light_options.iter().cloned());

        args.push("-out".to_string());
        args.push(output.to_string_lossy().to_string());
        for obj in objects {
            args.push(obj.to_string_lossy().to_string());
        }
        args
    }
}

fn tool_in(dir: &Path, name: &str) -> Option<PathBuf> {
    [format!("{}.exe", name), name.to_string()]
        .into_iter()
        .map(|file| dir.join(file))
        .find(|p| p.is_file())
}

fn push_extensions(args: &mut Vec<String>, extensions: &[String]) {
    for ext in extensions {
        args.push("-ext".to_string());
        args.push(ext.clone());
    }
}

fn push_warning_flags(args: &mut Vec<String>, config: &BuildConfig) {
    for code in &config.suppress_warnings {
        args.push(format!("-sw{}", code));
    }
    if config.warnings_as_errors {
        args.push("-wx".to_string());
    }
    if config.verbose {
        args.push("-v".to_string());
    }
}

/// Arguments of `MakeSfxCA.exe` packaging one managed assembly
pub fn sfxca_args(
    sdk_dir: &Path,
    platform: Platform,
    package: &ManagedPackage,
    config_file: &Path,
) -> Vec<String> {
    let mut args = vec![
        package.output.to_string_lossy().to_string(),
        sdk_dir.join(platform.as_str()).join("sfxca.dll").to_string_lossy().to_string(),
        package.assembly.to_string_lossy().to_string(),
        config_file.to_string_lossy().to_string(),
    ];
    if let Some(pdb) = &package.pdb {
        args.push(pdb.to_string_lossy().to_string());
    }
    for reference in &package.ref_assemblies {
        args.push(reference.to_string_lossy().to_string());
    }
    args.push(sdk_dir.join(DEPLOYMENT_ASSEMBLY).to_string_lossy().to_string());
    args
}

/// Command line as shown in errors and logs
pub fn command_line(program: &Path, args: &[String]) -> String {
    let mut parts = vec![quote(&program.to_string_lossy())];
    parts.extend(args.iter().map(|a| quote(a)));
    parts.join(" ")
}

fn quote(arg: &str) -> String {
    if arg.contains(' ') {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}

/// Run a tool and require `expected` to exist afterwards
pub fn run_tool(program: &Path, args: &[String], expected: &Path) -> Result<()> {
    let command = command_line(program, args);
    debug!("Running {}", command);

    let output = Command::new(program).args(args).output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WixError::ToolNotFound {
                tool: program.display().to_string(),
            }
        } else {
            WixError::Io(e)
        }
    })?;

    if !output.status.success() {
        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(WixError::ToolFailed {
            command,
            output: text.trim_end().to_string(),
        });
    }
    if !expected.exists() {
        return Err(WixError::MissingOutput {
            command,
            path: expected.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extensions() -> Vec<String> {
        vec!["WixUtilExtension.dll".to_string()]
    }

    #[test]
    fn test_candle_args() {
        let toolset = WixToolset::assume(r"C:\WiX\bin");
        let config = BuildConfig::default()
            .define("Edition", "Pro")
            .suppress_warning("1076")
            .candle_option("-pedantic");
        let args = toolset.candle_args(
            &config,
            Platform::X64,
            &extensions(),
            Path::new("App.wxs"),
            Path::new("App.wixobj"),
        );

        assert_eq!(&args[..3], ["-nologo", "-arch", "x64"]);
        assert!(args.contains(&"-dEdition=Pro".to_string()));
        assert!(args.contains(&"-sw1076".to_string()));
        let ext = args.iter().position(|a| a == "-ext").unwrap();
        assert_eq!(args[ext + 1], "WixUtilExtension.dll");
        assert!(args.contains(&"-pedantic".to_string()));
        assert_eq!(args.last().unwrap(), "App.wxs");
        let out = args.iter().position(|a| a == "-out").unwrap();
        assert_eq!(args[out + 1], "App.wixobj");
    }

    #[test]
    fn test_light_args() {
        let toolset = WixToolset::assume("bin");
        let config = BuildConfig::default()
            .skip_validation()
            .culture("en-US")
            .warnings_as_errors();
        let args = toolset.light_args(
            &config,
            &extensions(),
            &[PathBuf::from("App.wixobj")],
            Path::new("App.msi"),
        );

        assert!(args.contains(&"-sval".to_string()));
        assert!(args.contains(&"-cultures:en-US".to_string()));
        assert!(args.contains(&"-wx".to_string()));
        assert_eq!(args.last().unwrap(), "App.wixobj");
        let out = args.iter().position(|a| a == "-out").unwrap();
        assert_eq!(args[out + 1], "App.msi");
    }

    #[test]
    fn test_from_dir_missing_tools() {
        let dir = tempfile::tempdir().unwrap();
        let err = WixToolset::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, WixError::ToolNotFound { .. }));
    }

    #[test]
    fn test_from_dir_finds_tools() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("candle.exe"), b"").unwrap();
        std::fs::write(dir.path().join("light.exe"), b"").unwrap();
        let toolset = WixToolset::from_dir(dir.path()).unwrap();
        assert_eq!(toolset.candle_path, dir.path().join("candle.exe"));
        assert_eq!(toolset.light_path, dir.path().join("light.exe"));
    }

    #[test]
    fn test_sfxca_args_order() {
        let package = ManagedPackage {
            binary_id: "Actions.CA.dll".to_string(),
            assembly: PathBuf::from("Actions.dll"),
            ref_assemblies: vec![PathBuf::from("Helpers.dll")],
            pdb: Some(PathBuf::from("Actions.pdb")),
            output: PathBuf::from("Actions.CA.dll"),
        };
        let sdk = Path::new("sdk");
        let args = sfxca_args(sdk, Platform::X86, &package, Path::new("CustomAction.config"));
        assert_eq!(args[0], "Actions.CA.dll");
        assert_eq!(PathBuf::from(&args[1]), sdk.join("x86").join("sfxca.dll"));
        assert_eq!(args[2], "Actions.dll");
        assert_eq!(args[3], "CustomAction.config");
        assert_eq!(args[4], "Actions.pdb");
        assert_eq!(args[5], "Helpers.dll");
        assert_eq!(PathBuf::from(&args[6]), sdk.join(DEPLOYMENT_ASSEMBLY));
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let line = command_line(
            Path::new(r"C:\Program Files\WiX\candle.exe"),
            &["-out".to_string(), "a b.wixobj".to_string()],
        );
        assert_eq!(line, r#""C:\Program Files\WiX\candle.exe" -out "a b.wixobj""#);
    }

    #[test]
    fn test_run_tool_not_found() {
        let err = run_tool(
            Path::new("definitely-not-a-real-wix-tool"),
            &[],
            Path::new("out.msi"),
        )
        .unwrap_err();
        assert!(matches!(err, WixError::ToolNotFound { .. }));
    }
}
