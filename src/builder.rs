//! End-to-end build: project to source, source to package
//!
//! Intermediate files are tracked and removed after a successful build
//! unless [`BuildConfig::preserve_temp_files`] is set. When a step fails
//! they stay in place for inspection.

use crate::bundle::Bundle;
use crate::compiler::{CompiledProject, Compiler};
use crate::config::BuildConfig;
use crate::error::Result;
use crate::model::{Platform, Project};
use crate::toolchain::{run_tool, sfxca_args, WixToolset, CUSTOM_ACTION_CONFIG};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Files created during a build that are not part of its result
#[derive(Debug, Default)]
struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    fn cleanup(self) {
        for path in self.paths {
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove {}: {}", path.display(), e);
                }
            }
        }
    }

    fn finish(self, preserve: bool) {
        if preserve {
            debug!("Keeping {} intermediate file(s)", self.paths.len());
        } else {
            self.cleanup();
        }
    }
}

/// Runs the build pipeline for one configuration
#[derive(Debug, Clone, Default)]
pub struct Builder {
    config: BuildConfig,
}

impl Builder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Compile `project` and write the formatted source; returns its path
    pub fn build_wxs(&self, project: &Project) -> Result<PathBuf> {
        let out_dir = self.prepare_output_dir()?;
        let compiled = self.compile(project, &out_dir)?;
        let wxs = out_dir.join(format!("{}.wxs", project.output_name()));
        fs::write(&wxs, compiled.to_source())?;
        info!("Wrote {}", wxs.display());
        Ok(wxs)
    }

    /// Compile `project` and run the toolchain; returns the package path
    pub fn build_msi(&self, project: &Project) -> Result<PathBuf> {
        let out_dir = self.prepare_output_dir()?;
        let compiled = self.compile(project, &out_dir)?;
        let name = project.output_name();
        let mut temps = TempFiles::default();

        let wxs = out_dir.join(format!("{}.wxs", name));
        fs::write(&wxs, compiled.to_source())?;
        temps.track(&wxs);

        let toolset = WixToolset::locate(&self.config)?;
        self.package_managed_actions(&toolset, &compiled, project.platform, &out_dir, &mut temps)?;

        let extensions = self.extensions(&compiled.extensions);
        let msi = self.link(&toolset, project.platform, &extensions, &wxs, name, "msi", &out_dir, &mut temps)?;

        temps.finish(self.config.preserve_temp_files);
        info!("Built {}", msi.display());
        Ok(msi)
    }

    /// Write the bundle source; returns its path
    pub fn build_bundle_wxs(&self, bundle: &Bundle) -> Result<PathBuf> {
        let out_dir = self.prepare_output_dir()?;
        let wxs = out_dir.join(format!("{}.wxs", bundle.output_name()));
        fs::write(&wxs, bundle.to_source()?)?;
        info!("Wrote {}", wxs.display());
        Ok(wxs)
    }

    /// Build a bootstrapper executable from `bundle`
    pub fn build_bundle(&self, bundle: &Bundle) -> Result<PathBuf> {
        let (_, bundle_extensions) = bundle.to_document()?;
        let out_dir = self.prepare_output_dir()?;
        let name = bundle.output_name();
        let mut temps = TempFiles::default();

        let wxs = out_dir.join(format!("{}.wxs", name));
        fs::write(&wxs, bundle.to_source()?)?;
        temps.track(&wxs);

        let toolset = WixToolset::locate(&self.config)?;
        let extensions = self.extensions(&bundle_extensions);
        let exe = self.link(&toolset, bundle.platform, &extensions, &wxs, name, "exe", &out_dir, &mut temps)?;

        temps.finish(self.config.preserve_temp_files);
        info!("Built {}", exe.display());
        Ok(exe)
    }

    fn prepare_output_dir(&self) -> Result<PathBuf> {
        let out_dir = self.config.output_dir();
        fs::create_dir_all(&out_dir)?;
        Ok(out_dir)
    }

    fn compile(&self, project: &Project, out_dir: &Path) -> Result<CompiledProject> {
        Compiler::new().managed_output_dir(out_dir).compile(project)
    }

    /// Detected extensions followed by the configured ones
    fn extensions(&self, detected: &[String]) -> Vec<String> {
        let mut all = detected.to_vec();
        for ext in &self.config.extensions {
            if !all.contains(ext) {
                all.push(ext.clone());
            }
        }
        all
    }

    /// candle then light; returns the linked output
    #[allow(clippy::too_many_arguments)]
    fn link(
        &self,
        toolset: &WixToolset,
        platform: Platform,
        extensions: &[String],
        wxs: &Path,
        name: &str,
        output_ext: &str,
        out_dir: &Path,
        temps: &mut TempFiles,
    ) -> Result<PathBuf> {
        let object = out_dir.join(format!("{}.wixobj", name));
        let args = toolset.candle_args(&self.config, platform, extensions, wxs, &object);
        temps.track(&object);
        run_tool(&toolset.candle_path, &args, &object)?;

        let output = out_dir.join(format!("{}.{}", name, output_ext));
        let args = toolset.light_args(&self.config, extensions, &[object], &output);
        temps.track(out_dir.join(format!("{}.wixpdb", name)));
        run_tool(&toolset.light_path, &args, &output)?;
        Ok(output)
    }

    fn package_managed_actions(
        &self,
        toolset: &WixToolset,
        compiled: &CompiledProject,
        platform: Platform,
        out_dir: &Path,
        temps: &mut TempFiles,
    ) -> Result<()> {
        if compiled.managed_packages.is_empty() {
            return Ok(());
        }

        let sdk = toolset.sdk_dir(&self.config);
        let config_file = out_dir.join("CustomAction.config");
        fs::write(&config_file, CUSTOM_ACTION_CONFIG)?;
        temps.track(&config_file);

        let make_sfx_ca = sdk.join("MakeSfxCA.exe");
        for package in &compiled.managed_packages {
            debug!(
                "Packaging {} as {}",
                package.assembly.display(),
                package.binary_id
            );
            temps.track(&package.output);
            let args = sfxca_args(&sdk, platform, package, &config_file);
            run_tool(&make_sfx_ca, &args, &package.output)?;
        }
        Ok(())
    }
}
