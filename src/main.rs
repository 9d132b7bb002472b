//! wix-compose CLI - compile YAML/JSON installer projects
//!
//! Usage:
//!   wix-compose wxs project.yaml -o Product.wxs   # Compile to WiX source
//!   wix-compose build project.yaml -o dist        # Compile and run candle/light
//!   wix-compose validate project.yaml             # Check the project only
//!   wix-compose bundle setup.yaml                 # Bootstrapper source
//!   wix-compose relative <path> <base>            # Relative path helper

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wix_compose::{make_relative, validate, BuildConfig, Builder, Bundle, Compiler, Project};

#[derive(Parser)]
#[command(name = "wix-compose")]
#[command(author, version, about = "Declarative installer projects compiled to WiX source")]
struct Cli {
    /// Verbose logging (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a project to WiX source
    Wxs {
        /// YAML or JSON project file
        project: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a project and build the MSI with candle and light
    Build {
        /// YAML or JSON project file
        project: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep the generated source and intermediate files
        #[arg(short, long)]
        keep: bool,

        /// Directory containing candle.exe and light.exe
        #[arg(long)]
        wix_bin: Option<PathBuf>,

        /// Build configuration file (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate a project without emitting anything
    Validate {
        /// YAML or JSON project file
        project: PathBuf,
    },

    /// Emit the source of a bootstrapper bundle
    Bundle {
        /// YAML or JSON bundle file
        bundle: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print `path` relative to `base` using Windows path rules
    Relative {
        path: String,
        base: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Wxs { project, output } => cmd_wxs(&project, output),
        Commands::Build {
            project,
            output,
            keep,
            wix_bin,
            config,
        } => cmd_build(&project, output, keep, wix_bin, config),
        Commands::Validate { project } => cmd_validate(&project),
        Commands::Bundle { bundle, output } => cmd_bundle(&bundle, output),
        Commands::Relative { path, base } => {
            println!("{}", make_relative(&path, &base));
            Ok(())
        }
    }
}

fn load_project(path: &PathBuf) -> anyhow::Result<Project> {
    Project::from_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn cmd_wxs(path: &PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let project = load_project(path)?;
    let source = Compiler::new().compile(&project)?.to_source();

    match output {
        Some(out) => {
            std::fs::write(&out, &source)?;
            println!("Generated: {}", out.display());
        }
        None => print!("{}", source),
    }
    Ok(())
}

fn cmd_build(
    path: &PathBuf,
    output: Option<PathBuf>,
    keep: bool,
    wix_bin: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let project = load_project(path)?;

    let mut config = match config_file {
        Some(file) => BuildConfig::from_file(&file)
            .with_context(|| format!("Failed to load {}", file.display()))?,
        None => BuildConfig::default(),
    };
    if let Some(out) = output {
        config = config.output(out);
    }
    if let Some(dir) = wix_bin {
        config = config.wix_bin_dir(dir);
    }
    if keep {
        config = config.preserve_temp_files();
    }

    let msi = Builder::new(config).build_msi(&project)?;
    println!("Built: {}", msi.display());
    Ok(())
}

fn cmd_validate(path: &PathBuf) -> anyhow::Result<()> {
    let project = load_project(path)?;
    match validate(&project) {
        Ok(()) => {
            println!("Project is valid");
            println!();
            println!("  Name:         {}", project.name);
            println!("  Version:      {}", project.version);
            println!("  Manufacturer: {}", project.manufacturer);
            println!("  Directories:  {}", project.dirs.len());
            println!("  Actions:      {}", project.actions.len());
            println!("  Features:     {}", project.features.len());
            Ok(())
        }
        Err(e) => {
            eprintln!("Validation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_bundle(path: &PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let bundle =
        Bundle::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?;
    let source = bundle.to_source()?;

    match output {
        Some(out) => {
            std::fs::write(&out, &source)?;
            println!("Generated: {}", out.display());
        }
        None => print!("{}", source),
    }
    Ok(())
}
