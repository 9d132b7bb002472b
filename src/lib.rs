//! wix-compose - declarative installer model compiled to WiX source
//!
//! Describe the installed state as plain Rust values (directories, files,
//! shortcuts, registry values, services, custom actions, features) and get
//! a WiX v3 source document, or a finished package when candle and light
//! are available.
//!
//! # Example
//!
//! ```
//! use wix_compose::{compile_to_string, Dir, File, Project, Shortcut};
//!
//! let project = Project::with_items(
//!     "MyProduct",
//!     [Dir::new(
//!         r"%ProgramFiles%\My Company\My Product",
//!         [File::new(r"bin\app.exe", [Shortcut::new("My Product", "%ProgramMenu%").into()]).into()],
//!     )
//!     .into()],
//! )
//! .manufacturer("My Company")
//! .version("1.0.0.0");
//!
//! let wxs = compile_to_string(&project).unwrap();
//! assert!(wxs.contains("INSTALLDIR"));
//! ```

pub mod builder;
pub mod bundle;
pub mod compiler;
pub mod condition;
pub mod config;
pub mod error;
pub mod folders;
pub mod format;
pub mod id;
pub mod model;
pub mod paths;
pub mod sequence;
pub mod toolchain;
pub mod validate;
mod wildcard;
pub mod xml;

pub use builder::Builder;
pub use bundle::{
    BootstrapperUi, Bundle, BundlePackage, BundleVariable, CacheType, PackageType, VariableType,
};
pub use compiler::{
    compile, compile_to_string, normalize, AutogenContext, CompileOptions, CompiledProject,
    Compiler, UnitRef,
};
pub use condition::Condition;
pub use config::BuildConfig;
pub use error::{Result, ValidationError, WixError};
pub use format::format_source;
pub use id::{ComponentGuidPolicy, EntityKind, IdAllocator};
pub use model::*;
pub use paths::make_relative;
pub use sequence::{Execute, ReturnType, Sequence, Step, When};
pub use toolchain::WixToolset;
pub use validate::validate;
pub use xml::{Document, Element, Node};
