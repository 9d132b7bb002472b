//! Expansion of wildcard `Files` items against the build machine's file system

use crate::error::{Result, WixError};
use crate::model::{Dir, File, Files, Project};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

impl Project {
    /// Return a copy of the project where every [`Files`] item is replaced
    /// by concrete `File`s (and `Dir`s for sub-directories when recursive).
    ///
    /// Patterns resolve against `source_base_dir`, or the current directory
    /// when unset.
    pub fn resolve_wildcards(&self) -> Result<Project> {
        let base = self
            .source_base_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        let mut project = self.clone();
        for dir in &mut project.dirs {
            resolve_dir(dir, &base)?;
        }
        Ok(project)
    }
}

fn resolve_dir(dir: &mut Dir, base: &Path) -> Result<()> {
    for wildcard in std::mem::take(&mut dir.wildcards) {
        let (files, dirs) = expand(&wildcard, base)?;
        debug!(
            "Wildcard '{}' matched {} file(s) and {} sub-directory(ies)",
            wildcard.pattern,
            files.len(),
            dirs.len()
        );
        dir.files.extend(files);
        for sub in dirs {
            merge_into(&mut dir.dirs, sub);
        }
    }
    for sub in &mut dir.dirs {
        resolve_dir(sub, base)?;
    }
    Ok(())
}

/// Split `bin/Release/*.dll` into the directory part and the file mask
fn split_pattern(pattern: &str) -> (&str, &str) {
    match pattern.rfind(['\\', '/']) {
        Some(pos) => (&pattern[..pos], &pattern[pos + 1..]),
        None => ("", pattern),
    }
}

fn expand(wildcard: &Files, base: &Path) -> Result<(Vec<File>, Vec<Dir>)> {
    let (dir_part, mask) = split_pattern(&wildcard.pattern);
    let root = if dir_part.is_empty() {
        base.to_path_buf()
    } else {
        base.join(dir_part.replace('\\', "/"))
    };

    if !root.is_dir() {
        return Err(WixError::DirectoryNotFound(root));
    }

    // `*.*` also matches files without an extension
    let mask = if mask == "*.*" || mask.is_empty() { "*" } else { mask };
    let matcher = glob::Pattern::new(mask)
        .map_err(|e| WixError::Structure(format!("invalid wildcard '{}': {}", mask, e)))?;
    let excludes: Vec<glob::Pattern> = wildcard
        .exclude
        .iter()
        .map(|p| {
            glob::Pattern::new(p)
                .map_err(|e| WixError::Structure(format!("invalid exclude '{}': {}", p, e)))
        })
        .collect::<Result<_>>()?;

    let walker = Walker {
        root: &root,
        matcher,
        excludes,
        wildcard,
    };
    walker.collect(&root)
}

struct Walker<'a> {
    root: &'a Path,
    matcher: glob::Pattern,
    excludes: Vec<glob::Pattern>,
    wildcard: &'a Files,
}

impl Walker<'_> {
    fn collect(&self, path: &Path) -> Result<(Vec<File>, Vec<Dir>)> {
        let mut files = Vec::new();
        let mut dirs = Vec::new();

        let entries = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in entries {
            let entry = entry.map_err(std::io::Error::from)?;
            let entry_path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            let relative = entry_path
                .strip_prefix(self.root)
                .unwrap_or(entry_path)
                .to_string_lossy()
                .replace('\\', "/");

            if self.is_excluded(&name, &relative) {
                continue;
            }

            if entry.file_type().is_dir() {
                if !self.wildcard.recursive {
                    continue;
                }
                let (sub_files, sub_dirs) = self.collect(entry_path)?;
                if sub_files.is_empty() && sub_dirs.is_empty() {
                    continue;
                }
                let mut dir = Dir::named(name);
                dir.files = sub_files;
                dir.dirs = sub_dirs;
                dirs.push(dir);
            } else if entry.file_type().is_file() && self.matcher.matches(&name) {
                let mut file = File::new(entry_path.to_string_lossy().to_string(), []);
                file.feature = self.wildcard.feature.clone();
                files.push(file);
            }
        }

        Ok((files, dirs))
    }

    fn is_excluded(&self, name: &str, relative: &str) -> bool {
        self.excludes
            .iter()
            .any(|p| p.matches(name) || p.matches(relative))
    }
}

/// Add `dir` to `siblings`, folding it into an existing same-named entry
fn merge_into(siblings: &mut Vec<Dir>, dir: Dir) {
    match siblings
        .iter_mut()
        .find(|d| d.id.is_none() && d.name.eq_ignore_ascii_case(&dir.name))
    {
        Some(existing) => {
            existing.files.extend(dir.files);
            for sub in dir.dirs {
                merge_into(&mut existing.dirs, sub);
            }
        }
        None => siblings.push(dir),
    }
}
