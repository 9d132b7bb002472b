//! Pre-flight checks run before any XML is emitted

use crate::error::{Result, ValidationError};
use crate::folders::unknown_placeholders;
use crate::model::{language_code, Dir, Feature, Project, THIS_VERSION};
use log::debug;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+){0,3}$").expect("valid version regex"));

/// Run every check, stopping at the first failure
pub fn validate(project: &Project) -> Result<()> {
    debug!("Validating project '{}'", project.name);
    if !is_valid_version(&project.version) {
        return Err(ValidationError::InvalidVersion {
            context: "Project.version".to_string(),
            value: project.version.clone(),
        }
        .into());
    }
    check_upgrade_range(project)?;
    check_folders(project)?;
    check_managed_actions(project)?;
    check_features(project)?;
    check_language(project)?;
    Ok(())
}

/// Whether `value` is a version string of up to four numeric parts
pub fn is_valid_version(value: &str) -> bool {
    VERSION.is_match(value)
        && value
            .split('.')
            .all(|part| part.parse::<u32>().is_ok_and(|n| n <= 65535))
}

/// Upgrade range bounds may also name the product's own version
fn check_version(context: &str, value: &str) -> std::result::Result<(), ValidationError> {
    if value == THIS_VERSION || is_valid_version(value) {
        return Ok(());
    }
    Err(ValidationError::InvalidVersion {
        context: context.to_string(),
        value: value.to_string(),
    })
}

fn check_upgrade_range(project: &Project) -> Result<()> {
    if let Some(strategy) = &project.upgrade_strategy {
        if let Some(min) = &strategy.versions.minimum {
            check_version("UpgradeStrategy.versions.minimum", min)?;
        }
        if let Some(max) = &strategy.versions.maximum {
            check_version("UpgradeStrategy.versions.maximum", max)?;
        }
    }
    Ok(())
}

fn check_folders(project: &Project) -> Result<()> {
    fn walk(dir: &Dir) -> std::result::Result<(), ValidationError> {
        if let Some(token) = unknown_placeholders(&dir.name).into_iter().next() {
            return Err(ValidationError::UnknownFolder(token));
        }
        let locations = dir
            .files
            .iter()
            .flat_map(|f| &f.shortcuts)
            .filter_map(|s| s.location.as_deref());
        for location in locations {
            if let Some(token) = unknown_placeholders(location).into_iter().next() {
                return Err(ValidationError::UnknownFolder(token));
            }
        }
        dir.dirs.iter().try_for_each(walk)
    }

    for dir in &project.dirs {
        walk(dir)?;
    }
    Ok(())
}

/// Every action backed by the same assembly must reference the same set
/// of auxiliary assemblies
fn check_managed_actions(project: &Project) -> Result<()> {
    let mut seen: HashMap<String, BTreeSet<String>> = HashMap::new();

    for managed in project.actions.iter().filter_map(|a| a.managed_action()) {
        let key = managed.assembly.to_lowercase();
        let refs: BTreeSet<String> = managed
            .ref_assemblies
            .iter()
            .map(|r| r.to_lowercase())
            .collect();

        match seen.get(&key) {
            Some(existing) if *existing != refs => {
                return Err(ValidationError::InconsistentManagedAction {
                    assembly: managed.assembly.clone(),
                }
                .into());
            }
            Some(_) => {}
            None => {
                seen.insert(key, refs);
            }
        }
    }
    Ok(())
}

fn check_features(project: &Project) -> Result<()> {
    let mut declared = HashSet::new();
    for feature in project.features.iter().flat_map(Feature::flatten) {
        if !declared.insert(feature.name.as_str()) {
            return Err(ValidationError::DuplicateFeature(feature.name.clone()).into());
        }
        if let Some(id) = &feature.id {
            declared.insert(id.as_str());
        }
    }

    let mut referenced = Vec::new();
    for dir in &project.dirs {
        collect_feature_refs(dir, &mut referenced);
    }
    referenced.extend(project.reg_values.iter().filter_map(|r| r.feature.as_deref()));

    match referenced.into_iter().find(|name| !declared.contains(name)) {
        Some(unknown) => Err(ValidationError::UnknownFeature(unknown.to_string()).into()),
        None => Ok(()),
    }
}

fn collect_feature_refs<'a>(dir: &'a Dir, out: &mut Vec<&'a str>) {
    out.extend(dir.feature.as_deref());
    for file in &dir.files {
        out.extend(file.feature.as_deref());
        out.extend(file.shortcuts.iter().filter_map(|s| s.feature.as_deref()));
    }
    out.extend(dir.shortcuts.iter().filter_map(|s| s.feature.as_deref()));
    out.extend(dir.merge_modules.iter().filter_map(|m| m.feature.as_deref()));
    out.extend(dir.wildcards.iter().filter_map(|w| w.feature.as_deref()));
    out.extend(dir.sql_databases.iter().filter_map(|d| d.feature.as_deref()));
    for sub in &dir.dirs {
        collect_feature_refs(sub, out);
    }
}

fn check_language(project: &Project) -> Result<()> {
    for culture in project.language.split([',', ';']).map(str::trim) {
        if language_code(culture).is_none() {
            return Err(ValidationError::UnknownLanguage(culture.to_string()).into());
        }
    }
    Ok(())
}
