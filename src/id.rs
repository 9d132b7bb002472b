//! Identifier allocation
//!
//! Every installable entity gets an id derived from its name. The first
//! entity of a given kind with a given normalized name receives the bare
//! name, later ones receive `name.1`, `name.2`, ... An [`IdAllocator`] is
//! scoped to a single compilation, so compiling the same project twice
//! yields the same ids.

use crate::folders::expand_placeholders;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Concrete entity type, the first half of the allocation key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Action,
    Binary,
    Dir,
    Feature,
    File,
    FileAssociation,
    Icon,
    MergeModule,
    Package,
    Permission,
    Property,
    RegValue,
    Service,
    Shortcut,
    SqlDatabase,
    SqlScript,
    SqlString,
    VirtualDir,
    WebSite,
}

impl EntityKind {
    /// Directory-like kinds keep their whole expanded path in the id
    pub fn keeps_full_path(&self) -> bool {
        matches!(self, EntityKind::Dir)
    }
}

/// Normalize a raw entity name into a legal identifier
pub fn normalize_name(kind: EntityKind, raw: &str) -> String {
    let expanded = expand_placeholders(raw);

    let base = if kind.keeps_full_path() {
        expanded
            .split(['\\', '/'])
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    } else {
        expanded
            .rsplit(['\\', '/'])
            .find(|s| !s.is_empty())
            .unwrap_or("")
            .to_string()
    };

    sanitize_id(&base)
}

/// Replace characters that are not legal in an installer identifier
pub fn sanitize_id(s: &str) -> String {
    let mut id: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    match id.chars().next() {
        None => id.push('_'),
        Some(c) if c.is_ascii_digit() || c == '.' => id.insert(0, '_'),
        _ => {}
    }
    id
}

/// Per-compilation identifier generator
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    counters: HashMap<(EntityKind, String), usize>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id for `(kind, raw)`
    pub fn allocate(&mut self, kind: EntityKind, raw: &str) -> String {
        let normalized = normalize_name(kind, raw);
        let key = (kind, normalized.to_lowercase());

        match self.counters.get_mut(&key) {
            None => {
                self.counters.insert(key, 0);
                normalized
            }
            Some(count) => {
                *count += 1;
                format!("{}.{}", normalized, count)
            }
        }
    }

    /// Use the explicit id when present, otherwise allocate one
    pub fn resolve(&mut self, kind: EntityKind, explicit: Option<&str>, raw: &str) -> String {
        match explicit {
            Some(id) => id.to_string(),
            None => self.allocate(kind, raw),
        }
    }

    /// Forget every allocation
    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

/// How component GUIDs are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentGuidPolicy {
    /// Hash of the package id and the component id. Stable for a given
    /// product version, different for every new version.
    #[default]
    Derived,
    /// Fresh random GUID on every compile
    Random,
    /// Let the WiX compiler compute it (`Guid="*"`)
    Auto,
}

/// Component GUID source for one compilation
#[derive(Debug, Clone, Copy)]
pub struct ComponentGuids {
    policy: ComponentGuidPolicy,
    seed: Uuid,
}

impl ComponentGuids {
    pub fn new(policy: ComponentGuidPolicy, seed: Uuid) -> Self {
        Self { policy, seed }
    }

    pub fn guid_for(&self, component_id: &str) -> String {
        match self.policy {
            ComponentGuidPolicy::Derived => {
                format_guid(&Uuid::new_v5(&self.seed, component_id.as_bytes()))
            }
            ComponentGuidPolicy::Random => format_guid(&Uuid::new_v4()),
            ComponentGuidPolicy::Auto => "*".to_string(),
        }
    }
}

/// Upper-case hyphenated form used throughout the emitted source
pub fn format_guid(guid: &Uuid) -> String {
    guid.hyphenated().to_string().to_uppercase()
}
