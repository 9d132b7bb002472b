//! Directory tree resolution
//!
//! Declared `Dir`s are first laid out as a plan tree (ids allocated,
//! same-id siblings merged), then every shortcut location is resolved
//! against the complete plan, creating missing directories on demand, and
//! only then is the content emitted.

use super::{apply_attributes, components, Context, UnitRef};
use crate::error::Result;
use crate::folders::symbolic_folder;
use crate::id::EntityKind;
use crate::model::Dir;
use crate::xml::Element;
use log::debug;
use std::collections::HashMap;

/// Id given to the first directory with content unless one is set explicitly
pub const INSTALL_DIR_ID: &str = "INSTALLDIR";

/// Id of the placeholder directory of a project without directories
pub const DUMMY_DIR_ID: &str = "DummyDir";

pub const TARGET_DIR_ID: &str = "TARGETDIR";

pub(crate) struct DirOutput {
    pub element: Element,
    pub auto_install_dir: Option<String>,
}

struct DirPlan<'a> {
    id: String,
    name: String,
    explicit: bool,
    sources: Vec<Source<'a>>,
    children: Vec<DirPlan<'a>>,
}

/// A declared `Dir` contributing content to a plan node
struct Source<'a> {
    dir: &'a Dir,
    feature: Option<&'a str>,
}

impl<'a> DirPlan<'a> {
    fn new(id: String, name: String, explicit: bool) -> Self {
        Self {
            id,
            name,
            explicit,
            sources: Vec::new(),
            children: Vec::new(),
        }
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut DirPlan<'a>> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }
}

pub(crate) fn process(ctx: &mut Context) -> Result<DirOutput> {
    let mut dirs: Vec<Dir> = ctx.project.dirs.iter().cloned().map(split_path).collect();
    if dirs.is_empty() {
        debug!("No directories declared, using placeholder '{}'", DUMMY_DIR_ID);
        dirs.push(dummy_dir(&ctx.project.name));
    }
    let auto_install_dir = assign_install_dir(&mut dirs);

    let mut root = DirPlan::new(TARGET_DIR_ID.to_string(), "SourceDir".to_string(), true);
    let mut paths: HashMap<String, String> = HashMap::new();
    paths.insert(TARGET_DIR_ID.to_lowercase(), TARGET_DIR_ID.to_string());

    for dir in &dirs {
        plan(ctx, &mut root, dir, None, "", &mut paths);
    }

    let mut locations = HashMap::new();
    for dir in &dirs {
        resolve_locations(ctx, &mut root, dir, &mut paths, &mut locations);
    }

    let element = emit(ctx, &root, &locations)?;
    Ok(DirOutput {
        element,
        auto_install_dir,
    })
}

/// Turn a `Dir` whose name holds a whole path into a nested chain
fn split_path(mut dir: Dir) -> Dir {
    dir.dirs = dir.dirs.into_iter().map(split_path).collect();

    let mut segments: Vec<String> = dir
        .name
        .split(['\\', '/'])
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if segments.len() <= 1 {
        return dir;
    }

    dir.name = segments.pop().unwrap_or_default();
    segments.into_iter().rev().fold(dir, |child, segment| {
        let mut parent = Dir::named(segment);
        parent.dirs.push(child);
        parent
    })
}

fn dummy_dir(project_name: &str) -> Dir {
    let mut dir = Dir::new(
        &format!(r"%AppDataFolder%\{}\{}", project_name, DUMMY_DIR_ID),
        [],
    );
    dir.leaf_mut().id = Some(DUMMY_DIR_ID.to_string());
    dir
}

fn contains_id(dirs: &[Dir], id: &str) -> bool {
    dirs.iter()
        .any(|d| d.id.as_deref() == Some(id) || contains_id(&d.dirs, id))
}

/// Give the first directory with content the `INSTALLDIR` id and return
/// its logical path
fn assign_install_dir(dirs: &mut [Dir]) -> Option<String> {
    if contains_id(dirs, INSTALL_DIR_ID) {
        return None;
    }
    let first = dirs.first_mut()?;

    let mut names = Vec::new();
    let mut current: &Dir = first;
    loop {
        names.push(current.name.clone());
        if current.dirs.len() == 1 && current.has_no_content() {
            current = &current.dirs[0];
        } else {
            break;
        }
    }

    let leaf = first.leaf_mut();
    if leaf.id.is_some() || symbolic_folder(&leaf.name, false).is_some() {
        return None;
    }
    leaf.id = Some(INSTALL_DIR_ID.to_string());
    Some(names.join("\\"))
}

/// Lower-cased lookup key of a path segment appended to `parent`
fn path_key(parent: &str, segment: &str, win64: bool) -> String {
    let segment = symbolic_folder(segment, win64)
        .unwrap_or(segment)
        .to_lowercase();
    if parent.is_empty() {
        segment
    } else {
        format!("{}\\{}", parent, segment)
    }
}

fn child_id(ctx: &mut Context, parent_id: &str, name: &str) -> String {
    if parent_id == TARGET_DIR_ID {
        ctx.ids.allocate(EntityKind::Dir, name)
    } else {
        ctx.ids
            .allocate(EntityKind::Dir, &format!("{}\\{}", parent_id, name))
    }
}

fn plan<'a>(
    ctx: &mut Context,
    parent: &mut DirPlan<'a>,
    dir: &'a Dir,
    inherited: Option<&'a str>,
    parent_key: &str,
    paths: &mut HashMap<String, String>,
) {
    let feature = dir.feature.as_deref().or(inherited);
    let symbolic = symbolic_folder(&dir.name, ctx.win64);

    let existing = parent.children.iter().position(|c| match (&dir.id, symbolic) {
        (Some(id), _) => c.id == *id,
        (None, Some(sym)) => c.id == sym,
        (None, None) => !c.explicit && c.name.eq_ignore_ascii_case(&dir.name),
    });

    let index = match existing {
        Some(i) => i,
        None => {
            let id = match (&dir.id, symbolic) {
                (Some(id), _) => id.clone(),
                (None, Some(sym)) => sym.to_string(),
                (None, None) => child_id(ctx, &parent.id, &dir.name),
            };
            let name = symbolic.map(str::to_string).unwrap_or_else(|| dir.name.clone());
            parent
                .children
                .push(DirPlan::new(id, name, dir.id.is_some() || symbolic.is_some()));
            parent.children.len() - 1
        }
    };

    let node = &mut parent.children[index];
    let key = path_key(parent_key, &dir.name, ctx.win64);
    paths.entry(key.clone()).or_insert_with(|| node.id.clone());
    paths
        .entry(node.id.to_lowercase())
        .or_insert_with(|| node.id.clone());
    node.sources.push(Source { dir, feature });

    for sub in &dir.dirs {
        plan(ctx, node, sub, feature, &key, paths);
    }
}

/// Map every file shortcut location to a directory id
fn resolve_locations(
    ctx: &mut Context,
    root: &mut DirPlan,
    dir: &Dir,
    paths: &mut HashMap<String, String>,
    locations: &mut HashMap<String, String>,
) {
    let wanted = dir
        .files
        .iter()
        .flat_map(|f| &f.shortcuts)
        .filter_map(|s| s.location.as_deref());

    for location in wanted {
        if locations.contains_key(location) {
            continue;
        }
        let id = find_or_create(ctx, root, location, paths);
        locations.insert(location.to_string(), id);
    }

    for sub in &dir.dirs {
        resolve_locations(ctx, root, sub, paths, locations);
    }
}

/// Resolve a location such as `%ProgramMenu%\My App` against the plan,
/// creating each missing segment
fn find_or_create(
    ctx: &mut Context,
    root: &mut DirPlan,
    location: &str,
    paths: &mut HashMap<String, String>,
) -> String {
    let segments: Vec<&str> = location
        .split(['\\', '/'])
        .filter(|s| !s.is_empty())
        .collect();

    let full_key = segments
        .iter()
        .fold(String::new(), |key, seg| path_key(&key, seg, ctx.win64));
    if let Some(id) = paths.get(&full_key) {
        return id.clone();
    }

    // A leading segment may name an already laid out directory by id
    let mut rest = &segments[..];
    let mut key = String::new();
    let start_id = segments
        .first()
        .and_then(|first| paths.get(&first.to_lowercase()))
        .filter(|id| symbolic_folder(id, false).is_none())
        .cloned();
    let mut node = match start_id.as_deref().and_then(|id| root.find_mut(id)) {
        Some(found) => {
            rest = &segments[1..];
            key = found.id.to_lowercase();
            found
        }
        None => root,
    };

    for segment in rest {
        let symbolic = symbolic_folder(segment, ctx.win64);
        key = path_key(&key, segment, ctx.win64);

        let position = node.children.iter().position(|c| match symbolic {
            Some(sym) => c.id == sym,
            None => c.name.eq_ignore_ascii_case(segment),
        });
        let index = match position {
            Some(i) => i,
            None => {
                let id = match symbolic {
                    Some(sym) => sym.to_string(),
                    None => child_id(ctx, &node.id, segment),
                };
                debug!("Creating directory '{}' for shortcut location '{}'", id, location);
                let name = symbolic.map(str::to_string).unwrap_or_else(|| segment.to_string());
                node.children
                    .push(DirPlan::new(id, name, symbolic.is_some()));
                node.children.len() - 1
            }
        };
        node = &mut node.children[index];
        paths.entry(key.clone()).or_insert_with(|| node.id.clone());
    }
    node.id.clone()
}

fn emit(ctx: &mut Context, plan: &DirPlan, locations: &HashMap<String, String>) -> Result<Element> {
    let mut el = Element::new("Directory")
        .attr("Id", plan.id.as_str())
        .attr("Name", plan.name.as_str());
    for source in &plan.sources {
        el = apply_attributes(el, &source.dir.attributes)?;
    }

    for source in &plan.sources {
        let dir = source.dir;
        for file in &dir.files {
            el.push(components::file_component(
                ctx,
                file,
                &plan.id,
                source.feature,
                locations,
            )?);
        }
        for shortcut in &dir.shortcuts {
            el.push(components::dir_shortcut_component(
                ctx,
                shortcut,
                source.feature,
            )?);
        }
        for module in &dir.merge_modules {
            el.push(components::merge_module(ctx, module, source.feature)?);
        }
        for db in &dir.sql_databases {
            el.push(components::sql_component(ctx, db, source.feature)?);
        }
    }

    let declared_empty = !plan.sources.is_empty()
        && plan.children.is_empty()
        && plan.sources.iter().all(|s| s.dir.has_no_content());
    if declared_empty {
        let id = format!("{}.EmptyDirectory", plan.id);
        el.push(ctx.component(&id, &plan.sources[0].dir.component)?);
        ctx.units.add_auto(UnitRef::Component(id));
    }

    for child in &plan.children {
        el.push(emit(ctx, child, locations)?);
    }
    Ok(el)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::File;

    #[test]
    fn test_split_path() {
        let dir = split_path(Dir::named("%ProgramFiles%/Acme/App").id("APP"));
        assert_eq!(dir.name, "%ProgramFiles%");
        assert!(dir.id.is_none());
        assert_eq!(dir.dirs[0].dirs[0].name, "App");
        assert_eq!(dir.dirs[0].dirs[0].id.as_deref(), Some("APP"));
    }

    #[test]
    fn test_assign_install_dir() {
        let mut dirs = vec![Dir::new(
            r"%ProgramFiles%\Acme\App",
            [File::new("a.exe", []).into()],
        )];
        assert_eq!(
            assign_install_dir(&mut dirs).as_deref(),
            Some(r"%ProgramFiles%\Acme\App")
        );
        assert_eq!(dirs[0].dirs[0].dirs[0].id.as_deref(), Some(INSTALL_DIR_ID));
    }

    #[test]
    fn test_explicit_install_dir_is_kept() {
        let mut dirs = vec![
            Dir::new("%ProgramFiles%/App", [File::new("a.exe", []).into()]),
            Dir::named("Other").id(INSTALL_DIR_ID),
        ];
        assert!(assign_install_dir(&mut dirs).is_none());
        assert!(dirs[0].dirs[0].id.is_none());
    }

    #[test]
    fn test_path_key() {
        assert_eq!(path_key("", "%ProgramMenu%", false), "programmenufolder");
        assert_eq!(
            path_key("programmenufolder", "My App", false),
            r"programmenufolder\my app"
        );
        assert_eq!(path_key("", "%ProgramFiles%", true), "programfiles64folder");
    }
}
