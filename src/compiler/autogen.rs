//! Post-emission normalization of a `Product` document
//!
//! Brings components in line with the installer validation rules: icons
//! are declared once, folder-only components create their folder,
//! components under the user profile get a `RemoveFolder` and an HKCU key
//! path, and profile directories without any component get one.
//!
//! Every step checks for its own output first, so running [`normalize`] on
//! an already normalized document changes nothing.

use super::directories::{DUMMY_DIR_ID, TARGET_DIR_ID};
use crate::folders::{is_symbolic_folder_id, is_user_profile_folder};
use crate::id::{sanitize_id, ComponentGuids};
use crate::xml::{Document, Element, Node};
use log::debug;
use std::collections::HashSet;

/// Settings the normalization needs from the compilation
pub struct AutogenContext<'a> {
    /// HKCU key holding the dummy key-path values
    pub user_profile_key: &'a str,
    pub guids: &'a ComponentGuids,
    pub win64: bool,
}

/// Normalize the `Product` of `document`; other documents pass through
pub fn normalize(mut document: Document, ctx: &AutogenContext) -> Document {
    let Some(product) = document.root.first_named_mut("Product") else {
        return document;
    };

    dedupe_icons(product);

    let mut added = Vec::new();
    if let Some(target) = product.child_with_id_mut("Directory", TARGET_DIR_ID) {
        repair_directory(target, false, ctx);
        add_profile_components(target, false, ctx, &mut added);
    }

    if !added.is_empty() {
        debug!("Added {} component(s) for empty profile directories", added.len());
        product.visit_mut(&mut |el: &mut Element| {
            if el.name != "Feature" {
                return;
            }
            for id in &added {
                if el.child_with_id_mut("ComponentRef", id).is_none() {
                    el.push(Element::new("ComponentRef").attr("Id", id.as_str()));
                }
            }
        });
    }
    document
}

/// Replace icon file paths on shortcuts and ProgIds with ids of `Icon`
/// elements declared once per file
fn dedupe_icons(product: &mut Element) {
    let mut icons: Vec<(String, String)> = product
        .elements_named("Icon")
        .filter_map(|e| Some((e.get_attr("SourceFile")?.to_string(), e.id()?.to_string())))
        .collect();
    let mut taken: HashSet<String> = icons.iter().map(|(_, id)| id.clone()).collect();
    let existing = icons.len();

    product.visit_mut(&mut |el: &mut Element| {
        if el.name != "Shortcut" && el.name != "ProgId" {
            return;
        }
        let Some(value) = el.get_attr("Icon").map(str::to_string) else {
            return;
        };
        if taken.contains(&value) {
            return;
        }

        let id = match icons.iter().find(|(path, _)| path.eq_ignore_ascii_case(&value)) {
            Some((_, id)) => id.clone(),
            None => {
                let id = icon_id(&value, &taken);
                taken.insert(id.clone());
                icons.push((value.clone(), id.clone()));
                id
            }
        };
        el.set_attr("Icon", id);
    });

    for (path, id) in icons.into_iter().skip(existing) {
        product.push(
            Element::new("Icon")
                .attr("Id", id)
                .attr("SourceFile", path),
        );
    }
}

/// `app.ico`, then `app1.ico`, `app2.ico`, ... while taken
fn icon_id(path: &str, taken: &HashSet<String>) -> String {
    let file = path.rsplit(['\\', '/']).find(|s| !s.is_empty()).unwrap_or(path);
    let file = sanitize_id(file);
    if !taken.contains(&file) {
        return file;
    }
    let (stem, ext) = file.rsplit_once('.').unwrap_or((file.as_str(), "ico"));
    (1..)
        .map(|n| format!("{}{}.{}", stem, n, ext))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| file.clone())
}

fn repair_directory(dir: &mut Element, in_profile: bool, ctx: &AutogenContext) {
    let id = dir.id().unwrap_or_default().to_string();
    let in_profile = in_profile || is_user_profile_folder(&id);

    for child in dir.elements_mut() {
        match child.name.as_str() {
            "Component" => repair_component(child, &id, in_profile, ctx),
            "Directory" => repair_directory(child, in_profile, ctx),
            _ => {}
        }
    }
}

fn repair_component(component: &mut Element, dir_id: &str, in_profile: bool, ctx: &AutogenContext) {
    let component_id = component.id().unwrap_or_default().to_string();

    if !component.has_child("File") {
        if dir_id == DUMMY_DIR_ID {
            if !component.has_child("RemoveFolder") {
                component.push(remove_folder(&component_id, "both"));
            }
        } else if dir_id != TARGET_DIR_ID && !component.has_child("CreateFolder") {
            component.push(Element::new("CreateFolder"));
        }
    }

    let mut file_is_key_path = false;
    for file in component.elements_mut().filter(|e| e.name == "File") {
        let advertised = file
            .elements_named("Shortcut")
            .any(|s| s.get_attr("Advertise") == Some("yes"));
        if advertised && file.get_attr("KeyPath").is_none() {
            file.set_attr("KeyPath", "yes");
        }
        file_is_key_path |= file.get_attr("KeyPath") == Some("yes");
    }

    let plain_shortcut = component
        .descendants()
        .into_iter()
        .any(|e| e.name == "Shortcut" && e.get_attr("Advertise") != Some("yes"));

    if in_profile {
        if !component.has_child("RemoveFolder") {
            component.push(remove_folder(&component_id, "uninstall"));
        }
        ensure_dummy_key(component, &component_id, !file_is_key_path, ctx);
    } else if plain_shortcut {
        ensure_dummy_key(component, &component_id, !file_is_key_path, ctx);
    }
}

fn remove_folder(component_id: &str, on: &str) -> Element {
    Element::new("RemoveFolder")
        .attr("Id", format!("{}.RemoveFolder", component_id))
        .attr("On", on)
}

/// Add the HKCU value that serves as the component key path
fn ensure_dummy_key(component: &mut Element, component_id: &str, key_path: bool, ctx: &AutogenContext) {
    let present = component.elements_named("RegistryKey").any(|k| {
        k.get_attr("Root") == Some("HKCU") && k.get_attr("Key") == Some(ctx.user_profile_key)
    });
    if present {
        return;
    }

    let mut value = Element::new("RegistryValue")
        .attr("Name", component_id)
        .attr("Value", "0")
        .attr("Type", "string");
    if key_path {
        value.set_attr("KeyPath", "yes");
    }
    component.push(
        Element::new("RegistryKey")
            .attr("Root", "HKCU")
            .attr("Key", ctx.user_profile_key)
            .child(value),
    );
}

/// Give every profile directory without a component its own one
fn add_profile_components(
    dir: &mut Element,
    in_profile: bool,
    ctx: &AutogenContext,
    added: &mut Vec<String>,
) {
    let id = dir.id().unwrap_or_default().to_string();
    let in_profile = in_profile || is_user_profile_folder(&id);

    let needs_component = in_profile
        && id != TARGET_DIR_ID
        && !is_symbolic_folder_id(&id)
        && !dir.has_child("Component");
    if needs_component {
        let component_id = format!("{}.EmptyDirectory", id);
        let mut component = Element::new("Component")
            .attr("Id", component_id.as_str())
            .attr("Guid", ctx.guids.guid_for(&component_id));
        if ctx.win64 {
            component.set_attr("Win64", "yes");
        }
        component.push(remove_folder(&component_id, "uninstall"));
        ensure_dummy_key(&mut component, &component_id, true, ctx);
        dir.children.insert(0, Node::Element(component));
        added.push(component_id);
    }

    for child in dir.elements_mut().filter(|e| e.name == "Directory") {
        add_profile_components(child, in_profile, ctx, added);
    }
}
