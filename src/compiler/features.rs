//! Feature tree emission

use super::{apply_attributes, Context};
use crate::error::Result;
use crate::id::EntityKind;
use crate::model::Feature;
use crate::xml::Element;

/// Id and title of the feature collecting units without an explicit feature
pub const DEFAULT_FEATURE: &str = "Complete";

/// Allocate an id for every declared feature, reachable by name and by
/// explicit id
pub(crate) fn allocate_ids(ctx: &mut Context, features: &[Feature]) {
    for feature in features.iter().flat_map(Feature::flatten) {
        let id = ctx
            .ids
            .resolve(EntityKind::Feature, feature.id.as_deref(), &feature.name);
        ctx.feature_ids
            .entry(feature.name.clone())
            .or_insert_with(|| id.clone());
        if let Some(explicit) = &feature.id {
            ctx.feature_ids.insert(explicit.clone(), id);
        }
    }
}

/// Emit the declared features plus, when needed, the default feature
pub(crate) fn emit(ctx: &Context, features: &[Feature]) -> Result<Vec<Element>> {
    let units = &ctx.units;
    let needs_default = features.is_empty() || !units.default.is_empty();
    let reuse = features
        .iter()
        .position(|f| f.name == DEFAULT_FEATURE || f.id.as_deref() == Some(DEFAULT_FEATURE));

    let mut out = features
        .iter()
        .map(|f| feature_element(ctx, f))
        .collect::<Result<Vec<_>>>()?;

    if needs_default {
        match reuse {
            Some(i) => {
                for unit in &units.default {
                    out[i].push(unit.to_element());
                }
            }
            None => {
                let mut complete = Element::new("Feature")
                    .attr("Id", DEFAULT_FEATURE)
                    .attr("Title", DEFAULT_FEATURE)
                    .attr("Absent", "allow")
                    .attr("Level", "1");
                for unit in units.default.iter().chain(&units.auto) {
                    complete.push(unit.to_element());
                }
                out.insert(0, complete);
            }
        }
    }
    Ok(out)
}

fn feature_element(ctx: &Context, feature: &Feature) -> Result<Element> {
    let id = ctx
        .feature_ids
        .get(&feature.name)
        .cloned()
        .unwrap_or_else(|| feature.name.clone());

    let mut el = Element::new("Feature")
        .attr("Id", id.as_str())
        .attr("Title", feature.name.as_str())
        .attr("Level", feature.level.to_string())
        .attr("Absent", if feature.allow_change { "allow" } else { "disallow" })
        .attr_opt("Description", feature.description.as_deref())
        .attr_opt("Display", feature.display.map(|d| d.as_str()))
        .attr_opt(
            "ConfigurableDirectory",
            feature.configurable_directory.as_deref(),
        );
    el = apply_attributes(el, &feature.attributes)?;

    if let Some(condition) = &feature.condition {
        el.push(
            Element::new("Condition")
                .attr("Level", condition.level.to_string())
                .cdata(condition.condition.as_str()),
        );
    }

    let assigned = ctx.units.by_feature.get(&id).into_iter().flatten();
    for unit in assigned.chain(&ctx.units.auto) {
        el.push(unit.to_element());
    }
    for child in &feature.children {
        el.push(feature_element(ctx, child)?);
    }
    Ok(el)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::UnitRef;
    use crate::model::{FeatureDisplay, Project};

    /// Unit ids referenced directly by `feature`
    fn referenced_units(feature: &Element) -> Vec<&str> {
        feature
            .elements()
            .filter(|e| e.name == "ComponentRef" || e.name == "MergeRef")
            .filter_map(|e| e.id())
            .collect()
    }

    fn context(project: &Project) -> Context<'_> {
        let mut ctx = Context::new(project, 1033, None);
        allocate_ids(&mut ctx, &project.features);
        ctx
    }

    #[test]
    fn test_default_feature_when_none_declared() {
        let project = Project::new("App");
        let mut ctx = context(&project);
        ctx.units.add(None, UnitRef::Component("Component.a.exe".into()));

        let features = emit(&ctx, &project.features).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id(), Some("Complete"));
        assert_eq!(features[0].get_attr("Absent"), Some("allow"));
        assert_eq!(referenced_units(&features[0]), vec!["Component.a.exe"]);
    }

    #[test]
    fn test_nested_features_and_auto_units() {
        let project = Project::with_items(
            "App",
            [Feature::new("Main")
                .display(FeatureDisplay::Expand)
                .child(Feature::new("Docs").disallow_change().child(Feature::new("Samples")))
                .into()],
        );
        let mut ctx = context(&project);
        ctx.units.add(Some("Samples"), UnitRef::Component("Component.s.txt".into()));
        ctx.units.add_auto(UnitRef::Component("DummyDir.EmptyDirectory".into()));

        let features = emit(&ctx, &project.features).unwrap();
        assert_eq!(features.len(), 1, "no default feature without unassigned units");

        let main = &features[0];
        assert_eq!(main.get_attr("Display"), Some("expand"));
        let docs = main.first_named("Feature").unwrap();
        assert_eq!(docs.get_attr("Absent"), Some("disallow"));
        let samples = docs.first_named("Feature").unwrap();
        assert_eq!(samples.id(), Some("Samples"));
        assert_eq!(
            referenced_units(samples),
            vec!["Component.s.txt", "DummyDir.EmptyDirectory"]
        );
        assert!(main.has_child("ComponentRef"), "auto units reach every feature");
    }

    #[test]
    fn test_declared_complete_feature_is_reused() {
        let project = Project::with_items("App", [Feature::new("Complete").level(2).into()]);
        let mut ctx = context(&project);
        ctx.units.add(None, UnitRef::Merge("crt.msm".into()));

        let features = emit(&ctx, &project.features).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].get_attr("Level"), Some("2"));
        assert!(features[0].has_child("MergeRef"));
    }

    #[test]
    fn test_condition_child() {
        let project = Project::with_items("App", [Feature::new("Tools").condition("NOT TOOLS", 0).into()]);
        let ctx = context(&project);
        let features = emit(&ctx, &project.features).unwrap();
        let condition = features[0].first_named("Condition").unwrap();
        assert_eq!(condition.get_attr("Level"), Some("0"));
        assert_eq!(condition.text_content(), "NOT TOOLS");
    }
}
