//! Major upgrade handling, either the simple `MajorUpgrade` element or an
//! explicit version range with downgrade prevention

use super::actions::Sequences;
use crate::id::format_guid;
use crate::model::{MajorUpgrade, Project, UpgradeStrategy, THIS_VERSION};
use crate::sequence::{Sequence, When};
use crate::xml::{yes_no, Element};
use log::warn;

pub const UPGRADE_FOUND: &str = "UPGRADEFOUND";
pub const NEWER_PRODUCT_FOUND: &str = "NEWPRODUCTFOUND";
const PREVENT_DOWNGRADING: &str = "PreventDowngrading";

#[derive(Default)]
pub(crate) struct UpgradeOutput {
    pub elements: Vec<Element>,
    pub sequences: Sequences,
}

pub(crate) fn process(project: &Project) -> UpgradeOutput {
    match (&project.major_upgrade, &project.upgrade_strategy) {
        (Some(major), strategy) => {
            if strategy.is_some() {
                warn!("Both MajorUpgrade and UpgradeStrategy set, using MajorUpgrade");
            }
            UpgradeOutput {
                elements: vec![major_upgrade(major)],
                sequences: Sequences::default(),
            }
        }
        (None, Some(strategy)) => upgrade_strategy(project, strategy),
        (None, None) => UpgradeOutput::default(),
    }
}

fn major_upgrade(major: &MajorUpgrade) -> Element {
    let message = match (&major.downgrade_error_message, major.allow_downgrades) {
        (Some(message), _) => Some(message.as_str()),
        (None, Some(true)) => None,
        (None, _) => Some("A newer version of [ProductName] is already installed."),
    };
    Element::new("MajorUpgrade")
        .yes_no("AllowDowngrades", major.allow_downgrades)
        .yes_no("AllowSameVersionUpgrades", major.allow_same_version_upgrades)
        .attr_opt("DowngradeErrorMessage", message)
        .attr_opt("Schedule", major.schedule.as_deref())
        .yes_no("IgnoreRemoveFailure", major.ignore_remove_failure)
}

fn upgrade_strategy(project: &Project, strategy: &UpgradeStrategy) -> UpgradeOutput {
    let this = |v: &Option<String>| {
        v.as_deref()
            .map(|v| if v == THIS_VERSION { project.version.as_str() } else { v })
            .map(str::to_string)
    };
    let range = &strategy.versions;

    let mut upgrade = Element::new("Upgrade")
        .attr("Id", format_guid(&project.resolved_upgrade_code()))
        .child(
            Element::new("UpgradeVersion")
                .attr_opt("Minimum", this(&range.minimum))
                .attr_opt(
                    "IncludeMinimum",
                    range.minimum.as_ref().map(|_| yes_no(range.include_minimum)),
                )
                .attr_opt("Maximum", this(&range.maximum))
                .attr_opt(
                    "IncludeMaximum",
                    range.maximum.as_ref().map(|_| yes_no(range.include_maximum)),
                )
                .attr("Property", UPGRADE_FOUND),
        );

    let mut elements = Vec::new();
    let mut sequences = Sequences::default();

    if strategy.prevent_downgrading {
        upgrade.push(
            Element::new("UpgradeVersion")
                .attr("Minimum", project.version.as_str())
                .attr("IncludeMinimum", "no")
                .attr("OnlyDetect", "yes")
                .attr("Property", NEWER_PRODUCT_FOUND),
        );
        elements.push(upgrade);
        elements.push(
            Element::new("CustomAction")
                .attr("Id", PREVENT_DOWNGRADING)
                .attr("Error", strategy.newer_product_installed_message.as_str()),
        );
        sequences.schedule(
            Sequence::INSTALL_UI_SEQUENCE + Sequence::INSTALL_EXECUTE_SEQUENCE,
            PREVENT_DOWNGRADING,
            When::After,
            "FindRelatedProducts",
            Some(NEWER_PRODUCT_FOUND),
        );
    } else {
        elements.push(upgrade);
    }

    let anchor = strategy
        .remove_existing_product_after
        .resolve(None)
        .unwrap_or("InstallInitialize");
    sequences.push(
        "InstallExecuteSequence",
        Element::new("RemoveExistingProducts").attr("After", anchor),
    );

    UpgradeOutput {
        elements,
        sequences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VersionRange;

    #[test]
    fn test_major_upgrade_default_message() {
        let project = Project::new("App").major_upgrade(MajorUpgrade::new());
        let out = process(&project);
        assert_eq!(out.elements.len(), 1);
        assert_eq!(
            out.elements[0].get_attr("DowngradeErrorMessage"),
            Some("A newer version of [ProductName] is already installed.")
        );
        assert!(out.sequences.into_elements().is_empty());
    }

    #[test]
    fn test_range_with_downgrade_prevention() {
        let project = Project::new("App")
            .version("2.1.0.0")
            .upgrade_strategy(UpgradeStrategy::default());
        let out = process(&project);

        let upgrade = &out.elements[0];
        let versions: Vec<_> = upgrade.elements_named("UpgradeVersion").collect();
        assert_eq!(versions[0].get_attr("Maximum"), Some("2.1.0.0"));
        assert_eq!(versions[0].get_attr("IncludeMaximum"), Some("no"));
        assert_eq!(versions[1].get_attr("OnlyDetect"), Some("yes"));
        assert_eq!(out.elements[1].id(), Some("PreventDowngrading"));

        let tables = out.sequences.into_elements();
        assert_eq!(tables.len(), 2);
        let execute = &tables[1];
        assert_eq!(execute.name, "InstallExecuteSequence");
        let custom = execute.first_named("Custom").unwrap();
        assert_eq!(custom.get_attr("After"), Some("FindRelatedProducts"));
        assert_eq!(custom.text_content(), "NEWPRODUCTFOUND");
        assert_eq!(
            execute.first_named("RemoveExistingProducts").unwrap().get_attr("After"),
            Some("InstallInitialize")
        );
    }

    #[test]
    fn test_range_allowing_downgrades() {
        let strategy = UpgradeStrategy::new(VersionRange {
            minimum: None,
            ..VersionRange::default()
        })
        .allow_downgrades();
        let project = Project::new("App").upgrade_strategy(strategy);
        let out = process(&project);

        assert_eq!(out.elements.len(), 1);
        let version = out.elements[0].first_named("UpgradeVersion").unwrap();
        assert!(version.get_attr("Minimum").is_none());
        assert!(version.get_attr("IncludeMinimum").is_none());
        assert_eq!(out.sequences.into_elements().len(), 1);
    }
}
