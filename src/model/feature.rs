use super::Attributes;
use serde::{Deserialize, Serialize};

/// A user-selectable bundle of installable units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Install level, 1 installs by default
    pub level: u32,
    /// The user may deselect the feature
    pub allow_change: bool,
    pub display: Option<FeatureDisplay>,
    pub configurable_directory: Option<String>,
    pub condition: Option<FeatureCondition>,
    pub children: Vec<Feature>,
    pub attributes: Attributes,
}

impl Default for Feature {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: None,
            level: 1,
            allow_change: true,
            display: None,
            configurable_directory: None,
            condition: None,
            children: Vec::new(),
            attributes: Attributes::new(),
        }
    }
}

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn disallow_change(mut self) -> Self {
        self.allow_change = false;
        self
    }

    pub fn display(mut self, display: FeatureDisplay) -> Self {
        self.display = Some(display);
        self
    }

    pub fn configurable_directory(mut self, dir_id: impl Into<String>) -> Self {
        self.configurable_directory = Some(dir_id.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<String>, level: u32) -> Self {
        self.condition = Some(FeatureCondition {
            condition: condition.into(),
            level,
        });
        self
    }

    pub fn child(mut self, feature: Feature) -> Self {
        self.children.push(feature);
        self
    }

    pub fn children<I>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = Feature>,
    {
        self.children.extend(features);
        self
    }

    /// This feature and all of its descendants, parents first
    pub fn flatten(&self) -> Vec<&Feature> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }
}

/// How the feature shows in the selection tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureDisplay {
    Collapse,
    Expand,
    Hidden,
}

impl FeatureDisplay {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureDisplay::Collapse => "collapse",
            FeatureDisplay::Expand => "expand",
            FeatureDisplay::Hidden => "hidden",
        }
    }
}

/// Overrides the install level when the condition holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCondition {
    pub condition: String,
    pub level: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_order() {
        let root = Feature::new("App").child(
            Feature::new("Documentation")
                .child(Feature::new("Manual"))
                .child(Feature::new("Samples")),
        );
        let names: Vec<_> = root.flatten().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["App", "Documentation", "Manual", "Samples"]);
    }
}
