// ABOUTME: YAML fixture format describing a simulated cloud's starting state.
// ABOUTME: Loaded by `cutover run --cloud` and written back by `--dump-state`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cloud::ElasticGroup;
use crate::error::{Error, Result};
use crate::task::DEFAULT_REGION;
use crate::types::{Capacity, GroupId, ListenerArn, TargetGroupArn};

/// Starting state of a [`SimulatedCloud`](super::SimulatedCloud).
///
/// ```yaml
/// region: us-east-1
/// groups:
///   - id: sig-blue
///     name: shop__prod
///     capacity: { minimum: 1, maximum: 3, target: 2 }
///   - id: sig-green
///     name: shop__stage
///     warmup_polls: 2
/// listeners:
///   - listener_arn: arn:listener/prod
///     target_group_arn: arn:tg/blue
/// target_groups:
///   - arn:tg/green
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloudFixture {
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub groups: Vec<GroupFixture>,

    #[serde(default)]
    pub listeners: Vec<ListenerFixture>,

    /// Target groups that exist besides those listeners already forward to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_groups: Vec<TargetGroupArn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupFixture {
    pub id: GroupId,
    pub name: String,

    #[serde(default)]
    pub capacity: Capacity,

    /// Health polls a freshly launched instance stays unhealthy for.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub warmup_polls: u32,

    /// Instances of this group never report healthy.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub never_healthy: bool,
}

impl GroupFixture {
    pub fn group(&self) -> ElasticGroup {
        ElasticGroup {
            id: self.id.clone(),
            name: self.name.clone(),
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenerFixture {
    pub listener_arn: ListenerArn,
    pub target_group_arn: TargetGroupArn,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl CloudFixture {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    /// Load a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| Error::InvalidFixture {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::from)
    }

    /// Write the fixture to a file, replacing it.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_fixture_uses_defaults() {
        let fixture = CloudFixture::from_yaml("groups:\n  - id: sig-1\n    name: app\n").unwrap();
        assert_eq!(fixture.region, DEFAULT_REGION);
        assert_eq!(fixture.groups[0].capacity, Capacity::zero());
        assert_eq!(fixture.groups[0].warmup_polls, 0);
        assert!(!fixture.groups[0].never_healthy);
        assert!(fixture.listeners.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = CloudFixture::from_yaml("groups: []\nbogus: 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn yaml_round_trip_preserves_fixture() {
        let yaml = r#"
region: eu-west-1
groups:
  - id: sig-blue
    name: shop__prod
    capacity: { minimum: 1, maximum: 3, target: 2 }
    warmup_polls: 1
listeners:
  - listener_arn: arn:listener/prod
    target_group_arn: arn:tg/blue
target_groups:
  - arn:tg/green
"#;
        let fixture = CloudFixture::from_yaml(yaml).unwrap();
        let again = CloudFixture::from_yaml(&fixture.to_yaml().unwrap()).unwrap();
        assert_eq!(fixture, again);
        assert_eq!(again.groups[0].group().capacity, Capacity::new(1, 3, 2));
    }
}
