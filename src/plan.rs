//! Declarative description of how parsed tables are reshaped.
//!
//! A [`MigrationPlan`] carries the per-table rename map, the reference links
//! the resolver inlines, and an optional key style. Plans are plain data: the
//! built-in locker plan is [`MigrationPlan::locker_default`], and any other
//! dump shape can be migrated by loading a YAML plan such as
//!
//! ```yaml
//! renames:
//!   lockers:
//!     user_id: user
//! links:
//!   - fact: lockers
//!     dimension: users
//!     foreign_key: user
//! key_style: camelCase
//! ```
//!
//! Link field names refer to the names *after* renames and key styling.

use std::{
    collections::{BTreeMap, HashSet},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{error::MigrationError, yaml_provider};

/// Table name to (old field name to new field name).
pub type RenameMap = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationPlan {
    pub renames: RenameMap,
    pub links: Vec<ReferenceLink>,
    pub key_style: KeyStyle,
}

/// Replace `fact.foreign_key` with the `dimension` row whose
/// `dimension_id` matches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceLink {
    pub fact: String,
    pub dimension: String,
    pub foreign_key: String,
    #[serde(default = "default_dimension_id")]
    pub dimension_id: String,
}

fn default_dimension_id() -> String {
    "id".to_string()
}

impl ReferenceLink {
    pub fn new(fact: &str, foreign_key: &str, dimension: &str) -> Self {
        Self {
            fact: fact.to_string(),
            dimension: dimension.to_string(),
            foreign_key: foreign_key.to_string(),
            dimension_id: default_dimension_id(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyStyle {
    /// Field names are left as written (after explicit renames).
    #[default]
    Keep,
    /// Every field name is converted to lowerCamelCase.
    CamelCase,
}

impl MigrationPlan {
    /// No renames and no links: the dump is converted table by table as-is.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Mapping from the legacy locker administration schema to the shape the
    /// locker API validates.
    pub fn locker_default() -> Self {
        let mut renames = RenameMap::new();
        renames.insert(
            "lockers".into(),
            pairs(&[
                ("user_id", "user"),
                ("renter_id", "renter"),
                ("sepa_id", "sepa"),
                ("expiration_date", "expirationDate"),
            ]),
        );
        renames.insert(
            "users".into(),
            pairs(&[
                ("first_name", "firstName"),
                ("last_name", "lastName"),
                ("school_class", "class"),
            ]),
        );
        renames.insert(
            "renters".into(),
            pairs(&[("first_name", "firstName"), ("last_name", "lastName")]),
        );
        renames.insert(
            "sepa_mandates".into(),
            pairs(&[
                ("child_name", "child"),
                ("account_holder", "name"),
                ("applies_from", "appliesFrom"),
            ]),
        );

        Self {
            renames,
            links: vec![
                ReferenceLink::new("lockers", "user", "users"),
                ReferenceLink::new("lockers", "renter", "renters"),
                ReferenceLink::new("lockers", "sepa", "sepa_mandates"),
            ],
            key_style: KeyStyle::Keep,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let plan: MigrationPlan = yaml_provider::load_from_path(path)
            .with_context(|| format!("Parsing migration plan {path:?}"))?;
        plan.validate()
            .with_context(|| format!("Validating migration plan {path:?}"))?;
        Ok(plan)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        yaml_provider::save_to_path(path, self)
    }

    pub fn validate(&self) -> Result<(), MigrationError> {
        for (table, fields) in &self.renames {
            if table.is_empty() {
                return Err(MigrationError::Plan("rename entry with empty table name".into()));
            }
            let mut targets = HashSet::new();
            for (old, new) in fields {
                if old.is_empty() || new.is_empty() {
                    return Err(MigrationError::Plan(format!(
                        "rename in table '{table}' has an empty field name"
                    )));
                }
                if !targets.insert(new.as_str()) {
                    return Err(MigrationError::Plan(format!(
                        "table '{table}' renames more than one field to '{new}'"
                    )));
                }
            }
        }
        for link in &self.links {
            if [&link.fact, &link.dimension, &link.foreign_key, &link.dimension_id]
                .iter()
                .any(|name| name.is_empty())
            {
                return Err(MigrationError::Plan(format!(
                    "link {} -> {} has an empty name",
                    link.fact, link.dimension
                )));
            }
            if link.fact == link.dimension {
                return Err(MigrationError::Plan(format!(
                    "table '{}' cannot reference itself",
                    link.fact
                )));
            }
        }
        Ok(())
    }
}

fn pairs(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(old, new)| (old.to_string(), new.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn locker_default_is_valid() {
        let plan = MigrationPlan::locker_default();
        plan.validate().expect("built-in plan validates");
        assert_eq!(plan.links.len(), 3);
        assert_eq!(plan.renames["lockers"]["user_id"], "user");
    }

    #[test]
    fn yaml_plan_applies_defaults() {
        let plan: MigrationPlan = yaml_provider::from_str(
            "links:\n  - fact: orders\n    dimension: customers\n    foreign_key: customer\nkey_style: camelCase\n",
        )
        .expect("parse plan");
        assert!(plan.renames.is_empty());
        assert_eq!(plan.links[0].dimension_id, "id");
        assert_eq!(plan.key_style, KeyStyle::CamelCase);
    }

    #[test]
    fn yaml_plan_rejects_unknown_fields() {
        let result: Result<MigrationPlan> = yaml_provider::from_str("renamez: {}\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_self_reference_and_collisions() {
        let mut plan = MigrationPlan::empty();
        plan.links.push(ReferenceLink::new("t", "parent", "t"));
        assert!(matches!(plan.validate(), Err(MigrationError::Plan(_))));

        let mut plan = MigrationPlan::empty();
        plan.renames
            .insert("t".into(), pairs(&[("a", "x"), ("b", "x")]));
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("more than one field to 'x'"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("plan.yml");
        let plan = MigrationPlan::locker_default();
        plan.save(&path).expect("save plan");
        let loaded = MigrationPlan::load(&path).expect("load plan");
        assert_eq!(loaded, plan);
    }
}
