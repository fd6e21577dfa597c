use serde::Serialize;

use crate::catalogue::{Blueprint, Catalogue};

/// What the user picked. Unset or blank fields do not constrain the result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub weapon: String,
    pub pool: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl FilterCriteria {
    pub fn for_weapon(weapon: impl Into<String>) -> Self {
        Self {
            weapon: weapon.into(),
            ..Self::default()
        }
    }

    pub fn pool(mut self, pool: impl Into<String>) -> Self {
        self.pool = Some(pool.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn weapon_name(&self) -> Option<&str> {
        active(Some(&self.weapon))
    }

    pub fn matches(&self, bp: &Blueprint) -> bool {
        if let Some(pool) = active(self.pool.as_ref()) {
            if bp.pool != pool {
                return false;
            }
        }
        if let Some(status) = active(self.status.as_ref()) {
            if bp.status != status {
                return false;
            }
        }
        if let Some(search) = active(self.search.as_ref()) {
            if !bp.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

// blank input means "no constraint"; the value itself is compared untrimmed
fn active(value: Option<&String>) -> Option<&str> {
    value
        .map(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilteredResult {
    pub weapon: String,
    pub blueprints: Vec<Blueprint>,
}

impl FilteredResult {
    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}

/// Blueprints of the selected weapon that satisfy every active criterion, in
/// catalogue order. `None` when no weapon is selected or it does not exist.
pub fn compute_filtered_result(
    catalogue: &Catalogue,
    criteria: &FilterCriteria,
) -> Option<FilteredResult> {
    let weapon = catalogue.weapon(criteria.weapon_name()?)?;
    let blueprints = weapon
        .blueprints
        .iter()
        .filter(|bp| criteria.matches(bp))
        .cloned()
        .collect();
    Some(FilteredResult {
        weapon: weapon.name.clone(),
        blueprints,
    })
}
