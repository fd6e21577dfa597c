use itertools::Itertools;

use super::Catalogue;

/// Lookup lists derived from a catalogue, used to populate the weapon, pool
/// and status choices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogueIndex {
    weapon_names: Vec<String>,
    pool_ids: Vec<String>,
    status_values: Vec<String>,
}

impl CatalogueIndex {
    pub fn build(catalogue: &Catalogue) -> Self {
        let weapon_names = catalogue.weapons.iter().map(|w| w.name.clone()).collect();

        let pools = catalogue
            .weapons
            .iter()
            .flat_map(|w| w.blueprints.iter())
            .map(|bp| bp.pool.as_str())
            .filter(|p| !p.is_empty())
            .unique();
        let pool_ids = sort_pool_ids(pools);

        let status_values = catalogue
            .weapons
            .iter()
            .flat_map(|w| w.blueprints.iter())
            .map(|bp| bp.status.as_str())
            .filter(|s| !s.is_empty())
            .unique()
            .map(str::to_string)
            .collect();

        Self {
            weapon_names,
            pool_ids,
            status_values,
        }
    }

    pub fn weapon_names(&self) -> &[String] {
        &self.weapon_names
    }

    pub fn pool_ids(&self) -> &[String] {
        &self.pool_ids
    }

    pub fn status_values(&self) -> &[String] {
        &self.status_values
    }

    pub fn is_empty(&self) -> bool {
        self.weapon_names.is_empty()
    }
}

/// Numeric pools first, ascending by value; the sort is stable so equal
/// values keep first-seen order. Non-numeric pools follow in first-seen order.
fn sort_pool_ids<'a>(pools: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut numeric: Vec<(f64, &str)> = Vec::new();
    let mut other: Vec<&str> = Vec::new();
    for pool in pools {
        match pool.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => numeric.push((value, pool)),
            _ => other.push(pool),
        }
    }
    numeric.sort_by(|a, b| a.0.total_cmp(&b.0));
    numeric
        .into_iter()
        .map(|(_, p)| p)
        .chain(other)
        .map(str::to_string)
        .collect()
}
