//! Launch site index keyed by station id.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::{LaunchSite, SiteError};

/// Launch sites in dataset order, with O(1) lookup by station id.
///
/// Iteration follows the order of the source dataset; binning relies on it
/// for tie-breaking between equidistant sites.
#[derive(Debug, Default, Clone)]
pub struct LaunchSiteIndex {
    sites: Vec<LaunchSite>,
    positions: HashMap<String, usize>,
}

impl LaunchSiteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, SiteError> {
        if !path.exists() {
            return Err(SiteError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, SiteError> {
        let sites: Vec<LaunchSite> = serde_json::from_str(json)?;
        Self::from_sites(sites)
    }

    pub fn from_sites(sites: Vec<LaunchSite>) -> Result<Self, SiteError> {
        let mut index = Self::new();
        for site in sites {
            index.insert(site)?;
        }
        Ok(index)
    }

    pub fn insert(&mut self, site: LaunchSite) -> Result<(), SiteError> {
        if self.positions.contains_key(&site.id) {
            return Err(SiteError::DuplicateStation(site.id));
        }
        self.positions.insert(site.id.clone(), self.sites.len());
        self.sites.push(site);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&LaunchSite> {
        self.positions.get(id).map(|&i| &self.sites[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LaunchSite> {
        self.positions.get(id).map(|&i| &mut self.sites[i])
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LaunchSite> {
        self.sites.iter()
    }

    /// Render the dataset sorted by station id, one site per line.
    pub fn to_dataset_json(&self) -> Result<String, SiteError> {
        let mut sorted: Vec<&LaunchSite> = self.sites.iter().collect();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        let lines = sorted
            .into_iter()
            .map(|site| serde_json::to_string(site).map(|json| format!("    {json}")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(format!("[\n{}\n]", lines.join(",\n")))
    }

    pub fn write_dataset(&self, path: &Path) -> Result<(), SiteError> {
        fs::write(path, self.to_dataset_json()?)?;
        log::info!("Wrote {} launch sites to {}", self.len(), path.display());
        Ok(())
    }
}
