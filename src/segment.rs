//! Mapping from numeric cluster ids to business segment names

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Segment names used when the caller does not supply their own, indexed by cluster id
pub const DEFAULT_SEGMENT_NAMES: [&str; 5] = [
    "Indie Hackers and Solopreneurs",
    "Web Agencies and Freelancers",
    "Enterprise IT Teams",
    "Startups and SMBs",
    "No-Code Enthusiasts and Educators",
];

/// Static cluster id → segment name lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentMap {
    names: BTreeMap<usize, String>,
}

impl SegmentMap {
    /// Build from explicit `(cluster id, name)` pairs
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        Self {
            names: entries.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }

    /// Assign names to ids `0..names.len()` in order
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().enumerate())
    }

    /// The five community segments
    pub fn community_default() -> Self {
        Self::from_names(DEFAULT_SEGMENT_NAMES)
    }

    pub fn get(&self, cluster: usize) -> Option<&str> {
        self.names.get(&cluster).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Segment names in cluster id order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(String::as_str)
    }

    /// Check that the map covers exactly `[0, n_clusters)`
    pub fn validate_domain(&self, n_clusters: usize) -> Result<()> {
        if self.names.len() != n_clusters {
            return Err(Error::invalid_config(format!(
                "segment map has {} entries but {} clusters are configured",
                self.names.len(),
                n_clusters
            )));
        }
        if let Some(&stray) = self.names.keys().find(|&&id| id >= n_clusters) {
            return Err(Error::invalid_config(format!(
                "segment map has an entry for cluster {} outside [0, {})",
                stray, n_clusters
            )));
        }
        Ok(())
    }
}

impl Default for SegmentMap {
    fn default() -> Self {
        Self::community_default()
    }
}

/// Map every cluster id to its segment name
///
/// Fails on the first id without an entry; rows are never dropped.
pub fn label_segments(labels: &[usize], map: &SegmentMap) -> Result<Vec<String>> {
    labels
        .iter()
        .map(|&cluster| {
            map.get(cluster)
                .map(str::to_string)
                .ok_or(Error::UnmappedCluster { cluster })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_covered_assignment() {
        let map = SegmentMap::community_default();
        let labels = vec![0, 4, 2, 2, 1, 3];

        let segments = label_segments(&labels, &map).unwrap();
        assert_eq!(segments.len(), labels.len());
        assert_eq!(segments[0], "Indie Hackers and Solopreneurs");
        assert_eq!(segments[1], "No-Code Enthusiasts and Educators");
        assert_eq!(segments[2], segments[3]);
    }

    #[test]
    fn test_unmapped_cluster_fails() {
        let map = SegmentMap::from_names(["A", "B"]);
        let err = label_segments(&[0, 1, 2, 0], &map).unwrap_err();
        assert!(matches!(err, Error::UnmappedCluster { cluster: 2 }));
    }

    #[test]
    fn test_validate_domain() {
        let map = SegmentMap::community_default();
        assert!(map.validate_domain(5).is_ok());
        assert!(map.validate_domain(4).is_err());
        assert!(map.validate_domain(6).is_err());

        // right size, wrong ids
        let gappy = SegmentMap::new([(0, "A"), (2, "C")]);
        assert!(gappy.validate_domain(2).unwrap_err().is_configuration());
    }

    #[test]
    fn test_names_in_id_order() {
        let map = SegmentMap::new([(1, "second"), (0, "first")]);
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["first", "second"]);
        assert_eq!(map.get(1), Some("second"));
        assert_eq!(map.get(2), None);
    }
}
