//! Normalization of free-text sonde type strings found in older archives.
//!
//! The table is closed: a string that does not appear in it is not guessed
//! at, the caller rejects the flight instead.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::flight::TelemetryPoint;

#[derive(Debug, Error)]
pub enum TypeTableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("duplicate entry for {0:?}")]
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CanonicalType {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TypeTableEntry {
    raw: String,
    #[serde(flatten)]
    canonical: CanonicalType,
}

/// Raw string, canonical type, canonical subtype.
const DEFAULT_TYPE_TABLE: &[(&str, &str, Option<&str>)] = &[
    ("RS41", "RS41", None),
    ("RS41-SG", "RS41", Some("RS41-SG")),
    ("RS41-SGP", "RS41", Some("RS41-SGP")),
    ("RS41-SGM", "RS41", Some("RS41-SGM")),
    ("RS41-NG", "RS41", Some("RS41-NG")),
    ("Vaisala RS41", "RS41", None),
    ("RS92", "RS92", None),
    ("RS92-SGP", "RS92", Some("RS92-SGP")),
    ("RS92-NGP", "RS92", Some("RS92-NGP")),
    ("Vaisala RS92", "RS92", None),
    ("DFM", "DFM", None),
    ("DFM06", "DFM", Some("DFM06")),
    ("DFM09", "DFM", Some("DFM09")),
    ("DFM09P", "DFM", Some("DFM09P")),
    ("DFM17", "DFM", Some("DFM17")),
    ("Graw DFM", "DFM", None),
    ("M10", "M10", None),
    ("Meteomodem M10", "M10", None),
    ("M20", "M20", None),
    ("Meteomodem M20", "M20", None),
    ("iMet", "iMet-4", None),
    ("iMet-4", "iMet-4", None),
    ("InterMet iMet-4", "iMet-4", None),
    ("iMet-54", "iMet-54", None),
    ("LMS6", "LMS6", None),
    ("LMS6-400", "LMS6", Some("LMS6-400")),
    ("LMS6-1680", "LMS6", Some("LMS6-1680")),
    ("Lockheed Martin LMS6", "LMS6", None),
    ("MEISEI", "MEISEI", None),
    ("iMS-100", "MEISEI", Some("iMS-100")),
    ("RS-11G", "MEISEI", Some("RS-11G")),
    ("Meisei iMS-100", "MEISEI", Some("iMS-100")),
    ("MRZ", "MRZ", None),
    ("Meteo-Radiy MRZ", "MRZ", None),
    ("MTS01", "MTS01", None),
    ("WxR-301D", "WxR-301D", None),
];

#[derive(Debug, Clone)]
pub struct TypeTable {
    entries: HashMap<String, CanonicalType>,
}

impl Default for TypeTable {
    fn default() -> Self {
        let entries = DEFAULT_TYPE_TABLE
            .iter()
            .map(|(raw, type_name, subtype)| {
                (
                    raw.to_string(),
                    CanonicalType {
                        type_name: type_name.to_string(),
                        subtype: subtype.map(String::from),
                    },
                )
            })
            .collect();
        Self { entries }
    }
}

impl TypeTable {
    /// Load a replacement table from a YAML list of `{raw, type, subtype}`.
    pub fn from_file(path: &Path) -> Result<Self, TypeTableError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, TypeTableError> {
        let list: Vec<TypeTableEntry> = serde_yaml::from_str(yaml)?;
        let mut entries = HashMap::with_capacity(list.len());
        for entry in list {
            let raw = entry.raw.trim().to_string();
            if entries.insert(raw.clone(), entry.canonical).is_some() {
                return Err(TypeTableError::Duplicate(raw));
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, raw: &str) -> Option<&CanonicalType> {
        self.entries.get(raw.trim())
    }

    /// Canonical type of a point, from its `type` field or failing that its
    /// `comment`. A subtype already on the point is kept when the table
    /// entry has none.
    pub fn normalize(&self, point: &TelemetryPoint) -> Option<CanonicalType> {
        let canonical = self
            .lookup(&point.sonde_type)
            .or_else(|| point.comment.as_deref().and_then(|c| self.lookup(c)))?;

        Some(CanonicalType {
            type_name: canonical.type_name.clone(),
            subtype: canonical.subtype.clone().or_else(|| point.subtype.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::fixtures;

    #[test]
    fn test_default_table_has_no_duplicates() {
        assert_eq!(TypeTable::default().len(), DEFAULT_TYPE_TABLE.len());
    }

    #[test]
    fn test_canonical_names_map_to_themselves() {
        let table = TypeTable::default();
        for name in ["RS41", "RS92", "DFM", "M10", "M20", "LMS6", "MRZ"] {
            assert_eq!(table.lookup(name).unwrap().type_name, name);
        }
    }

    #[test]
    fn test_vendor_strings() {
        let table = TypeTable::default();
        let dfm = table.lookup("DFM09").unwrap();
        assert_eq!(dfm.type_name, "DFM");
        assert_eq!(dfm.subtype.as_deref(), Some("DFM09"));
        assert_eq!(table.lookup(" Vaisala RS41 ").unwrap().type_name, "RS41");
    }

    #[test]
    fn test_unknown_is_rejected() {
        let table = TypeTable::default();
        let mut point = fixtures::point("X", 0.0, 0.0, 0.0);
        point.sonde_type = "Mystery 3000".into();
        assert!(table.normalize(&point).is_none());

        // Case matters; the table is matched exactly
        assert!(table.lookup("rs41").is_none());
    }

    #[test]
    fn test_normalize_falls_back_to_comment() {
        let table = TypeTable::default();
        let mut point = fixtures::point("X", 0.0, 0.0, 0.0);
        point.sonde_type = "payload".into();
        point.comment = Some("Meteomodem M20".into());

        let canonical = table.normalize(&point).unwrap();
        assert_eq!(canonical.type_name, "M20");
        assert_eq!(canonical.subtype, None);
    }

    #[test]
    fn test_normalize_keeps_existing_subtype() {
        let table = TypeTable::default();
        let mut point = fixtures::point("X", 0.0, 0.0, 0.0);
        point.subtype = Some("RS41-SGP".into());

        let canonical = table.normalize(&point).unwrap();
        assert_eq!(canonical.type_name, "RS41");
        assert_eq!(canonical.subtype.as_deref(), Some("RS41-SGP"));
    }

    #[test]
    fn test_from_yaml() {
        let table = TypeTable::from_yaml(
            "- raw: Foo Sonde\n  type: FOO\n- raw: FOO-2\n  type: FOO\n  subtype: FOO-2\n",
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("FOO-2").unwrap().subtype.as_deref(), Some("FOO-2"));
        assert!(table.lookup("RS41").is_none());
    }

    #[test]
    fn test_from_yaml_duplicate() {
        let result = TypeTable::from_yaml("- raw: A\n  type: X\n- raw: A\n  type: Y\n");
        assert!(matches!(result, Err(TypeTableError::Duplicate(_))));
    }
}
