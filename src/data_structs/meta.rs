use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form string-keyed metadata record attached to volumes and
/// annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta(HashMap<String, Value>);

impl Meta {
    pub fn new() -> Meta { Meta::default() }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains(
        &self,
        key: &str,
    ) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Meta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Meta {
        Meta(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Acquisition metadata for a single B-scan. Positions are given in the
/// enface coordinate system of the localizer image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BscanMeta {
    pub quality:   Option<f64>,
    pub start_pos: (f64, f64),
    pub end_pos:   (f64, f64),
}

impl Default for BscanMeta {
    fn default() -> BscanMeta {
        BscanMeta {
            quality:   None,
            start_pos: (0.0, 0.0),
            end_pos:   (0.0, 0.0),
        }
    }
}

/// Volume-level metadata: the per-scan records plus free-form entries
/// carried over from the source device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeMeta {
    pub bscan_meta: Vec<BscanMeta>,
    pub extra:      Meta,
}

impl VolumeMeta {
    /// Metadata with one default per-scan record per B-scan.
    pub fn with_scan_count(n_bscans: usize) -> VolumeMeta {
        VolumeMeta {
            bscan_meta: vec![BscanMeta::default(); n_bscans],
            extra:      Meta::new(),
        }
    }
}
