//! Static configuration for the metric feeds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which metric feed a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKey {
    Orders,
    Labels,
    Packers,
    Pickers,
}

impl SourceKey {
    /// Every configured key. Row initialization iterates this so no key is
    /// ever absent from an aggregated row.
    pub const ALL: [SourceKey; 4] = [
        SourceKey::Orders,
        SourceKey::Labels,
        SourceKey::Packers,
        SourceKey::Pickers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKey::Orders => "orders",
            SourceKey::Labels => "labels",
            SourceKey::Packers => "packers",
            SourceKey::Pickers => "pickers",
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured metric feed: where to fetch it and how to name it.
#[derive(Debug, Clone)]
pub struct Source {
    pub key: SourceKey,
    pub url: String,
    pub display_name: String,
}

/// Builds the production feed list from a base URL.
///
/// Adding a fifth feed is one more entry here (plus its `SourceKey` variant).
pub fn default_sources(base_url: &str) -> Vec<Source> {
    let base = base_url.trim_end_matches('/');

    [
        (SourceKey::Orders, "orders.csv", "Orders"),
        (SourceKey::Labels, "labels.csv", "Shipping Labels"),
        (SourceKey::Packers, "packers.csv", "Packers"),
        (SourceKey::Pickers, "pickers.csv", "Pickers"),
    ]
    .into_iter()
    .map(|(key, file, name)| Source {
        key,
        url: format!("{}/{}", base, file),
        display_name: name.to_string(),
    })
    .collect()
}
