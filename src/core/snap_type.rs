// Controller / engine family of a snapshot

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum SnapshotType {
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "ECU_V1")]
    EcuV1,
    #[serde(rename = "DCU_V1")]
    DcuV1,
    #[serde(rename = "EUD_V1")]
    EudV1,
    #[serde(rename = "ECU_V2")]
    EcuV2,
    #[serde(rename = "EUD_V2")]
    EudV2,
}

impl SnapshotType {
    pub const ALL: [SnapshotType; 6] = [
        SnapshotType::Unknown,
        SnapshotType::EcuV1,
        SnapshotType::DcuV1,
        SnapshotType::EudV1,
        SnapshotType::EcuV2,
        SnapshotType::EudV2,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            SnapshotType::Unknown => "UNKNOWN",
            SnapshotType::EcuV1 => "ECU_V1",
            SnapshotType::DcuV1 => "DCU_V1",
            SnapshotType::EudV1 => "EUD_V1",
            SnapshotType::EcuV2 => "ECU_V2",
            SnapshotType::EudV2 => "EUD_V2",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.tag().eq_ignore_ascii_case(tag.trim()))
    }

    pub fn description(self) -> &'static str {
        description_of(self)
    }
}

/// Human-readable label for a snapshot type.
pub fn description_of(snapshot_type: SnapshotType) -> &'static str {
    match snapshot_type {
        SnapshotType::Unknown => "Unknown Snapshot Type",
        SnapshotType::EcuV1 => "Bobcat V1 Engine (Delphi ECU)",
        SnapshotType::DcuV1 => "Bobcat V1 Engine SCR System (Bosch DCU)",
        SnapshotType::EudV1 => "Bobcat V1 Engine Use Data",
        SnapshotType::EcuV2 => "Bobcat V2 Engine (Bosch ECU)",
        SnapshotType::EudV2 => "Bobcat V2 Engine Use Data",
    }
}

impl fmt::Display for SnapshotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
