//! Model Input and Output Schema

use serde::{Deserialize, Serialize};

/// Model input columns, in the order the classifier was trained on
pub const FEATURE_COLUMNS: [&str; 36] = [
    "NA2O(WT%)", "MGO(WT%)", "AL2O3(WT%)", "SIO2(WT%)", "P2O5(WT%)", "K2O(WT%)",
    "CAO(WT%)", "TIO2(WT%)", "MNO(WT%)", "FEOT(WT%)", "RB(PPM)", "V(PPM)",
    "CR(PPM)", "CO(PPM)", "NI(PPM)", "BA(PPM)", "SR(PPM)", "Y(PPM)", "ZR(PPM)",
    "NB(PPM)", "LA(PPM)", "CE(PPM)", "PR(PPM)", "ND(PPM)", "SM(PPM)", "EU(PPM)",
    "GD(PPM)", "TB(PPM)", "DY(PPM)", "HO(PPM)", "ER(PPM)", "YB(PPM)", "LU(PPM)",
    "HF(PPM)", "TA(PPM)", "TH(PPM)",
];

/// Number of classifier output classes
pub const SETTING_COUNT: usize = 9;

/// Position of a model input column
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_COLUMNS.iter().position(|column| *column == name)
}

/// Tectonic setting predicted by the model, in output-index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TectonicSetting {
    #[serde(rename = "BACK-ARC_BASIN")]
    BackArcBasin,
    #[serde(rename = "CONTINENTAL FLOOD BASALT")]
    ContinentalFloodBasalt,
    #[serde(rename = "CONTINENTAL_RIFT")]
    ContinentalRift,
    #[serde(rename = "Continental arc")]
    ContinentalArc,
    #[serde(rename = "Intra-oceanic arc")]
    IntraOceanicArc,
    #[serde(rename = "Island arc")]
    IslandArc,
    #[serde(rename = "OCEAN ISLAND")]
    OceanIsland,
    #[serde(rename = "OCEANIC PLATEAU")]
    OceanicPlateau,
    #[serde(rename = "Mid-Oceanic Ridge")]
    MidOceanicRidge,
}

impl TectonicSetting {
    /// All settings in output-index order
    pub const ALL: [TectonicSetting; SETTING_COUNT] = [
        TectonicSetting::BackArcBasin,
        TectonicSetting::ContinentalFloodBasalt,
        TectonicSetting::ContinentalRift,
        TectonicSetting::ContinentalArc,
        TectonicSetting::IntraOceanicArc,
        TectonicSetting::IslandArc,
        TectonicSetting::OceanIsland,
        TectonicSetting::OceanicPlateau,
        TectonicSetting::MidOceanicRidge,
    ];

    /// Setting for a classifier output index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Classifier output index
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Class label used by the training data
    pub fn label(&self) -> &'static str {
        match self {
            TectonicSetting::BackArcBasin => "BACK-ARC_BASIN",
            TectonicSetting::ContinentalFloodBasalt => "CONTINENTAL FLOOD BASALT",
            TectonicSetting::ContinentalRift => "CONTINENTAL_RIFT",
            TectonicSetting::ContinentalArc => "Continental arc",
            TectonicSetting::IntraOceanicArc => "Intra-oceanic arc",
            TectonicSetting::IslandArc => "Island arc",
            TectonicSetting::OceanIsland => "OCEAN ISLAND",
            TectonicSetting::OceanicPlateau => "OCEANIC PLATEAU",
            TectonicSetting::MidOceanicRidge => "Mid-Oceanic Ridge",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            TectonicSetting::BackArcBasin => "Back-arc Basin",
            TectonicSetting::ContinentalFloodBasalt => "Continental Flood Basalt",
            TectonicSetting::ContinentalRift => "Continental Rift",
            TectonicSetting::ContinentalArc => "Continental Arc",
            TectonicSetting::IntraOceanicArc => "Intra-oceanic Arc",
            TectonicSetting::IslandArc => "Island Arc",
            TectonicSetting::OceanIsland => "Ocean Island",
            TectonicSetting::OceanicPlateau => "Oceanic Plateau",
            TectonicSetting::MidOceanicRidge => "Mid-Oceanic Ridge",
        }
    }

    /// Setting for a training label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.label() == label)
    }
}

impl std::fmt::Display for TectonicSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, setting) in TectonicSetting::ALL.iter().enumerate() {
            assert_eq!(setting.index(), i);
            assert_eq!(TectonicSetting::from_index(i), Some(*setting));
        }
        assert_eq!(TectonicSetting::from_index(SETTING_COUNT), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            TectonicSetting::from_label("OCEAN ISLAND"),
            Some(TectonicSetting::OceanIsland)
        );
        assert_eq!(TectonicSetting::from_label("ocean island"), None);
        assert_eq!(
            serde_json::to_string(&TectonicSetting::ContinentalRift).unwrap(),
            "\"CONTINENTAL_RIFT\""
        );
    }

    #[test]
    fn test_feature_columns() {
        assert_eq!(feature_index("NA2O(WT%)"), Some(0));
        assert_eq!(feature_index("TIO2(WT%)"), Some(7));
        assert_eq!(feature_index("TH(PPM)"), Some(35));
        assert_eq!(feature_index("TiO2"), None);
    }
}
