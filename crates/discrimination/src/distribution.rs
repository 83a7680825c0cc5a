//! Prediction Distribution Summary

use crate::engine::Prediction;
use crate::schema::{TectonicSetting, SETTING_COUNT};
use serde::Serialize;

/// Sample count for one setting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingCount {
    pub setting: TectonicSetting,
    pub name: &'static str,
    pub count: usize,
    /// Share of all predictions (0.0 to 1.0)
    pub fraction: f64,
}

/// Per-setting counts over a batch, most frequent first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distribution {
    pub entries: Vec<SettingCount>,
    pub total: usize,
}

impl Distribution {
    /// Count predictions per setting
    ///
    /// Settings that never occur are omitted. Ties keep class order.
    pub fn from_predictions(predictions: &[Prediction]) -> Self {
        let mut counts = [0usize; SETTING_COUNT];
        for prediction in predictions {
            counts[prediction.setting.index()] += 1;
        }

        let total = predictions.len();
        let mut entries: Vec<SettingCount> = TectonicSetting::ALL
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(setting, count)| SettingCount {
                setting: *setting,
                name: setting.display_name(),
                count,
                fraction: count as f64 / total as f64,
            })
            .collect();
        // Stable sort keeps class order among equal counts
        entries.sort_by(|a, b| b.count.cmp(&a.count));

        Self { entries, total }
    }

    /// Most frequent setting
    pub fn dominant(&self) -> Option<TectonicSetting> {
        self.entries.first().map(|e| e.setting)
    }

    /// Count for one setting
    pub fn count(&self, setting: TectonicSetting) -> usize {
        self.entries
            .iter()
            .find(|e| e.setting == setting)
            .map_or(0, |e| e.count)
    }
}
