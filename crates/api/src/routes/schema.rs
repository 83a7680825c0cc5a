//! Model Schema Routes

use axum::{extract::State, Json};
use discrimination::{TectonicSetting, FEATURE_COLUMNS};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Model input columns and their table coverage
#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    pub columns: Vec<&'static str>,
    pub missing: Vec<&'static str>,
    pub table_features: usize,
}

/// One tectonic setting
#[derive(Debug, Serialize)]
pub struct SettingInfo {
    pub index: usize,
    pub label: &'static str,
    pub name: &'static str,
}

/// Get model feature columns
pub async fn get_features(State(state): State<Arc<AppState>>) -> Json<FeaturesResponse> {
    Json(FeaturesResponse {
        columns: FEATURE_COLUMNS.to_vec(),
        missing: state.table.missing_features(&FEATURE_COLUMNS),
        table_features: state.table.len(),
    })
}

/// Get tectonic setting labels
pub async fn get_settings() -> Json<Vec<SettingInfo>> {
    Json(
        TectonicSetting::ALL
            .iter()
            .map(|setting| SettingInfo {
                index: setting.index(),
                label: setting.label(),
                name: setting.display_name(),
            })
            .collect(),
    )
}
