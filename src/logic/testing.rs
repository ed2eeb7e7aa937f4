//! Shared fixtures: a training layout in the shape the notebook exports
//! (numeric columns first, then drop-first indicators in lexical order).

use std::path::{Path, PathBuf};

use crate::logic::artifacts::ArtifactPaths;
use crate::logic::features::ColumnSchema;

pub const RAW_COLUMNS: &[&str] = &[
    "Age",
    "Gender",
    "EducationStage",
    "InattentionScore",
    "HyperactivityScore",
    "ImpulsivityScore",
    "SymptomSum",
    "Daydreaming",
    "RSD",
    "SleepHours",
    "ScreenTimeHours",
    "ComorbidAnxiety",
    "ComorbidDepression",
    "FamilyHistoryADHD",
    "Medication",
    "SchoolSupport",
    "AcademicScore",
];

pub const ENCODED_COLUMNS: &[&str] = &[
    "Age",
    "InattentionScore",
    "HyperactivityScore",
    "ImpulsivityScore",
    "SymptomSum",
    "Daydreaming",
    "RSD",
    "SleepHours",
    "ScreenTimeHours",
    "ComorbidAnxiety",
    "ComorbidDepression",
    "FamilyHistoryADHD",
    "AcademicScore",
    "Gender_Male",
    "Gender_Nonbinary",
    "EducationStage_Child",
    "EducationStage_Teen",
    "EducationStage_Undergrad",
    "Medication_Non-stimulant",
    "Medication_Stimulant",
    "SchoolSupport_Accommodations",
    "SchoolSupport_IEP",
    "SchoolSupport_None",
    "SchoolSupport_Therapy",
];

pub fn raw_schema() -> ColumnSchema {
    ColumnSchema::raw(RAW_COLUMNS.iter().copied())
}

pub fn encoded_schema() -> ColumnSchema {
    ColumnSchema::encoded(ENCODED_COLUMNS.iter().copied())
}

/// Indicator columns of the encoded layout
pub fn indicator_columns() -> Vec<&'static str> {
    ENCODED_COLUMNS.iter().copied().filter(|c| c.contains('_')).collect()
}

/// Write a full JSON artifact set (standard scaler + linear model) into `dir`
pub fn write_artifacts(dir: &Path) -> ArtifactPaths {
    let n = ENCODED_COLUMNS.len();
    let paths = ArtifactPaths {
        columns: dir.join("columns.json"),
        encoded_columns: dir.join("encoded_columns.json"),
        scaler: dir.join("scaler.json"),
        model: dir.join("model.json"),
    };

    write_json(&paths.columns, &serde_json::json!(RAW_COLUMNS));
    write_json(&paths.encoded_columns, &serde_json::json!(ENCODED_COLUMNS));
    write_json(
        &paths.scaler,
        &serde_json::json!({
            "kind": "standard",
            "mean": vec![0.0; n],
            "scale": vec![1.0; n],
        }),
    );

    // Positive weight on the symptom sum only
    let mut weights = vec![0.0; n];
    weights[4] = 0.5;
    write_json(
        &paths.model,
        &serde_json::json!({ "weights": weights, "bias": -7.5 }),
    );

    paths
}

pub fn write_json(path: &Path, value: &serde_json::Value) -> PathBuf {
    std::fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path.to_path_buf()
}
