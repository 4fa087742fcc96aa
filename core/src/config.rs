use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the rider rows live in the source workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLayout {
    pub sheet_name: String,
    /// 1-based, as shown in spreadsheet software.
    pub start_row:  u32,
    pub columns:    ColumnMap,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            sheet_name: "을지_협력사 소속 라이더 정산 확인용".into(),
            start_row:  20,
            columns:    ColumnMap::default(),
        }
    }
}

/// Column letters per source field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub id:                     String,
    pub name:                   String,
    pub process_count:          String,
    pub delivery_fee:           String,
    pub additional_payment:     String,
    pub hourly_insurance:       String,
    pub employment_insurance:   String,
    pub accident_insurance:     String,
    pub employment_retroactive: String,
    pub accident_retroactive:   String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            id:                     "B".into(),
            name:                   "C".into(),
            process_count:          "D".into(),
            delivery_fee:           "E".into(),
            additional_payment:     "F".into(),
            hourly_insurance:       "H".into(),
            employment_insurance:   "L".into(),
            accident_insurance:     "N".into(),
            employment_retroactive: "Q".into(),
            accident_retroactive:   "T".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub currency_suffix: String,
    pub count_suffix:    String,
    pub group_separator: char,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            currency_suffix: "원".into(),
            count_suffix:    "건".into(),
            group_separator: ',',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_prefix:      String,
    /// Used when no destination folder is chosen or it cannot be created.
    pub fallback_dir:     PathBuf,
    /// Pause between files when writing to the fallback folder.
    pub fallback_pace_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix:      "rider_settlement".into(),
            fallback_dir:     PathBuf::from("./downloads"),
            fallback_pace_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    pub layout: SourceLayout,
    pub format: FormatConfig,
    pub export: ExportConfig,
}

impl SettleConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    /// In tests, use `SettleConfig::default()`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SettleConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        log::debug!(
            "config: sheet='{}' start_row={}",
            config.layout.sheet_name,
            config.layout.start_row
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "layout": { "start_row": 5, "columns": { "id": "A" } } }"#;
        let config: SettleConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.layout.start_row, 5);
        assert_eq!(config.layout.columns.id, "A");
        assert_eq!(config.layout.columns.name, "C");
        assert_eq!(config.layout.sheet_name, SourceLayout::default().sheet_name);
        assert_eq!(config.format.currency_suffix, "원");
        assert_eq!(config.export.fallback_pace_ms, 500);
    }
}
