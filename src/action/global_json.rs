//! SDK version pinned by a `global.json` file

use std::path::Path;

use serde::Deserialize;

use crate::action::error::SetupError;

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Deserialize)]
struct GlobalJson {
    sdk: Option<SdkSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SdkSection {
    version: Option<String>,
    roll_forward: Option<String>,
}

/// Reads the version expression from `sdk.version`.
///
/// With `rollForward: latestFeature` only `A.B` is kept so the newest feature
/// band of that release gets installed.
pub fn version_from_global_json(path: &Path) -> Result<String, SetupError> {
    let invalid = |reason: String| SetupError::GlobalJson {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let content = content.trim_start_matches(UTF8_BOM);
    let global_json: GlobalJson =
        serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;

    let sdk = global_json
        .sdk
        .ok_or_else(|| invalid("missing 'sdk' section".to_string()))?;
    let version = sdk
        .version
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| invalid("missing 'sdk.version' property".to_string()))?;

    if sdk.roll_forward.as_deref() == Some("latestFeature") {
        let major_minor: Vec<&str> = version.trim().split('.').take(2).collect();
        return Ok(major_minor.join("."));
    }

    Ok(version.trim().to_string())
}
