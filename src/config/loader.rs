//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    ConfigError,
    L10nSettings,
};

/// ディレクトリ内で探す設定ファイル名
pub(super) const CONFIG_FILE_NAME: &str = ".dom-l10n.json";

/// ディレクトリから設定を読み込む
///
/// `.dom-l10n.json` ファイルを探して読み込む
///
/// # Arguments
/// * `dir` - 設定ファイルを探すディレクトリ
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
pub(super) fn load_from_dir(dir: &Path) -> Result<Option<L10nSettings>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let settings: L10nSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}
