//! 設定管理を行うモジュール

use std::path::PathBuf;

use super::{
    ConfigError,
    L10nSettings,
    loader,
};

/// 検証済みの設定と、その読み込み元ディレクトリを保持する
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: L10nSettings,

    /// `.dom-l10n.json` を探すディレクトリ
    config_dir: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: L10nSettings::default(), config_dir: None }
    }

    /// 設定を読み込む
    ///
    /// ディレクトリが無い場合や設定ファイルが無い場合はデフォルト設定を使う。
    ///
    /// # Arguments
    /// * `config_dir` - 設定ファイルを探すディレクトリ
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, config_dir: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings from: {:?}", config_dir);

        let settings = if let Some(dir) = &config_dir {
            loader::load_from_dir(dir)?.map_or_else(L10nSettings::default, |loaded| {
                tracing::debug!("Loaded settings: {:?}", loaded);
                loaded
            })
        } else {
            L10nSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.config_dir = config_dir;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &L10nSettings {
        &self.current_settings
    }

    /// リソースを読み込むディレクトリ
    ///
    /// `resourceRoot` は設定ディレクトリからの相対パスとして解決する。
    /// 未設定の場合は設定ディレクトリそのもの。
    #[must_use]
    pub fn resource_root(&self) -> Option<PathBuf> {
        match (&self.current_settings.resource_root, &self.config_dir) {
            (Some(root), Some(dir)) => Some(dir.join(root)),
            (Some(root), None) => Some(root.clone()),
            (None, dir) => dir.clone(),
        }
    }
}
