//! 実行時設定。
//!
//! 既定値はコード内の定数で、任意の JSON ファイルで上書きできます。
//! 設定ファイルは読み込むだけで、書き戻しは行いません。

use crate::domain::border_color::{BorderColor, ColorParseError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_WATERMARK_SIZE_RATIO: f32 = 0.15;
pub const DEFAULT_WATERMARK_OPACITY: f32 = 0.6;
pub const DEFAULT_BORDER_COLOR: &str = "white";
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("設定ファイル '{path}' を読み込めません: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("設定ファイル '{path}' の形式が不正です: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("余白色の指定が不正です: {0}")]
    BorderColor(#[from] ColorParseError),

    #[error("size_ratio は 0 より大きく 1 以下である必要があります: {0}")]
    SizeRatio(f32),

    #[error("opacity は 0 以上 1 以下である必要があります: {0}")]
    Opacity(f32),

    #[error("jpeg_quality は 1 以上 100 以下である必要があります: {0}")]
    JpegQuality(u8),
}

/// 設定ファイルの内容。省略されたキーは既定値になります。
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    pub size_ratio: f32,
    pub opacity: f32,
    pub color_for_borders: String,
    pub jpeg_quality: u8,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            size_ratio: DEFAULT_WATERMARK_SIZE_RATIO,
            opacity: DEFAULT_WATERMARK_OPACITY,
            color_for_borders: DEFAULT_BORDER_COLOR.to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ConfigFile {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 1 回の実行中は変更されない設定。
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub border_color: BorderColor,
    pub jpeg_quality: u8,
    pub watermark_size_ratio: f32,
    pub watermark_opacity: f32,
    pub delete_originals: bool,
    pub overwrite: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            border_color: BorderColor::WHITE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            watermark_size_ratio: DEFAULT_WATERMARK_SIZE_RATIO,
            watermark_opacity: DEFAULT_WATERMARK_OPACITY,
            delete_originals: false,
            overwrite: false,
        }
    }
}

impl RunConfig {
    /// 設定ファイルの値を検証して `RunConfig` を組み立てます。
    pub fn from_file_config(
        file: &ConfigFile,
        delete_originals: bool,
        overwrite: bool,
    ) -> Result<Self, ConfigError> {
        if !(file.size_ratio > 0.0 && file.size_ratio <= 1.0) {
            return Err(ConfigError::SizeRatio(file.size_ratio));
        }
        if !(0.0..=1.0).contains(&file.opacity) {
            return Err(ConfigError::Opacity(file.opacity));
        }
        if !(1..=100).contains(&file.jpeg_quality) {
            return Err(ConfigError::JpegQuality(file.jpeg_quality));
        }

        Ok(Self {
            border_color: file.color_for_borders.parse()?,
            jpeg_quality: file.jpeg_quality,
            watermark_size_ratio: file.size_ratio,
            watermark_opacity: file.opacity,
            delete_originals,
            overwrite,
        })
    }

    /// 設定ファイルのパスが指定されていれば読み込み、なければ既定値を使います。
    pub fn load(
        config_path: Option<&Path>,
        delete_originals: bool,
        overwrite: bool,
    ) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => {
                let file = ConfigFile::load_from_file(path)?;
                log::info!("設定ファイルを読み込みました: {}", path.display());
                file
            }
            None => ConfigFile::default(),
        };
        Self::from_file_config(&file, delete_originals, overwrite)
    }
}
