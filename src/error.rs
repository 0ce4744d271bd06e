use crate::config::ConfigError;
use crate::domain::geometry::GeometryError;
use crate::domain::input_source::path_error::PathError;
use crate::domain::output_file::writer::WriteError;
use crate::domain::source_image::SourceImageError;
use crate::domain::watermark::WatermarkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("パス関連のエラー: {0}")]
    Path(#[from] PathError),

    #[error("設定エラー: {0}")]
    Config(#[from] ConfigError),

    #[error("透かしエラー: {0}")]
    Watermark(#[from] WatermarkError),

    #[error("画像読み込みエラー: {0}")]
    SourceImage(#[from] SourceImageError),

    #[error("寸法エラー: {0}")]
    Geometry(#[from] GeometryError),

    #[error("出力エラー: {0}")]
    Write(#[from] WriteError),
}
