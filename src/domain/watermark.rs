use image::imageops::{self, FilterType};
use image::{ImageReader, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("透かし画像が見つかりません: {0}")]
    NotFound(PathBuf),

    #[error("透かし画像 '{path}' を開けません: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("透かし画像 '{path}' を読み込めません: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("透かし画像 '{0}' の寸法が 0 です")]
    Empty(PathBuf),
}

/// 実行中に一度だけ読み込まれ、すべての画像で読み取り専用に使い回される透かし。
#[derive(Debug, Clone)]
pub struct Watermark {
    image: RgbaImage,
    size_ratio: f32,
    opacity: f32,
}

impl Watermark {
    /// 透かし画像をファイルから読み込み、RGBA に変換して保持します。
    pub fn load(path: &Path, size_ratio: f32, opacity: f32) -> Result<Self, WatermarkError> {
        if !path.is_file() {
            return Err(WatermarkError::NotFound(path.to_path_buf()));
        }
        let read_error = |source: std::io::Error| WatermarkError::Read {
            path: path.to_path_buf(),
            source,
        };
        // 拡張子ではなく中身から形式を判別する
        let decoded = ImageReader::open(path)
            .map_err(read_error)?
            .with_guessed_format()
            .map_err(read_error)?
            .decode()
            .map_err(|source| WatermarkError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(WatermarkError::Empty(path.to_path_buf()));
        }
        Ok(Self::from_image(decoded.to_rgba8(), size_ratio, opacity))
    }

    pub fn from_image(image: RgbaImage, size_ratio: f32, opacity: f32) -> Self {
        Self {
            image,
            size_ratio,
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    pub fn size_ratio(&self) -> f32 {
        self.size_ratio
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// キャンバス幅に対する目標サイズ (幅, 高さ) を返します。縦横比は維持します。
    pub fn target_size(&self, canvas_size: u32) -> (u32, u32) {
        let width = ((self.size_ratio as f64) * canvas_size as f64).floor().max(1.0) as u32;
        let scale = width as f64 / self.image.width() as f64;
        let height = (self.image.height() as f64 * scale).round().max(1.0) as u32;
        (width, height)
    }

    /// キャンバスに合わせて拡縮し、不透明度を反映した透かし画像を作ります。
    /// 元の透かしは変更しません。
    pub fn prepare(&self, canvas_size: u32) -> RgbaImage {
        let (width, height) = self.target_size(canvas_size);
        let mut scaled = imageops::resize(&self.image, width, height, FilterType::Lanczos3);
        if self.opacity < 1.0 {
            for pixel in scaled.pixels_mut() {
                // 小数部は切り捨て
                pixel.0[3] = (pixel.0[3] as f32 * self.opacity) as u8;
            }
        }
        scaled
    }
}
