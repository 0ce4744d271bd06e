use super::metadata::ImageMetadata;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceImageError {
    #[error("'{path}' を読み込めません: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{0}' の画像形式を判別できません")]
    UnknownFormat(PathBuf),

    #[error("'{path}' のデコードに失敗しました: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// 形式だけを判別した、まだデコードしていない元画像ファイル。
///
/// 出力先が既にあるかどうかを、デコードの前に判断するために使います。
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    format: ImageFormat,
}

impl SourceFile {
    /// ファイル先頭だけを読んで画像形式を判別します。
    /// 中身から判別できなければ拡張子で判断します。
    pub fn detect(path: &Path) -> Result<Self, SourceImageError> {
        let read_error = |source: std::io::Error| SourceImageError::Read {
            path: path.to_path_buf(),
            source,
        };
        let reader = ImageReader::open(path)
            .map_err(read_error)?
            .with_guessed_format()
            .map_err(read_error)?;
        let format = reader
            .format()
            .ok_or_else(|| SourceImageError::UnknownFormat(path.to_path_buf()))?;

        Ok(Self {
            path: path.to_path_buf(),
            format,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// ファイル全体を読み込んで画素データとメタデータを取り出します。
    pub fn decode(&self) -> Result<SourceImage, SourceImageError> {
        let path = self.path.as_path();
        let bytes = fs::read(path).map_err(|source| SourceImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let image = image::load_from_memory_with_format(&bytes, self.format).map_err(|source| {
            SourceImageError::Decode {
                path: path.to_path_buf(),
                source,
            }
        })?;

        // メタデータが読めなくても画素データは処理できるため、警告だけ出して続行する
        let metadata = ImageMetadata::read(&bytes).unwrap_or_else(|e| {
            log::warn!("'{}' のメタデータを読み取れませんでした: {}", path.display(), e);
            ImageMetadata::default()
        });

        Ok(SourceImage {
            format: self.format,
            image,
            metadata,
        })
    }
}

/// デコード済みの元画像と、その形式・メタデータ。
///
/// 1 ファイルの処理中だけ保持され、出力を書き終えたら破棄されます。
#[derive(Debug)]
pub struct SourceImage {
    pub format: ImageFormat,
    pub image: DynamicImage,
    pub metadata: ImageMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn open(path: &Path) -> Result<SourceImage, SourceImageError> {
        SourceFile::detect(path)?.decode()
    }

    #[test]
    fn opens_png_and_reports_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        RgbImage::from_pixel(3, 2, Rgb([1, 2, 3])).save(&path).unwrap();

        let source = open(&path).unwrap();
        assert_eq!(source.format, ImageFormat::Png);
        assert_eq!((source.image.width(), source.image.height()), (3, 2));
        assert!(source.metadata.is_empty());
    }

    /// 拡張子と中身が食い違っていても中身の形式を優先します。
    #[test]
    fn content_wins_over_extension() {
        let dir = tempdir().unwrap();
        let png_path = dir.path().join("real.png");
        RgbImage::new(2, 2).save(&png_path).unwrap();
        let misnamed = dir.path().join("fake.jpg");
        fs::rename(&png_path, &misnamed).unwrap();

        assert_eq!(open(&misnamed).unwrap().format, ImageFormat::Png);
    }

    /// 中身が壊れていても、形式の判別だけなら成功します。
    #[test]
    fn detecting_format_does_not_decode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not an image").unwrap();

        let file = SourceFile::detect(&path).unwrap();
        assert_eq!(file.format(), ImageFormat::Png);
        assert_eq!(file.path(), path.as_path());
        assert!(matches!(file.decode(), Err(SourceImageError::Decode { .. })));
    }

    #[test]
    fn corrupt_file_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"\xff\xd8\xff garbage").unwrap();
        assert!(matches!(
            open(&path),
            Err(SourceImageError::Decode { .. })
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            open(&dir.path().join("nope.png")),
            Err(SourceImageError::Read { .. })
        ));
    }
}
