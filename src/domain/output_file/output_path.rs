use image::ImageFormat;
use std::path::{Path, PathBuf};

/// 出力ファイル名に付ける接尾辞。
pub const OUTPUT_SUFFIX: &str = "_1x1";

/// 元画像と同じ形式で書き出せるならその形式を、できなければ JPEG を返します。
pub fn output_format(source: ImageFormat) -> ImageFormat {
    match source {
        ImageFormat::Png
        | ImageFormat::Jpeg
        | ImageFormat::Gif
        | ImageFormat::Bmp
        | ImageFormat::Tiff
        | ImageFormat::WebP => source,
        _ => ImageFormat::Jpeg,
    }
}

/// 元画像のパスから出力先のパスを作ります (例: `photo.JPG` -> `photo_1x1.JPG`)。
///
/// 拡張子が出力形式と食い違う場合 (形式の変更や、拡張子と中身の不一致) は、
/// 出力形式の拡張子に置き換えます。
pub fn output_path_for(source: &Path, output_format: ImageFormat) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string());

    let extension = match source.extension() {
        Some(ext) if ImageFormat::from_path(source).ok() == Some(output_format) => {
            ext.to_string_lossy().into_owned()
        }
        _ => output_format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("jpg")
            .to_string(),
    };

    source.with_file_name(format!("{}{}.{}", stem, OUTPUT_SUFFIX, extension))
}
