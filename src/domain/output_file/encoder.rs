use super::writer::WriteError;
use crate::domain::metadata::ImageMetadata;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageEncoder, ImageError, ImageFormat};
use std::io::Cursor;

/// エンコードしたうえで元画像のメタデータを付けた出力バイト列を作ります。
///
/// TIFF はタグを画像と同時に書く必要があるため、専用の経路でエンコードします。
pub fn encode_with_metadata(
    image: &DynamicImage,
    format: ImageFormat,
    jpeg_quality: u8,
    metadata: &ImageMetadata,
) -> Result<Vec<u8>, WriteError> {
    if format == ImageFormat::Tiff && !metadata.is_empty() {
        return Ok(metadata.encode_tiff(image)?);
    }
    let encoded = encode(image, format, jpeg_quality)?;
    Ok(metadata.apply(encoded)?)
}

/// 合成済みの画像を指定形式でメモリ上にエンコードします。
///
/// 品質設定は非可逆形式 (JPEG) のときだけ使われます。
pub fn encode(image: &DynamicImage, format: ImageFormat, jpeg_quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut bytes: Vec<u8> = Vec::new();
    let (width, height) = (image.width(), image.height());

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality);
            // JPEG はアルファチャンネルを持てないため、グレースケールか RGB に変換する
            if matches!(
                image.color(),
                ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16
            ) {
                let gray = image.to_luma8();
                encoder.write_image(gray.as_raw(), width, height, ExtendedColorType::L8)?;
            } else {
                let rgb = image.to_rgb8();
                encoder.write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
            }
        }
        // GIF エンコーダは 8bit RGBA のみ受け付ける
        ImageFormat::Gif => {
            DynamicImage::ImageRgba8(image.to_rgba8()).write_to(&mut Cursor::new(&mut bytes), format)?
        }
        _ => image.write_to(&mut Cursor::new(&mut bytes), format)?,
    }

    Ok(bytes)
}
