use image::DynamicImage;
use img_parts::jpeg::{markers, JpegSegment};
use img_parts::png::PngChunk;
use img_parts::{Bytes, DynImage, ImageEXIF, ImageICC};
use std::io::{Cursor, Read, Seek, Write};
use thiserror::Error;
use tiff::decoder::ifd::Value;
use tiff::decoder::Decoder;
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{Rational, TiffEncoder, TiffValue};
use tiff::tags::{ResolutionUnit, Tag};
use tiff::TiffError;

/// PNG の解像度チャンク。
const PNG_PHYS: [u8; 4] = *b"pHYs";

/// TIFF の ICC プロファイルタグ (InterColorProfile)。
const TIFF_ICC_PROFILE: u16 = 34675;

/// TIFF の ResolutionUnit の既定値 (インチ)。
const TIFF_UNIT_INCH: u16 = 2;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("メタデータの解析に失敗しました: {0}")]
    Parse(#[from] img_parts::Error),

    #[error("メタデータの書き込みに失敗しました: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF タグの処理に失敗しました: {0}")]
    Tiff(#[from] TiffError),
}

/// 解像度 (DPI) 情報。コンテナごとの生データをそのまま保持します。
#[derive(Debug, Clone, PartialEq)]
pub enum Density {
    /// JPEG の JFIF APP0 セグメントの中身
    Jfif(Bytes),
    /// PNG の pHYs チャンクの中身
    Phys(Bytes),
    /// TIFF の ResolutionUnit と XResolution / YResolution (分子, 分母)
    Tiff {
        unit: u16,
        x: (u32, u32),
        y: (u32, u32),
    },
}

/// 元画像から取り出した EXIF / ICC プロファイル / 解像度情報。
///
/// 値の意味は解釈せず、バイト列のまま出力画像へ付け直します。
/// 元画像に無い項目は出力にも付きません。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMetadata {
    pub exif: Option<Bytes>,
    pub icc_profile: Option<Bytes>,
    pub density: Option<Density>,
}

impl ImageMetadata {
    /// エンコード済みの画像バイト列からメタデータを読み取ります。
    /// JPEG / PNG / WebP / TIFF 以外のコンテナでは空のメタデータを返します。
    pub fn read(bytes: &[u8]) -> Result<Self, MetadataError> {
        if is_tiff(bytes) {
            return Self::read_tiff(bytes);
        }
        let image = match DynImage::from_bytes(Bytes::copy_from_slice(bytes))? {
            Some(image) => image,
            None => return Ok(Self::default()),
        };

        let density = match &image {
            DynImage::Jpeg(jpeg) => jpeg
                .segments()
                .iter()
                .find(|segment| segment.marker() == markers::APP0)
                .map(|segment| Density::Jfif(segment.contents().clone())),
            DynImage::Png(png) => png
                .chunk_by_type(PNG_PHYS)
                .map(|chunk| Density::Phys(chunk.contents().clone())),
            _ => None,
        };

        Ok(Self {
            exif: image.exif(),
            icc_profile: image.icc_profile(),
            density,
        })
    }

    /// TIFF は EXIF を IFD そのものに持つため、解像度と ICC だけを読み取る。
    fn read_tiff(bytes: &[u8]) -> Result<Self, MetadataError> {
        let mut decoder = Decoder::new(Cursor::new(bytes))?;

        let x = rational_tag(&mut decoder, Tag::XResolution)?;
        let y = rational_tag(&mut decoder, Tag::YResolution)?;
        let unit = match decoder.find_tag(Tag::ResolutionUnit)? {
            Some(value) => value.into_u32()? as u16,
            None => TIFF_UNIT_INCH,
        };
        let density = match (x, y) {
            (Some(x), Some(y)) => Some(Density::Tiff { unit, x, y }),
            _ => None,
        };

        let icc_profile = match decoder.find_tag(Tag::from_u16_exhaustive(TIFF_ICC_PROFILE))? {
            Some(value) => Some(Bytes::from(value.into_u8_vec()?)),
            None => None,
        };

        Ok(Self {
            exif: None,
            icc_profile,
            density,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.exif.is_none() && self.icc_profile.is_none() && self.density.is_none()
    }

    /// エンコード済みの出力バイト列にメタデータを付け直したバイト列を返します。
    pub fn apply(&self, encoded: Vec<u8>) -> Result<Vec<u8>, MetadataError> {
        if self.is_empty() {
            return Ok(encoded);
        }
        let data = Bytes::from(encoded);
        let mut image = match DynImage::from_bytes(data.clone())? {
            Some(image) => image,
            // メタデータを保持できないコンテナはそのまま返す
            None => return Ok(data.to_vec()),
        };

        if self.exif.is_some() {
            image.set_exif(self.exif.clone());
        }
        if self.icc_profile.is_some() {
            image.set_icc_profile(self.icc_profile.clone());
        }

        match (&mut image, &self.density) {
            (DynImage::Jpeg(jpeg), Some(Density::Jfif(contents))) => {
                let segment = JpegSegment::new_with_contents(markers::APP0, contents.clone());
                let segments = jpeg.segments_mut();
                match segments.iter().position(|s| s.marker() == markers::APP0) {
                    Some(index) => segments[index] = segment,
                    None => segments.insert(0, segment),
                }
            }
            (DynImage::Png(png), Some(Density::Phys(contents))) => {
                let chunks = png.chunks_mut();
                chunks.retain(|chunk| chunk.kind() != PNG_PHYS);
                // pHYs は IDAT より前に置く必要があるため IHDR の直後へ入れる
                let index = 1.min(chunks.len());
                chunks.insert(index, PngChunk::new(PNG_PHYS, contents.clone()));
            }
            _ => {}
        }

        let mut output = Vec::new();
        image.encoder().write_to(&mut output)?;
        Ok(output)
    }

    /// 画像を TIFF としてエンコードし、解像度と ICC プロファイルのタグを付けます。
    ///
    /// TIFF のタグは画像データと同じ IFD に入るため、エンコード後に
    /// 付け直すのではなく書き出しと同時に設定します。
    pub fn encode_tiff(&self, image: &DynamicImage) -> Result<Vec<u8>, MetadataError> {
        let mut cursor = Cursor::new(Vec::new());
        let mut encoder = TiffEncoder::new(&mut cursor)?;
        let (width, height) = (image.width(), image.height());

        match image {
            DynamicImage::ImageLuma8(buf) => {
                self.write_tiff::<colortype::Gray8, _>(&mut encoder, width, height, buf.as_raw())?
            }
            DynamicImage::ImageLuma16(buf) => {
                self.write_tiff::<colortype::Gray16, _>(&mut encoder, width, height, buf.as_raw())?
            }
            DynamicImage::ImageRgb8(buf) => {
                self.write_tiff::<colortype::RGB8, _>(&mut encoder, width, height, buf.as_raw())?
            }
            DynamicImage::ImageRgb16(buf) => {
                self.write_tiff::<colortype::RGB16, _>(&mut encoder, width, height, buf.as_raw())?
            }
            DynamicImage::ImageRgba16(buf) => {
                self.write_tiff::<colortype::RGBA16, _>(&mut encoder, width, height, buf.as_raw())?
            }
            // それ以外 (アルファ付きグレースケールや浮動小数点など) は 8bit RGBA で書き出す
            other => {
                let rgba = other.to_rgba8();
                self.write_tiff::<colortype::RGBA8, _>(&mut encoder, width, height, rgba.as_raw())?
            }
        }

        drop(encoder);
        Ok(cursor.into_inner())
    }

    fn write_tiff<C, W>(
        &self,
        encoder: &mut TiffEncoder<W>,
        width: u32,
        height: u32,
        data: &[C::Inner],
    ) -> Result<(), TiffError>
    where
        C: ColorType,
        [C::Inner]: TiffValue,
        W: Write + Seek,
    {
        let mut image = encoder.new_image::<C>(width, height)?;
        if let Some(Density::Tiff { unit, x, y }) = &self.density {
            if let Some(unit) = ResolutionUnit::from_u16(*unit) {
                image.resolution_unit(unit);
            }
            image.x_resolution(Rational { n: x.0, d: x.1 });
            image.y_resolution(Rational { n: y.0, d: y.1 });
        }
        if let Some(icc) = &self.icc_profile {
            image
                .encoder()
                .write_tag(Tag::from_u16_exhaustive(TIFF_ICC_PROFILE), &icc[..])?;
        }
        image.write_data(data)
    }
}

fn is_tiff(bytes: &[u8]) -> bool {
    bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*")
}

fn rational_tag<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Result<Option<(u32, u32)>, TiffError> {
    match decoder.find_tag(tag)? {
        Some(Value::Rational(n, d)) => Ok(Some((n, d))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};
    use img_parts::jpeg::Jpeg;
    use img_parts::png::Png;

    // 最小限の TIFF ヘッダ (ビッグエンディアン、IFD エントリ 0 件)
    const EXIF: &[u8] = b"MM\x00\x2a\x00\x00\x00\x08\x00\x00\x00\x00\x00\x00";
    const ICC: &[u8] = b"not-a-real-icc-profile-but-opaque-bytes";

    fn dummy_jpeg(width: u32, height: u32) -> Vec<u8> {
        let buf = vec![120u8; (width * height * 3) as usize];
        let mut result = Vec::new();
        JpegEncoder::new_with_quality(&mut result, 90)
            .write_image(&buf, width, height, ExtendedColorType::Rgb8)
            .expect("JPEGのエンコードに失敗");
        result
    }

    fn dummy_png(width: u32, height: u32) -> Vec<u8> {
        let buf = vec![120u8; (width * height * 3) as usize];
        let mut result = Vec::new();
        PngEncoder::new(&mut result)
            .write_image(&buf, width, height, ExtendedColorType::Rgb8)
            .expect("PNGのエンコードに失敗");
        result
    }

    fn jpeg_with_metadata() -> Vec<u8> {
        let mut jpeg = Jpeg::from_bytes(Bytes::from(dummy_jpeg(8, 4))).unwrap();
        jpeg.set_exif(Some(Bytes::from_static(EXIF)));
        jpeg.set_icc_profile(Some(Bytes::from_static(ICC)));
        let mut out = Vec::new();
        jpeg.encoder().write_to(&mut out).unwrap();
        out
    }

    #[test]
    fn plain_output_has_no_metadata() {
        let meta = ImageMetadata::read(&dummy_png(4, 4)).unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn jpeg_exif_and_icc_survive_round_trip() {
        let source = ImageMetadata::read(&jpeg_with_metadata()).unwrap();
        assert_eq!(source.exif.as_deref(), Some(EXIF));
        assert_eq!(source.icc_profile.as_deref(), Some(ICC));
        assert!(matches!(source.density, Some(Density::Jfif(_))));

        let output = source.apply(dummy_jpeg(8, 8)).unwrap();
        let copied = ImageMetadata::read(&output).unwrap();
        assert_eq!(copied, source);

        // 付け直した後もデコードできること
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn png_density_is_copied() {
        let mut png = Png::from_bytes(Bytes::from(dummy_png(4, 4))).unwrap();
        // 2835 px/m (約 72 DPI)、単位 = メートル
        let phys = Bytes::from_static(b"\x00\x00\x0b\x13\x00\x00\x0b\x13\x01");
        png.chunks_mut().insert(1, PngChunk::new(PNG_PHYS, phys.clone()));
        let mut source = Vec::new();
        png.encoder().write_to(&mut source).unwrap();

        let meta = ImageMetadata::read(&source).unwrap();
        assert_eq!(meta.density, Some(Density::Phys(phys.clone())));
        assert!(meta.exif.is_none());

        let output = meta.apply(dummy_png(6, 6)).unwrap();
        let reread = Png::from_bytes(Bytes::from(output.clone())).unwrap();
        assert_eq!(reread.chunk_by_type(PNG_PHYS).map(|c| c.contents().clone()), Some(phys));
        assert!(image::load_from_memory(&output).is_ok());
    }

    /// 300 DPI + ICC プロファイル付きの RGB TIFF を作ります。
    fn tiff_with_metadata(width: u32, height: u32) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut encoder = TiffEncoder::new(&mut cursor).unwrap();
        let mut image = encoder.new_image::<colortype::RGB8>(width, height).unwrap();
        image.resolution_unit(ResolutionUnit::Inch);
        image.x_resolution(Rational { n: 300, d: 1 });
        image.y_resolution(Rational { n: 300, d: 1 });
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(TIFF_ICC_PROFILE), ICC)
            .unwrap();
        image.write_data(&vec![80u8; (width * height * 3) as usize]).unwrap();
        drop(encoder);
        cursor.into_inner()
    }

    #[test]
    fn tiff_resolution_and_icc_survive_round_trip() {
        let source = ImageMetadata::read(&tiff_with_metadata(4, 2)).unwrap();
        assert_eq!(
            source.density,
            Some(Density::Tiff { unit: 2, x: (300, 1), y: (300, 1) })
        );
        assert_eq!(source.icc_profile.as_deref(), Some(ICC));
        assert!(source.exif.is_none());

        let canvas = DynamicImage::ImageRgb8(image::RgbImage::new(4, 4));
        let output = source.encode_tiff(&canvas).unwrap();
        assert_eq!(ImageMetadata::read(&output).unwrap(), source);

        let decoded = image::load_from_memory_with_format(&output, image::ImageFormat::Tiff).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 4));
    }

    #[test]
    fn tiff_without_icc_writes_none() {
        let canvas = DynamicImage::ImageRgba8(image::RgbaImage::new(3, 3));
        let output = ImageMetadata::default().encode_tiff(&canvas).unwrap();
        let meta = ImageMetadata::read(&output).unwrap();
        assert!(meta.icc_profile.is_none());
        assert!(meta.exif.is_none());
    }

    #[test]
    fn non_metadata_containers_pass_through() {
        let meta = ImageMetadata {
            exif: Some(Bytes::from_static(EXIF)),
            ..Default::default()
        };
        let bmp = b"BM not really a bitmap".to_vec();
        assert_eq!(meta.apply(bmp.clone()).unwrap(), bmp);
    }
}
