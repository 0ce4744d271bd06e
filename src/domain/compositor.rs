//! 正方形キャンバスへの合成処理。
//!
//! 元画像を余白色で塗ったキャンバスの中央に配置し、必要であれば
//! 右下に透かしを重ねます。元画像のバッファは変更しません。

use super::border_color::BorderColor;
use super::geometry::{GeometryError, SquareGeometry};
use super::watermark::Watermark;
use image::{imageops, ColorType, DynamicImage, RgbaImage};

/// 透かしの余白（キャンバス幅に対するパーセント）。
pub const WATERMARK_MARGIN_PERCENT: u32 = 2;

/// 合成結果。
#[derive(Debug)]
pub struct Composition {
    pub image: DynamicImage,
    pub geometry: SquareGeometry,
    pub watermarked: bool,
}

/// 余白色で塗りつぶした正方形キャンバスに元画像を貼り付けます。
pub fn pad_to_square(
    source: &DynamicImage,
    color: BorderColor,
) -> Result<(RgbaImage, SquareGeometry), GeometryError> {
    let geometry = SquareGeometry::new(source.width(), source.height())?;
    let mut canvas = RgbaImage::from_pixel(geometry.canvas_size, geometry.canvas_size, color.rgba());
    // 元画像のアルファはブレンドせずにそのまま置き換える
    imageops::replace(
        &mut canvas,
        &source.to_rgba8(),
        geometry.offset_x as i64,
        geometry.offset_y as i64,
    );
    Ok((canvas, geometry))
}

/// 透かしの左上座標を求めます。キャンバスからはみ出す場合は 0 に揃えます。
pub fn watermark_position(canvas_size: u32, mark_width: u32, mark_height: u32) -> (i64, i64) {
    let margin = (canvas_size * WATERMARK_MARGIN_PERCENT / 100) as i64;
    let size = canvas_size as i64;
    (
        (size - mark_width as i64 - margin).max(0),
        (size - mark_height as i64 - margin).max(0),
    )
}

/// キャンバス右下に透かしをアルファ合成します。
pub fn apply_watermark(canvas: &mut RgbaImage, watermark: &Watermark) {
    let canvas_size = canvas.width();
    let mark = watermark.prepare(canvas_size);
    let (x, y) = watermark_position(canvas_size, mark.width(), mark.height());
    imageops::overlay(canvas, &mark, x, y);
}

/// 合成後のキャンバスを元画像と同じカラータイプに戻します。
pub fn restore_color_type(canvas: RgbaImage, color: ColorType) -> DynamicImage {
    let rgba = DynamicImage::ImageRgba8(canvas);
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(rgba.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(rgba.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(rgba.to_rgb8()),
        ColorType::L16 => DynamicImage::ImageLuma16(rgba.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(rgba.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(rgba.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(rgba.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(rgba.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(rgba.to_rgba32f()),
        _ => rgba,
    }
}

/// 余白追加と（指定があれば）透かし合成をまとめて行います。
pub fn compose(
    source: &DynamicImage,
    color: BorderColor,
    watermark: Option<&Watermark>,
) -> Result<Composition, GeometryError> {
    let (mut canvas, geometry) = pad_to_square(source, color)?;
    if let Some(mark) = watermark {
        apply_watermark(&mut canvas, mark);
    }
    Ok(Composition {
        image: restore_color_type(canvas, source.color()),
        geometry,
        watermarked: watermark.is_some(),
    })
}
