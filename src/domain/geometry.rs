use thiserror::Error;

/// 正方形化のための寸法計算エラー。
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("画像の寸法が不正です: {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
}

/// 元画像を正方形キャンバスの中央に置くための寸法情報。
///
/// 幅と高さの差が奇数の場合、オフセットは切り捨てとし、
/// 余った 1px は右側（または下側）の余白になります。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareGeometry {
    pub source_width: u32,
    pub source_height: u32,
    pub canvas_size: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl SquareGeometry {
    pub fn new(width: u32, height: u32) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::ZeroDimension { width, height });
        }
        let canvas_size = width.max(height);
        Ok(Self {
            source_width: width,
            source_height: height,
            canvas_size,
            offset_x: (canvas_size - width) / 2,
            offset_y: (canvas_size - height) / 2,
        })
    }

    /// 既に正方形で、余白を追加する必要がないかどうか。
    pub fn is_square(&self) -> bool {
        self.source_width == self.source_height
    }
}
