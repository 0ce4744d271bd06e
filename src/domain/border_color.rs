use image::Rgba;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ColorParseError {
    #[error("色 '{input}' は認識できません: {reason}")]
    Invalid { input: String, reason: String },
}

/// 余白の塗りつぶし色。
///
/// CSS の色指定 (色名, `#RRGGBB`, `rgb()`, `hsl()` など) から生成します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderColor(pub Rgba<u8>);

impl BorderColor {
    pub const WHITE: BorderColor = BorderColor(Rgba([255, 255, 255, 255]));

    pub fn rgba(&self) -> Rgba<u8> {
        self.0
    }
}

impl Default for BorderColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for BorderColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = csscolorparser::parse(s.trim()).map_err(|e| ColorParseError::Invalid {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(Rgba(color.to_rgba8())))
    }
}

impl fmt::Display for BorderColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0 .0;
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}
