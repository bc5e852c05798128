//! Backdrop color tokens and their resolution to opaque RGBA.
//!
//! Accepts a fixed palette of passport backdrop names, `#RRGGBB` hex, and
//! 3- or 4-channel numeric tuples. Resolution is total: anything that cannot
//! be understood becomes opaque white and logs a warning.

use num_traits::ToPrimitive;
use tracing::warn;

/// 8-bit sRGB color with alpha.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    /// Fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub const fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Named passport backdrops.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NamedColor {
    White,
    Blue,
    LightBlue,
    Red,
    LightRed,
    Black,
    Gray,
    LightGray,
}

impl NamedColor {
    /// Literal palette value.
    pub const fn rgba(self) -> Rgba {
        match self {
            Self::White => Rgba::opaque(255, 255, 255),
            Self::Blue => Rgba::opaque(0, 102, 204),
            Self::LightBlue => Rgba::opaque(173, 216, 230),
            Self::Red => Rgba::opaque(204, 0, 0),
            Self::LightRed => Rgba::opaque(255, 182, 193),
            Self::Black => Rgba::opaque(0, 0, 0),
            Self::Gray => Rgba::opaque(128, 128, 128),
            Self::LightGray => Rgba::opaque(211, 211, 211),
        }
    }

    /// Look up a palette name, case-insensitive, surrounding whitespace ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        PALETTE
            .binary_search_by_key(&lower.as_str(), |&(n, _)| n)
            .ok()
            .map(|idx| PALETTE[idx].1)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Blue => "blue",
            Self::LightBlue => "light_blue",
            Self::Red => "red",
            Self::LightRed => "light_red",
            Self::Black => "black",
            Self::Gray => "gray",
            Self::LightGray => "light_gray",
        }
    }
}

/// Palette names, sorted for binary search.
const PALETTE: &[(&str, NamedColor)] = &[
    ("black", NamedColor::Black),
    ("blue", NamedColor::Blue),
    ("gray", NamedColor::Gray),
    ("light_blue", NamedColor::LightBlue),
    ("light_gray", NamedColor::LightGray),
    ("light_red", NamedColor::LightRed),
    ("red", NamedColor::Red),
    ("white", NamedColor::White),
];

/// A backdrop color as the caller supplied it.
///
/// Nothing here is validated until [`resolve`](Self::resolve) runs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColorToken {
    Named(NamedColor),
    /// Raw hex text, expected to be `#RRGGBB`.
    Hex(String),
    Rgb([u8; 3]),
    Rgba([u8; 4]),
    /// Input that matched no form. Resolves to white.
    Unrecognized(String),
}

impl Default for ColorToken {
    fn default() -> Self {
        Self::Named(NamedColor::White)
    }
}

impl ColorToken {
    /// Classify free-form text: palette name, `#` hex, or `r,g,b[,a]`.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if let Some(named) = NamedColor::from_name(trimmed) {
            return Self::Named(named);
        }
        if trimmed.starts_with('#') {
            return Self::Hex(trimmed.to_string());
        }
        if trimmed.contains(',') {
            let parts: Option<Vec<i64>> = trimmed
                .trim_start_matches(['(', '['])
                .trim_end_matches([')', ']'])
                .split(',')
                .map(|p| p.trim().parse::<i64>().ok())
                .collect();
            if let Some(channels) = parts {
                return Self::from_channels(&channels);
            }
        }
        Self::Unrecognized(s.to_string())
    }

    /// Build from numeric channels. Three channels get alpha 255, four keep
    /// their own alpha. Any other arity or an out-of-range channel yields
    /// [`ColorToken::Unrecognized`].
    pub fn from_channels<T: ToPrimitive + core::fmt::Debug>(channels: &[T]) -> Self {
        let bytes: Option<Vec<u8>> = channels.iter().map(ToPrimitive::to_u8).collect();
        match bytes.as_deref() {
            Some(&[r, g, b]) => Self::Rgb([r, g, b]),
            Some(&[r, g, b, a]) => Self::Rgba([r, g, b, a]),
            _ => Self::Unrecognized(format!("{channels:?}")),
        }
    }

    /// Resolve to a concrete color. Never fails; unknown input is white.
    pub fn resolve(&self) -> Rgba {
        let resolved = match self {
            Self::Named(named) => Some(named.rgba()),
            Self::Hex(text) => parse_hex6(text),
            Self::Rgb([r, g, b]) => Some(Rgba::opaque(*r, *g, *b)),
            Self::Rgba([r, g, b, a]) => Some(Rgba {
                r: *r,
                g: *g,
                b: *b,
                a: *a,
            }),
            Self::Unrecognized(_) => None,
        };
        resolved.unwrap_or_else(|| {
            warn!(color = ?self, "could not parse color, defaulting to white");
            Rgba::WHITE
        })
    }
}

impl From<&str> for ColorToken {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<NamedColor> for ColorToken {
    fn from(named: NamedColor) -> Self {
        Self::Named(named)
    }
}

impl From<Rgba> for ColorToken {
    fn from(c: Rgba) -> Self {
        Self::Rgba(c.to_array())
    }
}

/// Resolve free-form color text in one step.
pub fn resolve(s: &str) -> Rgba {
    ColorToken::parse(s).resolve()
}

/// `#RRGGBB` only; alpha = 0xFF.
fn parse_hex6(text: &str) -> Option<Rgba> {
    let hex = text.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = parse_byte(&hex[0..2])?;
    let g = parse_byte(&hex[2..4])?;
    let b = parse_byte(&hex[4..6])?;
    Some(Rgba::opaque(r, g, b))
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

fn parse_byte(s: &str) -> Option<u8> {
    let hi = hex_val(s.as_bytes()[0])?;
    let lo = hex_val(s.as_bytes()[1])?;
    Some(hi << 4 | lo)
}
