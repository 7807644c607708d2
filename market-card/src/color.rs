use std::{fmt::Display, num::ParseIntError, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ColorParseError {
    #[error("unrecognized color {0:?}")]
    Unrecognized(String),
    #[error("bad hex digits in {0:?}: {1}")]
    Hex(String, ParseIntError),
    #[error("bad color component {0:?}")]
    Component(String),
}

/// Straight (non premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    fn parse_hex(s: &str, hex: &str) -> Result<Self, ColorParseError> {
        if !hex.is_ascii() {
            return Err(ColorParseError::Unrecognized(s.to_string()));
        }
        let digit = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| ColorParseError::Hex(s.to_string(), e))
        };
        // short form doubles every digit, #abc == #aabbcc
        let short = |i: usize| digit(i..i + 1).map(|v| v * 17);
        match hex.len() {
            3 => Ok(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Ok(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Ok(Self::rgb(digit(0..2)?, digit(2..4)?, digit(4..6)?)),
            8 => Ok(Self::rgba(
                digit(0..2)?,
                digit(2..4)?,
                digit(4..6)?,
                digit(6..8)?,
            )),
            _ => Err(ColorParseError::Unrecognized(s.to_string())),
        }
    }

    fn parse_function(s: &str, args: &str, with_alpha: bool) -> Result<Self, ColorParseError> {
        let components: Vec<&str> = args.split(',').map(str::trim).collect();
        let expected = if with_alpha { 4 } else { 3 };
        if components.len() != expected {
            return Err(ColorParseError::Unrecognized(s.to_string()));
        }
        let channel = |c: &str| {
            c.parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.clamp(0.0, 255.0).round() as u8)
                .ok_or_else(|| ColorParseError::Component(c.to_string()))
        };
        let r = channel(components[0])?;
        let g = channel(components[1])?;
        let b = channel(components[2])?;
        let a = match components.get(3) {
            Some(alpha) => {
                let alpha = alpha
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .ok_or_else(|| ColorParseError::Component(alpha.to_string()))?;
                // values above 1 are byte alpha, `rgba(64, 64, 64, 255)`
                if alpha > 1.0 {
                    alpha.min(255.0).round() as u8
                } else {
                    (alpha * 255.0).round() as u8
                }
            }
            None => 255,
        };
        Ok(Self::rgba(r, g, b, a))
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return Self::parse_hex(s, hex);
        }
        let lower = trimmed.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Self::parse_function(s, args, true);
        }
        if let Some(args) = lower
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Self::parse_function(s, args, false);
        }
        Err(ColorParseError::Unrecognized(s.to_string()))
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    /// Top to bottom
    Vertical,
    /// Left to right
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

/// A linear gradient along one axis between `start` and `end`, both in canvas
/// pixels on that axis.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub direction: GradientDirection,
    pub start: f32,
    pub end: f32,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    pub fn two_stop(
        direction: GradientDirection,
        start: f32,
        end: f32,
        from: Color,
        to: Color,
    ) -> Self {
        Self {
            direction,
            start,
            end,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: from,
                },
                GradientStop {
                    offset: 1.0,
                    color: to,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Color),
    Linear(LinearGradient),
}

impl Fill {
    /// The color used when a fill has to collapse to one value, ex. for glyphs.
    pub fn primary_color(&self) -> Color {
        match self {
            Fill::Solid(color) => *color,
            Fill::Linear(gradient) => gradient
                .stops
                .first()
                .map(|stop| stop.color)
                .unwrap_or(Color::TRANSPARENT),
        }
    }
}

impl From<Color> for Fill {
    fn from(color: Color) -> Self {
        Fill::Solid(color)
    }
}

impl From<LinearGradient> for Fill {
    fn from(gradient: LinearGradient) -> Self {
        Fill::Linear(gradient)
    }
}
