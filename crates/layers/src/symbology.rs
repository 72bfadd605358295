use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::layer::LayerKind;

/// An opaque sRGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb` or `#rrggbb` (case-insensitive, surrounding whitespace
    /// ignored).
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
                Some(Self::rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?))
            }
            _ => None,
        }
    }

    /// `#rrggbb`, lowercase.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS `rgba(...)` with `alpha` clamped to [0, 1].
    pub fn to_rgba_css(&self, alpha: f64) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            clamp_unit(alpha)
        )
    }
}

/// Extra paint state only the globe has.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeStyle {
    pub background_color: Color,
    pub side_color: Color,
    pub side_opacity: f64,
}

/// Fully resolved paint state for one layer kind.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    pub fill_color: Color,
    /// Always within [0, 1].
    pub fill_opacity: f64,
    pub border_color: Color,
    /// Always within [0, 1].
    pub border_opacity: f64,
    /// Border width in pixels; finite and non-negative.
    pub border_weight: f64,
    pub globe: Option<GlobeStyle>,
}

impl LayerStyle {
    /// Hard-coded defaults, used field by field when configuration is missing
    /// or malformed.
    pub const fn default_for(kind: LayerKind) -> Self {
        match kind {
            LayerKind::CountryFlat => Self {
                fill_color: Color::rgb(0x90, 0x00, 0xb4),
                fill_opacity: 0.3,
                border_color: Color::WHITE,
                border_opacity: 1.0,
                border_weight: 2.0,
                globe: None,
            },
            LayerKind::StateFlat => Self {
                fill_color: Color::rgb(0x00, 0xaa, 0xff),
                fill_opacity: 0.3,
                border_color: Color::WHITE,
                border_opacity: 1.0,
                border_weight: 1.0,
                globe: None,
            },
            LayerKind::CountryGlobe => Self {
                fill_color: Color::rgb(0x91, 0x00, 0xb4),
                fill_opacity: 0.3,
                border_color: Color::rgb(0x11, 0x11, 0x11),
                border_opacity: 1.0,
                border_weight: 1.0,
                globe: Some(GlobeStyle {
                    background_color: Color::BLACK,
                    side_color: Color::rgb(0x00, 0x64, 0x00),
                    side_opacity: 0.15,
                }),
            },
        }
    }
}

/// Raw per-layer style values as supplied by the settings collaborator.
///
/// Fields are kept as loose JSON so a malformed value degrades to the default
/// for that field instead of rejecting the whole configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerStyleSettings {
    pub fill_color: Option<Value>,
    pub fill_opacity: Option<Value>,
    pub border_color: Option<Value>,
    pub border_opacity: Option<Value>,
    pub border_weight: Option<Value>,
    pub background_color: Option<Value>,
    pub side_color: Option<Value>,
    pub side_opacity: Option<Value>,
}

/// Style settings for every layer kind. A layer entry that is not an object
/// is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleSettings {
    #[serde(deserialize_with = "or_default")]
    pub country_flat: LayerStyleSettings,
    #[serde(deserialize_with = "or_default")]
    pub state_flat: LayerStyleSettings,
    #[serde(deserialize_with = "or_default")]
    pub country_globe: LayerStyleSettings,
}

/// Deserializes `T`, substituting `T::default()` when the value has the wrong
/// shape. Only fails if the input is not JSON-like at all.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl StyleSettings {
    pub fn for_layer(&self, kind: LayerKind) -> &LayerStyleSettings {
        match kind {
            LayerKind::CountryFlat => &self.country_flat,
            LayerKind::StateFlat => &self.state_flat,
            LayerKind::CountryGlobe => &self.country_globe,
        }
    }
}

/// Resolves the paint state for `kind`. Never fails.
pub fn resolve_style(kind: LayerKind, settings: &StyleSettings) -> LayerStyle {
    let raw = settings.for_layer(kind);
    let defaults = LayerStyle::default_for(kind);
    LayerStyle {
        fill_color: color_or(raw.fill_color.as_ref(), defaults.fill_color),
        fill_opacity: opacity_or(raw.fill_opacity.as_ref(), defaults.fill_opacity),
        border_color: color_or(raw.border_color.as_ref(), defaults.border_color),
        border_opacity: opacity_or(raw.border_opacity.as_ref(), defaults.border_opacity),
        border_weight: weight_or(raw.border_weight.as_ref(), defaults.border_weight),
        globe: defaults.globe.map(|g| GlobeStyle {
            background_color: color_or(raw.background_color.as_ref(), g.background_color),
            side_color: color_or(raw.side_color.as_ref(), g.side_color),
            side_opacity: opacity_or(raw.side_opacity.as_ref(), g.side_opacity),
        }),
    }
}

fn color_or(value: Option<&Value>, default: Color) -> Color {
    value
        .and_then(Value::as_str)
        .and_then(Color::parse_hex)
        .unwrap_or(default)
}

fn opacity_or(value: Option<&Value>, default: f64) -> f64 {
    number(value).map(clamp_unit).unwrap_or(default)
}

fn weight_or(value: Option<&Value>, default: f64) -> f64 {
    number(value).filter(|w| *w >= 0.0).unwrap_or(default)
}

/// Finite number from a JSON number or numeric string.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
