//! Process-wide display configuration: the layer color table and the
//! default annotation styles. Initialized once, read-only afterwards.

use hashbrown::HashMap;
use once_cell::sync::Lazy;

use crate::utils::Color;

pub const DEFAULT_LAYER_WIDTH: f64 = 1.0;
pub const DEFAULT_AREA_ALPHA: f64 = 0.5;
pub const DEFAULT_AREA_COLOR: Color = Color::rgb(255, 0, 0);

/// Colors for the standard retinal layer names, so the same layer is drawn
/// in the same color on every B-scan of every volume.
static LAYER_COLORS: Lazy<HashMap<&'static str, Color>> = Lazy::new(|| {
    HashMap::from_iter([
        ("ILM", Color::rgb(0xF8, 0x76, 0x6D)),
        ("RNFL", Color::rgb(0xF5, 0x64, 0xD4)),
        ("GCL", Color::rgb(0xBB, 0x83, 0xF4)),
        ("IPL", Color::rgb(0x3B, 0xA3, 0xEC)),
        ("INL", Color::rgb(0x37, 0xAB, 0xB5)),
        ("OPL", Color::rgb(0x34, 0xAF, 0x84)),
        ("ONL", Color::rgb(0x50, 0xB1, 0x31)),
        ("ELM", Color::rgb(0xBB, 0x98, 0x32)),
        ("PR1", Color::rgb(0x36, 0xAD, 0xA4)),
        ("PR2", Color::rgb(0xA4, 0x8C, 0xF4)),
        ("RPE", Color::rgb(0x97, 0xA4, 0x31)),
        ("BM", Color::rgb(0xF7, 0x71, 0x89)),
    ])
});

/// Fallback palette for layer names outside the standard nomenclature.
static FALLBACK_PALETTE: Lazy<Vec<Color>> = Lazy::new(|| {
    vec![
        Color::rgb(0xE4, 0x57, 0x56),
        Color::rgb(0xF2, 0x8E, 0x2B),
        Color::rgb(0x76, 0xB7, 0xB2),
        Color::rgb(0x59, 0xA1, 0x4F),
        Color::rgb(0xED, 0xC9, 0x48),
        Color::rgb(0xB0, 0x7A, 0xA1),
        Color::rgb(0xFF, 0x9D, 0xA7),
        Color::rgb(0x9C, 0x75, 0x5F),
    ]
});

/// Display color for a layer name. Known names come from the standard
/// table; any other name is hashed into the fallback palette, which keeps
/// the name -> color mapping stable across renders and volumes.
pub fn layer_color(name: &str) -> Color {
    if let Some(color) = LAYER_COLORS.get(name) {
        return *color;
    }
    let index = fnv1a(name.as_bytes()) as usize % FALLBACK_PALETTE.len();
    FALLBACK_PALETTE[index]
}

// FNV-1a, used instead of the std hasher for stability across releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Line style for layer boundary curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
}

/// Partial style override for layer curves. Unset fields keep the
/// defaults (width 1, solid).
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerStyle {
    pub width: Option<f64>,
    pub dash:  Option<LineStyle>,
}

impl LayerStyle {
    pub fn merged(&self) -> (f64, LineStyle) {
        (
            self.width.unwrap_or(DEFAULT_LAYER_WIDTH),
            self.dash.unwrap_or_default(),
        )
    }
}

/// Partial style override for area overlays. Unset alpha keeps the
/// default 0.5.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaStyle {
    pub alpha: Option<f64>,
}

impl AreaStyle {
    pub fn merged(&self) -> f64 {
        self.alpha.unwrap_or(DEFAULT_AREA_ALPHA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_layer_colors_are_fixed() {
        assert_eq!(layer_color("RPE"), Color::rgb(0x97, 0xA4, 0x31));
        assert_eq!(layer_color("BM"), Color::rgb(0xF7, 0x71, 0x89));
    }

    #[test]
    fn test_unknown_layer_color_is_deterministic() {
        let first = layer_color("my_custom_layer");
        let second = layer_color("my_custom_layer");
        assert_eq!(first, second);
        assert!(FALLBACK_PALETTE.contains(&first));
    }

    #[test]
    fn test_layer_style_merge_keeps_defaults() {
        let style = LayerStyle {
            width: Some(3.0),
            dash:  None,
        };
        let (width, dash) = style.merged();
        assert_eq!(width, 3.0);
        assert_eq!(dash, LineStyle::Solid);

        let (width, dash) = LayerStyle::default().merged();
        assert_eq!(width, DEFAULT_LAYER_WIDTH);
        assert_eq!(dash, LineStyle::Solid);
    }

    #[test]
    fn test_area_style_merge() {
        assert_eq!(AreaStyle::default().merged(), DEFAULT_AREA_ALPHA);
        assert_eq!(AreaStyle { alpha: Some(0.8) }.merged(), 0.8);
    }
}
