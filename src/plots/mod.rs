//! Annotated B-scan rendering on top of plotly.

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use ndarray::{s, ArrayView1, ArrayView2};

use crate::config::{AreaStyle, LayerStyle};
use crate::utils::Color;

mod bscan;

/// Half-open index range over one axis; `None` endpoints mean "start of
/// axis" / "end of axis".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Option<usize>,
    pub stop:  Option<usize>,
}

impl Span {
    pub const fn full() -> Span {
        Span {
            start: None,
            stop:  None,
        }
    }
}

impl From<RangeFull> for Span {
    fn from(_: RangeFull) -> Span { Span::full() }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Span {
        Span {
            start: Some(range.start),
            stop:  Some(range.end),
        }
    }
}

impl From<RangeFrom<usize>> for Span {
    fn from(range: RangeFrom<usize>) -> Span {
        Span {
            start: Some(range.start),
            stop:  None,
        }
    }
}

impl From<RangeTo<usize>> for Span {
    fn from(range: RangeTo<usize>) -> Span {
        Span {
            start: None,
            stop:  Some(range.end),
        }
    }
}

/// Rectangular crop of a B-scan's row/column extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Region {
    pub rows: Span,
    pub cols: Span,
}

impl Region {
    pub fn new(
        rows: impl Into<Span>,
        cols: impl Into<Span>,
    ) -> Region {
        Region {
            rows: rows.into(),
            cols: cols.into(),
        }
    }

    pub const fn full() -> Region {
        Region {
            rows: Span::full(),
            cols: Span::full(),
        }
    }

    /// Normalize against a `(height, width)` shape. Stops are clamped to
    /// the axis length and starts to the stop, so out-of-range or
    /// reversed spans resolve to an empty or truncated region instead of
    /// failing.
    pub fn resolve(
        &self,
        shape: (usize, usize),
    ) -> ResolvedRegion {
        fn span_bounds(
            span: Span,
            len: usize,
        ) -> (usize, usize) {
            let stop = span.stop.unwrap_or(len).min(len);
            let start = span.start.unwrap_or(0).min(stop);
            (start, stop)
        }
        let (row_start, row_stop) = span_bounds(self.rows, shape.0);
        let (col_start, col_stop) = span_bounds(self.cols, shape.1);
        ResolvedRegion {
            row_start,
            row_stop,
            col_start,
            col_stop,
        }
    }
}

/// Fully resolved `[row_start, row_stop) x [col_start, col_stop)` crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRegion {
    pub row_start: usize,
    pub row_stop:  usize,
    pub col_start: usize,
    pub col_stop:  usize,
}

impl ResolvedRegion {
    pub fn height(&self) -> usize { self.row_stop - self.row_start }

    pub fn width(&self) -> usize { self.col_stop - self.col_start }
}

/// Which annotations of a kind to draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Draw none.
    #[default]
    None,
    /// Draw every annotation the parent volume knows, in registration
    /// order.
    All,
    /// Draw exactly these, in the given order.
    Names(Vec<String>),
}

impl Selection {
    pub fn names<I, S>(names: I) -> Selection
    where
        I: IntoIterator<Item = S>,
        S: Into<String>, {
        Selection::Names(names.into_iter().map(Into::into).collect())
    }

    fn resolve<'n>(
        &self,
        all: impl Iterator<Item = &'n str>,
    ) -> Vec<String> {
        match self {
            Selection::None => Vec::new(),
            Selection::All => all.map(str::to_owned).collect(),
            Selection::Names(names) => names.clone(),
        }
    }
}

impl From<bool> for Selection {
    fn from(all: bool) -> Selection {
        if all {
            Selection::All
        }
        else {
            Selection::None
        }
    }
}

/// Configuration for [`BscanView::render`](crate::BscanView::render).
/// The default draws the full B-scan image with no annotations.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub layers:           Selection,
    pub areas:            Selection,
    pub layer_style:      LayerStyle,
    pub area_style:       AreaStyle,
    /// Skip the base image and draw annotations only.
    pub annotations_only: bool,
    pub region:           Region,
}

/// Cropped scan data as 8-bit grayscale pixels, min-max scaled to the
/// crop's own value range. A flat crop renders black.
fn grayscale_pixels(
    data: ArrayView2<f32>,
    region: ResolvedRegion,
) -> Vec<Vec<Color>> {
    let crop = data.slice(s![
        region.row_start..region.row_stop,
        region.col_start..region.col_stop
    ]);

    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for &value in crop.iter() {
        if value.is_finite() {
            lo = lo.min(value);
            hi = hi.max(value);
        }
    }
    let span = hi - lo;

    crop.outer_iter()
        .map(|row| {
            row.iter()
                .map(|&value| {
                    let level = if span > 0.0 && value.is_finite() {
                        (((value - lo) / span) * 255.0).round() as u8
                    }
                    else {
                        0
                    };
                    Color::rgb(level, level, level)
                })
                .collect()
        })
        .collect()
}

/// RGBA overlay for an area mask crop: the area color everywhere, with
/// alpha scaled by `alpha` inside the mask and zeroed outside it.
fn area_overlay_pixels(
    mask: ArrayView2<f32>,
    region: ResolvedRegion,
    color: Color,
    alpha: f64,
) -> Vec<Vec<Color>> {
    let crop = mask.slice(s![
        region.row_start..region.row_stop,
        region.col_start..region.col_stop
    ]);
    crop.outer_iter()
        .map(|row| {
            row.iter()
                .map(|&value| {
                    let visible = if value != 0.0 { 1.0 } else { 0.0 };
                    color.with_alpha(color.a * visible * alpha)
                })
                .collect()
        })
        .collect()
}

/// Layer height curve shifted into the region's row frame, restricted to
/// its columns and clamped to `[0, region height]`. `NaN` gaps pass
/// through and break the drawn line.
fn clipped_curve(
    heights: ArrayView1<f32>,
    region: ResolvedRegion,
) -> Vec<f64> {
    let region_height = region.height() as f32;
    let row_start = region.row_start as f32;
    heights
        .slice(s![region.col_start..region.col_stop])
        .iter()
        .map(|&value| {
            let shifted = value - row_start;
            let clipped = if shifted < 0.0 {
                0.0
            }
            else if shifted > region_height {
                region_height
            }
            else {
                shifted
            };
            clipped as f64
        })
        .collect()
}
