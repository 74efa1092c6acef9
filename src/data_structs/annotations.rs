use anyhow::{anyhow, Result};
use ndarray::{Array2, Array3, ArrayView1, ArrayView2, Axis};

use crate::config::DEFAULT_AREA_COLOR;
use crate::data_structs::meta::Meta;
use crate::utils::Color;

/// Volume-wide layer boundary surface: one row coordinate per
/// (scan, column) pair. `NaN` marks columns where the boundary was not
/// detected.
#[derive(Debug, Clone)]
pub struct LayerAnnotation {
    name:    String,
    heights: Array2<f32>,
    meta:    Meta,
}

impl LayerAnnotation {
    pub fn new(
        name: impl Into<String>,
        heights: Array2<f32>,
        meta: Meta,
    ) -> LayerAnnotation {
        LayerAnnotation {
            name: name.into(),
            heights,
            meta,
        }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn heights(&self) -> &Array2<f32> { &self.heights }

    pub fn meta(&self) -> &Meta { &self.meta }

    /// This annotation restricted to the B-scan at `index`.
    pub fn bscan(
        &self,
        index: usize,
    ) -> BscanLayerAnnotation<'_> {
        BscanLayerAnnotation {
            annotation: self,
            index,
        }
    }
}

/// One B-scan's slice of a [`LayerAnnotation`].
#[derive(Debug, Clone, Copy)]
pub struct BscanLayerAnnotation<'a> {
    annotation: &'a LayerAnnotation,
    index:      usize,
}

impl<'a> BscanLayerAnnotation<'a> {
    pub fn name(&self) -> &'a str { self.annotation.name.as_str() }

    pub fn index(&self) -> usize { self.index }

    pub fn meta(&self) -> &'a Meta { &self.annotation.meta }

    /// Height curve of this layer on this B-scan: the boundary's row
    /// coordinate per column, `NaN` where undetected.
    pub fn data(&self) -> ArrayView1<'a, f32> {
        self.annotation
            .heights
            .index_axis(Axis(0), self.index)
    }
}

/// Named voxel mask over the whole volume ("area map" on a single
/// B-scan). Nonzero marks voxels inside the annotated region.
#[derive(Debug, Clone)]
pub struct VoxelAnnotation {
    name: String,
    data: Array3<f32>,
    meta: Meta,
}

impl VoxelAnnotation {
    pub fn new(
        name: impl Into<String>,
        data: Array3<f32>,
        meta: Meta,
    ) -> VoxelAnnotation {
        VoxelAnnotation {
            name: name.into(),
            data,
            meta,
        }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn data(&self) -> &Array3<f32> { &self.data }

    pub fn meta(&self) -> &Meta { &self.meta }

    /// Mask slice for the B-scan at `index`.
    pub fn bscan(
        &self,
        index: usize,
    ) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), index)
    }

    /// Display color: the `"color"` metadata entry if present, red
    /// otherwise.
    pub fn display_color(&self) -> Result<Color> {
        if !self.meta.contains("color") {
            return Ok(DEFAULT_AREA_COLOR);
        }
        let text = self.meta.get_str("color").ok_or_else(|| {
            anyhow!("color of volume map {} is not a string", self.name)
        })?;
        Color::parse(text)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_bscan_layer_annotation_slices_heights() {
        let heights = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, f32::NAN]];
        let annotation = LayerAnnotation::new("RPE", heights, Meta::new());

        let slice = annotation.bscan(1);
        assert_eq!(slice.name(), "RPE");
        assert_eq!(slice.data()[0], 4.0);
        assert!(slice.data()[2].is_nan());
    }

    #[test]
    fn test_display_color_defaults_to_red() {
        let data = Array3::<f32>::zeros((1, 2, 2));
        let annotation =
            VoxelAnnotation::new("drusen", data.clone(), Meta::new());
        assert_eq!(annotation.display_color().unwrap(), DEFAULT_AREA_COLOR);

        let meta: Meta = [("color", "#00FF00")].into_iter().collect();
        let annotation = VoxelAnnotation::new("drusen", data.clone(), meta);
        assert_eq!(
            annotation.display_color().unwrap(),
            Color::rgb(0, 255, 0)
        );

        let mut meta = Meta::new();
        meta.insert("color", 42);
        let annotation = VoxelAnnotation::new("drusen", data, meta);
        assert!(annotation.display_color().is_err());
    }

    #[test]
    fn test_display_color_rejects_malformed_string() {
        let data = Array3::<f32>::zeros((1, 2, 2));
        // Multi-byte string with the byte length of a hex color; must
        // come back as an error, not a panic.
        let meta: Meta = [("color", "0é000")].into_iter().collect();
        let annotation = VoxelAnnotation::new("drusen", data, meta);
        assert!(annotation.display_color().is_err());
    }
}
