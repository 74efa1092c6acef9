use std::fmt;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use ndarray::{ArrayView2, Axis};

use crate::data_structs::annotations::BscanLayerAnnotation;
use crate::data_structs::meta::BscanMeta;
use crate::data_structs::volume::VolumeView;
use crate::utils::LazyMap;

/// One B-scan of a [`VolumeView`].
///
/// Owns no imaging data: pixel data and annotation definitions live in
/// the parent volume, this view indexes into them. Per-scan annotation
/// slices are built on first access and cached for the lifetime of the
/// view.
pub struct BscanView<'a> {
    volume:    &'a VolumeView,
    index:     usize,
    layers:    LazyMap<'a, BscanLayerAnnotation<'a>>,
    area_maps: LazyMap<'a, ArrayView2<'a, f32>>,
}

impl<'a> BscanView<'a> {
    pub(crate) fn new(
        volume: &'a VolumeView,
        index: usize,
    ) -> BscanView<'a> {
        let layers = LazyMap::new(move |name: &str| {
            let annotation = volume
                .layers()
                .get(name)
                .ok_or_else(|| anyhow!("unknown layer annotation: {}", name))?;
            Ok(annotation.bscan(index))
        });
        let area_maps = LazyMap::new(move |name: &str| {
            let map = volume
                .volume_maps()
                .get(name)
                .ok_or_else(|| anyhow!("unknown volume map: {}", name))?;
            Ok(map.bscan(index))
        });
        BscanView {
            volume,
            index,
            layers,
            area_maps,
        }
    }

    pub fn index(&self) -> usize { self.index }

    pub fn volume(&self) -> &'a VolumeView { self.volume }

    /// Pixel data of this B-scan, a `(height, width)` view into the
    /// parent volume.
    pub fn data(&self) -> ArrayView2<'a, f32> {
        self.volume.data().index_axis(Axis(0), self.index)
    }

    /// `(height, width)`
    pub fn shape(&self) -> (usize, usize) { self.data().dim() }

    pub fn meta(&self) -> &'a BscanMeta {
        &self.volume.meta().bscan_meta[self.index]
    }

    /// Per-scan slice of the named layer annotation, cached after the
    /// first access. Fails if the parent volume has no such layer.
    pub fn layer(
        &self,
        name: &str,
    ) -> Result<Rc<BscanLayerAnnotation<'a>>> {
        self.layers.get(name)
    }

    /// Per-scan slice of the named volume map, cached after the first
    /// access. Fails if the parent volume has no such map.
    pub fn area_map(
        &self,
        name: &str,
    ) -> Result<Rc<ArrayView2<'a, f32>>> {
        self.area_maps.get(name)
    }
}

impl fmt::Debug for BscanView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("BscanView")
            .field("index", &self.index)
            .field("shape", &self.shape())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array, Array2, Array3};

    use super::*;
    use crate::data_structs::meta::Meta;

    fn dummy_volume() -> VolumeView {
        let n = 3 * 4 * 5;
        let data = Array::linspace(0.0f32, (n - 1) as f32, n)
            .into_shape_with_order((3, 4, 5))
            .unwrap();
        let mut volume = VolumeView::new(
            data,
            crate::data_structs::meta::VolumeMeta::with_scan_count(3),
        )
        .unwrap();

        let mut heights = Array2::zeros((3, 5));
        heights[[1, 2]] = 2.5;
        volume.add_layer("RPE", heights, Meta::new()).unwrap();

        let mut mask = Array3::zeros((3, 4, 5));
        mask[[1, 0, 0]] = 1.0;
        volume.add_volume_map("drusen", mask, Meta::new()).unwrap();

        volume
    }

    #[test]
    fn test_data_and_shape() {
        let volume = dummy_volume();
        let bscan = volume.bscan(1).unwrap();

        assert_eq!(bscan.shape(), (4, 5));
        assert_eq!(bscan.shape(), bscan.data().dim());
        // Second scan starts right after the 20 values of the first.
        assert_eq!(bscan.data()[[0, 0]], 20.0);
        assert_eq!(bscan.meta(), &BscanMeta::default());
    }

    #[test]
    fn test_layer_cache_stability() {
        let volume = dummy_volume();
        let bscan = volume.bscan(1).unwrap();

        let first = bscan.layer("RPE").unwrap();
        let second = bscan.layer("RPE").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.data()[2], 2.5);
        assert_eq!(first.index(), 1);
    }

    #[test]
    fn test_area_map_cache_stability() {
        let volume = dummy_volume();
        let bscan = volume.bscan(1).unwrap();

        let first = bscan.area_map("drusen").unwrap();
        let second = bscan.area_map("drusen").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first[[0, 0]], 1.0);

        // Slices of other scans are unaffected.
        let other = volume.bscan(0).unwrap();
        assert_eq!(other.area_map("drusen").unwrap()[[0, 0]], 0.0);
    }

    #[test]
    fn test_unknown_names_fail() {
        let volume = dummy_volume();
        let bscan = volume.bscan(0).unwrap();
        assert!(bscan.layer("GCL").is_err());
        assert!(bscan.area_map("fluid").is_err());
    }
}
