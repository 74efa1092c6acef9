use anyhow::{bail, Result};
use log::warn;
use ndarray::{Array2, Array3};

use crate::data_structs::annotations::{LayerAnnotation, VoxelAnnotation};
use crate::data_structs::bscan::BscanView;
use crate::data_structs::meta::{Meta, VolumeMeta};
use crate::utils::Registry;

/// A loaded OCT volume: the scan stack plus the annotation registries all
/// of its B-scans share.
///
/// B-scan views borrow from the volume; annotations are registered before
/// views are taken.
#[derive(Debug, Clone)]
pub struct VolumeView {
    data:        Array3<f32>,
    layers:      Registry<LayerAnnotation>,
    volume_maps: Registry<VoxelAnnotation>,
    meta:        VolumeMeta,
}

impl VolumeView {
    /// Build a volume from a `(n_bscans, height, width)` stack. `meta`
    /// must carry exactly one per-scan record per B-scan.
    pub fn new(
        data: Array3<f32>,
        meta: VolumeMeta,
    ) -> Result<VolumeView> {
        let (n_bscans, height, width) = data.dim();
        if n_bscans == 0 || height == 0 || width == 0 {
            bail!("degenerate volume shape: {:?}", data.dim());
        }
        if meta.bscan_meta.len() != n_bscans {
            bail!(
                "volume has {} B-scans but metadata describes {}",
                n_bscans,
                meta.bscan_meta.len()
            );
        }
        Ok(VolumeView {
            data,
            layers: Registry::new(),
            volume_maps: Registry::new(),
            meta,
        })
    }

    /// Volume with default per-scan metadata, mostly useful for tests and
    /// ad-hoc data.
    pub fn from_data(data: Array3<f32>) -> Result<VolumeView> {
        let n_bscans = data.dim().0;
        VolumeView::new(data, VolumeMeta::with_scan_count(n_bscans))
    }

    pub fn data(&self) -> &Array3<f32> { &self.data }

    /// `(n_bscans, height, width)`
    pub fn shape(&self) -> (usize, usize, usize) { self.data.dim() }

    pub fn n_bscans(&self) -> usize { self.data.dim().0 }

    pub fn meta(&self) -> &VolumeMeta { &self.meta }

    pub fn layers(&self) -> &Registry<LayerAnnotation> { &self.layers }

    pub fn volume_maps(&self) -> &Registry<VoxelAnnotation> {
        &self.volume_maps
    }

    /// Register a layer annotation. `heights` must be
    /// `(n_bscans, width)`; an existing annotation under the same name is
    /// replaced.
    pub fn add_layer(
        &mut self,
        name: impl Into<String>,
        heights: Array2<f32>,
        meta: Meta,
    ) -> Result<()> {
        let name = name.into();
        let (n_bscans, _, width) = self.data.dim();
        if heights.dim() != (n_bscans, width) {
            bail!(
                "layer {} has shape {:?}, expected ({}, {})",
                name,
                heights.dim(),
                n_bscans,
                width
            );
        }
        if self.layers.contains(&name) {
            warn!("replacing layer annotation {}", name);
        }
        self.layers
            .insert(name.clone(), LayerAnnotation::new(name, heights, meta));
        Ok(())
    }

    /// Register a voxel mask shaped like the volume; an existing mask
    /// under the same name is replaced.
    pub fn add_volume_map(
        &mut self,
        name: impl Into<String>,
        data: Array3<f32>,
        meta: Meta,
    ) -> Result<()> {
        let name = name.into();
        if data.dim() != self.data.dim() {
            bail!(
                "volume map {} has shape {:?}, expected {:?}",
                name,
                data.dim(),
                self.data.dim()
            );
        }
        if self.volume_maps.contains(&name) {
            warn!("replacing volume map {}", name);
        }
        self.volume_maps
            .insert(name.clone(), VoxelAnnotation::new(name, data, meta));
        Ok(())
    }

    /// View of the B-scan at `index`. Views are built on demand; taking
    /// the same index twice yields two independent views with independent
    /// annotation caches.
    pub fn bscan(
        &self,
        index: usize,
    ) -> Result<BscanView<'_>> {
        if index >= self.n_bscans() {
            bail!(
                "B-scan index {} out of range for volume with {} scans",
                index,
                self.n_bscans()
            );
        }
        Ok(BscanView::new(self, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_volume() -> VolumeView {
        VolumeView::from_data(Array3::zeros((4, 8, 16))).unwrap()
    }

    #[test]
    fn test_new_validates_meta_length() {
        let data = Array3::<f32>::zeros((4, 8, 16));
        assert!(
            VolumeView::new(data.clone(), VolumeMeta::with_scan_count(3))
                .is_err()
        );
        assert!(
            VolumeView::new(data, VolumeMeta::with_scan_count(4)).is_ok()
        );
        assert!(VolumeView::from_data(Array3::zeros((0, 8, 16))).is_err());
    }

    #[test]
    fn test_add_layer_validates_shape() {
        let mut volume = dummy_volume();
        assert!(volume
            .add_layer("RPE", Array2::zeros((4, 16)), Meta::new())
            .is_ok());
        assert!(volume
            .add_layer("BM", Array2::zeros((4, 15)), Meta::new())
            .is_err());
        assert!(volume
            .add_layer("ILM", Array2::zeros((3, 16)), Meta::new())
            .is_err());
        assert_eq!(volume.layers().len(), 1);
    }

    #[test]
    fn test_add_volume_map_validates_shape() {
        let mut volume = dummy_volume();
        assert!(volume
            .add_volume_map("drusen", Array3::zeros((4, 8, 16)), Meta::new())
            .is_ok());
        assert!(volume
            .add_volume_map("fluid", Array3::zeros((4, 8, 8)), Meta::new())
            .is_err());
        let keys: Vec<&str> = volume.volume_maps().keys().collect();
        assert_eq!(keys, vec!["drusen"]);
    }

    #[test]
    fn test_bscan_index_bounds() {
        let volume = dummy_volume();
        assert!(volume.bscan(3).is_ok());
        assert!(volume.bscan(4).is_err());
    }
}
