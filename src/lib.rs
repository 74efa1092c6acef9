pub mod config;
pub mod data_structs;
#[cfg(feature = "plots")]
pub mod plots;
pub mod utils;

pub use crate::data_structs::annotations::{
    BscanLayerAnnotation, LayerAnnotation, VoxelAnnotation,
};
pub use crate::data_structs::bscan::BscanView;
pub use crate::data_structs::meta::{BscanMeta, Meta, VolumeMeta};
pub use crate::data_structs::volume::VolumeView;
#[cfg(feature = "plots")]
pub use crate::plots::{Region, RenderOptions, Selection, Span};
