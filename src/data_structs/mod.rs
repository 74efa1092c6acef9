pub mod annotations;
pub mod bscan;
pub mod meta;
pub mod volume;
