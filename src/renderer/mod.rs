//! WebGPU rendering module
//!
//! Shapes are drawn with SDFs in a fragment shader; text goes to a DOM
//! overlay that shares the same playfield mapping.

pub mod sdf_pipeline;
pub mod text_layer;
pub mod viewport;

pub use sdf_pipeline::SdfRenderState;
pub use viewport::Viewport;
