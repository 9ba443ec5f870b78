//! Image processing: pure Rust, no system dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Tone filters** | per-pixel passes over `RgbaImage` |
//! | **Detail filters** | 3×3 convolution, Gaussian blur |
//! | **Geometry** | `fliph`, `rotate270` |
//!
//! The module is split into:
//! - **Kernels**: Pure pixel math (unit testable on tiny buffers)
//! - **Parameters**: Data structures describing a filter application
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Output planning + backend invocation

pub mod backend;
pub(crate) mod kernels;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{apply_filter, get_dimensions, plan_filter};
pub use params::{FilterParams, FilterRequest, Quality};
pub use rust_backend::RustBackend;
