//! Library surface for the renderer: exposed so integration tests and
//! benchmarks can drive the BVH, scene and render driver directly, with
//! `main.rs` staying a thin CLI wrapper around this crate.

pub mod bvh;
pub mod driver;
pub mod loader;
pub mod scene;
