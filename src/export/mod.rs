//! OpenSCAD export stages.
//!
//! This module turns an encoded heightmap into a `.scad` scene and, when
//! asked for, drives the OpenSCAD CLI to produce an `.stl` mesh.

pub mod scad;
pub mod stl;

pub use scad::{render_scene, write_scene, SceneOptions, SceneScale};
pub use stl::{export_stl, ExecutableResolution, ExecutableSearch};
