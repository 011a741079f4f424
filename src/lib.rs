// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! OpenPose-style skeleton overlay renderer for 3D content tools,
//! built on wgpu.
//!
//! Poseline projects user-authored anatomical keypoints — bone bindings
//! on rigged skeleton objects — onto the live viewport or an offscreen
//! raster target, drawing colored joint sprites and limb quads in the
//! classic OpenPose stick-figure style.
//!
//! # Key entry points
//!
//! - [`engine::OverlayEngine`] - cache-backed render driver
//! - [`keypoint::BoneBinding`] - per-bone keypoint binding records
//! - [`scene::SceneSource`] - the host scene-graph boundary
//! - [`options::OverlayOptions`] - overlay mode and thickness
//!
//! # Architecture
//!
//! The host supplies scene data through the narrow [`scene::SceneSource`]
//! capability trait; the collector resolves bindings into a per-frame
//! [`scene::PoseScene`] snapshot, memoized by [`scene::ViewportCache`]
//! for the interactive path and recollected per call for deterministic
//! offscreen capture. A single instanced wgpu pipeline
//! ([`overlay::OverlayRenderer`]) rasterizes every sprite and limb quad;
//! [`overlay::SoftwareRasterizer`] implements the identical fragment
//! rules on the CPU for headless validation.

pub mod engine;
pub mod error;
pub mod gpu;
pub mod keypoint;
pub mod options;
pub mod overlay;
pub mod projection;
pub mod scene;
