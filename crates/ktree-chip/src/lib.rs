//! Silicon model for the KT-100 kernel-tree accelerator.
//!
//! This crate has **no dependencies** and **no hardware access** — it is a
//! pure model of the device: kernel-tree geometry, fabric shapes, the flat
//! hardware memory layout, and the trigger selector range.
//!
//! The KT-100 is a fixed-function accelerator organised as a hierarchy of
//! kernel trees. Each tree holds a pipeline of stages, each stage four
//! branches, and all four branches of a stage share one hardware result
//! line. Work reaches the device through an 8×8 PE array, an 8×8×8 switch
//! fabric and 8 DMA channels, with a 1 KiB MMIO line window as the data
//! entry point.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`geometry`] | Kernel-tree hierarchy and fabric shapes |
//! | [`layout`] | Flat hardware memory layout, line and buffer sizes |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geometry;
pub mod layout;
