// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Siteplan - site survey planning on floor plans
//!
//! Place network drops, cameras, switches and NVRs on a floor plan image,
//! connect point-to-point links, outline buildings and price the result.
//! The [`editor::Editor`] owns the document; the `siteplan` binary is an
//! egui front end over it.

pub mod budget;
pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod filters;
pub mod hit;
pub mod io;
pub mod models;
pub mod util;
pub mod viewport;

pub use error::{Error, Result};
