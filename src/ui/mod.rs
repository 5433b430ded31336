// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the Siteplan application.

pub mod budget;
pub mod canvas;
pub mod entity_list;
pub mod properties;
pub mod toolbar;
