// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Gobook: Go game records to ordered, windowed board diagrams.
//!
//! The pipeline runs in three steps:
//! 1. [`model::Spec::create`] turns raw SGF records into a spec with one position per game.
//! 2. [`generate::process_spec`] expands each position into the positions a book shows for it
//!    (commented moves, variation ends, problem answers).
//! 3. [`render::DiagramOrchestrator`] walks the processed spec and renders every position in the
//!    skip/max window through a [`render::DiagramRenderer`] picked from a registry.
//!
//! [`pipeline::Pipeline`] chains the three steps for library users. Specs round-trip through
//! JSON via [`store`].

pub mod generate;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod store;
pub mod tree;
