// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pageflow: conditional page navigation for multi-page forms.
//!
//! The crate holds the form model (pages, elements, navigation conditions), a revisioned op
//! reducer, the graph projection and its Mermaid/text renderings, the on-disk form folder, an
//! HTTP API and a terminal condition editor.

pub mod api;
pub mod format;
pub mod model;
pub mod ops;
pub mod projection;
pub mod query;
pub mod render;
pub mod store;
pub mod tui;
pub mod ui;
pub mod workspace;

#[cfg(test)]
mod test_utils;
