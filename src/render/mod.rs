// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal rendering for the condition flow view.
//!
//! Renderers produce deterministic Unicode text that the TUI shows as-is.

pub mod canvas;
pub mod flow;

pub use canvas::{Canvas, CanvasError};
pub use flow::{render_flow_text, FlowRenderError};
