// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text exports of the projected navigation graph.
//!
//! Currently this module renders Mermaid flowcharts, written next to stored forms and served by
//! the HTTP API.

pub mod mermaid;
