// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for form documents on disk.
//!
//! The store module reads/writes the form folder format (one JSON file per form plus a Mermaid
//! export) used by both the TUI and the HTTP server.

pub mod form_folder;

pub use form_folder::{FormFolder, StoreError, WriteDurability};
