// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;

fn invalid_ident_chars() -> &'static Regex {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    INVALID.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]+").expect("static regex"))
}

pub(super) fn is_mermaid_ident(ident: &str) -> bool {
    !ident.is_empty()
        && !invalid_ident_chars().is_match(ident)
        && !ident.starts_with(|c: char| c.is_ascii_digit())
        && ident != "end"
}

/// Maps graph node ids to unique Mermaid identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
#[derive(Debug, Default)]
pub(super) struct MermaidIdents {
    assigned: BTreeMap<String, String>,
    taken: BTreeSet<String>,
}

impl MermaidIdents {
    pub(super) fn ident(&mut self, node_id: &str) -> &str {
        if !self.assigned.contains_key(node_id) {
            let base = sanitize(node_id);
            let mut candidate = base.clone();
            let mut suffix = 2usize;
            while self.taken.contains(&candidate) {
                candidate = format!("{base}_{suffix}");
                suffix += 1;
            }
            self.taken.insert(candidate.clone());
            self.assigned.insert(node_id.to_owned(), candidate);
        }
        self.assigned.get(node_id).map(String::as_str).unwrap_or_default()
    }
}

fn sanitize(node_id: &str) -> String {
    let cleaned = invalid_ident_chars().replace_all(node_id, "_");
    let cleaned = cleaned.trim_matches('_');
    if is_mermaid_ident(cleaned) {
        cleaned.to_owned()
    } else {
        format!("n_{cleaned}")
    }
}
