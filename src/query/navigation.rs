// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Page-level navigation analysis.
//!
//! Works on the same effective edges the projection draws: sequential page-to-next-page edges
//! while no condition exists (or as fallthrough when enabled), condition edges otherwise.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::model::{FormDocument, PageId};
use crate::projection::ProjectionOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageDegree {
    pub in_degree: u64,
    pub out_degree: u64,
}

/// Outgoing page adjacency, keyed by every existing page.
///
/// Neighbor lists are deduplicated and sorted, and may contain ids of pages that no longer
/// exist (dangling condition targets).
pub fn page_adjacency(
    form: &FormDocument,
    options: ProjectionOptions,
) -> BTreeMap<PageId, Vec<PageId>> {
    let mut outgoing: BTreeMap<PageId, BTreeSet<PageId>> = BTreeMap::new();
    for page in form.pages() {
        outgoing.entry(page.id().clone()).or_default();
    }

    let conditions = form.conditions();
    let sources = conditions.iter().map(|c| c.source_page_id()).collect::<BTreeSet<_>>();
    for pair in form.pages().windows(2) {
        let [from, to] = pair else { continue };
        if conditions.is_empty() || (options.fallthrough_edges && !sources.contains(from.id())) {
            outgoing.entry(from.id().clone()).or_default().insert(to.id().clone());
        }
    }

    for condition in conditions {
        if let Some(next) = outgoing.get_mut(condition.source_page_id()) {
            next.insert(condition.target_page_id().clone());
        }
    }

    outgoing.into_iter().map(|(page_id, next)| (page_id, next.into_iter().collect())).collect()
}

pub fn degrees(form: &FormDocument, options: ProjectionOptions) -> BTreeMap<PageId, PageDegree> {
    let outgoing = page_adjacency(form, options);
    let mut degrees: BTreeMap<PageId, PageDegree> =
        outgoing.keys().map(|page_id| (page_id.clone(), PageDegree::default())).collect();

    for (from, tos) in &outgoing {
        if let Some(degree) = degrees.get_mut(from) {
            degree.out_degree = degree.out_degree.saturating_add(tos.len() as u64);
        }
        for to in tos {
            if let Some(degree) = degrees.get_mut(to) {
                degree.in_degree = degree.in_degree.saturating_add(1);
            }
        }
    }

    degrees
}

fn bfs_reachable(adjacency: &BTreeMap<PageId, Vec<PageId>>, start: &PageId) -> BTreeSet<PageId> {
    let mut visited: BTreeSet<PageId> = BTreeSet::new();
    if !adjacency.contains_key(start) {
        return visited;
    }

    let mut queue: VecDeque<PageId> = VecDeque::new();
    visited.insert(start.clone());
    queue.push_back(start.clone());

    while let Some(page_id) = queue.pop_front() {
        for next_id in adjacency.get(&page_id).into_iter().flatten() {
            if !adjacency.contains_key(next_id) {
                continue;
            }
            if visited.insert(next_id.clone()) {
                queue.push_back(next_id.clone());
            }
        }
    }

    visited
}

/// Pages reachable from the first page, in page order (the first page included).
pub fn reachable_pages(form: &FormDocument, options: ProjectionOptions) -> Vec<PageId> {
    let Some(first) = form.pages().first() else {
        return Vec::new();
    };
    let visited = bfs_reachable(&page_adjacency(form, options), first.id());
    form.pages()
        .iter()
        .filter(|p| visited.contains(p.id()))
        .map(|p| p.id().clone())
        .collect()
}

/// Pages a respondent can never arrive at from the first page, in page order.
pub fn unreachable_pages(form: &FormDocument, options: ProjectionOptions) -> Vec<PageId> {
    let reachable = reachable_pages(form, options).into_iter().collect::<BTreeSet<_>>();
    form.pages()
        .iter()
        .filter(|p| !reachable.contains(p.id()))
        .map(|p| p.id().clone())
        .collect()
}

/// Pages other than the last one that have no outgoing edge in the projected graph.
///
/// Empty while the form has no conditions, since every page then flows to the next one.
pub fn dead_end_pages(form: &FormDocument, options: ProjectionOptions) -> Vec<PageId> {
    let Some((_, leading)) = form.pages().split_last() else {
        return Vec::new();
    };
    let outgoing = page_adjacency(form, options);
    leading
        .iter()
        .filter(|p| outgoing.get(p.id()).map_or(true, Vec::is_empty))
        .map(|p| p.id().clone())
        .collect()
}
