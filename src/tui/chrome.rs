// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Titles, cards, flow text, footer, help, and style helpers used by TUI rendering.
fn view_title(label: &str, tail: Option<&str>) -> String {
    match tail {
        Some(tail) => format!(" {label} — {tail} "),
        None => format!(" {label} "),
    }
}

fn fallthrough_tag(options: ProjectionOptions) -> &'static str {
    if options.fallthrough_edges {
        "fall-through on"
    } else {
        "fall-through off"
    }
}

fn header_line(app: &App) -> Line<'static> {
    let form = &app.form;
    let title = if form.title().trim().is_empty() { form.id().as_str() } else { form.title() };
    let view = match app.view {
        View::Editor => "Condition Editor",
        View::Flow => "Condition Flow",
    };
    Line::from(vec![
        Span::styled(title.to_owned(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(
                "  {} · rev {} · {} pages · {} conditions",
                form.id(),
                form.rev(),
                form.pages().len(),
                form.conditions().len()
            ),
            Style::default().fg(FOOTER_LABEL_COLOR),
        ),
        Span::raw("  "),
        Span::styled(view.to_owned(), Style::default().fg(FOOTER_KEY_COLOR)),
    ])
}

fn operator_label(operator: Operator) -> String {
    operator.as_str().replace('_', " ")
}

fn card_lines(
    pages: &[Page],
    condition: &Condition,
    focus: Option<ConditionField>,
    editing: bool,
) -> Vec<Line<'static>> {
    let source_exists = pages.iter().any(|p| p.id() == condition.source_page_id());
    let target_exists = pages.iter().any(|p| p.id() == condition.target_page_id());
    let element_exists = condition.element_id().is_some_and(|element_id| {
        pages
            .iter()
            .find(|p| p.id() == condition.source_page_id())
            .is_some_and(|p| p.element(element_id).is_some())
    });

    let mut lines = Vec::with_capacity(8);
    for field in ConditionField::ALL {
        let focused = focus == Some(field);
        let (value, value_style) = match field {
            ConditionField::SourcePageId => (
                page_title(pages, condition.source_page_id()).to_owned(),
                stale_style(source_exists),
            ),
            ConditionField::ElementId if !source_exists => (
                "— source page missing".to_owned(),
                Style::default().fg(Color::DarkGray),
            ),
            ConditionField::ElementId => (
                element_title(pages, condition.source_page_id(), condition.element_id()).to_owned(),
                stale_style(element_exists),
            ),
            ConditionField::Operator => (operator_label(condition.operator()), Style::default()),
            ConditionField::Value => (condition.value().to_owned(), Style::default()),
            ConditionField::TargetPageId => (
                page_title(pages, condition.target_page_id()).to_owned(),
                stale_style(target_exists),
            ),
        };
        lines.push(slot_line(field, value, value_style, focused, focused && editing));
    }

    let issues = issues_for(pages, condition);
    if !issues.is_empty() {
        lines.push(Line::from(""));
        for issue in issues {
            lines.push(Line::from(Span::styled(
                format!("⚠ {issue}"),
                Style::default().fg(STALE_COLOR),
            )));
        }
    }

    lines
}

fn stale_style(exists: bool) -> Style {
    if exists {
        Style::default()
    } else {
        Style::default().fg(STALE_COLOR).add_modifier(Modifier::ITALIC)
    }
}

fn slot_line(
    field: ConditionField,
    value: String,
    value_style: Style,
    focused: bool,
    editing: bool,
) -> Line<'static> {
    let label_style = if focused {
        Style::default().fg(FOCUS_COLOR).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(FOOTER_LABEL_COLOR)
    };
    let mut spans = vec![Span::styled(format!("{:<12}", field.label()), label_style)];

    match (field, focused, editing) {
        (ConditionField::Value, true, true) => {
            spans.push(Span::styled(value, Style::default().fg(EDIT_COLOR)));
            spans.push(Span::styled("▏", Style::default().fg(EDIT_COLOR)));
        }
        (ConditionField::Value, _, _) if value.is_empty() => {
            spans.push(Span::styled("(empty)", Style::default().fg(Color::DarkGray)));
        }
        (ConditionField::Value, _, _) => spans.push(Span::styled(value, value_style)),
        (_, true, _) => {
            spans.push(Span::styled("◀ ", Style::default().fg(FOCUS_COLOR)));
            spans.push(Span::styled(value, value_style.add_modifier(Modifier::BOLD)));
            spans.push(Span::styled(" ▶", Style::default().fg(FOCUS_COLOR)));
        }
        (_, false, _) => spans.push(Span::styled(value, value_style)),
    }

    Line::from(spans)
}

fn condition_preview(pages: &[Page], condition: &Condition) -> String {
    format!(
        "If {} go to {}",
        condition_label(pages, condition),
        page_title(pages, condition.target_page_id())
    )
}

fn flow_view_text(form: &FormDocument, options: ProjectionOptions) -> Text<'static> {
    let mut lines = Vec::<Line<'static>>::new();
    if form.pages().is_empty() {
        lines.push(Line::from("This form has no pages yet."));
        return Text::from(lines);
    }

    let graph = project_form(form, options);
    match render_flow_text(&graph) {
        Ok(text) => lines.extend(text.lines().map(|line| Line::from(line.to_owned()))),
        Err(err) => lines.push(Line::from(Span::styled(
            format!("Cannot render flow: {err}"),
            Style::default().fg(Color::Red),
        ))),
    }

    let pages = form.pages();
    let dead_ends = dead_end_pages(form, options);
    let unreachable = unreachable_pages(form, options);
    let reports = condition_issues(form);
    if dead_ends.is_empty() && unreachable.is_empty() && reports.is_empty() {
        return Text::from(lines);
    }

    lines.push(Line::from(""));
    let warn = Style::default().fg(STALE_COLOR);
    if !dead_ends.is_empty() {
        let names = dead_ends.iter().map(|id| page_title(pages, id)).collect::<Vec<_>>();
        lines.push(Line::from(Span::styled(format!("Dead ends: {}", names.join(", ")), warn)));
    }
    if !unreachable.is_empty() {
        let names = unreachable.iter().map(|id| page_title(pages, id)).collect::<Vec<_>>();
        lines.push(Line::from(Span::styled(format!("Unreachable: {}", names.join(", ")), warn)));
    }
    for report in reports {
        let label = form
            .condition(&report.condition_id)
            .map(|condition| condition_label(pages, condition))
            .unwrap_or_else(|| report.condition_id.to_string());
        for issue in report.issues {
            lines.push(Line::from(Span::styled(format!("⚠ {label}: {issue}"), warn)));
        }
    }

    Text::from(lines)
}

fn text_to_string(text: &Text<'_>) -> String {
    text.lines
        .iter()
        .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn footer_help_line(app: &App) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{FOOTER_BRAND} "),
        Style::default().fg(FOOTER_BRAND_COLOR).add_modifier(Modifier::BOLD),
    )];
    let mut entries = Vec::<Span<'static>>::new();

    if app.editing_value {
        push_footer_entry(&mut entries, "type", "value");
        push_footer_entry(&mut entries, "done", "Enter/Esc");
    } else {
        match app.view {
            View::Editor => {
                let has_condition = app.selected_condition().is_some();
                push_footer_entry(&mut entries, "add", "a");
                push_footer_entry_maybe_disabled(&mut entries, "delete", "x", !has_condition);
                push_footer_entry_maybe_disabled(&mut entries, "slot", "Tab", !has_condition);
                push_footer_entry_maybe_disabled(&mut entries, "card", "[ ]", !has_condition);
                push_footer_entry_maybe_disabled(&mut entries, "change", "←/→", !has_condition);
                push_footer_entry_maybe_disabled(
                    &mut entries,
                    "edit value",
                    "Enter",
                    !(has_condition && app.slot == ConditionField::Value),
                );
                push_footer_entry(&mut entries, "flow", "v");
            }
            View::Flow => {
                push_footer_entry(&mut entries, "scroll", "j/k");
                push_footer_entry(&mut entries, "editor", "v");
            }
        }
        push_footer_entry(&mut entries, "fall-through", "f");
        push_footer_entry(&mut entries, "save", "s");
        push_footer_entry(&mut entries, "help", "?");
        push_footer_entry(&mut entries, "quit", "q");
    }

    spans.extend(entries);
    if let Some(toast) = app.active_toast() {
        spans.push(Span::styled(
            format!("  {toast}"),
            Style::default().fg(STALE_COLOR).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn help_key_style() -> Style {
    Style::default().fg(FOOTER_KEY_COLOR).add_modifier(Modifier::BOLD)
}

fn help_header_style() -> Style {
    Style::default().fg(FOOTER_BRAND_COLOR).add_modifier(Modifier::BOLD)
}

fn centered_rect(width_percent: u16, height_percent: u16, area: Rect) -> Rect {
    let vertical_margin = (100u16.saturating_sub(height_percent)) / 2;
    let horizontal_margin = (100u16.saturating_sub(width_percent)) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(vertical_margin),
            Constraint::Percentage(height_percent),
            Constraint::Percentage(vertical_margin),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(horizontal_margin),
            Constraint::Percentage(width_percent),
            Constraint::Percentage(horizontal_margin),
        ])
        .split(vertical[1])[1]
}

fn help_kv(key: &str, desc: &str, key_width: usize, key_style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{key:>width$}", width = key_width), key_style),
        Span::raw("  "),
        Span::raw(desc.to_owned()),
    ])
}

fn help_lines() -> Vec<Line<'static>> {
    const GLOBAL: [(&str, &str); 5] = [
        ("?", "Help (toggle)"),
        ("q", "Quit"),
        ("v", "Toggle Condition Editor / Condition Flow"),
        ("f", "Toggle fall-through edges for pages without conditions"),
        ("s", "Save the form"),
    ];
    const EDITOR: [(&str, &str); 7] = [
        ("a", "Add a condition (needs at least one page)"),
        ("x/Del", "Delete the selected condition"),
        ("[/]", "Previous/next condition card"),
        ("Home/End", "First/last condition card"),
        ("Tab/Shift-Tab", "Focus next/previous slot"),
        ("←/→, h/l", "Cycle the focused selector"),
        ("Enter", "Edit the value (Enter/Esc to finish)"),
    ];
    const FLOW: [(&str, &str); 2] = [("j/k, ↓/↑", "Scroll"), ("Home", "Back to top")];

    let key_width = GLOBAL
        .iter()
        .chain(EDITOR.iter())
        .chain(FLOW.iter())
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);
    let key_style = help_key_style();
    let header_style = help_header_style();

    let mut lines = Vec::<Line<'static>>::new();
    let sections = [
        ("--- Global ---", &GLOBAL[..]),
        ("--- Editor ---", &EDITOR[..]),
        ("--- Flow ---", &FLOW[..]),
    ];
    for (header, entries) in sections {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(header, header_style)));
        for (key, desc) in entries {
            lines.push(help_kv(key, desc, key_width, key_style));
        }
    }
    lines
}

fn render_help(frame: &mut Frame<'_>, app: &mut App, main_area: Rect) {
    let area = centered_rect(80, 80, main_area);
    frame.render_widget(Clear, area);

    let lines = help_lines();
    let inner_height = area.height.saturating_sub(2);
    let max_scroll = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_sub(inner_height);
    app.help_scroll = app.help_scroll.min(max_scroll);

    let help = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(view_title("Help", Some("Esc to close")))
                .border_style(Style::default().fg(FOCUS_COLOR)),
        )
        .scroll((app.help_scroll, 0));
    frame.render_widget(help, area);
}

fn push_footer_entry(spans: &mut Vec<Span<'static>>, label: &str, value: &str) {
    push_footer_entry_maybe_disabled(spans, label, value, false);
}

fn push_footer_entry_maybe_disabled(
    spans: &mut Vec<Span<'static>>,
    label: &str,
    value: &str,
    disabled: bool,
) {
    if !spans.is_empty() {
        spans.push(Span::styled(" | ", Style::default().fg(FOOTER_LABEL_COLOR)));
    }
    spans.push(Span::styled(
        format!("{}:", footer_label_ucfirst(label)),
        Style::default().fg(FOOTER_LABEL_COLOR),
    ));
    spans.extend(footer_value_spans(value, disabled));
}

fn footer_label_ucfirst(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut chars = lower.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = first.to_uppercase().collect::<String>();
    out.push_str(chars.as_str());
    out
}

fn footer_value_spans(value: &str, disabled: bool) -> Vec<Span<'static>> {
    let color = if disabled { Color::DarkGray } else { FOOTER_KEY_COLOR };
    vec![Span::styled(value.to_owned(), Style::default().fg(color).add_modifier(Modifier::BOLD))]
}
