// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};

use super::{
    decode_persisted_id_segment, encode_persisted_id_segment, FormFolder, StoreError,
    WriteDurability,
};
use crate::model::fixtures::age_gate_form;
use crate::model::{FormDocument, FormId};
use crate::projection::ProjectionOptions;
use crate::test_utils::TempDir;

struct FormFolderTestCtx {
    _tmp: TempDir,
    folder: FormFolder,
}

#[fixture]
fn ctx() -> FormFolderTestCtx {
    let tmp = TempDir::new("form-folder");
    let folder = FormFolder::new(tmp.path().join("workspace"));
    FormFolderTestCtx { _tmp: tmp, folder }
}

fn form_id(value: &str) -> FormId {
    FormId::new(value).expect("form id")
}

#[rstest]
fn save_then_load_returns_the_same_document(ctx: FormFolderTestCtx) {
    let mut form = age_gate_form();
    form.set_rev(7);

    ctx.folder.save_form(&form).expect("save");
    let loaded = ctx.folder.load_form(form.id()).expect("load");
    assert_eq!(loaded, form);

    let path = ctx.folder.form_json_path(form.id());
    assert!(path.ends_with("forms/age-gate.form.json"));
    let raw = std::fs::read_to_string(path).expect("raw json");
    assert!(raw.ends_with('\n'));
    assert!(raw.contains("\"sourcePageId\": \"p1\""));
}

#[rstest]
fn save_writes_mermaid_side_export(ctx: FormFolderTestCtx) {
    let form = age_gate_form();
    ctx.folder.save_form(&form).expect("save");

    let mermaid = std::fs::read_to_string(ctx.folder.form_mermaid_path(form.id())).expect("mmd");
    assert!(mermaid.starts_with("flowchart LR\n"));
    assert!(mermaid.contains("condition_c1{\"Age > 18\"}"));
}

#[rstest]
fn mermaid_export_follows_projection_options() {
    let tmp = TempDir::new("form-folder-fallthrough");
    let folder = FormFolder::new(tmp.path())
        .with_projection_options(ProjectionOptions { fallthrough_edges: true });
    let form = age_gate_form();
    folder.save_form(&form).expect("save");

    let mermaid = std::fs::read_to_string(folder.form_mermaid_path(form.id())).expect("mmd");
    assert!(mermaid.contains("p2 -.-> p3"));
}

#[rstest]
fn load_missing_form_is_not_found(ctx: FormFolderTestCtx) {
    let err = ctx.folder.load_form(&form_id("nope")).expect_err("missing");
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[rstest]
fn load_or_init_seeds_and_persists_a_one_page_form(ctx: FormFolderTestCtx) {
    let id = form_id("fresh");
    let form = ctx.folder.load_or_init_form(&id).expect("init");
    assert_eq!(form.pages().len(), 1);
    assert_eq!(form.pages()[0].title(), "Page 1");
    assert!(form.conditions().is_empty());

    let again = ctx.folder.load_or_init_form(&id).expect("load");
    assert_eq!(again, form);
}

#[rstest]
fn load_rejects_invalid_json(ctx: FormFolderTestCtx) {
    let id = form_id("broken");
    let path = ctx.folder.form_json_path(&id);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(&path, "{ not json").expect("write");

    let err = ctx.folder.load_form(&id).expect_err("invalid");
    assert!(matches!(err, StoreError::Json { .. }));
    assert!(ctx.folder.load_or_init_form(&id).is_err());
}

#[rstest]
fn load_rejects_documents_with_repeated_condition_ids(ctx: FormFolderTestCtx) {
    let mut form = age_gate_form();
    let copy = form.conditions()[0].clone();
    form.conditions_mut().push(copy);
    ctx.folder.save_form(&form).expect("save");

    let err = ctx.folder.load_form(form.id()).expect_err("duplicate ids");
    match err {
        StoreError::InvalidForm { source, .. } => {
            assert_eq!((source.kind, source.id.as_str()), ("condition", "c1"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn load_rejects_documents_stored_under_another_id(ctx: FormFolderTestCtx) {
    let form = age_gate_form();
    ctx.folder.save_form(&form).expect("save");
    let other = form_id("other");
    std::fs::copy(ctx.folder.form_json_path(form.id()), ctx.folder.form_json_path(&other))
        .expect("copy");

    let err = ctx.folder.load_form(&other).expect_err("mismatch");
    assert!(matches!(err, StoreError::FormIdMismatch { .. }));
}

#[rstest]
fn list_and_delete_forms(ctx: FormFolderTestCtx) {
    assert!(ctx.folder.list_forms().expect("empty list").is_empty());

    ctx.folder.save_form(&FormDocument::new(form_id("zeta"), "Z")).expect("save");
    ctx.folder.save_form(&FormDocument::new(form_id("alpha"), "A")).expect("save");
    ctx.folder.save_form(&FormDocument::new(form_id("CON"), "Device")).expect("save");

    let listed = ctx.folder.list_forms().expect("list");
    let names = listed.iter().map(|id| id.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["CON", "alpha", "zeta"]);

    assert!(ctx.folder.delete_form(&form_id("alpha")).expect("delete"));
    assert!(!ctx.folder.delete_form(&form_id("alpha")).expect("delete again"));
    assert!(!ctx.folder.form_mermaid_path(&form_id("alpha")).exists());
    assert_eq!(ctx.folder.list_forms().expect("list").len(), 2);
}

#[rstest]
fn durable_writes_round_trip(ctx: FormFolderTestCtx) {
    let folder = ctx.folder.clone().with_durability(WriteDurability::Durable);
    assert_eq!(folder.durability(), WriteDurability::Durable);

    let form = age_gate_form();
    folder.save_form(&form).expect("save");
    assert_eq!(folder.load_form(form.id()).expect("load"), form);
}

#[cfg(unix)]
#[rstest]
fn save_refuses_to_write_through_symlinks(ctx: FormFolderTestCtx) {
    let form = age_gate_form();
    let path = ctx.folder.form_json_path(form.id());
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    let outside = ctx.folder.root().join("outside.json");
    std::fs::write(&outside, "{}").expect("write");
    std::os::unix::fs::symlink(&outside, &path).expect("symlink");

    let err = ctx.folder.save_form(&form).expect_err("symlink");
    assert!(matches!(err, StoreError::SymlinkRefused { .. }));
    assert_eq!(std::fs::read_to_string(outside).expect("outside"), "{}");
}

#[rstest]
#[case("form", "form")]
#[case("CON", "~434f4e")]
#[case("a:b", "~613a62")]
#[case(".hidden", "~2e68696464656e")]
fn unsafe_ids_are_hex_encoded_in_file_names(#[case] id: &str, #[case] encoded: &str) {
    assert_eq!(encode_persisted_id_segment(id), encoded);
    assert_eq!(decode_persisted_id_segment(encoded).as_deref(), Some(id));
}

#[test]
fn decoding_rejects_malformed_hex() {
    assert_eq!(decode_persisted_id_segment("~4"), None);
    assert_eq!(decode_persisted_id_segment("~zz"), None);
}
