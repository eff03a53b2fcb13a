// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pageflow CLI entrypoint.
//!
//! By default this runs the interactive condition editor on one form and serves the JSON API at
//! `http://127.0.0.1:<port>/api`.
//!
//! Use `--serve` to run only the HTTP API (no terminal UI).

use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pageflow::model::FormId;
use pageflow::projection::ProjectionOptions;
use pageflow::store::{FormFolder, WriteDurability};
use pageflow::ui::UiState;
use pageflow::workspace::{Workspace, WorkspaceState};

const DEFAULT_HTTP_PORT: u16 = 27436;
const DEFAULT_FORM_ID: &str = "form";
const LOG_FILE_NAME: &str = "pageflow.log";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<form-dir>] [--form <id>] [--durable-writes] [--fallthrough] [--http-port <port>]\n  {program} --demo [--fallthrough] [--http-port <port>]\n  {program} [<form-dir>] [--form <id>] [--durable-writes] [--fallthrough] --serve [--http-port <port>]\n  {program} --demo --serve [--http-port <port>]\n\nTUI mode (default) edits one form and serves the JSON API at `http://127.0.0.1:<port>/api`.\n--serve runs the API without the terminal UI.\n--http-port selects the port (0 = ephemeral; default {DEFAULT_HTTP_PORT}).\n\nIf form-dir is omitted, the current working directory is used; forms live in `<form-dir>/forms/`.\n--form selects the form to edit (default `{DEFAULT_FORM_ID}`; created when missing).\n--demo uses a built-in in-memory demo form and cannot be combined with form-dir or --form.\n--fallthrough keeps the sequential edge out of pages without conditions in projections.\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n\nLogging follows PAGEFLOW_LOG (fallback RUST_LOG, default `info`); the TUI logs to `<form-dir>/{LOG_FILE_NAME}` (the temp dir with --demo)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    serve: bool,
    demo: bool,
    form_dir: Option<String>,
    form_id: Option<String>,
    http_port: Option<u16>,
    durable_writes: bool,
    fallthrough: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--serve" => {
                if options.serve {
                    return Err(());
                }
                options.serve = true;
            }
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--form" => {
                if options.form_id.is_some() {
                    return Err(());
                }
                let form_id = args.next().ok_or(())?;
                FormId::new(form_id.as_str()).map_err(|_| ())?;
                options.form_id = Some(form_id);
            }
            "--http-port" => {
                if options.http_port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.http_port = Some(port);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--fallthrough" => {
                if options.fallthrough {
                    return Err(());
                }
                options.fallthrough = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.form_dir.is_some() {
                    return Err(());
                }
                options.form_dir = Some(arg);
            }
        }
    }

    if options.demo && (options.form_dir.is_some() || options.form_id.is_some()) {
        return Err(());
    }

    if options.demo && options.durable_writes {
        return Err(());
    }

    Ok(options)
}

/// Logs go to `log_file` when given (the TUI owns the terminal), to stderr otherwise.
fn init_tracing(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_env("PAGEFLOW_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file));
            (Some(layer), None)
        }
        None => (None, Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))),
    };

    tracing_subscriber::registry().with(filter).with(file_layer).with(stderr_layer).try_init()?;
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "pageflow".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let projection = ProjectionOptions { fallthrough_edges: options.fallthrough };
        let http_port = options.http_port.unwrap_or(DEFAULT_HTTP_PORT);
        let form_dir = PathBuf::from(options.form_dir.clone().unwrap_or_else(|| ".".to_owned()));

        let log_file = match (options.serve, options.demo) {
            (true, _) => None,
            (false, true) => Some(std::env::temp_dir().join(LOG_FILE_NAME)),
            (false, false) => Some(form_dir.join(LOG_FILE_NAME)),
        };
        init_tracing(log_file.as_deref())?;

        let (state, form_id) = if options.demo {
            let form = pageflow::model::demo_form();
            let form_id = form.id().clone();
            (WorkspaceState::in_memory([form]), form_id)
        } else {
            let durability = if options.durable_writes {
                WriteDurability::Durable
            } else {
                WriteDurability::BestEffort
            };
            let folder = FormFolder::new(&form_dir)
                .with_durability(durability)
                .with_projection_options(projection);
            let form_id =
                FormId::new(options.form_id.as_deref().unwrap_or(DEFAULT_FORM_ID).to_owned())?;
            let form = folder.load_or_init_form(&form_id)?;
            tracing::info!(root = %form_dir.display(), form_id = %form_id, "opened form folder");
            (WorkspaceState::persistent(folder).with_form(form), form_id)
        };
        let state = state.with_projection_options(projection);

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        if options.serve {
            let workspace = Workspace::new(state);
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind(("127.0.0.1", http_port)).await?;
                tracing::info!(addr = %listener.local_addr()?, "serving pageflow API");
                axum::serve(listener, pageflow::api::router(workspace))
                    .with_graceful_shutdown(async {
                        let _ = tokio::signal::ctrl_c().await;
                    })
                    .await?;
                Ok::<(), Box<dyn Error>>(())
            })?;
            return Ok(());
        }

        let ui_state = Arc::new(Mutex::new(UiState::default()));
        let workspace = Workspace::new(state).with_ui_state(ui_state);

        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", http_port)).await?;
            tracing::info!(addr = %listener.local_addr()?, "serving pageflow API");

            let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
            let router = pageflow::api::router(workspace.clone());
            let server_handle = tokio::spawn(async move {
                let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });
                if let Err(err) = serve.await {
                    tracing::error!(error = %err, "HTTP server error");
                }
            });

            let tui_join = tokio::task::spawn_blocking(move || {
                pageflow::tui::run(workspace, form_id).map_err(|err| err.to_string())
            })
            .await;

            let _ = shutdown_tx.send(());
            let _ = server_handle.await;

            let tui_result = tui_join.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
            tui_result.map_err(|err| {
                Box::new(std::io::Error::new(std::io::ErrorKind::Other, err)) as Box<dyn Error>
            })?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("pageflow: {err}");
        std::process::exit(1);
    }
}
