#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

//! # Lookup Demo
//!
//! Runs a [`LookupField`] of countries inside the tokio [`Program`] and drives
//! it with a script of key presses, pointer events and pauses. The remote
//! search is a simulated catalog with configurable latency and failures, so
//! debouncing, stale responses and the blur grace period all play out in real
//! time.

pub mod catalog;
pub mod cli;
pub mod script;

use std::sync::Arc;

use anyhow::Context;
use lookup::prelude::*;
use lookup_runtime::Program;
use parking_lot::Mutex;

use crate::catalog::{RemoteCatalog, local_options};
use crate::cli::Cli;
use crate::script::Step;

/// What a demo run produced.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// The view after the last update.
    pub view: String,
    /// Every rendered view, in order.
    pub frames: Vec<String>,
    /// The committed country code, if any.
    pub committed: Option<String>,
    /// Every value reported through `on_change`.
    pub changes: Vec<Option<String>>,
    /// Every search or selection error, rendered.
    pub errors: Vec<String>,
}

/// Shared sinks the field's callbacks write into.
#[derive(Default, Clone)]
struct Sinks {
    frames: Arc<Mutex<Vec<String>>>,
    changes: Arc<Mutex<Vec<Option<String>>>>,
    errors: Arc<Mutex<Vec<String>>>,
}

fn build_field(
    cli: &Cli,
    config: &LookupConfig,
    sinks: &Sinks,
) -> LookupField<Choice<String>, String> {
    let catalog = RemoteCatalog::new(std::time::Duration::from_millis(cli.latency_ms))
        .fail_on(cli.fail_on.clone());
    let changes = Arc::clone(&sinks.changes);
    let search_errors = Arc::clone(&sinks.errors);
    let errors = Arc::clone(&sinks.errors);

    LookupField::choices(local_options())
        .element_id("country")
        .label("Country")
        .helper_text("Type to search the catalog")
        .config(config)
        .search(move |query| catalog.search(query))
        .on_change(move |key: Option<&String>| {
            tracing::info!(?key, "selection changed");
            changes.lock().push(key.cloned());
        })
        .on_search_error(move |err| search_errors.lock().push(err.to_string()))
        .on_error(move |err| errors.lock().push(err.to_string()))
}

/// Runs the script in `cli` against a fresh field and returns the result.
pub async fn run(cli: &Cli) -> anyhow::Result<Outcome> {
    let config = match &cli.config {
        Some(path) => LookupConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => LookupConfig::default(),
    };
    let steps = script::parse(&cli.script).context("parsing the input script")?;
    tracing::debug!(steps = steps.len(), "script parsed");

    let sinks = Sinks::default();
    let field = build_field(cli, &config, &sinks);
    let id = field.id();

    let frames = Arc::clone(&sinks.frames);
    let program =
        Program::new(field).with_renderer(move |view| frames.lock().push(view.to_string()));
    let handle = program.handle();
    let task = tokio::spawn(program.run());

    for step in steps {
        let msg = match step {
            Step::Wait(delay) => {
                tokio::time::sleep(delay).await;
                continue;
            }
            Step::Key(key) => Message::new(key),
            Step::Focus => Message::new(FocusMsg),
            Step::Blur => Message::new(BlurMsg),
            Step::Hover(index) => Message::new(OptionHoverMsg { id, index }),
            Step::Click(index) => Message::new(OptionClickMsg { id, index }),
            Step::Clear => Message::new(ClearMsg { id }),
        };
        handle.send(msg)?;
        tokio::task::yield_now().await;
    }
    handle.quit()?;

    let field = task.await.context("program task panicked")??;
    let frames = std::mem::take(&mut *sinks.frames.lock());
    let changes = std::mem::take(&mut *sinks.changes.lock());
    let errors = std::mem::take(&mut *sinks.errors.lock());

    Ok(Outcome {
        view: field.view(),
        frames,
        committed: field.committed_key().cloned(),
        changes,
        errors,
    })
}
