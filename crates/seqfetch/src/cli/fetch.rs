use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use seqfetch_engine::{DirStore, Engine, ReqwestClient};

use crate::cli::App;
use crate::config::Settings;
use crate::ui::BarSink;

/// Download every fragment into a scratch directory beside the output, then
/// join them into the output file.
pub async fn run(app: App) -> Result<()> {
    let settings = Settings::load(app.config.as_deref())?.merge(&app);
    debug!(?settings, "effective settings");

    if app.output.exists() {
        bail!("output file already exists: {}", app.output.display());
    }

    let client = ReqwestClient::with_setting(settings.client_setting()?)
        .context("failed to build HTTP client")?;

    let scratch = tempfile::Builder::new()
        .prefix(".seqfetch-")
        .tempdir_in(parent_dir(&app.output))
        .context("failed to create fragment directory")?;
    let store = Arc::new(DirStore::new(scratch.path()));
    let engine = Engine::new(client, settings.engine_options());

    let sink = if std::io::stderr().is_terminal() {
        BarSink::new()
    } else {
        BarSink::hidden()
    };

    let report = engine
        .run_report(Arc::clone(&store), &app.base_url, &settings.template, sink.clone())
        .await;
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            sink.abandon();
            keep_or_drop(scratch, app.keep_fragments);
            return Err(e).with_context(|| format!("failed to fetch {}", app.base_url));
        }
    };
    sink.finish(Some(format!("{} fragments", report.count)));

    if report.count == 0 {
        keep_or_drop(scratch, app.keep_fragments);
        bail!("no fragments found at {}", app.base_url);
    }

    let written = store
        .assemble(report.count, &app.output)
        .await
        .with_context(|| format!("failed to assemble {}", app.output.display()));
    keep_or_drop(scratch, app.keep_fragments);
    let written = written?;

    info!(
        count = report.count,
        bytes = written,
        probes = report.probes,
        elapsed = ?report.progress.elapsed(),
        output = %app.output.display(),
        "done"
    );
    Ok(())
}

fn parent_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn keep_or_drop(scratch: tempfile::TempDir, keep: bool) {
    if keep {
        let path = scratch.keep();
        eprintln!("fragments kept in {}", path.display());
    }
}
