//! `history`, `output` and `reap` commands

use crate::app::App;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};

pub async fn list(app: &App, workspace: i64, limit: i64, offset: i64) -> Result<()> {
    let store = app.open_store().await?;
    let runs = store
        .list_runs_by_workspace(workspace, limit, offset)
        .await
        .context("Failed to list runs")?;

    if runs.is_empty() {
        println!("No runs recorded for workspace {workspace}");
        return Ok(());
    }

    for run in runs {
        println!(
            "#{:<6} {:<10} {:<5} {} {}",
            run.id,
            run.status.as_str(),
            run.exit_code,
            run.started_at.format("%Y-%m-%d %H:%M:%S"),
            run.command_line
        );
    }
    Ok(())
}

pub async fn output(app: &App, run_id: i64) -> Result<()> {
    let store = app.open_store().await?;
    let output = store
        .get_run_output(run_id)
        .await
        .with_context(|| format!("Failed to read output of run {run_id}"))?;
    print!("{output}");
    Ok(())
}

pub async fn reap(app: &App, older_than_secs: i64) -> Result<()> {
    let store = app.open_store().await?;
    let cutoff = Utc::now() - Duration::seconds(older_than_secs.max(0));
    let reaped = store
        .abandon_stale_runs(cutoff)
        .await
        .context("Failed to reap stale runs")?;
    println!("Marked {reaped} stale run(s) as failed");
    Ok(())
}
