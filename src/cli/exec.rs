//! `run` and `stream` commands

use super::ExecArgs;
use crate::app::App;
use anyhow::{Context, Result};
use nser_tools::{RunResult, ToolEvent, ToolRunner};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Cancel `token` on the first Ctrl-C
fn cancel_on_ctrl_c(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping tool");
            token.cancel();
        }
    });
}

/// Print the command line `args` would run
fn print_preview(runner: &ToolRunner, args: &ExecArgs) -> Result<()> {
    let command_line = runner
        .preview(args.to_request())
        .with_context(|| format!("Cannot run {}", args.tool))?;
    println!("{command_line}");
    Ok(())
}

/// Shown when the display fell behind the tool's output
fn lag_notice(run_id: i64, skipped: u64) -> String {
    format!("⚠️  {skipped} line(s) not shown; full output: nser output {run_id}")
}

pub async fn run(app: &App, args: &ExecArgs) -> Result<()> {
    let store = app.open_store().await?;
    let runner = app.runner(store);
    if args.dry_run {
        return print_preview(&runner, args);
    }

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(&cancel);

    let result = runner
        .run(args.to_request(), &cancel)
        .await
        .with_context(|| format!("Failed to run {}", args.tool))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", result.output);
        if !result.output.is_empty() && !result.output.ends_with('\n') {
            println!();
        }
        print_summary(&result);
    }

    finish(&result)
}

pub async fn stream(app: &App, args: &ExecArgs) -> Result<()> {
    let store = app.open_store().await?;
    let runner = app.runner(store);
    if args.dry_run {
        return print_preview(&runner, args);
    }

    // Subscribe before starting so no line is missed
    let mut events = app.bus.subscribe();

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(&cancel);

    let start = runner
        .run_streaming(args.to_request(), &cancel)
        .await
        .with_context(|| format!("Failed to start {}", args.tool))?;
    eprintln!("run #{}: {}", start.run_id, start.command_line);

    let mut skipped_total = 0u64;
    let result = loop {
        match events.recv().await {
            Ok(event) if event.run_id() != start.run_id => {}
            Ok(ToolEvent::Output { line, .. }) => {
                if !args.json {
                    println!("{line}");
                }
            }
            Ok(ToolEvent::Done(result)) => break result,
            Err(RecvError::Lagged(skipped)) => {
                warn!(run_id = start.run_id, skipped, "Output display fell behind");
                skipped_total += skipped;
                if !args.json {
                    eprintln!("{}", lag_notice(start.run_id, skipped));
                }
            }
            Err(RecvError::Closed) => anyhow::bail!("event bus closed before run finished"),
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
        if skipped_total > 0 {
            eprintln!("{}", lag_notice(result.run_id, skipped_total));
        }
    }

    finish(&result)
}

fn print_summary(result: &RunResult) {
    eprintln!(
        "run #{} {} (exit {}, {} ms)",
        result.run_id, result.status, result.exit_code, result.duration_ms
    );
}

fn finish(result: &RunResult) -> Result<()> {
    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
