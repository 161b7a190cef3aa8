//! Command implementations

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, warn};

use crate::app::AppContainer;
use crate::cli::args::{ProbeArgs, SessionArgs, TrimArgs};
use crate::domain::model::{SessionId, TrimRequest, UploadSource};
use crate::utils::format_duration;

/// Execute the trim command: upload, process and optionally archive
pub async fn trim(container: &dyn AppContainer, args: TrimArgs) -> Result<()> {
    let sources = args.files.iter().map(UploadSource::from_path).collect();
    let receipt = container.upload_interactor().upload(sources).await?;

    let request = TrimRequest::from_raw(
        receipt.session_id,
        receipt.files,
        args.start_cut.as_deref(),
        args.end_cut.as_deref(),
        args.name.as_deref(),
    );
    let report = container.batch_interactor().process(request).await?;

    let archive = if args.archive {
        Some(
            container
                .session_interactor()
                .create_archive(&report.session_id)
                .await?,
        )
    } else {
        None
    };

    print_json(&json!({
        "session_id": report.session_id,
        "processed": report.processed,
        "skipped": report.skipped,
        "archive": archive,
    }))
}

/// Execute the probe command
pub async fn probe(container: &dyn AppContainer, args: ProbeArgs) -> Result<()> {
    let duration = container.probe_port().probe_duration(&args.file).await?;

    print_json(&json!({
        "file": args.file,
        "duration": duration,
        "formatted": format_duration(std::time::Duration::from_secs_f64(duration)),
    }))
}

/// Execute the archive command
pub async fn archive(container: &dyn AppContainer, args: SessionArgs) -> Result<()> {
    let session_id: SessionId = args.session.parse()?;
    let archive = container
        .session_interactor()
        .create_archive(&session_id)
        .await?;
    print_json(&archive)
}

/// Execute the cleanup command
///
/// An id that is not a session id names nothing, so there is nothing to remove.
pub async fn cleanup(container: &dyn AppContainer, args: SessionArgs) -> Result<()> {
    let session_id = match SessionId::parse(&args.session) {
        Ok(session_id) => session_id,
        Err(_) => {
            warn!(session_id = %args.session, "Cleanup requested for malformed session id");
            return print_json(&json!({ "session_id": args.session, "removed": false }));
        }
    };

    container.session_interactor().cleanup(&session_id).await?;
    info!(session_id = %session_id, "Cleanup finished");
    print_json(&json!({ "session_id": session_id, "removed": true }))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}
