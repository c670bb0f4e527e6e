// crates/runtime_net/src/lib.rs
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

use bus::{LoadCommand, ResourceRequest};
use core_types::ResourceKind;
use net::{Fetch, FetchResponse};

/// Start the loader thread. Each request is fetched on its own thread and reported through
/// its completion; the loader stops on `Shutdown` or once every sender is gone.
pub fn start_resource_runtime(fetcher: Arc<dyn Fetch>) -> Sender<LoadCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoadCommand>();

    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                LoadCommand::Load { request, done } => {
                    let fetcher = Arc::clone(&fetcher);
                    thread::spawn(move || match load(fetcher.as_ref(), &request) {
                        Ok(()) => done.loaded(),
                        Err(error) => done.failed(error),
                    });
                }
                LoadCommand::Shutdown => break,
            }
        }
        log::debug!(target: "runtime_net", "resource runtime stopped");
    });

    cmd_tx
}

/// Fetch one resource and check it is usable for what it was requested as.
///
/// A video counts as loaded once its response starts; the stream itself is never read.
pub fn load(fetcher: &dyn Fetch, request: &ResourceRequest) -> Result<(), String> {
    let resp = match request.kind {
        ResourceKind::Video => fetcher.fetch_head(&request.url),
        _ => fetcher.fetch(&request.url),
    }
    .map_err(|e| e.to_string())?;
    log::trace!(
        target: "runtime_net",
        "{:?} {} -> {} ({} bytes, {} ms)",
        request.kind,
        resp.requested_url,
        resp.status,
        resp.body.len(),
        resp.duration_ms
    );
    validate(request, &resp)
}

fn validate(request: &ResourceRequest, resp: &FetchResponse) -> Result<(), String> {
    if !resp.is_success() {
        return Err(format!("HTTP {} for {}", resp.status, resp.url));
    }
    if request.kind.is_raster() {
        image::load_from_memory(&resp.body)
            .map_err(|e| format!("could not decode image {}: {e}", resp.url))?;
    }
    Ok(())
}
