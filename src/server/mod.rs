// src/server/mod.rs

//! The development web server.
//!
//! Serves the build output root over HTTP and pushes live-reload
//! notifications to connected browsers via a server-sent-events stream at
//! `/__reload`. The rest of the system only sees [`ReloadHandle`], which
//! implements [`ChangeSink`]: pipelines report written files into it and
//! whatever browsers are subscribed at that moment get an event. Nobody
//! listening is fine.
//!
//! Binding failures (port already in use, bad host) are startup errors;
//! once bound, the server runs until process exit.

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures_util::stream::{self, Stream};
use tokio::process::Command;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use warp::Filter;

use crate::config::ServerSection;
use crate::pipeline::ChangeSink;

/// Capacity of the reload broadcast channel; a lagging browser just skips
/// intermediate reload events.
const RELOAD_CHANNEL_CAPACITY: usize = 16;

/// Sender half of the live-reload channel.
///
/// Created once at startup and shared with the pipelines (as their
/// [`ChangeSink`]) and the server (which subscribes browsers to it). This
/// means build tasks can notify before the server has started, or without
/// it ever starting; the events simply go nowhere.
#[derive(Clone)]
pub struct ReloadHandle {
    tx: broadcast::Sender<String>,
}

impl ReloadHandle {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(RELOAD_CHANNEL_CAPACITY);
        Self { tx }
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for ReloadHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeSink for ReloadHandle {
    fn files_changed(&self, paths: &[PathBuf]) {
        let msg = paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(",");

        if self.tx.send(msg).is_err() {
            // Browsers come and go; no subscriber is not an error.
            debug!("no live-reload subscribers");
        }
    }
}

/// A running dev server.
pub struct ServerHandle {
    pub addr: SocketAddr,
}

/// Bind the dev server and serve `cfg.root` (relative to the project
/// root). Returns once bound; the server itself keeps running in the
/// background until process exit.
pub async fn start(
    cfg: &ServerSection,
    reload: ReloadHandle,
    project_root: &Path,
) -> Result<ServerHandle> {
    let serve_root = project_root.join(&cfg.root);

    let static_files = warp::fs::dir(serve_root.clone());
    let reload_route = warp::path("__reload").and(warp::get()).map(move || {
        let rx = reload.subscribe();
        warp::sse::reply(warp::sse::keep_alive().stream(reload_stream(rx)))
    });
    let routes = reload_route.or(static_files);

    let addr = bind_addr(cfg)?;
    let (bound, server) = warp::serve(routes)
        .try_bind_ephemeral(addr)
        .with_context(|| format!("binding dev server to {addr}"))?;

    tokio::spawn(server);

    info!(
        addr = %bound,
        root = %serve_root.display(),
        prefix = %cfg.log_prefix,
        "dev server listening"
    );

    if cfg.open {
        open_browser(&format!("http://{bound}/"));
    }

    Ok(ServerHandle { addr: bound })
}

fn bind_addr(cfg: &ServerSection) -> Result<SocketAddr> {
    let ip: IpAddr = if cfg.host == "localhost" {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    } else {
        cfg.host
            .parse()
            .with_context(|| format!("invalid [server].host: {}", cfg.host))?
    };
    Ok(SocketAddr::new(ip, cfg.port))
}

/// Adapt a broadcast receiver into an SSE event stream, skipping over lag.
fn reload_stream(
    rx: broadcast::Receiver<String>,
) -> impl Stream<Item = Result<warp::sse::Event, Infallible>> {
    stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    let event = warp::sse::Event::default().event("reload").data(msg);
                    return Some((Ok(event), rx));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "reload stream lagged; continuing");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}

/// Best-effort browser launch; failure is logged, never fatal.
fn open_browser(url: &str) {
    let spawned = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(windows) {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match spawned {
        Ok(_child) => debug!(url, "opened browser"),
        Err(err) => warn!(url, error = %err, "could not open browser"),
    }
}
