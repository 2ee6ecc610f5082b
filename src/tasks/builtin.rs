// src/tasks/builtin.rs

//! The standard task table.
//!
//! This is the declarative heart of the tool: one registration per
//! invocable task, built against a shared [`BuildCx`]. Pipelines are
//! constructed once here and re-run on every invocation, so a
//! watch-triggered rebuild pays only for the work itself.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::{AssetKind, ConfigFile};
use crate::errors::RegistryError;
use crate::pipeline::{ChangeSink, ErrorSink, Pipeline, Stage};
use crate::server::{self, ReloadHandle};
use crate::stages::{
    IncludeResolve, MinifyCss, MinifyJs, Rename, ScssCompile, SourceMap, StripComments,
};
use crate::tasks::registry::TaskRegistry;
use crate::watch::{self, WatchBinding};

/// Capacity of the watch trigger channel.
const WATCH_CHANNEL_CAPACITY: usize = 64;

/// Everything the task actions share: the project root, the immutable
/// configuration, and the two cross-cutting sinks.
pub struct BuildCx {
    pub root: PathBuf,
    pub config: ConfigFile,
    pub errors: Arc<dyn ErrorSink>,
    pub reload: ReloadHandle,
}

impl BuildCx {
    /// The reload sink for pipelines, gated on `[server].notify`.
    fn change_sink(&self) -> Option<Arc<dyn ChangeSink>> {
        if self.config.server.notify {
            Some(Arc::new(self.reload.clone()))
        } else {
            None
        }
    }
}

/// Register the full task table and validate it.
pub fn register_all(cx: Arc<BuildCx>) -> Result<TaskRegistry, RegistryError> {
    let mut reg = TaskRegistry::new();

    register_clean(&mut reg, &cx)?;

    register_pipeline(&mut reg, "html:build", html_build(&cx))?;
    register_pipeline(&mut reg, "css:build", css_pipeline(&cx, "css:build", true))?;
    register_pipeline(&mut reg, "js:build", js_pipeline(&cx, "js:build", true))?;
    register_pipeline(&mut reg, "css:final", css_pipeline(&cx, "css:final", false))?;
    register_pipeline(&mut reg, "js:final", js_pipeline(&cx, "js:final", false))?;
    register_pipeline(
        &mut reg,
        "fonts:build",
        copy_pipeline(&cx, "fonts:build", AssetKind::Fonts),
    )?;
    register_pipeline(
        &mut reg,
        "image:build",
        copy_pipeline(&cx, "image:build", AssetKind::Img),
    )?;

    register_webserver(&mut reg, &cx)?;
    register_watch(&mut reg, &cx)?;

    reg.register_sequence(
        "build",
        &[
            "clean",
            "html:build",
            "css:build",
            "js:build",
            "fonts:build",
            "image:build",
        ],
    )?;
    reg.register_sequence(
        "prod",
        &[
            "clean",
            "html:build",
            "css:final",
            "js:final",
            "fonts:build",
            "image:build",
        ],
    )?;
    reg.register_sequence("default", &["clean", "build", "webserver", "watch"])?;

    reg.validate()?;
    Ok(reg)
}

/// `clean` recursively deletes the entire build output root.
///
/// This is an irreversible, unprompted deletion; every build sequence
/// starts with it. A missing root counts as already clean.
fn register_clean(reg: &mut TaskRegistry, cx: &Arc<BuildCx>) -> Result<(), RegistryError> {
    let cx = Arc::clone(cx);
    reg.register("clean", &[], move |_registry| {
        let cx = Arc::clone(&cx);
        Box::pin(async move {
            let target = cx.root.join(&cx.config.paths.clean);
            match tokio::fs::remove_dir_all(&target).await {
                Ok(()) => {
                    info!(path = %target.display(), "removed build output root");
                    Ok(())
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err).with_context(|| format!("removing {:?}", target)),
            }
        })
    })
}

fn register_pipeline(
    reg: &mut TaskRegistry,
    name: &str,
    pipeline: Pipeline,
) -> Result<(), RegistryError> {
    let pipeline = Arc::new(pipeline);
    reg.register(name, &[], move |_registry| {
        let pipeline = Arc::clone(&pipeline);
        Box::pin(async move {
            pipeline.run().await?;
            Ok(())
        })
    })
}

/// `webserver` binds the dev server and completes once it is listening;
/// the server itself keeps running in the background.
fn register_webserver(reg: &mut TaskRegistry, cx: &Arc<BuildCx>) -> Result<(), RegistryError> {
    let cx = Arc::clone(cx);
    reg.register("webserver", &[], move |_registry| {
        let cx = Arc::clone(&cx);
        Box::pin(async move {
            server::start(&cx.config.server, cx.reload.clone(), &cx.root).await?;
            Ok(())
        })
    })
}

/// `watch` starts the filesystem watcher and dispatch loop. It never
/// completes on its own; a sequence ending in `watch` keeps the process
/// alive until interrupted.
fn register_watch(reg: &mut TaskRegistry, cx: &Arc<BuildCx>) -> Result<(), RegistryError> {
    let cx = Arc::clone(cx);
    reg.register("watch", &[], move |registry| {
        let cx = Arc::clone(&cx);
        Box::pin(async move {
            let compiled = watch::compile_bindings(&watch_bindings(&cx.config))?;
            let (events_tx, events_rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
            let _watcher = watch::spawn_watcher(cx.root.clone(), compiled, events_tx)?;
            watch::dispatch_loop(registry, events_rx).await;
            Ok(())
        })
    })
}

/// One binding per category: the broad watch glob mapped to the build
/// task that re-reads the (possibly narrower) source glob.
pub fn watch_bindings(config: &ConfigFile) -> Vec<WatchBinding> {
    AssetKind::ALL
        .iter()
        .map(|kind| {
            WatchBinding::new(
                kind.build_task(),
                config.paths.category(*kind).watch.as_str(),
            )
        })
        .collect()
}

fn maybe_notify(cx: &BuildCx, pipeline: Pipeline) -> Pipeline {
    match cx.change_sink() {
        Some(sink) => pipeline.notify(sink),
        None => pipeline,
    }
}

fn html_build(cx: &Arc<BuildCx>) -> Pipeline {
    let paths = &cx.config.paths.html;
    let pipeline = Pipeline::new(
        "html:build",
        &cx.root,
        paths.src.as_str(),
        Arc::clone(&cx.errors),
    )
    .stage(IncludeResolve)
    .branch(Vec::new(), &paths.dest);

    maybe_notify(cx, pipeline)
}

/// Compile once, then branch: the plain artifact (with a source map in dev
/// builds) and the `.min` artifact share the SCSS compile.
fn css_pipeline(cx: &Arc<BuildCx>, label: &str, sourcemaps: bool) -> Pipeline {
    let paths = &cx.config.paths.css;

    let plain: Vec<Box<dyn Stage>> = if sourcemaps {
        vec![Box::new(SourceMap)]
    } else {
        Vec::new()
    };
    let minified: Vec<Box<dyn Stage>> =
        vec![Box::new(MinifyCss), Box::new(Rename::suffix(".min"))];

    let pipeline = Pipeline::new(label, &cx.root, paths.src.as_str(), Arc::clone(&cx.errors))
        .stage(ScssCompile)
        .stage(StripComments)
        .branch(plain, &paths.dest)
        .branch(minified, &paths.dest);

    maybe_notify(cx, pipeline)
}

fn js_pipeline(cx: &Arc<BuildCx>, label: &str, sourcemaps: bool) -> Pipeline {
    let paths = &cx.config.paths.js;

    let plain: Vec<Box<dyn Stage>> = if sourcemaps {
        vec![Box::new(SourceMap)]
    } else {
        Vec::new()
    };
    let minified: Vec<Box<dyn Stage>> =
        vec![Box::new(MinifyJs), Box::new(Rename::suffix(".min"))];

    let pipeline = Pipeline::new(label, &cx.root, paths.src.as_str(), Arc::clone(&cx.errors))
        .stage(IncludeResolve)
        .branch(plain, &paths.dest)
        .branch(minified, &paths.dest);

    maybe_notify(cx, pipeline)
}

/// Fonts and images move to the build tree unchanged.
fn copy_pipeline(cx: &Arc<BuildCx>, label: &str, kind: AssetKind) -> Pipeline {
    let paths = cx.config.paths.category(kind);
    Pipeline::new(label, &cx.root, paths.src.as_str(), Arc::clone(&cx.errors))
        .branch(Vec::new(), &paths.dest)
}
