#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use assetforge::config::ConfigFile;
use assetforge::pipeline::{CollectingSink, ErrorSink};
use assetforge::server::ReloadHandle;
use assetforge::tasks::{register_all, BuildCx, TaskRegistry};

/// Build the full task table over `root` with a collecting error sink, so
/// tests can assert on notification behaviour.
pub fn project(root: &Path) -> (Arc<TaskRegistry>, Arc<CollectingSink>) {
    let errors = Arc::new(CollectingSink::new());
    let sink: Arc<dyn ErrorSink> = errors.clone();

    let cx = Arc::new(BuildCx {
        root: root.to_path_buf(),
        config: ConfigFile::default(),
        errors: sink,
        reload: ReloadHandle::new(),
    });

    let registry = register_all(cx).expect("task table should register");
    (Arc::new(registry), errors)
}

/// Write a file under `root`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("file path has a parent"))
        .expect("creating parent dirs");
    fs::write(&path, contents).expect("writing fixture file");
}
