// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from `Assetforge.toml`.
///
/// ```toml
/// [server]
/// port = 9000
/// open = false
///
/// [paths]
/// clean = "build"
///
/// [paths.css]
/// src = "src/style/main.scss"
/// dest = "build/css/"
/// watch = "src/style/**/*.scss"
/// ```
///
/// All sections are optional; the defaults reproduce the standard project
/// layout (sources under `src/`, output under `build/`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Dev server parameters from `[server]`.
    pub server: ServerSection,

    /// Source/build/watch path roles from `[paths]` and `[paths.<category>]`.
    pub paths: PathsSection,
}

/// `[server]` section: where and how the dev server runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Directory served over HTTP, relative to the project root.
    pub root: String,
    pub host: String,
    pub port: u16,
    /// Open the default browser once the server is bound.
    pub open: bool,
    /// Push live-reload notifications to connected browsers after builds.
    pub notify: bool,
    /// Display name used as the log prefix for server and error output.
    pub log_prefix: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            root: "build".to_string(),
            host: "localhost".to_string(),
            port: 9000,
            open: true,
            notify: false,
            log_prefix: "assetforge".to_string(),
        }
    }
}

/// The five asset categories the build knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AssetKind {
    Html,
    Js,
    Css,
    Img,
    Fonts,
}

impl AssetKind {
    pub const ALL: [AssetKind; 5] = [
        AssetKind::Html,
        AssetKind::Js,
        AssetKind::Css,
        AssetKind::Img,
        AssetKind::Fonts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AssetKind::Html => "html",
            AssetKind::Js => "js",
            AssetKind::Css => "css",
            AssetKind::Img => "img",
            AssetKind::Fonts => "fonts",
        }
    }

    /// Name of the build task bound to this category (e.g. `css:build`).
    pub fn build_task(self) -> &'static str {
        match self {
            AssetKind::Html => "html:build",
            AssetKind::Js => "js:build",
            AssetKind::Css => "css:build",
            AssetKind::Img => "image:build",
            AssetKind::Fonts => "fonts:build",
        }
    }
}

/// Path roles for one asset category.
///
/// `watch` is intentionally allowed to be broader than `src`: partials and
/// include files that never produce output themselves still need to trigger
/// a rebuild of the files that reference them.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPaths {
    /// Glob selecting the files to read.
    pub src: String,
    /// Directory the final output lands in, relative to the project root.
    pub dest: String,
    /// Glob whose matches trigger a rebuild of this category.
    pub watch: String,
}

/// `[paths]` section: the full path table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Build output root removed by the `clean` task.
    pub clean: String,

    pub html: CategoryPaths,
    pub js: CategoryPaths,
    pub css: CategoryPaths,
    pub img: CategoryPaths,
    pub fonts: CategoryPaths,
}

impl PathsSection {
    pub fn category(&self, kind: AssetKind) -> &CategoryPaths {
        match kind {
            AssetKind::Html => &self.html,
            AssetKind::Js => &self.js,
            AssetKind::Css => &self.css,
            AssetKind::Img => &self.img,
            AssetKind::Fonts => &self.fonts,
        }
    }
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            clean: "build".to_string(),
            html: CategoryPaths {
                src: "src/*.{htm,html}".to_string(),
                dest: "build/".to_string(),
                watch: "src/**/*.{htm,html}".to_string(),
            },
            js: CategoryPaths {
                src: "src/js/*.js".to_string(),
                dest: "build/js/".to_string(),
                watch: "src/js/**/*.js".to_string(),
            },
            css: CategoryPaths {
                src: "src/style/main.scss".to_string(),
                dest: "build/css/".to_string(),
                watch: "src/style/**/*.scss".to_string(),
            },
            img: CategoryPaths {
                src: "src/img/**/*.*".to_string(),
                dest: "build/img/".to_string(),
                watch: "src/img/**/*.*".to_string(),
            },
            fonts: CategoryPaths {
                src: "src/fonts/**/*.*".to_string(),
                dest: "build/fonts/".to_string(),
                watch: "src/fonts/**/*.*".to_string(),
            },
        }
    }
}
