mod common;

use std::error::Error;
use std::fs;

use common::{project, write_file};

type TestResult = Result<(), Box<dyn Error>>;

fn seed_site(root: &std::path::Path) {
    write_file(root, "src/index.html", "<html><body>hi</body></html>\n");
    write_file(root, "src/style/main.scss", "body { margin: 0; }\n");
    write_file(root, "src/js/app.js", "function main() { return 1; }\nmain();\n");
}

/// Production run on a clean checkout: both artifact variants per unit,
/// no source maps anywhere in the tree.
#[tokio::test]
async fn prod_produces_min_variants_and_no_maps() -> TestResult {
    let dir = tempfile::tempdir()?;
    seed_site(dir.path());

    let (registry, errors) = project(dir.path());
    registry.run("prod").await?;
    assert!(errors.is_empty());

    for expected in [
        "build/index.html",
        "build/css/main.css",
        "build/css/main.min.css",
        "build/js/app.js",
        "build/js/app.min.js",
    ] {
        assert!(
            dir.path().join(expected).is_file(),
            "missing artifact {expected}"
        );
    }

    for entry in walkdir::WalkDir::new(dir.path().join("build"))
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        assert!(!name.ends_with(".map"), "unexpected source map {name}");
    }

    let plain = fs::read_to_string(dir.path().join("build/css/main.css"))?;
    assert!(!plain.contains("sourceMappingURL"));
    Ok(())
}

#[tokio::test]
async fn dev_build_sequence_carries_source_maps() -> TestResult {
    let dir = tempfile::tempdir()?;
    seed_site(dir.path());

    let (registry, errors) = project(dir.path());
    registry.run("build").await?;
    assert!(errors.is_empty());

    assert!(dir.path().join("build/css/main.css.map").is_file());
    assert!(dir.path().join("build/js/app.js.map").is_file());
    Ok(())
}

/// `clean` leaves the destination root with zero entries (it removes the
/// directory itself), so every sequence starts from nothing.
#[tokio::test]
async fn clean_empties_the_destination_root() -> TestResult {
    let dir = tempfile::tempdir()?;
    seed_site(dir.path());

    let (registry, _errors) = project(dir.path());
    registry.run("build").await?;
    assert!(dir.path().join("build").exists());

    registry.run("clean").await?;
    assert!(!dir.path().join("build").exists());

    // Cleaning an already-clean tree succeeds too.
    registry.run("clean").await?;
    Ok(())
}

/// Re-running a full sequence after `clean` finds no stale artifacts from
/// the previous run.
#[tokio::test]
async fn prod_after_build_leaves_no_dev_leftovers() -> TestResult {
    let dir = tempfile::tempdir()?;
    seed_site(dir.path());

    let (registry, _errors) = project(dir.path());
    registry.run("build").await?;
    assert!(dir.path().join("build/css/main.css.map").is_file());

    registry.run("prod").await?;
    assert!(!dir.path().join("build/css/main.css.map").exists());
    Ok(())
}
