use paper_trawl::browser::{BrowserKind, Discovery};
use paper_trawl::config::DriverEntry;
use paper_trawl::TrawlError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates an executable file named `name` in `dir`
fn install(dir: &Path, name: &str) -> PathBuf {
    let file_name = format!("{}{}", name, std::env::consts::EXE_SUFFIX);
    let path = dir.join(file_name);
    std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    path
}

fn chromedriver(browsers: Vec<BrowserKind>) -> Vec<DriverEntry> {
    vec![DriverEntry {
        driver: "chromedriver".to_string(),
        browsers,
    }]
}

#[test]
fn test_first_available_browser_wins() {
    let dir = TempDir::new().unwrap();
    let driver = install(dir.path(), "chromedriver");
    let chrome = install(dir.path(), "google-chrome");

    let discovery = Discovery::with_search_path(dir.path(), [dir.path()]).unwrap();
    let installation = discovery
        .discover(&chromedriver(vec![BrowserKind::Chromium, BrowserKind::Chrome]))
        .unwrap();

    assert_eq!(installation.kind, BrowserKind::Chrome);
    assert_eq!(installation.driver_path, driver);
    assert_eq!(installation.browser_path, chrome);
}

#[test]
fn test_browser_priority_follows_config_order() {
    let dir = TempDir::new().unwrap();
    install(dir.path(), "chromedriver");
    install(dir.path(), "chromium");
    install(dir.path(), "chrome");

    let discovery = Discovery::with_search_path(dir.path(), [dir.path()]).unwrap();
    let installation = discovery
        .discover(&chromedriver(vec![BrowserKind::Chrome, BrowserKind::Chromium]))
        .unwrap();
    assert_eq!(installation.kind, BrowserKind::Chrome);
}

#[test]
fn test_search_path_order() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    install(second.path(), "chromedriver");
    let preferred = install(first.path(), "chromium");
    install(second.path(), "chromium");

    let discovery =
        Discovery::with_search_path(first.path(), [first.path(), second.path()]).unwrap();
    let installation = discovery
        .discover(&chromedriver(vec![BrowserKind::Chromium]))
        .unwrap();
    assert_eq!(installation.browser_path, preferred);
}

#[test]
fn test_driver_without_browser_falls_through() {
    let dir = TempDir::new().unwrap();
    install(dir.path(), "chromedriver");
    install(dir.path(), "otherdriver");
    install(dir.path(), "chromium");

    let drivers = vec![
        DriverEntry {
            driver: "chromedriver".to_string(),
            browsers: vec![BrowserKind::Chrome],
        },
        DriverEntry {
            driver: "otherdriver".to_string(),
            browsers: vec![BrowserKind::Chromium],
        },
    ];

    let discovery = Discovery::with_search_path(dir.path(), [dir.path()]).unwrap();
    let installation = discovery.discover(&drivers).unwrap();
    assert_eq!(installation.kind, BrowserKind::Chromium);
    assert!(installation.driver_path.ends_with(format!(
        "otherdriver{}",
        std::env::consts::EXE_SUFFIX
    )));
}

#[test]
fn test_no_browser_found() {
    let dir = TempDir::new().unwrap();
    install(dir.path(), "chromedriver");

    let discovery = Discovery::with_search_path(dir.path(), [dir.path()]).unwrap();
    let result = discovery.discover(&chromedriver(vec![BrowserKind::Chromium]));
    match result {
        Err(TrawlError::NoBrowserFound { searched }) => {
            assert!(searched.contains("chromium-browser"));
        }
        other => panic!("expected NoBrowserFound, got {:?}", other),
    }
}
