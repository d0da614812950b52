//! Driver and browser discovery
//!
//! Drivers are looked up in priority order; for each driver found, its candidate
//! browsers are looked up in order. The search path is the current directory
//! followed by every entry of `PATH`.

use crate::config::DriverEntry;
use crate::{Result, TrawlError};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Browsers the crawler knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chromium,
    Chrome,
}

impl BrowserKind {
    /// Executable names searched for this browser, in order
    pub fn executable_names(&self) -> &'static [&'static str] {
        match self {
            Self::Chromium => &["chromium", "chromium-browser"],
            Self::Chrome => &["chrome", "google-chrome", "google-chrome-stable"],
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chromium => write!(f, "chromium"),
            Self::Chrome => write!(f, "chrome"),
        }
    }
}

/// A working driver and browser pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub driver_path: PathBuf,
    pub browser_path: PathBuf,
    pub kind: BrowserKind,
}

/// Locates executables on a search path
#[derive(Debug, Clone)]
pub struct Discovery {
    search_path: OsString,
    cwd: PathBuf,
}

impl Discovery {
    /// Searches the current directory, then `PATH`
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let mut dirs = vec![cwd.clone()];
        if let Some(path) = std::env::var_os("PATH") {
            dirs.extend(std::env::split_paths(&path));
        }
        Self::with_search_path(cwd, dirs)
    }

    /// Searches exactly the given directories, in order
    pub fn with_search_path(
        cwd: impl Into<PathBuf>,
        dirs: impl IntoIterator<Item = impl AsRef<Path>>,
    ) -> Result<Self> {
        let search_path = std::env::join_paths(dirs.into_iter().map(|d| d.as_ref().to_path_buf()))
            .map_err(|e| TrawlError::NoBrowserFound {
                searched: format!("invalid search path: {}", e),
            })?;
        Ok(Self {
            search_path,
            cwd: cwd.into(),
        })
    }

    /// Finds an executable by name, adding the platform suffix
    pub fn find_executable(&self, name: &str) -> Option<PathBuf> {
        which::which_in(name, Some(&self.search_path), &self.cwd).ok()
    }

    /// Finds the first working driver and browser pair
    ///
    /// # Arguments
    ///
    /// * `drivers` - Driver identifiers in priority order, each with its
    ///   candidate browsers in priority order
    ///
    /// # Returns
    ///
    /// * `Ok(Installation)` - The first pair found
    /// * `Err(TrawlError::NoBrowserFound)` - Nothing on the search path matched
    pub fn discover(&self, drivers: &[DriverEntry]) -> Result<Installation> {
        let mut searched = Vec::new();

        for entry in drivers {
            searched.push(entry.driver.clone());
            let Some(driver_path) = self.find_executable(&entry.driver) else {
                tracing::debug!("Driver {} not found", entry.driver);
                continue;
            };

            for kind in &entry.browsers {
                for name in kind.executable_names() {
                    searched.push(name.to_string());
                    if let Some(browser_path) = self.find_executable(name) {
                        tracing::info!(
                            "Using {} at {} with driver {}",
                            kind,
                            browser_path.display(),
                            driver_path.display()
                        );
                        return Ok(Installation {
                            driver_path,
                            browser_path,
                            kind: *kind,
                        });
                    }
                }
            }
        }

        Err(TrawlError::NoBrowserFound {
            searched: searched.join(", "),
        })
    }
}
