//! File-based project layout: page map, per-page folders, and JSON snapshots.
//!
//! ```text
//! <root>/data/page_map.json
//! <root>/Test_Pages/<page>/<page>_elements.json
//! <root>/Test_Pages/<page>/<page>_selectors.json
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisReport;
use crate::capture::CaptureRecord;
use crate::config::{DATA_DIR, PAGES_DIR};
use crate::error::{ForgeError, ForgeResult};
use crate::pipeline::ElementSelectorReport;

const PAGE_MAP_FILE: &str = "page_map.json";

/// Status recorded when a page is first added.
pub const STATUS_CAPTURED: &str = "captured";

/// One tracked page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    pub page_name: String,
    pub screenshot_path: Option<String>,
    pub discovered_at: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PageMap {
    #[serde(default)]
    pages: BTreeMap<String, PageEntry>,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    last_updated: Option<String>,
}

/// Derive a page folder name from a URL path.
///
/// `https://site.test/account/sign-up?x=1` becomes `account_sign_up`; an empty
/// path becomes `homepage`.
pub fn url_to_page_name(page_url: &str) -> ForgeResult<String> {
    let parsed = url::Url::parse(page_url)?;
    let name = parsed
        .path()
        .trim_matches('/')
        .replace(['/', '-'], "_");

    Ok(if name.is_empty() { "homepage".to_string() } else { name })
}

/// Reads and writes the project layout under a root directory.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    /// Open the project at `root`, creating the page map if missing.
    pub fn open(root: impl AsRef<Path>) -> ForgeResult<Self> {
        let store = Self {
            root: root.as_ref().to_path_buf(),
        };

        std::fs::create_dir_all(store.root.join(DATA_DIR))?;
        if !store.page_map_path().exists() {
            tracing::info!("Creating page map: {}", store.page_map_path().display());
            store.save_page_map(&PageMap {
                created_at: now(),
                ..PageMap::default()
            })?;
        }

        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn page_map_path(&self) -> PathBuf {
        self.root.join(DATA_DIR).join(PAGE_MAP_FILE)
    }

    pub fn page_dir(&self, page_name: &str) -> PathBuf {
        self.root.join(PAGES_DIR).join(page_name)
    }

    pub fn elements_path(&self, page_name: &str) -> PathBuf {
        self.page_dir(page_name).join(format!("{page_name}_elements.json"))
    }

    pub fn selectors_path(&self, page_name: &str) -> PathBuf {
        self.page_dir(page_name).join(format!("{page_name}_selectors.json"))
    }

    /// Track a captured page and create its folder. Returns the page name.
    pub fn add_page(&self, page_url: &str, capture: &CaptureRecord) -> ForgeResult<String> {
        let page_name = url_to_page_name(page_url)?;
        let mut map = self.load_page_map();
        let timestamp = now();

        map.pages.insert(
            page_url.to_string(),
            PageEntry {
                page_name: page_name.clone(),
                screenshot_path: Some(capture.screenshot_path.clone()),
                discovered_at: timestamp.clone(),
                status: STATUS_CAPTURED.to_string(),
            },
        );
        map.last_updated = Some(timestamp);
        self.save_page_map(&map)?;

        self.create_page_folder(&page_name)?;
        tracing::info!("Tracking page {page_url} as {page_name}");
        Ok(page_name)
    }

    pub fn get_page(&self, page_url: &str) -> Option<PageEntry> {
        self.load_page_map().pages.remove(page_url)
    }

    pub fn list_pages(&self) -> BTreeMap<String, PageEntry> {
        self.load_page_map().pages
    }

    /// Update a tracked page's status. Unknown URLs are left untouched.
    pub fn update_status(&self, page_url: &str, status: &str) -> ForgeResult<bool> {
        let mut map = self.load_page_map();
        let Some(entry) = map.pages.get_mut(page_url) else {
            return Ok(false);
        };
        entry.status = status.to_string();
        map.last_updated = Some(now());
        self.save_page_map(&map)?;
        Ok(true)
    }

    pub fn save_analysis(&self, page_name: &str, report: &AnalysisReport) -> ForgeResult<PathBuf> {
        let path = self.elements_path(page_name);
        self.write_snapshot(&path, report)?;
        Ok(path)
    }

    pub fn save_selectors(&self, page_name: &str, report: &ElementSelectorReport) -> ForgeResult<PathBuf> {
        let path = self.selectors_path(page_name);
        self.write_snapshot(&path, report)?;
        tracing::info!("Selectors saved to: {}", path.display());
        Ok(path)
    }

    fn create_page_folder(&self, page_name: &str) -> ForgeResult<()> {
        std::fs::create_dir_all(self.page_dir(page_name))?;
        for path in [self.elements_path(page_name), self.selectors_path(page_name)] {
            if !path.exists() {
                std::fs::File::create(&path)?;
            }
        }
        Ok(())
    }

    fn write_snapshot<T: Serialize>(&self, path: &Path, value: &T) -> ForgeResult<()> {
        let Some(parent) = path.parent() else {
            return Err(ForgeError::Project(format!("No parent for {}", path.display())));
        };
        std::fs::create_dir_all(parent)?;
        std::fs::write(path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    /// Missing or corrupt page maps read as empty.
    fn load_page_map(&self) -> PageMap {
        let path = self.page_map_path();
        let parsed = std::fs::read_to_string(&path)
            .map_err(ForgeError::from)
            .and_then(|s| serde_json::from_str(&s).map_err(ForgeError::from));
        match parsed {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("Unreadable page map {}: {e}", path.display());
                PageMap::default()
            }
        }
    }

    fn save_page_map(&self, map: &PageMap) -> ForgeResult<()> {
        self.write_snapshot(&self.page_map_path(), map)
    }
}

fn now() -> String {
    chrono::Local::now().to_rfc3339()
}
