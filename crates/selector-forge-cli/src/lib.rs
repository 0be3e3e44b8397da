//! selector-forge CLI: turns vision-analysed UI elements into ranked automation selectors.

pub mod analysis;
pub mod capture;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod project;
pub mod repl;

pub use analysis::{parse_analysis_response, AnalysisReport, PageStructure};
pub use capture::{verify_screenshot, CaptureRecord, ScreenshotInfo};
pub use config::resolve_project_dir;
pub use error::{ForgeError, ForgeResult};
pub use pipeline::{ElementSelectorReport, ElementSelectors, SelectorPipeline};
pub use project::{url_to_page_name, PageEntry, ProjectStore};
