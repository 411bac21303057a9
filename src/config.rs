use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::constants::DEFAULT_LOG_LINES;
use crate::desktop::{BlogConfig, ContentSource, DirSource, EmbeddedSource};
use crate::window::WindowMetrics;

pub const WHATS_NEW_DOC: &str = "Whats_New.md";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "term-desk",
    version = env!("CARGO_PKG_VERSION"),
    about = "A desktop of draggable, resizable windows in the terminal"
)]
pub struct Cli {
    /// Read blog documents from this directory instead of the built-in demo content.
    #[arg(long = "content-dir", value_name = "DIR")]
    pub content_dir: Option<PathBuf>,

    /// Do not maximize a window when its title bar is dragged to the top edge.
    #[arg(long = "no-edge-maximize")]
    pub no_edge_maximize: bool,

    /// How often the desktop wakes up to poll content and the clock.
    #[arg(long = "tick-ms", value_name = "MILLIS", default_value_t = 50)]
    pub tick_ms: u64,

    /// Lines kept by the in-memory log shown in the log window.
    #[arg(long = "log-lines", value_name = "LINES", default_value_t = DEFAULT_LOG_LINES)]
    pub log_lines: usize,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            content_dir: None,
            no_edge_maximize: false,
            tick_ms: 50,
            log_lines: DEFAULT_LOG_LINES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLocation {
    Embedded,
    Dir(PathBuf),
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct DesktopConfig {
    pub content: ContentLocation,
    pub edge_maximize: bool,
    pub tick: Duration,
    pub log_lines: usize,
    pub metrics: WindowMetrics,
    pub blogs: Vec<BlogConfig>,
    pub whats_new: String,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            content: ContentLocation::Embedded,
            edge_maximize: true,
            tick: Duration::from_millis(50),
            log_lines: DEFAULT_LOG_LINES,
            metrics: WindowMetrics::terminal(),
            blogs: default_blogs(),
            whats_new: WHATS_NEW_DOC.to_string(),
        }
    }
}

impl DesktopConfig {
    pub fn content_source(&self) -> Arc<dyn ContentSource> {
        match &self.content {
            ContentLocation::Embedded => Arc::new(EmbeddedSource),
            ContentLocation::Dir(path) => Arc::new(DirSource::new(path.clone())),
        }
    }
}

impl TryFrom<&Cli> for DesktopConfig {
    type Error = String;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if !(10..=1000).contains(&cli.tick_ms) {
            return Err("tick-ms must be between 10 and 1000".to_string());
        }
        if !(1..=1_000_000).contains(&cli.log_lines) {
            return Err("log-lines must be between 1 and 1000000".to_string());
        }
        let content = match &cli.content_dir {
            Some(dir) if !dir.is_dir() => {
                return Err(format!("content-dir {} is not a directory", dir.display()));
            }
            Some(dir) => ContentLocation::Dir(dir.clone()),
            None => ContentLocation::Embedded,
        };
        Ok(Self {
            content,
            edge_maximize: !cli.no_edge_maximize,
            tick: Duration::from_millis(cli.tick_ms),
            log_lines: cli.log_lines,
            ..Self::default()
        })
    }
}

pub fn default_blogs() -> Vec<BlogConfig> {
    vec![
        BlogConfig::new(
            "Blog1",
            "blog1",
            "Random Thoughts",
            "Random_Thought_Tree.md",
            "Random_Thought_Entries.md",
        ),
        BlogConfig::new(
            "Blog2",
            "blog2",
            "Project Notes",
            "Project_Notes_Tree.md",
            "Project_Notes_Entries.md",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = DesktopConfig::try_from(&Cli::default()).unwrap();
        assert_eq!(cfg.content, ContentLocation::Embedded);
        assert!(cfg.edge_maximize);
        assert_eq!(cfg.tick, Duration::from_millis(50));
        assert_eq!(cfg.blogs.len(), 2);
    }

    #[test]
    fn parses_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from([
            "term-desk",
            "--content-dir",
            &path,
            "--no-edge-maximize",
            "--tick-ms",
            "100",
        ])
        .unwrap();
        let cfg = DesktopConfig::try_from(&cli).unwrap();
        assert_eq!(cfg.content, ContentLocation::Dir(dir.path().to_path_buf()));
        assert!(!cfg.edge_maximize);
        assert_eq!(cfg.tick, Duration::from_millis(100));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cli = Cli {
            tick_ms: 5,
            ..Cli::default()
        };
        assert!(DesktopConfig::try_from(&cli).is_err());
        let cli = Cli {
            content_dir: Some(PathBuf::from("/definitely/not/here")),
            ..Cli::default()
        };
        assert!(DesktopConfig::try_from(&cli).is_err());
    }
}
