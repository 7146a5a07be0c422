use camino::{Utf8Path, Utf8PathBuf};

use crate::layout::{Direction, LayoutOptions};

/// Where content lives and how it gets compiled.
///
/// ```rust
/// use michishirube::{Config, Direction};
///
/// let config = Config::new()
///     .content_root("content/roadmaps")
///     .direction(Direction::Right)
///     .strict(true);
///
/// assert!(config.strict);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding `category/roadmap` directories.
    pub content_root: Utf8PathBuf,
    /// Where the manifest is written.
    pub manifest_path: Utf8PathBuf,
    pub layout: LayoutOptions,
    /// Flow of freshly computed layouts.
    pub direction: Direction,
    /// Also reject cycles among prerequisites and `requires` edges.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_root: Utf8PathBuf::from("content/roadmaps"),
            manifest_path: Utf8PathBuf::from("content/manifest.json"),
            layout: LayoutOptions::default(),
            direction: Direction::default(),
            strict: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_root(mut self, path: impl AsRef<Utf8Path>) -> Self {
        self.content_root = path.as_ref().to_owned();
        self
    }

    pub fn manifest_path(mut self, path: impl AsRef<Utf8Path>) -> Self {
        self.manifest_path = path.as_ref().to_owned();
        self
    }

    pub fn layout(mut self, options: LayoutOptions) -> Self {
        self.layout = options;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
