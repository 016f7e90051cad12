//! Font discovery for the PDF preview.
//!
//! `genpdf` embeds TrueType fonts, so the preview needs a family on disk laid out as
//! `<Family>-Regular.ttf`, `<Family>-Bold.ttf`, `<Family>-Italic.ttf` and
//! `<Family>-BoldItalic.ttf`.  Directories are searched in this order:
//!
//! 1. the directory configured through [`FontConfig::with_directory`],
//! 2. `assets/fonts` next to the running executable,
//! 3. `assets/fonts` inside the crate sources.
//!
//! When the body family is not found there, [`FontCapability`] widens the search once to the
//! platform's system font directories (see [`crate::capability::ensure`]).

use std::env;
use std::path::{Path, PathBuf};

use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

use crate::capability::{self, Capability};
use crate::error::{Error, Result};

/// Family used for body text, headings and tables.
pub const DEFAULT_BODY_FAMILY: &str = "LiberationSerif";
/// Family used for diagrams.
pub const DEFAULT_MONOSPACE_FAMILY: &str = "LiberationMono";

const STYLE_SUFFIXES: [&str; 4] = ["Regular", "Bold", "Italic", "BoldItalic"];

/// Where to look for fonts and which families to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontConfig {
    directory: Option<PathBuf>,
    body_family: String,
    monospace_family: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            directory: None,
            body_family: DEFAULT_BODY_FAMILY.to_owned(),
            monospace_family: DEFAULT_MONOSPACE_FAMILY.to_owned(),
        }
    }
}

impl FontConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches `directory` before the built-in locations.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Sets the body family file prefix, e.g. `LiberationSerif`.
    pub fn with_body_family(mut self, family: impl Into<String>) -> Self {
        self.body_family = family.into();
        self
    }

    /// Sets the monospace family file prefix, e.g. `LiberationMono`.
    pub fn with_monospace_family(mut self, family: impl Into<String>) -> Self {
        self.monospace_family = family.into();
        self
    }

    /// Returns the configured directory, if any.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Returns the body family prefix.
    pub fn body_family(&self) -> &str {
        &self.body_family
    }

    /// Returns the monospace family prefix.
    pub fn monospace_family(&self) -> &str {
        &self.monospace_family
    }

    fn bundled_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(directory) = &self.directory {
            candidates.push(directory.clone());
        }
        if let Ok(current_exe) = env::current_exe() {
            if let Some(bin_dir) = current_exe.parent() {
                push_unique(&mut candidates, bin_dir.join("assets/fonts"));
            }
        }
        push_unique(
            &mut candidates,
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"),
        );
        candidates
    }
}

fn push_unique(candidates: &mut Vec<PathBuf>, candidate: PathBuf) {
    if !candidates.iter().any(|existing| existing == &candidate) {
        candidates.push(candidate);
    }
}

/// Platform font directories searched by the remediation step.
pub fn system_font_directories() -> Vec<PathBuf> {
    let mut directories = Vec::new();

    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(root) = env::var_os(var).filter(|value| !value.is_empty()) {
                push_unique(&mut directories, PathBuf::from(root).join("Fonts"));
            }
        }
        push_unique(&mut directories, PathBuf::from(r"C:\Windows\Fonts"));
    }

    #[cfg(target_os = "macos")]
    {
        push_unique(&mut directories, PathBuf::from("/Library/Fonts"));
        push_unique(&mut directories, PathBuf::from("/System/Library/Fonts"));
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        for directory in [
            "/usr/share/fonts/truetype/liberation",
            "/usr/share/fonts/truetype/liberation2",
            "/usr/share/fonts/liberation",
            "/usr/share/fonts/liberation-serif",
            "/usr/share/fonts/liberation-mono",
            "/usr/local/share/fonts",
        ] {
            push_unique(&mut directories, PathBuf::from(directory));
        }
    }

    directories
}

fn font_files(family: &str) -> impl Iterator<Item = String> + '_ {
    STYLE_SUFFIXES
        .iter()
        .map(move |suffix| format!("{}-{}.ttf", family, suffix))
}

fn missing_font_files(directory: &Path, family: &str) -> Vec<String> {
    font_files(family)
        .filter(|name| !directory.join(name).is_file())
        .collect()
}

/// Returns the first candidate directory holding all four files of `family`.
fn locate(family: &str, candidates: &[PathBuf]) -> Result<PathBuf> {
    let mut attempts = Vec::new();
    for candidate in candidates {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }
        let missing = missing_font_files(candidate, family);
        if missing.is_empty() {
            return Ok(candidate.clone());
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    let summary = if attempts.is_empty() {
        "no search paths were available".to_owned()
    } else {
        attempts.join(", ")
    };
    Err(Error::missing(
        format!("font family {}", family),
        format!("checked {}", summary),
    ))
}

fn load(directory: &Path, family: &str) -> Result<FontFamily<FontData>> {
    debug!("loading font family {} from {}", family, directory.display());
    Ok(fonts::from_files(directory, family, None)?)
}

/// A font family that must be present for the preview to render.
///
/// Probing searches the bundled locations; remediation adds the system font directories.
#[derive(Clone, Debug)]
pub struct FontCapability {
    name: String,
    family: String,
    candidates: Vec<PathBuf>,
    widened: bool,
}

impl FontCapability {
    /// Creates a capability for `family` searched through the locations of `config`.
    pub fn new(config: &FontConfig, family: impl Into<String>) -> Self {
        let family = family.into();
        Self {
            name: format!("font family {}", family),
            family,
            candidates: config.bundled_candidates(),
            widened: false,
        }
    }

    /// Returns the directories the next probe will search.
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    fn widen(&mut self) {
        if self.widened {
            return;
        }
        for directory in system_font_directories() {
            push_unique(&mut self.candidates, directory);
        }
        self.widened = true;
    }
}

impl Capability for FontCapability {
    type Output = FontFamily<FontData>;

    fn name(&self) -> &str {
        &self.name
    }

    fn probe(&self) -> Result<Self::Output> {
        let directory = locate(&self.family, &self.candidates)?;
        load(&directory, &self.family)
    }

    fn remediate(&mut self) -> Result<()> {
        self.widen();
        Ok(())
    }
}

/// Font families loaded for one preview render.
pub struct LoadedFonts {
    /// Family for body text; becomes the document's default family.
    pub body: FontFamily<FontData>,
    /// Family for diagrams, `None` when it could not be found.
    pub monospace: Option<FontFamily<FontData>>,
}

/// Loads the body family (fatal when missing) and the monospace family (optional).
pub fn load_fonts(config: &FontConfig) -> Result<LoadedFonts> {
    let body = capability::ensure(&mut FontCapability::new(config, config.body_family()))?;

    let mut monospace_capability = FontCapability::new(config, config.monospace_family());
    monospace_capability.widen();
    let monospace = match monospace_capability.probe() {
        Ok(family) => Some(family),
        Err(err) if err.is_missing_dependency() => {
            warn!(
                "{}; diagrams will use the body font {}",
                err,
                config.body_family()
            );
            None
        }
        Err(err) => return Err(err),
    };

    Ok(LoadedFonts { body, monospace })
}

/// Indicates whether the body family can be found, including system directories.
pub fn fonts_available(config: &FontConfig) -> bool {
    let mut capability = FontCapability::new(config, config.body_family());
    capability.widen();
    locate(config.body_family(), capability.candidates()).is_ok()
}
