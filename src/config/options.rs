// src/config/options.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::consts::*;

/// Where the panel lives and how a browser would talk to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteConfig {
    pub url: String,
    pub origin: String,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub timeout: Duration,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: join!(HOST, PANEL_PATH),
            origin: s!(HOST),
            user_agent: s!(USER_AGENT),
            accept: s!(ACCEPT),
            accept_language: s!(ACCEPT_LANGUAGE),
            timeout: Duration::from_secs(TIMEOUT_SECS),
        }
    }
}

impl SiteConfig {
    /// Headers a navigating Firefox tab sends; the server rejects bare requests.
    pub fn browser_headers(&self, cookies: &[String]) -> Vec<(String, String)> {
        let mut h = vec![
            (s!("User-Agent"), self.user_agent.clone()),
            (s!("Accept"), self.accept.clone()),
            (s!("Accept-Language"), self.accept_language.clone()),
            (s!("Origin"), self.origin.clone()),
            (s!("Referer"), self.url.clone()),
            (s!("Upgrade-Insecure-Requests"), s!("1")),
            (s!("Sec-Fetch-Dest"), s!("document")),
            (s!("Sec-Fetch-Mode"), s!("navigate")),
            (s!("Sec-Fetch-Site"), s!("same-origin")),
            (s!("Sec-Fetch-User"), s!("?1")),
        ];
        if !cookies.is_empty() {
            h.push((s!("Cookie"), cookies.join(";")));
        }
        h
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportType {
    /// Every combination appended to one file.
    SingleFile,
    /// One file per combination, named after its labels.
    PerCombination,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub export_type: ExportType,
    out: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            export_type: ExportType::SingleFile,
            out: PathBuf::from(DEFAULT_OUT_DIR),
        }
    }
}

impl ExportOptions {
    pub fn new(export_type: ExportType) -> Self {
        Self { export_type, ..Self::default() }
    }

    /// File for `SingleFile`, directory for `PerCombination`.
    pub fn out_path(&self) -> PathBuf {
        match self.export_type {
            ExportType::SingleFile => {
                if self.out.extension().is_some() {
                    self.out.clone()
                } else {
                    self.out.join(join!(DEFAULT_FILE, ".", EXPORT_EXT))
                }
            }
            ExportType::PerCombination => self.out.clone(),
        }
    }

    /// A path with an extension is taken as the target file; anything else as a directory.
    pub fn set_path(&mut self, p: impl AsRef<Path>) {
        self.out = p.as_ref().to_path_buf();
    }
}
