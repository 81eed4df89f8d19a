// src/file.rs

use std::{
    collections::HashMap,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::batch::Combination;
use crate::config::consts::EXPORT_EXT;
use crate::config::options::{ExportOptions, ExportType};
use crate::core::sanitize::sanitize_filename;

/// Where a batch puts its exports.
pub trait BatchSink {
    /// `true` when every export lands in the same stream (one header per group).
    fn shared(&self) -> bool;

    /// A new (period, indicator, view) group starts.
    fn begin_group(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// One export's text, already unwrapped and newline-terminated.
    fn write(&mut self, combo: &Combination, text: &str) -> io::Result<()>;

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// All exports appended to one stream, groups separated by a blank line.
pub struct SingleFileSink<W: Write> {
    out: W,
    groups: usize,
}

impl<W: Write> SingleFileSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, groups: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl SingleFileSink<BufWriter<File>> {
    /// Create/truncate `path`, creating its parent directory if needed.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_directory(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> BatchSink for SingleFileSink<W> {
    fn shared(&self) -> bool {
        true
    }

    fn begin_group(&mut self) -> io::Result<()> {
        if self.groups > 0 {
            self.out.write_all(b"\n")?;
        }
        self.groups += 1;
        Ok(())
    }

    fn write(&mut self, _combo: &Combination, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// One file per combination, named after its unit, period, indicator and view labels.
pub struct PerCombinationSink {
    dir: PathBuf,
    seen: HashMap<String, usize>,
    written: Vec<PathBuf>,
}

impl PerCombinationSink {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        ensure_directory(&dir)?;
        Ok(Self { dir, seen: HashMap::new(), written: Vec::new() })
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl BatchSink for PerCombinationSink {
    fn shared(&self) -> bool {
        false
    }

    fn write(&mut self, combo: &Combination, text: &str) -> io::Result<()> {
        let stem = sanitize_filename(&combo.labels().join(" "), "export");
        let path = resolve_filename(&self.dir, &stem, &mut self.seen, EXPORT_EXT);
        fs::write(&path, text)?;
        logd!("file: wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Sink for `export`: a single file at `out_path()`, or one file per combination in it.
pub fn open_sink(export: &ExportOptions) -> io::Result<Box<dyn BatchSink>> {
    let path = export.out_path();
    Ok(match export.export_type {
        ExportType::SingleFile => Box::new(SingleFileSink::create(&path)?),
        ExportType::PerCombination => Box::new(PerCombinationSink::new(path)?),
    })
}

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        ));
    }
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Duplicate handling **only within this run**
pub fn resolve_filename(
    dir: &Path,
    stem: &str,                        // already sanitized, no extension
    seen_names: &mut HashMap<String, usize>,
    ext: &str,
) -> PathBuf {
    let count = seen_names.entry(stem.to_string()).or_insert(0);

    // First occurrence: "<stem>.ext"
    // Subsequent:       "<stem> (N).ext" with N starting at 2
    let filename = if *count == 0 {
        format!("{stem}.{ext}")
    } else {
        format!("{stem} ({}).{ext}", *count + 1)
    };

    *count += 1;
    dir.join(filename)
}
