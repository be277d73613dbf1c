//! Depth-first manifest creator.

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use contentlist_core::{
    CancelToken, ContentPath, CreateConfig, Entry, EntryType, compare_ignore_case,
    millis_since_epoch,
};
use tracing::{debug, info, warn};

use crate::error::{RejectReason, Rejection, ScanError};
use crate::events::CreateEvents;
use crate::measure::{ContentMeasurer, Measure};
use crate::progress::CreateSummary;

/// Aggregate contribution of a node to its parent.
#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    size: u64,
    files: u64,
    directories: u64,
}

impl Totals {
    fn of(entry: &Entry) -> Self {
        match entry.entry_type() {
            EntryType::File => Self {
                size: entry.size,
                files: 1,
                directories: 0,
            },
            EntryType::Directory => Self {
                size: entry.size,
                files: entry.files,
                directories: entry.directories + 1,
            },
            EntryType::SymbolicLink | EntryType::Unknown => Self::default(),
        }
    }

    fn add(&mut self, other: Totals) {
        self.size += other.size;
        self.files += other.files;
        self.directories += other.directories;
    }

    fn apply(self, entry: &mut Entry) {
        entry.size = self.size;
        entry.files = self.files;
        entry.directories = self.directories;
    }
}

/// A canonicalized input with its manifest name.
#[derive(Debug)]
struct Input {
    real: PathBuf,
    name: String,
    is_dir: bool,
}

/// A directory child queued for visiting. `name` is `None` when the
/// native name is not valid UTF-8.
struct Child {
    real: PathBuf,
    name: Option<String>,
    is_dir: bool,
}

/// Mutable state of one walk.
struct Walk<'a> {
    events: &'a mut dyn CreateEvents,
    summary: CreateSummary,
    ancestors: Vec<PathBuf>,
}

impl Walk<'_> {
    fn reject(&mut self, path: &Path, reason: RejectReason) -> Result<(), ScanError> {
        let rejection = Rejection::new(path, reason);
        warn!(path = %path.display(), reason = %rejection.reason, "Rejected");
        self.summary.rejected += 1;
        self.events.on_rejected(&rejection)
    }

    /// Turn a node failure into a rejection unless it must abort the walk.
    fn reject_error(&mut self, path: &Path, err: ScanError) -> Result<Option<Totals>, ScanError> {
        if err.is_fatal() {
            return Err(err);
        }
        self.reject(path, RejectReason::from(&err))?;
        Ok(None)
    }

    fn record(&mut self, entry: &Entry) {
        match entry.entry_type() {
            EntryType::File => {
                self.summary.files += 1;
                self.summary.bytes += entry.size;
            }
            EntryType::Directory => self.summary.directories += 1,
            EntryType::SymbolicLink | EntryType::Unknown => self.summary.others += 1,
        }
    }
}

/// Walks filesystem roots into manifest entries.
///
/// Entries are emitted post-order: a directory follows all of its
/// descendants, and the synthetic root `/` comes last. Siblings are
/// visited directories first, then files, each group ordered by name
/// ignoring case.
pub struct Creator<M = ContentMeasurer> {
    config: CreateConfig,
    cancel: CancelToken,
    measurer: M,
}

impl Creator<ContentMeasurer> {
    /// Create a creator that streams files through [`ContentMeasurer`].
    pub fn new(config: CreateConfig, cancel: CancelToken) -> Self {
        let measurer = ContentMeasurer::new(config.clone(), cancel.clone());
        Self {
            config,
            cancel,
            measurer,
        }
    }
}

impl<M: Measure> Creator<M> {
    /// Create a creator with a custom per-file measurement routine.
    pub fn with_measurer(config: CreateConfig, cancel: CancelToken, measurer: M) -> Self {
        Self {
            config,
            cancel,
            measurer,
        }
    }

    pub fn config(&self) -> &CreateConfig {
        &self.config
    }

    /// Walk `inputs` and emit their entries to `events`.
    ///
    /// Each input becomes a top-level child of `/` named after its final
    /// path component. Returns [`ScanError::Cancelled`] if the token fires
    /// or a callback asks to stop; entries already emitted stay emitted.
    pub fn create(
        &self,
        inputs: &[PathBuf],
        events: &mut dyn CreateEvents,
    ) -> Result<CreateSummary, ScanError> {
        let started = Instant::now();
        let start_time = SystemTime::now();

        events.on_start(inputs)?;
        let mut walk = Walk {
            events,
            summary: CreateSummary::default(),
            ancestors: Vec::new(),
        };

        let inputs = self.prepare(inputs, &mut walk)?;
        debug!(count = inputs.len(), "Prepared inputs");

        let mut root = Entry::root();
        root.created = millis_since_epoch(start_time);

        let mut totals = Totals::default();
        for input in inputs {
            let path = match ContentPath::absolute_root().child(&input.name) {
                Ok(path) => path,
                Err(_) => {
                    walk.reject(&input.real, RejectReason::InvalidName)?;
                    continue;
                }
            };
            if let Some(contribution) = self.visit(&input.real, path, &mut walk)? {
                totals.add(contribution);
            }
        }

        self.cancel.check()?;
        totals.apply(&mut root);
        root.modified = millis_since_epoch(SystemTime::now());
        walk.events.on_entry(&root)?;

        let mut summary = walk.summary;
        summary.elapsed = started.elapsed();
        walk.events.on_finish(&summary)?;

        info!(
            files = summary.files,
            directories = summary.directories,
            bytes = summary.bytes,
            rejected = summary.rejected,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Manifest created"
        );
        Ok(summary)
    }

    /// Canonicalize, filter and order the inputs.
    fn prepare(&self, inputs: &[PathBuf], walk: &mut Walk<'_>) -> Result<Vec<Input>, ScanError> {
        let mut prepared: Vec<Input> = Vec::with_capacity(inputs.len());

        for input in inputs {
            self.cancel.check()?;

            let real = match fs::canonicalize(input) {
                Ok(real) => real,
                Err(err) => {
                    let err = ScanError::io(input, err);
                    let reason = match err {
                        ScanError::NotFound { .. } => RejectReason::Unreadable,
                        ref other => RejectReason::from(other),
                    };
                    walk.reject(input, reason)?;
                    continue;
                }
            };

            let Some(name) = real.file_name() else {
                walk.reject(&real, RejectReason::Root)?;
                continue;
            };
            let Some(name) = name.to_str().map(str::to_owned) else {
                walk.reject(&real, RejectReason::InvalidName)?;
                continue;
            };

            let is_dir = real.is_dir();
            if !is_readable(&real, is_dir) {
                walk.reject(&real, RejectReason::Unreadable)?;
                continue;
            }

            if prepared.iter().any(|other| other.name == name) {
                walk.reject(&real, RejectReason::Duplicate)?;
                continue;
            }

            prepared.push(Input { real, name, is_dir });
        }

        prepared.sort_by(|a, b| {
            b.is_dir
                .cmp(&a.is_dir)
                .then_with(|| compare_ignore_case(&a.name, &b.name))
        });
        Ok(prepared)
    }

    /// Visit one node and everything below it.
    ///
    /// Returns the node's contribution to its parent, or `None` if it was
    /// rejected.
    fn visit(
        &self,
        real: &Path,
        path: ContentPath,
        walk: &mut Walk<'_>,
    ) -> Result<Option<Totals>, ScanError> {
        self.cancel.check()?;
        walk.events.on_entry_start(&path)?;

        let link_metadata = match fs::symlink_metadata(real) {
            Ok(metadata) => metadata,
            Err(err) => return walk.reject_error(real, ScanError::io(real, err)),
        };

        let entry_type = EntryType::probe(real);
        let mut entry = match Entry::new(path, entry_type) {
            Ok(entry) => entry,
            Err(_) => {
                walk.reject(real, RejectReason::InvalidName)?;
                return Ok(None);
            }
        };
        debug!(path = %entry.path(), entry_type = %entry_type, "Visiting");

        let metadata = fs::metadata(real).unwrap_or(link_metadata);
        set_timestamps(&mut entry, &metadata);

        match entry_type {
            EntryType::File => {
                if let Err(err) = self.measurer.measure(real, &mut entry, &mut *walk.events) {
                    return walk.reject_error(real, err);
                }
            }
            EntryType::Directory => match self.visit_children(real, &entry, walk)? {
                Some(totals) => totals.apply(&mut entry),
                None => return Ok(None),
            },
            EntryType::SymbolicLink | EntryType::Unknown => {}
        }

        walk.events.on_entry(&entry)?;
        walk.record(&entry);
        debug!(path = %entry.path(), size = entry.size, "Finished");
        Ok(Some(Totals::of(&entry)))
    }

    fn visit_children(
        &self,
        real: &Path,
        entry: &Entry,
        walk: &mut Walk<'_>,
    ) -> Result<Option<Totals>, ScanError> {
        let canonical = match fs::canonicalize(real) {
            Ok(canonical) => canonical,
            Err(err) => return walk.reject_error(real, ScanError::io(real, err)),
        };
        if walk.ancestors.contains(&canonical) {
            walk.reject(real, RejectReason::Loop)?;
            return Ok(None);
        }

        let children = match read_children(real) {
            Ok(children) => children,
            Err(err) => return walk.reject_error(real, err),
        };

        walk.ancestors.push(canonical);
        let mut totals = Totals::default();
        for child in children {
            let path = match child.name.as_deref().map(|name| entry.path().child(name)) {
                Some(Ok(path)) => path,
                _ => {
                    walk.reject(&child.real, RejectReason::InvalidName)?;
                    continue;
                }
            };
            if let Some(contribution) = self.visit(&child.real, path, walk)? {
                totals.add(contribution);
            }
        }
        walk.ancestors.pop();

        Ok(Some(totals))
    }
}

/// List a directory, directories first, then by name ignoring case.
fn read_children(dir: &Path) -> Result<Vec<Child>, ScanError> {
    let mut children = Vec::new();
    for item in fs::read_dir(dir).map_err(|e| ScanError::io(dir, e))? {
        let item = item.map_err(|e| ScanError::io(dir, e))?;
        let real = item.path();
        let name = item.file_name().into_string().ok();
        let is_dir = EntryType::probe(&real).is_dir();
        children.push(Child { real, name, is_dir });
    }

    children.sort_by(|a, b| {
        b.is_dir.cmp(&a.is_dir).then_with(|| {
            compare_ignore_case(
                a.name.as_deref().unwrap_or_default(),
                b.name.as_deref().unwrap_or_default(),
            )
        })
    });
    Ok(children)
}

fn is_readable(path: &Path, is_dir: bool) -> bool {
    if is_dir {
        fs::read_dir(path).is_ok()
    } else {
        fs::File::open(path).is_ok()
    }
}

fn set_timestamps(entry: &mut Entry, metadata: &Metadata) {
    entry.created = metadata.created().map(millis_since_epoch).unwrap_or(0);
    entry.modified = metadata.modified().map(millis_since_epoch).unwrap_or(0);
}
