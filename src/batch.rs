//! Batch mode: one render job per file matching a wildcard pattern, run sequentially.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::JobConfig;
use crate::encode::OutputFormat;
use crate::foundation::error::{BatchItemError, TypewaveError, TypewaveResult};
use crate::render::driver::{JobInput, JobOutcome, Progress, render_job};

/// Overall result of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every file rendered.
    AllSucceeded,
    /// Some files failed, at least one rendered.
    PartialSuccess,
    /// No file rendered.
    AllFailed,
}

/// Per-file results of [`run_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Rendered inputs with their outcome, in processing order.
    pub succeeded: Vec<(PathBuf, JobOutcome)>,
    /// Failed inputs, in processing order.
    pub failed: Vec<BatchItemError>,
}

impl BatchReport {
    /// Number of processed inputs.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Summary classification.
    pub fn outcome(&self) -> BatchOutcome {
        match (self.succeeded.is_empty(), self.failed.is_empty()) {
            (_, true) => BatchOutcome::AllSucceeded,
            (true, false) => BatchOutcome::AllFailed,
            (false, false) => BatchOutcome::PartialSuccess,
        }
    }
}

/// Anchored regex for a file-name wildcard (`*` any run, `?` one character).
pub fn wildcard_regex(name_pattern: &str) -> TypewaveResult<Regex> {
    let mut re = String::from("^");
    for ch in name_pattern.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re)
        .map_err(|e| TypewaveError::validation(format!("bad batch pattern '{name_pattern}': {e}")))
}

/// Files matching `pattern`, sorted. Wildcards are allowed in the file-name part only.
pub fn expand_pattern(pattern: &str) -> TypewaveResult<Vec<PathBuf>> {
    let path = Path::new(pattern);
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TypewaveError::validation(format!("batch pattern '{pattern}' has no file name")))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let re = wildcard_regex(name)?;

    let entries = std::fs::read_dir(&dir).map_err(|e| {
        TypewaveError::missing_input(format!("cannot list '{}': {e}", dir.display()))
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| re.is_match(n))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Output path for one batch input: `<output_dir>/<input stem>.<ext>`.
pub fn batch_output_path(config: &JobConfig, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dialogue".to_owned());
    let name = match config.format {
        OutputFormat::Frames => format!("{stem}_frames"),
        f => format!("{stem}.{}", f.extension()),
    };
    config.output_dir.join(name)
}

/// `path`, or the first free `<stem>_<n>.<ext>` (n from 2) when an earlier item already claimed it.
pub(crate) fn claim_output_path(path: PathBuf, claimed: &mut HashSet<PathBuf>) -> PathBuf {
    if claimed.insert(path.clone()) {
        return path;
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    let candidate = (2u32..)
        .map(|n| {
            let name = match &ext {
                Some(ext) => format!("{stem}_{n}.{ext}"),
                None => format!("{stem}_{n}"),
            };
            path.with_file_name(name)
        })
        .find(|p| !claimed.contains(p))
        .unwrap_or_else(|| path.clone());
    tracing::warn!(
        wanted = %path.display(),
        using = %candidate.display(),
        "batch inputs share a file stem; output renamed"
    );
    claimed.insert(candidate.clone());
    candidate
}

/// Render every file matching `pattern` with `config`; a failing file does not stop the batch.
///
/// `progress` receives the current input with each frame update.
pub fn run_batch(
    config: &JobConfig,
    pattern: &str,
    progress: &mut dyn FnMut(&Path, Progress),
) -> TypewaveResult<BatchReport> {
    config.validate()?;
    config.format.ensure_available()?;

    let inputs = expand_pattern(pattern)?;
    if inputs.is_empty() {
        return Err(TypewaveError::missing_input(format!(
            "no files match '{pattern}'"
        )));
    }
    if config.output.is_some() {
        tracing::warn!("explicit output path ignored in batch mode");
    }
    tracing::info!(files = inputs.len(), pattern, "batch started");

    let mut report = BatchReport::default();
    let mut claimed = HashSet::new();
    for (i, input) in inputs.into_iter().enumerate() {
        let mut item_config = config.clone();
        item_config.output = Some(claim_output_path(
            batch_output_path(config, &input),
            &mut claimed,
        ));

        tracing::info!(n = i + 1, input = %input.display(), "batch item");
        let result = render_job(&item_config, &JobInput::File(input.clone()), &mut |p| {
            progress(&input, p)
        });
        match result {
            Ok(outcome) => report.succeeded.push((input, outcome)),
            Err(source) => {
                let err = BatchItemError { input, source };
                tracing::warn!(error = %err, "batch item failed, continuing");
                report.failed.push(err);
            }
        }
    }

    tracing::info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "batch finished"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "../tests/unit/batch.rs"]
mod tests;
