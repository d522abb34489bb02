use std::io::Write as _;
use std::path::{Path, PathBuf};

use miette::{Context as _, IntoDiagnostic as _};
use tracing::debug;
use zip::write::SimpleFileOptions;

use super::GeneratedArtifactSet;

/// Writes every artifact under `dest`. Files are staged in a temporary
/// directory first and only moved into place once all of them were written.
pub fn write_to_dir(artifacts: &GeneratedArtifactSet, dest: &Path) -> miette::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dest)
        .into_diagnostic()
        .with_context(|| format!("creating output directory {}", dest.display()))?;

    let staging = tempfile::Builder::new()
        .prefix(".deployer-")
        .tempdir_in(dest)
        .into_diagnostic()
        .context("creating staging directory")?;

    for (key, text) in artifacts.iter() {
        let staged = staging.path().join(key.file_name());

        if let Some(parent) = staged.parent() {
            std::fs::create_dir_all(parent).into_diagnostic()?;
        }

        std::fs::write(&staged, text)
            .into_diagnostic()
            .with_context(|| format!("writing {}", key.file_name()))?;
    }

    let mut written = Vec::new();

    for (key, _) in artifacts.iter() {
        let target = dest.join(key.file_name());

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).into_diagnostic()?;
        }

        std::fs::rename(staging.path().join(key.file_name()), &target)
            .into_diagnostic()
            .with_context(|| format!("moving {} into place", key.file_name()))?;

        debug!(path = %target.display(), "artifact written");
        written.push(target);
    }

    Ok(written)
}

/// Bundles the artifacts into a single zip archive at `path`.
pub fn write_zip(artifacts: &GeneratedArtifactSet, path: &Path) -> miette::Result<()> {
    let file = std::fs::File::create(path)
        .into_diagnostic()
        .with_context(|| format!("creating {}", path.display()))?;

    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for (key, text) in artifacts.iter() {
        zip.start_file(key.file_name(), options).into_diagnostic()?;
        zip.write_all(text.as_bytes()).into_diagnostic()?;
    }

    zip.finish().into_diagnostic()?;

    Ok(())
}
