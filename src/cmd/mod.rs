pub mod batch;
pub mod extract;
pub mod fit;
pub mod merge;
pub mod mpg;
pub mod predict;
pub mod split;

use sahga::SahgaResult;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub(crate) fn create(path: &Path) -> SahgaResult<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
