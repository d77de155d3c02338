use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use camino::Utf8Path;
use flate2::read::MultiGzDecoder;
use tempfile::Builder;

use crate::error::TaxError;

pub fn open_input(path: &Utf8Path) -> Result<Box<dyn BufRead>, TaxError> {
    let file = fs::File::open(path.as_std_path())
        .map_err(|err| TaxError::Filesystem(format!("open {path}: {err}")))?;
    if path.extension() == Some("gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn read_to_string(path: &Utf8Path) -> Result<String, TaxError> {
    let mut reader = open_input(path)?;
    let mut content = String::new();
    io::Read::read_to_string(&mut reader, &mut content)
        .map_err(|err| TaxError::Filesystem(format!("read {path}: {err}")))?;
    Ok(content)
}

// `dest` only changes once `write` succeeds. A replaced file keeps its mode;
// a new one gets the same mode `File::create` would give it.
pub fn write_atomic<T, F>(dest: &Utf8Path, write: F) -> Result<T, TaxError>
where
    F: FnOnce(&mut dyn Write) -> Result<T, TaxError>,
{
    let parent = match dest.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| TaxError::Filesystem(err.to_string()))?;
    let mut builder = Builder::new();
    builder.prefix(".silva-tax");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let temp = builder
        .tempfile_in(parent.as_std_path())
        .map_err(|err| TaxError::Filesystem(err.to_string()))?;

    let mut writer = BufWriter::new(temp);
    let value = write(&mut writer)?;
    let temp = writer
        .into_inner()
        .map_err(|err| TaxError::Filesystem(err.error().to_string()))?;
    if let Ok(existing) = fs::metadata(dest.as_std_path()) {
        temp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|err| TaxError::Filesystem(format!("chmod {dest}: {err}")))?;
    }
    temp.persist(dest.as_std_path())
        .map_err(|err| TaxError::Filesystem(format!("persist {dest}: {}", err.error)))?;
    Ok(value)
}
