use std::fs;
use std::path::Path;

use crate::error::{ProcessingError, Result};

/// Read a whole file as UTF-8, dropping a leading byte-order mark
pub fn read_utf8(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(&bytes);

    if had_errors {
        return Err(ProcessingError::InvalidFormat(format!(
            "{} is not valid UTF-8",
            path.display()
        )));
    }

    Ok(text.into_owned())
}
