use anyhow::{anyhow, Result};
use std::path::Path;

pub fn file_name(path: &Path) -> Result<&str> {
    path.file_stem()
        .ok_or_else(|| anyhow!("No file stem found"))?
        .to_str()
        .ok_or_else(|| anyhow!("Can't convert file stem to string"))
}

pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|x| x.to_str())
        .map(|x| x.to_ascii_lowercase())
}
