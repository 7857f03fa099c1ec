use crate::Result;
use crate::providers::Sponsorship;
use camino::{Utf8Path, Utf8PathBuf};
use core::fmt::Write;
use ohno::IntoAppError;
use std::fs;

pub fn generate<W: Write>(records: &[Sponsorship], writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", serde_json::to_string_pretty(records)?)?;
    Ok(())
}

/// Write `records` to `<dir>/<name>.json`, creating `dir` if needed, and return the file path.
pub fn write_file(dir: &Utf8Path, name: &str, records: &[Sponsorship]) -> Result<Utf8PathBuf> {
    fs::create_dir_all(dir).into_app_err_with(|| format!("creating output directory '{dir}'"))?;

    let mut output = String::new();
    generate(records, &mut output)?;

    let path = dir.join(format!("{name}.json"));
    fs::write(&path, output).into_app_err_with(|| format!("writing '{path}'"))?;

    Ok(path)
}
