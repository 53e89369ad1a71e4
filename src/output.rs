//! Rendering of a [`DatasetProfile`] as JSON or YAML.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};

use crate::{cli::OutputFormat, profile::DatasetProfile};

/// Explicit format first, then the output file extension, then JSON.
pub fn resolve_format(path: Option<&Path>, provided: Option<OutputFormat>) -> OutputFormat {
    if let Some(format) = provided {
        return format;
    }
    match path.and_then(|p| p.extension()).and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
            OutputFormat::Yaml
        }
        _ => OutputFormat::Json,
    }
}

pub fn render(profile: &DatasetProfile, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut rendered =
                serde_json::to_string_pretty(profile).context("Serializing profile as JSON")?;
            rendered.push('\n');
            Ok(rendered)
        }
        OutputFormat::Yaml => serde_yaml::to_string(profile).context("Serializing profile as YAML"),
    }
}

pub fn write_profile(
    profile: &DatasetProfile,
    path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let rendered = render(profile, format)?;
    let mut writer: Box<dyn Write> = match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    writer
        .write_all(rendered.as_bytes())
        .context("Writing profile")?;
    writer.flush().context("Flushing profile output")
}
