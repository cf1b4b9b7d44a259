use std::fs;
use std::path::Path;

use readalong_rs::Report;

pub fn render_report(report: &Report) -> Result<String, String> {
    let mut rendered = serde_json::to_string_pretty(report)
        .map_err(|err| format!("Failed to serialize report JSON: {err}"))?;
    rendered.push('\n');
    Ok(rendered)
}

pub fn write_output(path: &Path, rendered: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create report output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    fs::write(path, rendered)
        .map_err(|err| format!("Failed to write report file '{}': {err}", path.display()))
}
