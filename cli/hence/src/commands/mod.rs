//! One module per skill; each maps parsed arguments onto the library crates.

pub mod auth;
pub mod capture;
pub mod collections;
pub mod feedback;
pub mod metadata;
pub mod screenshots;
pub mod search;
pub mod share;
pub mod update;

use std::io::Write;

/// Interactive y/N confirmation on stdin. Anything but `y` declines.
pub(crate) fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} (y/N): ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}

/// `--topics` and `--agents` arrive as raw JSON strings; reject anything
/// that isn't an array before building the form. `share` and `update` apply
/// the same rule.
pub(crate) fn require_json_array(name: &str, value: &str) -> anyhow::Result<()> {
    if !serde_json::from_str::<serde_json::Value>(value).is_ok_and(|v| v.is_array()) {
        anyhow::bail!("--{name} must be a JSON array. Got: {value}");
    }
    Ok(())
}
