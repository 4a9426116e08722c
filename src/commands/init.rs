use crate::config::CONFIG_FILE_NAME;
use crate::io;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = r#"# pycomply configuration

[doc]
min_length = 10
require_params = false
require_module = false

[style]
max_line_length = 120
function_pattern = "^_{0,2}[a-z][a-z0-9_]*_{0,2}$"
class_pattern = "^_?[A-Z][a-zA-Z0-9]*$"
variable_pattern = "^(_|_{0,2}([a-z][a-z0-9_]*|[A-Z][A-Z0-9_]*))$"
check_imports = true

[complexity]
max = 20

[coverage]
min_ratio = 0.8

[design]
forbid_print = true
debug_modules = ["pdb", "ipdb"]

[rules]
# Rule ids (e.g. "unused-import") or families (e.g. "coverage") to skip
disabled = []

[rules.severity]
# coverage = "error"

[parallel]
enabled = true
"#;

/// Write the default configuration into `dir`.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    io::write_file(&config_path, DEFAULT_CONFIG)?;
    tracing::info!("Created {}", config_path.display());

    Ok(config_path)
}
