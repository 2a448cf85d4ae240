//! `targets` command.

use std::path::Path;

use statuswatch_config::{DetectionMode, TargetRegistry};

use crate::config::{load_registry, report};

/// Validate the registry and print it.
pub(crate) fn list_targets(targets: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_registry(targets).inspect_err(report)?;
    print!("{}", render(&registry));
    Ok(())
}

fn render(registry: &TargetRegistry) -> String {
    let mut out = format!("{} target(s)\n", registry.len());
    for (i, target) in registry.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {} [{}]\n     {}\n",
            i + 1,
            target.name,
            target.mode.label(),
            target.url
        ));
        if let DetectionMode::Generic { good_keywords } = &target.mode {
            out.push_str(&format!("     keywords: {}\n", good_keywords.join(", ")));
        }
    }
    out
}
