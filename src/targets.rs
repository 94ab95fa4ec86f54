//! Debug target registration and dispatch
//!
//! Targets are selected with `--target name[:key=value,...]`. Each backend is
//! feature-gated and registered here, together with the help text shown by
//! the CLI.

use at32flash_core::target::Target;
use std::collections::HashMap;

/// Information about a debug target backend
pub struct TargetInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Error type for target selection
#[derive(Debug, thiserror::Error)]
pub enum TargetOpenError {
    /// No backend with that name is compiled in
    #[error("unknown target '{0}' (available: {1})")]
    Unknown(String, String),
    /// Malformed `key=value` list
    #[error("invalid target parameter '{0}' (expected key=value)")]
    InvalidParameter(String),
    /// The backend rejected its parameters
    #[error("target '{target}': {reason}")]
    Rejected {
        /// Target name
        target: String,
        /// Backend error message
        reason: String,
    },
}

/// Get information about all available targets (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_targets() -> Vec<TargetInfo> {
    let mut targets = Vec::new();

    #[cfg(feature = "dummy")]
    targets.push(TargetInfo {
        name: "dummy",
        aliases: &["emulator"],
        description: "Emulated AT32 part (pid=<id>,ram=<bytes>,spim_size=<bytes>,busy=<polls>)",
    });

    targets
}

/// Generate a short list of target names for CLI help
pub fn target_names_short() -> String {
    let names: Vec<&str> = available_targets().iter().map(|t| t.name).collect();
    names.join(", ")
}

/// Print all available targets
pub fn list_targets() {
    let targets = available_targets();
    if targets.is_empty() {
        println!("No targets available (recompile with target features enabled)");
        return;
    }

    println!("Available targets:");
    for t in &targets {
        println!("  {:12} - {}", t.name, t.description);
        if !t.aliases.is_empty() {
            println!("  {:12}   aliases: {}", "", t.aliases.join(", "));
        }
    }
}

/// Parsed target parameters
#[derive(Debug, PartialEq, Eq)]
pub struct TargetParams {
    /// Target name
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

/// Parse a target string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
pub fn parse_target_params(s: &str) -> Result<TargetParams, TargetOpenError> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            match opt.split_once('=') {
                Some((key, value)) => {
                    params.insert(key.trim().to_string(), value.trim().to_string());
                }
                None => return Err(TargetOpenError::InvalidParameter(opt.to_string())),
            }
        }
    }

    Ok(TargetParams {
        name: name.to_string(),
        params,
    })
}

/// Open a debug target by its command-line specification
pub fn open_target(spec: &str) -> Result<Box<dyn Target>, TargetOpenError> {
    let params = parse_target_params(spec)?;

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" | "emulator" => open_dummy(&params),

        _ => Err(TargetOpenError::Unknown(params.name.clone(), target_names_short())),
    }
}

#[cfg(feature = "dummy")]
fn open_dummy(params: &TargetParams) -> Result<Box<dyn Target>, TargetOpenError> {
    let config = at32flash_dummy::DummyConfig::from_params(&params.params).map_err(|e| {
        TargetOpenError::Rejected {
            target: params.name.clone(),
            reason: e.to_string(),
        }
    })?;
    log::info!(
        "Opening emulated target (product id 0x{:08X}, {} bytes of RAM)",
        config.product_id,
        config.working_area_size
    );
    Ok(Box::new(at32flash_dummy::DummyTarget::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_name() {
        let params = parse_target_params("dummy").unwrap();
        assert_eq!(params.name, "dummy");
        assert!(params.params.is_empty());
    }

    #[test]
    fn test_parse_with_options() {
        let params = parse_target_params("dummy:pid=0x70050242,ram=4096").unwrap();
        assert_eq!(params.name, "dummy");
        assert_eq!(params.params.get("pid").map(String::as_str), Some("0x70050242"));
        assert_eq!(params.params.get("ram").map(String::as_str), Some("4096"));
    }

    #[test]
    fn test_parse_rejects_bare_option() {
        assert!(matches!(
            parse_target_params("dummy:pid"),
            Err(TargetOpenError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unknown_target() {
        assert!(matches!(
            open_target("jlink"),
            Err(TargetOpenError::Unknown(..))
        ));
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy_with_params() {
        let mut target = open_target("dummy:ram=0").unwrap();
        assert!(target.is_halted());
        assert!(target.alloc_working_area(4).is_err());
    }
}
