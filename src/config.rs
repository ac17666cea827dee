use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".hotspot-map.yml";

/// All settings that can be placed in a .hotspot-map.yml config file.
/// Every field is optional; omitted fields fall back to CLI defaults.
/// CLI flags always take precedence over values set here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HotspotConfig {
    // Analysis scope (overridden by the corresponding CLI flag)
    pub repo: Option<String>,
    pub folder: Option<String>,
    pub since: Option<String>,
    pub output_dir: Option<String>,

    // Stage implementations
    pub analysis: Option<String>,
    pub transform: Option<String>,
    pub normalize_renames: Option<bool>,
    pub scripts_dir: Option<String>,

    // External tool commands
    pub tools: Option<ConfigTools>,
}

/// Optional per-tool command overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigTools {
    pub git: Option<ToolCommand>,
    pub cloc: Option<ToolCommand>,
    pub maat: Option<ToolCommand>,
    pub python: Option<ToolCommand>,
}

/// An external program plus leading arguments.
///
/// Written either as a plain program name (`cloc`) or as an argv list
/// (`["java", "-jar", "code-maat.jar"]`). Stage arguments are appended.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ToolCommand {
    Program(String),
    Argv(Vec<String>),
}

impl ToolCommand {
    pub fn new(program: &str) -> Self {
        ToolCommand::Program(program.to_string())
    }

    pub fn program(&self) -> &str {
        match self {
            ToolCommand::Program(p) => p,
            ToolCommand::Argv(argv) => argv.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn leading_args(&self) -> &[String] {
        match self {
            ToolCommand::Program(_) => &[],
            ToolCommand::Argv(argv) if argv.len() > 1 => &argv[1..],
            ToolCommand::Argv(_) => &[],
        }
    }
}

/// Where the maat-side analyses (summary, revisions) come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Builtin,
    Maat,
}

/// Where the merge and enclosure-tree transforms come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMode {
    Builtin,
    Scripts,
}

/// Fully resolved tool commands.
#[derive(Debug, Clone)]
pub struct Tools {
    pub git: ToolCommand,
    pub cloc: ToolCommand,
    pub maat: ToolCommand,
    pub python: ToolCommand,
}

impl Default for Tools {
    fn default() -> Self {
        Tools {
            git:    ToolCommand::new("git"),
            cloc:   ToolCommand::new("cloc"),
            maat:   ToolCommand::new("maat"),
            python: ToolCommand::new("python"),
        }
    }
}

impl HotspotConfig {
    pub fn analysis_mode(&self) -> AnalysisMode {
        match self.analysis.as_deref() {
            Some("maat") => AnalysisMode::Maat,
            _ => AnalysisMode::Builtin,
        }
    }

    pub fn transform_mode(&self) -> TransformMode {
        match self.transform.as_deref() {
            Some("scripts") => TransformMode::Scripts,
            _ => TransformMode::Builtin,
        }
    }

    /// Merges the `tools` overrides onto the default commands.
    pub fn tools(&self) -> Tools {
        let mut tools = Tools::default();
        if let Some(t) = &self.tools {
            if let Some(c) = &t.git    { tools.git = c.clone(); }
            if let Some(c) = &t.cloc   { tools.cloc = c.clone(); }
            if let Some(c) = &t.maat   { tools.maat = c.clone(); }
            if let Some(c) = &t.python { tools.python = c.clone(); }
        }
        tools
    }

    /// Validates semantic constraints that serde cannot enforce.
    ///
    /// Returns a human-readable error describing exactly what is wrong and what
    /// values are accepted. Called automatically by [`load_config`].
    pub fn validate(&self) -> Result<(), String> {
        if let Some(mode) = &self.analysis {
            match mode.as_str() {
                "builtin" | "maat" => {}
                other => {
                    return Err(format!(
                        "Invalid 'analysis' value: \"{other}\". \
                         Expected one of: \"builtin\", \"maat\""
                    ))
                }
            }
        }

        if let Some(mode) = &self.transform {
            match mode.as_str() {
                "builtin" | "scripts" => {}
                other => {
                    return Err(format!(
                        "Invalid 'transform' value: \"{other}\". \
                         Expected one of: \"builtin\", \"scripts\""
                    ))
                }
            }
        }

        let scope: &[(&str, Option<&String>)] = &[
            ("repo", self.repo.as_ref()),
            ("folder", self.folder.as_ref()),
            ("since", self.since.as_ref()),
            ("output_dir", self.output_dir.as_ref()),
            ("scripts_dir", self.scripts_dir.as_ref()),
        ];
        for (name, val) in scope {
            if let Some(v) = val {
                if v.trim().is_empty() {
                    return Err(format!(
                        "Invalid '{name}' value: empty string. Omit the field to use the default"
                    ));
                }
            }
        }

        if let Some(t) = &self.tools {
            let fields: &[(&str, Option<&ToolCommand>)] = &[
                ("git", t.git.as_ref()),
                ("cloc", t.cloc.as_ref()),
                ("maat", t.maat.as_ref()),
                ("python", t.python.as_ref()),
            ];
            for (name, cmd) in fields {
                if let Some(cmd) = cmd {
                    if cmd.program().trim().is_empty() {
                        return Err(format!(
                            "Invalid tool 'tools.{name}': the command is empty. \
                             Use a program name (\"{name}\") or an argv list ([\"sh\", \"wrapper.sh\"])"
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Reads, parses, and validates a YAML config file from `path`.
pub fn load_config(path: &Path) -> Result<HotspotConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config file '{}': {e}", path.display()))?;
    let cfg: HotspotConfig = serde_yaml::from_str(&content)
        .map_err(|e| format!("Invalid config file '{}': {e}", path.display()))?;
    cfg.validate()
        .map_err(|e| format!("Config file '{}': {e}", path.display()))?;
    Ok(cfg)
}

/// Expands a leading `~/` to the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None if raw == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

/// Annotated YAML template printed by `--generate-config`.
pub static TEMPLATE: &str = r#"# hotspot-map configuration file
# Generated by: hotspot-map --generate-config
#
# All settings are optional. Omit any field to use the built-in default.
# CLI flags always take precedence over values in this file.
# Save this file as .hotspot-map.yml in the directory you run from, or pass it:
#
#   hotspot-map --config .hotspot-map.yml --folder src

# ── Analysis scope ─────────────────────────────────────────────────────────────

# Repository to mine. "~/" is expanded to your home directory.
# repo: "~/projects/my-project"

# Subdirectory of the repository to analyze (relative to the repo root).
# folder: "src"

# Only include commits after this point. Passed verbatim to git --after,
# so relative forms ("3 months", "1 year ago") and dates ("2024-01-01") work.
# since: "3 months"

# Directory for every generated artifact (log, CSV tables, JSON, HTML, SVG).
# output_dir: "generated"

# ── Stages ─────────────────────────────────────────────────────────────────────

# Summary and revision counts: "builtin" (no JVM needed) or "maat" (code-maat).
# analysis: "builtin"

# Merge and enclosure-tree transforms: "builtin" or "scripts" (maat-scripts,
# run with the python tool below from scripts_dir).
# transform: "builtin"
# scripts_dir: "scripts"

# Rewrite "src/{old => new}/file" renames in the log to the newest file name.
# normalize_renames: true

# ── External tools ─────────────────────────────────────────────────────────────
# Each tool is a program name or an argv list; stage arguments are appended.

# tools:
#   git:    "git"
#   cloc:   "cloc"
#   maat:   ["java", "-jar", "code-maat-standalone.jar"]
#   python: "python3"
"#;

/// Prints the config template to stdout, or writes it to `output_path` if given.
pub fn print_template(output_path: Option<&Path>) -> Result<(), String> {
    match output_path {
        Some(path) => std::fs::write(path, TEMPLATE)
            .map_err(|e| format!("Cannot write config template to '{}': {e}", path.display())),
        None => {
            print!("{TEMPLATE}");
            Ok(())
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_valid_yaml() {
        let result: Result<HotspotConfig, _> = serde_yaml::from_str(TEMPLATE);
        assert!(
            result.is_ok(),
            "TEMPLATE must parse as valid HotspotConfig: {:?}",
            result.err()
        );
        let cfg = result.unwrap();
        // Everything is commented out in the template
        assert!(cfg.since.is_none());
        assert!(cfg.folder.is_none());
        assert!(cfg.tools.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg: HotspotConfig = serde_yaml::from_str("{}").expect("empty map should parse");
        assert_eq!(cfg.analysis_mode(), AnalysisMode::Builtin);
        assert_eq!(cfg.transform_mode(), TransformMode::Builtin);
        let tools = cfg.tools();
        assert_eq!(tools.git, ToolCommand::new("git"));
        assert_eq!(tools.cloc, ToolCommand::new("cloc"));
    }

    #[test]
    fn test_tool_command_string_and_list() {
        let yaml = "tools:\n  cloc: /opt/cloc\n  maat: [\"java\", \"-jar\", \"maat.jar\"]\n";
        let cfg: HotspotConfig = serde_yaml::from_str(yaml).expect("should parse");
        let tools = cfg.tools();
        assert_eq!(tools.cloc.program(), "/opt/cloc");
        assert!(tools.cloc.leading_args().is_empty());
        assert_eq!(tools.maat.program(), "java");
        assert_eq!(tools.maat.leading_args(), ["-jar".to_string(), "maat.jar".to_string()]);
        assert_eq!(tools.git, ToolCommand::new("git"), "unset tools keep their default");
    }

    #[test]
    fn test_modes_parsed() {
        let yaml = "analysis: maat\ntransform: scripts\nnormalize_renames: false\n";
        let cfg: HotspotConfig = serde_yaml::from_str(yaml).expect("should parse");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.analysis_mode(), AnalysisMode::Maat);
        assert_eq!(cfg.transform_mode(), TransformMode::Scripts);
        assert_eq!(cfg.normalize_renames, Some(false));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "unknown_setting: true\n";
        let result: Result<HotspotConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err(), "Unknown fields should be rejected by deny_unknown_fields");
    }

    #[test]
    fn test_validate_invalid_analysis_rejected() {
        let cfg: HotspotConfig = serde_yaml::from_str("analysis: \"gitstats\"\n").unwrap();
        let msg = cfg.validate().unwrap_err();
        assert!(msg.contains("analysis"), "Error should mention 'analysis': {msg}");
        assert!(msg.contains("builtin") && msg.contains("maat"), "Error should list valid values: {msg}");
    }

    #[test]
    fn test_validate_invalid_transform_rejected() {
        let cfg: HotspotConfig = serde_yaml::from_str("transform: node\n").unwrap();
        let msg = cfg.validate().unwrap_err();
        assert!(msg.contains("transform"), "Error should mention 'transform': {msg}");
    }

    #[test]
    fn test_validate_empty_scope_rejected() {
        for field in ["repo", "folder", "since", "output_dir", "scripts_dir"] {
            let yaml = format!("{field}: \"  \"\n");
            let cfg: HotspotConfig = serde_yaml::from_str(&yaml).expect("should parse");
            let result = cfg.validate();
            assert!(result.is_err(), "Empty '{field}' should be rejected");
            assert!(result.unwrap_err().contains(field), "Error for '{field}' should name the field");
        }
    }

    #[test]
    fn test_validate_empty_tool_rejected() {
        let cfg: HotspotConfig = serde_yaml::from_str("tools:\n  git: []\n").unwrap();
        let msg = cfg.validate().unwrap_err();
        assert!(msg.contains("tools.git"), "Error should name the tool: {msg}");
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("relative/dir"), PathBuf::from("relative/dir"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/projects/x"), home.join("projects/x"));
        }
    }

    // ── Example file test ─────────────────────────────────────────────────────

    #[test]
    fn test_load_example_file() {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let example_path = manifest_dir.join(".hotspot-map.example.yml");

        let cfg = load_config(&example_path).unwrap_or_else(|e| {
            panic!("Example config file should parse and validate successfully: {e}")
        });

        assert_eq!(cfg.folder.as_deref(), Some("src"), "folder should match example file");
        assert_eq!(cfg.since.as_deref(), Some("3 months"), "since should match example file");
        assert_eq!(cfg.output_dir.as_deref(), Some("generated"));
        assert_eq!(cfg.analysis_mode(), AnalysisMode::Builtin);
        assert_eq!(cfg.transform_mode(), TransformMode::Builtin);
        assert_eq!(cfg.normalize_renames, Some(true));

        let tools = cfg.tools();
        assert_eq!(tools.python.program(), "python3");
        assert_eq!(tools.maat.program(), "java");
        assert_eq!(
            tools.maat.leading_args(),
            ["-jar".to_string(), "code-maat-standalone.jar".to_string()]
        );
    }
}
