//! Configuration settings for formula building and solving

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub store: StoreConfig,
    pub solver: SolverConfig,
    pub enumeration: EnumerationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Guard against runaway generators: most clauses one `write` call may emit
    pub clause_limit: usize,
    /// Print every clause line to stdout as it is written
    pub echo: bool,
    /// When false, comments are printed to stdout too
    pub quiet: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Executable for the process backends
    pub executable: PathBuf,
    /// Arguments placed before the formula path
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// `solver formula result`, model on the last line of the result file
    Minisat,
    /// `solver formula`, `s`/`v` lines on stdout
    Competition,
    /// In-process CaDiCaL reading the same snapshot file
    Cadical,
}

impl std::str::FromStr for SolverBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "minisat" => Ok(SolverBackend::Minisat),
            "competition" => Ok(SolverBackend::Competition),
            "cadical" => Ok(SolverBackend::Cadical),
            other => anyhow::bail!("Unknown solver backend '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumerationConfig {
    pub max_solutions: usize,
    /// Also forbid every true literal of a found solution on its own
    pub aggressive_blocking: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                clause_limit: 100_000,
                echo: false,
                quiet: true,
            },
            solver: SolverConfig {
                backend: SolverBackend::Minisat,
                executable: PathBuf::from("minisat"),
                extra_args: Vec::new(),
            },
            enumeration: EnumerationConfig {
                max_solutions: 10,
                aggressive_blocking: false,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                directory: PathBuf::from("output/solutions"),
            },
        }
    }
}

impl Settings {
    /// Defaults with the in-process backend, needing no external executable
    pub fn in_process() -> Self {
        let mut settings = Self::default();
        settings.solver.backend = SolverBackend::Cadical;
        settings
    }

    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.store.clause_limit == 0 {
            anyhow::bail!("Clause limit must be positive");
        }

        if self.enumeration.max_solutions == 0 {
            anyhow::bail!("Maximum solutions must be positive");
        }

        if self.solver.backend != SolverBackend::Cadical
            && self.solver.executable.as_os_str().is_empty()
        {
            anyhow::bail!("Solver executable must be set for the {:?} backend", self.solver.backend);
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(max_solutions) = cli_overrides.max_solutions {
            self.enumeration.max_solutions = max_solutions;
        }
        if let Some(backend) = cli_overrides.backend {
            self.solver.backend = backend;
        }
        if let Some(ref executable) = cli_overrides.executable {
            self.solver.executable = executable.clone();
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.directory = output_dir.clone();
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if cli_overrides.aggressive {
            self.enumeration.aggressive_blocking = true;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub max_solutions: Option<usize>,
    pub backend: Option<SolverBackend>,
    pub executable: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub aggressive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_validate() {
        assert!(Settings::default().validate().is_ok());
        assert_eq!(Settings::in_process().solver.backend, SolverBackend::Cadical);
    }

    #[test]
    fn test_yaml_roundtrip_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config/default.yaml");
        let mut settings = Settings::default();
        settings.store.clause_limit = 42;
        settings.solver.backend = SolverBackend::Competition;
        settings.to_file(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded.store.clause_limit, 42);
        assert_eq!(loaded.solver.backend, SolverBackend::Competition);
    }

    #[test]
    fn test_validation_failures() {
        let mut settings = Settings::default();
        settings.enumeration.max_solutions = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.solver.executable = PathBuf::new();
        assert!(settings.validate().is_err());
        settings.solver.backend = SolverBackend::Cadical;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_cli_merge() {
        let mut settings = Settings::default();
        settings.merge_with_cli(&CliOverrides {
            max_solutions: Some(3),
            backend: Some(SolverBackend::Cadical),
            format: Some(OutputFormat::Json),
            aggressive: true,
            ..Default::default()
        });
        assert_eq!(settings.enumeration.max_solutions, 3);
        assert_eq!(settings.solver.backend, SolverBackend::Cadical);
        assert_eq!(settings.output.format, OutputFormat::Json);
        assert!(settings.enumeration.aggressive_blocking);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("MiniSat".parse::<SolverBackend>().unwrap(), SolverBackend::Minisat);
        assert!("glucose".parse::<SolverBackend>().is_err());
    }
}
