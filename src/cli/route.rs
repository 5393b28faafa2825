//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::config::{AppConfig, ConfigLoader, GenerationSettings};
use crate::error::{GenerationError, StorageError};
use crate::generation::GenerationOrchestrator;
use crate::history::{rollback_run, HistoryStore};
use crate::provider::HttpGenerationProvider;
use crate::run::RunStore;
use crate::store::{import_sections, SectionFilter, SectionRecord, SectionStore, Storage};
use crate::types::RunId;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::cli::command_name;
use crate::cli::parse::{Commands, ConfigCommands};
use crate::cli::presentation::{
    format_history_table, format_rollback_report, format_run_report, format_runs_table,
    format_section_tree,
};

/// Runtime context for CLI execution: workspace, loaded config, and the open store.
pub struct RunContext {
    workspace_root: PathBuf,
    config: AppConfig,
    storage: Storage,
}

/// Command-line overrides applied on top of the configured settings.
#[derive(Debug, Default, Clone)]
pub struct GenerateOverrides {
    pub iblock: Option<i64>,
    pub section: Option<u64>,
    pub limit: Option<usize>,
    pub force: bool,
}

impl GenerateOverrides {
    pub fn apply(&self, mut settings: GenerationSettings) -> GenerationSettings {
        if let Some(iblock) = self.iblock {
            settings.iblock_id = iblock;
        }
        if let Some(section) = self.section {
            settings.section_id = section;
        }
        if let Some(limit) = self.limit {
            settings.limit = limit;
        }
        if self.force {
            settings.skip_processed = false;
        }
        settings
    }
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, GenerationError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        config.validate()?;

        let store_path = config.storage.resolve_path(&workspace_root);
        let storage = Storage::open(&store_path)?;
        info!(store = %store_path.display(), "Store opened");

        Ok(Self {
            workspace_root,
            config,
            storage,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, GenerationError> {
        let started = Instant::now();
        let name = command_name(command);
        let result = self.execute_inner(command);
        self.storage.flush()?;
        info!(
            command = %name,
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, GenerationError> {
        match command {
            Commands::Generate {
                iblock,
                section,
                limit,
                force,
                format,
            } => {
                let overrides = GenerateOverrides {
                    iblock: *iblock,
                    section: *section,
                    limit: *limit,
                    force: *force,
                };
                self.handle_generate(&overrides, format)
            }
            Commands::Sections { iblock, all } => self.handle_sections(*iblock, *all),
            Commands::Import { file } => self.handle_import(file),
            Commands::History { run, format } => self.handle_history(*run, format),
            Commands::Rollback { run, yes } => self.handle_rollback(*run, *yes),
            Commands::Runs { format } => {
                format_runs_table(&self.storage.runs.list()?, format)
            }
            Commands::Config { command } => match command {
                ConfigCommands::Init { force } => self.handle_config_init(*force),
                ConfigCommands::Show => self.config.redacted().to_toml(),
            },
        }
    }

    fn handle_generate(
        &self,
        overrides: &GenerateOverrides,
        format: &str,
    ) -> Result<String, GenerationError> {
        let settings = overrides.apply(self.config.generation.clone());
        let provider = HttpGenerationProvider::new(&self.config.endpoint)?;
        let orchestrator = GenerationOrchestrator::new(
            self.storage.sections.as_ref(),
            self.storage.history.as_ref(),
            self.storage.runs.as_ref(),
            &provider,
        );

        let rt = tokio::runtime::Runtime::new().map_err(|e| {
            GenerationError::Configuration(format!("Failed to create runtime: {}", e))
        })?;
        let report = rt.block_on(orchestrator.execute(&settings))?;
        format_run_report(&report, format)
    }

    fn handle_sections(&self, iblock: i64, all: bool) -> Result<String, GenerationError> {
        let filter = SectionFilter {
            iblock_id: iblock,
            active_only: !all,
            ..SectionFilter::default()
        };
        if self.storage.sections.is_empty() {
            return Ok("Store is empty (load sections with `sectionseo import <file>`)".to_string());
        }
        let sections = self.storage.sections.list_sections(&filter, None)?;
        Ok(format_section_tree(&sections))
    }

    fn handle_import(&self, file: &Path) -> Result<String, GenerationError> {
        let path = self.resolve(file);
        let raw = std::fs::read_to_string(&path).map_err(StorageError::from)?;
        let records: Vec<SectionRecord> = serde_json::from_str(&raw).map_err(|e| {
            GenerationError::Configuration(format!(
                "Invalid section file {}: {}",
                path.display(),
                e
            ))
        })?;
        let count = import_sections(self.storage.sections.as_ref(), &records)?;
        Ok(format!(
            "Imported {} section(s) from {} ({} stored)",
            count,
            path.display(),
            self.storage.sections.len()
        ))
    }

    fn handle_history(&self, run: Option<RunId>, format: &str) -> Result<String, GenerationError> {
        let run_id = match run {
            Some(id) => self.require_run(id)?,
            None => match self.storage.runs.load_latest()? {
                Some(latest) => latest.id,
                None => return Ok("No generation runs yet".to_string()),
            },
        };
        let records = self.storage.history.list_for_run(run_id)?;
        format_history_table(run_id, &records, format)
    }

    fn handle_rollback(&self, run_id: RunId, yes: bool) -> Result<String, GenerationError> {
        self.require_run(run_id)?;
        if !yes {
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Restore all sections touched by run {} to their snapshots?",
                    run_id
                ))
                .interact()
                .map_err(|e| {
                    GenerationError::Configuration(format!("Failed to get user input: {}", e))
                })?;

            if !confirmed {
                return Ok("Rollback cancelled".to_string());
            }
        }

        let report = rollback_run(
            run_id,
            self.storage.sections.as_ref(),
            self.storage.history.as_ref(),
        )?;
        Ok(format_rollback_report(run_id, &report))
    }

    fn handle_config_init(&self, force: bool) -> Result<String, GenerationError> {
        let path = self.workspace_root.join("config").join("config.toml");
        if path.exists() && !force {
            return Err(GenerationError::Configuration(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(StorageError::from)?;
        }
        std::fs::write(&path, AppConfig::default().to_toml()?).map_err(StorageError::from)?;
        Ok(format!("Wrote {}", path.display()))
    }

    fn require_run(&self, run_id: RunId) -> Result<RunId, GenerationError> {
        match self.storage.runs.get(run_id)? {
            Some(run) => Ok(run.id),
            None => Err(StorageError::RunNotFound(run_id).into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}
