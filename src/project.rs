//! Project bootstrap for `gepetto init`

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::{CONFIG_FILE, Config, PROJECT_DIR};
use crate::error::{GepettoError, Result};

pub const TASKS_DIR: &str = "tasks";
pub const RESULTS_DIR: &str = "results";
pub const SAMPLE_TASK_FILE: &str = "hello.gpt";

/// Variables the sample task needs
const SAMPLE_VARIABLES: [(&str, &str); 2] = [("HOSTNAME", "https://weather.gov"), ("LOCATION", "New York, NY, USA")];

/// Paths of a bootstrapped project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub config: PathBuf,
    pub tasks: PathBuf,
    pub results: PathBuf,
    pub sample_task: PathBuf,
}

impl ProjectLayout {
    pub fn under(base: &Path) -> Self {
        let root = base.join(PROJECT_DIR);
        let tasks = root.join(TASKS_DIR);
        Self {
            config: root.join(CONFIG_FILE),
            sample_task: tasks.join(SAMPLE_TASK_FILE),
            results: root.join(RESULTS_DIR),
            tasks,
            root,
        }
    }
}

fn sample_task() -> String {
    format!(
        "# Sample task\n\
         description: \"Check weather for a US city\"\n\
         tags: [smoketest]\n\
         author: \"Gepetto\"\n\
         created: \"{}\"\n\
         \n\
         Task:\n  \
           Navigate to ${{HOSTNAME}} and verify you are at the weather service.\n  \
           Search the weather for ${{LOCATION}}.\n  \
           Verify that the weather matches the requested location.\n",
        Local::now().format("%Y-%m-%d")
    )
}

/// Create `.gepetto/` under `base` with a config file, a sample task and a
/// results directory. Refuses to touch an existing project.
pub fn init(base: &Path, variables: &[(String, String)]) -> Result<ProjectLayout> {
    let layout = ProjectLayout::under(base);
    if layout.root.exists() {
        return Err(GepettoError::Config(format!(
            "Project already initialized at {}; use 'gepetto configure' to update it",
            layout.root.display()
        )));
    }

    fs::create_dir_all(&layout.tasks)?;
    fs::create_dir_all(&layout.results)?;
    log::info!("Created project directory {}", layout.root.display());

    // Sample values first so `-v` can replace them
    let config = Config::default()
        .with_overrides(SAMPLE_VARIABLES)
        .with_overrides(variables.iter().cloned());
    config.save(&layout.config)?;

    fs::write(&layout.sample_task, sample_task())?;
    log::info!("Wrote sample task {}", layout.sample_task.display());

    Ok(layout)
}
