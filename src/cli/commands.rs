//! CLI command definitions using clap.
//!
//! - run: execute a task script
//! - validate: parse a script and check its variables
//! - init: bootstrap a `.gepetto/` project
//! - configure: update or print the configuration

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use gepetto::config::parse_variable;

/// Gepetto - run plain-language task scripts through a reasoning agent
#[derive(Parser, Debug)]
#[command(name = "gepetto")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// `-v NAME=VALUE`, repeatable or comma separated
#[derive(Args, Debug, Clone, Default)]
pub struct VariableArgs {
    /// Define variables as NAME=VALUE[,NAME=VALUE...]
    #[arg(
        short = 'v',
        long = "var",
        value_name = "NAME=VALUE",
        value_delimiter = ',',
        value_parser = parse_variable
    )]
    pub vars: Vec<(String, String)>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a task script
    Run {
        /// Path to the script (.gpt, .task or .test)
        script: PathBuf,

        #[command(flatten)]
        variables: VariableArgs,

        /// Enable debug logging for this run
        #[arg(short, long)]
        debug: bool,

        /// Do not write JUnit/JSON reports
        #[arg(long)]
        no_report: bool,

        /// Directory reports are written under
        #[arg(long, value_name = "DIR")]
        results_dir: Option<PathBuf>,

        /// Accept every step without calling the agent
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse a script and check that every variable it uses is defined
    Validate {
        script: PathBuf,

        #[command(flatten)]
        variables: VariableArgs,
    },

    /// Initialize a new project in the current directory
    Init {
        #[command(flatten)]
        variables: VariableArgs,
    },

    /// Update the configuration, or print it when no option is given
    Configure {
        #[command(flatten)]
        variables: VariableArgs,

        /// Maximum agent actions per step
        #[arg(long)]
        max_steps: Option<u32>,

        /// Turn debug logging on
        #[arg(long, conflicts_with = "no_debug")]
        debug: bool,

        /// Turn debug logging off
        #[arg(long)]
        no_debug: bool,

        /// Log file path
        #[arg(long)]
        log_path: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["gepetto"]).is_err());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["gepetto", "-c", "/path/to/config.yaml", "init"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/config.yaml")));
    }

    #[test]
    fn test_run_command_defaults() {
        let cli = Cli::try_parse_from(["gepetto", "run", "tasks/hello.gpt"]).unwrap();
        match cli.command {
            Commands::Run {
                script,
                variables,
                debug,
                no_report,
                results_dir,
                dry_run,
            } => {
                assert_eq!(script, PathBuf::from("tasks/hello.gpt"));
                assert!(variables.vars.is_empty());
                assert!(!debug);
                assert!(!no_report);
                assert!(results_dir.is_none());
                assert!(!dry_run);
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_run_with_variables_and_flags() {
        let cli = Cli::try_parse_from([
            "gepetto",
            "run",
            "login.task",
            "-v",
            "URL=http://localhost:3000",
            "--var",
            "USER=admin",
            "--debug",
            "--no-report",
            "--dry-run",
            "--results-dir",
            "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                variables,
                debug,
                no_report,
                results_dir,
                dry_run,
                ..
            } => {
                assert_eq!(
                    variables.vars,
                    vec![
                        ("URL".to_string(), "http://localhost:3000".to_string()),
                        ("USER".to_string(), "admin".to_string()),
                    ]
                );
                assert!(debug && no_report && dry_run);
                assert_eq!(results_dir, Some(PathBuf::from("out")));
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_comma_separated_variables_and_short_debug() {
        let cli = Cli::try_parse_from(["gepetto", "run", "a.gpt", "-v", "A=1,B=2", "-v", "C=3", "-d"]).unwrap();
        match cli.command {
            Commands::Run { variables, debug, .. } => {
                let names: Vec<&str> = variables.vars.iter().map(|(name, _)| name.as_str()).collect();
                assert_eq!(names, vec!["A", "B", "C"]);
                assert_eq!(variables.vars[1].1, "2");
                assert!(debug);
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_bad_variable_is_rejected() {
        assert!(Cli::try_parse_from(["gepetto", "run", "a.gpt", "-v", "NOVALUE"]).is_err());
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::try_parse_from(["gepetto", "validate", "a.test", "-v", "X=1"]).unwrap();
        match cli.command {
            Commands::Validate { script, variables } => {
                assert_eq!(script, PathBuf::from("a.test"));
                assert_eq!(variables.vars.len(), 1);
            }
            _ => panic!("Expected validate command"),
        }
    }

    #[test]
    fn test_init_command() {
        let cli = Cli::try_parse_from(["gepetto", "init", "-v", "HOSTNAME=https://weather.gov"]).unwrap();
        match cli.command {
            Commands::Init { variables } => {
                assert_eq!(variables.vars[0].0, "HOSTNAME");
            }
            _ => panic!("Expected init command"),
        }
    }

    #[test]
    fn test_configure_command() {
        let cli = Cli::try_parse_from(["gepetto", "configure", "--max-steps", "5", "--no-debug"]).unwrap();
        match cli.command {
            Commands::Configure {
                max_steps,
                debug,
                no_debug,
                log_path,
                ..
            } => {
                assert_eq!(max_steps, Some(5));
                assert!(!debug);
                assert!(no_debug);
                assert!(log_path.is_none());
            }
            _ => panic!("Expected configure command"),
        }
    }

    #[test]
    fn test_configure_debug_flags_conflict() {
        assert!(Cli::try_parse_from(["gepetto", "configure", "--debug", "--no-debug"]).is_err());
    }

    #[test]
    fn test_help_works() {
        // Verify help doesn't panic
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["gepetto", "--version"]);
        // Version flag causes early exit with error (expected)
        assert!(result.is_err());
    }
}
