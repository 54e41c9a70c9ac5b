//! Command dispatch: parsed arguments -> command intent -> task service

use std::collections::HashMap;
use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConnectionArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{ConfigError, ConfigResolver, PartialConfig, ResolvedConfig};
use crate::domain::CommandIntent;
use crate::infrastructure::di::ServiceContainer;
use crate::util::path::expand_path;

/// Execute the parsed command line.
///
/// `process_env` is the process environment, passed in so callers control
/// which `KUFLOW_*` variables are visible.
pub fn execute_command(cli: &Cli, process_env: &HashMap<String, String>) -> CliResult<()> {
    if let Commands::Completion { shell } = &cli.command {
        print_completions(*shell);
        return Ok(());
    }

    let intent = build_intent(&cli.command)?;
    let config = resolve_config(&cli.connection, process_env, &ConfigResolver::new())?;
    let container = ServiceContainer::new(config)?;
    debug!("configuration: {}", container.config);

    run_intent(&container, &intent)?;

    if !cli.silent {
        output::success(&describe(&intent));
    }
    Ok(())
}

/// Translate a subcommand into its intent.
pub fn build_intent(command: &Commands) -> CliResult<CommandIntent> {
    let intent = match command {
        Commands::SaveElementField { element, values } => CommandIntent::SaveField {
            target: element.target(),
            values: values.clone(),
        },
        Commands::SaveElementDocument {
            element,
            document_id,
            paths,
        } => CommandIntent::SaveDocument {
            target: element.target(),
            paths: paths.clone(),
            document_id: *document_id,
        },
        Commands::SaveElementDocumentByReference { element, uris } => {
            CommandIntent::SaveDocumentByReference {
                target: element.target(),
                uris: uris.clone(),
            }
        }
        Commands::SaveElementPrincipal {
            element,
            principals,
        } => CommandIntent::SavePrincipal {
            target: element.target(),
            principals: principals.clone(),
        },
        Commands::AppendLog {
            task_id,
            level,
            message,
        } => CommandIntent::AppendLog {
            task_id: *task_id,
            level: *level,
            message: message.clone(),
        },
        Commands::Completion { .. } => {
            return Err(CliError::Usage(
                "completion does not operate on a task".to_string(),
            ))
        }
    };
    Ok(intent)
}

/// Resolve connection settings from flags, files and environment.
pub fn resolve_config(
    connection: &ConnectionArgs,
    process_env: &HashMap<String, String>,
    resolver: &ConfigResolver,
) -> Result<ResolvedConfig, ConfigError> {
    let flags = PartialConfig::new(
        connection.endpoint.clone(),
        connection.client_id.clone(),
        connection
            .client_secret
            .as_ref()
            .map(|s| s.expose().to_string()),
    );
    let environment_file = connection.environment_file.as_deref().map(expand_path);
    resolver.resolve(flags, environment_file.as_deref(), process_env)
}

#[instrument(level = "debug", skip_all)]
fn run_intent(container: &ServiceContainer, intent: &CommandIntent) -> CliResult<()> {
    container.task_service().execute(intent)?;
    Ok(())
}

fn describe(intent: &CommandIntent) -> String {
    let what = match intent {
        CommandIntent::SaveField { values, .. } => format!("saved {} field value(s)", values.len()),
        CommandIntent::SaveDocument { paths, .. } => {
            format!("uploaded {} document(s)", paths.len())
        }
        CommandIntent::SaveDocumentByReference { uris, .. } => {
            format!("saved {} document reference(s)", uris.len())
        }
        CommandIntent::SavePrincipal { principals, .. } => {
            format!("saved {} principal(s)", principals.len())
        }
        CommandIntent::AppendLog { level, .. } => format!("appended {level} log entry"),
    };
    format!("{what} on task {}", intent.task_id())
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
