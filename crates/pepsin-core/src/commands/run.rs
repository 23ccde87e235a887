use super::prepare_environment;
use crate::command::{Command, CommandDescriptor, Invocation, ARGS_KEY};
use crate::config::ConfigStore;
use crate::error::{PepsinError, DEFAULT_EXIT_CODE};
use crate::runtime::{EnvironmentGateway, Tool};
use crate::settings::Context;
use anyhow::Result;
use clap::Arg;

const SCRIPT_KEY: &str = "script";

/// Run a named script from the project config with the environment interpreter
pub struct RunCommand;

impl Command for RunCommand {
    const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
        name: "run",
        aliases: &[],
        help: "Runs a script stored under `scripts` in pepsin.yaml\n\
               `pepsin run <script> [args...]`\n\
               Example: `pepsin run start`",
        short_description: "Runs script",
    };

    fn declare_arguments(&self, parser: clap::Command) -> clap::Command {
        parser
            .arg(
                Arg::new(SCRIPT_KEY)
                    .required(true)
                    .help("Script to run"),
            )
            .arg(
                Arg::new(ARGS_KEY)
                    .value_name("args")
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true)
                    .help("Extra arguments appended to the script"),
            )
    }

    async fn execute(&self, ctx: &Context, invocation: &Invocation) -> Result<()> {
        let script = invocation.options.text(SCRIPT_KEY).unwrap_or_default();

        let store = ConfigStore::new(ctx.config_path());
        let mut config = store.load()?;
        let mut tokens: Vec<String> = match config.script(script) {
            Some(line) => line.split_whitespace().map(String::from).collect(),
            None => return Err(PepsinError::invalid(format!("No script named {}", script)).into()),
        };
        if tokens.is_empty() {
            return Err(PepsinError::invalid(format!("Script {} is empty", script)).into());
        }
        tokens.extend(invocation.args.iter().cloned());

        let gateway = EnvironmentGateway::new(ctx);
        let handle = prepare_environment(&store, &mut config, &gateway).await?;

        if let Err(e) = gateway
            .run(&handle, Tool::Interpreter, &interpreter_args(tokens))
            .await
        {
            let exit_code = match PepsinError::find(&e) {
                Some(PepsinError::ProcessExecution { exit_code, .. }) => {
                    exit_code.filter(|code| *code != 0).unwrap_or(DEFAULT_EXIT_CODE)
                }
                _ => return Err(e),
            };
            return Err(PepsinError::InvalidCommand {
                message: format!("Error in script : {}", script),
                exit_code,
            }
            .into());
        }
        Ok(())
    }
}

/// `-m <module> ...` when the first token names a module, the tokens otherwise
fn interpreter_args(tokens: Vec<String>) -> Vec<String> {
    match tokens.first() {
        Some(first) if is_module_path(first) => {
            std::iter::once("-m".to_string()).chain(tokens).collect()
        }
        _ => tokens,
    }
}

/// `app.main`, `pytest`; not `app/main.py`, `main.py` or `-c`
fn is_module_path(token: &str) -> bool {
    !token.starts_with('-')
        && !token.ends_with(".py")
        && token.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_dotted_module_runs_with_dash_m() {
        assert_eq!(interpreter_args(tokens("app.main --port 8000")), tokens("-m app.main --port 8000"));
        assert_eq!(interpreter_args(tokens("pytest -q")), tokens("-m pytest -q"));
    }

    #[test]
    fn test_files_and_flags_pass_verbatim() {
        assert_eq!(interpreter_args(tokens("app/main.py")), tokens("app/main.py"));
        assert_eq!(interpreter_args(tokens("main.py x")), tokens("main.py x"));
        assert_eq!(interpreter_args(tokens("-c print(1)")), tokens("-c print(1)"));
        assert!(!is_module_path("app..main"));
        assert!(!is_module_path("C:\\app\\main"));
    }
}
