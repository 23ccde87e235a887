use crate::command::{Command, CommandDescriptor, Invocation, ARGS_KEY};
use crate::config::ConfigStore;
use crate::runtime::{EnvironmentGateway, EnvironmentHandle, Tool};
use crate::settings::Context;
use anyhow::Result;
use clap::Arg;

/// Pass arguments straight through to the package manager
pub struct PipCommand;

impl Command for PipCommand {
    const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
        name: "pip",
        aliases: &[],
        help: "Executes pip commands inside the project environment\n\
               Example: `pepsin pip freeze`",
        short_description: "Execute pip commands",
    };

    fn declare_arguments(&self, parser: clap::Command) -> clap::Command {
        parser.arg(
            Arg::new(ARGS_KEY)
                .value_name("command")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .help("Pip command, e.g. freeze"),
        )
    }

    async fn execute(&self, ctx: &Context, invocation: &Invocation) -> Result<()> {
        if invocation.args.is_empty() {
            return Ok(());
        }

        let config = ConfigStore::new(ctx.config_path()).load()?;
        let gateway = EnvironmentGateway::new(ctx);
        // No environment configured: use the system package manager
        let handle = if config.environment_dir.is_empty() {
            EnvironmentHandle::system(ctx.platform)
        } else {
            gateway.ensure_environment(&config.environment_dir).await?
        };

        gateway
            .run(&handle, Tool::PackageManager, &invocation.args)
            .await
    }
}
