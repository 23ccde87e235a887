use super::{library_arguments, prepare_environment, report, LIBRARIES_KEY, REQUIREMENTS_KEY};
use crate::command::{Command, CommandDescriptor, Invocation};
use crate::config::{ConfigStore, ConfigUpdate};
use crate::runtime::{collect_specs, EnvironmentGateway};
use crate::settings::{Context, DEFAULT_ENVIRONMENT_DIR};
use anyhow::Result;
use colored::Colorize;

/// Install libraries and record them in the project config
pub struct InstallCommand;

impl Command for InstallCommand {
    const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
        name: "install",
        aliases: &["i", "add", "append"],
        help: "Install a particular or multiple libraries\n\
               `pepsin install <library>`\n\
               Example: `pepsin install django`\n\n\
               Without arguments, installs every library listed in pepsin.yaml.",
        short_description: "Install library",
    };

    fn declare_arguments(&self, parser: clap::Command) -> clap::Command {
        library_arguments(parser, "install")
    }

    async fn execute(&self, ctx: &Context, invocation: &Invocation) -> Result<()> {
        let store = ConfigStore::new(ctx.config_path());
        let mut config = store
            .ensure_initialized(ConfigUpdate::new().environment_dir(DEFAULT_ENVIRONMENT_DIR))?;
        let gateway = EnvironmentGateway::new(ctx);
        let handle = prepare_environment(&store, &mut config, &gateway).await?;

        let mut libraries = invocation.options.list(LIBRARIES_KEY);
        let requirements = invocation.options.text(REQUIREMENTS_KEY);
        if libraries.is_empty() && requirements.is_none() {
            libraries = config.libraries.clone();
        }

        let specs = collect_specs(&ctx.root, &libraries, requirements)?;
        if specs.is_empty() {
            println!("{}", "Nothing to install".dimmed());
            return Ok(());
        }

        let result = gateway.install_many(&handle, &specs).await?;
        store.update(&mut config, ConfigUpdate::new().libraries(result.succeeded.clone()))?;
        report(ctx, "Installed", &result);
        Ok(())
    }
}
