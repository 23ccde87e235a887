use super::{prepare_environment, report, LIBRARIES_KEY};
use crate::command::{Command, CommandDescriptor, Invocation};
use crate::config::ConfigStore;
use crate::runtime::EnvironmentGateway;
use crate::settings::Context;
use anyhow::Result;
use clap::Arg;

/// Uninstall libraries and drop them from the project config
pub struct UninstallCommand;

impl Command for UninstallCommand {
    const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
        name: "uninstall",
        aliases: &[],
        help: "Uninstall a particular or multiple libraries\n\
               `pepsin uninstall <library>`\n\
               Example: `pepsin uninstall falcon`",
        short_description: "Uninstall library",
    };

    fn declare_arguments(&self, parser: clap::Command) -> clap::Command {
        parser.arg(
            Arg::new(LIBRARIES_KEY)
                .value_name("libs")
                .num_args(1..)
                .required(true)
                .help("Libraries to uninstall"),
        )
    }

    async fn execute(&self, ctx: &Context, invocation: &Invocation) -> Result<()> {
        let specs = invocation.options.list(LIBRARIES_KEY);

        let store = ConfigStore::new(ctx.config_path());
        let mut config = store.load()?;
        let gateway = EnvironmentGateway::new(ctx);
        let handle = prepare_environment(&store, &mut config, &gateway).await?;

        let result = gateway.uninstall_many(&handle, &specs).await?;
        store.remove_libraries(&mut config, &result.succeeded)?;
        report(ctx, "Uninstalled", &result);
        Ok(())
    }
}
