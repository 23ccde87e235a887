//! `pepsin init`: project metadata, environment and boilerplate

use crate::command::{Command, CommandDescriptor, Invocation};
use crate::config::{ConfigStore, ConfigUpdate};
use crate::options::Options;
use crate::prompt::Question;
use crate::runtime::EnvironmentGateway;
use crate::settings::{Context, DEFAULT_ENVIRONMENT_DIR};
use crate::templates::TemplateJob;
use anyhow::Result;
use clap::Arg;
use colored::Colorize;

/// Project name used when none is given or answered
pub const DEFAULT_PROJECT_NAME: &str = "package";

/// Answers assumed when prompting is skipped
const METADATA_DEFAULTS: &[(&str, &str)] = &[
    ("author", "Author"),
    ("email", "email@email.com"),
    ("license", "MIT"),
];

pub struct InitCommand;

impl Command for InitCommand {
    const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
        name: "init",
        aliases: &[],
        help: "Initialize virtual environment, project data and files\n\
               `pepsin init [name] [--venv <dir>]`\n\n\
               Prompts for project name, author, email and license, then creates\n\
               pepsin.yaml, the environment, a package directory with main.py and\n\
               a Readme.MD/.gitignore. Existing files are never overwritten.",
        short_description: "Initialize Virtual environment",
    };

    fn declare_arguments(&self, parser: clap::Command) -> clap::Command {
        parser
            .arg(Arg::new("name").help("Name of project"))
            .arg(
                Arg::new("venv")
                    .long("venv")
                    .default_value(DEFAULT_ENVIRONMENT_DIR)
                    .help("Virtual environment directory name"),
            )
    }

    fn declare_questions(&self, _preset: &Options) -> Vec<Question> {
        vec![
            Question::text("name", "Project Name")
                .default("src")
                .optional()
                .skip_if_preset(),
            Question::text("author", "Author").default("Author").optional(),
            Question::text("email", "Email").default("email@email.com").optional(),
            Question::text("license", "License").default("MIT").optional(),
        ]
    }

    fn format_options(&self, mut options: Options) -> Options {
        if !options.is_set("name") {
            options.insert("name", DEFAULT_PROJECT_NAME);
        }
        for (key, default) in METADATA_DEFAULTS {
            if !options.is_set(key) {
                options.insert(*key, *default);
            }
        }
        options
    }

    async fn execute(&self, ctx: &Context, invocation: &Invocation) -> Result<()> {
        let options = &invocation.options;
        let venv = options.text("venv").unwrap_or(DEFAULT_ENVIRONMENT_DIR);

        EnvironmentGateway::new(ctx).ensure_environment(venv).await?;

        let store = ConfigStore::new(ctx.config_path());
        let mut config = store.load()?;
        store.update(
            &mut config,
            ConfigUpdate::new()
                .name(options.text("name").unwrap_or(DEFAULT_PROJECT_NAME))
                .author(options.text("author").unwrap_or_default())
                .license(options.text("license").unwrap_or_default())
                .environment_dir(venv),
        )?;

        println!("\n{}", "Project initialization complete".green());
        Ok(())
    }

    fn declare_templates(&self, options: &Options) -> Vec<TemplateJob> {
        let name = options.text("name").unwrap_or(DEFAULT_PROJECT_NAME);

        let mut readme = TemplateJob::same_name("Readme.MD");
        for key in ["name", "author", "email", "license"] {
            readme = readme.with(key, options.text(key).unwrap_or_default());
        }

        vec![
            TemplateJob::same_name(".gitignore"),
            readme,
            TemplateJob::new("__init__.py", format!("{}/__init__.py", name)),
            TemplateJob::new("main.py", format!("{}/main.py", name)),
        ]
    }
}
