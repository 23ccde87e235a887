//! Front controller: picks the command named in argv and runs it

use crate::command::Registry;
use crate::error::PepsinError;
use crate::prompt::LineReader;
use crate::settings::Context;
use crate::VERSION;
use anyhow::Result;
use colored::Colorize;

/// Printed after an unknown command name
pub const COMMAND_NOT_FOUND_HINT: &str = "use 'pepsin help' to find commands";

/// Version banner followed by `name | short_description` per command
pub fn render_listing(registry: &Registry) -> String {
    let mut lines = vec![
        format!("pepsin v{}", VERSION),
        "Type the name of the command and --help for help on a specific command".to_string(),
        String::new(),
        "Available commands:".to_string(),
    ];
    for command in registry.commands() {
        let descriptor = command.descriptor();
        lines.push(format!(
            "{} | {}",
            descriptor.name, descriptor.short_description
        ));
    }
    lines.join("\n")
}

/// Dispatch `argv` (program name first) and return the process exit code
pub async fn execute(argv: &[String], ctx: &Context, reader: &mut dyn LineReader) -> Result<i32> {
    let registry = Registry::discover()?;
    let name = argv.get(1).map(String::as_str).unwrap_or("help");

    match name {
        "help" | "-h" | "--help" => match argv.get(2) {
            Some(target) => match registry.resolve(target) {
                Ok(command) => {
                    println!("{}", command.format_help());
                    Ok(0)
                }
                Err(e) => Ok(not_found(&e)),
            },
            None => {
                println!("{}", render_listing(registry));
                Ok(0)
            }
        },
        "--version" | "-V" => {
            println!("{}", VERSION);
            Ok(0)
        }
        _ => match registry.resolve(name) {
            Ok(command) => command.run(argv, ctx, reader).await,
            Err(e) => Ok(not_found(&e)),
        },
    }
}

fn not_found(err: &PepsinError) -> i32 {
    eprintln!("{}", err.to_string().red());
    eprintln!("{}", COMMAND_NOT_FOUND_HINT);
    err.exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedReader;
    use crate::runtime::Platform;
    use crate::settings::Settings;
    use tempfile::TempDir;

    fn argv(tokens: &[&str]) -> Vec<String> {
        std::iter::once("pepsin")
            .chain(tokens.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_listing_has_banner_and_every_command() {
        let listing = render_listing(Registry::discover().unwrap());
        assert!(listing.starts_with(&format!("pepsin v{}", VERSION)));
        assert!(listing.contains("install | Install library"));
        assert!(listing.contains("run | Runs script"));
        // Aliases are not listed
        assert!(!listing.contains("\nadd |"));
    }

    #[tokio::test]
    async fn test_unknown_command_exits_one() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new(dir.path(), Settings::default(), Platform::current());

        let code = execute(&argv(&["deploy"]), &ctx, &mut ScriptedReader::default())
            .await
            .unwrap();

        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn test_help_and_version_exit_zero() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new(dir.path(), Settings::default(), Platform::current());
        let mut reader = ScriptedReader::default();

        let cases: [&[&str]; 5] = [&[], &["help"], &["--help"], &["help", "install"], &["--version"]];
        for tokens in cases {
            let code = execute(&argv(tokens), &ctx, &mut reader).await.unwrap();
            assert_eq!(code, 0, "{:?}", tokens);
        }
        assert_eq!(
            execute(&argv(&["help", "deploy"]), &ctx, &mut reader).await.unwrap(),
            1
        );
    }
}
