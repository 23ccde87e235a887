//! Generic run loop shared by every command

use super::{Command, Invocation};
use crate::error::PepsinError;
use crate::options::{Options, Value};
use crate::prompt::{LineReader, PromptEngine};
use crate::settings::Context;
use crate::templates::Materializer;
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches};
use colored::Colorize;
use tracing::debug;

/// Options key of the positional pass-through bucket
pub const ARGS_KEY: &str = "args";

/// Options key of the shared `--no-input` flag
pub const NO_INPUT_KEY: &str = "no_input";

/// The command's parser: shared flags plus its own arguments
pub fn build_parser<C: Command>(command: &C) -> clap::Command {
    let descriptor = C::DESCRIPTOR;
    let parser = clap::Command::new(descriptor.name)
        .bin_name(format!("pepsin {}", descriptor.name))
        .about(descriptor.short_description)
        .long_about(descriptor.help)
        .version(crate::VERSION)
        .arg(
            Arg::new(NO_INPUT_KEY)
                .long("no-input")
                .action(ArgAction::SetTrue)
                .help("Do not prompt, use flags and defaults only"),
        );
    command.declare_arguments(parser)
}

/// Drive one command from argv to exit code
///
/// `argv[0]` is the program, `argv[1]` the command name. `InvalidCommand` is
/// reported here and turned into its exit code; every other error is returned.
pub async fn run<C: Command>(
    command: &C,
    argv: &[String],
    ctx: &Context,
    reader: &mut dyn LineReader,
) -> Result<i32> {
    let mut parser = build_parser(command);
    let matches = match parser.try_get_matches_from_mut(argv.iter().skip(1)) {
        Ok(matches) => matches,
        Err(e) => {
            // Help and version requests land here too, with exit code 0
            let code = e.exit_code();
            e.print()?;
            return Ok(code);
        }
    };

    let mut options = collect_options(&parser, &matches);
    let args = into_list(options.remove(ARGS_KEY));

    if !options.flag(NO_INPUT_KEY) {
        let mut engine = PromptEngine::new(options.clone());
        engine.add_questions(command.declare_questions(&options));
        let prompted = engine.pending() > 0;
        if prompted {
            reader.intro(&format!("pepsin {}", C::DESCRIPTOR.name))?;
        }
        let answers = engine.run(reader)?;
        options.merge(answers.iter().map(|(k, v)| (k.clone(), v.clone())));
        if prompted {
            reader.outro("Answers collected")?;
        }
    }

    let mut options = command.format_options(options);
    options.remove(NO_INPUT_KEY);
    let invocation = Invocation { options, args };
    debug!(command = C::DESCRIPTOR.name, options = ?invocation.options, args = ?invocation.args, "executing");

    if let Err(e) = command.execute(ctx, &invocation).await {
        return match PepsinError::find(&e) {
            Some(domain @ PepsinError::InvalidCommand { .. }) => {
                eprintln!("{}", domain.render().red());
                Ok(domain.exit_code())
            }
            _ => Err(e),
        };
    }

    let mut materializer = Materializer::new(&ctx.root, ctx.settings.template_source.clone());
    materializer.add(command.declare_templates(&invocation.options));
    materializer.apply_all().await?;

    Ok(0)
}

/// Flatten parsed matches into options keyed by argument id
fn collect_options(parser: &clap::Command, matches: &ArgMatches) -> Options {
    let mut options = Options::new();

    for arg in parser.get_arguments() {
        let id = arg.get_id().as_str();
        let value = match arg.get_action() {
            ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version => {
                continue
            }
            ArgAction::SetTrue | ArgAction::SetFalse => Value::Bool(matches.get_flag(id)),
            ArgAction::Count => Value::Int(i64::from(matches.get_count(id))),
            action => {
                let values: Vec<String> = matches
                    .get_many::<String>(id)
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default();
                if takes_many(arg, action) {
                    Value::List(values)
                } else {
                    values.into_iter().next().map(Value::Text).unwrap_or(Value::Null)
                }
            }
        };
        options.insert(id, value);
    }

    options
}

fn takes_many(arg: &Arg, action: &ArgAction) -> bool {
    matches!(action, ArgAction::Append)
        || arg
            .get_num_args()
            .is_some_and(|range| range.max_values() > 1)
}

fn into_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::List(items)) => items,
        Some(Value::Text(s)) => vec![s],
        _ => Vec::new(),
    }
}
