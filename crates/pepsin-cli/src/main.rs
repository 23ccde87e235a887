//! Pepsin CLI - project-aware wrapper around pip and virtualenv

use colored::Colorize;
use pepsin_core::error::{PepsinError, DEFAULT_EXIT_CODE};
use pepsin_core::prompt::{LineReader, StdinReader, TerminalReader};
use pepsin_core::{cli, logging, Context};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    logging::init_logging();

    let code = match run().await {
        Ok(code) => code,
        Err(e) => match PepsinError::find(&e) {
            Some(domain) => {
                eprintln!("{}", domain.render().red());
                domain.exit_code()
            }
            None => {
                eprintln!("{} {:#}", "Error:".red(), e);
                DEFAULT_EXIT_CODE
            }
        },
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();
    std::process::exit(code);
}

async fn run() -> anyhow::Result<i32> {
    let ctx = Context::from_env()?;
    let argv: Vec<String> = std::env::args().collect();

    // Piped input gets plain line reads instead of the inline prompt widget
    let mut reader: Box<dyn LineReader> = if console::user_attended() {
        Box::new(TerminalReader)
    } else {
        Box::new(StdinReader)
    };

    cli::execute(&argv, &ctx, reader.as_mut()).await
}
