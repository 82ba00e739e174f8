// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Runs the REPL bridge from a terminal, with a headless editor in place of a real one.
//! Each line read from stdin is typed into the REPL buffer and submitted, and whatever
//! the interpreter prints is written to stdout. `Ctrl+C` interrupts the interpreter,
//! and closing stdin sends it end of input.
//!
//! Diagnostics like `"foo.scm"@12.5` in the output are navigated to as in an editor,
//! which for the headless editor only means that `foo.scm` is opened in memory.

use std::{io::Write, rc::Rc};

use clap::Parser;
use miette::IntoDiagnostic;
use r3bl_repl_bridge::{BridgeConfig, HeadlessEditor, InputPayload, PtyRuntimeFactory,
                       ReplSession, TracingConfig, WriterConfig, ok,
                       setup_default_miette_global_report_handler,
                       try_initialize_logging_global};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::clap_config::CLIArg;

const ISSUES_URL: &str = "https://github.com/r3bl-org/r3bl-open-core/issues/new";

fn main() -> miette::Result<()> {
    let cli_arg = CLIArg::parse();
    setup_default_miette_global_report_handler(ISSUES_URL);

    let config = cli_arg.apply_to(BridgeConfig::try_load_or_default(
        cli_arg.config.as_deref(),
    )?);

    try_initialize_logging_global(TracingConfig {
        writer_config: WriterConfig::File(config.log.file.clone()),
        level_filter: config.log.level_filter(),
    })?;
    // % is Display, ? is Debug.
    tracing::debug!(message = "Start logging...", cli_arg = ?cli_arg, config = ?config);

    let editor = HeadlessEditor::new().with_echo_sink(Box::new(|_buffer, text: &str| {
        let mut stdout = std::io::stdout();
        let _unused = stdout.write_all(text.as_bytes());
        let _unused = stdout.flush();
    }));
    let factory = PtyRuntimeFactory::from_bridge_config(&config);
    let command = config.interpreter.command.clone();
    let session = ReplSession::new(Rc::new(editor.clone()), factory, config);

    // Everything the bridge does happens on this one thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    let result = session.local_set().block_on(
        &runtime,
        run_repl_from_stdin(session.clone(), editor, command),
    );

    tracing::debug!(message = "Stop logging...", result = ?result);
    result
}

async fn run_repl_from_stdin(
    session: ReplSession<HeadlessEditor>,
    editor: HeadlessEditor,
    command: String,
) -> miette::Result<()> {
    let buffer = session.run_repl();
    let Some(handle) = session.buffer_process(buffer) else {
        miette::bail!("No process is bound to the REPL buffer");
    };
    let Some(mut tick_task) = session.take_tick_task(handle) else {
        miette::bail!(
            help = "Run with --enable-logging to see why in the log file.",
            "Interpreter '{}' did not start",
            command
        );
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            result = &mut tick_task => {
                let schedule = result.into_diagnostic()?;
                tracing::debug!(%handle, ticks = schedule.ticks, "interpreter done");
                break;
            }
            maybe_line = lines.next_line(), if stdin_open => {
                match maybe_line.into_diagnostic()? {
                    Some(line) => {
                        editor.type_text(buffer, &line);
                        session.submit(buffer);
                    }
                    None => {
                        stdin_open = false;
                        session.push_input(handle, InputPayload::EndOfInput);
                    }
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.into_diagnostic()?;
                session.interrupt_buffer(buffer);
            }
        }
    }

    session.kill(handle);
    ok!()
}

mod clap_config {
    use std::path::PathBuf;

    use clap::{Args, Parser};
    use r3bl_repl_bridge::BridgeConfig;

    /// More info: <https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_2/index.html>
    #[derive(Debug, Parser)]
    #[command(bin_name = "rbridge")]
    #[command(about = "🦜 Talk to a Scheme REPL through an editor shaped bridge 🌉")]
    #[command(version)]
    #[command(next_line_help = true)]
    #[command(arg_required_else_help(false))]
    /// More info: <https://docs.rs/clap/latest/clap/struct.Command.html#method.help_template>
    #[command(
        help_template = "{about}\nVersion: {bin} {version} 💻\n\nAny arguments after the options are passed to the interpreter.\nUSAGE 📓:\n  rbridge [\x1b[34moptions\x1b[0m] [\x1b[32minterpreter args\x1b[0m]\n\n[options]\n{options}"
    )]
    pub struct CLIArg {
        #[arg(
            name = "interpreter args",
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        pub interpreter_args: Vec<String>,

        #[arg(
            long,
            short = 'c',
            help = "Interpreter to run, instead of the one in the config file (default `gsi`)."
        )]
        pub command: Option<String>,

        #[arg(
            long,
            help = "Config file to use, instead of `config.json` in the r3bl-repl-bridge config folder."
        )]
        pub config: Option<PathBuf>,

        #[command(flatten)]
        pub global_options: GlobalOption,
    }

    #[derive(Debug, Args)]
    pub struct GlobalOption {
        #[arg(
            global = true,
            long,
            short = 'l',
            help = "Log app output to a file named `log.txt` for debugging."
        )]
        pub enable_logging: bool,
    }

    impl CLIArg {
        /// Command line flags win over the config file.
        pub fn apply_to(&self, mut config: BridgeConfig) -> BridgeConfig {
            if let Some(command) = &self.command {
                config.interpreter.command.clone_from(command);
            }
            if !self.interpreter_args.is_empty() {
                config.interpreter.args.clone_from(&self.interpreter_args);
            }
            if self.global_options.enable_logging {
                config.log.enabled = true;
            }
            config
        }
    }

    #[cfg(test)]
    mod tests {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn test_flags_override_config() {
            let cli_arg =
                CLIArg::parse_from(["rbridge", "-l", "--command", "scheme", "--", "-q", "-:d"]);
            let config = cli_arg.apply_to(BridgeConfig::default());

            assert_eq!(config.interpreter.command, "scheme");
            assert_eq!(config.interpreter.args, vec!["-q", "-:d"]);
            assert!(config.log.enabled);
        }

        #[test]
        fn test_no_flags_keeps_config() {
            let cli_arg = CLIArg::parse_from(["rbridge"]);
            let config = cli_arg.apply_to(BridgeConfig::default());
            assert_eq!(config, BridgeConfig::default());
        }
    }
}
