// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Global [miette](https://docs.rs/miette/latest/miette/index.html) report hook for the
//! `rbridge` binary. The library itself never surfaces errors from the bridge operations
//! (they silently no-op), so this hook only formats the errors that can escape `main()`:
//! a malformed config file, or a log file that can't be created.

use miette::MietteHandlerOpts;
use tracing::debug;

/// Fallback width when the terminal size can't be queried (eg, stdout is piped).
pub const DEFAULT_REPORT_WIDTH: usize = 80;

/// The [`miette::ErrorHook`] is lazily evaluated.
///
/// The terminal width is calculated just at the time the global error handler is used.
/// If an error never occurs, then the terminal width is never calculated.
pub fn setup_default_miette_global_report_handler(issues_url: &'static str) {
    miette::set_hook(Box::new(move |_report| {
        let terminal_width = {
            let it = crossterm::terminal::size()
                .map_or(DEFAULT_REPORT_WIDTH, |(columns, _rows)| usize::from(columns));
            debug!("miette::set_hook -> terminal_width: {}", it);
            it
        };
        Box::new(
            MietteHandlerOpts::new()
                .width(terminal_width)
                .wrap_lines(true)
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .with_cause_chain()
                .footer(issues_url.to_string())
                .build(),
        )
    }))
    .ok();
}
