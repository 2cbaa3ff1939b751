use std::error::Error;
use std::process;

use clap::Parser;
use cmdlet::cli::commands::execute_command;
use cmdlet::cli::{output, Cli};
use cmdlet::config::Settings;
use cmdlet::exitcode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    let settings = Settings::load(cli.config.as_deref()).unwrap_or_else(|e| {
        output::error(&e);
        process::exit(exitcode::CONFIG);
    });
    output::set_color(settings.color);

    if let Err(e) = execute_command(&cli, &settings) {
        output::error(&e);
        if settings.error_sources {
            let mut source = e.source();
            while let Some(cause) = source {
                output::cause(cause);
                source = cause.source();
            }
        }
        process::exit(e.exit_code());
    }
    process::exit(exitcode::OK);
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
