use clap::Parser;
use miette::Result;
use csimport::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let default_level = if global.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("CSIMPORT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("csimport={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init(args) => csimport::cli::commands::init::run(args),
        Commands::Import(args) => csimport::cli::commands::import::run(args, &global),
        Commands::Template(args) => csimport::cli::commands::template::run(args, &global),
        Commands::Logs(cmd) => csimport::cli::commands::logs::run(cmd, &global),
        Commands::Ref(cmd) => csimport::cli::commands::reference::run(cmd, &global),
    }
}
