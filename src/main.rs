use anyhow::{Context, Result};
use nginx_log_parser::{logging, scan_file, Cli, Reporter};

fn main() -> Result<()> {
    let cli = Cli::parse_args(std::env::args_os());
    logging::init_logging();

    let outcome = scan_file(&cli.path, cli.scan_config())
        .with_context(|| format!("couldn't read log {}", cli.path.display()))?;
    let report = Reporter::new(cli.report_options(), cli.filter()).render(&outcome)?;
    print!("{report}");
    Ok(())
}
