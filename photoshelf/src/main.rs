use std::path::PathBuf;

use anyhow::Context;
use photoshelf::config::Config;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq)]
enum CliMode {
    Run { config: Option<PathBuf> },
    Help,
}

fn parse_cli_mode<I>(args: I) -> anyhow::Result<CliMode>
where
    I: IntoIterator<Item = String>,
{
    let mut config = None;
    let mut args = args.into_iter().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a path"))?;
                config = Some(PathBuf::from(value));
            }
            "--help" | "-h" => return Ok(CliMode::Help),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(CliMode::Run { config })
}

fn config_path(cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| std::env::var("PHOTOSHELF_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = match parse_cli_mode(std::env::args())? {
        CliMode::Help => {
            println!("Usage: photoshelf [--config PATH]");
            println!("  --config PATH   Configuration file (default: {DEFAULT_CONFIG_PATH},");
            println!("                  or the PHOTOSHELF_CONFIG environment variable)");
            return Ok(());
        }
        CliMode::Run { config } => config,
    };
    let path = config_path(config);
    let config = Config::load(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    run(config)
}

#[cfg(feature = "smb")]
fn run(config: Config) -> anyhow::Result<()> {
    use photoshelf::library::fs::FsLibrary;
    use photoshelf::runner::Runner;
    use photoshelf_share::SmbShareClient;

    let mut share = SmbShareClient::new(config.remote.connection.clone());
    let mut library = FsLibrary::new(config.library_root.clone());
    Runner::new(&mut share, &mut library, config.remote, config.retention).run()?;
    Ok(())
}

#[cfg(not(feature = "smb"))]
fn run(_config: Config) -> anyhow::Result<()> {
    anyhow::bail!("this build has no share backend; rebuild with --features smb")
}
