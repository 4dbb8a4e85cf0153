use clap::Parser;
use color_eyre::Result;
use eyre::Context as _;
use sevone_exporter::{
    init_logging,
    Exporter,
    Plan,
};
use sevone_exporter_config::{
    Args,
    Settings,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.verbose)?;

    let settings = Settings::new(args).context("Failed to load configuration")?;
    settings.validate()?;
    let plan = Plan::from_settings(&settings)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    Exporter::new(settings, plan).run(&mut out).await?;
    Ok(())
}
