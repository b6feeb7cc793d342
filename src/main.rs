use clap::Parser;
use color_eyre::eyre::WrapErr;
use pki_audit::{
    audit::Auditor,
    cli::Cli,
    config::Config,
    output,
    pki::VaultBackend,
    telemetry,
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load_with_sources(&cli.config, None)?;
    cli.apply(&mut config);
    tracing::debug!("Loaded configuration: {:?}", config);

    let backend = VaultBackend::new(config.vault.settings())?;
    backend
        .verify_token()
        .await
        .wrap_err_with(|| format!("token lookup against {} failed", config.vault.address))?;

    let report = Auditor::new(&backend, &config.audit).run().await?;

    output::write_json(std::io::stdout().lock(), &report.records)?;
    Ok(())
}
