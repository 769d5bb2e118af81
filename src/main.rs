use anyhow::Result;
use bankcaps::{pipeline, report, EtlConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Optional config file read from the working directory.
const CONFIG_FILE: &str = "etl.yaml";

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = EtlConfig::load_or_default(CONFIG_FILE)?;
    info!(source = %config.source_url, db = %config.db_path.display(), "config loaded");

    // ─── 3) run the pipeline ─────────────────────────────────────────
    let run = pipeline::run(&config)?;

    println!("Resulting table after extraction:");
    println!("{}", report::format_records(&run.extracted));
    println!("\nResulting table after transformation:");
    println!("{}", report::format_enriched(&run.enriched));

    for (sql, result) in &run.queries {
        println!("\nQuery: {}\n{}", sql, result);
    }

    info!("all done");
    Ok(())
}
