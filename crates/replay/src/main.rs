use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use mdns_cache::CacheConfig;
use mdns_common::ZERO_TTL_GRACE_SECS;
use mdns_replay::{ReplayOptions, replay_file};

#[derive(Parser, Debug)]
#[command(
    name = "mdns-replay",
    about = "Executa um trace de registros mDNS contra o cache"
)]
struct Args {
    /// Arquivo de trace (uma operação por linha)
    #[arg(value_name = "TRACE")]
    trace: PathBuf,
    /// TTL efetivo, em segundos, de registros com TTL zero
    #[arg(long, default_value_t = ZERO_TTL_GRACE_SECS)]
    zero_ttl_grace_secs: u64,
    /// Compara a classe inteira, inclusive o bit de cache-flush
    #[arg(long)]
    strict_class: bool,
    /// Varre registros expirados antes de cada find
    #[arg(long)]
    cleanup_before_find: bool,
    /// Ignora linhas inválidas em vez de abortar
    #[arg(long)]
    lenient: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mdns_replay=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = CacheConfig {
        zero_ttl_grace: Duration::from_secs(args.zero_ttl_grace_secs),
        mdns_class_comparison: !args.strict_class,
    };
    let options = ReplayOptions {
        cleanup_before_find: args.cleanup_before_find,
        lenient: args.lenient,
    };

    info!("replay de {:?}", args.trace);
    let report = replay_file(&args.trace, config, options, |offset, outcome| {
        println!("{offset:>8}ms {outcome}");
    })?;

    info!(
        "{} eventos: {} adicionados, {} alterados, {} inalterados, {} removidos, {} consultas, {} linhas ignoradas",
        report.events,
        report.added,
        report.changed,
        report.unchanged,
        report.removed,
        report.queries,
        report.skipped_lines
    );

    Ok(())
}
