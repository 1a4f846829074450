use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use interaction_verify::config::Config;
use interaction_verify::discord::SignatureGuard;
use interaction_verify::{create_app, VERSION};

fn print_banner(addr: &SocketAddr, public_key: &str) {
    let display_host = if addr.ip().is_unspecified() {
        "localhost"
    } else {
        &addr.ip().to_string()
    };
    println!();
    println!("  \x1b[36m╔══════════════════════════════════════════╗\x1b[0m");
    println!("  \x1b[36m║\x1b[0m  \x1b[1;35minteraction-verify\x1b[0m                      \x1b[36m║\x1b[0m");
    println!("  \x1b[36m║\x1b[0m  \x1b[90mEd25519 request verification\x1b[0m           \x1b[36m║\x1b[0m");
    println!("  \x1b[36m╚══════════════════════════════════════════╝\x1b[0m");
    println!();
    println!(
        "  \x1b[32m→\x1b[0m Server running at \x1b[1;4mhttp://{}:{}\x1b[0m",
        display_host,
        addr.port()
    );
    println!("  \x1b[32m→\x1b[0m Version: \x1b[33m{}\x1b[0m", VERSION);
    println!(
        "  \x1b[32m→\x1b[0m Public key: \x1b[33m{}…\x1b[0m",
        &public_key[..8.min(public_key.len())]
    );
    println!();
    println!("  \x1b[90mEndpoints:\x1b[0m");
    println!("    \x1b[32mGET \x1b[0m /                  \x1b[90m← Health check\x1b[0m");
    println!("    \x1b[32mGET \x1b[0m /health            \x1b[90m← JSON status\x1b[0m");
    println!("    \x1b[34mPOST\x1b[0m /interactions      \x1b[90m← Discord interactions\x1b[0m");
    println!("    \x1b[34mPOST\x1b[0m /webhooks/events   \x1b[90m← Discord webhook events\x1b[0m");
    println!();
    println!("  \x1b[90mPress Ctrl+C to stop\x1b[0m");
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let guard = SignatureGuard::new(&config.discord_public_key)?
        .with_body_limit(config.max_body_bytes);

    let app = create_app(guard);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    print_banner(&addr, &config.discord_public_key);
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
