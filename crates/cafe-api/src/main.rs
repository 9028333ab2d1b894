//! # CafeRadius
//!
//! Café listings and voucher issue/verify over a hosted Supabase project.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export SUPABASE_URL=https://<project>.supabase.co
//! export SUPABASE_KEY=...
//!
//! # Run the server
//! caferadius
//! ```

use cafe_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment());
    info!("Record store: {}", state.store.backend_name());
    if state.config.enforce_expiry {
        info!("Voucher expiry is enforced on verification");
    }

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server läuft auf Port {}", addr.port());

    if !is_prod {
        info!("Health: http://{}/api/health", addr);
        info!("Vouchers: POST http://{}/api/vouchers/create", addr);
    }

    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  ☕ CafeRadius ☕
  ━━━━━━━━━━━━━━━
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
