//! Example demonstrating search session tracing instrumentation.
//!
//! Run with: cargo run -p imgseek-core --example session_tracing
//!
//! Uses the mock API, so no server is needed. Set `IMGSEEK_API_URL` and pass
//! `--http` to trace a real server instead.

use std::sync::Arc;

use imgseek_core::{
    ClientConfig, Dashboard, HttpSearchApi, MemorySessionStore, MockSearchApi, SearchApi,
    SessionModeResolver,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::new("imgseek_core=debug,info"))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!("=== Search Session Tracing Demo ===\n");

    let api: Arc<dyn SearchApi> = if std::env::args().any(|a| a == "--http") {
        let config = match ClientConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Bad configuration: {}", e);
                return;
            }
        };
        println!("Config: {:?}\n", config);
        match HttpSearchApi::new(config) {
            Ok(api) => Arc::new(api),
            Err(e) => {
                eprintln!("Failed to create client: {}", e);
                return;
            }
        }
    } else {
        Arc::new(MockSearchApi::default())
    };

    let store = Arc::new(MemorySessionStore::new());
    if let Err(e) = SessionModeResolver::new(store.clone()).sign_in_guest() {
        eprintln!("Failed to sign in: {}", e);
        return;
    }

    let mut dashboard = match Dashboard::open(store, api, None).await {
        Ok(Some(d)) => d,
        Ok(None) => {
            eprintln!("No session");
            return;
        }
        Err(e) => {
            eprintln!("Failed to open dashboard: {}", e);
            return;
        }
    };

    println!("\nSearching and paginating...\n");
    dashboard.search("mountains").await;
    dashboard.next_page().await;

    for notification in dashboard.take_notifications() {
        println!("   {}", notification);
    }
    println!(
        "\nLoaded {} images, page {}",
        dashboard.results().len(),
        dashboard.controller().page()
    );
}
