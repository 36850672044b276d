//! stayhub server: hotel listings, bookings, and role-gated access.
//!
//! Usage:
//!   stayhub [--port 3000] [--upload-dir uploads]
//!
//! Environment variables:
//!   STAYHUB_PORT            - Port to listen on (default: 3000)
//!   STAYHUB_FRONTEND_ORIGIN - Origin allowed for credentialed CORS
//!   STAYHUB_UPLOAD_DIR      - Directory for uploaded images
//!   STAYHUB_ENV             - "production" enables the Secure cookie flag
//!   STAYHUB_JWT_SECRET      - Session token signing secret
//!   STAYHUB_ADMIN_EMAIL     - Reserved admin email
//!   STAYHUB_ADMIN_PASSWORD  - Reserved admin password

use stayhub::api;
use stayhub::config::AppConfig;

#[tokio::main]
async fn main() {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = parse_config();

    eprintln!("stayhub starting...");
    eprintln!("Port: {}", config.port);
    eprintln!("Upload dir: {}", config.upload_dir);

    if let Err(e) = api::run(config).await {
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn parse_config() -> AppConfig {
    let mut config = AppConfig::from_env();

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                if let Ok(port) = args[i + 1].parse() {
                    config.port = port;
                }
                i += 2;
            }
            "--upload-dir" if i + 1 < args.len() => {
                config.upload_dir = args[i + 1].clone();
                i += 2;
            }
            _ => i += 1,
        }
    }

    config
}
