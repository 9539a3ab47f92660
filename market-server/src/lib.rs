//! Market Server - multi-tenant food ordering order core
//!
//! # Architecture overview
//!
//! The server exposes a RESTful API over an embedded redb store:
//!
//! - **Catalog** (`catalog`): read-side meal visibility and availability
//! - **Pricing** (`pricing`): variant selection validation and line pricing
//! - **Cart** (`cart`): per-customer cart aggregate
//! - **Orders** (`orders`): checkout transaction, cancellation, fulfilment
//! - **HTTP API** (`api`): RESTful API surface
//!
//! # Module structure
//!
//! ```text
//! market-server/src/
//! ├── core/          # config, state, server startup
//! ├── auth/          # request principal and role checks
//! ├── api/           # HTTP routes and handlers
//! ├── catalog/       # catalog reader
//! ├── pricing/       # pricing engine
//! ├── cart/          # cart service
//! ├── orders/        # order builder, executor, status machine
//! ├── db/            # redb storage layer
//! └── utils/         # logging, error re-exports
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod core;
pub mod db;
pub mod orders;
pub mod pricing;
pub mod utils;

// Re-export public types
pub use auth::Principal;
pub use cart::CartService;
pub use catalog::CatalogReader;
pub use core::{Config, Server, ServerState};
pub use db::MarketStore;
pub use orders::OrderService;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Prepare the process environment: dotenv, working directory, logging.
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __  ___           __        __
   /  |/  /___ ______/ /_____  / /_
  / /|_/ / __ `/ ___/ //_/ _ \/ __/
 / /  / / /_/ / /  / ,< /  __/ /_
/_/  /_/\__,_/_/  /_/|_|\___/\__/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
