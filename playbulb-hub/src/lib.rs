extern crate self as playbulb_hub;

pub mod btle;
mod config;
pub mod control;
pub mod http;
pub mod lamp;
pub mod logging;
pub mod machine;
pub mod radio;
pub mod store;

use std::sync::Arc;

pub use config::{Config, DEFAULT_LISTEN};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to open bluetooth adapter: {0}")]
    Radio(#[from] radio::RadioError),
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },
    #[error("http server failed: {0}")]
    Serve(std::io::Error),
}

/// Opens the adapter, starts the lamp actor and serves HTTP until the listener fails
pub async fn run(config: Config) -> Result<(), StartupError> {
    let store = store::ColorStore::default();
    let (mailbox, inbox) = lamp::mailbox();

    let radio = btle::BtleRadio::open(config.adapter, mailbox.clone()).await?;
    let machine = machine::Machine::new(config.target, store.clone()).with_mtu(config.mtu);
    let (lamp, handle) = lamp::Lamp::new(Arc::new(radio), machine, mailbox, inbox);
    tokio::spawn(lamp.run());

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .map_err(|source| StartupError::Bind {
            addr: config.listen,
            source,
        })?;
    tracing::info!("Listening on http://{}{}", config.listen, http::STRIPE_PATH);

    http::run_server(listener, control::Control::new(store, handle))
        .await
        .map_err(StartupError::Serve)
}
