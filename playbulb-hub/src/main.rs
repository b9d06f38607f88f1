#[derive(clap::Parser)]
#[command(name = "playbulb-hub")]
#[command(about = "Controls a Playbulb lamp over BLE from an HTTP endpoint")]
struct Cli {
    /// Hardware address of the lamp, e.g. AA:BB:CC:DD:EE:FF (any case)
    peripheral_id: String,
    /// Address the HTTP server listens on
    #[arg(short, long, default_value = playbulb_hub::DEFAULT_LISTEN)]
    listen: std::net::SocketAddr,
    /// Bluetooth adapter to use, by index
    #[arg(short, long, default_value = "0")]
    adapter: usize,
    /// MTU requested after connecting to the lamp
    #[arg(long, default_value_t = playbulb_proto::ble::PREFERRED_MTU)]
    mtu: u16,
    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli: Cli = clap::Parser::parse();
    playbulb_hub::logging::init(&cli.log_level);

    let config = playbulb_hub::Config {
        listen: cli.listen,
        adapter: cli.adapter,
        mtu: cli.mtu,
        ..playbulb_hub::Config::new(&cli.peripheral_id)
    };

    if let Err(e) = playbulb_hub::run(config).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
