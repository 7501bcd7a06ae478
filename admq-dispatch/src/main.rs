use admq::BrokerConfig;
use admq_dispatch::Dispatcher;
use admq_notify::TracingSender;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .with_env_filter("admq=TRACE,admq_gate=TRACE,admq_notify=TRACE,admq_dispatch=TRACE")
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    // The web process may run without a broker; the dispatcher is the
    // broker side and cannot.
    let config = match BrokerConfig::from_env() {
        Some(config) => config,
        None => {
            eprintln!("no broker configured: set ADMQ_REDIS_URL or ADMQ_REDIS_HOST");
            std::process::exit(1);
        }
    };

    let dispatcher = Dispatcher::new(config, TracingSender);
    dispatcher.run().await?;

    Ok(())
}
