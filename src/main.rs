use readlog::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("readlog".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber)?;

    readlog::run().await
}
