#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sightings::start_server().await
}
