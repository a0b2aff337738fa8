#[tokio::main]
async fn main() -> anyhow::Result<()> {
    expiry_tracker::run().await
}
