#[tokio::main]
async fn main() -> anyhow::Result<()> {
    imei_blackbird_lib::run().await
}
