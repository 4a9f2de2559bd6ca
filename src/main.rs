#[tokio::main]
async fn main() -> anyhow::Result<()> {
    plant_monitor_lib::run().await
}
