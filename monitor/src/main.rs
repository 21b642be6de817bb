mod indicator;
mod report;
mod sensor;
mod service;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    service::run().await
}
