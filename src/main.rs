#[tokio::main]
async fn main() -> anyhow::Result<()> {
    codeq::run().await
}
