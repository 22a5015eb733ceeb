use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    web::cli::run().await
}
