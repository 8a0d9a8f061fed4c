#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    retail_dashboard::cli::run().await
}
