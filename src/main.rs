#[tokio::main]
async fn main() {
    priceproxy::cli::run().await;
}
