#[tokio::main]
async fn main() {
    if let Err(e) = tokencount::run().await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
