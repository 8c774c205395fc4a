#[tokio::main]
async fn main() {
    shareride_backend::run().await;
}
