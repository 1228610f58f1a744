#[tokio::main]
async fn main() {
    club_os_backend::run().await;
}
