#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    checkin_mailer::run().await;
}
