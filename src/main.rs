use robot_client::run_with_config;

#[tokio::main]
async fn main() {
    run_with_config().await;
}
