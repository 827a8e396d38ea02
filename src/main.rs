#[tokio::main]
async fn main() {
    let code = podext::app::startup::startup().await;
    std::process::exit(code);
}
