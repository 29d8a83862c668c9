#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Vote outcomes are reported through the log; only setup failures exit non-zero.
    poll_voter::run_with_config().await.map(|_| ())
}
