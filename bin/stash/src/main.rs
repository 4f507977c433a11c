//! Stash file service binary.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    stash_cli::run().await
}
