use anyhow::Result;
use htmlcheck::lsp::server::serve;

#[tokio::main]
async fn main() -> Result<()> {
    serve().await
}
