use std::sync::Arc;

use anyhow::Context;
use webchain_core::{MiddlewareChain, TracingLog, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    webchain_observability::init();

    let config = webchain_api::ServerConfig::from_env().context("invalid server configuration")?;

    let chain = MiddlewareChain::new([logging(Arc::new(TracingLog))]);
    let handler = chain.wrap_action(webchain_api::demo::handle);

    webchain_api::serve(handler, config)
        .await
        .context("server stopped with an error")?;

    Ok(())
}
