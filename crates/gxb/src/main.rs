use std::sync::Arc;

use gxb_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), gxb_core::Error> {
    gxb_core::logging::init("gxb")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!(error = %e, "cannot start: invalid configuration");
            return Err(e);
        }
    };

    gxb_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| gxb_core::Error::External(format!("telegram bot failed: {e:#}")))?;

    Ok(())
}
