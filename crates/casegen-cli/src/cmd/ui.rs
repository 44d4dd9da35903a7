use anyhow::Context;
use casegen_core::config::Config;
use casegen_server::{AppState, Services};
use std::path::Path;

pub fn run(root: &Path, port: u16, no_open: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to read config.yaml")?;
    let services =
        Services::from_config(root, &config).context("cannot configure hosted services")?;
    let state = AppState::new(root.to_path_buf(), config, services);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}"))
            .await
            .with_context(|| format!("failed to bind port {port}"))?;
        let actual_port = listener.local_addr()?.port();
        println!("casegen UI → http://localhost:{actual_port}");

        tokio::select! {
            res = casegen_server::serve_on(state, listener, !no_open) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
