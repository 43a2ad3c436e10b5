//! Connect to a fixture server through the session-affinity transport and
//! print what it advertises.
//!
//! Usage: `mcpconform-probe [fixture-path]`, e.g. `/test/test_icf_session`.
//! The server comes from `MCPCONFORM_BASE_URL`.

use anyhow::{bail, Context, Result};
use mcpconform_core::{logging, ConformanceConfig, Fixture};
use mcpconform_transport::{ConformanceSession, SessionMode};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let config = ConformanceConfig::from_env().context("Invalid configuration")?;
    let Some(base) = config.base_url.clone() else {
        bail!("Set MCPCONFORM_BASE_URL to the server under test");
    };

    let path = std::env::args().nth(1);
    let fixture = match path.as_deref() {
        None => Fixture::Full,
        Some(path) => Fixture::ALL
            .into_iter()
            .find(|f| f.path() == path)
            .with_context(|| format!("Unknown fixture path: {}", path))?,
    };
    let endpoint = fixture.url_under(base.as_str());

    let session = ConformanceSession::connect(&endpoint, SessionMode::Affinity, &config).await?;

    if let Some(server_info) = session.server_info() {
        println!(
            "{} {} (protocol {:?})",
            server_info.server_info.name, server_info.server_info.version, server_info.protocol_version
        );
        if let Some(instructions) = &server_info.instructions {
            println!("instructions: {}", instructions);
        }
    }

    if session
        .server_info()
        .is_some_and(|info| info.capabilities.tools.is_some())
    {
        let tools = session.list_tools().await?;
        for tool in &tools.tools {
            println!(
                "tool: {} - {}",
                tool.name,
                tool.description.as_deref().unwrap_or_default()
            );
        }
    }

    if let Some(state) = session.affinity_state() {
        info!(
            cookies = state.cookies.len(),
            session = state.session.is_present(),
            "Affinity state after probe"
        );
    }

    session.close().await
}
