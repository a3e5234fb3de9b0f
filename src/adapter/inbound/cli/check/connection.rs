use crate::adapter::inbound::cli::command::CheckConnectionArgs;
use crate::adapter::inbound::cli::{config, output};
use crate::adapter::outbound::postgres::PgConnector;
use crate::error::Result;
use crate::port::{DbError, Session};

/// Open one session against the target and report what answered.
pub async fn execute(args: &CheckConnectionArgs) -> Result<()> {
    let mut config = config::load(args.config.as_deref())?;
    config::apply_target(&mut config, &args.target);
    config.validate()?;

    output::section("Connection Check");
    output::field("Target", config.database.target());
    output::field("User", &config.database.user);

    let connector = PgConnector::new(config.database.connection_params());
    let session = connector.connect_session().await?;

    if !session.is_alive().await {
        session.close().await;
        return Err(DbError::connectivity("liveness query failed").into());
    }
    let version = session.server_version().await;
    session.close().await;

    match version {
        Ok(version) => output::field("Server version", version),
        Err(e) => output::warning(&format!("Could not read server version: {e}")),
    }
    output::success("Connection check passed");
    Ok(())
}
