use crate::cli::actions::Action;
use crate::newsdesk::{self, ServerOptions};
use anyhow::{Context, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            redis_url,
            secret,
            admin_secret,
            allowed_origins,
            production,
        } => {
            // Fail early on malformed connection strings
            Url::parse(&dsn).context("Invalid database connection string")?;
            Url::parse(&redis_url).context("Invalid redis connection string")?;

            let options = ServerOptions {
                port,
                dsn,
                redis_url,
                secret,
                admin_secret,
                allowed_origins,
                production,
            };

            newsdesk::new(options).await?;
        }
    }

    Ok(())
}
