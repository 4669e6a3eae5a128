use anyhow::Context;
use clap::Parser;
use shop_server::{
    configure_tracing, construct_app_state,
    domain::auth::grant_admin,
    infra::{Cli, get_config_settings},
    start_server,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = get_config_settings().context("Could not read application configuration.")?;

    // _worker_guard is pulled back into the scope of main() to ensure all tracing events get
    // written to the log file when the program terminates, which is done when _worker_guard is
    // dropped.
    let _worker_guard = configure_tracing(&settings);

    let app_state = construct_app_state(settings).await?;

    if let Some(email) = cli.grant_admin {
        let admin = grant_admin(&app_state.store, &email)
            .await
            .with_context(|| format!("Could not grant the admin role to {email}."))?;
        info!(user_id = %admin.user_id, "Granted admin role to {email}");
    }

    start_server(app_state).await
}
