//! Gymdesk CLI Demo
//!
//! Signs in to a Gymdesk backend and prints a page of the dashboard. Every call goes
//! through the authenticated client, so an expired token is refreshed and the call
//! replayed without the command noticing.
//!
//! Run with:
//!   GYMDESK_API_URL=http://localhost:3000 GYMDESK_PASSWORD=hunter2 \
//!     cargo run -p gymdesk-cli -- --role gym --email owner@gym.test clients --search ann

mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gymdesk_client::api;
use gymdesk_client::auth::{Access, AuthSession, Role};
use gymdesk_client::{ClientConfig, GymId};

/// Browse a Gymdesk dashboard from the terminal
#[derive(Parser, Debug)]
#[command(name = "gymdesk-cli")]
#[command(about = "Sign in to Gymdesk and print dashboard data")]
struct Args {
    /// Dashboard role to sign in as (gym, trainer, client, super-admin)
    #[arg(long, short = 'r', default_value = "gym")]
    role: Role,

    /// Login email
    #[arg(long, short = 'e', env = "GYMDESK_EMAIL")]
    email: String,

    /// Login password
    #[arg(long, env = "GYMDESK_PASSWORD", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the signed-in account's profile
    Profile,
    /// List the gym's clients
    Clients {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List the gym's trainers
    Trainers {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List registered gyms (super-admin)
    Gyms {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value_t = api::super_admin::DEFAULT_GYMS_PAGE_SIZE)]
        limit: u32,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show the member's current plan and gym (client)
    Membership {
        /// Gym to show alongside the plan
        #[arg(long)]
        gym: Option<String>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Clients { .. } => "clients",
            Self::Trainers { .. } => "trainers",
            Self::Gyms { .. } => "gyms",
            Self::Membership { .. } => "membership",
        }
    }

    fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Self::Profile => &[Role::Gym, Role::Client, Role::SuperAdmin],
            Self::Clients { .. } | Self::Trainers { .. } => &[Role::Gym],
            Self::Gyms { .. } => &[Role::SuperAdmin],
            Self::Membership { .. } => &[Role::Client],
        }
    }
}

async fn sign_in(session: &AuthSession, args: &Args) -> anyhow::Result<()> {
    if session.restore().await {
        if let Some(user) = session.user() {
            output::display_signed_in(&user, true);
            return Ok(());
        }
    }

    let grant = api::auth::login(session.client(), args.role, &args.email, &args.password)
        .await
        .context("login failed")?;
    output::display_signed_in(&grant.user, false);
    session.login(grant.access_token, grant.user);
    Ok(())
}

async fn run(session: &AuthSession, command: &Command) -> anyhow::Result<()> {
    let client = session.client();
    let role = session.user().map(|u| u.role);

    match command {
        Command::Profile => {
            let profile = match role {
                Some(Role::SuperAdmin) => {
                    serde_json::to_value(api::super_admin::get_profile(client).await?)?
                }
                Some(Role::Client) => serde_json::to_value(api::member::get_profile(client).await?)?,
                _ => serde_json::to_value(api::gym::get_profile(client).await?)?,
            };
            output::display_json(&profile);
        }
        Command::Clients { page, search } => {
            let envelope = api::gym::list_clients(client, *page, search).await?;
            output::display_clients(&envelope.data.unwrap_or_default());
        }
        Command::Trainers { page, search } => {
            output::display_trainers(&api::gym::list_trainers(client, *page, search).await?);
        }
        Command::Gyms {
            page,
            limit,
            search,
        } => {
            output::display_gyms(&api::super_admin::list_gyms(client, *page, *limit, search).await?);
        }
        Command::Membership { gym } => {
            let membership = api::member::latest_membership(client).await?;
            output::display_membership(membership.as_ref());
            if let Some(gym) = gym {
                let view = api::member::view_gym(client, &GymId::new(gym.as_str())).await?;
                output::display_json(&serde_json::to_value(view)?);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Quiet by default, use RUST_LOG=gymdesk_client=debug to watch refreshes
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ClientConfig::from_env().context("reading GYMDESK_* settings")?;
    let session = AuthSession::connect(config)?;

    sign_in(&session, &args).await?;

    match session.authorize(args.command.allowed_roles()) {
        Access::Allowed => {}
        Access::Forbidden => {
            output::display_wrong_role(args.command.name(), args.role);
            session.logout().await;
            return Ok(());
        }
        Access::Loading | Access::Anonymous => {
            output::display_error("not signed in");
            return Ok(());
        }
    }

    let result = run(&session, &args.command).await;
    if let Err(e) = &result {
        tracing::debug!(error = ?e, "command failed");
    }

    // Sign out on the server either way so the refresh cookie is revoked
    session.logout().await;
    result
}
