//! Runs the navigation guard against a live backend and prints its decisions.

mod cli;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zcode_access::{AccessContext, AccessLevel, Navigator, RouteTable, TracingNotifier};
use zcode_client::HttpUserClient;

use crate::cli::{CheckArgs, Cli, Command, Credentials};
use crate::config::ProbeConfig;

/// Prints what the router would do for one target.
struct ConsoleNavigator<'a> {
    target: &'a str,
    title: String,
}

impl Navigator for ConsoleNavigator<'_> {
    fn proceed(&mut self) {
        println!("{:<28} proceed   [{}]", self.target, self.title);
    }

    fn redirect(&mut self, location: &str) {
        println!("{:<28} redirect  {location}", self.target);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match ProbeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(api_base_url = %config.api_base_url, "loaded configuration");

    let client = match HttpUserClient::new(config.api_base_url.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let ctx = AccessContext::new(
        Arc::new(client),
        RouteTable::standard(),
        config.access,
        Arc::new(TracingNotifier),
    );

    let credentials = match &cli.command {
        Command::Check(args) => &args.credentials,
        Command::Whoami(credentials) => credentials,
    };
    if !sign_in(&ctx, credentials).await {
        return ExitCode::FAILURE;
    }

    match &cli.command {
        Command::Check(args) => check(&ctx, args).await,
        Command::Whoami(_) => whoami(&ctx).await,
    }

    ExitCode::SUCCESS
}

async fn sign_in(ctx: &AccessContext, credentials: &Credentials) -> bool {
    let Some((account, password)) = credentials.pair() else {
        return true;
    };
    match ctx.login(account, password).await {
        Ok(user) => {
            tracing::info!(account, level = %user.level(), "signed in");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, account, "sign-in failed");
            false
        }
    }
}

async fn check(ctx: &AccessContext, args: &CheckArgs) {
    guard_all(ctx, &args.paths).await;

    if args.then_logout {
        ctx.logout().await;
        println!("-- signed out --");
        guard_all(ctx, &args.paths).await;
    }
}

async fn guard_all(ctx: &AccessContext, paths: &[String]) {
    let app_title = ctx.guard().config().app_title();
    for path in paths {
        let mut navigator = ConsoleNavigator {
            target: path,
            title: ctx.guard().routes().page_title(path, app_title),
        };
        ctx.navigate(path, &mut navigator).await;
    }
}

async fn whoami(ctx: &AccessContext) {
    ctx.check_page_access(AccessLevel::NotLoggedIn).await;

    let level = ctx.current_level();
    ctx.session().with_current(|user| {
        println!("user:  {}", user.display_name());
        println!("level: {level}");
        if let Some(id) = &user.id {
            println!("id:    {id}");
        }
    });

    println!("menu:");
    for route in ctx.guard().routes().menu_for(level) {
        println!("  {:<20} {}", route.path, route.name);
    }
}
