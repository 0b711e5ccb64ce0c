//! Session commands: sign-in, guest access and sign-out.

use anyhow::{anyhow, bail, Context as _, Result};
use colored::Colorize;
use imgseek_core::config::parse_url;
use imgseek_core::{
    AuthProvider, IdentityHandoff, Notification, SearchError, Session, SessionMode,
    SessionModeResolver,
};
use tracing::info;

use crate::utils::{render_notification, Context};

fn resolver(ctx: &Context) -> SessionModeResolver {
    SessionModeResolver::new(ctx.store.clone())
}

/// Resolve the persisted session without touching the network.
pub fn current_session(ctx: &Context) -> Result<Session> {
    resolver(ctx)
        .resolve(None)?
        .ok_or_else(|| SearchError::NoSession.into())
}

pub fn login(ctx: &Context, provider: AuthProvider) -> Result<()> {
    let address = ctx.config.auth_url(provider)?;
    info!(%provider, %address, "Starting external sign-in");

    println!("Open this address to sign in with {}:", provider.to_string().bold());
    println!("  {}", address.as_str().cyan());
    println!();
    println!(
        "When the browser lands on {}, run:",
        ctx.config.app_url.as_str().dimmed()
    );
    println!("  imgseek callback '<ADDRESS>'");
    Ok(())
}

pub fn callback(ctx: &Context, address: &str) -> Result<()> {
    let address = parse_url(address)?;
    let (handoff, cleaned) = IdentityHandoff::from_url(&address)
        .ok_or_else(|| anyhow!("No identity handoff in address: expected email and name"))?;

    let session = resolver(ctx)
        .resolve(Some(handoff))
        .context("Failed to store identity")?
        .ok_or(SearchError::NoSession)?;

    println!(
        "{} Signed in as {} <{}>",
        "✓".green().bold(),
        session.identity.name.bold(),
        session.identity.email
    );
    println!("  Continue at: {}", cleaned.as_str());
    Ok(())
}

pub fn guest(ctx: &Context, signal: &str) -> Result<()> {
    let resolver = resolver(ctx);
    if resolver.unlock_guest(signal)?.is_none() {
        bail!("Guest gate not passed: unexpected message {signal:?}");
    }
    resolver.resolve(None)?;
    println!("{}", render_notification(&Notification::GuestWelcome));
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    let session = current_session(ctx)?;
    println!("{}", session.display_name().bold());
    match session.mode {
        SessionMode::Authenticated => {
            println!("  Email:  {}", session.identity.email);
            println!("  Mode:   {}", "authenticated".green());
        }
        SessionMode::Guest => {
            println!("  Mode:   {}", "guest".yellow());
        }
    }
    println!("  Avatar: {}", session.avatar_url().dimmed());
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let mut dashboard = ctx.open(None).await?;
    let signed_out = dashboard.sign_out().await?;
    ctx.flush_notifications(&mut dashboard);
    if !signed_out {
        bail!("Logout failed");
    }
    Ok(())
}
