//! # ollie
//!
//! Command-line front end for the Ollie client core.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use tracing::info;

use ollie_client::commands::auth;
use ollie_client::engagement::{LastKnown, ToggleOutcome};
use ollie_client::moderation::{Confirmer, RemovalOutcome};
use ollie_client::{init_tracing, ClientConfig, ClientContext};
use ollie_shared::constants::APP_NAME;
use ollie_shared::{EntityKey, EntityKind, Resource, ResourceKind, UserId};

const USAGE: &str = "\
usage: ollie <command> [args]

commands:
  whoami                              show the logged-in user
  login <email> <password>            sign in with email and password
  google <id-token>                   sign in with a Google ID token
  logout                              end the session
  forgot <email>                      email a password reset link
  reset <token> <password> <confirm>  set a new password from a reset link
  status <trick|reply> <id>           show like state
  like <trick|reply> <id>             toggle like
  remove <kind> <id> [--owner <uid>]  delete a trick, comment, topic or reply
  dashboard                           admin statistics";

/// Asks on the terminal, defaulting to no.
struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("Starting {APP_NAME} client v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = ClientConfig::from_env();
    let ctx = ClientContext::open(config).context("Failed to open client state")?;
    info!(command = %command, "Running command");

    match (command.as_str(), &args[1..]) {
        ("whoami", []) => match ctx.session.profile() {
            Some(p) => println!("{} <{}> (id {}, admin: {})", p.username, p.email, p.id, p.is_admin),
            None => println!("Not logged in"),
        },
        ("login", [email, password]) => {
            let profile = auth::login(&ctx, email, password).await?;
            println!("Logged in as {}", profile.username);
        }
        ("google", [token]) => {
            let profile = auth::google_sign_in(&ctx, token).await?;
            println!("Logged in as {}", profile.username);
        }
        ("logout", []) => {
            auth::logout(&ctx)?;
            println!("Logged out");
        }
        ("forgot", [email]) => println!("{}", auth::forgot_password(&ctx, email).await?),
        ("reset", [token, password, confirm]) => {
            println!("{}", auth::reset_password(&ctx, token, password, confirm).await?);
        }
        ("status", [kind, id]) => {
            let key = entity_key(kind, id)?;
            let controller = ctx.engagement();
            let view = controller.initialize(key, LastKnown::default()).await?;
            println!(
                "{key}: {} likes, {}",
                view.count,
                if view.upvoted { "liked" } else { "not liked" }
            );
        }
        ("like", [kind, id]) => {
            let key = entity_key(kind, id)?;
            let controller = ctx.engagement();
            controller.initialize(key, LastKnown::default()).await?;
            match controller.toggle(key).await? {
                ToggleOutcome::Applied(view) => println!(
                    "{key}: {} likes, {}",
                    view.count,
                    if view.upvoted { "liked" } else { "not liked" }
                ),
                ToggleOutcome::Dropped(reason) => println!("Nothing sent: {reason:?}"),
                ToggleOutcome::Discarded => println!("Session changed, result ignored"),
            }
        }
        ("remove", [kind, id, rest @ ..]) => {
            let resource = resource(kind, id, rest)?;
            match ctx.moderation().remove(resource, &StdinConfirmer).await? {
                RemovalOutcome::Removed => println!("Deleted {} {}", resource.kind, resource.id),
                RemovalOutcome::Cancelled => println!("Cancelled"),
            }
        }
        ("dashboard", []) => {
            let dashboard = ctx.moderation().dashboard().await?;
            let stats = dashboard.stats;
            println!(
                "users {}  tricks {}  topics {}  comments {}  replies {}",
                stats.total_users,
                stats.total_tricks,
                stats.total_topics,
                stats.total_comments,
                stats.total_replies
            );
            for trick in dashboard.recent_activity.tricks {
                println!("  trick {}: {} ({} likes)", trick.id, trick.title, trick.upvote_count);
            }
        }
        _ => bail!("unrecognised command\n\n{USAGE}"),
    }

    Ok(())
}

fn entity_key(kind: &str, id: &str) -> anyhow::Result<EntityKey> {
    let kind: EntityKind = kind.parse()?;
    let id = id.parse().with_context(|| format!("invalid id: {id}"))?;
    Ok(EntityKey { kind, id })
}

fn resource(kind: &str, id: &str, rest: &[String]) -> anyhow::Result<Resource> {
    let kind: ResourceKind = kind.parse()?;
    let id = id.parse().with_context(|| format!("invalid id: {id}"))?;
    let owner = match rest {
        [] => None,
        [flag, uid] if flag == "--owner" => Some(UserId(
            uid.parse().with_context(|| format!("invalid owner id: {uid}"))?,
        )),
        _ => bail!("unexpected arguments: {}", rest.join(" ")),
    };
    Ok(Resource::new(kind, id, owner))
}
