use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::{Value, json};

use crate::app::App;
use crate::output;

#[derive(Args)]
pub struct StatusArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

pub async fn run(app: &App, args: StatusArgs) -> Result<()> {
    let base_url = app.notes.pipeline().base_url().to_string();
    let health = app.notes.health().await;
    let principal = app.principal();

    let verification = match &principal {
        Some(_) => Some(app.notes.verify_token(&app.session()).await),
        None => None,
    };

    if args.json {
        let backend = match &health {
            Ok(body) => json!({ "reachable": true, "response": body }),
            Err(e) => json!({ "reachable": false, "error": e.message() }),
        };
        let token = verification.as_ref().map(|v| match v {
            Ok(body) => json!({ "valid": true, "response": body }),
            Err(e) => json!({ "valid": false, "error": e.message() }),
        });
        let output = json!({
            "api_url": base_url,
            "backend": backend,
            "principal": principal,
            "token": token,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Jotter Status".bold().underline());
    println!();

    println!("{}", "Backend:".bold());
    print_value("url", &base_url);
    match &health {
        Ok(body) => print_value("health", &describe(body, "status").green().to_string()),
        Err(e) => print_value("health", &e.message().red().to_string()),
    }
    println!();

    println!("{}", "Session:".bold());
    match &principal {
        Some(p) => {
            print_value("user", p.greeting_name());
            print_value("uid", &p.uid);
        }
        None => print_value("user", &"not signed in".dimmed().to_string()),
    }
    match &verification {
        Some(Ok(body)) => print_value("token", &describe(body, "message").green().to_string()),
        Some(Err(e)) => print_value("token", &e.message().red().to_string()),
        None => {}
    }
    if let Some(Err(e)) = &verification
        && matches!(e.status(), Some(401 | 403))
    {
        println!();
        output::warn("The backend rejected your token. Sign in again with `jotter login`.");
    }

    Ok(())
}

fn print_value(key: &str, value: &str) {
    println!("  {:12} {}", format!("{}:", key).dimmed(), value);
}

/// Pick a readable field out of a backend answer.
fn describe(body: &Value, field: &str) -> String {
    match body.get(field).and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => match body {
            Value::String(text) if !text.is_empty() => text.clone(),
            _ => "ok".to_string(),
        },
    }
}
