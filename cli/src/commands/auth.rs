use anyhow::Result;
use clap::Args;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};
use identity::GateMode;
use jt_core::SessionProvider;
use serde_json::json;

use crate::app::App;
use crate::dialog::interact;
use crate::output;
use crate::ux_error;

#[derive(Args)]
pub struct LoginArgs {
    /// Create a new account instead of signing in
    #[arg(long, conflicts_with = "google")]
    pub sign_up: bool,

    /// Sign in with the configured federated (Google) identity
    #[arg(long)]
    pub google: bool,

    /// Email address (prompted when omitted)
    #[arg(long)]
    pub email: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "JOTTER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct WhoamiArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run_login(app: &App, args: LoginArgs) -> Result<()> {
    let gate = app.gate()?;
    if args.sign_up {
        gate.set_mode(GateMode::SignUp);
    }

    let result = if args.google {
        gate.federated_sign_in().await
    } else {
        let email = match args.email {
            Some(email) => email,
            None => {
                interact(|| {
                    Input::<String>::with_theme(&ColorfulTheme::default())
                        .with_prompt("Email")
                        .interact_text()
                })
                .await?
            }
        };
        let password = match args.password {
            Some(password) => password,
            None => {
                interact(|| {
                    Password::with_theme(&ColorfulTheme::default())
                        .with_prompt("Password")
                        .interact()
                })
                .await?
            }
        };
        gate.submit(&email, &password).await
    };

    match result {
        Ok(principal) => {
            let verb = match gate.mode() {
                GateMode::SignIn => "Signed in",
                GateMode::SignUp => "Account created. Signed in",
            };
            output::success(&format!("{} as {}", verb, principal.greeting_name()));
            Ok(())
        }
        Err(e) => Err(ux_error::auth_failed(&e.user_message()).into()),
    }
}

pub async fn run_logout(app: &App) -> Result<()> {
    if app.principal().is_none() {
        output::info("Not signed in.");
        return Ok(());
    }
    app.provider.sign_out().await?;
    output::success("Signed out");
    Ok(())
}

pub fn run_whoami(app: &App, args: WhoamiArgs) -> Result<()> {
    let principal = app.require_principal()?;

    if args.json {
        let output = json!({
            "uid": principal.uid,
            "email": principal.email,
            "displayName": principal.display_name,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    output::header("Signed in");
    println!("  uid:    {}", principal.uid);
    if let Some(email) = &principal.email {
        println!("  email:  {}", email);
    }
    if let Some(name) = &principal.display_name {
        println!("  name:   {}", name);
    }
    Ok(())
}
