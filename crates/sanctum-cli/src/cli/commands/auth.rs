//! Sign-in, sign-up, sign-out and status.

use anyhow::Result;
use sanctum_core::auth_flow::AuthOutcome;
use sanctum_core::config::Config;
use sanctum_core::interrupt;
use sanctum_core::session::{AuthUser, mask_token};
use sanctum_core::validation::{AuthForm, AuthMode};

use super::{read_passphrase, services};

fn describe(user: &AuthUser) -> String {
    format!("{} <{}> [{}]", user.username, user.email, user.access_level)
}

pub async fn login(config: &Config, email: &str) -> Result<()> {
    let (auth, _) = services(config);
    let form = AuthForm {
        email: email.to_string(),
        password: read_passphrase()?,
        ..AuthForm::default()
    };

    let outcome = interrupt::interruptible(async {
        auth.submit(AuthMode::Login, &form)
            .await
            .map_err(anyhow::Error::from)
    })
    .await?;
    if let AuthOutcome::SignedIn(user) = outcome {
        println!("Signed in as {}", describe(&user));
    }
    Ok(())
}

pub async fn signup(config: &Config, email: &str, username: &str) -> Result<()> {
    let (auth, _) = services(config);
    let password = read_passphrase()?;
    let form = AuthForm {
        email: email.to_string(),
        confirm_password: password.clone(),
        password,
        username: username.to_string(),
    };

    let outcome = interrupt::interruptible(async {
        auth.submit(AuthMode::Signup, &form)
            .await
            .map_err(anyhow::Error::from)
    })
    .await?;
    if let AuthOutcome::SignedUp(signed_up) = outcome {
        println!("{}", signed_up.notice);
    }
    Ok(())
}

pub async fn logout(config: &Config) -> Result<()> {
    let (auth, _) = services(config);
    let restored = interrupt::interruptible(auth.current_session()).await?;
    if restored.is_none() {
        println!("Not signed in.");
        return Ok(());
    }

    interrupt::interruptible(async { auth.sign_out().await.map_err(anyhow::Error::from) })
        .await?;
    println!("Signed out.");
    Ok(())
}

pub async fn status(config: &Config) -> Result<()> {
    let (auth, _) = services(config);
    println!("Endpoint: {}", config.endpoint().url);
    match interrupt::interruptible(auth.current_session()).await? {
        Some(user) => {
            println!("Signed in as {}", describe(&user));
            if let Some(token) = auth.session().access_token() {
                println!("Token: {}", mask_token(&token));
            }
        }
        None => println!("Not signed in."),
    }
    Ok(())
}
