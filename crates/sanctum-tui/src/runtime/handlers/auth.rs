use std::time::Duration;

use sanctum_core::auth_flow::{AuthFlow, FAULT_MARKER};
use sanctum_core::validation::{AuthForm, AuthMode};

use super::describe;
use crate::events::{AuthUiEvent, UiEvent};

pub async fn restore(auth: AuthFlow) -> UiEvent {
    let result = auth
        .current_session()
        .await
        .map_err(|err| format!("{FAULT_MARKER}{}", describe(&err)));
    AuthUiEvent::Restored(result).into()
}

pub async fn submit(auth: AuthFlow, mode: AuthMode, form: AuthForm) -> UiEvent {
    AuthUiEvent::Submitted(auth.submit(mode, &form).await).into()
}

pub async fn return_to_login(delay: Duration) -> UiEvent {
    tokio::time::sleep(delay).await;
    AuthUiEvent::ReturnToLogin.into()
}

pub async fn sign_out(auth: AuthFlow) -> UiEvent {
    AuthUiEvent::SignedOut(auth.sign_out().await).into()
}
