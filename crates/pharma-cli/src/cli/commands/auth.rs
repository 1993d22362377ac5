//! Session command handlers.

use anyhow::{Context, Result, bail};
use pharma_core::auth::{SessionManager, visible_sections};

use super::print_json;

const NOT_LOGGED_IN: &str = "Not logged in. Run `pharma login` first.";

pub async fn login(session: &SessionManager, username: &str, password: &str) -> Result<()> {
    let identity = session.login(username, password).await?;
    let roles: Vec<String> = identity.roles().into_iter().collect();
    if roles.is_empty() {
        println!("Logged in as {}", identity.display_name());
    } else {
        println!(
            "Logged in as {} ({})",
            identity.display_name(),
            roles.join(", ")
        );
    }
    Ok(())
}

pub fn logout(session: &SessionManager) {
    session.logout();
    println!("Logged out");
}

pub fn whoami(session: &SessionManager) -> Result<()> {
    let identity = session.reader().identity().context(NOT_LOGGED_IN)?;
    print_json(&identity)
}

pub fn sections(session: &SessionManager) -> Result<()> {
    if !session.reader().is_authenticated() {
        bail!(NOT_LOGGED_IN);
    }
    let sections = visible_sections(&session.current_roles());
    if sections.is_empty() {
        println!("No sections available for your roles.");
    }
    for section in sections {
        println!("{section}");
    }
    Ok(())
}
