//! Resource command handlers (list, show, delete, transfer status).

use anyhow::{Context, Result, bail};
use pharma_core::api::types::TransferStatus;
use pharma_core::api::{BackendClient, PageRequest};
use pharma_core::auth::{AccessDecision, Section};

use super::print_json;

#[derive(clap::Subcommand)]
pub enum ResourceCommands {
    /// List one page of records
    List {
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// Records per page
        #[arg(long, default_value_t = PageRequest::DEFAULT_SIZE)]
        size: u32,
    },
    /// Show a single record
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Delete a record
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

/// Refuses locally when the stored roles cannot open `section`.
fn ensure_access(client: &BackendClient, section: Section) -> Result<()> {
    match client.session().check_access(section.allowed_roles()) {
        AccessDecision::Granted => Ok(()),
        AccessDecision::Loading | AccessDecision::Unauthenticated => {
            bail!("Not logged in. Run `pharma login` first.")
        }
        AccessDecision::Denied { roles } => {
            let roles: Vec<String> = roles.into_iter().collect();
            bail!(
                "Access denied: {section} requires one of [{}], you have [{}]",
                section.allowed_roles().join(", "),
                roles.join(", ")
            )
        }
    }
}

fn numeric_id(id: &str) -> Result<i64> {
    id.trim()
        .parse()
        .with_context(|| format!("invalid id '{id}': expected a number"))
}

pub async fn run(client: &BackendClient, section: Section, command: ResourceCommands) -> Result<()> {
    ensure_access(client, section)?;
    match command {
        ResourceCommands::List { page, size } => list(client, section, PageRequest::new(page, size)).await,
        ResourceCommands::Show { id } => show(client, section, &id).await,
        ResourceCommands::Delete { id } => {
            delete(client, section, &id).await?;
            println!("Deleted {section} {id}");
            Ok(())
        }
    }
}

async fn list(client: &BackendClient, section: Section, page: PageRequest) -> Result<()> {
    match section {
        Section::Admins => print_json(&client.admins().list(page).await?),
        Section::Managers => print_json(&client.managers().list(page).await?),
        Section::Drivers => print_json(&client.drivers().list(page).await?),
        Section::Clients => print_json(&client.clients().list(page).await?),
        Section::Bordereaux => print_json(&client.bordereaux().list(page).await?),
        Section::DeliveryItems => print_json(&client.delivery_items().list(page).await?),
        Section::Transfers => print_json(&client.transfers().list(page).await?),
    }
}

async fn show(client: &BackendClient, section: Section, id: &str) -> Result<()> {
    match section {
        Section::Admins => print_json(&client.admins().get(numeric_id(id)?).await?),
        Section::Managers => print_json(&client.managers().get(id).await?),
        Section::Drivers => print_json(&client.drivers().get(id).await?),
        Section::Clients => print_json(&client.clients().get(id).await?),
        Section::Bordereaux => print_json(&client.bordereaux().get(id).await?),
        Section::DeliveryItems => print_json(&client.delivery_items().get(id).await?),
        Section::Transfers => print_json(&client.transfers().get(numeric_id(id)?).await?),
    }
}

async fn delete(client: &BackendClient, section: Section, id: &str) -> Result<()> {
    match section {
        Section::Admins => client.admins().delete(numeric_id(id)?).await?,
        Section::Managers => client.managers().delete(id).await?,
        Section::Drivers => client.drivers().delete(id).await?,
        Section::Clients => client.clients().delete(id).await?,
        Section::Bordereaux => client.bordereaux().delete(id).await?,
        Section::DeliveryItems => client.delivery_items().delete(id).await?,
        Section::Transfers => client.transfers().delete(numeric_id(id)?).await?,
    }
    Ok(())
}

pub async fn transfer_status(client: &BackendClient, id: &str, status: &str) -> Result<()> {
    ensure_access(client, Section::Transfers)?;
    let status: TransferStatus = status.parse().map_err(anyhow::Error::msg)?;
    let transfer = client.transfers().set_status(numeric_id(id)?, status).await?;
    print_json(&transfer)
}
