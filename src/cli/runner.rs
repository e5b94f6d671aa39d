//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ListArgs, OutputFormat, ResourceArgs, ResourceKind};
use crate::client::{Domain, RestClient};
use crate::config::ClientConfig;
use crate::error::{Error, Result, ResultExt};
use crate::pagination::{Control, ListQuery, TraversalEnd};
use crate::resource::Collection;
use crate::types::{JsonObject, JsonValue};
use serde_json::json;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = RestClient::new(self.load_config()?)?;

        match &self.cli.command {
            Commands::List {
                resource,
                query,
                limit,
            } => self.list(&client, resource, query, *limit).await,
            Commands::Page {
                resource,
                query,
                url,
            } => self.page(&client, resource, query, url.as_deref()).await,
            Commands::Fetch { resource, sid } => self.fetch(&client, resource, sid).await,
        }
    }

    fn load_config(&self) -> Result<ClientConfig> {
        match self.cli.config {
            Some(ref path) => ClientConfig::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display())),
            None => ClientConfig::from_env(),
        }
    }

    async fn list(
        &self,
        client: &RestClient,
        resource: &ResourceArgs,
        args: &ListArgs,
        limit: Option<u64>,
    ) -> Result<()> {
        let collection = collection_for(client, resource)?;
        let mut query = build_query(client, args);
        if let Some(limit) = limit {
            query = query.with_limit(limit);
        }

        let outcome = collection
            .each(&query, |record| {
                self.output_record(&JsonValue::Object(record));
                Control::Continue
            })
            .await?;

        info!(
            "Read {} records from {} in {} pages",
            outcome.delivered,
            collection.uri(),
            outcome.pages_fetched
        );
        match outcome.end {
            TraversalEnd::Failed(e) => Err(e),
            _ => Ok(()),
        }
    }

    async fn page(
        &self,
        client: &RestClient,
        resource: &ResourceArgs,
        args: &ListArgs,
        url: Option<&str>,
    ) -> Result<()> {
        let collection = collection_for(client, resource)?;
        let page = match url {
            Some(url) => collection.get_page(url).await?,
            None => collection.page(&build_query(client, args)).await?,
        };

        info!(
            "Page {} of {}: {} records",
            page.page_number(),
            collection.uri(),
            page.len()
        );
        let next_page_url = page.next_page_url().map(str::to_string);
        for record in page.into_records() {
            self.output_record(&JsonValue::Object(record));
        }
        if let Some(next) = next_page_url {
            self.output_record(&json!({ "next_page_url": next }));
        }
        Ok(())
    }

    async fn fetch(&self, client: &RestClient, resource: &ResourceArgs, sid: &str) -> Result<()> {
        let record = collection_for(client, resource)?.item(sid)?.fetch().await?;
        self.output_record(&JsonValue::Object(record));
        Ok(())
    }

    fn output_record(&self, record: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(record).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(record).unwrap_or_default());
            }
        }
    }
}

/// Untyped collection for the selected resource
fn collection_for(client: &RestClient, args: &ResourceArgs) -> Result<Collection<JsonObject>> {
    let services = || client.collection::<JsonObject>(Domain::Chat, "v2/Services", "");
    let service = || {
        args.service
            .as_deref()
            .ok_or_else(|| Error::invalid_argument("service", "--service is required"))
    };

    match args.resource {
        ResourceKind::Messages => Ok(client.collection(
            Domain::Api,
            &format!("2010-04-01/Accounts/{}/Messages", client.account_sid()),
            ".json",
        )),
        ResourceKind::Services => Ok(services()),
        ResourceKind::Channels => Ok(services().item(service()?)?.collection("Channels")),
        ResourceKind::Members => {
            let channel = args
                .channel
                .as_deref()
                .ok_or_else(|| Error::invalid_argument("channel", "--channel is required"))?;
            Ok(services()
                .item(service()?)?
                .collection::<JsonObject>("Channels")
                .item(channel)?
                .collection("Members"))
        }
    }
}

fn build_query(client: &RestClient, args: &ListArgs) -> ListQuery {
    let mut query = client.default_query();
    if let Some(size) = args.page_size {
        query = query.with_page_size(size);
    }
    args.filters
        .iter()
        .fold(query, |query, (key, value)| query.with_filter(key, value))
}
