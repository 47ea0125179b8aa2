//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, CriteriaArgs, OutputFormat};
use crate::config::{load_config, ConnectorConfig};
use crate::connector::{PropertySource, RetsConnector};
use crate::error::{Error, Result, ResultExt};
use crate::query::{DateField, SearchCriteria};
use crate::types::OptionStringExt;
use serde::Serialize;
use serde_json::json;

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
    ///
    /// The session is logged out whether or not the command succeeds.
    pub async fn run(&self) -> Result<()> {
        let mut connector = RetsConnector::with_config(self.load_config()?)?;

        let result = match &self.cli.command {
            Commands::Login => self.login(&mut connector).await,
            Commands::Metadata => self.metadata(&mut connector).await,
            Commands::Search {
                criteria,
                criteria_json,
                raw,
            } => {
                let criteria = Self::build_criteria(criteria, criteria_json.as_deref())?;
                self.search(&mut connector, &criteria, *raw).await
            }
            Commands::Stats {
                area,
                property_type,
                lookback_days,
            } => connector
                .market_statistics(area, property_type.as_deref(), *lookback_days)
                .await
                .and_then(|stats| self.output(&stats)),
        };

        connector.logout().await;
        result
    }

    /// Load the configuration file and apply the password override
    fn load_config(&self) -> Result<ConnectorConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Configuration file not specified (use -C flag)"))?;
        let mut config = load_config(path)?;
        if let Some(password) = self.cli.password.clone().none_if_empty() {
            config.credentials.password = password;
        }
        Ok(config)
    }

    async fn login(&self, connector: &mut RetsConnector) -> Result<()> {
        connector.authenticate().await?;
        let session = connector.session();
        self.output(&json!({
            "type": "CONNECTION_STATUS",
            "status": "SUCCEEDED",
            "endpoints": {
                "search": session.search_endpoint,
                "metadata": session.metadata_endpoint,
                "login": session.login_endpoint,
                "logout": session.logout_endpoint,
                "get_object": session.get_object_endpoint,
            }
        }))
    }

    async fn metadata(&self, connector: &mut RetsConnector) -> Result<()> {
        connector.authenticate().await?;
        let session = connector.session();
        self.output(&json!({
            "type": "METADATA",
            "field_table": session.field_table,
            "property_types": session.supported_property_types,
        }))
    }

    async fn search(
        &self,
        connector: &mut RetsConnector,
        criteria: &SearchCriteria,
        raw: bool,
    ) -> Result<()> {
        if raw {
            let body = connector.search_raw(criteria).await?;
            println!("{body}");
            return Ok(());
        }
        let properties = connector.search_properties(criteria).await?;
        self.output(&properties)
    }

    /// Build criteria from JSON or from the filter flags
    pub fn build_criteria(args: &CriteriaArgs, json: Option<&str>) -> Result<SearchCriteria> {
        if let Some(json) = json {
            return serde_json::from_str(json).context("Invalid --criteria-json");
        }

        let mut criteria = SearchCriteria::new()
            .price(args.min_price, args.max_price)
            .bedrooms(args.min_beds, args.max_beds)
            .bathrooms(args.min_baths, args.max_baths)
            .square_feet(args.min_sqft, args.max_sqft)
            .dates(DateField::ListDate, args.listed_since, None)
            .max_results(args.limit);
        criteria.property_type = args.property_type.clone();
        criteria.city = args.city.clone();
        criteria.state = args.state.clone();
        criteria.status = args.status.clone();
        criteria.zip_codes = args.zip.clone();
        Ok(criteria)
    }

    /// Print a value as JSON
    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value),
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
        }
        .context("Failed to encode output")?;
        println!("{text}");
        Ok(())
    }
}
