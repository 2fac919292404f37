use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use pricewise_core::config::LoadOptions;
use pricewise_core::errors::{ApplicationError, InterfaceError};
use pricewise_core::pricing::{ResolutionRequest, ResolutionResult};
use pricewise_core::service::BestOfferService;
use pricewise_db::{connect_with_config, migrations, SqlOfferRepository};

use crate::commands::{build_runtime, load_config, CommandResult};

const COMMAND: &str = "best-price";

#[derive(Clone, Debug)]
pub struct BestPriceArgs {
    pub sku: String,
    pub quantity: i64,
    pub currency: String,
    pub date: Option<NaiveDate>,
}

pub fn run(options: &LoadOptions, args: BestPriceArgs) -> CommandResult {
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let request = match ResolutionRequest::new(&args.sku, args.quantity, &args.currency, date) {
        Ok(request) => request,
        Err(error) => {
            return CommandResult::failure(COMMAND, "invalid_request", error.to_string(), 2)
        }
    };

    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let correlation_id = format!("cli-{}", Uuid::new_v4());
    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let service =
            BestOfferService::new(SqlOfferRepository::new(pool.clone()), config.rate_table());
        let outcome = service
            .resolve(&request)
            .await
            .and_then(|outcome| outcome.into_result(&request.sku));
        pool.close().await;
        Ok::<Result<ResolutionResult, ApplicationError>, (&'static str, String, u8)>(outcome)
    });

    match result {
        Ok(Ok(resolved)) => {
            CommandResult::success_with(COMMAND, resolved.reasoning.clone(), &resolved)
        }
        Ok(Err(error)) => interface_failure(error.into_interface(correlation_id)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure(COMMAND, error_class, message, exit_code)
        }
    }
}

fn interface_failure(error: InterfaceError) -> CommandResult {
    tracing::debug!(
        event_name = "cli.best_price.failed",
        error = %error,
        "best-price did not produce a result"
    );

    match &error {
        InterfaceError::NotFound { message, .. } => {
            CommandResult::not_found(COMMAND, message.clone())
        }
        InterfaceError::BadRequest { message, .. } => {
            CommandResult::failure(COMMAND, "invalid_request", message.clone(), 2)
        }
        InterfaceError::ServiceUnavailable { message, correlation_id } => CommandResult::failure(
            COMMAND,
            "collaborator_unavailable",
            format!("{}: {message} (correlation id {correlation_id})", error.user_message()),
            6,
        ),
        InterfaceError::Internal { message, correlation_id } => CommandResult::failure(
            COMMAND,
            "internal",
            format!("{}: {message} (correlation id {correlation_id})", error.user_message()),
            6,
        ),
    }
}
