use pricewise_core::config::LoadOptions;
use pricewise_db::{connect_with_config, migrations, CatalogSeed, SeedResult};

use crate::commands::{build_runtime, load_config, CommandResult};

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("seed", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seed_result = CatalogSeed::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = CatalogSeed::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 5u8))?;

        let run_result = if verification.all_present {
            Ok(seed_result)
        } else {
            Err(("seed_verification", verification_failure_message(&verification.checks), 5u8))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(seed_result) => {
            CommandResult::success_with("seed", summary_message(&seed_result), &seed_result)
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn summary_message(seed: &SeedResult) -> String {
    let scenarios = seed
        .scenarios
        .iter()
        .map(|scenario| {
            format!(
                "  - {}: {} x{} in {} ({})",
                scenario.name,
                scenario.sku,
                scenario.quantity,
                scenario.currency,
                scenario.description
            )
        })
        .collect::<Vec<_>>();

    format!(
        "catalog seed loaded: {} suppliers, {} products, {} prices; scenarios:\n{}",
        seed.suppliers,
        seed.products,
        seed.prices,
        scenarios.join("\n")
    )
}

fn verification_failure_message(checks: &[(&'static str, bool)]) -> String {
    let failed_checks =
        checks.iter().filter_map(|(check, passed)| (!passed).then_some(*check)).collect::<Vec<_>>();

    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}
