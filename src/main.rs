//! Sandbox runner: drives the full reconciliation flow against in-memory
//! backend and store clients, so the engine can be exercised offline.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use iap_reconciler::backend::mock::MockBackend;
use iap_reconciler::engine::{EngineConfig, EngineState, ReconcileEngine};
use iap_reconciler::model::{
    ApiEnvelope, CatalogProduct, Entitlement, EntitlementSnapshot, PeriodUnit, RecurringPeriod,
    StoreOffering,
};
use iap_reconciler::store::mock::MockStore;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "sandbox-user")]
    user_id: String,

    #[arg(long, default_value = "iap-cache")]
    cache_dir: PathBuf,

    /// Product id to purchase at the end of the run.
    #[arg(long, default_value = "plan_yearly_999")]
    buy: String,
}

fn plan(id: &str, name: &str, price: f64, period: RecurringPeriod) -> CatalogProduct {
    CatalogProduct {
        product_id: id.to_string(),
        display_name: name.to_string(),
        description: format!("{name} subscription"),
        price,
        display_price: format!("${price}"),
        recurring_period_code: period,
        product_type: "SUBSCRIPTION".to_string(),
    }
}

fn offering_for(product: &CatalogProduct) -> StoreOffering {
    StoreOffering {
        product_id: product.product_id.clone(),
        display_name: product.display_name.clone(),
        description: product.description.clone(),
        price: product.price,
        display_price: product.display_price.clone(),
        subscription_group_id: "sandbox-group".to_string(),
        period: product.recurring_period_code,
        currency_code: "USD".to_string(),
        introductory_offer: None,
        promotional_offers: Vec::new(),
    }
}

fn seed_sandbox(backend: &MockBackend, store: &MockStore, args: &Args) {
    let catalog = vec![
        plan(
            "plan_monthly_199",
            "Monthly, $1.99",
            1.99,
            RecurringPeriod::new(1, PeriodUnit::Month),
        ),
        plan(
            "plan_monthly_499",
            "Monthly Plus, $4.99",
            4.99,
            RecurringPeriod::new(1, PeriodUnit::Month),
        ),
        plan(
            "plan_yearly_999",
            "Yearly, $9.99",
            9.99,
            RecurringPeriod::new(1, PeriodUnit::Year),
        ),
    ];

    backend.set_snapshot(ApiEnvelope::success(EntitlementSnapshot {
        subscription: None,
        product_update_time_stamp: Some(1_720_000_000),
        theme_config_time_stamp: None,
    }));
    backend.set_catalog(ApiEnvelope::success(catalog.clone()));
    backend.set_purchase_response(ApiEnvelope::success(Entitlement {
        product_id: args.buy.clone(),
        service_level: "premium".to_string(),
        vendor_name: "Sandbox Vendor".to_string(),
        app_name: "Sandbox App".to_string(),
        app_platform_id: "sandbox-platform".to_string(),
        platform: "sandbox".to_string(),
        partner_user_id: args.user_id.clone(),
        start_date: 1_720_000_000,
        end_date: 1_751_536_000,
        status: "ACTIVE".to_string(),
        kind: "SUBSCRIPTION".to_string(),
        original_transaction_id: None,
    }));

    store.set_offerings(catalog.iter().map(offering_for).collect());
}

fn print_state(label: &str, state: &EngineState) {
    println!("\n[MAIN] --- {label} ---");
    println!(
        "[MAIN] loading={} purchase_in_progress={}",
        state.loading, state.purchase_in_progress
    );
    for product in &state.catalog {
        println!(
            "[MAIN]   {} {} ({})",
            product.display_price,
            product.display_name,
            product.recurring_period_code.display_text()
        );
    }
    match state.purchased_product() {
        Some(product) => println!("[MAIN] entitled to: {}", product.display_name),
        None => println!("[MAIN] no active entitlement"),
    }
    if let Some(err) = &state.last_error {
        println!("[MAIN] last error: {}: {}", err.title, err.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let backend = Arc::new(MockBackend::new());
    let store = Arc::new(MockStore::new());
    seed_sandbox(&backend, &store, &args);

    let mut engine = ReconcileEngine::new(
        EngineConfig {
            user_id: args.user_id.clone(),
            cache_dir: args.cache_dir.clone(),
        },
        backend.clone(),
        store.clone(),
    );

    engine.initialize().await;
    print_state("after initialize", engine.state());

    engine.refresh_catalog().await;
    print_state("after refresh_catalog", engine.state());

    let selected = engine
        .state()
        .catalog
        .iter()
        .find(|p| p.id() == args.buy)
        .cloned();
    match selected {
        Some(product) => {
            engine.select_product(Some(product.clone()));
            engine.purchase(&product).await;
            print_state("after purchase", engine.state());
            println!(
                "\n[MAIN] store finalized transactions: {:?}",
                store.finished_transactions()
            );
        }
        None => println!("[MAIN] product {} is not purchasable", args.buy),
    }

    engine.shutdown();
    Ok(())
}
