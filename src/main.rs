use std::sync::Arc;

use clap::{Parser, Subcommand};
use chrono::Utc;
use refuel::{
    adapter::HttpVerifier,
    domain::{CoordinatorConfig, PurchaseIntent, VerificationRecord, TANK_CAPACITY},
    port::{Gateway, Verifier},
    service::{boot, mock},
};

const DEFAULT_VALIDATION_ENDPOINT: &str = "https://api.ios.trivialdrive.aptoide.com/iap/validate";

#[derive(Parser, Debug)]
#[command(name = "refuel", version, about = "Purchase lifecycle demo for a toy driving game", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scripted session against the in-memory sandbox gateway
    Demo {
        /// Number of purchases to attempt
        #[arg(short, long, default_value_t = 2)]
        buys: usize,

        /// Number of drives before buying
        #[arg(short, long, default_value_t = 3)]
        drives: usize,
    },

    /// Check a purchase token against the remote validation endpoint
    Verify {
        package_name: String,
        product_id: String,
        token: String,

        /// Validation endpoint to query
        #[arg(long, default_value = DEFAULT_VALIDATION_ENDPOINT)]
        endpoint: String,
    },
}

fn gauge(level: u8) -> String {
    let filled = usize::from(level);
    let empty = usize::from(TANK_CAPACITY - level);
    format!("[{}{}] {}/{}", "#".repeat(filled), ".".repeat(empty), level, TANK_CAPACITY)
}

async fn demo(buys: usize, drives: usize) -> Result<(), Box<dyn std::error::Error>> {
    let sku = "antifreeze";
    let gateway = Arc::new(mock::seeded_gateway(sku, buys));
    let verifier = Arc::new(mock::StubVerifier::approving());

    let session = boot(gateway.clone(), verifier, CoordinatorConfig::default()).await?;
    let coordinator = &session.coordinator;
    println!(
        "session up, recovered {} unfinished purchase(s), fuel {}",
        session.reconcile.granted,
        gauge(coordinator.fuel())
    );

    for product in gateway.products(None).await? {
        println!(
            "catalog: {} ({}) {} {}",
            product.title, product.sku, product.price_value, product.price_currency
        );
    }

    for _ in 0..drives {
        coordinator.spend_fuel();
        println!("drive -> {}", gauge(coordinator.fuel()));
    }

    for _ in 0..buys {
        let settlement = coordinator.buy(sku).await?;
        println!("buy {sku} -> {settlement:?}, fuel {}", gauge(coordinator.fuel()));
    }

    // An intent arriving before sign-in is dropped by the router.
    gateway.deliver_intent(PurchaseIntent {
        sku: sku.to_string(),
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    println!("intent before sign-in -> fuel {}", gauge(coordinator.fuel()));

    session.router.authorization().sign_in();
    if let Some(settlement) = session.router.catch_up().await? {
        println!(
            "intent after sign-in -> {settlement:?}, fuel {}",
            gauge(coordinator.fuel())
        );
    }

    println!("purchase history:");
    for purchase in gateway.all_purchases().await? {
        println!(
            "  {} {} {:?} order={} created={}",
            purchase.uid, purchase.sku, purchase.state, purchase.order_uid, purchase.created
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();

    match args.command {
        Some(Commands::Demo { buys, drives }) => demo(buys, drives).await?,
        Some(Commands::Verify {
            package_name,
            product_id,
            token,
            endpoint,
        }) => {
            let verifier = HttpVerifier::new(endpoint)?;
            let record = VerificationRecord {
                package_name,
                product_id,
                purchase_token: token,
                order_id: String::new(),
                purchase_time: Utc::now(),
                developer_payload: None,
            };
            match verifier.verify(&record).await {
                Ok(()) => println!("purchase verified"),
                Err(e) => println!("verification failed: {e}"),
            }
        }
        None => demo(2, 3).await?,
    }

    Ok(())
}
