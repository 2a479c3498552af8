use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paybridge::{ClientConfig, PaymentClient, PaymentMethod, PaymentRequest, PaymentResponse};
use rust_decimal::Decimal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "paybridge", version, about = "Create and verify payments")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a payment and wait for it to settle
    Create {
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        amount: Decimal,
        /// chapa, telebirr, mpesa, cbebirr or ebirr
        #[arg(long)]
        method: Option<PaymentMethod>,
        #[arg(long)]
        tx_ref: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Poll verification for an inline mobile-money payment
    Verify {
        #[arg(long)]
        reference: String,
        #[arg(long)]
        method: PaymentMethod,
    },
    /// Look up a hosted checkout transaction
    VerifyTransaction {
        #[arg(long)]
        reference: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    tracing::info!("Provider API: {}", config.base_url);

    let client = PaymentClient::new(config)?;

    let response = match cli.command {
        Command::Create {
            mobile,
            amount,
            method,
            tx_ref,
            email,
            first_name,
            last_name,
        } => {
            let request = PaymentRequest {
                mobile,
                payment_type: method,
                amount,
                tx_ref,
                email,
                first_name,
                last_name,
                ..Default::default()
            };
            client.create_payment(request).await
        }
        Command::Verify { reference, method } => client.verify_payment(&reference, method).await,
        Command::VerifyTransaction { reference } => client.verify_transaction(&reference).await,
    };

    print_response(&response)?;

    Ok(if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_response(response: &PaymentResponse) -> Result<()> {
    let json = serde_json::to_string_pretty(response).context("Failed to encode response")?;
    println!("{}", json);
    Ok(())
}
