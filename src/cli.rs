use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use argh::FromArgs;

use crate::address::parse_account;
use crate::balance::sol_balance;
use crate::history::simplified_history;
use crate::models::{ReadOutcome, SimplifiedTransaction};
use crate::payment::{send_sol, PaymentError};
use crate::rpc_client::SolanaRpc;
use crate::settings::Config;
use crate::signer::KeypairSigner;

#[derive(FromArgs, Debug)]
/// Check a SOL balance, list recent transfers and send payments.
pub struct Args {
    /// path to a YAML config file (defaults to ./solpay.yaml when present)
    #[argh(option)]
    pub config: Option<PathBuf>,

    #[argh(subcommand)]
    pub command: Command,
}

#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand)]
pub enum Command {
    Balance(BalanceCommand),
    History(HistoryCommand),
    Send(SendCommand),
}

#[derive(FromArgs, Debug, PartialEq)]
/// Show the confirmed balance of an address.
#[argh(subcommand, name = "balance")]
pub struct BalanceCommand {
    /// account address
    #[argh(positional)]
    pub address: String,
}

#[derive(FromArgs, Debug, PartialEq)]
/// List recent SOL transfers of an address.
#[argh(subcommand, name = "history")]
pub struct HistoryCommand {
    /// account address
    #[argh(positional)]
    pub address: String,

    /// number of signatures to look at
    #[argh(option, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(FromArgs, Debug, PartialEq)]
/// Send SOL, signing with a keypair file.
#[argh(subcommand, name = "send")]
pub struct SendCommand {
    /// recipient address
    #[argh(positional)]
    pub recipient: String,

    /// amount in SOL
    #[argh(positional)]
    pub amount: f64,

    /// keypair file of the sender
    #[argh(option)]
    pub keypair: Option<PathBuf>,
}

pub async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let ledger = SolanaRpc::new(&config).context("Failed to create rpc client")?;

    match args.command {
        Command::Balance(cmd) => {
            let account = parse_account(&cmd.address)?;
            match sol_balance(&ledger, &account).await {
                ReadOutcome::Found(sol) => println!("{sol} SOL"),
                _ => println!("Balance unavailable"),
            }
        }
        Command::History(cmd) => {
            let account = parse_account(&cmd.address)?;
            let limit = cmd.limit.unwrap_or(config.history_limit);
            match simplified_history(&ledger, &account, limit).await {
                ReadOutcome::Found(transactions) => println!("{}", format_history(&transactions)),
                ReadOutcome::Empty => println!("{}", format_history(&[])),
                ReadOutcome::Unavailable => println!("History unavailable"),
            }
        }
        Command::Send(cmd) => {
            let keypair_path = cmd
                .keypair
                .or(config.keypair_path)
                .ok_or_else(|| anyhow!("No keypair given, use --keypair or set keypair_path"))?;
            let signer = KeypairSigner::from_file(&keypair_path)?;
            let sender = signer.account();

            match send_sol(&ledger, &sender, &cmd.recipient, cmd.amount, &signer).await {
                Ok(signature) => println!("{signature}"),
                Err(PaymentError::ConfirmationFailed { signature, source }) => {
                    println!("{signature}");
                    println!("Submitted, but confirmation failed: the transfer may still land.");
                    return Err(source.context(format!("Transaction `{signature}` is unconfirmed")));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

pub fn format_history(transactions: &[SimplifiedTransaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.".to_string();
    }

    transactions
        .iter()
        .map(|tx| {
            format!(
                "{}  {:<24}  {:>14} SOL  {}",
                tx.id, tx.timestamp, tx.amount, tx.status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
