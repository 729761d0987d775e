use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ballot_ledger::{
    telemetry, Address, BallotContract, ContractCall, GenesisConfig, Receipt, StateFile,
};

/// Replays a JSONL script of calls against a contract state and prints one
/// receipt per line.
#[derive(Parser)]
#[command(name = "ballot-replay", version)]
struct Args {
    /// Script with one `{"caller": ..., "call": {...}}` object per line
    script: PathBuf,
    /// State file to start from and save to
    #[arg(long, default_value = "ballot-state.json")]
    state: PathBuf,
    /// Start from this genesis instead of the state file
    #[arg(long)]
    genesis: Option<PathBuf>,
    /// Do not write the resulting state
    #[arg(long)]
    dry_run: bool,
    /// Stop at the first rejected call
    #[arg(long)]
    strict: bool,
}

#[derive(Deserialize)]
struct ScriptLine {
    caller: Address,
    call: ContractCall,
}

#[derive(Serialize)]
struct ReceiptLine<'a> {
    #[serde(flatten)]
    receipt: &'a Receipt,
    digest: String,
}

fn main() -> Result<()> {
    telemetry::init();
    let args = Args::parse();
    let file = StateFile::new(&args.state);

    let mut contract = match &args.genesis {
        Some(path) => BallotContract::from_genesis(&GenesisConfig::load(path)?),
        None if file.exists() => file.load()?,
        None => {
            warn!("no state file, starting from default genesis");
            BallotContract::from_genesis(&GenesisConfig::default())
        }
    };

    let script = File::open(&args.script)
        .with_context(|| format!("open script {}", args.script.display()))?;
    let mut accepted = 0usize;
    let mut rejected = 0usize;
    let mut sequence = 0u64;
    for (idx, line) in BufReader::new(script).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let entry: ScriptLine = serde_json::from_str(line)
            .with_context(|| format!("script line {}", idx + 1))?;
        sequence += 1;
        let receipt = Receipt::execute(&mut contract, sequence, entry.caller, entry.call);
        let digest = hex::encode(receipt.digest()?);
        println!(
            "{}",
            serde_json::to_string(&ReceiptLine {
                receipt: &receipt,
                digest,
            })?
        );
        if receipt.outcome.is_accepted() {
            accepted += 1;
        } else {
            rejected += 1;
            if args.strict {
                warn!(line = idx + 1, "stopping at rejected call");
                break;
            }
        }
    }

    info!(
        accepted,
        rejected,
        root = %hex::encode(contract.state_root()),
        "replay finished"
    );
    if !args.dry_run {
        file.save(&contract)?;
    }
    Ok(())
}
