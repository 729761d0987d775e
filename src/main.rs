use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use tracing::info;

use ballot_ledger::{
    telemetry, Address, Amount, BallotContract, CandidateCode, ContractCall, GenesisConfig,
    StateFile,
};

#[derive(Parser)]
#[command(name = "ballot", version, about = "Balance ledger with balance-backed voting")]
struct Cli {
    /// Contract state file
    #[arg(long, global = true, default_value = "ballot-state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deploy a fresh contract from a genesis file (or the built-in defaults)
    Init {
        #[arg(long)]
        genesis: Option<PathBuf>,
        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },
    /// Print a random address
    NewAddress,
    /// Submit a mutating call on behalf of --caller
    Call {
        #[arg(long)]
        caller: Address,
        #[command(subcommand)]
        op: CallCmd,
    },
    /// Read-only queries
    Query {
        #[command(subcommand)]
        what: QueryCmd,
    },
    /// Print the event log as JSON
    Events,
    /// Print a state snapshot with its root as JSON
    Snapshot,
}

#[derive(Subcommand)]
enum CallCmd {
    Transfer {
        to: Address,
        value: Amount,
    },
    Approve {
        spender: Address,
        value: Amount,
    },
    TransferFrom {
        from: Address,
        to: Address,
        value: Amount,
    },
    IncreaseApproval {
        spender: Address,
        added_value: Amount,
    },
    DecreaseApproval {
        spender: Address,
        subtracted_value: Amount,
    },
    TransferOwnership {
        new_owner: Address,
    },
    Pause,
    Unpause,
    RegisterCandidate {
        code: CandidateCode,
        address: Address,
    },
    /// Open presidential vote (code 0 is a null vote)
    Vote {
        code: CandidateCode,
    },
    /// Eligibility-checked presidential vote
    GuardedVote {
        code: CandidateCode,
    },
    CouncillorVote {
        code: CandidateCode,
    },
    RepresentativeVote {
        code: CandidateCode,
    },
}

impl From<CallCmd> for ContractCall {
    fn from(cmd: CallCmd) -> Self {
        match cmd {
            CallCmd::Transfer { to, value } => ContractCall::Transfer { to, value },
            CallCmd::Approve { spender, value } => ContractCall::Approve { spender, value },
            CallCmd::TransferFrom { from, to, value } => {
                ContractCall::TransferFrom { from, to, value }
            }
            CallCmd::IncreaseApproval {
                spender,
                added_value,
            } => ContractCall::IncreaseApproval {
                spender,
                added_value,
            },
            CallCmd::DecreaseApproval {
                spender,
                subtracted_value,
            } => ContractCall::DecreaseApproval {
                spender,
                subtracted_value,
            },
            CallCmd::TransferOwnership { new_owner } => {
                ContractCall::TransferOwnership { new_owner }
            }
            CallCmd::Pause => ContractCall::Pause,
            CallCmd::Unpause => ContractCall::Unpause,
            CallCmd::RegisterCandidate { code, address } => {
                ContractCall::RegisterCandidate { code, address }
            }
            CallCmd::Vote { code } => ContractCall::CastPresidentialVote { code },
            CallCmd::GuardedVote { code } => ContractCall::CastGuardedPresidentialVote { code },
            CallCmd::CouncillorVote { code } => ContractCall::CastCouncillorVote { code },
            CallCmd::RepresentativeVote { code } => ContractCall::CastRepresentativeVote { code },
        }
    }
}

#[derive(Subcommand)]
enum QueryCmd {
    Balance { account: Address },
    Allowance { owner: Address, spender: Address },
    NullVotes,
    Resolve { code: CandidateCode },
    Record { voter: Address },
    Owner,
    Paused,
    Supply,
    Candidates,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load(file: &StateFile) -> Result<BallotContract> {
    if !file.exists() {
        bail!(
            "no state at {}; run `ballot init` first",
            file.path().display()
        );
    }
    Ok(file.load()?)
}

fn init_cmd(file: &StateFile, genesis: Option<PathBuf>, force: bool) -> Result<()> {
    if file.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            file.path().display()
        );
    }
    let config = match genesis {
        Some(path) => GenesisConfig::load(&path)?,
        None => {
            let config = GenesisConfig::default();
            config.validate()?;
            config
        }
    };
    let contract = BallotContract::from_genesis(&config);
    file.save(&contract)?;
    info!(path = %file.path().display(), "state initialised");
    print_json(&contract.snapshot())
}

fn new_address_cmd() {
    let mut bytes = [0u8; 20];
    OsRng.fill_bytes(&mut bytes);
    println!("{}", Address::new(bytes));
}

fn call_cmd(file: &StateFile, caller: Address, op: CallCmd) -> Result<()> {
    let mut contract = load(file)?;
    let call = ContractCall::from(op);
    let name = call.name();
    let output = contract
        .execute(caller, call)
        .with_context(|| format!("{name} rejected"))?;
    file.save(&contract)?;
    print_json(&output)
}

fn query_cmd(file: &StateFile, what: QueryCmd) -> Result<()> {
    let contract = load(file)?;
    match what {
        QueryCmd::Balance { account } => println!("{}", contract.balance_of(&account)),
        QueryCmd::Allowance { owner, spender } => {
            println!("{}", contract.allowance(&owner, &spender)?)
        }
        QueryCmd::NullVotes => println!("{}", contract.null_vote_count()),
        QueryCmd::Resolve { code } => println!("{}", contract.resolve(code)),
        QueryCmd::Record { voter } => print_json(&contract.vote_record(&voter))?,
        QueryCmd::Owner => println!("{}", contract.owner()),
        QueryCmd::Paused => println!("{}", contract.is_paused()),
        QueryCmd::Supply => println!("{}", contract.total_supply()),
        QueryCmd::Candidates => {
            for (code, address) in contract.candidates() {
                println!("{code}\t{address}");
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();
    let file = StateFile::new(cli.state);
    match cli.command {
        Command::Init { genesis, force } => init_cmd(&file, genesis, force),
        Command::NewAddress => {
            new_address_cmd();
            Ok(())
        }
        Command::Call { caller, op } => call_cmd(&file, caller, op),
        Command::Query { what } => query_cmd(&file, what),
        Command::Events => print_json(&load(&file)?.events()),
        Command::Snapshot => print_json(&load(&file)?.snapshot()),
    }
}
