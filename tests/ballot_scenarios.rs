use ballot_ledger::{
    Address, BallotContract, CandidateSeed, ContractError, Event, GenesisConfig, Office,
};

const PRESIDENT_CODE: u64 = 1010;

fn wallet() -> Address {
    Address::repeat_byte(0x57)
}

fn voter() -> Address {
    Address::repeat_byte(0x56)
}

fn candidate() -> Address {
    Address::repeat_byte(0x10)
}

/// 100 bare units held by the wallet, which also deploys the contract.
fn deploy() -> BallotContract {
    BallotContract::from_genesis(&GenesisConfig {
        decimals: 0,
        total_supply: 100,
        owner: wallet(),
        holder: wallet(),
        candidates: vec![
            CandidateSeed {
                code: PRESIDENT_CODE,
                address: candidate(),
            },
            CandidateSeed {
                code: 2020,
                address: Address::repeat_byte(0x20),
            },
            CandidateSeed {
                code: 3030,
                address: Address::repeat_byte(0x30),
            },
        ],
        ..GenesisConfig::default()
    })
}

#[test]
fn guarded_vote_moves_one_unit_and_blocks_repeat() {
    let mut contract = deploy();
    contract.transfer(wallet(), voter(), 3).unwrap();

    assert_eq!(
        contract.cast_guarded_presidential_vote(voter(), PRESIDENT_CODE),
        Ok(true)
    );
    assert_eq!(contract.balance_of(&voter()), 2);
    assert_eq!(contract.balance_of(&candidate()), 1);
    assert_eq!(
        contract.cast_guarded_presidential_vote(voter(), PRESIDENT_CODE),
        Err(ContractError::AlreadyVoted {
            voter: voter(),
            office: Office::President
        })
    );
    assert_eq!(contract.balance_of(&voter()), 2);
    assert!(contract.ledger().conservation_holds());
}

#[test]
fn ten_unit_holder_is_not_eligible() {
    let mut contract = deploy();
    contract.transfer(wallet(), voter(), 10).unwrap();
    assert_eq!(
        contract.cast_guarded_presidential_vote(voter(), PRESIDENT_CODE),
        Err(ContractError::NotEligible {
            voter: voter(),
            balance: 10
        })
    );
    assert_eq!(contract.balance_of(&voter()), 10);
}

#[test]
fn null_vote_from_anyone_only_counts() {
    let mut contract = deploy();
    for (caller, expected) in [(wallet(), 1), (voter(), 2), (Address::repeat_byte(0xee), 3)] {
        let balances = contract.ledger().balances().clone();
        assert_eq!(contract.cast_presidential_vote(caller, 0), Ok(0));
        assert_eq!(contract.null_vote_count(), expected);
        assert_eq!(contract.ledger().balances(), &balances);
        assert_eq!(contract.vote_record(&caller), Default::default());
    }
    assert!(contract.events().is_empty());
}

#[test]
fn non_owner_cannot_take_ownership() {
    let mut contract = deploy();
    assert_eq!(
        contract.transfer_ownership(voter(), voter()),
        Err(ContractError::Unauthorized { caller: voter() })
    );
    assert_eq!(contract.owner(), wallet());

    contract.transfer_ownership(wallet(), voter()).unwrap();
    assert_eq!(contract.owner(), voter());
    assert_eq!(
        contract.events().last(),
        Some(&Event::OwnershipTransferred {
            previous: wallet(),
            new: voter()
        })
    );
}

#[test]
fn pause_gates_allowance_and_guarded_votes_until_unpaused() {
    let mut contract = deploy();
    contract.transfer(wallet(), voter(), 2).unwrap();
    contract.approve(wallet(), voter(), 10).unwrap();
    contract.pause(wallet()).unwrap();

    let spender = voter();
    assert_eq!(
        contract.approve(wallet(), spender, 1),
        Err(ContractError::ContractPaused)
    );
    assert_eq!(
        contract.transfer_from(spender, wallet(), spender, 1),
        Err(ContractError::ContractPaused)
    );
    assert_eq!(
        contract.increase_approval(wallet(), spender, 1),
        Err(ContractError::ContractPaused)
    );
    assert_eq!(
        contract.decrease_approval(wallet(), spender, 1),
        Err(ContractError::ContractPaused)
    );
    assert_eq!(
        contract.allowance(&wallet(), &spender),
        Err(ContractError::ContractPaused)
    );
    for result in [
        contract.cast_guarded_presidential_vote(voter(), PRESIDENT_CODE),
        contract.cast_councillor_vote(voter(), 2020),
        contract.cast_representative_vote(voter(), 3030),
    ] {
        assert_eq!(result, Err(ContractError::ContractPaused));
    }
    assert_eq!(
        contract.cast_presidential_vote(voter(), PRESIDENT_CODE),
        Err(ContractError::ContractPaused)
    );
    assert_eq!(contract.ledger().circulating(), Ok(contract.total_supply()));
    // null votes and plain transfers are not gated
    assert_eq!(contract.cast_presidential_vote(voter(), 0), Ok(0));
    assert_eq!(contract.transfer(wallet(), voter(), 1), Ok(true));

    contract.unpause(wallet()).unwrap();
    assert_eq!(contract.allowance(&wallet(), &spender), Ok(10));
    assert_eq!(contract.transfer_from(spender, wallet(), spender, 1), Ok(true));
}

#[test]
fn decrease_approval_floors_at_zero() {
    let mut contract = deploy();
    contract.approve(wallet(), voter(), 4).unwrap();
    assert_eq!(contract.decrease_approval(wallet(), voter(), 9), Ok(true));
    assert_eq!(contract.allowance(&wallet(), &voter()), Ok(0));
}

#[test]
fn councillor_and_representative_share_the_presidential_gate() {
    let mut contract = deploy();
    contract.transfer(wallet(), voter(), 3).unwrap();
    assert_eq!(contract.cast_councillor_vote(voter(), 2020), Ok(true));
    assert_eq!(contract.cast_representative_vote(voter(), 3030), Ok(true));
    assert_eq!(
        contract.cast_guarded_presidential_vote(voter(), PRESIDENT_CODE),
        Ok(true)
    );
    let record = contract.vote_record(&voter());
    assert_eq!(record.councillor.code, 2020);
    assert_eq!(record.representative.code, 3030);
    assert_eq!(record.president.code, PRESIDENT_CODE);
    assert_eq!(contract.balance_of(&voter()), 0);
}

#[test]
fn scaled_office_votes_fail_with_default_decimals() {
    let mut config = GenesisConfig::default();
    config.holder = wallet();
    let mut contract = BallotContract::from_genesis(&config);
    contract.transfer(wallet(), voter(), 2).unwrap();
    assert!(matches!(
        contract.cast_councillor_vote(voter(), 2020),
        Err(ContractError::InsufficientBalance { have: 2, .. })
    ));
    assert_eq!(contract.cast_guarded_presidential_vote(voter(), 1010), Ok(true));
}

#[test]
fn anyone_can_redirect_a_candidate() {
    let mut contract = deploy();
    let hijacker = Address::repeat_byte(0x66);
    assert_eq!(
        contract.register_candidate(hijacker, PRESIDENT_CODE, hijacker),
        Ok(true)
    );
    assert_eq!(contract.resolve(PRESIDENT_CODE), hijacker);
    assert_eq!(contract.resolve(4040), Address::ZERO);
}
