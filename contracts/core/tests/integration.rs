use cosmwasm_std::{
    coins,
    from_json,
    testing::{
        mock_dependencies,
        mock_env,
        mock_info,
        MockApi,
        MockQuerier,
        MockStorage,
    },
    BankMsg,
    Binary,
    CosmosMsg,
    Env,
    OwnedDeps,
    Response,
};
use portal_core::{
    contract::{
        execute,
        instantiate,
        query,
    },
    error::ContractError,
    fake::{
        governance_vaa,
        guardian_set_upgrade_vaa,
        unsigned_vaa,
        Guardians,
    },
    governance::{
        program_hash,
        Action,
        ContractUpgrade,
        SetFee,
        TransferFee,
        ALL_CHAINS,
        GOVERNANCE_ADDRESS,
    },
    msg::{
        ExecuteMsg,
        GetStateResponse,
        GuardianSetInfoResponse,
        InstantiateMsg,
        QueryMsg,
        ReplayStatusResponse,
        SequenceResponse,
    },
    state::DEFAULT_GUARDIAN_SET_EXPIRITY,
    vaa::ParsedVAA,
    verify::{
        plan_signature_steps,
        SIGNATURE_STEP_SIZE,
    },
};

type Deps = OwnedDeps<MockStorage, MockApi, MockQuerier>;

const CHAIN_ID: u16 = 18;
const OWNER: &str = "owner";

fn instantiate_and_boot(guardians: &Guardians) -> (Deps, Env) {
    let mut deps = mock_dependencies();
    let env = mock_env();

    instantiate(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        InstantiateMsg {
            gov_chain: 1,
            gov_address: Binary::from(GOVERNANCE_ADDRESS.to_vec()),
            guardian_set_expirity: DEFAULT_GUARDIAN_SET_EXPIRITY,
            chain_id: CHAIN_ID,
            fee_denom: "uluna".to_string(),
        },
    )
    .unwrap();

    // boot VAAs carry no signatures
    let boot = guardian_set_upgrade_vaa(0, 0, ALL_CHAINS, 0, guardians).serialize();
    execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        ExecuteMsg::Boot { vaa: boot.into() },
    )
    .unwrap();

    (deps, env)
}

fn submit(deps: &mut Deps, env: &Env, vaa: Vec<u8>) -> Result<Response, ContractError> {
    execute(
        deps.as_mut(),
        env.clone(),
        mock_info("relayer", &[]),
        ExecuteMsg::SubmitVAA { vaa: vaa.into() },
    )
}

fn query_as<T: serde::de::DeserializeOwned>(deps: &Deps, env: &Env, msg: QueryMsg) -> T {
    from_json(query(deps.as_ref(), env.clone(), msg).unwrap()).unwrap()
}

fn guardian_set_info(deps: &Deps, env: &Env) -> GuardianSetInfoResponse {
    query_as(deps, env, QueryMsg::GuardianSetInfo {})
}

fn state(deps: &Deps, env: &Env) -> GetStateResponse {
    query_as(deps, env, QueryMsg::GetState {})
}

fn consumed(deps: &Deps, env: &Env, sequence: u64) -> bool {
    let status: ReplayStatusResponse = query_as(
        deps,
        env,
        QueryMsg::ReplayStatus {
            emitter_chain: 1,
            emitter_address: Binary::from(GOVERNANCE_ADDRESS.to_vec()),
            sequence,
        },
    );
    status.consumed
}

#[test]
fn boot_installs_the_initial_set() {
    let guardians = Guardians::new("boot", 19).unwrap();
    let (deps, env) = instantiate_and_boot(&guardians);

    let info = guardian_set_info(&deps, &env);
    assert_eq!(info.guardian_set_index, 0);
    assert_eq!(info.addresses, guardians.addresses());
    assert_eq!(info.expiration_time, None);

    assert!(state(&deps, &env).booted);
    assert!(consumed(&deps, &env, 0));
}

#[test]
fn boot_is_owner_only_and_once() {
    let guardians = Guardians::new("boot-once", 1).unwrap();
    let mut deps = mock_dependencies();
    let env = mock_env();
    instantiate(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        InstantiateMsg {
            gov_chain: 1,
            gov_address: Binary::from(GOVERNANCE_ADDRESS.to_vec()),
            guardian_set_expirity: DEFAULT_GUARDIAN_SET_EXPIRITY,
            chain_id: CHAIN_ID,
            fee_denom: "uluna".to_string(),
        },
    )
    .unwrap();

    let boot = guardian_set_upgrade_vaa(0, 0, ALL_CHAINS, 0, &guardians).serialize();
    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info("mallory", &[]),
        ExecuteMsg::Boot {
            vaa: boot.clone().into(),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::PermissionDenied);

    execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        ExecuteMsg::Boot { vaa: boot.into() },
    )
    .unwrap();

    let again = guardian_set_upgrade_vaa(0, 1, ALL_CHAINS, 0, &guardians).serialize();
    let err = execute(
        deps.as_mut(),
        env,
        mock_info(OWNER, &[]),
        ExecuteMsg::Boot { vaa: again.into() },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::AlreadyBooted);
}

#[test]
fn guardian_set_index_advances_by_one() {
    let guardians = Guardians::new("rotation", 4).unwrap();
    let next = Guardians::new("rotation-next", 5).unwrap();
    let (mut deps, env) = instantiate_and_boot(&guardians);

    let skip = guardian_set_upgrade_vaa(0, 1, CHAIN_ID, 2, &next);
    let err = submit(&mut deps, &env, guardians.sign_with_quorum(skip).unwrap()).unwrap_err();
    assert!(matches!(err, ContractError::GovernanceSequenceViolation(_)));

    let upgrade = guardian_set_upgrade_vaa(0, 2, ALL_CHAINS, 1, &next);
    let response = submit(&mut deps, &env, guardians.sign_with_quorum(upgrade).unwrap()).unwrap();
    assert!(response
        .attributes
        .iter()
        .any(|attr| attr.key == "action" && attr.value == "guardian_set_change"));

    let info = guardian_set_info(&deps, &env);
    assert_eq!(info.guardian_set_index, 1);
    assert_eq!(info.addresses, next.addresses());

    let old: GuardianSetInfoResponse = query_as(&deps, &env, QueryMsg::GuardianSet { index: 0 });
    assert_eq!(
        old.expiration_time,
        Some(env.block.time.seconds() + DEFAULT_GUARDIAN_SET_EXPIRITY)
    );
}

#[test]
fn rejected_governance_leaves_no_replay_mark() {
    let guardians = Guardians::new("atomic", 4).unwrap();
    let next = Guardians::new("atomic-next", 4).unwrap();
    let (mut deps, env) = instantiate_and_boot(&guardians);

    // the replay bit is set before the index check fails
    let skip = guardian_set_upgrade_vaa(0, 7, CHAIN_ID, 5, &next);
    let skip = guardians.sign_with_quorum(skip).unwrap();
    assert!(submit(&mut deps, &env, skip).is_err());
    assert!(!consumed(&deps, &env, 7));

    let valid = guardian_set_upgrade_vaa(0, 7, CHAIN_ID, 1, &next);
    submit(&mut deps, &env, guardians.sign_with_quorum(valid).unwrap()).unwrap();
    assert!(consumed(&deps, &env, 7));
}

#[test]
fn governance_vaa_cannot_be_replayed() {
    let guardians = Guardians::new("replay", 1).unwrap();
    let (mut deps, env) = instantiate_and_boot(&guardians);

    let vaa = governance_vaa(
        0,
        3,
        "Core",
        Action::SET_MESSAGE_FEE,
        CHAIN_ID,
        SetFee { fee: 10 }.serialize(),
    );
    let vaa = guardians.sign_with_quorum(vaa).unwrap();

    submit(&mut deps, &env, vaa.clone()).unwrap();
    assert_eq!(submit(&mut deps, &env, vaa), Err(ContractError::DuplicateVAA));
}

#[test]
fn old_set_loses_governance_but_keeps_verifying() {
    let guardians = Guardians::new("grace", 3).unwrap();
    let next = Guardians::new("grace-next", 3).unwrap();
    let (mut deps, mut env) = instantiate_and_boot(&guardians);

    let upgrade = guardian_set_upgrade_vaa(0, 1, CHAIN_ID, 1, &next);
    submit(&mut deps, &env, guardians.sign_with_quorum(upgrade).unwrap()).unwrap();

    let fee = governance_vaa(
        0,
        2,
        "Core",
        Action::SET_MESSAGE_FEE,
        CHAIN_ID,
        SetFee { fee: 10 }.serialize(),
    );
    let err = submit(&mut deps, &env, guardians.sign_with_quorum(fee).unwrap()).unwrap_err();
    assert!(matches!(err, ContractError::GovernanceSequenceViolation(_)));

    let message = guardians
        .sign_with_quorum(unsigned_vaa(0, 2, [9u8; 32], 1, b"in flight".to_vec()))
        .unwrap();
    let block_time = env.block.time.seconds() + DEFAULT_GUARDIAN_SET_EXPIRITY - 1;
    let parsed: ParsedVAA = query_as(
        &deps,
        &env,
        QueryMsg::VerifyVAA {
            vaa: message.clone().into(),
            block_time,
        },
    );
    assert_eq!(parsed.payload, b"in flight".to_vec());

    env.block.time = env.block.time.plus_seconds(DEFAULT_GUARDIAN_SET_EXPIRITY);
    let err = query(
        deps.as_ref(),
        env.clone(),
        QueryMsg::VerifyVAA {
            vaa: message.into(),
            block_time: env.block.time.seconds(),
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("StaleGuardianSet"));
}

#[test]
fn message_fees_are_collected_and_paid_out() {
    let guardians = Guardians::new("fees", 1).unwrap();
    let (mut deps, env) = instantiate_and_boot(&guardians);
    let publisher = hex::encode([9u8; 32]);

    let set_fee = governance_vaa(
        0,
        1,
        "Core",
        Action::SET_MESSAGE_FEE,
        CHAIN_ID,
        SetFee { fee: 2000 }.serialize(),
    );
    submit(&mut deps, &env, guardians.sign_with_quorum(set_fee).unwrap()).unwrap();
    assert_eq!(state(&deps, &env).fee.amount.u128(), 2000);

    let post = || ExecuteMsg::PostMessage {
        message: Binary::from(b"hello".to_vec()),
        nonce: 1,
    };
    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info(&publisher, &coins(1999, "uluna")),
        post(),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::FeeTooLow);

    for expected in 0..2u64 {
        let response = execute(
            deps.as_mut(),
            env.clone(),
            mock_info(&publisher, &coins(2000, "uluna")),
            post(),
        )
        .unwrap();
        assert!(response
            .attributes
            .iter()
            .any(|attr| attr.key == "message.sequence" && attr.value == expected.to_string()));
    }
    let next: SequenceResponse = query_as(
        &deps,
        &env,
        QueryMsg::Sequence {
            emitter: Binary::from(vec![9u8; 32]),
        },
    );
    assert_eq!(next.sequence, 2);
    assert_eq!(state(&deps, &env).collected_fees.amount.u128(), 4000);

    let recipient = [5u8; 32];
    let too_much = governance_vaa(
        0,
        2,
        "Core",
        Action::FEE_PAYOUT,
        CHAIN_ID,
        TransferFee {
            amount: 4001,
            recipient,
        }
        .serialize(),
    );
    let err = submit(&mut deps, &env, guardians.sign_with_quorum(too_much).unwrap()).unwrap_err();
    assert_eq!(err, ContractError::InsufficientFees);

    let payout = governance_vaa(
        0,
        3,
        "Core",
        Action::FEE_PAYOUT,
        CHAIN_ID,
        TransferFee {
            amount: 4000,
            recipient,
        }
        .serialize(),
    );
    let response = submit(&mut deps, &env, guardians.sign_with_quorum(payout).unwrap()).unwrap();
    assert_eq!(
        response.messages[0].msg,
        CosmosMsg::Bank(BankMsg::Send {
            to_address: hex::encode(recipient),
            amount: coins(4000, "uluna"),
        })
    );
    assert!(state(&deps, &env).collected_fees.amount.is_zero());
}

#[test]
fn fee_changes_must_target_this_chain() {
    let guardians = Guardians::new("fee-target", 1).unwrap();
    let (mut deps, env) = instantiate_and_boot(&guardians);

    let vaa = governance_vaa(
        0,
        1,
        "Core",
        Action::SET_MESSAGE_FEE,
        ALL_CHAINS,
        SetFee { fee: 1 }.serialize(),
    );
    let err = submit(&mut deps, &env, guardians.sign_with_quorum(vaa).unwrap()).unwrap_err();
    assert!(matches!(err, ContractError::GovernanceSequenceViolation(_)));
}

#[test]
fn upgrade_hash_is_consumed_once() {
    let guardians = Guardians::new("upgrade", 1).unwrap();
    let (mut deps, env) = instantiate_and_boot(&guardians);

    let approve = governance_vaa(
        0,
        1,
        "Core",
        Action::CONTRACT_UPGRADE,
        CHAIN_ID,
        ContractUpgrade {
            new_contract: program_hash(b"new program"),
        }
        .serialize(),
    );
    submit(&mut deps, &env, guardians.sign_with_quorum(approve).unwrap()).unwrap();

    let authorize = |program: &[u8]| ExecuteMsg::AuthorizeUpgrade {
        approval_program: Binary::from(program.to_vec()),
    };
    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info("anyone", &[]),
        authorize(b"old program"),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::UpgradeHashMismatch);

    execute(
        deps.as_mut(),
        env.clone(),
        mock_info("anyone", &[]),
        authorize(b"new program"),
    )
    .unwrap();

    let err = execute(
        deps.as_mut(),
        env,
        mock_info("anyone", &[]),
        authorize(b"new program"),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::UpgradeHashMismatch);
}

#[test]
fn split_verification_through_execute() {
    let guardians = Guardians::new("split", 19).unwrap();
    let (mut deps, env) = instantiate_and_boot(&guardians);

    let vaa = governance_vaa(
        0,
        1,
        "Core",
        Action::SET_MESSAGE_FEE,
        CHAIN_ID,
        SetFee { fee: 7 }.serialize(),
    );
    let vaa = guardians.sign_with_quorum(vaa).unwrap();
    let steps = plan_signature_steps(&vaa, &guardians.guardian_set(), SIGNATURE_STEP_SIZE).unwrap();

    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info("relayer", &[]),
        ExecuteMsg::SubmitVAAInSteps {
            vaa: vaa.clone().into(),
            steps: steps[1..].to_vec(),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::IncompleteSignatureCoverage);
    assert!(!consumed(&deps, &env, 1));

    execute(
        deps.as_mut(),
        env.clone(),
        mock_info("relayer", &[]),
        ExecuteMsg::SubmitVAAInSteps {
            vaa: vaa.into(),
            steps,
        },
    )
    .unwrap();
    assert_eq!(state(&deps, &env).fee.amount.u128(), 7);
}

#[test]
fn only_governance_vaas_act_on_core() {
    let guardians = Guardians::new("non-gov", 1).unwrap();
    let (mut deps, env) = instantiate_and_boot(&guardians);

    let vaa = unsigned_vaa(0, 2, [3u8; 32], 0, b"payload".to_vec());
    let err = submit(&mut deps, &env, guardians.sign_with_quorum(vaa).unwrap()).unwrap_err();
    assert_eq!(err, ContractError::InvalidVAAAction);
}
