use cosmwasm_std::{
    has_coins,
    to_json_binary,
    Binary,
    Coin,
    Deps,
    DepsMut,
    Env,
    MessageInfo,
    Response,
    StdResult,
    Storage,
    Uint128,
};
use tracing::info;

use crate::{
    byte_utils::canonical_address,
    error::ContractError,
    governance::{
        authorize_upgrade,
        handle_governance_vaa,
        is_governance_emitter,
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
    registry,
    replay::CORE_REPLAY,
    state::{
        sequence_read,
        sequence_set,
        ConfigInfo,
        CONFIG,
    },
    transaction::transactional,
    vaa::ParsedVAA,
    verify::{
        parse_and_verify_vaa,
        verify_vaa_in_steps,
        SignatureStep,
        VerifiedVaa,
    },
};

// Lock assets fee amount and denomination
const FEE_AMOUNT: u128 = 0;

pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    let gov_address: [u8; 32] = msg
        .gov_address
        .as_slice()
        .try_into()
        .map_err(|_| ContractError::WrongTargetAddressFormat)?;

    // Save general wormhole info
    let state = ConfigInfo {
        owner: info.sender,
        booted: false,
        guardian_set_index: 0,
        guardian_set_expirity: msg.guardian_set_expirity,
        gov_chain: msg.gov_chain,
        gov_address,
        chain_id: msg.chain_id,
        fee: Coin::new(FEE_AMOUNT, msg.fee_denom),
        collected_fees: Uint128::zero(),
        valid_update_approve_hash: None,
    };
    CONFIG.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("owner", state.owner)
        .add_attribute("chain_id", state.chain_id.to_string()))
}

pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Boot { vaa } => boot(deps, env, info, vaa.as_slice()),
        ExecuteMsg::SubmitVAA { vaa } => submit_vaa(deps, env, vaa.as_slice()),
        ExecuteMsg::SubmitVAAInSteps { vaa, steps } => {
            submit_vaa_in_steps(deps, env, vaa.as_slice(), &steps)
        }
        ExecuteMsg::PostMessage { message, nonce } => {
            let emitter = canonical_address(&info.sender)?;
            publish_message(deps.storage, &env, &emitter, &info.funds, message.as_slice(), nonce)
        }
        ExecuteMsg::AuthorizeUpgrade { approval_program } => {
            transactional(deps.storage, |storage| {
                authorize_upgrade(storage, approval_program.as_slice())
            })
        }
    }
}

/// Installs the initial guardian set. The VAA is trusted as-is, so only the
/// owner may do this, and only once.
fn boot(deps: DepsMut, env: Env, info: MessageInfo, data: &[u8]) -> Result<Response, ContractError> {
    transactional(deps.storage, |storage| {
        let mut state = CONFIG.load(storage)?;
        if state.booted {
            return Err(ContractError::AlreadyBooted);
        }
        if info.sender != state.owner {
            return Err(ContractError::PermissionDenied);
        }

        let vaa = ParsedVAA::deserialize(data)?;
        let response = handle_governance_vaa(storage, &env, &vaa, true)?;

        state = CONFIG.load(storage)?;
        state.booted = true;
        CONFIG.save(storage, &state)?;

        info!(guardian_set_index = state.guardian_set_index, "booted");
        Ok(response.add_attribute("action", "boot"))
    })
}

/// Process VAA message signed by quardians
fn submit_vaa(deps: DepsMut, env: Env, data: &[u8]) -> Result<Response, ContractError> {
    transactional(deps.storage, |storage| {
        let vaa = parse_and_verify_vaa(storage, env.block.time.seconds(), data)?;
        apply_vaa(storage, &env, vaa)
    })
}

fn submit_vaa_in_steps(
    deps: DepsMut,
    env: Env,
    data: &[u8],
    steps: &[SignatureStep],
) -> Result<Response, ContractError> {
    transactional(deps.storage, |storage| {
        let vaa = verify_vaa_in_steps(storage, env.block.time.seconds(), data, steps)?;
        apply_vaa(storage, &env, vaa)
    })
}

fn apply_vaa(storage: &mut dyn Storage, env: &Env, vaa: VerifiedVaa) -> Result<Response, ContractError> {
    let state = CONFIG.load(storage)?;
    if is_governance_emitter(&state, vaa.emitter_chain, &vaa.emitter_address) {
        return handle_governance_vaa(storage, env, &vaa, false);
    }

    Err(ContractError::InvalidVAAAction)
}

/// Publishes `message` under `emitter`, taking the next sequence number for
/// that emitter. The configured fee must be included in `funds` and is added
/// to the collected fees.
pub fn publish_message(
    storage: &mut dyn Storage,
    env: &Env,
    emitter: &[u8; 32],
    funds: &[Coin],
    message: &[u8],
    nonce: u32,
) -> Result<Response, ContractError> {
    transactional(storage, |storage| {
        let mut state = CONFIG.load(storage)?;
        let fee = state.fee.clone();

        // Check fee
        if !fee.amount.is_zero() && !has_coins(funds, &fee) {
            return Err(ContractError::FeeTooLow);
        }
        state.collected_fees = state
            .collected_fees
            .checked_add(fee.amount)
            .map_err(|_| ContractError::AmountTooHigh)?;
        CONFIG.save(storage, &state)?;

        let sequence = sequence_read(storage, emitter)?;
        sequence_set(storage, emitter, sequence + 1)?;

        Ok(Response::new()
            .add_attribute("message.message", hex::encode(message))
            .add_attribute("message.sender", hex::encode(emitter))
            .add_attribute("message.chain_id", state.chain_id.to_string())
            .add_attribute("message.nonce", nonce.to_string())
            .add_attribute("message.sequence", sequence.to_string())
            .add_attribute("message.block_time", env.block.time.seconds().to_string()))
    })
}

pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::GuardianSetInfo {} => to_json_binary(&query_guardian_set_info(deps)?),
        QueryMsg::GuardianSet { index } => to_json_binary(&query_guardian_set(deps, index)?),
        QueryMsg::VerifyVAA { vaa, block_time } => to_json_binary(&query_parse_and_verify_vaa(
            deps,
            vaa.as_slice(),
            block_time,
        )?),
        QueryMsg::GetState {} => to_json_binary(&query_state(deps)?),
        QueryMsg::Sequence { emitter } => to_json_binary(&query_sequence(deps, &emitter)?),
        QueryMsg::ReplayStatus {
            emitter_chain,
            emitter_address,
            sequence,
        } => to_json_binary(&query_replay_status(
            deps,
            emitter_chain,
            &emitter_address,
            sequence,
        )?),
    }
}

pub fn query_guardian_set_info(deps: Deps) -> StdResult<GuardianSetInfoResponse> {
    let index = registry::current_index(deps.storage).map_err(|e| e.std())?;
    query_guardian_set(deps, index)
}

pub fn query_guardian_set(deps: Deps, index: u32) -> StdResult<GuardianSetInfoResponse> {
    let guardian_set = registry::get(deps.storage, index).map_err(|e| e.std())?;
    Ok(GuardianSetInfoResponse {
        guardian_set_index: index,
        addresses: guardian_set.addresses,
        expiration_time: guardian_set.expiration_time,
    })
}

pub fn query_parse_and_verify_vaa(
    deps: Deps,
    data: &[u8],
    block_time: u64,
) -> StdResult<ParsedVAA> {
    parse_and_verify_vaa(deps.storage, block_time, data)
        .map(VerifiedVaa::into_inner)
        .map_err(|e| e.std())
}

pub fn query_state(deps: Deps) -> StdResult<GetStateResponse> {
    let state = CONFIG.load(deps.storage)?;
    Ok(GetStateResponse {
        collected_fees: Coin {
            denom: state.fee.denom.clone(),
            amount: state.collected_fees,
        },
        fee: state.fee,
        booted: state.booted,
        chain_id: state.chain_id,
    })
}

pub fn query_sequence(deps: Deps, emitter: &[u8]) -> StdResult<SequenceResponse> {
    Ok(SequenceResponse {
        sequence: sequence_read(deps.storage, emitter)?,
    })
}

pub fn query_replay_status(
    deps: Deps,
    emitter_chain: u16,
    emitter_address: &[u8],
    sequence: u64,
) -> StdResult<ReplayStatusResponse> {
    let emitter_address: [u8; 32] = emitter_address
        .try_into()
        .map_err(|_| ContractError::WrongTargetAddressFormat.std())?;
    let consumed = CORE_REPLAY
        .is_marked(deps.storage, emitter_chain, &emitter_address, sequence)
        .map_err(|e| e.std())?;
    Ok(ReplayStatusResponse { consumed })
}
