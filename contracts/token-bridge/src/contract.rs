use std::cmp::min;

use cosmwasm_std::{
    to_json_binary,
    Binary,
    CosmosMsg,
    Deps,
    DepsMut,
    Env,
    MessageInfo,
    Response,
    StdResult,
    Storage,
    Uint128,
};
use tracing::{
    debug,
    info,
};

use portal_core::{
    byte_utils::{
        canonical_address,
        get_string_from_32,
        human_address,
        string_to_array,
    },
    contract::publish_message,
    error::ContractError,
    governance::{
        program_hash,
        GovernancePacket,
    },
    registry,
    transaction::transactional,
    vaa::ParsedVAA,
    verify::{
        parse_and_verify_vaa,
        verify_vaa_in_steps,
        SignatureStep,
        VerifiedVaa,
    },
};

use crate::{
    asset::{
        denormalize,
        native_asset_id,
        native_token_address,
        normalize,
        truncate_symbol,
        AssetQuerier,
        BRIDGE_DECIMALS,
    },
    msg::{
        Asset,
        BridgeMsg,
        ChainRegistrationResponse,
        ExecuteMsg,
        InstantiateMsg,
        QueryMsg,
        TransferInfoResponse,
        WrappedRegistryResponse,
    },
    state::{
        Action,
        AssetMeta,
        ConfigInfo,
        GovernanceAction,
        RegisterChain,
        TokenBridgeMessage,
        TransferInfo,
        TransferWithPayloadInfo,
        UpgradeContract,
        WrappedAsset,
        WrappedOrigin,
        BRIDGE_CONTRACTS,
        CONFIG,
        TOKEN_BRIDGE_REPLAY,
        WRAPPED_ASSETS,
        WRAPPED_ORIGINS,
    },
};

enum TransferType<A> {
    WithoutPayload,
    WithPayload { payload: A },
}

fn to_bytes32(data: &[u8]) -> Result<[u8; 32], ContractError> {
    data.try_into()
        .map_err(|_| ContractError::WrongTargetAddressFormat)
}

pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response<BridgeMsg>, ContractError> {
    let state = ConfigInfo {
        owner: info.sender,
        gov_chain: msg.gov_chain,
        gov_address: to_bytes32(msg.gov_address.as_slice())?,
        chain_id: msg.chain_id,
        emitter_address: to_bytes32(msg.emitter_address.as_slice())?,
        valid_update_approve_hash: None,
    };
    CONFIG.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("chain_id", state.chain_id.to_string())
        .add_attribute("emitter", hex::encode(state.emitter_address)))
}

/// `assets` answers metadata questions about local assets.
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    assets: &dyn AssetQuerier,
    msg: ExecuteMsg,
) -> Result<Response<BridgeMsg>, ContractError> {
    transactional(deps.storage, |storage| match msg {
        ExecuteMsg::RegisterAssetHook {
            chain,
            token_address,
            asset_id,
        } => handle_register_asset(storage, &info, chain, token_address.as_slice(), asset_id),
        ExecuteMsg::InitiateTransfer {
            asset,
            recipient_chain,
            recipient,
            fee,
            nonce,
        } => handle_initiate_transfer(
            storage,
            &env,
            &info,
            assets,
            asset,
            recipient_chain,
            to_bytes32(recipient.as_slice())?,
            fee,
            TransferType::WithoutPayload,
            nonce,
        ),
        ExecuteMsg::InitiateTransferWithPayload {
            asset,
            recipient_chain,
            recipient,
            payload,
            nonce,
        } => handle_initiate_transfer(
            storage,
            &env,
            &info,
            assets,
            asset,
            recipient_chain,
            to_bytes32(recipient.as_slice())?,
            Uint128::zero(),
            TransferType::WithPayload {
                payload: payload.to_vec(),
            },
            nonce,
        ),
        ExecuteMsg::SubmitVaa { data } => {
            let vaa = parse_and_verify_vaa(storage, env.block.time.seconds(), data.as_slice())?;
            submit_vaa(storage, &info, assets, vaa)
        }
        ExecuteMsg::SubmitVaaInSteps { data, steps } => {
            submit_vaa_in_steps(storage, &env, &info, assets, data.as_slice(), &steps)
        }
        ExecuteMsg::CreateAssetMeta { asset_id, nonce } => {
            handle_create_asset_meta(storage, &env, &info, assets, asset_id, nonce)
        }
        ExecuteMsg::AuthorizeUpgrade { approval_program } => {
            authorize_upgrade(storage, approval_program.as_slice())
        }
    })
}

fn submit_vaa_in_steps(
    storage: &mut dyn Storage,
    env: &Env,
    info: &MessageInfo,
    assets: &dyn AssetQuerier,
    data: &[u8],
    steps: &[SignatureStep],
) -> Result<Response<BridgeMsg>, ContractError> {
    let vaa = verify_vaa_in_steps(storage, env.block.time.seconds(), data, steps)?;
    submit_vaa(storage, info, assets, vaa)
}

fn is_governance_emitter(cfg: &ConfigInfo, emitter_chain: u16, emitter_address: &[u8]) -> bool {
    cfg.gov_chain == emitter_chain && cfg.gov_address == emitter_address
}

fn submit_vaa(
    storage: &mut dyn Storage,
    info: &MessageInfo,
    assets: &dyn AssetQuerier,
    vaa: VerifiedVaa,
) -> Result<Response<BridgeMsg>, ContractError> {
    let cfg = CONFIG.load(storage)?;

    if is_governance_emitter(&cfg, vaa.emitter_chain, &vaa.emitter_address) {
        return handle_governance_payload(storage, &cfg, &vaa);
    }

    let message = TokenBridgeMessage::deserialize(&vaa.payload)?;
    match message.action {
        Action::TRANSFER => handle_complete_transfer(
            storage,
            &cfg,
            info,
            assets,
            &vaa,
            TransferType::WithoutPayload,
            &message.payload,
        ),
        Action::TRANSFER_WITH_PAYLOAD => handle_complete_transfer(
            storage,
            &cfg,
            info,
            assets,
            &vaa,
            TransferType::WithPayload { payload: () },
            &message.payload,
        ),
        Action::ATTEST_META => handle_attest_meta(storage, &cfg, &vaa, &message.payload),
        _ => Err(ContractError::InvalidVAAAction),
    }
}

fn handle_governance_payload(
    storage: &mut dyn Storage,
    cfg: &ConfigInfo,
    vaa: &ParsedVAA,
) -> Result<Response<BridgeMsg>, ContractError> {
    if vaa.guardian_set_index != registry::current_index(storage)? {
        return Err(ContractError::GovernanceSequenceViolation(
            "governance VAAs must be signed by the current guardian set",
        ));
    }

    TOKEN_BRIDGE_REPLAY.check_and_mark(storage, vaa.emitter_chain, &vaa.emitter_address, vaa.sequence)?;

    let gov_packet = GovernancePacket::deserialize(&vaa.payload)?;
    let allow_all = gov_packet.action == GovernanceAction::REGISTER_CHAIN;
    gov_packet.check_target("TokenBridge", cfg.chain_id, allow_all)?;

    let response = match gov_packet.action {
        GovernanceAction::REGISTER_CHAIN => handle_register_chain(storage, &gov_packet.payload),
        GovernanceAction::UPGRADE_CONTRACT => handle_upgrade_contract(storage, &gov_packet.payload),
        _ => Err(ContractError::InvalidVAAAction),
    }?;

    Ok(response.add_attribute("governance.sequence", vaa.sequence.to_string()))
}

fn handle_upgrade_contract(
    storage: &mut dyn Storage,
    data: &[u8],
) -> Result<Response<BridgeMsg>, ContractError> {
    let UpgradeContract { new_contract } = UpgradeContract::deserialize(data)?;

    CONFIG.update(storage, |mut cfg| -> Result<_, ContractError> {
        cfg.valid_update_approve_hash = Some(new_contract);
        Ok(cfg)
    })?;

    Ok(Response::new()
        .add_attribute("action", "contract_upgrade")
        .add_attribute("approved_hash", hex::encode(new_contract)))
}

fn handle_register_chain(
    storage: &mut dyn Storage,
    data: &[u8],
) -> Result<Response<BridgeMsg>, ContractError> {
    let RegisterChain {
        chain_id,
        chain_address,
    } = RegisterChain::deserialize(data)?;

    if BRIDGE_CONTRACTS.has(storage, chain_id) {
        return Err(ContractError::ChainAlreadyRegistered);
    }
    BRIDGE_CONTRACTS.save(storage, chain_id, &chain_address)?;

    info!(chain_id, "registered bridge emitter");
    Ok(Response::new()
        .add_attribute("action", "register_chain")
        .add_attribute("chain_id", chain_id.to_string())
        .add_attribute("chain_address", hex::encode(chain_address)))
}

/// Consumes the approved upgrade hash if `approval_program` matches it.
fn authorize_upgrade(
    storage: &mut dyn Storage,
    approval_program: &[u8],
) -> Result<Response<BridgeMsg>, ContractError> {
    let mut cfg = CONFIG.load(storage)?;
    let hash = program_hash(approval_program);

    if cfg.valid_update_approve_hash != Some(hash) {
        return Err(ContractError::UpgradeHashMismatch);
    }
    cfg.valid_update_approve_hash = None;
    CONFIG.save(storage, &cfg)?;

    Ok(Response::new()
        .add_attribute("action", "upgrade_authorized")
        .add_attribute("hash", hex::encode(hash)))
}

/// Messages must come from the bridge registered for their chain. Transfers
/// may also come from this bridge itself.
fn check_emitter(
    storage: &dyn Storage,
    cfg: &ConfigInfo,
    emitter_chain: u16,
    emitter_address: &[u8; 32],
    allow_self: bool,
) -> Result<(), ContractError> {
    if allow_self && emitter_chain == cfg.chain_id && *emitter_address == cfg.emitter_address {
        return Ok(());
    }

    let expected_contract = BRIDGE_CONTRACTS
        .may_load(storage, emitter_chain)?
        .ok_or(ContractError::UnregisteredChain)?;

    // must be sent by a registered token bridge contract
    if expected_contract != *emitter_address {
        return Err(ContractError::InvalidEmitter);
    }
    Ok(())
}

/// Handle wrapped asset registration messages
fn handle_register_asset(
    storage: &mut dyn Storage,
    info: &MessageInfo,
    chain: u16,
    token_address: &[u8],
    asset_id: u64,
) -> Result<Response<BridgeMsg>, ContractError> {
    let cfg = CONFIG.load(storage)?;
    if info.sender != cfg.owner {
        return Err(ContractError::PermissionDenied);
    }
    let token_address = to_bytes32(token_address)?;

    // Only assets announced by an attestation can be bound, and only once.
    let mut wrapped = WRAPPED_ASSETS
        .may_load(storage, (chain, token_address.as_slice()))?
        .ok_or(ContractError::RegistrationForbidden)?;
    if wrapped.asset_id.is_some() || WRAPPED_ORIGINS.has(storage, asset_id) {
        return Err(ContractError::AssetAlreadyRegistered);
    }

    wrapped.asset_id = Some(asset_id);
    WRAPPED_ASSETS.save(storage, (chain, token_address.as_slice()), &wrapped)?;
    WRAPPED_ORIGINS.save(
        storage,
        asset_id,
        &WrappedOrigin {
            token_chain: chain,
            token_address,
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "register_asset")
        .add_attribute("token_chain", chain.to_string())
        .add_attribute("token_address", hex::encode(token_address))
        .add_attribute("asset_id", asset_id.to_string()))
}

fn handle_attest_meta(
    storage: &mut dyn Storage,
    cfg: &ConfigInfo,
    vaa: &ParsedVAA,
    data: &[u8],
) -> Result<Response<BridgeMsg>, ContractError> {
    let meta = AssetMeta::deserialize(data)?;

    check_emitter(storage, cfg, vaa.emitter_chain, &vaa.emitter_address, false)?;

    // assets of this chain come back wrapped elsewhere and must not be wrapped here
    if meta.token_chain == cfg.chain_id {
        return Err(ContractError::ReattestationOfWrappedAsset);
    }

    TOKEN_BRIDGE_REPLAY.check_and_mark(storage, vaa.emitter_chain, &vaa.emitter_address, vaa.sequence)?;

    let symbol = truncate_symbol(&get_string_from_32(&meta.symbol));
    let name = get_string_from_32(&meta.name);
    let key = (meta.token_chain, meta.token_address.as_slice());

    // If the asset already exists and this message has a newer sequence we
    // allow updating the metadata. If not, we create a brand new asset.
    let message = match WRAPPED_ASSETS.may_load(storage, key)? {
        Some(mut wrapped) => {
            // Prevent anyone from re-attesting with old VAAs.
            if vaa.sequence <= wrapped.sequence {
                return Err(ContractError::StaleAttestation);
            }
            wrapped.symbol = symbol.clone();
            wrapped.name = name.clone();
            wrapped.sequence = vaa.sequence;
            WRAPPED_ASSETS.save(storage, key, &wrapped)?;

            BridgeMsg::UpdateWrapped {
                token_chain: meta.token_chain,
                token_address: Binary::from(meta.token_address.as_slice()),
                symbol,
                name,
            }
        }
        None => {
            let decimals = min(meta.decimals, BRIDGE_DECIMALS);
            WRAPPED_ASSETS.save(
                storage,
                key,
                &WrappedAsset {
                    asset_id: None,
                    decimals,
                    symbol: symbol.clone(),
                    name: name.clone(),
                    sequence: vaa.sequence,
                    vaa_hash: vaa.hash,
                },
            )?;

            BridgeMsg::CreateWrapped {
                token_chain: meta.token_chain,
                token_address: Binary::from(meta.token_address.as_slice()),
                decimals,
                symbol,
                name,
            }
        }
    };

    debug!(token_chain = meta.token_chain, sequence = vaa.sequence, "attestation applied");
    Ok(Response::new()
        .add_message(CosmosMsg::Custom(message))
        .add_attribute("action", "attest_meta")
        .add_attribute("token_chain", meta.token_chain.to_string())
        .add_attribute("token_address", hex::encode(meta.token_address)))
}

fn handle_complete_transfer(
    storage: &mut dyn Storage,
    cfg: &ConfigInfo,
    info: &MessageInfo,
    assets: &dyn AssetQuerier,
    vaa: &ParsedVAA,
    transfer_type: TransferType<()>,
    data: &[u8],
) -> Result<Response<BridgeMsg>, ContractError> {
    let transfer_info = match transfer_type {
        TransferType::WithoutPayload => TransferInfo::deserialize(data)?,
        TransferType::WithPayload { payload: () } => {
            TransferWithPayloadInfo::deserialize(data)?.as_transfer_info()
        }
    };

    check_emitter(storage, cfg, vaa.emitter_chain, &vaa.emitter_address, true)?;

    if transfer_info.recipient_chain != cfg.chain_id {
        return Err(ContractError::WrongTargetChain);
    }

    let recipient = human_address(&transfer_info.recipient);
    if let TransferType::WithPayload { payload: () } = transfer_type {
        // transfers with payload can only be redeemed by the recipient
        if recipient != info.sender {
            return Err(ContractError::PermissionDenied);
        }
    }

    // If the fee is too large the recipient would receive nothing.
    if transfer_info.fee > transfer_info.amount {
        return Err(ContractError::FeeExceedsAmount);
    }

    TOKEN_BRIDGE_REPLAY.check_and_mark(storage, vaa.emitter_chain, &vaa.emitter_address, vaa.sequence)?;

    // amount is the gross transfer; the relayer keeps the fee out of it
    let amount = u128::from(transfer_info.amount - transfer_info.fee);
    let fee = u128::from(transfer_info.fee);
    let relayer = info.sender.to_string();

    let native = transfer_info.token_chain == cfg.chain_id;
    let (asset_id, amount, fee) = if native {
        let asset_id = native_asset_id(&transfer_info.token_address)?;
        if WRAPPED_ORIGINS.has(storage, asset_id) {
            return Err(ContractError::AssetNotFound);
        }

        // undo normalization to 8 decimals
        let decimals = assets.asset_info(asset_id)?.decimals;
        (asset_id, denormalize(amount, decimals)?, denormalize(fee, decimals)?)
    } else {
        let asset_id = WRAPPED_ASSETS
            .may_load(
                storage,
                (transfer_info.token_chain, transfer_info.token_address.as_slice()),
            )?
            .and_then(|wrapped| wrapped.asset_id)
            .ok_or(ContractError::AssetNotFound)?;
        (asset_id, amount, fee)
    };

    // native assets leave custody, wrapped ones are minted
    let payout = |recipient: String, amount: u128| {
        let amount = Uint128::new(amount);
        CosmosMsg::Custom(if native {
            BridgeMsg::Release {
                asset_id,
                recipient,
                amount,
            }
        } else {
            BridgeMsg::Mint {
                asset_id,
                recipient,
                amount,
            }
        })
    };

    let mut messages = vec![payout(recipient.to_string(), amount)];
    if fee != 0 {
        messages.push(payout(relayer.clone(), fee));
    }
    let action = if native {
        "complete_transfer_native"
    } else {
        "complete_transfer_wrapped"
    };

    Ok(Response::new()
        .add_messages(messages)
        .add_attribute("action", action)
        .add_attribute("asset_id", asset_id.to_string())
        .add_attribute("recipient", recipient)
        .add_attribute("amount", amount.to_string())
        .add_attribute("relayer", relayer)
        .add_attribute("fee", fee.to_string()))
}

#[allow(clippy::too_many_arguments)]
fn handle_initiate_transfer(
    storage: &mut dyn Storage,
    env: &Env,
    info: &MessageInfo,
    assets: &dyn AssetQuerier,
    asset: Asset,
    recipient_chain: u16,
    recipient: [u8; 32],
    fee: Uint128,
    transfer_type: TransferType<Vec<u8>>,
    nonce: u32,
) -> Result<Response<BridgeMsg>, ContractError> {
    let cfg = CONFIG.load(storage)?;

    if recipient_chain == cfg.chain_id {
        return Err(ContractError::SameSourceAndTarget);
    }
    if asset.amount.is_zero() {
        return Err(ContractError::AmountTooLow);
    }
    if fee > asset.amount {
        return Err(ContractError::FeeExceedsAmount);
    }

    let sender = canonical_address(&info.sender)?;
    let owner = info.sender.to_string();

    let (token_chain, token_address, amount, fee, deposit) =
        match WRAPPED_ORIGINS.may_load(storage, asset.asset_id)? {
            // This is a wrapped asset, burn it
            Some(origin) => (
                origin.token_chain,
                origin.token_address,
                asset.amount.u128(),
                fee.u128(),
                BridgeMsg::Burn {
                    asset_id: asset.asset_id,
                    owner,
                    amount: asset.amount,
                },
            ),
            // A native asset: chop off dust and keep the rest in custody
            None => {
                let decimals = assets.asset_info(asset.asset_id)?.decimals;
                let amount = normalize(asset.amount.u128(), decimals)?;
                let fee = normalize(fee.u128(), decimals)?;
                if amount == 0 {
                    return Err(ContractError::AmountTooLow);
                }
                let locked = denormalize(amount, decimals)?;
                (
                    cfg.chain_id,
                    native_token_address(asset.asset_id),
                    amount,
                    fee,
                    BridgeMsg::Lock {
                        asset_id: asset.asset_id,
                        owner,
                        amount: Uint128::new(locked),
                    },
                )
            }
        };

    let amount = u64::try_from(amount).map_err(|_| ContractError::AmountTooHigh)?;
    let fee = u64::try_from(fee).map_err(|_| ContractError::AmountTooHigh)?;

    let token_bridge_message = match transfer_type {
        TransferType::WithoutPayload => TokenBridgeMessage {
            action: Action::TRANSFER,
            payload: TransferInfo {
                amount,
                token_address,
                token_chain,
                recipient,
                recipient_chain,
                fee,
            }
            .serialize(),
        },
        TransferType::WithPayload { payload } => TokenBridgeMessage {
            action: Action::TRANSFER_WITH_PAYLOAD,
            payload: TransferWithPayloadInfo {
                amount,
                token_address,
                token_chain,
                recipient,
                recipient_chain,
                sender_address: sender,
                payload,
            }
            .serialize(),
        },
    };

    // core takes its message fee out of the funds sent along
    let published = publish_message(
        storage,
        env,
        &cfg.emitter_address,
        &info.funds,
        &token_bridge_message.serialize(),
        nonce,
    )?;

    Ok(Response::new()
        .add_message(CosmosMsg::Custom(deposit))
        .add_attributes(published.attributes)
        .add_attribute("transfer.token_chain", token_chain.to_string())
        .add_attribute("transfer.token", hex::encode(token_address))
        .add_attribute("transfer.sender", hex::encode(sender))
        .add_attribute("transfer.recipient_chain", recipient_chain.to_string())
        .add_attribute("transfer.recipient", hex::encode(recipient))
        .add_attribute("transfer.amount", amount.to_string())
        .add_attribute("transfer.fee", fee.to_string())
        .add_attribute("transfer.nonce", nonce.to_string()))
}

fn handle_create_asset_meta(
    storage: &mut dyn Storage,
    env: &Env,
    info: &MessageInfo,
    assets: &dyn AssetQuerier,
    asset_id: u64,
    nonce: u32,
) -> Result<Response<BridgeMsg>, ContractError> {
    let cfg = CONFIG.load(storage)?;

    // only native assets can be attested from here
    if WRAPPED_ORIGINS.has(storage, asset_id) {
        return Err(ContractError::ReattestationOfWrappedAsset);
    }

    let asset_info = assets.asset_info(asset_id)?;
    let meta = AssetMeta {
        token_address: native_token_address(asset_id),
        token_chain: cfg.chain_id,
        decimals: min(asset_info.decimals, BRIDGE_DECIMALS),
        symbol: string_to_array(&asset_info.symbol),
        name: string_to_array(&asset_info.name),
    };

    let token_bridge_message = TokenBridgeMessage {
        action: Action::ATTEST_META,
        payload: meta.serialize(),
    };
    let published = publish_message(
        storage,
        env,
        &cfg.emitter_address,
        &info.funds,
        &token_bridge_message.serialize(),
        nonce,
    )?;

    Ok(Response::new()
        .add_attributes(published.attributes)
        .add_attribute("meta.token_chain", cfg.chain_id.to_string())
        .add_attribute("meta.asset_id", asset_id.to_string())
        .add_attribute("meta.symbol", asset_info.symbol)
        .add_attribute("meta.nonce", nonce.to_string()))
}

pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::WrappedRegistry { chain, address } => {
            to_json_binary(&query_wrapped_registry(deps, chain, address.as_slice())?)
        }
        QueryMsg::ChainRegistration { chain } => {
            to_json_binary(&query_chain_registration(deps, chain)?)
        }
        QueryMsg::TransferInfo { vaa } => to_json_binary(&query_transfer_info(deps, env, &vaa)?),
    }
}

pub fn query_wrapped_registry(
    deps: Deps,
    chain: u16,
    address: &[u8],
) -> StdResult<WrappedRegistryResponse> {
    // Check if this asset is already deployed
    match WRAPPED_ASSETS.may_load(deps.storage, (chain, address))? {
        Some(wrapped) => Ok(WrappedRegistryResponse {
            asset_id: wrapped.asset_id,
            decimals: wrapped.decimals,
            symbol: wrapped.symbol,
            name: wrapped.name,
        }),
        None => ContractError::AssetNotFound.std_err(),
    }
}

pub fn query_chain_registration(deps: Deps, chain: u16) -> StdResult<ChainRegistrationResponse> {
    match BRIDGE_CONTRACTS.may_load(deps.storage, chain)? {
        Some(address) => Ok(ChainRegistrationResponse {
            address: Binary::from(address.as_slice()),
        }),
        None => ContractError::UnregisteredChain.std_err(),
    }
}

fn query_transfer_info(deps: Deps, env: Env, vaa: &Binary) -> StdResult<TransferInfoResponse> {
    let cfg = CONFIG.load(deps.storage)?;

    let parsed = parse_and_verify_vaa(deps.storage, env.block.time.seconds(), vaa.as_slice())
        .map_err(|e| e.std())?;

    // check if vaa is from governance
    if is_governance_emitter(&cfg, parsed.emitter_chain, &parsed.emitter_address) {
        return ContractError::InvalidVAAAction.std_err();
    }

    let message = TokenBridgeMessage::deserialize(&parsed.payload).map_err(|e| e.std())?;
    let (core, payload) = match message.action {
        Action::TRANSFER => (
            TransferInfo::deserialize(&message.payload).map_err(|e| e.std())?,
            vec![],
        ),
        Action::TRANSFER_WITH_PAYLOAD => {
            let info =
                TransferWithPayloadInfo::deserialize(&message.payload).map_err(|e| e.std())?;
            (info.as_transfer_info(), info.payload)
        }
        _ => return ContractError::InvalidVAAAction.std_err(),
    };

    Ok(TransferInfoResponse {
        amount: Uint128::from(core.amount),
        token_address: core.token_address,
        token_chain: core.token_chain,
        recipient: core.recipient,
        recipient_chain: core.recipient_chain,
        fee: Uint128::from(core.fee),
        payload,
    })
}
