use cosmwasm_std::StdError;
use thiserror::Error;

/// Failures of the positional VAA codec.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A fixed-width field could not be read
    #[error("Truncated")]
    Truncated,

    /// The data is shorter than the signature block announced by the header
    #[error("SignatureCountMismatch")]
    SignatureCountMismatch,
}

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    /// VAA could not be decoded
    #[error("MalformedVAA: {0}")]
    MalformedVAA(#[from] ParseError),

    /// Invalid VAA version
    #[error("InvalidVersion")]
    InvalidVersion,

    /// Not enough distinct guardians signed, or one guardian signed twice
    #[error("InsufficientSignatures")]
    InsufficientSignatures,

    /// More signatures than guardians in the set
    #[error("TooManySignatures")]
    TooManySignatures,

    /// A signature does not recover to the guardian it claims to come from
    #[error("SignatureRecoveryFailed")]
    SignatureRecoveryFailed,

    /// A verification step is not shaped like a slice of the signature block
    #[error("InvalidSignatureStep")]
    InvalidSignatureStep,

    /// Verification steps do not tile the signature block exactly
    #[error("IncompleteSignatureCoverage")]
    IncompleteSignatureCoverage,

    /// Guardian set with this index does not exist
    #[error("GuardianSetNotFound")]
    GuardianSetNotFound,

    /// Guardian set is neither current nor inside its grace period
    #[error("StaleGuardianSet")]
    StaleGuardianSet,

    /// A new guardian set must hold at least one key
    #[error("EmptyGuardianSet")]
    EmptyGuardianSet,

    /// Sequence was already consumed for this emitter
    #[error("DuplicateVAA")]
    DuplicateVAA,

    #[error("GovernanceSequenceViolation: {0}")]
    GovernanceSequenceViolation(&'static str),

    /// VAA action code not recognized
    #[error("InvalidVAAAction")]
    InvalidVAAAction,

    /// Target chain id must be the same as the current chain id
    #[error("WrongTargetChain")]
    WrongTargetChain,

    /// Boot can only happen once
    #[error("AlreadyBooted")]
    AlreadyBooted,

    /// Message sender not permitted to execute this operation
    #[error("PermissionDenied")]
    PermissionDenied,

    /// Thrown when fee is enabled for the action, but was not sent with the transaction
    #[error("FeeTooLow")]
    FeeTooLow,

    /// Payout larger than what was collected through message fees
    #[error("InsufficientFees")]
    InsufficientFees,

    /// Only 64-bit amounts are supported
    #[error("AmountTooHigh")]
    AmountTooHigh,

    /// Amount should be higher than zero
    #[error("AmountTooLow")]
    AmountTooLow,

    /// Program does not hash to the approved upgrade
    #[error("UpgradeHashMismatch")]
    UpgradeHashMismatch,

    /// Token bridge message from a chain without a registered emitter
    #[error("UnregisteredChain")]
    UnregisteredChain,

    /// Registered emitter and VAA emitter differ
    #[error("InvalidEmitter")]
    InvalidEmitter,

    /// Emitters are write-once per chain
    #[error("ChainAlreadyRegistered")]
    ChainAlreadyRegistered,

    #[error("ReattestationOfWrappedAsset")]
    ReattestationOfWrappedAsset,

    /// Attestation is not newer than the one that last updated the asset
    #[error("StaleAttestation")]
    StaleAttestation,

    #[error("FeeExceedsAmount")]
    FeeExceedsAmount,

    /// Decimal scale factor out of range
    #[error("DecimalOverflow")]
    DecimalOverflow,

    /// Source and target chain ids must be different
    #[error("SameSourceAndTarget")]
    SameSourceAndTarget,

    /// Wrapped asset not found in the registry
    #[error("AssetNotFound")]
    AssetNotFound,

    /// Wrapped asset init hook sent twice for the same asset
    #[error("AssetAlreadyRegistered")]
    AssetAlreadyRegistered,

    /// Registering asset outside of an attestation
    #[error("RegistrationForbidden")]
    RegistrationForbidden,

    /// Could not decode address from its human-readable form
    #[error("WrongTargetAddressFormat")]
    WrongTargetAddressFormat,
}

impl ContractError {
    pub fn std(&self) -> StdError {
        StdError::generic_err(format!("{self}"))
    }

    pub fn std_err<T>(&self) -> Result<T, StdError> {
        Err(self.std())
    }
}
