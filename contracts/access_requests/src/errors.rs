use soroban_sdk::contracttype;

/// Error categories for classifying failures at the caller.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Malformed input to a create/update operation
    Validation = 1,
    /// Caller lacks the standing to perform the operation
    Authorization = 2,
    /// The referenced request, record, or user does not exist
    NotFound = 3,
    /// The operation conflicts with current lifecycle state
    StateConflict = 4,
    /// Contract-level issues such as missing initialization
    System = 5,
}

/// Error severity levels indicating the impact of a failure.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorSeverity {
    Low = 1,
    Medium = 2,
    High = 3,
}

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    RequestNotFound = 4,
    RecordNotFound = 5,
    UserNotFound = 6,
    EmptyPurpose = 7,
    PurposeTooLong = 8,
    InvalidDuration = 9,
    RecordNotOwnedByPatient = 10,
    RecordUnavailable = 11,
    DuplicatePendingRequest = 12,
    NotADoctor = 13,
    DoctorNotVerified = 14,
    NotAPatient = 15,
    InvalidTransition = 16,
}

impl ContractError {
    /// Returns the error category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContractError::EmptyPurpose
            | ContractError::PurposeTooLong
            | ContractError::InvalidDuration
            | ContractError::RecordNotOwnedByPatient
            | ContractError::RecordUnavailable => ErrorCategory::Validation,
            ContractError::Unauthorized
            | ContractError::NotADoctor
            | ContractError::DoctorNotVerified
            | ContractError::NotAPatient => ErrorCategory::Authorization,
            ContractError::RequestNotFound
            | ContractError::RecordNotFound
            | ContractError::UserNotFound => ErrorCategory::NotFound,
            ContractError::DuplicatePendingRequest
            | ContractError::InvalidTransition
            | ContractError::AlreadyInitialized => ErrorCategory::StateConflict,
            ContractError::NotInitialized => ErrorCategory::System,
        }
    }

    /// Returns the severity level for this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ContractError::EmptyPurpose
            | ContractError::PurposeTooLong
            | ContractError::InvalidDuration
            | ContractError::RequestNotFound
            | ContractError::RecordNotFound
            | ContractError::UserNotFound
            | ContractError::DuplicatePendingRequest => ErrorSeverity::Low,
            ContractError::Unauthorized
            | ContractError::NotADoctor
            | ContractError::DoctorNotVerified
            | ContractError::NotAPatient
            | ContractError::RecordNotOwnedByPatient
            | ContractError::RecordUnavailable
            | ContractError::InvalidTransition
            | ContractError::AlreadyInitialized => ErrorSeverity::Medium,
            ContractError::NotInitialized => ErrorSeverity::High,
        }
    }

    /// On-chain failures are deterministic: retrying without a state change
    /// cannot succeed. Callers should re-fetch and re-render instead.
    pub fn retryable(&self) -> bool {
        false
    }

    /// Returns a human-readable error message for this error.
    pub fn message(&self) -> &'static str {
        match self {
            ContractError::NotInitialized => "Contract has not been initialized",
            ContractError::AlreadyInitialized => "Contract is already initialized",
            ContractError::Unauthorized => "Caller is not authorized for this operation",
            ContractError::RequestNotFound => "Access request not found",
            ContractError::RecordNotFound => "Health record not found",
            ContractError::UserNotFound => "Wallet is not registered",
            ContractError::EmptyPurpose => "A purpose is required to request access",
            ContractError::PurposeTooLong => "Purpose text exceeds the maximum length",
            ContractError::InvalidDuration => "Access duration is outside the allowed range",
            ContractError::RecordNotOwnedByPatient => {
                "Requested record is not owned by the named patient"
            }
            ContractError::RecordUnavailable => "Requested record has been deleted",
            ContractError::DuplicatePendingRequest => {
                "An identical request is already awaiting a response"
            }
            ContractError::NotADoctor => "Only doctors can request record access",
            ContractError::DoctorNotVerified => "Doctor credentials have not been verified",
            ContractError::NotAPatient => "Access can only be requested from a patient",
            ContractError::InvalidTransition => "The request is not in a state that allows this",
        }
    }
}
