use std::fmt;

/// Why a channel was closed. The code travels on the wire with the
/// disconnect notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DisconnectCause {
    Timeout = 0,
    ProtocolError = 1,
    ResolveFailed = 2,
    VersionMismatch = 3,
    ServerFull = 4,
    Kicked = 5,
    Banned = 6,
    ContextCorruption = 7,
    AuthenticationFailed = 8,
    GameError = 9,
    NotDedicatedServer = 10,
    CantConnect = 11,
    SessionDeleted = 12,
    NubDestroyed = 13,
    UserRequested = 14,
    FailedToMigrateToNewHost = 15,
    Unknown = 255,
}

impl DisconnectCause {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> DisconnectCause {
        match code {
            0 => DisconnectCause::Timeout,
            1 => DisconnectCause::ProtocolError,
            2 => DisconnectCause::ResolveFailed,
            3 => DisconnectCause::VersionMismatch,
            4 => DisconnectCause::ServerFull,
            5 => DisconnectCause::Kicked,
            6 => DisconnectCause::Banned,
            7 => DisconnectCause::ContextCorruption,
            8 => DisconnectCause::AuthenticationFailed,
            9 => DisconnectCause::GameError,
            10 => DisconnectCause::NotDedicatedServer,
            11 => DisconnectCause::CantConnect,
            12 => DisconnectCause::SessionDeleted,
            13 => DisconnectCause::NubDestroyed,
            14 => DisconnectCause::UserRequested,
            15 => DisconnectCause::FailedToMigrateToNewHost,
            _ => DisconnectCause::Unknown,
        }
    }

    /// Whether the remote side may try to reconnect later
    pub fn allows_reconnect(self) -> bool {
        !matches!(
            self,
            DisconnectCause::Banned
                | DisconnectCause::Kicked
                | DisconnectCause::VersionMismatch
                | DisconnectCause::AuthenticationFailed
        )
    }
}

impl fmt::Display for DisconnectCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
