use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which branded mobile app the account was registered through.
///
/// The Hyyp cloud serves several white-label apps; each one identifies
/// itself with its Android package name and the service scopes the
/// account to that package.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AppPackage {
    /// IDS Hyyp (`com.hyyp247.home`).
    #[default]
    IdsHyyp,
    /// ADT Secure Home (`za.co.adt.securehome.android`).
    AdtSecureHome,
}

impl AppPackage {
    /// The package identifier sent to the service.
    pub fn package_id(self) -> &'static str {
        match self {
            Self::IdsHyyp => "com.hyyp247.home",
            Self::AdtSecureHome => "za.co.adt.securehome.android",
        }
    }

    /// Resolve a raw package identifier back to a known app.
    pub fn from_package_id(id: &str) -> Option<Self> {
        match id {
            "com.hyyp247.home" => Some(Self::IdsHyyp),
            "za.co.adt.securehome.android" => Some(Self::AdtSecureHome),
            _ => None,
        }
    }
}

/// Credentials for an authenticated session with the alarm cloud.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Session token obtained at login.
    pub token: SecretString,
    /// App the token was issued for.
    pub package: AppPackage,
}

impl Credentials {
    pub fn new(token: SecretString, package: AppPackage) -> Self {
        Self { token, package }
    }
}
