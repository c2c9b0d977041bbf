use crate::error::StorageError;

pub const DEFAULT_REGION: &str = "ru-central1";

pub const ENV_BUCKET: &str = "S3_BUCKET";
pub const ENV_BUCKET_FALLBACK: &str = "AWS_BUCKET";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const ENV_PROFILE: &str = "AWS_PROFILE";
pub const ENV_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";
pub const ENV_FORCE_PATH_STYLE: &str = "AWS_S3_FORCE_PATH_STYLE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Static {
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    },
    Profile {
        profile_name: String,
    },
    DefaultChain,
}

impl CredentialSource {
    /// Short description safe to log: never contains the secret.
    pub fn describe(&self) -> String {
        match self {
            CredentialSource::Static {
                access_key_id,
                session_token,
                ..
            } => {
                let kind = if session_token.is_some() { "temporary" } else { "static" };
                format!("{kind} ({})", redact_access_key(access_key_id))
            }
            CredentialSource::Profile { profile_name } => format!("profile ({profile_name})"),
            CredentialSource::DefaultChain => "default_chain".to_string(),
        }
    }
}

/// Values passed explicitly by the caller. Anything left `None` falls back
/// to the environment, then to built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: Option<bool>,
}

/// Fully resolved client settings. Resolved once, before the SDK client is
/// built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub credentials: CredentialSource,
    pub endpoint_url: Option<String>,
    /// Address buckets as `endpoint/bucket/key` instead of
    /// `bucket.endpoint/key`; most self-hosted S3 servers need this.
    pub force_path_style: bool,
}

impl StorageConfig {
    /// Resolve against the process environment.
    pub fn resolve(bucket: impl Into<String>, overrides: Overrides) -> Self {
        Self::resolve_with(bucket, overrides, env_lookup)
    }

    /// Resolve against an arbitrary variable source.
    pub fn resolve_with(
        bucket: impl Into<String>,
        overrides: Overrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let pick = |explicit: Option<String>, name: &str| explicit.filter(|v| !v.is_empty()).or_else(|| var(name));

        let region = pick(overrides.region, ENV_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string());
        let access_key_id = pick(overrides.access_key_id, ENV_ACCESS_KEY_ID);
        let secret_access_key = pick(overrides.secret_access_key, ENV_SECRET_ACCESS_KEY);
        let session_token = pick(overrides.session_token, ENV_SESSION_TOKEN);
        let profile = pick(overrides.profile, ENV_PROFILE);

        let credentials = match (access_key_id, secret_access_key, profile) {
            (Some(access_key_id), Some(secret_access_key), _) => CredentialSource::Static {
                access_key_id,
                secret_access_key,
                session_token,
            },
            (_, _, Some(profile_name)) => CredentialSource::Profile { profile_name },
            _ => CredentialSource::DefaultChain,
        };

        let force_path_style = overrides
            .force_path_style
            .or_else(|| var(ENV_FORCE_PATH_STYLE).map(|v| parse_flag(&v)))
            .unwrap_or(false);

        Self {
            bucket: bucket.into(),
            region,
            credentials,
            endpoint_url: pick(overrides.endpoint_url, ENV_ENDPOINT_URL),
            force_path_style,
        }
    }

    /// Resolve everything, including the bucket, from the environment.
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StorageError> {
        let bucket = bucket_from(&lookup).ok_or_else(|| {
            StorageError::Config(format!("set {ENV_BUCKET} or {ENV_BUCKET_FALLBACK}"))
        })?;
        Ok(Self::resolve_with(bucket, Overrides::default(), lookup))
    }

    pub(crate) fn validate(&self) -> Result<(), StorageError> {
        if self.bucket.trim().is_empty() {
            return Err(StorageError::Config("bucket name is empty".to_string()));
        }
        Ok(())
    }
}

/// `S3_BUCKET`, falling back to `AWS_BUCKET`.
pub fn bucket_from_env() -> Option<String> {
    bucket_from(&env_lookup)
}

fn bucket_from(lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
    [ENV_BUCKET, ENV_BUCKET_FALLBACK]
        .into_iter()
        .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn redact_access_key(key: &str) -> String {
    if key.len() <= 8 || !key.is_ascii() {
        return "****".to_string();
    }
    let prefix = &key[..4];
    let suffix = &key[key.len() - 4..];
    format!("{prefix}...{suffix}")
}
