use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The S3 operation a presigned URL authorizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresignMethod {
    #[default]
    GetObject,
    PutObject,
    HeadObject,
    DeleteObject,
}

impl PresignMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresignMethod::GetObject => "get_object",
            PresignMethod::PutObject => "put_object",
            PresignMethod::HeadObject => "head_object",
            PresignMethod::DeleteObject => "delete_object",
        }
    }
}

impl fmt::Display for PresignMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresignMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get_object" => Ok(PresignMethod::GetObject),
            "put_object" => Ok(PresignMethod::PutObject),
            "head_object" => Ok(PresignMethod::HeadObject),
            "delete_object" => Ok(PresignMethod::DeleteObject),
            other => Err(CoreError::UnsupportedMethod(other.to_string())),
        }
    }
}
