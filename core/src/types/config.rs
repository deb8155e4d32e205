use serde::{Deserialize, Serialize};

/// Credentials and region handed to every subprocess.
///
/// Field names on disk follow the environment variable names the `aws` tool
/// reads, so an existing `config.json` can be reused unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AwsConfig {
    #[serde(rename = "AWS_ACCESS_KEY_ID", default)]
    pub access_key_id: String,
    #[serde(rename = "AWS_SECRET_ACCESS_KEY", default)]
    pub secret_access_key: String,
    #[serde(rename = "AWS_DEFAULT_REGION", default)]
    pub default_region: String,
}

/// Network layout shared by the provisioning scripts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CommonConfig {
    #[serde(rename = "AWS_VPC_RDS", default, skip_serializing_if = "Option::is_none")]
    pub vpc_rds_cidr: Option<String>,
    #[serde(rename = "AWS_VPC_EB", default, skip_serializing_if = "Option::is_none")]
    pub vpc_eb_cidr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RdsConfig {
    #[serde(rename = "ENGINE")]
    pub engine: String,
}

impl RdsConfig {
    /// Aurora exposes endpoints per cluster; every other engine per instance.
    pub fn is_aurora(&self) -> bool {
        self.engine == "aurora"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollSettings {
    pub interval_secs: u64,
    pub max_wait_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        PollSettings {
            interval_secs: 5,
            max_wait_secs: 60 * 30,
        }
    }
}

fn default_bucket_prefix() -> String {
    "johanna".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub aws: AwsConfig,
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rds: Option<RdsConfig>,
    #[serde(default)]
    pub poll: PollSettings,
    /// Scratch buckets are named `<prefix>-<region>-<unix time>`.
    #[serde(default = "default_bucket_prefix")]
    pub bucket_prefix: String,
}
