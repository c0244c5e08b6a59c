//! AWS SDK client bundle.

use aws_config::BehaviorVersion;

/// AWS SDK clients used at startup.
///
/// Credentials and region come from the standard AWS provider chain
/// (environment, shared config, instance profile).
#[derive(Clone)]
pub struct AwsClients {
    /// SSM client used to read the configuration hierarchy.
    pub ssm: aws_sdk_ssm::Client,
}

impl AwsClients {
    /// Initialise all AWS SDK clients.
    ///
    /// `ssm_endpoint_url` overrides the SSM endpoint, e.g. for a local
    /// emulator. Credentials are resolved lazily on the first request.
    pub async fn init(ssm_endpoint_url: Option<&str>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let mut ssm_config = aws_sdk_ssm::config::Builder::from(&config);
        if let Some(url) = ssm_endpoint_url {
            ssm_config = ssm_config.endpoint_url(url);
        }

        Self {
            ssm: aws_sdk_ssm::Client::from_conf(ssm_config.build()),
        }
    }
}
