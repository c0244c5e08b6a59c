//! [`ParameterSource`] backed by SSM `GetParametersByPath`.

use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::types::{Parameter, ParameterType};

use crate::hydrate::{
    ListRequest, ParameterKind, ParameterPage, ParameterSource, RemoteEntry, SourceError,
};

/// SSM Parameter Store reader.
#[derive(Clone)]
pub struct ParameterStore {
    client: aws_sdk_ssm::Client,
}

impl ParameterStore {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterSource for ParameterStore {
    async fn list_under(&self, request: &ListRequest) -> Result<ParameterPage, SourceError> {
        let output = self
            .client
            .get_parameters_by_path()
            .path(&request.path)
            .recursive(request.options.recursive)
            .with_decryption(request.options.with_decryption)
            .set_next_token(request.next_token.clone())
            .send()
            .await
            .map_err(|e| SourceError::Request(DisplayErrorContext(&e).to_string()))?;

        let entries = output
            .parameters()
            .iter()
            .map(entry_from_parameter)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ParameterPage {
            entries,
            next_token: output.next_token().map(str::to_owned),
        })
    }
}

fn entry_from_parameter(parameter: &Parameter) -> Result<RemoteEntry, SourceError> {
    let name = parameter
        .name()
        .ok_or_else(|| SourceError::Incomplete("parameter without a name".into()))?;
    let value = parameter
        .value()
        .ok_or_else(|| SourceError::Incomplete(format!("parameter {name} has no value")))?;

    Ok(RemoteEntry {
        name: name.to_owned(),
        value: value.to_owned(),
        kind: kind_of(parameter.r#type()),
    })
}

fn kind_of(parameter_type: Option<&ParameterType>) -> ParameterKind {
    match parameter_type {
        Some(ParameterType::String) => ParameterKind::String,
        Some(ParameterType::SecureString) => ParameterKind::SecureString,
        Some(ParameterType::StringList) => ParameterKind::StringList,
        _ => ParameterKind::Unknown,
    }
}
