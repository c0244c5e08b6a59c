//! AWS SDK client initialisation and the SSM Parameter Store adapter.
//!
//! Parameter Store is the only AWS service this process talks to, and only
//! during startup.

pub mod clients;
pub mod parameter_store;

pub use clients::AwsClients;
pub use parameter_store::ParameterStore;
