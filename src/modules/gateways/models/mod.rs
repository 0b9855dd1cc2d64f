pub mod gateway_environment;

pub use gateway_environment::GatewayEnvironment;
