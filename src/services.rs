pub mod orchestrator;
pub mod storage;
pub mod token;
pub mod validator;
