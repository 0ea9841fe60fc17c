pub mod pull;
pub mod serve;
