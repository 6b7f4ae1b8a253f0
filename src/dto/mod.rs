pub mod activity;
pub mod health;
pub mod session;
pub mod sse;
pub mod strip;
pub mod validation;
