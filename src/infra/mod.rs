pub mod email;
pub mod factory;
pub mod payment;
pub mod push;
pub mod repositories;
