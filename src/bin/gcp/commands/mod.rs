pub mod pubsub;
pub mod query;
pub mod sheet;
pub mod token;
