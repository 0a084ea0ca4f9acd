pub mod attestations;
pub mod balances;

pub use attestations::aggregate_attestations;
pub use balances::{TransferShape, aggregate_balances};
