pub mod remote;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use remote::RemoteStore;
pub use state::{
    ClientStore, CreateOutcome, DeleteFailurePolicy, ReloadOutcome, SubscriptionSnapshot,
};
