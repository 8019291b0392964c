pub mod bodies;
pub mod ledger_fixture;
pub mod mock_wallet;

pub use bodies::*;
pub use ledger_fixture::LedgerFixture;
pub use mock_wallet::{MockWallet, SignCall};
