//! External collaborators the ledger calls out to

use serde::{Deserialize, Serialize};

use crate::types::Address;

/// Moves value out of the ledger.
pub trait FundTransfer {
    /// Send `amount` to `recipient`. Returns `false` if the transfer did not happen.
    fn transfer(&mut self, amount: u128, recipient: &Address) -> bool;

    /// Send every leg or none of them. Returns `false` if nothing moved.
    fn transfer_all(&mut self, legs: &[(u128, Address)]) -> bool;
}

/// Parameters for a new chassis token record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub name: String,
    pub symbol: String,
    pub supply: u128,
    pub owner: Address,
    pub salt: [u8; 32],
}

/// Creates companion token records. Each call yields a unique identifier.
pub trait RecordFactory {
    fn create(&mut self, request: &TokenRequest) -> Option<Address>;

    /// Drop a record created earlier in an operation that later failed.
    fn discard(&mut self, record: &Address);
}

/// In-memory ports for tests and local simulation
#[cfg(any(test, feature = "testing"))]
pub mod mock {
    use super::*;

    /// Records every transfer; can be told to refuse one recipient.
    #[derive(Debug, Default)]
    pub struct MockBank {
        pub transfers: Vec<(Address, u128)>,
        pub reject: Option<Address>,
    }

    impl MockBank {
        pub fn received(&self, recipient: &Address) -> u128 {
            self.transfers
                .iter()
                .filter(|(to, _)| to == recipient)
                .map(|(_, amount)| amount)
                .sum()
        }
    }

    impl FundTransfer for MockBank {
        fn transfer(&mut self, amount: u128, recipient: &Address) -> bool {
            if self.reject.as_ref() == Some(recipient) {
                return false;
            }
            self.transfers.push((*recipient, amount));
            true
        }

        fn transfer_all(&mut self, legs: &[(u128, Address)]) -> bool {
            if legs.iter().any(|(_, to)| self.reject.as_ref() == Some(to)) {
                return false;
            }
            self.transfers.extend(legs.iter().map(|(amount, to)| (*to, *amount)));
            true
        }
    }

    /// Uses the salt as the record id.
    #[derive(Debug, Default)]
    pub struct MockFactory {
        pub created: Vec<TokenRequest>,
        pub fail: bool,
    }

    impl RecordFactory for MockFactory {
        fn create(&mut self, request: &TokenRequest) -> Option<Address> {
            if self.fail {
                return None;
            }
            self.created.push(request.clone());
            Some(Address(request.salt))
        }

        fn discard(&mut self, record: &Address) {
            self.created.retain(|request| request.salt != record.0);
        }
    }
}
