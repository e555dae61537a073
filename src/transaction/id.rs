//! Generation of unique transaction IDs.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::transaction::{Transaction, TransactionId};

/// Produces candidate transaction IDs.
///
/// Candidates are not guaranteed to be unique, [unique_id] checks them against
/// the ledger. Tests substitute a predictable sequence.
pub trait IdGenerator: Send {
    /// Generate the next candidate ID.
    fn next_id(&mut self) -> TransactionId;
}

/// Generates base-16 IDs from a monotonic counter followed by a random suffix.
///
/// The counter makes every candidate from one generator distinct, so a ledger
/// of `n` transactions needs at most `n + 1` candidates to find a free ID.
#[derive(Debug)]
pub struct RandomIdGenerator {
    counter: u32,
    rng: StdRng,
}

impl RandomIdGenerator {
    /// Create a generator seeded from the operating system's entropy source.
    pub fn new() -> Self {
        Self {
            counter: 0,
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_id(&mut self) -> TransactionId {
        self.counter = self.counter.wrapping_add(1);
        let suffix: u32 = self.rng.r#gen();

        TransactionId::new(format!("{:08x}{:08x}", self.counter, suffix))
    }
}

/// Draw candidates from `generator` until one is not used by `transactions`.
pub fn unique_id(transactions: &[Transaction], generator: &mut dyn IdGenerator) -> TransactionId {
    let mut attempts = 1;

    loop {
        let id = generator.next_id();

        if transactions.iter().all(|transaction| transaction.id != id) {
            if attempts > 1 {
                tracing::debug!("Generated unique transaction ID {id} after {attempts} attempts");
            }

            return id;
        }

        attempts += 1;
    }
}
