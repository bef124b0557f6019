//! Random contacts and a timed batch benchmark over [`ContactBook`].
//!
//! Each batch size runs insert, search, update and delete over the same set
//! of generated contacts and records the wall-clock time of each pass. The
//! book is cleared between sizes, so a run also exercises clear+refill.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::contact::ContactBook;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const NAME_LEN: usize = 9;
const PHONE_LEN: usize = 9;
const EMAIL_LEN: usize = 14;

/// Phone written by the update pass.
pub const UPDATED_PHONE: &str = "1234567890";
/// Email written by the update pass.
pub const UPDATED_EMAIL: &str = "newemail@test.com";

/// Label in the first CSV column.
pub const STRUCTURE: &str = "AVL";

/// `len` letters drawn uniformly from `[a-zA-Z]`.
pub fn random_string<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(CHARSET[rng.gen_range(0..CHARSET.len())]))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomContact {
    pub name: String,
    pub phone: String,
    pub email: String,
}

pub fn random_contact<R: Rng + ?Sized>(rng: &mut R) -> RandomContact {
    RandomContact {
        name: random_string(rng, NAME_LEN),
        phone: random_string(rng, PHONE_LEN),
        email: random_string(rng, EMAIL_LEN),
    }
}

/// Benchmark settings.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of contacts per batch
    pub sizes: Vec<usize>,
    /// RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            sizes: vec![100, 500, 1000],
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Search,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Insert => "Insert",
            Operation::Search => "Search",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
        }
    }
}

/// One timed pass.
#[derive(Debug, Clone)]
pub struct Timing {
    pub operation: Operation,
    pub contacts: usize,
    pub elapsed: Duration,
}

/// Generates `n` contacts with distinct names.
pub fn distinct_contacts<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<RandomContact> {
    let mut seen = std::collections::HashSet::with_capacity(n);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let contact = random_contact(rng);
        if seen.insert(contact.name.clone()) {
            out.push(contact);
        }
    }
    out
}

fn timed(operation: Operation, contacts: usize, f: impl FnOnce()) -> Timing {
    let start = Instant::now();
    f();
    Timing {
        operation,
        contacts,
        elapsed: start.elapsed(),
    }
}

/// Runs every batch size against `book` and returns the timings in run order.
///
/// The book is cleared before each size and is empty again afterwards.
pub fn run_with(book: &mut ContactBook, config: &BenchConfig) -> Vec<Timing> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut timings = Vec::with_capacity(config.sizes.len() * 4);
    for &n in &config.sizes {
        book.clear();
        let contacts = distinct_contacts(&mut rng, n);

        timings.push(timed(Operation::Insert, n, || {
            for c in &contacts {
                if let Err(e) = book.insert(&c.name, &c.phone, &c.email) {
                    log::warn!("insert {:?}: {e}", c.name);
                }
            }
        }));

        timings.push(timed(Operation::Search, n, || {
            for c in &contacts {
                std::hint::black_box(book.get(&c.name));
            }
        }));

        timings.push(timed(Operation::Update, n, || {
            for c in &contacts {
                if let Err(e) = book.update(&c.name, Some(UPDATED_PHONE), Some(UPDATED_EMAIL)) {
                    log::warn!("update {:?}: {e}", c.name);
                }
            }
        }));

        timings.push(timed(Operation::Delete, n, || {
            for c in &contacts {
                if let Err(e) = book.remove(&c.name) {
                    log::warn!("delete {:?}: {e}", c.name);
                }
            }
        }));

        log::info!("benchmarked {n} contacts");
    }
    timings
}

/// [`run_with`] on a fresh book.
pub fn run(config: &BenchConfig) -> Vec<Timing> {
    run_with(&mut ContactBook::new(), config)
}

/// Writes `DataStructure,Operation,Contacts,Time_ms` rows.
pub fn write_csv<W: Write>(mut out: W, timings: &[Timing]) -> io::Result<()> {
    writeln!(out, "DataStructure,Operation,Contacts,Time_ms")?;
    for t in timings {
        writeln!(
            out,
            "{},{},{},{:.3}",
            STRUCTURE,
            t.operation.as_str(),
            t.contacts,
            t.elapsed.as_secs_f64() * 1000.0
        )?;
    }
    out.flush()
}
