use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

const CODE_PREFIX: &str = "TKT";
const SUFFIX_LEN: usize = 6;

/// Source of ticket codes, injectable so tests can force collisions.
///
/// Codes only need to be lexically unique enough; the uniqueness constraint
/// on the tickets table is the real guarantee, and the issuance service
/// retries generation when an insert collides.
pub trait TicketCodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Production generator: fixed prefix, current Unix milliseconds, and a
/// short random uppercase alphanumeric suffix.
pub struct SystemCodeGenerator;

impl TicketCodeGenerator for SystemCodeGenerator {
    fn generate(&self) -> String {
        let millis = Utc::now().timestamp_millis();
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(|b| (b as char).to_ascii_uppercase())
            .collect();
        format!("{CODE_PREFIX}{millis}{suffix}")
    }
}
