//! Single-pass, multi-algorithm content hasher.
//!
//! # Overview
//! Every file is read once from start to end in fixed-size blocks. Each block
//! is fed to the running digest of every requested algorithm before the next
//! block is read, so adding algorithms never adds I/O.
//!
//! The resulting composite signature has the form
//! `md5#<hex>_sha256#<hex>`: one `name#hexdigest` part per algorithm, in the
//! requested order, joined by [`SIGNATURE_SEPARATOR`].
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{ContentHasher, HashAlgorithm};
//! use std::path::Path;
//!
//! let hasher = ContentHasher::new(&[HashAlgorithm::Md5, HashAlgorithm::Sha256]).unwrap();
//! let signature = hasher.hash_file(Path::new("file.bin")).unwrap();
//! println!("{}", signature);
//! ```

use std::fmt;
use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::Digest as _;
use twox_hash::XxHash64;

use super::{FileRecord, HashError};
use crate::config::ConfigError;

/// Default read block size (1 MiB).
pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

/// Separator between the per-algorithm parts of a composite signature.
pub const SIGNATURE_SEPARATOR: &str = "_";

/// Hash algorithms available for content signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HashAlgorithm {
    /// MD5 (fast, not collision resistant)
    Md5,
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
    /// BLAKE3
    Blake3,
    /// XXH64 (very fast, non-cryptographic)
    Xxh64,
}

impl HashAlgorithm {
    /// All supported algorithms.
    pub const ALL: [HashAlgorithm; 5] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
        HashAlgorithm::Blake3,
        HashAlgorithm::Xxh64,
    ];

    /// Name used in signatures and configuration.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Blake3 => "blake3",
            Self::Xxh64 => "xxh64",
        }
    }

    /// Whether the algorithm is designed to resist deliberate collisions.
    #[must_use]
    pub fn is_cryptographic(self) -> bool {
        !matches!(self, Self::Xxh64)
    }

    /// Start a fresh running digest for this algorithm.
    #[must_use]
    pub fn start(self) -> Box<dyn StreamingDigest> {
        match self {
            Self::Md5 => Box::new(Md5Digest(md5::Context::new())),
            Self::Sha256 => Box::new(Sha2Digest(sha2::Sha256::new())),
            Self::Sha512 => Box::new(Sha2Digest(sha2::Sha512::new())),
            Self::Blake3 => Box::new(Blake3Digest(blake3::Hasher::new())),
            Self::Xxh64 => Box::new(Xxh64Digest(XxHash64::with_seed(0))),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "");
        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|a| a.name()).collect();
                format!(
                    "unknown hash algorithm '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                )
            })
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HashAlgorithm> for String {
    fn from(value: HashAlgorithm) -> Self {
        value.name().to_string()
    }
}

/// A running digest that absorbs blocks and produces a hex string.
pub trait StreamingDigest: Send {
    /// Feed the next block of content.
    fn absorb(&mut self, block: &[u8]);

    /// Consume the digest and return its lowercase hex value.
    fn finalize(self: Box<Self>) -> String;
}

struct Md5Digest(md5::Context);

impl StreamingDigest for Md5Digest {
    fn absorb(&mut self, block: &[u8]) {
        self.0.consume(block);
    }

    fn finalize(self: Box<Self>) -> String {
        format!("{:x}", self.0.compute())
    }
}

struct Sha2Digest<D>(D);

impl<D: sha2::Digest + Send> StreamingDigest for Sha2Digest<D> {
    fn absorb(&mut self, block: &[u8]) {
        self.0.update(block);
    }

    fn finalize(self: Box<Self>) -> String {
        hex::encode(self.0.finalize())
    }
}

struct Blake3Digest(blake3::Hasher);

impl StreamingDigest for Blake3Digest {
    fn absorb(&mut self, block: &[u8]) {
        self.0.update(block);
    }

    fn finalize(self: Box<Self>) -> String {
        self.0.finalize().to_hex().to_string()
    }
}

struct Xxh64Digest(XxHash64);

impl StreamingDigest for Xxh64Digest {
    fn absorb(&mut self, block: &[u8]) {
        self.0.write(block);
    }

    fn finalize(self: Box<Self>) -> String {
        format!("{:016x}", self.0.finish())
    }
}

/// Ordered set of running digests for one file.
///
/// Lives only for the duration of a single file's hashing call.
pub(crate) struct DigestSet {
    digests: Vec<(HashAlgorithm, Box<dyn StreamingDigest>)>,
}

impl DigestSet {
    pub(crate) fn new(algorithms: &[HashAlgorithm]) -> Self {
        Self {
            digests: algorithms.iter().map(|alg| (*alg, alg.start())).collect(),
        }
    }

    pub(crate) fn absorb(&mut self, block: &[u8]) {
        for (_, digest) in &mut self.digests {
            digest.absorb(block);
        }
    }

    /// Build the composite signature in algorithm order.
    pub(crate) fn finalize(self) -> String {
        self.digests
            .into_iter()
            .map(|(alg, digest)| format!("{}#{}", alg.name(), digest.finalize()))
            .collect::<Vec<_>>()
            .join(SIGNATURE_SEPARATOR)
    }
}

/// Computes composite content signatures.
#[derive(Debug, Clone)]
pub struct ContentHasher {
    algorithms: Vec<HashAlgorithm>,
    block_size: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl ContentHasher {
    /// Create a hasher for the given algorithms with the default block size.
    ///
    /// Repeated algorithms are collapsed, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if no algorithm is requested.
    pub fn new(algorithms: &[HashAlgorithm]) -> Result<Self, ConfigError> {
        let mut unique: Vec<HashAlgorithm> = Vec::with_capacity(algorithms.len());
        for alg in algorithms {
            if !unique.contains(alg) {
                unique.push(*alg);
            }
        }

        if unique.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one hash algorithm is required".to_string(),
            ));
        }

        if !unique.iter().any(|alg| alg.is_cryptographic()) {
            log::warn!(
                "Only non-cryptographic algorithms requested ({}); add a cryptographic one to rule out collisions",
                unique
                    .iter()
                    .map(|a| a.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(Self {
            algorithms: unique,
            block_size: DEFAULT_BLOCK_SIZE,
            shutdown_flag: None,
        })
    }

    /// Set the read block size.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `block_size` is zero.
    pub fn with_block_size(mut self, block_size: usize) -> Result<Self, ConfigError> {
        if block_size == 0 {
            return Err(ConfigError::Invalid(
                "block size must be greater than zero".to_string(),
            ));
        }
        self.block_size = block_size;
        Ok(self)
    }

    /// Set the shutdown flag checked between blocks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Algorithms in signature order.
    #[must_use]
    pub fn algorithms(&self) -> &[HashAlgorithm] {
        &self.algorithms
    }

    /// Read block size in bytes.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Compute the composite signature of a file.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `PermissionDenied` / `Io` if the file cannot be opened or read
    /// - `Interrupted` if shutdown was requested while reading
    pub fn hash_file(&self, path: &Path) -> Result<String, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.hash_reader(path, file)
    }

    /// Compute the composite signature of in-memory content.
    #[must_use]
    pub fn hash_bytes(&self, data: &[u8]) -> String {
        let mut digests = DigestSet::new(&self.algorithms);
        for block in data.chunks(self.block_size) {
            digests.absorb(block);
        }
        digests.finalize()
    }

    /// Hash a record's file and assign the signature to it.
    ///
    /// # Errors
    ///
    /// Same as [`ContentHasher::hash_file`]; the record is left unsigned.
    pub fn hash_record(&self, record: &mut FileRecord) -> Result<(), HashError> {
        let signature = self.hash_file(&record.path)?;
        record.assign_signature(signature);
        Ok(())
    }

    fn hash_reader<R: Read>(&self, path: &Path, mut reader: R) -> Result<String, HashError> {
        let mut digests = DigestSet::new(&self.algorithms);
        let mut buffer = vec![0u8; self.block_size];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }

            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };

            digests.absorb(&buffer[..read]);
        }

        Ok(digests.finalize())
    }
}
