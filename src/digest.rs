//! Per-entry content digest pipeline.
//!
//! Digests are initialized fresh for each regular-file entry, fed every
//! clipped content chunk, and finalized once when the entry is finished.
//! Cryptographic algorithms sit behind [`digest::DynDigest`] so the writer
//! never branches on which ones exist: a build without an algorithm simply
//! never registers it. Registration order is emission order: cksum, MD5,
//! RIPEMD-160, SHA-1, SHA-256, SHA-384, SHA-512.

use digest::DynDigest;

use crate::cksum::Cksum;
use crate::keys::KeySet;

/// The set of digest contexts active for the entry currently open.
#[derive(Default)]
pub(crate) struct SumPipeline {
    cksum: Option<Cksum>,
    digests: Vec<(&'static str, Box<dyn DynDigest>)>,
}

impl SumPipeline {
    /// A pipeline that computes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the pipeline for a new entry.
    ///
    /// A digest is active only when its keyword is enabled and the entry is
    /// a regular file.
    pub fn for_entry(keys: KeySet, regular: bool) -> Self {
        let mut pipeline = Self::empty();
        if !regular {
            return pipeline;
        }

        if keys.contains(KeySet::CKSUM) {
            pipeline.cksum = Some(Cksum::new());
        }
        #[cfg(feature = "md5")]
        if keys.contains(KeySet::MD5) {
            pipeline.register("md5digest", Box::new(md5::Md5::default()));
        }
        #[cfg(feature = "rmd160")]
        if keys.contains(KeySet::RMD160) {
            pipeline.register("rmd160digest", Box::new(ripemd::Ripemd160::default()));
        }
        #[cfg(feature = "sha1")]
        if keys.contains(KeySet::SHA1) {
            pipeline.register("sha1digest", Box::new(sha1::Sha1::default()));
        }
        #[cfg(feature = "sha2")]
        {
            if keys.contains(KeySet::SHA256) {
                pipeline.register("sha256digest", Box::new(sha2::Sha256::default()));
            }
            if keys.contains(KeySet::SHA384) {
                pipeline.register("sha384digest", Box::new(sha2::Sha384::default()));
            }
            if keys.contains(KeySet::SHA512) {
                pipeline.register("sha512digest", Box::new(sha2::Sha512::default()));
            }
        }
        pipeline
    }

    fn register(&mut self, label: &'static str, hasher: Box<dyn DynDigest>) {
        self.digests.push((label, hasher));
    }

    /// Feed a content chunk to every active digest.
    pub fn update(&mut self, data: &[u8]) {
        if let Some(cksum) = &mut self.cksum {
            cksum.update(data);
        }
        for (_, hasher) in &mut self.digests {
            hasher.update(data);
        }
    }

    /// Finalize every active digest, appending ` key=value` tokens to the
    /// pending line in registration order.
    pub fn finalize_into(self, line: &mut Vec<u8>) {
        if let Some(cksum) = self.cksum {
            line.extend_from_slice(format!(" cksum={}", cksum.finalize()).as_bytes());
        }
        for (label, hasher) in self.digests {
            line.extend_from_slice(b" ");
            line.extend_from_slice(label.as_bytes());
            line.extend_from_slice(b"=");
            push_hex(line, &hasher.finalize());
        }
    }
}

/// Append `bin` as lowercase hex, most significant nibble first.
fn push_hex(out: &mut Vec<u8>, bin: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for &b in bin {
        out.push(HEX[usize::from(b >> 4)]);
        out.push(HEX[usize::from(b & 0x0f)]);
    }
}
