use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use gatepass_types::Digest;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey};
use rsa::pkcs1v15;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

/// Smallest RSA modulus accepted for receipt signing.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Ephemeral RSA keypair used to sign exactly one order.
///
/// The private half never leaves the process: it is held as an
/// `RsaPrivateKey` (zeroized on drop) and only exported as PKCS#1 PEM on
/// explicit request. The public half is kept as SPKI PEM, ready to hand to
/// the buyer.
pub struct SigningKeypair {
    private_key: RsaPrivateKey,
    public_key_pem: String,
}

impl SigningKeypair {
    /// Generate a fresh 2048-bit keypair from the OS-seeded CSPRNG.
    pub fn generate() -> Result<Self, SignatureError> {
        Self::generate_with_bits(MIN_MODULUS_BITS)
    }

    /// Generate a fresh keypair with the given modulus length.
    pub fn generate_with_bits(bits: usize) -> Result<Self, SignatureError> {
        if bits < MIN_MODULUS_BITS {
            return Err(SignatureError::WeakModulus { bits });
        }
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| SignatureError::KeyGeneration(e.to_string()))?;
        Self::from_private_key(private_key)
    }

    /// Load a keypair from a PKCS#1 (`RSA PRIVATE KEY`) PEM document.
    pub fn from_private_key_pem(pem: &str) -> Result<Self, SignatureError> {
        let private_key = RsaPrivateKey::from_pkcs1_pem(pem)
            .map_err(|e| SignatureError::KeyFormat(e.to_string()))?;
        Self::from_private_key(private_key)
    }

    fn from_private_key(private_key: RsaPrivateKey) -> Result<Self, SignatureError> {
        let public_key_pem = RsaPublicKey::from(&private_key)
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| SignatureError::KeyFormat(e.to_string()))?;
        Ok(Self {
            private_key,
            public_key_pem,
        })
    }

    /// SPKI (`PUBLIC KEY`) PEM encoding of the public half.
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    /// PKCS#1 (`RSA PRIVATE KEY`) PEM encoding of the private half.
    pub fn private_key_pem(&self) -> Result<String, SignatureError> {
        self.private_key
            .to_pkcs1_pem(LineEnding::LF)
            .map(|pem| pem.as_str().to_owned())
            .map_err(|e| SignatureError::KeyFormat(e.to_string()))
    }

    /// Modulus length in bits.
    pub fn modulus_bits(&self) -> usize {
        use rsa::traits::PublicKeyParts;
        self.private_key.size() * 8
    }

    /// Sign a digest with RSASSA-PKCS1-v1_5 / SHA-256.
    ///
    /// The 32 digest bytes are the signed message.
    pub fn sign(&self, digest: &Digest) -> Result<Signature, SignatureError> {
        let signing_key = pkcs1v15::SigningKey::<Sha256>::new(self.private_key.clone());
        let signature = signing_key
            .try_sign(digest.as_bytes())
            .map_err(|e| SignatureError::Signing(e.to_string()))?;
        Ok(Signature(signature.to_vec()))
    }
}

impl std::fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKeypair(<redacted>)")
    }
}

/// Raw RSA signature bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode a standard-alphabet base64 signature.
    pub fn from_base64(encoded: &str) -> Result<Self, SignatureError> {
        STANDARD
            .decode(encoded.trim())
            .map(Self)
            .map_err(|e| SignatureError::InvalidEncoding(e.to_string()))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let head = &self.0[..self.0.len().min(8)];
        write!(f, "Signature({}...)", hex::encode(head))
    }
}

/// Parse an RSA public key from SPKI PEM, falling back to PKCS#1 PEM.
fn parse_public_key(pem: &str) -> Result<RsaPublicKey, SignatureError> {
    let pem = pem.trim();
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| SignatureError::KeyFormat(e.to_string()))
}

/// Keypair generation, signing and verification over PEM key material.
///
/// Holds no key state of its own; `verify` is safe to call with
/// attacker-supplied keys and signatures.
#[derive(Clone, Copy, Debug)]
pub struct SignatureService {
    modulus_bits: usize,
}

impl Default for SignatureService {
    fn default() -> Self {
        Self {
            modulus_bits: MIN_MODULUS_BITS,
        }
    }
}

impl SignatureService {
    /// Service producing keys of `modulus_bits`; rejects anything under 2048.
    pub fn new(modulus_bits: usize) -> Result<Self, SignatureError> {
        if modulus_bits < MIN_MODULUS_BITS {
            return Err(SignatureError::WeakModulus { bits: modulus_bits });
        }
        Ok(Self { modulus_bits })
    }

    pub fn modulus_bits(&self) -> usize {
        self.modulus_bits
    }

    pub fn generate_keypair(&self) -> Result<SigningKeypair, SignatureError> {
        SigningKeypair::generate_with_bits(self.modulus_bits)
    }

    /// Sign a digest with a PKCS#1 PEM private key.
    pub fn sign(&self, digest: &Digest, private_key_pem: &str) -> Result<Signature, SignatureError> {
        SigningKeypair::from_private_key_pem(private_key_pem)?.sign(digest)
    }

    /// Check `signature` over `digest` against `public_key_pem`.
    ///
    /// A mismatched signature is `Ok(false)`. Only key material that cannot
    /// be parsed is an error.
    pub fn verify(
        &self,
        digest: &Digest,
        signature: &Signature,
        public_key_pem: &str,
    ) -> Result<bool, SignatureError> {
        let public_key = parse_public_key(public_key_pem)?;
        let verifying_key = pkcs1v15::VerifyingKey::<Sha256>::new(public_key);
        let Ok(signature) = pkcs1v15::Signature::try_from(signature.as_bytes()) else {
            return Ok(false);
        };
        Ok(verifying_key.verify(digest.as_bytes(), &signature).is_ok())
    }
}

/// Errors from key handling and signing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed key material: {0}")]
    KeyFormat(String),
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
    #[error("RSA modulus of {bits} bits is below the 2048-bit minimum")]
    WeakModulus { bits: usize },
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("invalid signature encoding: {0}")]
    InvalidEncoding(String),
}
