use crate::transaction::Address;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Checks that `signature` over `message` was produced by the key behind `address`
pub trait SignatureVerifier {
    fn verify(&self, address: &Address, message: &[u8], signature: &[u8]) -> bool;
}

impl<F> SignatureVerifier for F
where
    F: Fn(&Address, &[u8], &[u8]) -> bool,
{
    fn verify(&self, address: &Address, message: &[u8], signature: &[u8]) -> bool {
        self(address, message, signature)
    }
}

/// Ed25519 verification where an address is the 32-byte public key.
/// Malformed keys and signatures never verify.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, address: &Address, message: &[u8], signature: &[u8]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(address.as_bytes()) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };

        key.verify(message, &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{address, key};
    use ed25519_dalek::Signer;

    #[test]
    fn test_valid_signature() {
        let signature = key(1).sign(b"ledger");

        assert!(Ed25519Verifier.verify(&address(1), b"ledger", &signature.to_bytes()));
    }

    #[test]
    fn test_wrong_signer() {
        let signature = key(1).sign(b"ledger");

        assert!(!Ed25519Verifier.verify(&address(2), b"ledger", &signature.to_bytes()));
    }

    #[test]
    fn test_tampered_message_and_signature() {
        let mut signature = key(1).sign(b"ledger").to_bytes();

        assert!(!Ed25519Verifier.verify(&address(1), b"ledgex", &signature));

        signature[10] ^= 0x01;
        assert!(!Ed25519Verifier.verify(&address(1), b"ledger", &signature));
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let signature = key(1).sign(b"ledger").to_bytes();

        assert!(!Ed25519Verifier.verify(&address(1), b"ledger", &signature[..63]));
        assert!(!Ed25519Verifier.verify(&address(1), b"ledger", &[]));
    }

    #[test]
    fn test_closure_verifier() {
        let accept_all = |_: &Address, _: &[u8], _: &[u8]| true;

        assert!(accept_all.verify(&Address::default(), b"", b""));
    }
}
