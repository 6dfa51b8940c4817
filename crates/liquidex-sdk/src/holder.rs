use lwk_wollet::elements::bitcoin::{PrivateKey, PublicKey};
use lwk_wollet::elements::secp256k1_zkp::{self, Message, SecretKey, ecdsa};
use lwk_wollet::elements::{Address, AddressParams, Script};
use rand::RngCore;
use rand::thread_rng;

use crate::error::{Error, Result};
use crate::network::Network;
use crate::signer::{self, InputSigner};

/// A single-key P2WPKH identity that owns and signs swap inputs.
///
/// The key is read-only after construction, so one identity can be shared
/// across concurrent builds.
#[derive(Clone)]
pub struct HolderIdentity {
    secret_key: SecretKey,
    public_key: PublicKey,
    network: Network,
    address: Address,
    script_pubkey: Script,
}

impl HolderIdentity {
    pub fn from_secret_key(secret_key: SecretKey, network: Network) -> Self {
        let secp = secp256k1_zkp::Secp256k1::signing_only();
        let public_key = PublicKey {
            inner: secp256k1_zkp::PublicKey::from_secret_key(&secp, &secret_key),
            compressed: true,
        };
        let address = Address::p2wpkh(&public_key, None, network.address_params());
        let script_pubkey = address.script_pubkey();
        Self {
            secret_key,
            public_key,
            network,
            address,
            script_pubkey,
        }
    }

    /// Recover an identity from a WIF-encoded private key.
    ///
    /// The WIF version byte must match `network`: mainnet keys for Liquid,
    /// testnet keys for testnet and regtest.
    pub fn from_wif(wif: &str, network: Network) -> Result<Self> {
        let private_key =
            PrivateKey::from_wif(wif.trim()).map_err(|e| Error::InvalidKey(e.to_string()))?;
        if private_key.network != network.key_network() {
            return Err(Error::InvalidKey(format!("WIF is not a {network} key")));
        }
        if !private_key.compressed {
            return Err(Error::InvalidKey(
                "uncompressed keys cannot own segwit outputs".into(),
            ));
        }
        let secret_key = SecretKey::from_slice(&private_key.inner.secret_bytes())
            .map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(Self::from_secret_key(secret_key, network))
    }

    /// Generate a fresh identity from the thread RNG.
    pub fn random(network: Network) -> Self {
        let mut rng = thread_rng();
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            if let Ok(secret_key) = SecretKey::from_slice(&bytes) {
                return Self::from_secret_key(secret_key, network);
            }
        }
    }

    /// Unconfidential P2WPKH address handed out for deposits.
    pub fn address(&self) -> String {
        self.address.to_string()
    }

    pub fn script_pubkey(&self) -> &Script {
        &self.script_pubkey
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.to_bytes())
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn is_mine(&self, script: &Script) -> bool {
        *script == self.script_pubkey
    }

    /// Sign every input of a base64 PSET that spends this identity's script.
    pub fn sign(&self, pset_base64: &str) -> Result<String> {
        signer::sign(pset_base64, self)
    }
}

impl InputSigner for HolderIdentity {
    fn script_pubkey(&self) -> &Script {
        &self.script_pubkey
    }

    fn public_key(&self) -> PublicKey {
        self.public_key
    }

    fn sign_ecdsa(&self, msg: &Message) -> ecdsa::Signature {
        let secp = secp256k1_zkp::Secp256k1::signing_only();
        secp.sign_ecdsa_low_r(msg, &self.secret_key)
    }
}

impl std::fmt::Debug for HolderIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HolderIdentity")
            .field("address", &self.address())
            .field("public_key", &self.public_key_hex())
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

/// P2WPKH output script for a compressed public key.
pub(crate) fn p2wpkh_script(public_key: &PublicKey) -> Script {
    Address::p2wpkh(public_key, None, &AddressParams::LIQUID).script_pubkey()
}
