// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory doubles for the wallet, encryption service and balance reader.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, Address, Bytes, Signature, B256, U256};
use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use crate::blockchain::{
    BalanceReader, ChainClientError, ContractCall, EncryptedHandle, TxOutcome, Wallet,
};
use crate::relayer::{
    create_eip712, DecryptKeypair, DecryptedValues, DecryptionDomain, EncryptedInput,
    EncryptedPayload, EncryptionService, Eip712Payload, RelayerError, UserDecryptRequest,
};

pub const METH: Address = address!("0x1111111111111111111111111111111111111111");
pub const MZAMA: Address = address!("0x2222222222222222222222222222222222222222");
pub const STAKING: Address = address!("0x3333333333333333333333333333333333333333");
pub const USER: Address = address!("0x123400000000000000000000000000000000abcd");
pub const OTHER_USER: Address = address!("0x9999999999999999999999999999999999999999");

pub struct MockWallet {
    address: Address,
    calls: Mutex<Vec<ContractCall>>,
    signed: Mutex<Vec<Eip712Payload>>,
    fail_send: AtomicBool,
    fail_sign: AtomicBool,
    gate: Mutex<Option<Arc<Semaphore>>>,
    entered: Notify,
}

impl MockWallet {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            calls: Mutex::new(Vec::new()),
            signed: Mutex::new(Vec::new()),
            fail_send: AtomicBool::new(false),
            fail_sign: AtomicBool::new(false),
            gate: Mutex::new(None),
            entered: Notify::new(),
        }
    }

    pub fn calls(&self) -> Vec<ContractCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn signed(&self) -> Vec<Eip712Payload> {
        self.signed.lock().unwrap().clone()
    }

    pub fn fail_send(&self) {
        self.fail_send.store(true, Ordering::SeqCst);
    }

    pub fn fail_sign(&self) {
        self.fail_sign.store(true, Ordering::SeqCst);
    }

    /// Block every `send` until a permit is added to the returned semaphore.
    pub fn hold_sends(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub async fn wait_for_pending_send(&self) {
        self.entered.notified().await;
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_typed_data(&self, payload: &Eip712Payload) -> Result<Signature, ChainClientError> {
        if self.fail_sign.load(Ordering::SeqCst) {
            return Err(ChainClientError::SigningFailed("user rejected".to_string()));
        }
        self.signed.lock().unwrap().push(payload.clone());
        Ok(Signature::new(U256::from(1u8), U256::from(2u8), false))
    }

    async fn send(&self, call: ContractCall) -> Result<TxOutcome, ChainClientError> {
        self.calls.lock().unwrap().push(call);
        self.entered.notify_one();

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        if self.fail_send.load(Ordering::SeqCst) {
            return Err(ChainClientError::TransactionFailed("rejected".to_string()));
        }
        Ok(TxOutcome {
            tx_hash: B256::repeat_byte(0xee),
            block_number: 1,
            gas_used: 21_000,
        })
    }
}

#[derive(Default)]
pub struct MockEncryption {
    encrypt_calls: Mutex<Vec<EncryptedInput>>,
    keypair_calls: AtomicUsize,
    eip712_calls: AtomicUsize,
    decrypt_calls: Mutex<Vec<UserDecryptRequest>>,
    response: Mutex<DecryptedValues>,
    fail_encrypt: AtomicBool,
}

impl MockEncryption {
    pub const HANDLE: EncryptedHandle = EncryptedHandle(B256::repeat_byte(0x77));

    pub fn proof() -> Bytes {
        Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef])
    }

    pub fn keypair() -> DecryptKeypair {
        DecryptKeypair {
            public_key: "0x0102".to_string(),
            private_key: "0x0304".to_string(),
        }
    }

    pub fn respond_with(&self, values: &[(EncryptedHandle, &str)]) {
        let mut response = self.response.lock().unwrap();
        response.clear();
        for (handle, value) in values {
            response.insert(*handle, value.to_string());
        }
    }

    pub fn fail_encrypt(&self) {
        self.fail_encrypt.store(true, Ordering::SeqCst);
    }

    pub fn encrypt_calls(&self) -> Vec<EncryptedInput> {
        self.encrypt_calls.lock().unwrap().clone()
    }

    pub fn keypair_calls(&self) -> usize {
        self.keypair_calls.load(Ordering::SeqCst)
    }

    pub fn eip712_calls(&self) -> usize {
        self.eip712_calls.load(Ordering::SeqCst)
    }

    pub fn decrypt_calls(&self) -> Vec<UserDecryptRequest> {
        self.decrypt_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EncryptionService for MockEncryption {
    async fn encrypt(&self, input: EncryptedInput) -> Result<EncryptedPayload, RelayerError> {
        self.encrypt_calls.lock().unwrap().push(input);
        if self.fail_encrypt.load(Ordering::SeqCst) {
            return Err(RelayerError::Request("bridge unavailable".to_string()));
        }
        Ok(EncryptedPayload {
            handles: vec![Self::HANDLE],
            input_proof: Self::proof(),
        })
    }

    async fn generate_keypair(&self) -> Result<DecryptKeypair, RelayerError> {
        self.keypair_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::keypair())
    }

    fn create_eip712(
        &self,
        public_key: &str,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<Eip712Payload, RelayerError> {
        self.eip712_calls.fetch_add(1, Ordering::SeqCst);
        create_eip712(
            &DecryptionDomain::sepolia(),
            public_key,
            contract_addresses,
            start_timestamp,
            duration_days,
        )
    }

    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<DecryptedValues, RelayerError> {
        self.decrypt_calls.lock().unwrap().push(request);
        Ok(self.response.lock().unwrap().clone())
    }
}

/// One recorded balance read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceRead {
    Wallet {
        token: Address,
        account: Address,
    },
    Staked {
        staking: Address,
        asset: Address,
        account: Address,
    },
}

#[derive(Default)]
pub struct MockReader {
    wallet_handle: Option<EncryptedHandle>,
    staked_handle: Option<EncryptedHandle>,
    fail: AtomicBool,
    reads: AtomicUsize,
    read_calls: Mutex<Vec<BalanceRead>>,
}

impl MockReader {
    pub fn with_handles(wallet: EncryptedHandle, staked: EncryptedHandle) -> Self {
        Self {
            wallet_handle: Some(wallet),
            staked_handle: Some(staked),
            ..Default::default()
        }
    }

    pub fn fail_reads(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> Vec<BalanceRead> {
        self.read_calls.lock().unwrap().clone()
    }

    fn read(
        &self,
        call: BalanceRead,
        handle: Option<EncryptedHandle>,
    ) -> Result<EncryptedHandle, ChainClientError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.read_calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChainClientError::RpcError("connection reset".to_string()));
        }
        Ok(handle.unwrap_or(EncryptedHandle::ZERO))
    }
}

#[async_trait]
impl BalanceReader for MockReader {
    async fn confidential_balance_of(
        &self,
        token: Address,
        account: Address,
    ) -> Result<EncryptedHandle, ChainClientError> {
        self.read(BalanceRead::Wallet { token, account }, self.wallet_handle)
    }

    async fn confidential_staked_balance(
        &self,
        staking: Address,
        asset: Address,
        account: Address,
    ) -> Result<EncryptedHandle, ChainClientError> {
        self.read(
            BalanceRead::Staked {
                staking,
                asset,
                account,
            },
            self.staked_handle,
        )
    }
}
