// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claim, stake, withdraw and decrypt workflows.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes};

use super::state::{ActionKind, CardState, DecryptedBalances, MissingHandlePolicy};
use super::validation::parse_amount;
use super::{ActionOutcome, StakeOrchestrator, WorkflowError, DECRYPT_DURATION_DAYS};
use crate::assets::Asset;
use crate::blockchain::{is_zero_handle, ContractCall, EncryptedHandle, Wallet};
use crate::relayer::{
    DecryptedValues, EncryptedInput, EncryptionService, HandleContractPair, UserDecryptRequest,
};

/// Inputs captured when an action is admitted.
struct Admitted {
    asset: Asset,
    wallet: Arc<dyn Wallet>,
    encryption: Option<Arc<dyn EncryptionService>>,
    amount: u64,
    wallet_handle: Option<EncryptedHandle>,
    staked_handle: Option<EncryptedHandle>,
}

impl Admitted {
    fn encryption(&self) -> Result<&Arc<dyn EncryptionService>, WorkflowError> {
        self.encryption
            .as_ref()
            .ok_or(WorkflowError::EncryptionNotReady)
    }
}

enum Admission {
    Admitted(Admitted),
    Settled(ActionOutcome),
}

impl StakeOrchestrator {
    /// Claim `input` plaintext tokens of the asset.
    pub async fn claim(&self, key: &str, input: &str) -> Result<ActionOutcome, WorkflowError> {
        let kind = ActionKind::Claim;
        let admitted = match self.admit(key, kind, Some(input)).await? {
            Admission::Admitted(admitted) => admitted,
            Admission::Settled(outcome) => return Ok(outcome),
        };

        let call = ContractCall::Claim {
            token: admitted.asset.address,
            amount: admitted.amount,
        };
        let result = admitted.wallet.send(call).await.map_err(WorkflowError::from);
        let tx = result.as_ref().ok().map(|tx| tx.tx_hash);

        let outcome = self
            .settle(key, kind, result, |card, _| card.drafts.clear(kind))
            .await;
        if let Some(tx_hash) = tx {
            tracing::info!(asset = key, tx_hash = %tx_hash, "Claim confirmed");
            self.refresh_balances(key).await?;
        }
        Ok(outcome)
    }

    /// Encrypt `input` for the asset contract and transfer it into staking.
    pub async fn stake(&self, key: &str, input: &str) -> Result<ActionOutcome, WorkflowError> {
        let kind = ActionKind::Stake;
        let admitted = match self.admit(key, kind, Some(input)).await? {
            Admission::Admitted(admitted) => admitted,
            Admission::Settled(outcome) => return Ok(outcome),
        };

        let result = self.run_stake(&admitted).await;
        let confirmed = result.is_ok();
        let outcome = self
            .settle(key, kind, result, |card, _| card.drafts.clear(kind))
            .await;
        if confirmed {
            self.refresh_balances(key).await?;
        }
        Ok(outcome)
    }

    /// Encrypt `input` for the staking contract and withdraw it.
    pub async fn withdraw(&self, key: &str, input: &str) -> Result<ActionOutcome, WorkflowError> {
        let kind = ActionKind::Withdraw;
        let admitted = match self.admit(key, kind, Some(input)).await? {
            Admission::Admitted(admitted) => admitted,
            Admission::Settled(outcome) => return Ok(outcome),
        };

        let result = self.run_withdraw(&admitted).await;
        let confirmed = result.is_ok();
        let outcome = self
            .settle(key, kind, result, |card, _| card.drafts.clear(kind))
            .await;
        if confirmed {
            self.refresh_balances(key).await?;
        }
        Ok(outcome)
    }

    /// Reveal the wallet and staked balances of the asset.
    pub async fn decrypt(&self, key: &str) -> Result<ActionOutcome, WorkflowError> {
        let kind = ActionKind::Decrypt;
        let admitted = match self.admit(key, kind, None).await? {
            Admission::Admitted(admitted) => admitted,
            Admission::Settled(outcome) => return Ok(outcome),
        };

        let result = self.run_decrypt(&admitted).await;
        Ok(self
            .settle(key, kind, result, |card, balances| {
                card.decrypted = Some(balances)
            })
            .await)
    }

    /// Forget the decrypted values of the asset. Returns whether the
    /// action was allowed.
    pub async fn hide_decrypted(&self, key: &str) -> Result<bool, WorkflowError> {
        let enabled = self.actions_enabled(key).await?;
        if enabled {
            let mut session = self.state.write().await;
            if let Some(card) = session.card_mut(key) {
                card.decrypted = None;
            }
        }
        Ok(enabled)
    }

    /// Re-read both encrypted balance handles of the asset.
    ///
    /// Read failures are logged and leave the cached handles untouched.
    pub async fn refresh_balances(&self, key: &str) -> Result<(), WorkflowError> {
        let asset = {
            let session = self.state.read().await;
            session
                .card(key)
                .map(|card| card.asset.clone())
                .ok_or_else(|| WorkflowError::UnknownAsset(key.to_string()))?
        };
        let Some(account) = self.account().await else {
            return Ok(());
        };
        if !asset.is_configured(self.staking) {
            return Ok(());
        }

        let wallet_handle = self
            .reader
            .confidential_balance_of(asset.address, account)
            .await;
        let staked_handle = self
            .reader
            .confidential_staked_balance(self.staking, asset.address, account)
            .await;

        let mut session = self.state.write().await;
        let Some(card) = session.card_mut(key) else {
            return Ok(());
        };
        match wallet_handle {
            Ok(handle) => card.wallet_handle = Some(handle),
            Err(e) => tracing::warn!(asset = key, error = %e, "Failed to read wallet balance"),
        }
        match staked_handle {
            Ok(handle) => card.staked_handle = Some(handle),
            Err(e) => tracing::warn!(asset = key, error = %e, "Failed to read staked balance"),
        }
        Ok(())
    }

    /// Refresh every asset card.
    pub async fn refresh_all(&self) {
        for key in self.asset_keys().await {
            if let Err(e) = self.refresh_balances(key).await {
                tracing::warn!(asset = key, error = %e, "Balance refresh failed");
            }
        }
    }

    async fn run_stake(&self, admitted: &Admitted) -> Result<(), WorkflowError> {
        let encryption = admitted.encryption()?;
        let user = admitted.wallet.address();

        // Bound to the token: it is the contract consuming the ciphertext.
        let input = EncryptedInput::new(admitted.asset.address, user).add64(admitted.amount);
        let encrypted = encryption.encrypt(input).await?;
        let handle = encrypted.first_handle()?;

        let tx = admitted
            .wallet
            .send(ContractCall::ConfidentialTransferAndCall {
                token: admitted.asset.address,
                to: self.staking,
                handle,
                proof: encrypted.input_proof,
                data: Bytes::new(),
            })
            .await?;
        tracing::info!(asset = admitted.asset.key, tx_hash = %tx.tx_hash, "Stake confirmed");
        Ok(())
    }

    async fn run_withdraw(&self, admitted: &Admitted) -> Result<(), WorkflowError> {
        let encryption = admitted.encryption()?;
        let user = admitted.wallet.address();

        // Bound to the staking contract, which consumes the ciphertext.
        let input = EncryptedInput::new(self.staking, user).add64(admitted.amount);
        let encrypted = encryption.encrypt(input).await?;
        let handle = encrypted.first_handle()?;

        let tx = admitted
            .wallet
            .send(ContractCall::Withdraw {
                staking: self.staking,
                asset: admitted.asset.address,
                handle,
                proof: encrypted.input_proof,
            })
            .await?;
        tracing::info!(asset = admitted.asset.key, tx_hash = %tx.tx_hash, "Withdrawal confirmed");
        Ok(())
    }

    async fn run_decrypt(&self, admitted: &Admitted) -> Result<DecryptedBalances, WorkflowError> {
        let encryption = admitted.encryption()?;
        let user = admitted.wallet.address();
        let asset = admitted.asset.address;

        let keypair = encryption.generate_keypair().await?;

        let mut pairs = Vec::with_capacity(2);
        if let Some(handle) = non_zero(admitted.wallet_handle) {
            pairs.push(HandleContractPair {
                handle,
                contract_address: asset,
            });
        }
        if let Some(handle) = non_zero(admitted.staked_handle) {
            pairs.push(HandleContractPair {
                handle,
                contract_address: self.staking,
            });
        }

        let start_timestamp = chrono::Utc::now().timestamp().max(0) as u64;
        let contract_addresses: Vec<Address> = vec![asset, self.staking];
        let payload = encryption.create_eip712(
            &keypair.public_key,
            &contract_addresses,
            start_timestamp,
            DECRYPT_DURATION_DAYS,
        )?;

        let signature = admitted.wallet.sign_typed_data(&payload).await?;

        let values = encryption
            .user_decrypt(UserDecryptRequest {
                pairs,
                keypair,
                signature: alloy::hex::encode(signature.as_bytes()),
                contract_addresses,
                user_address: user,
                start_timestamp,
                duration_days: DECRYPT_DURATION_DAYS,
            })
            .await?;

        Ok(DecryptedBalances {
            wallet: self.plaintext_for(admitted.wallet_handle, &values)?,
            staked: self.plaintext_for(admitted.staked_handle, &values)?,
        })
    }

    fn plaintext_for(
        &self,
        handle: Option<EncryptedHandle>,
        values: &DecryptedValues,
    ) -> Result<String, WorkflowError> {
        let Some(handle) = non_zero(handle) else {
            return Ok("0".to_string());
        };
        match values.get(&handle) {
            Some(value) => Ok(value.clone()),
            None => match self.missing_handle_policy {
                MissingHandlePolicy::TreatAsZero => {
                    tracing::warn!(handle = %handle, "Relayer omitted handle, showing 0");
                    Ok("0".to_string())
                }
                MissingHandlePolicy::Fail => Err(WorkflowError::MissingPlaintext(handle)),
            },
        }
    }

    /// Validate, check preconditions and mark the action pending, all under
    /// one write lock so two admissions of the same action cannot race.
    async fn admit(
        &self,
        key: &str,
        kind: ActionKind,
        input: Option<&str>,
    ) -> Result<Admission, WorkflowError> {
        let wallet = self.wallet().await;
        let encryption = self.encryption().await;

        let mut session = self.state.write().await;
        let card = session
            .card_mut(key)
            .ok_or_else(|| WorkflowError::UnknownAsset(key.to_string()))?;

        if card.actions.get(kind).is_pending() {
            return Err(WorkflowError::AlreadyInFlight {
                asset: key.to_string(),
                kind,
            });
        }

        let amount = match input {
            Some(raw) => {
                card.drafts.set(kind, raw);
                match parse_amount(raw) {
                    Some(amount) => amount,
                    None => return Ok(self.reject(card, kind, WorkflowError::InvalidAmount(kind))),
                }
            }
            None => 0,
        };

        if !card.asset.is_configured(self.staking) {
            return Ok(self.reject(card, kind, WorkflowError::NotConfigured));
        }
        let Some(wallet) = wallet else {
            return Ok(self.reject(card, kind, WorkflowError::WalletNotConnected));
        };
        if kind != ActionKind::Claim && encryption.is_none() {
            return Ok(self.reject(card, kind, WorkflowError::EncryptionNotReady));
        }

        if kind == ActionKind::Decrypt
            && is_zero_handle(card.wallet_handle.as_ref())
            && is_zero_handle(card.staked_handle.as_ref())
        {
            card.decrypted = Some(DecryptedBalances {
                wallet: "0".to_string(),
                staked: "0".to_string(),
            });
            return Ok(Admission::Settled(ActionOutcome::Completed(None)));
        }

        self.scheduler.disarm(card);
        card.begin(kind);
        tracing::info!(asset = key, action = %kind, amount, "Action started");

        Ok(Admission::Admitted(Admitted {
            asset: card.asset.clone(),
            wallet,
            encryption,
            amount,
            wallet_handle: card.wallet_handle,
            staked_handle: card.staked_handle,
        }))
    }

    fn reject(&self, card: &mut CardState, kind: ActionKind, error: WorkflowError) -> Admission {
        let message = error
            .rejection_message(kind)
            .unwrap_or_else(|| kind.failure_message());
        tracing::debug!(asset = card.asset.key, action = %kind, reason = %error, "Action rejected");
        card.status = Some(message);
        self.scheduler.arm(card, &self.state);
        Admission::Settled(ActionOutcome::Rejected(message))
    }

    /// Record the workflow result. Errors never escape past this point.
    async fn settle<T>(
        &self,
        key: &str,
        kind: ActionKind,
        result: Result<T, WorkflowError>,
        on_success: impl FnOnce(&mut CardState, T),
    ) -> ActionOutcome {
        let mut session = self.state.write().await;
        let Some(card) = session.card_mut(key) else {
            return ActionOutcome::Failed(kind.failure_message());
        };

        let outcome = match result {
            Ok(value) => {
                on_success(card, value);
                card.succeed(kind);
                ActionOutcome::Completed(Some(kind.success_message()))
            }
            Err(e) => {
                tracing::error!(asset = key, action = %kind, error = %e, "Action failed");
                card.fail(kind);
                ActionOutcome::Failed(kind.failure_message())
            }
        };
        self.scheduler.arm(card, &self.state);
        outcome
    }

    async fn actions_enabled(&self, key: &str) -> Result<bool, WorkflowError> {
        let connected = self.account().await.is_some();
        let ready = self.is_encryption_ready().await;
        let session = self.state.read().await;
        let card = session
            .card(key)
            .ok_or_else(|| WorkflowError::UnknownAsset(key.to_string()))?;
        Ok(connected && ready && card.asset.is_configured(self.staking))
    }
}

fn non_zero(handle: Option<EncryptedHandle>) -> Option<EncryptedHandle> {
    handle.filter(|h| !h.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::default_assets;
    use crate::orchestrator::state::ActionState;
    use crate::orchestrator::testing::*;
    use alloy::primitives::B256;
    use std::time::Duration;

    fn orchestrator(reader: Arc<MockReader>) -> StakeOrchestrator {
        StakeOrchestrator::new(
            default_assets(METH, MZAMA),
            STAKING,
            reader,
            MissingHandlePolicy::TreatAsZero,
        )
    }

    async fn connected(
        reader: Arc<MockReader>,
    ) -> (StakeOrchestrator, Arc<MockWallet>, Arc<MockEncryption>) {
        let orchestrator = orchestrator(reader);
        let wallet = Arc::new(MockWallet::new(USER));
        let encryption = Arc::new(MockEncryption::default());
        orchestrator.connect_wallet(wallet.clone()).await;
        orchestrator.set_encryption_service(encryption.clone()).await;
        (orchestrator, wallet, encryption)
    }

    async fn card_status(orchestrator: &StakeOrchestrator, key: &str) -> Option<&'static str> {
        orchestrator
            .with_snapshot(|s| s.cards.iter().find(|c| c.asset.key == key).and_then(|c| c.status))
            .await
    }

    async fn card_field<R>(
        orchestrator: &StakeOrchestrator,
        key: &str,
        f: impl FnOnce(&CardState) -> R,
    ) -> R {
        orchestrator
            .with_snapshot(|s| f(s.cards.iter().find(|c| c.asset.key == key).unwrap()))
            .await
    }

    #[tokio::test]
    async fn invalid_amounts_never_reach_external_services() {
        let (orchestrator, wallet, encryption) = connected(Arc::new(MockReader::default())).await;

        for input in ["", "0", "-3", "1.5", "abc"] {
            let outcome = orchestrator.claim("meth", input).await.unwrap();
            assert_eq!(outcome, ActionOutcome::Rejected("Enter a whole number to claim."));
            let outcome = orchestrator.stake("meth", input).await.unwrap();
            assert_eq!(outcome, ActionOutcome::Rejected("Enter a whole number to stake."));
            let outcome = orchestrator.withdraw("meth", input).await.unwrap();
            assert_eq!(
                outcome,
                ActionOutcome::Rejected("Enter a whole number to withdraw.")
            );
        }

        assert!(wallet.calls().is_empty());
        assert!(encryption.encrypt_calls().is_empty());
        assert_eq!(
            card_field(&orchestrator, "meth", |c| c.actions.get(ActionKind::Stake).clone()).await,
            ActionState::Idle
        );
    }

    #[tokio::test]
    async fn claim_forwards_exact_amount_and_clears_draft() {
        let (orchestrator, wallet, _) = connected(Arc::new(MockReader::default())).await;

        let outcome = orchestrator.claim("meth", " 250 ").await.unwrap();

        assert_eq!(
            outcome,
            ActionOutcome::Completed(Some("Claim confirmed on-chain."))
        );
        assert_eq!(
            wallet.calls(),
            vec![ContractCall::Claim {
                token: METH,
                amount: 250
            }]
        );
        assert_eq!(card_field(&orchestrator, "meth", |c| c.drafts.claim.clone()).await, "");
        assert_eq!(
            card_status(&orchestrator, "meth").await,
            Some("Claim confirmed on-chain.")
        );
    }

    #[tokio::test]
    async fn stake_end_to_end() {
        let (orchestrator, wallet, encryption) = connected(Arc::new(MockReader::default())).await;

        let outcome = orchestrator.stake("meth", "5").await.unwrap();

        assert_eq!(
            outcome,
            ActionOutcome::Completed(Some("Stake confirmed on-chain."))
        );
        assert_eq!(
            encryption.encrypt_calls(),
            vec![EncryptedInput::new(METH, USER).add64(5)]
        );
        assert_eq!(
            wallet.calls(),
            vec![ContractCall::ConfidentialTransferAndCall {
                token: METH,
                to: STAKING,
                handle: MockEncryption::HANDLE,
                proof: MockEncryption::proof(),
                data: Bytes::new(),
            }]
        );
        assert_eq!(card_field(&orchestrator, "meth", |c| c.drafts.stake.clone()).await, "");
        assert_eq!(
            card_status(&orchestrator, "meth").await,
            Some("Stake confirmed on-chain.")
        );
    }

    #[tokio::test]
    async fn withdraw_encrypts_for_the_staking_contract() {
        let (orchestrator, wallet, encryption) = connected(Arc::new(MockReader::default())).await;

        let outcome = orchestrator.withdraw("mzama", "3").await.unwrap();

        assert_eq!(
            outcome,
            ActionOutcome::Completed(Some("Withdrawal confirmed on-chain."))
        );
        assert_eq!(
            encryption.encrypt_calls(),
            vec![EncryptedInput::new(STAKING, USER).add64(3)]
        );
        assert_eq!(
            wallet.calls(),
            vec![ContractCall::Withdraw {
                staking: STAKING,
                asset: MZAMA,
                handle: MockEncryption::HANDLE,
                proof: MockEncryption::proof(),
            }]
        );
    }

    #[tokio::test]
    async fn stake_encryption_failure_skips_the_transaction() {
        let (orchestrator, wallet, encryption) = connected(Arc::new(MockReader::default())).await;
        encryption.fail_encrypt();

        let outcome = orchestrator.stake("meth", "5").await.unwrap();

        assert_eq!(
            outcome,
            ActionOutcome::Failed("Stake failed. Check balance and wallet.")
        );
        assert!(wallet.calls().is_empty());
        assert_eq!(card_field(&orchestrator, "meth", |c| c.drafts.stake.clone()).await, "5");
        assert_eq!(
            card_field(&orchestrator, "meth", |c| c.actions.get(ActionKind::Stake).clone()).await,
            ActionState::Failed("Stake failed. Check balance and wallet.")
        );
    }

    #[tokio::test]
    async fn rejected_transaction_clears_busy_flag() {
        let (orchestrator, wallet, _) = connected(Arc::new(MockReader::default())).await;
        wallet.fail_send();

        let outcome = orchestrator.withdraw("meth", "2").await.unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Failed("Withdrawal failed. Check staked balance.")
        );
        let state =
            card_field(&orchestrator, "meth", |c| c.actions.get(ActionKind::Withdraw).clone())
                .await;
        assert!(!state.is_pending());

        let outcome = orchestrator.claim("meth", "2").await.unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Failed("Claim failed. Check wallet connection.")
        );
    }

    #[tokio::test]
    async fn preconditions_are_reported_inline() {
        let orchestrator = orchestrator(Arc::new(MockReader::default()));

        assert_eq!(
            orchestrator.claim("meth", "1").await.unwrap(),
            ActionOutcome::Rejected("Connect wallet to claim.")
        );
        assert_eq!(
            orchestrator.decrypt("meth").await.unwrap(),
            ActionOutcome::Rejected("Connect wallet to decrypt balances.")
        );

        let wallet = Arc::new(MockWallet::new(USER));
        orchestrator.connect_wallet(wallet.clone()).await;
        assert_eq!(
            orchestrator.stake("meth", "1").await.unwrap(),
            ActionOutcome::Rejected("Encryption service is still loading.")
        );
        assert_eq!(
            orchestrator.withdraw("meth", "1").await.unwrap(),
            ActionOutcome::Rejected("Encryption service is still loading.")
        );
        assert!(wallet.calls().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_assets_refuse_actions() {
        let orchestrator = StakeOrchestrator::new(
            default_assets(Address::ZERO, MZAMA),
            STAKING,
            Arc::new(MockReader::default()),
            MissingHandlePolicy::TreatAsZero,
        );
        let wallet = Arc::new(MockWallet::new(USER));
        orchestrator.connect_wallet(wallet.clone()).await;

        assert_eq!(
            orchestrator.claim("meth", "1").await.unwrap(),
            ActionOutcome::Rejected("Set contract addresses to activate this asset.")
        );
        assert!(wallet.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_asset_is_an_error() {
        let (orchestrator, _, _) = connected(Arc::new(MockReader::default())).await;
        assert!(matches!(
            orchestrator.claim("dai", "1").await,
            Err(WorkflowError::UnknownAsset(_))
        ));
    }

    #[tokio::test]
    async fn same_action_cannot_run_twice_on_one_asset() {
        let (orchestrator, wallet, _) = connected(Arc::new(MockReader::default())).await;
        let orchestrator = Arc::new(orchestrator);
        let gate = wallet.hold_sends();

        let first = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.claim("meth", "1").await })
        };
        wallet.wait_for_pending_send().await;

        assert!(matches!(
            orchestrator.claim("meth", "2").await,
            Err(WorkflowError::AlreadyInFlight { .. })
        ));
        // Other assets and other actions are independent.
        let other = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.claim("mzama", "4").await })
        };

        gate.add_permits(2);
        assert_eq!(
            first.await.unwrap().unwrap(),
            ActionOutcome::Completed(Some("Claim confirmed on-chain."))
        );
        assert_eq!(
            other.await.unwrap().unwrap(),
            ActionOutcome::Completed(Some("Claim confirmed on-chain."))
        );
        assert_eq!(wallet.calls().len(), 2);
    }

    #[tokio::test]
    async fn decrypt_with_zero_handles_skips_the_relayer() {
        let reader = Arc::new(MockReader::with_handles(
            EncryptedHandle::ZERO,
            EncryptedHandle::ZERO,
        ));
        let (orchestrator, wallet, encryption) = connected(reader).await;
        orchestrator.refresh_balances("meth").await.unwrap();

        let outcome = orchestrator.decrypt("meth").await.unwrap();

        assert_eq!(outcome, ActionOutcome::Completed(None));
        assert_eq!(encryption.keypair_calls(), 0);
        assert_eq!(encryption.eip712_calls(), 0);
        assert!(encryption.decrypt_calls().is_empty());
        assert!(wallet.signed().is_empty());
        assert_eq!(
            card_field(&orchestrator, "meth", |c| c.decrypted.clone()).await,
            Some(DecryptedBalances {
                wallet: "0".into(),
                staked: "0".into()
            })
        );
    }

    #[tokio::test]
    async fn decrypt_before_any_read_treats_handles_as_zero() {
        let (orchestrator, _, encryption) = connected(Arc::new(MockReader::default())).await;
        let outcome = orchestrator.decrypt("mzama").await.unwrap();
        assert_eq!(outcome, ActionOutcome::Completed(None));
        assert_eq!(encryption.keypair_calls(), 0);
    }

    #[tokio::test]
    async fn decrypt_requests_one_pair_per_non_zero_handle() {
        let wallet_handle = EncryptedHandle(B256::repeat_byte(0x0a));
        let staked_handle = EncryptedHandle(B256::repeat_byte(0x0b));
        let reader = Arc::new(MockReader::with_handles(wallet_handle, staked_handle));
        let (orchestrator, wallet, encryption) = connected(reader).await;
        encryption.respond_with(&[(wallet_handle, "12"), (staked_handle, "30")]);
        orchestrator.refresh_balances("meth").await.unwrap();

        let outcome = orchestrator.decrypt("meth").await.unwrap();

        assert_eq!(outcome, ActionOutcome::Completed(Some("Decryption complete.")));
        let requests = encryption.decrypt_calls();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(
            request.pairs,
            vec![
                HandleContractPair {
                    handle: wallet_handle,
                    contract_address: METH
                },
                HandleContractPair {
                    handle: staked_handle,
                    contract_address: STAKING
                },
            ]
        );
        assert_eq!(request.contract_addresses, vec![METH, STAKING]);
        assert_eq!(request.user_address, USER);
        assert_eq!(request.duration_days, DECRYPT_DURATION_DAYS);
        assert_eq!(request.keypair, MockEncryption::keypair());
        assert!(!request.signature.starts_with("0x"));
        assert_eq!(request.signature.len(), 130);

        let signed = wallet.signed();
        assert_eq!(signed.len(), 1);
        assert_eq!(signed[0].message.contractAddresses, vec![METH, STAKING]);

        let now = chrono::Utc::now().timestamp() as u64;
        assert!(now.abs_diff(request.start_timestamp) < 60);

        assert_eq!(
            card_field(&orchestrator, "meth", |c| c.decrypted.clone()).await,
            Some(DecryptedBalances {
                wallet: "12".into(),
                staked: "30".into()
            })
        );
    }

    #[tokio::test]
    async fn decrypt_never_sends_zero_handles() {
        let staked_handle = EncryptedHandle(B256::repeat_byte(0x0b));
        let reader = Arc::new(MockReader::with_handles(EncryptedHandle::ZERO, staked_handle));
        let (orchestrator, _, encryption) = connected(reader).await;
        encryption.respond_with(&[(staked_handle, "9")]);
        orchestrator.refresh_balances("meth").await.unwrap();

        orchestrator.decrypt("meth").await.unwrap();

        let requests = encryption.decrypt_calls();
        assert_eq!(
            requests[0].pairs,
            vec![HandleContractPair {
                handle: staked_handle,
                contract_address: STAKING
            }]
        );
        assert_eq!(
            card_field(&orchestrator, "meth", |c| c.decrypted.clone()).await,
            Some(DecryptedBalances {
                wallet: "0".into(),
                staked: "9".into()
            })
        );
    }

    #[tokio::test]
    async fn missing_plaintext_follows_policy() {
        let wallet_handle = EncryptedHandle(B256::repeat_byte(0x0a));
        let staked_handle = EncryptedHandle(B256::repeat_byte(0x0b));

        let reader = Arc::new(MockReader::with_handles(wallet_handle, staked_handle));
        let (orchestrator, _, encryption) = connected(reader.clone()).await;
        encryption.respond_with(&[(wallet_handle, "12")]);
        orchestrator.refresh_balances("meth").await.unwrap();
        orchestrator.decrypt("meth").await.unwrap();
        assert_eq!(
            card_field(&orchestrator, "meth", |c| c.decrypted.clone()).await,
            Some(DecryptedBalances {
                wallet: "12".into(),
                staked: "0".into()
            })
        );

        let strict = StakeOrchestrator::new(
            default_assets(METH, MZAMA),
            STAKING,
            reader,
            MissingHandlePolicy::Fail,
        );
        strict.connect_wallet(Arc::new(MockWallet::new(USER))).await;
        strict.set_encryption_service(encryption.clone()).await;
        strict.refresh_balances("meth").await.unwrap();

        let outcome = strict.decrypt("meth").await.unwrap();
        assert_eq!(outcome, ActionOutcome::Failed("Decryption failed. Try again."));
        assert_eq!(card_field(&strict, "meth", |c| c.decrypted.clone()).await, None);
    }

    #[tokio::test]
    async fn decrypt_signature_failure_shows_no_partial_value() {
        let wallet_handle = EncryptedHandle(B256::repeat_byte(0x0a));
        let reader = Arc::new(MockReader::with_handles(wallet_handle, EncryptedHandle::ZERO));
        let (orchestrator, wallet, encryption) = connected(reader).await;
        wallet.fail_sign();
        orchestrator.refresh_balances("meth").await.unwrap();

        let outcome = orchestrator.decrypt("meth").await.unwrap();

        assert_eq!(outcome, ActionOutcome::Failed("Decryption failed. Try again."));
        assert!(encryption.decrypt_calls().is_empty());
        assert_eq!(card_field(&orchestrator, "meth", |c| c.decrypted.clone()).await, None);
        assert!(
            !card_field(&orchestrator, "meth", |c| c.actions.get(ActionKind::Decrypt).clone())
                .await
                .is_pending()
        );
    }

    #[tokio::test]
    async fn hide_decrypted_clears_values_when_enabled() {
        let (orchestrator, _, _) = connected(Arc::new(MockReader::default())).await;
        orchestrator.decrypt("meth").await.unwrap();
        assert!(card_field(&orchestrator, "meth", |c| c.decrypted.is_some()).await);

        assert!(orchestrator.hide_decrypted("meth").await.unwrap());
        assert!(card_field(&orchestrator, "meth", |c| c.decrypted.is_none()).await);

        orchestrator.disconnect_wallet().await;
        assert!(!orchestrator.hide_decrypted("meth").await.unwrap());
    }

    #[tokio::test]
    async fn refresh_keeps_old_handles_on_read_failure() {
        let wallet_handle = EncryptedHandle(B256::repeat_byte(0x0a));
        let reader = Arc::new(MockReader::with_handles(wallet_handle, EncryptedHandle::ZERO));
        let (orchestrator, _, _) = connected(reader.clone()).await;
        orchestrator.refresh_balances("meth").await.unwrap();

        reader.fail_reads();
        orchestrator.refresh_balances("meth").await.unwrap();

        assert_eq!(
            card_field(&orchestrator, "meth", |c| c.wallet_handle).await,
            Some(wallet_handle)
        );
    }

    #[tokio::test]
    async fn confirmed_writes_refresh_balances() {
        let reader = Arc::new(MockReader::default());
        let (orchestrator, _, _) = connected(reader.clone()).await;

        orchestrator.claim("meth", "1").await.unwrap();

        assert_eq!(reader.reads(), 2);
        assert_eq!(
            reader.read_calls(),
            vec![
                BalanceRead::Wallet { token: METH, account: USER },
                BalanceRead::Staked { staking: STAKING, asset: METH, account: USER },
            ]
        );
    }

    #[tokio::test]
    async fn refresh_reads_each_asset_from_its_own_contract() {
        let reader = Arc::new(MockReader::default());
        let (orchestrator, _, _) = connected(reader.clone()).await;

        orchestrator.refresh_all().await;

        assert_eq!(
            reader.read_calls(),
            vec![
                BalanceRead::Wallet { token: METH, account: USER },
                BalanceRead::Staked { staking: STAKING, asset: METH, account: USER },
                BalanceRead::Wallet { token: MZAMA, account: USER },
                BalanceRead::Staked { staking: STAKING, asset: MZAMA, account: USER },
            ]
        );
    }

    #[tokio::test]
    async fn claim_does_not_wait_for_encryption() {
        let orchestrator = orchestrator(Arc::new(MockReader::default()));
        let wallet = Arc::new(MockWallet::new(USER));
        orchestrator.connect_wallet(wallet.clone()).await;

        assert_eq!(
            orchestrator.claim("meth", "3").await.unwrap(),
            ActionOutcome::Completed(Some("Claim confirmed on-chain."))
        );
        assert_eq!(wallet.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_message_outlives_an_earlier_rejection_timer() {
        let (orchestrator, wallet, _) = connected(Arc::new(MockReader::default())).await;
        let orchestrator = Arc::new(orchestrator);

        orchestrator.claim("meth", "abc").await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        let gate = wallet.hold_sends();
        let pending = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.claim("meth", "1").await })
        };
        wallet.wait_for_pending_send().await;
        assert_eq!(card_status(&orchestrator, "meth").await, Some("Submitting claim..."));

        // The rejection timer would have fired at 3.5 s.
        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(card_status(&orchestrator, "meth").await, Some("Submitting claim..."));
        assert!(card_field(&orchestrator, "meth", |c| c.actions.get(ActionKind::Claim).is_pending()).await);

        gate.add_permits(1);
        assert_eq!(
            pending.await.unwrap().unwrap(),
            ActionOutcome::Completed(Some("Claim confirmed on-chain."))
        );
    }

    #[tokio::test]
    async fn switching_accounts_drops_cached_balances() {
        let wallet_handle = EncryptedHandle(B256::repeat_byte(0x0a));
        let reader = Arc::new(MockReader::with_handles(wallet_handle, EncryptedHandle::ZERO));
        let (orchestrator, _, _) = connected(reader).await;
        orchestrator.refresh_balances("meth").await.unwrap();

        orchestrator
            .connect_wallet(Arc::new(MockWallet::new(OTHER_USER)))
            .await;

        assert_eq!(card_field(&orchestrator, "meth", |c| c.wallet_handle).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_message_clears_after_delay() {
        let (orchestrator, wallet, _) = connected(Arc::new(MockReader::default())).await;
        wallet.fail_send();

        orchestrator.claim("meth", "1").await.unwrap();
        assert_eq!(
            card_status(&orchestrator, "meth").await,
            Some("Claim failed. Check wallet connection.")
        );

        tokio::time::sleep(Duration::from_millis(3600)).await;
        tokio::task::yield_now().await;
        assert_eq!(card_status(&orchestrator, "meth").await, None);
        assert_eq!(
            card_field(&orchestrator, "meth", |c| c.actions.get(ActionKind::Claim).clone()).await,
            ActionState::Idle
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_status_updates() {
        let (orchestrator, _, _) = connected(Arc::new(MockReader::default())).await;
        orchestrator.claim("meth", "").await.unwrap();

        orchestrator.shutdown();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(
            card_status(&orchestrator, "meth").await,
            Some("Enter a whole number to claim.")
        );
    }
}
