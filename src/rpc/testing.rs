//! Scripted in-memory chain for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};
use std::collections::{HashMap, VecDeque};

use super::{ChainRpc, ConfirmationOutcome, RpcError};
use crate::sync::{HistoricalTransaction, HistorySource};

/// Per-address responses are consumed in order; the last one repeats.
#[derive(Default)]
pub struct MockChain {
    accounts: Mutex<HashMap<Pubkey, VecDeque<Result<Option<Account>, RpcError>>>>,
    send_results: Mutex<VecDeque<Result<Signature, RpcError>>>,
    confirm_results: Mutex<VecDeque<ConfirmationOutcome>>,
    history: Mutex<Vec<HistoricalTransaction>>,
    history_error: Mutex<Option<RpcError>>,
    sent: Mutex<Vec<Transaction>>,
    account_reads: Mutex<usize>,
    blockhash_calls: Mutex<usize>,
    confirm_calls: Mutex<usize>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&self, address: Pubkey, account: Option<Account>) {
        self.push_account_response(address, Ok(account));
    }

    pub fn push_account_response(
        &self,
        address: Pubkey,
        response: Result<Option<Account>, RpcError>,
    ) {
        self.accounts
            .lock()
            .entry(address)
            .or_default()
            .push_back(response);
    }

    pub fn fail_account(&self, address: Pubkey, message: &str) {
        self.push_account_response(address, Err(RpcError::request("getAccountInfo", message)));
    }

    pub fn push_send_result(&self, result: Result<Signature, RpcError>) {
        self.send_results.lock().push_back(result);
    }

    pub fn push_confirmation(&self, outcome: ConfirmationOutcome) {
        self.confirm_results.lock().push_back(outcome);
    }

    /// Every confirmation reports an expired blockhash
    pub fn always_expire(&self, times: usize) {
        let mut queue = self.confirm_results.lock();
        for _ in 0..times {
            queue.push_back(ConfirmationOutcome::Expired);
        }
    }

    pub fn set_history(&self, transactions: Vec<HistoricalTransaction>) {
        *self.history.lock() = transactions;
    }

    pub fn fail_history(&self, message: &str) {
        *self.history_error.lock() = Some(RpcError::request("getSignaturesForAddress", message));
    }

    pub fn sent_transactions(&self) -> Vec<Transaction> {
        self.sent.lock().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn account_reads(&self) -> usize {
        *self.account_reads.lock()
    }

    pub fn blockhash_calls(&self) -> usize {
        *self.blockhash_calls.lock()
    }

    pub fn confirm_calls(&self) -> usize {
        *self.confirm_calls.lock()
    }
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<Account>, RpcError> {
        *self.account_reads.lock() += 1;
        let mut accounts = self.accounts.lock();
        match accounts.get_mut(address) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Ok(None)),
            Some(queue) => queue.front().cloned().unwrap_or(Ok(None)),
            None => Ok(None),
        }
    }

    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), RpcError> {
        let mut calls = self.blockhash_calls.lock();
        *calls += 1;
        Ok((Hash::new_unique(), 1_000 + *calls as u64))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, RpcError> {
        self.sent.lock().push(transaction.clone());
        match self.send_results.lock().pop_front() {
            Some(result) => result,
            None => Ok(transaction.signatures.first().copied().unwrap_or_default()),
        }
    }

    async fn confirm_transaction(
        &self,
        _signature: &Signature,
        _blockhash: &Hash,
        _last_valid_block_height: u64,
    ) -> Result<ConfirmationOutcome, RpcError> {
        *self.confirm_calls.lock() += 1;
        Ok(self
            .confirm_results
            .lock()
            .pop_front()
            .unwrap_or(ConfirmationOutcome::Confirmed))
    }
}

#[async_trait]
impl HistorySource for MockChain {
    async fn recent_transactions(
        &self,
        _address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<HistoricalTransaction>, RpcError> {
        if let Some(err) = self.history_error.lock().clone() {
            return Err(err);
        }
        Ok(self.history.lock().iter().take(limit).cloned().collect())
    }
}
