use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anyhow::{anyhow, Context, Result};
use cryptic_clash::error::ErrorCode;
use cryptic_clash::events::{
    AttackAborted, MintAborted, MonsterAttacked, ScoreRevealed, SoldierMinted, StatsRevealed,
};
use cryptic_clash::state::{Arena, CiphertextHandle, StatHandles};

use crate::events::find_event;
use crate::program::{self, QueueAccounts, RevealRequest, SealedStats};
use crate::transport::{MxeInfo, SignedInstruction, Transport, TxReceipt};
use crate::wallet::Wallet;

/// Error the program returns for `code`.
pub fn program_error(code: ErrorCode) -> anyhow::Error {
    anchor_lang::error::Error::from(code).into()
}

/// Typed access to a deployed `cryptic_clash` program.
///
/// Queueing calls return once the transaction lands. The matching
/// `settle_*` call blocks on the computation callback and decodes its event.
pub struct ClashClient<T> {
    transport: T,
    program_id: Pubkey,
}

impl<T: Transport> ClashClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_program_id(transport, cryptic_clash::ID)
    }

    pub fn with_program_id(transport: T, program_id: Pubkey) -> Self {
        Self {
            transport,
            program_id,
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn unix_timestamp(&self) -> Result<i64> {
        self.transport.unix_timestamp()
    }

    pub fn mxe(&self) -> Result<MxeInfo> {
        self.transport.mxe()
    }

    fn queue_accounts(&self) -> Result<QueueAccounts> {
        Ok(QueueAccounts::new(self.transport.mxe()?.cluster))
    }

    fn send(&self, instruction: Instruction, wallet: &Wallet) -> Result<TxReceipt> {
        self.transport.send(SignedInstruction::new(instruction, wallet))
    }

    fn fetch<A: AccountDeserialize>(&self, address: &Pubkey) -> Result<Option<A>> {
        match self.transport.account_data(address)? {
            Some(data) => Ok(Some(A::try_deserialize(&mut data.as_slice())?)),
            None => Ok(None),
        }
    }

    fn view<R: AnchorDeserialize>(&self, instruction: Instruction) -> Result<R> {
        let data = self.transport.simulate(instruction)?;
        R::try_from_slice(&data).context("unexpected return data")
    }

    /// `None` until `initialize_arena` has run.
    pub fn arena(&self) -> Result<Option<Arena>> {
        self.fetch(&program::arena_address(&self.program_id))
    }

    pub fn initialize_arena(&self, authority: &Wallet) -> Result<TxReceipt> {
        let ix = program::initialize_arena(&self.program_id, authority.address());
        self.send(ix, authority)
    }

    /// Queue a mint for the next token id. Returns that id with the receipt.
    pub fn queue_mint_soldier(
        &self,
        owner: &Wallet,
        computation_offset: u64,
        stats: &SealedStats,
        mxe_nonce: u128,
    ) -> Result<(u64, TxReceipt)> {
        let arena = self
            .arena()?
            .ok_or_else(|| anyhow!("arena is not initialized"))?;
        let token_id = arena.next_token_id;
        let ix = program::mint_soldier(
            &self.program_id,
            &self.queue_accounts()?,
            owner.address(),
            token_id,
            computation_offset,
            stats,
            mxe_nonce,
        );
        Ok((token_id, self.send(ix, owner)?))
    }

    /// Wait for the mint callback. An aborted mint is an error.
    pub fn settle_mint(&self, computation_offset: u64) -> Result<SoldierMinted> {
        let receipt = self.transport.await_computation(computation_offset)?;
        if let Some(minted) = find_event::<SoldierMinted>(&receipt.logs) {
            return Ok(minted);
        }
        if let Some(aborted) = find_event::<MintAborted>(&receipt.logs) {
            return Err(program_error(ErrorCode::AbortedComputation)
                .context(format!("mint of soldier #{} aborted", aborted.token_id)));
        }
        Err(anyhow!("mint callback carried no event"))
    }

    pub fn queue_attack(
        &self,
        owner: &Wallet,
        computation_offset: u64,
        token_id: u64,
    ) -> Result<TxReceipt> {
        let ix = program::attack_monster(
            &self.program_id,
            &self.queue_accounts()?,
            owner.address(),
            computation_offset,
            token_id,
        );
        self.send(ix, owner)
    }

    /// Wait for the attack callback. An aborted attack is an error and
    /// leaves the score as it was.
    pub fn settle_attack(&self, computation_offset: u64) -> Result<MonsterAttacked> {
        let receipt = self.transport.await_computation(computation_offset)?;
        if let Some(attacked) = find_event::<MonsterAttacked>(&receipt.logs) {
            return Ok(attacked);
        }
        if let Some(aborted) = find_event::<AttackAborted>(&receipt.logs) {
            return Err(program_error(ErrorCode::AbortedComputation)
                .context(format!("attack by soldier #{} aborted", aborted.token_id)));
        }
        Err(anyhow!("attack callback carried no event"))
    }

    pub fn queue_reveal_stats(
        &self,
        owner: &Wallet,
        computation_offset: u64,
        token_id: u64,
        request: &RevealRequest,
    ) -> Result<TxReceipt> {
        let ix = program::reveal_stats(
            &self.program_id,
            &self.queue_accounts()?,
            owner.address(),
            computation_offset,
            token_id,
            request,
        );
        self.send(ix, owner)
    }

    pub fn settle_reveal_stats(&self, computation_offset: u64) -> Result<StatsRevealed> {
        let receipt = self.transport.await_computation(computation_offset)?;
        find_event(&receipt.logs).ok_or_else(|| anyhow!("reveal callback carried no stats"))
    }

    pub fn queue_reveal_score(
        &self,
        owner: &Wallet,
        computation_offset: u64,
        token_id: u64,
        request: &RevealRequest,
    ) -> Result<TxReceipt> {
        let ix = program::reveal_score(
            &self.program_id,
            &self.queue_accounts()?,
            owner.address(),
            computation_offset,
            token_id,
            request,
        );
        self.send(ix, owner)
    }

    pub fn settle_reveal_score(&self, computation_offset: u64) -> Result<ScoreRevealed> {
        let receipt = self.transport.await_computation(computation_offset)?;
        find_event(&receipt.logs).ok_or_else(|| anyhow!("reveal callback carried no score"))
    }

    /// Token held by `wallet`, `NO_TOKEN` if none.
    pub fn owned_token(&self, wallet: &Pubkey) -> Result<u64> {
        let record = program::owner_address(&self.program_id, wallet);
        let record = self.transport.account_data(&record)?.map(|_| record);
        self.view(program::get_owned_token(&self.program_id, *wallet, record))
    }

    pub fn soldier_stats(&self, token_id: u64) -> Result<StatHandles> {
        self.view(program::get_soldier_stats(&self.program_id, token_id))
    }

    pub fn encrypted_score(&self, token_id: u64) -> Result<CiphertextHandle> {
        self.view(program::get_encrypted_score(&self.program_id, token_id))
    }
}
