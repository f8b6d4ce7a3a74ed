//! The standard exit game.
//!
//! A standard exit moves funds out of the plasma chain by proving ownership of
//! an output included in a submitted block. Anyone can cancel it within the
//! exit period by proving the output was spent.

use std::sync::Arc;

use alloy_primitives::keccak256;
use plasma_exit_core::{
    check_membership, exit_id, is_deposit, output_guard, output_guard_to_address, output_id,
    output_related_data_hash, output_type, queue_key, Address, ExitId, ExitPriority, OutputId,
    PaymentOutput, StandardExit, Transaction, UtxoPos, B256, U256,
};
use plasma_exit_store::{ExitStore, InsertResult};
use tracing::{debug, info, warn};

use crate::config::ExitGameConfig;
use crate::error::{ExitGameError, Result};
use crate::events::ExitEvent;
use crate::framework::{Framework, Payout, QueuedExit};
use crate::registry::{
    OutputGuardParser, OutputGuardParserRegistry, SpendingCondition, SpendingConditionArgs,
    SpendingConditionRegistry,
};

/// Who is calling, with how much value attached, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    /// Value sent along with the call, in wei.
    pub value: U256,
    /// Base-chain time of the call, in seconds.
    pub timestamp: u64,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: u64) -> Self {
        Self {
            caller,
            value: U256::ZERO,
            timestamp,
        }
    }

    /// Attach value to the call.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Arguments of [`StandardExitGame::start_standard_exit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartExitArgs {
    /// Position of the exited output. Its output index selects the output.
    pub utxo_pos: UtxoPos,
    /// Canonical bytes of the transaction that created the output.
    pub tx_bytes: Vec<u8>,
    /// How to interpret the output guard; committed in the exit record.
    pub output_type: u64,
    /// Pre-image of the output guard. Empty for output type 0.
    pub output_guard_preimage: Vec<u8>,
    /// Inclusion proof of `tx_bytes` in the block at `utxo_pos`.
    pub inclusion_proof: Vec<u8>,
}

/// Arguments of [`StandardExitGame::challenge_standard_exit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeExitArgs {
    pub exit_id: ExitId,
    pub output_type: u64,
    pub output_utxo_pos: UtxoPos,
    pub output_id: OutputId,
    pub output_guard: B256,
    pub challenge_tx_type: u64,
    /// The transaction spending the exited output.
    pub challenge_tx: Vec<u8>,
    /// Which input of `challenge_tx` spends the output.
    pub input_index: u16,
    /// Proof the spend was authorized, e.g. a signature.
    pub witness: Vec<u8>,
}

/// What [`StandardExitGame::process_exit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Funds and bond were paid to the exit target.
    Finalized,
    /// The exit was absent or already invalidated; nothing moved.
    Skipped,
}

/// The standard exit state machine.
///
/// Exit records live in `S`. Block roots, the exit queue, and funds live in
/// the [`Framework`]. Every mutating operation takes `&mut self`, so calls on
/// one game are serialized.
pub struct StandardExitGame<S: ExitStore> {
    config: ExitGameConfig,
    store: Arc<S>,
    framework: Framework,
    conditions: SpendingConditionRegistry,
    parsers: OutputGuardParserRegistry,
    events: Vec<ExitEvent>,
}

impl<S: ExitStore> StandardExitGame<S> {
    /// Create a game. Fails if the config does not validate.
    pub fn new(config: ExitGameConfig, store: S, framework: Framework) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store: Arc::new(store),
            framework,
            conditions: SpendingConditionRegistry::new(),
            parsers: OutputGuardParserRegistry::new(),
            events: Vec::new(),
        })
    }

    /// Get the config.
    pub fn config(&self) -> &ExitGameConfig {
        &self.config
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register the spending condition for `(output_type, tx_type)`.
    pub fn register_spending_condition(
        &mut self,
        output_type: u64,
        tx_type: u64,
        condition: Arc<dyn SpendingCondition>,
    ) -> Result<()> {
        self.conditions.register(output_type, tx_type, condition)?;
        debug!(output_type, tx_type, "registered spending condition");
        Ok(())
    }

    /// Register the output guard parser for `output_type`.
    pub fn register_output_guard_parser(
        &mut self,
        output_type: u64,
        parser: Arc<dyn OutputGuardParser>,
    ) -> Result<()> {
        self.parsers.register(output_type, parser)?;
        debug!(output_type, "registered output guard parser");
        Ok(())
    }

    /// The exit record for `exit_id`, or the all-zero record.
    pub fn exit(&self, exit_id: &ExitId) -> Result<StandardExit> {
        Ok(self.store.get(exit_id)?.unwrap_or_default())
    }

    /// Take the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<ExitEvent> {
        std::mem::take(&mut self.events)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Start
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a standard exit on the output at `args.utxo_pos`.
    ///
    /// The caller must be the output's exit target and attach exactly the
    /// standard exit bond. On success the exit is recorded, queued, and
    /// `ExitStarted` is emitted; on failure nothing changes.
    pub fn start_standard_exit(&mut self, ctx: &CallContext, args: &StartExitArgs) -> Result<ExitId> {
        self.start(ctx, args).inspect_err(|e| {
            debug!(utxo_pos = %args.utxo_pos, caller = %ctx.caller, error = %e, "start exit rejected");
        })
    }

    fn start(&mut self, ctx: &CallContext, args: &StartExitArgs) -> Result<ExitId> {
        let pos = args.utxo_pos;
        let tx = Transaction::decode(&args.tx_bytes)?;

        let header = self
            .framework
            .blocks
            .block(pos.block_num())
            .ok_or(ExitGameError::TxNotIncluded)?;
        if !self.is_included(&args.tx_bytes, pos, &header.root, &args.inclusion_proof) {
            return Err(ExitGameError::TxNotIncluded);
        }

        let output = payment_output(&tx, pos.output_index())?;
        let exit_target = self.exit_target(args.output_type, output, &args.output_guard_preimage)?;
        if ctx.caller != exit_target {
            return Err(ExitGameError::NotExitTarget);
        }
        if ctx.value != self.config.standard_exit_bond {
            return Err(ExitGameError::BondMismatch);
        }

        let deposit = is_deposit(pos.block_num(), self.config.child_block_interval);
        let output_id = output_id(&args.tx_bytes, pos.output_index(), pos, deposit);
        let exit_id = exit_id(deposit, &args.tx_bytes, pos);
        if self.framework.outputs.is_output_spent(&output_id) {
            return Err(ExitGameError::OutputAlreadySpent(output_id));
        }

        let record = StandardExit {
            exitable: true,
            output_related_data_hash: output_related_data_hash(
                pos,
                &output_id,
                args.output_type,
                &output.output_guard,
            ),
            token: output.token,
            exit_target,
            amount: output.amount,
        };
        let previous = self.store.get(&exit_id)?;
        if self.store.insert(&exit_id, &record)? == InsertResult::AlreadyExitable {
            return Err(ExitGameError::ExitAlreadyStarted(exit_id));
        }

        let exitable_at =
            self.config
                .exitable_timestamp()
                .calculate(ctx.timestamp, header.timestamp, deposit);
        let queued = QueuedExit {
            key: queue_key(pos, &output.token),
            priority: ExitPriority::new(exitable_at, pos, exit_id),
            exit_id,
            output_id,
            processor: self.config.exit_processor,
        };
        if let Err(e) = self.framework.queue.enqueue(queued) {
            warn!(exit_id = %exit_id, error = %e, "enqueue failed, rolling back exit record");
            self.restore(&exit_id, previous)?;
            return Err(ExitGameError::Queue(e));
        }

        info!(
            exit_id = %exit_id,
            utxo_pos = %pos,
            owner = %ctx.caller,
            token = %output.token,
            amount = %output.amount,
            exitable_at,
            deposit,
            "standard exit started"
        );
        self.events.push(ExitEvent::ExitStarted {
            owner: ctx.caller,
            exit_id,
        });
        Ok(exit_id)
    }

    fn is_included(&self, tx_bytes: &[u8], pos: UtxoPos, root: &B256, proof: &[u8]) -> bool {
        proof.len() == self.config.merkle_tree_depth * 32
            && check_membership(keccak256(tx_bytes), u64::from(pos.tx_index()), root, proof)
    }

    /// Resolve who may exit `output` when it is read as `exit_output_type`.
    fn exit_target(
        &self,
        exit_output_type: u64,
        output: &PaymentOutput,
        preimage: &[u8],
    ) -> Result<Address> {
        if exit_output_type == output_type::RAW_OWNER {
            if !preimage.is_empty() {
                return Err(ExitGameError::UnexpectedGuardPreimage);
            }
            return Ok(output_guard_to_address(&output.output_guard));
        }

        let parser = self
            .parsers
            .lookup(exit_output_type)
            .ok_or(ExitGameError::NoGuardParser(exit_output_type))?;
        if output_guard(exit_output_type, preimage) != output.output_guard {
            return Err(ExitGameError::GuardPreimageMismatch);
        }
        parser
            .parse_exit_target(preimage)
            .map_err(ExitGameError::GuardParserFailed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Challenge
    // ─────────────────────────────────────────────────────────────────────────

    /// Challenge an exit by proving its output was spent.
    ///
    /// On success the record is deleted, the bond goes to the challenger, and
    /// `ExitChallenged` is emitted; on failure nothing changes.
    pub fn challenge_standard_exit(&mut self, ctx: &CallContext, args: &ChallengeExitArgs) -> Result<()> {
        self.challenge(ctx, args).inspect_err(|e| {
            debug!(exit_id = %args.exit_id, challenger = %ctx.caller, error = %e, "challenge rejected");
        })
    }

    fn challenge(&mut self, ctx: &CallContext, args: &ChallengeExitArgs) -> Result<()> {
        let exit = self
            .store
            .get(&args.exit_id)?
            .filter(|exit| exit.exitable)
            .ok_or(ExitGameError::ExitNotFound(args.exit_id))?;

        let claimed = output_related_data_hash(
            args.output_utxo_pos,
            &args.output_id,
            args.output_type,
            &args.output_guard,
        );
        if claimed != exit.output_related_data_hash {
            return Err(ExitGameError::ChallengeDataMismatch);
        }

        let condition = self
            .conditions
            .lookup(args.output_type, args.challenge_tx_type)
            .ok_or(ExitGameError::NoSpendingCondition {
                output_type: args.output_type,
                tx_type: args.challenge_tx_type,
            })?;
        let spent = condition
            .verify(&SpendingConditionArgs {
                output_guard: args.output_guard,
                utxo_pos: args.output_utxo_pos,
                output_id: args.output_id,
                spending_tx: &args.challenge_tx,
                input_index: args.input_index,
                witness: &args.witness,
            })
            .map_err(ExitGameError::SpendingConditionAborted)?;
        if !spent {
            return Err(ExitGameError::SpendingConditionFailed);
        }

        self.store.remove(&args.exit_id)?;
        let bond = Payout::eth(ctx.caller, self.config.standard_exit_bond);
        if let Err(e) = self.framework.treasury.pay(&[bond]) {
            warn!(exit_id = %args.exit_id, error = %e, "bond payout failed, restoring exit record");
            self.store.put(&args.exit_id, &exit)?;
            return Err(ExitGameError::Treasury(e));
        }

        info!(
            exit_id = %args.exit_id,
            utxo_pos = %args.output_utxo_pos,
            challenger = %ctx.caller,
            "standard exit challenged"
        );
        self.events.push(ExitEvent::ExitChallenged {
            utxo_pos: args.output_utxo_pos,
        });
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Finalize
    // ─────────────────────────────────────────────────────────────────────────

    /// Pay out a due exit. Only the exit queue may call this, once
    /// `exit.priority.exitable_at` has passed.
    ///
    /// Exits that were challenged in the meantime are skipped. A paid exit
    /// flags its output as spent, so the output can never be exited again.
    pub fn process_exit(&mut self, ctx: &CallContext, exit: &QueuedExit) -> Result<ProcessOutcome> {
        self.process(ctx, exit).inspect_err(|e| {
            debug!(exit_id = %exit.exit_id, caller = %ctx.caller, error = %e, "process exit rejected");
        })
    }

    fn process(&mut self, ctx: &CallContext, queued: &QueuedExit) -> Result<ProcessOutcome> {
        if ctx.caller != self.config.exit_queue {
            return Err(ExitGameError::NotExitQueue);
        }
        if ctx.timestamp < queued.priority.exitable_at {
            return Err(ExitGameError::ExitNotDue {
                exitable_at: queued.priority.exitable_at,
                now: ctx.timestamp,
            });
        }

        let exit_id = &queued.exit_id;
        let exit = match self.store.get(exit_id)? {
            Some(exit) if exit.exitable => exit,
            _ => {
                debug!(exit_id = %exit_id, "exit no longer exitable, skipping");
                return Ok(ProcessOutcome::Skipped);
            }
        };

        self.store.remove(exit_id)?;
        let payouts = [
            Payout {
                to: exit.exit_target,
                token: exit.token,
                amount: exit.amount,
            },
            Payout::eth(exit.exit_target, self.config.standard_exit_bond),
        ];
        if let Err(e) = self.framework.treasury.pay(&payouts) {
            warn!(exit_id = %exit_id, error = %e, "exit payout failed, restoring exit record");
            self.store.put(exit_id, &exit)?;
            return Err(ExitGameError::Treasury(e));
        }
        self.framework.outputs.flag_output_spent(queued.output_id);

        info!(
            exit_id = %exit_id,
            exit_target = %exit.exit_target,
            token = %exit.token,
            amount = %exit.amount,
            "standard exit finalized"
        );
        self.events.push(ExitEvent::ExitFinalized { exit_id: *exit_id });
        Ok(ProcessOutcome::Finalized)
    }

    /// Put back what was stored under `exit_id` before a failed operation.
    fn restore(&self, exit_id: &ExitId, previous: Option<StandardExit>) -> Result<()> {
        match previous {
            Some(exit) => self.store.put(exit_id, &exit)?,
            None => {
                self.store.remove(exit_id)?;
            }
        }
        Ok(())
    }
}

/// The payment output at `index`, which must carry a non-zero amount.
fn payment_output(tx: &Transaction, index: u16) -> Result<&PaymentOutput> {
    let output = tx
        .output(usize::from(index))
        .ok_or(ExitGameError::OutputIndexOutOfRange {
            index,
            outputs: tx.outputs.len(),
        })?;
    let payment = output
        .as_payment()
        .ok_or(ExitGameError::NotPaymentOutput(index))?;
    if payment.amount.is_zero() {
        return Err(ExitGameError::InvalidOutputAmount);
    }
    Ok(payment)
}
