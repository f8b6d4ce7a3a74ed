//! Test fixtures and helpers.
//!
//! An in-memory stand-in for the plasma framework, scripted verifiers, and a
//! fixture that wires them to a game over a [`MemoryStore`].

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, bail};
use plasma_exit::{
    BlockHeader, BlockRootStore, CallContext, ChallengeExitArgs, ExitGameConfig, Framework,
    OutputGuardParser, Payout, PriorityQueue, ProcessOutcome, QueuedExit, SpendingCondition,
    SpendingConditionArgs, SpentOutputs, StandardExitGame, StartExitArgs, Treasury,
};
use plasma_exit_core::{
    exit_id, is_deposit, output_id, tx_type, Address, ExitId, MerkleTree, OutputId,
    PaymentOutput, Transaction, TransactionBuilder, UtxoPos, B256, U256,
};
use plasma_exit_store::MemoryStore;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Submitted blocks, kept in memory.
#[derive(Debug, Default)]
pub struct BlockRoots {
    blocks: Mutex<BTreeMap<u64, BlockHeader>>,
}

impl BlockRoots {
    /// Record a block, replacing any earlier one with the same number.
    pub fn submit(&self, block_num: u64, root: B256, timestamp: u64) {
        lock(&self.blocks).insert(block_num, BlockHeader { root, timestamp });
    }
}

impl BlockRootStore for BlockRoots {
    fn block(&self, block_num: u64) -> Option<BlockHeader> {
        lock(&self.blocks).get(&block_num).copied()
    }
}

/// A priority queue that records what it is given.
///
/// Keys are unique among queued exits, as in the framework.
#[derive(Debug, Default)]
pub struct RecordingQueue {
    queued: Mutex<Vec<QueuedExit>>,
    failing: AtomicBool,
}

impl RecordingQueue {
    /// Make every following `enqueue` fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Everything currently queued, in insertion order.
    pub fn queued(&self) -> Vec<QueuedExit> {
        lock(&self.queued).clone()
    }

    /// Remove and return the exits due at `now`, highest priority first.
    pub fn pop_due(&self, now: u64) -> Vec<QueuedExit> {
        let mut queued = lock(&self.queued);
        let (mut due, rest): (Vec<_>, Vec<_>) = queued
            .drain(..)
            .partition(|exit| exit.priority.exitable_at <= now);
        *queued = rest;
        due.sort_by_key(|exit| exit.priority);
        due
    }
}

impl PriorityQueue for RecordingQueue {
    fn enqueue(&self, exit: QueuedExit) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("priority queue unavailable");
        }
        let mut queued = lock(&self.queued);
        if queued.iter().any(|q| q.key == exit.key) {
            bail!("exit already queued for key {}", exit.key);
        }
        queued.push(exit);
        Ok(())
    }
}

/// A treasury that records payouts instead of moving funds.
#[derive(Debug, Default)]
pub struct RecordingTreasury {
    payouts: Mutex<Vec<Payout>>,
    failing: AtomicBool,
}

impl RecordingTreasury {
    /// Make every following `pay` fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every payout made so far.
    pub fn payouts(&self) -> Vec<Payout> {
        lock(&self.payouts).clone()
    }

    /// Total of `token` paid to `to`.
    pub fn paid(&self, to: Address, token: Address) -> U256 {
        lock(&self.payouts)
            .iter()
            .filter(|p| p.to == to && p.token == token)
            .fold(U256::ZERO, |total, p| total + p.amount)
    }
}

impl Treasury for RecordingTreasury {
    fn pay(&self, payouts: &[Payout]) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("treasury transfer failed");
        }
        lock(&self.payouts).extend_from_slice(payouts);
        Ok(())
    }
}

/// Output ids flagged as withdrawn.
#[derive(Debug, Default)]
pub struct SpentOutputSet {
    spent: Mutex<HashSet<OutputId>>,
}

impl SpentOutputSet {
    pub fn len(&self) -> usize {
        lock(&self.spent).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpentOutputs for SpentOutputSet {
    fn is_output_spent(&self, output_id: &OutputId) -> bool {
        lock(&self.spent).contains(output_id)
    }

    fn flag_output_spent(&self, output_id: OutputId) {
        lock(&self.spent).insert(output_id);
    }
}

/// The in-memory framework: blocks, queue, spent outputs, and treasury.
#[derive(Debug, Clone, Default)]
pub struct MockFramework {
    pub blocks: Arc<BlockRoots>,
    pub queue: Arc<RecordingQueue>,
    pub treasury: Arc<RecordingTreasury>,
    pub outputs: Arc<SpentOutputSet>,
}

impl MockFramework {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles for a game.
    pub fn framework(&self) -> Framework {
        Framework::new(
            self.blocks.clone(),
            self.queue.clone(),
            self.treasury.clone(),
            self.outputs.clone(),
        )
    }
}

/// Owned copy of [`SpendingConditionArgs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSpend {
    pub output_guard: B256,
    pub utxo_pos: UtxoPos,
    pub output_id: OutputId,
    pub spending_tx: Vec<u8>,
    pub input_index: u16,
    pub witness: Vec<u8>,
}

impl From<&SpendingConditionArgs<'_>> for RecordedSpend {
    fn from(args: &SpendingConditionArgs<'_>) -> Self {
        Self {
            output_guard: args.output_guard,
            utxo_pos: args.utxo_pos,
            output_id: args.output_id,
            spending_tx: args.spending_tx.to_vec(),
            input_index: args.input_index,
            witness: args.witness.to_vec(),
        }
    }
}

#[derive(Debug)]
enum Script {
    Returns(bool),
    Aborts(String),
    Expects(RecordedSpend),
}

/// A spending condition with a fixed answer. Records every call.
#[derive(Debug)]
pub struct ScriptedCondition {
    script: Script,
    calls: Mutex<Vec<RecordedSpend>>,
}

impl ScriptedCondition {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `spent`.
    pub fn returning(spent: bool) -> Self {
        Self::new(Script::Returns(spent))
    }

    /// Always aborts with `message`.
    pub fn aborting(message: impl Into<String>) -> Self {
        Self::new(Script::Aborts(message.into()))
    }

    /// Answers true for exactly `expected`, aborts otherwise.
    pub fn expecting(expected: RecordedSpend) -> Self {
        Self::new(Script::Expects(expected))
    }

    /// Arguments of every call so far.
    pub fn calls(&self) -> Vec<RecordedSpend> {
        lock(&self.calls).clone()
    }
}

impl SpendingCondition for ScriptedCondition {
    fn verify(&self, args: &SpendingConditionArgs<'_>) -> anyhow::Result<bool> {
        let got = RecordedSpend::from(args);
        lock(&self.calls).push(got.clone());
        match &self.script {
            Script::Returns(spent) => Ok(*spent),
            Script::Aborts(message) => Err(anyhow!("{message}")),
            Script::Expects(expected) if *expected == got => Ok(true),
            Script::Expects(_) => bail!("unexpected spending condition arguments"),
        }
    }
}

/// A guard parser with a fixed answer.
#[derive(Debug)]
pub struct ScriptedGuardParser {
    result: Result<Address, String>,
}

impl ScriptedGuardParser {
    pub fn resolving(target: Address) -> Self {
        Self { result: Ok(target) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
        }
    }
}

impl OutputGuardParser for ScriptedGuardParser {
    fn parse_exit_target(&self, _preimage: &[u8]) -> anyhow::Result<Address> {
        self.result.clone().map_err(|message| anyhow!(message))
    }
}

/// Reads the exit target from the first 20 bytes of the pre-image.
#[derive(Debug, Default)]
pub struct PrefixGuardParser;

impl OutputGuardParser for PrefixGuardParser {
    fn parse_exit_target(&self, preimage: &[u8]) -> anyhow::Result<Address> {
        match preimage.get(..20) {
            Some(prefix) => Ok(Address::from_slice(prefix)),
            None => bail!("pre-image too short: {} bytes", preimage.len()),
        }
    }
}

/// A payment transaction spending `input` into a single output for `to`.
pub fn spend(input: UtxoPos, to: Address, amount: u64) -> Transaction {
    TransactionBuilder::new(tx_type::PAYMENT)
        .spend(input)
        .output(PaymentOutput::owned_by(to, Address::ZERO, U256::from(amount)))
        .build()
        .expect("valid spend")
}

/// A game over a memory store and a mock framework, with a settable clock.
pub struct TestFixture {
    pub framework: MockFramework,
    pub game: StandardExitGame<MemoryStore>,
    /// Current base-chain time, in seconds.
    pub now: u64,
}

impl TestFixture {
    /// A fixture with the default config.
    pub fn new() -> Self {
        Self::with_config(ExitGameConfig::default())
    }

    /// A fixture with a custom config.
    pub fn with_config(config: ExitGameConfig) -> Self {
        let framework = MockFramework::new();
        let game = StandardExitGame::new(config, MemoryStore::new(), framework.framework())
            .expect("valid config");
        Self {
            framework,
            game,
            now: 1_000_000,
        }
    }

    /// The configured exit bond.
    pub fn bond(&self) -> U256 {
        self.game.config().standard_exit_bond
    }

    /// A call from `caller` at the current time, carrying the bond.
    pub fn ctx(&self, caller: Address) -> CallContext {
        CallContext::new(caller, self.now).with_value(self.bond())
    }

    /// A callback from the exit queue at the current time.
    pub fn queue_ctx(&self) -> CallContext {
        CallContext::new(self.game.config().exit_queue, self.now)
    }

    /// Pop every exit due at the current time and process it, as the queue
    /// would.
    pub fn process_due(&mut self) -> Vec<(ExitId, ProcessOutcome)> {
        let ctx = self.queue_ctx();
        self.framework
            .queue
            .pop_due(self.now)
            .iter()
            .map(|queued| {
                let outcome = self
                    .game
                    .process_exit(&ctx, queued)
                    .expect("due exit processes");
                (queued.exit_id, outcome)
            })
            .collect()
    }

    /// Submit a block holding `txs` at the current time.
    pub fn submit_block(&self, block_num: u64, txs: &[Transaction]) -> MerkleTree {
        let leaves: Vec<Vec<u8>> = txs.iter().map(Transaction::encode).collect();
        let tree = MerkleTree::new(&leaves, self.game.config().merkle_tree_depth)
            .expect("block fits the tree");
        self.framework.blocks.submit(block_num, tree.root(), self.now);
        tree
    }

    /// Arguments for an output type 0 exit of output `pos` of `tx`.
    pub fn exit_args(&self, tree: &MerkleTree, tx: &Transaction, pos: UtxoPos) -> StartExitArgs {
        let proof = tree
            .proof(u64::from(pos.tx_index()))
            .expect("index fits the tree");
        StartExitArgs {
            utxo_pos: pos,
            tx_bytes: tx.encode(),
            output_type: 0,
            output_guard_preimage: Vec::new(),
            inclusion_proof: proof.to_bytes(),
        }
    }

    /// Submit a deposit block for `owner` and return exit arguments for it.
    pub fn deposit(&self, block_num: u64, owner: Address, amount: u64) -> StartExitArgs {
        let tx = Transaction::deposit(owner, Address::ZERO, U256::from(amount))
            .expect("valid deposit");
        let tree = self.submit_block(block_num, std::slice::from_ref(&tx));
        let pos = UtxoPos::new(block_num, 0, 0).expect("valid position");
        self.exit_args(&tree, &tx, pos)
    }

    fn is_deposit(&self, pos: UtxoPos) -> bool {
        is_deposit(pos.block_num(), self.game.config().child_block_interval)
    }

    /// The exit id `start_standard_exit(args)` will use.
    pub fn exit_id_of(&self, args: &StartExitArgs) -> ExitId {
        exit_id(self.is_deposit(args.utxo_pos), &args.tx_bytes, args.utxo_pos)
    }

    /// The output id of the output `args` exits.
    pub fn output_id_of(&self, args: &StartExitArgs) -> OutputId {
        let pos = args.utxo_pos;
        output_id(&args.tx_bytes, pos.output_index(), pos, self.is_deposit(pos))
    }

    /// Arguments challenging the exit started with `start` using `challenge_tx`.
    pub fn challenge_args(
        &self,
        start: &StartExitArgs,
        challenge_tx: &Transaction,
        input_index: u16,
    ) -> ChallengeExitArgs {
        let tx = Transaction::decode(&start.tx_bytes).expect("exited tx decodes");
        let output = tx
            .output(usize::from(start.utxo_pos.output_index()))
            .and_then(|output| output.as_payment())
            .expect("exited output is a payment");
        ChallengeExitArgs {
            exit_id: self.exit_id_of(start),
            output_type: start.output_type,
            output_utxo_pos: start.utxo_pos,
            output_id: self.output_id_of(start),
            output_guard: output.output_guard,
            challenge_tx_type: challenge_tx.tx_type,
            challenge_tx: challenge_tx.encode(),
            input_index,
            witness: b"signature".to_vec(),
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
